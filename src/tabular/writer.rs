//! Validation Spec Spreadsheet Writing
//!
//! Writes a [`ValidationSpec`] as an Excel workbook that curators can edit by hand and
//! read back with [`ValidationSpec::from_excel`]. Every primitive field of the document
//! layout becomes one row:
//!
//! | Object | Field | Mandatory | Value Range | Controlled Vocabulary | Description |
//! |--------|-------|-----------|-------------|-----------------------|-------------|
//! | Vessel | vessels.volume | True | 0.1, 10 | --- | Volumetric value of the vessel. |
//!
//! Rows of the same entity type share a background color.

use std::path::Path;

use rust_xlsxwriter::workbook::Workbook;
use rust_xlsxwriter::{
    DataValidation, DataValidationErrorStyle, Format, FormatAlign, FormatBorder, Worksheet,
    XlsxError,
};

use crate::validation::error::ValidationError;
use crate::validation::spec::{SpecRow, ValidationSpec};

/// Name of the worksheet holding the rules
pub(crate) const SHEET_NAME: &str = "validation";

/// Column headers, in column order
pub(crate) const COLUMNS: [&str; 6] = [
    "Object",
    "Field",
    "Mandatory",
    "Value Range",
    "Controlled Vocabulary",
    "Description",
];

/// Cell content of a constraint that does not apply
pub(crate) const NOT_APPLICABLE: &str = "---";

/// Default column width
const DEFAULT_COLUMN_WIDTH: f64 = 20.0;

/// Width of the field and description columns
const WIDE_COLUMN_WIDTH: f64 = 45.0;

/// Default row height
const DEFAULT_ROW_HEIGHT: f64 = 20.0;

/// Border color for cells
const BORDER_COLOR: u32 = 0xB0B0B0;

/// Header background color
const HEADER_BG_COLOR: u32 = 0xD9EAD3;

/// Background colors cycled through per entity type
const OBJECT_COLORS: [u32; 9] = [
    0xFFEBEE, 0xF3E5F5, 0xE8EAF6, 0xE3F2FD, 0xE0F7FA, 0xE8F5E9, 0xF9FBE7, 0xFFFDE7, 0xFBE9E7,
];

impl ValidationSpec {
    /// Writes the spec as a spreadsheet to the given path.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Spreadsheet` if the workbook cannot be built or saved.
    pub fn to_excel(&self, path: impl AsRef<Path>) -> Result<(), ValidationError> {
        let mut workbook = Workbook::try_from(self)?;
        workbook.save(path.as_ref()).map_err(spreadsheet_error)?;
        log::info!("Wrote validation spreadsheet to {}", path.as_ref().display());
        Ok(())
    }
}

impl TryFrom<&ValidationSpec> for Workbook {
    type Error = ValidationError;

    /// Converts a spec into a workbook with a single rule sheet
    fn try_from(spec: &ValidationSpec) -> Result<Self, Self::Error> {
        let mut workbook = Workbook::new();
        add_rule_sheet(spec, &mut workbook).map_err(spreadsheet_error)?;
        Ok(workbook)
    }
}

pub(crate) fn spreadsheet_error(error: impl std::fmt::Display) -> ValidationError {
    ValidationError::Spreadsheet(error.to_string())
}

/// Adds the rule sheet to the workbook
///
/// # Arguments
///
/// * `spec` - The spec whose rules are written
/// * `workbook` - The Workbook to add the worksheet to
fn add_rule_sheet(spec: &ValidationSpec, workbook: &mut Workbook) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let header_format = get_header_format();
    for (col, header) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    let rows = spec.rows();
    let mut colors = OBJECT_COLORS.iter().cycle();
    let mut current_color = HEADER_BG_COLOR;
    let mut current_object = None;

    for (index, row) in rows.iter().enumerate() {
        if current_object != Some(row.object) {
            current_object = Some(row.object);
            current_color = colors.next().copied().unwrap_or(HEADER_BG_COLOR);
        }

        let format = get_non_header_format().set_background_color(current_color);
        write_row(sheet, index as u32 + 1, row, &format)?;
    }

    for col in 0..COLUMNS.len() as u16 {
        let width = match col {
            1 | 5 => WIDE_COLUMN_WIDTH,
            _ => DEFAULT_COLUMN_WIDTH,
        };
        sheet.set_column_width(col, width)?;
    }

    for row in 0..=rows.len() as u32 {
        sheet.set_row_height(row, DEFAULT_ROW_HEIGHT)?;
    }

    sheet.set_freeze_panes(1, 0)?;
    add_mandatory_validation(sheet, rows.len() as u32)?;

    Ok(())
}

/// Writes a single rule row
fn write_row(
    sheet: &mut Worksheet,
    row_idx: u32,
    row: &SpecRow,
    format: &Format,
) -> Result<(), XlsxError> {
    let mandatory = row.rule.is_some_and(|rule| rule.mandatory);
    let range = row
        .rule
        .and_then(|rule| rule.range)
        .map(|[min, max]| format!("{min}, {max}"))
        .unwrap_or(NOT_APPLICABLE.to_string());
    let vocabulary = row
        .rule
        .and_then(|rule| rule.vocabulary.as_ref())
        .map(|values| values.join(", "))
        .unwrap_or(NOT_APPLICABLE.to_string());

    let cells = [
        row.object.to_string(),
        row.path.join("."),
        if mandatory { "True" } else { "False" }.to_string(),
        range,
        vocabulary,
        row.description.to_string(),
    ];

    for (col, value) in cells.iter().enumerate() {
        sheet.write_string_with_format(row_idx, col as u16, value, format)?;
    }

    Ok(())
}

/// Restricts the mandatory column to True/False
fn add_mandatory_validation(sheet: &mut Worksheet, last_row: u32) -> Result<(), XlsxError> {
    if last_row == 0 {
        return Ok(());
    }

    let validation = DataValidation::new()
        .allow_list_strings(&["True", "False"])?
        .set_error_style(DataValidationErrorStyle::Stop)
        .set_error_title("Invalid input")?
        .set_error_message("Only True or False are allowed in this cell.")?;

    sheet.add_data_validation(1, 2, last_row, 2, &validation)?;
    Ok(())
}

/// Returns a format for non-header cells
fn get_non_header_format() -> Format {
    Format::new()
        .set_align(FormatAlign::VerticalCenter)
        .set_align(FormatAlign::Left)
        .set_border_left(FormatBorder::Thin)
        .set_border_left_color(BORDER_COLOR)
        .set_border_right(FormatBorder::Thin)
        .set_border_right_color(BORDER_COLOR)
        .set_border_top(FormatBorder::Thin)
        .set_border_top_color(BORDER_COLOR)
        .set_border_bottom(FormatBorder::Thin)
        .set_border_bottom_color(BORDER_COLOR)
}

/// Returns a format for header cells
fn get_header_format() -> Format {
    Format::new()
        .set_background_color(HEADER_BG_COLOR)
        .set_bold()
        .set_font_size(14f64)
        .set_border_left(FormatBorder::Thin)
        .set_border_left_color(BORDER_COLOR)
        .set_border_right(FormatBorder::Thin)
        .set_border_right_color(BORDER_COLOR)
        .set_border_top(FormatBorder::Thin)
        .set_border_top_color(BORDER_COLOR)
        .set_border_bottom(FormatBorder::Double)
        .set_border_bottom_color(BORDER_COLOR)
        .set_align(FormatAlign::VerticalCenter)
        .set_align(FormatAlign::Center)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_template() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.xlsx");

        // Act
        ValidationSpec::template().to_excel(&path).unwrap();

        // Assert
        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_write_empty_spec() {
        let spec = ValidationSpec::new();
        assert!(Workbook::try_from(&spec).is_ok());
    }
}
