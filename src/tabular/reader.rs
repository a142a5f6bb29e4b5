use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use super::writer::{spreadsheet_error, NOT_APPLICABLE, SHEET_NAME};
use crate::validation::error::ValidationError;
use crate::validation::spec::{FieldRule, ValidationSpec};

/// Placeholder texts of untouched template cells
const PLACEHOLDERS: [&str; 3] = [
    NOT_APPLICABLE,
    "Enter Min to Max value",
    "Enter a set of allowed names/values",
];

impl ValidationSpec {
    /// Reads a validation spec from a spreadsheet.
    ///
    /// The rules are taken from the `validation` sheet, or from the first sheet if there is
    /// none by that name. Only the `Field`, `Mandatory`, `Value Range` and
    /// `Controlled Vocabulary` columns are read. Rows that are not mandatory and carry
    /// neither a range nor a vocabulary produce no rule.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the Excel file.
    ///
    /// # Returns
    ///
    /// Returns the spec, or `ValidationError::Spreadsheet` if the file cannot be read and
    /// `ValidationError::MalformedSpec` if a row names an unknown field or an invalid rule.
    pub fn from_excel(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let mut workbook = open_workbook_auto(path.as_ref()).map_err(spreadsheet_error)?;

        let sheet_names = workbook.sheet_names();
        let sheet = sheet_names
            .iter()
            .find(|name| name.as_str() == SHEET_NAME)
            .or(sheet_names.first())
            .cloned()
            .ok_or_else(|| spreadsheet_error("workbook has no sheets"))?;

        let range = workbook.worksheet_range(&sheet).map_err(spreadsheet_error)?;

        let spec = parse_rules(&range)?;
        log::debug!("Read validation spec from sheet '{sheet}'");
        Ok(spec)
    }
}

/// Converts the rows of a rule sheet into a spec.
fn parse_rules(range: &Range<Data>) -> Result<ValidationSpec, ValidationError> {
    let mut rows = range.rows();

    let header_mapping: HashMap<String, usize> = rows
        .next()
        .ok_or_else(|| spreadsheet_error("no headers found"))?
        .iter()
        .enumerate()
        .map(|(i, cell)| (cell_text(cell), i))
        .collect();

    let column = |name: &str| {
        header_mapping
            .get(name)
            .copied()
            .ok_or_else(|| spreadsheet_error(format!("missing column '{name}'")))
    };

    let field_col = column("Field")?;
    let mandatory_col = column("Mandatory")?;
    let range_col = column("Value Range")?;
    let vocabulary_col = column("Controlled Vocabulary")?;

    let mut spec = ValidationSpec::new();

    for row in rows {
        let cell = |col: usize| row.get(col).map(cell_text).unwrap_or_default();

        let field = cell(field_col);
        if field.is_empty() {
            continue;
        }

        let path = field.split('.').map(str::trim).collect::<Vec<_>>();
        let owned = path.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let mandatory = parse_bool(&cell(mandatory_col)).ok_or_else(|| {
            ValidationError::malformed(&owned, "'Mandatory' must be True or False")
        })?;
        let value_range = parse_range(&cell(range_col))
            .map_err(|reason| ValidationError::malformed(&owned, reason))?;
        let vocabulary = parse_vocabulary(&cell(vocabulary_col));

        if !mandatory && value_range.is_none() && vocabulary.is_none() {
            continue;
        }

        let rule = FieldRule {
            mandatory,
            range: value_range,
            vocabulary,
        };

        spec.set_rule(&path, rule)?;
    }

    Ok(spec)
}

/// Text content of a cell. Whole numbers are written without a fraction.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.trim().to_string(),
        Data::Bool(value) => if *value { "True" } else { "False" }.to_string(),
        Data::Float(value) if value.fract() == 0.0 => format!("{}", *value as i64),
        other => other.to_string(),
    }
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty() || PLACEHOLDERS.contains(&value)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" | "" => Some(false),
        _ => None,
    }
}

/// Parses `min, max` (or `min to max`) into a closed interval.
fn parse_range(value: &str) -> Result<Option<[f64; 2]>, String> {
    if is_placeholder(value) {
        return Ok(None);
    }

    let bounds = value
        .split([',', ';'])
        .flat_map(|part| part.split(" to "))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| format!("invalid value range '{value}'"))?;

    match bounds.as_slice() {
        [min, max] => Ok(Some([*min, *max])),
        _ => Err(format!("value range '{value}' needs a minimum and a maximum")),
    }
}

fn parse_vocabulary(value: &str) -> Option<Vec<String>> {
    if is_placeholder(value) {
        return None;
    }

    let values = value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect::<Vec<_>>();

    (!values.is_empty()).then_some(values)
}
