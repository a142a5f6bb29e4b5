//! Command-line interface for the EnzymeML library
//!
//! This binary provides a CLI interface to interact with EnzymeML documents, including:
//! - Validating documents against a validation spec
//! - Generating validation spec templates
//! - Converting between JSON and SBML-flavored XML
//! - Displaying and consistency checking documents
//!
//! # Usage
//!
//! ```bash
//! # Validate a document against a spec (JSON or spreadsheet)
//! enzymeml validate --path document.json --spec spec.xlsx
//!
//! # Write a spec template to fill in
//! enzymeml template --output spec.xlsx
//!
//! # Convert a document to XML
//! enzymeml convert --input document.json --output document.xml
//! ```
//!
//! Log output is controlled through `RUST_LOG`, e.g. `RUST_LOG=debug`.

use std::{
    error::Error,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use colored::Colorize;
use enzymeml::{prelude::*, validation::schema::document_schema};

/// Main CLI configuration struct
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Validate an EnzymeML document against a validation spec
    Validate {
        /// Path to the EnzymeML document (JSON or XML)
        #[arg(short, long)]
        path: PathBuf,

        /// Path to the validation spec (JSON or spreadsheet)
        #[arg(short, long)]
        spec: PathBuf,

        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write a validation spec template marking every field mandatory
    Template {
        /// Output file; `.xlsx` writes a spreadsheet. Prints JSON if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert an EnzymeML document between JSON and XML
    Convert {
        /// Path to the input document
        #[arg(short, long)]
        input: PathBuf,

        /// Path to the output document. The format follows the extension
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Display the contents of an EnzymeML document
    Info {
        /// Path to the EnzymeML document (JSON or XML)
        #[arg(short, long)]
        path: PathBuf,
    },
    /// Check an EnzymeML document for dangling references and inconsistencies
    Check {
        /// Path to the EnzymeML document (JSON or XML)
        #[arg(short, long)]
        path: PathBuf,
    },
    /// Print the JSON schema of EnzymeML documents
    Schema {
        /// Output file. Prints to stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Main entry point for the CLI application
pub fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(&cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{} {}", "Error:".bold().red(), error);
            ExitCode::FAILURE
        }
    }
}

/// Runs a command. Returns whether the inspected document passed its checks.
fn run(command: &Commands) -> Result<bool, Box<dyn Error>> {
    match command {
        Commands::Validate { path, spec, json } => {
            let enzmldoc = read_document(path)?;
            let spec = read_spec(spec)?;
            let outcome = Validator::new(&spec).validate(&enzmldoc);

            if *json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else if outcome.is_valid {
                println!("{}", "Document is valid".bold().green());
            } else {
                print!("{}", outcome.report);
                println!("{}", "Document is invalid".bold().red());
            }

            Ok(outcome.is_valid)
        }
        Commands::Template { output } => {
            let template = ValidationSpec::template();
            match output {
                Some(path) if has_extension(path, &["xlsx"]) => write_spec_sheet(&template, path)?,
                Some(path) => std::fs::write(path, template.to_json()?)?,
                None => println!("{}", template.to_json()?),
            }
            Ok(true)
        }
        Commands::Convert { input, output } => {
            let enzmldoc = read_document(input)?;
            write_document(&enzmldoc, output)?;
            println!(
                "Converted {} to {}",
                input.display(),
                output.display().to_string().bold()
            );
            Ok(true)
        }
        Commands::Info { path } => {
            let enzmldoc = read_document(path)?;
            println!("{enzmldoc}");
            Ok(true)
        }
        Commands::Check { path } => {
            let enzmldoc = read_document(path)?;
            let report = check_consistency(&enzmldoc);

            print!("{report}");
            let summary = format!(
                "{} errors, {} warnings, {} infos",
                report.count(Severity::Error),
                report.count(Severity::Warning),
                report.count(Severity::Info)
            );

            if report.is_valid {
                println!("{}", summary.bold().green());
            } else {
                println!("{}", summary.bold().red());
            }

            Ok(report.is_valid)
        }
        Commands::Schema { output } => {
            let schema = serde_json::to_string_pretty(&document_schema()?)?;
            match output {
                Some(path) => std::fs::write(path, schema)?,
                None => println!("{schema}"),
            }
            Ok(true)
        }
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.contains(&ext.to_lowercase().as_str()))
}

fn read_document(path: &Path) -> Result<EnzymeMLDocument, Box<dyn Error>> {
    if has_extension(path, &["xml", "sbml"]) {
        return read_xml(path);
    }
    Ok(load_enzmldoc(path)?)
}

fn write_document(enzmldoc: &EnzymeMLDocument, path: &Path) -> Result<(), Box<dyn Error>> {
    if has_extension(path, &["xml", "sbml"]) {
        return write_xml(enzmldoc, path);
    }
    Ok(save_enzmldoc(path, enzmldoc)?)
}

fn read_spec(path: &Path) -> Result<ValidationSpec, Box<dyn Error>> {
    if has_extension(path, &["xlsx", "xls", "ods"]) {
        return read_spec_sheet(path);
    }
    Ok(ValidationSpec::from_file(path)?)
}

#[cfg(feature = "sbml")]
fn read_xml(path: &Path) -> Result<EnzymeMLDocument, Box<dyn Error>> {
    Ok(read_sbml(path)?)
}

#[cfg(not(feature = "sbml"))]
fn read_xml(_path: &Path) -> Result<EnzymeMLDocument, Box<dyn Error>> {
    Err("XML support requires the 'sbml' feature".into())
}

#[cfg(feature = "sbml")]
fn write_xml(enzmldoc: &EnzymeMLDocument, path: &Path) -> Result<(), Box<dyn Error>> {
    Ok(write_sbml(enzmldoc, path)?)
}

#[cfg(not(feature = "sbml"))]
fn write_xml(_enzmldoc: &EnzymeMLDocument, _path: &Path) -> Result<(), Box<dyn Error>> {
    Err("XML support requires the 'sbml' feature".into())
}

#[cfg(feature = "tabular")]
fn read_spec_sheet(path: &Path) -> Result<ValidationSpec, Box<dyn Error>> {
    Ok(ValidationSpec::from_excel(path)?)
}

#[cfg(not(feature = "tabular"))]
fn read_spec_sheet(_path: &Path) -> Result<ValidationSpec, Box<dyn Error>> {
    Err("Spreadsheet support requires the 'tabular' feature".into())
}

#[cfg(feature = "tabular")]
fn write_spec_sheet(spec: &ValidationSpec, path: &Path) -> Result<(), Box<dyn Error>> {
    Ok(spec.to_excel(path)?)
}

#[cfg(not(feature = "tabular"))]
fn write_spec_sheet(_spec: &ValidationSpec, _path: &Path) -> Result<(), Box<dyn Error>> {
    Err("Spreadsheet support requires the 'tabular' feature".into())
}
