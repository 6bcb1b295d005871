use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use crate::error::{MbfError, Result};
use crate::output::{display_path, Printer};
use crate::parser::{parse_asc_file, ParseOptions};
use crate::validation::{print_diagnostics, print_summary, validate_document, ValidationResult};

/// Check ASC files for open, degenerate or unassigned contours
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Files to validate
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print diagnostics as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct FileReport<'a> {
    file: String,
    diagnostics: &'a ValidationResult,
}

/// Validate every file, stopping at the first one that cannot be parsed.
pub fn check_files(files: &[PathBuf]) -> Result<Vec<(PathBuf, ValidationResult)>> {
    files
        .iter()
        .map(|file| {
            let doc = parse_asc_file(file, &ParseOptions::default())?;
            Ok((file.clone(), validate_document(&doc)))
        })
        .collect()
}

pub fn run(args: ValidateArgs, _config: Option<&Path>) -> Result<()> {
    let printer = Printer::new();
    let reports = check_files(&args.files)?;

    let mut total = ValidationResult::new();
    for (file, result) in &reports {
        if result.is_ok() {
            printer.status("Checked", &display_path(file));
        } else {
            printer.warning("Checked", &display_path(file));
            print_diagnostics(&printer, result);
        }
        total.merge(result.clone());
    }

    if args.json {
        let json: Vec<FileReport> = reports
            .iter()
            .map(|(file, diagnostics)| FileReport {
                file: file.display().to_string(),
                diagnostics,
            })
            .collect();
        super::write_json(&json, None, false)?;
    }

    print_summary(&printer, &total);

    if total.has_errors() {
        return Err(MbfError::Build {
            message: format!("validation failed with {} error(s)", total.error_count()),
            help: Some("Contours with fewer than 3 points cannot be rasterized".to_string()),
        });
    }
    Ok(())
}
