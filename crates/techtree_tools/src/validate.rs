//! Data validation utilities.

use std::path::Path;

use tracing::{error, info};

use crate::loader::{load_data_directory, LoadError, LoadReport, LoaderConfig};

/// Validate all RON data files in a directory.
///
/// Loads everything, skipping failed entries, and returns the report. The
/// directory is valid if [`LoadReport::is_clean`] holds.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn validate_data_directory(path: &Path) -> Result<LoadReport, LoadError> {
    let (_, report) = load_data_directory(LoaderConfig::new(path))?;

    for failure in &report.failures {
        error!(
            file = %failure.source_file,
            entry = %failure.entry,
            "{}",
            failure.message
        );
    }
    for problem in &report.problems {
        error!("{problem}");
    }
    info!(
        mods = report.mods.len(),
        entity_types = report.entity_types.len(),
        recipes = report.recipes.len(),
        failures = report.failures.len(),
        problems = report.problems.len(),
        "Validation finished"
    );
    Ok(report)
}
