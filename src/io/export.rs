//! Export a finished submission to a JSON file.
//!
//! The file holds the prediction (including the raw service body and the
//! submitted input) and the attempt log.

use std::fs::File;
use std::path::Path;

use crate::domain::Submission;
use crate::error::{AppError, EXIT_IO};

/// Write the submission as pretty JSON.
pub fn write_submission_json(path: &Path, submission: &Submission) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            EXIT_IO,
            format!("Failed to create export JSON '{}': {e}", path.display()),
        )
    })?;

    serde_json::to_writer_pretty(file, submission)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to write export JSON: {e}")))?;

    Ok(())
}
