use crate::commands::render::{render_candidate, render_failure, render_result, render_status};
use crate::error::AppError;
use crate::services::workflow::WorkflowController;
use std::io::Write;
use std::path::Path;

/// Stages `path`, submits it and prints the outcome.
pub async fn diagnose<W: Write>(
    controller: &WorkflowController,
    path: &Path,
    out: &mut W,
) -> Result<(), AppError> {
    if controller.open_image(path).await.is_ok() {
        if let Some(candidate) = controller.candidate() {
            writeln!(out, "{}", render_candidate(&candidate))?;
        }
        controller.submit().await;
    }

    report_outcome(controller, out)?;

    match controller.failure() {
        Some(failure) => Err(AppError {
            message: failure.message,
        }),
        None => Ok(()),
    }
}

/// Prints whatever outcome the controller currently exposes.
pub fn report_outcome<W: Write>(controller: &WorkflowController, out: &mut W) -> std::io::Result<()> {
    if let Some(status) = controller.connection_status() {
        writeln!(out, "{}", render_status(status))?;
    }

    if let Some(view) = controller.result() {
        write!(out, "{}", render_result(&view))?;
    } else if let Some(failure) = controller.failure() {
        writeln!(out, "{}", render_failure(&failure))?;
    }

    Ok(())
}
