use crate::commands::confirm;
use crate::commands::render::{render_history, CLEAR_HISTORY_PROMPT};
use crate::error::AppError;
use crate::services::workflow::WorkflowController;
use std::io::Write;
use tokio::io::{AsyncBufRead, Lines};

pub fn show_history<W: Write>(controller: &WorkflowController, out: &mut W) -> Result<(), AppError> {
    writeln!(out, "{}", render_history(&controller.history()))?;
    Ok(())
}

/// Clears history once the user agrees. Returns whether it was cleared.
pub async fn clear_history<R, W>(
    controller: &WorkflowController,
    already_confirmed: bool,
    input: &mut Lines<R>,
    out: &mut W,
) -> Result<bool, AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if !already_confirmed && !confirm(CLEAR_HISTORY_PROMPT, input, out).await? {
        writeln!(out, "Historial conservado.")?;
        return Ok(false);
    }

    controller.clear_history();
    writeln!(out, "Historial eliminado.")?;
    Ok(true)
}
