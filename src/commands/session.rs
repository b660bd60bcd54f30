use crate::commands::confirm;
use crate::commands::diagnose::report_outcome;
use crate::commands::history::{clear_history, show_history};
use crate::commands::render::{render_candidate, render_status, EXIT_PROMPT, FAREWELL, NO_IMAGE_MESSAGE};
use crate::error::AppError;
use crate::services::workflow::{SubmitStatus, WorkflowController};
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const HELP: &str = "\
Comandos:
  open <ruta>   seleccionar una imagen
  analyze       analizar la imagen seleccionada
  continue      analizar otra imagen
  history       ver el historial
  clear         limpiar el historial
  status        estado actual
  exit          salir";

/// Line-driven front end: each input line is one user action.
pub async fn run_session<R, W>(
    controller: &WorkflowController,
    input: R,
    out: &mut W,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(out, "{}", HELP)?;

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        match command {
            "" => continue,
            "open" | "abrir" => {
                if arg.is_empty() {
                    writeln!(out, "Uso: open <ruta>")?;
                    continue;
                }
                match controller.open_image(Path::new(arg)).await {
                    Ok(()) => {
                        if let Some(candidate) = controller.candidate() {
                            writeln!(out, "{}", render_candidate(&candidate))?;
                        }
                    }
                    Err(_) => report_outcome(controller, out)?,
                }
            }
            "analyze" | "analizar" => match controller.submit().await {
                SubmitStatus::NothingStaged => writeln!(out, "{}", NO_IMAGE_MESSAGE)?,
                SubmitStatus::Busy => writeln!(out, "Ya hay un análisis en curso.")?,
                SubmitStatus::Superseded => {
                    writeln!(out, "El análisis anterior se descartó por una imagen nueva.")?
                }
                SubmitStatus::Resolved => {
                    report_outcome(controller, out)?;
                    writeln!(out, "Escribe 'continue' para analizar otra imagen o 'exit' para salir.")?;
                }
            },
            "continue" | "continuar" => {
                if controller.continue_analysis() {
                    writeln!(out, "Listo para una nueva imagen.")?;
                } else {
                    writeln!(out, "No hay un resultado que cerrar.")?;
                }
            }
            "history" | "historial" => show_history(controller, out)?,
            "clear" | "limpiar" => {
                clear_history(controller, false, &mut lines, out).await?;
            }
            "status" | "estado" => {
                writeln!(out, "Estado: {:?}", controller.phase())?;
                if let Some(status) = controller.connection_status() {
                    writeln!(out, "{}", render_status(status))?;
                }
            }
            "exit" | "salir" => {
                if confirm(EXIT_PROMPT, &mut lines, out).await? {
                    writeln!(out, "{}", FAREWELL)?;
                    break;
                }
            }
            "help" | "ayuda" => writeln!(out, "{}", HELP)?,
            other => writeln!(out, "Comando desconocido: {} (escribe 'help')", other)?,
        }
    }

    Ok(())
}
