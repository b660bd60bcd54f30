use crate::models::diagnosis_types::{Failure, FailureKind};
use crate::models::history_types::HistoryRecord;
use crate::models::intake_types::ImageCandidate;
use crate::services::workflow::{ConnectionStatus, ResultView};
use std::fmt::Write;

pub const NO_IMAGE_MESSAGE: &str = "Por favor selecciona una imagen primero.";
pub const EMPTY_HISTORY_MESSAGE: &str = "No hay predicciones aún";
pub const CLEAR_HISTORY_PROMPT: &str = "¿Estás seguro de que deseas limpiar todo el historial?";
pub const EXIT_PROMPT: &str = "¿Estás seguro de que deseas salir de la aplicación?";
pub const FAREWELL: &str = "🌽 ¡Gracias por usar Corn Disease AI!\nEsperamos haberte ayudado con el diagnóstico de tus cultivos";

pub fn render_candidate(candidate: &ImageCandidate) -> String {
    format!(
        "Imagen lista: {} ({}, {} bytes)",
        candidate.display_file_name(),
        candidate.media_type(),
        candidate.size()
    )
}

pub fn render_result(view: &ResultView) -> String {
    let class = &view.result.predicted_class;
    let mut out = String::new();

    let _ = writeln!(out, "Diagnóstico: {} {}", class.icon(), class.display_name());
    let _ = writeln!(out, "Confianza: {}", view.result.confidence);
    let _ = writeln!(out, "Análisis Detallado");

    for entry in &view.ranking {
        let marker = if entry.is_top { "▶" } else { " " };
        let _ = writeln!(
            out,
            "{} {} {:<12} {:>8}",
            marker,
            entry.class().icon(),
            entry.display_name,
            entry.percentage_text
        );
    }

    out
}

pub fn render_failure(failure: &Failure) -> String {
    match failure.kind {
        FailureKind::NotAnImage => {
            "Por favor selecciona un archivo de imagen válido (JPG, PNG, JPEG).".to_string()
        }
        FailureKind::ConnectionError => {
            "Error de conexión: No se pudo conectar con el servidor. Verifique su conexión a internet."
                .to_string()
        }
        _ => format!("Error: {}", failure.message),
    }
}

pub fn render_history(records: &[HistoryRecord]) -> String {
    if records.is_empty() {
        return EMPTY_HISTORY_MESSAGE.to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Historial ({})", records.len());
    for record in records {
        let _ = writeln!(
            out,
            "{} {:<12} {:>8}  {}  {}",
            record.icon(),
            record.diagnosis,
            record.confidence,
            record.timestamp,
            record.file_name
        );
    }
    out
}

pub fn render_status(status: ConnectionStatus) -> String {
    format!("[{:?}] {}", status, status.message())
}
