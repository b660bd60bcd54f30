pub mod diagnose;
pub mod history;
pub mod render;
pub mod session;

use crate::config::ConfigOverrides;
use crate::error::AppError;
use clap::{ArgAction, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, Lines};

#[derive(Parser, Debug)]
#[command(name = "corn-doctor", version, about = "Diagnose corn leaf diseases from a photo")]
pub struct Cli {
    /// Config file (default: <config dir>/corn-doctor/config.toml)
    #[arg(long, global = true, env = "CORN_DOCTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Classification endpoint URL
    #[arg(long, global = true, env = "CORN_DOCTOR_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds, 0 to wait forever
    #[arg(long, global = true, env = "CORN_DOCTOR_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Number of history records kept, 0 for no limit
    #[arg(long, global = true, env = "CORN_DOCTOR_HISTORY_LIMIT")]
    pub history_limit: Option<usize>,

    /// Report service connection status alongside results
    #[arg(long, global = true, env = "CORN_DOCTOR_SHOW_STATUS", action = ArgAction::SetTrue)]
    pub show_status: bool,

    /// Folder holding the history database
    #[arg(long, global = true, env = "CORN_DOCTOR_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Keep history in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Diagnose one image and exit
    Diagnose { path: PathBuf },
    /// Print the diagnosis history
    History,
    /// Delete the whole diagnosis history
    ClearHistory {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Interactive session (default)
    Session,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            endpoint: self.endpoint.clone(),
            request_timeout_secs: self.timeout_secs,
            history_limit: self.history_limit,
            show_connection_status: self.show_status.then_some(true),
            data_dir: self.data_dir.clone(),
        }
    }
}

/// Asks a yes/no question on the session input. Anything but yes is a no.
pub async fn confirm<R, W>(prompt: &str, input: &mut Lines<R>, out: &mut W) -> Result<bool, AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{} [s/N] ", prompt)?;
    out.flush()?;

    let answer = input.next_line().await?.unwrap_or_default();
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "si" | "sí" | "y" | "yes"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncBufReadExt;

    #[test]
    fn test_cli_parses_diagnose() {
        let cli = Cli::try_parse_from([
            "corn-doctor",
            "--endpoint",
            "http://localhost:9000/predict",
            "diagnose",
            "leaf.jpg",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Command::Diagnose { .. })));
        assert_eq!(
            cli.overrides().endpoint.as_deref(),
            Some("http://localhost:9000/predict")
        );
    }

    #[test]
    fn test_show_status_flag_without_value() {
        let cli = Cli::try_parse_from(["corn-doctor", "--show-status", "history"]).unwrap();
        assert!(cli.show_status);
        assert!(matches!(cli.command, Some(Command::History)));
        assert_eq!(cli.overrides().show_connection_status, Some(true));
    }

    #[test]
    fn test_show_status_before_diagnose_path() {
        let cli =
            Cli::try_parse_from(["corn-doctor", "--show-status", "diagnose", "leaf.jpg"]).unwrap();
        assert!(cli.show_status);
        match cli.command {
            Some(Command::Diagnose { path }) => assert_eq!(path, PathBuf::from("leaf.jpg")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_show_status_absent_leaves_config_alone() {
        let cli = Cli::try_parse_from(["corn-doctor", "history"]).unwrap();
        assert_eq!(cli.overrides().show_connection_status, None);
    }

    #[tokio::test]
    async fn test_confirm() {
        let mut out = Vec::new();
        let mut yes = b"si\n".as_slice().lines();
        assert!(confirm("¿Seguro?", &mut yes, &mut out).await.unwrap());

        let mut no = b"\n".as_slice().lines();
        assert!(!confirm("¿Seguro?", &mut no, &mut out).await.unwrap());

        let mut eof = b"".as_slice().lines();
        assert!(!confirm("¿Seguro?", &mut eof, &mut out).await.unwrap());
    }
}
