use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: String,
    pub data_dir: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "TaskPrint API: image uploads, task list, thermal printing")]
pub struct Args {
    /// Host to bind to (overrides TASKPRINT_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides TASKPRINT_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where uploaded files are stored (overrides TASKPRINT_UPLOAD_DIR)
    #[arg(long)]
    pub upload_dir: Option<String>,

    /// Directory holding the task list document (overrides TASKPRINT_DATA_DIR)
    #[arg(long)]
    pub data_dir: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("TASKPRINT_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("TASKPRINT_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing TASKPRINT_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading TASKPRINT_PORT"),
        };
        let env_upload_dir = env::var("TASKPRINT_UPLOAD_DIR").unwrap_or_else(|_| "./uploads".into());
        let env_data_dir = env::var("TASKPRINT_DATA_DIR").unwrap_or_else(|_| "./data".into());

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            upload_dir: args.upload_dir.unwrap_or(env_upload_dir),
            data_dir: args.data_dir.unwrap_or(env_data_dir),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
