use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::llm_client::DEFAULT_API_BASE;

const API_KEY_VAR: &str = "GOOGLE_API_KEY";
const DEFAULT_SECRETS_PATH: &str = ".secrets.toml";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if no model credential can be found.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub gemini_api_base: String,
    pub scratch_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

/// Secrets store file. Only the model credential is read from it.
#[derive(Debug, Default, Deserialize)]
struct Secrets {
    #[serde(rename = "GOOGLE_API_KEY")]
    google_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let secrets_path = std::env::var("SECRETS_PATH").unwrap_or_else(|_| DEFAULT_SECRETS_PATH.to_string());

        Ok(Config {
            google_api_key: resolve_api_key(std::env::var(API_KEY_VAR).ok(), Path::new(&secrets_path))?,
            gemini_api_base: std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            scratch_dir: std::env::var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a positive integer")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Environment value first, then the secrets file. A missing secrets file is not
/// an error; an unreadable or malformed one is.
fn resolve_api_key(env_value: Option<String>, secrets_path: &Path) -> Result<String> {
    if let Some(key) = env_value.filter(|k| !k.trim().is_empty()) {
        return Ok(key);
    }

    if secrets_path.exists() {
        let raw = std::fs::read_to_string(secrets_path)
            .with_context(|| format!("Failed to read secrets file {}", secrets_path.display()))?;
        let secrets: Secrets = toml::from_str(&raw)
            .with_context(|| format!("Secrets file {} is not valid TOML", secrets_path.display()))?;
        if let Some(key) = secrets.google_api_key.filter(|k| !k.trim().is_empty()) {
            return Ok(key);
        }
    }

    bail!(
        "'{API_KEY_VAR}' is not set in the environment or in {}",
        secrets_path.display()
    )
}
