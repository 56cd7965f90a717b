//! Configuration types.
//!
//! Everything is resolved once at startup from the environment and carried in
//! an explicit [`AppConfig`] — no module-level state.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ConfigError;

/// Default system prompt for the AI annotator, used when no prompt file is
/// present.
pub const DEFAULT_ANNOTATOR_PROMPT: &str = "Process the user input into a todo item.";

/// Service configuration, built once in `main` and passed into components.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Path of the local database file.
    pub db_path: PathBuf,
    /// Sanitized deployment identifier scoping this instance's rows.
    pub deployment_id: String,
    /// Path of the annotator system prompt file.
    pub prompt_path: PathBuf,
    /// Runtime settings handed to the browser client via `/api/config`.
    pub runtime: RuntimeConfig,
}

/// Settings the SPA fetches at runtime (identity provider + site URLs).
///
/// Serialized field names match what the client expects.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub site_url: Option<String>,
    pub deploy_url: Option<String>,
}

impl AppConfig {
    /// Build configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                message: format!("'{raw}' is not a valid port number"),
            })?,
            Err(_) => 3000,
        };

        let db_path = std::env::var("TODO_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/todo-assist.db"));

        let prompt_path = std::env::var("TODO_PROMPT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./prompt.txt"));

        let site_url = std::env::var("SITE_URL").ok();
        let runtime = RuntimeConfig {
            supabase_url: std::env::var("SUPABASE_URL").ok(),
            supabase_anon_key: std::env::var("SUPABASE_ANON_KEY").ok(),
            site_url: site_url
                .clone()
                .or_else(|| Some("http://localhost:3000".to_string())),
            deploy_url: site_url,
        };

        Ok(Self {
            port,
            db_path,
            deployment_id: deployment_id_from_env(),
            prompt_path,
            runtime,
        })
    }
}

/// Resolve the deployment identifier for this process.
///
/// Uses `TODO_DEPLOYMENT_ID` when set, otherwise the basename of the current
/// working directory (one physical database is shared by many deployed copies
/// of the app, disambiguated by this value). The result is always sanitized.
pub fn deployment_id_from_env() -> String {
    let raw = std::env::var("TODO_DEPLOYMENT_ID").unwrap_or_else(|_| {
        std::env::current_dir()
            .ok()
            .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default()
    });
    sanitize_deployment_id(&raw)
}

/// Sanitize a raw deployment identifier: strip everything outside
/// `[a-zA-Z0-9_]` and lowercase. Falls back to `"default"` if nothing
/// survives.
pub fn sanitize_deployment_id(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase();

    if cleaned.is_empty() {
        "default".to_string()
    } else {
        cleaned
    }
}

/// Load the annotator system prompt from a file, trimmed.
///
/// Falls back to [`DEFAULT_ANNOTATOR_PROMPT`] when the file is absent,
/// unreadable, or blank.
pub fn load_system_prompt(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let trimmed = contents.trim();
            if trimmed.is_empty() {
                tracing::info!(path = %path.display(), "Prompt file empty, using default prompt");
                DEFAULT_ANNOTATOR_PROMPT.to_string()
            } else {
                trimmed.to_string()
            }
        }
        Err(_) => {
            tracing::info!(path = %path.display(), "Using default prompt");
            DEFAULT_ANNOTATOR_PROMPT.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_lowercases_and_strips() {
        assert_eq!(sanitize_deployment_id("My-App.2024"), "myapp2024");
        assert_eq!(sanitize_deployment_id("todo_service"), "todo_service");
        assert_eq!(sanitize_deployment_id("Héllo wörld!"), "hllowrld");
    }

    #[test]
    fn sanitize_keeps_underscores_and_digits() {
        assert_eq!(sanitize_deployment_id("a_b_9"), "a_b_9");
    }

    #[test]
    fn sanitize_empty_falls_back_to_default() {
        assert_eq!(sanitize_deployment_id(""), "default");
        assert_eq!(sanitize_deployment_id("---...---"), "default");
    }

    #[test]
    fn prompt_missing_file_uses_default() {
        let prompt = load_system_prompt(Path::new("/nonexistent/prompt.txt"));
        assert_eq!(prompt, DEFAULT_ANNOTATOR_PROMPT);
    }

    #[test]
    fn prompt_file_contents_are_trimmed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("prompt.txt");
        std::fs::write(&path, "  Turn input into a short task.\n\n").unwrap();
        assert_eq!(load_system_prompt(&path), "Turn input into a short task.");
    }

    #[test]
    fn prompt_blank_file_uses_default() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("prompt.txt");
        std::fs::write(&path, "   \n").unwrap();
        assert_eq!(load_system_prompt(&path), DEFAULT_ANNOTATOR_PROMPT);
    }

    #[test]
    fn runtime_config_serializes_camel_case() {
        let runtime = RuntimeConfig {
            supabase_url: Some("https://x.supabase.co".to_string()),
            supabase_anon_key: Some("anon".to_string()),
            site_url: Some("http://localhost:3000".to_string()),
            deploy_url: None,
        };
        let value = serde_json::to_value(&runtime).unwrap();
        assert_eq!(value["supabaseUrl"], "https://x.supabase.co");
        assert_eq!(value["supabaseAnonKey"], "anon");
        assert_eq!(value["siteUrl"], "http://localhost:3000");
        assert!(value["deployUrl"].is_null());
    }
}
