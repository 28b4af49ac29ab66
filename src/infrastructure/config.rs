use crate::infrastructure::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const REMOTE_JSON: &str = "remote.json";
const SUPPORTED_SCHEMA: u64 = 1;

fn default_projects_table() -> String {
    "projects".to_string()
}

fn default_tasks_table() -> String {
    "tasks1".to_string()
}

fn default_entries_table() -> String {
    "time_entries".to_string()
}

/// Connection settings for the remote store endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteConfig {
    pub schema: u8,
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_projects_table")]
    pub projects_table: String,
    #[serde(default = "default_tasks_table")]
    pub tasks_table: String,
    #[serde(default = "default_entries_table")]
    pub entries_table: String,
}

pub fn ensure_default_config(config_dir: &Path) -> Result<(), CoreError> {
    let path = config_dir.join(REMOTE_JSON);
    if !path.exists() {
        let value = serde_json::json!({
            "schema": 1,
            "baseUrl": "http://127.0.0.1:54321/rest/v1",
            "apiKey": "",
        });
        let formatted = serde_json::to_string_pretty(&value)?;
        fs::write(path, format!("{formatted}\n"))?;
    }
    Ok(())
}

pub fn load_remote_config(config_dir: &Path) -> Result<RemoteConfig, CoreError> {
    let path = config_dir.join(REMOTE_JSON);
    let raw = fs::read_to_string(&path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| CoreError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != SUPPORTED_SCHEMA {
        return Err(CoreError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }

    let base_url = read_string(&parsed, "baseUrl", &path)?;
    let api_key = read_string(&parsed, "apiKey", &path)?;
    Ok(RemoteConfig {
        schema: schema as u8,
        base_url,
        api_key,
        projects_table: read_string_or(&parsed, "projectsTable", default_projects_table()),
        tasks_table: read_string_or(&parsed, "tasksTable", default_tasks_table()),
        entries_table: read_string_or(&parsed, "entriesTable", default_entries_table()),
    })
}

fn read_string(value: &serde_json::Value, key: &str, path: &Path) -> Result<String, CoreError> {
    value
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .map(ToOwned::to_owned)
        .ok_or_else(|| CoreError::InvalidConfig(format!("missing {key} in {}", path.display())))
}

fn read_string_or(value: &serde_json::Value, key: &str, fallback: String) -> String {
    value
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "timetally-config-{label}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn ensure_then_load_roundtrips_defaults() {
        let dir = scratch_dir("defaults");
        ensure_default_config(&dir).expect("write default config");
        let config = load_remote_config(&dir).expect("load config");
        assert_eq!(config.schema, 1);
        assert_eq!(config.projects_table, "projects");
        assert_eq!(config.tasks_table, "tasks1");
        assert_eq!(config.entries_table, "time_entries");
    }

    #[test]
    fn unsupported_schema_is_rejected() {
        let dir = scratch_dir("schema");
        fs::write(
            dir.join(REMOTE_JSON),
            r#"{"schema": 2, "baseUrl": "http://x", "apiKey": "k"}"#,
        )
        .expect("write config");
        assert!(matches!(
            load_remote_config(&dir),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn table_overrides_are_honored() {
        let dir = scratch_dir("tables");
        fs::write(
            dir.join(REMOTE_JSON),
            r#"{"schema": 1, "baseUrl": "http://x", "apiKey": "k", "tasksTable": "tasks"}"#,
        )
        .expect("write config");
        let config = load_remote_config(&dir).expect("load config");
        assert_eq!(config.tasks_table, "tasks");
        assert_eq!(config.entries_table, "time_entries");
    }
}
