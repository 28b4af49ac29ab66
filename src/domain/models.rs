use crate::infrastructure::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// A persisted time interval. `end_time` is `None` only for rows written by a
/// still-running timer; aggregation treats such rows as zero duration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeEntry {
    pub id: String,
    pub project_id: String,
    pub task_id: Option<String>,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TimeEntry {
    pub fn is_closed(&self) -> bool {
        self.end_time.is_some()
    }
}

/// Boundary input for creating an entry when a timer is stopped. Start and
/// end arrive as the raw strings produced by date inputs; `validate` parses
/// them before any state mutation, local or remote.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub project_id: String,
    pub project_name: String,
    pub task_id: Option<String>,
    pub task_name: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftFields {
    pub project_id: String,
    pub task_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub description: Option<String>,
}

impl EntryDraft {
    pub fn validate(&self) -> Result<DraftFields, CoreError> {
        validate_non_empty(&self.project_id, "entry.project_id")?;
        let start_time = parse_instant(&self.start_time, "entry.start_time")?;
        let end_time = parse_instant(&self.end_time, "entry.end_time")?;
        Ok(DraftFields {
            project_id: self.project_id.clone(),
            task_id: normalize_optional(self.task_id.as_deref()),
            start_time,
            end_time,
            description: normalize_optional(self.description.as_deref()),
        })
    }
}

/// Boundary input for editing an existing entry.
#[derive(Debug, Clone)]
pub struct EntryUpdate {
    pub start_time: String,
    pub end_time: String,
    pub description: Option<String>,
}

/// Validated update payload as sent to the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryChange {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub description: Option<String>,
}

impl EntryUpdate {
    pub fn validate(&self) -> Result<EntryChange, CoreError> {
        let start_time = parse_instant(&self.start_time, "entry.start_time")?;
        let end_time = parse_instant(&self.end_time, "entry.end_time")?;
        Ok(EntryChange {
            start_time,
            end_time,
            description: normalize_optional(self.description.as_deref()),
        })
    }
}

impl EntryChange {
    /// Whole seconds persisted in the remote `duration` column.
    pub fn duration_seconds(&self) -> i64 {
        ((self.end_time - self.start_time).num_milliseconds() / 1000).max(0)
    }
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!(
            "{field_name} must not be empty"
        )));
    }
    Ok(())
}

fn parse_instant(value: &str, field_name: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| {
            CoreError::Validation(format!("{field_name} must be RFC 3339: {error}"))
        })
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_draft() -> EntryDraft {
        EntryDraft {
            project_id: "prj-1".to_string(),
            project_name: "Website".to_string(),
            task_id: Some("tsk-1".to_string()),
            task_name: Some("Navigation".to_string()),
            start_time: "2026-02-16T09:00:00Z".to_string(),
            end_time: "2026-02-16T10:30:00Z".to_string(),
            description: Some("  header rework  ".to_string()),
        }
    }

    #[test]
    fn draft_validate_parses_and_normalizes() {
        let fields = sample_draft().validate().expect("valid draft");
        assert_eq!(fields.project_id, "prj-1");
        assert_eq!(fields.description.as_deref(), Some("header rework"));
        assert_eq!((fields.end_time - fields.start_time).num_minutes(), 90);
    }

    #[test]
    fn draft_validate_rejects_missing_selection() {
        let mut draft = sample_draft();
        draft.project_id = "   ".to_string();
        assert!(matches!(draft.validate(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn draft_validate_rejects_unparseable_dates() {
        let mut draft = sample_draft();
        draft.end_time = "yesterday-ish".to_string();
        assert!(matches!(draft.validate(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn update_validate_blank_description_becomes_none() {
        let update = EntryUpdate {
            start_time: "2026-02-16T09:00:00Z".to_string(),
            end_time: "2026-02-16T09:05:00Z".to_string(),
            description: Some("   ".to_string()),
        };
        let change = update.validate().expect("valid update");
        assert_eq!(change.description, None);
        assert_eq!(change.duration_seconds(), 300);
    }

    #[test]
    fn change_duration_seconds_clamps_reversed_range() {
        let change = EntryChange {
            start_time: "2026-02-16T10:00:00Z".parse().expect("valid datetime"),
            end_time: "2026-02-16T09:00:00Z".parse().expect("valid datetime"),
            description: None,
        };
        assert_eq!(change.duration_seconds(), 0);
    }

    #[test]
    fn records_support_serde_roundtrip() {
        let entry = TimeEntry {
            id: "ent-1".to_string(),
            project_id: "prj-1".to_string(),
            task_id: None,
            user_id: "usr-1".to_string(),
            start_time: "2026-02-16T09:00:00Z".parse().expect("valid datetime"),
            end_time: Some("2026-02-16T09:30:00Z".parse().expect("valid datetime")),
            description: None,
            created_at: "2026-02-16T09:30:01Z".parse().expect("valid datetime"),
        };
        let roundtrip: TimeEntry =
            serde_json::from_str(&serde_json::to_string(&entry).expect("serialize entry"))
                .expect("deserialize entry");
        assert_eq!(roundtrip, entry);
        assert!(roundtrip.is_closed());
    }
}
