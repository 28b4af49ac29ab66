use crate::domain::models::{EntryChange, Project, Task, TimeEntry};
use crate::infrastructure::config::RemoteConfig;
use crate::infrastructure::error::CoreError;
use crate::infrastructure::remote_store::RemoteStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use url::Url;

const PREFER_REPRESENTATION: &str = "return=representation";

/// RemoteStore implementation speaking a PostgREST-style REST dialect:
/// table endpoints with `column=op.value` filter parameters, `order=` for
/// sorting, and `Prefer: return=representation` so mutations report the rows
/// they touched. A zero-row update or delete under the user scope is reported
/// as `AccessDenied` because the dialect does not distinguish a missing row
/// from a row the policy hides.
#[derive(Debug, Clone)]
pub struct PostgrestRemoteStore {
    client: Client,
    base_url: Url,
    api_key: String,
    projects_table: String,
    tasks_table: String,
    entries_table: String,
}

#[derive(Debug, serde::Serialize)]
struct InsertEntryRequest<'a> {
    project_id: &'a str,
    task_id: Option<&'a str>,
    user_id: &'a str,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    duration: String,
    description: Option<&'a str>,
}

#[derive(Debug, serde::Serialize)]
struct UpdateEntryRequest<'a> {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    duration: String,
    description: Option<&'a str>,
}

impl PostgrestRemoteStore {
    pub fn new(config: &RemoteConfig) -> Result<Self, CoreError> {
        let base_url = Url::parse(&config.base_url).map_err(|error| {
            CoreError::InvalidConfig(format!("invalid remote base url '{}': {error}", config.base_url))
        })?;
        Ok(Self {
            client: Client::new(),
            base_url,
            api_key: config.api_key.clone(),
            projects_table: config.projects_table.clone(),
            tasks_table: config.tasks_table.clone(),
            entries_table: config.entries_table.clone(),
        })
    }

    fn table_endpoint(&self, table: &str) -> Result<Url, CoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                CoreError::InvalidConfig("remote base URL cannot be a base".to_string())
            })?;
            segments.push(table);
        }
        Ok(url)
    }

    fn in_filter(ids: &[String]) -> String {
        format!("in.({})", ids.join(","))
    }

    fn eq_filter(value: &str) -> String {
        format!("eq.{value}")
    }

    fn duration_field(seconds: i64) -> String {
        format!("{seconds} seconds")
    }

    fn http_error(status: reqwest::StatusCode, body: &str) -> CoreError {
        let message = if body.trim().is_empty() {
            format!("remote store error: http {}", status.as_u16())
        } else {
            format!("remote store error: http {}; body={body}", status.as_u16())
        };
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                CoreError::AccessDenied(message)
            }
            reqwest::StatusCode::NOT_FOUND => CoreError::NotFound(message),
            _ => CoreError::RemoteUnavailable(message),
        }
    }

    async fn read_body(
        response: reqwest::Response,
        context: &str,
    ) -> Result<(reqwest::StatusCode, String), CoreError> {
        let status = response.status();
        let body = response.text().await.map_err(|error| {
            CoreError::RemoteUnavailable(format!("failed reading {context} response: {error}"))
        })?;
        Ok((status, body))
    }

    fn parse_rows<T: serde::de::DeserializeOwned>(body: &str, context: &str) -> Result<Vec<T>, CoreError> {
        serde_json::from_str(body).map_err(|error| {
            CoreError::RemoteUnavailable(format!("invalid {context} payload: {error}; body={body}"))
        })
    }

    async fn list_rows<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> Result<Vec<T>, CoreError> {
        let endpoint = self.table_endpoint(table)?;
        let response = self
            .client
            .get(endpoint)
            .query(query)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|error| {
                CoreError::RemoteUnavailable(format!("network error while listing {context}: {error}"))
            })?;

        let (status, body) = Self::read_body(response, context).await?;
        if !status.is_success() {
            return Err(Self::http_error(status, &body));
        }
        Self::parse_rows(&body, context)
    }
}

#[async_trait]
impl RemoteStore for PostgrestRemoteStore {
    async fn list_projects(&self, user_id: &str) -> Result<Vec<Project>, CoreError> {
        self.list_rows(
            &self.projects_table,
            &[
                ("user_id", Self::eq_filter(user_id)),
                ("order", "name.asc".to_string()),
            ],
            "projects",
        )
        .await
    }

    async fn list_tasks(&self, project_ids: &[String]) -> Result<Vec<Task>, CoreError> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.list_rows(
            &self.tasks_table,
            &[
                ("project_id", Self::in_filter(project_ids)),
                ("order", "name.asc".to_string()),
            ],
            "tasks",
        )
        .await
    }

    async fn list_entries(
        &self,
        project_ids: &[String],
        closed_only: bool,
    ) -> Result<Vec<TimeEntry>, CoreError> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query = vec![
            ("project_id", Self::in_filter(project_ids)),
            ("order", "created_at.desc".to_string()),
        ];
        if closed_only {
            query.push(("end_time", "not.is.null".to_string()));
        }
        self.list_rows(&self.entries_table, &query, "time entries").await
    }

    async fn insert_entry(&self, entry: &TimeEntry) -> Result<TimeEntry, CoreError> {
        let endpoint = self.table_endpoint(&self.entries_table)?;
        let duration_seconds = entry
            .end_time
            .map(|end| ((end - entry.start_time).num_milliseconds() / 1000).max(0))
            .unwrap_or(0);
        let request = InsertEntryRequest {
            project_id: &entry.project_id,
            task_id: entry.task_id.as_deref(),
            user_id: &entry.user_id,
            start_time: entry.start_time,
            end_time: entry.end_time,
            duration: Self::duration_field(duration_seconds),
            description: entry.description.as_deref(),
        };

        let response = self
            .client
            .post(endpoint)
            .header("apikey", &self.api_key)
            .header("Prefer", PREFER_REPRESENTATION)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|error| {
                CoreError::RemoteUnavailable(format!("network error while inserting time entry: {error}"))
            })?;

        let (status, body) = Self::read_body(response, "time entry insert").await?;
        if !status.is_success() {
            return Err(Self::http_error(status, &body));
        }
        let rows: Vec<TimeEntry> = Self::parse_rows(&body, "time entry insert")?;
        rows.into_iter().next().ok_or_else(|| {
            CoreError::RemoteUnavailable("time entry insert returned no rows".to_string())
        })
    }

    async fn update_entry(
        &self,
        entry_id: &str,
        user_id: &str,
        change: &EntryChange,
    ) -> Result<TimeEntry, CoreError> {
        let endpoint = self.table_endpoint(&self.entries_table)?;
        let request = UpdateEntryRequest {
            start_time: change.start_time,
            end_time: change.end_time,
            duration: Self::duration_field(change.duration_seconds()),
            description: change.description.as_deref(),
        };

        let response = self
            .client
            .patch(endpoint)
            .query(&[
                ("id", Self::eq_filter(entry_id)),
                ("user_id", Self::eq_filter(user_id)),
            ])
            .header("apikey", &self.api_key)
            .header("Prefer", PREFER_REPRESENTATION)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|error| {
                CoreError::RemoteUnavailable(format!("network error while updating time entry: {error}"))
            })?;

        let (status, body) = Self::read_body(response, "time entry update").await?;
        if !status.is_success() {
            return Err(Self::http_error(status, &body));
        }
        let rows: Vec<TimeEntry> = Self::parse_rows(&body, "time entry update")?;
        rows.into_iter().next().ok_or_else(|| {
            CoreError::AccessDenied("time entry not found or access denied".to_string())
        })
    }

    async fn delete_entry(&self, entry_id: &str, user_id: &str) -> Result<(), CoreError> {
        let endpoint = self.table_endpoint(&self.entries_table)?;
        let response = self
            .client
            .delete(endpoint)
            .query(&[
                ("id", Self::eq_filter(entry_id)),
                ("user_id", Self::eq_filter(user_id)),
            ])
            .header("apikey", &self.api_key)
            .header("Prefer", PREFER_REPRESENTATION)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|error| {
                CoreError::RemoteUnavailable(format!("network error while deleting time entry: {error}"))
            })?;

        let (status, body) = Self::read_body(response, "time entry delete").await?;
        if !status.is_success() {
            return Err(Self::http_error(status, &body));
        }
        let rows: Vec<serde_json::Value> = Self::parse_rows(&body, "time entry delete")?;
        if rows.is_empty() {
            return Err(CoreError::AccessDenied(
                "time entry not found or access denied".to_string(),
            ));
        }
        Ok(())
    }
}
