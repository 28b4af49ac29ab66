use crate::domain::interval::entry_duration_ms;
use crate::domain::models::{Project, Task, TimeEntry};
use serde::Serialize;
use std::collections::HashMap;

const UNKNOWN_PROJECT_NAME: &str = "Unknown Project";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TaskView {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub completed: bool,
    pub total_time_ms: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProjectView {
    pub id: String,
    pub name: String,
    pub total_time_ms: i64,
    pub tasks: Vec<TaskView>,
}

/// A time entry decorated for display: project and task names folded into a
/// single label, instants as epoch milliseconds.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EntryView {
    pub id: String,
    pub display_name: String,
    pub start_time_ms: i64,
    pub end_time_ms: Option<i64>,
    pub duration_ms: i64,
    pub description: Option<String>,
}

/// Denormalizes projects, tasks and closed time entries into per-project and
/// per-task totals. Pure and idempotent so it can be re-run on every
/// resynchronization.
///
/// Entries referencing an unknown project or task contribute to no total;
/// entries without a task reference count toward their project only. Input
/// ordering of projects and tasks is preserved (callers sort at the query
/// boundary).
pub fn aggregate(projects: &[Project], tasks: &[Task], entries: &[TimeEntry]) -> Vec<ProjectView> {
    let mut project_totals: HashMap<&str, i64> = HashMap::new();
    let mut task_totals: HashMap<(&str, &str), i64> = HashMap::new();

    for entry in entries {
        let elapsed = entry_duration_ms(entry);
        *project_totals.entry(entry.project_id.as_str()).or_default() += elapsed;
        if let Some(task_id) = entry.task_id.as_deref() {
            *task_totals
                .entry((entry.project_id.as_str(), task_id))
                .or_default() += elapsed;
        }
    }

    projects
        .iter()
        .map(|project| ProjectView {
            id: project.id.clone(),
            name: project.name.clone(),
            total_time_ms: project_totals
                .get(project.id.as_str())
                .copied()
                .unwrap_or(0),
            tasks: tasks
                .iter()
                .filter(|task| task.project_id == project.id)
                .map(|task| TaskView {
                    id: task.id.clone(),
                    project_id: task.project_id.clone(),
                    name: task.name.clone(),
                    completed: task.completed,
                    total_time_ms: task_totals
                        .get(&(project.id.as_str(), task.id.as_str()))
                        .copied()
                        .unwrap_or(0),
                })
                .collect(),
        })
        .collect()
}

pub fn entry_display_name(project_name: Option<&str>, task_name: Option<&str>) -> String {
    match (project_name, task_name) {
        (Some(project), Some(task)) => format!("{project} - {task}"),
        (Some(project), None) => project.to_string(),
        (None, _) => UNKNOWN_PROJECT_NAME.to_string(),
    }
}

/// Decorates raw entries for display, preserving the caller-supplied order.
pub fn decorate_entries(
    entries: &[TimeEntry],
    projects: &[Project],
    tasks: &[Task],
) -> Vec<EntryView> {
    let project_names: HashMap<&str, &str> = projects
        .iter()
        .map(|project| (project.id.as_str(), project.name.as_str()))
        .collect();
    let task_names: HashMap<&str, &str> = tasks
        .iter()
        .map(|task| (task.id.as_str(), task.name.as_str()))
        .collect();

    entries
        .iter()
        .map(|entry| EntryView {
            id: entry.id.clone(),
            display_name: entry_display_name(
                project_names.get(entry.project_id.as_str()).copied(),
                entry
                    .task_id
                    .as_deref()
                    .and_then(|task_id| task_names.get(task_id).copied()),
            ),
            start_time_ms: entry.start_time.timestamp_millis(),
            end_time_ms: entry.end_time.map(|end| end.timestamp_millis()),
            duration_ms: entry_duration_ms(entry),
            description: entry.description.clone(),
        })
        .collect()
}
