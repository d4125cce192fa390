use indexmap::IndexMap;
use tracing::debug;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::client::{Repository, TaskQuery};
use crate::model::{AppConfig, FeatureFilter, SortMode, StatusFilter, TaskStatus};
use crate::ops::pipeline::{self, ViewPrefs};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run a one-shot subcommand against the repository and print the result
pub fn dispatch(
    command: Commands,
    json: bool,
    config: &AppConfig,
    repo: &dyn Repository,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Tasks(args) => cmd_tasks(args, json, config, repo),
        Commands::Projects => cmd_projects(json, repo),
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_tasks(
    args: TasksArgs,
    json: bool,
    config: &AppConfig,
    repo: &dyn Repository,
) -> Result<(), Box<dyn std::error::Error>> {
    let sort = match args.sort.as_deref() {
        Some(s) => SortMode::parse(s).ok_or_else(|| format!("unknown sort mode '{}'", s))?,
        None => config.default_sort,
    };
    let statuses = parse_status_filter(&args.status)?.unwrap_or(config.statuses);
    let features = feature_filter(&args.feature);
    let project = args.project.or_else(|| config.default_project.clone());

    let query = TaskQuery::for_view(project.clone(), &statuses);
    debug!(?query, "listing tasks");
    let tasks = repo.list_tasks(&query)?;

    let prefs = ViewPrefs {
        project: project.as_deref(),
        statuses: &statuses,
        features: features.as_ref(),
        sort,
        status_order: &config.status_order,
    };
    let visible = pipeline::visible_indices(&tasks, &prefs);

    if json {
        let items: Vec<TaskJson> = visible.iter().map(|&i| task_to_json(&tasks[i])).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if visible.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    for &i in &visible {
        println!("{}", format_task_line(&tasks[i]));
    }
    Ok(())
}

fn cmd_projects(json: bool, repo: &dyn Repository) -> Result<(), Box<dyn std::error::Error>> {
    let projects = repo.list_projects()?;
    // Counts cover every task, closed ones included
    let tasks = repo.list_tasks(&TaskQuery {
        include_closed: true,
        ..Default::default()
    })?;

    if json {
        let items: Vec<ProjectJson> = projects
            .iter()
            .map(|p| project_to_json(p, &tasks))
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects.");
        return Ok(());
    }
    for project in &projects {
        println!("{}", format_project_line(project, &tasks));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `--status` values become a filter showing only those statuses. No values
/// leaves the configured filter in place.
fn parse_status_filter(values: &[String]) -> Result<Option<StatusFilter>, String> {
    if values.is_empty() {
        return Ok(None);
    }
    let mut filter = StatusFilter::default();
    for status in TaskStatus::ALL {
        filter.set(status, false);
    }
    for value in values {
        let status = TaskStatus::parse(value)
            .ok_or_else(|| format!("unknown status '{}' (expected todo, doing, review, done)", value))?;
        filter.set(status, true);
    }
    Ok(Some(filter))
}

fn feature_filter(tags: &[String]) -> Option<FeatureFilter> {
    if tags.is_empty() {
        return None;
    }
    let map: IndexMap<String, bool> = tags.iter().map(|t| (t.clone(), true)).collect();
    Some(map)
}
