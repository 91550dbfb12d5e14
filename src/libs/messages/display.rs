//! Display implementation for actman messages.
//!
//! All user-facing text lives here, so commands only pick a [`Message`]
//! variant and hand it to one of the `msg_*!` macros.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigModuleModel => "Model settings".to_string(),
            Message::ConfigModuleDatabase => "Database settings".to_string(),
            Message::DatabaseLocation(path) => format!("Model stored in {}", path),

            // === COLLABORATOR MESSAGES ===
            Message::CollaboratorCreated(login) => format!("Collaborator '{}' created", login),
            Message::CollaboratorUpdated(login) => format!("Collaborator '{}' updated", login),
            Message::CollaboratorDeleted(login) => format!("Collaborator '{}' deleted", login),
            Message::CollaboratorsHeader(count) => format!("Collaborators ({}):", count),
            Message::NoCollaboratorsFound => "No collaborators found".to_string(),
            Message::ConfirmDeleteCollaborator(login) => format!("Delete collaborator '{}'?", login),

            // === DURATION MESSAGES ===
            Message::DurationCreated(value) => format!("Duration {} created", value),
            Message::DurationUpdated(value) => format!("Duration {} updated", value),
            Message::DurationDeleted(value) => format!("Duration {} deleted", value),
            Message::DurationsHeader(count) => format!("Durations ({}):", count),
            Message::NoDurationsFound => "No durations found".to_string(),
            Message::ConfirmDeleteDuration(value) => format!("Delete duration {}?", value),

            // === TASK MESSAGES ===
            Message::TaskCreated(code_path) => format!("Task {} created", code_path),
            Message::TaskUpdated(code_path) => format!("Task {} updated", code_path),
            Message::TaskMoved(code_path) => format!("Task moved to {}", code_path),
            Message::TaskRenumbered(code_path, number) => format!("Task {} is now number {}", code_path, number),
            Message::TaskDeleted(code_path) => format!("Task {} deleted", code_path),
            Message::TasksHeader(count) => format!("Tasks ({}):", count),
            Message::NoTasksFound => "No tasks found".to_string(),
            Message::ConfirmDeleteTask(code_path, 0) => format!("Delete task {}?", code_path),
            Message::ConfirmDeleteTask(code_path, sub_tasks) => {
                format!("Delete task {} and its {} sub task(s) with their own sub trees?", code_path, sub_tasks)
            }

            // === CONTRIBUTION MESSAGES ===
            Message::ContributionCreated(duration, code_path, date) => {
                format!("Contribution of {} recorded on {} for {}", duration, code_path, date)
            }
            Message::ContributionUpdated(code_path, date) => format!("Contribution on {} for {} updated", code_path, date),
            Message::ContributionDeleted(code_path, date) => format!("Contribution on {} for {} deleted", code_path, date),
            Message::ContributionsReassigned(count, code_path) => format!("{} contribution(s) moved to {}", count, code_path),
            Message::ContributionsHeader(count) => format!("Contributions ({}):", count),
            Message::NoContributionsFound => "No contributions found".to_string(),
            Message::ConfirmDeleteContribution(duration, code_path, date) => {
                format!("Delete the contribution of {} on {} for {}?", duration, code_path, date)
            }

            // === REPORT MESSAGES ===
            Message::SumsHeader => "Task figures:".to_string(),
            Message::ReportHeader(login, from, to) => format!("Contributions of '{}' from {} to {}:", login, from, to),
            Message::ReportSaved(path) => format!("Report saved to {}", path),

            // === XML MESSAGES ===
            Message::ModelExported(path) => format!("Model exported to {}", path),
            Message::ModelImported {
                durations,
                collaborators,
                tasks,
                contributions,
            } => format!(
                "Imported {} duration(s), {} collaborator(s), {} task(s) and {} contribution(s)",
                durations, collaborators, tasks, contributions
            ),
            Message::ConfirmImport(path) => format!("Import {} into the current model?", path),
            Message::FileNotFound(path) => format!("File {} does not exist", path),

            // === PROMPTS ===
            Message::PromptSelectModules => "Select nodes to configure".to_string(),
            Message::PromptUpdateTodo => "Decrease the task todo when recording a contribution".to_string(),
            Message::PromptLoginPrefix => "Login prefix of generated collaborators".to_string(),
            Message::PromptTaskCodePrefix => "Code prefix of generated tasks".to_string(),
            Message::PromptNewTaskName => "Name of generated tasks".to_string(),
            Message::PromptDatabaseFileName => "Database file name".to_string(),

            // === GENERAL MESSAGES ===
            Message::OperationCancelled => "Operation cancelled".to_string(),
        };

        write!(f, "{}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn task_deletion_prompt_mentions_sub_tasks() {
        assert_eq!(Message::ConfirmDeleteTask("/PRJ".to_string(), 0).to_string(), "Delete task /PRJ?");
        assert!(Message::ConfirmDeleteTask("/PRJ".to_string(), 2).to_string().contains("2 sub task(s)"));
    }

    #[test]
    fn dates_render_in_iso_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let text = Message::ContributionDeleted("/PRJ/DEV".to_string(), date).to_string();
        assert_eq!(text, "Contribution on /PRJ/DEV for 2024-03-05 deleted");
    }
}
