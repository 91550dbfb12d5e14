use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigModuleModel,
    ConfigModuleDatabase,
    DatabaseLocation(String),

    // === COLLABORATOR MESSAGES ===
    CollaboratorCreated(String),
    CollaboratorUpdated(String),
    CollaboratorDeleted(String),
    CollaboratorsHeader(usize),
    NoCollaboratorsFound,
    ConfirmDeleteCollaborator(String),

    // === DURATION MESSAGES ===
    DurationCreated(String),
    DurationUpdated(String),
    DurationDeleted(String),
    DurationsHeader(usize),
    NoDurationsFound,
    ConfirmDeleteDuration(String),

    // === TASK MESSAGES ===
    TaskCreated(String),
    TaskUpdated(String),
    TaskMoved(String),
    TaskRenumbered(String, u8), // code path, new number
    TaskDeleted(String),
    TasksHeader(usize),
    NoTasksFound,
    ConfirmDeleteTask(String, i64), // code path, direct sub tasks

    // === CONTRIBUTION MESSAGES ===
    ContributionCreated(String, String, NaiveDate), // duration, task, date
    ContributionUpdated(String, NaiveDate),
    ContributionDeleted(String, NaiveDate),
    ContributionsReassigned(usize, String),
    ContributionsHeader(usize),
    NoContributionsFound,
    ConfirmDeleteContribution(String, String, NaiveDate),

    // === REPORT MESSAGES ===
    SumsHeader,
    ReportHeader(String, NaiveDate, NaiveDate),
    ReportSaved(String),

    // === XML MESSAGES ===
    ModelExported(String),
    ModelImported {
        durations: usize,
        collaborators: usize,
        tasks: usize,
        contributions: usize,
    },
    ConfirmImport(String),
    FileNotFound(String),

    // === PROMPTS ===
    PromptSelectModules,
    PromptUpdateTodo,
    PromptLoginPrefix,
    PromptTaskCodePrefix,
    PromptNewTaskName,
    PromptDatabaseFileName,

    // === GENERAL MESSAGES ===
    OperationCancelled,
}
