use super::{confirm, open_model, parse_amount};
use crate::{
    libs::{
        messages::Message,
        model_mgr::ModelMgr,
        task::{Task, TaskSearchCriterion, TaskSearchField, TaskSearchFilter},
        view::View,
    },
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    command: TaskCommand,
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    /// Create a task as the last child of its parent
    Create {
        code: String,
        name: String,
        /// Code path of the parent, e.g. `/PRJ/DEV`; root level when omitted
        #[arg(short, long)]
        parent: Option<String>,
        #[arg(long, value_parser = parse_amount, default_value = "0")]
        budget: i64,
        #[arg(long, value_parser = parse_amount, default_value = "0")]
        initially_consumed: i64,
        #[arg(long, value_parser = parse_amount, default_value = "0")]
        todo: i64,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Create a task with a generated code
    New {
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// List the task tree, or the tasks matching a search
    List {
        /// Only the children of this task
        #[arg(short, long, conflicts_with = "value")]
        parent: Option<String>,
        #[arg(long, value_enum, default_value_t = TaskSearchField::Name)]
        field: TaskSearchField,
        #[arg(long, value_enum, default_value_t = TaskSearchCriterion::Contains)]
        criterion: TaskSearchCriterion,
        /// Searched value
        #[arg(short, long)]
        value: Option<String>,
    },
    /// Change a task's code, name, amounts or comment
    Edit {
        task: String,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_parser = parse_amount)]
        budget: Option<i64>,
        #[arg(long, value_parser = parse_amount)]
        initially_consumed: Option<i64>,
        #[arg(long, value_parser = parse_amount)]
        todo: Option<i64>,
        /// New comment; an empty value clears it
        #[arg(long)]
        comment: Option<String>,
    },
    /// Move a task, with its sub tree, under another task
    Move {
        task: String,
        /// Code path of the new parent
        #[arg(long, required_unless_present = "root", conflicts_with = "root")]
        to: Option<String>,
        /// Move to the root level
        #[arg(long)]
        root: bool,
    },
    /// Swap a task with its previous sibling
    Up { task: String },
    /// Swap a task with its next sibling
    Down { task: String },
    /// Give a task another position among its siblings
    Number { task: String, number: i64 },
    /// Remove a task and its whole sub tree
    Delete {
        task: String,
        #[arg(short, long)]
        yes: bool,
    },
}

pub fn cmd(args: TaskArgs) -> Result<()> {
    let mgr = open_model()?;
    match args.command {
        TaskCommand::Create {
            code,
            name,
            parent,
            budget,
            initially_consumed,
            todo,
            comment,
        } => {
            let parent = optional_task(&mgr, parent.as_deref())?;
            let mut task = Task::new(&code, &name).with_amounts(budget, initially_consumed, todo);
            if let Some(comment) = comment.as_deref() {
                task = task.with_comment(comment);
            }
            let created = mgr.create_task(parent.as_ref(), &task)?;
            msg_success!(Message::TaskCreated(mgr.get_task_code_path(&created)?));
        }
        TaskCommand::New { parent } => {
            let parent = optional_task(&mgr, parent.as_deref())?;
            let created = mgr.create_new_task(parent.as_ref())?;
            msg_success!(Message::TaskCreated(mgr.get_task_code_path(&created)?));
        }
        TaskCommand::List {
            parent,
            field,
            criterion,
            value,
        } => {
            let tasks = match (parent, value) {
                (_, Some(value)) => mgr.get_tasks(&TaskSearchFilter::new(field, criterion, &value))?,
                (Some(parent), None) => {
                    let parent = mgr.get_task_by_code_path(&parent)?;
                    mgr.get_sub_tasks(Some(&parent))?
                }
                (None, None) => mgr.get_all_tasks()?,
            };
            handle_list(&mgr, tasks)?;
        }
        TaskCommand::Edit {
            task,
            code,
            name,
            budget,
            initially_consumed,
            todo,
            comment,
        } => {
            let mut task = mgr.get_task_by_code_path(&task)?;
            if let Some(code) = code {
                task.code = code;
            }
            if let Some(name) = name {
                task.name = name;
            }
            task.budget = budget.unwrap_or(task.budget);
            task.initially_consumed = initially_consumed.unwrap_or(task.initially_consumed);
            task.todo = todo.unwrap_or(task.todo);
            if let Some(comment) = comment {
                task.comment = Some(comment).filter(|comment| !comment.is_empty());
            }
            let updated = mgr.update_task(&task)?;
            msg_success!(Message::TaskUpdated(mgr.get_task_code_path(&updated)?));
        }
        TaskCommand::Move { task, to, root } => {
            let task = mgr.get_task_by_code_path(&task)?;
            let destination = if root { None } else { optional_task(&mgr, to.as_deref())? };
            let moved = mgr.move_task(&task, destination.as_ref())?;
            msg_success!(Message::TaskMoved(mgr.get_task_code_path(&moved)?));
        }
        TaskCommand::Up { task } => {
            let moved = mgr.move_up_task(&mgr.get_task_by_code_path(&task)?)?;
            msg_success!(Message::TaskRenumbered(task, moved.number));
        }
        TaskCommand::Down { task } => {
            let moved = mgr.move_down_task(&mgr.get_task_by_code_path(&task)?)?;
            msg_success!(Message::TaskRenumbered(task, moved.number));
        }
        TaskCommand::Number { task, number } => {
            let moved = mgr.move_task_to_number(&mgr.get_task_by_code_path(&task)?, number)?;
            msg_success!(Message::TaskRenumbered(task, moved.number));
        }
        TaskCommand::Delete { task: code_path, yes } => {
            let task = mgr.get_task_by_code_path(&code_path)?;
            let sub_tasks = mgr.get_sub_tasks_count(Some(&task))?;
            if confirm(Message::ConfirmDeleteTask(code_path.clone(), sub_tasks), yes)? {
                mgr.remove_task(&task)?;
                msg_success!(Message::TaskDeleted(code_path));
            }
        }
    }
    Ok(())
}

fn optional_task(mgr: &ModelMgr, code_path: Option<&str>) -> Result<Option<Task>> {
    Ok(code_path.map(|code_path| mgr.get_task_by_code_path(code_path)).transpose()?)
}

fn handle_list(mgr: &ModelMgr, tasks: Vec<Task>) -> Result<()> {
    if tasks.is_empty() {
        msg_info!(Message::NoTasksFound);
        return Ok(());
    }

    let mut rows = Vec::with_capacity(tasks.len());
    for task in tasks {
        let code_path = mgr.get_task_code_path(&task)?;
        rows.push((task, code_path));
    }

    msg_print!(Message::TasksHeader(rows.len()), true);
    View::tasks(&rows)?;
    Ok(())
}
