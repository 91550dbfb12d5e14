//! XML import and export of the whole model.
//!
//! The document lists durations, collaborators, tasks and contributions in
//! that order. Each task element holds its sub tasks after its own fields, in
//! sibling order, and carries its code path (`/PRJ/DEV`). Contributions refer to their
//! collaborator by login and to their task by code path, so a document can be
//! loaded into any database.
//!
//! ## Document shape
//!
//! ```text
//! <model>
//!   <durations>
//!     <duration><value>0.50</value><is-active>true</is-active></duration>
//!   </durations>
//!   <collaborators>
//!     <collaborator><login/><first-name/><last-name/><is-active/></collaborator>
//!   </collaborators>
//!   <tasks>
//!     <task>
//!       <path/><name/><budget/><initially-consumed/><todo/><comment/>?
//!       <task>..</task>*
//!     </task>
//!   </tasks>
//!   <contributions>
//!     <contribution year=".." month=".." day=".." duration="..">
//!       <contributor-ref/><task-ref/>
//!     </contribution>
//!   </contributions>
//! </model>
//! ```
//!
//! The grammar ([`ACTMAN_DTD`]) is enforced while reading: unknown or
//! misplaced elements and attributes, stray text and missing children all
//! abort the import.
//!
//! Import goes through the [`ModelMgr`] like any other client. Contributions
//! are created without todo adjustment since the document carries the todo
//! values explicitly.

use super::collaborator::{Collaborator, CollaboratorQuery};
use super::contribution::{Contribution, ContributionFilter};
use super::duration::Duration;
use super::error::{ModelError, ModelMgrError, ModelMgrResult};
use super::formatter::{entry_to_hundredth, hundredth_to_entry, split_code_path};
use super::model_mgr::ModelMgr;
use super::task::Task;
use super::task_path::TaskPath;
use chrono::NaiveDate;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

pub const DTD_FILE_NAME: &str = "actman.dtd";

/// Grammar of the exchange document.
pub const ACTMAN_DTD: &str = r#"<!ELEMENT model (durations, collaborators, tasks, contributions)>
<!ELEMENT durations (duration*)>
<!ELEMENT duration (value, is-active)>
<!ELEMENT value (#PCDATA)>
<!ELEMENT is-active (#PCDATA)>
<!ELEMENT collaborators (collaborator*)>
<!ELEMENT collaborator (login, first-name, last-name, is-active)>
<!ELEMENT login (#PCDATA)>
<!ELEMENT first-name (#PCDATA)>
<!ELEMENT last-name (#PCDATA)>
<!ELEMENT tasks (task*)>
<!ELEMENT task (path, name, budget, initially-consumed, todo, comment?, task*)>
<!ELEMENT path (#PCDATA)>
<!ELEMENT name (#PCDATA)>
<!ELEMENT budget (#PCDATA)>
<!ELEMENT initially-consumed (#PCDATA)>
<!ELEMENT todo (#PCDATA)>
<!ELEMENT comment (#PCDATA)>
<!ELEMENT contributions (contribution*)>
<!ELEMENT contribution (contributor-ref, task-ref)>
<!ATTLIST contribution
    year CDATA #REQUIRED
    month CDATA #REQUIRED
    day CDATA #REQUIRED
    duration CDATA #REQUIRED>
<!ELEMENT contributor-ref (#PCDATA)>
<!ELEMENT task-ref (#PCDATA)>
"#;

const DOCTYPE: &str = r#"model SYSTEM "actman.dtd""#;

struct ElementRule {
    name: &'static str,
    children: &'static [&'static str],
    required: &'static [&'static str],
    attributes: &'static [&'static str],
    /// Children may repeat (list elements).
    repeated: bool,
    /// Children that may repeat and must come after every other child.
    nested: &'static [&'static str],
    /// Holds character data.
    text: bool,
}

const CONTRIBUTION_ATTRIBUTES: [&str; 4] = ["year", "month", "day", "duration"];

const GRAMMAR: &[ElementRule] = &[
    ElementRule {
        name: "model",
        children: &["durations", "collaborators", "tasks", "contributions"],
        required: &["durations", "collaborators", "tasks", "contributions"],
        attributes: &[],
        repeated: false,
        nested: &[],
        text: false,
    },
    list_rule("durations"),
    record_rule("duration", &["value", "is-active"], &["value", "is-active"], &[]),
    list_rule("collaborators"),
    record_rule(
        "collaborator",
        &["login", "first-name", "last-name", "is-active"],
        &["login", "first-name", "last-name", "is-active"],
        &[],
    ),
    list_rule("tasks"),
    ElementRule {
        name: "task",
        children: &["path", "name", "budget", "initially-consumed", "todo", "comment", "task"],
        required: &["path", "name", "budget", "initially-consumed", "todo"],
        attributes: &[],
        repeated: false,
        nested: &["task"],
        text: false,
    },
    list_rule("contributions"),
    record_rule(
        "contribution",
        &["contributor-ref", "task-ref"],
        &["contributor-ref", "task-ref"],
        &CONTRIBUTION_ATTRIBUTES,
    ),
    text_rule("value"),
    text_rule("is-active"),
    text_rule("login"),
    text_rule("first-name"),
    text_rule("last-name"),
    text_rule("path"),
    text_rule("name"),
    text_rule("budget"),
    text_rule("initially-consumed"),
    text_rule("todo"),
    text_rule("comment"),
    text_rule("contributor-ref"),
    text_rule("task-ref"),
];

/// Items of a list element are resolved through [`list_item`].
const fn list_rule(name: &'static str) -> ElementRule {
    ElementRule {
        name,
        children: &[],
        required: &[],
        attributes: &[],
        repeated: true,
        nested: &[],
        text: false,
    }
}

const fn record_rule(
    name: &'static str,
    children: &'static [&'static str],
    required: &'static [&'static str],
    attributes: &'static [&'static str],
) -> ElementRule {
    ElementRule {
        name,
        children,
        required,
        attributes,
        repeated: false,
        nested: &[],
        text: false,
    }
}

const fn text_rule(name: &'static str) -> ElementRule {
    ElementRule {
        name,
        children: &[],
        required: &[],
        attributes: &[],
        repeated: false,
        nested: &[],
        text: true,
    }
}

fn rule(name: &str) -> Option<&'static ElementRule> {
    GRAMMAR.iter().find(|rule| rule.name == name)
}

/// Element allowed below each list element.
fn list_item(list: &str) -> Option<&'static str> {
    match list {
        "durations" => Some("duration"),
        "collaborators" => Some("collaborator"),
        "tasks" => Some("task"),
        "contributions" => Some("contribution"),
        _ => None,
    }
}

fn allows_child(parent: &ElementRule, child: &str) -> bool {
    if parent.repeated {
        return list_item(parent.name) == Some(child);
    }
    parent.children.contains(&child)
}

// === EXPORT ===

/// Writes the whole model to `out`.
pub fn export<W: Write>(mgr: &ModelMgr, out: W) -> ModelMgrResult<()> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped(DOCTYPE)))?;

    let tasks = mgr.get_all_tasks()?;
    let code_paths = code_paths(&tasks);
    writer.write_event(Event::Comment(BytesText::from_escaped(checksums(mgr, &tasks, &code_paths)?)))?;

    writer.write_event(Event::Start(BytesStart::new("model")))?;

    let durations = mgr.get_durations()?;
    writer.write_event(Event::Start(BytesStart::new("durations")))?;
    for duration in &durations {
        writer.write_event(Event::Start(BytesStart::new("duration")))?;
        write_text_element(&mut writer, "value", &hundredth_to_entry(duration.id))?;
        write_text_element(&mut writer, "is-active", &duration.is_active.to_string())?;
        writer.write_event(Event::End(BytesEnd::new("duration")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("durations")))?;

    let collaborators = mgr.get_collaborators(&CollaboratorQuery::default())?;
    writer.write_event(Event::Start(BytesStart::new("collaborators")))?;
    for collaborator in &collaborators {
        writer.write_event(Event::Start(BytesStart::new("collaborator")))?;
        write_text_element(&mut writer, "login", &collaborator.login)?;
        write_text_element(&mut writer, "first-name", &collaborator.first_name)?;
        write_text_element(&mut writer, "last-name", &collaborator.last_name)?;
        write_text_element(&mut writer, "is-active", &collaborator.is_active.to_string())?;
        writer.write_event(Event::End(BytesEnd::new("collaborator")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("collaborators")))?;

    let mut sub_tasks: HashMap<&TaskPath, Vec<&Task>> = HashMap::new();
    for task in &tasks {
        sub_tasks.entry(&task.path).or_default().push(task);
    }
    writer.write_event(Event::Start(BytesStart::new("tasks")))?;
    let root = TaskPath::root();
    for task in sub_tasks.get(&root).into_iter().flatten() {
        write_task(&mut writer, task, &sub_tasks, &code_paths)?;
    }
    writer.write_event(Event::End(BytesEnd::new("tasks")))?;

    let logins: HashMap<i64, &str> = collaborators.iter().map(|c| (c.id, c.login.as_str())).collect();
    let tasks_by_id: HashMap<i64, &Task> = tasks.iter().map(|t| (t.id, t)).collect();
    let contributions = mgr.get_contributions(&ContributionFilter::new())?;
    writer.write_event(Event::Start(BytesStart::new("contributions")))?;
    for contribution in &contributions {
        let login = logins
            .get(&contribution.contributor_id)
            .ok_or(ModelError::CollaboratorNotFound(contribution.contributor_id))?;
        let task = tasks_by_id
            .get(&contribution.task_id)
            .ok_or(ModelError::TaskNotFound(contribution.task_id))?;

        let year = contribution.year().to_string();
        let month = contribution.month().to_string();
        let day = contribution.day().to_string();
        let duration = hundredth_to_entry(contribution.duration_id);
        let mut start = BytesStart::new("contribution");
        start.push_attribute(("year", year.as_str()));
        start.push_attribute(("month", month.as_str()));
        start.push_attribute(("day", day.as_str()));
        start.push_attribute(("duration", duration.as_str()));
        writer.write_event(Event::Start(start))?;
        write_text_element(&mut writer, "contributor-ref", login)?;
        write_text_element(&mut writer, "task-ref", code_path_of(&code_paths, task))?;
        writer.write_event(Event::End(BytesEnd::new("contribution")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("contributions")))?;

    writer.write_event(Event::End(BytesEnd::new("model")))?;
    writer.into_inner().flush()?;

    info!(
        durations = durations.len(),
        collaborators = collaborators.len(),
        tasks = tasks.len(),
        contributions = contributions.len(),
        "model exported"
    );
    Ok(())
}

pub fn export_to_file(mgr: &ModelMgr, path: impl AsRef<Path>) -> ModelMgrResult<()> {
    let file = File::create(path.as_ref())?;
    export(mgr, BufWriter::new(file))
}

/// Writes [`ACTMAN_DTD`] into `dir`, next to exported documents.
pub fn write_dtd(dir: impl AsRef<Path>) -> ModelMgrResult<()> {
    std::fs::write(dir.as_ref().join(DTD_FILE_NAME), ACTMAN_DTD)?;
    Ok(())
}

/// Writes `task` with its whole sub tree, children in sibling order.
fn write_task<W: Write>(
    writer: &mut Writer<W>,
    task: &Task,
    sub_tasks: &HashMap<&TaskPath, Vec<&Task>>,
    code_paths: &HashMap<TaskPath, String>,
) -> ModelMgrResult<()> {
    writer.write_event(Event::Start(BytesStart::new("task")))?;
    write_text_element(writer, "path", code_path_of(code_paths, task))?;
    write_text_element(writer, "name", &task.name)?;
    write_text_element(writer, "budget", &hundredth_to_entry(task.budget))?;
    write_text_element(writer, "initially-consumed", &hundredth_to_entry(task.initially_consumed))?;
    write_text_element(writer, "todo", &hundredth_to_entry(task.todo))?;
    if let Some(comment) = &task.comment {
        write_text_element(writer, "comment", comment)?;
    }
    for child in sub_tasks.get(&task.full_path()).into_iter().flatten() {
        write_task(writer, child, sub_tasks, code_paths)?;
    }
    writer.write_event(Event::End(BytesEnd::new("task")))?;
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> ModelMgrResult<()> {
    // An empty element keeps the indentation out of the value
    if text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(name)))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Code path of every task, keyed by full path.
///
/// `tasks` must be in tree print order so parents are resolved first.
fn code_paths(tasks: &[Task]) -> HashMap<TaskPath, String> {
    let mut code_paths: HashMap<TaskPath, String> = HashMap::with_capacity(tasks.len());
    for task in tasks {
        let parent = code_paths.get(&task.path).map(String::as_str).unwrap_or("");
        let code_path = format!("{}/{}", parent, task.code);
        code_paths.insert(task.full_path(), code_path);
    }
    code_paths
}

fn code_path_of<'a>(code_paths: &'a HashMap<TaskPath, String>, task: &'a Task) -> &'a str {
    code_paths.get(&task.full_path()).map(String::as_str).unwrap_or(&task.code)
}

/// Comment block with the figures of every root task.
fn checksums(mgr: &ModelMgr, tasks: &[Task], code_paths: &HashMap<TaskPath, String>) -> ModelMgrResult<String> {
    let mut comment = String::from("\n  Root task checksums (code path: budget / initially consumed / consumed / todo / contributions)\n");
    for task in tasks.iter().filter(|task| task.path.is_root()) {
        let sums = mgr.get_task_sums(task, None, None)?;
        comment.push_str(&format!(
            "  {}: {} / {} / {} / {} / {}\n",
            code_path_of(code_paths, task).replace("--", "- -"),
            hundredth_to_entry(sums.budget_sum),
            hundredth_to_entry(sums.initially_consumed_sum),
            hundredth_to_entry(sums.consumed_sum),
            hundredth_to_entry(sums.todo_sum),
            sums.contributions_nb
        ));
    }
    Ok(comment)
}

// === IMPORT ===

/// Number of entities created by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub durations: usize,
    pub collaborators: usize,
    pub tasks: usize,
    pub contributions: usize,
}

/// An element being read, with what was collected from its children.
struct Frame {
    name: String,
    rule: &'static ElementRule,
    seen: Vec<String>,
    text: String,
    fields: HashMap<String, String>,
    attributes: HashMap<String, String>,
    /// Task created from this element, keyed by its code path.
    task: Option<(String, Task)>,
}

impl Frame {
    fn field(&self, name: &str) -> ModelMgrResult<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| import_error(&self.name, format!("missing <{name}>")))
    }

    fn check_required(&self) -> ModelMgrResult<()> {
        for required in self.rule.required {
            if !self.seen.iter().any(|seen| seen == required) {
                return Err(import_error(&self.name, format!("missing <{required}>")));
            }
        }
        Ok(())
    }

    fn attribute(&self, name: &str) -> ModelMgrResult<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| import_error(&self.name, format!("missing attribute '{name}'")))
    }
}

/// Streaming importer keeping the entities it created for later references.
pub struct XmlImporter<'m> {
    mgr: &'m ModelMgr,
    tasks: HashMap<String, Task>,
    collaborators: HashMap<String, Collaborator>,
    summary: ImportSummary,
}

impl<'m> XmlImporter<'m> {
    pub fn new(mgr: &'m ModelMgr) -> Self {
        XmlImporter {
            mgr,
            tasks: HashMap::new(),
            collaborators: HashMap::new(),
            summary: ImportSummary::default(),
        }
    }

    /// Reads the document and creates its entities in document order.
    pub fn import<R: BufRead>(mut self, input: R) -> ModelMgrResult<ImportSummary> {
        let mut reader = Reader::from_reader(input);
        let mut buf = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut root_seen = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(start) => {
                    let frame = self.open(&stack, &start, root_seen)?;
                    root_seen = true;
                    if frame.name == "task" {
                        self.create_enclosing_task(&mut stack)?;
                    }
                    stack.push(frame);
                }
                Event::Empty(start) => {
                    let frame = self.open(&stack, &start, root_seen)?;
                    root_seen = true;
                    if frame.name == "task" {
                        self.create_enclosing_task(&mut stack)?;
                    }
                    self.close(&mut stack, frame)?;
                }
                Event::End(_) => {
                    let frame = stack
                        .pop()
                        .ok_or_else(|| import_error("/", "unexpected closing tag".to_string()))?;
                    self.close(&mut stack, frame)?;
                }
                Event::Text(text) => {
                    let text = text.unescape()?;
                    push_text(&mut stack, &text)?;
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(data.as_ref()).into_owned();
                    push_text(&mut stack, &text)?;
                }
                Event::DocType(doctype) => {
                    let doctype = String::from_utf8_lossy(doctype.as_ref()).into_owned();
                    if doctype.split_whitespace().next() != Some("model") {
                        return Err(import_error("/", format!("unexpected document type '{}'", doctype.trim())));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(frame) = stack.last() {
            return Err(import_error(&frame.name, "unexpected end of document".to_string()));
        }
        if !root_seen {
            return Err(import_error("/", "empty document".to_string()));
        }
        info!(
            durations = self.summary.durations,
            collaborators = self.summary.collaborators,
            tasks = self.summary.tasks,
            contributions = self.summary.contributions,
            "model imported"
        );
        Ok(self.summary)
    }

    /// Validates an opening tag against its parent and builds its frame.
    fn open(&self, stack: &[Frame], start: &BytesStart, root_seen: bool) -> ModelMgrResult<Frame> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let rule = match stack.last() {
            None if root_seen => return Err(import_error(&name, "content after the root element".to_string())),
            None if name != "model" => return Err(import_error(&name, "root element must be <model>".to_string())),
            None => rule(&name),
            Some(parent) => {
                if !allows_child(parent.rule, &name) {
                    return Err(import_error(&parent.name, format!("unexpected element <{name}>")));
                }
                let nested = parent.rule.nested.contains(&name.as_str());
                if !nested && !parent.rule.repeated && parent.seen.contains(&name) {
                    return Err(import_error(&parent.name, format!("duplicate element <{name}>")));
                }
                if !nested && parent.seen.iter().any(|seen| parent.rule.nested.contains(&seen.as_str())) {
                    return Err(import_error(&parent.name, format!("<{name}> found after a nested element")));
                }
                rule(&name)
            }
        }
        .ok_or_else(|| import_error(&name, "unknown element".to_string()))?;

        if let Some(model) = stack.last().filter(|parent| parent.name == "model") {
            check_section_order(model, &name)?;
        }

        let mut attributes = HashMap::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            if !rule.attributes.contains(&key.as_str()) {
                return Err(import_error(&name, format!("unexpected attribute '{key}'")));
            }
            let value = attribute.unescape_value()?.into_owned();
            attributes.insert(key, value);
        }
        for required in rule.attributes {
            if !attributes.contains_key(*required) {
                return Err(import_error(&name, format!("missing attribute '{required}'")));
            }
        }

        Ok(Frame {
            name,
            rule,
            seen: Vec::new(),
            text: String::new(),
            fields: HashMap::new(),
            attributes,
            task: None,
        })
    }

    /// Completes an element: checks its children and hands the record over.
    fn close(&mut self, stack: &mut [Frame], frame: Frame) -> ModelMgrResult<()> {
        frame.check_required()?;
        match frame.name.as_str() {
            "duration" => self.import_duration(&frame)?,
            "collaborator" => self.import_collaborator(&frame)?,
            "task" if frame.task.is_none() => {
                self.import_task(&frame, enclosing_task(stack))?;
            }
            "contribution" => self.import_contribution(&frame)?,
            _ => {}
        }
        if let Some(parent) = stack.last_mut() {
            parent.seen.push(frame.name.clone());
            // Values are kept verbatim, numbers and flags are trimmed when parsed
            if frame.rule.text {
                parent.fields.insert(frame.name, frame.text);
            }
        }
        Ok(())
    }

    /// Creates the task being read before its first sub task.
    fn create_enclosing_task(&mut self, stack: &mut [Frame]) -> ModelMgrResult<()> {
        let Some((frame, ancestors)) = stack.split_last_mut() else {
            return Ok(());
        };
        if frame.name != "task" || frame.task.is_some() {
            return Ok(());
        }
        frame.check_required()?;
        let imported = self.import_task(frame, enclosing_task(ancestors))?;
        frame.task = Some(imported);
        Ok(())
    }

    fn import_duration(&mut self, frame: &Frame) -> ModelMgrResult<()> {
        let duration = Duration {
            id: entry_to_hundredth(frame.field("value")?)?,
            is_active: parse_bool(frame, "is-active")?,
        };
        match self.mgr.get_duration(duration.id)? {
            Some(existing) if existing.is_active != duration.is_active => {
                self.mgr.update_duration(&existing, &duration)?;
            }
            Some(_) => {}
            None => {
                self.mgr.create_duration(&duration)?;
                self.summary.durations += 1;
            }
        }
        Ok(())
    }

    fn import_collaborator(&mut self, frame: &Frame) -> ModelMgrResult<()> {
        let mut collaborator = Collaborator::new(frame.field("login")?, frame.field("first-name")?, frame.field("last-name")?);
        collaborator.is_active = parse_bool(frame, "is-active")?;
        let created = self.mgr.create_collaborator(&collaborator)?;
        debug!(login = %created.login, "collaborator imported");
        self.collaborators.insert(created.login.clone(), created);
        self.summary.collaborators += 1;
        Ok(())
    }

    /// Creates a task below the enclosing task element, or below the task
    /// its path names when it sits directly in `<tasks>`.
    fn import_task(&mut self, frame: &Frame, enclosing: Option<&(String, Task)>) -> ModelMgrResult<(String, Task)> {
        let code_path = frame.field("path")?;
        let codes = split_code_path(code_path);
        let Some((code, parent_codes)) = codes.split_last() else {
            return Err(import_error(&frame.name, format!("invalid task path '{code_path}'")));
        };
        let parent = match enclosing {
            Some((parent_path, parent)) => {
                if normalized(parent_codes) != *parent_path {
                    return Err(import_error(
                        &frame.name,
                        format!("task path '{code_path}' is not below '{parent_path}'"),
                    ));
                }
                Some(parent.clone())
            }
            None if parent_codes.is_empty() => None,
            None => Some(self.task(&normalized(parent_codes))?),
        };

        let mut task = Task::new(code, frame.field("name")?).with_amounts(
            entry_to_hundredth(frame.field("budget")?)?,
            entry_to_hundredth(frame.field("initially-consumed")?)?,
            entry_to_hundredth(frame.field("todo")?)?,
        );
        if let Some(comment) = frame.fields.get("comment") {
            task = task.with_comment(comment);
        }
        let created = self.mgr.create_task(parent.as_ref(), &task)?;
        debug!(code_path, id = created.id, "task imported");
        let key = normalized(&codes);
        self.tasks.insert(key.clone(), created.clone());
        self.summary.tasks += 1;
        Ok((key, created))
    }

    fn import_contribution(&mut self, frame: &Frame) -> ModelMgrResult<()> {
        let year: i32 = parse_number(frame, "year")?;
        let month: u32 = parse_number(frame, "month")?;
        let day: u32 = parse_number(frame, "day")?;
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| import_error(&frame.name, format!("invalid date {year}-{month}-{day}")))?;
        let duration = self.mgr.create_duration_if_not_exists(entry_to_hundredth(frame.attribute("duration")?)?)?;
        let contributor = self.collaborator(frame.field("contributor-ref")?)?;
        let task = self.task(frame.field("task-ref")?)?;

        self.mgr
            .create_contribution(&Contribution::new(contributor.id, task.id, date, duration.id), false)?;
        self.summary.contributions += 1;
        Ok(())
    }

    fn task(&mut self, code_path: &str) -> ModelMgrResult<Task> {
        let key = normalized(&split_code_path(code_path));
        if let Some(task) = self.tasks.get(&key) {
            return Ok(task.clone());
        }
        let task = self.mgr.get_task_by_code_path(&key)?;
        self.tasks.insert(key, task.clone());
        Ok(task)
    }

    fn collaborator(&mut self, login: &str) -> ModelMgrResult<Collaborator> {
        if let Some(collaborator) = self.collaborators.get(login) {
            return Ok(collaborator.clone());
        }
        let collaborator = self
            .mgr
            .get_collaborator_by_login(login)?
            .ok_or_else(|| ModelError::UnknownLogin(login.to_string()))?;
        self.collaborators.insert(login.to_string(), collaborator.clone());
        Ok(collaborator)
    }
}

pub fn import<R: BufRead>(mgr: &ModelMgr, input: R) -> ModelMgrResult<ImportSummary> {
    XmlImporter::new(mgr).import(input)
}

pub fn import_from_file(mgr: &ModelMgr, path: impl AsRef<Path>) -> ModelMgrResult<ImportSummary> {
    let file = File::open(path.as_ref())?;
    import(mgr, BufReader::new(file))
}

/// Sections of `<model>` must follow the grammar order.
fn check_section_order(model: &Frame, name: &str) -> ModelMgrResult<()> {
    let sections = model.rule.children;
    let position = sections.iter().position(|section| *section == name);
    let expected = sections.get(model.seen.len()).copied();
    if position.is_some() && expected != Some(name) {
        return Err(import_error(
            &model.name,
            format!("<{}> found where <{}> was expected", name, expected.unwrap_or("/model")),
        ));
    }
    Ok(())
}

/// Task created by the innermost enclosing task element, if any.
fn enclosing_task(ancestors: &[Frame]) -> Option<&(String, Task)> {
    ancestors.last().and_then(|frame| frame.task.as_ref())
}

fn push_text(stack: &mut [Frame], text: &str) -> ModelMgrResult<()> {
    match stack.last_mut() {
        Some(frame) if frame.rule.text => {
            frame.text.push_str(text);
            Ok(())
        }
        Some(frame) if !text.trim().is_empty() => Err(import_error(&frame.name, "unexpected text".to_string())),
        None if !text.trim().is_empty() => Err(import_error("/", "text outside the root element".to_string())),
        _ => Ok(()),
    }
}

fn parse_bool(frame: &Frame, name: &str) -> ModelMgrResult<bool> {
    match frame.field(name)?.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(import_error(name, format!("expected 'true' or 'false', found '{other}'"))),
    }
}

fn parse_number<T: std::str::FromStr>(frame: &Frame, name: &str) -> ModelMgrResult<T> {
    let value = frame.attribute(name)?;
    value
        .trim()
        .parse()
        .map_err(|_| import_error(&frame.name, format!("invalid {name} '{value}'")))
}

fn normalized(codes: &[&str]) -> String {
    format!("/{}", codes.join("/"))
}

fn import_error(element: &str, message: String) -> ModelMgrError {
    ModelMgrError::XmlImport {
        element: element.to_string(),
        message,
    }
}
