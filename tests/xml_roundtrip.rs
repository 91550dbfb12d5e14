#[cfg(test)]
mod tests {
    use actman::db::db::Db;
    use actman::libs::collaborator::Collaborator;
    use actman::libs::config::ModelConfig;
    use actman::libs::contribution::{Contribution, ContributionFilter};
    use actman::libs::duration::Duration;
    use actman::libs::error::{ModelError, ModelMgrError, ModelMgrResult};
    use actman::libs::model_mgr::ModelMgr;
    use actman::libs::task::Task;
    use actman::libs::xml::{self, ImportSummary, ACTMAN_DTD, DTD_FILE_NAME};
    use chrono::NaiveDate;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct XmlTestContext {
        temp_dir: TempDir,
        source: ModelMgr,
        target: ModelMgr,
    }

    impl TestContext for XmlTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let source = ModelMgr::new(Db::open(temp_dir.path().join("source.db")).unwrap(), ModelConfig::default());
            let target = ModelMgr::new(Db::open(temp_dir.path().join("target.db")).unwrap(), ModelConfig::default());
            XmlTestContext {
                temp_dir,
                source,
                target,
            }
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn populate(mgr: &ModelMgr) {
        mgr.create_duration(&Duration {
            id: 25,
            is_active: false,
        })
        .unwrap();
        mgr.create_duration(&Duration::new(50)).unwrap();
        mgr.create_duration(&Duration::new(100)).unwrap();

        let jdoe = mgr.create_collaborator(&Collaborator::new("jdoe", "John", "Doe")).unwrap();
        let mut asmith = Collaborator::new("asmith", "Alice", "Smith");
        asmith.is_active = false;
        let asmith = mgr.create_collaborator(&asmith).unwrap();
        mgr.create_collaborator(&Collaborator::new("bot", "", "")).unwrap();

        let prj = mgr.create_task(None, &Task::new("PRJ", "Project")).unwrap();
        let dev = mgr
            .create_task(
                Some(&prj),
                &Task::new("DEV", "Development").with_amounts(1000, 50, 800).with_comment("Core & <api>"),
            )
            .unwrap();
        let doc = mgr
            .create_task(Some(&prj), &Task::new("DOC", "Documentation").with_amounts(200, 0, 150))
            .unwrap();
        let ops = mgr.create_task(None, &Task::new("OPS", "Operations")).unwrap();

        for contribution in [
            Contribution::new(jdoe.id, dev.id, date(1), 100),
            Contribution::new(asmith.id, doc.id, date(2), 50),
            Contribution::new(jdoe.id, ops.id, date(3), 50),
        ] {
            mgr.create_contribution(&contribution, false).unwrap();
        }
    }

    fn export_to_string(mgr: &ModelMgr) -> String {
        let mut out = Vec::new();
        xml::export(mgr, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn import_str(mgr: &ModelMgr, document: &str) -> ModelMgrResult<ImportSummary> {
        xml::import(mgr, document.as_bytes())
    }

    /// Element named by an import rejection.
    fn rejected_element(result: ModelMgrResult<ImportSummary>) -> String {
        match result {
            Err(ModelMgrError::XmlImport { element, .. }) => element,
            other => panic!("expected an XML import error, got {other:?}"),
        }
    }

    #[test_context(XmlTestContext)]
    #[test]
    fn test_export_then_import_reproduces_the_model(ctx: &mut XmlTestContext) {
        populate(&ctx.source);
        let document = export_to_string(&ctx.source);
        assert!(document.contains(r#"<!DOCTYPE model SYSTEM "actman.dtd">"#));
        assert!(document.contains("Core &amp; &lt;api&gt;"));

        let summary = import_str(&ctx.target, &document).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                durations: 3,
                collaborators: 3,
                tasks: 4,
                contributions: 3,
            }
        );

        let dev = ctx.target.get_task_by_code_path("/PRJ/DEV").unwrap();
        assert_eq!((dev.budget, dev.initially_consumed, dev.todo), (1000, 50, 800));
        assert_eq!(dev.comment.as_deref(), Some("Core & <api>"));
        assert!(!ctx.target.get_duration(25).unwrap().unwrap().is_active);
        let asmith = ctx.target.get_collaborator_by_login("asmith").unwrap().unwrap();
        assert!(!asmith.is_active);
        let bot = ctx.target.get_collaborator_by_login("bot").unwrap().unwrap();
        assert_eq!((bot.first_name.as_str(), bot.last_name.as_str()), ("", ""));
        assert_eq!(ctx.target.get_contributions_sum(&ContributionFilter::new()).unwrap(), 200);

        assert_eq!(export_to_string(&ctx.target), document);
    }

    #[test_context(XmlTestContext)]
    #[test]
    fn test_free_text_keeps_its_whitespace(ctx: &mut XmlTestContext) {
        let task = Task::new("A", "  padded name ").with_comment("line1\nline2\n");
        ctx.source.create_task(None, &task).unwrap();
        ctx.source
            .create_collaborator(&Collaborator::new("jdoe", " John", "Doe  "))
            .unwrap();

        import_str(&ctx.target, &export_to_string(&ctx.source)).unwrap();

        let imported = ctx.target.get_task_by_code_path("/A").unwrap();
        assert_eq!(imported.name, "  padded name ");
        assert_eq!(imported.comment.as_deref(), Some("line1\nline2\n"));
        let jdoe = ctx.target.get_collaborator_by_login("jdoe").unwrap().unwrap();
        assert_eq!((jdoe.first_name.as_str(), jdoe.last_name.as_str()), (" John", "Doe  "));
    }

    #[test_context(XmlTestContext)]
    #[test]
    fn test_sub_tasks_are_nested_in_their_parent(ctx: &mut XmlTestContext) {
        populate(&ctx.source);
        let document = export_to_string(&ctx.source);

        let prj = document.find("<path>/PRJ</path>").unwrap();
        let dev = document.find("<path>/PRJ/DEV</path>").unwrap();
        let doc = document.find("<path>/PRJ/DOC</path>").unwrap();
        let ops = document.find("<path>/OPS</path>").unwrap();
        assert!(prj < dev && dev < doc && doc < ops);
        // /PRJ closes after its last child, before /OPS starts
        let prj_end = doc + document[doc..].find("</task>").unwrap() + "</task>".len();
        assert!(document[prj_end..ops].contains("</task>"));
    }

    #[test_context(XmlTestContext)]
    #[test]
    fn test_nested_tasks_are_created_under_their_parent(ctx: &mut XmlTestContext) {
        let document = r#"<model>
  <durations/><collaborators/>
  <tasks>
    <task>
      <path>/PRJ</path><name>Project</name><budget>0</budget><initially-consumed>0</initially-consumed><todo>0</todo>
      <task>
        <path>/PRJ/DEV</path><name>Development</name><budget>0</budget><initially-consumed>0</initially-consumed><todo>0</todo>
        <task><path>/PRJ/DEV/API</path><name>Api</name><budget>0</budget><initially-consumed>0</initially-consumed><todo>0</todo></task>
      </task>
      <task><path>/PRJ/DOC</path><name>Documentation</name><budget>1</budget><initially-consumed>0</initially-consumed><todo>1</todo></task>
    </task>
  </tasks>
  <contributions/>
</model>"#;
        let summary = import_str(&ctx.target, document).unwrap();
        assert_eq!(summary.tasks, 4);

        let prj = ctx.target.get_task_by_code_path("/PRJ").unwrap();
        let subs: Vec<String> = ctx
            .target
            .get_sub_tasks(Some(&prj))
            .unwrap()
            .into_iter()
            .map(|task| task.code)
            .collect();
        assert_eq!(subs, vec!["DEV", "DOC"]);
        let doc = ctx.target.get_task_by_code_path("/PRJ/DOC").unwrap();
        assert_eq!((doc.budget, doc.todo), (100, 100));
        let api = ctx.target.get_task_by_code_path("/PRJ/DEV/API").unwrap();
        assert_eq!(ctx.target.get_task_code_path(&api).unwrap(), "/PRJ/DEV/API");
    }

    #[test_context(XmlTestContext)]
    #[test]
    fn test_nested_task_path_must_match_its_parent(ctx: &mut XmlTestContext) {
        let document = r#"<model>
  <durations/><collaborators/>
  <tasks>
    <task>
      <path>/PRJ</path><name>Project</name><budget>0</budget><initially-consumed>0</initially-consumed><todo>0</todo>
      <task><path>/OPS/RUN</path><name>Run</name><budget>0</budget><initially-consumed>0</initially-consumed><todo>0</todo></task>
    </task>
  </tasks>
  <contributions/>
</model>"#;
        assert_eq!(rejected_element(import_str(&ctx.target, document)), "task");
    }

    #[test_context(XmlTestContext)]
    #[test]
    fn test_task_fields_must_precede_sub_tasks(ctx: &mut XmlTestContext) {
        let document = r#"<model>
  <durations/><collaborators/>
  <tasks>
    <task>
      <path>/PRJ</path><name>Project</name><budget>0</budget><initially-consumed>0</initially-consumed><todo>0</todo>
      <task><path>/PRJ/DEV</path><name>Dev</name><budget>0</budget><initially-consumed>0</initially-consumed><todo>0</todo></task>
      <comment>late</comment>
    </task>
  </tasks>
  <contributions/>
</model>"#;
        assert_eq!(rejected_element(import_str(&ctx.target, document)), "task");

        let missing_fields = r#"<model>
  <durations/><collaborators/>
  <tasks>
    <task>
      <path>/PRJ</path><name>Project</name>
      <task><path>/PRJ/DEV</path><name>Dev</name><budget>0</budget><initially-consumed>0</initially-consumed><todo>0</todo></task>
    </task>
  </tasks>
  <contributions/>
</model>"#;
        assert_eq!(rejected_element(import_str(&ctx.target, missing_fields)), "task");
    }

    #[test_context(XmlTestContext)]
    #[test]
    fn test_export_to_file_with_its_dtd(ctx: &mut XmlTestContext) {
        populate(&ctx.source);
        let path = ctx.temp_dir.path().join("model.xml");
        xml::export_to_file(&ctx.source, &path).unwrap();
        xml::write_dtd(ctx.temp_dir.path()).unwrap();

        let dtd = std::fs::read_to_string(ctx.temp_dir.path().join(DTD_FILE_NAME)).unwrap();
        assert_eq!(dtd, ACTMAN_DTD);

        let summary = xml::import_from_file(&ctx.target, &path).unwrap();
        assert_eq!(summary.contributions, 3);
        assert_eq!(ctx.target.get_all_tasks().unwrap().len(), 4);
    }

    #[test_context(XmlTestContext)]
    #[test]
    fn test_existing_durations_are_reused(ctx: &mut XmlTestContext) {
        ctx.target.create_duration(&Duration::new(25)).unwrap();
        ctx.target.create_duration(&Duration::new(50)).unwrap();
        populate(&ctx.source);

        let summary = import_str(&ctx.target, &export_to_string(&ctx.source)).unwrap();
        assert_eq!(summary.durations, 1);
        // The document's flag wins for an existing value
        assert!(!ctx.target.get_duration(25).unwrap().unwrap().is_active);
    }

    #[test_context(XmlTestContext)]
    #[test]
    fn test_unknown_element_is_rejected(ctx: &mut XmlTestContext) {
        let document = r#"<model>
  <durations><minutes>30</minutes></durations>
  <collaborators/><tasks/><contributions/>
</model>"#;
        assert_eq!(rejected_element(import_str(&ctx.target, document)), "durations");
    }

    #[test_context(XmlTestContext)]
    #[test]
    fn test_missing_child_is_rejected(ctx: &mut XmlTestContext) {
        let document = r#"<model>
  <durations/>
  <collaborators>
    <collaborator><login>jdoe</login><first-name>John</first-name><is-active>true</is-active></collaborator>
  </collaborators>
  <tasks/><contributions/>
</model>"#;
        assert_eq!(rejected_element(import_str(&ctx.target, document)), "collaborator");
        assert!(ctx.target.get_collaborator_by_login("jdoe").unwrap().is_none());
    }

    #[test_context(XmlTestContext)]
    #[test]
    fn test_sections_must_follow_the_grammar_order(ctx: &mut XmlTestContext) {
        let document = "<model><collaborators/><durations/><tasks/><contributions/></model>";
        assert_eq!(rejected_element(import_str(&ctx.target, document)), "model");

        let truncated = "<model><durations/><collaborators/><tasks/></model>";
        assert_eq!(rejected_element(import_str(&ctx.target, truncated)), "model");

        assert_eq!(rejected_element(import_str(&ctx.target, "<workbook/>")), "workbook");
    }

    #[test_context(XmlTestContext)]
    #[test]
    fn test_invalid_values_are_rejected(ctx: &mut XmlTestContext) {
        let document = r#"<model>
  <durations><duration><value>0.5</value><is-active>yes</is-active></duration></durations>
  <collaborators/><tasks/><contributions/>
</model>"#;
        assert_eq!(rejected_element(import_str(&ctx.target, document)), "is-active");

        let document = r#"<model>
  <durations/><collaborators/><tasks/>
  <contributions>
    <contribution year="2024" month="2" day="30" duration="1"><contributor-ref>jdoe</contributor-ref><task-ref>/PRJ</task-ref></contribution>
  </contributions>
</model>"#;
        assert_eq!(rejected_element(import_str(&ctx.target, document)), "contribution");
    }

    #[test_context(XmlTestContext)]
    #[test]
    fn test_unknown_login_stops_the_import(ctx: &mut XmlTestContext) {
        let document = r#"<model>
  <durations><duration><value>1</value><is-active>true</is-active></duration></durations>
  <collaborators/>
  <tasks>
    <task><path>/PRJ</path><name>Project</name><budget>0</budget><initially-consumed>0</initially-consumed><todo>0</todo></task>
  </tasks>
  <contributions>
    <contribution year="2024" month="2" day="5" duration="1"><contributor-ref>ghost</contributor-ref><task-ref>/PRJ</task-ref></contribution>
  </contributions>
</model>"#;
        let err = import_str(&ctx.target, document).unwrap_err();
        assert_eq!(err.as_model_error(), Some(&ModelError::UnknownLogin("ghost".to_string())));

        // Entities read before the failure remain
        assert!(ctx.target.get_task_by_code_path("/PRJ").is_ok());
        assert!(ctx.target.get_duration(100).unwrap().is_some());
    }
}
