#[cfg(test)]
mod tests {
    use actman::db::db::Db;
    use actman::libs::collaborator::Collaborator;
    use actman::libs::config::ModelConfig;
    use actman::libs::contribution::{Contribution, ContributionFilter};
    use actman::libs::duration::Duration;
    use actman::libs::error::{ModelError, ModelMgrResult};
    use actman::libs::model_mgr::ModelMgr;
    use actman::libs::task::Task;
    use chrono::NaiveDate;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    /// Model with `/PRJ/DEV`, `/PRJ/DOC` and `/OPS` leaves, two collaborators
    /// and durations 0.25, 0.50 and 1.00.
    struct ContributionTestContext {
        _temp_dir: TempDir,
        mgr: ModelMgr,
        prj: Task,
        dev: Task,
        doc: Task,
        ops: Task,
        jdoe: Collaborator,
        asmith: Collaborator,
    }

    impl TestContext for ContributionTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join("test.db")).unwrap();
            let mgr = ModelMgr::new(db, ModelConfig::default());

            for id in [25, 50, 100] {
                mgr.create_duration(&Duration::new(id)).unwrap();
            }
            let prj = mgr.create_task(None, &Task::new("PRJ", "Project")).unwrap();
            let dev = mgr
                .create_task(Some(&prj), &Task::new("DEV", "Development").with_amounts(1000, 0, 800))
                .unwrap();
            let doc = mgr
                .create_task(Some(&prj), &Task::new("DOC", "Documentation").with_amounts(200, 0, 30))
                .unwrap();
            let ops = mgr.create_task(None, &Task::new("OPS", "Operations")).unwrap();
            let jdoe = mgr.create_collaborator(&Collaborator::new("jdoe", "John", "Doe")).unwrap();
            let asmith = mgr.create_collaborator(&Collaborator::new("asmith", "Alice", "Smith")).unwrap();

            ContributionTestContext {
                _temp_dir: temp_dir,
                mgr,
                prj,
                dev,
                doc,
                ops,
                jdoe,
                asmith,
            }
        }
    }

    impl ContributionTestContext {
        fn todo(&self, task: &Task) -> i64 {
            self.mgr.get_task(task.id).unwrap().unwrap().todo
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn model_error<T: std::fmt::Debug>(result: ModelMgrResult<T>) -> ModelError {
        result.unwrap_err().as_model_error().cloned().expect("a business rule violation")
    }

    #[test_context(ContributionTestContext)]
    #[test]
    fn test_contribution_on_a_container_is_rejected(ctx: &mut ContributionTestContext) {
        // A gets a sub task B: A is no longer a leaf and must refuse contributions
        let a = ctx.mgr.create_task(None, &Task::new("A", "a")).unwrap();
        let b = ctx.mgr.create_task(Some(&a), &Task::new("B", "b")).unwrap();

        let err = model_error(
            ctx.mgr
                .create_contribution(&Contribution::new(ctx.jdoe.id, a.id, day(4), 100), true),
        );
        assert_eq!(err, ModelError::TaskWithSubtaskCannotAcceptContributions { code: "A".to_string() });

        ctx.mgr
            .create_contribution(&Contribution::new(ctx.jdoe.id, b.id, day(4), 100), true)
            .unwrap();
        assert_eq!(ctx.mgr.get_contributions_count(&ContributionFilter::new().task(&a)).unwrap(), 1);
    }

    #[test_context(ContributionTestContext)]
    #[test]
    fn test_unknown_references_are_rejected(ctx: &mut ContributionTestContext) {
        let err = model_error(ctx.mgr.create_contribution(&Contribution::new(999, ctx.dev.id, day(1), 100), false));
        assert_eq!(err, ModelError::CollaboratorNotFound(999));

        let err = model_error(ctx.mgr.create_contribution(&Contribution::new(ctx.jdoe.id, 999, day(1), 100), false));
        assert_eq!(err, ModelError::TaskNotFound(999));

        let err = model_error(ctx.mgr.create_contribution(&Contribution::new(ctx.jdoe.id, ctx.dev.id, day(1), 75), false));
        assert_eq!(err, ModelError::DurationNotFound(75));
    }

    #[test_context(ContributionTestContext)]
    #[test]
    fn test_one_contribution_per_collaborator_task_and_day(ctx: &mut ContributionTestContext) {
        let contribution = Contribution::new(ctx.jdoe.id, ctx.dev.id, day(5), 50);
        ctx.mgr.create_contribution(&contribution, false).unwrap();

        let err = model_error(ctx.mgr.create_contribution(&Contribution { duration_id: 100, ..contribution }, false));
        assert_eq!(
            err,
            ModelError::ContributionAlreadyExists {
                contributor_id: ctx.jdoe.id,
                task_id: ctx.dev.id,
                date: day(5)
            }
        );

        // Another collaborator, task or day is fine
        ctx.mgr
            .create_contribution(&Contribution::new(ctx.asmith.id, ctx.dev.id, day(5), 50), false)
            .unwrap();
        ctx.mgr
            .create_contribution(&Contribution::new(ctx.jdoe.id, ctx.doc.id, day(5), 50), false)
            .unwrap();
        ctx.mgr
            .create_contribution(&Contribution::new(ctx.jdoe.id, ctx.dev.id, day(6), 50), false)
            .unwrap();
        assert_eq!(ctx.mgr.get_contributions_count(&ContributionFilter::new()).unwrap(), 4);
    }

    #[test_context(ContributionTestContext)]
    #[test]
    fn test_todo_follows_recorded_time(ctx: &mut ContributionTestContext) {
        let contribution = Contribution::new(ctx.jdoe.id, ctx.dev.id, day(1), 100);
        ctx.mgr.create_contribution(&contribution, true).unwrap();
        assert_eq!(ctx.todo(&ctx.dev), 700);

        let updated = ctx.mgr.update_contribution(&contribution, 25, true).unwrap();
        assert_eq!(updated.duration_id, 25);
        assert_eq!(ctx.todo(&ctx.dev), 775);

        ctx.mgr.remove_contribution(&updated, true).unwrap();
        assert_eq!(ctx.todo(&ctx.dev), 800);
        assert_eq!(ctx.mgr.get_contributions_count(&ContributionFilter::new()).unwrap(), 0);
    }

    #[test_context(ContributionTestContext)]
    #[test]
    fn test_todo_never_goes_below_zero(ctx: &mut ContributionTestContext) {
        ctx.mgr
            .create_contribution(&Contribution::new(ctx.jdoe.id, ctx.doc.id, day(1), 50), true)
            .unwrap();
        assert_eq!(ctx.todo(&ctx.doc), 0);

        ctx.mgr
            .create_contribution(&Contribution::new(ctx.jdoe.id, ctx.doc.id, day(2), 25), false)
            .unwrap();
        assert_eq!(ctx.todo(&ctx.doc), 0);
    }

    #[test_context(ContributionTestContext)]
    #[test]
    fn test_stale_contributions_are_detected(ctx: &mut ContributionTestContext) {
        let contribution = Contribution::new(ctx.jdoe.id, ctx.dev.id, day(1), 100);
        ctx.mgr.create_contribution(&contribution, false).unwrap();
        ctx.mgr.update_contribution(&contribution, 50, false).unwrap();

        // `contribution` still holds the old duration
        let stale = ModelError::StaleContribution {
            contributor_id: ctx.jdoe.id,
            task_id: ctx.dev.id,
            date: day(1),
        };
        assert_eq!(model_error(ctx.mgr.update_contribution(&contribution, 25, true)), stale);
        assert_eq!(model_error(ctx.mgr.remove_contribution(&contribution, true)), stale);
        assert_eq!(ctx.todo(&ctx.dev), 800);

        // Without todo adjustment the stored duration does not matter
        ctx.mgr.remove_contribution(&contribution, false).unwrap();
        let err = model_error(ctx.mgr.remove_contribution(&contribution, false));
        assert_eq!(
            err,
            ModelError::ContributionNotFound {
                contributor_id: ctx.jdoe.id,
                task_id: ctx.dev.id,
                date: day(1)
            }
        );
    }

    #[test_context(ContributionTestContext)]
    #[test]
    fn test_contributions_move_to_another_leaf(ctx: &mut ContributionTestContext) {
        let first = Contribution::new(ctx.jdoe.id, ctx.dev.id, day(1), 100);
        let second = Contribution::new(ctx.jdoe.id, ctx.dev.id, day(2), 50);
        ctx.mgr.create_contribution(&first, false).unwrap();
        ctx.mgr.create_contribution(&second, false).unwrap();

        let err = model_error(ctx.mgr.change_contribution_task(&[first], &ctx.prj));
        assert_eq!(err, ModelError::TaskWithSubtaskCannotAcceptContributions { code: "PRJ".to_string() });

        let moved = ctx.mgr.change_contribution_task(&[first, second], &ctx.ops).unwrap();
        assert!(moved.iter().all(|c| c.task_id == ctx.ops.id));
        assert_eq!(ctx.mgr.get_contributions_count(&ContributionFilter::new().task(&ctx.dev)).unwrap(), 0);
        assert_eq!(ctx.mgr.get_contributions_sum(&ContributionFilter::new().task(&ctx.ops)).unwrap(), 150);
    }

    #[test_context(ContributionTestContext)]
    #[test]
    fn test_moving_onto_an_existing_contribution_rolls_back(ctx: &mut ContributionTestContext) {
        let on_dev = Contribution::new(ctx.jdoe.id, ctx.dev.id, day(1), 100);
        let on_doc = Contribution::new(ctx.jdoe.id, ctx.doc.id, day(1), 25);
        let other_day = Contribution::new(ctx.jdoe.id, ctx.dev.id, day(2), 50);
        ctx.mgr.create_contribution(&on_dev, false).unwrap();
        ctx.mgr.create_contribution(&on_doc, false).unwrap();
        ctx.mgr.create_contribution(&other_day, false).unwrap();

        let err = model_error(ctx.mgr.change_contribution_task(&[other_day, on_dev], &ctx.doc));
        assert!(matches!(err, ModelError::ContributionAlreadyExists { .. }));
        assert_eq!(ctx.mgr.get_contributions_count(&ContributionFilter::new().task(&ctx.dev)).unwrap(), 2);
        assert_eq!(ctx.mgr.get_contributions_count(&ContributionFilter::new().task(&ctx.doc)).unwrap(), 1);
    }

    #[test_context(ContributionTestContext)]
    #[test]
    fn test_filters_combine(ctx: &mut ContributionTestContext) {
        for (collaborator, task, d, duration) in [
            (&ctx.jdoe, &ctx.dev, 1, 100),
            (&ctx.jdoe, &ctx.doc, 2, 25),
            (&ctx.jdoe, &ctx.ops, 3, 50),
            (&ctx.asmith, &ctx.dev, 2, 50),
            (&ctx.asmith, &ctx.ops, 10, 100),
        ] {
            ctx.mgr
                .create_contribution(&Contribution::new(collaborator.id, task.id, day(d), duration), false)
                .unwrap();
        }

        // A container covers its whole sub tree
        let on_project = ContributionFilter::new().task(&ctx.prj);
        assert_eq!(ctx.mgr.get_contributions_count(&on_project).unwrap(), 3);
        assert_eq!(ctx.mgr.get_contributions_sum(&on_project).unwrap(), 175);

        let jdoe_on_project = on_project.clone().contributor(ctx.jdoe.id);
        assert_eq!(ctx.mgr.get_contributions_sum(&jdoe_on_project).unwrap(), 125);

        let first_days = ContributionFilter::new().from(day(2)).to(day(3));
        let dates: Vec<NaiveDate> = ctx.mgr.get_contributions(&first_days).unwrap().iter().map(|c| c.date).collect();
        assert_eq!(dates, vec![day(2), day(2), day(3)]);

        let open_ended = ContributionFilter::new().from(day(3));
        assert_eq!(ctx.mgr.get_contributions_sum(&open_ended).unwrap(), 150);

        // Ordered by date, then by task position
        let all = ctx.mgr.get_contributions(&ContributionFilter::new()).unwrap();
        let order: Vec<(u32, i64)> = all.iter().map(|c| (c.day(), c.task_id)).collect();
        assert_eq!(
            order,
            vec![(1, ctx.dev.id), (2, ctx.dev.id), (2, ctx.doc.id), (3, ctx.ops.id), (10, ctx.ops.id)]
        );
    }

    #[test_context(ContributionTestContext)]
    #[test]
    fn test_same_day_contributions_follow_tree_order(ctx: &mut ContributionTestContext) {
        // /OPS sits at the root level but comes after the whole /PRJ sub tree
        for task in [&ctx.ops, &ctx.doc, &ctx.dev] {
            ctx.mgr
                .create_contribution(&Contribution::new(ctx.jdoe.id, task.id, day(4), 25), false)
                .unwrap();
        }

        let tasks: Vec<i64> = ctx
            .mgr
            .get_contributions(&ContributionFilter::new())
            .unwrap()
            .iter()
            .map(|c| c.task_id)
            .collect();
        assert_eq!(tasks, vec![ctx.dev.id, ctx.doc.id, ctx.ops.id]);
    }

    #[test_context(ContributionTestContext)]
    #[test]
    fn test_contributors_and_years(ctx: &mut ContributionTestContext) {
        ctx.mgr
            .create_contribution(&Contribution::new(ctx.jdoe.id, ctx.dev.id, day(1), 100), false)
            .unwrap();
        ctx.mgr
            .create_contribution(&Contribution::new(ctx.asmith.id, ctx.ops.id, day(1), 100), false)
            .unwrap();
        let next_year = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        ctx.mgr
            .create_contribution(&Contribution::new(ctx.asmith.id, ctx.doc.id, next_year, 25), false)
            .unwrap();

        let logins = |contributors: Vec<Collaborator>| contributors.into_iter().map(|c| c.login).collect::<Vec<_>>();
        assert_eq!(logins(ctx.mgr.get_contributors(None, None, None).unwrap()), vec!["asmith", "jdoe"]);
        assert_eq!(
            logins(ctx.mgr.get_contributors(Some(&ctx.prj), None, Some(day(31))).unwrap()),
            vec!["jdoe"]
        );
        assert_eq!(ctx.mgr.get_contribution_years().unwrap(), vec![2024, 2025]);
    }
}
