#[cfg(test)]
mod tests {
    use actman::db::db::Db;
    use actman::libs::collaborator::{Collaborator, CollaboratorOrder, CollaboratorQuery};
    use actman::libs::config::ModelConfig;
    use actman::libs::contribution::Contribution;
    use actman::libs::duration::Duration;
    use actman::libs::error::{ModelError, ModelMgrResult};
    use actman::libs::model_mgr::ModelMgr;
    use actman::libs::task::Task;
    use chrono::NaiveDate;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct CollaboratorTestContext {
        _temp_dir: TempDir,
        mgr: ModelMgr,
    }

    impl TestContext for CollaboratorTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join("test.db")).unwrap();
            CollaboratorTestContext {
                mgr: ModelMgr::new(db, ModelConfig::default()),
                _temp_dir: temp_dir,
            }
        }
    }

    fn model_error<T: std::fmt::Debug>(result: ModelMgrResult<T>) -> ModelError {
        result.unwrap_err().as_model_error().cloned().expect("a business rule violation")
    }

    fn logins(collaborators: &[Collaborator]) -> Vec<&str> {
        collaborators.iter().map(|c| c.login.as_str()).collect()
    }

    #[test_context(CollaboratorTestContext)]
    #[test]
    fn test_create_and_find_by_login(ctx: &mut CollaboratorTestContext) {
        let created = ctx.mgr.create_collaborator(&Collaborator::new("jdoe", "John", "Doe")).unwrap();
        assert!(created.id > 0);
        assert!(created.is_active);

        let found = ctx.mgr.get_collaborator_by_login("jdoe").unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(ctx.mgr.get_collaborator(created.id).unwrap(), Some(created));
        assert!(ctx.mgr.get_collaborator_by_login("nobody").unwrap().is_none());
    }

    #[test_context(CollaboratorTestContext)]
    #[test]
    fn test_login_must_be_unique(ctx: &mut CollaboratorTestContext) {
        ctx.mgr.create_collaborator(&Collaborator::new("jdoe", "John", "Doe")).unwrap();

        let err = model_error(ctx.mgr.create_collaborator(&Collaborator::new("jdoe", "Jane", "Doe")));
        assert_eq!(err, ModelError::LoginAlreadyInUse("jdoe".to_string()));
        assert_eq!(ctx.mgr.get_collaborators_count(false).unwrap(), 1);
    }

    #[test_context(CollaboratorTestContext)]
    #[test]
    fn test_generated_logins_use_the_prefix(ctx: &mut CollaboratorTestContext) {
        let first = ctx.mgr.create_new_collaborator().unwrap();
        let second = ctx.mgr.create_new_collaborator().unwrap();
        let third = ctx.mgr.create_new_collaborator().unwrap();

        assert_eq!(first.login, "login");
        assert_eq!(second.login, "login1");
        assert_eq!(third.login, "login2");
    }

    #[test_context(CollaboratorTestContext)]
    #[test]
    fn test_update_collaborator(ctx: &mut CollaboratorTestContext) {
        ctx.mgr.create_collaborator(&Collaborator::new("jdoe", "John", "Doe")).unwrap();
        let mut other = ctx.mgr.create_collaborator(&Collaborator::new("asmith", "Alice", "Smith")).unwrap();

        other.first_name = "Alicia".to_string();
        other.is_active = false;
        ctx.mgr.update_collaborator(&other).unwrap();
        let stored = ctx.mgr.get_collaborator(other.id).unwrap().unwrap();
        assert_eq!(stored.first_name, "Alicia");
        assert!(!stored.is_active);

        other.login = "jdoe".to_string();
        let err = model_error(ctx.mgr.update_collaborator(&other));
        assert_eq!(err, ModelError::LoginAlreadyInUse("jdoe".to_string()));
        assert_eq!(ctx.mgr.get_collaborator(other.id).unwrap().unwrap().login, "asmith");
    }

    #[test_context(CollaboratorTestContext)]
    #[test]
    fn test_listing_order_and_activity(ctx: &mut CollaboratorTestContext) {
        ctx.mgr.create_collaborator(&Collaborator::new("bob", "Bob", "Zimmer")).unwrap();
        ctx.mgr.create_collaborator(&Collaborator::new("alice", "Alice", "Young")).unwrap();
        let mut carol = ctx.mgr.create_collaborator(&Collaborator::new("carol", "Carol", "Xu")).unwrap();
        carol.is_active = false;
        ctx.mgr.update_collaborator(&carol).unwrap();

        let all = ctx.mgr.get_collaborators(&CollaboratorQuery::default()).unwrap();
        assert_eq!(logins(&all), vec!["alice", "bob", "carol"]);

        let by_last_name = ctx
            .mgr
            .get_collaborators(&CollaboratorQuery {
                order_by: CollaboratorOrder::LastName,
                ascending: false,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(logins(&by_last_name), vec!["bob", "alice", "carol"]);

        let active = ctx.mgr.get_active_collaborators().unwrap();
        assert_eq!(logins(&active), vec!["alice", "bob"]);
        assert_eq!(ctx.mgr.get_collaborators_count(true).unwrap(), 2);
        assert_eq!(ctx.mgr.get_collaborators_count(false).unwrap(), 3);

        let page = ctx
            .mgr
            .get_collaborators(&CollaboratorQuery {
                offset: Some(1),
                limit: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(logins(&page), vec!["bob"]);
    }

    #[test_context(CollaboratorTestContext)]
    #[test]
    fn test_remove_collaborator(ctx: &mut CollaboratorTestContext) {
        let idle = ctx.mgr.create_collaborator(&Collaborator::new("idle", "", "")).unwrap();
        let busy = ctx.mgr.create_collaborator(&Collaborator::new("busy", "", "")).unwrap();
        let task = ctx.mgr.create_task(None, &Task::new("PRJ", "Project")).unwrap();
        ctx.mgr.create_duration(&Duration::new(100)).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        ctx.mgr
            .create_contribution(&Contribution::new(busy.id, task.id, date, 100), false)
            .unwrap();

        ctx.mgr.remove_collaborator(&idle).unwrap();
        assert!(ctx.mgr.get_collaborator(idle.id).unwrap().is_none());

        let err = model_error(ctx.mgr.remove_collaborator(&busy));
        assert_eq!(
            err,
            ModelError::CollaboratorHasContributions {
                login: "busy".to_string(),
                count: 1
            }
        );
        assert!(ctx.mgr.get_collaborator(busy.id).unwrap().is_some());
    }
}
