#[cfg(test)]
mod tests {
    use actman::db::db::{table_exists, Db, MODEL_TABLES};
    use actman::db::migrations::{get_db_version, needs_migration, MigrationManager};
    use rusqlite::Connection;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct MigrationTestContext {
        temp_dir: TempDir,
    }

    impl TestContext for MigrationTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", temp_dir.path());
            std::env::set_var("LOCALAPPDATA", temp_dir.path());
            MigrationTestContext { temp_dir }
        }
    }

    impl MigrationTestContext {
        /// A bare connection with no schema applied.
        fn raw_connection(&self) -> Connection {
            Connection::open(self.temp_dir.path().join("raw.db")).unwrap()
        }
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migrations_run_automatically(ctx: &mut MigrationTestContext) {
        let db = Db::open(ctx.temp_dir.path().join("test.db")).unwrap();

        let version = get_db_version(&db.conn).unwrap();
        assert!(version > 0);
        assert_eq!(version, MigrationManager::new().latest_version());
        assert!(!needs_migration(&db.conn).unwrap());
        assert!(db.tables_exist().unwrap());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_fresh_connection_needs_migration(ctx: &mut MigrationTestContext) {
        let conn = ctx.raw_connection();
        assert_eq!(get_db_version(&conn).unwrap(), 0);
        assert!(needs_migration(&conn).unwrap());
        for table in MODEL_TABLES {
            assert!(!table_exists(&conn, table).unwrap());
        }
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migration_history(ctx: &mut MigrationTestContext) {
        let mut conn = ctx.raw_connection();
        let manager = MigrationManager::new();

        manager.run_migrations(&mut conn).unwrap();

        let history = manager.get_migration_history(&conn).unwrap();
        assert!(!history.is_empty());
        for (i, (version, _, _)) in history.iter().enumerate() {
            assert_eq!(*version as usize, i + 1);
        }
        assert!(manager.is_migration_applied(&conn, 1).unwrap());
        assert_eq!(history[0].1, "create_model_tables");
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migration_idempotency(ctx: &mut MigrationTestContext) {
        let mut conn = ctx.raw_connection();
        let manager = MigrationManager::new();

        manager.run_migrations(&mut conn).unwrap();
        let version1 = get_db_version(&conn).unwrap();

        manager.run_migrations(&mut conn).unwrap();
        let version2 = get_db_version(&conn).unwrap();

        assert_eq!(version1, version2);
        assert_eq!(manager.get_migration_history(&conn).unwrap().len(), version1 as usize);
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_reopening_keeps_the_data(ctx: &mut MigrationTestContext) {
        let path = ctx.temp_dir.path().join("test.db");
        {
            let db = Db::open(&path).unwrap();
            db.conn.execute("INSERT INTO duration (dur_id) VALUES (50)", []).unwrap();
        }

        let db = Db::open(&path).unwrap();
        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM duration", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
