//! Embedded SQL schema for the `PostgreSQL` adapters.
//!
//! Migrations are applied in order with [`apply_all`]. The statements are
//! plain SQL so they can also be run by external migration tooling from the
//! `migrations/` directory.

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::result::QueryResult;

/// A named schema migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    /// Directory name of the migration.
    pub name: &'static str,
    /// Forward SQL.
    pub up: &'static str,
    /// Reverse SQL.
    pub down: &'static str,
}

/// All migrations, oldest first.
pub const MIGRATIONS: [Migration; 2] = [
    Migration {
        name: "2026-10-01-000000_create_task_event_store",
        up: include_str!("../migrations/2026-10-01-000000_create_task_event_store/up.sql"),
        down: include_str!("../migrations/2026-10-01-000000_create_task_event_store/down.sql"),
    },
    Migration {
        name: "2026-10-01-000001_create_users_and_profiles",
        up: include_str!("../migrations/2026-10-01-000001_create_users_and_profiles/up.sql"),
        down: include_str!("../migrations/2026-10-01-000001_create_users_and_profiles/down.sql"),
    },
];

/// Applies every forward migration inside one transaction.
///
/// # Errors
///
/// Returns the first database error raised by a migration; no partial
/// schema is left behind.
pub fn apply_all(connection: &mut PgConnection) -> QueryResult<()> {
    use diesel::Connection;

    connection.transaction(|tx| {
        for migration in MIGRATIONS {
            tracing::debug!(migration = migration.name, "applying migration");
            tx.batch_execute(migration.up)?;
        }
        Ok(())
    })
}

/// Reverts every migration, newest first, inside one transaction.
///
/// # Errors
///
/// Returns the first database error raised by a reverse migration.
pub fn revert_all(connection: &mut PgConnection) -> QueryResult<()> {
    use diesel::Connection;

    connection.transaction(|tx| {
        for migration in MIGRATIONS.iter().rev() {
            tracing::debug!(migration = migration.name, "reverting migration");
            tx.batch_execute(migration.down)?;
        }
        Ok(())
    })
}
