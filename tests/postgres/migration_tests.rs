//! `PostgreSQL` integration tests for the embedded schema migrations.

use crate::postgres::helpers::{
    BoxError, PostgresCluster, PreparedStore, postgres_cluster, prepare_store,
};
use diesel::prelude::*;
use fieldtask::migrations;
use rstest::{fixture, rstest};

#[fixture]
async fn store(
    postgres_cluster: Option<PostgresCluster>,
) -> Result<Option<PreparedStore>, BoxError> {
    let Some(cluster) = postgres_cluster else {
        return Ok(None);
    };
    Ok(Some(prepare_store(cluster).await?))
}

#[derive(diesel::QueryableByName)]
struct TableCount {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    count: i64,
}

fn schema_table_count(conn: &mut PgConnection) -> Result<i64, BoxError> {
    let row = diesel::sql_query(concat!(
        "SELECT COUNT(*) AS count FROM information_schema.tables ",
        "WHERE table_schema = 'public' ",
        "AND table_name IN ('projects', 'tasks', 'task_events', 'users', 'user_profile')",
    ))
    .get_result::<TableCount>(conn)?;
    Ok(row.count)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn migrations_revert_and_reapply_cleanly(
    #[future] store: Result<Option<PreparedStore>, BoxError>,
) -> Result<(), BoxError> {
    let Some(store) = store.await? else {
        return Ok(());
    };
    let url = store.temp_db.url();

    let counts = tokio::task::spawn_blocking(move || -> Result<(i64, i64, i64), BoxError> {
        let mut conn = PgConnection::establish(&url)?;
        let migrated = schema_table_count(&mut conn)?;
        migrations::revert_all(&mut conn)?;
        let reverted = schema_table_count(&mut conn)?;
        migrations::apply_all(&mut conn)?;
        let reapplied = schema_table_count(&mut conn)?;
        Ok((migrated, reverted, reapplied))
    })
    .await??;

    assert_eq!(counts, (5, 0, 5));
    Ok(())
}
