//! Existence resolver and statement builder round trips on in-memory SQLite.
//!
//! Statements generated by the builders are executed for real; the resolver
//! must see what CREATE made and stop seeing it after DROP.

#![cfg(feature = "sqlite")]

use sqlscope_core::{
    ArtifactKind, CallContext, CatalogConnection, DataSource, DataType, Dialect, DialectKind, Result,
    builders::ColumnDefinition,
    connection::{PoolSettings, sqlite::SqliteDataSource},
    resolver::exists,
};

async fn create_test_source() -> Result<SqliteDataSource> {
    SqliteDataSource::connect("sqlite::memory:", PoolSettings::default()).await
}

async fn acquire(source: &SqliteDataSource) -> Box<dyn CatalogConnection> {
    source.acquire().await.unwrap()
}

fn sqlite_dialect() -> Dialect {
    Dialect::for_kind(DialectKind::SQLite, false)
}

#[tokio::test]
async fn test_nonexistent_artifacts_are_absent_for_every_kind() -> Result<()> {
    let source = create_test_source().await?;
    let mut connection = acquire(&source).await;
    let context = CallContext::new();

    for kind in DialectKind::ALL {
        let dialect = Dialect::for_kind(kind, false);
        for artifact in ArtifactKind::ALL {
            let found = exists(
                connection.as_mut(),
                &dialect,
                &context,
                "nonexistent_xyz",
                artifact,
            )
            .await?;
            assert!(!found, "{kind} {artifact}");
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_create_check_drop_round_trip() -> Result<()> {
    let source = create_test_source().await?;
    let mut connection = acquire(&source).await;
    let dialect = sqlite_dialect();
    let context = CallContext::new();

    let create = dialect
        .create()
        .table("WIDGETS")
        .column(
            ColumnDefinition::new("ID", DataType::Integer)
                .primary_key()
                .identity(),
        )
        .column(ColumnDefinition::new("LABEL", DataType::Varchar).length(40).not_null())
        .generate()?;
    assert_eq!(
        create,
        "CREATE TABLE WIDGETS (ID INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, LABEL VARCHAR(40) NOT NULL)"
    );
    connection.execute(&create).await.unwrap();
    assert!(exists(connection.as_mut(), &dialect, &context, "WIDGETS", ArtifactKind::Table).await?);

    let view = dialect
        .create()
        .view("LABELS")
        .as_select("SELECT LABEL FROM WIDGETS")
        .generate()?;
    connection.execute(&view).await.unwrap();
    assert!(exists(connection.as_mut(), &dialect, &context, "LABELS", ArtifactKind::View).await?);

    let drop_view = dialect.drop().view("LABELS").generate()?;
    connection.execute(&drop_view).await.unwrap();
    assert!(!exists(connection.as_mut(), &dialect, &context, "LABELS", ArtifactKind::View).await?);

    let drop_table = dialect.drop().table("WIDGETS").if_exists().generate()?;
    assert_eq!(drop_table, "DROP TABLE IF EXISTS WIDGETS");
    connection.execute(&drop_table).await.unwrap();
    assert!(!exists(connection.as_mut(), &dialect, &context, "WIDGETS", ArtifactKind::Table).await?);
    Ok(())
}

#[tokio::test]
async fn test_dml_builders_execute() -> Result<()> {
    let source = create_test_source().await?;
    let mut connection = acquire(&source).await;
    let dialect = sqlite_dialect();

    let create = dialect
        .create()
        .table("ORDERS")
        .column(
            ColumnDefinition::new("ID", DataType::Integer)
                .primary_key()
                .identity(),
        )
        .column(ColumnDefinition::new("STATUS", DataType::Varchar).default_value("'open'"))
        .column(ColumnDefinition::new("TOTAL", DataType::Decimal).precision(10, 2))
        .generate()?;
    connection.execute(&create).await.unwrap();

    let insert = dialect
        .insert()
        .into("ORDERS")
        .column("TOTAL")
        .value("12.50")
        .generate()?;
    assert_eq!(connection.execute(&insert).await.unwrap(), 1);

    let lastval = dialect.lastval(Vec::<String>::new()).generate()?;
    let result = connection.query(&lastval).await.unwrap();
    assert_eq!(result.rows, vec![vec![Some("1".to_string())]]);

    let update = dialect
        .update()
        .table("ORDERS")
        .set("STATUS", "upper('shipped')")
        .where_clause("ID = 1")
        .generate()?;
    assert_eq!(connection.execute(&update).await.unwrap(), 1);

    let select = dialect
        .select()
        .column("STATUS")
        .from("ORDERS")
        .where_clause("TOTAL > 10")
        .limit(1)
        .generate()?;
    let result = connection.query(&select).await.unwrap();
    assert_eq!(result.column_values_or_first("STATUS"), vec!["SHIPPED".to_string()]);

    let delete = dialect.delete().from("ORDERS").where_clause("ID = 1").generate()?;
    assert_eq!(connection.execute(&delete).await.unwrap(), 1);
    Ok(())
}

#[tokio::test]
async fn test_connection_released_after_check() -> Result<()> {
    // Single-connection pool: a leaked connection would make the second
    // acquire time out.
    let source = SqliteDataSource::connect(
        "sqlite::memory:",
        PoolSettings {
            max_connections: 1,
            acquire_timeout: std::time::Duration::from_millis(500),
        },
    )
    .await?;
    let dialect = sqlite_dialect();
    let context = CallContext::new();

    for _ in 0..3 {
        let mut connection = acquire(&source).await;
        assert!(!exists(connection.as_mut(), &dialect, &context, "MISSING", ArtifactKind::Table).await?);
    }
    Ok(())
}
