//! Runs against a real database when `DATABASE_URL` is set; skipped otherwise.

use learnhub_auth::{
    ConfigStore, IssuerRegistry, PostgresConfigStore, PostgresIssuerRegistry,
    PostgresUserDirectory, ServiceType, UserDirectory,
};
use sqlx::PgPool;
use uuid::Uuid;

async fn setup_test_db() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres adapter test");
        return None;
    };

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

async fn insert_issuer(pool: &PgPool, name: &str, enabled: bool, sortorder: i32) -> i64 {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO oauth2_issuer (name, enabled, servicetype, clientsecret, sortorder)
        VALUES ($1, $2, 'apple', 'h.p.s', $3)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(enabled)
    .bind(sortorder)
    .fetch_one(pool)
    .await
    .expect("Failed to insert issuer")
}

async fn insert_user(pool: &PgPool, email: &str, lang: Option<&str>, deleted: bool) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, first_name, last_name, lang, confirmed, deleted_at)
        VALUES ($1, $2, $3, 'Alex', 'Admin', $4, TRUE, CASE WHEN $5 THEN NOW() END)
        "#,
    )
    .bind(id)
    .bind(format!("user-{}", id.simple()))
    .bind(email)
    .bind(lang)
    .bind(deleted)
    .execute(pool)
    .await
    .expect("Failed to insert user");
    id
}

#[tokio::test]
async fn test_issuer_registry_enabled_filter_and_order() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let tag = Uuid::new_v4().simple().to_string();

    let enabled_id = insert_issuer(&pool, &format!("enabled-{}", tag), true, 2).await;
    let disabled_id = insert_issuer(&pool, &format!("disabled-{}", tag), false, 1).await;

    let registry = PostgresIssuerRegistry::new(pool.clone());

    let enabled_only = registry.list_issuers(false).await.unwrap();
    assert!(enabled_only.iter().any(|i| i.id == enabled_id));
    assert!(enabled_only.iter().all(|i| i.id != disabled_id));

    let all = registry.list_issuers(true).await.unwrap();
    let position = |id: i64| all.iter().position(|i| i.id == id).unwrap();
    assert!(position(disabled_id) < position(enabled_id));

    let enabled = &all[position(enabled_id)];
    assert_eq!(enabled.service_type, ServiceType::Apple);
    assert_eq!(enabled.client_secret, "h.p.s");
    assert!(!all[position(disabled_id)].enabled);

    sqlx::query("DELETE FROM oauth2_issuer WHERE id = ANY($1)")
        .bind(vec![enabled_id, disabled_id])
        .execute(&pool)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_user_directory_lookups() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let tag = Uuid::new_v4().simple().to_string();
    let email = format!("Ops.{}@Example.EDU", tag);
    let gone_email = format!("gone.{}@example.edu", tag);

    let id = insert_user(&pool, &email, Some("fr"), false).await;
    let gone_id = insert_user(&pool, &gone_email, None, true).await;

    let directory = PostgresUserDirectory::new(pool.clone());

    let found = directory
        .find_by_email(&format!("  ops.{}@example.edu ", tag))
        .await
        .unwrap()
        .expect("lookup should ignore case and whitespace");
    assert_eq!(found.id, Some(id));
    assert_eq!(found.email, email);
    assert_eq!(found.locale.as_deref(), Some("fr"));
    assert!(!found.is_synthetic());

    let by_id = directory.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(by_id.email, email);

    assert!(directory.find_by_email(&gone_email).await.unwrap().is_none());
    assert!(directory.find_by_id(gone_id).await.unwrap().is_none());
    assert!(directory.find_by_id(Uuid::new_v4()).await.unwrap().is_none());

    sqlx::query("DELETE FROM users WHERE id = ANY($1)")
        .bind(vec![id, gone_id])
        .execute(&pool)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_config_store_reads_plugin_settings() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let plugin = format!("auth_oauth2_{}", Uuid::new_v4().simple());

    sqlx::query(
        r#"
        INSERT INTO config_plugins (plugin, name, value)
        VALUES ($1, 'applereminderemails', 'a@x.com,b@x.com')
        "#,
    )
    .bind(&plugin)
    .execute(&pool)
    .await
    .unwrap();

    let store = PostgresConfigStore::new(pool.clone());

    assert_eq!(
        store.get(&plugin, "applereminderemails").await.unwrap(),
        Some("a@x.com,b@x.com".to_string())
    );
    assert_eq!(store.get(&plugin, "siteadmins").await.unwrap(), None);

    sqlx::query("DELETE FROM config_plugins WHERE plugin = $1")
        .bind(&plugin)
        .execute(&pool)
        .await
        .unwrap();
}
