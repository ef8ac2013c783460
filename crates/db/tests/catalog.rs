//! Integration tests for the reference-data lookups and notification tables.

use fca_db::models::notification::NewEmailLog;
use fca_db::repositories::{CatalogRepo, NotificationRepo};
use sqlx::PgPool;

async fn seed_catalog(pool: &PgPool) {
    sqlx::query(
        "INSERT INTO po_catalog \
            (plant, module, purchase_order, size, customer, style, color_code, color_description) \
         VALUES \
            ('P1', 'M1', 'PO-1', 'M', 'Acme', 'ST-1', 'BLK', 'Black'), \
            ('P1', 'M1', 'PO-1', 'L', 'Acme', 'ST-1', 'BLK', 'Black'), \
            ('P1', 'M2', 'PO-2', '',  NULL,   NULL,   NULL,  NULL), \
            ('P2', 'M9', 'PO-9', 'S', 'Zed',  'ST-9', 'RED', 'Red')",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO defect_codes (category, code) VALUES \
            ('Sewing', 'S02'), ('Sewing', 'S01'), ('Fabric', 'F01')",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO defect_locations (category, location) VALUES \
            ('Front', 'Collar'), ('Front', 'Pocket'), ('Back', 'Yoke')",
    )
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cascading_po_lookups(pool: PgPool) {
    seed_catalog(&pool).await;

    assert_eq!(CatalogRepo::plants(&pool).await.unwrap(), vec!["P1", "P2"]);
    assert_eq!(CatalogRepo::modules(&pool, "P1").await.unwrap(), vec!["M1", "M2"]);
    assert_eq!(CatalogRepo::purchase_orders(&pool, "M1").await.unwrap(), vec!["PO-1"]);
    assert_eq!(CatalogRepo::sizes(&pool, "PO-1").await.unwrap(), vec!["L", "M"]);
    assert!(CatalogRepo::sizes(&pool, "PO-2").await.unwrap().is_empty());
    assert_eq!(CatalogRepo::customers(&pool, "PO-1").await.unwrap(), vec!["Acme"]);

    let styles = CatalogRepo::styles(&pool, "PO-1").await.unwrap();
    assert_eq!(styles.len(), 1);
    assert_eq!(styles[0].style, "ST-1");
    assert_eq!(styles[0].customer.as_deref(), Some("Acme"));

    let colors = CatalogRepo::colors(&pool, "PO-9").await.unwrap();
    assert_eq!(colors.len(), 1);
    assert_eq!(colors[0].color_code, "RED");

    // Parameters are bound, never spliced.
    assert!(CatalogRepo::modules(&pool, "P1' OR '1'='1").await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_defect_code_and_location_lookups(pool: PgPool) {
    seed_catalog(&pool).await;

    assert_eq!(CatalogRepo::defect_categories(&pool).await.unwrap(), vec!["Fabric", "Sewing"]);
    assert_eq!(CatalogRepo::defect_codes(&pool, "Sewing").await.unwrap(), vec!["S01", "S02"]);
    assert_eq!(CatalogRepo::location_categories(&pool).await.unwrap(), vec!["Back", "Front"]);
    assert_eq!(
        CatalogRepo::defect_locations(&pool, "Front").await.unwrap(),
        vec!["Collar", "Pocket"]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_recipients_and_email_log(pool: PgPool) {
    sqlx::query(
        "INSERT INTO plant_email_recipients (plant, email_type, email, is_active) VALUES \
            ('P1', 'cc', 'lead@example.com', TRUE), \
            ('P1', 'to', 'qa@example.com', TRUE), \
            ('P1', 'to', 'old@example.com', FALSE), \
            ('P2', 'to', 'other@example.com', TRUE)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let recipients = NotificationRepo::recipients(&pool, "P1").await.unwrap();
    let emails: Vec<_> = recipients.iter().map(|r| r.email.as_str()).collect();
    assert_eq!(emails, vec!["qa@example.com", "lead@example.com"]);

    NotificationRepo::log(
        &pool,
        &NewEmailLog {
            audit_id: None,
            recipients: "qa@example.com".to_string(),
            subject: "FCA Failure Notification - P1 - PO: PO-1".to_string(),
            status: "sent".to_string(),
            error_message: None,
        },
    )
    .await
    .unwrap();

    let logged: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM email_log")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(logged.0, 1);
}
