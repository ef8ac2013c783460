//! Repository for the read-only reference tables: `po_catalog`,
//! `defect_codes` and `defect_locations`.
//!
//! Every lookup returns distinct, non-empty values in ascending order.
//! Column and table names are compile-time constants; user input is only
//! ever bound as a parameter.

use sqlx::PgPool;

use crate::models::catalog::{ColorOption, StyleOption};

/// Cascading lookups behind the inspection form's drop-downs.
pub struct CatalogRepo;

impl CatalogRepo {
    pub async fn plants(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        distinct(pool, "po_catalog", "plant", None).await
    }

    pub async fn modules(pool: &PgPool, plant: &str) -> Result<Vec<String>, sqlx::Error> {
        distinct(pool, "po_catalog", "module", Some(("plant", plant))).await
    }

    pub async fn purchase_orders(pool: &PgPool, module: &str) -> Result<Vec<String>, sqlx::Error> {
        distinct(pool, "po_catalog", "purchase_order", Some(("module", module))).await
    }

    pub async fn sizes(pool: &PgPool, po: &str) -> Result<Vec<String>, sqlx::Error> {
        distinct(pool, "po_catalog", "size", Some(("purchase_order", po))).await
    }

    pub async fn customers(pool: &PgPool, po: &str) -> Result<Vec<String>, sqlx::Error> {
        distinct(pool, "po_catalog", "customer", Some(("purchase_order", po))).await
    }

    pub async fn customer_po_numbers(pool: &PgPool, po: &str) -> Result<Vec<String>, sqlx::Error> {
        distinct(pool, "po_catalog", "customer_po_number", Some(("purchase_order", po))).await
    }

    /// Styles for a purchase order, each with the customer it was cut for.
    pub async fn styles(pool: &PgPool, po: &str) -> Result<Vec<StyleOption>, sqlx::Error> {
        sqlx::query_as::<_, StyleOption>(
            "SELECT DISTINCT style, customer FROM po_catalog \
             WHERE purchase_order = $1 AND style IS NOT NULL AND style <> '' \
             ORDER BY style, customer",
        )
        .bind(po)
        .fetch_all(pool)
        .await
    }

    /// Colour codes for a purchase order with their descriptions.
    pub async fn colors(pool: &PgPool, po: &str) -> Result<Vec<ColorOption>, sqlx::Error> {
        sqlx::query_as::<_, ColorOption>(
            "SELECT DISTINCT color_code, color_description FROM po_catalog \
             WHERE purchase_order = $1 AND color_code IS NOT NULL AND color_code <> '' \
             ORDER BY color_code, color_description",
        )
        .bind(po)
        .fetch_all(pool)
        .await
    }

    pub async fn defect_categories(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        distinct(pool, "defect_codes", "category", None).await
    }

    pub async fn defect_codes(pool: &PgPool, category: &str) -> Result<Vec<String>, sqlx::Error> {
        distinct(pool, "defect_codes", "code", Some(("category", category))).await
    }

    pub async fn location_categories(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        distinct(pool, "defect_locations", "category", None).await
    }

    pub async fn defect_locations(
        pool: &PgPool,
        category: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        distinct(pool, "defect_locations", "location", Some(("category", category))).await
    }
}

/// `SELECT DISTINCT column FROM table [WHERE key = $1]`, skipping nulls and
/// blanks.
async fn distinct(
    pool: &PgPool,
    table: &'static str,
    column: &'static str,
    key: Option<(&'static str, &str)>,
) -> Result<Vec<String>, sqlx::Error> {
    match key {
        None => {
            let query = format!(
                "SELECT DISTINCT {column} FROM {table} \
                 WHERE {column} IS NOT NULL AND {column} <> '' \
                 ORDER BY {column}"
            );
            sqlx::query_scalar::<_, String>(&query).fetch_all(pool).await
        }
        Some((key_column, value)) => {
            let query = format!(
                "SELECT DISTINCT {column} FROM {table} \
                 WHERE {key_column} = $1 AND {column} IS NOT NULL AND {column} <> '' \
                 ORDER BY {column}"
            );
            sqlx::query_scalar::<_, String>(&query)
                .bind(value)
                .fetch_all(pool)
                .await
        }
    }
}
