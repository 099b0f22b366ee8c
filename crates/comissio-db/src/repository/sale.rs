//! # Sale Repository
//!
//! Database operations for sales and sale items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create_with_items(sale, items)                                 │
//! │         (commissions already computed; one transaction)                │
//! │                                                                         │
//! │  2. ADD / EDIT ITEMS                                                   │
//! │     └── insert_item(item)         commission computed by the caller    │
//! │     └── update_item(item)         recomputed only when value changes   │
//! │                                                                         │
//! │  3. REASSIGN                                                           │
//! │     └── update_sale(sale)         seller/date; items stay as they are  │
//! │                                                                         │
//! │  4. DELETE                                                             │
//! │     └── delete(sale)              items cascade                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Commission values and rule strings are written once per item and read
//! back verbatim by reports. Policy changes never touch stored items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use comissio_core::report::ReportFilter;
use comissio_core::{Sale, SaleItem};

const SALE_COLUMNS: &str = "id, seller_id, sale_date, company_id, created_at, updated_at";

const ITEM_COLUMNS: &str = r#"
    id, sale_id, description, value,
    seller_commission_value, seller_commission_rule,
    manager_id, manager_commission_value, manager_commission_rule,
    company_id, created_at, updated_at
"#;

/// A sale together with its items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleWithItems {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a sale and all its items atomically.
    ///
    /// Either the sale and every item are stored, or nothing is.
    pub async fn create_with_items(&self, sale: &Sale, items: &[SaleItem]) -> DbResult<()> {
        debug!(id = %sale.id, seller_id = %sale.seller_id, items = items.len(), "Creating sale");

        let mut tx = self.pool.begin().await?;

        insert_sale(&mut tx, sale).await?;
        for item in items {
            insert_item(&mut tx, item).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Adds one item to an existing sale.
    pub async fn insert_item(&self, item: &SaleItem) -> DbResult<()> {
        debug!(sale_id = %item.sale_id, value = item.value, "Adding sale item");

        let mut tx = self.pool.begin().await?;
        insert_item(&mut tx, item).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Writes a sale's seller and date. Items are not recomputed.
    pub async fn update_sale(&self, sale: &Sale) -> DbResult<Sale> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                seller_id = ?3,
                sale_date = ?4,
                updated_at = ?5
            WHERE id = ?1 AND company_id = ?2
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.company_id)
        .bind(&sale.seller_id)
        .bind(sale.sale_date)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", &sale.id));
        }

        Ok(Sale {
            updated_at: now,
            ..sale.clone()
        })
    }

    /// Writes an item's description, value and commission columns.
    pub async fn update_item(&self, item: &SaleItem) -> DbResult<SaleItem> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sale_items SET
                description = ?3,
                value = ?4,
                seller_commission_value = ?5,
                seller_commission_rule = ?6,
                manager_id = ?7,
                manager_commission_value = ?8,
                manager_commission_rule = ?9,
                updated_at = ?10
            WHERE id = ?1 AND company_id = ?2
            "#,
        )
        .bind(&item.id)
        .bind(&item.company_id)
        .bind(&item.description)
        .bind(item.value)
        .bind(item.seller_commission_value)
        .bind(&item.seller_commission_rule)
        .bind(&item.manager_id)
        .bind(item.manager_commission_value)
        .bind(&item.manager_commission_rule)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SaleItem", &item.id));
        }

        Ok(SaleItem {
            updated_at: now,
            ..item.clone()
        })
    }

    /// Deletes a sale and, by cascade, its items.
    pub async fn delete(&self, company_id: &str, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1 AND company_id = ?2")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    pub async fn delete_item(&self, company_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM sale_items WHERE id = ?1 AND company_id = ?2")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SaleItem", id));
        }

        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn get(&self, company_id: &str, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1 AND company_id = ?2");

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    pub async fn get_with_items(&self, company_id: &str, id: &str) -> DbResult<Option<SaleWithItems>> {
        let Some(sale) = self.get(company_id, id).await? else {
            return Ok(None);
        };
        let items = self.items(&sale.id).await?;

        Ok(Some(SaleWithItems { sale, items }))
    }

    /// Items of a sale in insertion order.
    pub async fn items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY created_at, id");

        let items = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(sale_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    pub async fn get_item(&self, company_id: &str, id: &str) -> DbResult<Option<SaleItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM sale_items WHERE id = ?1 AND company_id = ?2");

        let item = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(id)
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Lists sales of a company matching the filter, newest first.
    pub async fn list(&self, company_id: &str, filter: &ReportFilter) -> DbResult<Vec<Sale>> {
        let sql = format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales
            WHERE company_id = ?1
              AND (?2 IS NULL OR sale_date >= ?2)
              AND (?3 IS NULL OR sale_date <= ?3)
              AND (?4 IS NULL OR seller_id = ?4)
            ORDER BY sale_date DESC, id
            "#
        );

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(company_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(&filter.seller_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Items of every sale of a company inside a period.
    ///
    /// Not narrowed by seller: a seller's manager overrides live on other
    /// sellers' sales.
    pub async fn items_in_period(
        &self,
        company_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT
                i.id, i.sale_id, i.description, i.value,
                i.seller_commission_value, i.seller_commission_rule,
                i.manager_id, i.manager_commission_value, i.manager_commission_rule,
                i.company_id, i.created_at, i.updated_at
            FROM sale_items i
            JOIN sales s ON s.id = i.sale_id
            WHERE s.company_id = ?1
              AND (?2 IS NULL OR s.sale_date >= ?2)
              AND (?3 IS NULL OR s.sale_date <= ?3)
            ORDER BY s.sale_date, i.created_at, i.id
            "#,
        )
        .bind(company_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn insert_sale(tx: &mut Transaction<'_, Sqlite>, sale: &Sale) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (id, seller_id, sale_date, company_id, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.seller_id)
    .bind(sale.sale_date)
    .bind(&sale.company_id)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_item(tx: &mut Transaction<'_, Sqlite>, item: &SaleItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, description, value,
            seller_commission_value, seller_commission_rule,
            manager_id, manager_commission_value, manager_commission_rule,
            company_id, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4,
            ?5, ?6,
            ?7, ?8, ?9,
            ?10, ?11, ?12
        )
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.description)
    .bind(item.value)
    .bind(item.seller_commission_value)
    .bind(&item.seller_commission_rule)
    .bind(&item.manager_id)
    .bind(item.manager_commission_value)
    .bind(&item.manager_commission_rule)
    .bind(&item.company_id)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
