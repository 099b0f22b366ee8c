//! # Seller Repository
//!
//! Database operations for seller commission policies.
//!
//! One seller per employee, enforced by `UNIQUE(sellers.employee_id)`. A
//! duplicate insert surfaces as `DbError::UniqueViolation` on
//! `employee_id`.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use comissio_core::Seller;

const SELLER_COLUMNS: &str =
    "id, employee_id, fixed_value, percentage_value, company_id, created_at, updated_at";

/// A seller with its employee's name, for listings and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SellerWithName {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub seller: Seller,
    pub employee_name: String,
}

/// Repository for seller database operations.
#[derive(Debug, Clone)]
pub struct SellerRepository {
    pool: SqlitePool,
}

impl SellerRepository {
    /// Creates a new SellerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SellerRepository { pool }
    }

    pub async fn insert(&self, seller: &Seller) -> DbResult<()> {
        debug!(id = %seller.id, employee_id = %seller.employee_id, "Inserting seller");

        sqlx::query(
            r#"
            INSERT INTO sellers (
                id, employee_id, fixed_value, percentage_value,
                company_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&seller.id)
        .bind(&seller.employee_id)
        .bind(seller.fixed_value)
        .bind(seller.percentage_value)
        .bind(&seller.company_id)
        .bind(seller.created_at)
        .bind(seller.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("employee_id", &seller.employee_id),
            other => other,
        })?;

        Ok(())
    }

    /// Gets a seller of the given company.
    pub async fn get(&self, company_id: &str, id: &str) -> DbResult<Option<Seller>> {
        let sql = format!("SELECT {SELLER_COLUMNS} FROM sellers WHERE id = ?1 AND company_id = ?2");

        let seller = sqlx::query_as::<_, Seller>(&sql)
            .bind(id)
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(seller)
    }

    /// Gets a seller by id regardless of company.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Seller>> {
        let sql = format!("SELECT {SELLER_COLUMNS} FROM sellers WHERE id = ?1");

        let seller = sqlx::query_as::<_, Seller>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(seller)
    }

    /// Returns the seller policy of an employee.
    ///
    /// Ordered like the manager lookup so the answer is stable even if the
    /// unique index were ever dropped.
    pub async fn find_by_employee(&self, employee_id: &str) -> DbResult<Option<Seller>> {
        let sql = format!(
            "SELECT {SELLER_COLUMNS} FROM sellers WHERE employee_id = ?1 ORDER BY created_at, id LIMIT 1"
        );

        let seller = sqlx::query_as::<_, Seller>(&sql)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(seller)
    }

    /// Lists the sellers of a company with employee names, sorted by name.
    pub async fn list(&self, company_id: &str) -> DbResult<Vec<SellerWithName>> {
        let sellers = sqlx::query_as::<_, SellerWithName>(
            r#"
            SELECT
                s.id, s.employee_id, s.fixed_value, s.percentage_value,
                s.company_id, s.created_at, s.updated_at,
                e.name AS employee_name
            FROM sellers s
            JOIN employees e ON e.id = s.employee_id
            WHERE s.company_id = ?1
            ORDER BY e.name, s.id
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sellers)
    }

    /// Seller id → employee name, for report labels.
    pub async fn names(&self, company_id: &str) -> DbResult<HashMap<String, String>> {
        Ok(self
            .list(company_id)
            .await?
            .into_iter()
            .map(|s| (s.seller.id, s.employee_name))
            .collect())
    }

    /// Replaces the commission policy. Existing sale items keep the values
    /// computed when they were created.
    pub async fn update_policy(
        &self,
        company_id: &str,
        id: &str,
        fixed_value: Option<f64>,
        percentage_value: Option<f64>,
    ) -> DbResult<Seller> {
        let result = sqlx::query(
            r#"
            UPDATE sellers SET
                fixed_value = ?3,
                percentage_value = ?4,
                updated_at = ?5
            WHERE id = ?1 AND company_id = ?2
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(fixed_value)
        .bind(percentage_value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Seller", id));
        }

        self.get(company_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Seller", id))
    }

    /// Deletes a seller. Their sales cascade; items where they were the
    /// manager keep the stored amount with `manager_id` cleared.
    pub async fn delete(&self, company_id: &str, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting seller");

        let result = sqlx::query("DELETE FROM sellers WHERE id = ?1 AND company_id = ?2")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Seller", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{insert_employee, insert_position, test_db, COMPANY};

    #[tokio::test]
    async fn test_one_seller_per_employee() {
        let db = test_db().await;
        let position = insert_position(&db, "Vendedor", None).await;
        let employee = insert_employee(&db, "Bruno", &position.id).await;

        db.sellers()
            .insert(&Seller::new(&employee.id, Some(50.0), Some(3.0), COMPANY))
            .await
            .unwrap();

        let err = db
            .sellers()
            .insert(&Seller::new(&employee.id, None, None, COMPANY))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { field, .. } if field == "employee_id"));
    }

    #[tokio::test]
    async fn test_find_by_employee_and_list() {
        let db = test_db().await;
        let position = insert_position(&db, "Vendedor", None).await;
        let bruno = insert_employee(&db, "Bruno", &position.id).await;
        let ana = insert_employee(&db, "Ana", &position.id).await;

        let seller = Seller::new(&bruno.id, None, Some(2.5), COMPANY);
        db.sellers().insert(&seller).await.unwrap();
        db.sellers()
            .insert(&Seller::new(&ana.id, Some(10.0), None, COMPANY))
            .await
            .unwrap();

        let found = db.sellers().find_by_employee(&bruno.id).await.unwrap().unwrap();
        assert_eq!(found.id, seller.id);
        assert_eq!(found.fixed_value, None);
        assert_eq!(found.percentage_value, Some(2.5));

        let listed = db.sellers().list(COMPANY).await.unwrap();
        let names: Vec<_> = listed.iter().map(|s| s.employee_name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bruno"]);

        let names = db.sellers().names(COMPANY).await.unwrap();
        assert_eq!(names.get(&seller.id).map(String::as_str), Some("Bruno"));
    }

    #[tokio::test]
    async fn test_update_policy() {
        let db = test_db().await;
        let position = insert_position(&db, "Vendedor", None).await;
        let employee = insert_employee(&db, "Bruno", &position.id).await;
        let seller = Seller::new(&employee.id, Some(50.0), Some(3.0), COMPANY);
        db.sellers().insert(&seller).await.unwrap();

        let updated = db
            .sellers()
            .update_policy(COMPANY, &seller.id, Some(75.0), None)
            .await
            .unwrap();
        assert_eq!(updated.fixed_value, Some(75.0));
        assert_eq!(updated.percentage_value, None);

        let err = db
            .sellers()
            .update_policy("other", &seller.id, None, None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_deleting_employee_cascades_to_seller() {
        let db = test_db().await;
        let position = insert_position(&db, "Vendedor", None).await;
        let employee = insert_employee(&db, "Bruno", &position.id).await;
        let seller = Seller::new(&employee.id, None, None, COMPANY);
        db.sellers().insert(&seller).await.unwrap();

        db.employees().delete(COMPANY, &employee.id).await.unwrap();
        assert!(db.sellers().get_by_id(&seller.id).await.unwrap().is_none());
    }
}
