//! # SQLite Commission Directory
//!
//! [`CommissionDirectory`] over the repositories, so the core engine can walk
//! the stored org chart.
//!
//! ```text
//! CommissionEngine<Database>
//!        │
//!        ├── seller_with_employee_and_position ──► sellers, employees, positions
//!        ├── parent_position                   ──► positions (self join)
//!        ├── active_employee_by_position       ──► employees (created_at, id)
//!        └── seller_by_employee                ──► sellers   (created_at, id)
//! ```
//!
//! Every call reads straight from the pool: no transaction is held across
//! the walk, and nothing is cached between calculations.

use async_trait::async_trait;
use tracing::debug;

use comissio_core::{CommissionDirectory, Employee, Position, Seller, SellerPlacement};

use crate::error::DbError;
use crate::pool::Database;

#[async_trait]
impl CommissionDirectory for Database {
    type Error = DbError;

    async fn seller_with_employee_and_position(
        &self,
        seller_id: &str,
    ) -> Result<SellerPlacement, DbError> {
        let seller = self
            .sellers()
            .get_by_id(seller_id)
            .await?
            .ok_or_else(|| DbError::not_found("Seller", seller_id))?;

        let employee = self
            .employees()
            .get_by_id(&seller.employee_id)
            .await?
            .ok_or_else(|| DbError::not_found("Employee", &seller.employee_id))?;

        let position = self
            .positions()
            .get_by_id(&employee.position_id)
            .await?
            .ok_or_else(|| DbError::not_found("Position", &employee.position_id))?;

        debug!(seller_id, position_id = %position.id, "Resolved seller placement");

        Ok(SellerPlacement {
            seller,
            employee,
            position,
        })
    }

    async fn parent_position(&self, position_id: &str) -> Result<Option<Position>, DbError> {
        self.positions().parent_of(position_id).await
    }

    async fn active_employee_by_position(
        &self,
        position_id: &str,
    ) -> Result<Option<Employee>, DbError> {
        self.employees().first_active_in_position(position_id).await
    }

    async fn seller_by_employee(&self, employee_id: &str) -> Result<Option<Seller>, DbError> {
        self.sellers().find_by_employee(employee_id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::testing::{insert_employee, insert_position, insert_seller, test_db, two_level_org, COMPANY};
    use crate::DbError;

    #[tokio::test]
    async fn test_engine_end_to_end() {
        let db = test_db().await;
        let org = two_level_org(&db).await;

        let result = db
            .commission_engine()
            .calculate(&org.vendedor_seller.id, 5000.0)
            .await
            .unwrap();

        assert_eq!(result.seller_commission.total_value, 200.0);
        assert_eq!(result.manager_commission.unwrap().total_value, 350.0);
        assert_eq!(result.manager_id.as_deref(), Some(org.gerente_seller.id.as_str()));
    }

    #[tokio::test]
    async fn test_root_seller_has_no_manager() {
        let db = test_db().await;
        let org = two_level_org(&db).await;

        let result = db
            .commission_engine()
            .calculate(&org.gerente_seller.id, 1000.0)
            .await
            .unwrap();

        assert_eq!(result.seller_commission.total_value, 150.0);
        assert!(result.manager_commission.is_none());
        assert!(result.manager_id.is_none());
    }

    #[tokio::test]
    async fn test_inactive_manager_is_skipped() {
        let db = test_db().await;
        let org = two_level_org(&db).await;

        db.employees()
            .toggle_active(COMPANY, &org.gerente_employee.id)
            .await
            .unwrap();

        let result = db
            .commission_engine()
            .calculate(&org.vendedor_seller.id, 5000.0)
            .await
            .unwrap();
        assert!(result.manager_id.is_none());
    }

    #[tokio::test]
    async fn test_manager_without_policy() {
        let db = test_db().await;
        let gerente = insert_position(&db, "Gerente", None).await;
        let vendedor = insert_position(&db, "Vendedor", Some(&gerente.id)).await;
        insert_employee(&db, "Ana", &gerente.id).await;
        let bruno = insert_employee(&db, "Bruno", &vendedor.id).await;
        let seller = insert_seller(&db, &bruno.id, Some(50.0), Some(3.0)).await;

        let result = db
            .commission_engine()
            .calculate(&seller.id, 5000.0)
            .await
            .unwrap();
        assert_eq!(result.seller_commission.total_value, 200.0);
        assert!(result.manager_commission.is_none());
    }

    #[tokio::test]
    async fn test_vacant_manager_position() {
        let db = test_db().await;
        let gerente = insert_position(&db, "Gerente", None).await;
        let vendedor = insert_position(&db, "Vendedor", Some(&gerente.id)).await;
        let bruno = insert_employee(&db, "Bruno", &vendedor.id).await;
        let seller = insert_seller(&db, &bruno.id, None, Some(3.0)).await;

        let result = db
            .commission_engine()
            .calculate(&seller.id, 1000.0)
            .await
            .unwrap();
        assert_eq!(result.seller_commission.total_value, 30.0);
        assert!(result.manager_id.is_none());
    }

    #[tokio::test]
    async fn test_unknown_seller_is_not_found() {
        let db = test_db().await;

        let err = db
            .commission_engine()
            .calculate("missing", 1000.0)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { entity, id } if entity == "Seller" && id == "missing"));
    }

    #[tokio::test]
    async fn test_policy_change_is_seen_by_next_calculation() {
        let db = test_db().await;
        let org = two_level_org(&db).await;
        let engine = db.commission_engine();

        let before = engine.calculate(&org.vendedor_seller.id, 1000.0).await.unwrap();
        db.sellers()
            .update_policy(COMPANY, &org.vendedor_seller.id, Some(0.0), Some(10.0))
            .await
            .unwrap();
        let after = engine.calculate(&org.vendedor_seller.id, 1000.0).await.unwrap();

        assert_eq!(before.seller_commission.total_value, 80.0);
        assert_eq!(after.seller_commission.total_value, 100.0);
        assert_eq!(org.vendedor.parent_position_id.as_deref(), Some(org.gerente.id.as_str()));
    }

    #[tokio::test]
    async fn test_concurrent_calculations() {
        let db = test_db().await;
        let org = two_level_org(&db).await;
        let engine = db.commission_engine();

        let (a, b) = tokio::join!(
            engine.calculate(&org.vendedor_seller.id, 5000.0),
            engine.calculate(&org.gerente_seller.id, 5000.0),
        );

        assert_eq!(a.unwrap().seller_commission.total_value, 200.0);
        assert_eq!(b.unwrap().seller_commission.total_value, 350.0);
    }
}
