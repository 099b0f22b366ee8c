//! # Position Repository
//!
//! Database operations for the org chart.
//!
//! ## Parent Links
//! ```text
//! positions
//! ┌──────────┬──────────────────────┐
//! │ id       │ parent_position_id   │
//! ├──────────┼──────────────────────┤
//! │ diretor  │ NULL                 │  ◄── root
//! │ gerente  │ diretor              │
//! │ vendedor │ gerente              │  parent_of("vendedor") = gerente
//! └──────────┴──────────────────────┘
//! ```
//! Deleting a position sets its children's parent to NULL (they become
//! roots). Cycle checks happen before writes, in the service layer.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use comissio_core::Position;

const POSITION_COLUMNS: &str = "id, name, parent_position_id, company_id, created_at, updated_at";

/// Repository for position database operations.
#[derive(Debug, Clone)]
pub struct PositionRepository {
    pool: SqlitePool,
}

impl PositionRepository {
    /// Creates a new PositionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PositionRepository { pool }
    }

    pub async fn insert(&self, position: &Position) -> DbResult<()> {
        debug!(id = %position.id, name = %position.name, "Inserting position");

        sqlx::query(
            r#"
            INSERT INTO positions (id, name, parent_position_id, company_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&position.id)
        .bind(&position.name)
        .bind(&position.parent_position_id)
        .bind(&position.company_id)
        .bind(position.created_at)
        .bind(position.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a position of the given company.
    pub async fn get(&self, company_id: &str, id: &str) -> DbResult<Option<Position>> {
        let sql = format!("SELECT {POSITION_COLUMNS} FROM positions WHERE id = ?1 AND company_id = ?2");

        let position = sqlx::query_as::<_, Position>(&sql)
            .bind(id)
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(position)
    }

    /// Gets a position by id regardless of company.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Position>> {
        let sql = format!("SELECT {POSITION_COLUMNS} FROM positions WHERE id = ?1");

        let position = sqlx::query_as::<_, Position>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(position)
    }

    /// Lists every position of a company, oldest first.
    pub async fn list(&self, company_id: &str) -> DbResult<Vec<Position>> {
        let sql = format!(
            "SELECT {POSITION_COLUMNS} FROM positions WHERE company_id = ?1 ORDER BY created_at, id"
        );

        let positions = sqlx::query_as::<_, Position>(&sql)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(positions)
    }

    /// Returns the immediate parent of a position.
    ///
    /// `None` for roots and for unknown positions.
    pub async fn parent_of(&self, position_id: &str) -> DbResult<Option<Position>> {
        let parent = sqlx::query_as::<_, Position>(
            r#"
            SELECT p.id, p.name, p.parent_position_id, p.company_id, p.created_at, p.updated_at
            FROM positions child
            JOIN positions p ON p.id = child.parent_position_id
            WHERE child.id = ?1
            "#,
        )
        .bind(position_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(parent)
    }

    /// Writes name and parent; `updated_at` is set to now.
    pub async fn update(&self, position: &Position) -> DbResult<Position> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE positions SET
                name = ?3,
                parent_position_id = ?4,
                updated_at = ?5
            WHERE id = ?1 AND company_id = ?2
            "#,
        )
        .bind(&position.id)
        .bind(&position.company_id)
        .bind(&position.name)
        .bind(&position.parent_position_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Position", &position.id));
        }

        Ok(Position {
            updated_at: now,
            ..position.clone()
        })
    }

    /// Deletes a position.
    ///
    /// Fails with `ForeignKeyViolation` while employees still hold it.
    pub async fn delete(&self, company_id: &str, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting position");

        let result = sqlx::query("DELETE FROM positions WHERE id = ?1 AND company_id = ?2")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Position", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{test_db, COMPANY};
    use crate::DbError;
    use comissio_core::{Employee, Position};

    #[tokio::test]
    async fn test_insert_get_and_list() {
        let db = test_db().await;
        let repo = db.positions();

        let diretor = Position::new("Diretor", None, COMPANY);
        let gerente = Position::new("Gerente", Some(diretor.id.clone()), COMPANY);
        repo.insert(&diretor).await.unwrap();
        repo.insert(&gerente).await.unwrap();

        let loaded = repo.get(COMPANY, &gerente.id).await.unwrap().unwrap();
        assert_eq!(loaded.parent_position_id.as_deref(), Some(diretor.id.as_str()));
        assert!(repo.get("other-company", &gerente.id).await.unwrap().is_none());

        assert_eq!(repo.list(COMPANY).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_parent_of() {
        let db = test_db().await;
        let repo = db.positions();

        let gerente = Position::new("Gerente", None, COMPANY);
        let vendedor = Position::new("Vendedor", Some(gerente.id.clone()), COMPANY);
        repo.insert(&gerente).await.unwrap();
        repo.insert(&vendedor).await.unwrap();

        let parent = repo.parent_of(&vendedor.id).await.unwrap().unwrap();
        assert_eq!(parent.id, gerente.id);
        assert!(repo.parent_of(&gerente.id).await.unwrap().is_none());
        assert!(repo.parent_of("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = test_db().await;
        let repo = db.positions();

        let mut position = Position::new("Vendedor", None, COMPANY);
        repo.insert(&position).await.unwrap();

        position.name = "Vendedor Sênior".to_string();
        let updated = repo.update(&position).await.unwrap();
        assert!(updated.updated_at >= position.updated_at);
        assert_eq!(
            repo.get(COMPANY, &position.id).await.unwrap().unwrap().name,
            "Vendedor Sênior"
        );

        repo.delete(COMPANY, &position.id).await.unwrap();
        let err = repo.delete(COMPANY, &position.id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_orphans_children() {
        let db = test_db().await;
        let repo = db.positions();

        let gerente = Position::new("Gerente", None, COMPANY);
        let vendedor = Position::new("Vendedor", Some(gerente.id.clone()), COMPANY);
        repo.insert(&gerente).await.unwrap();
        repo.insert(&vendedor).await.unwrap();

        repo.delete(COMPANY, &gerente.id).await.unwrap();
        let child = repo.get(COMPANY, &vendedor.id).await.unwrap().unwrap();
        assert!(child.is_root());
    }

    #[tokio::test]
    async fn test_delete_with_employees_fails() {
        let db = test_db().await;
        let position = Position::new("Vendedor", None, COMPANY);
        db.positions().insert(&position).await.unwrap();
        db.employees()
            .insert(&Employee::new("Bruno", &position.id, COMPANY))
            .await
            .unwrap();

        let err = db.positions().delete(COMPANY, &position.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
