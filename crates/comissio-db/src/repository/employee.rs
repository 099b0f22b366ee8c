//! # Employee Repository
//!
//! Database operations for employees.
//!
//! ## Manager Lookup
//! The commission engine asks for "the active employee in position P".
//! Several employees may share a position, so the lookup is made
//! deterministic:
//! ```text
//! SELECT ... WHERE position_id = P AND is_active = 1
//! ORDER BY created_at, id
//! LIMIT 1
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use comissio_core::Employee;

const EMPLOYEE_COLUMNS: &str = "id, name, document, position_id, user_id, email, is_active, company_id, created_at, updated_at";

/// Optional filters for [`EmployeeRepository::list`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeFilter {
    pub is_active: Option<bool>,
    pub position_id: Option<String>,
}

/// Repository for employee database operations.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    /// Creates a new EmployeeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    pub async fn insert(&self, employee: &Employee) -> DbResult<()> {
        debug!(id = %employee.id, position_id = %employee.position_id, "Inserting employee");

        sqlx::query(
            r#"
            INSERT INTO employees (
                id, name, document, position_id, user_id, email,
                is_active, company_id, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10
            )
            "#,
        )
        .bind(&employee.id)
        .bind(&employee.name)
        .bind(&employee.document)
        .bind(&employee.position_id)
        .bind(&employee.user_id)
        .bind(&employee.email)
        .bind(employee.is_active)
        .bind(&employee.company_id)
        .bind(employee.created_at)
        .bind(employee.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an employee of the given company.
    pub async fn get(&self, company_id: &str, id: &str) -> DbResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1 AND company_id = ?2");

        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(employee)
    }

    /// Gets an employee by id regardless of company.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1");

        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(employee)
    }

    /// Lists employees of a company, sorted by name.
    pub async fn list(&self, company_id: &str, filter: &EmployeeFilter) -> DbResult<Vec<Employee>> {
        let sql = format!(
            r#"
            SELECT {EMPLOYEE_COLUMNS}
            FROM employees
            WHERE company_id = ?1
              AND (?2 IS NULL OR is_active = ?2)
              AND (?3 IS NULL OR position_id = ?3)
            ORDER BY name, id
            "#
        );

        let employees = sqlx::query_as::<_, Employee>(&sql)
            .bind(company_id)
            .bind(filter.is_active)
            .bind(&filter.position_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(employees)
    }

    /// Returns the earliest-created active employee in a position.
    pub async fn first_active_in_position(&self, position_id: &str) -> DbResult<Option<Employee>> {
        let sql = format!(
            r#"
            SELECT {EMPLOYEE_COLUMNS}
            FROM employees
            WHERE position_id = ?1 AND is_active = 1
            ORDER BY created_at, id
            LIMIT 1
            "#
        );

        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(position_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(employee)
    }

    /// Writes every mutable column; `updated_at` is set to now.
    pub async fn update(&self, employee: &Employee) -> DbResult<Employee> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE employees SET
                name = ?3,
                document = ?4,
                position_id = ?5,
                user_id = ?6,
                email = ?7,
                is_active = ?8,
                updated_at = ?9
            WHERE id = ?1 AND company_id = ?2
            "#,
        )
        .bind(&employee.id)
        .bind(&employee.company_id)
        .bind(&employee.name)
        .bind(&employee.document)
        .bind(&employee.position_id)
        .bind(&employee.user_id)
        .bind(&employee.email)
        .bind(employee.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", &employee.id));
        }

        Ok(Employee {
            updated_at: now,
            ..employee.clone()
        })
    }

    /// Flips `is_active` and returns the updated employee.
    pub async fn toggle_active(&self, company_id: &str, id: &str) -> DbResult<Employee> {
        let result = sqlx::query(
            r#"
            UPDATE employees SET
                is_active = NOT is_active,
                updated_at = ?3
            WHERE id = ?1 AND company_id = ?2
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", id));
        }

        self.get(company_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Employee", id))
    }

    /// Deletes an employee; their seller policy goes with them.
    pub async fn delete(&self, company_id: &str, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting employee");

        let result = sqlx::query("DELETE FROM employees WHERE id = ?1 AND company_id = ?2")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", id));
        }

        Ok(())
    }
}
