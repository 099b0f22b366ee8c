//! Organization service.
//!
//! Positions, the position hierarchy, employees and seller policies.
//!
//! ## Hierarchy Rules
//! ```text
//! set parent of P to Q
//!   ├── Q must exist in the same company    → NOT_FOUND / BUSINESS_LOGIC
//!   └── Q must not be P or below P          → BUSINESS_LOGIC (cycle)
//! ```
//! Acyclicity is only checked here, when a parent is written. The commission
//! engine never walks more than one level and does not check it again.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ts_rs::TS;

use comissio_core::hierarchy::{build_hierarchy, would_create_cycle, PositionNode};
use comissio_core::validation::{validate_cpf, validate_name, validate_seller_policy};
use comissio_core::{AmountInput, CoreError, Employee, Position, Seller};
use comissio_db::{EmployeeFilter, SellerWithName};

use crate::error::{ApiError, ApiResult};
use crate::services::parse_amount;
use crate::AppState;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreatePositionRequest {
    pub name: String,
    #[serde(default)]
    pub parent_position_id: Option<String>,
}

/// Partial position update. `clear_parent` turns the position into a root
/// and wins over `parent_position_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdatePositionRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent_position_id: Option<String>,
    #[serde(default)]
    pub clear_parent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub position_id: String,
    /// CPF, with or without punctuation.
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Partial employee update. An empty `document` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateEmployeeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position_id: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateSellerRequest {
    pub employee_id: String,
    #[serde(default)]
    pub fixed_value: Option<AmountInput>,
    #[serde(default)]
    pub percentage_value: Option<AmountInput>,
}

/// Policy update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateSellerRequest {
    #[serde(default)]
    pub fixed_value: Option<AmountInput>,
    #[serde(default)]
    pub percentage_value: Option<AmountInput>,
}

// =============================================================================
// Service
// =============================================================================

/// Organization service implementation.
pub struct OrgService {
    state: Arc<AppState>,
}

impl OrgService {
    /// Create a new organization service.
    pub fn new(state: Arc<AppState>) -> Self {
        OrgService { state }
    }

    // -------------------------------------------------------------------------
    // Positions
    // -------------------------------------------------------------------------

    pub async fn create_position(
        &self,
        company_id: &str,
        request: CreatePositionRequest,
    ) -> ApiResult<Position> {
        let name = validate_name("name", &request.name)?;

        let parent = request.parent_position_id.filter(|id| !id.trim().is_empty());
        if let Some(parent_id) = &parent {
            self.require_position(company_id, parent_id).await?;
        }

        let position = Position::new(name, parent, company_id);
        self.state.db.positions().insert(&position).await?;

        info!(id = %position.id, name = %position.name, "Position created");
        Ok(position)
    }

    pub async fn get_position(&self, company_id: &str, id: &str) -> ApiResult<Position> {
        self.require_position(company_id, id).await
    }

    pub async fn list_positions(&self, company_id: &str) -> ApiResult<Vec<Position>> {
        Ok(self.state.db.positions().list(company_id).await?)
    }

    /// Renames and/or moves a position.
    pub async fn update_position(
        &self,
        company_id: &str,
        id: &str,
        request: UpdatePositionRequest,
    ) -> ApiResult<Position> {
        let mut position = self.require_position(company_id, id).await?;

        if let Some(name) = &request.name {
            position.name = validate_name("name", name)?;
        }

        if request.clear_parent {
            position.parent_position_id = None;
        } else if let Some(parent_id) = request.parent_position_id.filter(|p| !p.trim().is_empty()) {
            self.require_position(company_id, &parent_id).await?;

            let positions = self.state.db.positions().list(company_id).await?;
            if would_create_cycle(&positions, id, &parent_id) {
                warn!(position_id = %id, parent_id = %parent_id, "Rejected cyclic parent");
                return Err(CoreError::PositionCycle {
                    position_id: id.to_string(),
                    parent_id,
                }
                .into());
            }

            position.parent_position_id = Some(parent_id);
        }

        Ok(self.state.db.positions().update(&position).await?)
    }

    /// Deletes a position. Child positions become roots; a position still
    /// held by employees cannot be deleted.
    pub async fn delete_position(&self, company_id: &str, id: &str) -> ApiResult<()> {
        let held = self
            .state
            .db
            .employees()
            .list(
                company_id,
                &EmployeeFilter {
                    is_active: None,
                    position_id: Some(id.to_string()),
                },
            )
            .await?;

        if !held.is_empty() {
            return Err(ApiError::business(format!(
                "Position {} still has {} employee(s)",
                id,
                held.len()
            )));
        }

        self.state.db.positions().delete(company_id, id).await?;
        info!(id = %id, "Position deleted");
        Ok(())
    }

    /// The company's positions as a forest of roots with nested children.
    pub async fn position_hierarchy(&self, company_id: &str) -> ApiResult<Vec<PositionNode>> {
        let positions = self.state.db.positions().list(company_id).await?;
        Ok(build_hierarchy(&positions))
    }

    /// Loads a position of `company_id`, telling a foreign id apart from a
    /// missing one.
    async fn require_position(&self, company_id: &str, id: &str) -> ApiResult<Position> {
        let positions = self.state.db.positions();

        if let Some(position) = positions.get(company_id, id).await? {
            return Ok(position);
        }

        match positions.get_by_id(id).await? {
            Some(_) => Err(CoreError::CompanyMismatch {
                entity: "Position".to_string(),
                id: id.to_string(),
            }
            .into()),
            None => Err(CoreError::PositionNotFound(id.to_string()).into()),
        }
    }

    // -------------------------------------------------------------------------
    // Employees
    // -------------------------------------------------------------------------

    pub async fn create_employee(
        &self,
        company_id: &str,
        request: CreateEmployeeRequest,
    ) -> ApiResult<Employee> {
        let name = validate_name("name", &request.name)?;
        self.require_position(company_id, &request.position_id).await?;

        let mut employee = Employee::new(name, &request.position_id, company_id);
        employee.document = normalize_document(request.document.as_deref())?;
        employee.user_id = request.user_id;
        employee.email = request.email.filter(|e| !e.trim().is_empty());

        self.state.db.employees().insert(&employee).await?;

        info!(id = %employee.id, position_id = %employee.position_id, "Employee created");
        Ok(employee)
    }

    pub async fn get_employee(&self, company_id: &str, id: &str) -> ApiResult<Employee> {
        self.state
            .db
            .employees()
            .get(company_id, id)
            .await?
            .ok_or_else(|| CoreError::EmployeeNotFound(id.to_string()).into())
    }

    pub async fn list_employees(
        &self,
        company_id: &str,
        filter: &EmployeeFilter,
    ) -> ApiResult<Vec<Employee>> {
        Ok(self.state.db.employees().list(company_id, filter).await?)
    }

    pub async fn update_employee(
        &self,
        company_id: &str,
        id: &str,
        request: UpdateEmployeeRequest,
    ) -> ApiResult<Employee> {
        let mut employee = self.get_employee(company_id, id).await?;

        if let Some(name) = &request.name {
            employee.name = validate_name("name", name)?;
        }
        if let Some(position_id) = request.position_id {
            self.require_position(company_id, &position_id).await?;
            employee.position_id = position_id;
        }
        if let Some(document) = request.document.as_deref() {
            employee.document = normalize_document(Some(document))?;
        }
        if let Some(email) = request.email {
            employee.email = Some(email).filter(|e| !e.trim().is_empty());
        }

        Ok(self.state.db.employees().update(&employee).await?)
    }

    /// Activates an inactive employee or deactivates an active one.
    ///
    /// An inactive employee keeps their seller policy but is skipped when
    /// looking for a manager.
    pub async fn toggle_employee_active(&self, company_id: &str, id: &str) -> ApiResult<Employee> {
        let employee = self.state.db.employees().toggle_active(company_id, id).await?;
        info!(id = %id, is_active = employee.is_active, "Employee status toggled");
        Ok(employee)
    }

    pub async fn delete_employee(&self, company_id: &str, id: &str) -> ApiResult<()> {
        self.state.db.employees().delete(company_id, id).await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Sellers
    // -------------------------------------------------------------------------

    /// Attaches a commission policy to an employee. At most one per
    /// employee.
    pub async fn create_seller(
        &self,
        company_id: &str,
        request: CreateSellerRequest,
    ) -> ApiResult<Seller> {
        let fixed = optional_amount("fixed_value", request.fixed_value.as_ref())?;
        let percentage = optional_amount("percentage_value", request.percentage_value.as_ref())?;
        validate_seller_policy(fixed, percentage)?;

        let employee = self.get_employee(company_id, &request.employee_id).await?;

        if self.state.db.sellers().find_by_employee(&employee.id).await?.is_some() {
            warn!(employee_id = %employee.id, "Employee already has a seller policy");
            return Err(CoreError::SellerAlreadyExists(employee.id).into());
        }

        let seller = Seller::new(&employee.id, fixed, percentage, company_id);
        self.state.db.sellers().insert(&seller).await?;

        info!(id = %seller.id, employee_id = %seller.employee_id, "Seller created");
        Ok(seller)
    }

    pub async fn get_seller(&self, company_id: &str, id: &str) -> ApiResult<Seller> {
        self.state
            .db
            .sellers()
            .get(company_id, id)
            .await?
            .ok_or_else(|| CoreError::SellerNotFound(id.to_string()).into())
    }

    pub async fn list_sellers(&self, company_id: &str) -> ApiResult<Vec<SellerWithName>> {
        Ok(self.state.db.sellers().list(company_id).await?)
    }

    pub async fn seller_by_employee(&self, company_id: &str, employee_id: &str) -> ApiResult<Seller> {
        self.state
            .db
            .sellers()
            .find_by_employee(employee_id)
            .await?
            .filter(|seller| seller.company_id == company_id)
            .ok_or_else(|| ApiError::not_found("Seller for employee", employee_id))
    }

    /// Changes a seller's policy. Items already sold keep their commission.
    pub async fn update_seller(
        &self,
        company_id: &str,
        id: &str,
        request: UpdateSellerRequest,
    ) -> ApiResult<Seller> {
        let current = self.get_seller(company_id, id).await?;

        let fixed = match request.fixed_value.as_ref() {
            Some(input) => Some(parse_amount("fixed_value", input)?),
            None => current.fixed_value,
        };
        let percentage = match request.percentage_value.as_ref() {
            Some(input) => Some(parse_amount("percentage_value", input)?),
            None => current.percentage_value,
        };
        validate_seller_policy(fixed, percentage)?;

        let seller = self
            .state
            .db
            .sellers()
            .update_policy(company_id, id, fixed, percentage)
            .await?;

        info!(id = %id, fixed = ?fixed, percentage = ?percentage, "Seller policy updated");
        Ok(seller)
    }

    pub async fn delete_seller(&self, company_id: &str, id: &str) -> ApiResult<()> {
        self.state.db.sellers().delete(company_id, id).await?;
        Ok(())
    }
}

fn optional_amount(field: &str, input: Option<&AmountInput>) -> ApiResult<Option<f64>> {
    Ok(input.map(|i| parse_amount(field, i)).transpose()?)
}

/// Blank documents are stored as absent; anything else must be a valid CPF.
fn normalize_document(document: Option<&str>) -> ApiResult<Option<String>> {
    match document.map(str::trim) {
        None | Some("") => Ok(None),
        Some(cpf) => Ok(Some(validate_cpf(cpf)?)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
