//! Fixtures shared by the repository and directory tests.

use comissio_core::{Employee, Position, Seller, DEFAULT_COMPANY_ID};

use crate::{Database, DbConfig};

pub(crate) const COMPANY: &str = DEFAULT_COMPANY_ID;

/// Fresh in-memory database with the default company.
pub(crate) async fn test_db() -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.companies().ensure(COMPANY, "Comissio Demo").await.unwrap();
    db
}

pub(crate) async fn insert_position(db: &Database, name: &str, parent: Option<&str>) -> Position {
    let position = Position::new(name, parent.map(str::to_string), COMPANY);
    db.positions().insert(&position).await.unwrap();
    position
}

pub(crate) async fn insert_employee(db: &Database, name: &str, position_id: &str) -> Employee {
    let employee = Employee::new(name, position_id, COMPANY);
    db.employees().insert(&employee).await.unwrap();
    employee
}

pub(crate) async fn insert_seller(
    db: &Database,
    employee_id: &str,
    fixed: Option<f64>,
    percentage: Option<f64>,
) -> Seller {
    let seller = Seller::new(employee_id, fixed, percentage, COMPANY);
    db.sellers().insert(&seller).await.unwrap();
    seller
}

/// Gerente (Ana, 100 + 5%) ◄── Vendedor (Bruno, 50 + 3%).
pub(crate) struct TwoLevelOrg {
    pub gerente: Position,
    pub vendedor: Position,
    pub gerente_employee: Employee,
    pub vendedor_employee: Employee,
    pub gerente_seller: Seller,
    pub vendedor_seller: Seller,
}

pub(crate) async fn two_level_org(db: &Database) -> TwoLevelOrg {
    let gerente = insert_position(db, "Gerente", None).await;
    let vendedor = insert_position(db, "Vendedor", Some(&gerente.id)).await;
    let gerente_employee = insert_employee(db, "Ana", &gerente.id).await;
    let vendedor_employee = insert_employee(db, "Bruno", &vendedor.id).await;
    let gerente_seller = insert_seller(db, &gerente_employee.id, Some(100.0), Some(5.0)).await;
    let vendedor_seller = insert_seller(db, &vendedor_employee.id, Some(50.0), Some(3.0)).await;

    TwoLevelOrg {
        gerente,
        vendedor,
        gerente_employee,
        vendedor_employee,
        gerente_seller,
        vendedor_seller,
    }
}
