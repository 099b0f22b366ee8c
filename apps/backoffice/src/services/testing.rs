//! Fixtures shared by the service tests.

use std::path::PathBuf;
use std::sync::Arc;

use comissio_core::{Employee, Position, Seller, DEFAULT_COMPANY_ID};
use comissio_db::{Database, DbConfig};

use crate::{AppState, BackofficeConfig};

pub(crate) const COMPANY: &str = DEFAULT_COMPANY_ID;
pub(crate) const OTHER_COMPANY: &str = "00000000-0000-0000-0000-000000000002";

/// In-memory state with two companies.
pub(crate) async fn test_state() -> Arc<AppState> {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.companies().ensure(COMPANY, "Comissio Demo").await.unwrap();
    db.companies().ensure(OTHER_COMPANY, "Outra Empresa").await.unwrap();

    let config = BackofficeConfig {
        database_path: PathBuf::from(":memory:"),
        max_connections: 1,
        company_id: COMPANY.to_string(),
        run_migrations: true,
    };

    Arc::new(AppState::new(db, config))
}

/// Gerente (Ana, 100 + 5%) ◄── Vendedor (Bruno, 50 + 3%), written directly
/// through the repositories.
pub(crate) struct Org {
    pub gerente: Position,
    pub vendedor: Position,
    pub ana: Employee,
    pub bruno: Employee,
    pub gerente_seller: Seller,
    pub vendedor_seller: Seller,
}

pub(crate) async fn two_level_org(state: &AppState) -> Org {
    let db = &state.db;

    let gerente = Position::new("Gerente", None, COMPANY);
    db.positions().insert(&gerente).await.unwrap();
    let vendedor = Position::new("Vendedor", Some(gerente.id.clone()), COMPANY);
    db.positions().insert(&vendedor).await.unwrap();

    let ana = Employee::new("Ana", &gerente.id, COMPANY);
    db.employees().insert(&ana).await.unwrap();
    let bruno = Employee::new("Bruno", &vendedor.id, COMPANY);
    db.employees().insert(&bruno).await.unwrap();

    let gerente_seller = Seller::new(&ana.id, Some(100.0), Some(5.0), COMPANY);
    db.sellers().insert(&gerente_seller).await.unwrap();
    let vendedor_seller = Seller::new(&bruno.id, Some(50.0), Some(3.0), COMPANY);
    db.sellers().insert(&vendedor_seller).await.unwrap();

    Org {
        gerente,
        vendedor,
        ana,
        bruno,
        gerente_seller,
        vendedor_seller,
    }
}
