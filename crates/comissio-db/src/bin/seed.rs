//! # Seed Data Generator
//!
//! Populates the database with a demo org chart, seller policies and sales.
//!
//! ## Usage
//! ```bash
//! # Seed ./comissio_dev.db with 20 sales (default)
//! cargo run -p comissio-db --bin seed
//!
//! # Custom amount of sales
//! cargo run -p comissio-db --bin seed -- --sales 200
//!
//! # Specify database path
//! cargo run -p comissio-db --bin seed -- --db ./data/comissio.db
//! ```
//!
//! ## Generated Org Chart
//! ```text
//! Diretor Comercial        (Helena, 0 + 1%)
//! └── Gerente de Vendas    (Ana Paula, 100 + 2%)
//!     └── Vendedor         (Carlos Silva, 50 + 3%; Maria Oliveira, 80 + 2.5%)
//! Gerente de RH            (no seller policy)
//! ```
//! Sale commissions are computed through the same engine the backoffice
//! uses, so seeded items carry real rule strings.

use chrono::{Duration, Utc};
use std::env;

use comissio_core::{
    CommissionEngine, Employee, ItemCommission, Position, Sale, SaleItem, Seller,
    DEFAULT_COMPANY_ID,
};
use comissio_db::{Database, DbConfig, DbError};

/// Vehicles sold in the demo sales: (description, value).
const VEHICLES: &[(&str, f64)] = &[
    ("Onix 1.0 LT", 89_990.0),
    ("HB20 Comfort", 84_500.0),
    ("Corolla XEi", 158_900.0),
    ("Compass Longitude", 189_990.0),
    ("Strada Freedom", 112_300.0),
    ("Polo Highline", 109_750.0),
    ("Kicks Advance", 128_400.0),
];

/// Accessories sometimes added to a sale.
const EXTRAS: &[(&str, f64)] = &[
    ("Película de proteção solar", 890.0),
    ("Tapetes personalizados", 450.0),
    ("Seguro 12 meses", 4_200.0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut sales: usize = 20;
    let mut db_path = String::from("./comissio_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("ComissioFlow Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --sales <N>    Number of sales to generate (default: 20)");
                println!("  -d, --db <PATH>    Database file path (default: ./comissio_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 ComissioFlow Seed Data Generator");
    println!("===================================");
    println!("Database: {}", db_path);
    println!("Sales:    {}", sales);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    db.companies().ensure(DEFAULT_COMPANY_ID, "Empresa Demo").await?;

    let existing = db.positions().list(DEFAULT_COMPANY_ID).await?.len();
    if existing > 0 {
        println!("⚠ Company already has {} positions", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Org chart
    let diretor = position(&db, "Diretor Comercial", None).await?;
    let gerente = position(&db, "Gerente de Vendas", Some(&diretor)).await?;
    let vendedor = position(&db, "Vendedor", Some(&gerente)).await?;
    position(&db, "Gerente de RH", None).await?;
    println!("✓ Positions created");

    let helena = employee(&db, "Helena Rocha", &diretor, None).await?;
    let ana = employee(&db, "Ana Paula", &gerente, Some("52998224725")).await?;
    let carlos = employee(&db, "Carlos Silva", &vendedor, Some("11144477735")).await?;
    let maria = employee(&db, "Maria Oliveira", &vendedor, None).await?;
    println!("✓ Employees created");

    let mut sellers = Vec::new();
    for (employee, fixed, pct) in [
        (&helena, 0.0, 1.0),
        (&ana, 100.0, 2.0),
        (&carlos, 50.0, 3.0),
        (&maria, 80.0, 2.5),
    ] {
        let seller = Seller::new(&employee.id, Some(fixed), Some(pct), DEFAULT_COMPANY_ID);
        db.sellers().insert(&seller).await?;
        sellers.push(seller);
    }
    println!("✓ Seller policies created");

    // Sales, spread over the last 60 days
    println!();
    println!("Generating sales...");

    let engine = db.commission_engine();
    let start = std::time::Instant::now();
    let mut generated = 0;

    for n in 0..sales {
        let seller = &sellers[n % sellers.len()];
        let sale_date = Utc::now() - Duration::days((n * 3 % 60) as i64);
        let sale = Sale::new(&seller.id, sale_date, DEFAULT_COMPANY_ID);

        let mut lines = vec![VEHICLES[n % VEHICLES.len()]];
        if n % 3 == 0 {
            lines.push(EXTRAS[n % EXTRAS.len()]);
        }

        let items = match price_items(&engine, &sale, &lines).await {
            Ok(items) => items,
            Err(e) => {
                eprintln!("Failed to price sale {}: {}", n, e);
                continue;
            }
        };

        if let Err(e) = db.sales().create_with_items(&sale, &items).await {
            eprintln!("Failed to insert sale {}: {}", n, e);
            continue;
        }

        generated += 1;
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} sales in {:?}", generated, elapsed);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

async fn position(
    db: &Database,
    name: &str,
    parent: Option<&Position>,
) -> Result<Position, DbError> {
    let position = Position::new(name, parent.map(|p| p.id.clone()), DEFAULT_COMPANY_ID);
    db.positions().insert(&position).await?;
    Ok(position)
}

async fn employee(
    db: &Database,
    name: &str,
    position: &Position,
    document: Option<&str>,
) -> Result<Employee, DbError> {
    let mut employee = Employee::new(name, &position.id, DEFAULT_COMPANY_ID);
    employee.document = document.map(str::to_string);
    db.employees().insert(&employee).await?;
    Ok(employee)
}

/// Computes every item's commission before anything is written.
async fn price_items(
    engine: &CommissionEngine<Database>,
    sale: &Sale,
    lines: &[(&str, f64)],
) -> Result<Vec<SaleItem>, DbError> {
    let mut items = Vec::with_capacity(lines.len());
    for (description, value) in lines {
        let result = engine.calculate(&sale.seller_id, *value).await?;
        items.push(SaleItem::new(
            &sale.id,
            *description,
            *value,
            ItemCommission::from(result),
            DEFAULT_COMPANY_ID,
        ));
    }
    Ok(items)
}
