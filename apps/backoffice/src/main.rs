//! # ComissioFlow Backoffice CLI
//!
//! Operator commands over the backoffice services. Output is JSON on stdout;
//! logs go to stderr.
//!
//! ## Usage
//! ```bash
//! backoffice hierarchy
//! backoffice sellers
//! backoffice sales   --from 2024-03-01 --to 2024-03-31 --seller <SELLER_ID>
//! backoffice report  --from 2024-03-01 --to 2024-03-31
//! backoffice summary <SALE_ID>
//! backoffice status
//! ```
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  args ──► BackofficeConfig::load() ──► Database ──► Service ──► JSON   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::env;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use tracing::info;

use comissio_backoffice::{
    init_tracing, AppState, BackofficeConfig, OrgService, ReportService, SaleService,
};
use comissio_core::report::ReportFilter;
use comissio_db::migrations::migration_status;
use comissio_db::Database;

const USAGE: &str = "\
ComissioFlow Backoffice

Usage: backoffice <COMMAND> [OPTIONS]

Commands:
  hierarchy            Print the position tree
  sellers              List sellers with their policies
  sales                List sales (newest first)
  report               Commission report per seller
  summary <SALE_ID>    Commission breakdown of one sale
  status               Embedded vs applied schema migrations

Options (sales, report):
  --from <DATE>        Start of the period (YYYY-MM-DD or RFC 3339)
  --to <DATE>          End of the period, inclusive
  --seller <ID>        Only this seller

Environment:
  COMISSIO_DB_PATH, COMISSIO_DB_MAX_CONNECTIONS, COMISSIO_COMPANY_ID,
  COMISSIO_RUN_MIGRATIONS, RUST_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{USAGE}");
        return Ok(());
    };
    if matches!(command.as_str(), "--help" | "-h" | "help") {
        println!("{USAGE}");
        return Ok(());
    }

    let config = BackofficeConfig::load().context("Failed to load configuration")?;
    info!(
        db = %config.database_path.display(),
        company_id = %config.company_id,
        "Configuration loaded"
    );

    let db = Database::new(config.db_config())
        .await
        .context("Failed to open database")?;
    let company_id = config.company_id.clone();
    let state = Arc::new(AppState::new(db, config));

    let rest = &args[1..];
    match command.as_str() {
        "hierarchy" => {
            let tree = OrgService::new(state.clone())
                .position_hierarchy(&company_id)
                .await?;
            print_json(&tree)?;
        }
        "sellers" => {
            let sellers = OrgService::new(state.clone()).list_sellers(&company_id).await?;
            print_json(&sellers)?;
        }
        "sales" => {
            let filter = parse_filter(rest)?;
            let sales = SaleService::new(state.clone())
                .list_sales(&company_id, &filter)
                .await?;
            print_json(&sales)?;
        }
        "report" => {
            let filter = parse_filter(rest)?;
            let report = ReportService::new(state.clone())
                .commission_report(&company_id, &filter)
                .await?;
            print_json(&report)?;
        }
        "summary" => {
            let sale_id = rest.first().ok_or_else(|| anyhow!("summary needs a SALE_ID"))?;
            let summary = SaleService::new(state.clone())
                .commission_summary(&company_id, sale_id)
                .await?;
            print_json(&summary)?;
        }
        "status" => {
            let (total, applied) = migration_status(state.db.pool()).await?;
            print_json(&MigrationStatus { total, applied })?;
        }
        other => bail!("Unknown command '{}'\n\n{}", other, USAGE),
    }

    state.db.close().await;
    Ok(())
}

#[derive(Serialize)]
struct MigrationStatus {
    total: usize,
    applied: usize,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parses `--from`, `--to` and `--seller`.
fn parse_filter(args: &[String]) -> Result<ReportFilter> {
    let mut filter = ReportFilter::all();

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| anyhow!("{} needs a value", flag))?;

        match flag.as_str() {
            "--from" => filter.start_date = Some(parse_date(value, NaiveTime::MIN)?),
            "--to" => filter.end_date = Some(parse_date(value, end_of_day())?),
            "--seller" => filter.seller_id = Some(value.clone()),
            other => bail!("Unknown option '{}'", other),
        }
    }

    Ok(filter)
}

/// Accepts RFC 3339 timestamps or plain dates; a plain date is pinned to
/// `time` in UTC.
fn parse_date(value: &str, time: NaiveTime) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}'", value))?;
    Ok(date.and_time(time).and_utc())
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}
