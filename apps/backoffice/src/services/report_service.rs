//! Report service.
//!
//! Commission report per seller over a period.

use std::sync::Arc;

use tracing::debug;

use comissio_core::report::{build_commission_report, CommissionReport, ReportFilter};

use crate::error::ApiResult;
use crate::services::sale_service::validate_period;
use crate::AppState;

/// Report service implementation.
pub struct ReportService {
    state: Arc<AppState>,
}

impl ReportService {
    /// Create a new report service.
    pub fn new(state: Arc<AppState>) -> Self {
        ReportService { state }
    }

    /// Per-seller commission totals for the company.
    ///
    /// Manager overrides are credited to the manager's own line, so every
    /// sale in the period is read even when the filter names one seller.
    pub async fn commission_report(
        &self,
        company_id: &str,
        filter: &ReportFilter,
    ) -> ApiResult<CommissionReport> {
        validate_period(filter)?;

        let period = ReportFilter {
            seller_id: None,
            ..filter.clone()
        };

        let sales = self.state.db.sales().list(company_id, &period).await?;
        let items = self
            .state
            .db
            .sales()
            .items_in_period(company_id, filter.start_date, filter.end_date)
            .await?;
        let names = self.state.db.sellers().names(company_id).await?;

        debug!(
            sales = sales.len(),
            items = items.len(),
            seller_id = ?filter.seller_id,
            "Building commission report"
        );

        Ok(build_commission_report(filter, &sales, &items, &names))
    }
}
