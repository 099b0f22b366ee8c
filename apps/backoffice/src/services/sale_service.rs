//! Sale service.
//!
//! Records sales and prices every item through the commission engine.
//!
//! ## Create Sale Flow
//! ```text
//! CreateSaleRequest
//!      │
//!      ├── validate descriptions and values
//!      ├── seller must belong to the company
//!      │
//!      ├── for each item: CommissionEngine::calculate(seller_id, value)
//!      │        (reads only; nothing written yet)
//!      │
//!      └── sales().create_with_items(sale, items)   ← one transaction
//! ```
//!
//! Commissions are frozen on the item when it is written. Changing a
//! seller's policy later does not touch stored items; only a change of an
//! item's value prices it again.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ts_rs::TS;

use comissio_core::report::{ReportFilter, SaleCommissionSummary};
use comissio_core::validation::validate_description;
use comissio_core::{
    AmountInput, CoreError, ItemCommission, Sale, SaleItem, Seller, ValidationError,
};
use comissio_db::{DbError, SaleWithItems};

use crate::error::{ApiError, ApiResult};
use crate::services::parse_amount;
use crate::AppState;

const CREATE_SALE_FAILED: &str = "Failed to create sale";
const CREATE_ITEM_FAILED: &str = "Failed to create sale item";
const UPDATE_ITEM_FAILED: &str = "Failed to update sale item";

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleItemInput {
    pub description: String,
    pub value: AmountInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateSaleRequest {
    pub seller_id: String,
    /// Defaults to now.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub sale_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<SaleItemInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AddSaleItemRequest {
    pub sale_id: String,
    /// Seller the commission is computed for; defaults to the sale's seller.
    #[serde(default)]
    pub seller_id: Option<String>,
    pub description: String,
    pub value: AmountInput,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateSaleItemRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub value: Option<AmountInput>,
}

/// Changes the sale header only; stored item commissions are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateSaleRequest {
    #[serde(default)]
    pub seller_id: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub sale_date: Option<DateTime<Utc>>,
}

// =============================================================================
// Service
// =============================================================================

/// Sale service implementation.
pub struct SaleService {
    state: Arc<AppState>,
}

impl SaleService {
    /// Create a new sale service.
    pub fn new(state: Arc<AppState>) -> Self {
        SaleService { state }
    }

    /// Prices every item, then stores the sale and its items together.
    pub async fn create_sale(
        &self,
        company_id: &str,
        request: CreateSaleRequest,
    ) -> ApiResult<SaleWithItems> {
        let lines = request
            .items
            .iter()
            .map(|item| validate_line(&item.description, &item.value))
            .collect::<Result<Vec<_>, _>>()?;

        let seller = self.require_seller(company_id, &request.seller_id).await?;
        let sale = Sale::new(
            &seller.id,
            request.sale_date.unwrap_or_else(Utc::now),
            company_id,
        );

        let mut items = Vec::with_capacity(lines.len());
        for (description, value) in lines {
            let commission = self.price(&seller.id, value, CREATE_SALE_FAILED).await?;
            items.push(SaleItem::new(&sale.id, description, value, commission, company_id));
        }

        self.state.db.sales().create_with_items(&sale, &items).await?;

        info!(
            sale_id = %sale.id,
            seller_id = %sale.seller_id,
            items = items.len(),
            "Sale recorded"
        );

        Ok(SaleWithItems { sale, items })
    }

    pub async fn get_sale(&self, company_id: &str, id: &str) -> ApiResult<SaleWithItems> {
        self.state
            .db
            .sales()
            .get_with_items(company_id, id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(id.to_string()).into())
    }

    /// Sales of the company, newest first, narrowed by period and seller.
    pub async fn list_sales(&self, company_id: &str, filter: &ReportFilter) -> ApiResult<Vec<Sale>> {
        validate_period(filter)?;
        Ok(self.state.db.sales().list(company_id, filter).await?)
    }

    /// Reassigns a sale or moves its date.
    pub async fn update_sale(
        &self,
        company_id: &str,
        id: &str,
        request: UpdateSaleRequest,
    ) -> ApiResult<Sale> {
        let mut sale = self.require_sale(company_id, id).await?;

        if let Some(seller_id) = request.seller_id {
            let seller = self.require_seller(company_id, &seller_id).await?;
            sale.seller_id = seller.id;
        }
        if let Some(sale_date) = request.sale_date {
            sale.sale_date = sale_date;
        }

        Ok(self.state.db.sales().update_sale(&sale).await?)
    }

    /// Deletes a sale together with its items.
    pub async fn delete_sale(&self, company_id: &str, id: &str) -> ApiResult<()> {
        self.state.db.sales().delete(company_id, id).await?;
        info!(sale_id = %id, "Sale deleted");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Items
    // -------------------------------------------------------------------------

    /// Adds a priced item to an existing sale.
    pub async fn add_item(&self, company_id: &str, request: AddSaleItemRequest) -> ApiResult<SaleItem> {
        let (description, value) = validate_line(&request.description, &request.value)?;
        let sale = self.require_sale(company_id, &request.sale_id).await?;

        let seller_id = match request.seller_id {
            Some(seller_id) => self.require_seller(company_id, &seller_id).await?.id,
            None => sale.seller_id,
        };

        let commission = self.price(&seller_id, value, CREATE_ITEM_FAILED).await?;
        let item = SaleItem::new(&sale.id, description, value, commission, company_id);

        self.state.db.sales().insert_item(&item).await?;
        Ok(item)
    }

    pub async fn get_item(&self, company_id: &str, id: &str) -> ApiResult<SaleItem> {
        self.state
            .db
            .sales()
            .get_item(company_id, id)
            .await?
            .ok_or_else(|| ApiError::not_found("SaleItem", id))
    }

    /// Edits an item. A new value is priced again for the sale's current
    /// seller; a description change alone keeps the stored commission.
    pub async fn update_item(
        &self,
        company_id: &str,
        id: &str,
        request: UpdateSaleItemRequest,
    ) -> ApiResult<SaleItem> {
        let mut item = self.get_item(company_id, id).await?;

        if let Some(description) = &request.description {
            item.description = validate_description(description)?;
        }

        if let Some(input) = &request.value {
            let value = validate_item_value(input)?;

            if value != item.value {
                let sale = self.require_sale(company_id, &item.sale_id).await?;
                let commission = self.price(&sale.seller_id, value, UPDATE_ITEM_FAILED).await?;

                item.value = value;
                item.apply_commission(commission);
            }
        }

        Ok(self.state.db.sales().update_item(&item).await?)
    }

    pub async fn delete_item(&self, company_id: &str, id: &str) -> ApiResult<()> {
        self.state.db.sales().delete_item(company_id, id).await?;
        Ok(())
    }

    /// Seller and manager commission totals of one sale with its items.
    pub async fn commission_summary(
        &self,
        company_id: &str,
        sale_id: &str,
    ) -> ApiResult<SaleCommissionSummary> {
        let SaleWithItems { sale, items } = self.get_sale(company_id, sale_id).await?;
        Ok(SaleCommissionSummary::from_items(sale, items))
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    /// Runs the engine. Any failure is logged and reported as `context`.
    async fn price(&self, seller_id: &str, value: f64, context: &str) -> ApiResult<ItemCommission> {
        let engine = self.state.db.commission_engine();

        match engine.calculate(seller_id, value).await {
            Ok(result) => Ok(ItemCommission::from(result)),
            Err(err) => Err(commission_failure(context, seller_id, err)),
        }
    }

    async fn require_sale(&self, company_id: &str, id: &str) -> ApiResult<Sale> {
        self.state
            .db
            .sales()
            .get(company_id, id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(id.to_string()).into())
    }

    async fn require_seller(&self, company_id: &str, id: &str) -> ApiResult<Seller> {
        self.state
            .db
            .sellers()
            .get(company_id, id)
            .await?
            .ok_or_else(|| CoreError::SellerNotFound(id.to_string()).into())
    }
}

fn commission_failure(context: &str, seller_id: &str, err: DbError) -> ApiError {
    warn!(seller_id = %seller_id, error = %err, "{}", context);
    ApiError::business(context)
}

fn validate_line(description: &str, value: &AmountInput) -> Result<(String, f64), ValidationError> {
    Ok((validate_description(description)?, validate_item_value(value)?))
}

fn validate_item_value(input: &AmountInput) -> Result<f64, ValidationError> {
    let value = parse_amount("value", input)?;
    if value < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "value".to_string(),
        });
    }
    Ok(value)
}

pub(crate) fn validate_period(filter: &ReportFilter) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
        if start > end {
            return Err(ValidationError::InvalidFormat {
                field: "start_date".to_string(),
                reason: "must not be after end_date".to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::error::ErrorCode;
    use crate::services::testing::{test_state, two_level_org, Org, COMPANY, OTHER_COMPANY};

    async fn setup() -> (SaleService, Arc<AppState>, Org) {
        let state = test_state().await;
        let org = two_level_org(&state).await;
        (SaleService::new(state.clone()), state, org)
    }

    fn line(description: &str, value: impl Into<AmountInput>) -> SaleItemInput {
        SaleItemInput {
            description: description.to_string(),
            value: value.into(),
        }
    }

    fn sale_request(seller_id: &str, items: Vec<SaleItemInput>) -> CreateSaleRequest {
        CreateSaleRequest {
            seller_id: seller_id.to_string(),
            sale_date: None,
            items,
        }
    }

    #[tokio::test]
    async fn test_create_sale_prices_items() {
        let (svc, _, org) = setup().await;

        let created = svc
            .create_sale(
                COMPANY,
                sale_request(&org.vendedor_seller.id, vec![line("Onix 1.0", 5000.0)]),
            )
            .await
            .unwrap();

        let item = &created.items[0];
        assert_eq!(item.seller_commission_value, 200.0);
        assert_eq!(item.manager_id.as_deref(), Some(org.gerente_seller.id.as_str()));
        assert_eq!(item.manager_commission_value, 350.0);
        assert!(item
            .seller_commission_rule
            .as_deref()
            .unwrap()
            .starts_with("Total de comissão: R$ 200.00."));

        let stored = svc.get_sale(COMPANY, &created.sale.id).await.unwrap();
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.items[0].id, item.id);
        assert_eq!(stored.items[0].manager_commission_rule, item.manager_commission_rule);
    }

    #[tokio::test]
    async fn test_create_sale_defaults_date_to_now() {
        let (svc, _, org) = setup().await;
        let before = Utc::now();

        let created = svc
            .create_sale(COMPANY, sale_request(&org.vendedor_seller.id, vec![]))
            .await
            .unwrap();

        assert!(created.sale.sale_date >= before);
        assert!(created.sale.sale_date <= Utc::now());
        assert!(created.items.is_empty());
    }

    #[tokio::test]
    async fn test_create_sale_rejects_bad_input_before_writing() {
        let (svc, state, org) = setup().await;

        let err = svc
            .create_sale(
                COMPANY,
                sale_request(
                    &org.vendedor_seller.id,
                    vec![line("Onix", 5000.0), line("Película", "abc")],
                ),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = svc
            .create_sale(COMPANY, sale_request(&org.vendedor_seller.id, vec![line("", 10.0)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = svc
            .create_sale(COMPANY, sale_request(&org.vendedor_seller.id, vec![line("Onix", -1.0)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let sales = state.db.sales().list(COMPANY, &ReportFilter::all()).await.unwrap();
        assert!(sales.is_empty());
    }

    #[tokio::test]
    async fn test_create_sale_unknown_or_foreign_seller() {
        let (svc, _, org) = setup().await;

        let err = svc
            .create_sale(COMPANY, sale_request("missing", vec![line("Onix", 5000.0)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = svc
            .create_sale(
                OTHER_COMPANY,
                sale_request(&org.vendedor_seller.id, vec![line("Onix", 5000.0)]),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_add_item_after_seller_deleted() {
        let (svc, state, org) = setup().await;

        let sale = svc
            .create_sale(COMPANY, sale_request(&org.vendedor_seller.id, vec![]))
            .await
            .unwrap()
            .sale;
        state.db.sellers().delete(COMPANY, &org.vendedor_seller.id).await.unwrap();

        let err = svc
            .add_item(
                COMPANY,
                AddSaleItemRequest {
                    sale_id: sale.id,
                    seller_id: None,
                    description: "Onix".to_string(),
                    value: AmountInput::from(1000.0),
                },
            )
            .await
            .unwrap_err();

        // Sales go with their seller
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_engine_failure_is_reported_generically() {
        let (svc, _, _) = setup().await;

        let err = svc.price("missing", 1000.0, CREATE_ITEM_FAILED).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(err.message, "Failed to create sale item");
    }

    #[tokio::test]
    async fn test_add_item_for_sale_seller_and_explicit_seller() {
        let (svc, _, org) = setup().await;
        let sale = svc
            .create_sale(COMPANY, sale_request(&org.vendedor_seller.id, vec![]))
            .await
            .unwrap()
            .sale;

        let item = svc
            .add_item(
                COMPANY,
                AddSaleItemRequest {
                    sale_id: sale.id.clone(),
                    seller_id: None,
                    description: "Tapetes".to_string(),
                    value: AmountInput::from("1000"),
                },
            )
            .await
            .unwrap();
        assert_eq!(item.seller_commission_value, 80.0);
        assert_eq!(item.manager_commission_value, 150.0);

        let item = svc
            .add_item(
                COMPANY,
                AddSaleItemRequest {
                    sale_id: sale.id.clone(),
                    seller_id: Some(org.gerente_seller.id.clone()),
                    description: "Seguro".to_string(),
                    value: AmountInput::from(1000.0),
                },
            )
            .await
            .unwrap();
        assert_eq!(item.seller_commission_value, 150.0);
        assert!(item.manager_id.is_none());
        assert_eq!(item.manager_commission_value, 0.0);
        assert!(item.manager_commission_rule.is_none());

        assert_eq!(svc.get_sale(COMPANY, &sale.id).await.unwrap().items.len(), 2);
    }

    #[tokio::test]
    async fn test_add_item_to_missing_sale() {
        let (svc, _, _) = setup().await;

        let err = svc
            .add_item(
                COMPANY,
                AddSaleItemRequest {
                    sale_id: "missing".to_string(),
                    seller_id: None,
                    description: "Onix".to_string(),
                    value: AmountInput::from(1000.0),
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_update_item_value_recomputes() {
        let (svc, state, org) = setup().await;
        let created = svc
            .create_sale(
                COMPANY,
                sale_request(&org.vendedor_seller.id, vec![line("Onix", 5000.0)]),
            )
            .await
            .unwrap();
        let item_id = created.items[0].id.clone();

        // Policy changes alone do not touch stored items
        state
            .db
            .sellers()
            .update_policy(COMPANY, &org.vendedor_seller.id, Some(0.0), Some(10.0))
            .await
            .unwrap();

        let renamed = svc
            .update_item(
                COMPANY,
                &item_id,
                UpdateSaleItemRequest {
                    description: Some("Onix 1.0 LT".to_string()),
                    value: Some(AmountInput::from(5000.0)),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.description, "Onix 1.0 LT");
        assert_eq!(renamed.seller_commission_value, 200.0);

        let repriced = svc
            .update_item(
                COMPANY,
                &item_id,
                UpdateSaleItemRequest {
                    value: Some(AmountInput::from(6000.0)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(repriced.value, 6000.0);
        assert_eq!(repriced.seller_commission_value, 600.0);
        assert_eq!(repriced.manager_commission_value, 400.0);
        assert_eq!(repriced.description, "Onix 1.0 LT");
    }

    #[tokio::test]
    async fn test_update_item_uses_current_sale_seller() {
        let (svc, _, org) = setup().await;
        let created = svc
            .create_sale(
                COMPANY,
                sale_request(&org.vendedor_seller.id, vec![line("Onix", 1000.0)]),
            )
            .await
            .unwrap();

        svc.update_sale(
            COMPANY,
            &created.sale.id,
            UpdateSaleRequest {
                seller_id: Some(org.gerente_seller.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // Reassigning the sale keeps the stored commission
        let kept = svc.get_sale(COMPANY, &created.sale.id).await.unwrap();
        assert_eq!(kept.items[0].seller_commission_value, 80.0);

        let repriced = svc
            .update_item(
                COMPANY,
                &created.items[0].id,
                UpdateSaleItemRequest {
                    value: Some(AmountInput::from(2000.0)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(repriced.seller_commission_value, 200.0);
        assert!(repriced.manager_id.is_none());
    }

    #[tokio::test]
    async fn test_list_sales_filters() {
        let (svc, _, org) = setup().await;
        let jan = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2024, 2, 15, 12, 0, 0).unwrap();

        for (seller, date) in [
            (&org.vendedor_seller.id, jan),
            (&org.vendedor_seller.id, feb),
            (&org.gerente_seller.id, feb),
        ] {
            svc.create_sale(
                COMPANY,
                CreateSaleRequest {
                    seller_id: seller.clone(),
                    sale_date: Some(date),
                    items: vec![line("Onix", 1000.0)],
                },
            )
            .await
            .unwrap();
        }

        let february = ReportFilter::all().with_period(feb - Duration::days(1), feb + Duration::days(1));
        assert_eq!(svc.list_sales(COMPANY, &february).await.unwrap().len(), 2);

        let bruno = ReportFilter::all().with_seller(&org.vendedor_seller.id);
        let sales = svc.list_sales(COMPANY, &bruno).await.unwrap();
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].sale_date, feb);

        let inverted = ReportFilter::all().with_period(feb, jan);
        let err = svc.list_sales(COMPANY, &inverted).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_commission_summary_and_deletes() {
        let (svc, _, org) = setup().await;
        let created = svc
            .create_sale(
                COMPANY,
                sale_request(
                    &org.vendedor_seller.id,
                    vec![line("Onix", 5000.0), line("Tapetes", 1000.0)],
                ),
            )
            .await
            .unwrap();

        let summary = svc.commission_summary(COMPANY, &created.sale.id).await.unwrap();
        assert_eq!(summary.items_value_total, 6000.0);
        assert_eq!(summary.seller_commission_total, 280.0);
        assert_eq!(summary.manager_commission_total, 500.0);
        assert_eq!(summary.total_commission, 780.0);

        svc.delete_item(COMPANY, &created.items[1].id).await.unwrap();
        let summary = svc.commission_summary(COMPANY, &created.sale.id).await.unwrap();
        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.total_commission, 550.0);

        svc.delete_sale(COMPANY, &created.sale.id).await.unwrap();
        let err = svc.commission_summary(COMPANY, &created.sale.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = svc.delete_item(COMPANY, &created.items[0].id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_get_item() {
        let (svc, _, org) = setup().await;
        let created = svc
            .create_sale(COMPANY, sale_request(&org.vendedor_seller.id, vec![line("Onix", 5000.0)]))
            .await
            .unwrap();
        let item_id = &created.items[0].id;

        let item = svc.get_item(COMPANY, item_id).await.unwrap();
        assert_eq!(item.sale_id, created.sale.id);
        assert_eq!(item.value, 5000.0);
        assert_eq!(item.seller_commission_value, 200.0);

        let err = svc.get_item(OTHER_COMPANY, item_id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = svc.get_item(COMPANY, "no-such-item").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        svc.delete_item(COMPANY, item_id).await.unwrap();
        let err = svc.get_item(COMPANY, item_id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
