//! HTTP handlers for the reporting dashboards
//!
//! Every report takes `startDate` and `endDate` (`YYYY-MM-DD`); the range is
//! validated before any query runs.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use shared::{parse_report_range, DateRange};

use crate::error::AppResult;
use crate::services::analytics::{
    InventoryReport, OrderPerformanceReport, SalesReport, SalesSummary,
};
use crate::services::AnalyticsService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ReportQuery {
    pub fn range(&self) -> AppResult<DateRange> {
        Ok(parse_report_range(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
        )?)
    }
}

/// Weekly sales and profit
pub async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<SalesSummary>> {
    let range = query.range()?;
    let service = AnalyticsService::new(state.db);
    Ok(Json(service.sales_summary(range).await?))
}

/// Monthly order volume and fulfilment
pub async fn get_order_performance(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<OrderPerformanceReport>> {
    let range = query.range()?;
    let service = AnalyticsService::new(state.db);
    Ok(Json(service.order_performance(range).await?))
}

/// Stock levels and supplier catalogue sizes
pub async fn get_inventory_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<InventoryReport>> {
    let range = query.range()?;
    let service = AnalyticsService::new(state.db);
    Ok(Json(service.inventory_report(range).await?))
}

/// Product performance and profit and loss
pub async fn get_sales_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<SalesReport>> {
    let range = query.range()?;
    let service = AnalyticsService::new(state.db);
    Ok(Json(service.sales_report(range).await?))
}
