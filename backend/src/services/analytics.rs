//! Reporting service for the inventory manager dashboards
//!
//! Each report runs a few grouped queries over the requested date range and
//! reshapes the rows into the chart-ready series the dashboard expects. The
//! reshaping is pure and lives in free functions so it can be tested without
//! a database.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::DateRange;
use sqlx::{FromRow, PgPool};

use crate::error::AppResult;

/// How many products are listed as bestsellers and as low performers
pub const PERFORMER_COUNT: usize = 3;

/// Reporting service
#[derive(Clone)]
pub struct AnalyticsService {
    db: PgPool,
}

/// Money summed over one calendar day
#[derive(Debug, Clone, FromRow)]
pub struct DailyAmount {
    pub day: NaiveDate,
    pub amount: Decimal,
}

/// Units of one product sold in one month
#[derive(Debug, Clone, FromRow)]
pub struct ProductMonthQuantity {
    pub name: String,
    pub month: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, FromRow)]
struct MonthOrderCounts {
    month: String,
    total_orders: i64,
    fulfilled_orders: i64,
}

#[derive(Debug, Clone, FromRow)]
struct StockLevelRow {
    name: String,
    quantity: i32,
}

#[derive(Debug, Clone, FromRow)]
struct SupplierProductCount {
    supplier: String,
    total_products: i64,
}

/// Weekly sales and profit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub labels: Vec<String>,
    pub sales_data: Vec<Decimal>,
    pub profits_data: Vec<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderPerformanceReport {
    pub order_fulfilment_rate: FulfilmentRate,
    pub order_volume_trends: VolumeTrends,
}

#[derive(Debug, Clone, Serialize)]
pub struct FulfilmentRate {
    pub months: Vec<String>,
    pub total_orders: Vec<i64>,
    pub fulfilled_orders: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeTrends {
    pub months: Vec<String>,
    pub order_counts: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryReport {
    pub stock_levels: StockLevels,
    pub supplier_stock_distribution: SupplierDistribution,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockLevels {
    pub products: Vec<String>,
    pub quantities: Vec<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplierDistribution {
    pub suppliers: Vec<String>,
    pub total_products: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub product_sales_trends: ProductSalesTrends,
    pub profit_loss_reports: ProfitLoss,
}

/// Each entry serializes as `[name, {months, quantities}]`
#[derive(Debug, Clone, Serialize)]
pub struct ProductSalesTrends {
    pub bestsellers: Vec<(String, MonthlyQuantities)>,
    pub low_performers: Vec<(String, MonthlyQuantities)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyQuantities {
    pub months: Vec<String>,
    pub quantities: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfitLoss {
    pub months: Vec<String>,
    pub revenue: Vec<Decimal>,
    pub costs: Vec<Decimal>,
    pub profit: Vec<Decimal>,
}

// ============================================================================
// Bucketing
// ============================================================================

/// `Week 1..n` labels covering the range in seven-day steps from the start date
pub fn week_labels(range: &DateRange) -> Vec<String> {
    let weeks = week_index(range, range.end) + 1;
    (1..=weeks).map(|n| format!("Week {}", n)).collect()
}

/// Zero-based week bucket of `day` counted from the range start
pub fn week_index(range: &DateRange, day: NaiveDate) -> usize {
    ((day - range.start).num_days().max(0) / 7) as usize
}

/// Every `YYYY-MM` month the range touches, in order
pub fn month_keys(range: &DateRange) -> Vec<String> {
    let mut months = Vec::new();
    let (mut year, mut month) = (range.start.year(), range.start.month());
    let (end_year, end_month) = (range.end.year(), range.end.month());

    while (year, month) <= (end_year, end_month) {
        months.push(format!("{:04}-{:02}", year, month));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    months
}

/// Sum daily amounts into weekly buckets
pub fn weekly_totals(range: &DateRange, amounts: &[DailyAmount]) -> Vec<Decimal> {
    let mut totals = vec![Decimal::ZERO; week_labels(range).len()];
    for row in amounts.iter().filter(|r| range.contains(r.day)) {
        totals[week_index(range, row.day)] += row.amount;
    }
    totals
}

/// Sum daily amounts into the given months
pub fn monthly_totals(months: &[String], amounts: &[DailyAmount]) -> Vec<Decimal> {
    let mut by_month: HashMap<String, Decimal> = HashMap::new();
    for row in amounts {
        *by_month
            .entry(row.day.format("%Y-%m").to_string())
            .or_default() += row.amount;
    }
    months
        .iter()
        .map(|m| by_month.get(m).copied().unwrap_or_default())
        .collect()
}

/// Element-wise `a - b`
pub fn subtract(a: &[Decimal], b: &[Decimal]) -> Vec<Decimal> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

/// Top and bottom products by total units sold, each with a monthly series
pub fn rank_products(
    months: &[String],
    rows: &[ProductMonthQuantity],
) -> (
    Vec<(String, MonthlyQuantities)>,
    Vec<(String, MonthlyQuantities)>,
) {
    let mut per_product: BTreeMap<&str, HashMap<&str, i64>> = BTreeMap::new();
    for row in rows {
        *per_product
            .entry(row.name.as_str())
            .or_default()
            .entry(row.month.as_str())
            .or_default() += row.quantity;
    }

    let mut ranked: Vec<(String, MonthlyQuantities, i64)> = per_product
        .into_iter()
        .map(|(name, by_month)| {
            let quantities: Vec<i64> = months
                .iter()
                .map(|m| by_month.get(m.as_str()).copied().unwrap_or(0))
                .collect();
            let total = quantities.iter().sum();
            (
                name.to_string(),
                MonthlyQuantities {
                    months: months.to_vec(),
                    quantities,
                },
                total,
            )
        })
        .collect();

    // Highest total first; names break ties so output is stable
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));

    let best_count = ranked.len().min(PERFORMER_COUNT);
    let bestsellers = ranked[..best_count]
        .iter()
        .map(|(name, series, _)| (name.clone(), series.clone()))
        .collect();
    // A product listed as a bestseller is never also a low performer
    let low_performers = ranked[best_count..]
        .iter()
        .rev()
        .take(PERFORMER_COUNT)
        .map(|(name, series, _)| (name.clone(), series.clone()))
        .collect();

    (bestsellers, low_performers)
}

/// Align grouped monthly counts with the full month list
fn fill_counts(months: &[String], rows: &[MonthOrderCounts]) -> (Vec<i64>, Vec<i64>) {
    let by_month: HashMap<&str, &MonthOrderCounts> =
        rows.iter().map(|r| (r.month.as_str(), r)).collect();
    months
        .iter()
        .map(|m| {
            by_month
                .get(m.as_str())
                .map(|r| (r.total_orders, r.fulfilled_orders))
                .unwrap_or((0, 0))
        })
        .unzip()
}

impl AnalyticsService {
    /// Create a new AnalyticsService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Weekly sales and profit for the dashboard chart
    pub async fn sales_summary(&self, range: DateRange) -> AppResult<SalesSummary> {
        let sales = self.daily_sales(&range).await?;
        let costs = self.daily_replenishment_costs(&range).await?;

        let sales_data = weekly_totals(&range, &sales);
        let profits_data = subtract(&sales_data, &weekly_totals(&range, &costs));

        Ok(SalesSummary {
            labels: week_labels(&range),
            sales_data,
            profits_data,
        })
    }

    /// Monthly order volume and how many of those orders were delivered
    pub async fn order_performance(&self, range: DateRange) -> AppResult<OrderPerformanceReport> {
        let rows = sqlx::query_as::<_, MonthOrderCounts>(
            r#"
            SELECT to_char(created_at, 'YYYY-MM') AS month,
                   COUNT(*) AS total_orders,
                   COUNT(*) FILTER (WHERE status = 'Delivered') AS fulfilled_orders
            FROM orders
            WHERE created_at::date BETWEEN $1 AND $2
            GROUP BY 1
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        let months = month_keys(&range);
        let (total_orders, fulfilled_orders) = fill_counts(&months, &rows);

        Ok(OrderPerformanceReport {
            order_volume_trends: VolumeTrends {
                months: months.clone(),
                order_counts: total_orders.clone(),
            },
            order_fulfilment_rate: FulfilmentRate {
                months,
                total_orders,
                fulfilled_orders,
            },
        })
    }

    /// Stock levels and supplier catalogue sizes for rows created in the range
    pub async fn inventory_report(&self, range: DateRange) -> AppResult<InventoryReport> {
        let stock = sqlx::query_as::<_, StockLevelRow>(
            r#"
            SELECT name, quantity
            FROM stocks
            WHERE created_at::date BETWEEN $1 AND $2
            ORDER BY name, id
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        let suppliers = sqlx::query_as::<_, SupplierProductCount>(
            r#"
            SELECT u.name AS supplier, COUNT(p.id) AS total_products
            FROM products p
            JOIN users u ON u.id = p.supplier_id
            WHERE p.created_at::date BETWEEN $1 AND $2
            GROUP BY u.id, u.name
            ORDER BY u.name
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        let (products, quantities) = stock.into_iter().map(|r| (r.name, r.quantity)).unzip();
        let (suppliers, total_products) = suppliers
            .into_iter()
            .map(|r| (r.supplier, r.total_products))
            .unzip();

        Ok(InventoryReport {
            stock_levels: StockLevels {
                products,
                quantities,
            },
            supplier_stock_distribution: SupplierDistribution {
                suppliers,
                total_products,
            },
        })
    }

    /// Product performance and monthly profit and loss
    pub async fn sales_report(&self, range: DateRange) -> AppResult<SalesReport> {
        let product_rows = sqlx::query_as::<_, ProductMonthQuantity>(
            r#"
            SELECT oi.product_name AS name,
                   to_char(o.created_at, 'YYYY-MM') AS month,
                   SUM(oi.quantity)::BIGINT AS quantity
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.created_at::date BETWEEN $1 AND $2
            GROUP BY 1, 2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        let months = month_keys(&range);
        let (bestsellers, low_performers) = rank_products(&months, &product_rows);

        let revenue = monthly_totals(&months, &self.daily_sales(&range).await?);
        let costs = monthly_totals(&months, &self.daily_replenishment_costs(&range).await?);
        let profit = subtract(&revenue, &costs);

        Ok(SalesReport {
            product_sales_trends: ProductSalesTrends {
                bestsellers,
                low_performers,
            },
            profit_loss_reports: ProfitLoss {
                months,
                revenue,
                costs,
                profit,
            },
        })
    }

    async fn daily_sales(&self, range: &DateRange) -> AppResult<Vec<DailyAmount>> {
        let rows = sqlx::query_as::<_, DailyAmount>(
            r#"
            SELECT o.created_at::date AS day, SUM(oi.price * oi.quantity) AS amount
            FROM orders o
            JOIN order_items oi ON oi.order_id = o.id
            WHERE o.created_at::date BETWEEN $1 AND $2
            GROUP BY 1
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn daily_replenishment_costs(&self, range: &DateRange) -> AppResult<Vec<DailyAmount>> {
        let rows = sqlx::query_as::<_, DailyAmount>(
            r#"
            SELECT r.created_at::date AS day, SUM(ri.price * ri.quantity) AS amount
            FROM replenishment_orders r
            JOIN replenishment_order_items ri ON ri.replenishment_order_id = r.id
            WHERE r.created_at::date BETWEEN $1 AND $2
            GROUP BY 1
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}
