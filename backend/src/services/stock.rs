//! Stock management service for the inventory manager's warehouse lines

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{validate_non_negative, Stock};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

const STOCK_COLUMNS: &str =
    "id, inventory_manager_id, name, price, quantity, weight, created_at, updated_at";

/// Keys a new stock line must carry
pub const STOCK_REQUIRED_FIELDS: &[&str] = &["name", "price", "quantity", "weight"];

/// Stock service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Input for adding a stock line
#[derive(Debug, Deserialize)]
pub struct CreateStockInput {
    pub inventory_manager_id: Option<i64>,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub weight: Decimal,
}

/// Partial update of a stock line
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStockInput {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub weight: Option<Decimal>,
}

impl UpdateStockInput {
    fn validate(&self) -> AppResult<()> {
        if let Some(price) = self.price {
            validate_non_negative("price", price)?;
        }
        if let Some(quantity) = self.quantity {
            validate_non_negative("quantity", Decimal::from(quantity))?;
        }
        if let Some(weight) = self.weight {
            validate_non_negative("weight", weight)?;
        }
        Ok(())
    }
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Add a stock line, owned by `caller_id` unless the payload names a manager
    pub async fn create_stock(&self, caller_id: i64, input: CreateStockInput) -> AppResult<Stock> {
        validate_non_negative("price", input.price)?;
        validate_non_negative("quantity", Decimal::from(input.quantity))?;
        validate_non_negative("weight", input.weight)?;

        let stock = sqlx::query_as::<_, Stock>(&format!(
            r#"
            INSERT INTO stocks (inventory_manager_id, name, price, quantity, weight)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            STOCK_COLUMNS
        ))
        .bind(input.inventory_manager_id.unwrap_or(caller_id))
        .bind(&input.name)
        .bind(input.price)
        .bind(input.quantity)
        .bind(input.weight)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(stock_id = stock.id, quantity = stock.quantity, "stock added");
        Ok(stock)
    }

    /// List all stock lines
    pub async fn list_stocks(&self) -> AppResult<Vec<Stock>> {
        let stocks = sqlx::query_as::<_, Stock>(&format!(
            "SELECT {} FROM stocks ORDER BY id",
            STOCK_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(stocks)
    }

    /// Get a stock line by ID
    pub async fn get_stock(&self, stock_id: i64) -> AppResult<Stock> {
        sqlx::query_as::<_, Stock>(&format!("SELECT {} FROM stocks WHERE id = $1", STOCK_COLUMNS))
            .bind(stock_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock".to_string()))
    }

    /// Apply a partial update
    pub async fn update_stock(&self, stock_id: i64, input: UpdateStockInput) -> AppResult<Stock> {
        input.validate()?;

        let stock = sqlx::query_as::<_, Stock>(&format!(
            r#"
            UPDATE stocks SET
                name = COALESCE($2, name),
                price = COALESCE($3, price),
                quantity = COALESCE($4, quantity),
                weight = COALESCE($5, weight),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            STOCK_COLUMNS
        ))
        .bind(stock_id)
        .bind(&input.name)
        .bind(input.price)
        .bind(input.quantity)
        .bind(input.weight)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock".to_string()))?;

        tracing::info!(stock_id, "stock updated");
        Ok(stock)
    }

    /// Delete a stock line; order items keep their product name snapshot
    pub async fn delete_stock(&self, stock_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM stocks WHERE id = $1")
            .bind(stock_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Stock".to_string()));
        }

        tracing::info!(stock_id, "stock deleted");
        Ok(())
    }
}
