//! Supplier directory and product catalogue
//!
//! Suppliers and courier services are user accounts with the matching role;
//! this service manages the supplier accounts on behalf of inventory
//! managers, the products suppliers list, and the courier lookup customers
//! use when placing orders.

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{validate_email, validate_non_negative, Product, Role, User};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::auth::hash_password;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, phone_number, address, created_at";

const PRODUCT_COLUMNS: &str = "id, supplier_id, name, price, weight, quantity, created_at";

/// Keys a new supplier account must carry
pub const SUPPLIER_REQUIRED_FIELDS: &[&str] =
    &["name", "email", "password", "phone_number", "address"];

/// Keys a new product must carry
pub const PRODUCT_REQUIRED_FIELDS: &[&str] = &["name", "price", "weight", "quantity"];

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// Input for creating a supplier account
#[derive(Debug, Deserialize)]
pub struct CreateSupplierInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub address: String,
}

/// Partial update of a supplier account
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSupplierInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// Input for listing a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub supplier_id: Option<i64>,
    pub name: String,
    pub price: Decimal,
    pub weight: Decimal,
    pub quantity: i32,
}

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a supplier account
    pub async fn create_supplier(&self, input: CreateSupplierInput) -> AppResult<User> {
        validate_email(&input.email)?;
        let password_hash = hash_password(&input.password)?;

        let supplier = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role, phone_number, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(Role::Supplier)
        .bind(&input.phone_number)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Email already exists"))?;

        tracing::info!(supplier_id = supplier.id, "supplier added");
        Ok(supplier)
    }

    /// List supplier accounts
    pub async fn list_suppliers(&self) -> AppResult<Vec<User>> {
        self.list_by_role(Role::Supplier).await
    }

    /// Get a supplier account by ID
    pub async fn get_supplier(&self, supplier_id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1 AND role = $2",
            USER_COLUMNS
        ))
        .bind(supplier_id)
        .bind(Role::Supplier)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    /// Apply a partial update to a supplier account
    pub async fn update_supplier(
        &self,
        supplier_id: i64,
        input: UpdateSupplierInput,
    ) -> AppResult<User> {
        if let Some(email) = &input.email {
            validate_email(email)?;
        }

        let supplier = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                name = COALESCE($3, name),
                email = COALESCE($4, email),
                phone_number = COALESCE($5, phone_number),
                address = COALESCE($6, address)
            WHERE id = $1 AND role = $2
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(supplier_id)
        .bind(Role::Supplier)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone_number)
        .bind(&input.address)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Email already exists"))?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        tracing::info!(supplier_id, "supplier updated");
        Ok(supplier)
    }

    /// Delete a supplier account together with its products
    pub async fn delete_supplier(&self, supplier_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND role = $2")
            .bind(supplier_id)
            .bind(Role::Supplier)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        tracing::info!(supplier_id, "supplier deleted");
        Ok(())
    }

    /// Courier service accounts customers can assign orders to
    pub async fn list_courier_services(&self) -> AppResult<Vec<User>> {
        self.list_by_role(Role::CourierService).await
    }

    /// The full product catalogue
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products ORDER BY id",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// List a product, owned by `caller_id` unless the payload names a supplier
    pub async fn create_product(
        &self,
        caller_id: i64,
        input: CreateProductInput,
    ) -> AppResult<Product> {
        validate_non_negative("price", input.price)?;
        validate_non_negative("weight", input.weight)?;
        validate_non_negative("quantity", Decimal::from(input.quantity))?;

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (supplier_id, name, price, weight, quantity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(input.supplier_id.unwrap_or(caller_id))
        .bind(&input.name)
        .bind(input.price)
        .bind(input.weight)
        .bind(input.quantity)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(product_id = product.id, supplier_id = product.supplier_id, "product listed");
        Ok(product)
    }

    async fn list_by_role(&self, role: Role) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE role = $1 ORDER BY id",
            USER_COLUMNS
        ))
        .bind(role)
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }
}
