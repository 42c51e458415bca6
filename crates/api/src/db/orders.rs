//! Order repository for database operations.
//!
//! An order and its item snapshots are written in one transaction and the
//! snapshots are never touched again; after creation only the payment and
//! delivery completion fields mutate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use orchard_core::{OrderId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, PaymentResult, ShippingAddress};

/// Database row for `shop.order` (payment result columns flattened).
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    address: String,
    city: String,
    postal_code: String,
    country: String,
    payment_method: String,
    items_price: Decimal,
    tax_price: Decimal,
    shipping_price: Decimal,
    total_price: Decimal,
    is_paid: bool,
    paid_at: Option<DateTime<Utc>>,
    payment_id: Option<String>,
    payment_status: Option<String>,
    payment_update_time: Option<String>,
    payer_email: Option<String>,
    is_delivered: bool,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, order_items: Vec<OrderItem>) -> Order {
        // The four payment columns are written together; any one of them
        // present means a gateway result was recorded.
        let payment_result = self.payment_id.map(|payment_id| PaymentResult {
            id: payment_id,
            status: self.payment_status.unwrap_or_default(),
            update_time: self.payment_update_time.unwrap_or_default(),
            email_address: self.payer_email.unwrap_or_default(),
        });

        Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            order_items,
            shipping_address: ShippingAddress {
                address: self.address,
                city: self.city,
                postal_code: self.postal_code,
                country: self.country,
            },
            payment_method: self.payment_method,
            items_price: self.items_price,
            tax_price: self.tax_price,
            shipping_price: self.shipping_price,
            total_price: self.total_price,
            is_paid: self.is_paid,
            paid_at: self.paid_at,
            payment_result,
            is_delivered: self.is_delivered,
            delivered_at: self.delivered_at,
            created_at: self.created_at,
        }
    }
}

/// Database row for `shop.order_item`.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: i32,
    product_id: i32,
    name: String,
    qty: i32,
    price: Decimal,
    image: String,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            name: row.name,
            qty: row.qty,
            price: row.price,
            image: row.image,
        }
    }
}

const SELECT_ORDER: &str = r#"
    SELECT id, user_id, address, city, postal_code, country, payment_method,
           items_price, tax_price, shipping_price, total_price,
           is_paid, paid_at, payment_id, payment_status, payment_update_time,
           payer_email, is_delivered, delivered_at, created_at
    FROM shop."order"
"#;

const SELECT_ITEMS: &str = r"
    SELECT order_id, product_id, name, qty, price, image
    FROM shop.order_item
";

/// Everything needed to persist a new order.
///
/// Callers must have already rejected an empty item list and verified the
/// total arithmetic; this layer persists the snapshot verbatim.
#[derive(Debug)]
pub struct CreateOrder {
    /// Owning user.
    pub user_id: UserId,
    /// Item snapshots, non-empty.
    pub items: Vec<OrderItem>,
    /// Destination address.
    pub shipping_address: ShippingAddress,
    /// Payment method label.
    pub payment_method: String,
    /// Sum of line totals.
    pub items_price: Decimal,
    /// Tax amount.
    pub tax_price: Decimal,
    /// Shipping amount.
    pub shipping_price: Decimal,
    /// Grand total.
    pub total_price: Decimal,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order and its item snapshots in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// written in that case.
    #[instrument(skip(self, order), fields(user_id = %order.user_id, items = order.items.len()))]
    pub async fn create(&self, order: CreateOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: OrderRow = sqlx::query_as(
            r#"
            INSERT INTO shop."order"
                (user_id, address, city, postal_code, country, payment_method,
                 items_price, tax_price, shipping_price, total_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, user_id, address, city, postal_code, country, payment_method,
                      items_price, tax_price, shipping_price, total_price,
                      is_paid, paid_at, payment_id, payment_status, payment_update_time,
                      payer_email, is_delivered, delivered_at, created_at
            "#,
        )
        .bind(order.user_id.as_i32())
        .bind(&order.shipping_address.address)
        .bind(&order.shipping_address.city)
        .bind(&order.shipping_address.postal_code)
        .bind(&order.shipping_address.country)
        .bind(&order.payment_method)
        .bind(order.items_price)
        .bind(order.tax_price)
        .bind(order.shipping_price)
        .bind(order.total_price)
        .fetch_one(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                r"
                INSERT INTO shop.order_item (order_id, product_id, name, qty, price, image)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(row.id)
            .bind(item.product_id.as_i32())
            .bind(&item.name)
            .bind(item.qty)
            .bind(item.price)
            .bind(&item.image)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(row.into_order(order.items))
    }

    /// Get an order by ID with its item snapshots.
    ///
    /// Visibility (owner or admin) is the caller's concern; this is a plain
    /// lookup.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!("{SELECT_ORDER} WHERE id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items: Vec<OrderItemRow> =
            sqlx::query_as(&format!("{SELECT_ITEMS} WHERE order_id = $1 ORDER BY id ASC"))
                .bind(id.as_i32())
                .fetch_all(self.pool)
                .await?;

        Ok(Some(
            row.into_order(items.into_iter().map(OrderItem::from).collect()),
        ))
    }

    /// Record a payment: set the flag, stamp the time, store the gateway
    /// result verbatim. Re-invoking overwrites the stamp and result rather
    /// than erroring - idempotent in effect.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn mark_paid(
        &self,
        id: OrderId,
        payment: &PaymentResult,
    ) -> Result<Order, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            UPDATE shop."order"
            SET is_paid = TRUE, paid_at = now(),
                payment_id = $2, payment_status = $3,
                payment_update_time = $4, payer_email = $5
            WHERE id = $1
            RETURNING id, user_id, address, city, postal_code, country, payment_method,
                      items_price, tax_price, shipping_price, total_price,
                      is_paid, paid_at, payment_id, payment_status, payment_update_time,
                      payer_email, is_delivered, delivered_at, created_at
            "#,
        )
        .bind(id.as_i32())
        .bind(&payment.id)
        .bind(&payment.status)
        .bind(&payment.update_time)
        .bind(&payment.email_address)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => self.attach_items(row).await,
            None => Err(RepositoryError::NotFound),
        }
    }

    /// Record delivery. Independent of the payment flag; the two completion
    /// operations commute.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn mark_delivered(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            UPDATE shop."order"
            SET is_delivered = TRUE, delivered_at = now()
            WHERE id = $1
            RETURNING id, user_id, address, city, postal_code, country, payment_method,
                      items_price, tax_price, shipping_price, total_price,
                      is_paid, paid_at, payment_id, payment_status, payment_update_time,
                      payer_email, is_delivered, delivered_at, created_at
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => self.attach_items(row).await,
            None => Err(RepositoryError::NotFound),
        }
    }

    /// All orders belonging to one user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_mine(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> =
            sqlx::query_as(&format!("{SELECT_ORDER} WHERE user_id = $1 ORDER BY id ASC"))
                .bind(user_id.as_i32())
                .fetch_all(self.pool)
                .await?;

        self.attach_items_all(rows).await
    }

    /// Every order in the ledger, oldest first. Admin listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!("{SELECT_ORDER} ORDER BY id ASC"))
            .fetch_all(self.pool)
            .await?;

        self.attach_items_all(rows).await
    }

    async fn attach_items(&self, row: OrderRow) -> Result<Order, RepositoryError> {
        let items: Vec<OrderItemRow> =
            sqlx::query_as(&format!("{SELECT_ITEMS} WHERE order_id = $1 ORDER BY id ASC"))
                .bind(row.id)
                .fetch_all(self.pool)
                .await?;

        Ok(row.into_order(items.into_iter().map(OrderItem::from).collect()))
    }

    /// Fetch the item snapshots for a batch of orders with one query.
    async fn attach_items_all(
        &self,
        rows: Vec<OrderRow>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

        let item_rows: Vec<OrderItemRow> = sqlx::query_as(&format!(
            "{SELECT_ITEMS} WHERE order_id = ANY($1) ORDER BY id ASC"
        ))
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut items_by_order: std::collections::HashMap<i32, Vec<OrderItem>> =
            std::collections::HashMap::new();
        for item in item_rows {
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push(OrderItem::from(item));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = items_by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect())
    }
}
