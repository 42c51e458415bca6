//! Order domain types.
//!
//! An order is a snapshot: item names, prices and images are copied from the
//! catalog at creation time, so later product edits (or deletions) never
//! rewrite order history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orchard_core::{OrderId, ProductId, UserId};

/// A placed order.
///
/// Created once, atomically, from a non-empty item list. Afterward only the
/// payment and delivery completion fields are ever mutated, by two disjoint
/// operations; `is_paid` and `is_delivered` are independent booleans with no
/// enforced ordering between them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Owning user, immutable after creation.
    pub user_id: UserId,
    /// Item snapshots, in the order the client listed them.
    pub order_items: Vec<OrderItem>,
    /// Destination address.
    pub shipping_address: ShippingAddress,
    /// Payment method label (e.g., "PayPal"), opaque to this system.
    pub payment_method: String,
    /// Sum of line totals.
    pub items_price: Decimal,
    /// Tax amount.
    pub tax_price: Decimal,
    /// Shipping amount.
    pub shipping_price: Decimal,
    /// Grand total (items + tax + shipping).
    pub total_price: Decimal,
    /// Payment completion flag.
    pub is_paid: bool,
    /// When payment was recorded, if it was.
    pub paid_at: Option<DateTime<Utc>>,
    /// Gateway result recorded at payment time, opaque to this system.
    pub payment_result: Option<PaymentResult>,
    /// Delivery completion flag, independent of `is_paid`.
    pub is_delivered: bool,
    /// When delivery was recorded, if it was.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A line-item snapshot owned exclusively by its order.
///
/// `product_id` is a lookup key, not an ownership edge: deleting the product
/// leaves the snapshot intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Catalog product this line was copied from.
    pub product_id: ProductId,
    /// Product name at order time.
    pub name: String,
    /// Quantity ordered, positive.
    pub qty: i32,
    /// Unit price at order time.
    pub price: Decimal,
    /// Image reference at order time.
    pub image: String,
}

/// Shipping destination recorded on the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub postal_code: String,
    /// Country.
    pub country: String,
}

/// Payment gateway result stored verbatim when an order is marked paid.
///
/// Re-marking an order paid overwrites this record; the operation is
/// idempotent in effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    /// Gateway transaction ID.
    pub id: String,
    /// Gateway status string.
    pub status: String,
    /// Gateway-reported update time, opaque.
    pub update_time: String,
    /// Payer email as reported by the gateway.
    pub email_address: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        Order {
            id: OrderId::new(1),
            user_id: UserId::new(2),
            order_items: vec![OrderItem {
                product_id: ProductId::new(3),
                name: "Widget".to_owned(),
                qty: 2,
                price: Decimal::new(1000, 2),
                image: "/images/widget.jpg".to_owned(),
            }],
            shipping_address: ShippingAddress {
                address: "1 Main St".to_owned(),
                city: "Springfield".to_owned(),
                postal_code: "12345".to_owned(),
                country: "US".to_owned(),
            },
            payment_method: "PayPal".to_owned(),
            items_price: Decimal::new(2000, 2),
            tax_price: Decimal::new(200, 2),
            shipping_price: Decimal::new(500, 2),
            total_price: Decimal::new(2700, 2),
            is_paid: false,
            paid_at: None,
            payment_result: None,
            is_delivered: false,
            delivered_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_order_serializes_camel_case() {
        let json = serde_json::to_value(sample_order()).unwrap();
        assert_eq!(json["userId"], 2);
        assert_eq!(json["orderItems"][0]["productId"], 3);
        assert_eq!(json["orderItems"][0]["qty"], 2);
        assert_eq!(json["shippingAddress"]["postalCode"], "12345");
        assert_eq!(json["isPaid"], false);
        assert_eq!(json["isDelivered"], false);
        assert_eq!(json["totalPrice"], "27.00");
        assert_eq!(json["paidAt"], serde_json::Value::Null);
    }

    #[test]
    fn test_completion_flags_are_independent() {
        // Delivery may be recorded before payment; nothing couples the flags.
        let mut order = sample_order();
        order.is_delivered = true;
        order.delivered_at = Some(Utc::now());
        assert!(!order.is_paid);
        assert!(order.is_delivered);
    }
}
