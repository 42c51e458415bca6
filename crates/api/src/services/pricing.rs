//! Order total verification.
//!
//! Item prices are client-submitted snapshots and are persisted as given,
//! but the arithmetic between them is not taken on faith: before an order is
//! written, the line totals and the grand total must agree with what the
//! client claims, within a one-cent tolerance.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::OrderItem;

/// Maximum accepted drift between claimed and recomputed amounts, absorbing
/// client-side float rounding.
const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// The client's claimed totals disagree with their own line items.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceMismatch {
    /// `items_price` is not the sum of `qty * price` over the items.
    #[error("items price {claimed} does not match line total {computed}")]
    ItemsPrice {
        /// What the client claimed.
        claimed: Decimal,
        /// What the line items sum to.
        computed: Decimal,
    },
    /// `total_price` is not `items + tax + shipping`.
    #[error("total price {claimed} does not match {computed}")]
    TotalPrice {
        /// What the client claimed.
        claimed: Decimal,
        /// Items + tax + shipping.
        computed: Decimal,
    },
}

/// Check the claimed totals against the submitted line items.
///
/// # Errors
///
/// Returns `PriceMismatch` naming the first inconsistent figure.
pub fn verify_order_totals(
    items: &[OrderItem],
    items_price: Decimal,
    tax_price: Decimal,
    shipping_price: Decimal,
    total_price: Decimal,
) -> Result<(), PriceMismatch> {
    let line_total: Decimal = items
        .iter()
        .map(|item| item.price * Decimal::from(item.qty))
        .sum();

    if (line_total - items_price).abs() > TOLERANCE {
        return Err(PriceMismatch::ItemsPrice {
            claimed: items_price,
            computed: line_total,
        });
    }

    let grand_total = items_price + tax_price + shipping_price;
    if (grand_total - total_price).abs() > TOLERANCE {
        return Err(PriceMismatch::TotalPrice {
            claimed: total_price,
            computed: grand_total,
        });
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use orchard_core::ProductId;

    fn item(qty: i32, price: &str) -> OrderItem {
        OrderItem {
            product_id: ProductId::new(1),
            name: "Widget".to_owned(),
            qty,
            price: price.parse().unwrap(),
            image: "/images/widget.jpg".to_owned(),
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_consistent_totals_accepted() {
        let items = vec![item(2, "10.00")];
        assert!(
            verify_order_totals(&items, dec("20.00"), dec("2.00"), dec("5.00"), dec("27.00"))
                .is_ok()
        );
    }

    #[test]
    fn test_within_tolerance_accepted() {
        // One cent of float rounding on the client side is forgiven.
        let items = vec![item(3, "3.33")];
        assert!(
            verify_order_totals(&items, dec("10.00"), dec("0.00"), dec("0.00"), dec("10.00"))
                .is_ok()
        );
    }

    #[test]
    fn test_inflated_items_price_rejected() {
        let items = vec![item(2, "10.00")];
        let err =
            verify_order_totals(&items, dec("2.00"), dec("0.00"), dec("0.00"), dec("2.00"))
                .unwrap_err();
        assert!(matches!(err, PriceMismatch::ItemsPrice { .. }));
    }

    #[test]
    fn test_wrong_grand_total_rejected() {
        let items = vec![item(1, "10.00")];
        let err =
            verify_order_totals(&items, dec("10.00"), dec("1.00"), dec("2.00"), dec("10.00"))
                .unwrap_err();
        assert!(matches!(err, PriceMismatch::TotalPrice { .. }));
    }

    #[test]
    fn test_multiple_lines_sum() {
        let items = vec![item(2, "4.50"), item(1, "1.00")];
        assert!(
            verify_order_totals(&items, dec("10.00"), dec("0.80"), dec("4.20"), dec("15.00"))
                .is_ok()
        );
    }
}
