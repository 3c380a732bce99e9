use crate::enums::OrderStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary key of an order row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i64);

/// Reference to a customer. Customers are owned by another system; only the id is known here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub i64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A customer purchase as recorded by the order-management system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    /// Sum of `price_at_order * quantity` over the order's items. Not re-checked here.
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
}

/// A line item of an order.
///
/// `price_at_order` is a snapshot of the menu price at checkout, so historical
/// revenue does not move when the menu changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub item_name: String,
    pub quantity: u32,
    pub price_at_order: Decimal,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price_at_order * Decimal::from(self.quantity)
    }
}

/// Sales of one menu item, aggregated over every recorded line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSales {
    pub item_name: String,
    pub total_quantity: u64,
    pub total_revenue: Decimal,
}

/// Number of orders currently in a given status. `count` is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: u64,
}

/// The headline numbers shown on the dashboard, computed together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Orders in any status.
    pub total_orders: u64,
    /// Completed revenue inside the requested window.
    pub today_revenue: Decimal,
    /// Distinct customers across all orders.
    pub total_customers: u64,
}

impl DashboardStats {
    pub fn empty() -> Self {
        Self {
            total_orders: 0,
            today_revenue: Decimal::ZERO,
            total_customers: 0,
        }
    }
}

impl Default for DashboardStats {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn line_total_multiplies_snapshot_price() {
        let item = OrderItem {
            id: 1,
            order_id: OrderId(7),
            item_name: "Flat White".to_string(),
            quantity: 3,
            price_at_order: dec!(3.40),
        };
        assert_eq!(item.line_total(), dec!(10.20));
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&CustomerId(42)).unwrap();
        assert_eq!(json, "42");
    }
}
