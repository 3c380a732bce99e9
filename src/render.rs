use clap::ValueEnum;
use comfy_table::{Table, presets::UTF8_FULL};
use core_types::{DashboardStats, ItemSales, Order, StatusCount};
use rust_decimal::Decimal;
use serde::Serialize;

/// How reports are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// A report that can be shown either as a terminal table or as JSON.
pub trait Report: Serialize {
    fn to_table(&self) -> Table;
}

pub fn render<R: Report>(report: &R, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table => Ok(report.to_table().to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

/// A single labelled amount, e.g. total completed revenue.
#[derive(Debug, Serialize)]
pub struct Amount {
    pub label: &'static str,
    pub amount: Decimal,
}

impl Report for Amount {
    fn to_table(&self) -> Table {
        let mut t = table(vec!["Metric", "Amount"]);
        t.add_row(vec![self.label.to_string(), self.amount.round_dp(2).to_string()]);
        t
    }
}

impl Report for DashboardStats {
    fn to_table(&self) -> Table {
        let mut t = table(vec!["Total orders", "Revenue in window", "Customers"]);
        t.add_row(vec![
            self.total_orders.to_string(),
            self.today_revenue.round_dp(2).to_string(),
            self.total_customers.to_string(),
        ]);
        t
    }
}

impl Report for Vec<StatusCount> {
    fn to_table(&self) -> Table {
        let mut t = table(vec!["Status", "Orders"]);
        for row in self {
            t.add_row(vec![row.status.to_string(), row.count.to_string()]);
        }
        t
    }
}

impl Report for Vec<ItemSales> {
    fn to_table(&self) -> Table {
        let mut t = table(vec!["#", "Item", "Quantity", "Revenue"]);
        for (rank, row) in self.iter().enumerate() {
            t.add_row(vec![
                (rank + 1).to_string(),
                row.item_name.clone(),
                row.total_quantity.to_string(),
                row.total_revenue.round_dp(2).to_string(),
            ]);
        }
        t
    }
}

impl Report for Vec<Order> {
    fn to_table(&self) -> Table {
        let mut t = table(vec!["Order", "Customer", "Status", "Total", "Placed at"]);
        for order in self {
            t.add_row(vec![
                order.id.to_string(),
                order.customer_id.to_string(),
                order.status.to_string(),
                order.total_amount.round_dp(2).to_string(),
                order.order_date.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            ]);
        }
        t
    }
}

impl Report for Option<Order> {
    fn to_table(&self) -> Table {
        match self {
            Some(order) => vec![order.clone()].to_table(),
            None => {
                let mut t = table(vec!["Order"]);
                t.add_row(vec!["no matching order"]);
                t
            }
        }
    }
}

/// Everything the dashboard page shows at once.
#[derive(Debug, Serialize)]
pub struct Overview {
    pub stats: DashboardStats,
    pub total_completed_revenue: Decimal,
    pub status_counts: Vec<StatusCount>,
    pub top_items: Vec<ItemSales>,
    pub recent_orders: Vec<Order>,
}

impl Overview {
    pub fn to_text(&self) -> String {
        let revenue = Amount {
            label: "Completed revenue (all time)",
            amount: self.total_completed_revenue,
        };
        [
            self.stats.to_table().to_string(),
            revenue.to_table().to_string(),
            self.status_counts.to_table().to_string(),
            self.top_items.to_table().to_string(),
            self.recent_orders.to_table().to_string(),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::{CustomerId, OrderId, OrderStatus};
    use rust_decimal_macros::dec;

    #[test]
    fn json_output_uses_plain_field_names() {
        let stats = DashboardStats {
            total_orders: 3,
            today_revenue: dec!(10.50),
            total_customers: 2,
        };
        let json = render(&stats, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_orders"], 3);
        assert_eq!(value["total_customers"], 2);
    }

    #[test]
    fn order_table_lists_every_order() {
        let orders = vec![Order {
            id: OrderId(12),
            customer_id: CustomerId(4),
            status: OrderStatus::Ready,
            total_amount: dec!(6.5),
            order_date: Utc.with_ymd_and_hms(2024, 7, 1, 9, 15, 0).unwrap(),
        }];
        let text = render(&orders, OutputFormat::Table).unwrap();
        assert!(text.contains("READY"));
        assert!(text.contains("2024-07-01 09:15:00 UTC"));
    }

    #[test]
    fn missing_order_renders_a_placeholder() {
        let text = render(&None::<Order>, OutputFormat::Table).unwrap();
        assert!(text.contains("no matching order"));
    }
}
