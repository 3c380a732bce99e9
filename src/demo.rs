use analytics::InMemoryOrderStore;
use chrono::{DateTime, Duration, Utc};
use core_types::{CustomerId, Order, OrderId, OrderItem, OrderStatus};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// (customer, status, hours before now, items as (name, quantity, unit price))
type SeedOrder = (i64, OrderStatus, i64, Vec<(&'static str, u32, Decimal)>);

fn seed_orders() -> Vec<SeedOrder> {
    vec![
        (1, OrderStatus::Completed, 50, vec![("Flat White", 2, dec!(3.40)), ("Croissant", 1, dec!(2.80))]),
        (2, OrderStatus::Completed, 30, vec![("Espresso", 3, dec!(2.20))]),
        (1, OrderStatus::Cancelled, 26, vec![("Mocha", 1, dec!(4.10))]),
        (3, OrderStatus::Completed, 5, vec![("Flat White", 1, dec!(3.40)), ("Banana Bread", 2, dec!(3.00))]),
        (2, OrderStatus::Completed, 3, vec![("Espresso", 2, dec!(2.20)), ("Croissant", 2, dec!(2.80))]),
        (4, OrderStatus::Preparing, 1, vec![("Chai Latte", 1, dec!(3.90))]),
        (3, OrderStatus::Pending, 0, vec![("Flat White", 3, dec!(3.50))]),
    ]
}

/// Builds an in-memory store with a small, realistic café history ending at `now`.
pub async fn seeded_store(now: DateTime<Utc>) -> InMemoryOrderStore {
    let store = InMemoryOrderStore::new();
    let mut next_item_id = 1;

    for (index, (customer, status, hours_ago, items)) in seed_orders().into_iter().enumerate() {
        let order_id = OrderId(index as i64 + 1);
        let mut total = Decimal::ZERO;
        for (name, quantity, price) in items {
            let item = OrderItem {
                id: next_item_id,
                order_id,
                item_name: name.to_string(),
                quantity,
                price_at_order: price,
            };
            total += item.line_total();
            next_item_id += 1;
            store.insert_item(item).await;
        }
        store
            .insert_order(Order {
                id: order_id,
                customer_id: CustomerId(customer),
                status,
                total_amount: total,
                order_date: now - Duration::hours(hours_ago),
            })
            .await;
    }

    tracing::info!("Seeded the in-memory demo store.");
    store
}
