use crate::error::AnalyticsError;
use crate::store::{OrderFilter, OrderQuery, OrderSort, OrderStore};
use async_trait::async_trait;
use core_types::{
    DashboardStats, DateWindow, ItemSales, Order, OrderItem, OrderStatus, StatusCount,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    orders: Vec<Order>,
    items: Vec<OrderItem>,
}

/// An `OrderStore` held entirely in memory.
///
/// Clones share the same tables. `set_unavailable(true)` makes every query fail
/// with `StorageUnavailable`, which lets callers exercise their error paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    tables: Arc<RwLock<Tables>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an order, replacing any existing order with the same id.
    pub async fn insert_order(&self, mut order: Order) {
        order.status = order.status.normalized();
        let mut tables = self.tables.write().await;
        tables.orders.retain(|o| o.id != order.id);
        tables.orders.push(order);
    }

    pub async fn insert_item(&self, item: OrderItem) {
        self.tables.write().await.items.push(item);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), AnalyticsError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AnalyticsError::StorageUnavailable(
                "in-memory store is switched off".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn sum_total_amount(&self, filter: &OrderFilter) -> Result<Decimal, AnalyticsError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .filter(|o| filter.matches(o))
            .map(|o| o.total_amount)
            .sum())
    }

    async fn count_orders(&self, filter: &OrderFilter) -> Result<u64, AnalyticsError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.orders.iter().filter(|o| filter.matches(o)).count() as u64)
    }

    async fn count_distinct_customers(
        &self,
        filter: &OrderFilter,
    ) -> Result<u64, AnalyticsError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let customers: HashSet<_> = tables
            .orders
            .iter()
            .filter(|o| filter.matches(o))
            .map(|o| o.customer_id)
            .collect();
        Ok(customers.len() as u64)
    }

    async fn count_by_status(&self) -> Result<Vec<StatusCount>, AnalyticsError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut counts: BTreeMap<OrderStatus, u64> = BTreeMap::new();
        for order in &tables.orders {
            *counts.entry(order.status.clone()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect())
    }

    async fn fetch_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, AnalyticsError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut orders: Vec<Order> = tables
            .orders
            .iter()
            .filter(|o| query.filter.matches(o))
            .cloned()
            .collect();
        orders.sort_by_key(|o| (o.order_date, o.id));
        if query.sort == OrderSort::NewestFirst {
            orders.reverse();
        }
        if let Some(limit) = query.limit {
            orders.truncate(limit);
        }
        Ok(orders)
    }

    async fn item_sales(&self) -> Result<Vec<ItemSales>, AnalyticsError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut grouped: BTreeMap<&str, (u64, Decimal)> = BTreeMap::new();
        for item in &tables.items {
            let entry = grouped.entry(item.item_name.as_str()).or_default();
            entry.0 += u64::from(item.quantity);
            entry.1 += item.line_total();
        }
        let mut sales: Vec<ItemSales> = grouped
            .into_iter()
            .map(|(name, (total_quantity, total_revenue))| ItemSales {
                item_name: name.to_string(),
                total_quantity,
                total_revenue,
            })
            .collect();
        // BTreeMap iteration is name-ascending and the sort is stable.
        sales.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));
        Ok(sales)
    }

    async fn dashboard_stats(&self, window: &DateWindow) -> Result<DashboardStats, AnalyticsError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut stats = DashboardStats::empty();
        let mut customers = HashSet::new();
        for order in &tables.orders {
            stats.total_orders += 1;
            customers.insert(order.customer_id);
            if order.status.is_revenue() && window.contains(order.order_date) {
                stats.today_revenue += order.total_amount;
            }
        }
        stats.total_customers = customers.len() as u64;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use core_types::{CustomerId, OrderId};
    use proptest::prelude::*;

    fn status_from(index: u8) -> OrderStatus {
        match index % 4 {
            0 => OrderStatus::Pending,
            1 => OrderStatus::Completed,
            2 => OrderStatus::Cancelled,
            _ => OrderStatus::Other("REFUNDED".to_string()),
        }
    }

    fn seeded(rows: &[(i64, u8, i64, u32)]) -> InMemoryOrderStore {
        let store = InMemoryOrderStore::new();
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        block_on(async {
            for (i, (customer, status, minutes, cents)) in rows.iter().enumerate() {
                store
                    .insert_order(Order {
                        id: OrderId(i as i64 + 1),
                        customer_id: CustomerId(*customer),
                        status: status_from(*status),
                        total_amount: Decimal::new(i64::from(*cents), 2),
                        order_date: base + Duration::minutes(*minutes),
                    })
                    .await;
            }
        });
        store
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
            .block_on(future)
    }

    proptest! {
        #[test]
        fn status_counts_are_positive_and_cover_every_order(
            rows in proptest::collection::vec((1i64..6, any::<u8>(), 0i64..10_000, 0u32..5_000), 0..40)
        ) {
            let store = seeded(&rows);
            let counts = block_on(store.count_by_status()).unwrap();
            prop_assert!(counts.iter().all(|c| c.count >= 1));
            let total: u64 = counts.iter().map(|c| c.count).sum();
            prop_assert_eq!(total, rows.len() as u64);
        }

        #[test]
        fn adjacent_windows_partition_revenue(
            rows in proptest::collection::vec((1i64..6, any::<u8>(), 0i64..10_000, 0u32..5_000), 0..40),
            split in 0i64..10_000,
        ) {
            let store = seeded(&rows);
            let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let mid = base + Duration::minutes(split);
            let end = base + Duration::minutes(10_000);
            let completed = OrderFilter::all().with_status(OrderStatus::Completed);

            let whole = block_on(store.sum_total_amount(&completed.clone().within(DateWindow::new(base, end)))).unwrap();
            let left = block_on(store.sum_total_amount(&completed.clone().within(DateWindow::new(base, mid)))).unwrap();
            let right = block_on(store.sum_total_amount(&completed.within(DateWindow::new(mid, end)))).unwrap();
            prop_assert_eq!(whole, left + right);
        }

        #[test]
        fn single_pass_dashboard_matches_composed_queries(
            rows in proptest::collection::vec((1i64..6, any::<u8>(), 0i64..10_000, 0u32..5_000), 0..40),
        ) {
            let store = seeded(&rows);
            let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let window = DateWindow::new(base + Duration::minutes(2_000), base + Duration::minutes(6_000));

            let single_pass = block_on(store.dashboard_stats(&window)).unwrap();
            let all = OrderFilter::all();
            let composed = DashboardStats {
                total_orders: block_on(store.count_orders(&all)).unwrap(),
                today_revenue: block_on(store.sum_total_amount(
                    &OrderFilter::all().with_status(OrderStatus::Completed).within(window),
                )).unwrap(),
                total_customers: block_on(store.count_distinct_customers(&all)).unwrap(),
            };
            prop_assert_eq!(single_pass, composed);
        }
    }

    #[tokio::test]
    async fn reinserting_an_order_replaces_it() {
        let store = InMemoryOrderStore::new();
        let mut order = Order {
            id: OrderId(1),
            customer_id: CustomerId(1),
            status: OrderStatus::Pending,
            total_amount: Decimal::ONE,
            order_date: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        };
        store.insert_order(order.clone()).await;
        order.status = OrderStatus::Completed;
        store.insert_order(order).await;

        assert_eq!(store.count_orders(&OrderFilter::all()).await.unwrap(), 1);
        let completed = OrderFilter::all().with_status(OrderStatus::Completed);
        assert_eq!(store.count_orders(&completed).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn switched_off_store_reports_unavailable() {
        let store = InMemoryOrderStore::new();
        store.set_unavailable(true);
        let err = store.item_sales().await.unwrap_err();
        assert!(matches!(err, AnalyticsError::StorageUnavailable(_)));

        store.set_unavailable(false);
        assert!(store.item_sales().await.unwrap().is_empty());
    }
}
