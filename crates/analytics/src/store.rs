use crate::error::AnalyticsError;
use async_trait::async_trait;
use core_types::{
    CustomerId, DashboardStats, DateWindow, ItemSales, Order, OrderStatus, StatusCount,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Which orders a query applies to. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<CustomerId>,
    pub placed_within: Option<DateWindow>,
}

impl OrderFilter {
    /// A filter that matches every order.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn within(mut self, window: DateWindow) -> Self {
        self.placed_within = Some(window);
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        self
            .status
            .as_ref()
            .is_none_or(|s| s.clone().normalized() == order.status.clone().normalized())
            && self.customer_id.is_none_or(|c| c == order.customer_id)
            && self
                .placed_within
                .is_none_or(|w| w.contains(order.order_date))
    }
}

/// Ordering of fetched orders. Equal dates are broken by id in the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSort {
    NewestFirst,
    OldestFirst,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuery {
    pub filter: OrderFilter,
    pub sort: OrderSort,
    pub limit: Option<usize>,
}

impl OrderQuery {
    pub fn new(filter: OrderFilter, sort: OrderSort) -> Self {
        Self {
            filter,
            sort,
            limit: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// The capabilities the dashboard needs from an order store.
///
/// Implementations only read. Any failure to reach or query the backend is
/// reported as `AnalyticsError::StorageUnavailable`.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Sum of `total_amount` over matching orders, zero when nothing matches.
    async fn sum_total_amount(&self, filter: &OrderFilter) -> Result<Decimal, AnalyticsError>;

    async fn count_orders(&self, filter: &OrderFilter) -> Result<u64, AnalyticsError>;

    async fn count_distinct_customers(&self, filter: &OrderFilter)
    -> Result<u64, AnalyticsError>;

    /// One entry per status present in the store.
    async fn count_by_status(&self) -> Result<Vec<StatusCount>, AnalyticsError>;

    async fn fetch_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, AnalyticsError>;

    /// Items grouped by name over every recorded line item, highest quantity first.
    async fn item_sales(&self) -> Result<Vec<ItemSales>, AnalyticsError>;

    /// Order count, completed revenue inside `window`, and distinct customers.
    ///
    /// The default issues three separate queries. Backends that can compute all
    /// three in one scan should override it.
    async fn dashboard_stats(&self, window: &DateWindow) -> Result<DashboardStats, AnalyticsError> {
        let all = OrderFilter::all();
        let total_orders = self.count_orders(&all).await?;
        let revenue_filter = OrderFilter::all()
            .with_status(OrderStatus::Completed)
            .within(*window);
        let today_revenue = self.sum_total_amount(&revenue_filter).await?;
        let total_customers = self.count_distinct_customers(&all).await?;
        Ok(DashboardStats {
            total_orders,
            today_revenue,
            total_customers,
        })
    }
}

/// Folds rows that spell the same status differently into one row and drops
/// empty groups. The result is ordered by status text.
pub fn merge_status_counts(counts: Vec<StatusCount>) -> Vec<StatusCount> {
    let mut merged: BTreeMap<String, StatusCount> = BTreeMap::new();
    for row in counts {
        let status = row.status.normalized();
        merged
            .entry(status.as_str().to_string())
            .or_insert_with(|| StatusCount { status, count: 0 })
            .count += row.count;
    }
    merged.into_values().filter(|c| c.count > 0).collect()
}

#[async_trait]
impl<T: OrderStore + ?Sized> OrderStore for Arc<T> {
    async fn sum_total_amount(&self, filter: &OrderFilter) -> Result<Decimal, AnalyticsError> {
        (**self).sum_total_amount(filter).await
    }

    async fn count_orders(&self, filter: &OrderFilter) -> Result<u64, AnalyticsError> {
        (**self).count_orders(filter).await
    }

    async fn count_distinct_customers(
        &self,
        filter: &OrderFilter,
    ) -> Result<u64, AnalyticsError> {
        (**self).count_distinct_customers(filter).await
    }

    async fn count_by_status(&self) -> Result<Vec<StatusCount>, AnalyticsError> {
        (**self).count_by_status().await
    }

    async fn fetch_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, AnalyticsError> {
        (**self).fetch_orders(query).await
    }

    async fn item_sales(&self) -> Result<Vec<ItemSales>, AnalyticsError> {
        (**self).item_sales().await
    }

    async fn dashboard_stats(&self, window: &DateWindow) -> Result<DashboardStats, AnalyticsError> {
        (**self).dashboard_stats(window).await
    }
}
