use crate::error::AnalyticsError;
use crate::store::{OrderFilter, OrderQuery, OrderSort, OrderStore, merge_status_counts};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use core_types::{
    CustomerId, DashboardStats, DateWindow, ItemSales, Order, OrderStatus, StatusCount,
};
use rust_decimal::Decimal;
use std::future::Future;
use std::time::Duration;

/// Tunables for `OrderAnalyticsReader`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderSettings {
    /// Upper bound on a single store call. `None` leaves timing to the store.
    pub query_timeout: Option<Duration>,
    /// Limit used by `recent_orders_default`.
    pub recent_orders_limit: usize,
    /// Largest limit a caller may request from `recent_orders`.
    pub max_limit: usize,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            query_timeout: None,
            recent_orders_limit: 5,
            max_limit: 100,
        }
    }
}

/// Read-only dashboard queries over an `OrderStore`.
///
/// The reader holds no state besides the store handle and its settings, so it
/// can be cloned freely and shared between tasks. Storage failures are passed
/// through unchanged as `AnalyticsError::StorageUnavailable`.
#[derive(Debug, Clone)]
pub struct OrderAnalyticsReader<S> {
    store: S,
    settings: ReaderSettings,
}

impl<S: OrderStore> OrderAnalyticsReader<S> {
    pub fn new(store: S) -> Self {
        Self::with_settings(store, ReaderSettings::default())
    }

    pub fn with_settings(store: S, settings: ReaderSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    /// Revenue from every completed order. Zero when there are none.
    pub async fn total_completed_revenue(&self) -> Result<Decimal, AnalyticsError> {
        let filter = OrderFilter::all().with_status(OrderStatus::Completed);
        self.guarded("total_completed_revenue", self.store.sum_total_amount(&filter))
            .await
    }

    /// How many orders are in each status. Statuses with no orders are omitted,
    /// and rows a backend reports under several spellings are merged.
    pub async fn count_orders_by_status(&self) -> Result<Vec<StatusCount>, AnalyticsError> {
        let counts = self
            .guarded("count_orders_by_status", self.store.count_by_status())
            .await?;
        Ok(merge_status_counts(counts))
    }

    /// The customer's order in `status`. When several match, the most recent
    /// one wins, then the highest id.
    pub async fn find_order(
        &self,
        customer_id: CustomerId,
        status: OrderStatus,
    ) -> Result<Option<Order>, AnalyticsError> {
        validate_customer(customer_id)?;
        let filter = OrderFilter::all()
            .with_customer(customer_id)
            .with_status(status);
        let query = OrderQuery::new(filter, OrderSort::NewestFirst).limit(1);
        let orders = self
            .guarded("find_order", self.store.fetch_orders(&query))
            .await?;
        Ok(orders.into_iter().next())
    }

    /// Every item name with its summed quantity and revenue, across orders of
    /// any status. Highest quantity first, ties by name ascending.
    pub async fn top_selling_items_by_quantity(&self) -> Result<Vec<ItemSales>, AnalyticsError> {
        let mut sales = self
            .guarded("top_selling_items_by_quantity", self.store.item_sales())
            .await?;
        sales.sort_by(|a, b| {
            b.total_quantity
                .cmp(&a.total_quantity)
                .then_with(|| a.item_name.cmp(&b.item_name))
        });
        Ok(sales)
    }

    /// Completed revenue for orders placed in `[start, end)`.
    ///
    /// Always a number: an empty or inverted window yields zero.
    pub async fn daily_revenue(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Decimal, AnalyticsError> {
        let window = DateWindow::new(start, end);
        if window.is_empty() {
            tracing::debug!(%start, %end, "Empty revenue window, skipping the store.");
            return Ok(Decimal::ZERO);
        }
        let filter = OrderFilter::all()
            .with_status(OrderStatus::Completed)
            .within(window);
        self.guarded("daily_revenue", self.store.sum_total_amount(&filter))
            .await
    }

    /// Completed revenue for one calendar day in the given UTC offset.
    pub async fn revenue_for_day(
        &self,
        date: NaiveDate,
        offset: FixedOffset,
    ) -> Result<Decimal, AnalyticsError> {
        let window = DateWindow::for_day(date, offset)?;
        self.daily_revenue(window.start, window.end).await
    }

    /// Up to `limit` orders, newest first (equal dates: highest id first).
    pub async fn recent_orders(&self, limit: usize) -> Result<Vec<Order>, AnalyticsError> {
        if limit > self.settings.max_limit {
            return Err(AnalyticsError::InvalidArgument(format!(
                "limit {limit} exceeds the maximum of {}",
                self.settings.max_limit
            )));
        }
        if limit == 0 {
            return Ok(Vec::new());
        }
        let query = OrderQuery::new(OrderFilter::all(), OrderSort::NewestFirst).limit(limit);
        self.guarded("recent_orders", self.store.fetch_orders(&query))
            .await
    }

    /// `recent_orders` with the configured default limit (5 unless overridden).
    pub async fn recent_orders_default(&self) -> Result<Vec<Order>, AnalyticsError> {
        self.recent_orders(self.settings.recent_orders_limit).await
    }

    /// All of a customer's orders, oldest first (equal dates: lowest id first).
    pub async fn orders_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, AnalyticsError> {
        validate_customer(customer_id)?;
        let query = OrderQuery::new(
            OrderFilter::all().with_customer(customer_id),
            OrderSort::OldestFirst,
        );
        self.guarded("orders_for_customer", self.store.fetch_orders(&query))
            .await
    }

    /// Total orders, completed revenue in `[start, end)`, and distinct customers,
    /// computed by the store in as few passes as it supports.
    pub async fn dashboard_stats(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<DashboardStats, AnalyticsError> {
        let window = DateWindow::new(start, end);
        self.guarded("dashboard_stats", self.store.dashboard_stats(&window))
            .await
    }

    /// Runs one store call under the configured timeout and logs failures.
    async fn guarded<T, F>(&self, operation: &'static str, call: F) -> Result<T, AnalyticsError>
    where
        F: Future<Output = Result<T, AnalyticsError>>,
    {
        tracing::debug!(operation, "Querying order store.");
        let result = match self.settings.query_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(AnalyticsError::StorageUnavailable(format!(
                    "{operation} timed out after {limit:?}"
                ))),
            },
            None => call.await,
        };
        if let Err(err) = &result {
            tracing::warn!(operation, error = %err, "Order store query failed.");
        }
        result
    }
}

fn validate_customer(customer_id: CustomerId) -> Result<(), AnalyticsError> {
    if customer_id.0 <= 0 {
        return Err(AnalyticsError::InvalidArgument(format!(
            "customer id must be positive, got {customer_id}"
        )));
    }
    Ok(())
}
