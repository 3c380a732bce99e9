use crate::DbError;
use analytics::{
    AnalyticsError, OrderFilter, OrderQuery, OrderSort, OrderStore, merge_status_counts,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{
    CustomerId, DashboardStats, DateWindow, ItemSales, Order, OrderId, OrderStatus, StatusCount,
};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, Postgres};
use sqlx::{FromRow, QueryBuilder};

/// The `DbRepository` provides the order store on top of PostgreSQL.
/// It encapsulates all SQL queries and row mapping.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// A row of the `orders` table.
#[derive(Debug, Clone, FromRow)]
pub struct DbOrder {
    pub id: i64,
    pub customer_id: i64,
    pub status: String,
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
}

impl TryFrom<DbOrder> for Order {
    type Error = DbError;

    fn try_from(row: DbOrder) -> Result<Self, Self::Error> {
        Ok(Order {
            id: OrderId(row.id),
            customer_id: CustomerId(row.customer_id),
            status: row.status.parse()?,
            total_amount: row.total_amount,
            order_date: row.order_date,
        })
    }
}

/// One group of the item sales aggregate.
#[derive(Debug, Clone, FromRow)]
struct DbItemSales {
    item_name: String,
    total_quantity: i64,
    total_revenue: Decimal,
}

#[derive(Debug, Clone, FromRow)]
struct DbStatusCount {
    status: String,
    order_count: i64,
}

#[derive(Debug, Clone, FromRow)]
struct DbDashboardStats {
    total_orders: i64,
    today_revenue: Decimal,
    total_customers: i64,
}

/// `COUNT` and `SUM` come back as BIGINT; they are never negative.
fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Status text is compared trimmed and upper-cased, against every spelling
/// that parses to the wanted status.
const STATUS_COLUMN: &str = "UPPER(TRIM(status))";

/// Appends the `WHERE` clause for `filter`, binding every value.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &OrderFilter) {
    builder.push(" WHERE TRUE");
    if let Some(status) = &filter.status {
        builder
            .push(format!(" AND {STATUS_COLUMN} = ANY("))
            .push_bind(status.spellings())
            .push(")");
    }
    if let Some(customer_id) = filter.customer_id {
        builder.push(" AND customer_id = ").push_bind(customer_id.0);
    }
    if let Some(window) = filter.placed_within {
        builder
            .push(" AND order_date >= ")
            .push_bind(window.start)
            .push(" AND order_date < ")
            .push_bind(window.end);
    }
}

fn orders_query(query: &OrderQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        "SELECT id, customer_id, status, total_amount, order_date FROM orders",
    );
    push_filter(&mut builder, &query.filter);
    builder.push(match query.sort {
        OrderSort::NewestFirst => " ORDER BY order_date DESC, id DESC",
        OrderSort::OldestFirst => " ORDER BY order_date ASC, id ASC",
    });
    if let Some(limit) = query.limit {
        builder
            .push(" LIMIT ")
            .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
    builder
}

fn aggregate_query(select: &str, filter: &OrderFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(select);
    push_filter(&mut builder, filter);
    builder
}

fn dashboard_sql() -> String {
    format!(
        r#"
        SELECT
            COUNT(*) AS total_orders,
            COALESCE(SUM(CASE
                WHEN order_date >= $1 AND order_date < $2 AND {STATUS_COLUMN} = ANY($3)
                THEN total_amount ELSE 0 END), 0) AS today_revenue,
            COUNT(DISTINCT customer_id) AS total_customers
        FROM orders
        "#
    )
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Sums `total_amount` over matching orders; `COALESCE` turns no rows into zero.
    pub async fn get_total_amount(&self, filter: &OrderFilter) -> Result<Decimal, DbError> {
        let total = aggregate_query(
            "SELECT COALESCE(SUM(total_amount), 0) FROM orders",
            filter,
        )
        .build_query_scalar::<Decimal>()
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    pub async fn get_order_count(&self, filter: &OrderFilter) -> Result<u64, DbError> {
        let count = aggregate_query("SELECT COUNT(*) FROM orders", filter)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(to_count(count))
    }

    pub async fn get_distinct_customer_count(&self, filter: &OrderFilter) -> Result<u64, DbError> {
        let count = aggregate_query("SELECT COUNT(DISTINCT customer_id) FROM orders", filter)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(to_count(count))
    }

    pub async fn get_status_counts(&self) -> Result<Vec<StatusCount>, DbError> {
        let rows = sqlx::query_as::<_, DbStatusCount>(&format!(
            "SELECT {STATUS_COLUMN} AS status, COUNT(*) AS order_count FROM orders GROUP BY 1"
        ))
        .fetch_all(&self.pool)
        .await?;

        // CANCELLED and CANCELED still arrive as separate groups.
        let counts = rows
            .into_iter()
            .map(|row| {
                Ok::<_, DbError>(StatusCount {
                    status: row.status.parse::<OrderStatus>()?,
                    count: to_count(row.order_count),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(merge_status_counts(counts))
    }

    pub async fn get_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, DbError> {
        let rows = orders_query(query)
            .build_query_as::<DbOrder>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    /// Groups every line item by name, best sellers first.
    pub async fn get_item_sales(&self) -> Result<Vec<ItemSales>, DbError> {
        let rows = sqlx::query_as::<_, DbItemSales>(
            r#"
            SELECT
                item_name,
                SUM(quantity)::BIGINT AS total_quantity,
                COALESCE(SUM(price_at_order * quantity), 0) AS total_revenue
            FROM order_items
            GROUP BY item_name
            ORDER BY SUM(quantity) DESC, item_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ItemSales {
                item_name: row.item_name,
                total_quantity: to_count(row.total_quantity),
                total_revenue: row.total_revenue,
            })
            .collect())
    }

    /// Computes all dashboard figures in a single scan of `orders`.
    pub async fn get_dashboard_stats(&self, window: &DateWindow) -> Result<DashboardStats, DbError> {
        let sql = dashboard_sql();
        let row = sqlx::query_as::<_, DbDashboardStats>(&sql)
            .bind(window.start)
            .bind(window.end)
            .bind(OrderStatus::Completed.spellings())
            .fetch_one(&self.pool)
            .await?;

        Ok(DashboardStats {
            total_orders: to_count(row.total_orders),
            today_revenue: row.today_revenue,
            total_customers: to_count(row.total_customers),
        })
    }
}

#[async_trait]
impl OrderStore for DbRepository {
    async fn sum_total_amount(&self, filter: &OrderFilter) -> Result<Decimal, AnalyticsError> {
        Ok(self.get_total_amount(filter).await?)
    }

    async fn count_orders(&self, filter: &OrderFilter) -> Result<u64, AnalyticsError> {
        Ok(self.get_order_count(filter).await?)
    }

    async fn count_distinct_customers(
        &self,
        filter: &OrderFilter,
    ) -> Result<u64, AnalyticsError> {
        Ok(self.get_distinct_customer_count(filter).await?)
    }

    async fn count_by_status(&self) -> Result<Vec<StatusCount>, AnalyticsError> {
        Ok(self.get_status_counts().await?)
    }

    async fn fetch_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, AnalyticsError> {
        Ok(self.get_orders(query).await?)
    }

    async fn item_sales(&self) -> Result<Vec<ItemSales>, AnalyticsError> {
        Ok(self.get_item_sales().await?)
    }

    async fn dashboard_stats(&self, window: &DateWindow) -> Result<DashboardStats, AnalyticsError> {
        Ok(self.get_dashboard_stats(window).await?)
    }
}
