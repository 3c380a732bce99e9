use analytics::{OrderAnalyticsReader, OrderStore, ReaderSettings};
use anyhow::Context;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use configuration::{Config, LoggingSettings, load_config};
use core_types::{CustomerId, DateWindow, OrderStatus};
use database::{ConnectionSettings, DbRepository, connect};
use render::{Amount, OutputFormat, Overview, render};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, FmtSubscriber, fmt::writer::MakeWriterExt};

mod demo;
mod render;

type Reader = OrderAnalyticsReader<Arc<dyn OrderStore>>;

/// The main entry point for the café dashboard.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the settings may come from the environment or config.toml.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    let _log_guard = init_tracing(&config.logging)?;

    let offset = config.dashboard.utc_offset()?;
    let reader = build_reader(&config, cli.demo).await?;

    let output = run_command(&reader, cli.command, cli.format, offset).await?;
    println!("{output}");
    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Revenue, order and best-seller reports for the café dashboard.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Output format for reports.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Run against a seeded in-memory store instead of the database.
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every dashboard panel at once.
    Overview(DayArgs),
    /// Total orders, revenue for the day, and distinct customers.
    Stats(DayArgs),
    /// Completed revenue for a day or an explicit [from, to) window.
    Revenue(RevenueArgs),
    /// Completed revenue over all time.
    TotalRevenue,
    /// Number of orders in each status.
    StatusCounts,
    /// Items ranked by quantity sold.
    TopItems {
        /// Show at most this many items.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// The most recently placed orders.
    Recent {
        /// Number of orders to show (defaults to dashboard.recent_orders_limit).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Orders of a single customer.
    Customer {
        #[arg(long)]
        id: i64,
        /// Only show the customer's latest order in this status.
        #[arg(long)]
        status: Option<OrderStatus>,
    },
}

#[derive(Parser)]
struct DayArgs {
    /// The calendar day in the café's time zone (format: YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(Parser)]
struct RevenueArgs {
    /// The calendar day in the café's time zone (format: YYYY-MM-DD).
    #[arg(long, conflicts_with_all = ["from", "to"])]
    date: Option<NaiveDate>,

    /// Window start, inclusive (RFC 3339, e.g. 2024-06-01T00:00:00Z).
    #[arg(long, requires = "to")]
    from: Option<DateTime<Utc>>,

    /// Window end, exclusive (RFC 3339).
    #[arg(long, requires = "from")]
    to: Option<DateTime<Utc>>,
}

// ==============================================================================
// Wiring
// ==============================================================================

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
///
/// When a log directory is configured, output is duplicated into a daily
/// rolling file; the returned guard must live until the program exits.
fn init_tracing(settings: &LoggingSettings) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .context("invalid logging.level filter")?;

    match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "cafe-dashboard.log");
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr.and(file_writer))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(Some(guard))
        }
        None => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(None)
        }
    }
}

fn reader_settings(config: &Config) -> ReaderSettings {
    ReaderSettings {
        query_timeout: config.dashboard.query_timeout(),
        recent_orders_limit: config.dashboard.recent_orders_limit,
        max_limit: config.dashboard.max_limit,
    }
}

async fn build_reader(config: &Config, demo: bool) -> anyhow::Result<Reader> {
    let store: Arc<dyn OrderStore> = if demo {
        Arc::new(demo::seeded_store(Utc::now()).await)
    } else {
        let settings = ConnectionSettings {
            url: config.database.url.clone(),
            max_connections: config.database.max_connections,
            acquire_timeout: config.database.acquire_timeout(),
        };
        let pool = connect(&settings)
            .await
            .context("failed to connect to the order database")?;
        Arc::new(DbRepository::new(pool))
    };
    Ok(OrderAnalyticsReader::with_settings(store, reader_settings(config)))
}

/// The day window for `date`, or for today in the café's time zone.
fn day_window(date: Option<NaiveDate>, offset: FixedOffset) -> anyhow::Result<DateWindow> {
    let date = date.unwrap_or_else(|| Utc::now().with_timezone(&offset).date_naive());
    Ok(DateWindow::for_day(date, offset)?)
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn run_command(
    reader: &Reader,
    command: Commands,
    format: OutputFormat,
    offset: FixedOffset,
) -> anyhow::Result<String> {
    match command {
        Commands::Overview(args) => {
            let window = day_window(args.date, offset)?;
            let (stats, total_completed_revenue, status_counts, top_items, recent_orders) = tokio::try_join!(
                reader.dashboard_stats(window.start, window.end),
                reader.total_completed_revenue(),
                reader.count_orders_by_status(),
                reader.top_selling_items_by_quantity(),
                reader.recent_orders_default(),
            )?;
            let overview = Overview {
                stats,
                total_completed_revenue,
                status_counts,
                top_items,
                recent_orders,
            };
            match format {
                OutputFormat::Table => Ok(overview.to_text()),
                OutputFormat::Json => Ok(serde_json::to_string_pretty(&overview)?),
            }
        }
        Commands::Stats(args) => {
            let window = day_window(args.date, offset)?;
            let stats = reader.dashboard_stats(window.start, window.end).await?;
            render(&stats, format)
        }
        Commands::Revenue(args) => {
            let window = match (args.from, args.to) {
                (Some(from), Some(to)) => DateWindow::new(from, to),
                _ => day_window(args.date, offset)?,
            };
            tracing::info!(start = %window.start, end = %window.end, "Computing revenue.");
            let amount = reader.daily_revenue(window.start, window.end).await?;
            render(&Amount { label: "Completed revenue", amount }, format)
        }
        Commands::TotalRevenue => {
            let amount = reader.total_completed_revenue().await?;
            render(&Amount { label: "Completed revenue (all time)", amount }, format)
        }
        Commands::StatusCounts => render(&reader.count_orders_by_status().await?, format),
        Commands::TopItems { limit } => {
            let mut items = reader.top_selling_items_by_quantity().await?;
            if let Some(limit) = limit {
                items.truncate(limit);
            }
            render(&items, format)
        }
        Commands::Recent { limit } => {
            let orders = match limit {
                Some(limit) => reader.recent_orders(limit).await?,
                None => reader.recent_orders_default().await?,
            };
            render(&orders, format)
        }
        Commands::Customer { id, status } => {
            let customer = CustomerId(id);
            match status {
                Some(status) => render(&reader.find_order(customer, status).await?, format),
                None => render(&reader.orders_for_customer(customer).await?, format),
            }
        }
    }
}
