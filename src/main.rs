use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use perishable_planner::io::demand::{generate_seasonal_sales, DemandProfile};
use perishable_planner::io::reporting;
use perishable_planner::{
    CsvSources, DemandForecast, ForecastConfig, InMemorySources, InventoryPlanner,
    InventoryRecord, InventorySource, PlannerConfig, SalesSource, SimulationResult,
    DEFAULT_HORIZON_DAYS, DEFAULT_STOCK_MULTIPLIER,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "perishable-planner")]
#[command(about = "Demand forecast and markdown simulation for perishable stock")]
struct Cli {
    /// Inventory snapshot CSV
    #[arg(long, default_value = "current_inventory.csv")]
    inventory: PathBuf,

    /// Daily sales history CSV
    #[arg(long, default_value = "daily_sales.csv")]
    sales: PathBuf,

    /// Seed for the forecast uncertainty band
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List product names and their SKUs
    List,

    /// Forecast demand for one SKU
    Forecast {
        #[arg(long)]
        sku: String,

        /// Days to project past the last observation
        #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS)]
        horizon: usize,

        /// Write every forecast point to this CSV
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Forecast one SKU, then compare no discount against a discount
    Simulate {
        #[arg(long)]
        sku: String,

        /// Fraction off list price, e.g. 0.15
        #[arg(long)]
        discount: f64,

        #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS)]
        horizon: usize,

        /// Scale stock on hand, e.g. 1.5 for an overstock scenario
        #[arg(long, default_value_t = DEFAULT_STOCK_MULTIPLIER)]
        stock_multiplier: f64,

        /// Write the simulation result to this CSV
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run the full flow on synthetic in-memory data
    Demo {
        #[arg(long, default_value_t = 0.15)]
        discount: f64,
    },
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "perishable_planner=debug"
    } else {
        "perishable_planner=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = PlannerConfig {
        forecast: ForecastConfig {
            seed: cli.seed,
            ..ForecastConfig::default()
        },
    };

    match cli.command {
        Commands::List => {
            let planner = InventoryPlanner::with_config(
                CsvSources::new(&cli.inventory, &cli.sales),
                config,
            )?;
            let catalog = planner.list_products()?;
            for (name, sku) in catalog.iter() {
                println!("{sku}\t{name}");
            }
        }
        Commands::Forecast { sku, horizon, out } => {
            let planner = InventoryPlanner::with_config(
                CsvSources::new(&cli.inventory, &cli.sales),
                config,
            )?;
            let forecast = planner.forecast(&sku, horizon)?;
            print_forecast(&forecast);
            if let Some(path) = out {
                reporting::write_forecast_log(&path, &forecast)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
        }
        Commands::Simulate {
            sku,
            discount,
            horizon,
            stock_multiplier,
            out,
        } => {
            let planner = InventoryPlanner::with_config(
                CsvSources::new(&cli.inventory, &cli.sales),
                config,
            )?;
            let forecast = planner.forecast(&sku, horizon)?;
            print_forecast(&forecast);
            let result =
                planner.simulate(&sku, forecast.total_over_horizon, discount, stock_multiplier)?;
            print_simulation(discount, &result);
            if let Some(path) = out {
                reporting::write_simulation_summary(&path, &sku, discount, &result)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
        }
        Commands::Demo { discount } => run_demo(config, discount)?,
    }

    Ok(())
}

/// Drives the same flow a dashboard would: pick a product, forecast, simulate.
fn run_demo(config: PlannerConfig, discount: f64) -> Result<()> {
    println!("=== Perishable Markdown Planner (synthetic data) ===");

    // 1. SYNTHETIC SNAPSHOT
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).context("invalid demo start date")?;
    let products = [
        ("VEG0001", "Tomato", "101", 100.0, 3, 20_000.0, 18.0),
        ("VEG0002", "Lettuce", "102", 35.0, 2, 15_000.0, 6.0),
        ("FRU0001", "Banana", "201", 240.0, 5, 25_000.0, 30.0),
    ];
    let mut inventory = Vec::new();
    let mut sales = Vec::new();
    for (i, (sku, name, product_id, stock, shelf_life, price, base_kg)) in
        products.into_iter().enumerate()
    {
        inventory.push(InventoryRecord {
            sku: sku.to_string(),
            product_name: name.to_string(),
            product_id: product_id.to_string(),
            stock_on_hand_kg: stock,
            shelf_life_days: shelf_life,
            cost_price: price * 0.6,
            list_price: price,
        });
        let profile = DemandProfile {
            base_kg,
            noise_sd: base_kg * 0.1,
            ..DemandProfile::default()
        };
        sales.extend(generate_seasonal_sales(product_id, start, 364, &profile, i as u64));
    }
    let sources = InMemorySources::new(inventory, sales);
    println!(
        "{} products, {} sales rows",
        sources.load_inventory()?.len(),
        sources.load_sales()?.len()
    );

    // 2. RUN EVERY PRODUCT
    let planner = InventoryPlanner::with_config(sources, config)?;
    for (name, sku) in planner.list_products()?.iter() {
        println!("\n--- {name} ({sku}) ---");
        let forecast = planner.forecast(sku, DEFAULT_HORIZON_DAYS)?;
        print_forecast(&forecast);
        let result = planner.simulate(
            sku,
            forecast.total_over_horizon,
            discount,
            DEFAULT_STOCK_MULTIPLIER,
        )?;
        print_simulation(discount, &result);
    }

    println!("\nDemo Complete.");
    Ok(())
}

fn print_forecast(forecast: &DemandForecast) {
    println!(
        "{}-day demand forecast for {}: {:.2} kg",
        forecast.horizon_days, forecast.sku, forecast.total_over_horizon
    );
    for point in forecast.future() {
        println!(
            "  {}  {:>8.2} kg  [{:.2}, {:.2}]",
            point.date, point.yhat, point.yhat_lower, point.yhat_upper
        );
    }
}

fn print_simulation(discount: f64, result: &SimulationResult) {
    println!(
        "Stock on hand: {:.2} kg, expires in {} days",
        result.current_stock, result.days_to_expire
    );
    println!(
        "Waste:   no discount {:.2} kg | {:.0}% off {:.2} kg ({:+.2} kg)",
        result.base_waste_kg,
        discount * 100.0,
        result.promo_waste_kg,
        result.waste_delta_kg()
    );
    println!(
        "Revenue: no discount {:.0} | {:.0}% off {:.0} ({:+.0})",
        result.base_revenue,
        discount * 100.0,
        result.promo_revenue,
        result.revenue_delta()
    );
}
