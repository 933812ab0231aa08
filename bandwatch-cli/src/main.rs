//! Bandwatch CLI: render, refresh, and serve the RSI/Bollinger dashboard.
//!
//! Commands:
//! - `report`: run the pipeline once and print or save the HTML (or JSON)
//! - `watch`: refresh a static HTML snapshot on a fixed cadence
//! - `serve`: run the HTTP dashboard with a background snapshot refresh

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bandwatch_core::data::{CircuitBreaker, CsvProvider, DataProvider, YahooProvider};
use bandwatch_core::signals::Variant;
use bandwatch_runner::{
    render_html, render_json, run_periodic, run_pipeline, write_snapshot, DashboardConfig,
    PipelineState, RenderOptions, ScheduleConfig,
};
use bandwatch_web::{serve, spawn_refresh_task, AppState};

#[derive(Parser)]
#[command(
    name = "bandwatch",
    about = "Bandwatch: intraday RSI and Bollinger band entry dashboard"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    BuySide,
    SellSide,
}

impl From<VariantArg> for Variant {
    fn from(v: VariantArg) -> Self {
        match v {
            VariantArg::BuySide => Variant::BuySide,
            VariantArg::SellSide => Variant::SellSide,
        }
    }
}

/// Options shared by every command.
#[derive(Args)]
struct DashboardArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dashboard variant (overrides the config file).
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// Comma-separated symbols, at most three (e.g., TCS.NS,INFY.NS).
    #[arg(long, value_delimiter = ',')]
    symbols: Vec<String>,

    /// Trading capital.
    #[arg(long)]
    capital: Option<f64>,

    /// Maximum loss per trade.
    #[arg(long)]
    risk: Option<f64>,

    /// Read bars from `<dir>/<SYMBOL>_<interval>.csv` instead of Yahoo Finance.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once and print the dashboard.
    Report {
        #[command(flatten)]
        dashboard: DashboardArgs,

        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Emit JSON instead of HTML.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Refresh a static HTML snapshot on a fixed cadence.
    Watch {
        #[command(flatten)]
        dashboard: DashboardArgs,

        /// Seconds between refreshes. Defaults to the config's refresh_secs.
        #[arg(long)]
        interval_secs: Option<u64>,

        /// Stop after this many refreshes.
        #[arg(long)]
        iterations: Option<usize>,

        /// Snapshot path. Defaults to the config's snapshot_path.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Serve the dashboard over HTTP.
    Serve {
        #[command(flatten)]
        dashboard: DashboardArgs,

        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        #[arg(long, default_value_t = 5009)]
        port: u16,

        /// Seconds between snapshot refreshes. Defaults to the config's refresh_secs.
        #[arg(long)]
        refresh_secs: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            dashboard,
            out,
            json,
        } => run_report(&dashboard, out, json),
        Commands::Watch {
            dashboard,
            interval_secs,
            iterations,
            out,
        } => run_watch(&dashboard, interval_secs, iterations, out),
        Commands::Serve {
            dashboard,
            host,
            port,
            refresh_secs,
        } => run_serve(&dashboard, SocketAddr::new(host, port), refresh_secs),
    }
}

fn load_config(args: &DashboardArgs) -> Result<DashboardConfig> {
    let mut config = match &args.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };

    if let Some(variant) = args.variant {
        config.variant = variant.into();
    }
    if !args.symbols.is_empty() {
        config.symbols = args
            .symbols
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Some(capital) = args.capital {
        config.risk.capital = capital;
    }
    if let Some(risk) = args.risk {
        config.risk.risk_per_trade = risk;
    }

    config.validate()?;
    Ok(config)
}

fn build_provider(args: &DashboardArgs) -> Result<Arc<dyn DataProvider>> {
    match &args.data_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "reading bars from CSV");
            Ok(Arc::new(CsvProvider::new(dir)))
        }
        None => {
            let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
            Ok(Arc::new(YahooProvider::new(circuit_breaker)?))
        }
    }
}

fn run_report(args: &DashboardArgs, out: Option<PathBuf>, json: bool) -> Result<()> {
    let config = load_config(args)?;
    let provider = build_provider(args)?;
    let state = PipelineState::from_config(&config);

    let report = run_pipeline(&state, provider.as_ref());
    for (symbol, error) in report.failures() {
        eprintln!("Error for {symbol}: {error}");
    }

    let rendered = if json {
        render_json(&report).context("Failed to serialize report")?
    } else {
        render_html(&report, &RenderOptions::default())
    };

    match out {
        Some(path) => {
            write_snapshot(&path, &rendered)?;
            println!("Report saved to: {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn run_watch(
    args: &DashboardArgs,
    interval_secs: Option<u64>,
    iterations: Option<usize>,
    out: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(args)?;
    let provider = build_provider(args)?;
    let state = PipelineState::from_config(&config);

    let schedule = ScheduleConfig {
        interval: Duration::from_secs(interval_secs.unwrap_or(config.refresh_secs).max(1)),
        max_iterations: iterations,
        snapshot_path: out.unwrap_or(config.snapshot_path),
    };
    tracing::info!(
        interval_secs = schedule.interval.as_secs(),
        path = %schedule.snapshot_path.display(),
        "starting snapshot refresh"
    );

    let on_tick: &dyn Fn(&bandwatch_runner::TickSummary) = &|tick| {
        println!(
            "[{}] {} symbol(s), {} failed, {} signal(s)",
            tick.iteration + 1,
            tick.symbols,
            tick.failed,
            tick.triggered
        );
    };
    let done = run_periodic(&state, provider.as_ref(), &schedule, Some(on_tick), None);
    println!("Done. {done} refresh(es).");
    Ok(())
}

fn run_serve(args: &DashboardArgs, addr: SocketAddr, refresh_secs: Option<u64>) -> Result<()> {
    let config = load_config(args)?;
    // The blocking HTTP client must be created, and finally dropped, outside
    // the async runtime; `provider` outlives `runtime` below.
    let provider = build_provider(args)?;
    let app = AppState::new(
        provider.clone(),
        PipelineState::from_config(&config),
        config.snapshot_path.clone(),
    );
    let period = Duration::from_secs(refresh_secs.unwrap_or(config.refresh_secs).max(1));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let result = runtime.block_on(async move {
        tracing::info!(%addr, refresh_secs = period.as_secs(), "starting bandwatch server");
        let refresh = spawn_refresh_task(app.clone(), period);
        let served = serve(app, addr).await;
        refresh.abort();
        served
    });

    drop(runtime);
    drop(provider);
    result
}
