//! Live order book viewer
//!
//! Streams one venue/symbol through a session and redraws the throttled
//! top-of-book whenever a new view is published.
//!
//! Run: cargo run --bin book_viewer -- --venue okx --symbol BTC-USDT
//!      cargo run --bin book_viewer -- --venue deribit --symbol ETH-USD --buy 25

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use depth_book::{cumulative_depth, simulate, OrderSide, PublishedLevel, SimulatedOrder};
use depth_session::{BookView, SessionConfig, SessionHandle};
use depth_types::{Symbol, Venue};
use depth_ws::{BybitOptions, DeribitOptions, Endpoint, UpdateMode};
use rust_decimal::Decimal;
use std::future::pending;
use std::io::Write;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "book_viewer")]
#[command(about = "Stream a throttled order book from OKX, Bybit or Deribit")]
struct Args {
    /// Venue to connect to (okx, bybit, deribit)
    #[arg(short, long, default_value = "okx")]
    venue: Venue,

    /// Canonical symbol, BASE-QUOTE
    #[arg(short, long, default_value = "BTC-USDT")]
    symbol: Symbol,

    /// Minimum milliseconds between redraws
    #[arg(long, default_value_t = 100)]
    throttle_ms: u64,

    /// Levels shown per side
    #[arg(short, long, default_value_t = 15)]
    depth: usize,

    /// Bybit topic depth (1, 50, 200)
    #[arg(long, default_value_t = 50)]
    bybit_depth: u32,

    /// How Deribit notifications are applied (flagged, incremental, snapshot)
    #[arg(long, default_value = "flagged")]
    deribit_mode: UpdateMode,

    /// Use Deribit's grouped channel with this many levels
    #[arg(long)]
    deribit_grouped: Option<u32>,

    /// Connect Deribit to its testnet
    #[arg(long)]
    testnet: bool,

    /// Show the impact of a market buy of this size
    #[arg(long)]
    buy: Option<Decimal>,

    /// Show the impact of a market sell of this size
    #[arg(long)]
    sell: Option<Decimal>,

    /// Print each view as a JSON line instead of drawing it
    #[arg(long)]
    json: bool,

    /// Stop after this many seconds
    #[arg(long)]
    seconds: Option<u64>,
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        let mut deribit = DeribitOptions::default().with_update_mode(self.deribit_mode);
        if let Some(depth) = self.deribit_grouped {
            deribit = deribit.with_grouped_depth(depth);
        }

        let config = SessionConfig::new()
            .with_throttle_interval(Duration::from_millis(self.throttle_ms))
            .with_view_depth(self.depth)
            .with_bybit(BybitOptions {
                depth: self.bybit_depth,
            })
            .with_deribit(deribit);

        if self.testnet {
            config.with_endpoint(Venue::Deribit, Endpoint::DeribitTestnet)
        } else {
            config
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let (session, task) =
        SessionHandle::spawn(args.session_config()).context("invalid session configuration")?;

    info!(venue = %args.venue, symbol = %args.symbol, "Starting book viewer");
    session.select(args.venue, args.symbol.clone()).await?;

    let mut views = session.subscribe();
    let stop = stop_after(args.seconds);
    tokio::pin!(stop);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut redraws = 0u64;
    loop {
        tokio::select! {
            changed = views.changed() => {
                changed.context("session stopped unexpectedly")?;
                let view = views.borrow_and_update().clone();
                redraws += 1;
                if args.json {
                    println!("{}", serde_json::to_string(&view)?);
                } else {
                    draw(&view, &args)?;
                }
            }
            _ = &mut ctrl_c => break,
            _ = &mut stop => break,
        }
    }

    session.shutdown().await?;
    task.await?;

    if !args.json {
        println!("\n{} {} views received", "✓".green(), redraws);
    }
    Ok(())
}

async fn stop_after(seconds: Option<u64>) {
    match seconds {
        Some(seconds) => tokio::time::sleep(Duration::from_secs(seconds)).await,
        None => pending().await,
    }
}

fn draw(view: &BookView, args: &Args) -> Result<()> {
    let mut out = std::io::stdout().lock();
    write!(out, "\x1B[2J\x1B[H")?;

    let venue = view.venue.map(|v| v.as_str()).unwrap_or("-");
    let symbol = view.symbol.as_ref().map(|s| s.as_str()).unwrap_or("-");
    writeln!(out, "{}", "═".repeat(44).cyan())?;
    writeln!(out, "  {} {}", venue.cyan().bold(), symbol.bold())?;
    writeln!(out, "  {}", status_line(view))?;
    writeln!(out, "{}", "═".repeat(44).cyan())?;

    if let Some(error) = &view.error {
        writeln!(out, "  {} {}", "✗".red(), error.red())?;
    }

    writeln!(out, "  {:>16}  {:>12}  {:>10}", "PRICE".dimmed(), "SIZE".dimmed(), "TOTAL".dimmed())?;

    let asks = cumulative_depth(&view.asks);
    for (level, point) in view.asks.iter().zip(&asks).rev() {
        write_level(&mut out, level, point.cumulative, false)?;
    }

    let snapshot = view.snapshot();
    match (snapshot.spread(), snapshot.mid_price()) {
        (Some(spread), Some(mid)) => writeln!(
            out,
            "  {} {}  {} {}",
            "SPREAD".yellow(),
            spread,
            "MID".yellow(),
            mid.round_dp(8).normalize()
        )?,
        _ => writeln!(out, "  {}", "─".repeat(42).dimmed())?,
    }

    let bids = cumulative_depth(&view.bids);
    for (level, point) in view.bids.iter().zip(&bids) {
        write_level(&mut out, level, point.cumulative, true)?;
    }

    for (side, quantity) in [(OrderSide::Buy, args.buy), (OrderSide::Sell, args.sell)] {
        if let Some(quantity) = quantity {
            let label = format!("{side:?} {quantity}").to_uppercase();
            match simulate(&snapshot, &SimulatedOrder::market(side, quantity)) {
                Ok(report) => writeln!(
                    out,
                    "  {} filled {} ({}%) at {} impact {}% over {} levels, {}",
                    label.magenta(),
                    report.filled_quantity,
                    report.fill_percentage.round_dp(2),
                    report.impact_price,
                    report.market_impact_pct.round_dp(4),
                    report.levels_affected,
                    report.fill_estimate
                )?,
                Err(e) => writeln!(out, "  {} {}", label.magenta(), e.to_string().dimmed())?,
            }
        }
    }

    let stats = &view.stats;
    writeln!(
        out,
        "  {} snapshots {}  deltas {}  bid updates {}  ask updates {}",
        "STATS".dimmed(),
        stats.snapshots,
        stats.deltas,
        stats.bid_updates,
        stats.ask_updates
    )?;
    out.flush()?;
    Ok(())
}

fn status_line(view: &BookView) -> ColoredString {
    if view.connected {
        "● live".green()
    } else if view.loading {
        "○ connecting".yellow()
    } else if view.error.is_some() {
        "● error".red()
    } else {
        "○ idle".dimmed()
    }
}

fn write_level(out: &mut impl Write, level: &PublishedLevel, total: Decimal, bid: bool) -> Result<()> {
    let price = format!("{:>16}", level.price);
    let price = if bid { price.green() } else { price.red() };
    writeln!(out, "  {}  {:>12}  {:>10}", price, level.size, total)?;
    Ok(())
}
