//! Run command: quote against the paper venue.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use quoter_broker::PaperVenue;
use quoter_config::{AppConfig, ConfigError};
use quoter_core::types::{decimal_from_f64, Bar, TopOfBook};
use quoter_data::{load_csv, BarCallback, CandleBuffer, CsvReplayFeed};
use quoter_engine::{Collaborators, OrderLifecycleManager, QuotingLoop};
use quoter_indicators::IndicatorEngine;
use quoter_monitor::LogNotifier;
use quoter_strategy::QuoteGenerator;

use crate::cli::RunArgs;

pub async fn run(
    args: RunArgs,
    config_path: &Path,
    loaded: Result<AppConfig, ConfigError>,
) -> Result<()> {
    let config = loaded.with_context(|| format!("Failed to load {}", config_path.display()))?;
    config.validate().context("Invalid configuration")?;

    let pair = config.market.trading_pair.clone();
    let symbol = pair.to_string();

    let candles_path = args
        .candles
        .or_else(|| config.paper.candles_file.as_ref().map(PathBuf::from))
        .context("No candle file: pass --candles or set paper.candles_file")?;
    let bars = load_csv(&candles_path)
        .with_context(|| format!("Failed to load candles from {}", candles_path.display()))?;
    info!(path = %candles_path.display(), bars = bars.len(), "Candles loaded");

    let interval = config.market.candle_interval;
    if let [first, second, ..] = bars.as_slice() {
        let spacing = second.timestamp - first.timestamp;
        if spacing != interval.as_millis() {
            warn!(
                expected = %interval,
                spacing_ms = spacing,
                "Candle spacing does not match market.candle_interval"
            );
        }
    }

    let venue = Arc::new(
        PaperVenue::new()
            .with_fee(config.paper.fee_pct)
            .with_balance(pair.base(), config.paper.base_balance)
            .with_balance(pair.quote(), config.paper.quote_balance)
            .with_rules(symbol.clone(), config.paper.trading_rules()),
    );
    let fills = venue.subscribe_fills();

    let feed = Arc::new(
        CsvReplayFeed::new(
            format!("csv-replay-{}", interval),
            bars,
            CandleBuffer::new(symbol.clone(), config.market.max_records),
            config.paper.replay_interval(),
        )
        .with_warmup(config.paper.warmup_bars)
        .with_callback(book_from_closes(
            venue.clone(),
            symbol.clone(),
            config.paper.book_half_spread_pct,
        )),
    );

    let notifier = Arc::new(LogNotifier::new());
    let manager = OrderLifecycleManager::new(
        config.lifecycle_config(),
        IndicatorEngine::new(config.indicator_config())?,
        QuoteGenerator::new(config.quote_config()),
        config.budget_config(),
        Collaborators {
            feed: feed.clone(),
            venue: venue.clone(),
            prices: venue.clone(),
            budget: venue.clone(),
            notifier: notifier.clone(),
        },
    );
    let quoting = QuotingLoop::new(manager, config.tick_period());

    info!(
        pair = %symbol,
        exchange = %config.market.exchange,
        order_amount = %config.quoting.order_amount,
        refresh_secs = config.quoting.refresh_interval_secs,
        "Starting quoter"
    );
    let summary = quoting.run(fills, shutdown_signal(args.duration)).await?;

    println!("Quoting cycles: {}", summary.cycles);
    println!("Orders submitted: {}", summary.orders_submitted);
    println!("Fills: {}", summary.fills);
    println!(
        "Balances: {} {}, {} {}",
        venue.total_balance(pair.base()),
        pair.base(),
        venue.total_balance(pair.quote()),
        pair.quote()
    );

    Ok(())
}

/// Publish each replayed close to the paper venue as a synthetic top of book.
fn book_from_closes(
    venue: Arc<PaperVenue>,
    symbol: String,
    half_spread_pct: Decimal,
) -> BarCallback {
    let half_spread = half_spread_pct / Decimal::ONE_HUNDRED;
    Arc::new(move |bar: &Bar| {
        let Some(close) = decimal_from_f64(bar.close) else {
            warn!(close = bar.close, "Skipping book update for non-finite close");
            return;
        };
        let book = TopOfBook {
            bid: Some((close * (Decimal::ONE - half_spread)).round_dp(8)),
            ask: Some((close * (Decimal::ONE + half_spread)).round_dp(8)),
            last: Some(close),
        };
        venue.update_book(&symbol, book);
    })
}

/// Resolves on Ctrl-C, or after `duration` seconds when given.
async fn shutdown_signal(duration: Option<u64>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    match duration {
        Some(secs) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
            }
        }
        None => ctrl_c.await,
    }
}
