//! Day-by-day simulation driver.
//!
//! Day zero opens the portfolio with the chosen setup strategy. Every later
//! day reprices held positions, optionally rebalances within the weight
//! bands, and records worth. The run ends when the price history does.

use chrono::NaiveDate;
use tracing::{debug, info};

use super::error::EdgarfolioError;
use super::portfolio::{Portfolio, SetupStrategy, TradeOutcome, WeightBands};
use super::price_history::PriceHistory;

/// What happens between repricing and the worth snapshot on each day after
/// setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebalancePolicy {
    #[default]
    Hold,
    /// Trim every held ticker to the floor, then buy every configured
    /// ticker up to the ceiling.
    WeightBands,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub initial_cash: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Configured tickers. Single-stock strategies trade their own ticker
    /// instead.
    pub tickers: Vec<String>,
    pub strategy: SetupStrategy,
    pub rebalance: RebalancePolicy,
    pub bands: WeightBands,
}

impl SimulationConfig {
    /// Tickers whose prices the run needs.
    pub fn traded_tickers(&self) -> Vec<String> {
        self.strategy.tickers(&self.tickers)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub portfolio: Portfolio,
    pub days: usize,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl SimulationResult {
    pub fn initial_worth(&self) -> Option<f64> {
        self.portfolio.worth_history.values().next().copied()
    }

    pub fn final_worth(&self) -> f64 {
        self.portfolio.worth
    }
}

/// Run the simulation over `history`, calling `on_day` with the portfolio
/// after each day's worth is recorded.
///
/// The first simulated day is the first date on which every traded ticker
/// has a close; earlier dates are skipped.
pub fn run_simulation(
    history: &PriceHistory,
    config: &SimulationConfig,
    mut on_day: impl FnMut(&Portfolio),
) -> Result<SimulationResult, EdgarfolioError> {
    let tickers = config.traded_tickers();
    let first_day = history
        .first_complete_date(&tickers)
        .ok_or_else(|| EdgarfolioError::NoData {
            reason: format!("no trading day has prices for all of {}", tickers.join(",")),
        })?;

    let mut portfolio =
        Portfolio::new(tickers.clone(), config.initial_cash).with_bands(config.bands);
    let mut days = 0;
    let mut last_day = first_day;

    for date in history.dates().filter(|d| *d >= first_day) {
        let Some(closes) = history.closes_on(date) else {
            continue;
        };
        portfolio.set_date(date);

        if days == 0 {
            portfolio.setup(&config.strategy, closes)?;
            info!(
                strategy = config.strategy.name(),
                %date,
                worth = portfolio.worth,
                cash = portfolio.cash,
                "portfolio opened"
            );
        } else {
            portfolio.update_prices(closes);
            if config.rebalance == RebalancePolicy::WeightBands {
                rebalance(&mut portfolio, &tickers, |t| history.close(date, t));
            }
        }

        portfolio.update_worth();
        on_day(&portfolio);
        days += 1;
        last_day = date;
    }

    info!(days, worth = portfolio.worth, "simulation finished");
    Ok(SimulationResult {
        portfolio,
        days,
        first_day,
        last_day,
    })
}

/// Sell down every held ticker, then buy back every configured ticker that
/// has a close today.
fn rebalance(portfolio: &mut Portfolio, tickers: &[String], close: impl Fn(&str) -> Option<f64>) {
    let held: Vec<String> = portfolio.positions.keys().cloned().collect();
    for ticker in &held {
        if let TradeOutcome::Sold { quantity } = portfolio.sell_stock(ticker) {
            debug!(%ticker, quantity, date = %portfolio.date, "sold");
        }
    }
    for ticker in tickers {
        let Some(price) = close(ticker) else {
            continue;
        };
        if let TradeOutcome::Bought { quantity } = portfolio.buy_stock(ticker, price) {
            debug!(%ticker, quantity, price, date = %portfolio.date, "bought");
        }
    }
}
