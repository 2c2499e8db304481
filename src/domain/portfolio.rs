//! Portfolio state: cash, positions, worth history and the trade ledger.
//!
//! Trades are sized against weight bands: a purchase never lifts a position
//! above `max_weight` of worth, and a sale trims a position down to
//! `min_weight` of worth.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, warn};

use super::error::EdgarfolioError;
use super::position::{round_cents, Position, Trade};

pub const MAX_WEIGHT: f64 = 0.5;
pub const MIN_WEIGHT: f64 = 0.05;
pub const DEFAULT_INITIAL_CASH: f64 = 100_000.0;
pub const DEFAULT_BEST_STOCK: &str = "NVDA";
pub const DEFAULT_MARKET_INDEX: &str = "^GSPC";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightBands {
    pub max_weight: f64,
    pub min_weight: f64,
}

impl Default for WeightBands {
    fn default() -> Self {
        WeightBands {
            max_weight: MAX_WEIGHT,
            min_weight: MIN_WEIGHT,
        }
    }
}

/// How the portfolio is opened on the first simulated day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupStrategy {
    /// Split cash evenly across the configured tickers.
    EqualWeight,
    /// All cash into one stock.
    BestStock { ticker: String },
    /// All cash into a benchmark index.
    Market { ticker: String },
}

impl SetupStrategy {
    pub fn from_name(name: &str, best_stock: &str, market_index: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "equal_weight" => Some(SetupStrategy::EqualWeight),
            "best_stock" => Some(SetupStrategy::BestStock {
                ticker: best_stock.to_string(),
            }),
            "market" => Some(SetupStrategy::Market {
                ticker: market_index.to_string(),
            }),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SetupStrategy::EqualWeight => "equal_weight",
            SetupStrategy::BestStock { .. } => "best_stock",
            SetupStrategy::Market { .. } => "market",
        }
    }

    /// Tickers the portfolio trades under this strategy.
    pub fn tickers(&self, configured: &[String]) -> Vec<String> {
        match self {
            SetupStrategy::EqualWeight => configured.to_vec(),
            SetupStrategy::BestStock { ticker } | SetupStrategy::Market { ticker } => {
                vec![ticker.clone()]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InsufficientCash,
    AtCeiling,
    AtFloor,
    NotHeld,
    /// The trade price is zero, negative or not finite.
    InvalidPrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeOutcome {
    Bought { quantity: i64 },
    Sold { quantity: i64 },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub tickers: Vec<String>,
    pub cash: f64,
    pub worth: f64,
    pub positions: BTreeMap<String, Position>,
    pub worth_history: BTreeMap<NaiveDate, f64>,
    pub trades: BTreeMap<NaiveDate, BTreeMap<String, Trade>>,
    /// Simulation cursor. Trades and worth are recorded against it.
    pub date: NaiveDate,
    pub bands: WeightBands,
}

impl Portfolio {
    pub fn new(tickers: Vec<String>, cash: f64) -> Self {
        Portfolio {
            tickers,
            cash,
            worth: 0.0,
            positions: BTreeMap::new(),
            worth_history: BTreeMap::new(),
            trades: BTreeMap::new(),
            date: NaiveDate::default(),
            bands: WeightBands::default(),
        }
    }

    pub fn with_bands(mut self, bands: WeightBands) -> Self {
        self.bands = bands;
        self
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    pub fn get_position(&self, ticker: &str) -> Option<&Position> {
        self.positions.get(ticker)
    }

    /// Open the initial positions from the day's closes.
    pub fn setup(
        &mut self,
        strategy: &SetupStrategy,
        closes: &HashMap<String, f64>,
    ) -> Result<(), EdgarfolioError> {
        match strategy {
            SetupStrategy::EqualWeight => self.setup_equal_weight(closes),
            SetupStrategy::BestStock { ticker } | SetupStrategy::Market { ticker } => {
                self.setup_single(ticker, closes)
            }
        }
    }

    /// Divide cash evenly across `tickers`, buying whole shares only.
    pub fn setup_equal_weight(&mut self, closes: &HashMap<String, f64>) -> Result<(), EdgarfolioError> {
        if self.tickers.is_empty() {
            return Err(EdgarfolioError::NoData {
                reason: "equal-weight setup needs at least one ticker".into(),
            });
        }
        let allocation = self.cash / self.tickers.len() as f64;
        self.trades.entry(self.date).or_default();

        for ticker in self.tickers.clone() {
            let price = self.opening_price(&ticker, closes)?;
            self.open_position(&ticker, price, allocation);
        }

        self.update_worth();
        Ok(())
    }

    /// Put all cash into a single ticker.
    pub fn setup_single(&mut self, ticker: &str, closes: &HashMap<String, f64>) -> Result<(), EdgarfolioError> {
        let price = self.opening_price(ticker, closes)?;
        self.trades.entry(self.date).or_default();
        self.open_position(ticker, price, self.cash);
        self.update_worth();
        Ok(())
    }

    fn opening_price(&self, ticker: &str, closes: &HashMap<String, f64>) -> Result<f64, EdgarfolioError> {
        closes
            .get(ticker)
            .copied()
            .filter(|p| valid_price(*p))
            .ok_or_else(|| EdgarfolioError::MissingPrice {
                ticker: ticker.to_string(),
                date: self.date,
            })
    }

    fn open_position(&mut self, ticker: &str, price: f64, allocation: f64) {
        let quantity = (allocation / price).floor() as i64;
        let mut position = Position::new(ticker, price, quantity);
        self.cash = round_cents(self.cash - position.market_value);

        let trade = Trade { price, quantity };
        position.record_trade(self.date, trade);
        self.positions.insert(ticker.to_string(), position);
        self.record_ledger(ticker, trade);
    }

    /// Reprice every held position from the day's closes. A ticker with no
    /// usable close keeps its last price.
    pub fn update_prices(&mut self, closes: &HashMap<String, f64>) {
        for (ticker, position) in self.positions.iter_mut() {
            match closes.get(ticker) {
                Some(&price) if valid_price(price) => position.update_price(price),
                Some(&price) => {
                    warn!(%ticker, date = %self.date, price, "unusable close, keeping last price")
                }
                None => debug!(%ticker, date = %self.date, "no close, keeping last price"),
            }
        }
        self.update_worth();
    }

    /// Buy as many whole shares as cash allows, capped so the position stays
    /// within `max_weight` of current worth.
    pub fn buy_stock(&mut self, ticker: &str, price: f64) -> TradeOutcome {
        if !valid_price(price) {
            return TradeOutcome::Skipped(SkipReason::InvalidPrice);
        }
        if self.cash < price {
            return TradeOutcome::Skipped(SkipReason::InsufficientCash);
        }

        let held = self.positions.get(ticker).map_or(0, |p| p.quantity);
        let ceiling = (self.worth * self.bands.max_weight / price).floor() as i64;
        let mut bought = (self.cash / price).floor() as i64;
        if bought + held > ceiling {
            bought = (ceiling - held).max(0);
        }
        if bought == 0 {
            return TradeOutcome::Skipped(SkipReason::AtCeiling);
        }

        let trade = Trade {
            price,
            quantity: bought,
        };
        let position = self
            .positions
            .entry(ticker.to_string())
            .or_insert_with(|| Position::new(ticker, price, 0));
        position.update_price(price);
        position.update_quantity(held + bought);
        position.record_trade(self.date, trade);

        self.cash = round_cents(self.cash - price * bought as f64);
        self.record_ledger(ticker, trade);
        self.update_worth();
        TradeOutcome::Bought { quantity: bought }
    }

    /// Trim a position down to `min_weight` of current worth.
    pub fn sell_stock(&mut self, ticker: &str) -> TradeOutcome {
        let Some(position) = self.positions.get_mut(ticker) else {
            return TradeOutcome::Skipped(SkipReason::NotHeld);
        };

        let price = position.price;
        if !valid_price(price) {
            return TradeOutcome::Skipped(SkipReason::InvalidPrice);
        }
        let target = (self.worth * self.bands.min_weight / price).floor() as i64;
        if position.quantity <= target {
            return TradeOutcome::Skipped(SkipReason::AtFloor);
        }

        let sold = position.quantity - target;
        let trade = Trade {
            price,
            quantity: -sold,
        };
        position.update_quantity(target);
        position.record_trade(self.date, trade);

        self.cash = round_cents(self.cash + price * sold as f64);
        self.record_ledger(ticker, trade);
        self.update_worth();
        TradeOutcome::Sold { quantity: sold }
    }

    /// Recompute worth from cash and market values and record it for the
    /// current date.
    pub fn update_worth(&mut self) {
        let invested: f64 = self.positions.values().map(|p| p.market_value).sum();
        self.worth = round_cents(self.cash + invested);
        self.worth_history.insert(self.date, self.worth);
    }

    pub fn weight(&self, ticker: &str) -> Option<f64> {
        self.positions.get(ticker).map(|p| p.weight(self.worth))
    }

    fn record_ledger(&mut self, ticker: &str, trade: Trade) {
        self.trades
            .entry(self.date)
            .or_default()
            .insert(ticker.to_string(), trade);
    }
}

fn valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

impl fmt::Display for Portfolio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(15);
        writeln!(f, "Current positions as of {}", self.date)?;
        writeln!(f, "{rule}")?;
        for (ticker, position) in &self.positions {
            writeln!(f, "Ticker: {ticker}")?;
            writeln!(f, "Price: {}", position.price)?;
            writeln!(f, "Quantity: {}", position.quantity)?;
            writeln!(f, "Weight: {:.4}", position.weight(self.worth))?;
            writeln!(f, "{rule}")?;
        }
        writeln!(f, "Cash: {:.2}", self.cash)?;
        writeln!(f, "{rule}")?;
        write!(f, "Portfolio worth: {:.2}", self.worth)
    }
}
