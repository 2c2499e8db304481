//! A single held instrument and its trade log.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

/// Round a currency amount to cents.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Execution price and signed quantity change (negative for sales).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    pub price: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub ticker: String,
    pub price: f64,
    pub quantity: i64,
    /// `price * quantity`, recomputed on every update.
    pub market_value: f64,
    pub trades: BTreeMap<NaiveDate, Trade>,
}

impl Position {
    /// Open a position. The opening market value is rounded to cents.
    pub fn new(ticker: &str, price: f64, quantity: i64) -> Self {
        debug_assert!(quantity >= 0, "quantity must be non-negative");
        Position {
            ticker: ticker.to_string(),
            price,
            quantity,
            market_value: round_cents(price * quantity as f64),
            trades: BTreeMap::new(),
        }
    }

    /// Reprice the position. The market value is not rounded here; only
    /// portfolio worth is.
    pub fn update_price(&mut self, new_price: f64) {
        self.price = new_price;
        self.market_value = new_price * self.quantity as f64;
    }

    pub fn update_quantity(&mut self, new_quantity: i64) {
        debug_assert!(new_quantity >= 0, "quantity must be non-negative");
        self.quantity = new_quantity;
        self.market_value = self.price * new_quantity as f64;
    }

    /// Log a trade. A second trade on the same date replaces the first.
    pub fn record_trade(&mut self, date: NaiveDate, trade: Trade) {
        self.trades.insert(date, trade);
    }

    /// Share of `worth` held in this position; zero for an empty portfolio.
    pub fn weight(&self, worth: f64) -> f64 {
        if worth == 0.0 {
            0.0
        } else {
            self.market_value / worth
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ticker: {}", self.ticker)?;
        writeln!(f, "Price: {}", self.price)?;
        writeln!(f, "Quantity: {}", self.quantity)?;
        write!(f, "Position worth: {}", self.market_value)
    }
}
