//! Income-statement metric vocabulary and cell value parsing.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Revenue,
    GrossProfit,
    OperatingIncome,
    NetIncome,
    Eps,
}

/// Row-label variants per metric, matched as lowercase substrings.
pub const METRIC_VARIANTS: [(Metric, &[&str]); 5] = [
    (
        Metric::Revenue,
        &["revenue", "total revenue", "net sale", "total net sales"],
    ),
    (Metric::GrossProfit, &["gross profit", "gross margin"]),
    (
        Metric::OperatingIncome,
        &[
            "operating income",
            "income from operations",
            "loss from operations",
        ],
    ),
    (
        Metric::NetIncome,
        &["net income", "net income (loss)", "net loss"],
    ),
    (Metric::Eps, &["basic", "basic earnings per share"]),
];

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Revenue,
        Metric::GrossProfit,
        Metric::OperatingIncome,
        Metric::NetIncome,
        Metric::Eps,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Revenue => "revenue",
            Metric::GrossProfit => "gross profit",
            Metric::OperatingIncome => "operating income",
            Metric::NetIncome => "net income",
            Metric::Eps => "eps",
        }
    }

    /// Identifier used as a column header in exports.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Revenue => "revenue",
            Metric::GrossProfit => "gross_profit",
            Metric::OperatingIncome => "operating_income",
            Metric::NetIncome => "net_income",
            Metric::Eps => "eps",
        }
    }

    pub fn variants(&self) -> &'static [&'static str] {
        METRIC_VARIANTS
            .iter()
            .find(|(m, _)| m == self)
            .map(|(_, v)| *v)
            .unwrap_or(&[])
    }

    /// Whether a lowercase row label names this metric.
    pub fn matches_label(&self, label: &str) -> bool {
        self.variants().iter().any(|v| label.contains(v))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed statement figure. Integers and decimals are kept apart because
/// statements report totals in whole thousands and per-share figures in cents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Integer(i64),
    Decimal(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            MetricValue::Integer(v) => v as f64,
            MetricValue::Decimal(v) => v,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Integer(v) => write!(f, "{v}"),
            MetricValue::Decimal(v) => write!(f, "{v}"),
        }
    }
}

/// Parse a statement cell.
///
/// A `(` marks a negative figure. Thousands separators are dropped. A `.`
/// selects decimal parsing, otherwise the cell must be an integer. Returns
/// `None` when the cell is not a number or its negation overflows.
pub fn parse_value(text: &str) -> Option<MetricValue> {
    let negative = text.contains('(');
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !(negative && (*c == '(' || *c == ')')))
        .collect();
    let cleaned = cleaned.trim();

    let value = if cleaned.contains('.') {
        MetricValue::Decimal(cleaned.parse::<f64>().ok()?)
    } else {
        MetricValue::Integer(cleaned.parse::<i64>().ok()?)
    };

    match (negative, value) {
        (false, v) => Some(v),
        (true, MetricValue::Integer(v)) => v.checked_neg().map(MetricValue::Integer),
        (true, MetricValue::Decimal(v)) => Some(MetricValue::Decimal(-v)),
    }
}

/// Metrics pulled from one filing. A key present with `None` means the row
/// was found but its value could not be parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedMetrics {
    values: BTreeMap<Metric, Option<MetricValue>>,
}

impl ExtractedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a metric unless it was already recorded. Returns whether the
    /// value was stored.
    pub fn record_first(&mut self, metric: Metric, value: Option<MetricValue>) -> bool {
        if self.values.contains_key(&metric) {
            return false;
        }
        self.values.insert(metric, value);
        true
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.values.contains_key(&metric)
    }

    /// `None` when the metric was not found, `Some(None)` when found but unparsable.
    pub fn get(&self, metric: Metric) -> Option<Option<MetricValue>> {
        self.values.get(&metric).copied()
    }

    pub fn value(&self, metric: Metric) -> Option<MetricValue> {
        self.get(metric).flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, Option<MetricValue>)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }
}
