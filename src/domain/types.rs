//! Shared domain types.
//!
//! These types are intentionally small and cheap to clone so they can be:
//!
//! - produced once by the loader
//! - read (never mutated) by every aggregation and rendering stage
//! - serialized into the optional JSON summary export

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Calendar month covered by the sales table.
///
/// The declaration order *is* the canonical chronological order: `Ord` is
/// derived, so any `BTreeMap<Month, _>` iterates Enero..Junio regardless of the
/// order rows appeared in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    Enero,
    Febrero,
    Marzo,
    Abril,
    Mayo,
    Junio,
}

/// Number of months in the reporting window.
///
/// Monthly averages divide by this constant under [`AverageWindow::Fixed`].
pub const MONTH_WINDOW: usize = Month::ALL.len();

impl Month {
    pub const ALL: [Month; 6] = [
        Month::Enero,
        Month::Febrero,
        Month::Marzo,
        Month::Abril,
        Month::Mayo,
        Month::Junio,
    ];

    /// Zero-based position in canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Month::Enero => "Enero",
            Month::Febrero => "Febrero",
            Month::Marzo => "Marzo",
            Month::Abril => "Abril",
            Month::Mayo => "Mayo",
            Month::Junio => "Junio",
        }
    }

    /// Three-letter label for narrow axes.
    pub fn short_name(self) -> &'static str {
        &self.display_name()[..3]
    }

    /// Parse a month cell (surrounding whitespace and case are ignored).
    pub fn parse(raw: &str) -> Option<Month> {
        let wanted = raw.trim();
        Month::ALL
            .into_iter()
            .find(|m| m.display_name().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Divisor used for "average units per month".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AverageWindow {
    /// Always divide by [`MONTH_WINDOW`], even if some months have no sales.
    #[default]
    Fixed,
    /// Divide by the number of distinct months that appear in the data.
    Observed,
}

/// Where the report artifacts are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Interactive terminal viewer, one artifact at a time.
    #[default]
    Tui,
    /// Plain text on stdout.
    Text,
}

/// Whether the input table carried a `precio_unitario` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pricing {
    Available,
    Missing,
}

/// One sales transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    /// Normalized product label (see [`normalize_product`]).
    pub product: String,
    pub month: Month,
    pub quantity: u64,
    /// `None` when the column is absent or the cell is empty.
    pub unit_price: Option<f64>,
}

impl SalesRecord {
    /// `quantity * unit_price` at full precision.
    pub fn revenue(&self) -> Option<f64> {
        self.unit_price.map(|price| self.quantity as f64 * price)
    }
}

/// The in-memory sales table for one run. Read-only after load.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<SalesRecord>,
    pub pricing: Pricing,
}

impl Dataset {
    pub fn new(records: Vec<SalesRecord>, pricing: Pricing) -> Self {
        Self { records, pricing }
    }

    pub fn has_pricing(&self) -> bool {
        self.pricing == Pricing::Available
    }

    pub fn total_quantity(&self) -> u64 {
        self.records.iter().fold(0u64, |acc, r| acc.saturating_add(r.quantity))
    }

    /// Distinct months present, in canonical order.
    pub fn observed_months(&self) -> Vec<Month> {
        Month::ALL
            .into_iter()
            .filter(|m| self.records.iter().any(|r| r.month == *m))
            .collect()
    }
}

/// Trim and capitalize a product label: first character upper-case, the rest
/// lower-case. `" CAMISA "`, `"camisa"` and `"Camisa"` all become `"Camisa"`.
pub fn normalize_product(raw: &str) -> String {
    let mut chars = raw.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Fully-resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub input: PathBuf,
    pub output: OutputMode,
    pub average_window: AverageWindow,
    pub export_json: Option<PathBuf>,
}
