use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Catalog entry from `GET /vegetables`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Vegetable {
    pub name: String,
}

/// Catalog entry from `GET /cities`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub state: String,
}

/// Latest price for one vegetable in one city, from `GET /current-prices`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PriceRecord {
    pub vegetable_name: String,
    pub city: String,
    pub source: String,
    pub price_per_kg: f64,
    /// Percentage change against the previous entry for the same vegetable and city.
    #[serde(default)]
    pub price_change: f64,
    /// ISO-8601 timestamp, kept as received.
    pub timestamp: String,
    #[serde(default)]
    pub quality_rating: Option<u8>,
}

impl PriceRecord {
    /// Parse [`Self::timestamp`] as an RFC 3339 date-time.
    pub fn updated_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.timestamp).ok()
    }
}

/// Normalised buy/wait advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Advice {
    Buy,
    Wait,
}

impl Advice {
    /// Anything that is not literally "wait" (case-insensitive) is [`Advice::Buy`].
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("wait") {
            Advice::Wait
        } else {
            Advice::Buy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Advice::Buy => "buy",
            Advice::Wait => "wait",
        }
    }
}

impl std::fmt::Display for Advice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Buy/wait recommendation from `GET /recommendation`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Recommendation {
    pub vegetable_name: String,
    pub current_price: f64,
    pub predicted_price: f64,
    /// Action label as sent by the server, e.g. "Wait" or "Buy Now".
    pub action: String,
    #[serde(default)]
    pub potential_savings: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl Recommendation {
    pub fn advice(&self) -> Advice {
        Advice::from_label(&self.action)
    }
}

/// One source observation from `GET /comparison`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ComparisonRow {
    pub source: String,
    #[serde(default)]
    pub location: Option<String>,
    pub city: String,
    pub date: NaiveDate,
    pub price: f64,
    #[serde(default)]
    pub quality_rating: Option<u8>,
}

/// One point along the horizon from `GET /prediction`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PredictionPoint {
    pub date: NaiveDate,
    pub predicted_price: f64,
    #[serde(default)]
    pub lower_bound: Option<f64>,
    #[serde(default)]
    pub upper_bound: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub model_used: Option<String>,
}

/// Sign-of-delta trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl Trend {
    /// Positive is rising, negative is falling, zero (and NaN) is stable.
    pub fn classify(raw: f64) -> Self {
        if raw > 0.0 {
            Trend::Rising
        } else if raw < 0.0 {
            Trend::Falling
        } else {
            Trend::Stable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Trend::Rising => "Rising",
            Trend::Falling => "Falling",
            Trend::Stable => "Stable",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Rising => "↑",
            Trend::Falling => "↓",
            Trend::Stable => "→",
        }
    }
}

/// Monthly statistics for one vegetable, from `GET /insights` on the insights page.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InsightSummary {
    pub item_name: String,
    pub min_price: f64,
    pub avg_price: f64,
    pub max_price: f64,
    /// Raw relative trend in [-1, 1]; only its sign is displayed.
    #[serde(default)]
    pub trend: f64,
}

impl InsightSummary {
    pub fn trend_direction(&self) -> Trend {
        Trend::classify(self.trend)
    }
}

/// Savings summary from `GET /insights` as consumed by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SavingsSummary {
    #[serde(default)]
    pub total_savings: f64,
    #[serde(default)]
    pub items_saved: u32,
}

/// JSON body of `POST /submit-price/`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PriceSubmission {
    pub vegetable_name: String,
    pub city_name: String,
    pub price_per_kg: f64,
    pub source: String,
    pub quality_rating: u8,
}
