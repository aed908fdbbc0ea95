// =============================================================================
// Shared types used across the dashboard
// =============================================================================

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SelectionError;

/// Products offered by the product dropdown, in display order.
pub const PRODUCTS: [&str; 6] = [
    "ETH-USD",
    "BTC-USD",
    "LTC-USD",
    "SOL-USD",
    "CBETH-ETH",
    "CBETH-USD",
];

pub const DEFAULT_PRODUCT: &str = "ETH-USD";

// =============================================================================
// Product
// =============================================================================

/// An exchange product identifier taken from [`PRODUCTS`], e.g. `"ETH-USD"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Product(&'static str);

impl Product {
    /// Validate `id` against the allow-list.
    pub fn parse(id: &str) -> Result<Self, SelectionError> {
        PRODUCTS
            .into_iter()
            .find(|p| *p == id)
            .map(Self)
            .ok_or_else(|| SelectionError::UnknownProduct(id.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Quote currency: the component after the `-` separator.
    pub fn denomination(&self) -> &'static str {
        self.0.split('-').nth(1).unwrap_or("")
    }
}

impl Default for Product {
    fn default() -> Self {
        Self(DEFAULT_PRODUCT)
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Product {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Product {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Product::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Granularity
// =============================================================================

/// Candle bucket width. Only the widths the exchange's candle endpoint
/// accepts are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    #[default]
    OneHour,
    SixHours,
    OneDay,
}

impl Granularity {
    pub const ALL: [Granularity; 6] = [
        Self::OneMinute,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::OneHour,
        Self::SixHours,
        Self::OneDay,
    ];

    pub fn seconds(self) -> u32 {
        match self {
            Self::OneMinute => 60,
            Self::FiveMinutes => 300,
            Self::FifteenMinutes => 900,
            Self::OneHour => 3600,
            Self::SixHours => 21600,
            Self::OneDay => 86400,
        }
    }

    /// Label shown in the granularity dropdown.
    pub fn label(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::OneHour => "1h",
            Self::SixHours => "6h",
            Self::OneDay => "1d",
        }
    }

    pub fn from_seconds(seconds: u32) -> Result<Self, SelectionError> {
        Self::ALL
            .into_iter()
            .find(|g| g.seconds() == seconds)
            .ok_or_else(|| SelectionError::UnsupportedGranularity(seconds.to_string()))
    }
}

impl std::str::FromStr for Granularity {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let seconds: u32 = s
            .trim()
            .parse()
            .map_err(|_| SelectionError::UnsupportedGranularity(s.to_string()))?;
        Self::from_seconds(seconds)
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for Granularity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.seconds())
    }
}

/// The dropdown emits the seconds value as a string; API clients may send a
/// plain number. Both are accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum GranularityRepr {
    Number(u32),
    Text(String),
}

impl<'de> Deserialize<'de> for Granularity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match GranularityRepr::deserialize(deserializer)? {
            GranularityRepr::Number(n) => Self::from_seconds(n),
            GranularityRepr::Text(s) => s.parse(),
        }
        .map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Current value of both dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub product: Product,
    #[serde(default)]
    pub granularity: Granularity,
}

impl Selection {
    /// Validate raw dropdown values; blank values fall back to the defaults.
    pub fn parse(product: Option<&str>, granularity: Option<&str>) -> Result<Self, SelectionError> {
        let product = match product.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => Product::parse(p)?,
            None => Product::default(),
        };
        let granularity = match granularity.map(str::trim).filter(|g| !g.is_empty()) {
            Some(g) => g.parse()?,
            None => Granularity::default(),
        };
        Ok(Self {
            product,
            granularity,
        })
    }
}
