use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetergentKind {
    Detergent,
    Softener,
}

impl DetergentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetergentKind::Detergent => "detergent",
            DetergentKind::Softener => "softener",
        }
    }
}

impl FromStr for DetergentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "detergent" => Ok(DetergentKind::Detergent),
            "softener" => Ok(DetergentKind::Softener),
            other => Err(format!("{} is not a detergent kind", other)),
        }
    }
}

/// Unit a service is priced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceUnit {
    Kg,
    Load,
    Piece,
}

impl ServiceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceUnit::Kg => "kg",
            ServiceUnit::Load => "load",
            ServiceUnit::Piece => "piece",
        }
    }
}

/// Prices are stored as plain floats; reject negative, NaN and infinite ones.
pub fn parse_price(price: f64) -> Result<f64, String> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(format!("{} is not a valid price", price))
    }
}
