use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MAX_LINES_PER_ORDER: usize = 50;

#[derive(Deserialize, Debug, Clone)]
pub struct RequestedLine {
    pub service_id: Uuid,
    pub quantity: f64,
    pub detergent_type_id: Option<Uuid>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub service_id: Uuid,
    pub detergent_type_id: Option<Uuid>,
    pub quantity: f64,
    pub unit_price: f64,
    pub detergent_price: f64,
    pub line_total: f64,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("an order needs at least one item")]
    Empty,
    #[error("an order cannot have more than {0} items")]
    TooManyLines(usize),
    #[error("quantity must be a positive number, got {0}")]
    InvalidQuantity(f64),
    #[error("service {0} is not offered by this shop")]
    UnknownService(Uuid),
    #[error("detergent {0} is not offered by this branch")]
    UnknownDetergent(Uuid),
    #[error("order total is out of range")]
    TotalOutOfRange,
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Prices each requested line against the shop's active services and the
/// branch's effective detergent prices.
///
/// `line_total = quantity * unit_price + detergent_price`, rounded to cents.
pub fn price_lines(
    lines: &[RequestedLine],
    service_prices: &HashMap<Uuid, f64>,
    detergent_prices: &HashMap<Uuid, f64>,
) -> Result<(Vec<PricedLine>, f64), PricingError> {
    if lines.is_empty() {
        return Err(PricingError::Empty);
    }
    if lines.len() > MAX_LINES_PER_ORDER {
        return Err(PricingError::TooManyLines(MAX_LINES_PER_ORDER));
    }

    let mut priced = Vec::with_capacity(lines.len());
    let mut total = 0.0;

    for line in lines {
        if !line.quantity.is_finite() || line.quantity <= 0.0 {
            return Err(PricingError::InvalidQuantity(line.quantity));
        }

        let unit_price = *service_prices
            .get(&line.service_id)
            .ok_or(PricingError::UnknownService(line.service_id))?;

        let detergent_price = match line.detergent_type_id {
            Some(id) => *detergent_prices
                .get(&id)
                .ok_or(PricingError::UnknownDetergent(id))?,
            None => 0.0,
        };

        let line_total = round_cents(line.quantity * unit_price + detergent_price);
        if !line_total.is_finite() {
            return Err(PricingError::TotalOutOfRange);
        }
        total += line_total;

        priced.push(PricedLine {
            service_id: line.service_id,
            detergent_type_id: line.detergent_type_id,
            quantity: line.quantity,
            unit_price,
            detergent_price,
            line_total,
        });
    }

    let total = round_cents(total);
    if !total.is_finite() {
        return Err(PricingError::TotalOutOfRange);
    }

    Ok((priced, total))
}
