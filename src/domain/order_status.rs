use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the customer hands over and receives the laundry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fulfillment {
    Dropoff,
    Pickup,
    Delivery,
}

impl Fulfillment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fulfillment::Dropoff => "dropoff",
            Fulfillment::Pickup => "pickup",
            Fulfillment::Delivery => "delivery",
        }
    }

    pub fn requires_address(&self) -> bool {
        matches!(self, Fulfillment::Pickup | Fulfillment::Delivery)
    }
}

impl FromStr for Fulfillment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dropoff" => Ok(Fulfillment::Dropoff),
            "pickup" => Ok(Fulfillment::Pickup),
            "delivery" => Ok(Fulfillment::Delivery),
            other => Err(format!("{} is not a valid fulfillment type", other)),
        }
    }
}

/// Lifecycle of an order.
///
/// `Pending` orders form the incoming queue, `InProgress` and `Delivering`
/// form the work queue, and `Completed` orders only exist in the history
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Delivering,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Completed => "completed",
        }
    }

    /// The single forward step for an order with the given fulfillment.
    pub fn next(&self, fulfillment: Fulfillment) -> Option<OrderStatus> {
        match (self, fulfillment) {
            (OrderStatus::Pending, _) => Some(OrderStatus::InProgress),
            (OrderStatus::InProgress, Fulfillment::Dropoff) => Some(OrderStatus::Completed),
            (OrderStatus::InProgress, _) => Some(OrderStatus::Delivering),
            (OrderStatus::Delivering, _) => Some(OrderStatus::Completed),
            (OrderStatus::Completed, _) => None,
        }
    }

    pub fn work_queue() -> [&'static str; 2] {
        [
            OrderStatus::InProgress.as_str(),
            OrderStatus::Delivering.as_str(),
        ]
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "in_progress" => Ok(OrderStatus::InProgress),
            "delivering" => Ok(OrderStatus::Delivering),
            "completed" => Ok(OrderStatus::Completed),
            other => Err(format!("{} is not a valid order status", other)),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
