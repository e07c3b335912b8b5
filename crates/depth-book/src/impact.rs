//! Order impact estimation over a materialized view
//!
//! Stateless arithmetic answering "what would this order do to the visible
//! book". Nothing here touches the store.

use crate::snapshot::{BookSnapshot, PublishedLevel};
use depth_types::BookSide;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Direction of a simulated order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Side of the book the order trades against
    pub fn matching_side(&self) -> BookSide {
        match self {
            Self::Buy => BookSide::Ask,
            Self::Sell => BookSide::Bid,
        }
    }
}

/// A hypothetical order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedOrder {
    pub side: OrderSide,
    pub quantity: Decimal,
    /// Limit price; `None` is a market order
    pub limit_price: Option<Decimal>,
}

impl SimulatedOrder {
    pub fn market(side: OrderSide, quantity: Decimal) -> Self {
        Self {
            side,
            quantity,
            limit_price: None,
        }
    }

    pub fn limit(side: OrderSide, quantity: Decimal, price: Decimal) -> Self {
        Self {
            side,
            quantity,
            limit_price: Some(price),
        }
    }
}

/// Rough time-to-fill bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillEstimate {
    /// Two levels or fewer
    Instant,
    /// Three to five levels
    Seconds10To30,
    /// More than five levels
    Over30Seconds,
    /// Order would rest on the book
    Pending,
}

impl fmt::Display for FillEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Instant => "Instant",
            Self::Seconds10To30 => "10-30s",
            Self::Over30Seconds => "30s+",
            Self::Pending => "Pending",
        })
    }
}

/// Outcome of a simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactReport {
    pub filled_quantity: Decimal,
    /// Filled share of the order, 0-100
    pub fill_percentage: Decimal,
    /// Worst price touched, zero when nothing fills
    pub impact_price: Decimal,
    pub levels_affected: usize,
    /// Limit order that fills nothing and does not cross the spread
    pub would_rest: bool,
    /// Distance of the impact price from mid, in percent
    pub market_impact_pct: Decimal,
    /// Distance of the limit price from the impact price, in percent
    pub slippage_pct: Decimal,
    pub fill_estimate: FillEstimate,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImpactError {
    #[error("Book has no bids or no asks")]
    EmptyBook,

    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(Decimal),

    #[error("Limit price must be positive, got {0}")]
    InvalidPrice(Decimal),
}

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Simulate `order` against the visible levels of `book`
///
/// Market orders take the best opposite level only. Limit orders walk every
/// opposite level their price crosses until the quantity is covered.
pub fn simulate(book: &BookSnapshot, order: &SimulatedOrder) -> Result<ImpactReport, ImpactError> {
    if order.quantity <= Decimal::ZERO {
        return Err(ImpactError::InvalidQuantity(order.quantity));
    }
    if let Some(price) = order.limit_price {
        if price <= Decimal::ZERO {
            return Err(ImpactError::InvalidPrice(price));
        }
    }

    let best_bid = book.best_bid().ok_or(ImpactError::EmptyBook)?;
    let best_ask = book.best_ask().ok_or(ImpactError::EmptyBook)?;
    let matching = match order.side {
        OrderSide::Buy => &book.asks,
        OrderSide::Sell => &book.bids,
    };

    let mut filled = Decimal::ZERO;
    let mut impact_price = Decimal::ZERO;
    let mut levels_affected = 0;
    let mut would_rest = false;

    match order.limit_price {
        None => {
            let (price, size) = parse_level(&matching[0]);
            impact_price = price;
            filled = order.quantity.min(size);
            levels_affected = 1;
        }
        Some(limit) => {
            let mut cumulative = Decimal::ZERO;
            for level in matching {
                let (price, size) = parse_level(level);
                let crosses = match order.side {
                    OrderSide::Buy => price <= limit,
                    OrderSide::Sell => price >= limit,
                };
                if !crosses {
                    continue;
                }

                cumulative += size;
                levels_affected += 1;
                impact_price = price;
                if cumulative < order.quantity {
                    filled += size;
                } else {
                    filled = order.quantity;
                    break;
                }
            }

            would_rest = filled.is_zero()
                && match order.side {
                    OrderSide::Buy => limit < best_ask,
                    OrderSide::Sell => limit > best_bid,
                };
        }
    }

    let fill_percentage = filled / order.quantity * HUNDRED;
    let mid = (best_bid + best_ask) / Decimal::TWO;

    let (market_impact_pct, slippage_pct) = if filled > Decimal::ZERO {
        let impact = percent_of(impact_price - mid, mid).abs();
        let reference = order.limit_price.unwrap_or(impact_price);
        let slippage = match order.side {
            OrderSide::Buy => percent_of(reference - impact_price, impact_price),
            OrderSide::Sell => percent_of(impact_price - reference, impact_price),
        };
        (impact, slippage)
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let fill_estimate = if would_rest {
        FillEstimate::Pending
    } else if levels_affected > 5 {
        FillEstimate::Over30Seconds
    } else if levels_affected > 2 {
        FillEstimate::Seconds10To30
    } else {
        FillEstimate::Instant
    };

    Ok(ImpactReport {
        filled_quantity: filled,
        fill_percentage,
        impact_price,
        levels_affected,
        would_rest,
        market_impact_pct,
        slippage_pct,
        fill_estimate,
    })
}

/// A point on a depth curve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthPoint {
    pub price: Decimal,
    pub size: Decimal,
    /// Size of this level plus every better level
    pub cumulative: Decimal,
}

/// Running total of size from the best level outwards
pub fn cumulative_depth(levels: &[PublishedLevel]) -> Vec<DepthPoint> {
    let mut cumulative = Decimal::ZERO;
    levels
        .iter()
        .map(|level| {
            let (price, size) = parse_level(level);
            cumulative += size;
            DepthPoint {
                price,
                size,
                cumulative,
            }
        })
        .collect()
}

fn parse_level(level: &PublishedLevel) -> (Decimal, Decimal) {
    (
        level.price_decimal().unwrap_or_default(),
        level.size_decimal().unwrap_or_default(),
    )
}

fn percent_of(value: Decimal, base: Decimal) -> Decimal {
    value
        .checked_div(base)
        .map(|ratio| ratio * HUNDRED)
        .unwrap_or_default()
}
