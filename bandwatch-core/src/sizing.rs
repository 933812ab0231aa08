//! Risk-budget position sizing.
//!
//! The whole capital goes into one position: `units = capital / close`.
//! The stop sits `risk_per_trade / units` away from the close, so hitting it
//! loses exactly the per-trade risk budget. The target is a fixed percentage
//! move from the close.

use serde::{Deserialize, Serialize};

use crate::signals::SignalError;

pub const DEFAULT_CAPITAL: f64 = 2_000_000.0;
pub const DEFAULT_RISK_PER_TRADE: f64 = 7_000.0;

/// Capital and per-trade loss budget supplied by the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub capital: f64,
    pub risk_per_trade: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            capital: DEFAULT_CAPITAL,
            risk_per_trade: DEFAULT_RISK_PER_TRADE,
        }
    }
}

impl RiskConfig {
    pub fn new(capital: f64, risk_per_trade: f64) -> Result<Self, SignalError> {
        let config = Self {
            capital,
            risk_per_trade,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SignalError> {
        if !self.capital.is_finite() || self.capital <= 0.0 {
            return Err(SignalError::NonPositiveCapital(self.capital));
        }
        if !self.risk_per_trade.is_finite() || self.risk_per_trade <= 0.0 {
            return Err(SignalError::NonPositiveRisk(self.risk_per_trade));
        }
        Ok(())
    }
}

/// Direction of the suggested trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Long,
    Short,
}

/// Suggested order for a triggered bar. Every field is derived from the close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderPlan {
    pub price: f64,
    pub stop_loss: f64,
    pub quantity: f64,
    pub target_price: f64,
}

impl OrderPlan {
    /// Maximum adverse move per unit before the risk budget is spent.
    pub fn per_unit_risk(&self) -> f64 {
        (self.price - self.stop_loss).abs()
    }
}

/// Size an order at `close` for the given side.
pub fn plan_order(
    side: TradeSide,
    close: f64,
    risk: &RiskConfig,
    target_percent: f64,
) -> Result<OrderPlan, SignalError> {
    risk.validate()?;
    if !close.is_finite() || close <= 0.0 {
        return Err(SignalError::NonPositivePrice(close));
    }

    let quantity = risk.capital / close;
    let per_unit_risk = risk.risk_per_trade / quantity;
    let target_move = close * target_percent / 100.0;

    let (stop_loss, target_price) = match side {
        TradeSide::Long => (close - per_unit_risk, close + target_move),
        TradeSide::Short => (close + per_unit_risk, close - target_move),
    };

    let finite = [quantity, per_unit_risk, stop_loss, target_price]
        .iter()
        .all(|v| v.is_finite());
    if !finite || quantity <= 0.0 {
        return Err(SignalError::UnsizablePlan {
            capital: risk.capital,
            close,
        });
    }

    Ok(OrderPlan {
        price: close,
        stop_loss,
        quantity,
        target_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn long_plan_matches_worked_example() {
        let plan = plan_order(TradeSide::Long, 100.0, &RiskConfig::default(), 0.36).unwrap();
        assert!(approx(plan.quantity, 20_000.0));
        assert!(approx(plan.per_unit_risk(), 0.35));
        assert!(approx(plan.stop_loss, 99.65));
        assert!(approx(plan.target_price, 100.36));
    }

    #[test]
    fn extreme_capital_never_yields_infinite_plan() {
        let huge = RiskConfig::new(1e308, 7_000.0).unwrap();
        let err = plan_order(TradeSide::Long, 0.5, &huge, 0.36).unwrap_err();
        assert_eq!(
            err,
            SignalError::UnsizablePlan {
                capital: 1e308,
                close: 0.5
            }
        );

        let tiny = RiskConfig::new(5e-324, 7_000.0).unwrap();
        let err = plan_order(TradeSide::Short, 100.0, &tiny, 0.36).unwrap_err();
        assert!(matches!(err, SignalError::UnsizablePlan { .. }));
    }

    #[test]
    fn short_plan_matches_worked_example() {
        let plan = plan_order(TradeSide::Short, 200.0, &RiskConfig::default(), 0.36).unwrap();
        assert!(approx(plan.quantity, 10_000.0));
        assert!(approx(plan.stop_loss, 200.7));
        assert!(approx(plan.target_price, 199.28));
    }

    #[test]
    fn zero_close_is_invalid() {
        let err = plan_order(TradeSide::Long, 0.0, &RiskConfig::default(), 0.36).unwrap_err();
        assert_eq!(err, SignalError::NonPositivePrice(0.0));
    }

    #[test]
    fn non_positive_risk_config_is_invalid() {
        assert!(RiskConfig::new(0.0, 7_000.0).is_err());
        assert!(RiskConfig::new(1_000.0, -1.0).is_err());
        assert!(RiskConfig::new(f64::NAN, 1.0).is_err());
        assert!(RiskConfig::new(1_000.0, 10.0).is_ok());
    }
}
