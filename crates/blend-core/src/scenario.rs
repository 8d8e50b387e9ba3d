//! 情境參數

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PlanningConfig;
use crate::{BlendError, Result};

/// 單一情境的完整參數
///
/// 銷售單價是唯一對外可調的輸入，其餘數據預設取自參考配置。
/// 整個結構（含配置）即為結果快取的鍵。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScenarioParameters {
    /// 產品銷售單價
    pub sell_price: Decimal,

    /// 固定業務數據
    pub config: PlanningConfig,
}

impl ScenarioParameters {
    /// 以參考配置創建情境
    pub fn new(sell_price: Decimal) -> Self {
        Self {
            sell_price,
            config: PlanningConfig::reference(),
        }
    }

    /// 建構器模式：替換配置
    pub fn with_config(mut self, config: PlanningConfig) -> Self {
        self.config = config;
        self
    }

    /// 建構器模式：替換銷售單價
    pub fn with_sell_price(mut self, sell_price: Decimal) -> Self {
        self.sell_price = sell_price;
        self
    }

    /// 檢查銷售單價與配置
    pub fn validate(&self) -> Result<()> {
        if self.sell_price < Decimal::ZERO {
            return Err(BlendError::InvalidParameter(format!(
                "銷售單價不可為負: {}",
                self.sell_price
            )));
        }

        self.config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_defaults_to_reference_config() {
        let params = ScenarioParameters::new(Decimal::from(150));

        assert_eq!(params.sell_price, Decimal::from(150));
        assert_eq!(params.config, PlanningConfig::reference());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_negative_sell_price_rejected() {
        let params = ScenarioParameters::new(Decimal::from(-1));

        assert!(matches!(params.validate(), Err(BlendError::InvalidParameter(_))));
    }

    #[test]
    fn test_zero_sell_price_allowed() {
        assert!(ScenarioParameters::new(Decimal::ZERO).validate().is_ok());
    }

    #[test]
    fn test_scenarios_differing_only_in_config_are_distinct() {
        let a = ScenarioParameters::new(Decimal::from(150));
        let b = a.clone().with_config(
            PlanningConfig::reference()
                .with_line_capacity(crate::RefiningLine::Veg, Decimal::from(180)),
        );

        assert_ne!(a, b);
        assert_eq!(a, a.clone().with_sell_price(Decimal::new(1500, 1)));
    }
}
