//! 銷售單價掃描

use blend_core::{PlanningConfig, Result, ScenarioParameters};
use blend_optimizer::build_and_solve;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 掃描中的單一點
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub sell_price: Decimal,
    pub profit: f64,
    pub total_produce: f64,
}

/// 銷售單價掃描器
///
/// 每個單價各自獨立建模、求解，彼此不共享狀態，因此可平行執行。
pub struct PriceSweep {
    config: PlanningConfig,
}

impl PriceSweep {
    /// 創建掃描器
    pub fn new(config: PlanningConfig) -> Self {
        Self { config }
    }

    /// 產生等距單價網格（含兩端點）
    pub fn price_grid(start: Decimal, end: Decimal, step: Decimal) -> Vec<Decimal> {
        let mut prices = Vec::new();
        if step <= Decimal::ZERO {
            return prices;
        }

        let mut current = start;
        while current <= end {
            prices.push(current);
            current += step;
        }

        prices
    }

    /// 求解所有單價，結果依單價排序
    ///
    /// 任一點建模或求解失敗即回傳該錯誤。
    pub fn run(&self, prices: &[Decimal]) -> Result<Vec<SweepPoint>> {
        tracing::info!("開始單價掃描：{} 個點", prices.len());

        let mut points = prices
            .par_iter()
            .map(|&sell_price| {
                let params = ScenarioParameters::new(sell_price).with_config(self.config.clone());
                let solution = build_and_solve(&params)?;
                Ok(SweepPoint {
                    sell_price,
                    profit: solution.profit,
                    total_produce: solution.total_produce(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        points.sort_by(|a, b| a.sell_price.cmp(&b.sell_price));

        tracing::info!("單價掃描完成");
        Ok(points)
    }

    /// 檢查利潤隨單價弱單調遞增（容許數值誤差）
    pub fn is_monotone(points: &[SweepPoint], tolerance: f64) -> bool {
        points
            .windows(2)
            .all(|pair| pair[1].profit >= pair[0].profit - tolerance * pair[0].profit.abs().max(1.0))
    }

    /// 第一個有生產的單價（損益平衡點附近）
    pub fn first_producing_price(points: &[SweepPoint]) -> Option<Decimal> {
        points
            .iter()
            .find(|point| point.total_produce > 0.0)
            .map(|point| point.sell_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_grid() {
        let grid = PriceSweep::price_grid(Decimal::ZERO, Decimal::from(300), Decimal::from(50));

        assert_eq!(grid.len(), 7);
        assert_eq!(grid[0], Decimal::ZERO);
        assert_eq!(grid[6], Decimal::from(300));
    }

    #[test]
    fn test_price_grid_rejects_non_positive_step() {
        assert!(PriceSweep::price_grid(Decimal::ZERO, Decimal::from(10), Decimal::ZERO).is_empty());
    }

    #[test]
    fn test_is_monotone() {
        let point = |price: i64, profit: f64| SweepPoint {
            sell_price: Decimal::from(price),
            profit,
            total_produce: 0.0,
        };

        assert!(PriceSweep::is_monotone(
            &[point(0, -75_000.0), point(100, -75_000.0), point(150, 100_000.0)],
            1e-9
        ));
        assert!(!PriceSweep::is_monotone(&[point(0, 10.0), point(100, 5.0)], 1e-9));
    }

    #[test]
    fn test_sweep_reference_range() {
        let sweep = PriceSweep::new(PlanningConfig::reference());
        let prices = PriceSweep::price_grid(Decimal::ZERO, Decimal::from(300), Decimal::from(75));

        let points = sweep.run(&prices).unwrap();

        assert_eq!(points.len(), 5);
        assert!(points.windows(2).all(|w| w[0].sell_price < w[1].sell_price));
        assert!(PriceSweep::is_monotone(&points, 1e-6));
        assert_eq!(points[0].total_produce, 0.0);
        assert!(points[4].total_produce > 0.0);

        let breakeven = PriceSweep::first_producing_price(&points).unwrap();
        assert!(breakeven > Decimal::ZERO);
    }
}
