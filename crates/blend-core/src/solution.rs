//! 求解結果模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::period::{Horizon, Period};

/// 求解器數值雜訊的歸零門檻
pub const ZERO_SNAP: f64 = 1e-9;

/// 將接近零的求解值歸零（包含極小的負值）
pub fn snap_to_zero(value: f64) -> f64 {
    if value.abs() < ZERO_SNAP {
        0.0
    } else {
        value
    }
}

/// 稠密的 (原料, 期間) 數值表
///
/// 每個原料、每個期間都有值；求解器壓到零的變數也以 0 填入。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialPeriodTable {
    /// 原料ID（列順序）
    pub materials: Vec<String>,

    /// 期間數量
    pub horizon: Horizon,

    /// 列優先存放：`values[m * N + t]`
    values: Vec<f64>,
}

impl MaterialPeriodTable {
    /// 創建全零的數值表
    pub fn zeros(materials: Vec<String>, horizon: Horizon) -> Self {
        let values = vec![0.0; materials.len() * horizon.len()];
        Self {
            materials,
            horizon,
            values,
        }
    }

    fn position(&self, material_id: &str, period: Period) -> Option<usize> {
        if !self.horizon.contains(period) {
            return None;
        }
        let row = self.materials.iter().position(|m| m == material_id)?;
        Some(row * self.horizon.len() + period.offset())
    }

    /// 查詢數值
    pub fn get(&self, material_id: &str, period: Period) -> Option<f64> {
        self.position(material_id, period).map(|i| self.values[i])
    }

    /// 設置數值；原料或期間不在表內時回傳 false
    pub fn set(&mut self, material_id: &str, period: Period, value: f64) -> bool {
        match self.position(material_id, period) {
            Some(i) => {
                self.values[i] = snap_to_zero(value);
                true
            }
            None => false,
        }
    }

    /// 以列、期間位置直接寫入
    pub fn set_at(&mut self, row: usize, offset: usize, value: f64) {
        let width = self.horizon.len();
        self.values[row * width + offset] = snap_to_zero(value);
    }

    /// 單一原料的整列數值（依期間順序）
    pub fn row(&self, material_id: &str) -> Option<&[f64]> {
        let row = self.materials.iter().position(|m| m == material_id)?;
        let width = self.horizon.len();
        Some(&self.values[row * width..(row + 1) * width])
    }

    /// 某期間所有原料的合計
    pub fn period_total(&self, period: Period) -> f64 {
        if !self.horizon.contains(period) {
            return 0.0;
        }
        let width = self.horizon.len();
        (0..self.materials.len())
            .map(|row| self.values[row * width + period.offset()])
            .sum()
    }

    /// 全表合計
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// 依 (原料, 期間, 值) 逐筆列出
    pub fn iter(&self) -> impl Iterator<Item = (&str, Period, f64)> + '_ {
        let width = self.horizon.len();
        self.values.iter().enumerate().filter_map(move |(i, &value)| {
            let material = self.materials.get(i / width)?;
            let period = self.horizon.period_at(i % width)?;
            Some((material.as_str(), period, value))
        })
    }
}

/// 利潤拆解
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitBreakdown {
    /// 銷售收入
    pub sales_revenue: f64,

    /// 原料採購成本
    pub purchase_cost: f64,

    /// 庫存持有成本
    pub holding_cost: f64,
}

impl ProfitBreakdown {
    /// 利潤 = 收入 - 採購成本 - 持有成本
    pub fn profit(&self) -> f64 {
        self.sales_revenue - self.purchase_cost - self.holding_cost
    }

    /// 總成本
    pub fn total_cost(&self) -> f64 {
        self.purchase_cost + self.holding_cost
    }
}

/// 單一情境的最佳計劃
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// 求解批次ID
    pub run_id: Uuid,

    /// 求解時間
    pub solved_at: DateTime<Utc>,

    /// 求解時使用的銷售單價
    pub sell_price: Decimal,

    /// 最佳目標值（利潤）
    pub profit: f64,

    /// 利潤拆解
    pub breakdown: ProfitBreakdown,

    /// 各期產量（涵蓋所有期間，依期間排序）
    pub produce_per_period: Vec<(Period, f64)>,

    /// 各原料各期採購量
    pub buy: MaterialPeriodTable,

    /// 各原料各期投入量
    pub usage: MaterialPeriodTable,

    /// 各原料各期期初庫存
    pub opening_stock: MaterialPeriodTable,

    /// 各原料各期期末庫存
    pub closing_stock: MaterialPeriodTable,
}

impl Solution {
    /// 查詢某期產量
    pub fn produce(&self, period: Period) -> Option<f64> {
        self.produce_per_period
            .iter()
            .find(|(p, _)| *p == period)
            .map(|(_, value)| *value)
    }

    /// 全時界總產量
    pub fn total_produce(&self) -> f64 {
        self.produce_per_period.iter().map(|(_, value)| value).sum()
    }

    /// 是否有任何一期產量為正
    pub fn has_production(&self) -> bool {
        self.produce_per_period.iter().any(|(_, value)| *value > 0.0)
    }

    /// 產量為零的期間
    pub fn idle_periods(&self) -> Vec<Period> {
        self.produce_per_period
            .iter()
            .filter(|(_, value)| *value <= 0.0)
            .map(|(period, _)| *period)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(index: u32) -> Period {
        Period::new(index).unwrap()
    }

    fn table() -> MaterialPeriodTable {
        MaterialPeriodTable::zeros(vec!["VEG1".to_string(), "OIL1".to_string()], Horizon::new(3))
    }

    #[test]
    fn test_table_is_dense_and_zero_filled() {
        let table = table();

        assert_eq!(table.iter().count(), 6);
        assert!(table.iter().all(|(_, _, value)| value == 0.0));
        assert_eq!(table.get("OIL1", p(3)), Some(0.0));
        assert_eq!(table.get("OIL1", p(4)), None);
        assert_eq!(table.get("OIL9", p(1)), None);
    }

    #[test]
    fn test_table_set_and_totals() {
        let mut table = table();

        assert!(table.set("VEG1", p(2), 150.0));
        assert!(table.set("OIL1", p(2), 50.0));
        assert!(table.set("OIL1", p(3), 1e-12));
        assert!(!table.set("OIL9", p(1), 1.0));

        assert_eq!(table.row("VEG1"), Some(&[0.0, 150.0, 0.0][..]));
        assert_eq!(table.get("OIL1", p(3)), Some(0.0));
        assert_eq!(table.period_total(p(2)), 200.0);
        assert_eq!(table.total(), 200.0);
    }

    #[test]
    fn test_table_iter_order() {
        let mut table = table();
        table.set("OIL1", p(1), 7.0);

        let entries: Vec<(String, u32, f64)> = table
            .iter()
            .map(|(m, period, v)| (m.to_string(), period.index(), v))
            .collect();
        assert_eq!(entries[0], ("VEG1".to_string(), 1, 0.0));
        assert_eq!(entries[3], ("OIL1".to_string(), 1, 7.0));
    }

    #[test]
    fn test_profit_breakdown() {
        let breakdown = ProfitBreakdown {
            sales_revenue: 1000.0,
            purchase_cost: 600.0,
            holding_cost: 150.0,
        };

        assert_eq!(breakdown.total_cost(), 750.0);
        assert_eq!(breakdown.profit(), 250.0);
    }

    #[test]
    fn test_snap_to_zero() {
        assert_eq!(snap_to_zero(-1e-11), 0.0);
        assert_eq!(snap_to_zero(0.5), 0.5);
    }
}
