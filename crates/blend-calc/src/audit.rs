//! 求解結果稽核
//!
//! 以配置重新檢查求解結果是否滿足所有庫存、調合與產能約束。

use blend_core::{MaterialPeriodTable, Period, PlanningConfig, Solution};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 預設容許誤差（相對於 max(1, |預期值|)）
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// 被檢查的不變式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Invariant {
    /// 第 1 期期初庫存 = 期初設定
    InitialStock,
    /// 最終期期末庫存 >= 期末下限
    EndingStock,
    /// 期初庫存 = 前一期期末庫存
    CarryOver,
    /// 期末 = 期初 + 採購 - 投入
    StockBalance,
    /// 產量 = Σ 投入
    ProduceBalance,
    /// 調合硬度下限
    HardnessLower,
    /// 調合硬度上限
    HardnessUpper,
    /// 精製線產能
    LineCapacity,
    /// 0 <= 庫存 <= 上限
    StockBounds,
    /// 決策變數非負
    NonNegative,
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Invariant::InitialStock => "期初庫存",
            Invariant::EndingStock => "期末最低庫存",
            Invariant::CarryOver => "庫存結轉",
            Invariant::StockBalance => "流量守恆",
            Invariant::ProduceBalance => "產量平衡",
            Invariant::HardnessLower => "硬度下限",
            Invariant::HardnessUpper => "硬度上限",
            Invariant::LineCapacity => "精製線產能",
            Invariant::StockBounds => "庫存上下限",
            Invariant::NonNegative => "非負",
        };
        f.write_str(name)
    }
}

/// 稽核發現
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFinding {
    pub invariant: Invariant,
    /// 相關原料或精製線
    pub subject: Option<String>,
    pub period: Option<Period>,
    /// 約束要求的值（或界限）
    pub expected: f64,
    /// 實際值
    pub actual: f64,
}

impl fmt::Display for AuditFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}違反", self.invariant)?;
        if let Some(subject) = &self.subject {
            write!(f, " [{}]", subject)?;
        }
        if let Some(period) = self.period {
            write!(f, " @{}", period)?;
        }
        write!(f, ": 預期 {:.6}，實際 {:.6}", self.expected, self.actual)
    }
}

fn f64_of(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// 求解結果稽核器
pub struct SolutionAuditor {
    tolerance: f64,
}

impl SolutionAuditor {
    /// 創建稽核器
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    fn slack(&self, reference: f64) -> f64 {
        self.tolerance * reference.abs().max(1.0)
    }

    fn check_eq(&self, actual: f64, expected: f64) -> bool {
        (actual - expected).abs() <= self.slack(expected)
    }

    fn check_le(&self, actual: f64, limit: f64) -> bool {
        actual <= limit + self.slack(limit)
    }

    fn check_ge(&self, actual: f64, limit: f64) -> bool {
        actual >= limit - self.slack(limit)
    }

    /// 檢查求解結果，回傳所有違反項（空集合表示全部成立）
    pub fn audit(&self, solution: &Solution, config: &PlanningConfig) -> Vec<AuditFinding> {
        let mut findings = Vec::new();
        let mut report = |invariant, subject: Option<&str>, period, expected, actual| {
            findings.push(AuditFinding {
                invariant,
                subject: subject.map(str::to_string),
                period,
                expected,
                actual,
            });
        };

        let horizon = config.horizon;
        let (Some(first), Some(last)) = (horizon.first(), horizon.last()) else {
            return Vec::new();
        };

        for material in &config.materials {
            let id = material.id.as_str();
            let policy = config.stock_policy_for(id);
            let capacity = f64_of(policy.capacity);
            let value = |table: &MaterialPeriodTable, period| {
                table.get(id, period).unwrap_or(f64::NAN)
            };

            let initial = f64_of(policy.initial_stock);
            let opening_first = value(&solution.opening_stock, first);
            if !self.check_eq(opening_first, initial) {
                report(Invariant::InitialStock, Some(id), Some(first), initial, opening_first);
            }

            let floor = f64_of(policy.min_ending_stock);
            let closing_last = value(&solution.closing_stock, last);
            if !self.check_ge(closing_last, floor) {
                report(Invariant::EndingStock, Some(id), Some(last), floor, closing_last);
            }

            for period in horizon.periods() {
                let opening = value(&solution.opening_stock, period);
                let closing = value(&solution.closing_stock, period);
                let bought = value(&solution.buy, period);
                let used = value(&solution.usage, period);

                if let Some(prev) = period.prev() {
                    let carried = value(&solution.closing_stock, prev);
                    if !self.check_eq(opening, carried) {
                        report(Invariant::CarryOver, Some(id), Some(period), carried, opening);
                    }
                }

                let balance = opening + bought - used;
                if !self.check_eq(closing, balance) {
                    report(Invariant::StockBalance, Some(id), Some(period), balance, closing);
                }

                for stock in [opening, closing] {
                    if !self.check_ge(stock, 0.0) {
                        report(Invariant::StockBounds, Some(id), Some(period), 0.0, stock);
                    } else if !self.check_le(stock, capacity) {
                        report(Invariant::StockBounds, Some(id), Some(period), capacity, stock);
                    }
                }

                for quantity in [bought, used] {
                    if !self.check_ge(quantity, 0.0) {
                        report(Invariant::NonNegative, Some(id), Some(period), 0.0, quantity);
                    }
                }
            }
        }

        let lower = f64_of(config.hardness_band.lower);
        let upper = f64_of(config.hardness_band.upper);

        for period in horizon.periods() {
            let produce = solution.produce(period).unwrap_or(f64::NAN);
            let used_total = solution.usage.period_total(period);
            if !self.check_eq(produce, used_total) {
                report(Invariant::ProduceBalance, None, Some(period), used_total, produce);
            }
            if !self.check_ge(produce, 0.0) {
                report(Invariant::NonNegative, None, Some(period), 0.0, produce);
            }

            let blended: f64 = config
                .materials
                .iter()
                .map(|m| f64_of(m.hardness) * solution.usage.get(&m.id, period).unwrap_or(0.0))
                .sum();
            if !self.check_ge(blended, lower * produce) {
                report(Invariant::HardnessLower, None, Some(period), lower * produce, blended);
            }
            if !self.check_le(blended, upper * produce) {
                report(Invariant::HardnessUpper, None, Some(period), upper * produce, blended);
            }

            for (line, capacity) in &config.line_capacity {
                let line_usage: f64 = config
                    .materials_on(*line)
                    .map(|m| solution.usage.get(&m.id, period).unwrap_or(0.0))
                    .sum();
                let capacity = f64_of(*capacity);
                if !self.check_le(line_usage, capacity) {
                    report(
                        Invariant::LineCapacity,
                        Some(line.as_str()),
                        Some(period),
                        capacity,
                        line_usage,
                    );
                }
            }
        }

        findings
    }
}

impl Default for SolutionAuditor {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}
