//! 原料採購單價表

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::period::{Horizon, Period};
use crate::{BlendError, Result};

/// 採購單價表：(原料, 期間) → 單價
///
/// 每一列依期間順序存放單價，第 `i` 個元素對應第 `i + 1` 期。
/// 表格必須完整覆蓋所有原料與期間，不提供預設值。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchasePriceTable {
    prices: BTreeMap<String, Vec<Decimal>>,
}

impl PurchasePriceTable {
    /// 創建空的單價表
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置某原料整個時界的單價
    pub fn with_row(mut self, material_id: impl Into<String>, prices: Vec<Decimal>) -> Self {
        self.prices.insert(material_id.into(), prices);
        self
    }

    /// 設置單一 (原料, 期間) 單價
    ///
    /// 只能覆寫既有期間或接在列尾新增下一期；跳期會留下缺漏，回傳錯誤。
    pub fn set(&mut self, material_id: &str, period: Period, price: Decimal) -> Result<()> {
        let row = self.prices.entry(material_id.to_string()).or_default();
        let offset = period.offset();

        if offset < row.len() {
            row[offset] = price;
        } else if offset == row.len() {
            row.push(price);
        } else {
            let filled = row.len();
            if filled == 0 {
                self.prices.remove(material_id);
            }
            return Err(BlendError::InvalidParameter(format!(
                "採購單價不可跳期設置: 原料 {} 只有 {} 期單價，無法設置 {}",
                material_id, filled, period
            )));
        }

        Ok(())
    }

    /// 查詢單價
    pub fn get(&self, material_id: &str, period: Period) -> Option<Decimal> {
        self.prices
            .get(material_id)
            .and_then(|row| row.get(period.offset()))
            .copied()
    }

    /// 移除某原料的單價列
    pub fn remove_row(&mut self, material_id: &str) -> Option<Vec<Decimal>> {
        self.prices.remove(material_id)
    }

    /// 查詢單價，缺漏視為配置錯誤
    pub fn require(&self, material_id: &str, period: Period) -> Result<Decimal> {
        self.get(material_id, period).ok_or_else(|| {
            BlendError::InvalidParameter(format!(
                "缺少採購單價: 原料 {}, 期間 {}",
                material_id, period
            ))
        })
    }

    /// 檢查單價表是否完整覆蓋指定原料與時界，且單價非負
    pub fn validate<'a>(
        &self,
        material_ids: impl IntoIterator<Item = &'a str>,
        horizon: &Horizon,
    ) -> Result<()> {
        let mut expected = 0usize;

        for material_id in material_ids {
            expected += 1;
            let len = self.prices.get(material_id).map_or(0, Vec::len);
            if len > horizon.len() {
                return Err(BlendError::InvalidParameter(format!(
                    "採購單價超出計劃時界: 原料 {} 有 {} 期單價，時界只有 {} 期",
                    material_id,
                    len,
                    horizon.len()
                )));
            }
            for period in horizon.periods() {
                let price = self.require(material_id, period)?;
                if price < Decimal::ZERO {
                    return Err(BlendError::InvalidParameter(format!(
                        "採購單價不可為負: 原料 {}, 期間 {}, 單價 {}",
                        material_id, period, price
                    )));
                }
            }
        }

        if self.prices.len() != expected {
            return Err(BlendError::InvalidParameter(format!(
                "單價表包含 {} 個原料，但配置只有 {} 個原料",
                self.prices.len(),
                expected
            )));
        }

        Ok(())
    }
}
