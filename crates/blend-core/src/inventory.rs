//! 庫存政策模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BlendError, Result};

/// 單一原料的庫存政策
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockPolicy {
    /// 期初庫存（第 1 期期初）
    pub initial_stock: Decimal,

    /// 期末最低庫存（最終期期末）
    pub min_ending_stock: Decimal,

    /// 庫存上限（各期期初/期末庫存皆受限）
    pub capacity: Decimal,

    /// 每單位每期持有成本
    pub holding_cost: Decimal,
}

impl StockPolicy {
    /// 創建新的庫存政策
    pub fn new(
        initial_stock: Decimal,
        min_ending_stock: Decimal,
        capacity: Decimal,
        holding_cost: Decimal,
    ) -> Self {
        Self {
            initial_stock,
            min_ending_stock,
            capacity,
            holding_cost,
        }
    }

    /// 建構器模式：設置期初庫存
    pub fn with_initial_stock(mut self, stock: Decimal) -> Self {
        self.initial_stock = stock;
        self
    }

    /// 建構器模式：設置期末最低庫存
    pub fn with_min_ending_stock(mut self, stock: Decimal) -> Self {
        self.min_ending_stock = stock;
        self
    }

    /// 建構器模式：設置庫存上限
    pub fn with_capacity(mut self, capacity: Decimal) -> Self {
        self.capacity = capacity;
        self
    }

    /// 建構器模式：設置持有成本
    pub fn with_holding_cost(mut self, cost: Decimal) -> Self {
        self.holding_cost = cost;
        self
    }

    /// 檢查期末最低庫存是否超過庫存上限（此時模型必然不可行）
    pub fn ending_floor_exceeds_capacity(&self) -> bool {
        self.min_ending_stock > self.capacity
    }

    /// 檢查所有數值非負
    ///
    /// 期初庫存超過上限、期末下限超過上限等矛盾不在此檢查，
    /// 由求解器回報為不可行。
    pub fn validate(&self, material_id: &str) -> Result<()> {
        let fields = [
            ("期初庫存", self.initial_stock),
            ("期末最低庫存", self.min_ending_stock),
            ("庫存上限", self.capacity),
            ("持有成本", self.holding_cost),
        ];

        for (name, value) in fields {
            if value < Decimal::ZERO {
                return Err(BlendError::InvalidParameter(format!(
                    "{}不可為負: 原料 {}, 值 {}",
                    name, material_id, value
                )));
            }
        }

        Ok(())
    }
}
