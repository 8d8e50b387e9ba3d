//! 調合計劃配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::inventory::StockPolicy;
use crate::material::{Material, RefiningLine};
use crate::period::Horizon;
use crate::price::PurchasePriceTable;
use crate::{BlendError, Result};

/// 每期調合硬度的加權平均允許區間
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HardnessBand {
    /// 下限
    pub lower: Decimal,
    /// 上限
    pub upper: Decimal,
}

impl HardnessBand {
    /// 創建新的硬度區間
    pub fn new(lower: Decimal, upper: Decimal) -> Self {
        Self { lower, upper }
    }
}

/// 調合計劃配置（除銷售單價外的所有固定業務數據）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// 原料清單（順序即輸出順序）
    pub materials: Vec<Material>,

    /// 計劃時界
    pub horizon: Horizon,

    /// 採購單價表
    pub purchase_prices: PurchasePriceTable,

    /// 預設庫存政策（適用所有原料）
    pub stock_policy: StockPolicy,

    /// 個別原料的庫存政策覆寫
    #[serde(default)]
    pub stock_overrides: BTreeMap<String, StockPolicy>,

    /// 各精製線每期產能上限
    pub line_capacity: BTreeMap<RefiningLine, Decimal>,

    /// 調合硬度區間
    pub hardness_band: HardnessBand,
}

impl PlanningConfig {
    /// 創建新的配置
    pub fn new(
        materials: Vec<Material>,
        horizon: Horizon,
        purchase_prices: PurchasePriceTable,
        stock_policy: StockPolicy,
        hardness_band: HardnessBand,
    ) -> Self {
        Self {
            materials,
            horizon,
            purchase_prices,
            stock_policy,
            stock_overrides: BTreeMap::new(),
            line_capacity: BTreeMap::new(),
            hardness_band,
        }
    }

    /// 參考情境的固定業務數據
    ///
    /// 5 種原料、6 個期間，期初庫存 500、期末最低 500、庫存上限 1000、
    /// 持有成本 5，VEG 線產能 200、NONVEG 線產能 250，硬度區間 [3, 6]。
    pub fn reference() -> Self {
        fn d(value: i64) -> Decimal {
            Decimal::from(value)
        }

        let materials = vec![
            Material::new("VEG1", Decimal::new(88, 1), RefiningLine::Veg),
            Material::new("VEG2", Decimal::new(61, 1), RefiningLine::Veg),
            Material::new("OIL1", Decimal::new(20, 1), RefiningLine::NonVeg),
            Material::new("OIL2", Decimal::new(42, 1), RefiningLine::NonVeg),
            Material::new("OIL3", Decimal::new(50, 1), RefiningLine::NonVeg),
        ];

        let row = |prices: [i64; 6]| prices.iter().copied().map(d).collect::<Vec<_>>();
        let purchase_prices = PurchasePriceTable::new()
            .with_row("VEG1", row([110, 130, 110, 120, 100, 90]))
            .with_row("VEG2", row([120, 130, 140, 110, 120, 100]))
            .with_row("OIL1", row([130, 110, 130, 120, 150, 140]))
            .with_row("OIL2", row([110, 90, 100, 120, 110, 80]))
            .with_row("OIL3", row([115, 115, 95, 125, 105, 135]));

        Self::new(
            materials,
            Horizon::new(6),
            purchase_prices,
            StockPolicy::new(d(500), d(500), d(1000), d(5)),
            HardnessBand::new(d(3), d(6)),
        )
        .with_line_capacity(RefiningLine::Veg, d(200))
        .with_line_capacity(RefiningLine::NonVeg, d(250))
    }

    /// 建構器模式：設置精製線產能
    pub fn with_line_capacity(mut self, line: RefiningLine, capacity: Decimal) -> Self {
        self.line_capacity.insert(line, capacity);
        self
    }

    /// 建構器模式：設置預設庫存政策
    pub fn with_stock_policy(mut self, policy: StockPolicy) -> Self {
        self.stock_policy = policy;
        self
    }

    /// 建構器模式：覆寫單一原料的庫存政策
    pub fn with_stock_override(mut self, material_id: impl Into<String>, policy: StockPolicy) -> Self {
        self.stock_overrides.insert(material_id.into(), policy);
        self
    }

    /// 建構器模式：設置硬度區間
    pub fn with_hardness_band(mut self, band: HardnessBand) -> Self {
        self.hardness_band = band;
        self
    }

    /// 建構器模式：替換採購單價表
    pub fn with_purchase_prices(mut self, prices: PurchasePriceTable) -> Self {
        self.purchase_prices = prices;
        self
    }

    /// 取得原料適用的庫存政策（覆寫優先）
    pub fn stock_policy_for(&self, material_id: &str) -> &StockPolicy {
        self.stock_overrides
            .get(material_id)
            .unwrap_or(&self.stock_policy)
    }

    /// 取得精製線產能
    pub fn capacity_of(&self, line: RefiningLine) -> Option<Decimal> {
        self.line_capacity.get(&line).copied()
    }

    /// 屬於指定精製線的原料
    pub fn materials_on(&self, line: RefiningLine) -> impl Iterator<Item = &Material> {
        self.materials.iter().filter(move |m| m.is_on_line(line))
    }

    /// 檢查配置完整性與非負性
    pub fn validate(&self) -> Result<()> {
        if self.materials.is_empty() {
            return Err(BlendError::InvalidParameter("原料清單為空".to_string()));
        }

        if self.horizon.is_empty() {
            return Err(BlendError::InvalidParameter("計劃時界長度為 0".to_string()));
        }

        let mut seen = HashSet::new();
        for material in &self.materials {
            if !seen.insert(material.id.as_str()) {
                return Err(BlendError::InvalidParameter(format!(
                    "原料ID重複: {}",
                    material.id
                )));
            }

            if material.hardness < Decimal::ZERO {
                return Err(BlendError::InvalidParameter(format!(
                    "硬度不可為負: 原料 {}, 硬度 {}",
                    material.id, material.hardness
                )));
            }

            match self.capacity_of(material.line) {
                Some(capacity) if capacity < Decimal::ZERO => {
                    return Err(BlendError::InvalidParameter(format!(
                        "精製線產能不可為負: {} = {}",
                        material.line, capacity
                    )));
                }
                Some(_) => {}
                None => {
                    return Err(BlendError::InvalidParameter(format!(
                        "精製線 {} 未設定產能（原料 {}）",
                        material.line, material.id
                    )));
                }
            }

            self.stock_policy_for(&material.id).validate(&material.id)?;
        }

        if let Some(unknown) = self.stock_overrides.keys().find(|id| !seen.contains(id.as_str())) {
            return Err(BlendError::InvalidParameter(format!(
                "庫存政策覆寫指向未知原料: {}",
                unknown
            )));
        }

        if self.hardness_band.lower < Decimal::ZERO || self.hardness_band.upper < Decimal::ZERO {
            return Err(BlendError::InvalidParameter(format!(
                "硬度區間不可為負: [{}, {}]",
                self.hardness_band.lower, self.hardness_band.upper
            )));
        }

        self.purchase_prices
            .validate(self.materials.iter().map(|m| m.id.as_str()), &self.horizon)
    }

    /// 從 JSON 字串載入配置
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 輸出為 JSON 字串
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self::reference()
    }
}
