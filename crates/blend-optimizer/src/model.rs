//! 多期調合生產計劃模型
//!
//! 將情境參數轉譯成線性規劃：
//!
//! - 變數：每個 (原料, 期間) 的採購、投入、期初庫存、期末庫存，以及每期產量
//! - 約束：期初庫存、期末下限、庫存結轉、流量守恆、產量平衡、硬度區間、精製線產能
//! - 目標：最大化 銷售收入 - 採購成本 - 持有成本

use blend_core::solution::snap_to_zero;
use blend_core::{
    BlendError, Horizon, MaterialPeriodTable, Period, ProfitBreakdown, RefiningLine, Result,
    ScenarioParameters, Solution,
};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::lp::{LinearExpr, LpModel, Relation, Sense, VarId};
use crate::solver::LpSolution;

/// 模型名稱
pub const MODEL_NAME: &str = "food_manufacture";

/// (原料, 期間) → 變數代號 的稠密對照表
#[derive(Debug, Clone, PartialEq)]
pub struct VarGrid {
    width: usize,
    ids: Vec<VarId>,
}

impl VarGrid {
    /// 取得第 `row` 個原料在期間的變數
    pub fn at(&self, row: usize, period: Period) -> VarId {
        self.ids[row * self.width + period.offset()]
    }

    /// 所有變數（列優先）
    pub fn ids(&self) -> &[VarId] {
        &self.ids
    }
}

/// 模型中所有決策變數的對照
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionVariables {
    pub buy: VarGrid,
    pub usage: VarGrid,
    pub opening_stock: VarGrid,
    pub closing_stock: VarGrid,
    /// 依期間順序
    pub produce: Vec<VarId>,
}

/// 建模時使用的數值參數（已轉為 f64）
#[derive(Debug, Clone, PartialEq)]
struct NumericParams {
    sell_price: f64,
    hardness: Vec<f64>,
    /// 列優先：`prices[m * N + t]`
    prices: Vec<f64>,
    initial_stock: Vec<f64>,
    min_ending_stock: Vec<f64>,
    stock_capacity: Vec<f64>,
    holding_cost: Vec<f64>,
    hardness_lower: f64,
    hardness_upper: f64,
    line_capacity: Vec<(RefiningLine, f64)>,
}

fn to_f64(value: Decimal, what: &str) -> Result<f64> {
    value
        .to_f64()
        .ok_or_else(|| BlendError::InvalidParameter(format!("{} 無法轉換為浮點數: {}", what, value)))
}

/// 已建好的規劃模型（純資料，無副作用）
#[derive(Debug, Clone)]
pub struct PlanningModel {
    params: ScenarioParameters,
    lp: LpModel,
    vars: DecisionVariables,
    numeric: NumericParams,
}

impl PlanningModel {
    /// 由情境參數建立線性規劃模型
    ///
    /// 單價缺漏或需非負的參數為負時回傳 [`BlendError::InvalidParameter`]。
    pub fn build(params: &ScenarioParameters) -> Result<Self> {
        params.validate()?;

        let config = &params.config;
        let horizon = config.horizon;
        let n_periods = horizon.len();
        let n_materials = config.materials.len();

        let numeric = Self::numeric_params(params)?;
        let mut lp = LpModel::new(MODEL_NAME, Sense::Maximize);

        // 決策變數
        let grid = |lp: &mut LpModel, prefix: &str, capped: bool| -> VarGrid {
            let mut ids = Vec::with_capacity(n_materials * n_periods);
            for (row, material) in config.materials.iter().enumerate() {
                let upper = capped.then(|| numeric.stock_capacity[row]);
                for period in horizon.periods() {
                    ids.push(lp.add_variable(
                        format!("{}[{}][{}]", prefix, material.id, period.index()),
                        0.0,
                        upper,
                    ));
                }
            }
            VarGrid {
                width: n_periods,
                ids,
            }
        };

        let buy = grid(&mut lp, "buy", false);
        let usage = grid(&mut lp, "use", false);
        let opening_stock = grid(&mut lp, "opening_stock", true);
        let closing_stock = grid(&mut lp, "closing_stock", true);
        let produce: Vec<VarId> = horizon
            .periods()
            .map(|period| lp.add_variable(format!("produce[{}]", period.index()), 0.0, None))
            .collect();

        let vars = DecisionVariables {
            buy,
            usage,
            opening_stock,
            closing_stock,
            produce,
        };

        Self::add_inventory_constraints(&mut lp, params, &numeric, &vars, &horizon)?;
        Self::add_period_constraints(&mut lp, params, &numeric, &vars, &horizon);
        lp.set_objective(Self::objective(&numeric, &vars, &horizon, n_materials));

        tracing::debug!(
            "模型建立完成: 變數 {} 個，約束 {} 條",
            lp.num_variables(),
            lp.num_constraints()
        );

        Ok(Self {
            params: params.clone(),
            lp,
            vars,
            numeric,
        })
    }

    fn numeric_params(params: &ScenarioParameters) -> Result<NumericParams> {
        let config = &params.config;
        let mut numeric = NumericParams {
            sell_price: to_f64(params.sell_price, "銷售單價")?,
            hardness: Vec::with_capacity(config.materials.len()),
            prices: Vec::with_capacity(config.materials.len() * config.horizon.len()),
            initial_stock: Vec::new(),
            min_ending_stock: Vec::new(),
            stock_capacity: Vec::new(),
            holding_cost: Vec::new(),
            hardness_lower: to_f64(config.hardness_band.lower, "硬度下限")?,
            hardness_upper: to_f64(config.hardness_band.upper, "硬度上限")?,
            line_capacity: Vec::new(),
        };

        for material in &config.materials {
            numeric.hardness.push(to_f64(material.hardness, "硬度")?);
            for period in config.horizon.periods() {
                let price = config.purchase_prices.require(&material.id, period)?;
                numeric.prices.push(to_f64(price, "採購單價")?);
            }

            let policy = config.stock_policy_for(&material.id);
            numeric.initial_stock.push(to_f64(policy.initial_stock, "期初庫存")?);
            numeric.min_ending_stock.push(to_f64(policy.min_ending_stock, "期末最低庫存")?);
            numeric.stock_capacity.push(to_f64(policy.capacity, "庫存上限")?);
            numeric.holding_cost.push(to_f64(policy.holding_cost, "持有成本")?);
        }

        for line in RefiningLine::ALL {
            if let Some(capacity) = config.capacity_of(line) {
                numeric.line_capacity.push((line, to_f64(capacity, "精製線產能")?));
            }
        }

        Ok(numeric)
    }

    /// 約束 1-4：期初庫存、期末下限、庫存結轉、流量守恆
    fn add_inventory_constraints(
        lp: &mut LpModel,
        params: &ScenarioParameters,
        numeric: &NumericParams,
        vars: &DecisionVariables,
        horizon: &Horizon,
    ) -> Result<()> {
        let first = horizon
            .first()
            .ok_or_else(|| BlendError::InvalidParameter("計劃時界長度為 0".to_string()))?;
        let last = horizon
            .last()
            .ok_or_else(|| BlendError::InvalidParameter("計劃時界長度為 0".to_string()))?;

        for (row, material) in params.config.materials.iter().enumerate() {
            if params.config.stock_policy_for(&material.id).ending_floor_exceeds_capacity() {
                tracing::warn!("原料 {} 期末最低庫存超過庫存上限，模型必然不可行", material.id);
            }

            lp.add_constraint(
                format!("initial_stock[{}]", material.id),
                LinearExpr::var(vars.opening_stock.at(row, first)),
                Relation::Eq,
                numeric.initial_stock[row],
            );
            lp.add_constraint(
                format!("final_stock[{}]", material.id),
                LinearExpr::var(vars.closing_stock.at(row, last)),
                Relation::Ge,
                numeric.min_ending_stock[row],
            );

            for period in horizon.periods() {
                if let Some(prev) = period.prev() {
                    // opening[t] - closing[t-1] = 0
                    lp.add_constraint(
                        format!("carry_over[{}][{}]", material.id, period.index()),
                        LinearExpr::var(vars.opening_stock.at(row, period))
                            .minus(1.0, vars.closing_stock.at(row, prev)),
                        Relation::Eq,
                        0.0,
                    );
                }

                // closing - opening - buy + use = 0
                lp.add_constraint(
                    format!("stock_balance[{}][{}]", material.id, period.index()),
                    LinearExpr::var(vars.closing_stock.at(row, period))
                        .minus(1.0, vars.opening_stock.at(row, period))
                        .minus(1.0, vars.buy.at(row, period))
                        .plus(1.0, vars.usage.at(row, period)),
                    Relation::Eq,
                    0.0,
                );
            }
        }

        Ok(())
    }

    /// 約束 5-7：產量平衡、硬度區間、精製線產能
    fn add_period_constraints(
        lp: &mut LpModel,
        params: &ScenarioParameters,
        numeric: &NumericParams,
        vars: &DecisionVariables,
        horizon: &Horizon,
    ) {
        let materials = &params.config.materials;

        for period in horizon.periods() {
            let produce = vars.produce[period.offset()];

            // produce - Σ use = 0
            let mut balance = LinearExpr::var(produce);
            for row in 0..materials.len() {
                balance.add_term(-1.0, vars.usage.at(row, period));
            }
            lp.add_constraint(
                format!("produce_balance[{}]", period.index()),
                balance,
                Relation::Eq,
                0.0,
            );

            // Σ hardness·use - upper·produce <= 0
            // Σ hardness·use - lower·produce >= 0
            let mut blend = LinearExpr::new();
            for (row, hardness) in numeric.hardness.iter().enumerate() {
                blend.add_term(*hardness, vars.usage.at(row, period));
            }
            lp.add_constraint(
                format!("hardness_upper[{}]", period.index()),
                blend.clone().minus(numeric.hardness_upper, produce),
                Relation::Le,
                0.0,
            );
            lp.add_constraint(
                format!("hardness_lower[{}]", period.index()),
                blend.minus(numeric.hardness_lower, produce),
                Relation::Ge,
                0.0,
            );

            for (line, capacity) in &numeric.line_capacity {
                let mut line_usage = LinearExpr::new();
                for (row, material) in materials.iter().enumerate() {
                    if material.is_on_line(*line) {
                        line_usage.add_term(1.0, vars.usage.at(row, period));
                    }
                }
                if line_usage.terms.is_empty() {
                    continue;
                }
                lp.add_constraint(
                    format!("line_capacity[{}][{}]", line, period.index()),
                    line_usage,
                    Relation::Le,
                    *capacity,
                );
            }
        }
    }

    /// 目標：Σ produce·售價 - Σ buy·單價 - Σ closing·持有成本
    fn objective(
        numeric: &NumericParams,
        vars: &DecisionVariables,
        horizon: &Horizon,
        n_materials: usize,
    ) -> LinearExpr {
        let mut objective = LinearExpr::new();
        let width = horizon.len();

        for period in horizon.periods() {
            objective.add_term(numeric.sell_price, vars.produce[period.offset()]);
            for row in 0..n_materials {
                let price = numeric.prices[row * width + period.offset()];
                objective.add_term(-price, vars.buy.at(row, period));
                objective.add_term(-numeric.holding_cost[row], vars.closing_stock.at(row, period));
            }
        }

        objective
    }

    /// 底層線性規劃模型
    pub fn lp(&self) -> &LpModel {
        &self.lp
    }

    /// 決策變數對照
    pub fn variables(&self) -> &DecisionVariables {
        &self.vars
    }

    /// 建模所用的情境參數
    pub fn params(&self) -> &ScenarioParameters {
        &self.params
    }

    /// 將求解器數值轉為結構化結果
    pub fn extract(&self, raw: &LpSolution) -> Result<Solution> {
        if raw.values.len() != self.lp.num_variables() {
            return Err(BlendError::SolverFailure(format!(
                "求解結果變數數量不符: 預期 {}，實際 {}",
                self.lp.num_variables(),
                raw.values.len()
            )));
        }

        let config = &self.params.config;
        let horizon = config.horizon;
        let material_ids: Vec<String> = config.materials.iter().map(|m| m.id.clone()).collect();
        let value = |id: VarId| raw.values[id.index()];

        let fill = |grid: &VarGrid| {
            let mut table = MaterialPeriodTable::zeros(material_ids.clone(), horizon);
            for row in 0..material_ids.len() {
                for period in horizon.periods() {
                    table.set_at(row, period.offset(), value(grid.at(row, period)));
                }
            }
            table
        };

        let buy = fill(&self.vars.buy);
        let usage = fill(&self.vars.usage);
        let opening_stock = fill(&self.vars.opening_stock);
        let closing_stock = fill(&self.vars.closing_stock);

        let produce_per_period: Vec<(Period, f64)> = horizon
            .periods()
            .map(|period| {
                let produced = value(self.vars.produce[period.offset()]);
                (period, snap_to_zero(produced))
            })
            .collect();

        let breakdown = self.breakdown(&produce_per_period, &buy, &closing_stock);

        Ok(Solution {
            run_id: Uuid::new_v4(),
            solved_at: Utc::now(),
            sell_price: self.params.sell_price,
            profit: raw.objective_value,
            breakdown,
            produce_per_period,
            buy,
            usage,
            opening_stock,
            closing_stock,
        })
    }

    fn breakdown(
        &self,
        produce: &[(Period, f64)],
        buy: &MaterialPeriodTable,
        closing_stock: &MaterialPeriodTable,
    ) -> ProfitBreakdown {
        let width = self.params.config.horizon.len();
        let sales_revenue: f64 = produce.iter().map(|(_, q)| q * self.numeric.sell_price).sum();

        let mut purchase_cost = 0.0;
        let mut holding_cost = 0.0;
        for (row, material) in self.params.config.materials.iter().enumerate() {
            if let (Some(bought), Some(held)) = (buy.row(&material.id), closing_stock.row(&material.id)) {
                for offset in 0..width {
                    purchase_cost += bought[offset] * self.numeric.prices[row * width + offset];
                    holding_cost += held[offset] * self.numeric.holding_cost[row];
                }
            }
        }

        ProfitBreakdown {
            sales_revenue,
            purchase_cost,
            holding_cost,
        }
    }
}
