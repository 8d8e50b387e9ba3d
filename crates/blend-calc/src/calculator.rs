//! 調合計劃主計算器

use blend_core::{RefiningLine, Result, ScenarioParameters, Solution};
use blend_optimizer::{GoodLpSolver, LpSolver, PlanningModel};
use rust_decimal::prelude::ToPrimitive;

use crate::audit::SolutionAuditor;
use crate::{PlanResult, PlanWarning};

/// 調合計劃計算器
pub struct PlanningCalculator {
    /// 線性規劃後端
    solver: Box<dyn LpSolver>,

    /// 求解後的稽核器
    auditor: SolutionAuditor,
}

impl PlanningCalculator {
    /// 以預設後端創建計算器
    pub fn new() -> Self {
        Self::with_solver(Box::new(GoodLpSolver::new()))
    }

    /// 以指定後端創建計算器
    pub fn with_solver(solver: Box<dyn LpSolver>) -> Self {
        Self {
            solver,
            auditor: SolutionAuditor::default(),
        }
    }

    /// 建構器模式：替換稽核器
    pub fn with_auditor(mut self, auditor: SolutionAuditor) -> Self {
        self.auditor = auditor;
        self
    }

    /// 主計算入口
    pub fn calculate(&self, params: &ScenarioParameters) -> Result<PlanResult> {
        tracing::info!(
            "開始調合計劃計算：銷售單價 {}，原料 {} 種，期間 {} 期",
            params.sell_price,
            params.config.materials.len(),
            params.config.horizon.len()
        );

        let start_time = std::time::Instant::now();

        // Step 1: 建模（含參數檢查）
        tracing::debug!("Step 1: 建模");
        let model = PlanningModel::build(params)?;

        // Step 2: 求解
        tracing::debug!("Step 2: 求解（後端 {}）", self.solver.name());
        let solution = blend_optimizer::solve_with(&model, self.solver.as_ref())?;

        // Step 3: 稽核
        tracing::debug!("Step 3: 稽核求解結果");
        let mut result = PlanResult::new(solution);
        for finding in self.auditor.audit(&result.solution, &params.config) {
            tracing::warn!("稽核未通過: {}", finding);
            let subject = finding
                .subject
                .clone()
                .unwrap_or_else(|| finding.invariant.to_string());
            result.add_warning(PlanWarning::error(subject, finding.to_string()));
        }

        // Step 4: 計劃摘要
        tracing::debug!("Step 4: 產生計劃摘要");
        for warning in Self::summarize(&result.solution, params) {
            result.add_warning(warning);
        }

        let elapsed = start_time.elapsed();
        result.calculation_time_ms = Some(elapsed.as_millis());

        tracing::info!(
            "調合計劃計算完成：利潤 {:.2}，總產量 {:.2}，耗時 {:?}",
            result.solution.profit,
            result.solution.total_produce(),
            elapsed
        );

        Ok(result)
    }

    /// 停產期間（Info）與滿載精製線（Warning）的提示
    fn summarize(solution: &Solution, params: &ScenarioParameters) -> Vec<PlanWarning> {
        let mut warnings = Vec::new();

        let idle = solution.idle_periods();
        if idle.len() == params.config.horizon.len() {
            warnings.push(PlanWarning::info(
                "plan".to_string(),
                format!("銷售單價 {} 下全時界停產", params.sell_price),
            ));
        } else {
            for period in idle {
                warnings.push(PlanWarning::info(period.to_string(), "本期停產".to_string()));
            }
        }

        for line in RefiningLine::ALL {
            let Some(capacity) = params.config.capacity_of(line).and_then(|c| c.to_f64()) else {
                continue;
            };
            if capacity <= 0.0 {
                continue;
            }
            let full: Vec<String> = params
                .config
                .horizon
                .periods()
                .filter(|&period| {
                    let used: f64 = params
                        .config
                        .materials_on(line)
                        .map(|m| solution.usage.get(&m.id, period).unwrap_or(0.0))
                        .sum();
                    used >= capacity * (1.0 - 1e-9)
                })
                .map(|period| period.to_string())
                .collect();

            if !full.is_empty() {
                warnings.push(PlanWarning::warning(
                    line.to_string(),
                    format!("精製線滿載期間: {}", full.join(", ")),
                ));
            }
        }

        warnings
    }
}

impl Default for PlanningCalculator {
    fn default() -> Self {
        Self::new()
    }
}
