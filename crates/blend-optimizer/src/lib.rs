//! # Blend Optimizer
//!
//! 線性規劃建模與求解（模型描述與求解器後端分離）

pub mod lp;
pub mod model;
pub mod solver;

// Re-export 主要類型
pub use lp::{LinearConstraint, LinearExpr, LpModel, Relation, Sense, VarId, VariableDef};
pub use model::{DecisionVariables, PlanningModel, VarGrid};
pub use solver::{GoodLpSolver, LpSolution, LpSolver};

use blend_core::{Result, ScenarioParameters, Solution};

/// 以預設後端求解已建好的模型
pub fn solve(model: &PlanningModel) -> Result<Solution> {
    solve_with(model, &GoodLpSolver)
}

/// 以指定後端求解已建好的模型
///
/// 不可行或無界時直接回傳錯誤，不產生部分解。
pub fn solve_with<S: LpSolver + ?Sized>(model: &PlanningModel, solver: &S) -> Result<Solution> {
    tracing::debug!(
        "求解模型 {}（後端 {}，銷售單價 {}）",
        model.lp().name,
        solver.name(),
        model.params().sell_price
    );

    let raw = solver.solve(model.lp())?;
    let solution = model.extract(&raw)?;

    tracing::debug!("求解完成，目標值 {:.4}", solution.profit);
    Ok(solution)
}

/// 建模並求解單一情境
pub fn build_and_solve(params: &ScenarioParameters) -> Result<Solution> {
    let model = PlanningModel::build(params)?;
    solve(&model)
}
