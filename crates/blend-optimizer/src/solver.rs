//! 線性規劃求解器後端

use blend_core::{BlendError, Result};
use good_lp::solvers::microlp::microlp;
use good_lp::Solution as _;
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, SolverModel, Variable,
};

use crate::lp::{LinearExpr, LpModel, Relation, Sense};

/// 求解結果（原始數值）
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    /// 最佳目標值
    pub objective_value: f64,
    /// 依 [`crate::lp::VarId`] 索引的變數值
    pub values: Vec<f64>,
}

/// 線性規劃求解器
///
/// 實作必須是無狀態、可重入的：每次呼叫都獨立處理傳入的模型。
pub trait LpSolver: Send + Sync {
    /// 後端名稱（日誌用）
    fn name(&self) -> &'static str;

    /// 求解模型；不可行、無界時分別回傳對應錯誤，不回傳部分解
    fn solve(&self, model: &LpModel) -> Result<LpSolution>;
}

/// 基於 good_lp 的單純形法後端（microlp，純 Rust）
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpSolver;

impl GoodLpSolver {
    pub fn new() -> Self {
        Self
    }

    fn to_expression(expr: &LinearExpr, vars: &[Variable]) -> Result<Expression> {
        let mut out = Expression::default();
        out += expr.constant;
        for (id, coefficient) in &expr.terms {
            let var = vars.get(id.index()).ok_or_else(|| {
                BlendError::InvalidParameter(format!("表示式引用不存在的變數 #{}", id.index()))
            })?;
            out += *var * *coefficient;
        }
        Ok(out)
    }

    fn map_error(model: &LpModel, err: ResolutionError) -> BlendError {
        match err {
            ResolutionError::Infeasible => {
                BlendError::InfeasibleModel(format!("模型 {} 無可行解", model.name))
            }
            ResolutionError::Unbounded => {
                BlendError::UnboundedModel(format!("模型 {} 目標函數無界", model.name))
            }
            other => BlendError::SolverFailure(other.to_string()),
        }
    }
}

impl LpSolver for GoodLpSolver {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(&self, model: &LpModel) -> Result<LpSolution> {
        let mut problem = ProblemVariables::new();
        let vars: Vec<Variable> = model
            .variables
            .iter()
            .map(|def| {
                let mut definition = variable().min(def.lower).name(def.name.clone());
                if let Some(upper) = def.upper {
                    definition = definition.max(upper);
                }
                problem.add(definition)
            })
            .collect();

        let objective = Self::to_expression(&model.objective, &vars)?;
        let unsolved = match model.sense {
            Sense::Maximize => problem.maximise(objective),
            Sense::Minimize => problem.minimise(objective),
        };

        let mut solver = unsolved.using(microlp);
        for c in &model.constraints {
            let lhs = Self::to_expression(&c.expr, &vars)?;
            let rhs = c.rhs;
            solver = match c.relation {
                Relation::Eq => solver.with(constraint!(lhs == rhs)),
                Relation::Le => solver.with(constraint!(lhs <= rhs)),
                Relation::Ge => solver.with(constraint!(lhs >= rhs)),
            };
        }

        let solution = solver.solve().map_err(|err| Self::map_error(model, err))?;

        let values: Vec<f64> = vars.iter().map(|var| solution.value(*var)).collect();
        let objective_value = model.objective.evaluate(&values);

        if !objective_value.is_finite() {
            return Err(BlendError::UnboundedModel(format!(
                "模型 {} 目標值非有限數: {}",
                model.name, objective_value
            )));
        }

        Ok(LpSolution {
            objective_value,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::LinearExpr;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_solve_small_maximization() {
        // max 3x + 2y, x + y <= 4, x + 3y <= 6, x <= 3
        let mut model = LpModel::new("small", Sense::Maximize);
        let x = model.add_variable("x", 0.0, Some(3.0));
        let y = model.add_variable("y", 0.0, None);
        model.add_constraint("c1", LinearExpr::var(x).plus(1.0, y), Relation::Le, 4.0);
        model.add_constraint("c2", LinearExpr::var(x).plus(3.0, y), Relation::Le, 6.0);
        model.set_objective(LinearExpr::new().plus(3.0, x).plus(2.0, y));

        let solution = GoodLpSolver::new().solve(&model).unwrap();

        assert_close(solution.objective_value, 11.0);
        assert_close(solution.values[x.index()], 3.0);
        assert_close(solution.values[y.index()], 1.0);
    }

    #[test]
    fn test_solve_minimization_with_equality() {
        let mut model = LpModel::new("min", Sense::Minimize);
        let x = model.add_variable("x", 0.0, None);
        let y = model.add_variable("y", 0.0, None);
        model.add_constraint("sum", LinearExpr::var(x).plus(1.0, y), Relation::Eq, 10.0);
        model.add_constraint("floor", LinearExpr::var(y), Relation::Ge, 2.0);
        model.set_objective(LinearExpr::new().plus(1.0, x).plus(4.0, y));

        let solution = GoodLpSolver::new().solve(&model).unwrap();

        assert_close(solution.objective_value, 16.0);
        assert!(model.violations(&solution.values, 1e-6).is_empty());
    }

    #[test]
    fn test_infeasible_model() {
        let mut model = LpModel::new("infeasible", Sense::Maximize);
        let x = model.add_variable("x", 0.0, Some(10.0));
        model.add_constraint("floor", LinearExpr::var(x), Relation::Ge, 20.0);
        model.set_objective(LinearExpr::var(x));

        let err = GoodLpSolver::new().solve(&model).unwrap_err();
        assert!(matches!(err, BlendError::InfeasibleModel(_)));
    }

    #[test]
    fn test_unbounded_model() {
        let mut model = LpModel::new("unbounded", Sense::Maximize);
        let x = model.add_variable("x", 0.0, None);
        model.add_constraint("floor", LinearExpr::var(x), Relation::Ge, 1.0);
        model.set_objective(LinearExpr::var(x));

        let err = GoodLpSolver::new().solve(&model).unwrap_err();
        assert!(matches!(err, BlendError::UnboundedModel(_)));
    }
}
