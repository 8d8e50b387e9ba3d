//! 與求解器無關的線性規劃模型
//!
//! 模型只是資料：變數（含上下界）、線性約束與線性目標函數。
//! 具體求解器後端透過 [`crate::solver::LpSolver`] 轉譯此結構。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 變數代號（模型內的索引）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VarId(usize);

impl VarId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// 變數定義
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDef {
    /// 變數名稱（診斷用）
    pub name: String,
    /// 下界
    pub lower: f64,
    /// 上界（None 表示無上界）
    pub upper: Option<f64>,
}

/// 線性表示式：Σ 係數·變數 + 常數
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, f64)>,
    pub constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// 單一變數
    pub fn var(var: VarId) -> Self {
        Self::new().plus(1.0, var)
    }

    /// 建構器模式：加上 係數·變數
    pub fn plus(mut self, coefficient: f64, var: VarId) -> Self {
        self.add_term(coefficient, var);
        self
    }

    /// 建構器模式：減去 係數·變數
    pub fn minus(self, coefficient: f64, var: VarId) -> Self {
        self.plus(-coefficient, var)
    }

    /// 加上 係數·變數；係數為零時略過
    pub fn add_term(&mut self, coefficient: f64, var: VarId) {
        if coefficient != 0.0 {
            self.terms.push((var, coefficient));
        }
    }

    /// 以變數值計算表示式
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(var, coefficient)| coefficient * values.get(var.0).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }
}

/// 約束關係
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    /// 等於 (=)
    Eq,
    /// 小於等於 (<=)
    Le,
    /// 大於等於 (>=)
    Ge,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Eq => "=",
            Relation::Le => "<=",
            Relation::Ge => ">=",
        })
    }
}

/// 線性約束：`expr (relation) rhs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// 約束名稱（診斷用）
    pub name: String,
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

impl LinearConstraint {
    /// 以變數值檢查約束是否成立
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.relation {
            Relation::Eq => (lhs - self.rhs).abs() <= tolerance,
            Relation::Le => lhs <= self.rhs + tolerance,
            Relation::Ge => lhs >= self.rhs - tolerance,
        }
    }
}

/// 最佳化方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// 線性規劃模型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpModel {
    /// 模型名稱
    pub name: String,
    pub sense: Sense,
    pub variables: Vec<VariableDef>,
    pub constraints: Vec<LinearConstraint>,
    pub objective: LinearExpr,
}

impl LpModel {
    /// 創建空模型
    pub fn new(name: impl Into<String>, sense: Sense) -> Self {
        Self {
            name: name.into(),
            sense,
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: LinearExpr::new(),
        }
    }

    /// 新增變數並回傳代號
    pub fn add_variable(&mut self, name: impl Into<String>, lower: f64, upper: Option<f64>) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(VariableDef {
            name: name.into(),
            lower,
            upper,
        });
        id
    }

    /// 新增約束
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        expr: LinearExpr,
        relation: Relation,
        rhs: f64,
    ) {
        self.constraints.push(LinearConstraint {
            name: name.into(),
            expr,
            relation,
            rhs,
        });
    }

    /// 設置目標函數
    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    pub fn variable(&self, id: VarId) -> Option<&VariableDef> {
        self.variables.get(id.0)
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// 列出在給定變數值下不成立的約束名稱（含變數上下界）
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<String> {
        let mut violated: Vec<String> = self
            .constraints
            .iter()
            .filter(|c| !c.is_satisfied(values, tolerance))
            .map(|c| c.name.clone())
            .collect();

        for (i, def) in self.variables.iter().enumerate() {
            let value = values.get(i).copied().unwrap_or(0.0);
            let below = value < def.lower - tolerance;
            let above = def.upper.map_or(false, |upper| value > upper + tolerance);
            if below || above {
                violated.push(format!("bound:{}", def.name));
            }
        }

        violated
    }
}
