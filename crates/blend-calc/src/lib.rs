//! # Blend Calculation Engine
//!
//! 調合生產計劃計算引擎：求解、稽核與單價掃描

pub mod audit;
pub mod calculator;
pub mod sweep;

// Re-export 主要類型
pub use audit::{AuditFinding, Invariant, SolutionAuditor};
pub use calculator::PlanningCalculator;
pub use sweep::{PriceSweep, SweepPoint};

use serde::{Deserialize, Serialize};

/// 計劃計算結果
#[derive(Debug, Clone)]
pub struct PlanResult {
    /// 最佳計劃
    pub solution: blend_core::Solution,

    /// 警告信息
    pub warnings: Vec<PlanWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl PlanResult {
    /// 以求解結果創建（尚無警告）
    pub fn new(solution: blend_core::Solution) -> Self {
        Self {
            solution,
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: PlanWarning) {
        self.warnings.push(warning);
    }

    /// 是否有錯誤級別的警告
    pub fn has_errors(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| w.severity == WarningSeverity::Error)
    }
}

/// 計劃警告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanWarning {
    /// 相關對象（原料、精製線或期間）
    pub subject: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl PlanWarning {
    pub fn new(subject: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            subject,
            message,
            severity,
        }
    }

    pub fn info(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Info)
    }

    pub fn warning(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Warning)
    }

    pub fn error(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
