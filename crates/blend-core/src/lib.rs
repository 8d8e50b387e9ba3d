//! # Blend Core
//!
//! 核心資料模型與類型定義

pub mod config;
pub mod inventory;
pub mod material;
pub mod period;
pub mod price;
pub mod scenario;
pub mod solution;

// Re-export 主要類型
pub use config::{HardnessBand, PlanningConfig};
pub use inventory::StockPolicy;
pub use material::{Material, RefiningLine};
pub use period::{Horizon, Period};
pub use price::PurchasePriceTable;
pub use scenario::ScenarioParameters;
pub use solution::{MaterialPeriodTable, ProfitBreakdown, Solution};

/// 調合計劃錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum BlendError {
    /// 靜態配置缺漏或格式錯誤（建模時拋出）
    #[error("無效的參數: {0}")]
    InvalidParameter(String),

    /// 約束互相矛盾，無可行解（求解時拋出）
    #[error("模型不可行: {0}")]
    InfeasibleModel(String),

    /// 目標函數無上界
    #[error("模型無界: {0}")]
    UnboundedModel(String),

    #[error("求解器錯誤: {0}")]
    SolverFailure(String),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BlendError>;
