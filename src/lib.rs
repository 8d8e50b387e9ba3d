//! # Blend
//!
//! 多期食用油調合生產計劃最佳化
//!
//! ```no_run
//! use rust_decimal::Decimal;
//!
//! let plan = blend::solve(Decimal::from(150)).unwrap();
//! println!("利潤: {:.2}", plan.profit);
//! ```

pub use blend_cache::{CacheStats, SolutionCache};
pub use blend_calc::{
    AuditFinding, Invariant, PlanResult, PlanWarning, PlanningCalculator, PriceSweep,
    SolutionAuditor, SweepPoint, WarningSeverity,
};
pub use blend_core::{
    BlendError, HardnessBand, Horizon, Material, MaterialPeriodTable, Period, PlanningConfig,
    ProfitBreakdown, PurchasePriceTable, RefiningLine, Result, ScenarioParameters, Solution,
    StockPolicy,
};
pub use blend_optimizer::{build_and_solve, GoodLpSolver, LpSolver, PlanningModel};

use rust_decimal::Decimal;

/// 以參考配置求解指定銷售單價的最佳計劃
pub fn solve(sell_price: Decimal) -> Result<Solution> {
    build_and_solve(&ScenarioParameters::new(sell_price))
}
