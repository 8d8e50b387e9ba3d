//! # Blend Cache
//!
//! 求解結果緩存

pub mod solution_cache;

// Re-export 主要類型
pub use solution_cache::{CacheStats, SolutionCache};
