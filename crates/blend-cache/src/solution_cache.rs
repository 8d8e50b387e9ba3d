//! 情境求解結果緩存

use blend_core::{PlanningConfig, Result, ScenarioParameters, Solution};
use std::collections::HashMap;
use std::sync::Arc;

/// 命中統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// 命中率；尚未查詢時為 0
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// 以完整情境參數為鍵的求解結果緩存
///
/// 求解是純函數，相同參數必得相同計劃，因此可直接重用。
/// 錯誤結果不寫入緩存。
pub struct SolutionCache {
    entries: HashMap<ScenarioParameters, Arc<Solution>>,
    stats: CacheStats,
}

impl SolutionCache {
    /// 創建空緩存
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// 查詢緩存（計入命中統計）
    pub fn get(&mut self, params: &ScenarioParameters) -> Option<Arc<Solution>> {
        match self.entries.get(params) {
            Some(solution) => {
                self.stats.hits += 1;
                Some(Arc::clone(solution))
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// 寫入求解結果
    pub fn insert(&mut self, params: ScenarioParameters, solution: Solution) -> Arc<Solution> {
        let solution = Arc::new(solution);
        self.entries.insert(params, Arc::clone(&solution));
        solution
    }

    /// 命中則回傳緩存，否則以 `solve` 求解並寫入
    pub fn get_or_solve<F>(&mut self, params: &ScenarioParameters, solve: F) -> Result<Arc<Solution>>
    where
        F: FnOnce(&ScenarioParameters) -> Result<Solution>,
    {
        if let Some(solution) = self.get(params) {
            tracing::debug!("緩存命中：銷售單價 {}", params.sell_price);
            return Ok(solution);
        }

        tracing::debug!("緩存未命中：銷售單價 {}", params.sell_price);
        let solution = solve(params)?;
        Ok(self.insert(params.clone(), solution))
    }

    /// 以預設後端建模求解
    pub fn solve(&mut self, params: &ScenarioParameters) -> Result<Arc<Solution>> {
        self.get_or_solve(params, blend_optimizer::build_and_solve)
    }

    /// 移除使用指定配置的所有情境，回傳移除數量
    pub fn invalidate_config(&mut self, config: &PlanningConfig) -> usize {
        let before = self.entries.len();
        self.entries.retain(|params, _| &params.config != config);
        before - self.entries.len()
    }

    /// 緩存中的情境數量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// 清除所有緩存與統計
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }
}

impl Default for SolutionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blend_core::{BlendError, RefiningLine};
    use rust_decimal::Decimal;

    fn params(price: i64) -> ScenarioParameters {
        ScenarioParameters::new(Decimal::from(price))
    }

    #[test]
    fn test_second_lookup_hits() {
        let mut cache = SolutionCache::new();
        let mut solves = 0;

        let first = cache
            .get_or_solve(&params(150), |p| {
                solves += 1;
                blend_optimizer::build_and_solve(p)
            })
            .unwrap();
        let second = cache
            .get_or_solve(&params(150), |_| panic!("不應重新求解"))
            .unwrap();

        assert_eq!(solves, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        assert_eq!(cache.stats().hit_rate(), 0.5);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let mut cache = SolutionCache::new();

        let result = cache.get_or_solve(&params(150), |_| {
            Err(BlendError::SolverFailure("boom".to_string()))
        });

        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_equal_prices_share_entry() {
        let mut cache = SolutionCache::new();
        cache.solve(&params(0)).unwrap();

        // 0 與 0.0 是同一個單價
        let same = ScenarioParameters::new(Decimal::new(0, 1));
        assert!(cache.get(&same).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_config() {
        let mut cache = SolutionCache::new();
        let tight = blend_core::PlanningConfig::reference()
            .with_line_capacity(RefiningLine::Veg, Decimal::from(100));

        cache.solve(&params(0)).unwrap();
        cache.solve(&params(0).with_config(tight.clone())).unwrap();
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.invalidate_config(&tight), 1);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
