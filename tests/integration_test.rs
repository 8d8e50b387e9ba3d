//! 集成測試

use blend::*;
use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;

/// 參考情境在單價 150 下的已知最佳利潤
const REFERENCE_OPTIMUM: f64 = 107_842.59;

fn p(index: u32) -> Period {
    Period::new(index).unwrap()
}

#[test]
fn test_reference_scenario_at_150() {
    let plan = blend::solve(Decimal::from(150)).unwrap();

    assert!(plan.profit > 0.0);
    assert!(plan.has_production());
    assert!(
        (plan.profit - REFERENCE_OPTIMUM).abs() < 1.0,
        "profit = {}",
        plan.profit
    );
    assert!((plan.breakdown.profit() - plan.profit).abs() < 1e-6);
    assert_eq!(plan.sell_price, Decimal::from(150));
}

#[test]
fn test_zero_price_shuts_down_production() {
    let plan = blend::solve(Decimal::ZERO).unwrap();

    // 5 種原料 × 500 × 持有成本 5 × 6 期
    assert!((plan.profit + 75_000.0).abs() < 1e-6, "profit = {}", plan.profit);
    assert!(plan.produce_per_period.iter().all(|(_, q)| *q == 0.0));
    assert_eq!(plan.buy.total(), 0.0);
    assert_eq!(plan.idle_periods().len(), 6);
}

#[test]
fn test_solution_tables_are_dense() {
    let plan = blend::solve(Decimal::from(150)).unwrap();

    assert_eq!(plan.produce_per_period.len(), 6);
    for (offset, (period, _)) in plan.produce_per_period.iter().enumerate() {
        assert_eq!(period.offset(), offset);
    }
    for table in [&plan.buy, &plan.usage, &plan.opening_stock, &plan.closing_stock] {
        assert_eq!(table.iter().count(), 30);
    }
}

#[test]
fn test_optimal_plan_satisfies_all_invariants() {
    let config = PlanningConfig::reference();
    let plan = blend::solve(Decimal::from(150)).unwrap();

    let findings = SolutionAuditor::default().audit(&plan, &config);
    assert!(findings.is_empty(), "{:?}", findings);

    for material in &config.materials {
        assert!((plan.opening_stock.get(&material.id, p(1)).unwrap() - 500.0).abs() < 1e-6);
        assert!(plan.closing_stock.get(&material.id, p(6)).unwrap() >= 500.0 - 1e-6);
    }

    for period in config.horizon.periods() {
        let produce = plan.produce(period).unwrap();
        let veg: f64 = config
            .materials_on(RefiningLine::Veg)
            .map(|m| plan.usage.get(&m.id, period).unwrap())
            .sum();
        assert!(veg <= 200.0 + 1e-6);
        assert!((produce - plan.usage.period_total(period)).abs() < 1e-6);
    }
}

#[test]
fn test_ending_floor_above_capacity_is_infeasible() {
    let config = PlanningConfig::reference().with_stock_policy(StockPolicy::new(
        Decimal::from(500),
        Decimal::from(1500),
        Decimal::from(1000),
        Decimal::from(5),
    ));
    let params = ScenarioParameters::new(Decimal::from(150)).with_config(config);

    assert!(matches!(
        build_and_solve(&params),
        Err(BlendError::InfeasibleModel(_))
    ));
}

#[test]
fn test_missing_purchase_price_is_invalid() {
    let mut config = PlanningConfig::reference();
    config.purchase_prices.remove_row("OIL3");
    let params = ScenarioParameters::new(Decimal::from(150)).with_config(config);

    assert!(matches!(
        PlanningModel::build(&params),
        Err(BlendError::InvalidParameter(_))
    ));
}

#[rstest]
#[case(0)]
#[case(100)]
#[case(150)]
#[case(300)]
fn test_calculator_plans_pass_audit(#[case] price: i64) {
    let result = PlanningCalculator::new()
        .calculate(&ScenarioParameters::new(Decimal::from(price)))
        .unwrap();

    assert!(!result.has_errors(), "{:?}", result.warnings);
    assert!(result
        .warnings
        .iter()
        .all(|w| w.severity != WarningSeverity::Error));
}

#[test]
fn test_config_round_trips_through_json() {
    let config = PlanningConfig::reference()
        .with_hardness_band(HardnessBand::new(Decimal::from(3), Decimal::new(55, 1)));
    let json = config.to_json_string().unwrap();

    let loaded = PlanningConfig::from_json_str(&json).unwrap();
    let a = build_and_solve(&ScenarioParameters::new(Decimal::from(150)).with_config(config))
        .unwrap();
    let b = build_and_solve(&ScenarioParameters::new(Decimal::from(150)).with_config(loaded))
        .unwrap();

    assert!((a.profit - b.profit).abs() < 1e-6);
    // 收緊硬度上限不可能提高利潤
    assert!(a.profit <= REFERENCE_OPTIMUM + 1.0);
}

#[test]
fn test_cache_reuses_solution() {
    let mut cache = SolutionCache::new();
    let params = ScenarioParameters::new(Decimal::from(150));

    let first = cache.solve(&params).unwrap();
    let second = cache.solve(&params).unwrap();

    assert_eq!(first.run_id, second.run_id);
    assert_eq!(cache.stats().hits, 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_price_sweep_is_monotone() {
    let sweep = PriceSweep::new(PlanningConfig::reference());
    let prices = PriceSweep::price_grid(Decimal::ZERO, Decimal::from(300), Decimal::from(10));

    let points = sweep.run(&prices).unwrap();

    assert_eq!(points.len(), 31);
    assert!(PriceSweep::is_monotone(&points, 1e-6));
    assert_eq!(points[0].profit.round(), -75_000.0);
    assert!(PriceSweep::first_producing_price(&points).is_some());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_profit_weakly_increases_with_price(low in 0u32..250, delta in 1u32..60) {
        let a = blend::solve(Decimal::from(low)).unwrap();
        let b = blend::solve(Decimal::from(low + delta)).unwrap();

        prop_assert!(b.profit >= a.profit - 1e-6 * a.profit.abs().max(1.0));
    }
}
