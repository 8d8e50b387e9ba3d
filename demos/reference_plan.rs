//! 參考情境調合計劃示例
//!
//! 用法：`cargo run --example reference_plan -- [銷售單價] [配置 JSON 路徑]`

use anyhow::Context;
use blend::{PlanningCalculator, PlanningConfig, ScenarioParameters, WarningSeverity};
use rust_decimal::Decimal;
use std::str::FromStr;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut args = std::env::args().skip(1);
    let sell_price = match args.next() {
        Some(raw) => Decimal::from_str(&raw).with_context(|| format!("無法解析銷售單價: {}", raw))?,
        None => Decimal::from(150),
    };
    let config = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("無法讀取配置檔: {}", path))?;
            PlanningConfig::from_json_str(&json)?
        }
        None => PlanningConfig::reference(),
    };

    println!("=== 調合生產計劃（銷售單價 {}）===\n", sell_price);

    let params = ScenarioParameters::new(sell_price).with_config(config);
    let result = PlanningCalculator::new().calculate(&params)?;
    let plan = &result.solution;

    println!("利潤: {:.2}", plan.profit);
    println!(
        "  收入 {:.2} / 採購 {:.2} / 持有 {:.2}\n",
        plan.breakdown.sales_revenue, plan.breakdown.purchase_cost, plan.breakdown.holding_cost
    );

    println!("各期產量:");
    for (period, quantity) in &plan.produce_per_period {
        println!("  {}: {:.2}", period, quantity);
    }

    println!("\n採購 / 投入 / 期末庫存:");
    for material in &params.config.materials {
        let row = |table: &blend::MaterialPeriodTable| {
            table
                .row(&material.id)
                .unwrap_or_default()
                .iter()
                .map(|v| format!("{:8.2}", v))
                .collect::<Vec<_>>()
                .join(" ")
        };
        println!("  {:<5} buy   {}", material.id, row(&plan.buy));
        println!("  {:<5} use   {}", material.id, row(&plan.usage));
        println!("  {:<5} store {}", material.id, row(&plan.closing_stock));
    }

    if !result.warnings.is_empty() {
        println!("\n提示:");
        for warning in &result.warnings {
            let level = match warning.severity {
                WarningSeverity::Info => "INFO",
                WarningSeverity::Warning => "WARN",
                WarningSeverity::Error => "ERROR",
            };
            println!("  [{}] {}: {}", level, warning.subject, warning.message);
        }
    }

    Ok(())
}
