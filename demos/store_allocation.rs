//! 門市配貨完整範例
//!
//! 展示從需求列到配貨記錄、再到採購需求的完整計算流程

use repl_calc::{AllocationEngine, PurchaseNeedCalculator};
use repl_core::*;
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("===== Store Allocation Example =====\n");

    // 步驟 1: 建立配置（標準區間集，三個矩陣一起播種）
    println!("[1] Build Allocation Config");
    let config = AllocationConfig::new(BandSet::standard())
        .with_classification(
            "A",
            ClassificationParams::new(Decimal::from(4), Decimal::from(3), Decimal::from(500)),
        )
        .with_classification(
            "B",
            ClassificationParams::new(Decimal::from(6), Decimal::from(2), Decimal::from(200)),
        );
    println!("    Bands: {:?}", config.bands.labels());
    println!("    Max store cover: {}\n", config.max_store_cover);

    // 步驟 2: 建立需求列
    println!("[2] Create Demand Rows");
    let demands = vec![
        DemandRow::new(
            "DEPOT-01".to_string(),
            "STORE-001".to_string(),
            "SHIRT-RED".to_string(),
            "A".to_string(),
            Decimal::from(11),
            Decimal::from(4),
        )
        .with_store_cover(Decimal::from(2)),
        DemandRow::new(
            "DEPOT-01".to_string(),
            "STORE-002".to_string(),
            "SHIRT-RED".to_string(),
            "A".to_string(),
            Decimal::from(30),
            Decimal::from(30),
        )
        .with_store_cover(Decimal::from(3)),
        DemandRow::new(
            "DEPOT-01".to_string(),
            "STORE-003".to_string(),
            "JACKET-BLUE".to_string(),
            "B".to_string(),
            Decimal::from(8),
            Decimal::from(2),
        )
        .with_in_transit(Decimal::from(5))
        .with_store_cover(Decimal::from(1)),
    ];
    for row in &demands {
        println!(
            "    {} @ {}: weekly {} on-hand {}",
            row.product_id, row.store_id, row.weekly_sales, row.current_stock
        );
    }
    println!();

    // 步驟 3: 倉庫庫存
    println!("[3] Depot Stock");
    let stock = vec![
        DepotStock::new(
            "DEPOT-01".to_string(),
            "SHIRT-RED".to_string(),
            Decimal::from(100),
        ),
        DepotStock::new(
            "DEPOT-01".to_string(),
            "JACKET-BLUE".to_string(),
            Decimal::ZERO,
        ),
    ];
    for entry in &stock {
        println!("    {}: {}", entry.product_id, entry.quantity);
    }
    println!();

    // 步驟 4: 執行配貨
    println!("[4] Run Allocation");
    let engine = AllocationEngine::new(config.clone());
    let result = engine.allocate(&demands, &stock)?;
    println!(
        "    Completed in {} ms\n",
        result.calculation_time_ms.unwrap_or(0)
    );

    // 步驟 5: 配貨記錄
    println!("[5] Shipment Records: {}", result.shipments.len());
    for record in &result.shipments {
        println!(
            "    - Tier {} | {} → {} | {} | band {}×{} | mult {} | qty {}",
            record.tier.as_u8(),
            record.depot_id,
            record.store_id,
            record.product_id,
            record.store_band,
            record.product_band,
            record.multiplier,
            record.quantity
        );
    }
    println!();

    // 步驟 6: 配貨後池狀態
    println!("[6] Final Depot Stock");
    for entry in &result.final_stock {
        println!("    {}: {}", entry.product_id, entry.quantity);
    }
    println!();

    // 步驟 7: 採購需求（池耗盡且仍有未滿足需求）
    println!("[7] Purchase Need");
    let purchase_rows =
        PurchaseNeedCalculator::calculate(&demands, &result.totals, &result.final_stock, &config)?;
    if purchase_rows.is_empty() {
        println!("    (none)");
    }
    for row in &purchase_rows {
        println!(
            "    - {} {} | residual {} | mult {} | order qty {}",
            row.depot_id, row.product_id, row.residual_need, row.purchase_multiplier, row.quantity
        );
    }

    if !result.warnings.is_empty() {
        println!("\n    Warnings:");
        for warning in &result.warnings {
            println!("      - [{}] {}", warning.scope, warning.message);
        }
    }

    println!("\n===== Allocation Complete =====\n");

    Ok(())
}
