//! 配貨不變量的隨機測試

use proptest::prelude::*;
use repl_calc::AllocationEngine;
use repl_core::*;
use rust_decimal::Decimal;
use std::collections::HashMap;

fn test_config() -> AllocationConfig {
    AllocationConfig::new(BandSet::standard()).with_classification(
        "A",
        ClassificationParams::new(Decimal::from(4), Decimal::from(3), Decimal::from(37)),
    )
}

/// 隨機需求列：（倉庫、門市、商品、週銷、庫存、門市覆蓋）
fn arb_demand_rows() -> impl Strategy<Value = Vec<(u8, u8, u8, i64, i64, i64)>> {
    prop::collection::vec(
        (0..2u8, 0..6u8, 0..4u8, 0..50i64, 0..100i64, 0..20i64),
        0..24,
    )
}

/// 隨機庫存列（含刻意重複的鍵）
fn arb_stock_rows() -> impl Strategy<Value = Vec<(u8, u8, i64)>> {
    prop::collection::vec((0..2u8, 0..4u8, 0..200i64), 0..10)
}

fn build_inputs(
    demand_seeds: &[(u8, u8, u8, i64, i64, i64)],
    stock_seeds: &[(u8, u8, i64)],
) -> (Vec<DemandRow>, Vec<DepotStock>) {
    let demands = demand_seeds
        .iter()
        .map(|&(depot, store, product, weekly_sales, current_stock, store_cover)| {
            DemandRow::new(
                format!("D{depot}"),
                format!("S{store}"),
                format!("P{product}"),
                "A".to_string(),
                Decimal::from(weekly_sales),
                Decimal::from(current_stock),
            )
            .with_store_cover(Decimal::from(store_cover))
        })
        .collect();

    let stock = stock_seeds
        .iter()
        .map(|&(depot, product, quantity)| {
            DepotStock::new(
                format!("D{depot}"),
                format!("P{product}"),
                Decimal::from(quantity),
            )
        })
        .collect();

    (demands, stock)
}

proptest! {
    #[test]
    fn prop_pool_never_overdrawn(
        demand_seeds in arb_demand_rows(),
        stock_seeds in arb_stock_rows(),
    ) {
        let (demands, stock) = build_inputs(&demand_seeds, &stock_seeds);

        // 期初池餘額（重複鍵加總）
        let mut initial: HashMap<(String, String), Decimal> = HashMap::new();
        for entry in &stock {
            *initial
                .entry((entry.depot_id.clone(), entry.product_id.clone()))
                .or_insert(Decimal::ZERO) += entry.quantity;
        }

        let result = AllocationEngine::new(test_config())
            .allocate(&demands, &stock)
            .unwrap();

        // 兩層配貨合計不得超過期初池餘額
        let mut shipped: HashMap<(String, String), Decimal> = HashMap::new();
        for record in &result.shipments {
            *shipped
                .entry((record.depot_id.clone(), record.product_id.clone()))
                .or_insert(Decimal::ZERO) += record.quantity;
        }

        for (key, total) in &shipped {
            let start = initial.get(key).copied().unwrap_or(Decimal::ZERO);
            prop_assert!(*total <= start, "池 {key:?} 超配: {total} > {start}");
        }

        // 最終池餘額非負且等於 期初 − 已配
        for entry in &result.final_stock {
            prop_assert!(entry.quantity >= Decimal::ZERO);
            let key = (entry.depot_id.clone(), entry.product_id.clone());
            let start = initial.get(&key).copied().unwrap_or(Decimal::ZERO);
            let total = shipped.get(&key).copied().unwrap_or(Decimal::ZERO);
            prop_assert_eq!(entry.quantity, start - total);
        }
    }

    #[test]
    fn prop_shipment_respects_caps(
        demand_seeds in arb_demand_rows(),
        stock_seeds in arb_stock_rows(),
    ) {
        let (demands, stock) = build_inputs(&demand_seeds, &stock_seeds);

        let result = AllocationEngine::new(test_config())
            .allocate(&demands, &stock)
            .unwrap();

        for record in &result.shipments {
            // 單筆不超過上限快照，且為非負整數
            prop_assert!(record.quantity <= record.max_qty);
            prop_assert!(record.quantity > Decimal::ZERO);
            prop_assert_eq!(record.quantity, record.quantity.floor());

            // 第二層記錄的係數必為正（係數 0 的區間對不補足）
            if record.tier == ShipmentTier::MinCompletion {
                prop_assert!(record.multiplier > Decimal::ZERO);
            }
        }
    }

    #[test]
    fn prop_allocation_is_deterministic(
        demand_seeds in arb_demand_rows(),
        stock_seeds in arb_stock_rows(),
    ) {
        let (demands, stock) = build_inputs(&demand_seeds, &stock_seeds);

        let engine = AllocationEngine::new(test_config());
        let first = engine.allocate(&demands, &stock).unwrap();
        let second = engine.allocate(&demands, &stock).unwrap();

        prop_assert_eq!(first.shipments.len(), second.shipments.len());
        for (a, b) in first.shipments.iter().zip(second.shipments.iter()) {
            prop_assert_eq!(&a.depot_id, &b.depot_id);
            prop_assert_eq!(&a.store_id, &b.store_id);
            prop_assert_eq!(&a.product_id, &b.product_id);
            prop_assert_eq!(a.tier, b.tier);
            prop_assert_eq!(a.quantity, b.quantity);
        }
    }
}
