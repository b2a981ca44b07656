//! 採購需求計算

use rayon::prelude::*;
use repl_core::{
    band_for, product_cover, AllocationConfig, DemandRow, DepotStock, PurchaseOrderRow,
    ShipmentTotal,
};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::need::NeedCalculator;

/// 入選列：仍有未滿足需求且倉庫池已耗盡的需求列
#[derive(Debug, Clone)]
struct SelectedRow {
    depot_id: String,
    product_id: String,
    classification_code: String,
    residual_need: Decimal,
    purchase_multiplier: Decimal,
    purchase_qty: Decimal,
    weekly_sales: Decimal,
    depot_balance: Decimal,
    store_band: String,
    product_band: String,
}

/// 採購需求計算器
///
/// 消費原始（未過濾）需求列、配貨彙總與配貨後的池狀態，
/// 推導出無貨可配的未滿足需求並套用採購係數。
pub struct PurchaseNeedCalculator;

impl PurchaseNeedCalculator {
    /// 計算採購需求列
    ///
    /// 無未滿足且池耗盡的需求時返回空結果，不是錯誤。
    pub fn calculate(
        demands: &[DemandRow],
        shipment_totals: &[ShipmentTotal],
        final_stock: &[DepotStock],
        config: &AllocationConfig,
    ) -> repl_core::Result<Vec<PurchaseOrderRow>> {
        tracing::info!(
            "開始採購需求計算：需求 {} 筆，配貨彙總 {} 筆",
            demands.len(),
            shipment_totals.len()
        );

        // 已配數量：（倉庫、門市、商品）→ 數量（缺鍵視為 0）
        let mut shipped: HashMap<(String, String, String), Decimal> = HashMap::new();
        for total in shipment_totals {
            let key = (
                total.depot_id.clone(),
                total.store_id.clone(),
                total.product_id.clone(),
            );
            *shipped.entry(key).or_insert(Decimal::ZERO) += total.quantity;
        }

        // 池餘額：（倉庫、商品）→ 餘額
        let mut balances: HashMap<(String, String), Decimal> = HashMap::new();
        for entry in final_stock {
            let key = (entry.depot_id.clone(), entry.product_id.clone());
            *balances.entry(key).or_insert(Decimal::ZERO) += entry.quantity;
        }

        // 逐列推導（唯讀階段，依倉庫商品池彼此獨立，可安全並行）
        let selected: Vec<SelectedRow> = demands
            .par_iter()
            .filter_map(|row| Self::select_row(row, &shipped, &balances, config))
            .collect();

        tracing::debug!("入選列數: {}", selected.len());

        // 彙總（嚴格循序，保持首見順序）
        let rows = Self::aggregate(selected);

        tracing::info!("採購需求計算完成，採購列 {} 筆", rows.len());
        Ok(rows)
    }

    /// 單列推導：剩餘需求、池餘額、入選判定、分段與採購係數
    fn select_row(
        row: &DemandRow,
        shipped: &HashMap<(String, String, String), Decimal>,
        balances: &HashMap<(String, String), Decimal>,
        config: &AllocationConfig,
    ) -> Option<SelectedRow> {
        let params = NeedCalculator::resolve_params(row, config);
        let need = NeedCalculator::need_for_row(row, &params);

        let shipped_qty = shipped
            .get(&(
                row.depot_id.clone(),
                row.store_id.clone(),
                row.product_id.clone(),
            ))
            .copied()
            .unwrap_or(Decimal::ZERO);

        let residual_need = (need - shipped_qty).max(Decimal::ZERO);

        let depot_balance = balances
            .get(&(row.depot_id.clone(), row.product_id.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO);

        // 只挑仍有未滿足需求且池已耗盡的列
        if residual_need <= Decimal::ZERO || depot_balance > Decimal::ZERO {
            return None;
        }

        // 門市覆蓋缺失時歸入最低區間
        let store_band = match config
            .store_cover_overrides
            .get(&row.store_id)
            .copied()
            .or(row.store_cover)
        {
            Some(cover) => band_for(cover, &config.bands).to_string(),
            None => config.bands.lowest_label().to_string(),
        };

        let cover = product_cover(row.weekly_sales, row.current_stock);
        let product_band = band_for(cover, &config.bands).to_string();

        let multiplier = config.purchase_matrix.lookup(&store_band, &product_band);
        let purchase_qty = (residual_need * multiplier).max(Decimal::ZERO);

        Some(SelectedRow {
            depot_id: row.depot_id.clone(),
            product_id: row.product_id.clone(),
            classification_code: row.classification_code.clone(),
            residual_need,
            purchase_multiplier: multiplier,
            purchase_qty,
            weekly_sales: row.weekly_sales,
            depot_balance,
            store_band,
            product_band,
        })
    }

    /// 依（倉庫、商品、分類）彙總並依採購量降冪排序
    fn aggregate(selected: Vec<SelectedRow>) -> Vec<PurchaseOrderRow> {
        struct Accumulator {
            depot_id: String,
            product_id: String,
            classification_code: String,
            residual_need: Decimal,
            multiplier_sum: Decimal,
            purchase_qty: Decimal,
            weekly_sales_sum: Decimal,
            depot_balance: Decimal,
            store_band_counts: HashMap<String, usize>,
            product_band_counts: HashMap<String, usize>,
            row_count: u32,
        }

        let mut order: Vec<(String, String, String)> = Vec::new();
        let mut accumulators: HashMap<(String, String, String), Accumulator> = HashMap::new();

        for row in selected {
            let key = (
                row.depot_id.clone(),
                row.product_id.clone(),
                row.classification_code.clone(),
            );

            let acc = accumulators.entry(key.clone()).or_insert_with(|| {
                order.push(key.clone());
                Accumulator {
                    depot_id: row.depot_id.clone(),
                    product_id: row.product_id.clone(),
                    classification_code: row.classification_code.clone(),
                    residual_need: Decimal::ZERO,
                    multiplier_sum: Decimal::ZERO,
                    purchase_qty: Decimal::ZERO,
                    weekly_sales_sum: Decimal::ZERO,
                    // 首見值
                    depot_balance: row.depot_balance,
                    store_band_counts: HashMap::new(),
                    product_band_counts: HashMap::new(),
                    row_count: 0,
                }
            });

            acc.residual_need += row.residual_need;
            acc.multiplier_sum += row.purchase_multiplier;
            acc.purchase_qty += row.purchase_qty;
            acc.weekly_sales_sum += row.weekly_sales;
            *acc.store_band_counts.entry(row.store_band).or_insert(0) += 1;
            *acc.product_band_counts.entry(row.product_band).or_insert(0) += 1;
            acc.row_count += 1;
        }

        let mut rows: Vec<PurchaseOrderRow> = order
            .into_iter()
            .map(|key| {
                let acc = accumulators.remove(&key).expect("accumulator exists");
                let count = Decimal::from(acc.row_count);
                PurchaseOrderRow {
                    depot_id: acc.depot_id,
                    product_id: acc.product_id,
                    classification_code: acc.classification_code,
                    residual_need: acc.residual_need,
                    purchase_multiplier: (acc.multiplier_sum / count).round_dp(4),
                    quantity: acc.purchase_qty,
                    avg_weekly_sales: (acc.weekly_sales_sum / count).round_dp(2),
                    depot_balance: acc.depot_balance,
                    store_band: modal_label(&acc.store_band_counts),
                    product_band: modal_label(&acc.product_band_counts),
                }
            })
            .collect();

        // 採購量降冪，平手時依鍵升冪以保持決定性
        rows.sort_by(|a, b| {
            b.quantity.cmp(&a.quantity).then_with(|| {
                (a.depot_id.as_str(), a.product_id.as_str(), a.classification_code.as_str())
                    .cmp(&(b.depot_id.as_str(), b.product_id.as_str(), b.classification_code.as_str()))
            })
        });

        rows
    }
}

/// 眾數標籤（平手時取字典序最小，保持決定性）
fn modal_label(counts: &HashMap<String, usize>) -> String {
    counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(label, _)| label.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use repl_core::{BandSet, ClassificationParams};

    fn config() -> AllocationConfig {
        AllocationConfig::new(BandSet::standard()).with_classification(
            "A",
            ClassificationParams::new(Decimal::from(4), Decimal::ZERO, Decimal::from(1000)),
        )
    }

    fn row(store: &str, product: &str, weekly_sales: i64, current_stock: i64) -> DemandRow {
        DemandRow::new(
            "D1".to_string(),
            store.to_string(),
            product.to_string(),
            "A".to_string(),
            Decimal::from(weekly_sales),
            Decimal::from(current_stock),
        )
        .with_store_cover(Decimal::from(2))
    }

    #[test]
    fn test_exhausted_pool_row_selected() {
        // 需求 10×4 − 0 = 40，未配任何量，池餘額 0 → 入選
        let demands = vec![row("S-A", "P1", 10, 0)];
        let stock = vec![DepotStock::new(
            "D1".to_string(),
            "P1".to_string(),
            Decimal::ZERO,
        )];

        let rows =
            PurchaseNeedCalculator::calculate(&demands, &[], &stock, &config()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].residual_need, Decimal::from(40));
        // 區間對 0-4 × 0-4 的採購種子係數 1.5
        assert_eq!(rows[0].purchase_multiplier, Decimal::new(15, 1));
        assert_eq!(rows[0].quantity, Decimal::from(60));
        assert_eq!(rows[0].depot_balance, Decimal::ZERO);
    }

    #[test]
    fn test_positive_balance_excludes_row() {
        // 池仍有餘額 → 不產生採購需求
        let demands = vec![row("S-A", "P1", 10, 0)];
        let stock = vec![DepotStock::new(
            "D1".to_string(),
            "P1".to_string(),
            Decimal::from(5),
        )];

        let rows =
            PurchaseNeedCalculator::calculate(&demands, &[], &stock, &config()).unwrap();

        assert!(rows.is_empty());
    }

    #[test]
    fn test_shipped_quantity_reduces_residual() {
        let demands = vec![row("S-A", "P1", 10, 0)];
        let totals = vec![ShipmentTotal {
            depot_id: "D1".to_string(),
            store_id: "S-A".to_string(),
            product_id: "P1".to_string(),
            classification_code: "A".to_string(),
            store_band: "0-4".to_string(),
            product_band: "0-4".to_string(),
            quantity: Decimal::from(30),
        }];
        let stock = vec![DepotStock::new(
            "D1".to_string(),
            "P1".to_string(),
            Decimal::ZERO,
        )];

        let rows =
            PurchaseNeedCalculator::calculate(&demands, &totals, &stock, &config()).unwrap();

        // 剩餘需求 40 − 30 = 10
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].residual_need, Decimal::from(10));
    }

    #[test]
    fn test_fully_shipped_row_excluded() {
        let demands = vec![row("S-A", "P1", 10, 0)];
        let totals = vec![ShipmentTotal {
            depot_id: "D1".to_string(),
            store_id: "S-A".to_string(),
            product_id: "P1".to_string(),
            classification_code: "A".to_string(),
            store_band: "0-4".to_string(),
            product_band: "0-4".to_string(),
            quantity: Decimal::from(40),
        }];
        let stock = vec![DepotStock::new(
            "D1".to_string(),
            "P1".to_string(),
            Decimal::ZERO,
        )];

        let rows =
            PurchaseNeedCalculator::calculate(&demands, &totals, &stock, &config()).unwrap();

        assert!(rows.is_empty());
    }

    #[test]
    fn test_missing_store_cover_defaults_to_lowest_band() {
        let mut demand = row("S-A", "P1", 10, 0);
        demand.store_cover = None;

        let stock = vec![DepotStock::new(
            "D1".to_string(),
            "P1".to_string(),
            Decimal::ZERO,
        )];

        let rows =
            PurchaseNeedCalculator::calculate(&[demand], &[], &stock, &config()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].store_band, "0-4");
    }

    #[test]
    fn test_aggregation_and_descending_sort() {
        // 兩商品各兩家門市，皆無池餘額
        let demands = vec![
            row("S-A", "P1", 10, 0),
            row("S-B", "P1", 5, 0),
            row("S-A", "P2", 50, 0),
            row("S-B", "P2", 40, 0),
        ];
        let stock = vec![
            DepotStock::new("D1".to_string(), "P1".to_string(), Decimal::ZERO),
            DepotStock::new("D1".to_string(), "P2".to_string(), Decimal::ZERO),
        ];

        let rows =
            PurchaseNeedCalculator::calculate(&demands, &[], &stock, &config()).unwrap();

        // 每（倉庫、商品、分類）一列；P2 需求較大排前
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product_id, "P2");
        assert_eq!(rows[0].residual_need, Decimal::from(360)); // 200 + 160
        assert_eq!(rows[1].product_id, "P1");
        assert_eq!(rows[1].residual_need, Decimal::from(60)); // 40 + 20

        // 平均週銷量
        assert_eq!(rows[0].avg_weekly_sales, Decimal::from(45));
        assert_eq!(rows[1].avg_weekly_sales, Decimal::new(75, 1));
    }

    #[test]
    fn test_empty_inputs_yield_empty_result() {
        let rows = PurchaseNeedCalculator::calculate(&[], &[], &[], &config()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_missing_pool_key_treated_as_exhausted() {
        // 池中沒有該（倉庫、商品）鍵 → 餘額視為 0，入選
        let demands = vec![row("S-A", "P9", 10, 0)];

        let rows = PurchaseNeedCalculator::calculate(&demands, &[], &[], &config()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_id, "P9");
    }
}
