//! 需求量計算

use repl_core::{AllocationConfig, ClassificationParams, DemandRow};
use rust_decimal::Decimal;

/// 需求量計算器
pub struct NeedCalculator;

impl NeedCalculator {
    /// 需求量 = max(0, 週銷量 × 目標週數 − (現有庫存 + 在途庫存))
    pub fn need(
        weekly_sales: Decimal,
        target_weeks: Decimal,
        current_stock: Decimal,
        in_transit: Decimal,
    ) -> Decimal {
        (weekly_sales * target_weeks - (current_stock + in_transit)).max(Decimal::ZERO)
    }

    /// 最低量缺口 = max(0, 最低單位數 − (現有庫存 + 在途庫存))
    pub fn min_shortfall(
        min_qty: Decimal,
        current_stock: Decimal,
        in_transit: Decimal,
    ) -> Decimal {
        (min_qty - (current_stock + in_transit)).max(Decimal::ZERO)
    }

    /// 解析一列的分類參數
    ///
    /// 解析順序：列上覆寫 → 分類查詢表 → 全域預設值。
    /// 查無分類屬於非致命解析失敗，記錄後退回預設。
    pub fn resolve_params(row: &DemandRow, config: &AllocationConfig) -> ClassificationParams {
        let base = match config.params_for(&row.classification_code) {
            Some(params) => *params,
            None => {
                tracing::debug!(
                    classification = %row.classification_code,
                    "查無分類參數，退回全域預設值"
                );
                config.default_params
            }
        };

        ClassificationParams {
            target_weeks: row.target_weeks.unwrap_or(base.target_weeks),
            min_qty: row.min_qty.unwrap_or(base.min_qty),
            max_qty: row.max_qty.unwrap_or(base.max_qty),
        }
    }

    /// 計算一列的需求量（參數已解析）
    pub fn need_for_row(row: &DemandRow, params: &ClassificationParams) -> Decimal {
        Self::need(
            row.weekly_sales,
            params.target_weeks,
            row.current_stock,
            row.in_transit_stock,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repl_core::BandSet;

    fn demand_row(classification: &str) -> DemandRow {
        DemandRow::new(
            "D1".to_string(),
            "S1".to_string(),
            "P1".to_string(),
            classification.to_string(),
            Decimal::from(10),
            Decimal::from(15),
        )
    }

    #[test]
    fn test_need_basic() {
        // 10 × 4 − (15 + 5) = 20
        let need = NeedCalculator::need(
            Decimal::from(10),
            Decimal::from(4),
            Decimal::from(15),
            Decimal::from(5),
        );
        assert_eq!(need, Decimal::from(20));
    }

    #[test]
    fn test_need_clamped_at_zero() {
        // 庫存充足時需求量為 0，不得為負
        let need = NeedCalculator::need(
            Decimal::from(2),
            Decimal::from(4),
            Decimal::from(50),
            Decimal::ZERO,
        );
        assert_eq!(need, Decimal::ZERO);
    }

    #[test]
    fn test_need_includes_in_transit() {
        // 在途庫存計入需求量計算（與覆蓋週數不同）
        let without = NeedCalculator::need(
            Decimal::from(10),
            Decimal::from(4),
            Decimal::from(10),
            Decimal::ZERO,
        );
        let with = NeedCalculator::need(
            Decimal::from(10),
            Decimal::from(4),
            Decimal::from(10),
            Decimal::from(20),
        );

        assert_eq!(without, Decimal::from(30));
        assert_eq!(with, Decimal::from(10));
    }

    #[test]
    fn test_min_shortfall() {
        assert_eq!(
            NeedCalculator::min_shortfall(Decimal::from(6), Decimal::from(2), Decimal::from(1)),
            Decimal::from(3)
        );
        assert_eq!(
            NeedCalculator::min_shortfall(Decimal::from(2), Decimal::from(5), Decimal::ZERO),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_resolve_params_from_classification() {
        let config = AllocationConfig::new(BandSet::standard()).with_classification(
            "A",
            ClassificationParams::new(Decimal::from(6), Decimal::from(2), Decimal::from(50)),
        );

        let params = NeedCalculator::resolve_params(&demand_row("A"), &config);
        assert_eq!(params.target_weeks, Decimal::from(6));
        assert_eq!(params.min_qty, Decimal::from(2));
        assert_eq!(params.max_qty, Decimal::from(50));
    }

    #[test]
    fn test_resolve_params_unknown_classification_falls_back() {
        // 查無分類 → 全域預設值（目標 4 週），不中止
        let config = AllocationConfig::new(BandSet::standard());

        let params = NeedCalculator::resolve_params(&demand_row("UNKNOWN"), &config);
        assert_eq!(params.target_weeks, Decimal::from(4));
        assert_eq!(params.min_qty, Decimal::ZERO);
    }

    #[test]
    fn test_resolve_params_row_override_wins() {
        let config = AllocationConfig::new(BandSet::standard()).with_classification(
            "A",
            ClassificationParams::new(Decimal::from(6), Decimal::from(2), Decimal::from(50)),
        );

        let row = demand_row("A").with_target_weeks(Decimal::from(8));
        let params = NeedCalculator::resolve_params(&row, &config);

        // 列上覆寫優先於分類表
        assert_eq!(params.target_weeks, Decimal::from(8));
        assert_eq!(params.min_qty, Decimal::from(2));
    }
}
