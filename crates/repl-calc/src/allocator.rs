//! 配貨引擎（核心演算法）

use repl_core::{
    band_for, product_cover, AllocationConfig, ClassificationParams, DemandRow, DepotStock,
    ShipmentRecord, ShipmentTier, ShipmentTotal, StockPool,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::need::NeedCalculator;
use crate::{AllocWarning, AllocationResult};

/// 準備列：輸入列快照加上引擎衍生值
///
/// 衍生值只存在於引擎的工作副本，不回寫輸入列。
#[derive(Debug, Clone)]
struct PreparedRow {
    row: DemandRow,
    params: ClassificationParams,
    need: Decimal,
    product_cover: Decimal,
    store_band: String,
    product_band: String,
}

/// 配貨引擎
///
/// 每次執行獨佔一份庫存池工作副本，逐（區間對 × 倉庫商品群）
/// 以兩層順序扣減，結束後回傳最終池狀態——絕不別名呼叫端的資料。
pub struct AllocationEngine {
    /// 配貨配置（區間集與三個係數矩陣由呼叫端顯式供給）
    config: AllocationConfig,

    /// 取消旗標（只在區間對之間檢查，部分結果保持一致）
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl AllocationEngine {
    /// 創建新的配貨引擎
    pub fn new(config: AllocationConfig) -> Self {
        Self {
            config,
            cancel_flag: None,
        }
    }

    /// 建構器模式：設置取消旗標
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// 配置引用
    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// 主配貨計算入口
    ///
    /// 空輸入或全數被覆蓋門檻濾除時返回空結果，不是錯誤。
    pub fn allocate(
        &self,
        demands: &[DemandRow],
        stock: &[DepotStock],
    ) -> repl_core::Result<AllocationResult> {
        tracing::info!(
            "開始配貨計算：需求 {} 筆，倉庫庫存 {} 筆",
            demands.len(),
            stock.len()
        );

        let start_time = std::time::Instant::now();
        let mut result = AllocationResult::empty();

        // 空矩陣代表整張表退回預設係數，值得在結果上留痕
        if self.config.shipment_matrix.is_empty() {
            result.add_warning(AllocWarning::warning(
                "shipment_matrix".to_string(),
                "配貨係數矩陣為空，所有區間對使用預設係數 1.0".to_string(),
            ));
        }
        if self.config.min_completion_matrix.is_empty() {
            result.add_warning(AllocWarning::warning(
                "min_completion_matrix".to_string(),
                "最低補足係數矩陣為空，第二層配貨停用".to_string(),
            ));
        }

        // 引擎獨佔的庫存池工作副本（重複鍵在此合併）
        let mut pool = StockPool::from_entries(stock);

        // Step 1: 準備列（解析參數、計算需求量與覆蓋週數、分段）
        //         並以門市覆蓋門檻過濾
        tracing::debug!("Step 1: 準備與過濾需求列");
        let mut prepared = self.prepare_rows(demands, &mut result);
        tracing::debug!(
            "過濾後列數: {} / {}（門檻 {}）",
            prepared.len(),
            demands.len(),
            self.config.max_store_cover
        );

        // Step 2: 排序（商品升冪、商品覆蓋升冪、週銷量降冪）
        //         同池競爭下覆蓋低者優先，覆蓋相同時高銷速門市優先
        tracing::debug!("Step 2: 排序");
        prepared.sort_by(|a, b| {
            a.row
                .product_id
                .cmp(&b.row.product_id)
                .then(a.product_cover.cmp(&b.product_cover))
                .then(b.row.weekly_sales.cmp(&a.row.weekly_sales))
        });

        // Step 3: 以排序後全集建立（倉庫、商品）分群，群序取首見順序
        tracing::debug!("Step 3: 倉庫商品分群");
        let (group_order, groups) = Self::group_by_depot_product(&prepared);
        tracing::debug!("群數: {}", group_order.len());

        // Step 4: 區間對 × 群 的兩層配貨
        tracing::debug!("Step 4: 兩層配貨");
        let mut shipments: Vec<ShipmentRecord> = Vec::new();

        'bands: for store_band in self.config.bands.bands() {
            for product_band in self.config.bands.bands() {
                // 取消只允許發生在區間對之間，
                // 已發出的記錄必然對應已完成的池扣減
                if let Some(flag) = &self.cancel_flag {
                    if flag.load(Ordering::Relaxed) {
                        tracing::info!("收到取消旗標，結束於當前區間對");
                        break 'bands;
                    }
                }

                // 每區間對解析一次係數
                let ship_mult = self
                    .config
                    .shipment_matrix
                    .lookup(&store_band.label, &product_band.label);
                let min_mult = self
                    .config
                    .min_completion_matrix
                    .lookup(&store_band.label, &product_band.label);

                for key in &group_order {
                    self.allocate_group(
                        &prepared,
                        &groups[key],
                        key,
                        &store_band.label,
                        &product_band.label,
                        ship_mult,
                        min_mult,
                        &mut pool,
                        &mut shipments,
                    );
                }
            }
        }

        // Step 5: 彙總配貨記錄
        tracing::debug!("Step 5: 彙總");
        result.totals = aggregate_shipments(&shipments);
        result.shipments = shipments;
        result.final_stock = pool.into_entries();
        result.calculation_time_ms = Some(start_time.elapsed().as_millis());
        result.generated_at = Some(chrono::Utc::now().naive_utc());

        tracing::info!(
            "配貨計算完成，耗時 {:?}，配貨記錄 {} 筆",
            start_time.elapsed(),
            result.shipments.len()
        );

        Ok(result)
    }

    /// 準備列：衍生值計算、分段、覆蓋門檻過濾
    fn prepare_rows(
        &self,
        demands: &[DemandRow],
        result: &mut AllocationResult,
    ) -> Vec<PreparedRow> {
        let mut prepared = Vec::with_capacity(demands.len());
        let mut unknown_classifications: HashSet<String> = HashSet::new();

        for row in demands {
            if self.config.params_for(&row.classification_code).is_none()
                && unknown_classifications.insert(row.classification_code.clone())
            {
                result.add_warning(AllocWarning::info(
                    row.classification_code.clone(),
                    "查無分類參數，使用全域預設值".to_string(),
                ));
            }

            let params = NeedCalculator::resolve_params(row, &self.config);
            let need = NeedCalculator::need_for_row(row, &params);
            let cover = product_cover(row.weekly_sales, row.current_stock);
            let store_cover = self.store_cover_for(row);

            // 覆蓋門檻之上的列整列排除（其需求仍會在採購階段
            // 透過原始未過濾資料看到）
            if store_cover > self.config.max_store_cover {
                continue;
            }

            let store_band = band_for(store_cover, &self.config.bands).to_string();
            let product_band = band_for(cover, &self.config.bands).to_string();

            prepared.push(PreparedRow {
                row: row.clone(),
                params,
                need,
                product_cover: cover,
                store_band,
                product_band,
            });
        }

        prepared
    }

    /// 門市覆蓋週數：配置覆寫 → 列上快照 → 0（視為最急迫）
    fn store_cover_for(&self, row: &DemandRow) -> Decimal {
        self.config
            .store_cover_overrides
            .get(&row.store_id)
            .copied()
            .or(row.store_cover)
            .unwrap_or(Decimal::ZERO)
    }

    /// 以排序後全集建立（倉庫、商品）分群
    ///
    /// 群序取排序資料中的首見順序，與區間無關，全程只建立一次。
    fn group_by_depot_product(
        prepared: &[PreparedRow],
    ) -> (
        Vec<(String, String)>,
        HashMap<(String, String), Vec<usize>>,
    ) {
        let mut order: Vec<(String, String)> = Vec::new();
        let mut groups: HashMap<(String, String), Vec<usize>> = HashMap::new();

        for (index, prep) in prepared.iter().enumerate() {
            let key = (prep.row.depot_id.clone(), prep.row.product_id.clone());
            match groups.get_mut(&key) {
                Some(indices) => indices.push(index),
                None => {
                    order.push(key.clone());
                    groups.insert(key, vec![index]);
                }
            }
        }

        (order, groups)
    }

    /// 單群兩層配貨
    ///
    /// 第一層（需求配貨）完整跑完後才進第二層（最低補足）；
    /// 群結束時將最終餘額回寫池，再移往下一群。
    #[allow(clippy::too_many_arguments)]
    fn allocate_group(
        &self,
        prepared: &[PreparedRow],
        group_indices: &[usize],
        key: &(String, String),
        store_band: &str,
        product_band: &str,
        ship_mult: Decimal,
        min_mult: Decimal,
        pool: &mut StockPool,
        shipments: &mut Vec<ShipmentRecord>,
    ) {
        // 限定當前區間對的列
        let rows: Vec<&PreparedRow> = group_indices
            .iter()
            .map(|&i| &prepared[i])
            .filter(|p| p.store_band == store_band && p.product_band == product_band)
            .collect();

        if rows.is_empty() {
            return;
        }

        // 池已耗盡的群整群跳過：不發記錄、不回寫
        let mut balance = pool.balance(&key.0, &key.1);
        if balance <= Decimal::ZERO {
            tracing::debug!(
                depot = %key.0,
                product = %key.1,
                "池餘額為零，跳過整群"
            );
            return;
        }

        // 第一層：需求配貨
        for prep in &rows {
            if balance <= Decimal::ZERO {
                break;
            }

            let scaled_need = prep.need * ship_mult;
            let quantity = scaled_need.min(balance).min(prep.params.max_qty).floor();
            if quantity > Decimal::ZERO {
                balance -= quantity;
                shipments.push(self.shipment_record(
                    prep,
                    ShipmentTier::NeedBased,
                    ship_mult,
                    quantity,
                ));
            }
        }

        // 第二層：最低補足（僅在餘額尚存且補足係數 > 0 時執行）
        if balance > Decimal::ZERO && min_mult > Decimal::ZERO {
            for prep in &rows {
                if balance <= Decimal::ZERO {
                    break;
                }

                let shortfall = NeedCalculator::min_shortfall(
                    prep.params.min_qty,
                    prep.row.current_stock,
                    prep.row.in_transit_stock,
                );
                let scaled_shortfall = shortfall * min_mult;
                let quantity = scaled_shortfall
                    .min(balance)
                    .min(prep.params.max_qty)
                    .floor();
                if quantity > Decimal::ZERO {
                    balance -= quantity;
                    shipments.push(self.shipment_record(
                        prep,
                        ShipmentTier::MinCompletion,
                        min_mult,
                        quantity,
                    ));
                }
            }
        }

        // 群結束：回寫最終餘額
        pool.set_balance(&key.0, &key.1, balance);
    }

    /// 發出一筆配貨記錄（含決策當下快照）
    fn shipment_record(
        &self,
        prep: &PreparedRow,
        tier: ShipmentTier,
        multiplier: Decimal,
        quantity: Decimal,
    ) -> ShipmentRecord {
        ShipmentRecord {
            id: Uuid::new_v4(),
            depot_id: prep.row.depot_id.clone(),
            store_id: prep.row.store_id.clone(),
            product_id: prep.row.product_id.clone(),
            classification_code: prep.row.classification_code.clone(),
            tier,
            store_band: prep.store_band.clone(),
            product_band: prep.product_band.clone(),
            multiplier,
            quantity,
            need: prep.need,
            product_cover: prep.product_cover,
            min_qty: prep.params.min_qty,
            max_qty: prep.params.max_qty,
        }
    }
}

/// 彙總配貨記錄
///
/// 以（倉庫、門市、商品、分類、區間對）為鍵加總數量，
/// 描述欄位取首見值，彙總序取首見順序。
pub fn aggregate_shipments(shipments: &[ShipmentRecord]) -> Vec<ShipmentTotal> {
    let mut totals: Vec<ShipmentTotal> = Vec::new();
    let mut index_by_key: HashMap<(String, String, String, String, String, String), usize> =
        HashMap::new();

    for record in shipments {
        let key = (
            record.depot_id.clone(),
            record.store_id.clone(),
            record.product_id.clone(),
            record.classification_code.clone(),
            record.store_band.clone(),
            record.product_band.clone(),
        );

        match index_by_key.get(&key) {
            Some(&i) => totals[i].quantity += record.quantity,
            None => {
                index_by_key.insert(key, totals.len());
                totals.push(ShipmentTotal {
                    depot_id: record.depot_id.clone(),
                    store_id: record.store_id.clone(),
                    product_id: record.product_id.clone(),
                    classification_code: record.classification_code.clone(),
                    store_band: record.store_band.clone(),
                    product_band: record.product_band.clone(),
                    quantity: record.quantity,
                });
            }
        }
    }

    totals
}
