//! 需求模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 週銷量下限（防止覆蓋週數計算除以零）
pub fn min_weekly_sales() -> Decimal {
    Decimal::new(1, 1) // 0.1
}

/// 需求資料表的必要欄位
pub const REQUIRED_DEMAND_COLUMNS: [&str; 6] = [
    "depot_id",
    "product_id",
    "store_id",
    "weekly_sales",
    "current_stock",
    "classification_code",
];

/// 需求列：一筆（倉庫、門市、商品）的需求觀測
///
/// 輸入快照，建立後不再修改；衍生值（商品覆蓋週數、區間標籤、
/// 需求量、剩餘需求）由計算器自行持有，不回寫到輸入列。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandRow {
    /// 需求列ID
    pub id: Uuid,

    /// 倉庫ID
    pub depot_id: String,

    /// 門市ID
    pub store_id: String,

    /// 商品ID
    pub product_id: String,

    /// 分類代碼（查詢目標週數/最低量/上限量的鍵）
    pub classification_code: String,

    /// 週銷量（下限 0.1）
    pub weekly_sales: Decimal,

    /// 門市現有庫存
    pub current_stock: Decimal,

    /// 在途庫存（預設 0）
    pub in_transit_stock: Decimal,

    /// 門市覆蓋週數快照（可由配置中的門市覆蓋表覆寫）
    pub store_cover: Option<Decimal>,

    /// 目標覆蓋週數覆寫（缺省時查分類表或用預設值）
    pub target_weeks: Option<Decimal>,

    /// 最低單位數覆寫
    pub min_qty: Option<Decimal>,

    /// 單次配貨上限覆寫
    pub max_qty: Option<Decimal>,
}

impl DemandRow {
    /// 創建新的需求列
    ///
    /// 週銷量低於 0.1 會被鉗制到 0.1，負庫存鉗制到 0。
    pub fn new(
        depot_id: String,
        store_id: String,
        product_id: String,
        classification_code: String,
        weekly_sales: Decimal,
        current_stock: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            depot_id,
            store_id,
            product_id,
            classification_code,
            weekly_sales: weekly_sales.max(min_weekly_sales()),
            current_stock: current_stock.max(Decimal::ZERO),
            in_transit_stock: Decimal::ZERO,
            store_cover: None,
            target_weeks: None,
            min_qty: None,
            max_qty: None,
        }
    }

    /// 建構器模式：設置在途庫存
    pub fn with_in_transit(mut self, in_transit_stock: Decimal) -> Self {
        self.in_transit_stock = in_transit_stock.max(Decimal::ZERO);
        self
    }

    /// 建構器模式：設置門市覆蓋週數快照
    pub fn with_store_cover(mut self, store_cover: Decimal) -> Self {
        self.store_cover = Some(store_cover);
        self
    }

    /// 建構器模式：設置目標覆蓋週數
    pub fn with_target_weeks(mut self, target_weeks: Decimal) -> Self {
        self.target_weeks = Some(target_weeks);
        self
    }

    /// 建構器模式：設置最低單位數
    pub fn with_min_qty(mut self, min_qty: Decimal) -> Self {
        self.min_qty = Some(min_qty);
        self
    }

    /// 建構器模式：設置配貨上限
    pub fn with_max_qty(mut self, max_qty: Decimal) -> Self {
        self.max_qty = Some(max_qty);
        self
    }

    /// 門市可用庫存（現有 + 在途）
    pub fn available_stock(&self) -> Decimal {
        self.current_stock + self.in_transit_stock
    }
}
