//! 採購需求模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 採購需求列：每（倉庫、商品、分類）一列
///
/// 配貨後仍未滿足、且倉庫池已耗盡的需求，套用採購係數
/// 後彙總而成。唯讀輸出。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderRow {
    /// 倉庫ID
    pub depot_id: String,

    /// 商品ID
    pub product_id: String,

    /// 分類代碼
    pub classification_code: String,

    /// 未滿足需求合計
    pub residual_need: Decimal,

    /// 套用的採購係數（平均）
    pub purchase_multiplier: Decimal,

    /// 採購數量合計
    pub quantity: Decimal,

    /// 平均週銷量
    pub avg_weekly_sales: Decimal,

    /// 倉庫池餘額（首見值）
    pub depot_balance: Decimal,

    /// 門市覆蓋區間標籤（眾數）
    pub store_band: String,

    /// 商品覆蓋區間標籤（眾數）
    pub product_band: String,
}
