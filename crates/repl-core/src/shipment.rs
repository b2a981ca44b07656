//! 配貨結果模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 配貨層級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipmentTier {
    /// 第一層：需求配貨
    NeedBased,
    /// 第二層：最低補足
    MinCompletion,
}

impl ShipmentTier {
    /// 層級編號（報表用）
    pub fn as_u8(&self) -> u8 {
        match self {
            ShipmentTier::NeedBased => 1,
            ShipmentTier::MinCompletion => 2,
        }
    }
}

/// 配貨記錄：一筆配貨決策（發出後不可變）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentRecord {
    /// 記錄ID
    pub id: Uuid,

    /// 倉庫ID
    pub depot_id: String,

    /// 門市ID
    pub store_id: String,

    /// 商品ID
    pub product_id: String,

    /// 分類代碼
    pub classification_code: String,

    /// 配貨層級
    pub tier: ShipmentTier,

    /// 門市覆蓋區間標籤
    pub store_band: String,

    /// 商品覆蓋區間標籤
    pub product_band: String,

    /// 套用的係數
    pub multiplier: Decimal,

    /// 配貨數量
    pub quantity: Decimal,

    /// 決策當下的需求量快照
    pub need: Decimal,

    /// 決策當下的商品覆蓋週數快照
    pub product_cover: Decimal,

    /// 決策當下的最低單位數快照
    pub min_qty: Decimal,

    /// 決策當下的配貨上限快照
    pub max_qty: Decimal,
}

/// 配貨彙總：同（倉庫、門市、商品、分類、區間對）的數量加總
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentTotal {
    /// 倉庫ID
    pub depot_id: String,

    /// 門市ID
    pub store_id: String,

    /// 商品ID
    pub product_id: String,

    /// 分類代碼
    pub classification_code: String,

    /// 門市覆蓋區間標籤
    pub store_band: String,

    /// 商品覆蓋區間標籤
    pub product_band: String,

    /// 配貨數量合計
    pub quantity: Decimal,
}
