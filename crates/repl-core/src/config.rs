//! 配貨參數配置

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::matrix::{MatrixKind, MultiplierMatrix};
use crate::segment::BandSet;
use crate::{AllocError, Result};

/// 分類參數：目標覆蓋週數、最低單位數、單次配貨上限
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClassificationParams {
    /// 目標覆蓋週數
    pub target_weeks: Decimal,

    /// 門市最低單位數
    pub min_qty: Decimal,

    /// 單次配貨上限
    pub max_qty: Decimal,
}

impl ClassificationParams {
    /// 創建新的分類參數
    pub fn new(target_weeks: Decimal, min_qty: Decimal, max_qty: Decimal) -> Self {
        Self {
            target_weeks,
            min_qty,
            max_qty,
        }
    }
}

impl Default for ClassificationParams {
    /// 全域預設值：目標 4 週、最低 0、上限 100000
    fn default() -> Self {
        Self {
            target_weeks: Decimal::from(4),
            min_qty: Decimal::ZERO,
            max_qty: Decimal::from(100_000),
        }
    }
}

/// 配貨配置：區間集 + 三個係數矩陣 + 門檻與查詢表
///
/// 配置由外部 UI 編輯/儲存/重設，但對引擎而言是每次呼叫
/// 顯式傳入的值，不是環境狀態——同樣的輸入必得同樣的輸出。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// 覆蓋區間集（門市與商品共用）
    pub bands: BandSet,

    /// 配貨係數矩陣（第一層）
    pub shipment_matrix: MultiplierMatrix,

    /// 最低補足係數矩陣（第二層）
    pub min_completion_matrix: MultiplierMatrix,

    /// 採購係數矩陣
    pub purchase_matrix: MultiplierMatrix,

    /// 門市覆蓋週數上限（超過的列整列排除於配貨之外）
    pub max_store_cover: Decimal,

    /// 全域預設分類參數
    pub default_params: ClassificationParams,

    /// 分類代碼 → 參數查詢表
    pub classification_params: HashMap<String, ClassificationParams>,

    /// 門市ID → 覆蓋週數覆寫表
    pub store_cover_overrides: HashMap<String, Decimal>,
}

impl AllocationConfig {
    /// 以區間集創建配置，三個矩陣一起播種
    pub fn new(bands: BandSet) -> Self {
        let shipment_matrix = MultiplierMatrix::seeded(MatrixKind::Shipment, &bands);
        let min_completion_matrix = MultiplierMatrix::seeded(MatrixKind::MinCompletion, &bands);
        let purchase_matrix = MultiplierMatrix::seeded(MatrixKind::Purchase, &bands);

        Self {
            bands,
            shipment_matrix,
            min_completion_matrix,
            purchase_matrix,
            max_store_cover: Decimal::from(50),
            default_params: ClassificationParams::default(),
            classification_params: HashMap::new(),
            store_cover_overrides: HashMap::new(),
        }
    }

    /// 建構器模式：設置門市覆蓋上限
    pub fn with_max_store_cover(mut self, max_store_cover: Decimal) -> Self {
        self.max_store_cover = max_store_cover;
        self
    }

    /// 建構器模式：設置全域預設分類參數
    pub fn with_default_params(mut self, params: ClassificationParams) -> Self {
        self.default_params = params;
        self
    }

    /// 建構器模式：登記分類參數
    pub fn with_classification(
        mut self,
        code: impl Into<String>,
        params: ClassificationParams,
    ) -> Self {
        self.classification_params.insert(code.into(), params);
        self
    }

    /// 建構器模式：登記門市覆蓋覆寫
    pub fn with_store_cover_override(
        mut self,
        store_id: impl Into<String>,
        cover: Decimal,
    ) -> Self {
        self.store_cover_overrides.insert(store_id.into(), cover);
        self
    }

    /// 重新分段：換用新的區間集並原子性重建三個矩陣
    ///
    /// 區間變更會使矩陣鍵失效，因此三個矩陣必須一起重建，
    /// 不允許部分更新造成不一致配置。
    pub fn resegment(&mut self, bands: BandSet) {
        self.shipment_matrix.reseed(&bands);
        self.min_completion_matrix.reseed(&bands);
        self.purchase_matrix.reseed(&bands);
        self.bands = bands;
    }

    /// 序列化為 JSON（供外部 UI 儲存配置）
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AllocError::ConfigError(format!("配置序列化失敗: {e}")))
    }

    /// 自 JSON 還原配置
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AllocError::ConfigError(format!("配置解析失敗: {e}")))
    }

    /// 查詢分類參數（查無此分類時返回 None，由呼叫端退回預設並記錄）
    pub fn params_for(&self, classification_code: &str) -> Option<&ClassificationParams> {
        self.classification_params.get(classification_code)
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self::new(BandSet::standard())
    }
}
