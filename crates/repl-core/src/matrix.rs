//! 係數矩陣模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::segment::BandSet;

/// 係數矩陣類型
///
/// 三個矩陣各自獨立配置，查詢失敗時退回各自的安全預設值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatrixKind {
    /// 配貨係數（第一層：需求配貨）
    Shipment,
    /// 最低補足係數（第二層：0 表示不補足）
    MinCompletion,
    /// 採購係數
    Purchase,
}

impl MatrixKind {
    /// 類型預設值（查無矩陣/列/儲存格時的退路）
    pub fn fallback(&self) -> Decimal {
        match self {
            MatrixKind::Shipment => Decimal::ONE,
            MatrixKind::MinCompletion => Decimal::ZERO,
            MatrixKind::Purchase => Decimal::ONE,
        }
    }

    /// 距離啟發式種子參數 (floor, base, decay)
    fn seed_params(&self) -> (Decimal, Decimal, Decimal) {
        match self {
            // floor 0.05, base 1.2, decay 0.2
            MatrixKind::Shipment => (Decimal::new(5, 2), Decimal::new(12, 1), Decimal::new(2, 1)),
            // floor 0.8, base 1.2, decay 0.1（僅最低三個區間內非零）
            MatrixKind::MinCompletion => {
                (Decimal::new(8, 1), Decimal::new(12, 1), Decimal::new(1, 1))
            }
            // floor 0.1, base 1.5, decay 0.2
            MatrixKind::Purchase => (Decimal::new(1, 1), Decimal::new(15, 1), Decimal::new(2, 1)),
        }
    }

    /// 為（門市區間索引、商品區間索引）合成儲存格值
    ///
    /// `max(floor, base − distance × decay)`，距離為索引差的絕對值。
    /// 最低補足矩陣只在雙方索引均落於最低三個區間時非零。
    pub fn seed_cell(&self, store_index: usize, product_index: usize) -> Decimal {
        if *self == MatrixKind::MinCompletion && (store_index >= 3 || product_index >= 3) {
            return Decimal::ZERO;
        }

        let (floor, base, decay) = self.seed_params();
        let distance = Decimal::from(store_index.abs_diff(product_index) as u64);
        (base - distance * decay).max(floor)
    }
}

/// 係數矩陣：（門市區間標籤 × 商品區間標籤）→ 非負係數
///
/// 查詢永不失敗：矩陣為空、列缺失、儲存格缺失一律退回類型
/// 預設值並記錄，不中止配貨。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiplierMatrix {
    /// 矩陣類型
    kind: MatrixKind,

    /// 門市區間標籤 → （商品區間標籤 → 係數）
    rows: HashMap<String, HashMap<String, Decimal>>,
}

impl MultiplierMatrix {
    /// 創建空矩陣
    pub fn new(kind: MatrixKind) -> Self {
        Self {
            kind,
            rows: HashMap::new(),
        }
    }

    /// 依區間集播種一個完整矩陣
    pub fn seeded(kind: MatrixKind, bands: &BandSet) -> Self {
        let mut matrix = Self::new(kind);
        matrix.reseed(bands);
        matrix
    }

    /// 矩陣類型
    pub fn kind(&self) -> MatrixKind {
        self.kind
    }

    /// 儲存格數量
    pub fn len(&self) -> usize {
        self.rows.values().map(|row| row.len()).sum()
    }

    /// 是否為空
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 設置儲存格（負值鉗制到 0）
    pub fn set(&mut self, store_band: &str, product_band: &str, value: Decimal) {
        self.rows
            .entry(store_band.to_string())
            .or_default()
            .insert(product_band.to_string(), value.max(Decimal::ZERO));
    }

    /// 查詢係數（永不失敗）
    pub fn lookup(&self, store_band: &str, product_band: &str) -> Decimal {
        if self.rows.is_empty() {
            tracing::debug!(
                kind = ?self.kind,
                "係數矩陣為空，退回預設值 {}",
                self.kind.fallback()
            );
            return self.kind.fallback();
        }

        let row = match self.rows.get(store_band) {
            Some(row) => row,
            None => {
                tracing::debug!(
                    kind = ?self.kind,
                    store_band,
                    "係數矩陣列缺失，退回預設值 {}",
                    self.kind.fallback()
                );
                return self.kind.fallback();
            }
        };

        match row.get(product_band) {
            Some(value) => *value,
            None => {
                tracing::debug!(
                    kind = ?self.kind,
                    store_band,
                    product_band,
                    "係數儲存格缺失，退回預設值 {}",
                    self.kind.fallback()
                );
                self.kind.fallback()
            }
        }
    }

    /// 依新的區間集重建矩陣
    ///
    /// 保留仍存在標籤的儲存格；新儲存格以距離啟發式合成。
    pub fn reseed(&mut self, bands: &BandSet) {
        let labels = bands.labels();
        let mut rows: HashMap<String, HashMap<String, Decimal>> =
            HashMap::with_capacity(labels.len());

        for (store_index, store_band) in labels.iter().enumerate() {
            let mut row = HashMap::with_capacity(labels.len());
            for (product_index, product_band) in labels.iter().enumerate() {
                let existing = self
                    .rows
                    .get(*store_band)
                    .and_then(|r| r.get(*product_band));
                let value = match existing {
                    Some(value) => *value,
                    None => self.kind.seed_cell(store_index, product_index),
                };
                row.insert(product_band.to_string(), value);
            }
            rows.insert(store_band.to_string(), row);
        }

        self.rows = rows;
    }
}
