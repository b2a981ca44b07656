//! # Replenishment Core
//!
//! 核心資料模型與類型定義

pub mod config;
pub mod demand;
pub mod matrix;
pub mod purchase;
pub mod segment;
pub mod shipment;
pub mod stock;

// Re-export 主要類型
pub use config::{AllocationConfig, ClassificationParams};
pub use demand::DemandRow;
pub use matrix::{MatrixKind, MultiplierMatrix};
pub use purchase::PurchaseOrderRow;
pub use segment::{band_for, product_cover, BandSet, CoverBand, INFINITE_COVER};
pub use shipment::{ShipmentRecord, ShipmentTier, ShipmentTotal};
pub use stock::{DepotStock, StockPool};

/// 配貨引擎錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum AllocError {
    #[error("資料表 {table} 缺少必要欄位: {columns:?}")]
    MissingColumns { table: String, columns: Vec<String> },

    #[error("覆蓋區間配置無效: {0}")]
    InvalidBands(String),

    #[error("配置錯誤: {0}")]
    ConfigError(String),

    #[error("計算錯誤: {0}")]
    CalculationError(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AllocError>;

/// 檢查資料表是否包含所有必要欄位
///
/// 供上游資料匯入層使用：欄位缺失屬於致命驗證錯誤，
/// 回報缺失欄位清單，不進行任何部分計算。
pub fn check_required_columns(
    table: &str,
    present: &[&str],
    required: &[&str],
) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|col| !present.contains(col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AllocError::MissingColumns {
            table: table.to_string(),
            columns: missing,
        })
    }
}
