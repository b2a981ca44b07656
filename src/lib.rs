//! # Replenish
//!
//! 倉庫到門市的配貨與採購需求引擎：
//! 依覆蓋週數分段與三個係數矩陣，將有限倉庫庫存
//! 兩層配給門市，再從配貨剩餘推導採購需求。

pub use repl_calc::{
    AllocWarning, AllocationEngine, AllocationResult, NeedCalculator, PurchaseNeedCalculator,
    WarningSeverity,
};
pub use repl_core::{
    band_for, check_required_columns, product_cover, AllocError, AllocationConfig, BandSet,
    ClassificationParams, CoverBand, DemandRow, DepotStock, MatrixKind, MultiplierMatrix,
    PurchaseOrderRow, Result, ShipmentRecord, ShipmentTier, ShipmentTotal, StockPool,
    INFINITE_COVER,
};
