//! # Replenishment Calculation Engine
//!
//! 核心配貨計算引擎

use serde::{Deserialize, Serialize};

pub mod allocator;
pub mod need;
pub mod purchase;

// Re-export 主要類型
pub use allocator::AllocationEngine;
pub use need::NeedCalculator;
pub use purchase::PurchaseNeedCalculator;

/// 配貨計算結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationResult {
    /// 逐筆配貨記錄
    pub shipments: Vec<repl_core::ShipmentRecord>,

    /// 配貨彙總
    pub totals: Vec<repl_core::ShipmentTotal>,

    /// 配貨後的倉庫池狀態（每鍵一列，已排序）
    pub final_stock: Vec<repl_core::DepotStock>,

    /// 警告信息
    pub warnings: Vec<AllocWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,

    /// 計算時間戳
    pub generated_at: Option<chrono::NaiveDateTime>,
}

impl AllocationResult {
    /// 創建空的計算結果
    pub fn empty() -> Self {
        Self {
            shipments: Vec::new(),
            totals: Vec::new(),
            final_stock: Vec::new(),
            warnings: Vec::new(),
            calculation_time_ms: None,
            generated_at: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: AllocWarning) {
        self.warnings.push(warning);
    }
}

/// 配貨警告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocWarning {
    /// 警告範圍（如分類代碼、區間對）
    pub scope: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl AllocWarning {
    pub fn new(scope: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            scope,
            message,
            severity,
        }
    }

    pub fn info(scope: String, message: String) -> Self {
        Self::new(scope, message, WarningSeverity::Info)
    }

    pub fn warning(scope: String, message: String) -> Self {
        Self::new(scope, message, WarningSeverity::Warning)
    }
}

/// 警告嚴重度（致命問題走類型化錯誤，不在此列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningSeverity {
    Info,
    Warning,
}
