//! 倉庫庫存模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 倉庫庫存資料表的必要欄位
pub const REQUIRED_STOCK_COLUMNS: [&str; 3] = ["depot_id", "product_id", "quantity"];

/// 倉庫庫存列：一個（倉庫、商品）的可配數量
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepotStock {
    /// 倉庫ID
    pub depot_id: String,

    /// 商品ID
    pub product_id: String,

    /// 可配數量
    pub quantity: Decimal,
}

impl DepotStock {
    /// 創建新的倉庫庫存列（負數鉗制到 0）
    pub fn new(depot_id: String, product_id: String, quantity: Decimal) -> Self {
        Self {
            depot_id,
            product_id,
            quantity: quantity.max(Decimal::ZERO),
        }
    }
}

/// 庫存池：配貨引擎專屬持有的工作副本
///
/// 建池時將同鍵的重複列合併加總，一個（倉庫、商品）只有一個邏輯池；
/// 配貨過程中逐群扣減，餘額不會為負。輸出時每鍵恰好一列。
#[derive(Debug, Clone, Default)]
pub struct StockPool {
    balances: HashMap<(String, String), Decimal>,
}

impl StockPool {
    /// 從庫存列建池（重複鍵加總）
    pub fn from_entries(entries: &[DepotStock]) -> Self {
        let mut balances: HashMap<(String, String), Decimal> = HashMap::new();
        for entry in entries {
            let key = (entry.depot_id.clone(), entry.product_id.clone());
            *balances.entry(key).or_insert(Decimal::ZERO) +=
                entry.quantity.max(Decimal::ZERO);
        }
        Self { balances }
    }

    /// 查詢池餘額（無此鍵視為 0）
    pub fn balance(&self, depot_id: &str, product_id: &str) -> Decimal {
        self.balances
            .get(&(depot_id.to_string(), product_id.to_string()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// 回寫池餘額（負數鉗制到 0）
    pub fn set_balance(&mut self, depot_id: &str, product_id: &str, quantity: Decimal) {
        self.balances.insert(
            (depot_id.to_string(), product_id.to_string()),
            quantity.max(Decimal::ZERO),
        );
    }

    /// 池數量
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// 是否為空
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// 輸出為排序後的庫存列（每鍵一列）
    pub fn into_entries(self) -> Vec<DepotStock> {
        let mut entries: Vec<DepotStock> = self
            .balances
            .into_iter()
            .map(|((depot_id, product_id), quantity)| DepotStock {
                depot_id,
                product_id,
                quantity,
            })
            .collect();

        entries.sort_by(|a, b| {
            (a.depot_id.as_str(), a.product_id.as_str())
                .cmp(&(b.depot_id.as_str(), b.product_id.as_str()))
        });
        entries
    }
}
