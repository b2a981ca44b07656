//! 覆蓋週數分段

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AllocError, Result};

/// 無限覆蓋哨兵值（週銷量為零時使用）
pub const INFINITE_COVER: i64 = 999;

/// 覆蓋區間：一個帶標籤的數值範圍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverBand {
    /// 下界（含）
    pub min_cover: Decimal,

    /// 上界（含）
    pub max_cover: Decimal,

    /// 區間標籤
    pub label: String,
}

impl CoverBand {
    /// 創建新的覆蓋區間
    pub fn new(min_cover: Decimal, max_cover: Decimal, label: impl Into<String>) -> Self {
        Self {
            min_cover,
            max_cover,
            label: label.into(),
        }
    }

    /// 檢查數值是否落在區間內
    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min_cover && value <= self.max_cover
    }
}

/// 已驗證的有序覆蓋區間集
///
/// 建立時驗證：非空、依下界升冪排序、區間不重疊。
/// 重疊在配置階段即拒絕，`band_for` 因此沒有先匹配歧義。
/// 反序列化同樣經過驗證，外部儲存的配置無法繞過。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<CoverBand>", into = "Vec<CoverBand>")]
pub struct BandSet {
    bands: Vec<CoverBand>,
}

impl TryFrom<Vec<CoverBand>> for BandSet {
    type Error = AllocError;

    fn try_from(bands: Vec<CoverBand>) -> Result<Self> {
        Self::new(bands)
    }
}

impl From<BandSet> for Vec<CoverBand> {
    fn from(set: BandSet) -> Self {
        set.bands
    }
}

impl BandSet {
    /// 創建新的區間集（驗證排序與不重疊）
    pub fn new(bands: Vec<CoverBand>) -> Result<Self> {
        if bands.is_empty() {
            return Err(AllocError::InvalidBands("區間集不可為空".to_string()));
        }

        for pair in bands.windows(2) {
            if pair[1].min_cover < pair[0].min_cover {
                return Err(AllocError::InvalidBands(format!(
                    "區間未依下界升冪排序: {} 在 {} 之後",
                    pair[1].label, pair[0].label
                )));
            }
            if pair[1].min_cover <= pair[0].max_cover {
                return Err(AllocError::InvalidBands(format!(
                    "區間重疊: {} 與 {}",
                    pair[0].label, pair[1].label
                )));
            }
        }

        for band in &bands {
            if band.max_cover < band.min_cover {
                return Err(AllocError::InvalidBands(format!(
                    "區間 {} 上界小於下界",
                    band.label
                )));
            }
        }

        Ok(Self { bands })
    }

    /// 標準區間集（覆蓋週數 0-4 / 4-8 / 8-12 / 12-16 / 16+）
    ///
    /// 上界 999 同時容納無限覆蓋哨兵值。
    pub fn standard() -> Self {
        let bands = vec![
            CoverBand::new(Decimal::ZERO, Decimal::from(4), "0-4"),
            CoverBand::new(Decimal::new(401, 2), Decimal::from(8), "4-8"),
            CoverBand::new(Decimal::new(801, 2), Decimal::from(12), "8-12"),
            CoverBand::new(Decimal::new(1201, 2), Decimal::from(16), "12-16"),
            CoverBand::new(Decimal::new(1601, 2), Decimal::from(INFINITE_COVER), "16+"),
        ];
        // 標準區間固定合法
        Self { bands }
    }

    /// 區間列表（依下界升冪）
    pub fn bands(&self) -> &[CoverBand] {
        &self.bands
    }

    /// 區間標籤列表（依下界升冪）
    pub fn labels(&self) -> Vec<&str> {
        self.bands.iter().map(|b| b.label.as_str()).collect()
    }

    /// 最低區間的標籤
    pub fn lowest_label(&self) -> &str {
        &self.bands[0].label
    }

    /// 最高區間的標籤
    pub fn highest_label(&self) -> &str {
        &self.bands[self.bands.len() - 1].label
    }

    /// 查詢標籤的區間索引
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.bands.iter().position(|b| b.label == label)
    }
}

/// 將覆蓋週數歸入區間，返回區間標籤
///
/// 取第一個滿足 `min ≤ value ≤ max` 的區間；全部不匹配時
/// 落入最高區間。分段失敗絕不中止配貨。
pub fn band_for(value: Decimal, bands: &BandSet) -> &str {
    for band in bands.bands() {
        if band.contains(value) {
            return &band.label;
        }
    }
    bands.highest_label()
}

/// 商品覆蓋週數 = 門市現有庫存 / 週銷量（四捨五入到 2 位）
///
/// 週銷量 ≤ 0 返回無限覆蓋哨兵值；庫存 ≤ 0 返回 0。
/// 在途庫存刻意排除在外（尚未實際到店），但計入需求量計算。
pub fn product_cover(weekly_sales: Decimal, current_stock: Decimal) -> Decimal {
    if weekly_sales <= Decimal::ZERO {
        return Decimal::from(INFINITE_COVER);
    }
    if current_stock <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (current_stock / weekly_sales).round_dp(2)
}
