//! 計劃期間模型

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{BlendError, Result};

/// 計劃期間（1 起算，全序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Period(u32);

impl Period {
    /// 創建期間；期間序號從 1 開始
    pub fn new(index: u32) -> Option<Self> {
        (index >= 1).then_some(Self(index))
    }

    /// 期間序號（1 起算）
    pub fn index(&self) -> u32 {
        self.0
    }

    /// 零起算的位置，用於稠密表格定位
    pub fn offset(&self) -> usize {
        self.0.saturating_sub(1) as usize
    }

    /// 前一期間；第 1 期沒有前一期
    pub fn prev(&self) -> Option<Period> {
        self.0.checked_sub(1).and_then(Period::new)
    }
}

impl TryFrom<u32> for Period {
    type Error = BlendError;

    fn try_from(index: u32) -> Result<Self> {
        Period::new(index)
            .ok_or_else(|| BlendError::InvalidParameter(format!("期間序號必須從 1 開始: {}", index)))
    }
}

impl From<Period> for u32 {
    fn from(period: Period) -> Self {
        period.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// 計劃時界（期間 1..=N）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Horizon {
    /// 期間數量
    pub length: u32,
}

impl Horizon {
    /// 創建新的計劃時界
    pub fn new(length: u32) -> Self {
        Self { length }
    }

    /// 期間數量
    pub fn len(&self) -> usize {
        self.length as usize
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// 依序列出所有期間
    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        (1..=self.length).map(Period)
    }

    /// 起始期間
    pub fn first(&self) -> Option<Period> {
        (self.length > 0).then_some(Period(1))
    }

    /// 最終期間
    pub fn last(&self) -> Option<Period> {
        Period::new(self.length)
    }

    /// 檢查期間是否在時界內
    pub fn contains(&self, period: Period) -> bool {
        period.0 <= self.length
    }

    /// 由零起算位置取得期間
    pub fn period_at(&self, offset: usize) -> Option<Period> {
        let index = u32::try_from(offset).ok()?.checked_add(1)?;
        (index <= self.length).then_some(Period(index))
    }
}
