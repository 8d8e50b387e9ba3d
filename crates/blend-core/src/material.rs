//! 原料模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 精製線類別（每類別每期共用一條產能上限）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RefiningLine {
    /// 植物油精製線
    #[serde(rename = "VEG")]
    Veg,
    /// 非植物油精製線
    #[serde(rename = "NONVEG")]
    NonVeg,
}

impl RefiningLine {
    /// 所有精製線類別
    pub const ALL: [RefiningLine; 2] = [RefiningLine::Veg, RefiningLine::NonVeg];

    pub fn as_str(&self) -> &'static str {
        match self {
            RefiningLine::Veg => "VEG",
            RefiningLine::NonVeg => "NONVEG",
        }
    }
}

impl fmt::Display for RefiningLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 原料
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Material {
    /// 原料ID
    pub id: String,

    /// 硬度係數（線性調合品質指標）
    pub hardness: Decimal,

    /// 所屬精製線
    pub line: RefiningLine,
}

impl Material {
    /// 創建新的原料
    pub fn new(id: impl Into<String>, hardness: Decimal, line: RefiningLine) -> Self {
        Self {
            id: id.into(),
            hardness,
            line,
        }
    }

    /// 檢查是否屬於指定精製線
    pub fn is_on_line(&self, line: RefiningLine) -> bool {
        self.line == line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_material() {
        let material = Material::new("VEG1", Decimal::new(88, 1), RefiningLine::Veg);

        assert_eq!(material.id, "VEG1");
        assert_eq!(material.hardness, Decimal::new(88, 1));
        assert!(material.is_on_line(RefiningLine::Veg));
        assert!(!material.is_on_line(RefiningLine::NonVeg));
    }

    #[test]
    fn test_refining_line_serde_names() {
        assert_eq!(
            serde_json::to_string(&RefiningLine::NonVeg).unwrap(),
            "\"NONVEG\""
        );
        let line: RefiningLine = serde_json::from_str("\"VEG\"").unwrap();
        assert_eq!(line, RefiningLine::Veg);
        assert_eq!(RefiningLine::NonVeg.to_string(), "NONVEG");
    }
}
