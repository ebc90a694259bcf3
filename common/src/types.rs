//! 照合エンジンの型定義
//!
//! - ShadeRecord: カタログの1行（1色）
//! - SkinQuery: 利用者の肌情報（正規化済み）
//! - MatchResult: ランキング順の推薦結果

use crate::normalizer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// トーン区分（明るさの大分類）
///
/// 辞書に無いラベルは `Unrecognized` として小文字・トリム済みの文字列のまま保持する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ToneCategory {
    Light,
    Medium,
    MediumDark,
    Dark,
    Unrecognized(String),
}

impl ToneCategory {
    pub const CANONICAL: [ToneCategory; 4] = [
        ToneCategory::Light,
        ToneCategory::Medium,
        ToneCategory::MediumDark,
        ToneCategory::Dark,
    ];

    /// 正規化キー（再度正規化しても同じ区分になる）
    pub fn as_str(&self) -> &str {
        match self {
            ToneCategory::Light => "light",
            ToneCategory::Medium => "medium",
            ToneCategory::MediumDark => "medium dark",
            ToneCategory::Dark => "dark",
            ToneCategory::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, ToneCategory::Unrecognized(_))
    }
}

impl fmt::Display for ToneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToneCategory::Light => write!(f, "Light"),
            ToneCategory::Medium => write!(f, "Medium"),
            ToneCategory::MediumDark => write!(f, "Medium-Dark"),
            ToneCategory::Dark => write!(f, "Dark"),
            ToneCategory::Unrecognized(raw) => write!(f, "{}", raw),
        }
    }
}

impl From<String> for ToneCategory {
    fn from(raw: String) -> Self {
        normalizer::normalize_tone(&raw)
    }
}

impl From<ToneCategory> for String {
    fn from(tone: ToneCategory) -> Self {
        tone.as_str().to_string()
    }
}

/// アンダートーン区分（明るさとは独立した色味）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UndertoneCategory {
    Cool,
    Neutral,
    Warm,
    Unrecognized(String),
}

impl UndertoneCategory {
    pub const CANONICAL: [UndertoneCategory; 3] = [
        UndertoneCategory::Cool,
        UndertoneCategory::Neutral,
        UndertoneCategory::Warm,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            UndertoneCategory::Cool => "cool",
            UndertoneCategory::Neutral => "neutral",
            UndertoneCategory::Warm => "warm",
            UndertoneCategory::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, UndertoneCategory::Unrecognized(_))
    }
}

impl fmt::Display for UndertoneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndertoneCategory::Cool => write!(f, "Cool"),
            UndertoneCategory::Neutral => write!(f, "Neutral"),
            UndertoneCategory::Warm => write!(f, "Warm"),
            UndertoneCategory::Unrecognized(raw) => write!(f, "{}", raw),
        }
    }
}

impl From<String> for UndertoneCategory {
    fn from(raw: String) -> Self {
        normalizer::normalize_undertone(&raw)
    }
}

impl From<UndertoneCategory> for String {
    fn from(undertone: UndertoneCategory) -> Self {
        undertone.as_str().to_string()
    }
}

/// 商品種別
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Foundation,
    Concealer,
    /// 種別カラムが無い、または不明な値
    #[default]
    Unspecified,
}

impl ProductKind {
    /// カタログのセル値から判定（不明な値は Unspecified）
    pub fn parse(value: &str) -> Self {
        let value = value.trim().to_lowercase();
        if value.contains("concealer") {
            ProductKind::Concealer
        } else if value.contains("foundation") {
            ProductKind::Foundation
        } else {
            ProductKind::Unspecified
        }
    }

    /// 指定種別の候補になるか（Unspecified はどの種別にも使える）
    pub fn eligible_for(self, wanted: ProductKind) -> bool {
        self == ProductKind::Unspecified || wanted == ProductKind::Unspecified || self == wanted
    }
}

/// カタログの1行
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadeRecord {
    pub brand: String,
    pub product_line: String,
    pub shade_name: String,
    /// 色味タグ（大文字小文字を区別せず照合）
    #[serde(default)]
    pub description: String,
    /// 明るさ（0.0〜1.0）
    pub lightness: f64,
    /// `#RRGGBB`
    pub hex: String,
    #[serde(default)]
    pub image_ref: String,
    #[serde(default)]
    pub kind: ProductKind,
}

impl ShadeRecord {
    /// 表示用ラベル: `{brand} - {product} ({shade})`
    pub fn label(&self) -> String {
        format!("{} - {} ({})", self.brand, self.product_line, self.shade_name)
    }

    pub fn to_match_result(&self) -> MatchResult {
        MatchResult {
            label: self.label(),
            reason: self.description.clone(),
            image_ref: self.image_ref.clone(),
        }
    }
}

/// 利用者の肌情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinQuery {
    pub tone: ToneCategory,
    pub undertone: UndertoneCategory,
    /// 表示用のみ（照合には使わない）
    #[serde(default)]
    pub skin_type: String,
    /// 写真から得た色（手入力モードでは None）
    #[serde(default)]
    pub color_sample: Option<String>,
}

impl SkinQuery {
    pub fn new(tone: ToneCategory, undertone: UndertoneCategory) -> Self {
        Self {
            tone,
            undertone,
            skin_type: String::new(),
            color_sample: None,
        }
    }

    /// 生ラベルから正規化して作成
    pub fn from_labels(tone: &str, undertone: &str) -> Self {
        Self::new(
            normalizer::normalize_tone(tone),
            normalizer::normalize_undertone(undertone),
        )
    }

    pub fn with_skin_type(mut self, skin_type: impl Into<String>) -> Self {
        self.skin_type = skin_type.into();
        self
    }

    /// 空文字列は None として扱う
    pub fn with_color_sample(mut self, color_sample: Option<&str>) -> Self {
        self.color_sample = color_sample
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self
    }
}

/// 推薦結果（並び順がランキング）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub label: String,
    pub reason: String,
    pub image_ref: String,
}
