//! トーン・アンダートーンの正規化モジュール
//!
//! 画像解析サービスや手入力のラベルの表記ゆれを、固定の区分に寄せる。
//! 辞書に無いラベルはエラーにせず `Unrecognized` としてそのまま通す。

use crate::types::{ToneCategory, UndertoneCategory};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// トーンの同義語辞書
static TONE_SYNONYMS: &[(&str, ToneCategory)] = &[
    ("deep", ToneCategory::Dark),
    ("dark", ToneCategory::Dark),
    ("dark brown", ToneCategory::Dark),
    ("very dark", ToneCategory::Dark),
    ("medium dark", ToneCategory::MediumDark),
    ("medium-dark", ToneCategory::MediumDark),
    ("light-medium", ToneCategory::Medium),
    ("medium", ToneCategory::Medium),
    ("light", ToneCategory::Light),
    ("fair", ToneCategory::Light),
];

/// アンダートーンの同義語辞書
static UNDERTONE_SYNONYMS: &[(&str, UndertoneCategory)] = &[
    ("cool", UndertoneCategory::Cool),
    ("pink", UndertoneCategory::Cool),
    ("rosy", UndertoneCategory::Cool),
    ("neutral", UndertoneCategory::Neutral),
    ("olive", UndertoneCategory::Neutral),
    ("warm", UndertoneCategory::Warm),
    ("golden", UndertoneCategory::Warm),
    ("yellow", UndertoneCategory::Warm),
    ("peach", UndertoneCategory::Warm),
];

/// 照合キーに変換（トリム・小文字化・空白とアンダースコアの連続を1つの空白に）
pub fn label_key(raw: &str) -> String {
    lazy_static::lazy_static! {
        static ref SEPARATOR_RE: Regex = Regex::new(r"[\s_]+").unwrap();
    }
    SEPARATOR_RE
        .replace_all(raw.trim(), " ")
        .trim()
        .to_lowercase()
}

/// トーンを正規化
///
/// # Examples
/// ```
/// use shade_match_common::{normalize_tone, ToneCategory};
///
/// assert_eq!(normalize_tone("Deep"), ToneCategory::Dark);
/// assert_eq!(
///     normalize_tone("unknown-shade"),
///     ToneCategory::Unrecognized("unknown-shade".to_string())
/// );
/// ```
pub fn normalize_tone(raw: &str) -> ToneCategory {
    let key = label_key(raw);
    lookup(TONE_SYNONYMS, &key).unwrap_or(ToneCategory::Unrecognized(key))
}

/// アンダートーンを正規化
pub fn normalize_undertone(raw: &str) -> UndertoneCategory {
    let key = label_key(raw);
    lookup(UNDERTONE_SYNONYMS, &key).unwrap_or(UndertoneCategory::Unrecognized(key))
}

fn lookup<T: Clone>(table: &[(&str, T)], key: &str) -> Option<T> {
    table
        .iter()
        .find(|(synonym, _)| *synonym == key)
        .map(|(_, category)| category.clone())
}

/// 利用者定義のラベル別名（組み込み辞書より優先）
///
/// 値は正規化キー（`light`, `medium dark`, `warm` など）またはその同義語。
/// 区分に解決できない値を持つ別名は無視される。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelAliases {
    #[serde(default)]
    pub tone: BTreeMap<String, String>,
    #[serde(default)]
    pub undertone: BTreeMap<String, String>,
}

impl LabelAliases {
    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_empty(&self) -> bool {
        self.tone.is_empty() && self.undertone.is_empty()
    }

    pub fn normalize_tone(&self, raw: &str) -> ToneCategory {
        let key = label_key(raw);
        if let Some(target) = find_alias(&self.tone, &key) {
            let resolved = normalize_tone(target);
            if resolved.is_recognized() {
                return resolved;
            }
            tracing::debug!(alias = %key, value = target, "トーン別名の値が区分に解決できません");
        }
        normalize_tone(&key)
    }

    pub fn normalize_undertone(&self, raw: &str) -> UndertoneCategory {
        let key = label_key(raw);
        if let Some(target) = find_alias(&self.undertone, &key) {
            let resolved = normalize_undertone(target);
            if resolved.is_recognized() {
                return resolved;
            }
            tracing::debug!(alias = %key, value = target, "アンダートーン別名の値が区分に解決できません");
        }
        normalize_undertone(&key)
    }

    /// 設定をマージ（後から追加した設定が優先）
    pub fn merge(&mut self, other: &LabelAliases) {
        self.tone.extend(other.tone.clone());
        self.undertone.extend(other.undertone.clone());
    }
}

/// 照合キーが一致する別名を探す
///
/// 照合キーそのものの登録を優先し、無ければキー順で最初に一致したもの。
fn find_alias<'a>(aliases: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    aliases
        .get(key)
        .or_else(|| {
            aliases
                .iter()
                .find(|(alias, _)| label_key(alias) == key)
                .map(|(_, target)| target)
        })
        .map(String::as_str)
}
