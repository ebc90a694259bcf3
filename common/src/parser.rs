//! 画像解析レスポンスパーサー
//!
//! 肌解析サービスの返答テキストからJSONを取り出し、
//! トーン・アンダートーン・肌質・色見本の生ラベルを得る。

use crate::error::{Error, Result};
use crate::normalizer::LabelAliases;
use crate::types::SkinQuery;
use serde::{Deserialize, Deserializer, Serialize};

/// 肌解析の生ラベル
///
/// キーが無い場合も値が `null` の場合も空文字列になる。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinAnalysis {
    #[serde(alias = "skin_tone", deserialize_with = "null_as_empty")]
    pub skin_tone_detected: String,
    #[serde(alias = "undertone", deserialize_with = "null_as_empty")]
    pub undertone_detected: String,
    #[serde(alias = "skin_type", deserialize_with = "null_as_empty")]
    pub skin_type_detected: String,
    #[serde(alias = "color_sample", alias = "hex")]
    pub skin_color_hex: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl SkinAnalysis {
    /// 組み込み辞書で正規化してクエリを作成
    pub fn to_query(&self) -> SkinQuery {
        self.to_query_with(&LabelAliases::default())
    }

    /// 別名設定を使って正規化してクエリを作成
    pub fn to_query_with(&self, aliases: &LabelAliases) -> SkinQuery {
        SkinQuery::new(
            aliases.normalize_tone(&self.skin_tone_detected),
            aliases.normalize_undertone(&self.undertone_detected),
        )
        .with_skin_type(self.skin_type_detected.trim())
        .with_color_sample(self.skin_color_hex.as_deref())
    }
}

/// レスポンスからJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 最初の `{` から最後の `}` まで
/// 3. エラー
///
/// # Examples
/// ```
/// use shade_match_common::extract_json;
///
/// let response = "結果です: {\"skin_tone_detected\": \"Fair\"} 以上";
/// assert_eq!(extract_json(response).unwrap(), "{\"skin_tone_detected\": \"Fair\"}");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    if let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) {
        if end > start {
            return Ok(&response[start..=end]);
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// 肌解析レスポンスをパース
///
/// まずそのままJSONとして読み、失敗したら `extract_json` で切り出して再試行する。
pub fn parse_skin_analysis(response: &str) -> Result<SkinAnalysis> {
    let trimmed = response.trim();
    if let Ok(analysis) = serde_json::from_str::<SkinAnalysis>(trimmed) {
        return Ok(analysis);
    }

    let json_str = extract_json(trimmed)?;
    serde_json::from_str(json_str)
        .map_err(|e| Error::Parse(format!("肌解析JSONパースエラー: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ToneCategory, UndertoneCategory};

    #[test]
    fn test_parse_strict_json() {
        let response = r##"{
            "skin_tone_detected": "Medium",
            "undertone_detected": "Olive",
            "skin_type_detected": "Combination",
            "skin_color_hex": "#C68642"
        }"##;
        let analysis = parse_skin_analysis(response).unwrap();
        assert_eq!(analysis.skin_tone_detected, "Medium");
        assert_eq!(analysis.skin_color_hex.as_deref(), Some("#C68642"));

        let query = analysis.to_query();
        assert_eq!(query.tone, ToneCategory::Medium);
        assert_eq!(query.undertone, UndertoneCategory::Neutral);
        assert_eq!(query.skin_type, "Combination");
        assert_eq!(query.color_sample.as_deref(), Some("#C68642"));
    }

    #[test]
    fn test_parse_fenced_block() {
        let response = "Here you go:\n```json\n{\"skin_tone_detected\": \"deep\", \"undertone_detected\": \"golden\"}\n```\nThanks";
        let query = parse_skin_analysis(response).unwrap().to_query();
        assert_eq!(query.tone, ToneCategory::Dark);
        assert_eq!(query.undertone, UndertoneCategory::Warm);
        assert_eq!(query.color_sample, None);
    }

    #[test]
    fn test_parse_prose_around_json() {
        let response = "Analysis complete. {\"skin_tone\": \"fair\", \"undertone\": \"pink\", \"skin_type\": \"dry\"} Hope this helps!";
        let analysis = parse_skin_analysis(response).unwrap();
        assert_eq!(analysis.skin_tone_detected, "fair");
        assert_eq!(analysis.skin_type_detected, "dry");
    }

    #[test]
    fn test_missing_keys_default_to_empty() {
        let analysis = parse_skin_analysis("{}").unwrap();
        assert_eq!(analysis, SkinAnalysis::default());
        let query = analysis.to_query();
        assert!(!query.tone.is_recognized());
    }

    #[test]
    fn test_null_values_default_to_empty() {
        let response = r#"{"skin_tone_detected": null, "undertone_detected": "warm", "skin_type_detected": null, "skin_color_hex": null}"#;
        let analysis = parse_skin_analysis(response).unwrap();
        assert_eq!(analysis.skin_tone_detected, "");
        assert_eq!(analysis.skin_type_detected, "");
        assert_eq!(analysis.skin_color_hex, None);

        let query = analysis.to_query();
        assert!(!query.tone.is_recognized());
        assert_eq!(query.undertone, UndertoneCategory::Warm);
    }

    #[test]
    fn test_no_json_is_error() {
        let err = parse_skin_analysis("I could not see a face in this photo.").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_broken_json_is_error() {
        let err = parse_skin_analysis("result: {\"skin_tone_detected\": }").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_extract_json_priority() {
        let response = "{\"a\":1}\n```json\n{\"b\":2}\n```";
        assert_eq!(extract_json(response).unwrap(), "{\"b\":2}");
    }
}
