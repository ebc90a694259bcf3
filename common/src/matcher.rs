//! シェード照合エンジン
//!
//! ## 処理フロー
//! 1. アンダートーンのキーワードで説明文を絞り込み（該当なしなら全件に戻す）
//! 2. トーン区分から目標の明るさを決定
//! 3. 明るさの差（主キー）と色距離（副キー）で安定ソート
//! 4. 上位 `max_results` 件を `MatchResult` に変換

use crate::color::Rgb;
use crate::types::{MatchResult, ProductKind, ShadeRecord, SkinQuery, ToneCategory, UndertoneCategory};
use serde::{Deserialize, Serialize};

/// 返却件数の既定値
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// 色見本が無い、または行の色が読めない場合の色距離
pub const HEX_PENALTY: f64 = 0.5;

/// 辞書に無いトーンの目標明るさ
pub const DEFAULT_TARGET_LIGHTNESS: f64 = 0.50;

/// コンシーラーをファンデーションより明るくする量（1〜2段階）
pub const DEFAULT_CONCEALER_LIFT: f64 = 0.05;

/// アンダートーン → 説明文キーワード
static UNDERTONE_KEYWORDS: &[(UndertoneCategory, &[&str])] = &[
    (UndertoneCategory::Cool, &["cool", "pink", "rosy"]),
    (UndertoneCategory::Neutral, &["neutral", "olive"]),
    (UndertoneCategory::Warm, &["warm", "golden", "yellow", "peach"]),
];

/// トーン → 目標の明るさ
static TONE_TARGETS: &[(ToneCategory, f64)] = &[
    (ToneCategory::Light, 0.90),
    (ToneCategory::Medium, 0.72),
    (ToneCategory::MediumDark, 0.53),
    (ToneCategory::Dark, 0.30),
];

/// アンダートーンのキーワード（辞書に無い区分は空）
pub fn undertone_keywords(undertone: &UndertoneCategory) -> &'static [&'static str] {
    UNDERTONE_KEYWORDS
        .iter()
        .find(|(category, _)| category == undertone)
        .map(|(_, keywords)| *keywords)
        .unwrap_or(&[])
}

/// トーンの目標明るさ
pub fn target_lightness(tone: &ToneCategory) -> f64 {
    TONE_TARGETS
        .iter()
        .find(|(category, _)| category == tone)
        .map(|(_, target)| *target)
        .unwrap_or(DEFAULT_TARGET_LIGHTNESS)
}

/// 説明文がキーワードのいずれかを含むか（大文字小文字を区別しない）
pub fn description_matches(description: &str, keywords: &[&str]) -> bool {
    let description = description.to_lowercase();
    keywords.iter().any(|keyword| description.contains(keyword))
}

/// 照合オプション
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOptions {
    pub max_results: usize,
    /// 目標明るさへの加算値（結果は0〜1に収める）
    pub lightness_offset: f64,
    /// 指定時はその種別（と種別未設定）の行のみ対象
    pub kind: Option<ProductKind>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            lightness_offset: 0.0,
            kind: None,
        }
    }
}

impl MatchOptions {
    pub fn with_max_results(max_results: usize) -> Self {
        Self {
            max_results,
            ..Default::default()
        }
    }
}

/// スコア付きの候補
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredShade<'a> {
    pub record: &'a ShadeRecord,
    /// 目標明るさとの差（主キー）
    pub tone_diff: f64,
    /// 色見本との二乗距離（副キー）
    pub hex_diff: f64,
}

/// アンダートーンで絞り込み
///
/// キーワードが無い、または1件も該当しない場合は全件を返す（第2要素が `true`）。
pub fn filter_by_undertone<'a>(
    records: &[&'a ShadeRecord],
    undertone: &UndertoneCategory,
) -> (Vec<&'a ShadeRecord>, bool) {
    let keywords = undertone_keywords(undertone);
    let filtered: Vec<&ShadeRecord> = records
        .iter()
        .copied()
        .filter(|r| description_matches(&r.description, keywords))
        .collect();

    if filtered.is_empty() {
        tracing::debug!(
            undertone = %undertone,
            keywords = keywords.len(),
            "アンダートーンに該当する行が無いため全件で照合"
        );
        (records.to_vec(), true)
    } else {
        (filtered, false)
    }
}

/// 候補をスコア順に並べる
pub fn rank<'a>(
    records: &'a [ShadeRecord],
    query: &SkinQuery,
    options: &MatchOptions,
) -> Vec<ScoredShade<'a>> {
    if options.max_results == 0 || records.is_empty() {
        return Vec::new();
    }

    let eligible: Vec<&ShadeRecord> = match options.kind {
        Some(kind) => records.iter().filter(|r| r.kind.eligible_for(kind)).collect(),
        None => records.iter().collect(),
    };
    if eligible.is_empty() {
        return Vec::new();
    }

    let (candidates, _) = filter_by_undertone(&eligible, &query.undertone);

    if !query.tone.is_recognized() {
        tracing::debug!(tone = %query.tone, "不明なトーンのため既定の明るさで照合");
    }
    let offset = if options.lightness_offset.is_finite() {
        options.lightness_offset
    } else {
        tracing::warn!(offset = options.lightness_offset, "明るさ補正値が不正なため 0 として照合");
        0.0
    };
    let target = (target_lightness(&query.tone) + offset).clamp(0.0, 1.0);

    let sample = query
        .color_sample
        .as_deref()
        .and_then(|hex| match Rgb::from_hex(hex) {
            Ok(rgb) => Some(rgb),
            Err(e) => {
                tracing::debug!(error = %e, "色見本を無視します");
                None
            }
        });

    let mut scored: Vec<ScoredShade> = candidates
        .into_iter()
        .map(|record| ScoredShade {
            record,
            tone_diff: (record.lightness - target).abs(),
            hex_diff: hex_distance(sample.as_ref(), &record.hex),
        })
        .collect();

    // 安定ソート: 同点はカタログ順を維持
    scored.sort_by(|a, b| {
        a.tone_diff
            .total_cmp(&b.tone_diff)
            .then(a.hex_diff.total_cmp(&b.hex_diff))
    });
    scored.truncate(options.max_results);
    scored
}

fn hex_distance(sample: Option<&Rgb>, hex: &str) -> f64 {
    match sample {
        Some(sample) => Rgb::from_hex(hex)
            .map(|rgb| sample.squared_distance(&rgb))
            .unwrap_or(HEX_PENALTY),
        None => HEX_PENALTY,
    }
}

/// オプション付きで照合
pub fn match_with_options(
    records: &[ShadeRecord],
    query: &SkinQuery,
    options: &MatchOptions,
) -> Vec<MatchResult> {
    rank(records, query, options)
        .into_iter()
        .map(|scored| scored.record.to_match_result())
        .collect()
}

/// カタログから上位 `max_results` 件を選ぶ
///
/// # Examples
/// ```
/// use shade_match_common::{match_shades, ShadeRecord, SkinQuery};
///
/// let catalog = vec![ShadeRecord {
///     brand: "B".into(),
///     product_line: "P".into(),
///     shade_name: "S".into(),
///     description: "warm golden".into(),
///     lightness: 0.9,
///     hex: "#F5DEB3".into(),
///     ..Default::default()
/// }];
/// let query = SkinQuery::from_labels("fair", "golden");
/// let results = match_shades(&catalog, &query, 5);
/// assert_eq!(results[0].label, "B - P (S)");
/// ```
pub fn match_shades(records: &[ShadeRecord], query: &SkinQuery, max_results: usize) -> Vec<MatchResult> {
    match_with_options(records, query, &MatchOptions::with_max_results(max_results))
}

/// 推薦オプション
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendOptions {
    pub max_results: usize,
    pub concealer_lift: f64,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            concealer_lift: DEFAULT_CONCEALER_LIFT,
        }
    }
}

/// ファンデーション・コンシーラーの推薦結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub skin_tone_detected: String,
    pub undertone_detected: String,
    pub skin_type_detected: String,
    pub recommended_foundations: Vec<MatchResult>,
    pub recommended_concealers: Vec<MatchResult>,
}

/// ファンデーションとコンシーラー（目標を明るめにずらす）を推薦
pub fn recommend(records: &[ShadeRecord], query: &SkinQuery, options: &RecommendOptions) -> Recommendation {
    let foundations = match_with_options(
        records,
        query,
        &MatchOptions {
            max_results: options.max_results,
            lightness_offset: 0.0,
            kind: Some(ProductKind::Foundation),
        },
    );
    let concealers = match_with_options(
        records,
        query,
        &MatchOptions {
            max_results: options.max_results,
            lightness_offset: options.concealer_lift,
            kind: Some(ProductKind::Concealer),
        },
    );

    Recommendation {
        skin_tone_detected: query.tone.to_string(),
        undertone_detected: query.undertone.to_string(),
        skin_type_detected: query.skin_type.clone(),
        recommended_foundations: foundations,
        recommended_concealers: concealers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shade(name: &str, description: &str, lightness: f64, hex: &str) -> ShadeRecord {
        ShadeRecord {
            brand: "Brand".to_string(),
            product_line: "Line".to_string(),
            shade_name: name.to_string(),
            description: description.to_string(),
            lightness,
            hex: hex.to_string(),
            ..Default::default()
        }
    }

    fn names(results: &[MatchResult]) -> Vec<String> {
        results.iter().map(|r| r.label.clone()).collect()
    }

    #[test]
    fn test_keyword_table() {
        assert_eq!(undertone_keywords(&UndertoneCategory::Cool), &["cool", "pink", "rosy"]);
        assert_eq!(undertone_keywords(&UndertoneCategory::Neutral), &["neutral", "olive"]);
        assert_eq!(
            undertone_keywords(&UndertoneCategory::Warm),
            &["warm", "golden", "yellow", "peach"]
        );
        assert!(undertone_keywords(&UndertoneCategory::Unrecognized("mauve".into())).is_empty());
    }

    #[test]
    fn test_target_table() {
        assert_eq!(target_lightness(&ToneCategory::Light), 0.90);
        assert_eq!(target_lightness(&ToneCategory::Medium), 0.72);
        assert_eq!(target_lightness(&ToneCategory::MediumDark), 0.53);
        assert_eq!(target_lightness(&ToneCategory::Dark), 0.30);
        assert_eq!(
            target_lightness(&ToneCategory::Unrecognized("unknown-shade".into())),
            DEFAULT_TARGET_LIGHTNESS
        );
    }

    #[test]
    fn test_description_match_ignores_case() {
        assert!(description_matches("Warm Golden Beige", &["golden"]));
        assert!(!description_matches("cool rosy", &["warm", "golden"]));
        assert!(!description_matches("anything", &[]));
    }

    #[test]
    fn test_light_warm_picks_first_row() {
        let catalog = vec![
            shade("first", "warm golden", 0.90, "#F5DEB3"),
            shade("second", "cool rosy", 0.30, "#4B3621"),
        ];
        let query = SkinQuery::new(ToneCategory::Light, UndertoneCategory::Warm);
        let results = match_shades(&catalog, &query, 1);
        assert_eq!(names(&results), vec!["Brand - Line (first)"]);
    }

    #[test]
    fn test_empty_catalog_and_zero_results() {
        let query = SkinQuery::new(ToneCategory::Light, UndertoneCategory::Warm);
        assert!(match_shades(&[], &query, 5).is_empty());

        let catalog = vec![shade("a", "warm", 0.9, "#FFFFFF")];
        assert!(match_shades(&catalog, &query, 0).is_empty());
    }

    #[test]
    fn test_fallback_to_full_catalog() {
        let catalog = vec![
            shade("a", "cool rosy", 0.50, "#AAAAAA"),
            shade("b", "neutral", 0.60, "#BBBBBB"),
        ];
        let eligible: Vec<&ShadeRecord> = catalog.iter().collect();

        let (rows, fallback) = filter_by_undertone(&eligible, &UndertoneCategory::Warm);
        assert!(fallback);
        assert_eq!(rows.len(), 2);

        let (rows, fallback) =
            filter_by_undertone(&eligible, &UndertoneCategory::Unrecognized("mauve".into()));
        assert!(fallback);
        assert_eq!(rows.len(), 2);

        let (rows, fallback) = filter_by_undertone(&eligible, &UndertoneCategory::Cool);
        assert!(!fallback);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_color_sample_breaks_ties() {
        let catalog = vec![
            shade("far", "warm", 0.72, "#000000"),
            shade("exact", "warm", 0.72, "#F5DEB3"),
        ];
        let query = SkinQuery::new(ToneCategory::Medium, UndertoneCategory::Warm)
            .with_color_sample(Some("#F5DEB3"));
        let ranked = rank(&catalog, &query, &MatchOptions::default());
        assert_eq!(ranked[0].record.shade_name, "exact");
        assert_eq!(ranked[0].hex_diff, 0.0);
    }

    #[test]
    fn test_without_sample_keeps_catalog_order() {
        let catalog = vec![
            shade("one", "warm", 0.72, "#000000"),
            shade("two", "warm", 0.72, "#F5DEB3"),
            shade("three", "warm", 0.72, "#FFFFFF"),
        ];
        let query = SkinQuery::new(ToneCategory::Medium, UndertoneCategory::Warm);
        let ranked = rank(&catalog, &query, &MatchOptions::default());
        let order: Vec<&str> = ranked.iter().map(|s| s.record.shade_name.as_str()).collect();
        assert_eq!(order, vec!["one", "two", "three"]);
        assert!(ranked.iter().all(|s| s.hex_diff == HEX_PENALTY));
    }

    #[test]
    fn test_invalid_row_hex_gets_penalty() {
        let catalog = vec![
            shade("broken", "warm", 0.72, "not-a-color"),
            shade("close", "warm", 0.72, "#F0D0B0"),
        ];
        let query = SkinQuery::new(ToneCategory::Medium, UndertoneCategory::Warm)
            .with_color_sample(Some("#F5DEB3"));
        let ranked = rank(&catalog, &query, &MatchOptions::default());
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].record.shade_name, "close");
        assert_eq!(ranked[1].hex_diff, HEX_PENALTY);
    }

    #[test]
    fn test_invalid_sample_is_ignored() {
        let catalog = vec![shade("a", "warm", 0.72, "#F5DEB3")];
        let query = SkinQuery::new(ToneCategory::Medium, UndertoneCategory::Warm)
            .with_color_sample(Some("#GG0000"));
        let ranked = rank(&catalog, &query, &MatchOptions::default());
        assert_eq!(ranked[0].hex_diff, HEX_PENALTY);
    }

    #[test]
    fn test_unrecognized_tone_targets_default() {
        let catalog = vec![
            shade("light", "warm", 0.90, "#F5DEB3"),
            shade("mid", "warm", 0.50, "#C68642"),
            shade("dark", "warm", 0.30, "#4B3621"),
        ];
        let query = SkinQuery::from_labels("unknown-shade", "warm");
        let ranked = rank(&catalog, &query, &MatchOptions::default());
        assert_eq!(ranked[0].record.shade_name, "mid");
        assert!(ranked[0].tone_diff.abs() < 1e-12);
    }

    #[test]
    fn test_kind_filter_and_offset() {
        let mut concealer = shade("concealer", "warm", 0.77, "#F5DEB3");
        concealer.kind = ProductKind::Concealer;
        let mut foundation = shade("foundation", "warm", 0.72, "#F5DEB3");
        foundation.kind = ProductKind::Foundation;
        let catalog = vec![concealer, foundation];

        let query = SkinQuery::new(ToneCategory::Medium, UndertoneCategory::Warm);
        let options = MatchOptions {
            max_results: 5,
            lightness_offset: 0.05,
            kind: Some(ProductKind::Concealer),
        };
        let ranked = rank(&catalog, &query, &options);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].record.shade_name, "concealer");
        assert!(ranked[0].tone_diff < 1e-9);
    }

    #[test]
    fn test_offset_is_clamped() {
        let catalog = vec![shade("top", "cool", 1.0, "#FFFFFF")];
        let query = SkinQuery::new(ToneCategory::Light, UndertoneCategory::Cool);
        let options = MatchOptions {
            lightness_offset: 0.5,
            ..Default::default()
        };
        let ranked = rank(&catalog, &query, &options);
        assert!(ranked[0].tone_diff.abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_offset_is_ignored() {
        let catalog = vec![
            shade("Amande", "medium dark rosy", 0.58, "#9E6B4C"),
            shade("Deep Sand", "deep cool", 0.36, "#74492F"),
        ];
        let query = SkinQuery::new(ToneCategory::Dark, UndertoneCategory::Cool);

        for offset in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let options = MatchOptions {
                lightness_offset: offset,
                ..Default::default()
            };
            let ranked = rank(&catalog, &query, &options);
            assert_eq!(ranked[0].record.shade_name, "Deep Sand", "offset={}", offset);
            assert!(ranked.iter().all(|s| s.tone_diff.is_finite()));
        }
    }

    #[test]
    fn test_recommend_shape() {
        let catalog = vec![
            shade("a", "warm golden", 0.72, "#C68642"),
            shade("b", "warm peach", 0.77, "#D8A878"),
            shade("c", "warm", 0.60, "#A0704A"),
        ];
        let query = SkinQuery::from_labels("medium", "warm").with_skin_type("oily");
        let recommendation = recommend(&catalog, &query, &RecommendOptions::default());

        assert_eq!(recommendation.skin_tone_detected, "Medium");
        assert_eq!(recommendation.undertone_detected, "Warm");
        assert_eq!(recommendation.skin_type_detected, "oily");
        assert_eq!(recommendation.recommended_foundations[0].label, "Brand - Line (a)");
        // コンシーラーは明るめの行が先頭
        assert_eq!(recommendation.recommended_concealers[0].label, "Brand - Line (b)");
    }

    #[test]
    fn test_recommend_json_keys() {
        let query = SkinQuery::from_labels("light", "cool");
        let recommendation = recommend(&[], &query, &RecommendOptions::default());
        let json = serde_json::to_value(&recommendation).unwrap();
        assert!(json.get("recommended_foundations").unwrap().as_array().unwrap().is_empty());
        assert!(json.get("recommended_concealers").is_some());
        assert_eq!(json["skin_tone_detected"], "Light");
    }
}
