//! 推薦処理
//!
//! 手入力モードと写真モードの入口。どちらも生ラベルを正規化して
//! `SkinQuery` を作り、読み込み済みカタログに対して照合する。

use crate::error::{Result, ShadeMatchError};
use shade_match_common::{
    parse_skin_analysis, recommend, Catalog, LabelAliases, Recommendation, RecommendOptions,
    SkinQuery,
};
use std::path::Path;

/// カタログファイルを読み込み
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if !path.exists() {
        return Err(ShadeMatchError::FileNotFound(path.display().to_string()));
    }
    Ok(Catalog::load(path)?)
}

/// 手入力の肌情報からクエリを作成
pub fn manual_query(
    tone: &str,
    undertone: &str,
    skin_type: &str,
    color: Option<&str>,
    aliases: &LabelAliases,
) -> SkinQuery {
    SkinQuery::new(aliases.normalize_tone(tone), aliases.normalize_undertone(undertone))
        .with_skin_type(skin_type.trim())
        .with_color_sample(color)
}

/// 手入力モード
pub fn recommend_manual(
    catalog: &Catalog,
    query: &SkinQuery,
    options: &RecommendOptions,
) -> Recommendation {
    log_unrecognized(query);
    recommend(catalog.records(), query, options)
}

/// 写真モード（画像解析サービスの返答テキストから）
pub fn recommend_from_response(
    catalog: &Catalog,
    response: &str,
    aliases: &LabelAliases,
    options: &RecommendOptions,
) -> Result<Recommendation> {
    let analysis = parse_skin_analysis(response)?;
    let query = analysis.to_query_with(aliases);
    log_unrecognized(&query);
    Ok(recommend(catalog.records(), &query, options))
}

fn log_unrecognized(query: &SkinQuery) {
    if !query.tone.is_recognized() {
        tracing::info!(tone = %query.tone, "不明なトーン（既定の明るさ 0.50 で照合）");
    }
    if !query.undertone.is_recognized() {
        tracing::info!(undertone = %query.undertone, "不明なアンダートーン（全件で照合）");
    }
}
