//! 推薦結果・カタログ情報の表示

use shade_match_common::{LoadReport, MatchResult, Recommendation};
use std::fmt::Write;

/// 推薦結果をテキストに整形
pub fn render_recommendation(recommendation: &Recommendation) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "肌情報:");
    let _ = writeln!(out, "  トーン: {}", or_dash(&recommendation.skin_tone_detected));
    let _ = writeln!(out, "  アンダートーン: {}", or_dash(&recommendation.undertone_detected));
    let _ = writeln!(out, "  肌質: {}", or_dash(&recommendation.skin_type_detected));

    render_section(&mut out, "ファンデーション", &recommendation.recommended_foundations);
    render_section(&mut out, "コンシーラー", &recommendation.recommended_concealers);

    out
}

fn render_section(out: &mut String, title: &str, results: &[MatchResult]) {
    let _ = writeln!(out, "\n{} ({}件):", title, results.len());
    if results.is_empty() {
        let _ = writeln!(out, "  該当なし");
        return;
    }
    for (i, result) in results.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, result.label);
        if !result.reason.is_empty() {
            let _ = writeln!(out, "     {}", result.reason);
        }
        if !result.image_ref.is_empty() {
            let _ = writeln!(out, "     {}", result.image_ref);
        }
    }
}

/// カタログの読み込み統計を整形
pub fn render_load_report(report: &LoadReport, show_dropped: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  データ行: {}", report.total_rows);
    let _ = writeln!(out, "  読み込み: {}", report.loaded);
    let _ = writeln!(out, "  スキップ: {}", report.dropped.len());

    if show_dropped {
        for issue in &report.dropped {
            let _ = writeln!(out, "    {}行目: {}", issue.line, issue.reason);
        }
    }
    out
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shade_match_common::RowIssue;

    #[test]
    fn test_render_recommendation() {
        let recommendation = Recommendation {
            skin_tone_detected: "Light".into(),
            undertone_detected: "Warm".into(),
            skin_type_detected: String::new(),
            recommended_foundations: vec![MatchResult {
                label: "B - P (S)".into(),
                reason: "warm golden".into(),
                image_ref: String::new(),
            }],
            recommended_concealers: vec![],
        };
        let text = render_recommendation(&recommendation);
        assert!(text.contains("トーン: Light"));
        assert!(text.contains("肌質: -"));
        assert!(text.contains("1. B - P (S)"));
        assert!(text.contains("warm golden"));
        assert!(text.contains("コンシーラー (0件):\n  該当なし"));
    }

    #[test]
    fn test_render_load_report() {
        let report = LoadReport {
            total_rows: 3,
            loaded: 2,
            dropped: vec![RowIssue {
                line: 4,
                reason: "hex が不正です".into(),
            }],
        };
        let text = render_load_report(&report, true);
        assert!(text.contains("読み込み: 2"));
        assert!(text.contains("4行目: hex が不正です"));
        assert!(!render_load_report(&report, false).contains("4行目"));
    }
}
