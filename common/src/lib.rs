//! Shade Match Common Library
//!
//! CLIと他のフロントエンドで共有される型と照合エンジン

pub mod types;
pub mod color;
pub mod error;
pub mod normalizer;
pub mod catalog;
pub mod matcher;
pub mod parser;

pub use types::{MatchResult, ProductKind, ShadeRecord, SkinQuery, ToneCategory, UndertoneCategory};
pub use color::Rgb;
pub use error::{Error, Result};
pub use normalizer::{normalize_tone, normalize_undertone, LabelAliases};
pub use catalog::{Catalog, LoadReport, RowIssue, SharedCatalog};
pub use matcher::{
    match_shades, match_with_options, rank, recommend, MatchOptions, Recommendation,
    RecommendOptions, ScoredShade,
};
pub use parser::{extract_json, parse_skin_analysis, SkinAnalysis};
