//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// カタログが読めない、またはヘッダーが不正
    #[error("Catalog load error: {0}")]
    CatalogLoad(String),

    /// 必須カラムの欠落
    #[error("Catalog load error: missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// 起動時に致命的なカタログ読み込みエラーかどうか
    pub fn is_catalog_load(&self) -> bool {
        matches!(self, Error::CatalogLoad(_) | Error::MissingColumns(_))
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_display_missing_columns() {
        let error = Error::MissingColumns(vec!["hex".to_string(), "lightness".to_string()]);
        assert_eq!(
            error.to_string(),
            "Catalog load error: missing required columns: hex, lightness"
        );
    }

    #[test]
    fn test_error_display_catalog_load() {
        let error = Error::CatalogLoad("ヘッダー行がありません".to_string());
        assert_eq!(error.to_string(), "Catalog load error: ヘッダー行がありません");
    }

    #[test]
    fn test_is_catalog_load() {
        assert!(Error::CatalogLoad("x".into()).is_catalog_load());
        assert!(Error::MissingColumns(vec![]).is_catalog_load());
        assert!(!Error::InvalidColor("#zz".into()).is_catalog_load());
        assert!(!Error::Parse("x".into()).is_catalog_load());
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }
}
