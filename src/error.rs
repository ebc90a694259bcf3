use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShadeMatchError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("カタログが設定されていません。`--catalog PATH` を指定するか `shade-match config --set-catalog PATH` で設定してください")]
    CatalogNotConfigured,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error(transparent)]
    Common(#[from] shade_match_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ShadeMatchError>;
