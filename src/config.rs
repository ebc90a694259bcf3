use crate::error::{Result, ShadeMatchError};
use serde::{Deserialize, Serialize};
use shade_match_common::matcher::{DEFAULT_CONCEALER_LIFT, DEFAULT_MAX_RESULTS};
use shade_match_common::{LabelAliases, RecommendOptions};
use std::path::{Path, PathBuf};

pub const ENV_CATALOG: &str = "SHADE_MATCH_CATALOG";
pub const ENV_MAX_RESULTS: &str = "SHADE_MATCH_MAX_RESULTS";
pub const ENV_CONCEALER_LIFT: &str = "SHADE_MATCH_CONCEALER_LIFT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// シェードカタログ（CSV / Excel）
    pub catalog_path: Option<PathBuf>,
    /// 推薦件数
    pub max_results: usize,
    /// コンシーラーの明るさ加算値
    pub concealer_lift: f64,
    /// ラベル別名
    pub aliases: LabelAliases,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            max_results: DEFAULT_MAX_RESULTS,
            concealer_lift: DEFAULT_CONCEALER_LIFT,
            aliases: LabelAliases::default(),
        }
    }
}

impl Config {
    /// 設定ファイルを読み込み、環境変数で上書き
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    /// 指定パスから読み込み（無ければ既定値）
    ///
    /// 環境変数は反映しない。
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let mut config: Config = serde_json::from_str(&content)?;
            config.concealer_lift = checked_lift(config.concealer_lift, "設定ファイル");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ShadeMatchError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("shade-match").join("config.json"))
    }

    /// `SHADE_MATCH_*` 環境変数を反映
    pub fn apply_env(&mut self) {
        if let Ok(path) = std::env::var(ENV_CATALOG) {
            if !path.trim().is_empty() {
                self.catalog_path = Some(PathBuf::from(path));
            }
        }
        self.max_results = env_parse(ENV_MAX_RESULTS, self.max_results);
        let lift = env_parse(ENV_CONCEALER_LIFT, self.concealer_lift);
        if is_valid_lift(lift) {
            self.concealer_lift = lift;
        } else {
            tracing::warn!(key = ENV_CONCEALER_LIFT, value = lift, "コンシーラー補正値が範囲外のため無視します");
        }
    }

    /// 使用するカタログパス（CLI指定 > 環境変数・設定ファイル）
    pub fn resolve_catalog(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.catalog_path.clone())
            .ok_or(ShadeMatchError::CatalogNotConfigured)
    }

    pub fn recommend_options(&self, max_results: Option<usize>) -> RecommendOptions {
        RecommendOptions {
            max_results: max_results.unwrap_or(self.max_results),
            concealer_lift: self.concealer_lift,
        }
    }

    /// カタログパスを設定ファイルに保存
    ///
    /// 保存するのはファイルの内容のみで、環境変数による上書きは書き込まない。
    pub fn set_catalog(&mut self, path: PathBuf) -> Result<()> {
        self.catalog_path = Some(path.clone());
        Self::update_file(&Self::config_path()?, |file| file.catalog_path = Some(path))
    }

    pub fn set_max_results(&mut self, max_results: usize) -> Result<()> {
        self.max_results = max_results;
        Self::update_file(&Self::config_path()?, |file| file.max_results = max_results)
    }

    /// 設定ファイルを読み直して一部を書き換える
    pub fn update_file(path: &Path, edit: impl FnOnce(&mut Config)) -> Result<()> {
        let mut file = Self::load_from(path)?;
        edit(&mut file);
        file.save_to(path)
    }
}

/// コンシーラー補正値の許容範囲（0〜1の有限値）
pub fn is_valid_lift(lift: f64) -> bool {
    lift.is_finite() && (0.0..=1.0).contains(&lift)
}

fn checked_lift(lift: f64, source: &str) -> f64 {
    if is_valid_lift(lift) {
        lift
    } else {
        tracing::warn!(source, value = lift, "コンシーラー補正値が範囲外のため既定値を使います");
        DEFAULT_CONCEALER_LIFT
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
