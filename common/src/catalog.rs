//! シェードカタログモジュール
//!
//! ファンデーション・コンシーラーの色データを表形式（CSV / Excel）から読み込み、
//! 照合エンジンが参照する読み取り専用のカタログを構築する。
//!
//! - ヘッダー名はトリムし、大文字小文字を無視して別名表で解決する
//! - `lightness` / `hex` が不正な行は警告を出して除外する（致命的ではない）
//! - 必須カラムの欠落や読み込み不能は `CatalogLoad` / `MissingColumns` エラー

use crate::color::canonical_hex;
use crate::error::{Error, Result};
use crate::types::{ProductKind, ShadeRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, OnceLock, RwLock};

/// カタログのカラム
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Brand,
    Product,
    Specific,
    Description,
    Lightness,
    Hex,
    ImgSrc,
    Kind,
}

impl Column {
    const REQUIRED: [Column; 7] = [
        Column::Brand,
        Column::Product,
        Column::Specific,
        Column::Description,
        Column::Lightness,
        Column::Hex,
        Column::ImgSrc,
    ];

    /// 欠落時のエラー表示に使う名前
    fn name(self) -> &'static str {
        match self {
            Column::Brand => "brand",
            Column::Product => "product",
            Column::Specific => "specific",
            Column::Description => "description",
            Column::Lightness => "lightness",
            Column::Hex => "hex",
            Column::ImgSrc => "imgSrc",
            Column::Kind => "category",
        }
    }
}

/// ヘッダー別名表（小文字で比較）
static COLUMN_ALIASES: &[(Column, &[&str])] = &[
    (Column::Brand, &["brand"]),
    (Column::Product, &["product", "productline", "product_line", "product line"]),
    (Column::Specific, &["specific", "shade", "shadename", "shade_name", "shade name"]),
    (Column::Description, &["description", "desc"]),
    (Column::Lightness, &["lightness"]),
    (Column::Hex, &["hex", "color"]),
    (Column::ImgSrc, &["imgsrc", "img_src", "image", "imageref", "image_ref", "imageurl"]),
    (Column::Kind, &["category", "kind", "type"]),
];

/// 欠損値として扱うセル
const MISSING_SENTINELS: &[&str] = &["nan", "null", "none"];

/// ヘッダー行から解決したカラム位置
#[derive(Debug, Clone)]
struct ColumnMap {
    brand: usize,
    product: usize,
    specific: usize,
    description: usize,
    lightness: usize,
    hex: usize,
    img_src: usize,
    kind: Option<usize>,
}

impl ColumnMap {
    fn from_header<S: AsRef<str>>(header: &[S]) -> Result<Self> {
        let keys: Vec<String> = header
            .iter()
            .map(|h| h.as_ref().trim().trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();

        let position = |column: Column| -> Option<usize> {
            let aliases = COLUMN_ALIASES
                .iter()
                .find(|(c, _)| *c == column)
                .map(|(_, aliases)| *aliases)
                .unwrap_or(&[]);
            keys.iter().position(|key| aliases.contains(&key.as_str()))
        };

        let missing: Vec<String> = Column::REQUIRED
            .iter()
            .filter(|c| position(**c).is_none())
            .map(|c| c.name().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingColumns(missing));
        }

        let required = |column: Column| {
            position(column).ok_or_else(|| Error::MissingColumns(vec![column.name().to_string()]))
        };

        Ok(Self {
            brand: required(Column::Brand)?,
            product: required(Column::Product)?,
            specific: required(Column::Specific)?,
            description: required(Column::Description)?,
            lightness: required(Column::Lightness)?,
            hex: required(Column::Hex)?,
            img_src: required(Column::ImgSrc)?,
            kind: position(Column::Kind),
        })
    }

    /// 1行をレコードに変換（不正な行は理由を返す）
    fn parse_row<S: AsRef<str>>(&self, fields: &[S]) -> std::result::Result<ShadeRecord, String> {
        let cell = |index: usize| fields.get(index).map(|f| f.as_ref().trim()).unwrap_or("");

        let lightness_raw = cell(self.lightness);
        let lightness: f64 = lightness_raw
            .parse()
            .map_err(|_| format!("lightness が数値ではありません: {:?}", lightness_raw))?;
        if !lightness.is_finite() || !(0.0..=1.0).contains(&lightness) {
            return Err(format!("lightness が範囲外です（0〜1）: {}", lightness));
        }

        let hex_raw = cell(self.hex);
        let hex = canonical_hex(hex_raw).map_err(|e| format!("hex が不正です: {}", e))?;

        Ok(ShadeRecord {
            brand: cell(self.brand).to_string(),
            product_line: cell(self.product).to_string(),
            shade_name: cell(self.specific).to_string(),
            description: text_or_empty(cell(self.description)),
            lightness,
            hex,
            image_ref: text_or_empty(cell(self.img_src)),
            kind: self
                .kind
                .map(|i| ProductKind::parse(cell(i)))
                .unwrap_or_default(),
        })
    }
}

/// 欠損値を空文字列に寄せる
fn text_or_empty(value: &str) -> String {
    if MISSING_SENTINELS.iter().any(|s| value.eq_ignore_ascii_case(s)) {
        String::new()
    } else {
        value.to_string()
    }
}

/// 除外した行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowIssue {
    /// 元データの行番号（ヘッダーが1行目）
    pub line: usize,
    pub reason: String,
}

/// 読み込み結果の統計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    /// ヘッダーと空行を除いたデータ行数
    pub total_rows: usize,
    pub loaded: usize,
    pub dropped: Vec<RowIssue>,
}

/// 読み込み済みのシェードカタログ（読み取り専用）
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<ShadeRecord>,
    report: LoadReport,
}

impl Catalog {
    /// レコードから直接作成（読み込み検証は行わない）
    pub fn from_records(records: Vec<ShadeRecord>) -> Self {
        let report = LoadReport {
            total_rows: records.len(),
            loaded: records.len(),
            dropped: Vec::new(),
        };
        Self { records, report }
    }

    /// ファイルから読み込み（拡張子で CSV / Excel を判定）
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            #[cfg(feature = "excel")]
            "xlsx" | "xlsm" | "xls" | "ods" => Self::from_workbook(path),
            #[cfg(not(feature = "excel"))]
            "xlsx" | "xlsm" | "xls" | "ods" => Err(Error::CatalogLoad(format!(
                "Excel読み込みは無効です（excel フィーチャー）: {}",
                path.display()
            ))),
            _ => Self::from_csv(path),
        }
    }

    /// CSVファイルから読み込み
    pub fn from_csv(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::CatalogLoad(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_csv_str(&content)?;
        tracing::info!(
            path = %path.display(),
            loaded = catalog.report.loaded,
            dropped = catalog.report.dropped.len(),
            "カタログを読み込みました"
        );
        Ok(catalog)
    }

    /// CSV文字列から読み込み
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header_line) = lines
            .next()
            .ok_or_else(|| Error::CatalogLoad("ヘッダー行がありません".into()))?;
        let header = parse_csv_line(header_line);

        Self::from_rows(&header, lines.map(|(n, line)| (n, parse_csv_line(line))))
    }

    /// Excel / ODS の先頭シートから読み込み
    #[cfg(feature = "excel")]
    pub fn from_workbook(path: &Path) -> Result<Self> {
        use calamine::{open_workbook_auto, Reader};

        let mut workbook = open_workbook_auto(path)
            .map_err(|e| Error::CatalogLoad(format!("{}: {}", path.display(), e)))?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| Error::CatalogLoad(format!("シートがありません: {}", path.display())))?;
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| Error::CatalogLoad(format!("{} [{}]: {}", path.display(), sheet, e)))?;

        let mut rows = range
            .rows()
            .enumerate()
            .map(|(i, row)| (i + 1, row.iter().map(|c| c.to_string()).collect::<Vec<String>>()))
            .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()));

        let (_, header) = rows
            .next()
            .ok_or_else(|| Error::CatalogLoad(format!("ヘッダー行がありません: {}", path.display())))?;

        let catalog = Self::from_rows(&header, rows)?;
        tracing::info!(
            path = %path.display(),
            sheet = %sheet,
            loaded = catalog.report.loaded,
            dropped = catalog.report.dropped.len(),
            "カタログを読み込みました"
        );
        Ok(catalog)
    }

    fn from_rows<H, S, I>(header: &[H], rows: I) -> Result<Self>
    where
        H: AsRef<str>,
        S: AsRef<str>,
        I: Iterator<Item = (usize, Vec<S>)>,
    {
        let columns = ColumnMap::from_header(header)?;
        let mut records = Vec::new();
        let mut report = LoadReport::default();

        for (line, fields) in rows {
            report.total_rows += 1;
            match columns.parse_row(&fields) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    tracing::warn!(line, reason = %reason, "カタログの行をスキップ");
                    report.dropped.push(RowIssue { line, reason });
                }
            }
        }

        report.loaded = records.len();
        Ok(Self { records, report })
    }

    /// 全レコード
    pub fn records(&self) -> &[ShadeRecord] {
        &self.records
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// ブランド一覧（重複なし・ソート済み）
    pub fn brands(&self) -> Vec<&str> {
        let mut brands: Vec<&str> = self.records.iter().map(|r| r.brand.as_str()).collect();
        brands.sort_unstable();
        brands.dedup();
        brands
    }
}

/// 差し替え可能な共有カタログ
///
/// 読み手は `snapshot()` で `Arc` を取得し、再読み込みは参照ごと入れ替える。
/// 行をその場で書き換えることはない。
#[derive(Debug, Clone, Default)]
pub struct SharedCatalog {
    inner: Arc<RwLock<Arc<Catalog>>>,
}

impl SharedCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// 現在のカタログを取得
    pub fn snapshot(&self) -> Arc<Catalog> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// カタログを入れ替え、以前のカタログを返す
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, Arc::new(catalog))
    }

    /// ファイルから再読み込み（失敗時は現在のカタログを維持）
    pub fn reload(&self, path: &Path) -> Result<Arc<Catalog>> {
        let catalog = Catalog::load(path)?;
        self.replace(catalog);
        tracing::info!(path = %path.display(), "カタログを差し替えました");
        Ok(self.snapshot())
    }
}

static GLOBAL_CATALOG: OnceLock<SharedCatalog> = OnceLock::new();

/// プロセス全体のカタログを初期化（起動時に一度だけ）
pub fn init_global(catalog: Catalog) -> Result<&'static SharedCatalog> {
    let mut fresh = Some(catalog);
    let shared = GLOBAL_CATALOG.get_or_init(|| SharedCatalog::new(fresh.take().unwrap_or_default()));
    if fresh.is_some() {
        return Err(Error::CatalogLoad("カタログは初期化済みです".into()));
    }
    Ok(shared)
}

/// 初期化済みのプロセス全体カタログ
pub fn global() -> Option<&'static SharedCatalog> {
    GLOBAL_CATALOG.get()
}

/// CSV行をパース（ダブルクォートと `""` エスケープ対応）
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);

    fields
}
