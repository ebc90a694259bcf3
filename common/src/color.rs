//! 色の解析と距離計算
//!
//! `#RRGGBB` / `RRGGBB` 形式の16進カラーを正規化RGB（各チャンネル0.0〜1.0）に変換し、
//! 二乗ユークリッド距離で比較する。

use crate::error::{Error, Result};

/// 正規化RGB
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    /// 16進カラー文字列をパース（`#` は省略可、大文字小文字を区別しない）
    ///
    /// # Examples
    /// ```
    /// use shade_match_common::Rgb;
    ///
    /// let white = Rgb::from_hex("#FFFFFF").unwrap();
    /// assert_eq!(white.r, 1.0);
    /// assert!(Rgb::from_hex("#FFF").is_err());
    /// ```
    pub fn from_hex(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.len() != 6 {
            return Err(Error::InvalidColor(format!(
                "6桁の16進数が必要です: {:?}",
                value
            )));
        }

        let bytes = hex::decode(digits)
            .map_err(|e| Error::InvalidColor(format!("{:?}: {}", value, e)))?;

        Ok(Self {
            r: f64::from(bytes[0]) / 255.0,
            g: f64::from(bytes[1]) / 255.0,
            b: f64::from(bytes[2]) / 255.0,
        })
    }

    /// 二乗ユークリッド距離（0.0〜3.0）
    pub fn squared_distance(&self, other: &Rgb) -> f64 {
        let dr = self.r - other.r;
        let dg = self.g - other.g;
        let db = self.b - other.b;
        dr * dr + dg * dg + db * db
    }

    /// `#RRGGBB`（大文字）に変換
    pub fn to_hex(&self) -> String {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{}",
            hex::encode_upper([channel(self.r), channel(self.g), channel(self.b)])
        )
    }
}

/// 16進カラーを `#RRGGBB` 形式に正規化
pub fn canonical_hex(value: &str) -> Result<String> {
    Rgb::from_hex(value).map(|rgb| rgb.to_hex())
}
