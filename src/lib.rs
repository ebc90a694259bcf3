//! shade-match
//!
//! 肌のトーン・アンダートーン（手入力または画像解析結果）から、
//! カタログ中のファンデーション・コンシーラーを選んで順位付けする。

pub mod cli;
pub mod config;
pub mod error;
pub mod recommender;
pub mod report;
