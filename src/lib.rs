//! 店舗別検査写真レポート
//!
//! Google Sheets の検査行を店舗×日付でまとめ、Drive の写真を貼ったPDFを1グループ1ファイルで出力する。

pub mod auth;
pub mod cli;
pub mod config;
pub mod drive;
pub mod error;
pub mod export;
pub mod logging;
pub mod pipeline;
pub mod resolver;
pub mod sheets;

pub use error::{ReportError, Result};
pub use pipeline::{run, RunSummary};
