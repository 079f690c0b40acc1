//! シートの日付セル解析
//!
//! Googleフォームの回答シートは `MM/DD/YYYY` 形式、手入力シートは ISO 形式が多い。
//! 末尾のタイムスタンプ（`HH:MM:SS`）は無視する。

use crate::error::{Error, Result};
use chrono::NaiveDate;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// 日付セルを `NaiveDate` に変換
pub fn parse_sheet_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Date("empty".to_string()));
    }

    // "1/5/2024 13:47:52" → "1/5/2024"
    let date_part = trimmed.split_whitespace().next().unwrap_or(trimmed);

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .ok_or_else(|| Error::Date(trimmed.to_string()))
}
