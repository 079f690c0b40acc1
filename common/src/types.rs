//! レポートの型定義
//!
//! - ReportRow: シート1行分の検査データ
//! - StoreDateGroup: 店舗×日付ごとのレポート単位
//! - ResolvedItem: 画像解決済みの行（実画像またはプレースホルダ）

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 行に付随するテキスト項目（ラベル, 値）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextField {
    pub label: String,
    pub value: String,
}

impl TextField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// シートの1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub store_id: String,
    pub date: NaiveDate,
    pub item_id: String,

    /// Drive上のファイル名または共有URL（空 = 未アップロード）
    #[serde(default)]
    pub image_name: String,

    /// 情報欄に出すテキスト列（設定順）
    #[serde(default)]
    pub fields: Vec<TextField>,

    /// ヘッダーに出す列（担当者名・電話番号など）
    #[serde(default)]
    pub meta: Vec<TextField>,

    /// シート上の行番号（ヘッダー = 1）
    #[serde(default)]
    pub sheet_row: usize,
}

impl ReportRow {
    /// グルーピングキー
    pub fn group_key(&self) -> (&str, NaiveDate) {
        (&self.store_id, self.date)
    }

    pub fn field(&self, label: &str) -> Option<&str> {
        find_value(&self.fields, label)
    }

    pub fn meta_value(&self, label: &str) -> Option<&str> {
        find_value(&self.meta, label)
    }
}

fn find_value<'a>(fields: &'a [TextField], label: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|f| f.label.eq_ignore_ascii_case(label))
        .map(|f| f.value.as_str())
}

/// 店舗×日付のグループ（シート順を保持）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreDateGroup {
    pub store_id: String,
    pub date: NaiveDate,
    pub rows: Vec<ReportRow>,
}

impl StoreDateGroup {
    pub fn new(store_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            store_id: store_id.into(),
            date,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 画像の取得状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageStatus {
    Present,
    Missing,
}

/// 画像解決済みの行
#[derive(Debug, Clone)]
pub struct ResolvedItem {
    pub row: ReportRow,
    pub image_bytes: Vec<u8>,
    pub image_status: ImageStatus,
}

impl ResolvedItem {
    pub fn present(row: ReportRow, image_bytes: Vec<u8>) -> Self {
        Self {
            row,
            image_bytes,
            image_status: ImageStatus::Present,
        }
    }

    pub fn missing(row: ReportRow, placeholder: &[u8]) -> Self {
        Self {
            row,
            image_bytes: placeholder.to_vec(),
            image_status: ImageStatus::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.image_status == ImageStatus::Missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> ReportRow {
        ReportRow {
            store_id: "S1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            item_id: "Apples".to_string(),
            image_name: "apples.jpg".to_string(),
            fields: vec![TextField::new("Name", "Alice"), TextField::new("Phone", "555")],
            meta: vec![TextField::new("Manager", "Bob")],
            sheet_row: 2,
        }
    }

    #[test]
    fn test_field_lookup_case_insensitive() {
        let row = sample_row();
        assert_eq!(row.field("name"), Some("Alice"));
        assert_eq!(row.field("PHONE"), Some("555"));
        assert_eq!(row.field("email"), None);
        assert_eq!(row.meta_value("manager"), Some("Bob"));
        assert_eq!(row.field("manager"), None);
    }

    #[test]
    fn test_resolved_missing_uses_placeholder() {
        let item = ResolvedItem::missing(sample_row(), b"placeholder");
        assert!(item.is_missing());
        assert_eq!(item.image_bytes, b"placeholder");
    }

    #[test]
    fn test_row_serialize() {
        let json = serde_json::to_string(&sample_row()).expect("シリアライズ失敗");
        assert!(json.contains("\"storeId\":\"S1\""));
        assert!(json.contains("\"date\":\"2024-01-01\""));
        assert!(json.contains("\"imageName\":\"apples.jpg\""));
    }

    #[test]
    fn test_image_status_serialize() {
        let json = serde_json::to_string(&ImageStatus::Missing).unwrap();
        assert_eq!(json, "\"MISSING\"");
    }
}
