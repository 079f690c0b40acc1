//! 出力ファイル名
//!
//! `{store_id}_{YYYY-MM-DD}.pdf`。ファイル名に使えない文字を含む店舗IDは `_` に置換し、
//! 元のIDのSHA-256先頭8桁を付けて衝突を避ける。
//! 大文字小文字だけが違う店舗ID（`S1` と `s1`）は、大文字小文字を区別しない
//! ファイルシステムで同じファイルになるため、後から来た方にも同じ接尾辞を付ける。

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ' ')
}

fn short_hash(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    hex::encode(&digest[..4])
}

/// 店舗ID部分（サニタイズ済み）
pub fn sanitize_store_id(store_id: &str) -> String {
    let sanitized: String = store_id
        .chars()
        .map(|c| if is_safe_char(c) { c } else { '_' })
        .collect();

    if sanitized == store_id {
        sanitized
    } else {
        format!("{}-{}", sanitized, short_hash(store_id))
    }
}

/// 店舗×日付のレポートファイル名
pub fn report_file_name(store_id: &str, date: NaiveDate) -> String {
    format!("{}_{}.pdf", sanitize_store_id(store_id), date.format("%Y-%m-%d"))
}

/// 1回の実行で使ったファイル名を覚えておき、大文字小文字の違いだけの衝突を避ける
#[derive(Debug, Default)]
pub struct ReportNamer {
    /// 小文字化したファイル名 → 店舗ID
    taken: HashMap<String, String>,
}

impl ReportNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_name(&mut self, store_id: &str, date: NaiveDate) -> String {
        let name = report_file_name(store_id, date);
        let owner = self.taken.get(&name.to_lowercase()).cloned();

        match owner {
            Some(owner) if owner != store_id => {
                let renamed = format!(
                    "{}-{}_{}.pdf",
                    sanitize_store_id(store_id),
                    short_hash(store_id),
                    date.format("%Y-%m-%d")
                );
                log::warn!(
                    "ファイル名が店舗 '{}' と衝突するため変更: {} -> {}",
                    owner,
                    name,
                    renamed
                );
                self.taken.insert(renamed.to_lowercase(), store_id.to_string());
                renamed
            }
            Some(_) => name,
            None => {
                self.taken.insert(name.to_lowercase(), store_id.to_string());
                name
            }
        }
    }
}
