//! 店舗×日付のグルーピング
//!
//! 1パスで挿入順を保ったままグループ化する。グループの順序はキーの初出順、
//! グループ内の順序はシート順。

use crate::types::{ReportRow, StoreDateGroup};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 同一 (store_id, date, item_id) が複数行ある場合の扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// 後の行が前の行を置き換える（位置は最初の行のまま）
    #[default]
    LastWins,
    /// 両方のブロックを出力
    KeepAll,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "last_wins" | "last" => Ok(DuplicatePolicy::LastWins),
            "keep_all" | "all" => Ok(DuplicatePolicy::KeepAll),
            _ => Err(format!("Unknown duplicate policy: {}. Use last_wins or keep_all", s)),
        }
    }
}

/// 行を店舗×日付でグループ化
pub fn group_rows(rows: Vec<ReportRow>, policy: DuplicatePolicy) -> Vec<StoreDateGroup> {
    let mut groups: Vec<StoreDateGroup> = Vec::new();
    let mut group_index: HashMap<(String, NaiveDate), usize> = HashMap::new();
    // (グループ番号, item_id) → グループ内の位置
    let mut item_index: HashMap<(usize, String), usize> = HashMap::new();

    for row in rows {
        let (store_id, date) = row.group_key();
        let gi = *group_index.entry((store_id.to_string(), date)).or_insert_with(|| {
            groups.push(StoreDateGroup::new(row.store_id.clone(), row.date));
            groups.len() - 1
        });
        let group = &mut groups[gi];

        if policy == DuplicatePolicy::LastWins {
            if let Some(&pos) = item_index.get(&(gi, row.item_id.clone())) {
                log::debug!(
                    "duplicate item '{}' for {} {} (row {}), replacing row {}",
                    row.item_id,
                    row.store_id,
                    row.date,
                    row.sheet_row,
                    group.rows[pos].sheet_row
                );
                group.rows[pos] = row;
                continue;
            }
            item_index.insert((gi, row.item_id.clone()), group.rows.len());
        }

        group.rows.push(row);
    }

    groups
}
