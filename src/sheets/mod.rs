//! メタデータソース（検査シート）
//!
//! シートの取得はトレイト越し、行の解釈は純粋関数で行う。

mod google;

pub use google::GoogleSheetsSource;

use crate::config::{ColumnConfig, SheetLayout};
use crate::error::{ReportError, Result};
use chrono::NaiveDate;
use store_report_common::{parse_sheet_date, ReportRow, TextField};

/// シートの生データ（先頭行がヘッダー）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// APIの `values` から構築。短い行はヘッダー幅まで空セルで埋める
    pub fn from_values(mut values: Vec<Vec<String>>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let header = values.remove(0);
        let width = header.len();
        let rows = values
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, String::new());
                }
                row
            })
            .collect();
        Self { header, rows }
    }

    /// ヘッダー名で列を検索（前後空白・大文字小文字無視）
    pub fn find_col(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.header
            .iter()
            .position(|h| h.trim().to_lowercase() == wanted)
    }
}

/// 必須項目が欠けていてスキップした行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
    /// シート上の行番号（ヘッダー = 1）
    pub sheet_row: usize,
    pub reason: String,
}

impl std::fmt::Display for MalformedRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.sheet_row, self.reason)
    }
}

/// 行解釈の結果
#[derive(Debug, Clone, Default)]
pub struct ParsedRows {
    pub rows: Vec<ReportRow>,
    pub malformed: Vec<MalformedRow>,
    /// 対象日フィルタで除外した行数
    pub filtered_out: usize,
}

/// シートの取得元
#[allow(async_fn_in_trait)]
pub trait MetadataSource {
    /// シート全体を取得。接続・認証失敗は `SourceUnavailable`
    async fn fetch_table(&self) -> Result<SheetTable>;
}

/// シートを取得して行に変換
pub async fn read_rows<M: MetadataSource>(
    source: &M,
    columns: &ColumnConfig,
    layout: SheetLayout,
    report_date: Option<NaiveDate>,
) -> Result<ParsedRows> {
    let table = source.fetch_table().await?;
    log::info!("シート取得: {}行", table.rows.len());
    parse_rows(&table, columns, layout, report_date)
}

/// form形式の写真列（1列 = 1項目）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoColumn {
    pub item_id: String,
    pub col: usize,
}

/// 見出し `"Apples – Take a clear photo"` から項目名 `"Apples"` を取り出す
pub fn product_name(header: &str) -> &str {
    let name = header.split('–').next().unwrap_or("").trim();
    if name.is_empty() {
        header.trim()
    } else {
        name
    }
}

/// form形式の写真列を検出
///
/// 全体写真（`overall_marker` と "photo" を含む見出し、見出し名順に `Overall photo N`）を先に、
/// 続いて商品写真（`photo_marker` を含む見出し、シートの列順）を並べる。
pub fn form_photo_columns(table: &SheetTable, columns: &ColumnConfig) -> Vec<PhotoColumn> {
    let overall_marker = columns.overall_marker.trim().to_lowercase();
    let photo_marker = columns.photo_marker.trim().to_lowercase();

    let is_overall = |header: &str| {
        let lower = header.to_lowercase();
        !overall_marker.is_empty() && lower.contains(&overall_marker) && lower.contains("photo")
    };

    let mut overall: Vec<(String, usize)> = table
        .header
        .iter()
        .enumerate()
        .filter(|(_, h)| is_overall(h))
        .map(|(col, h)| (h.to_lowercase(), col))
        .collect();
    overall.sort();

    let mut photo_columns: Vec<PhotoColumn> = overall
        .into_iter()
        .enumerate()
        .map(|(i, (_, col))| PhotoColumn {
            item_id: format!("Overall photo {}", i + 1),
            col,
        })
        .collect();

    photo_columns.extend(
        table
            .header
            .iter()
            .enumerate()
            .filter(|(_, h)| !is_overall(h) && h.to_lowercase().contains(&photo_marker))
            .map(|(col, h)| PhotoColumn {
                item_id: product_name(h).to_string(),
                col,
            }),
    );

    photo_columns
}

/// 行ごとの項目の取り出し方
enum ItemColumns {
    Long { item: usize, image: Option<usize> },
    Form(Vec<PhotoColumn>),
}

struct ColumnIndex {
    store: usize,
    date: usize,
    items: ItemColumns,
    text: Vec<(String, usize)>,
    header: Vec<(String, usize)>,
}

impl ColumnIndex {
    fn resolve(table: &SheetTable, columns: &ColumnConfig, layout: SheetLayout) -> Result<Self> {
        let required = |name: &str| {
            table
                .find_col(name)
                .ok_or_else(|| ReportError::MissingColumn(name.to_string()))
        };

        let optional = |names: &[String]| -> Vec<(String, usize)> {
            names
                .iter()
                .filter_map(|name| match table.find_col(name) {
                    Some(idx) => Some((name.clone(), idx)),
                    None => {
                        log::warn!("列 '{}' がシートにありません（スキップ）", name);
                        None
                    }
                })
                .collect()
        };

        let items = match layout {
            SheetLayout::Long => {
                let image = table.find_col(&columns.image);
                if image.is_none() {
                    log::warn!("画像列 '{}' がシートにありません。全項目が未アップロード扱いになります", columns.image);
                }
                ItemColumns::Long {
                    item: required(&columns.item)?,
                    image,
                }
            }
            SheetLayout::Form => {
                let photo_columns = form_photo_columns(table, columns);
                if photo_columns.is_empty() {
                    return Err(ReportError::MissingColumn(columns.photo_marker.clone()));
                }
                log::info!("写真列: {}列", photo_columns.len());
                for pc in &photo_columns {
                    log::debug!("  - {}", pc.item_id);
                }
                ItemColumns::Form(photo_columns)
            }
        };

        Ok(Self {
            store: required(&columns.store)?,
            date: required(&columns.date)?,
            items,
            text: optional(columns.text.as_slice()),
            header: optional(columns.header.as_slice()),
        })
    }
}

/// シートの行を `ReportRow` に変換
///
/// 店舗・日付・項目のいずれかが欠けた行は `malformed` に入れてスキップする。
/// form形式では1行から写真列の数だけ `ReportRow` を作る。
/// `report_date` 指定時はその日付の行だけを残す。
pub fn parse_rows(
    table: &SheetTable,
    columns: &ColumnConfig,
    layout: SheetLayout,
    report_date: Option<NaiveDate>,
) -> Result<ParsedRows> {
    let mut parsed = ParsedRows::default();
    if table.header.is_empty() {
        return Ok(parsed);
    }

    let idx = ColumnIndex::resolve(table, columns, layout)?;

    for (i, cells) in table.rows.iter().enumerate() {
        // ヘッダーが1行目
        let sheet_row = i + 2;
        let cell = |col: usize| cells.get(col).map(|c| c.trim()).unwrap_or("");

        // 完全な空行は黙って飛ばす
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        let store_id = cell(idx.store);
        let date_raw = cell(idx.date);

        let reason = if store_id.is_empty() {
            Some("store_id missing".to_string())
        } else if date_raw.is_empty() {
            Some("date missing".to_string())
        } else {
            match idx.items {
                ItemColumns::Long { item, .. } if cell(item).is_empty() => {
                    Some("item_id missing".to_string())
                }
                _ => None,
            }
        };
        if let Some(reason) = reason {
            parsed.malformed.push(MalformedRow { sheet_row, reason });
            continue;
        }

        let date = match parse_sheet_date(date_raw) {
            Ok(d) => d,
            Err(_) => {
                parsed.malformed.push(MalformedRow {
                    sheet_row,
                    reason: format!("invalid date '{}'", date_raw),
                });
                continue;
            }
        };

        if let Some(target) = report_date {
            if date != target {
                parsed.filtered_out += 1;
                continue;
            }
        }

        let to_fields = |cols: &[(String, usize)]| -> Vec<TextField> {
            cols.iter()
                .map(|(label, col)| TextField::new(label.clone(), cell(*col)))
                .collect()
        };
        let row = |item_id: &str, image_name: &str| ReportRow {
            store_id: store_id.to_string(),
            date,
            item_id: item_id.to_string(),
            image_name: image_name.to_string(),
            fields: to_fields(idx.text.as_slice()),
            meta: to_fields(idx.header.as_slice()),
            sheet_row,
        };

        match &idx.items {
            ItemColumns::Long { item, image } => {
                parsed.rows.push(row(cell(*item), image.map(cell).unwrap_or("")));
            }
            ItemColumns::Form(photo_columns) => {
                for pc in photo_columns {
                    parsed.rows.push(row(&pc.item_id, cell(pc.col)));
                }
            }
        }
    }

    Ok(parsed)
}
