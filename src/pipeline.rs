//! 1回分の実行: シート読込 → グルーピング → 画像解決 → PDF出力
//!
//! グループは順に処理し、ソースの接続エラーで残りを中断する。

use crate::config::Config;
use crate::drive::ImageSource;
use crate::error::{ReportError, Result};
use crate::export::{self, RenderOptions, ReportNamer};
use crate::resolver::{resolve_group, Placeholder};
use crate::sheets::{self, MetadataSource};
use std::path::PathBuf;
use store_report_common::group_rows;

/// 実行結果の集計
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// 書き出したPDF（グループ順）
    pub reports: Vec<PathBuf>,
    pub rows: usize,
    pub skipped_rows: usize,
    pub missing_images: usize,
}

pub async fn run<M, I>(
    config: &Config,
    metadata: &M,
    images: &I,
    placeholder: &Placeholder,
) -> Result<RunSummary>
where
    M: MetadataSource,
    I: ImageSource,
{
    let parsed = sheets::read_rows(metadata, &config.columns, config.layout, config.report_date).await?;

    for malformed in &parsed.malformed {
        log::warn!("行をスキップ: {}", malformed);
    }
    if parsed.filtered_out > 0 {
        log::info!("対象日以外の{}行を除外", parsed.filtered_out);
    }

    if parsed.rows.is_empty() {
        let detail = match config.report_date {
            Some(date) => format!("{} の有効な行がありません", date),
            None => "有効な行がありません".to_string(),
        };
        return Err(ReportError::NoRowsFound(detail));
    }

    let mut summary = RunSummary {
        rows: parsed.rows.len(),
        skipped_rows: parsed.malformed.len(),
        ..Default::default()
    };

    let groups = group_rows(parsed.rows, config.duplicate_items);
    log::info!("{}グループ（店舗×日付）", groups.len());

    let options = RenderOptions::from_config(config);
    let mut namer = ReportNamer::new();
    let total = groups.len();
    for (i, group) in groups.iter().enumerate() {
        log::info!(
            "[{}/{}] {} {} ({}件)",
            i + 1,
            total,
            group.store_id,
            group.date,
            group.len()
        );

        let items = resolve_group(images, group, placeholder).await?;
        summary.missing_images += items.iter().filter(|item| item.is_missing()).count();

        let path = export::export_group(group, &items, &config.output_dir, &mut namer, &options)?;
        summary.reports.push(path);
    }

    Ok(summary)
}
