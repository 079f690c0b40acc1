pub mod naming;
pub mod pdf;
mod thumbnail;

pub use naming::{report_file_name, ReportNamer};
pub use thumbnail::{prepare_image, PreparedImage};

use crate::cli::PdfQuality;
use crate::config::Config;
use crate::error::Result;
use std::path::{Path, PathBuf};
use store_report_common::{ResolvedItem, StoreDateGroup};

/// PDF描画オプション
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub items_per_page: u8,
    pub quality: PdfQuality,
    /// ヘッダー帯に表示する列（グループ先頭行の値）
    pub header_fields: Vec<String>,
}

impl RenderOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            items_per_page: config.items_per_page,
            quality: config.pdf_quality,
            header_fields: config.columns.header.clone(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// 1グループ分のPDFを出力ディレクトリに書き出し、パスを返す
///
/// `namer` は1回の実行で共有し、同じ実行内のファイル名衝突を避ける。
pub fn export_group(
    group: &StoreDateGroup,
    items: &[ResolvedItem],
    output_dir: &Path,
    namer: &mut ReportNamer,
    options: &RenderOptions,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join(namer.file_name(&group.store_id, group.date));

    log::info!("- PDFを生成中... (品質: {})", options.quality);
    pdf::generate_pdf(group, items, &output_path, options)?;
    log::info!("✔ PDF出力: {}", output_path.display());

    Ok(output_path)
}
