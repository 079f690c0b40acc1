//! 画像解決
//!
//! 各行の画像をソースから取得し、無い・壊れている場合はプレースホルダに差し替える。
//! 1行につき必ず1つの `ResolvedItem` を返す。

use crate::drive::{ImageLookup, ImageSource};
use crate::error::Result;
use std::path::Path;
use store_report_common::{ReportRow, ResolvedItem, StoreDateGroup};

/// 同梱のプレースホルダ画像
pub const BUNDLED_PLACEHOLDER: &[u8] = include_bytes!("../assets/not_uploaded.png");

const VALID_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp"];

/// 未アップロード時に使う画像
#[derive(Debug, Clone)]
pub struct Placeholder {
    bytes: Vec<u8>,
}

impl Placeholder {
    pub fn bundled() -> Self {
        Self {
            bytes: BUNDLED_PLACEHOLDER.to_vec(),
        }
    }

    /// 設定されたパスを読み、読めなければ同梱画像を使う
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::bundled();
        };

        match std::fs::read(path) {
            Ok(bytes) if image::load_from_memory(&bytes).is_ok() => {
                log::debug!("プレースホルダ: {}", path.display());
                Self { bytes }
            }
            Ok(_) => {
                log::warn!("プレースホルダ画像が不正です: {}（同梱画像を使用）", path.display());
                Self::bundled()
            }
            Err(e) => {
                log::warn!("プレースホルダ画像を読めません: {}: {}（同梱画像を使用）", path.display(), e);
                Self::bundled()
            }
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// 画像として復号できるか
pub fn is_valid_image(bytes: &[u8]) -> bool {
    image::load_from_memory(bytes).is_ok()
}

/// 拡張子付きの名前なら対応形式か確認（URLや拡張子なしは対象外）
pub fn has_supported_extension(image_name: &str) -> bool {
    if image_name.contains("://") {
        return true;
    }
    match Path::new(image_name).extension() {
        Some(ext) => {
            let ext = ext.to_string_lossy().to_lowercase();
            VALID_IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        None => true,
    }
}

/// 1行分の画像を解決
pub async fn resolve_item<S: ImageSource>(
    source: &S,
    row: ReportRow,
    placeholder: &Placeholder,
) -> Result<ResolvedItem> {
    if row.image_name.trim().is_empty() {
        log::warn!(
            "{} {} '{}': 画像なし（未アップロード）",
            row.store_id, row.date, row.item_id
        );
        return Ok(ResolvedItem::missing(row, placeholder.bytes()));
    }

    if !has_supported_extension(&row.image_name) {
        log::warn!("未対応の拡張子: {}", row.image_name);
    }

    match source.fetch_image(&row.image_name).await? {
        ImageLookup::Found(bytes) if is_valid_image(&bytes) => {
            log::debug!("✓ {}: {} bytes", row.image_name, bytes.len());
            Ok(ResolvedItem::present(row, bytes))
        }
        ImageLookup::Found(_) => {
            log::warn!(
                "{} {} '{}': 画像が不正です ({})",
                row.store_id, row.date, row.item_id, row.image_name
            );
            Ok(ResolvedItem::missing(row, placeholder.bytes()))
        }
        ImageLookup::NotFound => {
            log::warn!(
                "{} {} '{}': 画像が見つかりません ({})",
                row.store_id, row.date, row.item_id, row.image_name
            );
            Ok(ResolvedItem::missing(row, placeholder.bytes()))
        }
    }
}

/// グループ内の全行を順に解決
pub async fn resolve_group<S: ImageSource>(
    source: &S,
    group: &StoreDateGroup,
    placeholder: &Placeholder,
) -> Result<Vec<ResolvedItem>> {
    let mut items = Vec::with_capacity(group.rows.len());
    for row in &group.rows {
        items.push(resolve_item(source, row.clone(), placeholder).await?);
    }
    Ok(items)
}
