//! 画像ソース（Google Drive）
//!
//! 「見つからない」はエラーではなく `ImageLookup::NotFound` で返す。
//! 接続・認証の失敗だけが `SourceUnavailable`。

mod google;

pub use google::GoogleDriveSource;

use crate::error::Result;
use regex::Regex;

/// 画像の検索結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLookup {
    Found(Vec<u8>),
    NotFound,
}

/// 画像の取得元
#[allow(async_fn_in_trait)]
pub trait ImageSource {
    async fn fetch_image(&self, image_name: &str) -> Result<ImageLookup>;
}

/// フォームのアップロード列はカンマ区切りで複数URLが入ることがある。先頭の非空要素を使う
pub fn first_reference(image_name: &str) -> &str {
    image_name
        .split(',')
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

/// Drive共有URLからファイルIDを抽出
///
/// `https://drive.google.com/file/d/<id>/view`, `open?id=<id>`, `uc?id=<id>` に対応。
/// URLでない名前は `None`。
pub fn extract_file_id(reference: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref PATH_ID_RE: Regex = Regex::new(r"/d/([a-zA-Z0-9_-]+)").unwrap();
        static ref QUERY_ID_RE: Regex = Regex::new(r"[?&]id=([a-zA-Z0-9_-]+)").unwrap();
    }

    let lower = reference.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return None;
    }

    PATH_ID_RE
        .captures(reference)
        .or_else(|| QUERY_ID_RE.captures(reference))
        .map(|caps| caps[1].to_string())
}
