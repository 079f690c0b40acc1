//! 埋め込み用の画像変換
//!
//! 品質プリセットの幅を超える画像は縮小し、白背景に合成してJPEGで再エンコードする。

use crate::cli::PdfQuality;
use crate::error::{ReportError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub fn prepare_image(bytes: &[u8], quality: PdfQuality) -> Result<PreparedImage> {
    let img = image::load_from_memory(bytes).map_err(|e| ReportError::ImageLoad(e.to_string()))?;

    let max_width = quality.max_width();
    let img = if img.width() > max_width {
        img.resize(max_width, u32::MAX, FilterType::Triangle)
    } else {
        img
    };

    let rgb = flatten_on_white(&img);
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.jpeg_quality())
        .encode_image(&rgb)
        .map_err(|e| ReportError::ImageLoad(format!("JPEG変換エラー: {}", e)))?;

    Ok(PreparedImage {
        jpeg,
        width: rgb.width(),
        height: rgb.height(),
    })
}

/// 透過PNGは白背景に合成
fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    let (w, h) = img.dimensions();
    RgbImage::from_fn(w, h, |x, y| {
        let p = rgba.get_pixel(x, y);
        let alpha = p[3] as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(p[0]), blend(p[1]), blend(p[2])])
    })
}
