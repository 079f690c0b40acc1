//! レイアウト設定モジュール
//!
//! mm基準のレイアウト定義。pt値はここから導出する。

// ============================================
// mm基準レイアウト
// ============================================

/// A4サイズ（mm）
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

/// 余白設定（mm）
pub const MARGIN_MM: f32 = 10.0;
pub const BLOCK_GAP_MM: f32 = 6.0;

/// ヘッダー帯（店舗名・日付）の高さ（mm）
pub const HEADER_HEIGHT_MM: f32 = 22.0;

/// 画像:情報欄の比率
pub const IMAGE_RATIO: f32 = 0.65;
pub const INFO_RATIO: f32 = 0.35;

/// 利用可能幅から画像/情報幅を計算（mm）
pub const USABLE_WIDTH_MM: f32 = A4_WIDTH_MM - MARGIN_MM * 2.0;  // 190mm
pub const PHOTO_WIDTH_MM: f32 = USABLE_WIDTH_MM * IMAGE_RATIO;   // 123.5mm
pub const INFO_WIDTH_MM: f32 = USABLE_WIDTH_MM * INFO_RATIO;     // 66.5mm

/// ブロック配置に使える高さ（mm）
pub const BODY_HEIGHT_MM: f32 = A4_HEIGHT_MM - MARGIN_MM * 2.0 - HEADER_HEIGHT_MM; // 255mm

/// 画像高さ: ブロック数から計算（mm）
pub const PHOTO_HEIGHT_MM_3UP: f32 = (BODY_HEIGHT_MM - BLOCK_GAP_MM * 2.0) / 3.0; // 81mm
pub const PHOTO_HEIGHT_MM_2UP: f32 = (BODY_HEIGHT_MM - BLOCK_GAP_MM) / 2.0;       // 124.5mm

// ============================================
// 変換係数
// ============================================

/// mm → pt変換 (1mm = 72/25.4 pt ≈ 2.835pt)
pub const MM_TO_PT: f32 = 72.0 / 25.4;

// ============================================
// レイアウト設定構造体
// ============================================

/// PDFレイアウト設定
#[derive(Debug, Clone)]
pub struct PdfLayout {
    /// ページ幅（mm）
    pub page_width_mm: f32,
    /// ページ高さ（mm）
    pub page_height_mm: f32,
    /// マージン（mm）
    pub margin_mm: f32,
    /// ブロック間ギャップ（mm）
    pub gap_mm: f32,
    /// ヘッダー高さ（mm）
    pub header_height_mm: f32,
    /// 画像枠の幅（mm）
    pub photo_width_mm: f32,
    /// 画像枠の高さ（mm）
    pub photo_height_mm: f32,
    /// 情報欄の幅（mm）
    pub info_width_mm: f32,
    /// 1ページあたりのブロック数
    pub items_per_page: u8,
}

impl PdfLayout {
    /// 3ブロック/ページ
    pub fn three_up() -> Self {
        Self {
            page_width_mm: A4_WIDTH_MM,
            page_height_mm: A4_HEIGHT_MM,
            margin_mm: MARGIN_MM,
            gap_mm: BLOCK_GAP_MM,
            header_height_mm: HEADER_HEIGHT_MM,
            photo_width_mm: PHOTO_WIDTH_MM,
            photo_height_mm: PHOTO_HEIGHT_MM_3UP,
            info_width_mm: INFO_WIDTH_MM,
            items_per_page: 3,
        }
    }

    /// 2ブロック/ページ
    pub fn two_up() -> Self {
        Self {
            photo_height_mm: PHOTO_HEIGHT_MM_2UP,
            items_per_page: 2,
            ..Self::three_up()
        }
    }

    /// 指定ブロック数でレイアウト取得
    pub fn for_items_per_page(n: u8) -> Self {
        match n {
            2 => Self::two_up(),
            _ => Self::three_up(),
        }
    }

    /// ブロック高さ（画像 + ギャップ）mm
    pub fn block_height_mm(&self) -> f32 {
        self.photo_height_mm + self.gap_mm
    }

    /// 利用可能幅（mm）
    pub fn usable_width_mm(&self) -> f32 {
        self.page_width_mm - self.margin_mm * 2.0
    }
}

/// mm → pt 変換
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        assert!((USABLE_WIDTH_MM - 190.0).abs() < 0.01);
        assert!((PHOTO_WIDTH_MM - 123.5).abs() < 0.01);
        assert!((INFO_WIDTH_MM - 66.5).abs() < 0.01);
        assert!((PHOTO_HEIGHT_MM_3UP - 81.0).abs() < 0.01);
    }

    #[test]
    fn test_ratios() {
        let total = IMAGE_RATIO + INFO_RATIO;
        assert!((total - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_blocks_fit_on_page() {
        for layout in [PdfLayout::two_up(), PdfLayout::three_up()] {
            let used = layout.margin_mm * 2.0
                + layout.header_height_mm
                + layout.photo_height_mm * layout.items_per_page as f32
                + layout.gap_mm * (layout.items_per_page as f32 - 1.0);
            assert!(used <= layout.page_height_mm + 0.01);
        }
    }

    #[test]
    fn test_layout_config() {
        let layout = PdfLayout::for_items_per_page(3);
        assert_eq!(layout.items_per_page, 3);

        let layout2 = PdfLayout::for_items_per_page(2);
        assert_eq!(layout2.items_per_page, 2);
        assert!(layout2.photo_height_mm > layout.photo_height_mm);
        assert!((mm_to_pt(10.0) - 28.35).abs() < 0.1);
    }
}
