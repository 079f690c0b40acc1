//! PDF export core utilities.
//!
//! 描画ライブラリに依存しない座標計算とテキスト組み立て。

use crate::layout::{mm_to_pt, PdfLayout};
use crate::types::{ResolvedItem, StoreDateGroup};

/// 欠品ブロックに表示するラベル
pub const MISSING_LABEL: &str = "NOT UPLOADED";

/// Helvetica の平均文字幅（フォントサイズ比）
const AVG_CHAR_WIDTH: f32 = 0.5;

/// ヘッダー帯の最終行とブロックの間の余白（pt）
const HEADER_BOTTOM_PADDING_PT: f32 = 4.0;

/// PDF描画で使用するレイアウト計算結果（pt単位、原点は左下）
#[derive(Debug, Clone)]
pub struct PdfLayoutCore {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin_pt: f32,
    pub gap_pt: f32,
    pub header_height_pt: f32,
    pub photo_width_pt: f32,
    pub photo_height_pt: f32,
    pub info_width_pt: f32,
    pub photo_info_gap_pt: f32,
    pub items_per_page: usize,
}

impl PdfLayoutCore {
    pub fn from_layout(layout: &PdfLayout) -> Self {
        Self {
            page_width_pt: mm_to_pt(layout.page_width_mm),
            page_height_pt: mm_to_pt(layout.page_height_mm),
            margin_pt: mm_to_pt(layout.margin_mm),
            gap_pt: mm_to_pt(layout.gap_mm),
            header_height_pt: mm_to_pt(layout.header_height_mm),
            photo_width_pt: mm_to_pt(layout.photo_width_mm),
            photo_height_pt: mm_to_pt(layout.photo_height_mm),
            info_width_pt: mm_to_pt(layout.info_width_mm),
            photo_info_gap_pt: 5.0,
            items_per_page: layout.items_per_page.max(1) as usize,
        }
    }

    /// ヘッダー上端のY座標（pt）
    pub fn header_top_pt(&self) -> f32 {
        self.page_height_pt - self.margin_pt
    }

    /// スロットのブロック上端Y座標（pt）
    pub fn block_top_pt(&self, slot: usize) -> f32 {
        self.header_top_pt()
            - self.header_height_pt
            - slot as f32 * (self.photo_height_pt + self.gap_pt)
    }

    /// スロットの画像枠下端Y座標（pt）
    pub fn photo_bottom_pt(&self, slot: usize) -> f32 {
        self.block_top_pt(slot) - self.photo_height_pt
    }

    /// 情報欄のX座標（pt）
    pub fn info_x_pt(&self) -> f32 {
        self.margin_pt + self.photo_width_pt + self.photo_info_gap_pt
    }

    /// 情報欄の有効幅（pt）
    pub fn info_text_width_pt(&self) -> f32 {
        self.info_width_pt - self.photo_info_gap_pt
    }

    /// タイトル行の下にヘッダー帯へ収まる行数
    pub fn header_line_capacity(&self, title_size: f32, line_height: f32) -> usize {
        let room = self.header_height_pt - title_size - HEADER_BOTTOM_PADDING_PT;
        if room <= 0.0 || line_height <= 0.0 {
            0
        } else {
            (room / line_height).floor() as usize
        }
    }

    /// アイテム数から必要ページ数
    pub fn page_count(&self, items: usize) -> usize {
        items.div_ceil(self.items_per_page).max(1)
    }
}

/// 画像をアスペクト比を保って枠に収めたサイズ（pt）
pub fn fit_image(img_w: u32, img_h: u32, box_w: f32, box_h: f32) -> (f32, f32) {
    if img_w == 0 || img_h == 0 {
        return (0.0, 0.0);
    }
    let scale = (box_w / img_w as f32).min(box_h / img_h as f32);
    (img_w as f32 * scale, img_h as f32 * scale)
}

/// PDFの情報欄に表示する1行
#[derive(Debug, Clone, PartialEq)]
pub struct PdfInfoField {
    pub label: String,
    pub value: String,
}

/// 情報欄フィールドを構築
pub fn build_pdf_info_fields(item: &ResolvedItem) -> Vec<PdfInfoField> {
    item.row
        .fields
        .iter()
        .map(|field| PdfInfoField {
            label: field.label.clone(),
            value: display_value(&field.value),
        })
        .collect()
}

/// ヘッダー2行目以降のテキスト
///
/// 日付と、グループ先頭行から取ったヘッダー項目を並べる。
pub fn build_header_lines(group: &StoreDateGroup, header_fields: &[String]) -> Vec<String> {
    let mut parts = vec![format!("Date: {}", group.date.format("%Y-%m-%d"))];

    if let Some(first) = group.rows.first() {
        for label in header_fields {
            let value = first.meta_value(label).unwrap_or("");
            parts.push(format!("{}: {}", label, display_value(value)));
        }
    }

    vec![parts.join("    ")]
}

/// 幅に収まるよう単語単位で折り返す（近似幅）
pub fn wrap_text(text: &str, max_width_pt: f32, font_size: f32) -> Vec<String> {
    let max_chars = max_chars(max_width_pt, font_size);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();

        if current_len > 0 && current_len + 1 + word_len > max_chars {
            lines.push(std::mem::take(&mut current));
        }

        if word_len > max_chars {
            // 長すぎる単語は強制分割
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(max_chars) {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current = chunk.iter().collect();
            }
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// 折り返した上で `max_lines` 行に切り詰める。切り詰めた場合は最終行を `...` で終える
pub fn fit_lines(lines: &[String], max_width_pt: f32, font_size: f32, max_lines: usize) -> Vec<String> {
    let mut wrapped: Vec<String> = lines
        .iter()
        .flat_map(|line| wrap_text(line, max_width_pt, font_size))
        .collect();
    if wrapped.len() <= max_lines {
        return wrapped;
    }

    wrapped.truncate(max_lines);
    if let Some(last) = wrapped.last_mut() {
        let keep = max_chars(max_width_pt, font_size).saturating_sub(3);
        let mut shortened: String = last.chars().take(keep).collect();
        shortened.push_str("...");
        *last = shortened;
    }
    wrapped
}

fn max_chars(max_width_pt: f32, font_size: f32) -> usize {
    ((max_width_pt / (font_size * AVG_CHAR_WIDTH)).floor() as usize).max(1)
}

fn display_value(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "-".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ReportRow, TextField};
    use chrono::NaiveDate;

    fn item(fields: Vec<TextField>) -> ResolvedItem {
        ResolvedItem::present(
            ReportRow {
                store_id: "S1".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                item_id: "Bananas".to_string(),
                image_name: "b.jpg".to_string(),
                fields,
                meta: vec![TextField::new("Name", "Alice")],
                sheet_row: 2,
            },
            vec![1, 2, 3],
        )
    }

    #[test]
    fn test_layout_core_positions() {
        let core = PdfLayoutCore::from_layout(&PdfLayout::three_up());

        assert!(core.page_width_pt > 0.0);
        let first = core.block_top_pt(0);
        let second = core.block_top_pt(1);
        assert!(first > second);
        assert!(core.photo_bottom_pt(2) >= core.margin_pt - 0.1);
        assert!(first < core.header_top_pt());
    }

    #[test]
    fn test_page_count() {
        let core = PdfLayoutCore::from_layout(&PdfLayout::three_up());
        assert_eq!(core.page_count(0), 1);
        assert_eq!(core.page_count(3), 1);
        assert_eq!(core.page_count(4), 2);
    }

    #[test]
    fn test_fit_image_keeps_aspect() {
        let (w, h) = fit_image(400, 200, 100.0, 100.0);
        assert!((w - 100.0).abs() < 0.01);
        assert!((h - 50.0).abs() < 0.01);

        let (w, h) = fit_image(100, 400, 100.0, 100.0);
        assert!((w - 25.0).abs() < 0.01);
        assert!((h - 100.0).abs() < 0.01);

        assert_eq!(fit_image(0, 10, 100.0, 100.0), (0.0, 0.0));
    }

    #[test]
    fn test_build_info_fields_defaults() {
        let fields = build_pdf_info_fields(&item(vec![
            TextField::new("Name", "Alice"),
            TextField::new("Phone", "  "),
        ]));
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].label, "Name");
        assert_eq!(fields[0].value, "Alice");
        assert_eq!(fields[1].value, "-");
    }

    #[test]
    fn test_header_lines() {
        let mut group = StoreDateGroup::new("S1", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        group.rows.push(item(Vec::new()).row);

        let lines = build_header_lines(&group, &["Name".to_string(), "Phone".to_string()]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Date: 2024-01-01"));
        assert!(lines[0].contains("Name: Alice"));
        assert!(lines[0].contains("Phone: -"));
    }

    #[test]
    fn test_wrap_text() {
        // 10pt → 5pt/文字 → 50pt幅で10文字
        let lines = wrap_text("aaaa bbbb cccc", 50.0, 10.0);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc"]);

        let lines = wrap_text("abcdefghijklmnop", 50.0, 10.0);
        assert_eq!(lines, vec!["abcdefghij", "klmnop"]);

        assert!(wrap_text("   ", 50.0, 10.0).is_empty());
    }

    #[test]
    fn test_header_line_capacity() {
        let core = PdfLayoutCore::from_layout(&PdfLayout::three_up());
        // 22mm ≈ 62.4pt: タイトル16pt + 余白4pt を除いて 13pt 行が3行
        assert_eq!(core.header_line_capacity(16.0, 13.0), 3);
        assert_eq!(core.header_line_capacity(100.0, 13.0), 0);
    }

    #[test]
    fn test_fit_lines_truncates() {
        let lines = vec!["aaaa bbbb cccc dddd".to_string(), "eeee".to_string()];
        // 50pt / 10pt → 10文字
        assert_eq!(fit_lines(&lines, 50.0, 10.0, 5), vec!["aaaa bbbb", "cccc dddd", "eeee"]);

        let fitted = fit_lines(&lines, 50.0, 10.0, 2);
        assert_eq!(fitted, vec!["aaaa bbbb", "cccc dd..."]);
        assert!(fitted.iter().all(|l| l.chars().count() <= 10));

        assert!(fit_lines(&lines, 50.0, 10.0, 0).is_empty());
    }
}
