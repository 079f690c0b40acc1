//! 店舗×日付レポートのPDF描画
//!
//! 1ページ目から順に、ヘッダー帯（店舗・日付）と画像+情報欄のブロックを並べる。
//! 同じ画像（プレースホルダーや同一写真）はドキュメント内で1回だけ埋め込む。

use super::thumbnail::prepare_image;
use super::RenderOptions;
use crate::error::{ReportError, Result};
use printpdf::color::Color;
use printpdf::graphics::{LinePoint, Polygon, PolygonRing, WindingOrder};
use printpdf::xobject::{XObject, XObjectTransform};
use printpdf::{
    BuiltinFont, Mm, Op, PaintMode, PdfDocument, PdfPage, PdfSaveOptions, Point, Pt, Rgb,
    TextItem, TextMatrix, XObjectId,
};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use store_report_common::export::pdf_core::{
    build_header_lines, build_pdf_info_fields, fit_image, fit_lines, wrap_text, PdfLayoutCore,
    MISSING_LABEL,
};
use store_report_common::{PdfLayout, ResolvedItem, StoreDateGroup};

const TITLE_SIZE: f32 = 16.0;
const HEADER_SIZE: f32 = 10.0;
const ITEM_SIZE: f32 = 12.0;
const STATUS_SIZE: f32 = 11.0;
const FIELD_SIZE: f32 = 9.0;
const LINE_SPACING: f32 = 1.3;

const BLACK: (f32, f32, f32) = (0.0, 0.0, 0.0);
const GREY: (f32, f32, f32) = (0.4, 0.4, 0.4);
const RED: (f32, f32, f32) = (0.8, 0.0, 0.0);

/// 埋め込み済み画像（内容のSHA-256 → XObjectとピクセル寸法）
#[derive(Default)]
struct EmbeddedImages {
    by_digest: HashMap<Vec<u8>, (XObjectId, u32, u32)>,
}

impl EmbeddedImages {
    fn embed(
        &mut self,
        doc: &mut PdfDocument,
        item: &ResolvedItem,
        options: &RenderOptions,
    ) -> Result<(XObjectId, u32, u32)> {
        let digest = Sha256::digest(&item.image_bytes).to_vec();
        if let Some(found) = self.by_digest.get(&digest) {
            return Ok(found.clone());
        }

        let prepared = prepare_image(&item.image_bytes, options.quality).map_err(|e| {
            ReportError::PdfGeneration(format!(
                "{} {} '{}': {}",
                item.row.store_id, item.row.date, item.row.item_id, e
            ))
        })?;

        let mut warnings = Vec::new();
        let raw = printpdf::image::RawImage::decode_from_bytes(&prepared.jpeg, &mut warnings)
            .map_err(|e| ReportError::PdfGeneration(format!("画像埋め込みエラー: {}", e)))?;
        let entry = (XObjectId::new(), raw.width as u32, raw.height as u32);
        doc.resources
            .xobjects
            .map
            .insert(entry.0.clone(), XObject::Image(raw));
        self.by_digest.insert(digest, entry.clone());
        Ok(entry)
    }
}

/// PDFを生成してファイルに書き出す（既存ファイルは上書き）
pub fn generate_pdf(
    group: &StoreDateGroup,
    items: &[ResolvedItem],
    output_path: &Path,
    options: &RenderOptions,
) -> Result<()> {
    let bytes = render_pdf(group, items, options)?;
    std::fs::write(output_path, bytes)?;
    Ok(())
}

/// PDFをメモリ上に生成
pub fn render_pdf(
    group: &StoreDateGroup,
    items: &[ResolvedItem],
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    let doc = build_document(group, items, options)?;
    let mut warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if bytes.is_empty() {
        return Err(ReportError::PdfGeneration(format!(
            "PDF保存エラー: {} {}",
            group.store_id, group.date
        )));
    }
    log::debug!(
        "PDF生成: {} {} ({}ページ, {} bytes)",
        group.store_id,
        group.date,
        doc.pages.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// ページを組み立てたドキュメント（未保存）
pub fn build_document(
    group: &StoreDateGroup,
    items: &[ResolvedItem],
    options: &RenderOptions,
) -> Result<PdfDocument> {
    let layout = PdfLayout::for_items_per_page(options.items_per_page);
    let core = PdfLayoutCore::from_layout(&layout);
    let header_lines = build_header_lines(group, &options.header_fields);

    let title = format!("{} {}", group.store_id, group.date.format("%Y-%m-%d"));
    let mut doc = PdfDocument::new(&title);

    let mut embedded = EmbeddedImages::default();
    let total_pages = core.page_count(items.len());
    let mut chunks: Vec<&[ResolvedItem]> = items.chunks(core.items_per_page).collect();
    if chunks.is_empty() {
        chunks.push(&[]);
    }

    for (page_idx, chunk) in chunks.iter().enumerate() {
        let mut ops = Vec::new();
        draw_header(&mut ops, &core, group, &header_lines, page_idx + 1, total_pages);

        for (slot, item) in chunk.iter().enumerate() {
            draw_block(&mut doc, &mut embedded, &mut ops, &core, slot, item, options)?;
        }

        doc.pages.push(PdfPage::new(
            Mm(layout.page_width_mm),
            Mm(layout.page_height_mm),
            ops,
        ));
    }

    Ok(doc)
}

fn draw_header(
    ops: &mut Vec<Op>,
    core: &PdfLayoutCore,
    group: &StoreDateGroup,
    header_lines: &[String],
    page_no: usize,
    total_pages: usize,
) {
    let x = core.margin_pt;
    let mut y = core.header_top_pt() - TITLE_SIZE;
    push_text(
        ops,
        &format!("STORE: {}", group.store_id),
        x,
        y,
        TITLE_SIZE,
        BuiltinFont::HelveticaBold,
        BLACK,
    );

    if total_pages > 1 {
        push_text(
            ops,
            &format!("{} / {}", page_no, total_pages),
            core.page_width_pt - core.margin_pt - 40.0,
            y,
            HEADER_SIZE,
            BuiltinFont::Helvetica,
            GREY,
        );
    }

    // ヘッダー帯（22mm）からはみ出す行は切り詰める
    let header_width = core.page_width_pt - core.margin_pt * 2.0;
    let max_lines = core.header_line_capacity(TITLE_SIZE, HEADER_SIZE * LINE_SPACING);
    for line in fit_lines(header_lines, header_width, HEADER_SIZE, max_lines) {
        y -= HEADER_SIZE * LINE_SPACING;
        push_text(ops, &line, x, y, HEADER_SIZE, BuiltinFont::Helvetica, BLACK);
    }
}

fn draw_block(
    doc: &mut PdfDocument,
    embedded: &mut EmbeddedImages,
    ops: &mut Vec<Op>,
    core: &PdfLayoutCore,
    slot: usize,
    item: &ResolvedItem,
    options: &RenderOptions,
) -> Result<()> {
    let top = core.block_top_pt(slot);
    let bottom = core.photo_bottom_pt(slot);
    let box_x = core.margin_pt;

    let (xobj_id, img_w, img_h) = embedded.embed(doc, item, options)?;

    let (draw_w, draw_h) = fit_image(img_w, img_h, core.photo_width_pt, core.photo_height_pt);
    // 枠内で左右中央・上寄せ
    let img_x = box_x + (core.photo_width_pt - draw_w) / 2.0;
    let img_y = top - draw_h;
    ops.push(Op::UseXobject {
        id: xobj_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(img_x)),
            translate_y: Some(Pt(img_y)),
            scale_x: Some(draw_w / img_w as f32),
            scale_y: Some(draw_h / img_h as f32),
            rotate: None,
            dpi: Some(72.0),
        },
    });

    if item.is_missing() {
        push_frame(ops, box_x, bottom, core.photo_width_pt, core.photo_height_pt, RED, 1.5);
    }

    draw_info(ops, core, item, top, bottom);
    Ok(())
}

/// 右側の情報欄。ブロック下端を越える行は描かない
fn draw_info(ops: &mut Vec<Op>, core: &PdfLayoutCore, item: &ResolvedItem, top: f32, bottom: f32) {
    let x = core.info_x_pt();
    let width = core.info_text_width_pt();
    let mut y = top;

    let mut line = |ops: &mut Vec<Op>, text: &str, size: f32, font: BuiltinFont, color: (f32, f32, f32)| -> bool {
        y -= size * LINE_SPACING;
        if y < bottom {
            return false;
        }
        push_text(ops, text, x, y, size, font, color);
        true
    };

    for text in wrap_text(&item.row.item_id, width, ITEM_SIZE) {
        if !line(ops, &text, ITEM_SIZE, BuiltinFont::HelveticaBold, BLACK) {
            return;
        }
    }

    if item.is_missing() && !line(ops, MISSING_LABEL, STATUS_SIZE, BuiltinFont::HelveticaBold, RED) {
        return;
    }

    for field in build_pdf_info_fields(item) {
        if !line(ops, &format!("{}:", field.label), FIELD_SIZE, BuiltinFont::HelveticaBold, GREY) {
            return;
        }
        for text in wrap_text(&field.value, width, FIELD_SIZE) {
            if !line(ops, &text, FIELD_SIZE, BuiltinFont::Helvetica, BLACK) {
                return;
            }
        }
    }
}

fn rgb((r, g, b): (f32, f32, f32)) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn push_text(
    ops: &mut Vec<Op>,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    font: BuiltinFont,
    color: (f32, f32, f32),
) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetFillColor { col: rgb(color) });
    ops.push(Op::SetFontSizeBuiltinFont { size: Pt(size), font });
    ops.push(Op::SetTextMatrix {
        matrix: TextMatrix::Translate(Pt(x), Pt(y)),
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(text.to_string())],
        font,
    });
    ops.push(Op::EndTextSection);
}

fn push_frame(
    ops: &mut Vec<Op>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    color: (f32, f32, f32),
    thickness: f32,
) {
    let corner = |px: f32, py: f32| LinePoint {
        p: Point { x: Pt(px), y: Pt(py) },
        bezier: false,
    };
    ops.push(Op::SetOutlineColor { col: rgb(color) });
    ops.push(Op::SetOutlineThickness { pt: Pt(thickness) });
    ops.push(Op::DrawPolygon {
        polygon: Polygon {
            rings: vec![PolygonRing {
                points: vec![
                    corner(x, y),
                    corner(x + width, y),
                    corner(x + width, y + height),
                    corner(x, y + height),
                ],
            }],
            mode: PaintMode::Stroke,
            winding_order: WindingOrder::NonZero,
        },
    });
}
