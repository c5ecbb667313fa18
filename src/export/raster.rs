//! ネイティブラスタライザ
//!
//! 論理ページ記述（PageSpec）を固定サイズのRGBビットマップに描画する。
//! 文字は8x8ビットマップフォントを整数倍して描く。

use super::Renderer;
use crate::error::{ReporterError, Result};
use crate::imaging::decode_image;
use field_report_common::export::page_core::{ReportSheet, SheetValue};
use field_report_common::layout::{wrap_text, COMMENTS_SECTION_TITLE, SITE_SECTION_TITLE};
use field_report_common::{PageContent, PageLayout, PageSpec};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const TITLE_GREEN: Rgb<u8> = Rgb([196, 215, 155]);
const HEADER_GRAY: Rgb<u8> = Rgb([209, 213, 219]);
const SIDE_GRAY: Rgb<u8> = Rgb([249, 250, 251]);
const PLACEHOLDER_GRAY: Rgb<u8> = Rgb([156, 163, 175]);
const LABEL_GRAY: Rgb<u8> = Rgb([148, 163, 184]);
const FRAME_GRAY: Rgb<u8> = Rgb([226, 232, 240]);

const GLYPH_PX: u32 = 8;

// 以下の寸法は画面px（96dpi）。描画時にoversample倍する
const BORDER: u32 = 2;
const CELL_PAD: u32 = 8;
const BODY_SCALE: u32 = 1;
const SMALL_SCALE: u32 = 1;
const SECTION_SCALE: u32 = 2;
const TITLE_SCALE: u32 = 3;
const TITLE_BAND_PAD: u32 = 16;
const LINE_GAP: u32 = 4;
const MIN_ROW: u32 = 32;
const SIGNATURE_ROW: u32 = 80;
const SIGNATURE_IMAGE: u32 = 64;
const JOB_ID_CELL: u32 = 64;
const ANSWER_CELL: u32 = 128;
const COMMENTS_MIN: u32 = 300;
const FOOTER_BAR: u32 = 16;
const ATTACHMENT_LABEL_BOTTOM: u32 = 40;

/// image + 8x8フォントによるラスタライザ
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterRenderer;

impl Renderer for RasterRenderer {
    fn render(&self, page: &PageSpec, layout: &PageLayout) -> Result<RgbImage> {
        let mut canvas = Canvas::new(layout);
        match &page.content {
            PageContent::Sheet(sheet) => canvas.draw_sheet(sheet)?,
            PageContent::Attachment { label, image, .. } => {
                let decoded = decode_image(image).map_err(|e| ReporterError::PageRender {
                    page: page.index + 1,
                    reason: format!("{}: {}", label, e),
                })?;
                canvas.draw_attachment(&decoded, label);
            }
        }
        Ok(canvas.into_image())
    }
}

/// 描画先。座標・寸法はビットマップpx
struct Canvas {
    image: RgbImage,
    scale: u32,
    padding: u32,
}

impl Canvas {
    fn new(layout: &PageLayout) -> Self {
        Self {
            image: RgbImage::from_pixel(layout.bitmap_width_px(), layout.bitmap_height_px(), WHITE),
            scale: layout.oversample.max(1),
            padding: layout.mm_to_bitmap_px(layout.padding_mm),
        }
    }

    fn into_image(self) -> RgbImage {
        self.image
    }

    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    /// 画面px → ビットマップpx
    fn px(&self, css: u32) -> u32 {
        css * self.scale
    }

    fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
        let x_end = (x + w).min(self.width());
        let y_end = (y + h).min(self.height());
        for py in y.min(y_end)..y_end {
            for px in x.min(x_end)..x_end {
                self.image.put_pixel(px, py, color);
            }
        }
    }

    fn stroke_rect(&mut self, x: u32, y: u32, w: u32, h: u32, thickness: u32, color: Rgb<u8>) {
        self.fill_rect(x, y, w, thickness, color);
        self.fill_rect(x, (y + h).saturating_sub(thickness), w, thickness, color);
        self.fill_rect(x, y, thickness, h, color);
        self.fill_rect((x + w).saturating_sub(thickness), y, thickness, h, color);
    }

    fn glyph_width(&self, text_scale: u32) -> u32 {
        GLYPH_PX * self.px(text_scale)
    }

    fn line_height(&self, text_scale: u32) -> u32 {
        self.glyph_width(text_scale) + self.px(LINE_GAP)
    }

    /// 幅に収まる1行の文字数
    fn chars_per_line(&self, width: u32, text_scale: u32) -> usize {
        (width / self.glyph_width(text_scale)).max(1) as usize
    }

    fn text_width(&self, text: &str, text_scale: u32) -> u32 {
        text.chars().count() as u32 * self.glyph_width(text_scale)
    }

    fn draw_text(&mut self, x: u32, y: u32, text: &str, text_scale: u32, color: Rgb<u8>) {
        let dot = self.px(text_scale);
        let advance = self.glyph_width(text_scale);
        for (i, c) in text.chars().enumerate() {
            let Some(glyph) = glyph_for(c) else { continue };
            let gx = x + i as u32 * advance;
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..8 {
                    if bits & (1 << col) != 0 {
                        self.fill_rect(gx + col * dot, y + row as u32 * dot, dot, dot, color);
                    }
                }
            }
        }
    }

    fn draw_text_centered(&mut self, x: u32, width: u32, y: u32, text: &str, text_scale: u32, color: Rgb<u8>) {
        let text_w = self.text_width(text, text_scale);
        let offset = width.saturating_sub(text_w) / 2;
        self.draw_text(x + offset, y, text, text_scale, color);
    }

    /// 折り返して描画し、使った高さを返す
    fn draw_wrapped(&mut self, x: u32, y: u32, width: u32, text: &str, text_scale: u32, color: Rgb<u8>) -> u32 {
        let lines = wrap_text(text, self.chars_per_line(width, text_scale));
        let line_h = self.line_height(text_scale);
        for (i, line) in lines.iter().enumerate() {
            self.draw_text(x, y + i as u32 * line_h, line, text_scale, color);
        }
        lines.len() as u32 * line_h
    }

    fn wrapped_height(&self, width: u32, text: &str, text_scale: u32) -> u32 {
        let lines = wrap_text(text, self.chars_per_line(width, text_scale)).len().max(1);
        lines as u32 * self.line_height(text_scale)
    }

    /// 縦横比を保って枠内に収まるよう縮小（元サイズのoversample倍を上限）
    fn fit_within(&self, image: &DynamicImage, w: u32, h: u32) -> RgbImage {
        let (iw, ih) = (image.width().max(1), image.height().max(1));
        let ratio = (w as f32 / iw as f32)
            .min(h as f32 / ih as f32)
            .min(self.scale as f32);
        let tw = ((iw as f32 * ratio).round() as u32).max(1);
        let th = ((ih as f32 * ratio).round() as u32).max(1);
        imageops::resize(&image.to_rgb8(), tw, th, FilterType::Triangle)
    }

    /// 枠内中央に配置し、配置矩形を返す
    fn draw_image_centered(&mut self, image: &DynamicImage, x: u32, y: u32, w: u32, h: u32) -> (u32, u32, u32, u32) {
        let fitted = self.fit_within(image, w, h);
        let (tw, th) = fitted.dimensions();
        let ox = x + w.saturating_sub(tw) / 2;
        let oy = y + h.saturating_sub(th) / 2;
        imageops::overlay(&mut self.image, &fitted, ox as i64, oy as i64);
        (ox, oy, tw, th)
    }

    fn draw_section_bar(&mut self, x: u32, y: u32, w: u32, title: &str) -> u32 {
        let bar_h = self.line_height(SECTION_SCALE) + self.px(CELL_PAD);
        self.fill_rect(x, y, w, bar_h, HEADER_GRAY);
        let text_y = y + (bar_h - self.glyph_width(SECTION_SCALE)) / 2;
        self.draw_text_centered(x, w, text_y, title, SECTION_SCALE, BLACK);
        let border = self.px(BORDER);
        self.fill_rect(x, y + bar_h, w, border, BLACK);
        bar_h + border
    }

    /// 緑の帯に見出しを2行で描く（最後の語を2行目へ）
    fn draw_title_band(&mut self, x: u32, y: u32, w: u32, title: &str) -> u32 {
        let lines: Vec<&str> = match title.rsplit_once(' ') {
            Some((head, last)) => vec![head, last],
            None => vec![title],
        };
        let band_pad = self.px(TITLE_BAND_PAD);
        let line_h = self.line_height(TITLE_SCALE);
        let band_h = band_pad * 2 + line_h * lines.len() as u32;

        self.fill_rect(x, y, w, band_h, TITLE_GREEN);
        for (i, line) in lines.iter().enumerate() {
            self.draw_text_centered(x, w, y + band_pad + i as u32 * line_h, line, TITLE_SCALE, BLACK);
        }
        let border = self.px(BORDER);
        self.fill_rect(x, y + band_h, w, border, BLACK);
        band_h + border
    }

    /// 設問セルの文字幅（回答セルと仕切り線を除く）
    fn question_text_width(&self, width: u32) -> u32 {
        width - self.px(ANSWER_CELL) - self.px(BORDER) - self.px(CELL_PAD) * 2
    }

    fn draw_sheet(&mut self, sheet: &ReportSheet) -> Result<()> {
        let border = self.px(BORDER);
        let pad = self.px(CELL_PAD);
        let x0 = self.padding;
        let width = self.width() - self.padding * 2;
        let mut y = self.padding;

        let box_top = y;
        self.fill_rect(x0, y, width, border, BLACK);
        y += border;
        y += self.draw_title_band(x0, y, width, sheet.title);
        y += self.draw_section_bar(x0, y, width, SITE_SECTION_TITLE);

        // 項目表（ラベル1/3 + 値2/3）
        let label_w = width / 3;
        let value_x = x0 + label_w + border;
        let value_w = width - label_w - border;

        for row in &sheet.rows {
            let label_h = self.wrapped_height(label_w - pad * 2, row.label, BODY_SCALE);
            let value_h = self.measure_value(&row.value, value_w);
            let min_h = match row.value {
                SheetValue::Signature { .. } => self.px(SIGNATURE_ROW),
                _ => self.px(MIN_ROW),
            };
            let row_h = (label_h.max(value_h) + pad * 2).max(min_h);

            self.draw_wrapped(x0 + pad, y + pad, label_w - pad * 2, row.label, BODY_SCALE, BLACK);
            self.fill_rect(x0 + label_w, y, border, row_h, BLACK);
            self.draw_value(&row.value, value_x, y, value_w, row_h)?;

            y += row_h;
            self.fill_rect(x0, y, width, border, BLACK);
            y += border;
        }

        // コメント欄（段落ごとのブロック）
        y += self.draw_section_bar(x0, y, width, COMMENTS_SECTION_TITLE);
        let comments_top = y;
        for block in &sheet.comment_blocks {
            let text_h = self.wrapped_height(width - pad * 2, block, BODY_SCALE);
            self.draw_wrapped(x0 + pad, y + pad, width - pad * 2, block, BODY_SCALE, BLACK);
            y += text_h + pad * 2;
            self.fill_rect(x0, y, width, border, BLACK);
            y += border;
        }
        y = y.max(comments_top + self.px(COMMENTS_MIN));

        // 下端の黒帯と外枠
        let footer = self.px(FOOTER_BAR);
        self.fill_rect(x0, y, width, footer, BLACK);
        y += footer;
        self.stroke_rect(x0, box_top, width, y - box_top, border, BLACK);

        if y > self.height() {
            log::debug!("report sheet overflows page by {}px", y - self.height());
        }
        Ok(())
    }

    fn measure_value(&self, value: &SheetValue, width: u32) -> u32 {
        let pad = self.px(CELL_PAD);
        match value {
            SheetValue::Text(text) => self.wrapped_height(width - pad * 2, text, BODY_SCALE),
            SheetValue::WithSide { main, side } => {
                let side_w = self.px(JOB_ID_CELL);
                self.wrapped_height(width - side_w - pad * 2, main, BODY_SCALE)
                    .max(self.wrapped_height(side_w - pad * 2, side, BODY_SCALE))
            }
            SheetValue::Question { answer, question, detail } => {
                let answer_w = self.px(ANSWER_CELL);
                let text_w = self.question_text_width(width);
                self.wrapped_height(answer_w, answer, BODY_SCALE).max(
                    self.wrapped_height(text_w, question, SMALL_SCALE)
                        + self.wrapped_height(text_w, detail, SMALL_SCALE),
                )
            }
            SheetValue::Signature { .. } => self.px(SIGNATURE_IMAGE),
        }
    }

    fn draw_value(&mut self, value: &SheetValue, x: u32, y: u32, width: u32, row_h: u32) -> Result<()> {
        let pad = self.px(CELL_PAD);
        let border = self.px(BORDER);
        match value {
            SheetValue::Text(text) => {
                self.draw_wrapped(x + pad, y + pad, width - pad * 2, text, BODY_SCALE, BLACK);
            }
            SheetValue::WithSide { main, side } => {
                let side_w = self.px(JOB_ID_CELL);
                let side_x = x + width - side_w;
                self.fill_rect(side_x, y, side_w, row_h, SIDE_GRAY);
                self.fill_rect(side_x - border, y, border, row_h, BLACK);
                self.draw_wrapped(x + pad, y + pad, width - side_w - pad * 2, main, BODY_SCALE, BLACK);
                self.draw_wrapped(side_x + pad, y + pad, side_w - pad * 2, side, BODY_SCALE, BLACK);
            }
            SheetValue::Question { answer, question, detail } => {
                let answer_w = self.px(ANSWER_CELL);
                self.draw_text_centered(x, answer_w, y + pad, answer, BODY_SCALE, BLACK);
                self.fill_rect(x + answer_w, y, border, row_h, BLACK);
                let text_x = x + answer_w + border + pad;
                let text_w = self.question_text_width(width);
                let used = self.draw_wrapped(text_x, y + pad, text_w, question, SMALL_SCALE, BLACK);
                self.draw_wrapped(text_x, y + pad + used, text_w, detail, SMALL_SCALE, BLACK);
            }
            SheetValue::Signature { image, placeholder } => match image {
                Some(url) => {
                    let signature = decode_image(url).map_err(|e| ReporterError::PageRender {
                        page: 1,
                        reason: format!("signature: {}", e),
                    })?;
                    let box_h = self.px(SIGNATURE_IMAGE);
                    let box_y = y + (row_h.saturating_sub(box_h)) / 2;
                    // 左詰め
                    let fitted = self.fit_within(&signature, width - pad * 2, box_h);
                    let oy = box_y + box_h.saturating_sub(fitted.height()) / 2;
                    imageops::overlay(&mut self.image, &fitted, (x + pad) as i64, oy as i64);
                }
                None => {
                    let text_y = y + (row_h.saturating_sub(self.glyph_width(SECTION_SCALE))) / 2;
                    self.draw_text(x + pad, text_y, placeholder, SECTION_SCALE, PLACEHOLDER_GRAY);
                }
            },
        }
        Ok(())
    }

    fn draw_attachment(&mut self, image: &DynamicImage, label: &str) {
        let label_h = self.line_height(BODY_SCALE);
        let label_y = self.height() - self.px(ATTACHMENT_LABEL_BOTTOM) - label_h;
        let box_x = self.padding;
        let box_y = self.padding;
        let box_w = self.width() - self.padding * 2;
        let box_h = label_y.saturating_sub(self.padding + self.px(CELL_PAD));

        let (ox, oy, tw, th) = self.draw_image_centered(image, box_x, box_y, box_w, box_h);
        let frame = self.px(1);
        self.stroke_rect(
            ox.saturating_sub(frame),
            oy.saturating_sub(frame),
            tw + frame * 2,
            th + frame * 2,
            frame,
            FRAME_GRAY,
        );

        let width = self.width();
        self.draw_text_centered(0, width, label_y, &label.to_uppercase(), BODY_SCALE, LABEL_GRAY);
    }
}

/// 文字のグリフ。未収録の文字は近い形に置き換え、なければ'?'
fn glyph_for(c: char) -> Option<[u8; 8]> {
    let c = match c {
        '–' | '—' => '-',
        '‘' | '’' => '\'',
        '“' | '”' => '"',
        '\t' => ' ',
        other => other,
    };
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
}
