use super::RenderedPage;
use crate::error::{ReporterError, Result};
use field_report_common::PageLayout;
use printpdf::image_crate::{DynamicImage as PdfDynamicImage, RgbImage as PdfRgbImage};
use printpdf::{Image, ImageTransform, Mm, PdfDocument};

/// ページ画像の配置（上端揃え、PDF幅いっぱい）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub translate_y_mm: f32,
    pub height_mm: f32,
    pub dpi: f32,
}

impl Placement {
    pub fn for_bitmap(layout: &PageLayout, width_px: u32, height_px: u32) -> Self {
        let height_mm = layout.placed_height_mm(width_px, height_px);
        Self {
            translate_y_mm: layout.page_height_mm - height_mm,
            height_mm,
            dpi: width_px.max(1) as f32 * 25.4 / layout.page_width_mm,
        }
    }
}

/// ページ画像をA4のPDFに1枚ずつ配置してバイト列を返す
pub fn assemble_pdf(title: &str, pages: &[RenderedPage], layout: &PageLayout) -> Result<Vec<u8>> {
    if pages.is_empty() {
        return Err(ReporterError::NoPages);
    }

    let width = Mm(layout.page_width_mm);
    let height = Mm(layout.page_height_mm);
    let (doc, page1, layer1) = PdfDocument::new(title, width, height, "Layer 1");

    let mut targets = vec![(page1, layer1)];
    for _ in 1..pages.len() {
        targets.push(doc.add_page(width, height, "Layer 1"));
    }

    for (page, (page_index, layer_index)) in pages.iter().zip(targets) {
        let layer = doc.get_page(page_index).get_layer(layer_index);
        let (w, h) = page.bitmap.dimensions();
        let placement = Placement::for_bitmap(layout, w, h);

        let raw = PdfRgbImage::from_raw(w, h, page.bitmap.as_raw().clone()).ok_or_else(|| {
            ReporterError::PdfGeneration(format!("invalid bitmap for {}", page.label))
        })?;
        let image = Image::from_dynamic_image(&PdfDynamicImage::ImageRgb8(raw));
        image.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(0.0)),
                translate_y: Some(Mm(placement.translate_y_mm)),
                dpi: Some(placement.dpi),
                ..Default::default()
            },
        );
        log::debug!("placed {} ({}x{}px, {:.1}mm)", page.label, w, h, placement.height_mm);
    }

    doc.save_to_bytes()
        .map_err(|e| ReporterError::PdfGeneration(format!("PDF保存エラー: {:?}", e)))
}
