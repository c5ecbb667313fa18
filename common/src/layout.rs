//! レイアウト設定モジュール
//!
//! mm基準のページ定義（Source of Truth）。
//! ラスタライズ・PDF組版の双方がここから寸法を導出する。

// ============================================
// mm基準レイアウト（Source of Truth）
// ============================================

/// A4サイズ（mm）
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

/// ページ内余白（mm）
pub const PAGE_PADDING_MM: f32 = 12.0;

// ============================================
// 変換係数
// ============================================

/// mm → pt変換 (1mm = 72/25.4 pt ≈ 2.835pt)
pub const MM_TO_PT: f32 = 72.0 / 25.4;

/// 画面解像度（CSS px基準）
pub const SCREEN_DPI: f32 = 96.0;

/// mm → px変換 (96dpi基準)
pub const MM_TO_PX: f32 = SCREEN_DPI / 25.4;

/// 印刷品質のためのオーバーサンプリング倍率
pub const OVERSAMPLE: u32 = 2;

/// A4の画面サイズ（px、96dpi）
pub const PAGE_WIDTH_PX: u32 = 794; // 793.7px
pub const PAGE_HEIGHT_PX: u32 = 1123; // 1122.5px

// ============================================
// フィールド定義
// ============================================

/// 報告書の表に並ぶ行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefinition {
    pub key: &'static str,
    pub label: &'static str,
}

/// 表の行順（固定）
pub const SHEET_FIELDS: &[FieldDefinition] = &[
    FieldDefinition { key: "dateTime", label: "Date / Time of Inspection" },
    FieldDefinition { key: "projectName", label: "Project Name" },
    FieldDefinition { key: "ownerDeveloper", label: "Owner / Developer" },
    FieldDefinition { key: "projectAddress", label: "Project Address" },
    FieldDefinition { key: "stageOfConstruction", label: "Stage of Construction" },
    FieldDefinition { key: "projectType", label: "Project Type" },
    FieldDefinition { key: "inspectionType", label: "Inspection Type" },
    FieldDefinition { key: "weather", label: "Site Weather Information" },
    FieldDefinition { key: "photosTaken", label: "Were Photos Taken?" },
    FieldDefinition { key: "inspectorName", label: "Inspector Name" },
    FieldDefinition { key: "inspectorContact", label: "Inspector Contact Information" },
    FieldDefinition { key: "signature", label: "Signature" },
];

pub const SHEET_TITLE: &str = "Field Inspection Report";
pub const SITE_SECTION_TITLE: &str = "General Site Information";
pub const COMMENTS_SECTION_TITLE: &str = "General Comments";
pub const VISUAL_INSPECTION_QUESTION: &str =
    "Is there any reason a visual inspection cannot be performed at this time?";

// ============================================
// レイアウト設定構造体
// ============================================

/// ページレイアウト設定
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// ページ幅（mm）
    pub page_width_mm: f32,
    /// ページ高さ（mm）
    pub page_height_mm: f32,
    /// 余白（mm）
    pub padding_mm: f32,
    /// ラスタ倍率
    pub oversample: u32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageLayout {
    pub fn a4() -> Self {
        Self {
            page_width_mm: A4_WIDTH_MM,
            page_height_mm: A4_HEIGHT_MM,
            padding_mm: PAGE_PADDING_MM,
            oversample: OVERSAMPLE,
        }
    }

    /// ビットマップ幅（px、オーバーサンプリング後）
    pub fn bitmap_width_px(&self) -> u32 {
        mm_to_px(self.page_width_mm).round() as u32 * self.oversample
    }

    /// ビットマップ高さ（px、オーバーサンプリング後）
    pub fn bitmap_height_px(&self) -> u32 {
        mm_to_px(self.page_height_mm).round() as u32 * self.oversample
    }

    /// mm → ビットマップpx
    pub fn mm_to_bitmap_px(&self, mm: f32) -> u32 {
        (mm_to_px(mm) * self.oversample as f32).round() as u32
    }

    /// ページ幅いっぱいに置いたときの画像高さ（mm、縦横比維持）
    pub fn placed_height_mm(&self, bitmap_width: u32, bitmap_height: u32) -> f32 {
        if bitmap_width == 0 {
            return 0.0;
        }
        bitmap_height as f32 * self.page_width_mm / bitmap_width as f32
    }
}

// ============================================
// ヘルパー関数
// ============================================

/// mm → pt 変換
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

/// mm → px 変換（96dpi）
#[inline]
pub fn mm_to_px(mm: f32) -> f32 {
    mm * MM_TO_PX
}

/// 1行あたりの最大文字数で折り返す
///
/// 明示的な改行は保持する。単語が1行に収まらない場合は文字単位で分割。
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for raw_line in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in raw_line.split_whitespace() {
            let word_len = word.chars().count();

            if current_len > 0 && current_len + 1 + word_len > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }

            if word_len > max_chars {
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(max_chars) {
                    if current_len > 0 {
                        lines.push(std::mem::take(&mut current));
                    }
                    current = chunk.iter().collect();
                    current_len = chunk.len();
                }
                continue;
            }

            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
        }

        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_pixels_match_mm() {
        assert_eq!(mm_to_px(A4_WIDTH_MM).round() as u32, PAGE_WIDTH_PX);
        assert_eq!(mm_to_px(A4_HEIGHT_MM).round() as u32, PAGE_HEIGHT_PX);
    }

    #[test]
    fn test_bitmap_oversampled() {
        let layout = PageLayout::a4();
        assert_eq!(layout.bitmap_width_px(), PAGE_WIDTH_PX * 2);
        assert_eq!(layout.bitmap_height_px(), PAGE_HEIGHT_PX * 2);
    }

    #[test]
    fn test_placed_height_keeps_ratio() {
        let layout = PageLayout::a4();
        assert!((layout.placed_height_mm(1000, 2000) - 420.0).abs() < 0.001);
        assert!((layout.placed_height_mm(2100, 1050) - 105.0).abs() < 0.001);
        let full = layout.placed_height_mm(layout.bitmap_width_px(), layout.bitmap_height_px());
        assert!((full - A4_HEIGHT_MM).abs() < 0.5);
        assert_eq!(layout.placed_height_mm(0, 100), 0.0);
    }

    #[test]
    fn test_conversion() {
        assert!((MM_TO_PT - 2.835).abs() < 0.01);
        assert!((mm_to_pt(10.0) - 28.35).abs() < 0.1);
    }

    #[test]
    fn test_sheet_field_order() {
        assert_eq!(SHEET_FIELDS.len(), 12);
        assert_eq!(SHEET_FIELDS[0].label, "Date / Time of Inspection");
        assert_eq!(SHEET_FIELDS[11].label, "Signature");
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("a\nb", 10), vec!["a", "b"]);
        assert!(wrap_text("", 10).is_empty());
    }
}
