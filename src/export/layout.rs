//! Multi-page document layout for export.
//!
//! Pure pagination math over A4 millimetres: page 1 opens with the dataset
//! title, then each captured chart gets a caption and an image scaled to a
//! fixed width, then the rendered table follows as a grid split across
//! pages with its header repeated. A block that would overflow the usable
//! height starts a new page; every page carries a numbered footer.

use crate::chart::Slot;
use crate::export::CapturedImage;
use crate::table::TableViewModel;

/// A4 portrait, millimetres.
pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;
pub const MARGIN_MM: f64 = 10.0;

/// Fixed width chart images are scaled to, preserving aspect ratio.
pub const IMAGE_WIDTH_MM: f64 = 190.0;

const CONTENT_START_MM: f64 = 30.0;
const CAPTION_HEIGHT_MM: f64 = 6.0;
const BLOCK_GAP_MM: f64 = 10.0;
const TABLE_ROW_HEIGHT_MM: f64 = 8.0;
const FOOTER_CLEARANCE_MM: f64 = 12.0;

/// One ordered content block on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Dataset title, page 1 only.
    Heading(String),
    /// Short chart caption ("Primary chart" / "Secondary chart").
    Caption(String),
    /// Captured chart image with its layout size.
    Image { bytes: Vec<u8>, width_mm: f64, height_mm: f64 },
    /// Table grid chunk; the styled header row repeats on every chunk.
    Table { headers: Vec<String>, rows: Vec<Vec<String>> },
}

/// One page: content blocks plus its footer text.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub blocks: Vec<Block>,
    pub footer: String,
}

/// The fully laid out document handed to the document sink.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedDocument {
    pub pages: Vec<Page>,
}

fn usable_bottom() -> f64 {
    PAGE_HEIGHT_MM - FOOTER_CLEARANCE_MM
}

/// Accumulates blocks page by page while tracking the vertical cursor.
struct PageBuilder {
    done: Vec<Vec<Block>>,
    current: Vec<Block>,
    cursor: f64,
}

impl PageBuilder {
    fn new(title: &str) -> Self {
        Self {
            done: Vec::new(),
            current: vec![Block::Heading(title.to_string())],
            cursor: CONTENT_START_MM,
        }
    }

    /// Room left above the footer on the current page.
    fn available(&self) -> f64 {
        usable_bottom() - self.cursor
    }

    /// True when the cursor is still at the top of a fresh page.
    fn at_page_top(&self) -> bool {
        self.cursor <= MARGIN_MM
    }

    fn break_page(&mut self) {
        self.done.push(std::mem::take(&mut self.current));
        self.cursor = MARGIN_MM;
    }

    fn push(&mut self, block: Block, height: f64) {
        self.current.push(block);
        self.cursor += height;
    }

    fn finish(mut self) -> ComposedDocument {
        self.done.push(self.current);
        let pages = self
            .done
            .into_iter()
            .enumerate()
            .map(|(i, blocks)| Page { blocks, footer: format!("Página {}", i + 1) })
            .collect();
        ComposedDocument { pages }
    }
}

/// Lay out the export document.
///
/// `captures` arrive in slot order; `view` is the current filtered/sorted
/// table, not the canonical set.
pub fn compose(
    title: &str,
    captures: &[(Slot, CapturedImage)],
    view: &TableViewModel,
) -> ComposedDocument {
    let mut builder = PageBuilder::new(title);

    for (slot, image) in captures {
        let height_mm = scaled_height(image);
        let block_height = CAPTION_HEIGHT_MM + height_mm;

        // An oversized image at the top of a fresh page is placed anyway;
        // breaking again would loop forever.
        if block_height > builder.available() && !builder.at_page_top() {
            builder.break_page();
        }

        builder.push(Block::Caption(slot.caption().to_string()), CAPTION_HEIGHT_MM);
        builder.push(
            Block::Image { bytes: image.bytes.clone(), width_mm: IMAGE_WIDTH_MM, height_mm },
            height_mm + BLOCK_GAP_MM,
        );
    }

    place_table(&mut builder, view);
    builder.finish()
}

/// Image height in millimetres at the fixed export width.
fn scaled_height(image: &CapturedImage) -> f64 {
    if image.width_px == 0 {
        return 0.0;
    }
    image.height_px as f64 * IMAGE_WIDTH_MM / image.width_px as f64
}

fn place_table(builder: &mut PageBuilder, view: &TableViewModel) {
    let headers: Vec<String> = view.headers.iter().map(|h| h.name.clone()).collect();
    let header_height = TABLE_ROW_HEIGHT_MM;

    // The table needs room for its header plus at least one body row.
    if builder.available() < header_height + TABLE_ROW_HEIGHT_MM && !builder.at_page_top() {
        builder.break_page();
    }

    let mut remaining: &[Vec<String>] = &view.rows;
    loop {
        let capacity =
            ((builder.available() - header_height) / TABLE_ROW_HEIGHT_MM).floor().max(0.0) as usize;

        if capacity == 0 && !remaining.is_empty() {
            builder.break_page();
            continue;
        }

        let take = remaining.len().min(capacity);
        let (chunk, rest) = remaining.split_at(take);
        builder.push(
            Block::Table { headers: headers.clone(), rows: chunk.to_vec() },
            header_height + take as f64 * TABLE_ROW_HEIGHT_MM,
        );

        remaining = rest;
        if remaining.is_empty() {
            break;
        }
        builder.break_page();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{HeaderCell, ViewState};

    fn image(width_px: u32, height_px: u32) -> CapturedImage {
        CapturedImage { bytes: vec![0u8; 8], width_px, height_px }
    }

    fn view(rows: usize) -> TableViewModel {
        TableViewModel {
            headers: vec![
                HeaderCell { name: "Produto".into(), sort: None },
                HeaderCell { name: "Quantidade".into(), sort: None },
            ],
            rows: (0..rows).map(|i| vec![format!("Item {i}"), i.to_string()]).collect(),
            state: if rows == 0 { ViewState::NoResults } else { ViewState::Populated },
        }
    }

    #[test]
    fn test_single_page_layout() {
        // One short chart and a small table fit on page 1.
        let captures = vec![(Slot::Primary, image(950, 400))];
        let doc = compose("Inventário de Estoque", &captures, &view(5));

        assert_eq!(doc.pages.len(), 1);
        let blocks = &doc.pages[0].blocks;
        assert!(matches!(blocks[0], Block::Heading(ref t) if t == "Inventário de Estoque"));
        assert!(matches!(blocks[1], Block::Caption(ref c) if c == "Primary chart"));
        assert!(matches!(blocks[2], Block::Image { .. }));
        assert!(matches!(blocks[3], Block::Table { ref rows, .. } if rows.len() == 5));
        assert_eq!(doc.pages[0].footer, "Página 1");
    }

    #[test]
    fn test_image_scaled_to_fixed_width() {
        let captures = vec![(Slot::Primary, image(950, 475))];
        let doc = compose("t", &captures, &view(0));
        let Block::Image { width_mm, height_mm, .. } = &doc.pages[0].blocks[2] else {
            panic!("expected image block");
        };
        assert_eq!(*width_mm, IMAGE_WIDTH_MM);
        assert!((height_mm - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_second_chart_breaks_to_new_page_when_tall() {
        // Two square charts: 190 mm each cannot share one page.
        let captures =
            vec![(Slot::Primary, image(800, 800)), (Slot::Secondary, image(800, 800))];
        let doc = compose("t", &captures, &view(0));

        assert!(doc.pages.len() >= 2);
        assert!(matches!(doc.pages[1].blocks[0], Block::Caption(ref c) if c == "Secondary chart"));
        assert_eq!(doc.pages[1].footer, "Página 2");
    }

    #[test]
    fn test_long_table_splits_with_repeated_header() {
        let doc = compose("t", &[], &view(80));

        assert!(doc.pages.len() >= 2, "80 rows cannot fit one A4 page");
        let mut seen_rows = 0;
        for page in &doc.pages {
            for block in &page.blocks {
                if let Block::Table { headers, rows } = block {
                    assert_eq!(headers[0], "Produto", "header repeats on every chunk");
                    seen_rows += rows.len();
                }
            }
        }
        assert_eq!(seen_rows, 80, "no row lost or duplicated across pages");
    }

    #[test]
    fn test_empty_view_still_emits_header_grid() {
        let doc = compose("t", &[], &view(0));
        assert!(doc
            .pages
            .iter()
            .flat_map(|p| &p.blocks)
            .any(|b| matches!(b, Block::Table { rows, .. } if rows.is_empty())));
    }

    #[test]
    fn test_footers_number_every_page() {
        let doc = compose("t", &[], &view(200));
        for (i, page) in doc.pages.iter().enumerate() {
            assert_eq!(page.footer, format!("Página {}", i + 1));
        }
    }

    #[test]
    fn test_oversized_image_is_placed_without_looping() {
        // Taller than a whole page even after a break.
        let captures = vec![(Slot::Primary, image(100, 1000))];
        let doc = compose("t", &captures, &view(1));
        assert!(doc
            .pages
            .iter()
            .flat_map(|p| &p.blocks)
            .any(|b| matches!(b, Block::Image { .. })));
    }
}
