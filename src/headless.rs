//! Headless capability adapters.
//!
//! Concrete implementations of the chart, rasterization and document seams
//! that work without a browser: charts render to plain text, "rasterization"
//! returns that text as the image buffer, and the document sink writes a
//! paginated text file. The CLI and the integration tests run the full
//! pipeline through these.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::chart::{ChartInstance, ChartKind, ChartRenderer, ChartSpec};
use crate::export::{
    Block, CapabilityError, CapturedImage, ComposedDocument, DocumentSink, Rasterizer,
};

/// Canvas size reported for headless captures, in pixels.
pub const CANVAS_WIDTH_PX: u32 = 950;
pub const CANVAS_HEIGHT_PX: u32 = 450;

const BAR_WIDTH: usize = 40;

/// A chart "instance" holding its spec and the mutable visual state the
/// export orchestrator snapshots and restores.
pub struct HeadlessChart {
    spec: ChartSpec,
    responsive: bool,
    shadow: String,
    destroyed: bool,
}

impl HeadlessChart {
    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Text rendering of the chart, used as the capture source.
    fn draw(&self) -> String {
        let series = &self.spec.series;
        let max = series.totals.iter().cloned().fold(0.0_f64, f64::max);
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.spec.title);

        for (category, total) in series.categories.iter().zip(&series.totals) {
            let filled = if max > 0.0 {
                ((total / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            let glyph = match self.spec.kind {
                ChartKind::Bar => '#',
                ChartKind::Donut => 'o',
            };
            let bar: String = std::iter::repeat(glyph).take(filled.max(1)).collect();
            let _ = writeln!(out, "{category:<20} {bar} {total}");
        }

        if self.spec.show_legend {
            let _ = writeln!(out, "legenda: {}", series.categories.join(" | "));
        }
        out
    }
}

impl ChartInstance for HeadlessChart {
    fn destroy(&mut self) {
        self.destroyed = true;
    }

    fn resize(&mut self) {}

    fn responsive(&self) -> bool {
        self.responsive
    }

    fn set_responsive(&mut self, on: bool) {
        self.responsive = on;
    }

    fn shadow(&self) -> String {
        self.shadow.clone()
    }

    fn set_shadow(&mut self, style: &str) {
        self.shadow = style.to_string();
    }
}

/// Renderer producing [`HeadlessChart`] instances.
#[derive(Debug, Default)]
pub struct HeadlessChartRenderer;

impl ChartRenderer for HeadlessChartRenderer {
    type Chart = HeadlessChart;

    fn create(&mut self, spec: &ChartSpec) -> HeadlessChart {
        HeadlessChart {
            spec: spec.clone(),
            responsive: true,
            shadow: "0 4px 8px rgba(0,0,0,0.1)".to_string(),
            destroyed: false,
        }
    }
}

/// Rasterizer that captures the chart's text rendering.
#[derive(Debug, Default)]
pub struct HeadlessRasterizer;

impl Rasterizer<HeadlessChart> for HeadlessRasterizer {
    async fn capture(
        &self,
        chart: &HeadlessChart,
        _background: &str,
    ) -> Result<CapturedImage, CapabilityError> {
        if chart.is_destroyed() {
            return Err("capture target was destroyed".into());
        }
        Ok(CapturedImage {
            bytes: chart.draw().into_bytes(),
            width_px: CANVAS_WIDTH_PX,
            height_px: CANVAS_HEIGHT_PX,
        })
    }
}

/// Document sink writing each export as a paginated `.txt` file.
#[derive(Debug)]
pub struct TextReportSink {
    dir: PathBuf,
}

impl TextReportSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    /// Where a given filename ends up.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    fn render(document: &ComposedDocument) -> String {
        let mut out = String::new();
        for page in &document.pages {
            for block in &page.blocks {
                match block {
                    Block::Heading(title) => {
                        let _ = writeln!(out, "{title}");
                        let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
                    }
                    Block::Caption(caption) => {
                        let _ = writeln!(out, "-- {caption} --");
                    }
                    Block::Image { bytes, width_mm, height_mm } => {
                        let _ = writeln!(out, "[imagem {width_mm:.0}x{height_mm:.0} mm]");
                        out.push_str(&String::from_utf8_lossy(bytes));
                    }
                    Block::Table { headers, rows } => {
                        render_grid(&mut out, headers, rows);
                    }
                }
                out.push('\n');
            }
            let _ = writeln!(out, "{:>78}", page.footer);
            let _ = writeln!(out, "{}", "-".repeat(78));
        }
        out
    }
}

/// Pipe-separated grid with a separator line under the header row.
fn render_grid(out: &mut String, headers: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c, width = widths.get(i).copied().unwrap_or(0)))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let _ = writeln!(out, "{}", line(headers));
    let _ = writeln!(out, "{}", widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
    for row in rows {
        let _ = writeln!(out, "{}", line(row));
    }
}

impl DocumentSink for TextReportSink {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn save(&self, document: &ComposedDocument, filename: &str) -> Result<(), CapabilityError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(filename), Self::render(document))?;
        Ok(())
    }
}
