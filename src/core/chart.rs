//! Minimal bar chart rendering: a chart is laid out as an SVG document and
//! rasterised to PNG with resvg.

use crate::domain::model::{HalfBlocksHistogram, PrefetchBucket};
use crate::utils::error::{GalleryError, Result};
use image::{ImageFormat, RgbaImage};
use std::fmt::Write as _;
use std::io::Cursor;
use std::sync::{Arc, OnceLock};

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 24.0;
const MARGIN_BOTTOM: f64 = 64.0;
const BAR_COLOR: &str = "#1f77b4";
const BAR_WIDTH: f64 = 0.8;

pub const PREFETCH_X_LABEL: &str = "Number of blocks prefetched";
pub const PREFETCH_Y_LABEL: &str = "Percentage of Queries";
pub const HALF_BLOCKS_X_LABEL: &str = "Time to fetch half of the blocks in the query (Millisecond)";
pub const HALF_BLOCKS_Y_LABEL: &str = "Number of queries";

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub x_start: f64,
    pub x_end: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

impl Tick {
    fn at(value: f64) -> Self {
        Self {
            value,
            label: format_tick(value),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub width: u32,
    pub height: u32,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub bars: Vec<Bar>,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub x_label: String,
    pub y_label: String,
}

impl ChartSpec {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    fn plot_width(&self) -> f64 {
        (self.width as f64 - MARGIN_LEFT - MARGIN_RIGHT).max(1.0)
    }

    fn plot_height(&self) -> f64 {
        (self.height as f64 - MARGIN_TOP - MARGIN_BOTTOM).max(1.0)
    }

    fn px(&self, x: f64) -> f64 {
        let (x0, x1) = self.x_range;
        MARGIN_LEFT + (x - x0) / (x1 - x0) * self.plot_width()
    }

    fn py(&self, y: f64) -> f64 {
        let (y0, y1) = self.y_range;
        MARGIN_TOP + self.plot_height() - (y - y0) / (y1 - y0) * self.plot_height()
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let bottom = self.py(self.y_range.0);
        let left = self.px(self.x_range.0);
        let right = left + self.plot_width();

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
            w = self.width,
            h = self.height
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);

        for bar in &self.bars {
            let x = self.px(bar.x_start.max(self.x_range.0));
            let x_end = self.px(bar.x_end.min(self.x_range.1));
            let y = self.py(bar.height.min(self.y_range.1));
            let _ = writeln!(
                svg,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
                x,
                y,
                (x_end - x).max(0.0),
                (bottom - y).max(0.0),
                BAR_COLOR
            );
        }

        // 座標軸
        let _ = writeln!(
            svg,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="black" stroke-width="1"/>"#,
            left,
            MARGIN_TOP,
            self.plot_width(),
            self.plot_height()
        );

        for tick in &self.x_ticks {
            let x = self.px(tick.value);
            let _ = writeln!(
                svg,
                r#"<line x1="{x:.2}" y1="{b:.2}" x2="{x:.2}" y2="{t:.2}" stroke="black"/>"#,
                x = x,
                b = bottom,
                t = bottom + 4.0
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.2}" y="{:.2}" font-size="11" text-anchor="middle">{}</text>"#,
                x,
                bottom + 18.0,
                escape(&tick.label)
            );
        }

        for tick in &self.y_ticks {
            let y = self.py(tick.value);
            let _ = writeln!(
                svg,
                r#"<line x1="{l:.2}" y1="{y:.2}" x2="{e:.2}" y2="{y:.2}" stroke="black"/>"#,
                l = left - 4.0,
                e = left,
                y = y
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.2}" y="{:.2}" font-size="11" text-anchor="end">{}</text>"#,
                left - 7.0,
                y + 4.0,
                escape(&tick.label)
            );
        }

        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-size="13" text-anchor="middle">{}</text>"#,
            (left + right) / 2.0,
            self.height as f64 - 16.0,
            escape(&self.x_label)
        );
        let label_x = 20.0;
        let label_y = MARGIN_TOP + self.plot_height() / 2.0;
        let _ = writeln!(
            svg,
            r#"<text x="{x:.2}" y="{y:.2}" font-size="13" text-anchor="middle" transform="rotate(-90 {x:.2} {y:.2})">{}</text>"#,
            escape(&self.y_label),
            x = label_x,
            y = label_y
        );

        svg.push_str("</svg>\n");
        svg
    }

    pub fn render_png(&self) -> Result<Vec<u8>> {
        rasterize_svg(&self.to_svg(), self.width, self.height)
    }
}

/// Bar chart of the prefetch distribution, one bar per block count.
pub fn prefetch_chart(buckets: &[PrefetchBucket]) -> ChartSpec {
    let bars: Vec<Bar> = buckets
        .iter()
        .map(|b| {
            let center = b.nblocks as f64;
            Bar {
                x_start: center - BAR_WIDTH / 2.0,
                x_end: center + BAR_WIDTH / 2.0,
                height: b.percentage,
            }
        })
        .collect();

    let x_range = match (buckets.first(), buckets.last()) {
        (Some(first), Some(last)) => (first.nblocks as f64 - 0.6, last.nblocks as f64 + 0.6),
        _ => (0.0, 1.0),
    };
    let y_max = buckets.iter().map(|b| b.percentage).fold(0.0, f64::max);
    let y_ticks = nice_ticks(if y_max > 0.0 { y_max } else { 1.0 });
    let y_top = y_ticks.last().map(|t| t.value).unwrap_or(1.0).max(y_max * 1.05);

    ChartSpec {
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        x_range,
        y_range: (0.0, y_top),
        bars,
        x_ticks: buckets.iter().map(|b| Tick::at(b.nblocks as f64)).collect(),
        y_ticks,
        x_label: PREFETCH_X_LABEL.to_string(),
        y_label: PREFETCH_Y_LABEL.to_string(),
    }
}

/// Histogram of half-blocks fetch times with integer count ticks.
pub fn half_blocks_chart(hist: &HalfBlocksHistogram) -> ChartSpec {
    let bars: Vec<Bar> = hist
        .edges
        .windows(2)
        .zip(&hist.counts)
        .map(|(edge, &count)| Bar {
            x_start: edge[0],
            x_end: edge[1],
            height: count as f64,
        })
        .collect();

    let x_max = hist.edges.last().copied().unwrap_or(1.0);
    let y_max = hist.max_count().max(1) as f64;
    let y_ticks: Vec<Tick> = nice_ticks(y_max)
        .into_iter()
        .filter(|t| t.value.fract() == 0.0)
        .collect();
    let y_top = y_ticks.last().map(|t| t.value).unwrap_or(y_max).max(y_max * 1.05);

    ChartSpec {
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        x_range: (0.0, x_max),
        y_range: (0.0, y_top),
        bars,
        x_ticks: nice_ticks(x_max),
        y_ticks,
        x_label: HALF_BLOCKS_X_LABEL.to_string(),
        y_label: HALF_BLOCKS_Y_LABEL.to_string(),
    }
}

/// Ticks from zero up to the first round step at or above `max`.
pub fn nice_ticks(max: f64) -> Vec<Tick> {
    if !(max > 0.0) || !max.is_finite() {
        return vec![Tick::at(0.0)];
    }
    let raw = max / 5.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let count = (max / step).ceil() as usize;
    (0..=count)
        .map(|i| Tick::at(round_to_step(i as f64 * step, step)))
        .collect()
}

fn round_to_step(value: f64, step: f64) -> f64 {
    let decimals = (-step.log10().floor()).max(0.0) as i32 + 1;
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.3}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

const SANS_SERIF_CANDIDATES: [&str; 3] = ["DejaVu Sans", "Liberation Sans", "Noto Sans"];

/// 系統沒有 Arial 時挑選替代的 sans-serif 字型，常見 sans 字型優先於第一個字型
fn sans_serif_fallback<'a>(families: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let families: Vec<&str> = families.into_iter().collect();
    if families.contains(&"Arial") {
        return None;
    }
    SANS_SERIF_CANDIDATES
        .iter()
        .find(|candidate| families.contains(*candidate))
        .or_else(|| families.first())
        .map(|name| name.to_string())
}

fn font_database() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            let families = db
                .faces()
                .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str()));
            if let Some(name) = sans_serif_fallback(families) {
                db.set_sans_serif_family(name);
            }
            tracing::debug!("loaded {} font faces", db.len());
            Arc::new(db)
        })
        .clone()
}

/// Rasterise an SVG document to PNG bytes at the given pixel size.
pub fn rasterize_svg(svg: &str, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb = font_database();
    let tree = usvg::Tree::from_str(svg, &options)?;

    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or_else(|| GalleryError::RenderError {
            message: format!("invalid chart size {}x{}", width, height),
        })?;
    let size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    let image = RgbaImage::from_raw(width, height, pixmap.take()).ok_or_else(|| {
        GalleryError::RenderError {
            message: "pixmap buffer does not match chart size".to_string(),
        }
    })?;

    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
