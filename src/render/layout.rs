//! Frame geometry: cover fitting, caption wrapping and animation, chrome placement.
//!
//! Everything here is pure so it can be tested without a raster backend.

use crate::foundation::core::{Canvas, Rect};
use crate::foundation::math::clamp01;

/// Fraction of the canvas width available to caption lines.
pub const CAPTION_WIDTH_FRACTION: f64 = 0.8;
/// Caption line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.4;
/// Distance a caption line slides up while fading in.
pub const CAPTION_SLIDE_PX: f64 = 20.0;

/// Destination rect that scales `media` to cover `canvas` while keeping its aspect ratio.
///
/// The overflow is centered and cropped by the canvas bounds. Returns `None` for
/// degenerate media sizes.
pub fn cover_rect(canvas: Canvas, media_w: u32, media_h: u32) -> Option<Rect> {
    if media_w == 0 || media_h == 0 {
        return None;
    }
    let (mw, mh) = (f64::from(media_w), f64::from(media_h));
    let scale = (canvas.w() / mw).max(canvas.h() / mh);
    let (w, h) = (mw * scale, mh * scale);
    let x0 = (canvas.w() - w) / 2.0;
    let y0 = (canvas.h() - h) / 2.0;
    Some(Rect::new(x0, y0, x0 + w, y0 + h))
}

/// Measures the advance width of a single line of text.
pub trait TextMeasure {
    /// Width in pixels of `text` set at `size_px`.
    fn measure(&mut self, text: &str, size_px: f32) -> f64;
}

/// Fixed per-character advance, used when no font is available.
#[derive(Clone, Copy, Debug)]
pub struct ApproxMeasure {
    /// Advance of one character as a fraction of the font size.
    pub em_advance: f64,
}

impl Default for ApproxMeasure {
    fn default() -> Self {
        Self { em_advance: 0.55 }
    }
}

impl TextMeasure for ApproxMeasure {
    fn measure(&mut self, text: &str, size_px: f32) -> f64 {
        text.chars().count() as f64 * f64::from(size_px) * self.em_advance
    }
}

/// Greedy word wrap: a word moves to the next line once the current line would
/// exceed `max_width`. A single word wider than `max_width` gets its own line.
pub fn wrap_words(
    text: &str,
    max_width: f64,
    size_px: f32,
    measure: &mut dyn TextMeasure,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure.measure(&candidate, size_px) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Animation state of one caption line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineAnim {
    /// Line opacity before the scene fade is applied.
    pub opacity: f64,
    /// Downward offset in pixels; reaches 0 when fully visible.
    pub y_offset: f64,
}

/// Caption line `line` at scene progress `progress`.
///
/// Text starts appearing at 20% of the scene and each later line lags by a tenth
/// of the text window.
pub fn caption_line_anim(progress: f64, line: usize) -> LineAnim {
    let tp = ((clamp01(progress) - 0.2) / 0.6).max(0.0);
    let opacity = clamp01((tp - 0.1 * line as f64) * 3.0);
    LineAnim {
        opacity,
        y_offset: (1.0 - opacity) * CAPTION_SLIDE_PX,
    }
}

/// Filled fraction of the progress bar.
pub fn progress_fraction(scene_index: usize, progress: f64, scene_count: usize) -> f64 {
    if scene_count == 0 {
        return 0.0;
    }
    clamp01((scene_index as f64 + clamp01(progress)) / scene_count as f64)
}

/// Pixel placement of the caption box, labels, and progress chrome for one canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChromeLayout {
    /// Title baseline center.
    pub title_y: f64,
    /// Title font size.
    pub title_size: f32,
    /// Caption font size.
    pub caption_size: f32,
    /// Distance between caption baselines.
    pub line_height: f64,
    /// Vertical center of the caption block.
    pub caption_center_y: f64,
    /// Maximum caption line width.
    pub caption_max_width: f64,
    /// Caption box padding.
    pub caption_padding: f64,
    /// Caption box corner radius.
    pub caption_radius: f64,
    /// Speaker label font size.
    pub label_size: f32,
    /// Progress bar track.
    pub progress_track: Rect,
    /// Scene counter center line.
    pub counter_y: f64,
    /// Scene counter font size.
    pub counter_size: f32,
}

impl ChromeLayout {
    /// Layout for `canvas` with captions spanning `caption_width_fraction` of the width.
    pub fn for_canvas(canvas: Canvas, caption_width_fraction: f64) -> Self {
        let (w, h) = (canvas.w(), canvas.h());
        let caption_size = (w * 0.035).floor().max(1.0);
        let track_x = w * 0.1;
        let track_y = h * 0.95;
        Self {
            title_y: h * 0.05,
            title_size: (w * 0.04).floor().max(1.0) as f32,
            caption_size: caption_size as f32,
            line_height: caption_size * LINE_HEIGHT_FACTOR,
            caption_center_y: h * 0.8,
            caption_max_width: w * clamp01(caption_width_fraction),
            caption_padding: 20.0,
            caption_radius: 8.0,
            label_size: (caption_size * 0.8).floor().max(1.0) as f32,
            progress_track: Rect::new(track_x, track_y, track_x + w * 0.8, track_y + 4.0),
            counter_y: h * 0.93,
            counter_size: (w * 0.025).floor().max(1.0) as f32,
        }
    }

    /// Rounded box behind `line_count` caption lines, centered on the canvas.
    pub fn caption_box(&self, canvas: Canvas, line_count: usize) -> Rect {
        let text_h = line_count as f64 * self.line_height;
        let x0 = (canvas.w() - self.caption_max_width) / 2.0 - self.caption_padding;
        let y0 = self.caption_center_y - text_h / 2.0 - self.caption_padding;
        Rect::new(
            x0,
            y0,
            x0 + self.caption_max_width + 2.0 * self.caption_padding,
            y0 + text_h + 2.0 * self.caption_padding,
        )
    }

    /// Vertical center of caption line `index` out of `line_count`.
    pub fn caption_line_center_y(&self, line_count: usize, index: usize) -> f64 {
        let text_h = line_count as f64 * self.line_height;
        self.caption_center_y - text_h / 2.0 + (index as f64 + 0.5) * self.line_height
    }
}

/// Counter text, e.g. `Scene 2/4 • 5s`.
pub fn counter_label(scene_index: usize, scene_count: usize, elapsed_secs: f64) -> String {
    format!(
        "Scene {}/{} • {}s",
        scene_index + 1,
        scene_count,
        elapsed_secs.max(0.0).floor() as u64
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/layout.rs"]
mod tests;
