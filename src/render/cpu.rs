use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use anyhow::Context as _;
use vello_cpu::kurbo::Shape as _;

use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{SlidesageError, SlidesageResult};
use crate::foundation::math::scale_u8;
use crate::media::decode::PreparedImage;
use crate::render::frame::FrameRGBA;
use crate::render::layout::{
    ApproxMeasure, ChromeLayout, TextMeasure, caption_line_anim, counter_label, cover_rect,
    progress_fraction, wrap_words,
};
use crate::render::text::{TextBrushRgba8, TextLayoutEngine};
use crate::render::{FrameRenderer, FrameView, RenderSettings};

const WHITE: [u8; 4] = [255, 255, 255, 255];
const SCRIM: [u8; 4] = [0, 0, 0, 102];
const CAPTION_BOX: [u8; 4] = [0, 0, 0, 217];
const PROGRESS_TRACK: [u8; 4] = [255, 255, 255, 77];
const PROGRESS_FILL: [u8; 4] = [59, 130, 246, 255];
const LABEL_GAP_PX: f64 = 15.0;
/// Default byte budget of the image paint cache: eight 1080p frames.
const DEFAULT_IMAGE_CACHE_BYTES: usize = 8 * 1920 * 1080 * 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Align {
    Start,
    Center,
}

/// Software renderer built on `vello_cpu`.
///
/// Scene layers (media, scrim, caption, speaker label) are multiplied by the scene
/// fade opacity; the title, progress bar and counter are drawn at full opacity.
pub struct CpuRenderer {
    canvas: Canvas,
    settings: RenderSettings,
    text: Option<TextLayoutEngine>,
    font: Option<vello_cpu::peniko::FontData>,
    image_cache: HashMap<usize, (Arc<Vec<u8>>, vello_cpu::Image)>,
    lru: VecDeque<usize>,
    cached_bytes: usize,
    cache_budget_bytes: usize,
    warned_missing_font: bool,
}

impl std::fmt::Debug for CpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRenderer")
            .field("canvas", &self.canvas)
            .field("has_font", &self.font.is_some())
            .field("cached_images", &self.image_cache.len())
            .field("cached_bytes", &self.cached_bytes)
            .finish_non_exhaustive()
    }
}

impl CpuRenderer {
    /// Create a renderer, loading `settings.font_path` when present.
    pub fn new(canvas: Canvas, settings: RenderSettings) -> SlidesageResult<Self> {
        let cache_budget_bytes = std::env::var("SLIDESAGE_IMAGE_CACHE_MB")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .map_or(DEFAULT_IMAGE_CACHE_BYTES, |mb| mb.saturating_mul(1024 * 1024));
        let mut out = Self {
            canvas,
            settings,
            text: None,
            font: None,
            image_cache: HashMap::new(),
            lru: VecDeque::new(),
            cached_bytes: 0,
            cache_budget_bytes,
            warned_missing_font: false,
        };
        if let Some(path) = out.settings.font_path.clone() {
            let bytes =
                std::fs::read(&path).with_context(|| format!("read font '{}'", path.display()))?;
            out = out.with_font_bytes(bytes)?;
        }
        Ok(out)
    }

    /// Use `bytes` (TTF/OTF) for all text.
    pub fn with_font_bytes(mut self, bytes: Vec<u8>) -> SlidesageResult<Self> {
        let engine = TextLayoutEngine::new(bytes)?;
        let blob = vello_cpu::peniko::Blob::from(engine.font_bytes().to_vec());
        self.font = Some(vello_cpu::peniko::FontData::new(blob, 0));
        self.text = Some(engine);
        Ok(self)
    }

    /// Cap the image paint cache at `bytes` of pixel data. Video frames each take an entry,
    /// so the cap bounds memory held on top of the decoded clip. The newest entry is always
    /// kept.
    pub fn with_image_cache_budget(mut self, bytes: usize) -> Self {
        self.cache_budget_bytes = bytes;
        self.evict_to_budget();
        self
    }

    /// Bytes of pixel data held by the image paint cache.
    pub fn cached_image_bytes(&self) -> usize {
        self.cached_bytes
    }

    /// Whether text can be drawn.
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Current settings.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    fn image_paint_for(&mut self, image: &PreparedImage) -> SlidesageResult<vello_cpu::Image> {
        let key = Arc::as_ptr(&image.rgba8_premul) as usize;
        if let Some((_, paint)) = self.image_cache.get(&key) {
            let paint = paint.clone();
            self.touch(key);
            return Ok(paint);
        }

        let pixmap = image_premul_bytes_to_pixmap(&image.rgba8_premul, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache
            .insert(key, (Arc::clone(&image.rgba8_premul), paint.clone()));
        self.cached_bytes += image.rgba8_premul.len();
        self.lru.push_back(key);
        self.evict_to_budget();
        Ok(paint)
    }

    fn evict_to_budget(&mut self) {
        while self.cached_bytes > self.cache_budget_bytes && self.lru.len() > 1 {
            let Some(old) = self.lru.pop_front() else {
                break;
            };
            if let Some((bytes, _)) = self.image_cache.remove(&old) {
                self.cached_bytes = self.cached_bytes.saturating_sub(bytes.len());
            }
        }
    }

    fn touch(&mut self, key: usize) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }

    fn draw_media(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        view: &FrameView<'_>,
    ) -> SlidesageResult<()> {
        let full = self.canvas.bounds();
        let Some(image) = view.scene.media.image_at(view.media_time) else {
            fill_rect(ctx, full, self.settings.placeholder_rgba);
            return Ok(());
        };
        let Some(dest) = cover_rect(self.canvas, image.width, image.height) else {
            fill_rect(ctx, full, self.settings.placeholder_rgba);
            return Ok(());
        };

        let paint = self.image_paint_for(image)?;
        let scale = dest.width() / f64::from(image.width);
        ctx.set_transform(
            vello_cpu::kurbo::Affine::translate((dest.x0, dest.y0))
                * vello_cpu::kurbo::Affine::scale(scale),
        );
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        fill_rect(ctx, full, SCRIM);
        Ok(())
    }

    fn draw_caption(&mut self, ctx: &mut vello_cpu::RenderContext, view: &FrameView<'_>) {
        let layout = ChromeLayout::for_canvas(self.canvas, self.settings.caption_width_fraction);
        let mut approx = ApproxMeasure::default();
        let lines = {
            let measure: &mut dyn TextMeasure = match self.text.as_mut() {
                Some(engine) => engine,
                None => &mut approx,
            };
            wrap_words(
                &view.scene.caption,
                layout.caption_max_width,
                layout.caption_size,
                measure,
            )
        };
        if lines.is_empty() {
            return;
        }

        let bx = layout.caption_box(self.canvas, lines.len());
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color(CAPTION_BOX));
        let rounded = vello_cpu::kurbo::RoundedRect::new(
            bx.x0,
            bx.y0,
            bx.x1,
            bx.y1,
            layout.caption_radius,
        );
        ctx.fill_path(&rounded.to_path(0.1));

        let cx = self.canvas.w() / 2.0;
        for (k, line) in lines.iter().enumerate() {
            let anim = caption_line_anim(view.progress, k);
            if anim.opacity <= 0.0 {
                continue;
            }
            let cy = layout.caption_line_center_y(lines.len(), k) + anim.y_offset;
            self.draw_text(
                ctx,
                line,
                layout.caption_size,
                WHITE,
                (cx, cy),
                Align::Center,
                anim.opacity,
            );
        }

        let label_size = f64::from(layout.label_size);
        self.draw_text(
            ctx,
            view.scene.speaker.label(),
            layout.label_size,
            view.scene.speaker.accent_rgba(),
            (bx.x0 + layout.caption_padding, bx.y0 - LABEL_GAP_PX - label_size / 2.0),
            Align::Start,
            1.0,
        );
    }

    fn draw_chrome(&mut self, ctx: &mut vello_cpu::RenderContext, view: &FrameView<'_>) {
        let layout = ChromeLayout::for_canvas(self.canvas, self.settings.caption_width_fraction);
        let cx = self.canvas.w() / 2.0;

        let title = self.settings.title.clone();
        let title = title.as_deref().unwrap_or(view.title);
        if !title.trim().is_empty() {
            self.draw_text(
                ctx,
                title,
                layout.title_size,
                WHITE,
                (cx, layout.title_y + f64::from(layout.title_size) / 2.0),
                Align::Center,
                1.0,
            );
        }

        let track = layout.progress_track;
        fill_rect(ctx, track, PROGRESS_TRACK);
        let fraction = progress_fraction(view.scene_index, view.progress, view.scene_count);
        if fraction > 0.0 {
            let fill = Rect::new(
                track.x0,
                track.y0,
                track.x0 + track.width() * fraction,
                track.y1,
            );
            fill_rect(ctx, fill, PROGRESS_FILL);
        }

        let counter = counter_label(view.scene_index, view.scene_count, view.elapsed_secs);
        self.draw_text(
            ctx,
            &counter,
            layout.counter_size,
            WHITE,
            (cx, layout.counter_y),
            Align::Center,
            1.0,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        size_px: f32,
        rgba: [u8; 4],
        (x, center_y): (f64, f64),
        align: Align,
        opacity: f64,
    ) {
        let (Some(engine), Some(font)) = (self.text.as_mut(), self.font.as_ref()) else {
            if !self.warned_missing_font {
                tracing::warn!("no font configured, text layers are skipped");
                self.warned_missing_font = true;
            }
            return;
        };
        let layout = match engine.layout_line(text, size_px, TextBrushRgba8::from_array(rgba)) {
            Ok(layout) => layout,
            Err(err) => {
                tracing::warn!(%err, "text layout failed");
                return;
            }
        };

        let w = f64::from(layout.width());
        let h = f64::from(layout.height());
        let x0 = match align {
            Align::Start => x,
            Align::Center => x - w / 2.0,
        };
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((x0, center_y - h / 2.0)));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r,
                    brush.g,
                    brush.b,
                    scale_u8(brush.a, opacity),
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
}

impl FrameRenderer for CpuRenderer {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    #[tracing::instrument(skip_all, fields(scene = view.scene_index))]
    fn render(&mut self, view: &FrameView<'_>) -> SlidesageResult<FrameRGBA> {
        let w: u16 = self
            .canvas
            .width
            .try_into()
            .map_err(|_| SlidesageError::validation("canvas width exceeds u16"))?;
        let h: u16 = self
            .canvas
            .height
            .try_into()
            .map_err(|_| SlidesageError::validation("canvas height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        fill_rect(&mut ctx, self.canvas.bounds(), self.settings.clear_rgba);

        let opacity = view.opacity.clamp(0.0, 1.0) as f32;
        if opacity > 0.0 {
            if opacity < 1.0 {
                ctx.push_opacity_layer(opacity);
            }
            self.draw_media(&mut ctx, view)?;
            if self.settings.show_captions {
                self.draw_caption(&mut ctx, view);
            }
            if opacity < 1.0 {
                ctx.pop_layer();
            }
        }
        self.draw_chrome(&mut ctx, view);

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn color([r, g, b, a]: [u8; 4]) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn fill_rect(ctx: &mut vello_cpu::RenderContext, rect: Rect, rgba: [u8; 4]) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color(rgba));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        rect.x0, rect.y0, rect.x1, rect.y1,
    ));
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> SlidesageResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SlidesageError::media("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SlidesageError::media("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(SlidesageError::media("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels: Vec<_> = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
