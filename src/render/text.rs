use std::sync::Arc;

use crate::foundation::error::{SlidesageError, SlidesageResult};
use crate::render::layout::TextMeasure;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl TextBrushRgba8 {
    /// Brush from straight RGBA components.
    pub fn from_array([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Parley layout state bound to a single caption font.
///
/// The font is registered once at construction; every layout uses its primary family.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font_bytes: Arc<Vec<u8>>,
}

impl std::fmt::Debug for TextLayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLayoutEngine")
            .field("family_name", &self.family_name)
            .field("font_bytes_len", &self.font_bytes.len())
            .finish_non_exhaustive()
    }
}

impl TextLayoutEngine {
    /// Register `font_bytes` (TTF/OTF) and resolve its family name.
    pub fn new(font_bytes: Vec<u8>) -> SlidesageResult<Self> {
        let font_bytes = Arc::new(font_bytes);
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            SlidesageError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SlidesageError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font_bytes,
        })
    }

    /// Family name resolved from the font bytes.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Raw font bytes, shared with the rasterizer.
    pub fn font_bytes(&self) -> &Arc<Vec<u8>> {
        &self.font_bytes
    }

    /// Shape a single unwrapped line.
    pub fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> SlidesageResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SlidesageError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

impl TextMeasure for TextLayoutEngine {
    fn measure(&mut self, text: &str, size_px: f32) -> f64 {
        match self.layout_line(text, size_px, TextBrushRgba8::default()) {
            Ok(layout) => f64::from(layout.width()),
            Err(_) => 0.0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
