// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Font handles
//!
//! A [`Font`] is a cheaply-cloneable, reference-counted handle over a decoded
//! font face. The layout pipeline only talks to fonts through the
//! [`Typeface`] capability set, so backends are swappable: the built-in one
//! ([`Font::decode`]) parses the face with `ttf-parser` and shapes with
//! `rustybuzz`, and tests plug in a deterministic face of their own.
//!
//! Metrics and outlines are normalized to **one em**: multiply by the point
//! size to get layout units. Ascent is negative (layout space is y-down).
//!
//! ### Fallback
//!
//! When a run's font cannot map some codepoints the shaper consults a
//! process-wide fallback hook (see [`set_fallback_font`]). The hook receives
//! the first missing codepoint and the parent font and may return a
//! substitute font; returning `None` keeps the zero-glyph "tofu" result.

use crate::{Path, TextDirection, Vec2};
use std::fmt;
use std::sync::{Arc, RwLock};

mod outline;
pub use outline::DecodeError;

#[cfg(test)]
pub(crate) mod mock;

pub use ttf_parser::Tag;

/// A type-safe wrapper for a font-local glyph ID
///
/// Glyph zero is reserved by font conventions for the missing-glyph shape
/// and is what font fallback keys on.
#[repr(transparent)]
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Default, Debug)]
pub struct GlyphId(pub u16);

impl From<GlyphId> for ttf_parser::GlyphId {
    fn from(id: GlyphId) -> Self {
        ttf_parser::GlyphId(id.0)
    }
}

/// Font-wide vertical metrics, normalized to one em
///
/// `ascent` is negative: it is the y-offset of the em top from the baseline
/// in y-down layout space. `descent` is positive.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineMetrics {
    pub ascent: f32,
    pub descent: f32,
}

/// One variable-font axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Axis {
    pub tag: Tag,
    pub min: f32,
    /// Default coordinate when no [`Coord`] is set
    pub def: f32,
    pub max: f32,
}

/// A variable-font axis setting
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coord {
    pub axis: Tag,
    pub value: f32,
}

/// An OpenType feature override
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureSetting {
    pub tag: Tag,
    pub value: u32,
}

/// Parameters for shaping one homogeneous sub-run
///
/// The pipeline guarantees `text` is covered by a single font, size,
/// direction and script.
#[derive(Clone, Copy, Debug)]
pub struct ShapeRequest<'a> {
    pub text: &'a [char],
    /// Font size in layout units per em
    pub size: f32,
    /// ISO 15924 script tag
    pub script: Tag,
    pub direction: TextDirection,
}

/// One glyph produced by a backend's shaper
///
/// `cluster` is the index (within the request's `text`) of the first
/// codepoint the glyph covers. `advance` and `offset` are in layout units
/// (the font size is already applied); letter-spacing is *not* included,
/// the pipeline adds it. Backends return glyphs in logical order for both
/// directions, with clusters ascending.
#[derive(Clone, Copy, Debug)]
pub struct ShapedGlyph {
    pub id: GlyphId,
    pub cluster: u32,
    pub advance: f32,
    pub offset: Vec2,
}

/// The capability set a font backend provides
///
/// All methods are logically const: a `Typeface` may be shared between many
/// runs and sessions (see [`Font`]). `with_options` returns a *new* handle
/// merging the given settings over the current ones, typically a cheap
/// sub-font sharing the underlying face data.
pub trait Typeface: Send + Sync {
    /// Vertical metrics normalized to one em
    fn line_metrics(&self) -> LineMetrics;

    /// Number of variable axes
    fn axis_count(&self) -> u16 {
        0
    }

    /// Axis inventory by index
    fn axis(&self, _index: u16) -> Option<Axis> {
        None
    }

    /// Current coordinate for `tag`, or the axis default if unset
    fn axis_value(&self, _tag: Tag) -> f32 {
        0.0
    }

    /// Tags of the OpenType features the face supports
    fn features(&self) -> Vec<Tag> {
        Vec::new()
    }

    /// User override for a feature; `None` means "let the shaper choose"
    fn feature_value(&self, _tag: Tag) -> Option<u32> {
        None
    }

    /// A new handle with the given axis coords and feature overrides merged
    /// over this handle's current settings
    fn with_options(&self, coords: &[Coord], features: &[FeatureSetting]) -> Font;

    /// True iff at least the first codepoint maps to a non-zero glyph
    fn has_glyph(&self, text: &[char]) -> bool;

    /// Glyph outline at one em, y-down, origin on the baseline
    ///
    /// Invalid glyph ids produce an empty path.
    fn glyph_path(&self, glyph: GlyphId) -> Path;

    /// Shape one homogeneous sub-run (see [`ShapedGlyph`] for the contract)
    fn shape_run(&self, request: &ShapeRequest) -> Vec<ShapedGlyph>;
}

/// Shareable handle to a font face
///
/// Clones share the underlying [`Typeface`]; equality is handle identity,
/// which is what run-merging and the editor's change detection key on.
#[derive(Clone)]
pub struct Font(Arc<dyn Typeface>);

impl Font {
    /// Wrap a backend in a handle
    pub fn new<T: Typeface + 'static>(face: T) -> Self {
        Font(Arc::new(face))
    }

    /// Decode a font file image with the built-in backend
    ///
    /// Returns [`DecodeError`] if the face cannot be parsed. Collection
    /// files use face index 0.
    pub fn decode(data: impl Into<Arc<[u8]>>) -> Result<Self, DecodeError> {
        outline::OutlineFace::decode(data.into(), 0)
    }

    /// Vertical metrics normalized to one em
    #[inline]
    pub fn line_metrics(&self) -> LineMetrics {
        self.0.line_metrics()
    }

    /// Ascent in layout units at `size` (negative)
    #[inline]
    pub fn ascent(&self, size: f32) -> f32 {
        self.0.line_metrics().ascent * size
    }

    /// Descent in layout units at `size` (positive)
    #[inline]
    pub fn descent(&self, size: f32) -> f32 {
        self.0.line_metrics().descent * size
    }

    #[inline]
    pub fn axis_count(&self) -> u16 {
        self.0.axis_count()
    }

    #[inline]
    pub fn axis(&self, index: u16) -> Option<Axis> {
        self.0.axis(index)
    }

    #[inline]
    pub fn axis_value(&self, tag: Tag) -> f32 {
        self.0.axis_value(tag)
    }

    #[inline]
    pub fn features(&self) -> Vec<Tag> {
        self.0.features()
    }

    #[inline]
    pub fn feature_value(&self, tag: Tag) -> Option<u32> {
        self.0.feature_value(tag)
    }

    /// A new handle with merged axis coords and feature overrides
    #[inline]
    pub fn with_options(&self, coords: &[Coord], features: &[FeatureSetting]) -> Font {
        self.0.with_options(coords, features)
    }

    /// A new handle with merged axis coords
    #[inline]
    pub fn with_coords(&self, coords: &[Coord]) -> Font {
        self.0.with_options(coords, &[])
    }

    #[inline]
    pub fn has_glyph(&self, text: &[char]) -> bool {
        self.0.has_glyph(text)
    }

    /// Glyph outline at one em, y-down, origin on the baseline
    #[inline]
    pub fn glyph_path(&self, glyph: GlyphId) -> Path {
        self.0.glyph_path(glyph)
    }

    /// Shape styled text into paragraphs of glyph runs
    ///
    /// Convenience front-end to [`crate::shape_text`]; the fonts actually
    /// used come from `runs`.
    pub fn shape_text(
        &self,
        text: &[char],
        runs: &[crate::StyledRun],
    ) -> Vec<crate::Paragraph> {
        crate::shape_text(text, runs, None)
    }

    #[inline]
    pub(crate) fn shape_run(&self, request: &ShapeRequest) -> Vec<ShapedGlyph> {
        self.0.shape_run(request)
    }
}

impl PartialEq for Font {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Font({:p})", Arc::as_ptr(&self.0))
    }
}

/// The font fallback hook
///
/// Receives the first codepoint the current font could not map, the fallback
/// attempt index (currently always 0) and the font that failed. Returns a
/// substitute font, or `None` for no substitution.
pub type FallbackFn = fn(missing: char, fallback_index: u32, parent: &Font) -> Option<Font>;

static FALLBACK_FONT: RwLock<Option<FallbackFn>> = RwLock::new(None);

/// Set or clear the process-wide fallback hook
///
/// Expected to be called once at startup; assignment is not otherwise
/// synchronized with in-flight shaping.
pub fn set_fallback_font(hook: Option<FallbackFn>) {
    *FALLBACK_FONT.write().unwrap() = hook;
}

pub(crate) fn fallback_enabled() -> bool {
    FALLBACK_FONT.read().unwrap().is_some()
}

pub(crate) fn fallback_font(missing: char, fallback_index: u32, parent: &Font) -> Option<Font> {
    let hook = *FALLBACK_FONT.read().unwrap();
    let substitute = hook.and_then(|hook| hook(missing, fallback_index, parent));
    if substitute.is_some() {
        log::debug!("fallback font selected for U+{:04X}", missing as u32);
    }
    substitute
}
