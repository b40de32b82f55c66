// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Deterministic typeface for tests
//!
//! Shapes one glyph per codepoint at a fixed advance, so expected layouts
//! can be computed by hand. Options cover the interesting shaper paths:
//! an "fi" ligature (cluster of two codepoints) and a configurable set of
//! unmapped codepoints (zero glyph id, zero advance) to drive fallback.

use super::{
    Axis, Coord, FeatureSetting, Font, GlyphId, LineMetrics, ShapeRequest, ShapedGlyph, Tag,
    Typeface,
};
use crate::conv::to_u32;
use crate::{Path, PathSink, Vec2};

pub(crate) const LIGATURE_GLYPH: GlyphId = GlyphId(0xF001);

/// Advance of every visible glyph, in em
pub(crate) const ADVANCE: f32 = 0.5;

#[derive(Clone, Debug, Default)]
pub(crate) struct MockFace {
    pub ligatures: bool,
    pub missing: Vec<char>,
    pub coords: Vec<Coord>,
    pub feature_values: Vec<FeatureSetting>,
}

impl MockFace {
    pub fn font() -> Font {
        Font::new(MockFace::default())
    }

    pub fn font_with(configure: impl FnOnce(&mut MockFace)) -> Font {
        let mut face = MockFace::default();
        configure(&mut face);
        Font::new(face)
    }
}

fn glyph_id_of(c: char) -> GlyphId {
    GlyphId((c as u32 % 0xF000 + 1) as u16)
}

fn zero_width(c: char) -> bool {
    matches!(c, '\n' | '\u{2028}' | '\u{200B}')
}

impl Typeface for MockFace {
    fn line_metrics(&self) -> LineMetrics {
        LineMetrics {
            ascent: -0.9,
            descent: 0.25,
        }
    }

    fn axis_count(&self) -> u16 {
        1
    }

    fn axis(&self, index: u16) -> Option<Axis> {
        (index == 0).then_some(Axis {
            tag: Tag::from_bytes(b"wght"),
            min: 100.0,
            def: 400.0,
            max: 900.0,
        })
    }

    fn axis_value(&self, tag: Tag) -> f32 {
        if let Some(coord) = self.coords.iter().find(|coord| coord.axis == tag) {
            return coord.value;
        }
        self.axis(0)
            .filter(|axis| axis.tag == tag)
            .map(|axis| axis.def)
            .unwrap_or(0.0)
    }

    fn features(&self) -> Vec<Tag> {
        vec![Tag::from_bytes(b"liga"), Tag::from_bytes(b"kern")]
    }

    fn feature_value(&self, tag: Tag) -> Option<u32> {
        self.feature_values
            .iter()
            .find(|setting| setting.tag == tag)
            .map(|setting| setting.value)
    }

    fn with_options(&self, coords: &[Coord], features: &[FeatureSetting]) -> Font {
        let mut face = self.clone();
        for coord in coords {
            match face.coords.iter_mut().find(|c| c.axis == coord.axis) {
                Some(existing) => existing.value = coord.value,
                None => face.coords.push(*coord),
            }
        }
        for setting in features {
            match face.feature_values.iter_mut().find(|f| f.tag == setting.tag) {
                Some(existing) => existing.value = setting.value,
                None => face.feature_values.push(*setting),
            }
        }
        Font::new(face)
    }

    fn has_glyph(&self, text: &[char]) -> bool {
        text.first().map(|c| !self.missing.contains(c)).unwrap_or(false)
    }

    fn glyph_path(&self, glyph: GlyphId) -> Path {
        let mut path = Path::new();
        if glyph.0 == 0 {
            return path;
        }
        path.move_to(Vec2(0.0, -0.7));
        path.line_to(Vec2(0.45, -0.7));
        path.line_to(Vec2(0.45, 0.0));
        path.line_to(Vec2(0.0, 0.0));
        path.close();
        path
    }

    fn shape_run(&self, request: &ShapeRequest) -> Vec<ShapedGlyph> {
        let mut glyphs = Vec::with_capacity(request.text.len());
        let mut i = 0;
        while i < request.text.len() {
            let c = request.text[i];
            if self.missing.contains(&c) {
                glyphs.push(ShapedGlyph {
                    id: GlyphId(0),
                    cluster: to_u32(i),
                    advance: 0.0,
                    offset: Vec2::ZERO,
                });
                i += 1;
                continue;
            }
            if self.ligatures
                && c == 'f'
                && request.text.get(i + 1) == Some(&'i')
                && !self.missing.contains(&'i')
            {
                glyphs.push(ShapedGlyph {
                    id: LIGATURE_GLYPH,
                    cluster: to_u32(i),
                    advance: ADVANCE * request.size,
                    offset: Vec2::ZERO,
                });
                i += 2;
                continue;
            }
            let advance = if zero_width(c) {
                0.0
            } else {
                ADVANCE * request.size
            };
            glyphs.push(ShapedGlyph {
                id: glyph_id_of(c),
                cluster: to_u32(i),
                advance,
                offset: Vec2::ZERO,
            });
            i += 1;
        }
        glyphs
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sub_font_merges_options() {
        let font = MockFace::font();
        let wght = Tag::from_bytes(b"wght");
        let liga = Tag::from_bytes(b"liga");
        assert_eq!(font.axis_value(wght), 400.0);
        assert_eq!(font.feature_value(liga), None);

        let bold = font.with_coords(&[Coord {
            axis: wght,
            value: 700.0,
        }]);
        assert_eq!(bold.axis_value(wght), 700.0);

        let options = bold.with_options(
            &[],
            &[FeatureSetting {
                tag: liga,
                value: 0,
            }],
        );
        // Previous coords survive the second derivation.
        assert_eq!(options.axis_value(wght), 700.0);
        assert_eq!(options.feature_value(liga), Some(0));
        assert_ne!(options, bold);
        assert_eq!(options.axis_count(), 1);
    }

    #[test]
    fn metrics_scale_by_size() {
        let font = MockFace::font();
        assert!((font.ascent(72.0) + 64.8).abs() < 1e-3);
        assert!((font.descent(72.0) - 18.0).abs() < 1e-3);
    }
}
