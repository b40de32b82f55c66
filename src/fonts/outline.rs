// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Built-in font backend: `ttf-parser` faces shaped with `rustybuzz`

use super::{
    Axis, Coord, FeatureSetting, Font, GlyphId, LineMetrics, ShapeRequest, ShapedGlyph, Tag,
    Typeface,
};
use crate::conv::{to_u32, to_usize};
use crate::{Path, PathSink, TextDirection, Vec2};
use std::sync::Arc;
use thiserror::Error;

/// Font file image could not be decoded
#[derive(Error, Debug)]
#[error("unsupported or malformed font data")]
pub struct DecodeError(#[from] ttf_parser::FaceParsingError);

// Safety: the borrowed data outlives the reference by construction (it is
// owned by the same struct, behind `Arc`, and never mutated or dropped while
// the struct lives).
unsafe fn extend_lifetime<'b, T: ?Sized>(r: &'b T) -> &'static T {
    std::mem::transmute::<&'b T, &'static T>(r)
}

/// A decoded face plus its shaping state
///
/// Holds the raw file image and views over it. Sub-fonts produced by
/// `with_options` share the `Arc`ed image and re-parse with their own
/// variation coordinates applied.
pub(crate) struct OutlineFace {
    // Field order matters for drop: views before data.
    face: ttf_parser::Face<'static>,
    shaper: rustybuzz::Face<'static>,
    data: Arc<[u8]>,
    index: u32,
    metrics: LineMetrics,
    units_per_em: f32,
    coords: Vec<Coord>,
    feature_values: Vec<FeatureSetting>,
    shape_features: Vec<rustybuzz::Feature>,
}

impl OutlineFace {
    pub(crate) fn decode(data: Arc<[u8]>, index: u32) -> Result<Font, DecodeError> {
        Self::build(data, index, Vec::new(), Vec::new()).map(Font::new)
    }

    fn build(
        data: Arc<[u8]>,
        index: u32,
        coords: Vec<Coord>,
        feature_values: Vec<FeatureSetting>,
    ) -> Result<Self, DecodeError> {
        let slice: &'static [u8] = unsafe { extend_lifetime(&data[..]) };
        let mut face = ttf_parser::Face::parse(slice, index).map_err(|err| {
            log::warn!("font decode failed: {err}");
            err
        })?;
        for coord in &coords {
            // Unsupported axes are ignored.
            let _ = face.set_variation(coord.axis, coord.value);
        }
        let shaper = rustybuzz::Face::from_face(face.clone());

        let units_per_em = f32::from(face.units_per_em());
        let metrics = LineMetrics {
            ascent: -f32::from(face.ascender()) / units_per_em,
            descent: -f32::from(face.descender()) / units_per_em,
        };

        let shape_features = feature_values
            .iter()
            .map(|setting| rustybuzz::Feature::new(setting.tag, setting.value, ..))
            .collect();

        Ok(OutlineFace {
            face,
            shaper,
            data,
            index,
            metrics,
            units_per_em,
            coords,
            feature_values,
            shape_features,
        })
    }
}

/// Emits outlines y-down at a one-em scale.
///
/// This adapter is the single place where font-space (y-up, font units)
/// flips into layout space.
struct OutlineAdapter<'a> {
    path: &'a mut Path,
    inv_scale: f32,
}

impl ttf_parser::OutlineBuilder for OutlineAdapter<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.path
            .move_to(Vec2(x * self.inv_scale, -y * self.inv_scale));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path
            .line_to(Vec2(x * self.inv_scale, -y * self.inv_scale));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.path.quad_to(
            Vec2(x1 * self.inv_scale, -y1 * self.inv_scale),
            Vec2(x * self.inv_scale, -y * self.inv_scale),
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.path.cubic_to(
            Vec2(x1 * self.inv_scale, -y1 * self.inv_scale),
            Vec2(x2 * self.inv_scale, -y2 * self.inv_scale),
            Vec2(x * self.inv_scale, -y * self.inv_scale),
        );
    }

    fn close(&mut self) {
        self.path.close();
    }
}

fn collect_layout_features(
    table: &ttf_parser::opentype_layout::LayoutTable,
    tags: &mut Vec<Tag>,
) {
    for index in 0..table.features.len() {
        if let Some(feature) = table.features.get(index) {
            if !tags.contains(&feature.tag) {
                tags.push(feature.tag);
            }
        }
    }
}

impl Typeface for OutlineFace {
    fn line_metrics(&self) -> LineMetrics {
        self.metrics
    }

    fn axis_count(&self) -> u16 {
        self.face
            .tables()
            .fvar
            .map(|fvar| fvar.axes.len())
            .unwrap_or(0)
    }

    fn axis(&self, index: u16) -> Option<Axis> {
        let fvar = self.face.tables().fvar?;
        fvar.axes.get(index).map(|axis| Axis {
            tag: axis.tag,
            min: axis.min_value,
            def: axis.def_value,
            max: axis.max_value,
        })
    }

    fn axis_value(&self, tag: Tag) -> f32 {
        if let Some(coord) = self.coords.iter().find(|coord| coord.axis == tag) {
            return coord.value;
        }
        self.face
            .tables()
            .fvar
            .and_then(|fvar| fvar.axes.into_iter().find(|axis| axis.tag == tag))
            .map(|axis| axis.def_value)
            .unwrap_or(0.0)
    }

    fn features(&self) -> Vec<Tag> {
        let mut tags = Vec::new();
        let tables = self.face.tables();
        if let Some(gsub) = tables.gsub.as_ref() {
            collect_layout_features(gsub, &mut tags);
        }
        if let Some(gpos) = tables.gpos.as_ref() {
            collect_layout_features(gpos, &mut tags);
        }
        tags
    }

    fn feature_value(&self, tag: Tag) -> Option<u32> {
        self.feature_values
            .iter()
            .find(|setting| setting.tag == tag)
            .map(|setting| setting.value)
    }

    fn with_options(&self, coords: &[Coord], features: &[FeatureSetting]) -> Font {
        let mut merged_coords = self.coords.clone();
        for coord in coords {
            match merged_coords.iter_mut().find(|c| c.axis == coord.axis) {
                Some(existing) => existing.value = coord.value,
                None => merged_coords.push(*coord),
            }
        }
        let mut merged_features = self.feature_values.clone();
        for setting in features {
            match merged_features.iter_mut().find(|f| f.tag == setting.tag) {
                Some(existing) => existing.value = setting.value,
                None => merged_features.push(*setting),
            }
        }
        // Parsing is deterministic and already succeeded once for this image.
        let face = Self::build(self.data.clone(), self.index, merged_coords, merged_features)
            .expect("face data parsed before");
        Font::new(face)
    }

    fn has_glyph(&self, text: &[char]) -> bool {
        text.first()
            .map(|&c| self.face.glyph_index(c).is_some())
            .unwrap_or(false)
    }

    fn glyph_path(&self, glyph: GlyphId) -> Path {
        let mut path = Path::new();
        let mut adapter = OutlineAdapter {
            path: &mut path,
            inv_scale: 1.0 / self.units_per_em,
        };
        let _ = self.face.outline_glyph(glyph.into(), &mut adapter);
        path
    }

    fn shape_run(&self, request: &ShapeRequest) -> Vec<ShapedGlyph> {
        // rustybuzz clusters are byte offsets into the UTF-8 buffer; map
        // them back to codepoint indices in the request slice.
        let mut utf8 = String::with_capacity(request.text.len());
        let mut cluster_of_byte = Vec::with_capacity(request.text.len());
        for (i, &c) in request.text.iter().enumerate() {
            let start = utf8.len();
            utf8.push(c);
            for _ in start..utf8.len() {
                cluster_of_byte.push(to_u32(i));
            }
        }

        let mut buffer = rustybuzz::UnicodeBuffer::new();
        buffer.push_str(&utf8);
        buffer.set_direction(match request.direction {
            TextDirection::Ltr => rustybuzz::Direction::LeftToRight,
            TextDirection::Rtl => rustybuzz::Direction::RightToLeft,
        });
        if let Some(script) = rustybuzz::Script::from_iso15924_tag(request.script) {
            buffer.set_script(script);
        }

        let output = rustybuzz::shape(&self.shaper, &self.shape_features, buffer);
        let infos = output.glyph_infos();
        let positions = output.glyph_positions();
        let count = infos.len();
        let scale = request.size / self.units_per_em;

        // For RTL the shaper returns visual (left-to-right) order; store
        // logical order for both directions.
        let mut glyphs = Vec::with_capacity(count);
        for i in 0..count {
            let j = match request.direction {
                TextDirection::Ltr => i,
                TextDirection::Rtl => count - 1 - i,
            };
            let info = &infos[j];
            let pos = &positions[j];
            debug_assert!(info.glyph_id <= u16::MAX as u32, "failed to map glyph id");
            glyphs.push(ShapedGlyph {
                id: GlyphId(info.glyph_id as u16),
                cluster: cluster_of_byte
                    .get(to_usize(info.cluster))
                    .copied()
                    .unwrap_or(0),
                advance: pos.x_advance as f32 * scale,
                offset: Vec2(pos.x_offset as f32 * scale, -(pos.y_offset as f32) * scale),
            });
        }
        glyphs
    }
}
