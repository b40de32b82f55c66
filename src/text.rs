// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Static styled text blocks
//!
//! [`Text`] accumulates styled spans, shapes them on demand and groups the
//! resulting glyph outlines by style id, so a renderer can paint each style
//! with its own brush. Unlike [`crate::Editor`] there is no cursor and no
//! mutation beyond append/clear; re-layout happens lazily on access.

use crate::conv::to_usize;
use crate::fonts::Font;
use crate::shape::{LayoutOptions, ShapedText, StyledRun};
use crate::{
    Path, Rect, TextAlign, TextOrigin, TextOverflow, TextSizing, TextWrap, Vec2,
};

/// A styled, non-editable text block producing per-style outline paths
#[derive(Default)]
pub struct Text {
    text: Vec<char>,
    runs: Vec<StyledRun>,
    shape: ShapedText,
    style_paths: Vec<Path>,
    clip_path: Option<Path>,
    dirty: bool,

    sizing: TextSizing,
    overflow: TextOverflow,
    origin: TextOrigin,
    align: TextAlign,
    wrap: TextWrap,
    max_width: f32,
    max_height: f32,
    paragraph_spacing: f32,
}

impl Text {
    pub fn new() -> Self {
        Text::default()
    }

    /// Append a span of text in the given style
    ///
    /// `style_id` groups the span's outlines into one path; it is otherwise
    /// opaque to the layout. Empty spans are ignored.
    pub fn append(
        &mut self,
        text: &str,
        font: &Font,
        size: f32,
        line_height: f32,
        letter_spacing: f32,
        style_id: u16,
    ) {
        let mut run = StyledRun::new(font.clone(), size);
        run.line_height = line_height;
        run.letter_spacing = letter_spacing;
        run.style_id = style_id;
        for c in text.chars() {
            self.text.push(c);
            run.codepoint_count += 1;
        }
        if run.codepoint_count == 0 {
            return;
        }
        self.runs.push(run);
        self.dirty = true;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.runs.clear();
        self.dirty = true;
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn sizing(&self) -> TextSizing {
        self.sizing
    }

    pub fn set_sizing(&mut self, value: TextSizing) {
        if self.sizing != value {
            self.sizing = value;
            self.dirty = true;
        }
    }

    pub fn overflow(&self) -> TextOverflow {
        self.overflow
    }

    pub fn set_overflow(&mut self, value: TextOverflow) {
        if self.overflow != value {
            self.overflow = value;
            self.dirty = true;
        }
    }

    pub fn origin(&self) -> TextOrigin {
        self.origin
    }

    pub fn set_origin(&mut self, value: TextOrigin) {
        if self.origin != value {
            self.origin = value;
            self.dirty = true;
        }
    }

    pub fn align(&self) -> TextAlign {
        self.align
    }

    pub fn set_align(&mut self, value: TextAlign) {
        if self.align != value {
            self.align = value;
            self.dirty = true;
        }
    }

    pub fn wrap(&self) -> TextWrap {
        self.wrap
    }

    pub fn set_wrap(&mut self, value: TextWrap) {
        if self.wrap != value {
            self.wrap = value;
            self.dirty = true;
        }
    }

    pub fn max_width(&self) -> f32 {
        self.max_width
    }

    pub fn set_max_width(&mut self, value: f32) {
        if self.max_width != value {
            self.max_width = value;
            self.dirty = true;
        }
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    pub fn set_max_height(&mut self, value: f32) {
        if self.max_height != value {
            self.max_height = value;
            self.dirty = true;
        }
    }

    pub fn paragraph_spacing(&self) -> f32 {
        self.paragraph_spacing
    }

    pub fn set_paragraph_spacing(&mut self, value: f32) {
        if self.paragraph_spacing != value {
            self.paragraph_spacing = value;
            self.dirty = true;
        }
    }

    /// Layout bounds, re-shaping first if anything changed
    pub fn bounds(&mut self) -> Rect {
        self.refresh();
        self.shape.bounds()
    }

    /// The underlying pipeline artifact, re-shaping first if needed
    pub fn shaped(&mut self) -> &ShapedText {
        self.refresh();
        &self.shape
    }

    /// Outline path for one style id, empty if the style drew nothing
    pub fn style_path(&mut self, style_id: u16) -> Option<&Path> {
        self.refresh();
        self.style_paths.get(to_usize(u32::from(style_id)))
    }

    /// Number of per-style path slots (max style id + 1)
    pub fn style_count(&mut self) -> usize {
        self.refresh();
        self.style_paths.len()
    }

    /// Bounds rectangle to clip with, present iff overflow is `Clipped`
    pub fn clip_path(&mut self) -> Option<&Path> {
        self.refresh();
        self.clip_path.as_ref()
    }

    fn refresh(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        self.update();
    }

    fn update(&mut self) {
        for path in &mut self.style_paths {
            path.clear();
        }
        self.clip_path = None;
        if self.text.is_empty() {
            self.shape = ShapedText::new();
            return;
        }

        let options = LayoutOptions {
            sizing: self.sizing,
            max_width: self.max_width,
            max_height: self.max_height,
            align: self.align,
            wrap: self.wrap,
            origin: self.origin,
            overflow: self.overflow,
            paragraph_spacing: self.paragraph_spacing,
        };
        self.shape.shape(&self.text, &self.runs, &options);

        if !self.shape.has_valid_bounds() {
            return;
        }

        if self.overflow == TextOverflow::Clipped {
            let mut clip = Path::new();
            clip.push_rect(self.shape.bounds());
            self.clip_path = Some(clip);
        }

        let style_count = self
            .runs
            .iter()
            .map(|run| to_usize(u32::from(run.style_id)) + 1)
            .max()
            .unwrap_or(0);
        if self.style_paths.len() < style_count {
            self.style_paths.resize_with(style_count, Path::new);
        }
        let mut style_paths = std::mem::take(&mut self.style_paths);

        let mut y = 0.0;
        if self.origin == TextOrigin::Baseline {
            if let Some(line) = self
                .shape
                .paragraph_lines()
                .iter()
                .flat_map(|lines| lines.first())
                .next()
            {
                y -= line.baseline;
            }
        }

        let ordered_lines = self.shape.ordered_lines();
        let mut line_index = 0usize;
        'lines: for lines in self.shape.paragraph_lines() {
            for line in lines {
                if line_index >= ordered_lines.len() {
                    break 'lines;
                }
                let ordered = &ordered_lines[line_index];
                let mut x = line.start_x;
                let render_y = y + line.baseline;
                for (run, glyph) in self.shape.line_glyphs(ordered) {
                    let offset = run.offsets[glyph];
                    let outline = run.font.glyph_path(run.glyphs[glyph]);
                    let path = &mut style_paths[to_usize(u32::from(run.style_id))];
                    path.append_scaled(
                        &outline,
                        run.size,
                        Vec2(x + offset.0, render_y + offset.1),
                    );
                    x += run.advances[glyph];
                }
                line_index += 1;
            }
            if let Some(last) = lines.last() {
                y += last.bottom;
            }
            y += self.paragraph_spacing;
        }

        self.style_paths = style_paths;
    }
}
