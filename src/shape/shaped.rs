// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Fully-shaped text
//!
//! [`ShapedText`] composes the pipeline stages — shaping, line breaking,
//! visual re-ordering, glyph lookup — into one artifact consumers can draw
//! from and hit-test against. Everything is rebuilt wholesale by
//! [`ShapedText::shape`]; nothing mutates in place.

use super::linebreak::break_paragraph_lines;
use super::{shape_text, GlyphLine, GlyphLookup, GlyphRun, OrderedLine, Paragraph, StyledRun};
use super::ordered::GlyphIter;
use crate::conv::{to_u32, to_usize};
use crate::{Rect, TextAlign, TextOrigin, TextOverflow, TextSizing, TextWrap};

/// Layout parameters for [`ShapedText::shape`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutOptions {
    pub sizing: TextSizing,
    /// Width constraint for auto-height and fixed sizing
    pub max_width: f32,
    /// Height constraint for fixed sizing
    pub max_height: f32,
    pub align: TextAlign,
    pub wrap: TextWrap,
    pub origin: TextOrigin,
    pub overflow: TextOverflow,
    /// Extra vertical gap between paragraphs
    pub paragraph_spacing: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            sizing: TextSizing::AutoWidth,
            max_width: 0.0,
            max_height: 0.0,
            align: TextAlign::Left,
            wrap: TextWrap::Wrap,
            origin: TextOrigin::Top,
            overflow: TextOverflow::Visible,
            paragraph_spacing: 0.0,
        }
    }
}

/// The composed result of the layout pipeline
#[derive(Clone, Debug, Default)]
pub struct ShapedText {
    paragraphs: Vec<Paragraph>,
    paragraph_lines: Vec<Vec<GlyphLine>>,
    ordered_lines: Vec<OrderedLine>,
    glyph_lookup: GlyphLookup,
    ellipsis_run: Option<GlyphRun>,
    bounds: Rect,
}

impl ShapedText {
    pub fn new() -> Self {
        ShapedText::default()
    }

    /// Paragraphs as returned by the shaper, in logical order
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Lines as computed by the line breaker, grouped per paragraph
    pub fn paragraph_lines(&self) -> &[Vec<GlyphLine>] {
        &self.paragraph_lines
    }

    /// Lines with runs re-ordered into visual order
    ///
    /// May hold fewer lines than the line breaker produced when an overflow
    /// mode truncated the layout.
    pub fn ordered_lines(&self) -> &[OrderedLine] {
        &self.ordered_lines
    }

    /// The codepoint → glyph table
    pub fn glyph_lookup(&self) -> &GlyphLookup {
        &self.glyph_lookup
    }

    /// Layout bounds (see the sizing rules of [`ShapedText::shape`])
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn has_valid_bounds(&self) -> bool {
        !self.bounds.is_empty()
    }

    pub fn line_count(&self) -> u32 {
        to_u32(self.ordered_lines.len())
    }

    /// Iterate one ordered line's glyphs in visual order
    pub fn line_glyphs<'a>(&'a self, line: &'a OrderedLine) -> GlyphIter<'a> {
        line.glyphs(&self.paragraphs[line.paragraph_index()], self.ellipsis_run.as_ref())
    }

    pub(crate) fn line_last_run(&self, line: &OrderedLine) -> Option<&GlyphRun> {
        line.last_run(&self.paragraphs[line.paragraph_index()], self.ellipsis_run.as_ref())
    }

    /// Codepoint index at the visual start of a line
    pub fn line_first_codepoint_index(&self, line_index: usize) -> u32 {
        let Some(line) = self.ordered_lines.get(line_index) else {
            return 0;
        };
        line.first_codepoint_index(
            &self.paragraphs[line.paragraph_index()],
            self.ellipsis_run.as_ref(),
            &self.glyph_lookup,
        )
    }

    /// Codepoint index at the visual end of a line
    pub fn line_last_codepoint_index(&self, line_index: usize) -> u32 {
        let Some(line) = self.ordered_lines.get(line_index) else {
            return 0;
        };
        line.last_codepoint_index(
            &self.paragraphs[line.paragraph_index()],
            self.ellipsis_run.as_ref(),
            &self.glyph_lookup,
        )
    }

    pub(crate) fn line_contains_codepoint(&self, line_index: usize, codepoint_index: u32) -> bool {
        let Some(line) = self.ordered_lines.get(line_index) else {
            return false;
        };
        line.contains_codepoint_index(
            &self.paragraphs[line.paragraph_index()],
            self.ellipsis_run.as_ref(),
            &self.glyph_lookup,
            codepoint_index,
        )
    }

    /// Run the whole pipeline: shape, break, order, index
    ///
    /// Bounds by sizing mode:
    ///
    /// -   auto-width: `(0, min_y, measured width, last line bottom)`
    /// -   auto-height: as above with `max_width` as the width
    /// -   fixed: `(0, min_y, max_width, min_y + max_height)`
    ///
    /// With a baseline origin `min_y` is `−first baseline`, placing y = 0 on
    /// the first baseline. Overflow `Hidden`/`Clipped`/`Ellipsis` truncate
    /// the ordered lines under fixed sizing.
    pub fn shape(&mut self, text: &[char], runs: &[StyledRun], options: &LayoutOptions) {
        self.paragraphs = shape_text(text, runs, None);
        self.glyph_lookup.compute(text, &self.paragraphs);

        let break_width = if options.sizing == TextSizing::AutoWidth {
            -1.0
        } else {
            options.max_width
        };
        self.paragraph_lines = break_paragraph_lines(
            &self.paragraphs,
            break_width,
            options.align,
            options.wrap,
        );
        self.ordered_lines.clear();
        self.ellipsis_run = None;

        if self.paragraphs.iter().all(|paragraph| paragraph.runs.is_empty()) {
            self.bounds = Rect::ZERO;
            return;
        }

        let first_baseline = self
            .paragraph_lines
            .iter()
            .flat_map(|lines| lines.first())
            .next()
            .map(|line| line.baseline);

        let mut y = 0.0;
        let mut min_y = 0.0;
        if options.origin == TextOrigin::Baseline {
            if let Some(baseline) = first_baseline {
                y -= baseline;
                min_y = y;
            }
        }

        let want_ellipsis =
            options.overflow == TextOverflow::Ellipsis && options.sizing == TextSizing::Fixed;
        let mut ellipsis_line: i64 = -1;
        let mut last_line_index: i64 = -1;
        let mut measured_width = 0f32;

        for (paragraph_index, lines) in self.paragraph_lines.iter().enumerate() {
            let paragraph = &self.paragraphs[paragraph_index];
            for line in lines {
                let end_run = &paragraph.runs[to_usize(line.end_run_index)];
                let start_run = &paragraph.runs[to_usize(line.start_run_index)];
                let width = end_run.xpos[to_usize(line.end_glyph_index)]
                    - start_run.xpos[to_usize(line.start_glyph_index)]
                    - end_run.letter_spacing;
                measured_width = measured_width.max(width);
                last_line_index += 1;
                if want_ellipsis && y + line.bottom <= options.max_height {
                    ellipsis_line += 1;
                }
            }
            if let Some(last) = lines.last() {
                y += last.bottom;
            }
            y += options.paragraph_spacing;
        }
        if want_ellipsis && ellipsis_line == -1 {
            // Nothing fits vertically: show the first line, ellipsized.
            ellipsis_line = 0;
        }
        let is_ellipsis_line_last = last_line_index == ellipsis_line;

        let last_bottom = (y - options.paragraph_spacing).max(min_y);
        self.bounds = match options.sizing {
            TextSizing::AutoWidth => Rect::new(0.0, min_y, measured_width, last_bottom),
            TextSizing::AutoHeight => Rect::new(0.0, min_y, options.max_width, last_bottom),
            TextSizing::Fixed => Rect::new(
                0.0,
                min_y,
                options.max_width,
                min_y + options.max_height,
            ),
        };

        let mut y = 0.0;
        if options.origin == TextOrigin::Baseline {
            if let Some(baseline) = first_baseline {
                y -= baseline;
            }
        }
        let mut line_index: i64 = 0;
        'build: for (paragraph_index, lines) in self.paragraph_lines.iter().enumerate() {
            let paragraph = &self.paragraphs[paragraph_index];
            for line in lines {
                match options.overflow {
                    TextOverflow::Hidden
                        if options.sizing == TextSizing::Fixed
                            && y + line.bottom > options.max_height =>
                    {
                        break 'build;
                    }
                    TextOverflow::Clipped
                        if options.sizing == TextSizing::Fixed
                            && y + line.top > options.max_height =>
                    {
                        break 'build;
                    }
                    _ => {}
                }

                self.ordered_lines.push(OrderedLine::new(
                    paragraph,
                    to_u32(paragraph_index),
                    line,
                    options.max_width,
                    ellipsis_line == line_index,
                    is_ellipsis_line_last,
                    &mut self.ellipsis_run,
                    y + line.baseline,
                ));
                if line_index == ellipsis_line {
                    break 'build;
                }
                line_index += 1;
            }
            if let Some(last) = lines.last() {
                y += last.bottom;
            }
            y += options.paragraph_spacing;
        }
    }
}
