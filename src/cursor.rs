// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Cursor positions, hit-testing and selections
//!
//! A [`CursorPosition`] addresses a codepoint and, once resolved, the
//! ordered line it sits on. Positions produced by arithmetic start with an
//! unresolved line; [`CursorPosition::resolve_line`] (or the editor's
//! update pass) fills it in before anything is rendered.
//!
//! All public entry points clamp indices instead of failing: a position
//! past the end of the text snaps to the last addressable caret slot.

use crate::conv::{to_u32, to_usize};
use crate::shape::{GlyphLookup, OrderedLine, ShapedText};
use crate::{Rect, TextDirection, Vec2};

/// Where a caret is drawn: an x position and a vertical extent
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualPosition {
    pub x: f32,
    pub top: f32,
    pub bottom: f32,
}

/// A caret location: codepoint index plus (optionally resolved) line index
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorPosition {
    line_index: Option<u32>,
    codepoint_index: u32,
}

/// Round to nearest with ties toward zero
fn round_half_down(value: f32) -> u32 {
    (value - 0.5).ceil().max(0.0) as u32
}

/// Size and exclusive end of the cluster containing `text_index`
fn cluster_extent(lookup: &GlyphLookup, text_index: u32) -> (u32, u32) {
    let last = lookup.last_codepoint_index();
    let glyph = lookup.get(to_usize(text_index));
    let mut next = text_index;
    while next != last && lookup.get(to_usize(next)) == glyph {
        next += 1;
    }
    (next - text_index, next)
}

impl CursorPosition {
    /// Position with a known line
    pub fn new(line_index: u32, codepoint_index: u32) -> Self {
        CursorPosition {
            line_index: Some(line_index),
            codepoint_index,
        }
    }

    /// Position produced by arithmetic; resolve the line before rendering
    pub fn unresolved(codepoint_index: u32) -> Self {
        CursorPosition {
            line_index: None,
            codepoint_index,
        }
    }

    pub fn zero() -> Self {
        CursorPosition::new(0, 0)
    }

    #[inline]
    pub fn line_index(&self) -> Option<u32> {
        self.line_index
    }

    #[inline]
    pub fn codepoint_index(&self) -> u32 {
        self.codepoint_index
    }

    /// Codepoint index shifted by `offset`, clamped at zero
    pub fn codepoint_index_offset(&self, offset: i32) -> u32 {
        if offset < 0 && offset.unsigned_abs() > self.codepoint_index {
            return 0;
        }
        self.codepoint_index.wrapping_add_signed(offset)
    }

    /// Shift the codepoint index; the result's line is unresolved
    pub fn offset(&self, offset: i32) -> CursorPosition {
        CursorPosition::unresolved(self.codepoint_index_offset(offset))
    }

    /// Find the closest line containing this codepoint
    pub fn resolve_line(&mut self, shape: &ShapedText) {
        let mut line_index = 0u32;
        for i in 0..shape.ordered_lines().len() {
            if shape.line_contains_codepoint(i, self.codepoint_index) {
                break;
            }
            line_index += 1;
        }
        self.line_index = Some(line_index);
    }

    /// Clamp to the shape's addressable lines and caret slots
    pub fn clamped(self, shape: &ShapedText) -> Self {
        let max_line = shape.line_count().saturating_sub(1);
        let max_codepoint = shape.glyph_lookup().last_codepoint_index().saturating_sub(1);
        CursorPosition {
            line_index: self.line_index.map(|line| line.min(max_line)),
            codepoint_index: self.codepoint_index.min(max_codepoint),
        }
    }

    /// Compute where the caret at this position is drawn
    ///
    /// Returns `None` when the line is unresolved or out of range.
    pub fn visual_position(&self, shape: &ShapedText) -> Option<VisualPosition> {
        let lookup = shape.glyph_lookup();
        let lines = shape.ordered_lines();
        let line_index = to_usize(self.line_index?);
        if line_index >= lines.len() || lookup.is_empty() {
            return None;
        }
        let ordered = &lines[line_index];
        let line = ordered.glyph_line();
        let target = lookup.get(to_usize(self.codepoint_index));

        let mut x = line.start_x;
        let mut have_first = false;
        let (mut first_index, mut last_index) = (0u32, 0u32);
        for (run, glyph) in shape.line_glyphs(ordered) {
            let advance = run.advances[glyph];
            if advance != 0.0 && target == lookup.get(to_usize(run.text_indices[glyph])) {
                // Interpolate within the cluster so the caret can sit
                // inside a ligature.
                let mirrored = run.direction() == TextDirection::Rtl;
                x += advance * lookup.advance_factor(to_usize(self.codepoint_index), mirrored);
                return Some(VisualPosition {
                    x,
                    top: ordered.y() + run.font.ascent(run.size),
                    bottom: ordered.y() + run.font.descent(run.size),
                });
            }
            if !have_first {
                first_index = run.text_indices[glyph];
                last_index = first_index;
                have_first = true;
            } else {
                last_index = run.text_indices[glyph];
            }
            x += advance;
        }

        // Not on a glyph: snap to the nearer end of the line.
        let run = shape.line_last_run(ordered)?;
        let cp = self.codepoint_index;
        let x = if cp.abs_diff(first_index) < cp.abs_diff(last_index) {
            line.start_x
        } else {
            x
        };
        Some(VisualPosition {
            x,
            top: ordered.y() + run.font.ascent(run.size),
            bottom: ordered.y() + run.font.descent(run.size),
        })
    }

    /// Hit-test a 2D point in layout space
    ///
    /// The first line whose bottom lies below the point wins; the last line
    /// catches everything below the text.
    pub fn from_translation(translation: Vec2, shape: &ShapedText) -> CursorPosition {
        let lines = shape.ordered_lines();
        if lines.is_empty() {
            return CursorPosition::zero();
        }
        let max_line = lines.len() - 1;
        for (i, ordered) in lines.iter().enumerate() {
            if ordered.bottom() < translation.1 && i != max_line {
                continue;
            }
            return Self::from_ordered_line(shape, ordered, to_u32(i), translation.0);
        }
        CursorPosition::zero()
    }

    /// Hit-test a horizontal coordinate on a specific line
    pub fn from_line_x(line_index: u32, x: f32, shape: &ShapedText) -> CursorPosition {
        match shape.ordered_lines().get(to_usize(line_index)) {
            Some(ordered) => Self::from_ordered_line(shape, ordered, line_index, x),
            None => CursorPosition::zero(),
        }
    }

    fn from_ordered_line(
        shape: &ShapedText,
        ordered: &OrderedLine,
        line_index: u32,
        translation_x: f32,
    ) -> CursorPosition {
        let lookup = shape.glyph_lookup();
        let mut x = ordered.glyph_line().start_x;
        let mut last = None;

        for (run, glyph) in shape.line_glyphs(ordered) {
            last = Some((run, glyph));
            let advance = run.advances[glyph];
            if translation_x <= x + advance {
                let ratio = if advance == 0.0 {
                    1.0
                } else {
                    ((translation_x - x) / advance).clamp(0.0, 1.0)
                };
                let text_index = run.text_indices[glyph];
                let (parts, next_text_index) = cluster_extent(lookup, text_index);
                let part = round_half_down(ratio * parts as f32);
                let codepoint_index = match run.direction() {
                    TextDirection::Ltr => text_index + part,
                    TextDirection::Rtl => next_text_index.saturating_sub(part),
                };
                return CursorPosition::new(line_index, codepoint_index).clamped(shape);
            }
            x += advance;
        }

        // Past the last glyph: snap to the end of the line.
        let Some((run, glyph)) = last else {
            return CursorPosition::new(line_index, 0).clamped(shape);
        };
        let text_index = run.text_indices[glyph];
        let (parts, next_text_index) = cluster_extent(lookup, text_index);
        let codepoint_index = match run.direction() {
            TextDirection::Ltr => text_index + parts,
            TextDirection::Rtl => next_text_index - parts,
        };
        CursorPosition::new(line_index, codepoint_index).clamped(shape)
    }

    /// Position at a codepoint with its line resolved by scanning lines
    pub fn at_index(codepoint_index: u32, shape: &ShapedText) -> CursorPosition {
        let last = shape.glyph_lookup().last_codepoint_index().saturating_sub(1);
        if codepoint_index >= last {
            return CursorPosition::new(shape.line_count().saturating_sub(1), last);
        }

        let mut line_index: u32 = 0;
        for (paragraph_index, lines) in shape.paragraph_lines().iter().enumerate() {
            let paragraph = &shape.paragraphs()[paragraph_index];
            for line in lines {
                let run = &paragraph.runs[to_usize(line.start_run_index)];
                let line_start = run
                    .text_indices
                    .get(to_usize(line.start_glyph_index))
                    .copied()
                    .unwrap_or(u32::MAX);
                if line_start <= codepoint_index {
                    line_index += 1;
                    continue;
                }
                return CursorPosition::new(line_index.saturating_sub(1), codepoint_index)
                    .clamped(shape);
            }
        }
        CursorPosition::new(line_index.saturating_sub(1), codepoint_index).clamped(shape)
    }
}

/// A selection: two caret positions
///
/// `start`/`end` preserve the anchor and the moving edge; `first`/`last`
/// order them by codepoint index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    start: CursorPosition,
    end: CursorPosition,
}

impl Cursor {
    pub fn new(start: CursorPosition, end: CursorPosition) -> Self {
        Cursor { start, end }
    }

    pub fn collapsed(position: CursorPosition) -> Self {
        Cursor {
            start: position,
            end: position,
        }
    }

    pub fn at_start() -> Self {
        Cursor::collapsed(CursorPosition::zero())
    }

    #[inline]
    pub fn start(&self) -> CursorPosition {
        self.start
    }

    #[inline]
    pub fn end(&self) -> CursorPosition {
        self.end
    }

    /// The edge with the smaller codepoint index
    pub fn first(&self) -> CursorPosition {
        if self.start.codepoint_index() < self.end.codepoint_index() {
            self.start
        } else {
            self.end
        }
    }

    /// The edge with the larger codepoint index
    pub fn last(&self) -> CursorPosition {
        if self.start.codepoint_index() < self.end.codepoint_index() {
            self.end
        } else {
            self.start
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn has_selection(&self) -> bool {
        !self.is_collapsed()
    }

    /// True iff `codepoint_index` lies inside the selection
    pub fn contains(&self, codepoint_index: u32) -> bool {
        codepoint_index >= self.first().codepoint_index()
            && codepoint_index < self.last().codepoint_index()
    }

    /// Resolve any unresolved line indices; returns true if any changed
    pub fn resolve_line_positions(&mut self, shape: &ShapedText) -> bool {
        let mut resolved = false;
        if self.start.line_index().is_none() {
            self.start.resolve_line(shape);
            resolved = true;
        }
        if self.end.line_index().is_none() {
            self.end.resolve_line(shape);
            resolved = true;
        }
        resolved
    }

    /// Collect one rectangle per (partial) glyph inside the selection
    ///
    /// Cluster fractions interpolate the x extent at the selection
    /// endpoints; vertical extent follows each run's font at its size.
    pub fn selection_rects(&self, shape: &ShapedText, rects: &mut Vec<Rect>) {
        let first = self.first().clamped(shape);
        let last = self.last().clamped(shape);

        let Some(first_line) = first.line_index() else {
            return;
        };
        let Some(last_line) = last.line_index() else {
            return;
        };
        let first_codepoint = first.codepoint_index();
        let last_codepoint = last.codepoint_index();

        let lookup = shape.glyph_lookup();
        let lines = shape.ordered_lines();
        for line_index in first_line..=last_line {
            let Some(ordered) = lines.get(to_usize(line_index)) else {
                break;
            };
            let y = ordered.y();
            let mut x = ordered.glyph_line().start_x;
            for (run, glyph) in shape.line_glyphs(ordered) {
                let advance = run.advances[glyph];
                let codepoint_index = run.text_indices[glyph];
                let count = lookup.count(to_usize(codepoint_index));
                let end_codepoint_index = codepoint_index + count;

                if last_codepoint > codepoint_index && end_codepoint_index > first_codepoint {
                    let after = first_codepoint.saturating_sub(codepoint_index);
                    let before = end_codepoint_index.saturating_sub(last_codepoint);
                    let mut start_factor = after as f32 / count as f32;
                    let mut end_factor = (count - before) as f32 / count as f32;
                    if run.direction() == TextDirection::Rtl {
                        start_factor = 1.0 - start_factor;
                        end_factor = 1.0 - end_factor;
                    }

                    let mut left = x + advance * start_factor;
                    let mut right = x + advance * end_factor;
                    if left > right {
                        std::mem::swap(&mut left, &mut right);
                    }
                    rects.push(Rect::new(
                        left,
                        y + run.font.ascent(run.size),
                        right,
                        y + run.font.descent(run.size),
                    ));
                }
                x += advance;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fonts::mock::{MockFace, ADVANCE};
    use crate::shape::{LayoutOptions, StyledRun};
    use crate::TextSizing;

    fn shape_str(text: &str, size: f32, options: &LayoutOptions) -> ShapedText {
        let font = MockFace::font();
        let unichars: Vec<char> = text.chars().collect();
        let mut run = StyledRun::new(font, size);
        run.codepoint_count = crate::conv::to_u32(unichars.len());
        let mut shaped = ShapedText::new();
        shaped.shape(&unichars, &[run], options);
        shaped
    }

    #[test]
    fn hit_test_mid_glyph_rounds_down() {
        let options = LayoutOptions {
            sizing: TextSizing::AutoHeight,
            max_width: 300.0,
            ..Default::default()
        };
        let shaped = shape_str("ABC DEF", 72.0, &options);
        assert_eq!(shaped.line_count(), 1);
        assert_eq!(shaped.glyph_lookup().get(0), 0);
        assert_eq!(shaped.glyph_lookup().get(6), 6);

        let advance = ADVANCE * 72.0;
        let baseline = 0.9 * 72.0;
        let position = CursorPosition::from_translation(Vec2(advance * 0.5, baseline), &shaped);
        assert_eq!(position, CursorPosition::new(0, 0));
        // Just past the midpoint snaps to the next caret slot.
        let position = CursorPosition::from_translation(Vec2(advance * 0.51, baseline), &shaped);
        assert_eq!(position.codepoint_index(), 1);
    }

    #[test]
    fn hit_test_outside_line_clamps_to_ends() {
        let options = LayoutOptions {
            sizing: TextSizing::AutoHeight,
            max_width: 500.0,
            ..Default::default()
        };
        // Wraps after "three": second line holds "four five".
        let shaped = shape_str("one two three four five", 72.0, &options);
        assert_eq!(shaped.line_count(), 2);
        let line2 = &shaped.ordered_lines()[1];
        let y = line2.y();

        let position = CursorPosition::from_translation(Vec2(-20.0, y), &shaped);
        assert_eq!(position, CursorPosition::new(1, 14));
        let position = CursorPosition::from_translation(Vec2(520.0, y), &shaped);
        assert_eq!(position, CursorPosition::new(1, 22));
    }

    #[test]
    fn hit_test_below_text_lands_on_last_line() {
        let shaped = shape_str("hi", 20.0, &LayoutOptions::default());
        let position = CursorPosition::from_translation(Vec2(0.0, 1000.0), &shaped);
        assert_eq!(position.line_index(), Some(0));
    }

    #[test]
    fn caret_interpolates_inside_ligature() {
        let font = MockFace::font_with(|face| face.ligatures = true);
        let unichars: Vec<char> = "xfiy".chars().collect();
        let mut run = StyledRun::new(font, 10.0);
        run.codepoint_count = 4;
        let mut shaped = ShapedText::new();
        shaped.shape(&unichars, &[run], &LayoutOptions::default());

        // Glyphs: x, fi, y at 5 units each; baseline sits at 9.
        let mut position = CursorPosition::unresolved(2);
        position.resolve_line(&shaped);
        let visual = position.visual_position(&shaped).unwrap();
        assert!((visual.x - 7.5).abs() < 1e-4);
        assert!(visual.top.abs() < 1e-3);
        assert!((visual.bottom - 11.5).abs() < 1e-3);
    }

    #[test]
    fn caret_past_end_snaps_to_line_end() {
        let shaped = shape_str("abc", 10.0, &LayoutOptions::default());
        let position = CursorPosition::new(0, 3).clamped(&shaped);
        // Clamped to the last addressable slot.
        assert_eq!(position.codepoint_index(), 2);
        let visual = position.visual_position(&shaped).unwrap();
        assert!(visual.x >= 0.0);
    }

    #[test]
    fn unresolved_position_has_no_visual() {
        let shaped = shape_str("abc", 10.0, &LayoutOptions::default());
        let position = CursorPosition::unresolved(1);
        assert_eq!(position.visual_position(&shaped), None);
    }

    #[test]
    fn at_index_finds_the_right_line() {
        let options = LayoutOptions {
            sizing: TextSizing::AutoHeight,
            max_width: 500.0,
            ..Default::default()
        };
        let shaped = shape_str("one two three four five", 72.0, &options);
        assert_eq!(CursorPosition::at_index(0, &shaped).line_index(), Some(0));
        assert_eq!(CursorPosition::at_index(10, &shaped).line_index(), Some(0));
        assert_eq!(CursorPosition::at_index(15, &shaped).line_index(), Some(1));
        // Past the end: last line, last slot.
        let position = CursorPosition::at_index(99, &shaped);
        assert_eq!(position.line_index(), Some(1));
        assert_eq!(position.codepoint_index(), 22);
    }

    #[test]
    fn cursor_orders_edges_by_codepoint() {
        let cursor = Cursor::new(CursorPosition::new(0, 5), CursorPosition::new(0, 2));
        assert_eq!(cursor.first().codepoint_index(), 2);
        assert_eq!(cursor.last().codepoint_index(), 5);
        assert!(cursor.has_selection());
        assert!(cursor.contains(2));
        assert!(cursor.contains(4));
        assert!(!cursor.contains(5));
    }

    #[test]
    fn selection_across_ligature_produces_partial_rects() {
        let font = MockFace::font_with(|face| face.ligatures = true);
        let unichars: Vec<char> = "xfiyz".chars().collect();
        let mut run = StyledRun::new(font, 10.0);
        run.codepoint_count = 5;
        let mut shaped = ShapedText::new();
        shaped.shape(&unichars, &[run], &LayoutOptions::default());

        // Select [2, 4): the second half of the ligature plus 'y'.
        let mut cursor = Cursor::new(CursorPosition::unresolved(2), CursorPosition::unresolved(4));
        cursor.resolve_line_positions(&shaped);
        let mut rects = Vec::new();
        cursor.selection_rects(&shaped, &mut rects);
        assert_eq!(rects.len(), 2);
        // Half of the ligature glyph: [7.5, 10).
        assert!((rects[0].min.0 - 7.5).abs() < 1e-4);
        assert!((rects[0].max.0 - 10.0).abs() < 1e-4);
        // The whole 'y' glyph: [10, 15).
        assert!((rects[1].min.0 - 10.0).abs() < 1e-4);
        assert!((rects[1].max.0 - 15.0).abs() < 1e-4);
    }

    #[test]
    fn resolve_line_positions_fills_unresolved_only() {
        let shaped = shape_str("ab", 10.0, &LayoutOptions::default());
        let mut cursor = Cursor::new(CursorPosition::new(0, 0), CursorPosition::unresolved(1));
        assert!(cursor.resolve_line_positions(&shaped));
        assert_eq!(cursor.end().line_index(), Some(0));
        assert!(!cursor.resolve_line_positions(&shaped));
    }
}
