// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Visual run ordering
//!
//! An [`OrderedLine`] wraps one [`GlyphLine`] with its runs re-ordered for
//! display: the standard "reverse contiguous ranges by descending level"
//! pass of the bidi algorithm, applied at run granularity. Iteration yields
//! `(run, glyph_index)` pairs in visual left-to-right order; right-to-left
//! runs are walked backwards since glyph storage is logical.
//!
//! When overflow-ellipsis is active the line may also carry a reference to
//! a freshly shaped ellipsis run, truncating the line's own glyphs to make
//! room.

use super::{shape_text, GlyphLine, GlyphLookup, GlyphRun, Paragraph, StyledRun};
use crate::conv::{to_u32, to_usize};
use crate::TextDirection;
use smallvec::SmallVec;

/// Reference to one run on a line, in visual order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RunSlot {
    /// Index into the paragraph's logical runs
    Logical(u32),
    /// The shape-owned ellipsis run
    Ellipsis,
}

/// A line with runs in visual order
///
/// Iterate with [`crate::ShapedText::line_glyphs`]. The line also records
/// its baseline y in layout space (paragraph stacking applied).
#[derive(Clone, Debug)]
pub struct OrderedLine {
    paragraph_index: u32,
    start_logical: Option<u32>,
    end_logical: Option<u32>,
    start_glyph_index: u32,
    end_glyph_index: u32,
    runs: SmallVec<[(RunSlot, u8); 4]>,
    line: GlyphLine,
    baseline_y: f32,
}

impl OrderedLine {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        paragraph: &Paragraph,
        paragraph_index: u32,
        line: &GlyphLine,
        line_width: f32,
        want_ellipsis: bool,
        is_ellipsis_line_last: bool,
        ellipsis_run: &mut Option<GlyphRun>,
        baseline_y: f32,
    ) -> Self {
        let mut ordered = OrderedLine {
            paragraph_index,
            start_logical: None,
            end_logical: None,
            start_glyph_index: line.start_glyph_index,
            end_glyph_index: line.end_glyph_index,
            runs: SmallVec::new(),
            line: line.clone(),
            baseline_y,
        };

        let mut slots: SmallVec<[(RunSlot, u8); 4]> = SmallVec::new();
        let built = want_ellipsis
            && ordered.build_ellipsis_runs(
                &mut slots,
                paragraph,
                line,
                line_width,
                is_ellipsis_line_last,
                ellipsis_run,
            );
        if !built {
            for i in line.start_run_index..=line.end_run_index {
                slots.push((RunSlot::Logical(i), paragraph.runs[to_usize(i)].level));
            }
            if !slots.is_empty() {
                ordered.start_logical = Some(line.start_run_index);
                ordered.end_logical = Some(line.end_run_index);
            }
        }

        // Unicode TR9 L2 at run granularity: for each level from the
        // maximum down to 1, reverse the contiguous ranges at or above it.
        let max_level = slots.iter().map(|slot| slot.1).max().unwrap_or(0);
        for level in (1..=max_level).rev() {
            let mut range_start = None;
            for i in 0..slots.len() {
                if slots[i].1 >= level {
                    if range_start.is_none() {
                        range_start = Some(i);
                    }
                } else if let Some(start) = range_start.take() {
                    slots[start..i].reverse();
                }
            }
            if let Some(start) = range_start {
                slots[start..].reverse();
            }
        }

        ordered.runs = slots;
        ordered
    }

    /// Build the logical slot list for an ellipsis line
    ///
    /// Returns false when this is the last line and everything fits, in
    /// which case no ellipsis is wanted after all.
    fn build_ellipsis_runs(
        &mut self,
        slots: &mut SmallVec<[(RunSlot, u8); 4]>,
        paragraph: &Paragraph,
        line: &GlyphLine,
        line_width: f32,
        is_ellipsis_line_last: bool,
        stored: &mut Option<GlyphRun>,
    ) -> bool {
        let runs = &paragraph.runs;
        let mut x = 0.0;
        let mut start_g = to_usize(line.start_glyph_index);

        if is_ellipsis_line_last {
            let mut fits = true;
            'measure: for i in line.start_run_index..=line.end_run_index {
                let run = &runs[to_usize(i)];
                let end_g = if i == line.end_run_index {
                    to_usize(line.end_glyph_index)
                } else {
                    run.glyphs.len()
                };
                for j in start_g..end_g {
                    x += run.advances[j];
                    if x > line_width {
                        fits = false;
                        break 'measure;
                    }
                }
                start_g = 0;
            }
            if fits {
                return false;
            }
        }

        let ellipsis_text: Vec<char> = "...".chars().collect();
        let mut ellipsis_source: Option<(crate::Font, f32)> = None;
        let mut ellipsis: Option<GlyphRun> = None;
        let mut ellipsis_width = 0.0;
        let mut overflowed = false;
        start_g = to_usize(line.start_glyph_index);
        x = 0.0;

        for i in line.start_run_index..=line.end_run_index {
            let run = &runs[to_usize(i)];

            let source_changed = match &ellipsis_source {
                None => true,
                Some((font, size)) => font != &run.font || *size != run.size,
            };
            if source_changed {
                ellipsis_source = Some((run.font.clone(), run.size));

                let mut styled = StyledRun::new(run.font.clone(), run.size);
                styled.line_height = run.line_height;
                styled.letter_spacing = run.letter_spacing;
                styled.style_id = run.style_id;
                styled.codepoint_count = to_u32(ellipsis_text.len());
                let shaped = shape_text(&ellipsis_text, std::slice::from_ref(&styled), None);
                let next_run = shaped
                    .into_iter()
                    .next()
                    .and_then(|paragraph| paragraph.runs.into_iter().next());

                if let Some(next_run) = next_run {
                    let next_width: f32 = next_run.advances.iter().sum();
                    // Use the freshest ellipsis that still fits; otherwise
                    // stick with the previously accepted one.
                    if ellipsis.is_none() || x + next_width <= line_width {
                        ellipsis_width = next_width;
                        ellipsis = Some(next_run);
                    }
                }
            }

            let end_g = if i == line.end_run_index {
                to_usize(line.end_glyph_index)
            } else {
                run.glyphs.len()
            };
            for j in start_g..end_g {
                let advance = run.advances[j];
                if x + advance + ellipsis_width > line_width {
                    self.end_glyph_index = to_u32(j);
                    overflowed = true;
                    break;
                }
                x += advance;
            }
            start_g = 0;
            slots.push((RunSlot::Logical(i), run.level));
            self.end_logical = Some(i);

            if overflowed && ellipsis.is_some() {
                let level = ellipsis.as_ref().map(|run| run.level).unwrap_or(0);
                *stored = ellipsis.take();
                slots.push((RunSlot::Ellipsis, level));
                break;
            }
        }

        // Room was left over (or nothing overflowed): append the ellipsis
        // if it was not placed above.
        if !overflowed {
            if let Some(run) = ellipsis.take() {
                let level = run.level;
                *stored = Some(run);
                slots.push((RunSlot::Ellipsis, level));
            }
        }

        self.start_logical = match slots.first() {
            Some((RunSlot::Logical(i), _)) => Some(*i),
            _ => None,
        };
        true
    }

    #[inline]
    pub(crate) fn paragraph_index(&self) -> usize {
        to_usize(self.paragraph_index)
    }

    /// The underlying storage-order line
    #[inline]
    pub fn glyph_line(&self) -> &GlyphLine {
        &self.line
    }

    /// Baseline y in layout space
    #[inline]
    pub fn y(&self) -> f32 {
        self.baseline_y
    }

    /// Bottom edge in layout space
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.baseline_y - self.line.baseline + self.line.bottom
    }

    fn resolve<'a>(
        &self,
        slot: RunSlot,
        paragraph: &'a Paragraph,
        ellipsis: Option<&'a GlyphRun>,
    ) -> Option<&'a GlyphRun> {
        match slot {
            RunSlot::Logical(i) => paragraph.runs.get(to_usize(i)),
            RunSlot::Ellipsis => ellipsis,
        }
    }

    /// Storage-order glyph bounds the line applies to `slot`
    fn storage_bounds(&self, slot: RunSlot, run: &GlyphRun) -> (usize, usize) {
        match slot {
            RunSlot::Logical(i) => {
                let start = if self.start_logical == Some(i) {
                    to_usize(self.start_glyph_index)
                } else {
                    0
                };
                let end = if self.end_logical == Some(i) {
                    to_usize(self.end_glyph_index)
                } else {
                    run.glyphs.len()
                };
                (start, end.max(start))
            }
            RunSlot::Ellipsis => (0, run.glyphs.len()),
        }
    }

    pub(crate) fn glyphs<'a>(
        &'a self,
        paragraph: &'a Paragraph,
        ellipsis: Option<&'a GlyphRun>,
    ) -> GlyphIter<'a> {
        let mut iter = GlyphIter {
            line: self,
            paragraph,
            ellipsis,
            slot: 0,
            remaining: 0..0,
            rtl: false,
        };
        iter.load_slot();
        iter
    }

    pub(crate) fn last_run<'a>(
        &self,
        paragraph: &'a Paragraph,
        ellipsis: Option<&'a GlyphRun>,
    ) -> Option<&'a GlyphRun> {
        self.runs
            .last()
            .and_then(|&(slot, _)| self.resolve(slot, paragraph, ellipsis))
    }

    /// Codepoint index of the visually left-most boundary on the line
    ///
    /// Clamped so that the editor's trailing sentinel is never addressed.
    pub(crate) fn first_codepoint_index(
        &self,
        paragraph: &Paragraph,
        ellipsis: Option<&GlyphRun>,
        lookup: &GlyphLookup,
    ) -> u32 {
        let Some((run, glyph)) = self.glyphs(paragraph, ellipsis).next() else {
            return 0;
        };
        let mut index = run.text_indices[glyph];
        if run.direction() == TextDirection::Rtl {
            // The left-most glyph of an RTL run is logically last: step to
            // the far edge of its cluster.
            index += lookup.count(to_usize(index));
        }
        index.min(lookup.last_codepoint_index().saturating_sub(1))
    }

    /// Codepoint index of the visually right-most boundary on the line
    pub(crate) fn last_codepoint_index(
        &self,
        paragraph: &Paragraph,
        ellipsis: Option<&GlyphRun>,
        lookup: &GlyphLookup,
    ) -> u32 {
        let mut last = None;
        for item in self.glyphs(paragraph, ellipsis) {
            last = Some(item);
        }
        let Some((run, glyph)) = last else {
            return 0;
        };
        let mut index = run.text_indices[glyph];
        if run.direction() == TextDirection::Ltr {
            index += lookup.count(to_usize(index));
        }
        index.min(lookup.last_codepoint_index().saturating_sub(1))
    }

    pub(crate) fn contains_codepoint_index(
        &self,
        paragraph: &Paragraph,
        ellipsis: Option<&GlyphRun>,
        lookup: &GlyphLookup,
        codepoint_index: u32,
    ) -> bool {
        codepoint_index >= self.first_codepoint_index(paragraph, ellipsis, lookup)
            && codepoint_index <= self.last_codepoint_index(paragraph, ellipsis, lookup)
    }
}

/// Iterator over a line's glyphs in visual left-to-right order
///
/// Yields `(run, glyph_index)` pairs; `glyph_index` is a storage-order
/// index into the run's arrays.
pub struct GlyphIter<'a> {
    line: &'a OrderedLine,
    paragraph: &'a Paragraph,
    ellipsis: Option<&'a GlyphRun>,
    slot: usize,
    remaining: std::ops::Range<usize>,
    rtl: bool,
}

impl<'a> GlyphIter<'a> {
    fn load_slot(&mut self) {
        self.remaining = 0..0;
        self.rtl = false;
        if let Some(&(slot, _)) = self.line.runs.get(self.slot) {
            if let Some(run) = self.line.resolve(slot, self.paragraph, self.ellipsis) {
                let (start, end) = self.line.storage_bounds(slot, run);
                self.remaining = start..end;
                self.rtl = run.direction() == TextDirection::Rtl;
            }
        }
    }
}

impl<'a> Iterator for GlyphIter<'a> {
    type Item = (&'a GlyphRun, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.slot >= self.line.runs.len() {
                return None;
            }
            let next = if self.rtl {
                self.remaining.next_back()
            } else {
                self.remaining.next()
            };
            if let Some(glyph) = next {
                let (slot, _) = self.line.runs[self.slot];
                let run = self.line.resolve(slot, self.paragraph, self.ellipsis)?;
                return Some((run, glyph));
            }
            self.slot += 1;
            self.load_slot();
        }
    }
}
