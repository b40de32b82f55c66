// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Line breaking
//!
//! Partitions a paragraph's glyph runs into [`GlyphLine`]s under a width
//! constraint, then computes each line's vertical metrics and horizontal
//! start. Word boundaries come from the runs' break tables; a negative
//! width disables soft wrapping (forced breaks still end lines).

use super::{GlyphRun, Paragraph};
use crate::conv::{to_u32, to_usize};
use crate::fonts::LineMetrics;
use crate::{TextAlign, TextWrap};

/// A horizontal line within one paragraph, in storage (logical) order
///
/// Run/glyph indices point into the paragraph's runs; end indices are
/// exclusive. Vertical fields are in paragraph-local y-down space and are
/// filled by the spacing pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphLine {
    pub start_run_index: u32,
    pub start_glyph_index: u32,
    pub end_run_index: u32,
    pub end_glyph_index: u32,
    pub start_x: f32,
    pub top: f32,
    pub baseline: f32,
    pub bottom: f32,
}

impl GlyphLine {
    fn at(run: u32, glyph: u32) -> Self {
        GlyphLine {
            start_run_index: run,
            start_glyph_index: glyph,
            end_run_index: run,
            end_glyph_index: glyph,
            ..Default::default()
        }
    }

    /// True iff both endpoints coincide
    pub fn is_empty(&self) -> bool {
        self.start_run_index == self.end_run_index
            && self.start_glyph_index == self.end_glyph_index
    }

    /// Greedily partition `runs` into lines no wider than `width`
    ///
    /// A negative `width` means auto-width: only forced breaks end lines.
    /// When a single word exceeds the width it is split at glyph
    /// granularity, committing at least one glyph per line.
    pub fn break_lines(runs: &[GlyphRun], width: f32) -> Vec<GlyphLine> {
        let max_line_width = if autowidth(width) { f32::MAX } else { width };
        let mut lines = Vec::new();
        if runs.is_empty() {
            return lines;
        }

        let mut limit = max_line_width;
        let mut advance_word = false;

        // Words are (start, end) pairs in the per-run break tables; a pair
        // may stride run boundaries, so both markers seek independently.
        let (mut start, mut end) = match (WordMarker::first(runs, 0), WordMarker::first(runs, 1)) {
            (Some(start), Some(end)) => (start, end),
            _ => return lines,
        };

        let mut line = GlyphLine::default();

        let mut break_index = runs[end.run].breaks[end.index];
        let mut break_run = end.run;
        let mut last_end_break = end.index;
        let mut start_break_index = runs[start.run].breaks[start.index];
        let mut start_break_run = start.run;
        let mut x = runs[end.run].xpos[to_usize(break_index)];

        loop {
            if advance_word {
                last_end_break = end.index;

                if !start.next(runs) || !end.next(runs) {
                    break;
                }
                advance_word = false;

                break_index = runs[end.run].breaks[end.index];
                break_run = end.run;
                start_break_index = runs[start.run].breaks[start.index];
                start_break_run = start.run;
                x = runs[end.run].xpos[to_usize(break_index)];
            }

            let forced = break_run == start_break_run && break_index == start_break_index;

            if !forced && x > limit {
                let start_run_index = to_u32(start.run);

                if line.start_run_index == start_run_index
                    && line.start_glyph_index == start_break_index
                {
                    // The word itself overflows: split it at glyph
                    // granularity until the remainder fits.
                    let mut can_break_more = true;
                    while can_break_more && x > limit {
                        let line_start = RunCursor::new(
                            runs,
                            to_usize(line.start_run_index),
                            to_usize(line.start_glyph_index),
                        );
                        let mut line_end = RunCursor::new(
                            runs,
                            end.run,
                            to_usize(runs[end.run].breaks[end.index]),
                        );
                        loop {
                            if !line_end.back() {
                                // Hit the start of the text.
                                can_break_more = false;
                                break;
                            }
                            if line_end.x() <= limit {
                                if line_start == line_end && !line_end.forward() {
                                    // Could not consume even one glyph.
                                    can_break_more = false;
                                } else {
                                    line.end_run_index = to_u32(line_end.run);
                                    line.end_glyph_index = to_u32(line_end.index);
                                }
                                break;
                            }
                        }
                        if can_break_more {
                            limit = line_end.x() + max_line_width;
                            if !line.is_empty() {
                                lines.push(line.clone());
                            }
                            line = GlyphLine::at(to_u32(line_end.run), to_u32(line_end.index));
                        }
                    }
                } else {
                    // Word does not fit: knock it to a new line.
                    let start_x =
                        runs[start.run].xpos[to_usize(runs[start.run].breaks[start.index])];
                    limit = start_x + max_line_width;

                    if !line.is_empty() || start.index.wrapping_sub(last_end_break) > 1 {
                        lines.push(line.clone());
                    }
                    line = GlyphLine::at(start_run_index, start_break_index);
                }
            } else {
                line.end_run_index = to_u32(end.run);
                line.end_glyph_index = runs[end.run].breaks[end.index];
                advance_word = true;

                if forced {
                    lines.push(line.clone());
                    // Restart just past the break glyph.
                    let start_x = runs[start.run].xpos
                        [to_usize(runs[start.run].breaks[start.index]) + 1];
                    limit = start_x + max_line_width;
                    line = GlyphLine::at(to_u32(start.run), start_break_index + 1);
                }
            }
        }

        if !line.is_empty() {
            lines.push(line);
        }
        lines
    }

    /// Widest line across `lines`, excluding the end run's trailing
    /// letter-spacing
    pub fn compute_max_width(lines: &[GlyphLine], runs: &[GlyphRun]) -> f32 {
        let mut max_line_width = 0f32;
        for line in lines {
            let width = runs[to_usize(line.end_run_index)].xpos[to_usize(line.end_glyph_index)]
                - runs[to_usize(line.start_run_index)].xpos[to_usize(line.start_glyph_index)]
                - runs[to_usize(line.end_run_index)].letter_spacing;
            max_line_width = max_line_width.max(width);
        }
        max_line_width
    }

    /// Fill in top/baseline/bottom and the aligned start position per line
    ///
    /// The first line of the first paragraph sits its baseline on the true
    /// font ascent so the layout's top is tight; later lines advance by the
    /// (possibly line-height-inflated) ascent.
    pub fn compute_line_spacing(
        is_first_paragraph: bool,
        lines: &mut [GlyphLine],
        runs: &[GlyphRun],
        width: f32,
        align: TextAlign,
    ) {
        let mut first = is_first_paragraph;
        let mut y = 0.0;
        for line in lines {
            let mut ascent = 0f32;
            let mut real_ascent = 0f32;
            let mut descent = 0f32;
            for i in line.start_run_index..=line.end_run_index {
                let run = &runs[to_usize(i)];
                let metrics =
                    effective_line_metrics(run.font.line_metrics(), run.line_height, run.size);
                real_ascent = real_ascent.min(run.font.ascent(run.size));
                ascent = ascent.min(metrics.ascent);
                descent = descent.max(metrics.descent);
            }
            line.top = y;
            if first {
                y = -real_ascent;
                first = false;
            } else {
                y -= ascent;
            }
            line.baseline = y;
            y += descent;
            line.bottom = y;

            let line_width = runs[to_usize(line.end_run_index)].xpos
                [to_usize(line.end_glyph_index)]
                - runs[to_usize(line.start_run_index)].xpos[to_usize(line.start_glyph_index)]
                - runs[to_usize(line.end_run_index)].letter_spacing;
            line.start_x = match align {
                TextAlign::Left => 0.0,
                TextAlign::Right => width - line_width,
                TextAlign::Center => 0.5 * width - 0.5 * line_width,
            };
        }
    }
}

#[inline]
fn autowidth(width: f32) -> bool {
    width < 0.0
}

/// Scale a run's line metrics for a custom line height
///
/// A custom height keeps the font's baseline ratio; a negative height uses
/// the intrinsic metrics at the font size.
fn effective_line_metrics(metrics: LineMetrics, line_height: f32, size: f32) -> LineMetrics {
    if line_height < 0.0 {
        return LineMetrics {
            ascent: metrics.ascent * size,
            descent: metrics.descent * size,
        };
    }
    let baseline = -metrics.ascent;
    let height = baseline + metrics.descent;
    let baseline_factor = baseline / height;
    let ascent = -baseline_factor * line_height;
    LineMetrics {
        ascent,
        descent: line_height + ascent,
    }
}

/// Break lines for every paragraph and align them against a common width
///
/// Auto width (negative) measures the widest line first so all paragraphs
/// align consistently. `NoWrap` disables soft wrapping while keeping the
/// alignment width.
pub(crate) fn break_paragraph_lines(
    paragraphs: &[Paragraph],
    width: f32,
    align: TextAlign,
    wrap: TextWrap,
) -> Vec<Vec<GlyphLine>> {
    let auto_width = autowidth(width);
    let break_width = if wrap == TextWrap::NoWrap { -1.0 } else { width };

    let mut lines: Vec<Vec<GlyphLine>> = paragraphs
        .iter()
        .map(|paragraph| GlyphLine::break_lines(&paragraph.runs, break_width))
        .collect();

    let mut paragraph_width = width;
    if auto_width {
        paragraph_width = 0.0;
        for (paragraph, lines) in paragraphs.iter().zip(&lines) {
            paragraph_width =
                paragraph_width.max(GlyphLine::compute_max_width(lines, &paragraph.runs));
        }
    }

    for (i, (paragraph, lines)) in paragraphs.iter().zip(&mut lines).enumerate() {
        GlyphLine::compute_line_spacing(i == 0, lines, &paragraph.runs, paragraph_width, align);
    }
    lines
}

/// Pair-stride iterator over the union of all runs' break tables
#[derive(Clone, Copy)]
struct WordMarker {
    run: usize,
    index: usize,
}

impl WordMarker {
    fn seek(runs: &[GlyphRun], mut run: usize, mut index: usize) -> Option<WordMarker> {
        while run < runs.len() && index >= runs[run].breaks.len() {
            index -= runs[run].breaks.len();
            run += 1;
        }
        (run < runs.len()).then_some(WordMarker { run, index })
    }

    fn first(runs: &[GlyphRun], offset: usize) -> Option<WordMarker> {
        Self::seek(runs, 0, offset)
    }

    fn next(&mut self, runs: &[GlyphRun]) -> bool {
        match Self::seek(runs, self.run, self.index + 2) {
            Some(marker) => {
                *self = marker;
                true
            }
            None => false,
        }
    }
}

/// Glyph-granularity cursor across run boundaries
///
/// Positions are `xpos` indices (`0..=len` per run), used by the
/// single-word overflow path.
struct RunCursor<'a> {
    runs: &'a [GlyphRun],
    run: usize,
    index: usize,
}

impl<'a> RunCursor<'a> {
    fn new(runs: &'a [GlyphRun], run: usize, index: usize) -> Self {
        RunCursor { runs, run, index }
    }

    fn back(&mut self) -> bool {
        if self.index == 0 {
            if self.run == 0 {
                return false;
            }
            self.run -= 1;
            if self.runs[self.run].glyphs.is_empty() {
                self.index = 0;
                return self.back();
            }
            self.index = self.runs[self.run].glyphs.len() - 1;
        } else {
            self.index -= 1;
        }
        true
    }

    fn forward(&mut self) -> bool {
        if self.index == self.runs[self.run].glyphs.len() {
            if self.run + 1 >= self.runs.len() {
                return false;
            }
            self.run += 1;
            self.index = 0;
            if self.index == self.runs[self.run].glyphs.len() {
                return self.forward();
            }
        } else {
            self.index += 1;
        }
        true
    }

    fn x(&self) -> f32 {
        self.runs[self.run].xpos[self.index]
    }
}

impl PartialEq for RunCursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.run == other.run && self.index == other.index
    }
}
