// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Text shaping
//!
//! [`shape_text`] converts codepoints plus caller [`StyledRun`]s into
//! [`Paragraph`]s of [`GlyphRun`]s:
//!
//! 1.  The bidi algorithm splits the text into paragraphs and assigns
//!     per-codepoint embedding levels.
//! 2.  Each paragraph is split into maximal sub-runs of constant styled run,
//!     bidi level and script.
//! 3.  Each sub-run is shaped by its font; runs containing unmapped
//!     codepoints are split further through the font fallback hook.
//! 4.  Word-break tables are derived from the codepoints.
//!
//! This module does not wrap lines or re-order runs; see the line breaker
//! and [`OrderedLine`] for those stages.

use crate::conv::{to_u32, to_usize};
use crate::fonts::{self, Font, GlyphId, ShapeRequest, Tag};
use crate::{TextDirection, Vec2};
use smallvec::SmallVec;
use unicode_bidi::{BidiInfo, Level, LTR_LEVEL, RTL_LEVEL};
use unicode_script::{Script, UnicodeScript};

mod linebreak;
pub use linebreak::GlyphLine;

mod lookup;
pub use lookup::GlyphLookup;

mod ordered;
pub use ordered::{GlyphIter, OrderedLine};

mod shaped;
pub use shaped::{LayoutOptions, ShapedText};

/// Whitespace for word-break purposes
///
/// Everything at or below `U+0020` plus the line separator. Note that the
/// zero-width space is *not* whitespace here; the editor relies on its
/// sentinel belonging to the final word.
#[inline]
pub fn is_whitespace(c: char) -> bool {
    c <= ' ' || c == '\u{2028}'
}

#[inline]
fn is_forced_break(c: char) -> bool {
    c == '\n' || c == '\u{2028}'
}

/// A caller-provided styling guide for a range of codepoints
///
/// The `codepoint_count`s of consecutive runs partition the input text.
/// `script` and `level` are derived by the shaper for the sub-runs it
/// creates; callers may leave them at their defaults.
#[derive(Clone, Debug)]
pub struct StyledRun {
    pub font: Font,
    /// Font size in layout units per em; must be positive
    pub size: f32,
    /// Total line height in layout units; negative means "use the font's
    /// intrinsic metrics"
    pub line_height: f32,
    /// Extra advance added after every glyph
    pub letter_spacing: f32,
    pub codepoint_count: u32,
    /// ISO 15924 script tag (derived during shaping)
    pub script: Tag,
    /// Opaque grouping id for paint and styling outside this crate
    pub style_id: u16,
    /// Bidi embedding level (derived during shaping)
    pub level: u8,
}

impl StyledRun {
    /// Construct with font defaults: intrinsic line height, no letter
    /// spacing, style id 0
    pub fn new(font: Font, size: f32) -> Self {
        StyledRun {
            font,
            size,
            line_height: -1.0,
            letter_spacing: 0.0,
            codepoint_count: 0,
            script: Tag(0),
            style_id: 0,
            level: 0,
        }
    }
}

/// A shaped run: the system-generated counterpart of a [`StyledRun`]
///
/// Glyph cardinality no longer matches the covered codepoints (ligatures,
/// cluster merging, fallback splits). All per-glyph arrays have one entry
/// per glyph except `xpos`, which has a trailing entry holding the run's
/// end position.
///
/// Glyphs are stored in logical order for both directions; `text_indices`
/// ascend within the run. Visual order is recovered per line by
/// [`OrderedLine`], which walks right-to-left runs backwards.
#[derive(Clone, Debug)]
pub struct GlyphRun {
    pub font: Font,
    pub size: f32,
    pub line_height: f32,
    pub letter_spacing: f32,

    /// Font-local glyph ids
    pub glyphs: Vec<GlyphId>,

    /// For each glyph, the codepoint index (into the full input) its
    /// cluster begins at
    pub text_indices: Vec<u32>,

    /// Per-glyph advance in layout units, letter-spacing included
    pub advances: Vec<f32>,

    /// Prefix-sum of advances in logical order, continuing across the
    /// paragraph's runs; `xpos[glyphs.len()]` is the run's end position
    pub xpos: Vec<f32>,

    /// Per-glyph draw offset relative to the advance position
    pub offsets: Vec<Vec2>,

    /// Word spans as a dense pair list of start/end glyph indices; a forced
    /// break is a pair with equal start and end
    pub breaks: Vec<u32>,

    /// ISO 15924 script tag of the run
    pub script: Tag,

    /// Opaque styling id inherited from the styled run
    pub style_id: u16,

    /// Bidi embedding level (even = LTR, odd = RTL)
    pub level: u8,
}

impl GlyphRun {
    #[inline]
    pub fn direction(&self) -> TextDirection {
        TextDirection::from_level(self.level)
    }
}

/// A set of runs sharing one base direction, in logical order
#[derive(Clone, Debug, Default)]
pub struct Paragraph {
    pub runs: SmallVec<[GlyphRun; 1]>,
    /// Base bidi level of the paragraph
    pub level: u8,
}

impl Paragraph {
    #[inline]
    pub fn base_direction(&self) -> TextDirection {
        TextDirection::from_level(self.level)
    }
}

fn script_to_tag(script: Script) -> Tag {
    let name = script.short_name().as_bytes();
    debug_assert_eq!(name.len(), 4);
    Tag::from_bytes(&[name[0], name[1], name[2], name[3]])
}

fn empty_paragraph(direction: Option<TextDirection>) -> Paragraph {
    let level = match direction {
        Some(TextDirection::Rtl) => RTL_LEVEL,
        _ => LTR_LEVEL,
    };
    Paragraph {
        runs: SmallVec::new(),
        level: level.number(),
    }
}

/// Shape styled text into paragraphs of glyph runs
///
/// `direction` is an optional base-direction hint for paragraphs without a
/// strongly-directional codepoint; the default is auto-detection with an
/// LTR fallback.
///
/// The concatenated `codepoint_count`s of `runs` must cover `text` exactly.
/// Degenerate input never fails: empty text yields one empty paragraph.
pub fn shape_text(
    text: &[char],
    runs: &[StyledRun],
    direction: Option<TextDirection>,
) -> Vec<Paragraph> {
    if text.is_empty() {
        return vec![empty_paragraph(direction)];
    }
    if runs.is_empty() {
        log::trace!("shape_text: no styled runs for non-empty text");
        return vec![empty_paragraph(direction)];
    }
    debug_assert_eq!(
        runs.iter().map(|r| to_usize(r.codepoint_count)).sum::<usize>(),
        text.len(),
        "styled runs must cover the text"
    );

    // The bidi algorithm works on UTF-8; keep a byte → codepoint mapping.
    let mut utf8 = String::with_capacity(text.len());
    let mut byte_starts = Vec::with_capacity(text.len() + 1);
    for &c in text {
        byte_starts.push(utf8.len());
        utf8.push(c);
    }
    byte_starts.push(utf8.len());

    let default_level = direction.map(|dir| match dir {
        TextDirection::Ltr => LTR_LEVEL,
        TextDirection::Rtl => RTL_LEVEL,
    });
    let bidi = BidiInfo::new(&utf8, default_level);

    let mut style_of: Vec<u32> = Vec::with_capacity(text.len());
    for (i, run) in runs.iter().enumerate() {
        debug_assert!(run.codepoint_count > 0, "empty styled run");
        for _ in 0..run.codepoint_count {
            style_of.push(to_u32(i));
        }
    }
    // Under-covering input degrades to the last run's style.
    while style_of.len() < text.len() {
        style_of.push(to_u32(runs.len() - 1));
    }

    let mut paragraphs = Vec::with_capacity(bidi.paragraphs.len());
    for para in &bidi.paragraphs {
        let p_start = byte_starts.partition_point(|&b| b < para.range.start);
        let p_end = byte_starts.partition_point(|&b| b < para.range.end);
        debug_assert!(p_start < p_end);

        let mut glyph_runs: SmallVec<[GlyphRun; 1]> = SmallVec::new();

        let mut sub_start = p_start;
        let mut cur_style = style_of[p_start];
        let mut cur_level = bidi.levels[byte_starts[p_start]];
        // The first codepoint's raw script seeds propagation, even when it
        // is Common/Inherited.
        let mut cur_script = text[p_start].script();

        for i in (p_start + 1)..=p_end {
            let mut boundary = i == p_end;
            let mut next_style = cur_style;
            let mut next_level = cur_level;
            let mut next_script = cur_script;
            if !boundary {
                next_style = style_of[i];
                next_level = bidi.levels[byte_starts[i]];
                let raw = text[i].script();
                let computed = match raw {
                    Script::Common | Script::Inherited => cur_script,
                    other => other,
                };
                if next_style != cur_style {
                    next_script = raw;
                    boundary = true;
                } else {
                    next_script = computed;
                    boundary = next_level != cur_level || computed != cur_script;
                }
                if !boundary {
                    continue;
                }
            }

            shape_sub_run(text, sub_start, i, &runs[to_usize(cur_style)], cur_level, cur_script, &mut glyph_runs);

            sub_start = i;
            cur_style = next_style;
            cur_level = next_level;
            cur_script = next_script;
        }

        // Turn per-run advances into x positions continuing across the
        // paragraph in logical order.
        let mut pos = 0.0;
        for run in &mut glyph_runs {
            run.xpos.reserve(run.advances.len() + 1);
            for &advance in &run.advances {
                run.xpos.push(pos);
                pos += advance;
            }
            run.xpos.push(pos);
        }

        paragraphs.push(Paragraph {
            runs: glyph_runs,
            level: para.level.number(),
        });
    }

    compute_breaks(text, &mut paragraphs);

    // Note: a single run's break table may hold an odd number of entries;
    // only the concatenation across runs is a dense pair list.
    #[cfg(debug_assertions)]
    for paragraph in &paragraphs {
        for run in &paragraph.runs {
            debug_assert_eq!(run.glyphs.len(), run.text_indices.len());
            debug_assert_eq!(run.glyphs.len(), run.advances.len());
            debug_assert_eq!(run.glyphs.len() + 1, run.xpos.len());
        }
    }

    paragraphs
}

fn build_run(
    shaped: Vec<fonts::ShapedGlyph>,
    font: Font,
    styled: &StyledRun,
    text_offset: usize,
    level: u8,
    script: Tag,
) -> GlyphRun {
    let count = shaped.len();
    let mut run = GlyphRun {
        font,
        size: styled.size,
        line_height: styled.line_height,
        letter_spacing: styled.letter_spacing,
        glyphs: Vec::with_capacity(count),
        text_indices: Vec::with_capacity(count),
        advances: Vec::with_capacity(count),
        xpos: Vec::new(),
        offsets: Vec::with_capacity(count),
        breaks: Vec::new(),
        script,
        style_id: styled.style_id,
        level,
    };
    for glyph in shaped {
        run.glyphs.push(glyph.id);
        run.text_indices.push(to_u32(text_offset) + glyph.cluster);
        run.advances.push(glyph.advance + styled.letter_spacing);
        run.offsets.push(glyph.offset);
    }
    run
}

fn subset_run(orig: &GlyphRun, start: usize, end: usize) -> GlyphRun {
    GlyphRun {
        font: orig.font.clone(),
        size: orig.size,
        line_height: orig.line_height,
        letter_spacing: orig.letter_spacing,
        glyphs: orig.glyphs[start..end].to_vec(),
        text_indices: orig.text_indices[start..end].to_vec(),
        advances: orig.advances[start..end].to_vec(),
        xpos: Vec::new(),
        offsets: orig.offsets[start..end].to_vec(),
        breaks: Vec::new(),
        script: orig.script,
        style_id: orig.style_id,
        level: orig.level,
    }
}

fn shape_sub_run(
    text: &[char],
    start: usize,
    end: usize,
    styled: &StyledRun,
    level: Level,
    script: Script,
    out: &mut SmallVec<[GlyphRun; 1]>,
) {
    let script_tag = script_to_tag(script);
    let direction = if level.is_rtl() {
        TextDirection::Rtl
    } else {
        TextDirection::Ltr
    };
    let request = ShapeRequest {
        text: &text[start..end],
        size: styled.size,
        script: script_tag,
        direction,
    };
    let shaped = styled.font.shape_run(&request);
    let run = build_run(shaped, styled.font.clone(), styled, start, level.number(), script_tag);

    let first_missing = run.glyphs.iter().position(|id| id.0 == 0);
    let missing = match first_missing {
        Some(index) if fonts::fallback_enabled() => {
            fonts::fallback_font(text[to_usize(run.text_indices[index])], 0, &styled.font)
        }
        _ => None,
    };
    match missing {
        Some(fallback) => {
            split_with_fallback(text, &run, styled, fallback, script_tag, direction, out)
        }
        // No fallback available: keep the run, tofu included.
        None => {
            if !run.glyphs.is_empty() {
                out.push(run);
            }
        }
    }
}

/// Partition `orig` into alternating mapped/unmapped spans, re-shaping the
/// unmapped spans with `fallback`
fn split_with_fallback(
    text: &[char],
    orig: &GlyphRun,
    styled: &StyledRun,
    fallback: Font,
    script: Tag,
    direction: TextDirection,
    out: &mut SmallVec<[GlyphRun; 1]>,
) {
    let count = orig.glyphs.len();
    let mut start_i = 0;
    while start_i < count {
        let mut end_i = start_i + 1;
        if orig.glyphs[start_i].0 == 0 {
            while end_i < count && orig.glyphs[end_i].0 == 0 {
                end_i += 1;
            }
            let text_start = to_usize(orig.text_indices[start_i]);
            let text_end = to_usize(orig.text_indices[end_i - 1]) + 1;
            let request = ShapeRequest {
                text: &text[text_start..text_end],
                size: styled.size,
                script,
                direction,
            };
            let shaped = fallback.shape_run(&request);
            if !shaped.is_empty() {
                out.push(build_run(
                    shaped,
                    fallback.clone(),
                    styled,
                    text_start,
                    orig.level,
                    script,
                ));
            }
        } else {
            while end_i < count && orig.glyphs[end_i].0 != 0 {
                end_i += 1;
            }
            out.push(subset_run(orig, start_i, end_i));
        }
        start_i = end_i;
    }
}

/// Derive word-break tables from the codepoints
///
/// One scan across all runs: a break index is recorded at every transition
/// between whitespace and non-whitespace, and a forced break is recorded as
/// a zero-length pair at every line feed / line separator. The toggle state
/// deliberately persists across run and paragraph boundaries so that words
/// spanning runs produce one pair whose start and end live in different
/// runs.
fn compute_breaks(text: &[char], paragraphs: &mut [Paragraph]) {
    let mut want_whitespace = false;
    let mut builder: Vec<u32> = Vec::new();
    let mut last: Option<(usize, usize)> = None;

    for p in 0..paragraphs.len() {
        for r in 0..paragraphs[p].runs.len() {
            if let Some((lp, lr)) = last {
                paragraphs[lp].runs[lr].breaks = std::mem::take(&mut builder);
            }
            let run = &paragraphs[p].runs[r];
            for (glyph_index, &offset) in run.text_indices.iter().enumerate() {
                let c = text[to_usize(offset)];
                if is_forced_break(c) {
                    builder.push(to_u32(glyph_index));
                    builder.push(to_u32(glyph_index));
                }
                if want_whitespace == is_whitespace(c) {
                    builder.push(to_u32(glyph_index));
                    want_whitespace = !want_whitespace;
                }
            }
            last = Some((p, r));
        }
    }

    if let Some((lp, lr)) = last {
        let run = &mut paragraphs[lp].runs[lr];
        if want_whitespace {
            // Close the open word at the end of the text.
            builder.push(to_u32(run.glyphs.len()));
        } else {
            // Trailing whitespace: emit a final degenerate word so the pair
            // list stays dense.
            builder.push(builder.last().copied().unwrap_or(0));
            builder.push(to_u32(run.glyphs.len()));
        }
        run.breaks = std::mem::take(&mut builder);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fonts::mock::MockFace;

    pub(crate) fn append_run(
        unichars: &mut Vec<char>,
        font: &Font,
        size: f32,
        text: &str,
    ) -> StyledRun {
        let mut run = StyledRun::new(font.clone(), size);
        for c in text.chars() {
            unichars.push(c);
            run.codepoint_count += 1;
        }
        run
    }

    #[test]
    fn separates_words() {
        let font = MockFace::font();
        let mut unichars = Vec::new();
        let runs = vec![append_run(&mut unichars, &font, 32.0, "one two three")];

        let paragraphs = shape_text(&unichars, &runs, None);
        assert_eq!(paragraphs.len(), 1);
        let paragraph = &paragraphs[0];
        assert_eq!(paragraph.runs.len(), 1);
        assert_eq!(paragraph.runs[0].breaks, [0, 3, 4, 7, 8, 13]);
    }

    #[test]
    fn words_span_styled_runs() {
        let font = MockFace::font();
        let mut unichars = Vec::new();
        let runs = vec![
            append_run(&mut unichars, &font, 32.0, "one two thr"),
            append_run(&mut unichars, &font, 60.0, "ee four"),
        ];

        let paragraphs = shape_text(&unichars, &runs, None);
        assert_eq!(paragraphs.len(), 1);
        let paragraph = &paragraphs[0];
        assert_eq!(paragraph.runs.len(), 2);
        // The word "three" starts in the first run and ends in the second:
        // its pair strides the run boundary.
        assert_eq!(paragraph.runs[0].breaks, [0, 3, 4, 7, 8]);
        assert_eq!(paragraph.runs[1].breaks, [2, 3, 7]);
    }

    #[test]
    fn forced_break_within_run() {
        let font = MockFace::font();
        let mut unichars = Vec::new();
        let runs = vec![
            append_run(&mut unichars, &font, 32.0, "one two thr"),
            append_run(&mut unichars, &font, 60.0, "ee\u{2028} four"),
        ];

        let paragraphs = shape_text(&unichars, &runs, None);
        assert_eq!(paragraphs.len(), 1);
        let paragraph = &paragraphs[0];
        assert_eq!(paragraph.runs.len(), 2);
        assert_eq!(paragraph.runs[0].breaks, [0, 3, 4, 7, 8]);
        assert_eq!(paragraph.runs[1].breaks, [2, 2, 2, 4, 8]);
    }

    #[test]
    fn line_feed_starts_new_paragraph() {
        let font = MockFace::font();
        let mut unichars = Vec::new();
        let runs = vec![append_run(&mut unichars, &font, 32.0, "hi\n ")];

        let paragraphs = shape_text(&unichars, &runs, None);
        assert_eq!(paragraphs.len(), 2);
        // The line feed belongs to the first paragraph; the second starts
        // right after it.
        let tail = &paragraphs[1].runs[0];
        assert_eq!(tail.glyphs.len(), 1);
        assert_eq!(tail.text_indices, [3]);
    }

    #[test]
    fn trailing_line_feed_stays_in_paragraph() {
        let font = MockFace::font();
        let mut unichars = Vec::new();
        let runs = vec![append_run(&mut unichars, &font, 32.0, "hi\n")];

        let paragraphs = shape_text(&unichars, &runs, None);
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].runs[0].glyphs.len(), 3);
    }

    #[test]
    fn line_separator_does_not_split_paragraph() {
        let font = MockFace::font();
        let mut unichars = Vec::new();
        let runs = vec![append_run(
            &mut unichars,
            &font,
            32.0,
            "hello look\u{2028}here\nsecond paragraph",
        )];

        let paragraphs = shape_text(&unichars, &runs, None);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].base_direction(), TextDirection::Ltr);
        assert_eq!(paragraphs[1].base_direction(), TextDirection::Ltr);
    }

    #[test]
    fn bidi_splits_sub_runs() {
        let font = MockFace::font();
        let mut unichars = Vec::new();
        let runs = vec![append_run(&mut unichars, &font, 16.0, "abc אבג def")];

        let paragraphs = shape_text(&unichars, &runs, None);
        assert_eq!(paragraphs.len(), 1);
        let paragraph = &paragraphs[0];
        assert_eq!(paragraph.base_direction(), TextDirection::Ltr);
        // "abc " / "אבג" / the neutral space rejoining the base level / "def"
        assert_eq!(paragraph.runs.len(), 4);
        assert_eq!(paragraph.runs[0].direction(), TextDirection::Ltr);
        assert_eq!(paragraph.runs[1].direction(), TextDirection::Rtl);
        assert_eq!(paragraph.runs[2].direction(), TextDirection::Ltr);
        assert_eq!(paragraph.runs[3].direction(), TextDirection::Ltr);
        assert_eq!(paragraph.runs[1].text_indices, [4, 5, 6]);
        // Logical storage: indices ascend in every run.
        for run in &paragraph.runs {
            assert!(run.text_indices.windows(2).all(|w| w[0] < w[1]));
        }
        assert_eq!(paragraph.runs[1].script, Tag::from_bytes(b"Hebr"));
    }

    #[test]
    fn rtl_base_direction_detected() {
        let font = MockFace::font();
        let mut unichars = Vec::new();
        let runs = vec![append_run(&mut unichars, &font, 32.0, "לםפ ABC DEF")];

        let paragraphs = shape_text(&unichars, &runs, None);
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].base_direction(), TextDirection::Rtl);
    }

    #[test]
    fn direction_hint_applies_to_neutral_text() {
        let font = MockFace::font();
        let mut unichars = Vec::new();
        let runs = vec![append_run(&mut unichars, &font, 32.0, "123 456")];

        let auto = shape_text(&unichars, &runs, None);
        assert_eq!(auto[0].base_direction(), TextDirection::Ltr);
        let rtl = shape_text(&unichars, &runs, Some(TextDirection::Rtl));
        assert_eq!(rtl[0].base_direction(), TextDirection::Rtl);
    }

    #[test]
    fn xpos_is_prefix_sum_of_advances() {
        let font = MockFace::font();
        let mut unichars = Vec::new();
        let mut run = append_run(&mut unichars, &font, 20.0, "abc אבג def");
        run.letter_spacing = 1.5;
        let runs = vec![run];

        let paragraphs = shape_text(&unichars, &runs, None);
        let mut pos = 0.0;
        for run in &paragraphs[0].runs {
            assert_eq!(run.xpos[0], pos);
            for (i, &advance) in run.advances.iter().enumerate() {
                assert!((run.xpos[i + 1] - run.xpos[i] - advance).abs() < 1e-4);
            }
            pos = *run.xpos.last().unwrap();
        }
        let total: f32 = paragraphs[0]
            .runs
            .iter()
            .flat_map(|run| run.advances.iter())
            .sum();
        assert!((pos - total).abs() < 1e-3);
        // Letter spacing is folded into every advance.
        assert!((paragraphs[0].runs[0].advances[0] - (0.5 * 20.0 + 1.5)).abs() < 1e-4);
    }

    #[test]
    fn ligature_merges_clusters() {
        let font = MockFace::font_with(|face| face.ligatures = true);
        let mut unichars = Vec::new();
        let runs = vec![append_run(&mut unichars, &font, 16.0, "fish")];

        let paragraphs = shape_text(&unichars, &runs, None);
        let run = &paragraphs[0].runs[0];
        assert_eq!(run.glyphs.len(), 3);
        assert_eq!(run.text_indices, [0, 2, 3]);
    }

    #[test]
    fn empty_input_yields_one_empty_paragraph() {
        let paragraphs = shape_text(&[], &[], None);
        assert_eq!(paragraphs.len(), 1);
        assert!(paragraphs[0].runs.is_empty());
        assert_eq!(paragraphs[0].base_direction(), TextDirection::Ltr);
    }

    fn substitute(_missing: char, _index: u32, _parent: &Font) -> Option<Font> {
        Some(MockFace::font())
    }

    #[test]
    fn fallback_splits_runs_and_tofu_survives_without_it() {
        let font = MockFace::font_with(|face| face.missing = vec!['x']);
        let mut unichars = Vec::new();
        let runs = vec![append_run(&mut unichars, &font, 16.0, "axc")];

        // Without a hook the zero glyph is kept in place.
        let paragraphs = shape_text(&unichars, &runs, None);
        assert_eq!(paragraphs[0].runs.len(), 1);
        assert_eq!(paragraphs[0].runs[0].glyphs[1], GlyphId(0));

        fonts::set_fallback_font(Some(substitute));
        let paragraphs = shape_text(&unichars, &runs, None);
        fonts::set_fallback_font(None);

        let runs = &paragraphs[0].runs;
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].text_indices, [0]);
        assert_eq!(runs[1].text_indices, [1]);
        assert_eq!(runs[2].text_indices, [2]);
        assert!(runs.iter().all(|run| run.glyphs.iter().all(|g| g.0 != 0)));
        assert_ne!(runs[1].font, font);
        assert_eq!(runs[0].font, font);
        // The fallback run still lines up in the paragraph's x positions.
        assert_eq!(runs[1].xpos[0], *runs[0].xpos.last().unwrap());
    }
}
