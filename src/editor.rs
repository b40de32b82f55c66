// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Interactive text input
//!
//! [`Editor`] owns a mutable codepoint buffer, a cursor, an undo/redo
//! journal and a cached [`ShapedText`]. Commands mark dirty flags;
//! [`Editor::update`] re-runs exactly the stages the flags require and
//! rebuilds the output paths (text, selected text, caret, selection fill,
//! optional clip rectangle) for the renderer.
//!
//! The buffer always ends in a zero-width-space sentinel that is not part
//! of the logical text: it gives the caret a glyph to sit on past the last
//! visible character, including on an empty input.

use crate::conv::{to_u32, to_usize};
use crate::fonts::Font;
use crate::shape::{is_whitespace, LayoutOptions, ShapedText, StyledRun};
use crate::{
    Cursor, CursorPosition, Path, Rect, TextAlign, TextOrigin, TextOverflow, TextSizing,
    TextWrap, Vec2, VisualPosition,
};

const SENTINEL: char = '\u{200B}';
const CARET_WIDTH: f32 = 1.0;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Flags: u8 {
        const SHAPE_DIRTY = 1 << 0;
        const SELECTION_DIRTY = 1 << 1;
        const SEPARATE_SELECTION_TEXT = 1 << 2;
        const MEASURE_DIRTY = 1 << 3;
    }
}

bitflags::bitflags! {
    /// Codepoint category used for word and sub-word navigation
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Delineator: u8 {
        const LOWERCASE = 1 << 0;
        const UPPERCASE = 1 << 1;
        const SYMBOL = 1 << 2;
        const UNDERSCORE = 1 << 3;
        const WHITESPACE = 1 << 4;
        /// Anything that belongs to a word
        const WORD = Self::LOWERCASE.bits() | Self::UPPERCASE.bits() | Self::UNDERSCORE.bits();
    }
}

/// Granularity of horizontal cursor movement
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorBoundary {
    #[default]
    Character,
    Word,
    /// Word movement that also stops at case transitions
    SubWord,
    Line,
}

struct JournalEntry {
    cursor_from: Cursor,
    cursor_to: Cursor,
    text: String,
}

/// A mutable, shapeable, renderable text input
pub struct Editor {
    text: Vec<char>,
    cursor: Cursor,
    run: StyledRun,

    shape: ShapedText,
    measuring_shape: Option<ShapedText>,
    last_measure_max_width: f32,
    last_measure_max_height: f32,
    measured_bounds: Rect,
    #[cfg(test)]
    measure_count: u32,

    text_path: Path,
    selected_text_path: Path,
    cursor_path: Path,
    selection_path: Path,
    clip_path: Option<Path>,

    flags: Flags,
    sizing: TextSizing,
    overflow: TextOverflow,
    origin: TextOrigin,
    align: TextAlign,
    wrap: TextWrap,
    max_width: f32,
    max_height: f32,
    paragraph_spacing: f32,
    selection_corner_radius: f32,

    ideal_cursor_x: Option<f32>,
    cursor_visual_position: Option<VisualPosition>,
    selection_rects: Vec<Rect>,

    journal: Vec<JournalEntry>,
    journal_index: usize,
}

impl Editor {
    /// Construct an empty input using `font` at size 16
    pub fn new(font: Font) -> Self {
        Editor {
            text: vec![SENTINEL],
            cursor: Cursor::at_start(),
            run: StyledRun::new(font, 16.0),
            shape: ShapedText::new(),
            measuring_shape: None,
            last_measure_max_width: 0.0,
            last_measure_max_height: 0.0,
            measured_bounds: Rect::ZERO,
            #[cfg(test)]
            measure_count: 0,
            text_path: Path::new(),
            selected_text_path: Path::new(),
            cursor_path: Path::new(),
            selection_path: Path::new(),
            clip_path: None,
            flags: Flags::SHAPE_DIRTY | Flags::SELECTION_DIRTY | Flags::MEASURE_DIRTY,
            sizing: TextSizing::AutoWidth,
            overflow: TextOverflow::Visible,
            origin: TextOrigin::Top,
            align: TextAlign::Left,
            wrap: TextWrap::Wrap,
            max_width: 0.0,
            max_height: 0.0,
            paragraph_spacing: 0.0,
            selection_corner_radius: 5.0,
            ideal_cursor_x: None,
            cursor_visual_position: None,
            selection_rects: Vec::new(),
            journal: Vec::new(),
            journal_index: 0,
        }
    }

    /// Logical length in codepoints, excluding the sentinel
    pub fn len(&self) -> usize {
        self.text.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.text.len() <= 1
    }

    /// The logical text, without the sentinel
    pub fn text(&self) -> String {
        self.text[..self.text.len() - 1].iter().collect()
    }

    /// Replace the whole text, collapsing the cursor to the start
    pub fn set_text(&mut self, value: &str) {
        let starting_cursor = self.cursor;
        self.set_text_internal(value);
        self.cursor = Cursor::collapsed(CursorPosition::zero());
        self.flag_mutation();
        self.capture_journal_entry(starting_cursor);
    }

    fn set_text_internal(&mut self, value: &str) {
        self.text.clear();
        self.text.extend(value.chars());
        self.text.push(SENTINEL);
    }

    fn flag_mutation(&mut self) {
        self.flag(Flags::SHAPE_DIRTY | Flags::SELECTION_DIRTY | Flags::MEASURE_DIRTY);
    }

    /// Insert a single codepoint at the cursor, replacing any selection
    pub fn insert_char(&mut self, codepoint: char) {
        let starting_cursor = self.cursor;
        self.erase_selection();
        let index =
            to_usize(self.cursor.start().codepoint_index()).min(self.text.len() - 1);
        self.text.insert(index, codepoint);
        self.cursor = Cursor::collapsed(CursorPosition::unresolved(to_u32(index) + 1));
        self.flag_mutation();
        self.capture_journal_entry(starting_cursor);
    }

    /// Insert a string at the cursor, replacing any selection
    pub fn insert(&mut self, text: &str) {
        let starting_cursor = self.cursor;
        self.erase_selection();
        let mut index =
            to_usize(self.cursor.start().codepoint_index()).min(self.text.len() - 1);
        for c in text.chars() {
            self.text.insert(index, c);
            index += 1;
        }
        self.cursor = Cursor::collapsed(CursorPosition::unresolved(to_u32(index)));
        self.flag_mutation();
        self.capture_journal_entry(starting_cursor);
    }

    /// Delete the selected range, collapsing the cursor to its start
    pub fn erase(&mut self) {
        let starting_cursor = self.cursor;
        if !self.cursor.has_selection() {
            return;
        }
        self.erase_selection();
        self.capture_journal_entry(starting_cursor);
    }

    fn erase_selection(&mut self) {
        self.ideal_cursor_x = None;
        if self.cursor.is_collapsed() {
            return;
        }
        let last = to_usize(self.cursor.last().codepoint_index()).min(self.len());
        let first = to_usize(self.cursor.first().codepoint_index()).min(last);
        self.text.drain(first..last);
        self.cursor = Cursor::collapsed(CursorPosition::unresolved(to_u32(first)));
        self.flag_mutation();
    }

    /// Delete one codepoint left (`direction < 0`) or right of the cursor,
    /// or the selection if one exists
    pub fn backspace(&mut self, direction: i32) {
        let starting_cursor = self.cursor;
        if self.cursor.has_selection() {
            self.erase_selection();
            self.capture_journal_entry(starting_cursor);
            return;
        }
        self.ideal_cursor_x = None;

        let offset = if direction >= 0 { 0 } else { -1 };
        if direction < 0 && self.cursor.first().codepoint_index() == 0 {
            return;
        }
        let index = to_usize(self.cursor.first().codepoint_index_offset(offset));
        if index >= self.text.len() - 1 {
            // Nothing right of the caret but the sentinel.
            return;
        }
        self.text.remove(index);
        self.cursor = Cursor::collapsed(CursorPosition::unresolved(to_u32(index)));
        self.flag_mutation();
        self.capture_journal_entry(starting_cursor);
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn set_cursor(&mut self, value: Cursor) {
        if self.cursor == value {
            return;
        }
        self.cursor = value;
        self.flag(Flags::SELECTION_DIRTY);
    }

    /// Expand the cursor to the word at its start position
    ///
    /// On a non-word codepoint the position immediately left is tried
    /// first, accommodating clicks on a word's right edge.
    pub fn select_word(&mut self) {
        let mut search = self.cursor.start();
        let mut classification = self.classify_at(search);
        if !classification.intersects(Delineator::WORD) {
            let previous = search.offset(-1);
            let previous_classification = self.classify_at(previous);
            if previous_classification.intersects(Delineator::WORD) {
                search = previous;
                classification = previous_classification;
            }
        }

        // Any of upper/lower/underscore counts as the same word.
        if classification.intersects(Delineator::WORD) {
            classification = Delineator::WORD;
        }
        let start = self.find_position(!classification, search, -1);
        let end = self.find_position(!classification, search, 1).offset(1);

        self.cursor = Cursor::new(start, end);
        self.flag(Flags::SELECTION_DIRTY);
    }

    /// Place (or extend) the cursor at a 2D point in layout space
    pub fn move_cursor_to(&mut self, translation: Vec2, select: bool) {
        self.ideal_cursor_x = None;
        let position = CursorPosition::from_translation(translation, &self.shape);
        self.apply_cursor_move(position, select);
    }

    pub fn cursor_left(&mut self, boundary: CursorBoundary, select: bool) {
        self.cursor_horizontal(-1, boundary, select);
    }

    pub fn cursor_right(&mut self, boundary: CursorBoundary, select: bool) {
        self.cursor_horizontal(1, boundary, select);
    }

    /// Move to the previous line, keeping the sticky ideal x
    pub fn cursor_up(&mut self, select: bool) {
        let ideal = self.take_ideal_x();
        let position = match self.cursor.end().line_index() {
            Some(line) if line > 0 => CursorPosition::from_line_x(line - 1, ideal, &self.shape),
            _ => CursorPosition::zero(),
        };
        self.apply_cursor_move(position, select);
    }

    /// Move to the next line, keeping the sticky ideal x
    pub fn cursor_down(&mut self, select: bool) {
        let ideal = self.take_ideal_x();
        let next_line = self
            .cursor
            .end()
            .line_index()
            .map(|line| line + 1)
            .unwrap_or(0);
        let line_count = self.shape.line_count();
        let position = if line_count != 0 && self.text.len() > 1 && next_line >= line_count {
            CursorPosition::new(line_count - 1, to_u32(self.text.len() - 1))
        } else {
            CursorPosition::from_line_x(next_line, ideal, &self.shape)
        };
        self.apply_cursor_move(position, select);
    }

    fn take_ideal_x(&mut self) -> f32 {
        if self.ideal_cursor_x.is_none() {
            self.ideal_cursor_x = Some(
                self.cursor_visual_position
                    .map(|visual| visual.x)
                    .unwrap_or(0.0),
            );
        }
        self.ideal_cursor_x.unwrap()
    }

    fn apply_cursor_move(&mut self, position: CursorPosition, select: bool) {
        self.cursor = if select {
            Cursor::new(self.cursor.start(), position)
        } else {
            Cursor::collapsed(position)
        };
        self.flag(Flags::SELECTION_DIRTY);
    }

    fn cursor_horizontal(&mut self, offset: i32, boundary: CursorBoundary, select: bool) {
        self.ideal_cursor_x = None;
        let end = self.cursor.end();
        let mut position = end;

        match boundary {
            CursorBoundary::Character => {
                position =
                    CursorPosition::at_index(end.codepoint_index_offset(offset), &self.shape);
            }
            CursorBoundary::Line => {
                if let Some(line_index) = end.line_index() {
                    if to_usize(line_index) < self.shape.ordered_lines().len() {
                        let codepoint_index = if offset < 0 {
                            self.shape.line_first_codepoint_index(to_usize(line_index))
                        } else {
                            self.shape.line_last_codepoint_index(to_usize(line_index))
                        };
                        position = CursorPosition::new(line_index, codepoint_index);
                    }
                }
            }
            CursorBoundary::Word | CursorBoundary::SubWord => {
                let mut classification =
                    self.classify_at(position.offset(if offset < 0 { -1 } else { 0 }));

                if classification == Delineator::WHITESPACE
                    || classification == Delineator::UNDERSCORE
                {
                    classification = self.find(!classification, &mut position, offset);
                }

                if classification == Delineator::SYMBOL {
                    self.find(!classification, &mut position, offset);
                } else if classification == Delineator::LOWERCASE {
                    if boundary == CursorBoundary::SubWord {
                        let non_lowercase =
                            self.find(!Delineator::LOWERCASE, &mut position, offset);
                        if offset == -1 && non_lowercase == Delineator::UPPERCASE {
                            // Stop after the capital that opens the
                            // sub-word.
                            position = position.offset(-1);
                        }
                    } else {
                        self.find(!Delineator::WORD, &mut position, offset);
                    }
                } else if classification == Delineator::UPPERCASE {
                    if boundary == CursorBoundary::SubWord {
                        let start_position = position;
                        let non_uppercase =
                            self.find(!Delineator::UPPERCASE, &mut position, offset);
                        if offset == 1 && non_uppercase == Delineator::LOWERCASE {
                            position = position.offset(-1);
                            if position.codepoint_index() == start_position.codepoint_index() {
                                self.find(!Delineator::LOWERCASE, &mut position, offset);
                            }
                        }
                    } else {
                        self.find(!Delineator::WORD, &mut position, offset);
                    }
                } else {
                    self.find(!classification, &mut position, offset);
                }
            }
        }

        self.apply_cursor_move(position, select);
    }

    /// Classify a single codepoint
    pub fn classify(codepoint: char) -> Delineator {
        if is_whitespace(codepoint) {
            return Delineator::WHITESPACE;
        }
        if codepoint == '_' {
            return Delineator::UNDERSCORE;
        }
        let value = codepoint as u32;
        if value < 0x30
            || (0x3A..=0x40).contains(&value)
            || (0x5B..=0x60).contains(&value)
            || (0x7B..=0x7F).contains(&value)
        {
            return Delineator::SYMBOL;
        }
        if (0x41..=0x5A).contains(&value) {
            return Delineator::UPPERCASE;
        }
        // Deliberately broad: non-ASCII letters navigate like lowercase.
        Delineator::LOWERCASE
    }

    fn classify_at(&self, position: CursorPosition) -> Delineator {
        let index = to_usize(position.codepoint_index());
        if self.is_empty() || index >= self.text.len() - 1 {
            return Delineator::WHITESPACE;
        }
        Self::classify(self.text[index])
    }

    /// Advance `position` until a codepoint in `mask` is found
    ///
    /// Returns the classification at the stop point; `position` ends on the
    /// boundary. Bounded by the start and end of the text.
    fn find(&self, mask: Delineator, position: &mut CursorPosition, direction: i32) -> Delineator {
        let mut last_classification = Delineator::empty();
        loop {
            let next = position.offset(direction);
            if next.codepoint_index() == position.codepoint_index()
                || to_usize(next.codepoint_index()) > self.len()
            {
                break;
            }
            *position = next;
            last_classification =
                self.classify_at(next.offset(if direction < 0 { -1 } else { 0 }));
            if last_classification.intersects(mask) {
                break;
            }
        }
        last_classification
    }

    /// Like [`Editor::find`] but stops *before* the boundary codepoint
    fn find_position(
        &self,
        mask: Delineator,
        position: CursorPosition,
        direction: i32,
    ) -> CursorPosition {
        let mut result = position;
        loop {
            let next = result.offset(direction);
            if next.codepoint_index() == result.codepoint_index()
                || to_usize(next.codepoint_index()) >= self.len()
            {
                break;
            }
            if self.classify_at(next).intersects(mask) {
                break;
            }
            result = next;
        }
        result
    }

    /// Step the journal backwards
    pub fn undo(&mut self) {
        if self.journal.is_empty() || self.journal_index == 0 {
            return;
        }
        let cursor = self.journal[self.journal_index].cursor_from;
        let text = self.journal[self.journal_index - 1].text.clone();
        self.set_text_internal(&text);
        self.cursor = cursor;
        self.journal_index -= 1;
        self.flag_mutation();
    }

    /// Step the journal forwards
    pub fn redo(&mut self) {
        if self.journal.is_empty() || self.journal_index + 1 >= self.journal.len() {
            return;
        }
        let cursor = self.journal[self.journal_index + 1].cursor_to;
        let text = self.journal[self.journal_index + 1].text.clone();
        self.set_text_internal(&text);
        self.cursor = cursor;
        self.journal_index += 1;
        self.flag_mutation();
    }

    fn capture_journal_entry(&mut self, cursor_from: Cursor) {
        if self.journal_index + 1 < self.journal.len() {
            self.journal.truncate(self.journal_index + 1);
        }
        self.journal.push(JournalEntry {
            cursor_from,
            cursor_to: self.cursor,
            text: self.text(),
        });
        self.journal_index = self.journal.len() - 1;
    }

    fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            sizing: self.sizing,
            max_width: self.max_width,
            max_height: self.max_height,
            align: self.align,
            wrap: self.wrap,
            origin: self.origin,
            overflow: self.overflow,
            paragraph_spacing: self.paragraph_spacing,
        }
    }

    /// Re-run the dirty pipeline stages; returns true if anything changed
    ///
    /// Shape-dirty re-shapes and rebuilds the text paths; selection-dirty
    /// resolves cursor lines, recomputes the caret and rebuilds the
    /// selection geometry. Calling this twice in a row is a no-op.
    pub fn update(&mut self) -> bool {
        let mut updated = false;
        let mut update_text_path = false;

        if self.unflag(Flags::SHAPE_DIRTY) {
            updated = true;
            self.run.codepoint_count = to_u32(self.text.len());
            let run = self.run.clone();
            let options = self.layout_options();
            self.shape.shape(&self.text, std::slice::from_ref(&run), &options);
            update_text_path = true;
        }

        if self.unflag(Flags::SELECTION_DIRTY) {
            updated = true;
            if self.flagged(Flags::SEPARATE_SELECTION_TEXT) {
                update_text_path = true;
            }

            let mut cursor = self.cursor;
            cursor.resolve_line_positions(&self.shape);
            self.cursor = cursor;

            self.cursor_visual_position = self.cursor.end().visual_position(&self.shape);

            self.selection_rects.clear();
            let cursor = self.cursor;
            cursor.selection_rects(&self.shape, &mut self.selection_rects);
            self.rebuild_selection_path();
            self.rebuild_cursor_path();
        }

        if update_text_path {
            self.build_text_paths();
        }
        updated
    }

    fn rebuild_cursor_path(&mut self) {
        self.cursor_path.clear();
        if let Some(visual) = self.cursor_visual_position {
            self.cursor_path.push_rect(Rect::new(
                visual.x,
                visual.top,
                visual.x + CARET_WIDTH,
                visual.bottom,
            ));
        }
    }

    fn rebuild_selection_path(&mut self) {
        self.selection_path.clear();
        let radius = self.selection_corner_radius;
        let mut path = std::mem::take(&mut self.selection_path);
        for rect in &self.selection_rects {
            path.push_rounded_rect(*rect, radius);
        }
        self.selection_path = path;
    }

    fn build_text_paths(&mut self) {
        let want_separate = self.flagged(Flags::SEPARATE_SELECTION_TEXT);
        let mut text_path = std::mem::take(&mut self.text_path);
        let mut selected_path = std::mem::take(&mut self.selected_text_path);
        text_path.clear();
        selected_path.clear();

        if !self.shape.has_valid_bounds() {
            self.clip_path = None;
            self.text_path = text_path;
            self.selected_text_path = selected_path;
            return;
        }

        self.clip_path = if self.overflow == TextOverflow::Clipped {
            let mut clip = Path::new();
            clip.push_rect(self.shape.bounds());
            Some(clip)
        } else {
            None
        };

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
                    // The shape stage decided to clip at this line count.
                    break 'lines;
                }
                let ordered = &ordered_lines[line_index];
                let mut x = line.start_x;
                let render_y = y + line.baseline;
                for (run, glyph) in self.shape.line_glyphs(ordered) {
                    let offset = run.offsets[glyph];
                    let advance = run.advances[glyph];
                    let outline = run.font.glyph_path(run.glyphs[glyph]);
                    let target = if want_separate
                        && self.cursor.contains(run.text_indices[glyph])
                    {
                        &mut selected_path
                    } else {
                        &mut text_path
                    };
                    target.append_scaled(
                        &outline,
                        run.size,
                        Vec2(x + offset.0, render_y + offset.1),
                    );
                    x += advance;
                }
                line_index += 1;
            }
            if let Some(last) = lines.last() {
                y += last.bottom;
            }
            y += self.paragraph_spacing;
        }

        self.text_path = text_path;
        self.selected_text_path = selected_path;
    }

    /// Measure the text under the given constraints, bypassing the active
    /// sizing mode
    ///
    /// Negative `max_width` measures without wrapping. The result is cached
    /// until the text or a shape-affecting property changes.
    pub fn measure(&mut self, max_width: f32, max_height: f32) -> Rect {
        let dirty = self.unflag(Flags::MEASURE_DIRTY);
        if !dirty
            && self.measuring_shape.is_some()
            && self.last_measure_max_width == max_width
            && self.last_measure_max_height == max_height
        {
            return self.measured_bounds;
        }
        #[cfg(test)]
        {
            self.measure_count += 1;
        }
        self.last_measure_max_width = max_width;
        self.last_measure_max_height = max_height;

        let mut run = self.run.clone();
        run.codepoint_count = to_u32(self.text.len());
        let options = LayoutOptions {
            sizing: if max_width < 0.0 {
                TextSizing::AutoWidth
            } else {
                TextSizing::AutoHeight
            },
            max_width,
            max_height,
            overflow: TextOverflow::Visible,
            ..self.layout_options()
        };
        let shape = self.measuring_shape.get_or_insert_with(ShapedText::new);
        shape.shape(&self.text, std::slice::from_ref(&run), &options);
        self.measured_bounds = shape.bounds();
        self.measured_bounds
    }

    /// Layout bounds of the last [`Editor::update`]
    pub fn bounds(&self) -> Rect {
        self.shape.bounds()
    }

    pub fn shape(&self) -> &ShapedText {
        &self.shape
    }

    /// Caret geometry of the cursor's moving edge, if resolvable
    pub fn cursor_visual_position(&self) -> Option<VisualPosition> {
        self.cursor_visual_position
    }

    /// Caret geometry for an arbitrary position
    pub fn visual_position_of(&self, position: CursorPosition) -> Option<VisualPosition> {
        position.visual_position(&self.shape)
    }

    /// Outline path of all (unselected) glyphs
    pub fn text_path(&self) -> &Path {
        &self.text_path
    }

    /// Outline path of selected glyphs (only with separate selection text)
    pub fn selected_text_path(&self) -> &Path {
        &self.selected_text_path
    }

    /// One-unit-wide caret rectangle
    pub fn cursor_path(&self) -> &Path {
        &self.cursor_path
    }

    /// Rounded selection-fill path
    pub fn selection_path(&self) -> &Path {
        &self.selection_path
    }

    /// Bounds rectangle to clip with, present iff overflow is `Clipped`
    pub fn clip_path(&self) -> Option<&Path> {
        self.clip_path.as_ref()
    }

    pub fn selection_rects(&self) -> &[Rect] {
        &self.selection_rects
    }

    pub fn font(&self) -> &Font {
        &self.run.font
    }

    pub fn set_font(&mut self, value: Font) {
        if self.run.font == value {
            return;
        }
        self.run.font = value;
        self.flag_mutation();
    }

    pub fn font_size(&self) -> f32 {
        self.run.size
    }

    pub fn set_font_size(&mut self, value: f32) {
        if self.run.size == value {
            return;
        }
        self.run.size = value;
        self.flag_mutation();
    }

    pub fn line_height(&self) -> f32 {
        self.run.line_height
    }

    pub fn set_line_height(&mut self, value: f32) {
        if self.run.line_height == value {
            return;
        }
        self.run.line_height = value;
        self.flag_mutation();
    }

    pub fn letter_spacing(&self) -> f32 {
        self.run.letter_spacing
    }

    pub fn set_letter_spacing(&mut self, value: f32) {
        if self.run.letter_spacing == value {
            return;
        }
        self.run.letter_spacing = value;
        self.flag_mutation();
    }

    pub fn max_width(&self) -> f32 {
        self.max_width
    }

    pub fn set_max_width(&mut self, value: f32) {
        if self.max_width == value {
            return;
        }
        self.max_width = value;
        self.flag_mutation();
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    pub fn set_max_height(&mut self, value: f32) {
        if self.max_height == value {
            return;
        }
        self.max_height = value;
        self.flag_mutation();
    }

    pub fn sizing(&self) -> TextSizing {
        self.sizing
    }

    pub fn set_sizing(&mut self, value: TextSizing) {
        if self.sizing == value {
            return;
        }
        self.sizing = value;
        self.flag_mutation();
    }

    pub fn overflow(&self) -> TextOverflow {
        self.overflow
    }

    pub fn set_overflow(&mut self, value: TextOverflow) {
        if self.overflow == value {
            return;
        }
        self.overflow = value;
        self.flag_mutation();
    }

    pub fn align(&self) -> TextAlign {
        self.align
    }

    pub fn set_align(&mut self, value: TextAlign) {
        if self.align == value {
            return;
        }
        self.align = value;
        self.flag_mutation();
    }

    pub fn wrap(&self) -> TextWrap {
        self.wrap
    }

    pub fn set_wrap(&mut self, value: TextWrap) {
        if self.wrap == value {
            return;
        }
        self.wrap = value;
        self.flag_mutation();
    }

    pub fn origin(&self) -> TextOrigin {
        self.origin
    }

    pub fn set_origin(&mut self, value: TextOrigin) {
        if self.origin == value {
            return;
        }
        self.origin = value;
        self.flag_mutation();
    }

    pub fn paragraph_spacing(&self) -> f32 {
        self.paragraph_spacing
    }

    pub fn set_paragraph_spacing(&mut self, value: f32) {
        if self.paragraph_spacing == value {
            return;
        }
        self.paragraph_spacing = value;
        self.flag_mutation();
    }

    pub fn selection_corner_radius(&self) -> f32 {
        self.selection_corner_radius
    }

    pub fn set_selection_corner_radius(&mut self, value: f32) {
        if self.selection_corner_radius == value {
            return;
        }
        self.selection_corner_radius = value;
        self.flag(Flags::SELECTION_DIRTY);
    }

    pub fn separate_selection_text(&self) -> bool {
        self.flagged(Flags::SEPARATE_SELECTION_TEXT)
    }

    /// Route selected glyph outlines to [`Editor::selected_text_path`]
    pub fn set_separate_selection_text(&mut self, value: bool) {
        if value == self.separate_selection_text() {
            return;
        }
        if value {
            self.flag(Flags::SEPARATE_SELECTION_TEXT);
        } else {
            self.flags.remove(Flags::SEPARATE_SELECTION_TEXT);
        }
        self.flag(Flags::SELECTION_DIRTY);
    }

    fn flag(&mut self, mask: Flags) {
        self.flags.insert(mask);
    }

    fn flagged(&self, mask: Flags) -> bool {
        self.flags.intersects(mask)
    }

    fn unflag(&mut self, mask: Flags) -> bool {
        if self.flags.intersects(mask) {
            self.flags.remove(mask);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fonts::mock::MockFace;

    fn editor(text: &str) -> Editor {
        let mut editor = Editor::new(MockFace::font());
        editor.set_text(text);
        editor.update();
        editor
    }

    fn collapsed_at(index: u32) -> Cursor {
        Cursor::collapsed(CursorPosition::unresolved(index))
    }

    #[test]
    fn buffer_keeps_trailing_sentinel() {
        let mut editor = editor("ab");
        assert_eq!(editor.text.last(), Some(&SENTINEL));
        assert_eq!(editor.len(), 2);

        editor.insert("cd");
        assert_eq!(editor.text.last(), Some(&SENTINEL));
        editor.backspace(-1);
        assert_eq!(editor.text.last(), Some(&SENTINEL));
        editor.set_text("");
        assert_eq!(editor.text, [SENTINEL]);
        assert!(editor.is_empty());
        assert_eq!(editor.len(), 0);
    }

    #[test]
    fn insert_replaces_selection() {
        let mut editor = editor("hello world");
        editor.set_cursor(Cursor::new(
            CursorPosition::unresolved(0),
            CursorPosition::unresolved(5),
        ));
        editor.insert("bye");
        assert_eq!(editor.text(), "bye world");
        assert_eq!(editor.cursor().end().codepoint_index(), 3);
        assert!(editor.cursor().is_collapsed());
    }

    #[test]
    fn backspace_directions() {
        let mut editor = editor("abc");
        editor.set_cursor(collapsed_at(2));
        editor.backspace(-1);
        assert_eq!(editor.text(), "ac");
        assert_eq!(editor.cursor().start().codepoint_index(), 1);

        editor.backspace(1);
        assert_eq!(editor.text(), "a");

        // Forward delete at the end only sees the sentinel.
        editor.set_cursor(collapsed_at(1));
        editor.backspace(1);
        assert_eq!(editor.text(), "a");

        // Backspace at the start is a no-op.
        editor.set_cursor(collapsed_at(0));
        editor.backspace(-1);
        assert_eq!(editor.text(), "a");
    }

    #[test]
    fn erase_removes_selection_and_journals() {
        let mut editor = editor("hello");
        editor.set_cursor(Cursor::new(
            CursorPosition::unresolved(1),
            CursorPosition::unresolved(4),
        ));
        editor.erase();
        assert_eq!(editor.text(), "ho");
        assert!(editor.cursor().is_collapsed());
        assert_eq!(editor.cursor().start().codepoint_index(), 1);
        editor.undo();
        assert_eq!(editor.text(), "hello");
    }

    #[test]
    fn journal_replays_edit_history() {
        let mut editor = editor("oneTwo");
        editor.set_cursor(collapsed_at(3));
        editor.insert(" ");
        assert_eq!(editor.text(), "one Two");
        assert_eq!(editor.cursor().end().codepoint_index(), 4);
        editor.insert("2");
        assert_eq!(editor.text(), "one 2Two");
        editor.insert(" ");
        assert_eq!(editor.text(), "one 2 Two");
        assert_eq!(editor.cursor().end().codepoint_index(), 6);

        editor.undo();
        assert_eq!(editor.text(), "one 2Two");
        assert_eq!(editor.cursor().end().codepoint_index(), 5);
        editor.undo();
        assert_eq!(editor.text(), "one Two");
        assert_eq!(editor.cursor().end().codepoint_index(), 4);
        editor.undo();
        assert_eq!(editor.text(), "oneTwo");
        assert_eq!(editor.cursor().end().codepoint_index(), 3);

        editor.redo();
        assert_eq!(editor.text(), "one Two");
        assert_eq!(editor.cursor().end().codepoint_index(), 4);

        // A new edit truncates the redo branch.
        editor.insert("X");
        assert_eq!(editor.text(), "one XTwo");
        editor.redo();
        assert_eq!(editor.text(), "one XTwo");
        editor.undo();
        assert_eq!(editor.text(), "one Two");
        assert_eq!(editor.cursor().end().codepoint_index(), 4);
    }

    #[test]
    fn undo_and_redo_round_trip() {
        let mut editor = editor("base");
        editor.set_cursor(collapsed_at(4));
        editor.insert(" plus");
        editor.backspace(-1);
        editor.insert_char('!');
        let final_text = editor.text();

        for _ in 0..3 {
            editor.undo();
        }
        assert_eq!(editor.text(), "base");
        for _ in 0..3 {
            editor.redo();
        }
        assert_eq!(editor.text(), final_text);
    }

    #[test]
    fn undo_on_fresh_editor_is_noop() {
        let mut editor = Editor::new(MockFace::font());
        editor.undo();
        editor.redo();
        assert_eq!(editor.text(), "");
    }

    #[test]
    fn classify_table() {
        assert_eq!(Editor::classify(' '), Delineator::WHITESPACE);
        assert_eq!(Editor::classify('\n'), Delineator::WHITESPACE);
        assert_eq!(Editor::classify('\u{2028}'), Delineator::WHITESPACE);
        assert_eq!(Editor::classify('_'), Delineator::UNDERSCORE);
        assert_eq!(Editor::classify('.'), Delineator::SYMBOL);
        assert_eq!(Editor::classify('['), Delineator::SYMBOL);
        assert_eq!(Editor::classify('{'), Delineator::SYMBOL);
        assert_eq!(Editor::classify('A'), Delineator::UPPERCASE);
        assert_eq!(Editor::classify('z'), Delineator::LOWERCASE);
        assert_eq!(Editor::classify('0'), Delineator::LOWERCASE);
        // Non-ASCII letters count as lowercase for navigation purposes.
        assert_eq!(Editor::classify('é'), Delineator::LOWERCASE);
    }

    #[test]
    fn select_word_expands_to_boundaries() {
        let mut editor = editor("one_two three");
        editor.set_cursor(collapsed_at(2));
        editor.select_word();
        assert_eq!(editor.cursor().first().codepoint_index(), 0);
        assert_eq!(editor.cursor().last().codepoint_index(), 7);

        // Clicking the right edge of a word still selects it.
        editor.set_cursor(collapsed_at(7));
        editor.select_word();
        assert_eq!(editor.cursor().first().codepoint_index(), 0);
        assert_eq!(editor.cursor().last().codepoint_index(), 7);
    }

    #[test]
    fn word_navigation_stops_at_whitespace() {
        let mut editor = editor("one two");
        editor.set_cursor(collapsed_at(0));
        editor.update();
        editor.cursor_right(CursorBoundary::Word, false);
        assert_eq!(editor.cursor().end().codepoint_index(), 3);
        editor.cursor_right(CursorBoundary::Word, false);
        assert_eq!(editor.cursor().end().codepoint_index(), 7);
        editor.cursor_left(CursorBoundary::Word, false);
        assert_eq!(editor.cursor().end().codepoint_index(), 4);
    }

    #[test]
    fn sub_word_navigation_stops_at_case_changes() {
        let mut editor = editor("oneTwo three");
        editor.set_cursor(collapsed_at(0));
        editor.update();
        editor.cursor_right(CursorBoundary::SubWord, false);
        assert_eq!(editor.cursor().end().codepoint_index(), 3);
        editor.cursor_right(CursorBoundary::SubWord, false);
        assert_eq!(editor.cursor().end().codepoint_index(), 6);
    }

    #[test]
    fn line_boundary_navigation() {
        let mut editor = editor("one two");
        editor.set_cursor(collapsed_at(3));
        editor.update();
        editor.cursor_left(CursorBoundary::Line, false);
        editor.update();
        assert_eq!(editor.cursor().end().codepoint_index(), 0);
        editor.cursor_right(CursorBoundary::Line, false);
        assert_eq!(editor.cursor().end().codepoint_index(), 7);
    }

    #[test]
    fn character_navigation_clamps() {
        let mut editor = editor("ab");
        editor.set_cursor(collapsed_at(0));
        editor.update();
        editor.cursor_left(CursorBoundary::Character, false);
        assert_eq!(editor.cursor().end().codepoint_index(), 0);
        for _ in 0..5 {
            editor.cursor_right(CursorBoundary::Character, false);
        }
        // Clamped to the sentinel slot.
        assert_eq!(editor.cursor().end().codepoint_index(), 2);
    }

    #[test]
    fn vertical_navigation_keeps_ideal_x() {
        let mut editor = Editor::new(MockFace::font());
        editor.set_font_size(10.0);
        editor.set_sizing(TextSizing::AutoHeight);
        editor.set_max_width(60.0);
        editor.set_text("one two three four five");
        editor.update();
        assert!(editor.shape().line_count() >= 2);

        editor.move_cursor_to(Vec2(2.0, 2.0), false);
        editor.update();
        assert_eq!(editor.cursor().end().line_index(), Some(0));
        assert_eq!(editor.cursor().end().codepoint_index(), 0);

        editor.cursor_down(false);
        editor.update();
        assert_eq!(editor.cursor().end().line_index(), Some(1));
        assert_eq!(editor.cursor().end().codepoint_index(), 8);

        editor.cursor_up(false);
        editor.update();
        assert_eq!(editor.cursor().end().codepoint_index(), 0);

        // Down past the last line jumps to the end of the text.
        for _ in 0..5 {
            editor.cursor_down(false);
            editor.update();
        }
        assert_eq!(editor.cursor().end().codepoint_index(), editor.len() as u32);
    }

    #[test]
    fn update_is_idempotent() {
        let mut editor = editor("hello world");
        assert!(!editor.update());
        editor.insert_char('!');
        assert!(editor.update());
        let bounds = editor.bounds();
        let text_path = editor.text_path().clone();
        let cursor_path = editor.cursor_path().clone();
        assert!(!editor.update());
        assert_eq!(editor.bounds(), bounds);
        assert_eq!(editor.text_path(), &text_path);
        assert_eq!(editor.cursor_path(), &cursor_path);
    }

    #[test]
    fn caret_path_is_one_unit_wide() {
        let mut editor = editor("ab");
        editor.set_cursor(collapsed_at(1));
        editor.update();
        let visual = editor.cursor_visual_position().unwrap();
        assert!((visual.x - 5.0 * 1.6).abs() < 1e-3);
        assert!(!editor.cursor_path().is_empty());
        // The caret rect spans [x, x + 1].
        let elements = editor.cursor_path().elements();
        match (elements[0], elements[1]) {
            (crate::PathEl::MoveTo(a), crate::PathEl::LineTo(b)) => {
                assert!((b.0 - a.0 - CARET_WIDTH).abs() < 1e-4);
            }
            other => panic!("unexpected caret path: {other:?}"),
        }
    }

    #[test]
    fn selection_geometry_and_separate_text() {
        let mut editor = editor("abcd");
        editor.set_cursor(Cursor::new(
            CursorPosition::unresolved(1),
            CursorPosition::unresolved(3),
        ));
        editor.update();
        assert_eq!(editor.selection_rects().len(), 2);
        assert!(!editor.selection_path().is_empty());

        let combined_elements = editor.text_path().elements().len();
        assert!(editor.selected_text_path().is_empty());

        editor.set_separate_selection_text(true);
        editor.update();
        assert!(!editor.selected_text_path().is_empty());
        assert!(editor.text_path().elements().len() < combined_elements);
    }

    #[test]
    fn clip_path_follows_overflow() {
        let mut editor = editor("hello");
        assert!(editor.clip_path().is_none());
        editor.set_sizing(TextSizing::Fixed);
        editor.set_max_width(20.0);
        editor.set_max_height(20.0);
        editor.set_overflow(TextOverflow::Clipped);
        editor.update();
        assert!(editor.clip_path().is_some());
        editor.set_overflow(TextOverflow::Visible);
        editor.update();
        assert!(editor.clip_path().is_none());
    }

    #[test]
    fn measure_caches_until_mutation() {
        let mut editor = editor("hello");
        let bounds = editor.measure(-1.0, 0.0);
        assert!((bounds.width() - 5.0 * 16.0 * 0.5).abs() < 1e-3);
        editor.measure(-1.0, 0.0);
        assert_eq!(editor.measure_count, 1);

        // Different constraints re-measure.
        editor.measure(30.0, 0.0);
        assert_eq!(editor.measure_count, 2);

        // Mutation invalidates the cache.
        editor.insert_char('!');
        editor.measure(30.0, 0.0);
        assert_eq!(editor.measure_count, 3);
        // The display shape is untouched by measuring.
        assert!(editor.update());
    }

    #[test]
    fn setters_flag_only_on_change() {
        let mut editor = editor("hi");
        editor.set_font_size(16.0);
        editor.set_max_width(0.0);
        editor.set_sizing(TextSizing::AutoWidth);
        assert!(!editor.update());
        editor.set_font_size(20.0);
        assert!(editor.update());
    }

    #[test]
    fn cursor_edges_stay_ordered() {
        let mut editor = editor("hello world");
        editor.set_cursor(Cursor::new(
            CursorPosition::unresolved(8),
            CursorPosition::unresolved(2),
        ));
        editor.update();
        assert!(
            editor.cursor().first().codepoint_index() <= editor.cursor().last().codepoint_index()
        );
        editor.select_word();
        assert!(
            editor.cursor().first().codepoint_index() <= editor.cursor().last().codepoint_index()
        );
        editor.cursor_right(CursorBoundary::Word, true);
        assert!(
            editor.cursor().first().codepoint_index() <= editor.cursor().last().codepoint_index()
        );
    }

    #[test]
    fn empty_input_still_places_a_caret() {
        let mut editor = Editor::new(MockFace::font());
        editor.update();
        assert!(editor.cursor_visual_position().is_some());
        let visual = editor.cursor_visual_position().unwrap();
        assert!((visual.x - 0.0).abs() < 1e-4);
        assert!(visual.bottom > visual.top);
    }
}
