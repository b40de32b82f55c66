// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Codepoint → glyph index table

use super::Paragraph;
use crate::conv::{to_u32, to_usize};

/// Maps every codepoint to the absolute index of the glyph covering it
///
/// Glyph indices count across all paragraphs and runs in logical order.
/// Consecutive codepoints share a value when a cluster (ligature) collapsed
/// them into one glyph. The table holds one extra sentinel entry past the
/// last codepoint so a caret may address the end of the text.
#[derive(Clone, Debug, Default)]
pub struct GlyphLookup {
    glyph_indices: Vec<u32>,
}

impl GlyphLookup {
    /// Rebuild the table from a shape result
    pub fn compute(&mut self, text: &[char], paragraphs: &[Paragraph]) {
        let codepoint_count = text.len();
        self.glyph_indices.clear();
        self.glyph_indices.resize(codepoint_count + 1, 0);

        let mut glyph_index: u32 = 0;
        let mut last_text_index: usize = 0;
        for paragraph in paragraphs {
            for run in &paragraph.runs {
                for &text_index in &run.text_indices {
                    let text_index = to_usize(text_index);
                    for i in last_text_index..text_index {
                        self.glyph_indices[i] = glyph_index.saturating_sub(1);
                    }
                    last_text_index = text_index;
                    glyph_index += 1;
                }
            }
        }
        for i in last_text_index..codepoint_count {
            self.glyph_indices[i] = glyph_index.saturating_sub(1);
        }

        // Sentinel: one past the last glyph, so the caret can sit past the
        // end of the text.
        self.glyph_indices[codepoint_count] = if codepoint_count == 0 {
            0
        } else {
            self.glyph_indices[codepoint_count - 1] + 1
        };
    }

    /// Table length (`codepoint count + 1`), zero before `compute`
    pub fn len(&self) -> usize {
        self.glyph_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyph_indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.glyph_indices.clear();
    }

    /// Index of the last addressable entry (the sentinel), zero when empty
    pub fn last_codepoint_index(&self) -> u32 {
        to_u32(self.glyph_indices.len().saturating_sub(1))
    }

    /// Absolute glyph index covering `index`, clamped to the table
    pub fn get(&self, index: usize) -> u32 {
        match self.glyph_indices.last() {
            Some(_) => self.glyph_indices[index.min(self.glyph_indices.len() - 1)],
            None => 0,
        }
    }

    /// Number of consecutive codepoints sharing `index`'s glyph
    pub fn count(&self, index: usize) -> u32 {
        if self.glyph_indices.is_empty() {
            return 0;
        }
        let index = index.min(self.glyph_indices.len() - 1);
        let value = self.glyph_indices[index];
        let mut count = 1;
        let mut i = index + 1;
        while i < self.glyph_indices.len() && self.glyph_indices[i] == value {
            count += 1;
            i += 1;
        }
        count
    }

    /// Fractional position of `index` within its covering glyph
    ///
    /// `(index − cluster start) / cluster size`, mirrored to `1 − f` for
    /// right-to-left runs so the caret walks visually.
    pub fn advance_factor(&self, index: usize, mirrored: bool) -> f32 {
        if self.glyph_indices.is_empty() {
            return 0.0;
        }
        let index = index.min(self.glyph_indices.len() - 1);
        let value = self.glyph_indices[index];
        let mut start = index;
        while start > 0 && self.glyph_indices[start - 1] == value {
            start -= 1;
        }
        let factor = (index - start) as f32 / self.count(start) as f32;
        if mirrored {
            1.0 - factor
        } else {
            factor
        }
    }
}

impl std::ops::Index<usize> for GlyphLookup {
    type Output = u32;

    fn index(&self, index: usize) -> &u32 {
        &self.glyph_indices[index]
    }
}
