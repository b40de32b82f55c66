// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Inkline: text shaping, layout and editing for 2D vector renderers
//!
//! The crate turns styled Unicode text into fully-shaped, bidirectionally
//! re-ordered, line-broken paragraphs of glyphs, and keeps a
//! glyph ↔ codepoint index alongside so that interactive consumers (caret
//! placement, hit-testing, selection, editing) and drawing consumers (glyph
//! outlines positioned in layout space) agree on a single model of the text.
//!
//! The main entry points are:
//!
//! -   [`fonts::Font`]: a shareable handle over a decoded font face
//! -   [`shape_text`]: codepoints + [`StyledRun`]s → [`Paragraph`]s
//! -   [`ShapedText`]: the composed shape → line-break → re-order → lookup
//!     pipeline with cached bounds
//! -   [`Text`]: a static styled text block producing per-style outlines
//! -   [`Editor`]: a mutable text buffer with cursor, selection and undo
//!
//! Layout space is y-down with the origin at the top-left (or on the first
//! baseline, see [`TextOrigin`]). Glyph outlines are emitted y-down at a
//! one-em scale; consumers scale them by the run's font size.

mod conv;

mod data;
pub use data::*;

mod path;
pub use path::*;

pub mod fonts;
pub use fonts::{Font, GlyphId};

mod shape;
pub use shape::*;

mod cursor;
pub use cursor::*;

mod editor;
pub use editor::*;

mod text;
pub use text::*;
