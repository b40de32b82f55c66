// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Simple data types shared across the layout pipeline

/// 2D point or offset over `f32`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2(pub f32, pub f32);

impl Vec2 {
    /// Zero
    pub const ZERO: Vec2 = Vec2(0.0, 0.0);
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Vec2(self.0 + other.0, self.1 + other.1)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Vec2(self.0 - other.0, self.1 - other.1)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    #[inline]
    fn mul(self, f: f32) -> Self {
        Vec2(self.0 * f, self.1 * f)
    }
}

/// Axis-aligned rectangle in layout space (y-down)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// The degenerate rectangle at the origin
    pub const ZERO: Rect = Rect {
        min: Vec2::ZERO,
        max: Vec2::ZERO,
    };

    /// Construct from edges
    #[inline]
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Rect {
            min: Vec2(left, top),
            max: Vec2(right, bottom),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.0 - self.min.0
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.1 - self.min.1
    }

    /// True for degenerate rectangles (non-positive extent or NaN)
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }
}

/// How the text block derives its dimensions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextSizing {
    /// Width and height grow to fit the content; no soft wrapping
    #[default]
    AutoWidth,
    /// Width is fixed, height grows to fit the wrapped content
    AutoHeight,
    /// Both dimensions are fixed
    Fixed,
}

/// What happens to content outside a fixed-size block
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextOverflow {
    /// Lay out and draw everything
    #[default]
    Visible,
    /// Stop before the first line whose bottom overflows
    Hidden,
    /// Stop before the first line whose top overflows; consumers also
    /// receive a clip rectangle covering the bounds
    Clipped,
    /// Truncate the last fitting line and append an ellipsis
    Ellipsis,
}

/// Vertical anchor of the layout's y = 0
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextOrigin {
    /// y = 0 at the top of the first line
    #[default]
    Top,
    /// y = 0 on the first baseline
    Baseline,
}

/// Horizontal alignment of each wrapped line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
}

/// Soft wrapping mode (forced breaks always apply)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextWrap {
    #[default]
    Wrap,
    NoWrap,
}

/// Direction a paragraph or glyph run flows in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    /// Direction from a bidi embedding level (odd levels are right-to-left)
    #[inline]
    pub fn from_level(level: u8) -> Self {
        if level & 1 == 1 {
            TextDirection::Rtl
        } else {
            TextDirection::Ltr
        }
    }
}
