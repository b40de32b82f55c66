// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Neutral path representation
//!
//! Glyph outlines and the editor's caret/selection geometry are expressed as
//! [`Path`]s: flat command lists a renderer can replay through [`PathSink`].
//! Points are in layout space (y-down). The y-flip from font space happens
//! once, inside the font backend's outline adapter; everything here assumes
//! it already took place.

use crate::{Rect, Vec2};

/// Receiver of path commands
///
/// The renderer-facing contract: any path consumer (tessellator, rasterizer,
/// path recorder) implements these five methods.
pub trait PathSink {
    fn move_to(&mut self, to: Vec2);
    fn line_to(&mut self, to: Vec2);
    fn quad_to(&mut self, ctrl: Vec2, to: Vec2);
    fn cubic_to(&mut self, ctrl1: Vec2, ctrl2: Vec2, to: Vec2);
    fn close(&mut self);
}

/// One path command
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathEl {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo(Vec2, Vec2),
    CubicTo(Vec2, Vec2, Vec2),
    Close,
}

/// A sequence of path commands
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    elements: Vec<PathEl>,
}

// Circle-to-cubic approximation constant for quarter arcs.
const KAPPA: f32 = 0.552_284_8;

impl Path {
    pub fn new() -> Self {
        Path::default()
    }

    /// Remove all commands, keeping the allocation
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[PathEl] {
        &self.elements
    }

    /// Replay all commands into a sink
    pub fn emit<S: PathSink + ?Sized>(&self, sink: &mut S) {
        for el in &self.elements {
            match *el {
                PathEl::MoveTo(p) => sink.move_to(p),
                PathEl::LineTo(p) => sink.line_to(p),
                PathEl::QuadTo(c, p) => sink.quad_to(c, p),
                PathEl::CubicTo(c1, c2, p) => sink.cubic_to(c1, c2, p),
                PathEl::Close => sink.close(),
            }
        }
    }

    /// Append `other` with a uniform scale and translation applied
    pub fn append_scaled(&mut self, other: &Path, scale: f32, offset: Vec2) {
        self.elements.reserve(other.elements.len());
        let map = |p: Vec2| p * scale + offset;
        for el in &other.elements {
            self.elements.push(match *el {
                PathEl::MoveTo(p) => PathEl::MoveTo(map(p)),
                PathEl::LineTo(p) => PathEl::LineTo(map(p)),
                PathEl::QuadTo(c, p) => PathEl::QuadTo(map(c), map(p)),
                PathEl::CubicTo(c1, c2, p) => PathEl::CubicTo(map(c1), map(c2), map(p)),
                PathEl::Close => PathEl::Close,
            });
        }
    }

    /// Append an axis-aligned rectangle as a closed clockwise contour
    pub fn push_rect(&mut self, rect: Rect) {
        self.move_to(rect.min);
        self.line_to(Vec2(rect.max.0, rect.min.1));
        self.line_to(rect.max);
        self.line_to(Vec2(rect.min.0, rect.max.1));
        self.close();
    }

    /// Append a rectangle with rounded corners
    ///
    /// The radius is clamped to half the smaller dimension; a non-positive
    /// radius degrades to [`Path::push_rect`].
    pub fn push_rounded_rect(&mut self, rect: Rect, radius: f32) {
        let r = radius
            .min(0.5 * rect.width().abs())
            .min(0.5 * rect.height().abs());
        if !(r > 0.0) {
            return self.push_rect(rect);
        }
        let (l, t) = (rect.min.0, rect.min.1);
        let (b, rt) = (rect.max.1, rect.max.0);
        let k = KAPPA * r;

        self.move_to(Vec2(l + r, t));
        self.line_to(Vec2(rt - r, t));
        self.cubic_to(Vec2(rt - r + k, t), Vec2(rt, t + r - k), Vec2(rt, t + r));
        self.line_to(Vec2(rt, b - r));
        self.cubic_to(Vec2(rt, b - r + k), Vec2(rt - r + k, b), Vec2(rt - r, b));
        self.line_to(Vec2(l + r, b));
        self.cubic_to(Vec2(l + r - k, b), Vec2(l, b - r + k), Vec2(l, b - r));
        self.line_to(Vec2(l, t + r));
        self.cubic_to(Vec2(l, t + r - k), Vec2(l + r - k, t), Vec2(l + r, t));
        self.close();
    }
}

impl PathSink for Path {
    fn move_to(&mut self, to: Vec2) {
        self.elements.push(PathEl::MoveTo(to));
    }

    fn line_to(&mut self, to: Vec2) {
        self.elements.push(PathEl::LineTo(to));
    }

    fn quad_to(&mut self, ctrl: Vec2, to: Vec2) {
        self.elements.push(PathEl::QuadTo(ctrl, to));
    }

    fn cubic_to(&mut self, ctrl1: Vec2, ctrl2: Vec2, to: Vec2) {
        self.elements.push(PathEl::CubicTo(ctrl1, ctrl2, to));
    }

    fn close(&mut self) {
        self.elements.push(PathEl::Close);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rect_contour() {
        let mut path = Path::new();
        path.push_rect(Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(path.elements().len(), 5);
        assert_eq!(path.elements()[0], PathEl::MoveTo(Vec2(1.0, 2.0)));
        assert_eq!(path.elements()[4], PathEl::Close);
    }

    #[test]
    fn rounded_rect_clamps_radius() {
        let mut path = Path::new();
        path.push_rounded_rect(Rect::new(0.0, 0.0, 10.0, 4.0), 100.0);
        // Radius clamps to 2; the contour stays inside the rectangle.
        for el in path.elements() {
            let points: &[Vec2] = match el {
                PathEl::MoveTo(p) | PathEl::LineTo(p) => std::slice::from_ref(p),
                PathEl::QuadTo(_, p) => std::slice::from_ref(p),
                PathEl::CubicTo(_, _, p) => std::slice::from_ref(p),
                PathEl::Close => &[],
            };
            for p in points {
                assert!((0.0..=10.0).contains(&p.0));
                assert!((0.0..=4.0).contains(&p.1));
            }
        }
    }

    #[test]
    fn append_scaled_transforms_points() {
        let mut glyph = Path::new();
        glyph.move_to(Vec2(0.0, -1.0));
        glyph.line_to(Vec2(0.5, 0.0));
        glyph.close();

        let mut out = Path::new();
        out.append_scaled(&glyph, 10.0, Vec2(100.0, 50.0));
        assert_eq!(out.elements()[0], PathEl::MoveTo(Vec2(100.0, 40.0)));
        assert_eq!(out.elements()[1], PathEl::LineTo(Vec2(105.0, 50.0)));
    }
}
