//! Page-space geometry in points.
//!
//! The origin is the top-left corner of the page and `y` grows downwards,
//! matching the direction the compositor's cursor moves.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are finite and strictly positive.
    pub fn is_positive(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Uniformly shrink `self` so it fits inside `bounds`.
    ///
    /// The scale factor is `min(bounds.width / width, bounds.height / height)`
    /// and is applied only when it is below one, so a size that already fits
    /// comes back unchanged and nothing is ever enlarged.
    pub fn fit_within(self, bounds: Size) -> Size {
        if !self.is_positive() || !bounds.is_positive() {
            return self;
        }
        let scale = (bounds.width / self.width).min(bounds.height / self.height);
        if scale < 1.0 {
            Size::new(self.width * scale, self.height * scale)
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fit_within_downscales() {
        let placed = Size::new(2000.0, 1000.0).fit_within(Size::new(500.0, 400.0));
        assert_eq!(placed, Size::new(500.0, 250.0));
    }

    #[test]
    fn test_fit_within_keeps_small_images() {
        let natural = Size::new(120.0, 80.0);
        assert_eq!(natural.fit_within(Size::new(500.0, 400.0)), natural);
    }

    #[test]
    fn test_fit_within_degenerate() {
        let empty = Size::new(0.0, 10.0);
        assert_eq!(empty.fit_within(Size::new(500.0, 400.0)), empty);
    }

    proptest! {
        #[test]
        fn prop_fit_within_respects_bounds(
            w in 1.0f32..10_000.0,
            h in 1.0f32..10_000.0,
            max_w in 10.0f32..1_000.0,
            max_h in 10.0f32..1_000.0,
        ) {
            let natural = Size::new(w, h);
            let placed = natural.fit_within(Size::new(max_w, max_h));

            prop_assert!(placed.width <= w + 0.001 && placed.height <= h + 0.001);
            if w <= max_w && h <= max_h {
                prop_assert_eq!(placed, natural);
            } else {
                prop_assert!(placed.width <= max_w + 0.01);
                prop_assert!(placed.height <= max_h + 0.01);
                let before = w / h;
                let after = placed.width / placed.height;
                prop_assert!((before - after).abs() / before < 1e-3);
            }
        }
    }
}
