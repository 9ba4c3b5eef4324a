//! Value types shared by the planners, the executors and the CLI.
//!
//! Everything here is `Copy`, serializable, and free of shared state. Sizes
//! parse from and print as `WxH`, points as `X,Y`, which is the form the CLI
//! accepts and the form plans are displayed in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pixel dimensions of an image or a target bound.
///
/// A `Size` used as a resize target is called a *box*. The `0x0` box is the
/// sentinel for "no resize requested".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The `0x0` "no resize" sentinel.
    pub fn is_unbounded(self) -> bool {
        self.width == 0 && self.height == 0
    }

    /// True when `self` fits inside `bounds` on both axes.
    pub fn fits_within(self, bounds: Size) -> bool {
        self.width <= bounds.width && self.height <= bounds.height
    }

    /// Scale both sides by `ratio`, rounding half away from zero.
    ///
    /// Sides never collapse below one pixel.
    pub fn scale(self, ratio: f64) -> Size {
        Size {
            width: ((self.width as f64 * ratio).round() as u32).max(1),
            height: ((self.height as f64 * ratio).round() as u32).max(1),
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
        let width = w
            .trim()
            .parse()
            .map_err(|e| format!("invalid width {w:?}: {e}"))?;
        let height = h
            .trim()
            .parse()
            .map_err(|e| format!("invalid height {h:?}: {e}"))?;
        Ok(Size { width, height })
    }
}

/// A pixel position. Computed origins may go negative before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Clamp negative coordinates to zero.
    pub fn clamped(self) -> Point {
        Point {
            x: self.x.max(0),
            y: self.y.max(0),
        }
    }

    pub fn is_non_negative(self) -> bool {
        self.x >= 0 && self.y >= 0
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Point {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
        let x = x
            .trim()
            .parse()
            .map_err(|e| format!("invalid x {x:?}: {e}"))?;
        let y = y
            .trim()
            .parse()
            .map_err(|e| format!("invalid y {y:?}: {e}"))?;
        Ok(Point { x, y })
    }
}
