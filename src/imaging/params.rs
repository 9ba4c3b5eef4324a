//! Parameter and plan types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. Planners in
//! [`calculations`](super::calculations) and [`watermark`](super::watermark)
//! produce them; [`operations`](super::operations) executes them against an
//! [`ImageBuffer`](super::backend::ImageBuffer). Keeping the two apart lets the
//! CLI print a plan without touching pixels and lets tests swap in a mock.
//!
//! ## Types
//!
//! - [`ResizePolicy`]: Inset (fit within), Outbound (cover + centre crop), OutboundFromTop.
//! - [`ResizeStep`]: which backend primitive a resize plan runs.
//! - [`ResizePlan`]: sizes and crop rectangle for one resize.
//! - [`Anchor`]: where a watermark goes: a named position, `Repeat`, or an explicit offset.
//! - [`Paste`] / [`PastePlan`]: the ordered paste instructions for one watermark.

use crate::types::{Point, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named resizing policy, chosen per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizePolicy {
    /// Largest aspect-preserving size inside the box, no crop.
    Inset,
    /// Smallest aspect-preserving size covering the box, centre-cropped to it.
    Outbound,
    /// Like `Outbound`, but keeps the top of images taller than the box.
    OutboundFromTop,
}

impl ResizePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inset => "inset",
            Self::Outbound => "outbound",
            Self::OutboundFromTop => "outbound-from-top",
        }
    }
}

impl fmt::Display for ResizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResizePolicy {
    type Err = String;

    /// Accepts the policy names plus the legacy method names
    /// (`resize`, `adaptive-resize`, `adaptive-resize-from-top`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inset" | "resize" => Ok(Self::Inset),
            "outbound" | "adaptive-resize" => Ok(Self::Outbound),
            "outbound-from-top" | "adaptive-resize-from-top" => Ok(Self::OutboundFromTop),
            other => Err(format!("unknown resize policy: {other}")),
        }
    }
}

/// Backend primitive that executes a [`ResizePlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeStep {
    /// Return the image unchanged.
    PassThrough,
    /// `thumbnail_inset(target)`.
    Inset,
    /// `thumbnail_outbound(target)`.
    Outbound,
    /// `resize_to(scaled_size)` then `crop_to((0,0), target)`.
    TopCrop,
}

/// Result of planning one resize.
///
/// `scaled_size` is the intermediate size after scaling and before cropping;
/// `final_size` is what the caller gets back. When `no_op` is set the other
/// sizes all equal the source size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizePlan {
    pub policy: ResizePolicy,
    pub step: ResizeStep,
    pub no_op: bool,
    pub source: Size,
    pub target: Size,
    pub scaled_size: Size,
    pub final_size: Size,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_origin: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_size: Option<Size>,
}

impl ResizePlan {
    pub(crate) fn pass_through(source: Size, target: Size, policy: ResizePolicy) -> Self {
        Self {
            policy,
            step: ResizeStep::PassThrough,
            no_op: true,
            source,
            target,
            scaled_size: source,
            final_size: source,
            crop_origin: None,
            crop_size: None,
        }
    }
}

/// Where a watermark is placed on the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    Top,
    Bottom,
    #[default]
    Center,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    /// Tile across the whole source, clipping tiles at the right and bottom edges.
    Repeat,
    /// Explicit origin, used as given.
    Offset(Point),
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Center => "center",
            Self::Left => "left",
            Self::Right => "right",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
            Self::Repeat => "repeat",
            Self::Offset(p) => return write!(f, "{p}"),
        };
        f.write_str(name)
    }
}

impl FromStr for Anchor {
    type Err = String;

    /// Parses kebab-case anchor names or an explicit `X,Y` offset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains(',') {
            return s.parse().map(Self::Offset);
        }
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "center" | "centre" => Ok(Self::Center),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "top-left" => Ok(Self::TopLeft),
            "top-right" => Ok(Self::TopRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "bottom-right" => Ok(Self::BottomRight),
            "repeat" | "tile" => Ok(Self::Repeat),
            other => Err(format!("unknown anchor: {other}")),
        }
    }
}

/// One paste of the (possibly clipped) watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paste {
    pub origin: Point,
    /// Portion of the watermark to paste, taken from its top-left corner.
    pub clip: Size,
    /// Set when `clip` is smaller than the watermark, i.e. the watermark must
    /// be cropped before pasting.
    pub clipped: bool,
}

/// Ordered paste instructions for one watermark application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastePlan {
    pub anchor: Anchor,
    /// Watermark size all geometry was computed with (after any shrink).
    pub watermark_size: Size,
    /// Resize applied to the watermark first, when it exceeded the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shrink: Option<ResizePlan>,
    pub pastes: Vec<Paste>,
}

impl PastePlan {
    pub fn is_empty(&self) -> bool {
        self.pastes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pastes.len()
    }
}
