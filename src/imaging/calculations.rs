//! Pure calculation functions for resize geometry.
//!
//! All functions here are pure and testable without any I/O or images. The
//! backends reuse [`inset_size`] and [`outbound_geometry`] when executing
//! their thumbnail primitives, so an executed resize always lands on the size
//! its plan reported.

use super::params::{ResizePlan, ResizePolicy, ResizeStep};
use crate::types::{Point, Size};
use thiserror::Error;

/// Errors produced while planning. All are deterministic functions of the
/// input, so retrying with the same arguments fails the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("degenerate size {0}: aspect ratio is undefined")]
    DegenerateSize(Size),
    #[error("invalid target box {0}: exactly one dimension is zero")]
    InvalidBox(Size),
    #[error("neither a target width nor a target height was given")]
    InsufficientTarget,
    #[error("tiling needs {0} pastes, more than can be allocated")]
    TooManyTiles(u64),
}

/// Fill in the missing target dimension from the source aspect ratio.
///
/// A zero dimension counts as "not given". When both are given they come
/// back unchanged.
///
/// The two branches round differently: a derived height is rounded to the
/// nearest pixel, a derived width is truncated.
///
/// A source with a zero side has no aspect ratio and is rejected with
/// [`PlanError::DegenerateSize`].
///
/// # Examples
/// ```
/// # use thumbplan::imaging::compute_missing_dimension;
/// # use thumbplan::types::Size;
/// // 400x300 at width 200 → 200x150
/// assert_eq!(compute_missing_dimension(Size::new(400, 300), Some(200), None), Ok((200, 150)));
/// ```
pub fn compute_missing_dimension(
    source: Size,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<(u32, u32), PlanError> {
    if source.width == 0 || source.height == 0 {
        return Err(PlanError::DegenerateSize(source));
    }
    let ratio = source.width as f64 / source.height as f64;

    match (width.filter(|&w| w > 0), height.filter(|&h| h > 0)) {
        (Some(w), Some(h)) => Ok((w, h)),
        (Some(w), None) => Ok((w, (w as f64 / ratio).round() as u32)),
        (None, Some(h)) => Ok(((h as f64 * ratio) as u32, h)),
        (None, None) => Err(PlanError::InsufficientTarget),
    }
}

/// Largest aspect-preserving size that fits inside `target`.
///
/// Uses the smaller of the two axis ratios. Caller guarantees non-zero sides.
pub fn inset_size(source: Size, target: Size) -> Size {
    let ratio = f64::min(
        target.width as f64 / source.width as f64,
        target.height as f64 / source.height as f64,
    );
    source.scale(ratio)
}

/// Size and crop rectangle for a cover-then-centre-crop resize.
///
/// Returns `(scaled_size, crop_origin, crop_size)`. When the source already
/// contains the box it is scaled so the box is just covered. When it is
/// smaller than the box on one axis it is not scaled at all and the crop
/// shrinks to the overlap of source and box.
pub fn outbound_geometry(source: Size, target: Size) -> (Size, Point, Size) {
    let (scaled, crop_size) = if target.fits_within(source) {
        let ratio = f64::max(
            target.width as f64 / source.width as f64,
            target.height as f64 / source.height as f64,
        );
        (source.scale(ratio), target)
    } else {
        (
            source,
            Size::new(
                source.width.min(target.width),
                source.height.min(target.height),
            ),
        )
    };

    // Rounding can leave the scaled side a pixel short of the box
    let crop_size = Size::new(
        crop_size.width.min(scaled.width),
        crop_size.height.min(scaled.height),
    );
    let origin = Point::new(
        centre_offset(scaled.width, crop_size.width),
        centre_offset(scaled.height, crop_size.height),
    );
    (scaled, origin, crop_size)
}

fn centre_offset(outer: u32, inner: u32) -> i64 {
    ((outer as f64 - inner as f64) / 2.0).round().max(0.0) as i64
}

/// Plan a resize of `source` into `target` under `policy`.
///
/// Returns a pass-through plan (`no_op`) when the source already fits inside
/// the box on both axes or the box is the `0x0` sentinel.
///
/// # Errors
/// - [`PlanError::InvalidBox`] when exactly one box dimension is zero.
/// - [`PlanError::DegenerateSize`] when the source has a zero dimension.
pub fn plan_resize(
    source: Size,
    target: Size,
    policy: ResizePolicy,
) -> Result<ResizePlan, PlanError> {
    if target.is_unbounded() || source.fits_within(target) {
        tracing::debug!(%source, %target, %policy, "resize is a pass-through");
        return Ok(ResizePlan::pass_through(source, target, policy));
    }
    if target.width == 0 || target.height == 0 {
        return Err(PlanError::InvalidBox(target));
    }
    if source.width == 0 || source.height == 0 {
        return Err(PlanError::DegenerateSize(source));
    }

    let plan = match policy {
        ResizePolicy::Inset => {
            let size = inset_size(source, target);
            ResizePlan {
                policy,
                step: ResizeStep::Inset,
                no_op: false,
                source,
                target,
                scaled_size: size,
                final_size: size,
                crop_origin: None,
                crop_size: None,
            }
        }
        ResizePolicy::Outbound => outbound_plan(source, target, policy),
        ResizePolicy::OutboundFromTop => {
            let from_ratio = source.width as f64 / source.height as f64;
            let to_ratio = target.width as f64 / target.height as f64;

            if to_ratio >= from_ratio {
                // Image is relatively taller than the box: keep the top
                let resized_height = (target.width as f64 / source.width as f64
                    * source.height as f64)
                    .round() as u32;
                ResizePlan {
                    policy,
                    step: ResizeStep::TopCrop,
                    no_op: false,
                    source,
                    target,
                    scaled_size: Size::new(target.width, resized_height),
                    final_size: target,
                    crop_origin: Some(Point::ORIGIN),
                    crop_size: Some(target),
                }
            } else {
                outbound_plan(source, target, policy)
            }
        }
    };
    Ok(plan)
}

fn outbound_plan(source: Size, target: Size, policy: ResizePolicy) -> ResizePlan {
    let (scaled, origin, crop) = outbound_geometry(source, target);
    ResizePlan {
        policy,
        step: ResizeStep::Outbound,
        no_op: false,
        source,
        target,
        scaled_size: scaled,
        final_size: crop,
        crop_origin: Some(origin),
        crop_size: Some(crop),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_POLICIES: [ResizePolicy; 3] = [
        ResizePolicy::Inset,
        ResizePolicy::Outbound,
        ResizePolicy::OutboundFromTop,
    ];

    // =========================================================================
    // compute_missing_dimension tests
    // =========================================================================

    #[test]
    fn missing_height_from_width() {
        assert_eq!(
            compute_missing_dimension(Size::new(400, 300), Some(200), None),
            Ok((200, 150))
        );
    }

    #[test]
    fn missing_width_from_height() {
        assert_eq!(
            compute_missing_dimension(Size::new(400, 300), None, Some(150)),
            Ok((200, 150))
        );
    }

    #[test]
    fn both_given_are_returned_unchanged() {
        assert_eq!(
            compute_missing_dimension(Size::new(400, 300), Some(10), Some(999)),
            Ok((10, 999))
        );
    }

    #[test]
    fn zero_counts_as_missing() {
        assert_eq!(
            compute_missing_dimension(Size::new(400, 300), Some(200), Some(0)),
            Ok((200, 150))
        );
        assert_eq!(
            compute_missing_dimension(Size::new(400, 300), Some(0), None),
            Err(PlanError::InsufficientTarget)
        );
    }

    #[test]
    fn neither_given_is_insufficient() {
        assert_eq!(
            compute_missing_dimension(Size::new(400, 300), None, None),
            Err(PlanError::InsufficientTarget)
        );
    }

    #[test]
    fn zero_height_source_is_degenerate() {
        assert_eq!(
            compute_missing_dimension(Size::new(400, 0), Some(100), None),
            Err(PlanError::DegenerateSize(Size::new(400, 0)))
        );
    }

    #[test]
    fn zero_width_source_is_degenerate() {
        let source = Size::new(0, 100);
        assert_eq!(
            compute_missing_dimension(source, Some(50), None),
            Err(PlanError::DegenerateSize(source))
        );
        assert_eq!(
            compute_missing_dimension(source, None, Some(50)),
            Err(PlanError::DegenerateSize(source))
        );
    }

    /// Pins the rounding asymmetry: heights round, widths truncate.
    #[test]
    fn height_rounds_but_width_truncates() {
        // 3:2 source. 100 / 1.5 = 66.67 → height rounds up to 67
        assert_eq!(
            compute_missing_dimension(Size::new(300, 200), Some(100), None),
            Ok((100, 67))
        );
        // 2:3 source. 100 * 0.667 = 66.67 → width truncates down to 66
        assert_eq!(
            compute_missing_dimension(Size::new(200, 300), None, Some(100)),
            Ok((66, 100))
        );
    }

    #[test]
    fn filling_twice_preserves_aspect_ratio() {
        for (w, h) in [(400, 300), (1920, 1080), (300, 200), (7, 13), (1, 1000)] {
            let source = Size::new(w, h);
            for target_w in [50u32, 101, 640] {
                let (w1, h1) = compute_missing_dimension(source, Some(target_w), None).unwrap();
                if h1 == 0 {
                    continue;
                }
                let (w2, h2) = compute_missing_dimension(source, None, Some(h1)).unwrap();
                assert_eq!(h2, h1);
                // Within one pixel of integer rounding at each step
                let expected = h1 as f64 * w as f64 / h as f64;
                assert!((w2 as f64 - expected).abs() < 1.0, "{source} @ {target_w}");
                assert!(
                    (w2 as f64 - w1 as f64).abs() <= 1.0 + w as f64 / h as f64,
                    "{source} @ {target_w}: {w1} vs {w2}"
                );
            }
        }
    }

    // =========================================================================
    // plan_resize pass-through tests
    // =========================================================================

    #[test]
    fn fitting_source_is_pass_through_for_every_policy() {
        for policy in ALL_POLICIES {
            for (source, target) in [
                (Size::new(100, 100), Size::new(100, 100)),
                (Size::new(50, 80), Size::new(100, 100)),
                (Size::new(1, 1), Size::new(2000, 10)),
            ] {
                let plan = plan_resize(source, target, policy).unwrap();
                assert!(plan.no_op, "{source} in {target} with {policy}");
                assert_eq!(plan.step, ResizeStep::PassThrough);
                assert_eq!(plan.final_size, source);
            }
        }
    }

    #[test]
    fn zero_box_is_pass_through() {
        for policy in ALL_POLICIES {
            let plan = plan_resize(Size::new(4000, 3000), Size::new(0, 0), policy).unwrap();
            assert!(plan.no_op);
        }
    }

    #[test]
    fn half_zero_box_is_invalid() {
        assert_eq!(
            plan_resize(Size::new(400, 300), Size::new(0, 100), ResizePolicy::Inset),
            Err(PlanError::InvalidBox(Size::new(0, 100)))
        );
        assert_eq!(
            plan_resize(Size::new(400, 300), Size::new(100, 0), ResizePolicy::Outbound),
            Err(PlanError::InvalidBox(Size::new(100, 0)))
        );
    }

    #[test]
    fn zero_sided_source_that_does_not_fit_is_degenerate() {
        assert_eq!(
            plan_resize(Size::new(0, 500), Size::new(100, 100), ResizePolicy::Inset),
            Err(PlanError::DegenerateSize(Size::new(0, 500)))
        );
    }

    // =========================================================================
    // Inset
    // =========================================================================

    #[test]
    fn inset_fits_landscape_into_square() {
        let plan = plan_resize(Size::new(400, 300), Size::new(100, 100), ResizePolicy::Inset)
            .unwrap();
        assert_eq!(plan.step, ResizeStep::Inset);
        assert_eq!(plan.final_size, Size::new(100, 75));
        assert_eq!(plan.crop_origin, None);
        assert_eq!(plan.crop_size, None);
    }

    #[test]
    fn inset_never_upscales_short_axis() {
        // Only the width overflows: scale by 0.25, height 50 → 12.5 → 13
        let plan = plan_resize(Size::new(400, 50), Size::new(100, 100), ResizePolicy::Inset)
            .unwrap();
        assert_eq!(plan.final_size, Size::new(100, 13));
    }

    // =========================================================================
    // Outbound
    // =========================================================================

    #[test]
    fn outbound_covers_then_centre_crops() {
        let plan =
            plan_resize(Size::new(400, 300), Size::new(100, 100), ResizePolicy::Outbound).unwrap();
        assert_eq!(plan.step, ResizeStep::Outbound);
        assert_eq!(plan.scaled_size, Size::new(133, 100));
        assert_eq!(plan.crop_origin, Some(Point::new(17, 0)));
        assert_eq!(plan.crop_size, Some(Size::new(100, 100)));
        assert_eq!(plan.final_size, Size::new(100, 100));
    }

    #[test]
    fn outbound_without_containment_crops_without_scaling() {
        let plan =
            plan_resize(Size::new(400, 50), Size::new(100, 100), ResizePolicy::Outbound).unwrap();
        assert_eq!(plan.scaled_size, Size::new(400, 50));
        assert_eq!(plan.crop_origin, Some(Point::new(150, 0)));
        assert_eq!(plan.crop_size, Some(Size::new(100, 50)));
        assert_eq!(plan.final_size, Size::new(100, 50));
    }

    // =========================================================================
    // OutboundFromTop
    // =========================================================================

    #[test]
    fn from_top_falls_back_to_outbound_for_wide_sources() {
        // from = 1.333, to = 1.0 < from
        let from_top = plan_resize(
            Size::new(400, 300),
            Size::new(100, 100),
            ResizePolicy::OutboundFromTop,
        )
        .unwrap();
        let outbound =
            plan_resize(Size::new(400, 300), Size::new(100, 100), ResizePolicy::Outbound).unwrap();

        assert_eq!(from_top.step, ResizeStep::Outbound);
        assert_eq!(from_top.scaled_size, outbound.scaled_size);
        assert_eq!(from_top.crop_origin, outbound.crop_origin);
        assert_ne!(from_top.crop_origin, Some(Point::ORIGIN));
    }

    #[test]
    fn from_top_keeps_top_of_tall_sources() {
        // from = 0.75, to = 2.0 ≥ from; 200 / 300 * 400 = 266.67 → 267
        let plan = plan_resize(
            Size::new(300, 400),
            Size::new(200, 100),
            ResizePolicy::OutboundFromTop,
        )
        .unwrap();
        assert_eq!(plan.step, ResizeStep::TopCrop);
        assert_eq!(plan.scaled_size, Size::new(200, 267));
        assert_eq!(plan.crop_origin, Some(Point::new(0, 0)));
        assert_eq!(plan.crop_size, Some(Size::new(200, 100)));
        assert_eq!(plan.final_size, Size::new(200, 100));
    }

    #[test]
    fn from_top_equal_ratios_take_the_top_branch() {
        let plan = plan_resize(
            Size::new(400, 200),
            Size::new(200, 100),
            ResizePolicy::OutboundFromTop,
        )
        .unwrap();
        assert_eq!(plan.step, ResizeStep::TopCrop);
        assert_eq!(plan.scaled_size, Size::new(200, 100));
    }

    // =========================================================================
    // outbound_geometry / inset_size
    // =========================================================================

    #[test]
    fn outbound_geometry_portrait_into_landscape() {
        // 600x800 → 500x400: width drives, 500x667, crop y = round(133.5) = 134
        let (scaled, origin, crop) = outbound_geometry(Size::new(600, 800), Size::new(500, 400));
        assert_eq!(scaled, Size::new(500, 667));
        assert_eq!(origin, Point::new(0, 134));
        assert_eq!(crop, Size::new(500, 400));
    }

    #[test]
    fn inset_size_same_aspect() {
        assert_eq!(
            inset_size(Size::new(800, 600), Size::new(400, 300)),
            Size::new(400, 300)
        );
    }
}
