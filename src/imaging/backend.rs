//! Image backend trait and shared error type.
//!
//! [`ImageBuffer`] is the set of pixel primitives the plan executors in
//! [`operations`](super::operations) need: size, the two thumbnail modes,
//! resize, crop and paste. Planning never touches a buffer; only execution
//! does.
//!
//! The production implementation is
//! [`RasterImage`](super::rust_backend::RasterImage), backed by the `image`
//! crate. Tests use a recording mock.

use super::calculations::PlanError;
use super::selector::BackendKind;
use crate::types::{Point, Size};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Your system does not support any of these backends: {}", join_kinds(.attempted))]
    Unsupported { attempted: Vec<BackendKind> },
    #[error(transparent)]
    Plan(#[from] PlanError),
}

fn join_kinds(kinds: &[BackendKind]) -> String {
    kinds
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pixel primitives a backend exposes for one decoded image.
///
/// Operations that produce a new image return it; `paste_at` mutates in
/// place. Implementations must be `Send` so batches can run on a thread pool.
pub trait ImageBuffer: Sized + Send {
    /// Current pixel dimensions.
    fn size(&self) -> Size;

    /// Shrink to the largest aspect-preserving size inside `bounds`.
    fn thumbnail_inset(&self, bounds: Size) -> Result<Self, BackendError>;

    /// Cover `bounds` preserving aspect ratio, then centre-crop to it.
    fn thumbnail_outbound(&self, bounds: Size) -> Result<Self, BackendError>;

    /// Scale to exactly `size`, ignoring aspect ratio.
    fn resize_to(&self, size: Size) -> Result<Self, BackendError>;

    /// Cut out the `size` rectangle at `origin`.
    fn crop_to(&self, origin: Point, size: Size) -> Result<Self, BackendError>;

    /// Draw `image` on top of `self` with its top-left corner at `origin`.
    fn paste_at(&mut self, origin: Point, image: &Self) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::calculations::{inset_size, outbound_geometry};
    use std::sync::{Arc, Mutex};

    /// Mock image that records primitive calls instead of touching pixels.
    ///
    /// Clones share the same log so operations on derived images (crops,
    /// resizes) all show up in one place.
    #[derive(Debug, Clone)]
    pub struct MockImage {
        pub name: &'static str,
        pub size: Size,
        pub log: Arc<Mutex<Vec<RecordedOp>>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        ThumbnailInset { image: &'static str, bounds: Size },
        ThumbnailOutbound { image: &'static str, bounds: Size },
        Resize { image: &'static str, size: Size },
        Crop { image: &'static str, origin: Point, size: Size },
        Paste { onto: &'static str, image: &'static str, origin: Point, size: Size },
    }

    impl MockImage {
        pub fn new(name: &'static str, width: u32, height: u32) -> Self {
            Self {
                name,
                size: Size::new(width, height),
                log: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// A second image that records into the same log.
        pub fn sibling(&self, name: &'static str, width: u32, height: u32) -> Self {
            Self {
                name,
                size: Size::new(width, height),
                log: Arc::clone(&self.log),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.log.lock().unwrap().clone()
        }

        fn record(&self, op: RecordedOp) {
            self.log.lock().unwrap().push(op);
        }

        fn derived(&self, size: Size) -> Self {
            Self {
                name: self.name,
                size,
                log: Arc::clone(&self.log),
            }
        }
    }

    impl ImageBuffer for MockImage {
        fn size(&self) -> Size {
            self.size
        }

        fn thumbnail_inset(&self, bounds: Size) -> Result<Self, BackendError> {
            self.record(RecordedOp::ThumbnailInset {
                image: self.name,
                bounds,
            });
            Ok(self.derived(inset_size(self.size, bounds)))
        }

        fn thumbnail_outbound(&self, bounds: Size) -> Result<Self, BackendError> {
            self.record(RecordedOp::ThumbnailOutbound {
                image: self.name,
                bounds,
            });
            let (_, _, crop) = outbound_geometry(self.size, bounds);
            Ok(self.derived(crop))
        }

        fn resize_to(&self, size: Size) -> Result<Self, BackendError> {
            self.record(RecordedOp::Resize {
                image: self.name,
                size,
            });
            Ok(self.derived(size))
        }

        fn crop_to(&self, origin: Point, size: Size) -> Result<Self, BackendError> {
            self.record(RecordedOp::Crop {
                image: self.name,
                origin,
                size,
            });
            Ok(self.derived(size))
        }

        fn paste_at(&mut self, origin: Point, image: &Self) -> Result<(), BackendError> {
            self.record(RecordedOp::Paste {
                onto: self.name,
                image: image.name,
                origin,
                size: image.size,
            });
            Ok(())
        }
    }

    #[test]
    fn mock_records_crop() {
        let image = MockImage::new("photo", 800, 600);
        let cropped = image.crop_to(Point::new(10, 20), Size::new(100, 50)).unwrap();

        assert_eq!(cropped.size(), Size::new(100, 50));
        let ops = image.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Crop { image: "photo", origin, .. } if *origin == Point::new(10, 20)
        ));
    }

    #[test]
    fn mock_siblings_share_a_log() {
        let mut photo = MockImage::new("photo", 800, 600);
        let mark = photo.sibling("mark", 20, 10);

        photo.paste_at(Point::new(1, 2), &mark).unwrap();

        assert_eq!(
            mark.get_operations(),
            vec![RecordedOp::Paste {
                onto: "photo",
                image: "mark",
                origin: Point::new(1, 2),
                size: Size::new(20, 10),
            }]
        );
    }

    #[test]
    fn unsupported_error_names_every_candidate() {
        let err = BackendError::Unsupported {
            attempted: vec![BackendKind::GraphicsMagick, BackendKind::ImageMagick],
        };
        assert_eq!(
            err.to_string(),
            "Your system does not support any of these backends: graphicsmagick, imagemagick"
        );
    }

    #[test]
    fn plan_errors_pass_through_transparently() {
        let err = BackendError::from(PlanError::InsufficientTarget);
        assert_eq!(
            err.to_string(),
            "neither a target width nor a target height was given"
        );
    }
}
