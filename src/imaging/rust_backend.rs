//! Raster backend built on the `image` crate.
//!
//! Everything is statically linked into the binary, so this backend is
//! always available and is the last entry in the default selection order.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode / encode (JPEG, PNG, TIFF, WebP) | `image::open`, `DynamicImage::save` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Crop | `DynamicImage::crop_imm` |
//! | Paste | `image::imageops::overlay` (alpha-blended) |
//!
//! The two thumbnail modes compute their geometry with the same functions the
//! planner uses, so executed output always matches the reported plan.

use super::backend::{BackendError, ImageBuffer};
use super::calculations::{inset_size, outbound_geometry};
use crate::types::{Point, Size};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::path::Path;

/// Extensions whose decoders are compiled in.
const CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

/// True when `path` has an extension this backend can decode.
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            CANDIDATES
                .iter()
                .any(|(candidate, fmt)| ext.eq_ignore_ascii_case(candidate) && fmt.reading_enabled())
        })
}

/// A decoded image held in memory.
#[derive(Debug, Clone)]
pub struct RasterImage {
    inner: DynamicImage,
}

impl RasterImage {
    pub fn new(inner: DynamicImage) -> Self {
        Self { inner }
    }

    /// Load and decode an image from disk.
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        image::open(path).map(Self::new).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
    }

    /// Encode to `path`, inferring the format from its extension.
    pub fn save(&self, path: &Path) -> Result<(), BackendError> {
        // JPEG has no alpha channel
        let is_jpeg = ImageFormat::from_path(path).is_ok_and(|f| f == ImageFormat::Jpeg);
        let result = if is_jpeg {
            DynamicImage::ImageRgb8(self.inner.to_rgb8()).save(path)
        } else {
            self.inner.save(path)
        };
        result.map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to encode {}: {}", path.display(), e))
        })
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.inner
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.inner
    }

    fn crop_rect(&self, origin: Point, size: Size) -> Result<Self, BackendError> {
        let bounds = self.size();
        let in_bounds = origin.is_non_negative()
            && origin.x + size.width as i64 <= bounds.width as i64
            && origin.y + size.height as i64 <= bounds.height as i64;
        if !in_bounds {
            return Err(BackendError::ProcessingFailed(format!(
                "Crop {size} at {origin} is outside the {bounds} image"
            )));
        }
        Ok(Self::new(self.inner.crop_imm(
            origin.x as u32,
            origin.y as u32,
            size.width,
            size.height,
        )))
    }
}

impl From<DynamicImage> for RasterImage {
    fn from(inner: DynamicImage) -> Self {
        Self::new(inner)
    }
}

impl ImageBuffer for RasterImage {
    fn size(&self) -> Size {
        Size::new(self.inner.width(), self.inner.height())
    }

    fn thumbnail_inset(&self, bounds: Size) -> Result<Self, BackendError> {
        let size = self.size();
        if size.width == 0 || size.height == 0 || bounds.width == 0 || bounds.height == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "Cannot fit {size} into {bounds}"
            )));
        }
        self.resize_to(inset_size(size, bounds))
    }

    fn thumbnail_outbound(&self, bounds: Size) -> Result<Self, BackendError> {
        let size = self.size();
        if size.width == 0 || size.height == 0 || bounds.width == 0 || bounds.height == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "Cannot cover {bounds} with {size}"
            )));
        }
        let (scaled, origin, crop) = outbound_geometry(size, bounds);
        let resized = if scaled == size {
            self.clone()
        } else {
            self.resize_to(scaled)?
        };
        resized.crop_rect(origin, crop)
    }

    fn resize_to(&self, size: Size) -> Result<Self, BackendError> {
        if size.width == 0 || size.height == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "Cannot resize to {size}"
            )));
        }
        Ok(Self::new(self.inner.resize_exact(
            size.width,
            size.height,
            FilterType::Lanczos3,
        )))
    }

    fn crop_to(&self, origin: Point, size: Size) -> Result<Self, BackendError> {
        self.crop_rect(origin, size)
    }

    fn paste_at(&mut self, origin: Point, image: &Self) -> Result<(), BackendError> {
        image::imageops::overlay(&mut self.inner, &image.inner, origin.x, origin.y);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RasterImage {
        RasterImage::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba(color),
        )))
    }

    #[test]
    fn inset_preserves_aspect() {
        let img = solid(400, 300, [255, 0, 0, 255]);
        let thumb = img.thumbnail_inset(Size::new(100, 100)).unwrap();
        assert_eq!(thumb.size(), Size::new(100, 75));
    }

    #[test]
    fn outbound_crops_to_box() {
        let img = solid(400, 300, [255, 0, 0, 255]);
        let thumb = img.thumbnail_outbound(Size::new(100, 100)).unwrap();
        assert_eq!(thumb.size(), Size::new(100, 100));
    }

    #[test]
    fn outbound_without_containment_only_crops() {
        let img = solid(400, 50, [255, 0, 0, 255]);
        let thumb = img.thumbnail_outbound(Size::new(100, 100)).unwrap();
        assert_eq!(thumb.size(), Size::new(100, 50));
    }

    #[test]
    fn crop_outside_bounds_is_an_error() {
        let img = solid(10, 10, [0, 0, 0, 255]);
        assert!(img.crop_to(Point::new(5, 5), Size::new(6, 5)).is_err());
        assert!(img.crop_to(Point::new(-1, 0), Size::new(2, 2)).is_err());
    }

    #[test]
    fn paste_writes_pixels_at_origin() {
        let mut base = solid(10, 10, [0, 0, 0, 255]);
        let mark = solid(2, 2, [255, 255, 255, 255]);

        base.paste_at(Point::new(3, 4), &mark).unwrap();

        let rgba = base.as_dynamic().to_rgba8();
        assert_eq!(rgba.get_pixel(3, 4), &Rgba([255, 255, 255, 255]));
        assert_eq!(rgba.get_pixel(4, 5), &Rgba([255, 255, 255, 255]));
        assert_eq!(rgba.get_pixel(2, 4), &Rgba([0, 0, 0, 255]));
        assert_eq!(rgba.get_pixel(5, 4), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn supported_inputs_by_extension() {
        assert!(is_supported_input(Path::new("a/photo.JPG")));
        assert!(is_supported_input(Path::new("mark.png")));
        assert!(!is_supported_input(Path::new("notes.txt")));
        assert!(!is_supported_input(Path::new("noext")));
    }
}
