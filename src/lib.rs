//! # thumbplan
//!
//! Geometry for thumbnail and watermark pipelines. Given a source size and a
//! target box, work out exactly what to resize and crop; given a source and a
//! watermark, work out exactly where to paste it. Plans are plain data, so the
//! arithmetic is tested without touching a single pixel.
//!
//! # Architecture: Plan, Then Execute
//!
//! ```text
//! 1. Plan      sizes + policy/anchor  →  ResizePlan / PastePlan   (pure)
//! 2. Execute   plan + ImageBuffer     →  transformed image        (backend)
//! ```
//!
//! The backend used for execution is picked once per process by probing a
//! priority list ([`imaging::select_backend`]). The built-in raster backend
//! ([`imaging::RasterImage`]) is always available as the last resort.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Resize policies, watermark anchors, backend selection and execution |
//! | [`types`] | `Size` and `Point`, the value types every plan is made of |
//! | [`config`] | `config.toml` loading, validation, and stock defaults |
//! | [`process`] | File-level thumbnail batches and watermarking |
//! | [`output`] | CLI output formatting for plans and results |
//!
//! # Resize Policies
//!
//! | Policy | Result |
//! |--------|--------|
//! | `inset` | Whole image scaled to fit inside the box |
//! | `outbound` | Box filled, overflow cropped around the centre |
//! | `outbound-from-top` | Box filled, tall overflow cropped from the top edge |
//!
//! Images that already fit their box are never upscaled.

pub mod config;
pub mod imaging;
pub mod output;
pub mod process;
pub mod types;
