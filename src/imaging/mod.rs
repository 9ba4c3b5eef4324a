//! Thumbnail and watermark geometry, plus the backends that execute it.
//!
//! | Question | Answer |
//! |---|---|
//! | **Which backend?** | [`select_backend`]: probe in priority order, memoize the winner |
//! | **How big is the thumbnail?** | [`plan_resize`]: Inset, Outbound or OutboundFromTop |
//! | **What is the missing side?** | [`compute_missing_dimension`] |
//! | **Where does the watermark go?** | [`plan_watermark`]: named anchor, offset or tiling |
//!
//! The module is split into:
//! - **Calculations / Watermark**: Pure planners (unit testable, no pixels)
//! - **Parameters**: Plan and policy types
//! - **Selector**: Backend discovery
//! - **Backend**: [`ImageBuffer`] trait + [`RasterImage`]
//! - **Operations**: Plan execution against an [`ImageBuffer`]

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;
pub mod selector;
mod watermark;

pub use backend::{BackendError, ImageBuffer};
pub use calculations::{
    PlanError, compute_missing_dimension, inset_size, outbound_geometry, plan_resize,
};
pub use operations::{apply_watermark, execute_paste_plan, execute_resize, resize};
pub use params::{Anchor, Paste, PastePlan, ResizePlan, ResizePolicy, ResizeStep};
pub use rust_backend::RasterImage;
pub use selector::{
    BackendHandle, BackendKind, BackendProbe, BackendSelector, EnvironmentProbe, select_backend,
};
pub use watermark::{DEFAULT_SHRINK_FACTOR, plan_watermark};
