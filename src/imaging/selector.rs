//! Backend discovery.
//!
//! Candidates are tried in a fixed priority order, GraphicsMagick first, then
//! ImageMagick, then the built-in raster backend, and the first one whose
//! probe reports it available wins. The order can be overridden from
//! configuration (`backend.preferred_order`).
//!
//! Selection happens once. [`BackendSelector`] memoizes the first successful
//! result; concurrent first callers serialize on a mutex so probing runs a
//! single time and everyone gets the same [`BackendHandle`]. A failed
//! selection is not memoized.

use super::backend::BackendError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

/// A native imaging backend this crate knows how to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[serde(alias = "gmagick")]
    GraphicsMagick,
    #[serde(alias = "imagick")]
    ImageMagick,
    /// Generic raster backend built on the `image` crate. Always compiled in.
    #[serde(alias = "gd", alias = "gd2")]
    Raster,
}

impl BackendKind {
    /// Fixed default priority order.
    pub const DEFAULT_ORDER: [BackendKind; 3] = [
        BackendKind::GraphicsMagick,
        BackendKind::ImageMagick,
        BackendKind::Raster,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GraphicsMagick => "graphicsmagick",
            Self::ImageMagick => "imagemagick",
            Self::Raster => "raster",
        }
    }

    /// Executables whose presence on `PATH` marks the backend as installed.
    fn executables(self) -> &'static [&'static str] {
        match self {
            Self::GraphicsMagick => &["gm"],
            Self::ImageMagick => &["magick", "convert"],
            Self::Raster => &[],
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The selected backend. Immutable once created.
#[derive(Debug, PartialEq, Eq)]
pub struct BackendHandle {
    kind: BackendKind,
}

impl BackendHandle {
    pub fn new(kind: BackendKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }
}

/// Capability check for backend candidates.
pub trait BackendProbe: Sync {
    /// Whether `kind` can be used in the current environment.
    fn is_available(&self, kind: BackendKind) -> bool;

    /// Build the handle for an available backend.
    fn construct(&self, kind: BackendKind) -> BackendHandle {
        BackendHandle::new(kind)
    }
}

/// Probes the real environment: external backends are available when one of
/// their executables is on `PATH`; the raster backend always is.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvironmentProbe;

impl BackendProbe for EnvironmentProbe {
    fn is_available(&self, kind: BackendKind) -> bool {
        if kind == BackendKind::Raster {
            return true;
        }
        let Some(path) = std::env::var_os("PATH") else {
            return false;
        };
        std::env::split_paths(&path).any(|dir| {
            kind.executables()
                .iter()
                .any(|exe| is_executable(&dir.join(exe)))
        })
    }
}

fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// Memoizing, thread-safe backend selector.
#[derive(Debug)]
pub struct BackendSelector {
    order: Vec<BackendKind>,
    handle: OnceLock<BackendHandle>,
    init: Mutex<()>,
}

impl BackendSelector {
    pub fn new(order: impl Into<Vec<BackendKind>>) -> Self {
        Self {
            order: order.into(),
            handle: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    pub fn order(&self) -> &[BackendKind] {
        &self.order
    }

    /// The memoized handle, if selection already succeeded.
    pub fn selected(&self) -> Option<&BackendHandle> {
        self.handle.get()
    }

    /// Return the first available backend, probing only on the first success.
    ///
    /// # Errors
    /// [`BackendError::Unsupported`] naming every attempted candidate when
    /// none is available.
    pub fn select(&self, probe: &dyn BackendProbe) -> Result<&BackendHandle, BackendError> {
        if let Some(handle) = self.handle.get() {
            return Ok(handle);
        }

        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = self.handle.get() {
            return Ok(handle);
        }

        for &kind in &self.order {
            let available = probe.is_available(kind);
            tracing::debug!(backend = %kind, available, "probed image backend");
            if available {
                let handle = self.handle.get_or_init(|| probe.construct(kind));
                tracing::info!(backend = %handle.kind(), "selected image backend");
                return Ok(handle);
            }
        }

        Err(BackendError::Unsupported {
            attempted: self.order.clone(),
        })
    }
}

impl Default for BackendSelector {
    fn default() -> Self {
        Self::new(BackendKind::DEFAULT_ORDER)
    }
}

static GLOBAL_SELECTOR: OnceLock<BackendSelector> = OnceLock::new();

/// Process-wide backend selection against the real environment.
///
/// `order` is only consulted by the first call; the selector and its result
/// live for the rest of the process.
pub fn select_backend(order: &[BackendKind]) -> Result<&'static BackendHandle, BackendError> {
    GLOBAL_SELECTOR
        .get_or_init(|| BackendSelector::new(order))
        .select(&EnvironmentProbe)
}
