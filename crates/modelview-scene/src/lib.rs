//! Host-agnostic state for the `<model-viewer>` widget binding.
//!
//! Nothing in here touches a DOM: these are the values a host model carries
//! (`ViewerState`), the identifiers used to subscribe to them (`Field`) and
//! the events sent back to the host (`ModelEvent`).

pub mod event;
pub mod field;
pub mod source;
pub mod state;

pub use event::{CameraChange, ClickPayload, ModelEvent};
pub use field::Field;
pub use source::{ModelSource, SourceError, GLTF_BINARY_MIME};
pub use state::ViewerState;

/// Custom element tag created by the binding.
pub const VIEWER_TAG: &str = "model-viewer";

/// Scripts the page has to load before a viewer element upgrades.
///
/// Pairs of (resource name, path relative to the package's static dir).
pub fn resources() -> &'static [(&'static str, &'static str)] {
    &[("model-viewer", "static/model-viewer.min.js")]
}
