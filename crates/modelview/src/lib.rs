//! Binds a notebook widget model to a `<model-viewer>` element.
//!
//! [`bind`] creates the element inside a container, copies the model's state
//! onto it, keeps the synced fields up to date as the model changes and
//! forwards clicks back to the model. Hosts plug in through the traits in
//! [`surface`]; [`platform::memory`] is an in-process host and
//! `platform::browser` (wasm32) drives a real DOM.

pub mod binder;
pub mod model;
pub mod platform;
pub mod surface;
mod sync;

pub use modelview_scene as scene;

pub use binder::{
    bind, BindError, BindOptions, Binding, CameraChangeStrategy, IgnoreCameraChange,
    InvalidKeyPolicy, ViewBinder,
};
pub use model::LocalModel;
pub use surface::{
    Container, Subscription, SurfaceError, ViewerElement, ViewerEvent, ViewerEventKind,
    WidgetModel,
};
