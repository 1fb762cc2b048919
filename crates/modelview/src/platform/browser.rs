//! Browser host: `web-sys` elements and the host widget model object.
//!
//! `render` is exported to JavaScript and is what the widget's ESM entry
//! calls with `{ model, el }`.

pub mod element;
pub mod logger;
pub mod model;
pub mod render;

pub use element::DomListener;
pub use model::HostWidgetModel;
pub use render::render;

use wasm_bindgen::JsValue;

/// Best-effort text for an arbitrary JS value: strings as-is, everything
/// else through `JSON.stringify`, falling back to the debug form.
pub(crate) fn describe_js_value(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    js_sys::JSON::stringify(value)
        .ok()
        .map(String::from)
        .unwrap_or_else(|| format!("{:?}", value))
}
