//! JavaScript entry point.

use std::rc::Rc;

use log::LevelFilter;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use super::logger;
use super::model::{HostModel, HostWidgetModel};
use crate::binder::{BindOptions, ViewBinder};

#[wasm_bindgen]
extern "C" {
    /// `{ model, el, options? }` as passed by the widget's ESM shim.
    pub type RenderProps;

    #[wasm_bindgen(method, getter)]
    fn model(this: &RenderProps) -> HostModel;

    #[wasm_bindgen(method, getter)]
    fn el(this: &RenderProps) -> HtmlElement;

    #[wasm_bindgen(method, getter)]
    fn options(this: &RenderProps) -> JsValue;
}

/// Bind `props.model` to a new `<model-viewer>` inside `props.el`.
///
/// Returns a cleanup function that detaches every listener; the element is
/// left in place.
#[wasm_bindgen]
pub fn render(props: RenderProps) -> Result<JsValue, JsValue> {
    logger::init(LevelFilter::Info);

    let options = bind_options(props.options())?;
    let model = Rc::new(HostWidgetModel::new(props.model()));
    let binding = ViewBinder::new()
        .options(options)
        .bind(&model, &props.el())
        .map_err(|error| JsValue::from_str(&error.to_string()))?;

    // Listeners only hold weak references; the cleanup closure owns the model.
    Ok(Closure::once_into_js(move || {
        binding.unbind();
        drop(model);
    }))
}

fn bind_options(value: JsValue) -> Result<BindOptions, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(BindOptions::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(JsValue::from)
}
