//! `WidgetModel` over the host's JavaScript model object.
//!
//! The host exposes fields as plain properties (`model.src`), change
//! notification as `model.on(name, callback)` and events as
//! `model.send_event(name, payload)`. `model.off(name, callback)` is used
//! when the host provides it.

use std::cell::Cell;
use std::rc::Rc;

use indexmap::IndexMap;
use modelview_scene::{Field, ModelEvent};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::describe_js_value;
use crate::surface::{Subscription, WidgetModel};

#[wasm_bindgen]
extern "C" {
    /// Model object handed to `render` by the host.
    #[derive(Clone, Debug)]
    pub type HostModel;

    #[wasm_bindgen(method, catch)]
    fn on(this: &HostModel, name: &str, callback: &js_sys::Function) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = send_event)]
    fn send_event(this: &HostModel, name: &str, payload: &JsValue) -> Result<JsValue, JsValue>;
}

pub struct HostWidgetModel {
    raw: HostModel,
}

impl HostWidgetModel {
    pub fn new(raw: HostModel) -> Self {
        Self { raw }
    }

    fn get(&self, field: Field) -> JsValue {
        js_sys::Reflect::get(&self.raw, &JsValue::from_str(field.name())).unwrap_or(JsValue::UNDEFINED)
    }

    fn string(&self, field: Field) -> Option<String> {
        self.get(field).as_string()
    }

    fn flag(&self, field: Field) -> bool {
        self.get(field).is_truthy()
    }

    /// Entries of an object-valued field. Numbers and booleans are
    /// stringified; other values are skipped.
    fn mapping(&self, field: Field) -> IndexMap<String, String> {
        let value = self.get(field);
        let Some(object) = value.dyn_ref::<js_sys::Object>() else {
            if !value.is_undefined() && !value.is_null() {
                log::warn!("'{}' is not an object: {}", field, describe_js_value(&value));
            }
            return IndexMap::new();
        };

        let mut entries = IndexMap::new();
        for entry in js_sys::Object::entries(object).iter() {
            let pair: js_sys::Array = entry.unchecked_into();
            let Some(key) = pair.get(0).as_string() else {
                continue;
            };
            let value = pair.get(1);
            let text = value
                .as_string()
                .or_else(|| value.as_f64().map(|number| number.to_string()))
                .or_else(|| value.as_bool().map(|flag| flag.to_string()));
            match text {
                Some(text) => {
                    entries.insert(key, text);
                }
                None => log::warn!("skipping '{}.{}': unsupported value", field, key),
            }
        }
        entries
    }

    fn off_function(&self) -> Option<js_sys::Function> {
        js_sys::Reflect::get(&self.raw, &JsValue::from_str("off"))
            .ok()
            .and_then(|off| off.dyn_into::<js_sys::Function>().ok())
    }
}

impl WidgetModel for HostWidgetModel {
    fn src(&self) -> Option<String> {
        self.string(Field::Src)
    }

    fn alt(&self) -> Option<String> {
        self.string(Field::Alt)
    }

    fn poster(&self) -> Option<String> {
        self.string(Field::Poster)
    }

    fn auto_rotate(&self) -> bool {
        self.flag(Field::AutoRotate)
    }

    fn camera_controls(&self) -> bool {
        self.flag(Field::CameraControls)
    }

    fn style(&self) -> IndexMap<String, String> {
        self.mapping(Field::Style)
    }

    fn html_attrs(&self) -> IndexMap<String, String> {
        self.mapping(Field::HtmlAttrs)
    }

    fn on_change(&self, field: Field, mut callback: Box<dyn FnMut()>) -> Subscription {
        let active = Rc::new(Cell::new(true));
        let closure = Closure::wrap(Box::new({
            let active = active.clone();
            move || {
                if active.get() {
                    callback();
                }
            }
        }) as Box<dyn FnMut()>);

        if let Err(error) = self.raw.on(field.name(), closure.as_ref().unchecked_ref()) {
            log::error!("failed to observe '{}': {}", field, describe_js_value(&error));
            return Subscription::noop();
        }

        let raw = self.raw.clone();
        let off = self.off_function();
        Subscription::new(move || {
            active.set(false);
            match off {
                Some(off) => {
                    let name = JsValue::from_str(field.name());
                    if let Err(error) = off.call2(&raw, &name, closure.as_ref()) {
                        log::warn!("failed to stop observing '{}': {}", field, describe_js_value(&error));
                    }
                    drop(closure);
                }
                // The host keeps calling the function; it must stay alive.
                None => closure.forget(),
            }
        })
    }

    fn send_event(&self, event: ModelEvent) {
        let payload = match &event {
            ModelEvent::Click(payload) => serde_wasm_bindgen::to_value(payload),
        };
        let payload = match payload {
            Ok(payload) => payload,
            Err(error) => {
                log::error!("failed to encode '{}' event: {}", event.name(), error);
                return;
            }
        };
        if let Err(error) = self.raw.send_event(event.name(), &payload) {
            log::error!("failed to send '{}' event: {}", event.name(), describe_js_value(&error));
        }
    }
}
