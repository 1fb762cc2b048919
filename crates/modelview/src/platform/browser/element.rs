//! `ViewerElement`/`Container` over `web_sys::HtmlElement`.

use modelview_scene::{CameraChange, ClickPayload};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, Element, Event, EventTarget, HtmlElement, MouseEvent};

use super::describe_js_value;
use crate::surface::{
    css_property_name, validate_attribute_name, validate_style_property, Container, SurfaceError,
    ViewerElement, ViewerEvent, ViewerEventKind,
};

/// An attached DOM listener. Removed from its target on drop.
pub struct DomListener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Drop for DomListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

impl ViewerElement for HtmlElement {
    type Listener = DomListener;

    fn set_style_property(&self, property: &str, value: &str) -> Result<(), SurfaceError> {
        validate_style_property(property)?;
        self.style()
            .set_property(&css_property_name(property), value)
            .map_err(host_error)
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), SurfaceError> {
        validate_attribute_name(name)?;
        Element::set_attribute(self, name, value).map_err(host_error)
    }

    fn remove_attribute(&self, name: &str) -> Result<(), SurfaceError> {
        Element::remove_attribute(self, name).map_err(host_error)
    }

    /// `<model-viewer>` exposes `alt` as a property that reflects to the attribute.
    fn set_alt(&self, alt: &str) -> Result<(), SurfaceError> {
        js_sys::Reflect::set(self, &JsValue::from_str("alt"), &JsValue::from_str(alt))
            .map(|_| ())
            .map_err(host_error)
    }

    fn listen(
        &self,
        kind: ViewerEventKind,
        mut handler: Box<dyn FnMut(ViewerEvent)>,
    ) -> Result<Self::Listener, SurfaceError> {
        let closure = Closure::wrap(Box::new(move |event: Event| {
            handler(decode_event(kind, &event));
        }) as Box<dyn FnMut(Event)>);

        let target: EventTarget = self.clone().into();
        target
            .add_event_listener_with_callback(kind.name(), closure.as_ref().unchecked_ref())
            .map_err(host_error)?;

        Ok(DomListener {
            target,
            event: kind.name(),
            closure,
        })
    }
}

impl Container for HtmlElement {
    type Element = HtmlElement;

    fn create_viewer(&self, tag: &str) -> Result<Self::Element, SurfaceError> {
        let document = self
            .owner_document()
            .ok_or_else(|| SurfaceError::Host("container has no owner document".to_string()))?;
        document
            .create_element(tag)
            .map_err(host_error)?
            .dyn_into::<HtmlElement>()
            .map_err(|element| {
                SurfaceError::Host(format!("<{}> is not an HTML element", element.tag_name()))
            })
    }

    fn append_viewer(&self, element: &Self::Element) -> Result<(), SurfaceError> {
        self.append_child(element).map(|_| ()).map_err(host_error)
    }
}

fn decode_event(kind: ViewerEventKind, event: &Event) -> ViewerEvent {
    match kind {
        ViewerEventKind::Click => {
            let (client_x, client_y) = event
                .dyn_ref::<MouseEvent>()
                .map(|mouse| (mouse.client_x(), mouse.client_y()))
                .unwrap_or_default();
            let target = event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .map(|element| element.tag_name())
                .unwrap_or_default();
            ViewerEvent::Click(ClickPayload::new(client_x, client_y, target))
        }
        ViewerEventKind::Error => {
            let detail = event
                .dyn_ref::<CustomEvent>()
                .map(|custom| describe_js_value(&custom.detail()))
                .unwrap_or_else(|| event.type_());
            ViewerEvent::Error { detail }
        }
        ViewerEventKind::CameraChange => {
            let source = event
                .dyn_ref::<CustomEvent>()
                .and_then(|custom| {
                    js_sys::Reflect::get(&custom.detail(), &JsValue::from_str("source")).ok()
                })
                .and_then(|source| source.as_string())
                .unwrap_or_default();
            ViewerEvent::CameraChange(CameraChange { source })
        }
    }
}

fn host_error(error: JsValue) -> SurfaceError {
    SurfaceError::Host(describe_js_value(&error))
}
