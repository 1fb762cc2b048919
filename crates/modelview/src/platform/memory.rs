//! Deterministic in-memory DOM for tests and the CLI.
//!
//! `MemoryElement` keeps attributes and style properties in insertion order
//! and lets callers dispatch synthetic events to whatever listeners the
//! binding attached.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::surface::{
    css_property_name, validate_attribute_name, validate_style_property, Container, SurfaceError,
    ViewerElement, ViewerEvent, ViewerEventKind,
};

type Handler = Rc<RefCell<Box<dyn FnMut(ViewerEvent)>>>;

struct ElementData {
    tag: String,
    attributes: IndexMap<String, String>,
    style: IndexMap<String, String>,
    listeners: Vec<(u64, ViewerEventKind, Handler)>,
    next_listener: u64,
}

#[derive(Clone)]
pub struct MemoryElement {
    data: Rc<RefCell<ElementData>>,
}

impl MemoryElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            data: Rc::new(RefCell::new(ElementData {
                tag: tag.into(),
                attributes: IndexMap::new(),
                style: IndexMap::new(),
                listeners: Vec::new(),
                next_listener: 0,
            })),
        }
    }

    pub fn tag(&self) -> String {
        self.data.borrow().tag.clone()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.data.borrow().attributes.get(name).cloned()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.data.borrow().attributes.contains_key(name)
    }

    pub fn attributes(&self) -> IndexMap<String, String> {
        self.data.borrow().attributes.clone()
    }

    pub fn style_property(&self, property: &str) -> Option<String> {
        self.data.borrow().style.get(property).cloned()
    }

    pub fn style(&self) -> IndexMap<String, String> {
        self.data.borrow().style.clone()
    }

    /// `alt` property; reflected to the `alt` attribute like the custom element does.
    pub fn alt(&self) -> Option<String> {
        self.attribute("alt")
    }

    pub fn listener_count(&self, kind: ViewerEventKind) -> usize {
        self.data
            .borrow()
            .listeners
            .iter()
            .filter(|(_, listener_kind, _)| *listener_kind == kind)
            .count()
    }

    /// Deliver `event` to listeners of its kind. Returns how many ran.
    pub fn dispatch(&self, event: ViewerEvent) -> usize {
        let kind = event.kind();
        let handlers: Vec<Handler> = self
            .data
            .borrow()
            .listeners
            .iter()
            .filter(|(_, listener_kind, _)| *listener_kind == kind)
            .map(|(_, _, handler)| handler.clone())
            .collect();

        let mut ran = 0;
        for handler in handlers {
            if let Ok(mut handler) = handler.try_borrow_mut() {
                (*handler)(event.clone());
                ran += 1;
            }
        }
        ran
    }

    /// Serialize as a start/end tag pair with the style folded into a
    /// `style` attribute. Valueless attributes are written bare.
    pub fn to_html(&self) -> String {
        let data = self.data.borrow();
        let mut html = format!("<{}", data.tag);
        for (name, value) in &data.attributes {
            html.push(' ');
            html.push_str(name);
            if !value.is_empty() {
                html.push_str(&format!("=\"{}\"", escape_attribute(value)));
            }
        }
        if !data.style.is_empty() {
            html.push_str(&format!(" style=\"{}\"", escape_attribute(&style_text(&data.style))));
        }
        html.push_str(&format!("></{}>", data.tag));
        html
    }
}

impl std::fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_html())
    }
}

/// Detaches its handler from the element when dropped.
pub struct MemoryListener {
    element: Weak<RefCell<ElementData>>,
    id: u64,
}

impl Drop for MemoryListener {
    fn drop(&mut self) {
        if let Some(element) = self.element.upgrade() {
            element
                .borrow_mut()
                .listeners
                .retain(|(id, _, _)| *id != self.id);
        }
    }
}

impl ViewerElement for MemoryElement {
    type Listener = MemoryListener;

    fn set_style_property(&self, property: &str, value: &str) -> Result<(), SurfaceError> {
        validate_style_property(property)?;
        let property = css_property_name(property);
        let mut data = self.data.borrow_mut();
        if value.is_empty() {
            data.style.shift_remove(property.as_ref());
        } else {
            data.style.insert(property.into_owned(), value.to_string());
        }
        Ok(())
    }

    /// Setting `style` replaces the whole declaration block, as in a DOM.
    fn set_attribute(&self, name: &str, value: &str) -> Result<(), SurfaceError> {
        validate_attribute_name(name)?;
        let mut data = self.data.borrow_mut();
        if name == "style" {
            data.style = parse_style(value);
        } else {
            data.attributes.insert(name.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_attribute(&self, name: &str) -> Result<(), SurfaceError> {
        let mut data = self.data.borrow_mut();
        if name == "style" {
            data.style.clear();
        } else {
            data.attributes.shift_remove(name);
        }
        Ok(())
    }

    fn set_alt(&self, alt: &str) -> Result<(), SurfaceError> {
        self.data
            .borrow_mut()
            .attributes
            .insert("alt".to_string(), alt.to_string());
        Ok(())
    }

    fn listen(
        &self,
        kind: ViewerEventKind,
        handler: Box<dyn FnMut(ViewerEvent)>,
    ) -> Result<Self::Listener, SurfaceError> {
        let mut data = self.data.borrow_mut();
        let id = data.next_listener;
        data.next_listener += 1;
        data.listeners.push((id, kind, Rc::new(RefCell::new(handler))));
        Ok(MemoryListener {
            element: Rc::downgrade(&self.data),
            id,
        })
    }
}

/// Parent node collecting appended viewers.
#[derive(Clone, Default)]
pub struct MemoryContainer {
    children: Rc<RefCell<Vec<MemoryElement>>>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self) -> Vec<MemoryElement> {
        self.children.borrow().clone()
    }

    pub fn to_html(&self) -> String {
        self.children
            .borrow()
            .iter()
            .map(MemoryElement::to_html)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Container for MemoryContainer {
    type Element = MemoryElement;

    fn create_viewer(&self, tag: &str) -> Result<Self::Element, SurfaceError> {
        Ok(MemoryElement::new(tag))
    }

    fn append_viewer(&self, element: &Self::Element) -> Result<(), SurfaceError> {
        self.children.borrow_mut().push(element.clone());
        Ok(())
    }
}

fn style_text(style: &IndexMap<String, String>) -> String {
    style
        .iter()
        .map(|(property, value)| format!("{}: {};", property, value))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_style(text: &str) -> IndexMap<String, String> {
    text.split(';')
        .filter_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            let (property, value) = (property.trim(), value.trim());
            if property.is_empty() || value.is_empty() {
                return None;
            }
            Some((property.to_string(), value.to_string()))
        })
        .collect()
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
