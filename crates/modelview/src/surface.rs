//! Capabilities the binder needs from its host.
//!
//! The binder never talks to a DOM or a widget framework directly. A host
//! supplies a [`Container`] that can create and adopt viewer elements, the
//! [`ViewerElement`] itself, and a [`WidgetModel`] to read state from.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use modelview_scene::{CameraChange, ClickPayload, Field, ModelEvent};

/// DOM events the binder listens for on the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewerEventKind {
    Click,
    Error,
    CameraChange,
}

impl ViewerEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Error => "error",
            Self::CameraChange => "camera-change",
        }
    }
}

/// A DOM event already decoded into the parts the binder uses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewerEvent {
    Click(ClickPayload),
    Error { detail: String },
    CameraChange(CameraChange),
}

impl ViewerEvent {
    pub fn kind(&self) -> ViewerEventKind {
        match self {
            Self::Click(_) => ViewerEventKind::Click,
            Self::Error { .. } => ViewerEventKind::Error,
            Self::CameraChange(_) => ViewerEventKind::CameraChange,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceError {
    /// A style property or attribute name the element rejects.
    InvalidName { kind: NameKind, name: String },
    /// The host raised an error while performing the operation.
    Host(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameKind {
    StyleProperty,
    Attribute,
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName { kind: NameKind::StyleProperty, name } => {
                write!(f, "invalid style property name '{}'", name)
            }
            Self::InvalidName { kind: NameKind::Attribute, name } => {
                write!(f, "invalid attribute name '{}'", name)
            }
            Self::Host(message) => write!(f, "host error: {}", message),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// The element the binder drives.
///
/// Handles are cheap clones of one underlying element, the way DOM
/// references are. Methods take `&self`.
pub trait ViewerElement: Clone + 'static {
    /// Keeps a DOM listener attached; dropping it detaches the listener.
    type Listener;

    /// Assign a presentation property. An empty value clears the property.
    fn set_style_property(&self, property: &str, value: &str) -> Result<(), SurfaceError>;

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), SurfaceError>;

    /// Removing an absent attribute is not an error.
    fn remove_attribute(&self, name: &str) -> Result<(), SurfaceError>;

    /// Set the viewer's `alt` property.
    fn set_alt(&self, alt: &str) -> Result<(), SurfaceError>;

    fn listen(
        &self,
        kind: ViewerEventKind,
        handler: Box<dyn FnMut(ViewerEvent)>,
    ) -> Result<Self::Listener, SurfaceError>;
}

/// Node the viewer is created for and appended to.
pub trait Container {
    type Element: ViewerElement;

    fn create_viewer(&self, tag: &str) -> Result<Self::Element, SurfaceError>;

    fn append_viewer(&self, element: &Self::Element) -> Result<(), SurfaceError>;
}

/// Host-owned widget model.
///
/// Getters return the value at call time; the binder calls them again from
/// every change callback instead of caching.
pub trait WidgetModel: 'static {
    fn src(&self) -> Option<String>;
    fn alt(&self) -> Option<String>;
    fn poster(&self) -> Option<String>;
    fn auto_rotate(&self) -> bool;
    fn camera_controls(&self) -> bool;
    fn style(&self) -> IndexMap<String, String>;
    fn html_attrs(&self) -> IndexMap<String, String>;

    /// Call `callback` whenever `field` changes, until the returned
    /// subscription is cancelled or dropped.
    fn on_change(&self, field: Field, callback: Box<dyn FnMut()>) -> Subscription;

    /// Fire-and-forget notification to the host.
    fn send_event(&self, event: ModelEvent);
}

/// Registration returned by [`WidgetModel::on_change`].
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to undo.
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// CSS property names: identifiers and custom properties (`--name`).
pub fn validate_style_property(name: &str) -> Result<(), SurfaceError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SurfaceError::InvalidName {
            kind: NameKind::StyleProperty,
            name: name.to_string(),
        })
    }
}

/// Spell a style property the way `setProperty` expects it. Script-style
/// names (`backgroundColor`, `WebkitTransform`) become hyphenated; custom
/// properties are kept verbatim.
pub fn css_property_name(name: &str) -> Cow<'_, str> {
    if name.starts_with("--") || !name.chars().any(|c| c.is_ascii_uppercase()) {
        return Cow::Borrowed(name);
    }
    let mut css = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            css.push('-');
            css.push(c.to_ascii_lowercase());
        } else {
            css.push(c);
        }
    }
    Cow::Owned(css)
}

/// Attribute names as accepted by `setAttribute`.
pub fn validate_attribute_name(name: &str) -> Result<(), SurfaceError> {
    let valid = !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<')
        });
    if valid {
        Ok(())
    } else {
        Err(SurfaceError::InvalidName {
            kind: NameKind::Attribute,
            name: name.to_string(),
        })
    }
}
