//! Snapshot of everything a viewer widget model holds.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::event::ClickPayload;
use crate::source::{ModelSource, SourceError};

/// Widget model state.
///
/// Missing keys deserialize to the widget defaults, so a JSON document only
/// needs to name the fields it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerState {
    pub src: Option<String>,
    pub alt: Option<String>,
    pub poster: Option<String>,
    pub auto_rotate: bool,
    pub camera_controls: bool,
    /// CSS property name → value.
    pub style: IndexMap<String, String>,
    /// Extra attributes, applied once when the viewer is created.
    pub html_attrs: IndexMap<String, String>,
    /// Last click forwarded by the viewer.
    pub clicked: Option<ClickPayload>,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            src: None,
            alt: Some("A 3D model".to_string()),
            poster: None,
            auto_rotate: false,
            camera_controls: true,
            style: IndexMap::new(),
            html_attrs: IndexMap::new(),
            clicked: None,
        }
    }
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `source` and store it as `src`.
    pub fn with_source(mut self, source: impl Into<ModelSource>) -> Result<Self, SourceError> {
        self.src = Some(source.into().resolve()?);
        Ok(self)
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    pub fn with_poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = Some(poster.into());
        self
    }

    pub fn with_auto_rotate(mut self, auto_rotate: bool) -> Self {
        self.auto_rotate = auto_rotate;
        self
    }

    pub fn with_camera_controls(mut self, camera_controls: bool) -> Self {
        self.camera_controls = camera_controls;
        self
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(property.into(), value.into());
        self
    }

    pub fn with_html_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.html_attrs.insert(name.into(), value.into());
        self
    }

    /// `src` if it is set and non-empty.
    pub fn truthy_src(&self) -> Option<&str> {
        truthy(self.src.as_deref())
    }

    /// `poster` if it is set and non-empty.
    pub fn truthy_poster(&self) -> Option<&str> {
        truthy(self.poster.as_deref())
    }
}

/// Empty strings count as unset, matching how the host treats them.
pub fn truthy(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
