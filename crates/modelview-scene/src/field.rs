//! Typed identifiers for observable model fields.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A field of the widget model that can be observed for changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Src,
    Alt,
    Poster,
    AutoRotate,
    CameraControls,
    Style,
    HtmlAttrs,
    Clicked,
}

impl Field {
    /// Fields the binding keeps in sync after the initial pass.
    ///
    /// `HtmlAttrs` is deliberately absent: extra attributes are applied once.
    pub const SYNCED: [Field; 6] = [
        Field::Src,
        Field::Alt,
        Field::AutoRotate,
        Field::CameraControls,
        Field::Poster,
        Field::Style,
    ];

    /// Name of the field as the host model exposes it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Src => "src",
            Self::Alt => "alt",
            Self::Poster => "poster",
            Self::AutoRotate => "auto_rotate",
            Self::CameraControls => "camera_controls",
            Self::Style => "style",
            Self::HtmlAttrs => "html_attrs",
            Self::Clicked => "clicked",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let field = match name {
            "src" => Self::Src,
            "alt" => Self::Alt,
            "poster" => Self::Poster,
            "auto_rotate" => Self::AutoRotate,
            "camera_controls" => Self::CameraControls,
            "style" => Self::Style,
            "html_attrs" => Self::HtmlAttrs,
            "clicked" => Self::Clicked,
            _ => return None,
        };
        Some(field)
    }

    /// Presence attribute toggled by a boolean field, if this is one.
    pub fn presence_attribute(&self) -> Option<&'static str> {
        match self {
            Self::AutoRotate => Some("auto-rotate"),
            Self::CameraControls => Some("camera-controls"),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for field in Field::SYNCED.iter().chain([Field::HtmlAttrs, Field::Clicked].iter()) {
            assert_eq!(Field::from_name(field.name()), Some(*field));
        }
        assert_eq!(Field::from_name("camera-controls"), None);
    }

    #[test]
    fn synced_fields_exclude_html_attrs() {
        assert!(!Field::SYNCED.contains(&Field::HtmlAttrs));
        assert!(!Field::SYNCED.contains(&Field::Clicked));
    }

    #[test]
    fn presence_attributes() {
        assert_eq!(Field::AutoRotate.presence_attribute(), Some("auto-rotate"));
        assert_eq!(Field::CameraControls.presence_attribute(), Some("camera-controls"));
        assert_eq!(Field::Src.presence_attribute(), None);
    }

    #[test]
    fn serializes_as_host_name() {
        let json = serde_json::to_string(&Field::CameraControls).unwrap();
        assert_eq!(json, "\"camera_controls\"");
    }
}
