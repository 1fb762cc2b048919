//! Model field → element attribute passes.
//!
//! Each pass reads the field off the model when it runs. The same functions
//! serve the initial bind and every later change callback.

use indexmap::IndexMap;
use modelview_scene::Field;
use modelview_scene::state::truthy;

use crate::binder::InvalidKeyPolicy;
use crate::surface::{SurfaceError, ViewerElement, WidgetModel};

/// Apply one field to the element. `clicked` has no element counterpart and
/// leaves it untouched.
pub(crate) fn sync_field<M, E>(
    field: Field,
    model: &M,
    element: &E,
    policy: InvalidKeyPolicy,
) -> Result<(), SurfaceError>
where
    M: WidgetModel + ?Sized,
    E: ViewerElement,
{
    match field {
        Field::Src => sync_optional(element, "src", model.src().as_deref()),
        Field::Poster => sync_optional(element, "poster", model.poster().as_deref()),
        Field::Alt => element.set_alt(model.alt().as_deref().unwrap_or_default()),
        Field::AutoRotate => sync_presence(element, "auto-rotate", model.auto_rotate()),
        Field::CameraControls => {
            sync_presence(element, "camera-controls", model.camera_controls())
        }
        Field::Style => apply_style(element, &model.style(), policy),
        Field::HtmlAttrs => apply_attributes(element, &model.html_attrs(), policy),
        Field::Clicked => Ok(()),
    }
}

/// Set `name` to `value` when it is truthy, remove it otherwise.
fn sync_optional<E: ViewerElement>(
    element: &E,
    name: &str,
    value: Option<&str>,
) -> Result<(), SurfaceError> {
    match truthy(value) {
        Some(value) => element.set_attribute(name, value),
        None => element.remove_attribute(name),
    }
}

/// Valueless presence attribute.
fn sync_presence<E: ViewerElement>(
    element: &E,
    name: &str,
    present: bool,
) -> Result<(), SurfaceError> {
    if present {
        element.set_attribute(name, "")
    } else {
        element.remove_attribute(name)
    }
}

fn apply_style<E: ViewerElement>(
    element: &E,
    style: &IndexMap<String, String>,
    policy: InvalidKeyPolicy,
) -> Result<(), SurfaceError> {
    apply_entries(style, policy, |property, value| {
        element.set_style_property(property, value)
    })
}

fn apply_attributes<E: ViewerElement>(
    element: &E,
    attributes: &IndexMap<String, String>,
    policy: InvalidKeyPolicy,
) -> Result<(), SurfaceError> {
    apply_entries(attributes, policy, |name, value| element.set_attribute(name, value))
}

fn apply_entries(
    entries: &IndexMap<String, String>,
    policy: InvalidKeyPolicy,
    mut apply: impl FnMut(&str, &str) -> Result<(), SurfaceError>,
) -> Result<(), SurfaceError> {
    for (key, value) in entries {
        if let Err(error) = apply(key, value) {
            match policy {
                InvalidKeyPolicy::Skip => log::warn!("skipping '{}': {}", key, error),
                InvalidKeyPolicy::Abort => return Err(error),
            }
        }
    }
    Ok(())
}
