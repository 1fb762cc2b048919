//! Events travelling from the viewer back to the host model.

use serde::{Deserialize, Serialize};

/// Pointer position and target of a click on the viewer.
///
/// Field names follow the DOM `MouseEvent` naming on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickPayload {
    #[serde(rename = "clientX")]
    pub client_x: i32,
    #[serde(rename = "clientY")]
    pub client_y: i32,
    /// Tag name of the element the click landed on, e.g. `MODEL-VIEWER`.
    pub target: String,
}

impl ClickPayload {
    pub fn new(client_x: i32, client_y: i32, target: impl Into<String>) -> Self {
        Self {
            client_x,
            client_y,
            target: target.into(),
        }
    }
}

/// Detail of a `camera-change` event emitted by the viewer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraChange {
    /// What moved the camera: `user-interaction`, `automatic` or `none`.
    pub source: String,
}

/// Event sent to the host with `send_event`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data", rename_all = "kebab-case")]
pub enum ModelEvent {
    Click(ClickPayload),
}

impl ModelEvent {
    /// Event name the host dispatches on.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Click(_) => "click",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn click_payload_uses_dom_names() {
        let payload = ClickPayload::new(10, 20, "IMG");
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"clientX": 10, "clientY": 20, "target": "IMG"})
        );
    }

    #[test]
    fn model_event_carries_name_and_data() {
        let event = ModelEvent::Click(ClickPayload::new(100, 200, "MODEL-VIEWER"));
        assert_eq!(event.name(), "click");
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "name": "click",
                "data": {"clientX": 100, "clientY": 200, "target": "MODEL-VIEWER"}
            })
        );
    }
}
