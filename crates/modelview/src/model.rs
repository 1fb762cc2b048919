//! In-process widget model with synchronous change notification.
//!
//! Stands in for the host framework's model: the CLI renders against it and
//! the tests drive bindings through it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use modelview_scene::{ClickPayload, Field, ModelEvent, ViewerState};

use crate::surface::{Subscription, WidgetModel};

type Callback = Rc<RefCell<Box<dyn FnMut()>>>;

struct Registration {
    id: u64,
    field: Field,
    callback: Callback,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    registrations: Vec<Registration>,
}

impl Registry {
    fn contains(&self, id: u64) -> bool {
        self.registrations.iter().any(|registration| registration.id == id)
    }
}

/// Observable model holding a [`ViewerState`].
pub struct LocalModel {
    state: RefCell<ViewerState>,
    registry: Rc<RefCell<Registry>>,
    sent: RefCell<Vec<ModelEvent>>,
}

impl LocalModel {
    pub fn new(state: ViewerState) -> Self {
        Self {
            state: RefCell::new(state),
            registry: Rc::new(RefCell::new(Registry::default())),
            sent: RefCell::new(Vec::new()),
        }
    }

    /// Shorthand for `Rc::new(LocalModel::new(state))`; bindings take an `Rc`.
    pub fn shared(state: ViewerState) -> Rc<Self> {
        Rc::new(Self::new(state))
    }

    /// Copy of the current state.
    pub fn state(&self) -> ViewerState {
        self.state.borrow().clone()
    }

    /// Mutate the state, then notify subscribers of `field`.
    pub fn update(&self, field: Field, mutate: impl FnOnce(&mut ViewerState)) {
        mutate(&mut self.state.borrow_mut());
        self.notify(field);
    }

    pub fn set_src(&self, src: Option<&str>) {
        self.update(Field::Src, |state| state.src = src.map(str::to_string));
    }

    pub fn set_alt(&self, alt: Option<&str>) {
        self.update(Field::Alt, |state| state.alt = alt.map(str::to_string));
    }

    pub fn set_poster(&self, poster: Option<&str>) {
        self.update(Field::Poster, |state| state.poster = poster.map(str::to_string));
    }

    pub fn set_auto_rotate(&self, auto_rotate: bool) {
        self.update(Field::AutoRotate, |state| state.auto_rotate = auto_rotate);
    }

    pub fn set_camera_controls(&self, camera_controls: bool) {
        self.update(Field::CameraControls, |state| state.camera_controls = camera_controls);
    }

    pub fn set_style(&self, style: IndexMap<String, String>) {
        self.update(Field::Style, |state| state.style = style);
    }

    pub fn set_html_attrs(&self, html_attrs: IndexMap<String, String>) {
        self.update(Field::HtmlAttrs, |state| state.html_attrs = html_attrs);
    }

    /// Last click forwarded by a viewer.
    pub fn clicked(&self) -> Option<ClickPayload> {
        self.state.borrow().clicked.clone()
    }

    /// Every event received through `send_event`, oldest first.
    pub fn sent_events(&self) -> Vec<ModelEvent> {
        self.sent.borrow().clone()
    }

    pub fn take_sent_events(&self) -> Vec<ModelEvent> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }

    pub fn subscriber_count(&self, field: Field) -> usize {
        self.registry
            .borrow()
            .registrations
            .iter()
            .filter(|registration| registration.field == field)
            .count()
    }

    /// Run the callbacks registered for `field`.
    ///
    /// Callbacks registered while dispatching wait for the next change;
    /// callbacks cancelled while dispatching are skipped.
    pub fn notify(&self, field: Field) {
        let pending: Vec<(u64, Callback)> = self
            .registry
            .borrow()
            .registrations
            .iter()
            .filter(|registration| registration.field == field)
            .map(|registration| (registration.id, registration.callback.clone()))
            .collect();

        for (id, callback) in pending {
            if !self.registry.borrow().contains(id) {
                continue;
            }
            match callback.try_borrow_mut() {
                Ok(mut callback) => (*callback)(),
                Err(_) => log::debug!("skipping re-entrant '{}' callback", field),
            }
        }
    }
}

impl Default for LocalModel {
    fn default() -> Self {
        Self::new(ViewerState::default())
    }
}

impl WidgetModel for LocalModel {
    fn src(&self) -> Option<String> {
        self.state.borrow().src.clone()
    }

    fn alt(&self) -> Option<String> {
        self.state.borrow().alt.clone()
    }

    fn poster(&self) -> Option<String> {
        self.state.borrow().poster.clone()
    }

    fn auto_rotate(&self) -> bool {
        self.state.borrow().auto_rotate
    }

    fn camera_controls(&self) -> bool {
        self.state.borrow().camera_controls
    }

    fn style(&self) -> IndexMap<String, String> {
        self.state.borrow().style.clone()
    }

    fn html_attrs(&self) -> IndexMap<String, String> {
        self.state.borrow().html_attrs.clone()
    }

    fn on_change(&self, field: Field, callback: Box<dyn FnMut()>) -> Subscription {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.registrations.push(Registration {
                id,
                field,
                callback: Rc::new(RefCell::new(callback)),
            });
            id
        };
        let registry = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry
                    .borrow_mut()
                    .registrations
                    .retain(|registration| registration.id != id);
            }
        })
    }

    /// Records the event. Clicks also land in `clicked`, which notifies
    /// `Field::Clicked` subscribers.
    fn send_event(&self, event: ModelEvent) {
        self.sent.borrow_mut().push(event.clone());
        match event {
            ModelEvent::Click(payload) => {
                self.update(Field::Clicked, |state| state.clicked = Some(payload));
            }
        }
    }
}

impl fmt::Debug for LocalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalModel")
            .field("state", &self.state.borrow())
            .field("subscribers", &self.registry.borrow().registrations.len())
            .field("sent", &self.sent.borrow().len())
            .finish()
    }
}
