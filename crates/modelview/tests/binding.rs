//! End-to-end behaviour of a binding against the in-memory host.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;
use modelview::platform::memory::{MemoryContainer, MemoryElement};
use modelview::scene::{ClickPayload, Field, ModelEvent, ViewerState};
use modelview::{
    bind, BindOptions, Binding, InvalidKeyPolicy, LocalModel, Subscription, ViewBinder,
    ViewerElement, ViewerEvent, ViewerEventKind, WidgetModel,
};

fn bound(state: ViewerState) -> (Rc<LocalModel>, MemoryContainer, Binding<MemoryElement>) {
    let model = LocalModel::shared(state);
    let container = MemoryContainer::new();
    let binding = bind(&model, &container).unwrap();
    (model, container, binding)
}

fn chair() -> ViewerState {
    ViewerState {
        alt: Some("Chair".to_string()),
        src: Some("chair.glb".to_string()),
        poster: None,
        auto_rotate: true,
        camera_controls: false,
        ..ViewerState::default()
    }
    .with_style("width", "50%")
    .with_html_attr("data-id", "42")
}

#[test]
fn chair_scenario() {
    let (_model, container, binding) = bound(chair());
    let element = binding.element();

    assert_eq!(container.children().len(), 1);
    assert_eq!(element.alt().as_deref(), Some("Chair"));
    assert_eq!(element.attribute("src").as_deref(), Some("chair.glb"));
    assert!(!element.has_attribute("poster"));
    assert_eq!(element.attribute("auto-rotate").as_deref(), Some(""));
    assert!(!element.has_attribute("camera-controls"));
    assert_eq!(element.style_property("width").as_deref(), Some("50%"));
    assert_eq!(element.attribute("data-id").as_deref(), Some("42"));
}

#[test]
fn flags_follow_model() {
    let (model, _container, binding) = bound(ViewerState::default());
    let element = binding.element();

    assert!(!element.has_attribute("auto-rotate"));
    assert!(element.has_attribute("camera-controls"));

    model.set_auto_rotate(true);
    model.set_camera_controls(false);
    assert_eq!(element.attribute("auto-rotate").as_deref(), Some(""));
    assert!(!element.has_attribute("camera-controls"));

    model.set_auto_rotate(false);
    model.set_camera_controls(true);
    assert!(!element.has_attribute("auto-rotate"));
    assert_eq!(element.attribute("camera-controls").as_deref(), Some(""));
}

#[test]
fn src_and_poster_follow_truthiness() {
    let (model, _container, binding) = bound(ViewerState::default().with_poster("poster.png"));
    let element = binding.element();

    assert!(!element.has_attribute("src"));
    assert_eq!(element.attribute("poster").as_deref(), Some("poster.png"));

    model.set_src(Some("a.glb"));
    assert_eq!(element.attribute("src").as_deref(), Some("a.glb"));

    model.set_src(Some(""));
    assert!(!element.has_attribute("src"));

    model.set_poster(None);
    assert!(!element.has_attribute("poster"));

    model.set_src(Some("b.glb"));
    assert_eq!(element.attribute("src").as_deref(), Some("b.glb"));
}

#[test]
fn alt_is_copied_verbatim() {
    let (model, _container, binding) = bound(ViewerState::default());
    let element = binding.element();
    assert_eq!(element.alt().as_deref(), Some("A 3D model"));

    model.set_alt(Some(""));
    assert_eq!(element.alt().as_deref(), Some(""));

    model.set_alt(None);
    assert_eq!(element.alt().as_deref(), Some(""));

    model.set_alt(Some("Astronaut"));
    assert_eq!(element.alt().as_deref(), Some("Astronaut"));
}

#[test]
fn style_change_reapplies_current_mapping() {
    let (model, _container, binding) = bound(ViewerState::default().with_style("width", "50%"));
    let element = binding.element();

    let mut style = IndexMap::new();
    style.insert("background-color".to_string(), "#444444".to_string());
    style.insert("--poster-color".to_string(), "#ff0000".to_string());
    model.set_style(style);

    assert_eq!(element.style_property("background-color").as_deref(), Some("#444444"));
    assert_eq!(element.style_property("--poster-color").as_deref(), Some("#ff0000"));
    // Properties missing from the new mapping are left as they were.
    assert_eq!(element.style_property("width").as_deref(), Some("50%"));
}

#[test]
fn html_attrs_are_applied_once() {
    let (model, _container, binding) = bound(chair());
    let element = binding.element();

    let mut attrs = IndexMap::new();
    attrs.insert("data-id".to_string(), "7".to_string());
    attrs.insert("data-extra".to_string(), "yes".to_string());
    model.set_html_attrs(attrs);

    assert_eq!(element.attribute("data-id").as_deref(), Some("42"));
    assert!(!element.has_attribute("data-extra"));
}

#[test]
fn click_is_forwarded_once_per_click() {
    let (model, _container, binding) = bound(chair());
    let click = ViewerEvent::Click(ClickPayload::new(10, 20, "IMG"));

    binding.element().dispatch(click.clone());
    assert_eq!(
        model.sent_events(),
        vec![ModelEvent::Click(ClickPayload::new(10, 20, "IMG"))]
    );
    assert_eq!(model.clicked(), Some(ClickPayload::new(10, 20, "IMG")));

    binding.element().dispatch(click);
    assert_eq!(model.sent_events().len(), 2);
}

#[test]
fn error_event_is_only_logged() {
    let (model, _container, binding) = bound(chair());
    let ran = binding.element().dispatch(ViewerEvent::Error {
        detail: "failed to load chair.glb".to_string(),
    });

    assert_eq!(ran, 1);
    assert!(model.sent_events().is_empty());

    // The binding keeps working afterwards.
    model.set_src(Some("other.glb"));
    assert_eq!(binding.element().attribute("src").as_deref(), Some("other.glb"));
}

#[test]
fn binding_twice_duplicates_everything() {
    let model = LocalModel::shared(chair());
    let container = MemoryContainer::new();
    let first = bind(&model, &container).unwrap();
    let second = bind(&model, &container).unwrap();

    assert_eq!(container.children().len(), 2);
    assert_eq!(model.subscriber_count(Field::Src), 2);

    model.set_src(Some("shared.glb"));
    assert_eq!(first.element().attribute("src").as_deref(), Some("shared.glb"));
    assert_eq!(second.element().attribute("src").as_deref(), Some("shared.glb"));
}

#[test]
fn unbind_detaches_listeners_but_keeps_element() {
    let (model, container, binding) = bound(chair());
    let element = binding.element().clone();
    binding.unbind();

    for field in Field::SYNCED {
        assert_eq!(model.subscriber_count(field), 0);
    }
    assert_eq!(element.listener_count(ViewerEventKind::Click), 0);

    model.set_src(Some("after.glb"));
    assert_eq!(element.attribute("src").as_deref(), Some("chair.glb"));

    let ran = element.dispatch(ViewerEvent::Click(ClickPayload::new(1, 1, "MODEL-VIEWER")));
    assert_eq!(ran, 0);
    assert!(model.sent_events().is_empty());
    assert_eq!(container.children().len(), 1);
}

/// A model whose change callbacks and send count outlive it.
struct CountingModel {
    src: Option<String>,
    callbacks: Rc<RefCell<Vec<Box<dyn FnMut()>>>>,
    sent: Rc<Cell<usize>>,
}

impl WidgetModel for CountingModel {
    fn src(&self) -> Option<String> {
        self.src.clone()
    }
    fn alt(&self) -> Option<String> {
        None
    }
    fn poster(&self) -> Option<String> {
        None
    }
    fn auto_rotate(&self) -> bool {
        false
    }
    fn camera_controls(&self) -> bool {
        false
    }
    fn style(&self) -> IndexMap<String, String> {
        IndexMap::new()
    }
    fn html_attrs(&self) -> IndexMap<String, String> {
        IndexMap::new()
    }
    fn on_change(&self, _field: Field, callback: Box<dyn FnMut()>) -> Subscription {
        self.callbacks.borrow_mut().push(callback);
        Subscription::noop()
    }
    fn send_event(&self, _event: ModelEvent) {
        self.sent.set(self.sent.get() + 1);
    }
}

#[test]
fn dropped_model_silences_listeners() {
    let callbacks = Rc::new(RefCell::new(Vec::new()));
    let sent = Rc::new(Cell::new(0));
    let model = Rc::new(CountingModel {
        src: Some("chair.glb".to_string()),
        callbacks: callbacks.clone(),
        sent: sent.clone(),
    });
    let container = MemoryContainer::new();
    let binding = bind(&model, &container).unwrap();
    let element = binding.element().clone();
    let click = ViewerEvent::Click(ClickPayload::new(1, 1, "MODEL-VIEWER"));

    element.dispatch(click.clone());
    assert_eq!(sent.get(), 1);

    element.remove_attribute("src").unwrap();
    drop(model);

    assert_eq!(element.dispatch(click), 1);
    assert_eq!(sent.get(), 1);

    for callback in callbacks.borrow_mut().iter_mut() {
        callback();
    }
    assert!(!element.has_attribute("src"));
    drop(binding);
}

fn bound_with_policy(policy: InvalidKeyPolicy) -> (Rc<LocalModel>, Binding<MemoryElement>) {
    let model = LocalModel::shared(ViewerState::default());
    let container = MemoryContainer::new();
    let options = BindOptions {
        invalid_keys: policy,
        ..BindOptions::default()
    };
    let binding = ViewBinder::new().options(options).bind(&model, &container).unwrap();
    (model, binding)
}

fn style_with_rejected_key() -> IndexMap<String, String> {
    let mut style = IndexMap::new();
    style.insert("width".to_string(), "50%".to_string());
    style.insert("bad key".to_string(), "x".to_string());
    style.insert("height".to_string(), "10px".to_string());
    style
}

#[test]
fn style_change_stops_at_rejected_key_under_abort() {
    let (model, binding) = bound_with_policy(InvalidKeyPolicy::Abort);
    model.set_style(style_with_rejected_key());

    let element = binding.element();
    assert_eq!(element.style_property("width").as_deref(), Some("50%"));
    assert_eq!(element.style_property("height").as_deref(), Some("100%"));

    // The listener stays registered after the failed pass.
    let mut style = IndexMap::new();
    style.insert("height".to_string(), "20px".to_string());
    model.set_style(style);
    assert_eq!(element.style_property("height").as_deref(), Some("20px"));
}

#[test]
fn style_change_skips_rejected_key_by_default() {
    let (model, binding) = bound_with_policy(InvalidKeyPolicy::Skip);
    model.set_style(style_with_rejected_key());

    let element = binding.element();
    assert_eq!(element.style_property("width").as_deref(), Some("50%"));
    assert_eq!(element.style_property("height").as_deref(), Some("10px"));
}

#[test]
fn detached_binding_keeps_syncing() {
    let model = LocalModel::shared(ViewerState {
        src: Some("a.glb".to_string()),
        ..ViewerState::default()
    });
    let container = MemoryContainer::new();
    let element = bind(&model, &container).unwrap().detach();

    assert_eq!(model.subscriber_count(Field::Src), 1);
    assert_eq!(element.listener_count(ViewerEventKind::Click), 1);

    model.set_src(Some("b.glb"));
    assert_eq!(element.attribute("src").as_deref(), Some("b.glb"));

    element.dispatch(ViewerEvent::Click(ClickPayload::new(10, 20, "IMG")));
    assert_eq!(
        model.sent_events(),
        vec![ModelEvent::Click(ClickPayload::new(10, 20, "IMG"))]
    );
}

#[test]
fn markup_reflects_state() {
    let (_model, container, _binding) = bound(chair());
    assert_eq!(
        container.to_html(),
        "<model-viewer alt=\"Chair\" src=\"chair.glb\" auto-rotate data-id=\"42\" \
         style=\"display: block; width: 50%; height: 100%;\"></model-viewer>"
    );
}
