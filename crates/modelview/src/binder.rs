//! Binds a widget model to a freshly created `<model-viewer>` element.
//!
//! Binding is a single linear pass:
//! 1. create the element and give it a filling layout
//! 2. copy model state onto it (`alt`, `src`, `poster`, flags, style, extra attributes)
//! 3. append it to the container
//! 4. subscribe to model changes and to the element's DOM events
//!
//! Extra attributes (`html_attrs`) are copied once and never re-synced.

use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};

use modelview_scene::{CameraChange, Field, ModelEvent, VIEWER_TAG};
use serde::{Deserialize, Serialize};

use crate::surface::{
    Container, Subscription, SurfaceError, ViewerElement, ViewerEvent, ViewerEventKind,
    WidgetModel,
};
use crate::sync::sync_field;

/// Order of the initial pass. Change callbacks use `Field::SYNCED`.
const INITIAL_SYNC: [Field; 6] = [
    Field::Alt,
    Field::Src,
    Field::Poster,
    Field::AutoRotate,
    Field::CameraControls,
    Field::Style,
];

/// What to do with a style property or attribute the element rejects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidKeyPolicy {
    /// Log a warning and continue with the remaining entries.
    #[default]
    Skip,
    /// Stop applying the mapping. `bind` returns the error; change
    /// callbacks log it.
    Abort,
}

/// Binder configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindOptions {
    pub display: String,
    pub width: String,
    pub height: String,
    pub invalid_keys: InvalidKeyPolicy,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            display: "block".to_string(),
            width: "100%".to_string(),
            height: "100%".to_string(),
            invalid_keys: InvalidKeyPolicy::default(),
        }
    }
}

/// Decides what a `camera-change` event turns into.
///
/// The binding hands every camera change to the strategy and sends whatever
/// it returns to the model. Throttled camera telemetry plugs in here.
pub trait CameraChangeStrategy {
    fn on_camera_change(&mut self, change: &CameraChange) -> Option<ModelEvent>;
}

/// Drops every camera change.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoreCameraChange;

impl CameraChangeStrategy for IgnoreCameraChange {
    fn on_camera_change(&mut self, _change: &CameraChange) -> Option<ModelEvent> {
        None
    }
}

#[derive(Debug)]
pub enum BindError {
    /// The viewer element could not be created.
    Create(SurfaceError),
    /// The element rejected part of the initial state.
    Surface { field: Field, error: SurfaceError },
    /// The container refused the element.
    Append(SurfaceError),
    /// A DOM listener could not be attached.
    Listen { event: &'static str, error: SurfaceError },
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create(error) => write!(f, "failed to create <{}>: {}", VIEWER_TAG, error),
            Self::Surface { field, error } => write!(f, "failed to apply '{}': {}", field, error),
            Self::Append(error) => write!(f, "failed to append <{}>: {}", VIEWER_TAG, error),
            Self::Listen { event, error } => {
                write!(f, "failed to listen for '{}': {}", event, error)
            }
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Create(error) | Self::Append(error) => Some(error),
            Self::Surface { error, .. } | Self::Listen { error, .. } => Some(error),
        }
    }
}

/// Bind with default options and the ignoring camera strategy.
pub fn bind<M, C>(model: &Rc<M>, container: &C) -> Result<Binding<C::Element>, BindError>
where
    M: WidgetModel,
    C: Container,
{
    ViewBinder::new().bind(model, container)
}

/// Configured binder. Consumed by [`ViewBinder::bind`].
pub struct ViewBinder {
    options: BindOptions,
    camera: Box<dyn CameraChangeStrategy>,
}

impl Default for ViewBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewBinder {
    pub fn new() -> Self {
        Self {
            options: BindOptions::default(),
            camera: Box::new(IgnoreCameraChange),
        }
    }

    pub fn options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    pub fn camera_strategy(mut self, strategy: impl CameraChangeStrategy + 'static) -> Self {
        self.camera = Box::new(strategy);
        self
    }

    pub fn bind<M, C>(self, model: &Rc<M>, container: &C) -> Result<Binding<C::Element>, BindError>
    where
        M: WidgetModel,
        C: Container,
    {
        let Self { options, camera } = self;
        let policy = options.invalid_keys;

        let element = container.create_viewer(VIEWER_TAG).map_err(BindError::Create)?;
        apply_layout(&element, &options)?;

        for field in INITIAL_SYNC {
            sync_field(field, &**model, &element, policy)
                .map_err(|error| BindError::Surface { field, error })?;
        }
        // Applied once; no change subscription for extra attributes.
        sync_field(Field::HtmlAttrs, &**model, &element, policy).map_err(|error| {
            BindError::Surface {
                field: Field::HtmlAttrs,
                error,
            }
        })?;

        container.append_viewer(&element).map_err(BindError::Append)?;

        let weak = Rc::downgrade(model);
        let subscriptions = Field::SYNCED
            .iter()
            .map(|&field| subscribe(&**model, weak.clone(), &element, field, policy))
            .collect();

        let listeners = vec![
            listen(&element, ViewerEventKind::CameraChange, camera_handler(weak.clone(), camera))?,
            listen(&element, ViewerEventKind::Click, click_handler(weak))?,
            listen(&element, ViewerEventKind::Error, Box::new(error_handler))?,
        ];

        log::debug!("bound <{}>", VIEWER_TAG);
        Ok(Binding {
            element,
            subscriptions,
            listeners,
        })
    }
}

/// A live binding. Dropping it, or calling [`Binding::unbind`], detaches
/// every model and DOM listener. The element stays in its container.
///
/// Call [`Binding::detach`] to keep the listeners for the rest of the
/// program instead.
#[must_use = "dropping a Binding detaches every listener"]
pub struct Binding<E: ViewerElement> {
    element: E,
    subscriptions: Vec<Subscription>,
    listeners: Vec<E::Listener>,
}

impl<E: ViewerElement> Binding<E> {
    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Leak every subscription and listener so they live as long as the
    /// element does. Returns the element.
    pub fn detach(self) -> E {
        let Binding {
            element,
            subscriptions,
            listeners,
        } = self;
        log::debug!(
            "detaching <{}>: {} subscriptions, {} listeners kept alive",
            VIEWER_TAG,
            subscriptions.len(),
            listeners.len()
        );
        mem::forget(subscriptions);
        mem::forget(listeners);
        element
    }

    pub fn unbind(self) {
        log::debug!(
            "unbinding <{}>: {} subscriptions, {} listeners",
            VIEWER_TAG,
            self.subscriptions.len(),
            self.listeners.len()
        );
    }
}

impl<E: ViewerElement> fmt::Debug for Binding<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("subscriptions", &self.subscriptions.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn apply_layout<E: ViewerElement>(element: &E, options: &BindOptions) -> Result<(), BindError> {
    let layout = [
        ("display", options.display.as_str()),
        ("width", options.width.as_str()),
        ("height", options.height.as_str()),
    ];
    for (property, value) in layout {
        element
            .set_style_property(property, value)
            .map_err(|error| BindError::Surface {
                field: Field::Style,
                error,
            })?;
    }
    Ok(())
}

fn subscribe<M, E>(
    model: &M,
    weak: Weak<M>,
    element: &E,
    field: Field,
    policy: InvalidKeyPolicy,
) -> Subscription
where
    M: WidgetModel,
    E: ViewerElement,
{
    let element = element.clone();
    model.on_change(
        field,
        Box::new(move || {
            let Some(model) = weak.upgrade() else {
                return;
            };
            if let Err(error) = sync_field(field, &*model, &element, policy) {
                log::warn!("failed to sync '{}': {}", field, error);
            }
        }),
    )
}

fn listen<E: ViewerElement>(
    element: &E,
    kind: ViewerEventKind,
    handler: Box<dyn FnMut(ViewerEvent)>,
) -> Result<E::Listener, BindError> {
    element.listen(kind, handler).map_err(|error| BindError::Listen {
        event: kind.name(),
        error,
    })
}

fn camera_handler<M: WidgetModel>(
    weak: Weak<M>,
    mut strategy: Box<dyn CameraChangeStrategy>,
) -> Box<dyn FnMut(ViewerEvent)> {
    Box::new(move |event| {
        let ViewerEvent::CameraChange(change) = event else {
            return;
        };
        if let Some(forward) = strategy.on_camera_change(&change) {
            if let Some(model) = weak.upgrade() {
                model.send_event(forward);
            }
        }
    })
}

fn click_handler<M: WidgetModel>(weak: Weak<M>) -> Box<dyn FnMut(ViewerEvent)> {
    Box::new(move |event| {
        let ViewerEvent::Click(payload) = event else {
            return;
        };
        if let Some(model) = weak.upgrade() {
            model.send_event(ModelEvent::Click(payload));
        }
    })
}

fn error_handler(event: ViewerEvent) {
    if let ViewerEvent::Error { detail } = event {
        log::error!("ModelViewer error: {}", detail);
    }
}
