//! Creation checks and the diagnostics they emit.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use dragkit_core::{
    CreateError, DragCallbacks, DragHost, DragMode, DraggableOptions, HeadlessHost, HeadlessNode,
    MemoryStore, PointerInput, Position, Size, try_create_draggable,
};
use pretty_assertions::assert_eq;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_captured_tracing<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(EventCapture {
        events: Arc::clone(&events),
    });
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn setup() -> (HeadlessHost, HeadlessNode) {
    let host = HeadlessHost::new(Size::new(1000.0, 800.0));
    let panel = host.add_element("panel", Size::new(200.0, 100.0));
    (host, panel)
}

fn create(host: &HeadlessHost, id: &str, options: &DraggableOptions) -> Result<(), CreateError> {
    try_create_draggable(
        host.clone(),
        Rc::new(MemoryStore::new()),
        id,
        options,
        DragCallbacks::new(),
    )
    .map(|_| ())
}

#[test]
fn missing_element_is_not_found() {
    let (host, _) = setup();
    assert_eq!(
        create(&host, "ghost", &DraggableOptions::default()),
        Err(CreateError::NotFound {
            id: "ghost".to_owned()
        })
    );
}

#[test]
fn unknown_mode_is_rejected_before_any_mutation() {
    let (host, panel) = setup();
    let options = DraggableOptions {
        mode: Some("window".to_owned()),
        ..DraggableOptions::default()
    };
    assert_eq!(
        create(&host, "panel", &options),
        Err(CreateError::InvalidMode {
            mode: "window".to_owned()
        })
    );
    assert!(!host.has_init_marker(&panel));
    assert_eq!(host.style_display(&panel), "");
}

#[test]
fn container_mode_requires_drag_area() {
    let (host, panel) = setup();
    let options = DraggableOptions::default().with_mode(DragMode::Container);
    assert_eq!(create(&host, "panel", &options), Err(CreateError::ModeAreaMismatch));
    assert!(!host.has_init_marker(&panel));
}

#[test]
fn drag_area_requires_container_mode() {
    let (host, _) = setup();
    host.add_element("board", Size::new(600.0, 400.0));
    let options = DraggableOptions::default()
        .with_mode(DragMode::Page)
        .with_drag_area("board");
    assert_eq!(create(&host, "panel", &options), Err(CreateError::ModeAreaMismatch));
}

#[test]
fn unresolved_drag_area_is_reported() {
    let (host, panel) = setup();
    let options = DraggableOptions::default()
        .with_mode(DragMode::Container)
        .with_drag_area("board");
    assert_eq!(
        create(&host, "panel", &options),
        Err(CreateError::DragAreaNotFound {
            id: "board".to_owned()
        })
    );
    assert!(!host.has_init_marker(&panel));
}

#[test]
fn embedded_context_detaches_element() {
    let (host, panel) = setup();
    host.set_top_level(false);
    assert_eq!(
        create(&host, "panel", &DraggableOptions::default()),
        Err(CreateError::EmbeddedContextDisabled)
    );
    assert!(!host.is_attached(panel));
    assert_eq!(host.element_by_id("panel"), None);
}

#[test]
fn second_creation_is_refused_without_touching_the_element() {
    let (host, panel) = setup();
    let store = Rc::new(MemoryStore::new());
    let mut first = try_create_draggable(
        host.clone(),
        Rc::clone(&store),
        "panel",
        &DraggableOptions::default(),
        DragCallbacks::new(),
    )
    .unwrap();
    first.handle_pointer_down(PointerInput::at(0.0, 0.0));
    first.handle_pointer_move(PointerInput::at(120.0, 80.0));
    first.handle_pointer_up(PointerInput::at(120.0, 80.0));
    let subscriptions = host.active_subscriptions();

    let second = try_create_draggable(
        host.clone(),
        store,
        "panel",
        &DraggableOptions::default().with_initial_position("5px", "5px"),
        DragCallbacks::new(),
    );
    assert_eq!(
        second.map(|_| ()),
        Err(CreateError::AlreadyInitialized {
            id: "panel".to_owned()
        })
    );
    assert_eq!(host.position(panel), Position::new(120.0, 80.0));
    assert_eq!(host.active_subscriptions(), subscriptions);

    // The marker outlives the controller.
    first.destroy();
    assert_eq!(
        create(&host, "panel", &DraggableOptions::default()),
        Err(CreateError::AlreadyInitialized {
            id: "panel".to_owned()
        })
    );
}

#[test]
fn creation_reveals_and_positions_the_element() {
    let (host, panel) = setup();
    host.hide_externally(panel);
    let options = DraggableOptions::default().with_initial_position("30px", "");
    create(&host, "panel", &options).unwrap();
    assert!(host.has_init_marker(&panel));
    assert_eq!(host.style_display(&panel), "block");
    assert_eq!(host.style_left(&panel), "30px");
    assert_eq!(host.style_top(&panel), "0px");
}

#[test]
fn json_options_drive_creation() {
    let (host, panel) = setup();
    host.add_element("board", Size::new(600.0, 400.0));
    let options = DraggableOptions::from_json_str(
        r#"{"mode":"container","dragArea":"board","initialPosition":{"x":"10px","y":"20px"}}"#,
    )
    .unwrap();
    create(&host, "panel", &options).unwrap();
    assert_eq!(host.position(panel), Position::new(10.0, 20.0));
}

#[test]
fn rejections_are_logged_with_severity() {
    let events = with_captured_tracing(|| {
        let (host, _) = setup();
        let _ = create(&host, "ghost", &DraggableOptions::default());

        let (embedded, _) = setup();
        embedded.set_top_level(false);
        let _ = create(&embedded, "panel", &DraggableOptions::default());
    });

    let rejections: Vec<_> = events
        .iter()
        .filter(|event| event.message() == "draggable not created")
        .collect();
    assert_eq!(rejections.len(), 2);
    assert_eq!(rejections[0].level, tracing::Level::ERROR);
    assert_eq!(
        rejections[0].fields.get("element_id").map(String::as_str),
        Some("ghost")
    );
    assert_eq!(rejections[1].level, tracing::Level::WARN);
    assert!(
        rejections[1]
            .fields
            .get("error")
            .is_some_and(|error| error.contains("embedded"))
    );
}

#[test]
fn teardown_failures_are_logged_not_raised() {
    let events = with_captured_tracing(|| {
        let (host, _) = setup();
        let mut draggable = try_create_draggable(
            host.clone(),
            Rc::new(MemoryStore::new()),
            "panel",
            &DraggableOptions::default(),
            DragCallbacks::new(),
        )
        .unwrap();
        host.refuse_unsubscribe(true);
        draggable.destroy();
        assert!(draggable.is_destroyed());
    });

    let failures = events
        .iter()
        .filter(|event| event.message() == "error in destroy")
        .inspect(|event| assert_eq!(event.level, tracing::Level::WARN))
        .count();
    assert_eq!(failures, 3);
}
