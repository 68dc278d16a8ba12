use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use term_popup::layout::GeometryMode;
use term_popup::loader::{FileLoader, LoadRequest};
use term_popup::surface::{RenderSurface, TerminalSurface};
use term_popup::window::messages::MessageSpec;
use term_popup::{
    ActionHandler, EventKind, FloatRect, Phase, PopupError, WindowId, WindowManager, WindowOptions,
    WindowStatus,
};

fn manager() -> WindowManager {
    WindowManager::with_terminal(Rect::new(0, 0, 120, 40))
}

fn terminal(wm: &WindowManager) -> &TerminalSurface {
    wm.surface_as::<TerminalSurface>().expect("terminal surface")
}

fn count_events(wm: &mut WindowManager, kind: EventKind, phase: Phase) -> Rc<RefCell<usize>> {
    let count = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&count);
    wm.on(kind, phase, move |_| *counter.borrow_mut() += 1);
    count
}

fn status(wm: &WindowManager, id: &WindowId) -> Option<WindowStatus> {
    wm.window(id).map(|window| window.status())
}

fn esc() -> KeyEvent {
    KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)
}

fn click(column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

#[test]
fn open_with_existing_id_is_a_no_op() {
    let mut wm = manager();
    let id = wm.open(WindowOptions::new().name("a").title("first").size(40, 10));
    let again = wm.open(WindowOptions::new().name("a").title("second").size(20, 5));

    assert_eq!(id, again);
    let surface = terminal(&wm);
    assert_eq!(surface.node_count(), 1);
    assert_eq!(surface.created_count(), 1);
    let window = wm.window(&id).expect("window");
    assert_eq!(window.config().title, "first");
    assert_eq!(window.rect().width, 40);
}

#[test]
fn closing_twice_fires_one_close_event() {
    let mut wm = manager();
    let closes = count_events(&mut wm, EventKind::Close, Phase::Before);
    let id = wm.open(WindowOptions::new().name("a").size(40, 10));
    wm.close(&id, false);
    wm.close(&id, false);
    assert_eq!(*closes.borrow(), 1);
    assert_eq!(status(&wm, &id), Some(WindowStatus::Closed));
    assert_eq!(terminal(&wm).node_count(), 0);
}

#[test]
fn cancelled_open_creates_nothing() {
    let mut wm = manager();
    wm.on(EventKind::Open, Phase::Before, |datum| datum.cancel());
    let id = wm.open(WindowOptions::new().name("a").size(40, 10));
    assert!(wm.window(&id).is_none());
    assert_eq!(terminal(&wm).created_count(), 0);
    assert!(!wm.input_lock().is_active());
    assert!(!terminal(&wm).input_lock_visible());
}

#[test]
fn cancelled_close_keeps_window_open() {
    let mut wm = manager();
    let id = wm.open(WindowOptions::new().name("a").size(40, 10));
    let after = count_events(&mut wm, EventKind::Close, Phase::After);
    wm.on(EventKind::Close, Phase::Before, |datum| datum.cancel());
    wm.close(&id, true);
    assert_eq!(status(&wm, &id), Some(WindowStatus::Open));
    assert!(wm.window(&id).is_some_and(|w| w.has_node()));
    assert_eq!(*after.borrow(), 0);
}

#[test]
fn max_then_min_restores_exact_rectangle() {
    let mut wm = manager();
    let id = wm.open(WindowOptions::new().name("a").size(40, 12).position(10, 5));
    let before = wm.window(&id).expect("window").rect();

    wm.max(&id);
    let window = wm.window(&id).expect("window");
    assert!(window.is_maximized());
    assert_eq!(window.rect(), FloatRect::new(0, 0, 120, 40));
    assert_eq!(window.previous_rect(), Some(before));

    wm.min(&id);
    let window = wm.window(&id).expect("window");
    assert!(!window.is_maximized());
    assert_eq!(window.rect(), before);
    assert_eq!(window.previous_rect(), None);
}

#[test]
fn second_max_is_a_no_op() {
    let mut wm = manager();
    let maxes = count_events(&mut wm, EventKind::Max, Phase::Before);
    let id = wm.open(WindowOptions::new().name("a").size(40, 12));
    wm.max(&id);
    wm.max(&id);
    assert_eq!(*maxes.borrow(), 1);
}

#[test]
fn toggle_alternates_between_max_and_min() {
    let mut wm = manager();
    let toggles = count_events(&mut wm, EventKind::Toggle, Phase::After);
    let id = wm.open(WindowOptions::new().name("a").size(40, 12).show_max(true));
    wm.toggle(&id);
    assert!(wm.window(&id).is_some_and(|w| w.is_maximized()));
    wm.toggle(&id);
    assert!(!wm.window(&id).is_some_and(|w| w.is_maximized()));
    assert_eq!(*toggles.borrow(), 2);
}

#[test]
fn animated_toggle_settles_after_grace() {
    let mut wm = manager();
    let id = wm.open(
        WindowOptions::new()
            .name("a")
            .size(40, 12)
            .speed(Duration::from_millis(200)),
    );
    wm.settle();
    wm.toggle(&id);
    assert_eq!(status(&wm, &id), Some(WindowStatus::Resizing));
    assert!(!wm.window(&id).is_some_and(|w| w.is_maximized()));
    assert_eq!(wm.tick(Instant::now()), 0);

    wm.tick(Instant::now() + Duration::from_secs(5));
    assert_eq!(status(&wm, &id), Some(WindowStatus::Open));
    assert!(wm.window(&id).is_some_and(|w| w.is_maximized()));
    assert_eq!(wm.pending_completions(), 0);
}

#[test]
fn open_maximized_starts_maximized() {
    let mut wm = manager();
    let id = wm.open(WindowOptions::new().name("a").size(40, 12).open_maximized(true));
    let window = wm.window(&id).expect("window");
    assert!(window.is_maximized());
    assert_eq!(window.rect(), FloatRect::new(0, 0, 120, 40));
}

#[test]
fn modal_overlay_is_reference_counted() {
    let mut wm = manager();
    let a = wm.open(WindowOptions::new().name("a").size(40, 10).modal(true));
    let b = wm.open(WindowOptions::new().name("b").size(30, 8).modal(true));
    assert!(terminal(&wm).input_lock_visible());

    wm.close(&a, false);
    assert!(terminal(&wm).input_lock_visible());
    assert_eq!(wm.input_lock().count(), 1);

    wm.close(&b, false);
    assert!(!terminal(&wm).input_lock_visible());
    assert!(!wm.input_lock().is_active());
}

#[test]
fn reopening_during_animated_close_is_not_torn_down_by_stale_timer() {
    let mut wm = manager();
    let options = || {
        WindowOptions::new()
            .name("a")
            .size(40, 10)
            .speed(Duration::from_millis(200))
    };
    let id = wm.open(options());
    wm.settle();
    wm.close(&id, false);
    assert_eq!(status(&wm, &id), Some(WindowStatus::Closing));

    wm.open(options());
    assert_eq!(status(&wm, &id), Some(WindowStatus::Opening));
    wm.tick(Instant::now() + Duration::from_secs(5));

    assert_eq!(status(&wm, &id), Some(WindowStatus::Open));
    assert!(wm.window(&id).is_some_and(|w| w.has_node()));
    assert_eq!(terminal(&wm).node_count(), 1);
}

#[test]
fn closing_while_opening_is_immediate() {
    let mut wm = manager();
    let id = wm.open(
        WindowOptions::new()
            .name("a")
            .size(40, 10)
            .speed(Duration::from_millis(500)),
    );
    assert_eq!(status(&wm, &id), Some(WindowStatus::Opening));
    wm.close(&id, false);
    assert_eq!(status(&wm, &id), Some(WindowStatus::Closed));
    assert_eq!(wm.pending_completions(), 0);
}

#[test]
fn immediate_close_short_circuits_animated_close() {
    let mut wm = manager();
    let closed = count_events(&mut wm, EventKind::Close, Phase::After);
    let id = wm.open(
        WindowOptions::new()
            .name("a")
            .size(40, 10)
            .speed(Duration::from_millis(500)),
    );
    wm.settle();
    wm.close(&id, false);
    assert_eq!(*closed.borrow(), 0);
    wm.close(&id, true);
    assert_eq!(status(&wm, &id), Some(WindowStatus::Closed));
    assert_eq!(*closed.borrow(), 1);
    wm.settle();
    assert_eq!(*closed.borrow(), 1);
}

#[test]
fn reopen_merges_previous_configuration() {
    let mut wm = manager();
    let id = wm.open(
        WindowOptions::new()
            .name("a")
            .title("kept")
            .size(40, 10)
            .position(3, 4),
    );
    wm.close(&id, false);
    wm.open(WindowOptions::new().name("a").body("new body"));
    let window = wm.window(&id).expect("window");
    assert_eq!(window.config().title, "kept");
    assert_eq!(window.config().body, "new body");
    assert_eq!(window.config().width, 40);
    assert_eq!(window.rect(), FloatRect::new(3, 4, 40, 10));
    assert!(!window.auto_center());
}

#[test]
fn oversized_speed_from_json_is_capped() {
    let mut wm = manager();
    let options = WindowOptions::from_json(r#"{"name":"w","speed":1e19}"#).expect("valid options");
    let id = wm.open(options);
    assert_eq!(status(&wm, &id), Some(WindowStatus::Opening));
    assert_eq!(wm.tick(Instant::now()), 0);
    wm.settle();
    assert_eq!(status(&wm, &id), Some(WindowStatus::Open));
}

#[test]
fn destroy_forgets_the_window() {
    let mut wm = manager();
    let id = wm.open(WindowOptions::new().name("a").title("gone").size(40, 10));
    wm.destroy(&id);
    assert!(wm.window(&id).is_none());
    wm.open(WindowOptions::new().name("a"));
    assert_eq!(wm.window(&id).expect("window").config().title, "");
}

#[test]
fn escape_closes_or_runs_cancel_action() {
    let mut wm = manager();
    let id = wm.open(WindowOptions::new().name("a").size(40, 10));
    wm.keydown(&id, esc());
    assert_eq!(status(&wm, &id), Some(WindowStatus::Closed));

    let hits = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&hits);
    let id = wm.open(
        WindowOptions::new()
            .name("b")
            .size(40, 10)
            .cancel_action("No")
            .action(
                "No",
                ActionHandler::direct(move |_, event| log.borrow_mut().push(event.action.clone())),
            ),
    );
    wm.keydown(&id, esc());
    assert_eq!(status(&wm, &id), Some(WindowStatus::Open));
    assert_eq!(*hits.borrow(), vec!["No".to_string()]);
}

#[test]
fn escape_is_ignored_while_message_is_shown_or_keyboard_disabled() {
    let mut wm = manager();
    let id = wm.open(WindowOptions::new().name("a").size(60, 30));
    assert!(wm.add_message(&id, MessageSpec::new(20, 5, "hold on")));
    wm.keydown(&id, esc());
    assert_eq!(status(&wm, &id), Some(WindowStatus::Open));
    wm.clear_messages(&id);
    wm.keydown(&id, esc());
    assert_eq!(status(&wm, &id), Some(WindowStatus::Closed));

    let keys = count_events(&mut wm, EventKind::Keydown, Phase::Before);
    let id = wm.open(WindowOptions::new().name("b").size(40, 10).keyboard(false));
    assert!(!wm.handle_event(&Event::Key(esc())));
    assert_eq!(status(&wm, &id), Some(WindowStatus::Open));
    assert_eq!(*keys.borrow(), 0);
}

#[test]
fn cancelled_keydown_skips_default() {
    let mut wm = manager();
    wm.on(EventKind::Keydown, Phase::Before, |datum| datum.cancel());
    let id = wm.open(WindowOptions::new().name("a").size(40, 10));
    wm.keydown(&id, esc());
    assert_eq!(status(&wm, &id), Some(WindowStatus::Open));
}

#[test]
fn resize_applies_and_calls_back() {
    let mut wm = manager();
    let id = wm.open(WindowOptions::new().name("a").size(40, 10));
    let done = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&done);
    wm.resize(
        &id,
        5,
        6,
        30,
        12,
        Some(Box::new(move |wm: &mut WindowManager, id: &WindowId| {
            *slot.borrow_mut() = wm.window(id).map(|w| w.rect());
        })),
    );
    assert_eq!(*done.borrow(), Some(FloatRect::new(5, 6, 30, 12)));
    assert_eq!(wm.window(&id).expect("window").config().width, 30);
}

#[test]
fn cancelled_resize_changes_nothing() {
    let mut wm = manager();
    let id = wm.open(WindowOptions::new().name("a").size(40, 10).position(1, 1));
    wm.on(EventKind::Resize, Phase::Before, |datum| datum.cancel());
    wm.resize(&id, 5, 6, 30, 12, None);
    assert_eq!(
        wm.window(&id).expect("window").rect(),
        FloatRect::new(1, 1, 40, 10)
    );
}

#[test]
fn viewport_resize_recenters_clamps_and_refills() {
    let mut wm = manager();
    let centered = wm.open(WindowOptions::new().name("c").size(40, 10));
    let placed = wm.open(WindowOptions::new().name("p").size(40, 10).position(70, 25));
    let maxed = wm.open(WindowOptions::new().name("m").size(20, 6));
    wm.max(&maxed);
    assert_eq!(wm.window(&centered).expect("c").rect(), FloatRect::new(40, 15, 40, 10));

    wm.handle_event(&Event::Resize(80, 20));

    assert_eq!(wm.window(&centered).expect("c").rect(), FloatRect::new(20, 5, 40, 10));
    assert_eq!(wm.window(&placed).expect("p").rect(), FloatRect::new(40, 10, 40, 10));
    assert_eq!(wm.window(&maxed).expect("m").rect(), FloatRect::new(0, 0, 80, 20));
}

#[test]
fn viewport_resize_during_animated_max_is_applied_on_completion() {
    let mut wm = manager();
    let id = wm.open(
        WindowOptions::new()
            .name("a")
            .size(40, 12)
            .speed(Duration::from_millis(100)),
    );
    wm.settle();
    wm.max(&id);
    assert_eq!(status(&wm, &id), Some(WindowStatus::Resizing));

    wm.handle_event(&Event::Resize(80, 20));
    wm.settle();

    let window = wm.window(&id).expect("window");
    assert!(window.is_maximized());
    assert_eq!(window.rect(), FloatRect::new(0, 0, 80, 20));
    let node = terminal(&wm).node_for(&id).expect("node");
    assert_eq!(node.rect, FloatRect::new(0, 0, 80, 20));
}

#[test]
fn viewport_resize_during_animated_min_keeps_window_visible() {
    let mut wm = manager();
    let id = wm.open(
        WindowOptions::new()
            .name("a")
            .size(40, 12)
            .position(70, 25)
            .speed(Duration::from_millis(100)),
    );
    wm.settle();
    wm.max(&id);
    wm.settle();
    wm.min(&id);

    wm.handle_event(&Event::Resize(80, 20));
    wm.settle();

    let window = wm.window(&id).expect("window");
    assert!(!window.is_maximized());
    assert_eq!(window.rect(), FloatRect::new(40, 8, 40, 12));
}

#[test]
fn popup_mode_reopen_swaps_content_in_place() {
    let mut wm = manager();
    let id = wm.open(
        WindowOptions::new()
            .name("p")
            .title("A")
            .size(40, 10)
            .mode(GeometryMode::Popup),
    );
    let opens = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&opens);
    wm.on(EventKind::Open, Phase::Before, move |datum| {
        log.borrow_mut().push(datum.detail().clone())
    });
    wm.open(WindowOptions::new().name("p").title("B"));

    let surface = terminal(&wm);
    assert_eq!(surface.node_count(), 1);
    assert_eq!(surface.node_for(&id).expect("node").content.title, "B");
    assert_eq!(
        *opens.borrow(),
        vec![term_popup::EventDetail::Open { present: true }]
    );
}

#[test]
fn click_outside_closes_latest_non_modal_window() {
    let mut wm = manager();
    let id = wm.open(WindowOptions::new().name("a").size(40, 10).position(10, 10));
    assert!(wm.handle_event(&click(0, 0)));
    assert_eq!(status(&wm, &id), Some(WindowStatus::Closed));

    let modal = wm.open(
        WindowOptions::new()
            .name("m")
            .size(40, 10)
            .position(10, 10)
            .modal(true),
    );
    assert!(wm.handle_event(&click(0, 0)));
    assert_eq!(status(&wm, &modal), Some(WindowStatus::Open));
}

#[test]
fn close_button_and_action_buttons_route_clicks() {
    let mut wm = manager();
    let hits = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&hits);
    let id = wm.open(
        WindowOptions::new()
            .name("a")
            .title("t")
            .size(40, 10)
            .position(10, 10)
            .action("Go", ActionHandler::direct(move |_, _| *counter.borrow_mut() += 1)),
    );
    // single "[ Go ]" button centered on the row above the bottom border
    let button_x = 11 + (38 - 6) / 2;
    wm.handle_event(&click(button_x, 18));
    assert_eq!(*hits.borrow(), 1);

    // close glyph occupies the last three cells of the title row
    wm.handle_event(&click(47, 11));
    assert_eq!(status(&wm, &id), Some(WindowStatus::Closed));
}

#[test]
fn load_without_url_is_rejected_before_any_change() {
    let mut wm = manager();
    let err = wm
        .load(&FileLoader::new(), LoadRequest::default())
        .expect_err("missing url");
    assert!(matches!(err, PopupError::MissingUrl));
    assert_eq!(err.to_string(), "The url is not defined");
    assert_eq!(wm.live_count(), 0);
    assert_eq!(terminal(&wm).created_count(), 0);
}

#[test]
fn load_opens_template_window() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("about.json"),
        r#"{ "title": "About", "body": "v1", "width": 30, "height": 8 }"#,
    )
    .expect("write");
    let mut wm = manager();
    let id = wm
        .load(
            &FileLoader::with_root(dir.path()),
            LoadRequest::new("about.json").options(WindowOptions::new().name("about")),
        )
        .expect("loaded");
    let window = wm.window(&id).expect("window");
    assert_eq!(window.config().title, "About");
    assert_eq!((window.rect().width, window.rect().height), (30, 8));
}

#[test]
fn close_restores_previous_focus() {
    let mut wm = manager();
    wm.surface_mut()
        .focus(&term_popup::surface::ElementRef::External(7));
    let id = wm.open(WindowOptions::new().name("a").size(40, 10));
    assert_ne!(
        wm.surface().focused_element(),
        Some(term_popup::surface::ElementRef::External(7))
    );
    wm.close(&id, false);
    assert_eq!(
        wm.surface().focused_element(),
        Some(term_popup::surface::ElementRef::External(7))
    );
}
