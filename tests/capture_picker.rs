//! Capture-area picker: double-click submit, long-press reset, timer races.
//!
//! Runs on a paused tokio clock so long presses take no real time.

mod common;

use common::{Call, MockBridge, RecordingPickerSurface};
use scope_monitor_lib::capture::{resolve, CaptureAreaPicker, PickerEvent, WindowFrame};
use scope_monitor_lib::events::{window_queue, WindowEvents, WindowSender};
use scope_monitor_lib::surface::PickerStatus;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

const LONG_PRESS: Duration = Duration::from_millis(1000);

struct Harness {
    picker: CaptureAreaPicker<MockBridge, RecordingPickerSurface>,
    events: WindowEvents<PickerEvent>,
    sender: WindowSender<PickerEvent>,
    bridge: Arc<MockBridge>,
    surface: Arc<RecordingPickerSurface>,
}

fn retina_frame() -> WindowFrame {
    WindowFrame::new((100.0, 100.0), (400.0, 300.0), 2.0)
}

impl Harness {
    fn new(frame: Option<WindowFrame>) -> Self {
        let bridge = MockBridge::new();
        let surface = RecordingPickerSurface::new(frame);
        let (sender, events) = window_queue();
        let picker = CaptureAreaPicker::new(Arc::clone(&bridge), Arc::clone(&surface), &sender, LONG_PRESS);
        Self {
            picker,
            events,
            sender,
            bridge,
            surface,
        }
    }

    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
        tokio::task::yield_now().await;
    }

    /// Handles every timer event queued so far.
    async fn pump(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.picker.handle_event(event).await;
        }
    }

    fn resets(&self) -> usize {
        self.bridge.calls().iter().filter(|c| **c == Call::Reset).count()
    }
}

// ── Status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn shows_instructions_on_creation() {
    let mut h = Harness::new(Some(retina_frame()));
    assert_eq!(h.surface.statuses(), vec![PickerStatus::AwaitingSelection]);

    h.picker.handle_event(PickerEvent::Opened).await;
    assert_eq!(
        h.surface.statuses(),
        vec![PickerStatus::AwaitingSelection, PickerStatus::AwaitingSelection]
    );

    let (first, second) = PickerStatus::AwaitingSelection.lines();
    assert_eq!(first, "Double click: Set capture area");
    assert_eq!(second, "Long press: Reset capture area");
}

// ── Double click ────────────────────────────────────────────────────

#[tokio::test]
async fn double_click_submits_logical_window_area() {
    let mut h = Harness::new(Some(retina_frame()));
    h.picker.handle_event(PickerEvent::DoubleClick).await;

    let region = resolve(&retina_frame()).unwrap();
    assert_eq!(h.bridge.calls(), vec![Call::Submit(region)]);
    assert_eq!(h.picker.status(), PickerStatus::RegionSet(region));

    let (first, second) = h.surface.last_status().unwrap().lines();
    assert_eq!(first, "Capture area set");
    assert_eq!(second, "[50, 50] - [250, 200]");
}

#[tokio::test]
async fn geometry_is_read_at_double_click_time() {
    let mut h = Harness::new(Some(retina_frame()));
    h.picker.handle_event(PickerEvent::DoubleClick).await;

    let moved = WindowFrame::new((0.0, 0.0), (200.0, 100.0), 1.0);
    h.surface.move_to(moved);
    h.picker.handle_event(PickerEvent::DoubleClick).await;

    let calls = h.bridge.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1], Call::Submit(resolve(&moved).unwrap()));
}

#[tokio::test]
async fn unreadable_geometry_submits_nothing() {
    let mut h = Harness::new(None);
    h.picker.handle_event(PickerEvent::DoubleClick).await;

    assert!(h.bridge.calls().is_empty());
    assert_eq!(h.picker.status(), PickerStatus::AwaitingSelection);
}

#[tokio::test]
async fn degenerate_window_submits_nothing() {
    let mut h = Harness::new(Some(WindowFrame::new((10.0, 10.0), (0.0, 300.0), 1.0)));
    h.picker.handle_event(PickerEvent::DoubleClick).await;

    assert!(h.bridge.calls().is_empty());
}

#[tokio::test]
async fn rejected_submit_leaves_status_alone() {
    let mut h = Harness::new(Some(retina_frame()));
    h.bridge.fail_submit.store(true, Ordering::SeqCst);
    h.picker.handle_event(PickerEvent::DoubleClick).await;

    assert_eq!(h.picker.status(), PickerStatus::AwaitingSelection);
    assert_eq!(h.surface.statuses().len(), 1);
}

// ── Long press ──────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn long_press_resets_capture_area() {
    let mut h = Harness::new(Some(retina_frame()));
    h.picker.handle_event(PickerEvent::PressDown).await;
    assert!(h.picker.is_long_press_armed());

    h.wait(LONG_PRESS + Duration::from_millis(1)).await;
    h.pump().await;

    assert_eq!(h.resets(), 1);
    assert_eq!(h.picker.status(), PickerStatus::RegionCleared);
    assert!(!h.picker.is_long_press_armed());
    assert_eq!(
        h.surface.last_status().unwrap().lines(),
        ("Capture area cleared".to_string(), String::new())
    );
}

#[tokio::test(start_paused = true)]
async fn early_release_cancels_reset() {
    let mut h = Harness::new(Some(retina_frame()));
    h.picker.handle_event(PickerEvent::PressDown).await;
    h.wait(Duration::from_millis(400)).await;
    h.picker.handle_event(PickerEvent::PressUp).await;

    h.wait(LONG_PRESS * 2).await;
    h.pump().await;

    assert_eq!(h.resets(), 0);
    assert!(!h.picker.is_long_press_armed());
}

#[tokio::test(start_paused = true)]
async fn stale_timer_event_is_ignored() {
    let mut h = Harness::new(Some(retina_frame()));

    // First press fires, but its event is still queued when a new press starts.
    h.picker.handle_event(PickerEvent::PressDown).await;
    h.wait(LONG_PRESS + Duration::from_millis(1)).await;
    let stale = h.events.try_recv().expect("first timer fired");
    assert!(matches!(stale, PickerEvent::LongPressElapsed(_)));

    h.picker.handle_event(PickerEvent::PressUp).await;
    h.picker.handle_event(PickerEvent::PressDown).await;
    h.picker.handle_event(stale).await;

    assert_eq!(h.resets(), 0);
    assert!(h.picker.is_long_press_armed());

    h.wait(LONG_PRESS + Duration::from_millis(1)).await;
    h.pump().await;
    assert_eq!(h.resets(), 1);
}

#[tokio::test(start_paused = true)]
async fn repeated_press_down_rearms_once() {
    let mut h = Harness::new(Some(retina_frame()));
    h.picker.handle_event(PickerEvent::PressDown).await;
    h.wait(Duration::from_millis(600)).await;
    h.picker.handle_event(PickerEvent::PressDown).await;

    h.wait(Duration::from_millis(600)).await;
    h.pump().await;
    assert_eq!(h.resets(), 0, "re-arming restarts the threshold");

    h.wait(Duration::from_millis(500)).await;
    h.pump().await;
    assert_eq!(h.resets(), 1);
}

// ── Close ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn close_disarms_pending_long_press() {
    let mut h = Harness::new(Some(retina_frame()));
    h.picker.handle_event(PickerEvent::PressDown).await;
    h.picker.handle_event(PickerEvent::CloseRequested).await;

    assert!(h.picker.is_closed());
    assert!(!h.picker.is_long_press_armed());

    h.wait(LONG_PRESS * 2).await;
    assert!(h.events.try_recv().is_err());
}

#[tokio::test]
async fn events_after_close_are_ignored() {
    let mut h = Harness::new(Some(retina_frame()));
    h.picker.handle_event(PickerEvent::CloseRequested).await;
    h.picker.handle_event(PickerEvent::DoubleClick).await;

    assert!(h.bridge.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn run_loop_ends_when_queue_closes() {
    let h = Harness::new(Some(retina_frame()));
    let Harness {
        picker,
        events,
        sender,
        bridge,
        ..
    } = h;

    sender.send(PickerEvent::PressDown);
    drop(sender);

    tokio::time::timeout(Duration::from_secs(5), picker.run(events))
        .await
        .expect("loop ends once every sender is gone");

    tokio::time::sleep(LONG_PRESS * 2).await;
    assert!(bridge.calls().is_empty(), "pending long press was disarmed");
}
