//! Full-state read, scheduling and change notification.

use std::cell::Cell;
use std::rc::Rc;

use spanet::error::{Error, FrameError};
use spanet::protocol::frame::{FrameDecoder, TextFields};
use spanet::protocol::markers::SectionMarker;
use spanet::registers::values::{HeatPumpMode, Tenths};
use spanet::scheduler::PollState;

use crate::mock_board::{FrameBuilder, MockBoard, spa};

fn board_with(frame: &FrameBuilder) -> MockBoard {
    let mut board = MockBoard::new();
    board.always("RF", &frame.build());
    board
}

// ── Validation ────────────────────────────────────────────────

#[test]
fn first_tick_reads_and_validates() {
    let (mut spa, _clock) = spa(board_with(&FrameBuilder::typical()));
    assert!(!spa.is_initialized());

    spa.tick();

    assert_eq!(spa.transport().count_sent("RF"), 1);
    assert!(spa.is_initialized());
    assert!(spa.is_validated());
    assert_eq!(spa.poll_state(), PollState::Idle);

    let r = spa.registers();
    assert_eq!(r.power.mains_voltage, Some(240));
    assert_eq!(r.power.heater_temperature, Some(Tenths(384)));
    assert_eq!(r.controller.software_version.as_deref(), Some("SW V5 17 05 31"));
    assert_eq!(r.touch_pad.heater, Some(true));
    assert_eq!(r.touch_pad.water_temperature, Some(Tenths(372)));
    assert_eq!(r.settings.set_temperature, Some(Tenths(380)));
    assert_eq!(r.options.heat_pump_mode, Some(HeatPumpMode::Heat));
    assert_eq!(r.heat_pump.present, Some(true));
    assert_eq!(r.pumps[0].mode, Some(1));
    assert_eq!(r.pumps[0].install_state.as_deref(), Some("1-1-01"));
}

#[test]
fn generated_frame_records_every_marker() {
    let text = FrameBuilder::typical().build();
    let frame = FrameDecoder::new(280)
        .decode(&mut TextFields::new(&text))
        .unwrap();
    assert_eq!(frame.markers().get(SectionMarker::R2), Some(1));
    assert_eq!(frame.markers().missing().count(), 0);
    assert!(frame.len() >= 280);
}

#[test]
fn same_frame_twice_is_idempotent() {
    let (mut spa, _clock) = spa(board_with(&FrameBuilder::typical()));
    spa.update_status().unwrap();
    let first = spa.registers().clone();
    spa.update_status().unwrap();
    assert_eq!(spa.registers(), &first);
}

#[test]
fn missing_marker_leaves_section_unknown_without_fault() {
    let frame = FrameBuilder::typical().without(SectionMarker::RE);
    let (mut spa, _clock) = spa(board_with(&frame));

    spa.update_status().unwrap();

    assert!(spa.is_validated());
    assert_eq!(spa.registers().heat_pump.present, None);
    assert_eq!(spa.registers().heat_pump.ambient, None);
    assert_eq!(spa.registers().settings.set_temperature, Some(Tenths(380)));
}

#[test]
fn unparseable_field_keeps_previous_value_and_frame() {
    let mut board = MockBoard::new();
    board
        .script("RF", &FrameBuilder::typical().build())
        .script("RF", &FrameBuilder::typical().set(SectionMarker::R6, 8, "3x0").build());
    let (mut spa, _clock) = spa(board);

    spa.update_status().unwrap();
    spa.update_status().unwrap();

    assert!(spa.is_validated());
    assert_eq!(spa.registers().settings.set_temperature, Some(Tenths(380)));
}

// ── Rejection ─────────────────────────────────────────────────

#[test]
fn wrong_prefix_keeps_state_and_retries_sooner() {
    let mut board = MockBoard::new();
    board
        .script("RF", &FrameBuilder::typical().build())
        .script("RF", &FrameBuilder::typical().prefix("XX:").set(SectionMarker::R6, 8, 400).build());
    let (mut spa, clock) = spa(board);

    spa.tick();
    let before = spa.registers().clone();

    clock.advance_to(spa.next_poll_due_ms());
    let t = clock.now();
    spa.tick();

    assert_eq!(spa.transport().count_sent("RF"), 2);
    assert!(!spa.is_validated());
    assert!(spa.is_initialized());
    assert_eq!(spa.registers(), &before);
    assert!(spa.raw_status().starts_with("XX:,"));

    let due = spa.next_poll_due_ms();
    assert!(due >= t + 1_000, "failure must back off, got {due} at {t}");
    assert!(due < t + 10_000, "failure retries sooner than the normal cadence");
}

#[test]
fn truncated_frame_is_rejected() {
    let mut board = MockBoard::new();
    board.always("RF", "RF:,R2,1,2,3,");
    let (mut spa, _clock) = spa(board);

    let err = spa.update_status().unwrap_err();
    assert_eq!(err, Error::Frame(FrameError::EmptyField { index: 5 }));
    assert!(!spa.is_validated());
    assert_eq!(spa.registers().power.mains_current, None);
}

#[test]
fn silent_board_never_busy_loops() {
    let (mut spa, clock) = spa(MockBoard::new());

    spa.tick();
    assert_eq!(spa.transport().count_sent("RF"), 1);

    // Ticks inside the retry window send nothing.
    for _ in 0..50 {
        clock.advance(10);
        spa.tick();
    }
    assert_eq!(spa.transport().count_sent("RF"), 1);

    clock.advance_to(spa.next_poll_due_ms());
    spa.tick();
    assert_eq!(spa.transport().count_sent("RF"), 2);
}

#[test]
fn stale_bytes_are_discarded_before_reading() {
    let mut board = board_with(&FrameBuilder::typical());
    board.inject(b"S22-OK\r\nlate,garbage,");
    let (mut spa, _clock) = spa(board);

    spa.update_status().unwrap();
    assert!(spa.is_validated());
    assert!(spa.raw_status().starts_with("RF:,R2,"));
}

// ── Cadence ───────────────────────────────────────────────────

#[test]
fn success_polls_at_normal_cadence() {
    let (mut spa, clock) = spa(board_with(&FrameBuilder::typical()));
    spa.tick();
    let due = spa.next_poll_due_ms();
    assert!(due >= clock.now() + 9_000);

    clock.advance_to(due - 1);
    spa.tick();
    assert_eq!(spa.transport().count_sent("RF"), 1);

    clock.advance_to(due);
    spa.tick();
    assert_eq!(spa.transport().count_sent("RF"), 2);
}

// ── Change notification ───────────────────────────────────────

#[test]
fn callback_runs_after_each_successful_decode_only() {
    let mut board = MockBoard::new();
    board
        .script("RF", &FrameBuilder::typical().build())
        .script("RF", "XX:,")
        .script("RF", &FrameBuilder::typical().build());
    let (mut spa, _clock) = spa(board);

    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    spa.set_update_callback(move || h.set(h.get() + 1));

    spa.update_status().unwrap();
    assert!(spa.update_status().is_err());
    spa.update_status().unwrap();
    assert_eq!(hits.get(), 2);

    spa.clear_update_callback();
    let _ = spa.update_status();
    assert_eq!(hits.get(), 2);
}

#[test]
fn json_snapshot_reflects_cache() {
    let (mut spa, _clock) = spa(board_with(&FrameBuilder::typical()));
    spa.update_status().unwrap();

    let json: serde_json::Value = serde_json::from_str(&spa.to_json().unwrap()).unwrap();
    assert_eq!(json["settings"]["set_temperature"], 38.0);
    assert_eq!(json["options"]["heat_pump_mode"], "Heat");
    assert_eq!(json["pumps"][0]["mode"], 1);
}
