//! Register writes: ack verification, optimistic update, settle window.

use spanet::error::{Error, WriteError};
use spanet::registers::values::{HeatPumpMode, Tenths};
use spanet::scheduler::PollState;

use crate::mock_board::{FrameBuilder, MockBoard, TestSpa, TestClock, spa};

/// Driver that has already completed one good read.
fn ready(mut board: MockBoard) -> (TestSpa, TestClock) {
    board.always("RF", &FrameBuilder::typical().build());
    let (mut spa, clock) = spa(board);
    spa.tick();
    assert!(spa.is_validated());
    (spa, clock)
}

// ── Ack rules ─────────────────────────────────────────────────

#[test]
fn pump_mode_acked_by_literal_token() {
    let mut board = MockBoard::new();
    board.script("S22:1", "S22-OK\r\n");
    let (mut spa, _clock) = spa(board);

    assert_eq!(spa.set_pump_mode(1, 1), Ok(()));
    assert_eq!(spa.registers().pumps[0].mode, Some(1));
    assert_eq!(spa.transport().sent, vec!["S22:1"]);
}

#[test]
fn ack_with_trailing_carriage_return_is_fully_consumed() {
    let mut board = MockBoard::new();
    board.script("S22:3", "S22-OK\n\r");
    let (mut spa, _clock) = spa(board);

    assert_eq!(spa.set_pump_mode(1, 3), Ok(()));
    assert_eq!(spa.registers().pumps[0].mode, Some(3));
    assert!(spa.transport().rx.is_empty(), "terminator byte left on the wire");
}

#[test]
fn each_pump_has_its_own_register() {
    let mut board = MockBoard::new();
    board.script("S26:4", "S26-OK\r\n");
    let (mut spa, _clock) = spa(board);

    spa.set_pump_mode(5, 4).unwrap();
    assert_eq!(spa.registers().pumps[4].mode, Some(4));
    assert_eq!(spa.registers().pumps[0].mode, None);
}

#[test]
fn set_point_acked_by_echo() {
    let mut board = MockBoard::new();
    board.script("W40:380", "380\r\n");
    let (mut spa, _clock) = spa(board);

    spa.set_temperature(380).unwrap();
    let set_point = spa.registers().settings.set_temperature.unwrap();
    assert_eq!(set_point, Tenths(380));
    assert_eq!(set_point.to_string(), "38.0");
}

#[test]
fn element_boost_acked_by_echo() {
    let mut board = MockBoard::new();
    board.script("W98:1", "1\r\n");
    let (mut spa, _clock) = spa(board);

    spa.set_element_boost(1).unwrap();
    assert_eq!(spa.registers().options.element_boost, Some(1));
}

#[test]
fn heat_pump_mode_by_label() {
    let mut board = MockBoard::new();
    board.script("W99:2", "2\r\n");
    let (mut spa, _clock) = spa(board);

    spa.set_heat_pump_mode_label("Cool").unwrap();
    assert_eq!(spa.registers().options.heat_pump_mode, Some(HeatPumpMode::Cool));
    assert_eq!(spa.transport().sent, vec!["W99:2"]);
}

#[test]
fn unknown_label_sends_nothing() {
    let (mut spa, _clock) = spa(MockBoard::new());
    assert_eq!(
        spa.set_heat_pump_mode_label("cool"),
        Err(Error::Write(WriteError::UnknownLabel))
    );
    assert!(spa.transport().sent.is_empty());
}

#[test]
fn unknown_heat_pump_code_sends_nothing() {
    let mut board = MockBoard::new();
    board.script("W99:7", "7\r\n");
    let (mut spa, _clock) = ready(board);

    assert_eq!(
        spa.set_heat_pump_mode(7),
        Err(Error::Write(WriteError::InvalidTarget))
    );
    assert_eq!(spa.registers().options.heat_pump_mode, Some(HeatPumpMode::Heat));
    assert_eq!(spa.transport().count_sent("W99:7"), 0);
    assert!(!spa.is_dirty());
}

// ── Failed writes ─────────────────────────────────────────────

#[test]
fn mismatched_ack_leaves_registers_identical() {
    let mut board = MockBoard::new();
    board.script("W40:400", "380\r\n").script("S22:2", "S23-OK\r\n");
    let (mut spa, _clock) = ready(board);
    let before = spa.registers().clone();

    assert_eq!(
        spa.set_temperature(400),
        Err(Error::Write(WriteError::Rejected))
    );
    assert_eq!(
        spa.set_pump_mode(1, 2),
        Err(Error::Write(WriteError::Rejected))
    );
    assert_eq!(spa.registers(), &before);
}

#[test]
fn missing_ack_is_a_failure() {
    let (mut spa, _clock) = ready(MockBoard::new());
    let before = spa.registers().clone();

    assert_eq!(
        spa.set_element_boost(1),
        Err(Error::Write(WriteError::NoAck))
    );
    assert_eq!(spa.registers(), &before);
}

// ── Settle window ─────────────────────────────────────────────

#[test]
fn write_defers_next_read_into_settle_window() {
    let mut board = MockBoard::new();
    board.script("W40:385", "385\r\n");
    let (mut spa, clock) = ready(board);

    spa.set_temperature(385).unwrap();
    assert!(spa.is_dirty());

    let t = clock.now();
    spa.tick();
    let due = spa.next_poll_due_ms();
    assert!(!spa.is_dirty());
    assert_eq!(spa.poll_state(), PollState::Settling);
    assert!(due >= t + 200, "read must wait out the settle window");
    assert!(due < t + 10_000, "read must come sooner than the normal cadence");

    clock.advance_to(due);
    spa.tick();
    assert_eq!(spa.transport().count_sent("RF"), 2);
    // The confirming read overwrites the optimistic value.
    assert_eq!(spa.registers().settings.set_temperature, Some(Tenths(380)));
}

#[test]
fn write_burst_coalesces_into_one_read() {
    let mut board = MockBoard::new();
    board
        .script("S22:1", "S22-OK\r\n")
        .script("S23:1", "S23-OK\r\n")
        .script("S24:1", "S24-OK\r\n");
    let (mut spa, clock) = ready(board);

    for pump in 1..=3 {
        spa.set_pump_mode(pump, 1).unwrap();
        spa.tick();
        clock.advance(50);
    }
    assert_eq!(spa.transport().count_sent("RF"), 1);

    clock.advance_to(spa.next_poll_due_ms());
    spa.tick();
    clock.advance(150);
    spa.tick();
    assert_eq!(spa.transport().count_sent("RF"), 2);
}

#[test]
fn rejected_write_still_marks_dirty() {
    let mut board = MockBoard::new();
    board.script("W98:2", "nope\r\n");
    let (mut spa, _clock) = ready(board);

    assert!(spa.set_element_boost(2).is_err());
    assert!(spa.is_dirty());
}
