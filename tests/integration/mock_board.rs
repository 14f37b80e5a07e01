//! Mock spa board for integration tests.
//!
//! Records every command line the driver sends and answers from a script,
//! so tests can drive the full exchange without a serial port.
#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use spanet::app::ports::{Clock, Transport};
use spanet::protocol::markers::SectionMarker;
use spanet::{DriverConfig, SpaInterface};

// ── MockBoard ─────────────────────────────────────────────────

/// Scripted transport: each completed command line may queue a reply
/// into the receive buffer.
#[derive(Default)]
pub struct MockBoard {
    pub rx: VecDeque<u8>,
    /// Non-empty command lines, in send order.
    pub sent: Vec<String>,
    line: Vec<u8>,
    once: HashMap<String, VecDeque<String>>,
    always: HashMap<String, String>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next `command` with `reply` (one shot, queued in order).
    pub fn script(&mut self, command: &str, reply: &str) -> &mut Self {
        self.once
            .entry(command.to_string())
            .or_default()
            .push_back(reply.to_string());
        self
    }

    /// Answer every `command` with `reply` unless a one-shot is queued.
    pub fn always(&mut self, command: &str, reply: &str) -> &mut Self {
        self.always.insert(command.to_string(), reply.to_string());
        self
    }

    /// Bytes already waiting before the next command (late replies, noise).
    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    pub fn count_sent(&self, command: &str) -> usize {
        self.sent.iter().filter(|c| *c == command).count()
    }

    fn complete_line(&mut self) {
        let line = String::from_utf8_lossy(&self.line).into_owned();
        self.line.clear();
        if line.is_empty() {
            return;
        }
        let reply = self
            .once
            .get_mut(&line)
            .and_then(VecDeque::pop_front)
            .or_else(|| self.always.get(&line).cloned());
        if let Some(reply) = reply {
            self.rx.extend(reply.bytes());
        }
        self.sent.push(line);
    }
}

impl Transport for MockBoard {
    type Error = ();

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        for &b in data {
            if b == b'\n' {
                self.complete_line();
            } else {
                self.line.push(b);
            }
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn available(&self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn read_until(&mut self, delimiter: u8, _max_wait_ms: u32) -> Result<Vec<u8>, ()> {
        let mut out = Vec::new();
        while let Some(b) = self.rx.pop_front() {
            if b == delimiter {
                break;
            }
            out.push(b);
        }
        Ok(out)
    }
}

// ── Clock / delay ─────────────────────────────────────────────

/// Shared manual clock.  Each query also steps it by 1 ms so the
/// channel's bounded busy-waits terminate.
#[derive(Clone, Default)]
pub struct TestClock(Rc<Cell<u64>>);

impl TestClock {
    /// Current time without stepping.
    pub fn now(&self) -> u64 {
        self.0.get()
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }

    /// Jump forward to `t` (no-op if already past it).
    pub fn advance_to(&self, t: u64) {
        self.0.set(self.0.get().max(t));
    }
}

impl Clock for TestClock {
    fn now_ms(&self) -> u64 {
        let t = self.0.get();
        self.0.set(t + 1);
        t
    }
}

pub struct NoopDelay;

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

pub type TestSpa = SpaInterface<MockBoard, TestClock, NoopDelay>;

/// Driver over `board` with default configuration.
pub fn spa(board: MockBoard) -> (TestSpa, TestClock) {
    let clock = TestClock::default();
    let spa = SpaInterface::new(board, clock.clone(), NoopDelay, DriverConfig::default())
        .expect("default config is valid");
    (spa, clock)
}

// ── FrameBuilder ──────────────────────────────────────────────

/// Fields following each marker in a generated frame.
const SECTION_WIDTH: [(SectionMarker, usize); SectionMarker::COUNT] = [
    (SectionMarker::R2, 30),
    (SectionMarker::R3, 25),
    (SectionMarker::R4, 26),
    (SectionMarker::R5, 25),
    (SectionMarker::R6, 28),
    (SectionMarker::R7, 31),
    (SectionMarker::R9, 13),
    (SectionMarker::RA, 13),
    (SectionMarker::RB, 13),
    (SectionMarker::RC, 20),
    (SectionMarker::RE, 31),
    (SectionMarker::RG, 13),
];

/// Builds a full-length `RF` response, every value `"0"` unless set.
pub struct FrameBuilder {
    prefix: String,
    sections: Vec<(SectionMarker, Vec<String>)>,
    omitted: Vec<SectionMarker>,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self {
            prefix: "RF:".to_string(),
            sections: SECTION_WIDTH
                .iter()
                .map(|&(m, w)| (m, vec!["0".to_string(); w]))
                .collect(),
            omitted: Vec::new(),
        }
    }

    /// Value at `offset` (1-based) past `marker`.
    pub fn set(mut self, marker: SectionMarker, offset: usize, value: impl ToString) -> Self {
        if let Some((_, fields)) = self.sections.iter_mut().find(|(m, _)| *m == marker) {
            fields[offset - 1] = value.to_string();
        }
        self
    }

    /// Replace `marker`'s token with filler; the frame length is kept.
    pub fn without(mut self, marker: SectionMarker) -> Self {
        self.omitted.push(marker);
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Wire text: comma after every field, so the reader's next field is
    /// empty once the board goes quiet.
    pub fn build(&self) -> String {
        let mut out = format!("{},", self.prefix);
        for (marker, fields) in &self.sections {
            if self.omitted.contains(marker) {
                out.push_str("0,");
            } else {
                out.push_str(marker.token());
                out.push(',');
            }
            for f in fields {
                out.push_str(f);
                out.push(',');
            }
        }
        out
    }

    /// A plausible board state used across tests.
    pub fn typical() -> Self {
        Self::new()
            .set(SectionMarker::R2, 2, 240)
            .set(SectionMarker::R2, 12, 384)
            .set(SectionMarker::R3, 6, "SW V5 17 05 31")
            .set(SectionMarker::R5, 12, 1)
            .set(SectionMarker::R5, 15, 372)
            .set(SectionMarker::R5, 18, 1)
            .set(SectionMarker::R6, 8, 380)
            .set(SectionMarker::R7, 26, 1)
            .set(SectionMarker::RE, 1, 1)
            .set(SectionMarker::RG, 7, "1-1-01")
    }
}
