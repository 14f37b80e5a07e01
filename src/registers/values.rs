//! Field type rules.
//!
//! Each property in the frame is text; these helpers turn one field into
//! its declared type.  They return `None` on mismatch and never panic, so
//! an odd field only costs that one property.

use core::fmt;

use serde::{Serialize, Serializer};

/// Plain integer register.
pub fn parse_int(field: &str) -> Option<i32> {
    field.trim().parse().ok()
}

/// Fixed-point register holding tenths of a unit (380 = 38.0).
pub fn parse_tenths(field: &str) -> Option<Tenths> {
    parse_int(field).map(Tenths)
}

/// Boolean flag, strictly `"0"` or `"1"`.
pub fn parse_flag(field: &str) -> Option<bool> {
    match field.trim() {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

/// Opaque identifier passed through as-is (line noise trimmed).
pub fn parse_text(field: &str) -> Option<String> {
    Some(field.trim().to_string())
}

// ---------------------------------------------------------------------------
// Tenths
// ---------------------------------------------------------------------------

/// Integer count of tenths, as the board stores temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tenths(pub i32);

impl Tenths {
    /// Value in display units.
    pub fn as_f32(self) -> f32 {
        self.0 as f32 / 10.0
    }

    /// Raw register value.
    pub fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{}", abs / 10, abs % 10)
    }
}

impl Serialize for Tenths {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f32(self.as_f32())
    }
}

// ---------------------------------------------------------------------------
// Enumerated registers
// ---------------------------------------------------------------------------

/// Resolve a human-readable label through an ordered table; the position
/// is the register code.
pub fn code_for_label(labels: &[&str], label: &str) -> Option<i32> {
    labels
        .iter()
        .position(|l| *l == label)
        .and_then(|i| i32::try_from(i).ok())
}

/// Heat-pump operating mode (register `HPMP`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum HeatPumpMode {
    Auto = 0,
    Heat = 1,
    Cool = 2,
    Off = 3,
}

impl HeatPumpMode {
    /// Labels in code order.
    pub const LABELS: [&'static str; 4] = ["Auto", "Heat", "Cool", "Off"];

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Auto),
            1 => Some(Self::Heat),
            2 => Some(Self::Cool),
            3 => Some(Self::Off),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        Self::LABELS[self as usize]
    }

    pub fn parse(field: &str) -> Option<Self> {
        parse_int(field).and_then(Self::from_code)
    }
}

/// Variable heat element mode (register `VELE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum ElementMode {
    Off = 0,
    Step = 1,
    Variable = 2,
}

impl ElementMode {
    pub const LABELS: [&'static str; 3] = ["Off", "Step", "Variable"];

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Off),
            1 => Some(Self::Step),
            2 => Some(Self::Variable),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn parse(field: &str) -> Option<Self> {
        parse_int(field).and_then(Self::from_code)
    }
}
