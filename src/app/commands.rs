//! Writable registers and how the board acknowledges each one.
//!
//! A write is a single line `<CODE>:<value>`; the board answers with one
//! line.  What counts as success differs per register and is kept as the
//! board implements it:
//!
//! | Register          | Code      | Success ack            |
//! |-------------------|-----------|------------------------|
//! | Pump 1–5 mode     | `S22–S26` | literal `S2n-OK`       |
//! | Element boost     | `W98`     | exact echo of value    |
//! | Set temperature   | `W40`     | exact echo of value    |
//! | Heat-pump mode    | `W99`     | echo, compared numerically |

use crate::registers::PUMP_COUNT;

/// Rule deciding whether an acknowledgement line means "accepted".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckRule {
    /// The ack must equal a fixed token.
    Literal(&'static str),
    /// The ack must equal the encoded value, byte for byte.
    Echo,
    /// The ack must parse to the same integer as the value.
    NumericEcho,
}

/// One writable register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRegister {
    pub code: &'static str,
    pub ack: AckRule,
}

impl WriteRegister {
    /// Command line (without terminator) writing `value`.
    pub fn command(&self, value: i32) -> String {
        format!("{}:{}", self.code, value)
    }

    /// Whether `ack` confirms that `value` was written.  An empty ack is
    /// always a failure.
    pub fn accepts(&self, ack: &str, value: i32) -> bool {
        if ack.is_empty() {
            return false;
        }
        match self.ack {
            AckRule::Literal(token) => ack == token,
            AckRule::Echo => ack == value.to_string(),
            AckRule::NumericEcho => ack.trim().parse::<i32>() == Ok(value),
        }
    }
}

/// Pump 1–5 operating mode.
pub const PUMP_MODE: [WriteRegister; PUMP_COUNT] = [
    WriteRegister { code: "S22", ack: AckRule::Literal("S22-OK") },
    WriteRegister { code: "S23", ack: AckRule::Literal("S23-OK") },
    WriteRegister { code: "S24", ack: AckRule::Literal("S24-OK") },
    WriteRegister { code: "S25", ack: AckRule::Literal("S25-OK") },
    WriteRegister { code: "S26", ack: AckRule::Literal("S26-OK") },
];

/// Heat element boost (`HELE`).
pub const ELEMENT_BOOST: WriteRegister = WriteRegister {
    code: "W98",
    ack: AckRule::Echo,
};

/// Water set-point in tenths of a degree (`STMP`).
pub const SET_TEMPERATURE: WriteRegister = WriteRegister {
    code: "W40",
    ack: AckRule::Echo,
};

/// Heat-pump mode code (`HPMP`).
pub const HEAT_PUMP_MODE: WriteRegister = WriteRegister {
    code: "W99",
    ack: AckRule::NumericEcho,
};

/// Register for pump `pump` (1-based), if the board has one.
pub fn pump_mode(pump: usize) -> Option<&'static WriteRegister> {
    pump.checked_sub(1).and_then(|i| PUMP_MODE.get(i))
}
