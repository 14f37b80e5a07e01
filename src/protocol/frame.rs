//! Full-state frame decoder.
//!
//! Wire format of the `RF` (read all registers) response:
//! ```text
//! RF:,R2,<v>,<v>,...,R3,<v>,...,RG,<v>,...,<empty>
//! └┬┘ └┬┘                                    └──┬──┘
//!  │   section marker                  end of frame (field timeout,
//!  prefix on field 0                   only valid past the minimum)
//! ```
//!
//! There are no lengths or checksums, so framing is inferred from content:
//! the prefix on field 0, a minimum field count, and the empty field that
//! the bounded read yields once the board stops talking.  Values may carry
//! stray `\r`/`\n` from the board's line breaks; the type rules trim them.

use log::{debug, warn};

use crate::error::FrameError;
use crate::protocol::markers::{MarkerTable, SectionMarker};

/// Literal that field 0 of every register dump starts with.
pub const FRAME_PREFIX: &str = "RF:";

/// Fixed capacity of one frame (fields).  Scanning stops when it is full.
pub const FRAME_MAX_FIELDS: usize = 300;

/// Anything that can yield successive comma-delimited fields.
///
/// An exhausted or timed-out source yields empty strings.
pub trait FieldSource {
    fn next_field(&mut self) -> String;
}

/// In-memory field source over already-received response text.
pub struct TextFields<'a> {
    rest: Option<&'a str>,
}

impl<'a> TextFields<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: Some(text) }
    }
}

impl FieldSource for TextFields<'_> {
    fn next_field(&mut self) -> String {
        match self.rest {
            None => String::new(),
            Some(text) => match text.find(',') {
                Some(i) => {
                    self.rest = Some(&text[i + 1..]);
                    text[..i].to_string()
                }
                None => {
                    self.rest = None;
                    text.to_string()
                }
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Raw frame
// ---------------------------------------------------------------------------

/// One structurally valid status response: its fields and marker table.
///
/// Allocated fresh for every poll attempt and dropped once decoded.
#[derive(Debug, Clone, Default)]
pub struct RawFrame {
    fields: heapless::Vec<String, FRAME_MAX_FIELDS>,
    markers: MarkerTable,
}

impl RawFrame {
    /// Number of fields in the frame (the terminating empty field excluded).
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn markers(&self) -> &MarkerTable {
        &self.markers
    }

    /// Field at `offset` past `marker`.  `None` when the marker was not
    /// seen or the position lies beyond the end of the frame.
    pub fn field(&self, marker: SectionMarker, offset: usize) -> Option<&str> {
        let index = self.markers.resolve(marker, offset)?;
        self.fields.get(index).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Scans one full-state response out of a [`FieldSource`].
pub struct FrameDecoder {
    min_fields: usize,
    /// Comma-joined text of the last scan, kept whether it passed or not.
    raw_text: String,
}

impl FrameDecoder {
    pub fn new(min_fields: usize) -> Self {
        Self {
            min_fields,
            raw_text: String::new(),
        }
    }

    /// Text of the most recently scanned response, for diagnostics.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Read fields until the end-of-frame marker or the capacity is hit,
    /// validating framing on the way.
    pub fn decode(&mut self, src: &mut impl FieldSource) -> Result<RawFrame, FrameError> {
        let mut frame = RawFrame::default();
        let mut text = String::new();

        let outcome = self.scan(src, &mut frame, &mut text);
        self.raw_text = text;

        match outcome {
            Ok(()) => {
                debug!(
                    "Frame: {} fields, markers missing: {:?}",
                    frame.len(),
                    frame.markers.missing().collect::<Vec<_>>()
                );
                Ok(frame)
            }
            Err(e) => {
                warn!("Frame rejected: {}", e);
                Err(e)
            }
        }
    }

    fn scan(
        &self,
        src: &mut impl FieldSource,
        frame: &mut RawFrame,
        text: &mut String,
    ) -> Result<(), FrameError> {
        while !frame.fields.is_full() {
            let index = frame.fields.len();
            let field = src.next_field();
            text.push_str(&field);
            text.push(',');

            if field.is_empty() {
                if index >= self.min_fields {
                    return Ok(());
                }
                return Err(FrameError::EmptyField { index });
            }
            if index == 0 && !field.starts_with(FRAME_PREFIX) {
                warn!("Frame: field 0 is {:?}, not a register dump", field);
                return Err(FrameError::MissingPrefix);
            }

            if let Some(marker) = SectionMarker::from_token(&field) {
                frame.markers.record(marker, index);
            }
            if frame.fields.push(field).is_err() {
                break;
            }
        }

        if frame.fields.len() < self.min_fields {
            return Err(FrameError::Truncated {
                fields: frame.fields.len(),
                min: self.min_fields,
            });
        }
        Ok(())
    }
}
