//! Section markers and the per-frame marker table.
//!
//! A full-state frame is split into logical register groups, each opened
//! by a short token (`R2`, `R3`, ..., `RG`).  Their positions drift
//! between firmware revisions, so the table is rebuilt from every frame
//! and properties are only ever addressed as `marker + offset`.

/// Register group tokens recognised inside a full-state frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SectionMarker {
    R2 = 0,
    R3 = 1,
    R4 = 2,
    R5 = 3,
    R6 = 4,
    R7 = 5,
    R9 = 6,
    RA = 7,
    RB = 8,
    RC = 9,
    RE = 10,
    RG = 11,
}

impl SectionMarker {
    /// Total number of markers — used to size the table array.
    pub const COUNT: usize = 12;

    /// Every marker, in frame order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
        Self::R9,
        Self::RA,
        Self::RB,
        Self::RC,
        Self::RE,
        Self::RG,
    ];

    /// Wire token for this marker.
    pub const fn token(self) -> &'static str {
        match self {
            Self::R2 => "R2",
            Self::R3 => "R3",
            Self::R4 => "R4",
            Self::R5 => "R5",
            Self::R6 => "R6",
            Self::R7 => "R7",
            Self::R9 => "R9",
            Self::RA => "RA",
            Self::RB => "RB",
            Self::RC => "RC",
            Self::RE => "RE",
            Self::RG => "RG",
        }
    }

    /// Recognise a field as a marker token.  Surrounding line noise
    /// (`\r`, `\n`, spaces) is ignored.
    pub fn from_token(field: &str) -> Option<Self> {
        let token = field.trim();
        Self::ALL.into_iter().find(|m| m.token() == token)
    }
}

/// Field index at which each marker was observed in the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerTable {
    slots: [Option<usize>; SectionMarker::COUNT],
}

impl MarkerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `marker` at `index`.  A repeated marker overwrites the
    /// earlier position.
    pub fn record(&mut self, marker: SectionMarker, index: usize) {
        self.slots[marker as usize] = Some(index);
    }

    /// Position of `marker`, or `None` if it was never observed.
    pub fn get(&self, marker: SectionMarker) -> Option<usize> {
        self.slots[marker as usize]
    }

    /// Frame index of the property at `offset` past `marker`.
    pub fn resolve(&self, marker: SectionMarker, offset: usize) -> Option<usize> {
        self.get(marker).and_then(|i| i.checked_add(offset))
    }

    /// Markers absent from the frame (for diagnostics).
    pub fn missing(&self) -> impl Iterator<Item = SectionMarker> + '_ {
        SectionMarker::ALL
            .into_iter()
            .filter(|m| self.get(*m).is_none())
    }
}
