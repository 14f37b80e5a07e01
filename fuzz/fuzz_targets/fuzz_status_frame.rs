//! Fuzz target: `FrameDecoder::decode` + `RegisterModel::commit`
//!
//! Drives arbitrary response text through the status-frame scanner and,
//! when it is accepted, through the register decode.  Neither step may
//! panic, and an accepted frame must satisfy the framing rules.
//!
//! cargo fuzz run fuzz_status_frame

#![no_main]

use libfuzzer_sys::fuzz_target;
use spanet::protocol::frame::{FRAME_MAX_FIELDS, FRAME_PREFIX, FrameDecoder, TextFields};
use spanet::registers::RegisterModel;

fuzz_target!(|data: &[u8]| {
    let Some((&min, rest)) = data.split_first() else {
        return;
    };
    let min = usize::from(min).max(1);
    let text = String::from_utf8_lossy(rest);

    let mut decoder = FrameDecoder::new(min);
    let Ok(frame) = decoder.decode(&mut TextFields::new(&text)) else {
        return;
    };
    assert!(frame.fields()[0].starts_with(FRAME_PREFIX));
    assert!(frame.len() >= min && frame.len() <= FRAME_MAX_FIELDS);

    let mut model = RegisterModel::new();
    model.commit(&frame);
    let once = model.registers().clone();
    model.commit(&frame);
    assert_eq!(model.registers(), &once, "decode must be idempotent");
    let _ = model.to_json();
});
