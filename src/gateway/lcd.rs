//! LCD character set handling.
//!
//! The display controller takes GBK. Text is checked one character at a time;
//! anything GBK cannot represent becomes `?`, the same substitution a lossy
//! encode-then-decode round trip through GBK produces.

use encoding_rs::GBK;

/// Replacement for characters outside the device character set.
pub const REPLACEMENT: char = '?';

/// Text after the character set check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceText {
    /// What the display will actually show.
    pub text: String,
    /// True if at least one character was replaced.
    pub transliterated: bool,
}

/// Whether `c` has a GBK encoding.
pub fn is_representable(c: char) -> bool {
    let mut buf = [0u8; 4];
    let (_, _, had_errors) = GBK.encode(c.encode_utf8(&mut buf));
    !had_errors
}

/// Map `input` into the device character set.
pub fn to_device_text(input: &str) -> DeviceText {
    let mut transliterated = false;
    let text = input
        .chars()
        .map(|c| {
            if is_representable(c) {
                c
            } else {
                transliterated = true;
                REPLACEMENT
            }
        })
        .collect();

    DeviceText {
        text,
        transliterated,
    }
}
