//! MySQL backslash-escape tables
//!
//! Complies with the string-literal syntax of the MySQL text protocol:
//! <https://dev.mysql.com/doc/refman/8.0/en/string-literals.html>

/// Sentinel marking a byte that is emitted verbatim, without a backslash.
pub const DONT_ESCAPE: u8 = 0xFF;

/// The escapable bytes and the character that follows the backslash.
const ENCODE_PAIRS: [(u8, u8); 9] = [
    (0x00, b'0'),
    (b'\'', b'\''),
    (b'"', b'"'),
    (0x08, b'b'),
    (b'\n', b'n'),
    (b'\r', b'r'),
    (b'\t', b't'),
    (0x1A, b'Z'), // ctrl-Z
    (b'\\', b'\\'),
];

const fn build_encode_map() -> [u8; 256] {
    let mut map = [DONT_ESCAPE; 256];
    let mut i = 0;
    while i < ENCODE_PAIRS.len() {
        let (from, to) = ENCODE_PAIRS[i];
        map[from as usize] = to;
        i += 1;
    }
    map
}

const fn build_decode_map() -> [u8; 256] {
    let mut map = [DONT_ESCAPE; 256];
    let mut i = 0;
    while i < ENCODE_PAIRS.len() {
        let (from, to) = ENCODE_PAIRS[i];
        map[to as usize] = from;
        i += 1;
    }
    map
}

/// Maps a raw byte to the character written after `\`, or [`DONT_ESCAPE`].
pub static SQL_ENCODE_MAP: [u8; 256] = build_encode_map();

/// Inverse of [`SQL_ENCODE_MAP`].
pub static SQL_DECODE_MAP: [u8; 256] = build_decode_map();
