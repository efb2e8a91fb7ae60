//! Byte-level alphabet (GPT-2 style).
//!
//! Every byte maps to one printable unicode character so that arbitrary UTF-8
//! input can be run through string-keyed merge tables. Printable Latin-1
//! bytes map to themselves; the rest are shifted past U+00FF in byte order.
//! The mapping is the identity for printable ASCII.

use ahash::AHashMap;
use std::sync::OnceLock;

/// Pre-computed byte <-> unicode tables.
#[derive(Debug)]
pub struct ByteAlphabet {
    /// Byte to unicode mapping
    byte_encoder: [char; 256],
    /// Unicode to byte mapping for decoding
    byte_decoder: AHashMap<char, u8>,
}

impl ByteAlphabet {
    fn build() -> Self {
        let byte_encoder = build_byte_encoder();
        let byte_decoder = byte_encoder
            .iter()
            .enumerate()
            .map(|(byte, &ch)| (ch, byte as u8))
            .collect();

        Self {
            byte_encoder,
            byte_decoder,
        }
    }

    /// Shared instance, built on first use.
    pub fn get() -> &'static ByteAlphabet {
        static ALPHABET: OnceLock<ByteAlphabet> = OnceLock::new();
        ALPHABET.get_or_init(Self::build)
    }

    #[inline]
    pub fn encode_byte(&self, byte: u8) -> char {
        self.byte_encoder[byte as usize]
    }

    #[inline]
    pub fn decode_char(&self, ch: char) -> Option<u8> {
        self.byte_decoder.get(&ch).copied()
    }

    /// Map raw bytes to their alphabet string.
    pub fn encode_bytes(&self, bytes: &[u8]) -> String {
        bytes.iter().map(|&b| self.encode_byte(b)).collect()
    }

    /// Append the raw bytes behind an alphabet string to `out`.
    ///
    /// Characters outside the alphabet are kept as their own UTF-8 bytes.
    pub fn decode_into(&self, token: &str, out: &mut Vec<u8>) {
        let mut utf8 = [0u8; 4];
        for ch in token.chars() {
            match self.decode_char(ch) {
                Some(byte) => out.push(byte),
                None => out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes()),
            }
        }
    }
}

fn is_printable(byte: u8) -> bool {
    matches!(byte, b'!'..=b'~' | 0xA1..=0xAC | 0xAE..=0xFF)
}

fn build_byte_encoder() -> [char; 256] {
    let mut byte_encoder = ['\0'; 256];
    let mut shifted = 0u32;

    for byte in 0..=255u8 {
        byte_encoder[byte as usize] = if is_printable(byte) {
            byte as char
        } else {
            let ch = char::from_u32(256 + shifted).unwrap_or(char::REPLACEMENT_CHARACTER);
            shifted += 1;
            ch
        };
    }

    byte_encoder
}
