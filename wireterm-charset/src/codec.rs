//
// Copyright 2018-2026 The Wireterm Project Authors. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use crate::error::CharsetError;
use encoding_rs::Encoding;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tracing::debug;

/// How a negotiated charset is consulted relative to the default.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Usage {
    /// The negotiated charset only applies while `TRANSMIT-BINARY` is active
    /// on the relevant side.
    Binary,
    /// The negotiated charset always applies once one has been accepted,
    /// independent of `TRANSMIT-BINARY`.
    Always,
}

#[derive(Clone)]
enum CodecKind {
    Utf8,
    Ascii,
    Iana(&'static Encoding),
}

#[derive(Clone)]
struct ResolvedCodec {
    name: String,
    kind: CodecKind,
}

fn resolve(name: &str) -> Result<ResolvedCodec, CharsetError> {
    let upper = name.to_ascii_uppercase();
    let kind = if upper == "UTF-8" {
        CodecKind::Utf8
    } else if upper == "US-ASCII" {
        CodecKind::Ascii
    } else {
        match Encoding::for_label(name.as_bytes()) {
            Some(enc) => CodecKind::Iana(enc),
            None => return Err(CharsetError::UnknownEncoding(name.to_string())),
        }
    };
    Ok(ResolvedCodec {
        name: name.to_string(),
        kind,
    })
}

fn decode_complete(codec: &ResolvedCodec, src: &[u8]) -> String {
    match &codec.kind {
        CodecKind::Utf8 | CodecKind::Iana(_) => {
            let encoding = match &codec.kind {
                CodecKind::Utf8 => encoding_rs::UTF_8,
                CodecKind::Iana(enc) => enc,
                CodecKind::Ascii => unreachable!(),
            };
            let mut decoder = encoding.new_decoder();
            let mut out = String::with_capacity(src.len());
            let _ = decoder.decode_to_string(src, &mut out, true);
            out
        }
        CodecKind::Ascii => src
            .iter()
            .map(|&b| if b < 0x80 { b as char } else { '\u{FFFD}' })
            .collect(),
    }
}

fn encode_complete(codec: &ResolvedCodec, text: &str) -> Result<Vec<u8>, CharsetError> {
    match &codec.kind {
        CodecKind::Utf8 => Ok(text.as_bytes().to_vec()),
        CodecKind::Iana(enc) => {
            // Unmappable code points become numeric character references
            // (the WHATWG "encode" operation's replacement behaviour);
            // nothing here can actually fail.
            let (bytes, _, _) = enc.encode(text);
            Ok(bytes.into_owned())
        }
        CodecKind::Ascii => {
            let mut out = Vec::with_capacity(text.len());
            for ch in text.chars() {
                if ch.is_ascii() {
                    out.push(ch as u8);
                } else {
                    return Err(CharsetError::NotAscii(ch as u32));
                }
            }
            Ok(out)
        }
    }
}

/// Result of a single [`Charset::decode`] call.
#[derive(Debug, Eq, PartialEq)]
pub struct DecodeOutcome {
    /// Bytes of `src` this call consumed. Always `src.len()` in this
    /// implementation: each call treats its input as a complete unit (see
    /// the crate-level docs for why this differs from a stream-oriented
    /// decoder that buffers partial multi-byte sequences internally).
    pub consumed: usize,
    /// Decoded text, with malformed bytes replaced by U+FFFD.
    pub text: String,
    /// Whether the fallback decoder should be used for the next call.
    pub fallback_latched: bool,
}

/// A swappable character-encoding engine coordinating `TRANSMIT-BINARY` and
/// `CHARSET` (RFC 2066) negotiation with the bytes actually placed on the
/// wire.
///
/// `default`, the two negotiated cells, and `fallback` are independently
/// lockable: every operation here reads or writes exactly one cell, so a
/// concurrent `promoteDefault` and `encode` never observe a half-updated
/// pair.
pub struct Charset {
    default: RwLock<ResolvedCodec>,
    negotiated_encoding: RwLock<ResolvedCodec>,
    negotiated_decoding: RwLock<ResolvedCodec>,
    fallback: RwLock<Option<ResolvedCodec>>,
    binary_encode: AtomicBool,
    binary_decode: AtomicBool,
    usage: Usage,
}

impl Charset {
    /// Resolves `default_name` (and `fallback_name`, if given) via the IANA
    /// registry. Fails synchronously if either name is unknown.
    pub fn new(
        default_name: &str,
        fallback_name: Option<&str>,
        usage: Usage,
    ) -> Result<Self, CharsetError> {
        let default = resolve(default_name)?;
        let fallback = fallback_name.map(resolve).transpose()?;
        Ok(Charset {
            negotiated_encoding: RwLock::new(default.clone()),
            negotiated_decoding: RwLock::new(default.clone()),
            default: RwLock::new(default),
            fallback: RwLock::new(fallback),
            binary_encode: AtomicBool::new(false),
            binary_decode: AtomicBool::new(false),
            usage,
        })
    }

    /// The name used for outbound encoding right now.
    pub fn encoding_name(&self) -> String {
        if self.usage == Usage::Always || self.binary_encode.load(Ordering::Acquire) {
            self.negotiated_encoding.read().unwrap().name.clone()
        } else {
            self.default.read().unwrap().name.clone()
        }
    }

    /// The name used for inbound decoding right now.
    pub fn decoding_name(&self) -> String {
        if self.usage == Usage::Always || self.binary_decode.load(Ordering::Acquire) {
            self.negotiated_decoding.read().unwrap().name.clone()
        } else {
            self.default.read().unwrap().name.clone()
        }
    }

    /// The currently configured default charset name.
    pub fn default_name(&self) -> String {
        self.default.read().unwrap().name.clone()
    }

    /// Encodes `text` through the currently active encoder.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, CharsetError> {
        let codec = if self.usage == Usage::Always || self.binary_encode.load(Ordering::Acquire) {
            self.negotiated_encoding.read().unwrap().clone()
        } else {
            self.default.read().unwrap().clone()
        };
        encode_complete(&codec, text)
    }

    /// Decodes `src` through the currently active decoder, applying fallback
    /// discipline.
    ///
    /// `fallback_latched` should be the value returned by the previous call
    /// (or `false` at the start of a session / after a control-character
    /// boundary). When latched, the fallback decoder is used unconditionally
    /// and the primary is not consulted.
    pub fn decode(&self, src: &[u8], fallback_latched: bool) -> DecodeOutcome {
        if src.is_empty() {
            return DecodeOutcome {
                consumed: 0,
                text: String::new(),
                fallback_latched,
            };
        }
        if fallback_latched {
            if let Some(fb) = self.fallback.read().unwrap().clone() {
                let text = decode_complete(&fb, src);
                return DecodeOutcome {
                    consumed: src.len(),
                    text,
                    fallback_latched: true,
                };
            }
        }

        let active = if self.usage == Usage::Always || self.binary_decode.load(Ordering::Acquire) {
            self.negotiated_decoding.read().unwrap().clone()
        } else {
            self.default.read().unwrap().clone()
        };
        let primary_text = decode_complete(&active, src);
        if decode_acceptable(&primary_text) {
            return DecodeOutcome {
                consumed: src.len(),
                text: primary_text,
                fallback_latched: false,
            };
        }

        if let Some(fb) = self.fallback.read().unwrap().clone() {
            let fallback_text = decode_complete(&fb, src);
            if decode_acceptable(&fallback_text) {
                debug!(from = %active.name, to = %fb.name, "decode fallback latched");
                return DecodeOutcome {
                    consumed: src.len(),
                    text: fallback_text,
                    fallback_latched: true,
                };
            }
        }

        DecodeOutcome {
            consumed: src.len(),
            text: primary_text,
            fallback_latched: false,
        }
    }

    /// Atomically swaps the default charset name; if the negotiated charset
    /// (encoding and decoding) currently equals `old_name`, it is swapped
    /// too. Returns whether anything actually changed (i.e. whether the
    /// default was `old_name` to begin with).
    pub fn promote_default(&self, old_name: &str, new_name: &str) -> Result<bool, CharsetError> {
        let mut default = self.default.write().unwrap();
        if !default.name.eq_ignore_ascii_case(old_name) {
            return Ok(false);
        }
        let resolved = resolve(new_name)?;
        *default = resolved.clone();
        drop(default);

        let mut enc = self.negotiated_encoding.write().unwrap();
        if enc.name.eq_ignore_ascii_case(old_name) {
            *enc = resolved.clone();
        }
        drop(enc);

        let mut dec = self.negotiated_decoding.write().unwrap();
        if dec.name.eq_ignore_ascii_case(old_name) {
            *dec = resolved;
        }
        Ok(true)
    }

    /// Commits a newly negotiated encoding name (outbound direction).
    pub fn set_negotiated_encoding(&self, name: &str) -> Result<(), CharsetError> {
        let resolved = resolve(name)?;
        *self.negotiated_encoding.write().unwrap() = resolved;
        Ok(())
    }

    /// Commits a newly negotiated decoding name (inbound direction).
    pub fn set_negotiated_decoding(&self, name: &str) -> Result<(), CharsetError> {
        let resolved = resolve(name)?;
        *self.negotiated_decoding.write().unwrap() = resolved;
        Ok(())
    }

    /// Selects default vs. negotiated for outbound text.
    pub fn set_binary_encode(&self, enabled: bool) {
        self.binary_encode.store(enabled, Ordering::Release);
    }

    /// Selects default vs. negotiated for inbound text.
    pub fn set_binary_decode(&self, enabled: bool) {
        self.binary_decode.store(enabled, Ordering::Release);
    }
}

fn decode_acceptable(text: &str) -> bool {
    !text.is_empty() && !text.starts_with('\u{FFFD}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_decode_replaces_invalid_sequences() {
        let charset = Charset::new("UTF-8", None, Usage::Always).unwrap();
        let outcome = charset.decode(&[0xFF, 0xFE], false);
        assert!(outcome.text.contains('\u{FFFD}'));
        assert_eq!(outcome.consumed, 2);
    }

    #[test]
    fn ascii_decode_is_permissive_encode_is_strict() {
        let charset = Charset::new("US-ASCII", None, Usage::Always).unwrap();
        let outcome = charset.decode(&[b'h', b'i', 0xE9], false);
        assert_eq!(outcome.text, "hi\u{FFFD}");

        assert!(charset.encode("hi").is_ok());
        assert!(matches!(
            charset.encode("caf\u{e9}"),
            Err(CharsetError::NotAscii(_))
        ));
    }

    #[test]
    fn unknown_encoding_name_rejected_at_construction() {
        let err = Charset::new("not-a-real-charset", None, Usage::Always).unwrap_err();
        assert!(matches!(err, CharsetError::UnknownEncoding(_)));
    }

    #[test]
    fn binary_flag_selects_negotiated_charset() {
        let charset = Charset::new("US-ASCII", None, Usage::Binary).unwrap();
        assert_eq!(charset.encoding_name(), "US-ASCII");
        charset.set_negotiated_encoding("UTF-8").unwrap();
        assert_eq!(charset.encoding_name(), "US-ASCII", "binary not yet on");
        charset.set_binary_encode(true);
        assert_eq!(charset.encoding_name(), "UTF-8");
    }

    #[test]
    fn promote_default_swaps_negotiated_when_it_matched_old_default() {
        let charset = Charset::new("US-ASCII", None, Usage::Always).unwrap();
        assert!(charset.promote_default("US-ASCII", "UTF-8").unwrap());
        assert_eq!(charset.default_name(), "UTF-8");
        assert_eq!(charset.encoding_name(), "UTF-8");
    }

    #[test]
    fn promote_default_noop_when_old_name_does_not_match() {
        let charset = Charset::new("UTF-8", None, Usage::Always).unwrap();
        assert!(!charset.promote_default("US-ASCII", "ISO-8859-1").unwrap());
        assert_eq!(charset.default_name(), "UTF-8");
    }

    #[test]
    fn fallback_latches_when_primary_decode_fails() {
        let charset = Charset::new("UTF-8", Some("windows-1252"), Usage::Always).unwrap();
        // 0xE9 is invalid as a lone UTF-8 continuation byte but decodes to
        // U+00E9 (é) under windows-1252.
        let outcome = charset.decode(&[0xE9], false);
        assert_eq!(outcome.text, "\u{e9}");
        assert!(outcome.fallback_latched);

        let next = charset.decode(b"hi", true);
        assert_eq!(next.text, "hi");
        assert!(next.fallback_latched);
    }
}
