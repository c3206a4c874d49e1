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

use crate::command::{Command, Token};
use crate::opcode::{raw, OpCode};
use bytes::{Buf, Bytes, BytesMut};
use tracing::trace;

/// Splits a raw inbound byte stream into [`Token`]s.
///
/// The framer is a pure, synchronous tokenizer: it neither owns a socket nor
/// blocks. The caller (the printer, in `wireterm-core`) appends freshly read
/// bytes to a `BytesMut` and calls [`Framer::next_token`] in a loop until it
/// returns `None`, meaning "not enough bytes yet — read more and try again".
///
/// The framer never returns a token straddling an IAC boundary and never
/// returns a partial IAC command. A `\0` byte inside a text run is silently
/// dropped (it is never surfaced as a token). `IAC IAC` collapses to a single
/// literal `0xFF` byte, delivered as a one-byte [`Token::Text`].
#[derive(Debug, Default)]
pub struct Framer {
    bytes_scanned: u64,
    commands_parsed: u64,
}

impl Framer {
    /// Creates a fresh framer. The framer carries no parse state across
    /// calls other than the introspection counters below — partial input is
    /// always represented by leftover bytes in the caller's buffer.
    pub fn new() -> Self {
        Framer::default()
    }

    /// Total bytes this framer has scanned (text + command bytes), for
    /// [`wireterm_core`]-level stats reporting.
    pub fn bytes_scanned(&self) -> u64 {
        self.bytes_scanned
    }

    /// Total complete IAC commands this framer has produced.
    pub fn commands_parsed(&self) -> u64 {
        self.commands_parsed
    }

    /// Attempts to pull the next token out of `src`, advancing it past the
    /// bytes consumed. Returns `None` if `src` doesn't yet hold a complete
    /// token (the caller should read more bytes and retry); `src` is left
    /// untouched in that case.
    pub fn next_token(&mut self, src: &mut BytesMut) -> Option<Token> {
        if src.is_empty() {
            return None;
        }
        if src[0] == raw::IAC {
            return self.next_command(src);
        }
        self.next_text_run(src)
    }

    /// Releases any bytes remaining in `src` as a final text token, used on
    /// end-of-stream: even a truncated mid-IAC sequence is flushed as plain
    /// text rather than discarded.
    pub fn flush(&mut self, src: &mut BytesMut) -> Option<Token> {
        if src.is_empty() {
            return None;
        }
        let mut out = Vec::with_capacity(src.len());
        out.extend(src.iter().copied().filter(|&b| b != 0));
        self.bytes_scanned += src.len() as u64;
        src.advance(src.len());
        if out.is_empty() {
            None
        } else {
            Some(Token::Text(Bytes::from(out)))
        }
    }

    /// Consumes a run of non-IAC bytes, stripping embedded NULs.
    fn next_text_run(&mut self, src: &mut BytesMut) -> Option<Token> {
        let boundary = src.iter().position(|&b| b == raw::IAC).unwrap_or(src.len());
        if boundary == 0 {
            return None;
        }
        let run = src.split_to(boundary);
        self.bytes_scanned += run.len() as u64;
        if run.iter().any(|&b| b == 0) {
            let filtered: Vec<u8> = run.iter().copied().filter(|&b| b != 0).collect();
            if filtered.is_empty() {
                return self.next_token(src);
            }
            Some(Token::Text(Bytes::from(filtered)))
        } else {
            Some(Token::Text(run.freeze()))
        }
    }

    /// Parses a command starting at `src[0] == IAC`.
    fn next_command(&mut self, src: &mut BytesMut) -> Option<Token> {
        if src.len() < 2 {
            return None;
        }
        let next = src[1];
        if next == raw::IAC {
            src.advance(2);
            self.bytes_scanned += 2;
            return Some(Token::Text(Bytes::from_static(&[0xFF])));
        }
        let opcode = OpCode::from_u8(next);
        if opcode.carries_option() {
            if src.len() < 3 {
                return None;
            }
            let option = src[2];
            src.advance(3);
            self.bytes_scanned += 3;
            self.commands_parsed += 1;
            return Some(Token::Command(Command::negotiation(opcode, option)));
        }
        if let OpCode::Subnegotiation = opcode {
            return self.next_subnegotiation(src);
        }
        // 2-byte command: NOP/GA/EOR/SE/AYT, or a minor opcode recovery.
        src.advance(2);
        self.bytes_scanned += 2;
        self.commands_parsed += 1;
        Some(Token::Command(Command::simple(opcode)))
    }

    /// Parses `IAC SB <opt> ... IAC SE`, de-escaping inner `IAC IAC` pairs
    /// and treating them as literal bytes rather than a terminator.
    fn next_subnegotiation(&mut self, src: &mut BytesMut) -> Option<Token> {
        if src.len() < 3 {
            return None;
        }
        let option = src[2];
        let mut i = 3;
        let mut payload = Vec::new();
        loop {
            if i >= src.len() {
                trace!(option, "subnegotiation not yet terminated, awaiting more bytes");
                return None;
            }
            if src[i] == raw::IAC {
                match src.get(i + 1) {
                    None => return None,
                    Some(&raw::IAC) => {
                        payload.push(0xFF);
                        i += 2;
                    }
                    Some(&raw::SE) => {
                        let total = i + 2;
                        let consumed = src.split_to(total);
                        self.bytes_scanned += consumed.len() as u64;
                        self.commands_parsed += 1;
                        return Some(Token::Command(Command::subnegotiation(
                            option,
                            Bytes::from(payload),
                        )));
                    }
                    Some(_other) => {
                        // IAC followed by something other than IAC/SE inside
                        // a subnegotiation: not valid per RFC 854, but we
                        // don't have anywhere safe to recover to other than
                        // keeping scanning for the real terminator.
                        payload.push(src[i]);
                        i += 1;
                    }
                }
            } else {
                payload.push(src[i]);
                i += 1;
            }
        }
    }
}
