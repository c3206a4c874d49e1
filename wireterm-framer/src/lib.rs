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

//! Byte-level TELNET framing (RFC 854, RFC 885).
//!
//! This crate owns exactly one job: turning a raw inbound byte stream into a
//! sequence of [`Token`]s (text runs and complete IAC commands), and the
//! reverse — rendering a [`Command`] back to wire bytes. It knows nothing
//! about option negotiation state, character encodings, or ANSI escape
//! sequences; those live one layer up in `wireterm-core`, `wireterm-charset`
//! and `wireterm-ansi` respectively.

mod command;
mod framer;
mod opcode;

pub use command::{Command, Token};
pub use framer::Framer;
pub use opcode::{raw, OpCode, TelOptCode};

use bytes::{BufMut, BytesMut};

/// Appends the wire bytes for `command` to `dst`, escaping as needed.
///
/// `Command::Subnegotiation` payloads have any `0xFF` byte re-escaped to
/// `IAC IAC` before the `IAC SE` terminator is written; negotiation commands
/// need no escaping since the option byte is never IAC-ambiguous.
pub fn encode_command(dst: &mut BytesMut, command: &Command) {
    dst.put_u8(raw::IAC);
    match (&command.subnegotiation, command.option) {
        (Some(payload), Some(option)) => {
            dst.put_u8(raw::SB);
            dst.put_u8(option);
            encode_escaped(dst, payload);
            dst.put_u8(raw::IAC);
            dst.put_u8(raw::SE);
        }
        (None, Some(option)) => {
            dst.put_u8(command.opcode.to_u8());
            dst.put_u8(option);
        }
        (None, None) => {
            dst.put_u8(command.opcode.to_u8());
        }
    }
}

/// Appends `text` to `dst`, escaping every `0xFF` byte as `IAC IAC`.
pub fn encode_text(dst: &mut BytesMut, text: &[u8]) {
    encode_escaped(dst, text);
}

fn encode_escaped(dst: &mut BytesMut, bytes: &[u8]) {
    dst.reserve(bytes.len());
    for &b in bytes {
        dst.put_u8(b);
        if b == raw::IAC {
            dst.put_u8(raw::IAC);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn encode_text_escapes_0xff() {
        let mut dst = BytesMut::new();
        encode_text(&mut dst, &[1, 0xFF, 2]);
        assert_eq!(&dst[..], &[1, raw::IAC, raw::IAC, 2]);
    }

    #[test]
    fn encode_negotiation_command() {
        let mut dst = BytesMut::new();
        encode_command(&mut dst, &Command::negotiation(OpCode::Do, 31));
        assert_eq!(&dst[..], &[raw::IAC, raw::DO, 31]);
    }

    #[test]
    fn encode_subnegotiation_escapes_payload() {
        let mut dst = BytesMut::new();
        encode_command(
            &mut dst,
            &Command::subnegotiation(31, Bytes::from_static(&[80, 0xFF, 24])),
        );
        assert_eq!(
            &dst[..],
            &[raw::IAC, raw::SB, 31, 80, raw::IAC, raw::IAC, 24, raw::IAC, raw::SE]
        );
    }

    #[test]
    fn round_trip_through_framer() {
        let mut dst = BytesMut::new();
        encode_command(&mut dst, &Command::simple(OpCode::GoAhead));
        encode_text(&mut dst, b"hi");
        encode_command(&mut dst, &Command::negotiation(OpCode::Will, 1));

        let mut framer = Framer::new();
        let mut toks = Vec::new();
        while let Some(tok) = framer.next_token(&mut dst) {
            toks.push(tok);
        }
        assert_eq!(
            toks,
            vec![
                Token::Command(Command::simple(OpCode::GoAhead)),
                Token::Text(Bytes::from_static(b"hi")),
                Token::Command(Command::negotiation(OpCode::Will, 1)),
            ]
        );
    }
}
