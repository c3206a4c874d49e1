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

use bytes::{Bytes, BytesMut};
use wireterm_framer::{encode_command, encode_text, Command, Framer, OpCode, Token};

/// Scenario 1 from spec.md §8: a login banner followed by the server opening
/// ECHO and SUPPRESS-GO-AHEAD, then a prompt terminated by GA.
#[test]
fn login_banner_then_negotiation_then_prompt() {
    let mut wire = BytesMut::new();
    encode_text(&mut wire, b"Welcome\r\n");
    encode_command(&mut wire, &Command::negotiation(OpCode::Will, 1)); // ECHO
    encode_command(&mut wire, &Command::negotiation(OpCode::Will, 3)); // SGA
    encode_text(&mut wire, b"login: ");
    encode_command(&mut wire, &Command::simple(OpCode::GoAhead));

    let mut framer = Framer::new();
    let mut tokens = Vec::new();
    while let Some(tok) = framer.next_token(&mut wire) {
        tokens.push(tok);
    }
    assert!(wire.is_empty());

    assert_eq!(
        tokens,
        vec![
            Token::Text(Bytes::from_static(b"Welcome\r\n")),
            Token::Command(Command::negotiation(OpCode::Will, 1)),
            Token::Command(Command::negotiation(OpCode::Will, 3)),
            Token::Text(Bytes::from_static(b"login: ")),
            Token::Command(Command::simple(OpCode::GoAhead)),
        ]
    );
    assert!(tokens.last().unwrap() == &Token::Command(Command::simple(OpCode::GoAhead)));
}

/// Scenario 2 from spec.md §8: a CHARSET subnegotiation round-trip whose
/// payload happens to contain a byte equal to IAC, exercising the escape path
/// end to end through both the encoder and the framer.
#[test]
fn charset_subnegotiation_with_iac_valued_payload_byte() {
    let mut wire = BytesMut::new();
    let payload = Bytes::from_static(&[1, b';', b'U', b'T', b'F', b'-', 0xFF, b'8']);
    encode_command(&mut wire, &Command::subnegotiation(42, payload.clone()));

    let mut framer = Framer::new();
    let token = framer.next_token(&mut wire).expect("complete subnegotiation");
    assert!(wire.is_empty());
    assert_eq!(token, Token::Command(Command::subnegotiation(42, payload)));
}

/// Bytes arriving split across many small reads still reassemble correctly;
/// this is the contract the reader task in `wireterm-core` depends on.
#[test]
fn fragmented_delivery_reassembles_correctly() {
    let mut wire = BytesMut::new();
    encode_text(&mut wire, b"hello");
    encode_command(&mut wire, &Command::negotiation(OpCode::Do, 24)); // TERMINAL-TYPE
    encode_text(&mut wire, b"world");
    let whole: Vec<u8> = wire.to_vec();

    let mut framer = Framer::new();
    let mut buf = BytesMut::new();
    let mut tokens = Vec::new();
    for chunk in whole.chunks(1) {
        buf.extend_from_slice(chunk);
        while let Some(tok) = framer.next_token(&mut buf) {
            tokens.push(tok);
        }
    }
    assert!(buf.is_empty());

    let texts: Vec<Bytes> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Text(b) => Some(b.clone()),
            Token::Command(_) => None,
        })
        .collect();
    assert_eq!(texts, vec![Bytes::from_static(b"hello"), Bytes::from_static(b"world")]);
    assert!(tokens
        .iter()
        .any(|t| matches!(t, Token::Command(c) if c.opcode == OpCode::Do && c.option == Some(24))));
}

/// A dropped connection mid subnegotiation must not panic or lose bytes:
/// flush() surfaces whatever was buffered as trailing text.
#[test]
fn end_of_stream_flush_recovers_partial_command() {
    let mut wire = BytesMut::new();
    encode_text(&mut wire, b"partial: ");
    wire.extend_from_slice(&[wireterm_framer::raw::IAC, wireterm_framer::raw::SB, 1, b'x']);

    let mut framer = Framer::new();
    let mut tokens = Vec::new();
    while let Some(tok) = framer.next_token(&mut wire) {
        tokens.push(tok);
    }
    assert_eq!(tokens, vec![Token::Text(Bytes::from_static(b"partial: "))]);

    let flushed = framer.flush(&mut wire).expect("trailing bytes flushed");
    assert_eq!(
        flushed,
        Token::Text(Bytes::from_static(&[
            wireterm_framer::raw::IAC,
            wireterm_framer::raw::SB,
            1,
            b'x'
        ]))
    );
    assert!(wire.is_empty());
}
