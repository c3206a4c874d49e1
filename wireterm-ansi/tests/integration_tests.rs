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

use wireterm_ansi::{DataParser, TerminalData};

/// Scenario 2 from spec.md §8, the ANSI-parser half: once the charset engine
/// has decoded `Hello\xffworld\r\n` to UTF-8 (the literal `0xFF` survives
/// decoding because it came from a doubled-IAC text escape, not malformed
/// input), the parser emits one coalesced `Text`, then the CR/LF pair.
#[test]
fn greeting_with_embedded_0xff_then_crlf() {
    let mut parser = DataParser::new();
    let out = parser.feed("Hello\u{00ff}world\r\n");
    assert_eq!(
        out,
        vec![
            TerminalData::Text("Hello\u{00ff}world".to_string()),
            TerminalData::ControlCode(b'\r'),
            TerminalData::ControlCode(b'\n'),
        ]
    );
}

#[test]
fn cursor_movement_sequence_split_across_reads_still_dispatches_once() {
    let mut parser = DataParser::new();
    let mut out = Vec::new();
    for chunk in ["\u{1B}", "[", "1", "0", ";", "2", "0", "H"] {
        out.extend(parser.feed(chunk));
    }
    assert_eq!(
        out,
        vec![TerminalData::Csi {
            cmd: 'H',
            params: vec![10, 20],
            intermediates: vec![],
        }]
    );
}

#[test]
fn mixed_stream_interleaves_text_and_sequences_in_order() {
    let mut parser = DataParser::new();
    let out = parser.feed("before\u{1B}[31mred\u{1B}[0mafter");
    assert_eq!(
        out,
        vec![
            TerminalData::Text("before".to_string()),
            TerminalData::Csi {
                cmd: 'm',
                params: vec![31],
                intermediates: vec![],
            },
            TerminalData::Text("red".to_string()),
            TerminalData::Csi {
                cmd: 'm',
                params: vec![0],
                intermediates: vec![],
            },
            TerminalData::Text("after".to_string()),
        ]
    );
}

#[test]
fn window_title_osc_does_not_leak_into_surrounding_text() {
    let mut parser = DataParser::new();
    let out = parser.feed("a\u{1B}]0;new title\u{07}b");
    assert_eq!(
        out,
        vec![
            TerminalData::Text("a".to_string()),
            TerminalData::Osc {
                cmd: Some(0),
                data: b"new title".to_vec(),
            },
            TerminalData::Text("b".to_string()),
        ]
    );
}

#[test]
fn grapheme_cluster_is_not_split_across_text_emission() {
    // "e" + combining acute accent is one grapheme cluster; it must survive
    // as a single Text item rather than being split at the codepoint level.
    let mut parser = DataParser::new();
    let out = parser.feed("caf\u{65}\u{301}\r\n");
    assert_eq!(
        out,
        vec![
            TerminalData::Text("caf\u{65}\u{301}".to_string()),
            TerminalData::ControlCode(b'\r'),
            TerminalData::ControlCode(b'\n'),
        ]
    );
}
