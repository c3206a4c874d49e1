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

use crate::data::TerminalData;
use tracing::trace;
use unicode_segmentation::UnicodeSegmentation;

const ESC: char = '\u{1B}';
const CAN: char = '\u{18}';
const SUB: char = '\u{1A}';
const BEL: char = '\u{07}';
const ST_FINAL: char = '\\';

#[derive(Debug)]
enum State {
    /// Accumulating printable text / recognizing control codes.
    Normal,
    /// Just saw `ESC`; waiting to see what kind of sequence this is.
    Escape,
    /// `ESC [ ...` — collecting parameters/intermediates until a final byte
    /// in `0x40..=0x7E` dispatches the sequence.
    Csi {
        params: Vec<i64>,
        current: Option<i64>,
        intermediates: Vec<u8>,
    },
    /// A string-typed sequence (`OSC`, `DCS`, `SOS`, `PM`, `APC`) — these all
    /// terminate on ST (`ESC \`) or, for OSC only, a bare BEL, so they share
    /// one raw-accumulation state distinguished by `kind`.
    StringSeq { kind: StringKind, data: Vec<u8>, seen_esc: bool },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum StringKind {
    Osc,
    Dcs,
    Sos,
    Pm,
    Apc,
}

/// Stateful VT500-family ANSI control-sequence recognizer.
///
/// Consumes decoded UTF-8 text (never raw wire bytes — that's the framer's
/// job) and produces a sequence of [`TerminalData`] items. State persists
/// across [`DataParser::feed`] calls, so a sequence split across two reads
/// parses correctly; [`DataParser::flush`] releases any buffered text (used
/// at end-of-stream or whenever the caller needs a definite boundary, e.g.
/// before switching the charset's fallback latch).
pub struct DataParser {
    state: State,
    text: String,
    pending_cr: bool,
}

impl Default for DataParser {
    fn default() -> Self {
        DataParser {
            state: State::Normal,
            text: String::new(),
            pending_cr: false,
        }
    }
}

impl DataParser {
    pub fn new() -> Self {
        DataParser::default()
    }

    /// Feeds a chunk of decoded text through the state machine, returning
    /// every [`TerminalData`] item that became ready.
    pub fn feed(&mut self, text: &str) -> Vec<TerminalData> {
        let mut out = Vec::new();
        for grapheme in text.graphemes(true) {
            self.feed_grapheme(grapheme, &mut out);
        }
        out
    }

    /// Releases any buffered printable text as a final [`TerminalData::Text`].
    /// Does not clear a sequence that's mid-flight (a `CSI`/`OSC`/etc. still
    /// waiting on its terminator) — only the Normal-state text buffer.
    pub fn flush(&mut self) -> Option<TerminalData> {
        self.flush_text()
    }

    fn flush_text(&mut self) -> Option<TerminalData> {
        if self.text.is_empty() {
            None
        } else {
            Some(TerminalData::Text(std::mem::take(&mut self.text)))
        }
    }

    fn feed_grapheme(&mut self, grapheme: &str, out: &mut Vec<TerminalData>) {
        // Control codes and sequence introducers are always single ASCII
        // codepoints below 0x20, plus DEL (0x7F); a multi-codepoint grapheme
        // cluster, or any other single char, is printable text.
        let mut chars = grapheme.chars();
        let first = chars.next().expect("graphemes are never empty");
        let is_solo_control = chars.next().is_none() && first.is_ascii() && ((first as u32) < 0x20 || (first as u32) == 0x7F);

        if !is_solo_control {
            if matches!(self.state, State::Normal) {
                self.pending_cr = false;
                self.text.push_str(grapheme);
            } else {
                // Inside a sequence, printable/non-ASCII input is foreign to
                // the grammar; fed char-by-char as best-effort recovery.
                for ch in grapheme.chars() {
                    self.feed_char(ch, out);
                }
            }
            return;
        }
        self.feed_char(first, out);
    }

    fn feed_char(&mut self, ch: char, out: &mut Vec<TerminalData>) {
        match &mut self.state {
            State::Normal => self.feed_normal(ch, out),
            State::Escape => self.feed_escape(ch, out),
            State::Csi { .. } => self.feed_csi(ch, out),
            State::StringSeq { .. } => self.feed_string(ch, out),
        }
    }

    fn feed_normal(&mut self, ch: char, out: &mut Vec<TerminalData>) {
        match ch {
            '\r' => {
                if let Some(t) = self.flush_text() {
                    out.push(t);
                }
                out.push(TerminalData::ControlCode(b'\r'));
                out.push(TerminalData::ControlCode(b'\n'));
                self.pending_cr = true;
            }
            '\n' => {
                if self.pending_cr {
                    self.pending_cr = false;
                } else {
                    if let Some(t) = self.flush_text() {
                        out.push(t);
                    }
                    out.push(TerminalData::ControlCode(b'\n'));
                }
            }
            ESC => {
                self.pending_cr = false;
                if let Some(t) = self.flush_text() {
                    out.push(t);
                }
                self.state = State::Escape;
            }
            c if (c as u32) < 0x20 || (c as u32) == 0x7F => {
                self.pending_cr = false;
                if let Some(t) = self.flush_text() {
                    out.push(t);
                }
                out.push(TerminalData::ControlCode(c as u8));
            }
            c => {
                self.pending_cr = false;
                self.text.push(c);
            }
        }
    }

    fn feed_escape(&mut self, ch: char, out: &mut Vec<TerminalData>) {
        match ch {
            '[' => {
                self.state = State::Csi {
                    params: Vec::new(),
                    current: None,
                    intermediates: Vec::new(),
                };
            }
            ']' => self.enter_string(StringKind::Osc),
            'P' => self.enter_string(StringKind::Dcs),
            'X' => self.enter_string(StringKind::Sos),
            '^' => self.enter_string(StringKind::Pm),
            '_' => self.enter_string(StringKind::Apc),
            ESC => {
                // A new ESC cancels the pending (empty) one and restarts.
                trace!("escape sequence restarted by a second ESC");
            }
            CAN | SUB => {
                self.state = State::Normal;
            }
            c if c.is_ascii() => {
                out.push(TerminalData::Esc(c as u8));
                self.state = State::Normal;
            }
            _ => {
                self.state = State::Normal;
            }
        }
    }

    fn enter_string(&mut self, kind: StringKind) {
        self.state = State::StringSeq {
            kind,
            data: Vec::new(),
            seen_esc: false,
        };
    }

    fn feed_csi(&mut self, ch: char, out: &mut Vec<TerminalData>) {
        let State::Csi {
            params,
            current,
            intermediates,
        } = &mut self.state
        else {
            unreachable!()
        };
        match ch {
            '0'..='9' => {
                let digit = ch as i64 - '0' as i64;
                *current = Some(current.unwrap_or(0) * 10 + digit);
            }
            ';' => {
                params.push(current.take().unwrap_or(0));
            }
            c if (0x3A..=0x3F).contains(&(c as u32)) => {
                // Private-marker / parameter-prefix bytes (`:`, `<`, `=`,
                // `>`, `?`), e.g. the `?` in `CSI ? 25 l`. Not digits or
                // `;`, but still parameter bytes per the CSI grammar —
                // carried through as intermediates rather than dropped.
                intermediates.push(c as u8);
            }
            c if (0x20..=0x2F).contains(&(c as u32)) => {
                intermediates.push(c as u8);
            }
            CAN | SUB => {
                self.state = State::Normal;
            }
            c if (0x40..=0x7E).contains(&(c as u32)) => {
                if let Some(last) = current.take() {
                    params.push(last);
                }
                out.push(TerminalData::Csi {
                    cmd: c,
                    params: std::mem::take(params),
                    intermediates: std::mem::take(intermediates),
                });
                self.state = State::Normal;
            }
            _ => {
                // Outside the CSI grammar entirely; abandon the sequence.
                self.state = State::Normal;
            }
        }
    }

    fn feed_string(&mut self, ch: char, out: &mut Vec<TerminalData>) {
        let State::StringSeq { kind, data, seen_esc } = &mut self.state else {
            unreachable!()
        };
        if *seen_esc {
            if ch == ST_FINAL {
                let kind = *kind;
                let data = std::mem::take(data);
                out.push(dispatch_string(kind, data));
                self.state = State::Normal;
            } else {
                // False alarm: the ESC wasn't the start of ST. Keep it (and
                // whatever follows) as literal data.
                data.push(0x1B);
                *seen_esc = false;
                if ch == ESC {
                    *seen_esc = true;
                } else {
                    push_char_as_bytes(data, ch);
                }
            }
            return;
        }
        match ch {
            ESC => {
                *seen_esc = true;
            }
            BEL if *kind == StringKind::Osc => {
                let kind = *kind;
                let data = std::mem::take(data);
                out.push(dispatch_string(kind, data));
                self.state = State::Normal;
            }
            CAN | SUB => {
                self.state = State::Normal;
            }
            c => push_char_as_bytes(data, c),
        }
    }
}

fn push_char_as_bytes(data: &mut Vec<u8>, ch: char) {
    let mut buf = [0u8; 4];
    data.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
}

fn dispatch_string(kind: StringKind, data: Vec<u8>) -> TerminalData {
    match kind {
        StringKind::Osc => {
            let text = data;
            match text.iter().position(|&b| b == b';') {
                Some(idx) => {
                    let cmd = std::str::from_utf8(&text[..idx]).ok().and_then(|s| s.parse::<i64>().ok());
                    TerminalData::Osc {
                        cmd,
                        data: text[idx + 1..].to_vec(),
                    }
                }
                None => TerminalData::Osc { cmd: None, data: text },
            }
        }
        StringKind::Dcs => {
            let (params, cmd, rest) = split_dcs_header(&data);
            TerminalData::Dcs {
                cmd,
                params,
                data: rest,
            }
        }
        StringKind::Sos => TerminalData::Sos { data },
        StringKind::Pm => TerminalData::Pm { data },
        StringKind::Apc => TerminalData::Apc { data },
    }
}

/// Splits a raw DCS body (`<params><intermediates><final><passthrough>`)
/// into the parsed parameter list, the final dispatch byte, and whatever
/// trails it. Malformed input (no final byte in `0x40..=0x7E`) yields
/// `cmd = '\0'` and the whole body as `data`.
fn split_dcs_header(body: &[u8]) -> (Vec<i64>, char, Vec<u8>) {
    let mut idx = 0;
    while idx < body.len() && (body[idx].is_ascii_digit() || body[idx] == b';') {
        idx += 1;
    }
    let header_end = idx;
    while idx < body.len() && (0x20..=0x2F).contains(&body[idx]) {
        idx += 1;
    }
    if idx >= body.len() || !(0x40..=0x7E).contains(&body[idx]) {
        return (Vec::new(), '\0', body.to_vec());
    }
    let params = body[..header_end]
        .split(|&b| b == b';')
        .map(|chunk| std::str::from_utf8(chunk).ok().and_then(|s| s.parse::<i64>().ok()).unwrap_or(0))
        .collect();
    let cmd = body[idx] as char;
    let rest = body[idx + 1..].to_vec();
    (params, cmd, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(parser: &mut DataParser, text: &str) -> Vec<TerminalData> {
        let mut out = parser.feed(text);
        if let Some(t) = parser.flush() {
            out.push(t);
        }
        out
    }

    #[test]
    fn plain_text_coalesces() {
        let mut parser = DataParser::new();
        let out = feed_all(&mut parser, "hello world");
        assert_eq!(out, vec![TerminalData::Text("hello world".to_string())]);
    }

    #[test]
    fn cr_synthesizes_lf_and_suppresses_natural_lf() {
        let mut parser = DataParser::new();
        let out = parser.feed("a\r\nb");
        assert_eq!(
            out,
            vec![
                TerminalData::Text("a".to_string()),
                TerminalData::ControlCode(b'\r'),
                TerminalData::ControlCode(b'\n'),
                TerminalData::Text("b".to_string()),
            ]
        );
    }

    #[test]
    fn bare_cr_still_synthesizes_lf() {
        let mut parser = DataParser::new();
        let out = parser.feed("a\rb");
        assert_eq!(
            out,
            vec![
                TerminalData::Text("a".to_string()),
                TerminalData::ControlCode(b'\r'),
                TerminalData::ControlCode(b'\n'),
                TerminalData::Text("b".to_string()),
            ]
        );
    }

    #[test]
    fn bare_lf_without_preceding_cr_is_not_suppressed() {
        let mut parser = DataParser::new();
        let out = parser.feed("a\nb");
        assert_eq!(
            out,
            vec![
                TerminalData::Text("a".to_string()),
                TerminalData::ControlCode(b'\n'),
                TerminalData::Text("b".to_string()),
            ]
        );
    }

    #[test]
    fn csi_sequence_with_params_and_intermediate() {
        let mut parser = DataParser::new();
        let out = parser.feed("\u{1B}[1;31m");
        assert_eq!(
            out,
            vec![TerminalData::Csi {
                cmd: 'm',
                params: vec![1, 31],
                intermediates: vec![],
            }]
        );
    }

    #[test]
    fn csi_private_marker_is_not_abandoned() {
        let mut parser = DataParser::new();
        let out = parser.feed("\u{1B}[?25l");
        assert_eq!(
            out,
            vec![TerminalData::Csi {
                cmd: 'l',
                params: vec![25],
                intermediates: vec![b'?'],
            }]
        );
    }

    #[test]
    fn csi_alt_screen_private_marker_with_long_param() {
        let mut parser = DataParser::new();
        let out = parser.feed("\u{1B}[?1049h");
        assert_eq!(
            out,
            vec![TerminalData::Csi {
                cmd: 'h',
                params: vec![1049],
                intermediates: vec![b'?'],
            }]
        );
    }

    #[test]
    fn csi_split_across_two_feed_calls() {
        let mut parser = DataParser::new();
        assert!(parser.feed("\u{1B}[1;3").is_empty());
        let out = parser.feed("1m");
        assert_eq!(
            out,
            vec![TerminalData::Csi {
                cmd: 'm',
                params: vec![1, 31],
                intermediates: vec![],
            }]
        );
    }

    #[test]
    fn osc_terminated_by_bel() {
        let mut parser = DataParser::new();
        let out = parser.feed("\u{1B}]0;title here\u{07}");
        assert_eq!(
            out,
            vec![TerminalData::Osc {
                cmd: Some(0),
                data: b"title here".to_vec(),
            }]
        );
    }

    #[test]
    fn osc_terminated_by_st() {
        let mut parser = DataParser::new();
        let out = parser.feed("\u{1B}]2;window\u{1B}\\");
        assert_eq!(
            out,
            vec![TerminalData::Osc {
                cmd: Some(2),
                data: b"window".to_vec(),
            }]
        );
    }

    #[test]
    fn dcs_sequence_parses_params_and_passthrough() {
        let mut parser = DataParser::new();
        let out = parser.feed("\u{1B}P1$rfoo\u{1B}\\");
        assert_eq!(
            out,
            vec![TerminalData::Dcs {
                cmd: 'r',
                params: vec![1],
                data: b"foo".to_vec(),
            }]
        );
    }

    #[test]
    fn sos_pm_apc_round_trip() {
        let mut parser = DataParser::new();
        let out = parser.feed("\u{1B}Xnote\u{1B}\\\u{1B}^priv\u{1B}\\\u{1B}_app\u{1B}\\");
        assert_eq!(
            out,
            vec![
                TerminalData::Sos { data: b"note".to_vec() },
                TerminalData::Pm { data: b"priv".to_vec() },
                TerminalData::Apc { data: b"app".to_vec() },
            ]
        );
    }

    #[test]
    fn simple_escape_dispatches_immediately() {
        let mut parser = DataParser::new();
        let out = parser.feed("\u{1B}c");
        assert_eq!(out, vec![TerminalData::Esc(b'c')]);
    }

    #[test]
    fn text_before_escape_flushes_first() {
        let mut parser = DataParser::new();
        let out = parser.feed("hi\u{1B}[2J");
        assert_eq!(
            out,
            vec![
                TerminalData::Text("hi".to_string()),
                TerminalData::Csi {
                    cmd: 'J',
                    params: vec![2],
                    intermediates: vec![],
                },
            ]
        );
    }

    #[test]
    fn flush_releases_buffered_text_only() {
        let mut parser = DataParser::new();
        assert!(parser.feed("partial").is_empty());
        assert_eq!(parser.flush(), Some(TerminalData::Text("partial".to_string())));
        assert_eq!(parser.flush(), None);
    }

    #[test]
    fn control_code_flushes_pending_text() {
        let mut parser = DataParser::new();
        let out = parser.feed("hi\tbye");
        assert_eq!(
            out,
            vec![
                TerminalData::Text("hi".to_string()),
                TerminalData::ControlCode(b'\t'),
                TerminalData::Text("bye".to_string()),
            ]
        );
    }
}
