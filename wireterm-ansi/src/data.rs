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

use wireterm_framer::Command;

/// Which prompt command a [`TerminalData::Prompt`] item represents.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PromptKind {
    /// `IAC GA`.
    GoAhead,
    /// `IAC EOR`.
    EndOfRecord,
}

/// A single classified item of inbound terminal data.
///
/// [`TerminalData::Text`] through [`TerminalData::Apc`] are produced by
/// [`crate::DataParser`] from decoded text. [`TerminalData::Prompt`] and
/// [`TerminalData::Command`] are not — the printer attaches those directly
/// from framer tokens that never pass through the ANSI state machine at all
/// (a raw `IAC` command isn't "decoded text"). They share this enum because
/// host code consumes one ordered stream of both kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum TerminalData {
    /// A coalesced run of printable text.
    Text(String),
    /// A single C0/C1 control code, e.g. `\r`, `\n`, `\t`, BEL.
    ControlCode(u8),
    /// `ESC [ <params> <intermediates> <cmd>`.
    Csi {
        cmd: char,
        params: Vec<i64>,
        intermediates: Vec<u8>,
    },
    /// `ESC ] <cmd> ; <data> (BEL | ST)`.
    Osc { cmd: Option<i64>, data: Vec<u8> },
    /// `ESC P <params> <cmd> <data> ST`.
    Dcs {
        cmd: char,
        params: Vec<i64>,
        data: Vec<u8>,
    },
    /// A two-character escape sequence that isn't CSI/OSC/DCS/SOS/PM/APC.
    Esc(u8),
    /// `ESC X <data> ST`.
    Sos { data: Vec<u8> },
    /// `ESC ^ <data> ST`.
    Pm { data: Vec<u8> },
    /// `ESC _ <data> ST`.
    Apc { data: Vec<u8> },
    /// A suppressible `IAC GA` / `IAC EOR` prompt marker.
    Prompt(PromptKind),
    /// Any other IAC command, carried through for host inspection.
    Command(Command),
}
