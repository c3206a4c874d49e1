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

use crate::opcode::{OpCode, TelOptCode};
use bytes::Bytes;

/// A single parsed TELNET command: `IAC <opcode> [<option> [<payload> IAC SE]]`.
///
/// `option` is only meaningful for `Will`/`Wont`/`Do`/`Dont`/`Subnegotiation`.
/// `subnegotiation` is only present for `Subnegotiation`, and holds the
/// de-escaped bytes strictly between the `IAC SB <opt>` header and the
/// terminating `IAC SE` — any `IAC IAC` pair inside that payload has already
/// been collapsed to a single `0xFF`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Command {
    /// Which TELNET command this is.
    pub opcode: OpCode,
    /// The option byte, for negotiation and subnegotiation commands.
    pub option: Option<TelOptCode>,
    /// The de-escaped subnegotiation payload, for `Subnegotiation` commands.
    pub subnegotiation: Option<Bytes>,
}

impl Command {
    /// A bare two-byte command: `NOP`, `GA`, `EOR`, `SE`, `AYT`, or a minor
    /// (unrecognized) opcode.
    pub fn simple(opcode: OpCode) -> Self {
        Command {
            opcode,
            option: None,
            subnegotiation: None,
        }
    }

    /// A three-byte negotiation command: `WILL`/`WONT`/`DO`/`DONT <option>`.
    pub fn negotiation(opcode: OpCode, option: TelOptCode) -> Self {
        debug_assert!(opcode.carries_option());
        Command {
            opcode,
            option: Some(option),
            subnegotiation: None,
        }
    }

    /// A complete subnegotiation: `IAC SB <option> <payload> IAC SE`.
    pub fn subnegotiation(option: TelOptCode, payload: Bytes) -> Self {
        Command {
            opcode: OpCode::Subnegotiation,
            option: Some(option),
            subnegotiation: Some(payload),
        }
    }

    /// Whether this is `IAC GA` or `IAC EOR` — the two "prompt commands".
    pub fn is_prompt_command(&self) -> bool {
        matches!(self.opcode, OpCode::GoAhead | OpCode::EndOfRecord)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.opcode, self.option, &self.subnegotiation) {
            (OpCode::Subnegotiation, Some(opt), Some(payload)) => {
                write!(f, "IAC SB {opt} ({} bytes) IAC SE", payload.len())
            }
            (opcode, Some(opt), _) => write!(f, "IAC {opcode} {opt}"),
            (opcode, None, _) => write!(f, "IAC {opcode}"),
        }
    }
}

/// One unit of output from [`crate::Framer`]: either a run of ordinary data
/// bytes, or a complete TELNET command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    /// A text run (`\0` already stripped, `IAC IAC` already collapsed to a
    /// single `0xFF`).
    Text(Bytes),
    /// A complete IAC command.
    Command(Command),
}
