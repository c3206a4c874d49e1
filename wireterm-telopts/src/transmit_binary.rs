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

//! `TRANSMIT-BINARY` (RFC 856): the option that puts a side of the
//! connection into 8-bit mode, which `wireterm-charset` consults to pick the
//! negotiated charset over the default on that side.

use crate::TerminalRef;
use std::sync::Weak;
use wireterm_core::{CoreError, TelOpt, TelOptCode, TelOptState, Terminal, Transition, Usage};

/// Toggles [`wireterm_charset::Charset::set_binary_encode`] /
/// `set_binary_decode` as each side activates or deactivates.
#[derive(Default)]
pub struct TransmitBinary {
    usage: Usage,
    terminal: TerminalRef,
}

impl TransmitBinary {
    pub fn new(usage: Usage) -> Self {
        TransmitBinary {
            usage,
            terminal: TerminalRef::default(),
        }
    }
}

impl TelOpt for TransmitBinary {
    fn code(&self) -> TelOptCode {
        crate::codes::TRANSMIT_BINARY
    }

    fn name(&self) -> &'static str {
        "TRANSMIT-BINARY"
    }

    fn usage(&self) -> Usage {
        self.usage
    }

    fn initialize(&self, terminal: Weak<Terminal>) {
        self.terminal.set(terminal);
    }

    fn transition_local_state(&self, new_state: TelOptState) -> Result<Transition, CoreError> {
        if let Some(terminal) = self.terminal.get() {
            terminal.charset().set_binary_encode(new_state == TelOptState::Active);
        }
        Ok(Transition::none())
    }

    fn transition_remote_state(&self, new_state: TelOptState) -> Result<Transition, CoreError> {
        if let Some(terminal) = self.terminal.get() {
            terminal.charset().set_binary_decode(new_state == TelOptState::Active);
        }
        Ok(Transition::none())
    }
}
