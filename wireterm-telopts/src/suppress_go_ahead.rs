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

//! `SUPPRESS-GO-AHEAD` (RFC 858): the option that clears the `GA` bit of the
//! prompt-command masks. Active on our local side means we've promised not
//! to send `IAC GA`, so the keyboard mask's `GA` bit is cleared; active on
//! the remote side means the peer won't send it either, so stray `IAC GA`
//! bytes that do arrive are dropped rather than surfaced as `PromptData`.

use crate::TerminalRef;
use std::sync::Weak;
use wireterm_core::{CoreError, TelOpt, TelOptCode, TelOptState, Terminal, Transition, Usage};

#[derive(Default)]
pub struct SuppressGoAhead {
    usage: Usage,
    terminal: TerminalRef,
}

impl SuppressGoAhead {
    pub fn new(usage: Usage) -> Self {
        SuppressGoAhead {
            usage,
            terminal: TerminalRef::default(),
        }
    }
}

impl TelOpt for SuppressGoAhead {
    fn code(&self) -> TelOptCode {
        crate::codes::SUPPRESS_GO_AHEAD
    }

    fn name(&self) -> &'static str {
        "SUPPRESS-GO-AHEAD"
    }

    fn usage(&self) -> Usage {
        self.usage
    }

    fn initialize(&self, terminal: Weak<Terminal>) {
        self.terminal.set(terminal);
    }

    fn transition_local_state(&self, new_state: TelOptState) -> Result<Transition, CoreError> {
        if let Some(terminal) = self.terminal.get() {
            terminal.keyboard_mask().set_ga(new_state != TelOptState::Active);
        }
        Ok(Transition::none())
    }

    fn transition_remote_state(&self, new_state: TelOptState) -> Result<Transition, CoreError> {
        if let Some(terminal) = self.terminal.get() {
            terminal.printer_mask().set_ga(new_state != TelOptState::Active);
        }
        Ok(Transition::none())
    }
}
