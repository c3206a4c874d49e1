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

//! `ECHO` (RFC 857). Ordinary negotiation-only option; the core never
//! special-cases it. Tracks a plain `enabled` flag the host can poll, e.g.
//! to decide whether to echo keystrokes itself.
//!
//! Per spec.md §9's open question: the source this was distilled from has an
//! ambiguous branch that sets the flag `true` on *both* activate and
//! deactivate in one code path. Treated as a bug here: activate sets it
//! `true`, deactivate sets it `false`.

use crate::TerminalRef;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;
use wireterm_core::{CoreError, TelOpt, TelOptCode, TelOptState, Terminal, Transition, Usage};

#[derive(Default)]
pub struct Echo {
    usage: Usage,
    terminal: TerminalRef,
    enabled: AtomicBool,
}

impl Echo {
    pub fn new(usage: Usage) -> Self {
        Echo {
            usage,
            terminal: TerminalRef::default(),
            enabled: AtomicBool::new(false),
        }
    }

    /// Whether the local side is currently echoing input back to the peer.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

impl TelOpt for Echo {
    fn code(&self) -> TelOptCode {
        crate::codes::ECHO
    }

    fn name(&self) -> &'static str {
        "ECHO"
    }

    fn usage(&self) -> Usage {
        self.usage
    }

    fn initialize(&self, terminal: Weak<Terminal>) {
        self.terminal.set(terminal);
    }

    fn transition_local_state(&self, new_state: TelOptState) -> Result<Transition, CoreError> {
        self.enabled.store(new_state == TelOptState::Active, Ordering::Release);
        Ok(Transition::none())
    }
}
