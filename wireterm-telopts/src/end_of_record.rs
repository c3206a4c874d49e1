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

//! `END-OF-RECORD` (RFC 885): the mirror image of `SUPPRESS-GO-AHEAD` on the
//! other bit of the prompt-command mask. Active on our local side sets the
//! keyboard mask's `EOR` bit, so `send_prompt_hint` prefers `IAC EOR` over
//! `IAC GA` (the keyboard checks `EOR` first); active on the remote side
//! sets the printer mask's `EOR` bit, so inbound `IAC EOR` surfaces as
//! `PromptData` instead of being dropped.

use crate::TerminalRef;
use std::sync::Weak;
use wireterm_core::{CoreError, TelOpt, TelOptCode, TelOptState, Terminal, Transition, Usage};

#[derive(Default)]
pub struct EndOfRecord {
    usage: Usage,
    terminal: TerminalRef,
}

impl EndOfRecord {
    pub fn new(usage: Usage) -> Self {
        EndOfRecord {
            usage,
            terminal: TerminalRef::default(),
        }
    }
}

impl TelOpt for EndOfRecord {
    fn code(&self) -> TelOptCode {
        crate::codes::END_OF_RECORD
    }

    fn name(&self) -> &'static str {
        "END-OF-RECORD"
    }

    fn usage(&self) -> Usage {
        self.usage
    }

    fn initialize(&self, terminal: Weak<Terminal>) {
        self.terminal.set(terminal);
    }

    fn transition_local_state(&self, new_state: TelOptState) -> Result<Transition, CoreError> {
        if let Some(terminal) = self.terminal.get() {
            terminal.keyboard_mask().set_eor(new_state == TelOptState::Active);
        }
        Ok(Transition::none())
    }

    fn transition_remote_state(&self, new_state: TelOptState) -> Result<Transition, CoreError> {
        if let Some(terminal) = self.terminal.get() {
            terminal.printer_mask().set_eor(new_state == TelOptState::Active);
        }
        Ok(Transition::none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;
    use wireterm_core::{Config, Side};

    #[tokio::test]
    async fn activating_local_side_sets_keyboard_eor_bit() {
        let opt = std::sync::Arc::new(EndOfRecord::new(Usage::request_local()));
        let config = Config::new(Side::Server).with_tel_opt(opt.clone(), Usage::request_local());
        let (_client, server) = duplex(1024);
        let (reader, writer) = tokio::io::split(server);
        let terminal = Terminal::new(config, reader, writer).unwrap();

        assert!(!terminal.keyboard_mask().has_eor());
        opt.transition_local_state(TelOptState::Active).unwrap();
        assert!(terminal.keyboard_mask().has_eor());

        terminal.shutdown();
        terminal.wait_for_exit().await.unwrap();
    }
}
