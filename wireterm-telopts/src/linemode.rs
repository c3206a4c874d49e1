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

//! `LINEMODE` (RFC 1184), `MODE` sub-option only. A `MODE` subnegotiation is
//! a single mode byte: bit 0 `EDIT`, bit 1 `TRAPSIG`, bit 2 `MODE_ACK`, bit 3
//! `SOFT_TAB`, bit 4 `LIT_ECHO`. A `MODE` received without `MODE_ACK` set is
//! acknowledged by echoing it back with that bit added, per RFC 1184 §2.1;
//! translation tables, `SLC`, and forwardmask sub-options are not
//! implemented.

use crate::TerminalRef;
use bitflags::bitflags;
use bytes::{Bytes, BytesMut};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Weak;
use tracing::warn;
use wireterm_core::{CoreError, TelOpt, TelOptCode, TelOptEvent, Terminal, Transition, Usage};
use wireterm_framer::Command;

const MODE: u8 = 1;

bitflags! {
    /// Bits of a `LINEMODE MODE` byte this crate understands.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct LinemodeMode: u8 {
        const EDIT = 0b0000_0001;
        const TRAPSIG = 0b0000_0010;
        const MODE_ACK = 0b0000_0100;
        const SOFT_TAB = 0b0000_1000;
        const LIT_ECHO = 0b0001_0000;
    }
}

#[derive(Default)]
pub struct Linemode {
    usage: Usage,
    terminal: TerminalRef,
    mode: AtomicU8,
}

impl Linemode {
    pub fn new(usage: Usage) -> Self {
        Linemode {
            usage,
            terminal: TerminalRef::default(),
            mode: AtomicU8::new(0),
        }
    }

    /// The last `MODE` bits seen, from either side.
    pub fn mode(&self) -> LinemodeMode {
        LinemodeMode::from_bits_truncate(self.mode.load(Ordering::Acquire))
    }
}

impl TelOpt for Linemode {
    fn code(&self) -> TelOptCode {
        crate::codes::LINEMODE
    }

    fn name(&self) -> &'static str {
        "LINEMODE"
    }

    fn usage(&self) -> Usage {
        self.usage
    }

    fn initialize(&self, terminal: Weak<Terminal>) {
        self.terminal.set(terminal);
    }

    fn subnegotiate(&self, payload: &Bytes) -> Result<(), CoreError> {
        if payload.len() != 2 || payload[0] != MODE {
            warn!(len = payload.len(), "unsupported LINEMODE sub-option");
            return Ok(());
        }
        let incoming = LinemodeMode::from_bits_truncate(payload[1]);
        self.mode.store(incoming.bits(), Ordering::Release);

        if let Some(terminal) = self.terminal.get() {
            terminal.publish_tel_opt_event(TelOptEvent {
                code: self.code(),
                name: self.name(),
                detail: format!("{incoming:?}"),
            });
            if !incoming.contains(LinemodeMode::MODE_ACK) {
                let acked = incoming | LinemodeMode::MODE_ACK;
                let mut reply = BytesMut::with_capacity(2);
                reply.extend_from_slice(&[MODE, acked.bits()]);
                terminal
                    .keyboard()
                    .write_command(Command::subnegotiation(self.code(), reply.freeze()));
            }
        }
        Ok(())
    }

    fn subnegotiation_string(&self, payload: &Bytes) -> String {
        if payload.len() == 2 && payload[0] == MODE {
            format!("{:?}", LinemodeMode::from_bits_truncate(payload[1]))
        } else {
            format!("{} bytes", payload.len())
        }
    }
}
