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

//! `NAWS` (RFC 1073): Negotiate About Window Size. Carries exactly four
//! bytes, `width_hi width_lo height_hi height_lo`, per spec.md §6. Usually
//! negotiated client-side (`RequestLocal`) and re-sent by the client
//! whenever its window is resized; the server side only ever receives it.

use crate::TerminalRef;
use bytes::{Bytes, BytesMut};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Weak;
use tracing::warn;
use wireterm_core::{CoreError, TelOpt, TelOptCode, TelOptEvent, TelOptState, Terminal, Transition, Usage};
use wireterm_framer::Command;

/// A terminal's dimensions in character cells.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowSize {
    pub cols: u16,
    pub rows: u16,
}

fn pack(size: WindowSize) -> u32 {
    (u32::from(size.cols) << 16) | u32::from(size.rows)
}

fn unpack(bits: u32) -> WindowSize {
    WindowSize {
        cols: (bits >> 16) as u16,
        rows: bits as u16,
    }
}

#[derive(Default)]
pub struct Naws {
    usage: Usage,
    terminal: TerminalRef,
    size: AtomicU32,
}

impl Naws {
    pub fn new(usage: Usage) -> Self {
        Naws {
            usage,
            terminal: TerminalRef::default(),
            size: AtomicU32::new(0),
        }
    }

    /// The most recently sent or received window size, if any.
    pub fn size(&self) -> Option<WindowSize> {
        let bits = self.size.load(Ordering::Acquire);
        if bits == 0 {
            None
        } else {
            Some(unpack(bits))
        }
    }

    /// Sends a `NAWS` subnegotiation reporting `size`, and remembers it so a
    /// future re-activation doesn't need the caller to resupply it. No-op if
    /// the option isn't `Active` on our local side.
    pub fn send(&self, size: WindowSize) {
        self.size.store(pack(size), Ordering::Release);
        let Some(terminal) = self.terminal.get() else {
            return;
        };
        if terminal.local_state(crate::codes::NAWS) != Some(TelOptState::Active) {
            return;
        }
        let mut payload = BytesMut::with_capacity(4);
        payload.extend_from_slice(&size.cols.to_be_bytes());
        payload.extend_from_slice(&size.rows.to_be_bytes());
        terminal
            .keyboard()
            .write_command(Command::subnegotiation(crate::codes::NAWS, payload.freeze()));
    }
}

impl TelOpt for Naws {
    fn code(&self) -> TelOptCode {
        crate::codes::NAWS
    }

    fn name(&self) -> &'static str {
        "NAWS"
    }

    fn usage(&self) -> Usage {
        self.usage
    }

    fn initialize(&self, terminal: Weak<Terminal>) {
        self.terminal.set(terminal);
    }

    fn transition_local_state(&self, new_state: TelOptState) -> Result<Transition, CoreError> {
        if new_state == TelOptState::Active {
            if let Some(size) = self.size() {
                self.send(size);
            }
        }
        Ok(Transition::none())
    }

    fn subnegotiate(&self, payload: &Bytes) -> Result<(), CoreError> {
        if payload.len() != 4 {
            warn!(len = payload.len(), "NAWS subnegotiation must be exactly 4 bytes");
            return Ok(());
        }
        let cols = u16::from_be_bytes([payload[0], payload[1]]);
        let rows = u16::from_be_bytes([payload[2], payload[3]]);
        self.size.store(pack(WindowSize { cols, rows }), Ordering::Release);
        if let Some(terminal) = self.terminal.get() {
            terminal.publish_tel_opt_event(TelOptEvent {
                code: self.code(),
                name: self.name(),
                detail: format!("{cols}x{rows}"),
            });
        }
        Ok(())
    }

    fn subnegotiation_string(&self, payload: &Bytes) -> String {
        if payload.len() == 4 {
            let cols = u16::from_be_bytes([payload[0], payload[1]]);
            let rows = u16::from_be_bytes([payload[2], payload[3]]);
            format!("{cols}x{rows}")
        } else {
            format!("{} bytes (malformed)", payload.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subnegotiation_parses_four_bytes() {
        let naws = Naws::new(Usage::request_local());
        naws.subnegotiate(&Bytes::from_static(&[0, 80, 0, 24])).unwrap();
        assert_eq!(naws.size(), Some(WindowSize { cols: 80, rows: 24 }));
    }

    #[test]
    fn malformed_payload_is_ignored() {
        let naws = Naws::new(Usage::request_local());
        naws.subnegotiate(&Bytes::from_static(&[1, 2, 3])).unwrap();
        assert_eq!(naws.size(), None);
    }
}
