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

//! `TERMINAL-TYPE` (RFC 1091). Subnegotiation payloads are a single leading
//! command byte (`IS = 0`, `SEND = 1`) followed by, for `IS`, an ASCII
//! terminal-type name.

use crate::TerminalRef;
use bytes::{Bytes, BytesMut};
use std::sync::Mutex;
use std::sync::Weak;
use tracing::warn;
use wireterm_core::{CoreError, TelOpt, TelOptCode, TelOptEvent, TelOptState, Terminal, Transition, Usage};
use wireterm_framer::Command;

const IS: u8 = 0;
const SEND: u8 = 1;

/// Reports `local_name` when asked, and records whatever name the peer
/// reports in turn.
pub struct TerminalType {
    usage: Usage,
    terminal: TerminalRef,
    local_name: String,
    remote_name: Mutex<Option<String>>,
}

impl TerminalType {
    pub fn new(usage: Usage, local_name: impl Into<String>) -> Self {
        TerminalType {
            usage,
            terminal: TerminalRef::default(),
            local_name: local_name.into(),
            remote_name: Mutex::new(None),
        }
    }

    /// The terminal type name the peer last reported, if any.
    pub fn remote_name(&self) -> Option<String> {
        self.remote_name.lock().unwrap().clone()
    }

    /// Sends `IAC SB TERMINAL-TYPE SEND IAC SE`, asking the peer to report
    /// its name. No-op unless the peer's side of this option is `Active`.
    pub fn request(&self) {
        let Some(terminal) = self.terminal.get() else {
            return;
        };
        if terminal.remote_state(self.code()) != Some(TelOptState::Active) {
            return;
        }
        terminal
            .keyboard()
            .write_command(Command::subnegotiation(self.code(), Bytes::from_static(&[SEND])));
    }
}

impl TelOpt for TerminalType {
    fn code(&self) -> TelOptCode {
        crate::codes::TERMINAL_TYPE
    }

    fn name(&self) -> &'static str {
        "TERMINAL-TYPE"
    }

    fn usage(&self) -> Usage {
        self.usage
    }

    fn initialize(&self, terminal: Weak<Terminal>) {
        self.terminal.set(terminal);
    }

    fn subnegotiate(&self, payload: &Bytes) -> Result<(), CoreError> {
        let Some(&command) = payload.first() else {
            warn!("empty TERMINAL-TYPE subnegotiation");
            return Ok(());
        };
        match command {
            SEND => {
                if let Some(terminal) = self.terminal.get() {
                    let mut reply = BytesMut::with_capacity(1 + self.local_name.len());
                    reply.extend_from_slice(&[IS]);
                    reply.extend_from_slice(self.local_name.as_bytes());
                    terminal
                        .keyboard()
                        .write_command(Command::subnegotiation(self.code(), reply.freeze()));
                }
            }
            IS => {
                let name = String::from_utf8_lossy(&payload[1..]).into_owned();
                *self.remote_name.lock().unwrap() = Some(name.clone());
                if let Some(terminal) = self.terminal.get() {
                    terminal.publish_tel_opt_event(TelOptEvent {
                        code: self.code(),
                        name: self.name(),
                        detail: name,
                    });
                }
            }
            other => warn!(command = other, "unrecognized TERMINAL-TYPE subcommand"),
        }
        Ok(())
    }

    fn subnegotiation_string(&self, payload: &Bytes) -> String {
        match payload.first() {
            Some(&SEND) => "SEND".to_string(),
            Some(&IS) => format!("IS {}", String::from_utf8_lossy(&payload[1..])),
            _ => format!("{} bytes", payload.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;
    use wireterm_core::{Config, Side};

    #[tokio::test]
    async fn replies_to_send_with_configured_name() {
        let opt = std::sync::Arc::new(TerminalType::new(Usage::allow_local(), "ANSI"));
        let config = Config::new(Side::Client).with_tel_opt(opt.clone(), Usage::allow_local());
        let (mut client, server) = duplex(4096);
        let (reader, writer) = tokio::io::split(server);
        let terminal = Terminal::new(config, reader, writer).unwrap();

        opt.subnegotiate(&Bytes::from_static(&[SEND])).unwrap();

        use tokio::io::AsyncReadExt;
        let mut buf = [0u8; 64];
        let n = tokio::time::timeout(std::time::Duration::from_secs(1), client.read(&mut buf))
            .await
            .unwrap()
            .unwrap();
        let written = &buf[..n];
        assert!(written.windows(4).any(|w| w == b"ANSI"));

        terminal.shutdown();
        terminal.wait_for_exit().await.unwrap();
    }

    #[test]
    fn records_remote_is() {
        let opt = TerminalType::new(Usage::allow_remote(), "ANSI");
        opt.subnegotiate(&Bytes::from_static(b"\x00xterm")).unwrap();
        assert_eq!(opt.remote_name().as_deref(), Some("xterm"));
    }
}
