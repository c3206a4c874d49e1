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

//! `CHARSET` (RFC 2066). The one bundled option that reaches directly into
//! `wireterm-charset`'s negotiated-encoding/decoding cells and
//! `wireterm-core`'s tie-break lock, per spec.md §4.6/§6.

use crate::TerminalRef;
use bytes::{Bytes, BytesMut};
use std::sync::Mutex;
use std::sync::Weak;
use tracing::{debug, warn};
use wireterm_core::{CoreError, KeyboardLock, TelOpt, TelOptCode, TelOptEvent, Terminal, Usage};
use wireterm_framer::Command;

const REQUEST: u8 = 1;
const ACCEPTED: u8 = 2;
const REJECTED: u8 = 3;
const TTABLE_IS: u8 = 4;
const TTABLE_REJECTED: u8 = 5;
const TTABLE_ACK: u8 = 6;
const TTABLE_NAK: u8 = 7;

const LOCK_NAME: &str = "charset";
const TTABLE_PREFIX: &[u8] = b"[TTABLE]";

/// Tracks one charset sub-option exchange. A caller on either side can
/// [`Charset::request`] a list of candidate names; the handler also answers
/// peer-initiated `REQUEST`s per the selection rule in spec.md §6.
pub struct Charset {
    usage: Usage,
    terminal: TerminalRef,
    /// Non-empty means "only accept a peer REQUEST offering one of these
    /// names"; empty means any name that resolves is acceptable.
    allowed: Vec<String>,
    /// The first name we offered in our most recent outbound REQUEST, kept
    /// so a REJECTED reply can retry with just that one name.
    best_candidate: Mutex<Option<String>>,
}

impl Charset {
    pub fn new(usage: Usage, allowed: Vec<String>) -> Self {
        Charset {
            usage,
            terminal: TerminalRef::default(),
            allowed,
            best_candidate: Mutex::new(None),
        }
    }

    /// Issues `IAC SB CHARSET REQUEST <names>` for the first usable name in
    /// `names`. Holds the tie-break lock (§4.6) while awaiting a reply;
    /// a competing peer `REQUEST` clears it, per [`Self::subnegotiate`].
    pub fn request(&self, names: &[&str]) {
        let Some(terminal) = self.terminal.get() else {
            return;
        };
        let Some(&first) = names.first() else {
            return;
        };
        *self.best_candidate.lock().unwrap() = Some(first.to_string());
        terminal.lock().set_lock(LOCK_NAME, std::time::Duration::from_secs(5));

        let mut payload = BytesMut::new();
        payload.extend_from_slice(&[REQUEST]);
        payload.extend_from_slice(b";");
        payload.extend_from_slice(names.join(";").as_bytes());
        terminal
            .keyboard()
            .write_command(Command::subnegotiation(self.code(), payload.freeze()));
    }

    fn resolves(name: &str) -> bool {
        wireterm_charset::Charset::new(name, None, wireterm_charset::Usage::Always).is_ok()
    }

    fn is_allowed(&self, name: &str) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    fn handle_request(&self, body: &[u8], terminal: &Terminal, lock: &KeyboardLock) {
        let body = body.strip_prefix(TTABLE_PREFIX).unwrap_or(body);
        let Some((&separator, names)) = body.split_first() else {
            warn!("empty CHARSET REQUEST body");
            return;
        };
        let offered: Vec<&str> = names
            .split(|&b| b == separator)
            .filter(|s| !s.is_empty())
            .map(|s| std::str::from_utf8(s).unwrap_or(""))
            .filter(|s| !s.is_empty())
            .collect();

        if offered.iter().any(|n| n.eq_ignore_ascii_case("UTF-8")) {
            if let Err(err) = terminal.charset().promote_default("US-ASCII", "UTF-8") {
                warn!(%err, "CHARSET promote_default(US-ASCII, UTF-8) failed");
            }
        }

        // A competing REQUEST while our own is outstanding supersedes it:
        // clear the tie-break lock so our deferred writes flush normally.
        if lock.has_active_lock(LOCK_NAME) {
            debug!("peer CHARSET REQUEST supersedes our own pending request");
            lock.clear_lock(LOCK_NAME);
        }

        let chosen = offered.iter().find(|n| Self::resolves(n) && self.is_allowed(n));
        match chosen {
            Some(&name) => {
                if let Err(err) = terminal.charset().set_negotiated_decoding(name) {
                    warn!(%err, charset = name, "failed to commit negotiated decoding");
                    return;
                }
                let mut reply = BytesMut::new();
                reply.extend_from_slice(&[ACCEPTED]);
                reply.extend_from_slice(name.as_bytes());
                let name = name.to_string();
                let code = self.code();
                terminal.keyboard().write_command_with_post_send(
                    Command::subnegotiation(code, reply.freeze()),
                    Box::new(move |terminal: &Terminal| {
                        if let Err(err) = terminal.charset().set_negotiated_encoding(&name) {
                            warn!(%err, charset = %name, "failed to commit negotiated encoding");
                        }
                    }),
                );
            }
            None => {
                let reply = Bytes::from_static(&[REJECTED]);
                terminal
                    .keyboard()
                    .write_command(Command::subnegotiation(self.code(), reply));
            }
        }
    }

    fn handle_accepted(&self, name: &[u8], terminal: &Terminal) {
        terminal.lock().clear_lock(LOCK_NAME);
        let Ok(name) = std::str::from_utf8(name) else {
            warn!("CHARSET ACCEPTED name was not valid UTF-8");
            return;
        };
        if let Err(err) = terminal.charset().set_negotiated_encoding(name) {
            warn!(%err, charset = name, "failed to commit accepted encoding");
            return;
        }
        if let Err(err) = terminal.charset().set_negotiated_decoding(name) {
            warn!(%err, charset = name, "failed to commit accepted decoding");
        }
        terminal.publish_tel_opt_event(TelOptEvent {
            code: self.code(),
            name: self.name(),
            detail: format!("accepted {name}"),
        });
    }

    fn handle_rejected(&self, terminal: &Terminal) {
        let had_lock = terminal.lock().has_active_lock(LOCK_NAME);
        terminal.lock().clear_lock(LOCK_NAME);
        if !had_lock {
            return;
        }
        if let Some(best) = self.best_candidate.lock().unwrap().take() {
            debug!(charset = %best, "CHARSET rejected, retrying with best candidate alone");
            self.request(&[&best]);
        }
    }
}

impl TelOpt for Charset {
    fn code(&self) -> TelOptCode {
        crate::codes::CHARSET
    }

    fn name(&self) -> &'static str {
        "CHARSET"
    }

    fn usage(&self) -> Usage {
        self.usage
    }

    fn initialize(&self, terminal: Weak<Terminal>) {
        self.terminal.set(terminal);
    }

    fn subnegotiate(&self, payload: &Bytes) -> Result<(), CoreError> {
        let Some((&kind, body)) = payload.split_first() else {
            warn!("empty CHARSET subnegotiation");
            return Ok(());
        };
        let Some(terminal) = self.terminal.get() else {
            return Ok(());
        };
        let lock = terminal.lock().clone();
        match kind {
            REQUEST => self.handle_request(body, &terminal, &lock),
            ACCEPTED => self.handle_accepted(body, &terminal),
            REJECTED => self.handle_rejected(&terminal),
            TTABLE_IS | TTABLE_REJECTED | TTABLE_ACK | TTABLE_NAK => {
                debug!(kind, "CHARSET translation-table sub-options are not implemented");
            }
            other => warn!(kind = other, "unrecognized CHARSET subcommand"),
        }
        Ok(())
    }

    fn subnegotiation_string(&self, payload: &Bytes) -> String {
        match payload.first() {
            Some(&REQUEST) => format!("REQUEST {}", String::from_utf8_lossy(&payload[1..])),
            Some(&ACCEPTED) => format!("ACCEPTED {}", String::from_utf8_lossy(&payload[1..])),
            Some(&REJECTED) => "REJECTED".to_string(),
            _ => format!("{} bytes", payload.len()),
        }
    }
}
