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

//! `NEW-ENVIRON` (RFC 1572). Subnegotiation payloads are a leading command
//! byte (`IS = 0`, `SEND = 1`, `INFO = 2`) followed by a sequence of
//! `VAR`/`USERVAR` (`0`/`3`) markers, each followed by a name, then a
//! `VALUE` (`1`) marker and its value. `ESC` (`2`) escapes a literal marker
//! byte inside a name or value.

use crate::TerminalRef;
use bytes::{Bytes, BytesMut};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::Weak;
use tracing::warn;
use wireterm_core::{CoreError, TelOpt, TelOptCode, TelOptEvent, Terminal, Usage};
use wireterm_framer::Command;

const IS: u8 = 0;
const SEND: u8 = 1;
const INFO: u8 = 2;
const VAR: u8 = 0;
const VALUE: u8 = 1;
const ESC: u8 = 2;
const USERVAR: u8 = 3;

/// Offers `vars` when the peer sends `SEND`, and records whatever the peer
/// reports via `IS`/`INFO`.
pub struct NewEnvironment {
    usage: Usage,
    terminal: TerminalRef,
    vars: HashMap<String, String>,
    remote_vars: Mutex<HashMap<String, String>>,
}

impl NewEnvironment {
    pub fn new(usage: Usage, vars: HashMap<String, String>) -> Self {
        NewEnvironment {
            usage,
            terminal: TerminalRef::default(),
            vars,
            remote_vars: Mutex::new(HashMap::new()),
        }
    }

    /// A snapshot of whatever the peer has reported so far.
    pub fn remote_vars(&self) -> HashMap<String, String> {
        self.remote_vars.lock().unwrap().clone()
    }

    fn encode_pairs(command: u8, vars: &HashMap<String, String>) -> Bytes {
        let mut out = BytesMut::new();
        out.extend_from_slice(&[command]);
        for (name, value) in vars {
            out.extend_from_slice(&[VAR]);
            escape_into(&mut out, name.as_bytes());
            out.extend_from_slice(&[VALUE]);
            escape_into(&mut out, value.as_bytes());
        }
        out.freeze()
    }
}

fn escape_into(out: &mut BytesMut, bytes: &[u8]) {
    for &b in bytes {
        if matches!(b, VAR | VALUE | ESC | USERVAR) {
            out.extend_from_slice(&[ESC]);
        }
        out.extend_from_slice(&[b]);
    }
}

/// Splits a `VAR`/`USERVAR`-delimited body into name/value pairs, honouring
/// `ESC` escapes. Unterminated trailing names (no `VALUE` marker) are
/// recorded with an empty value, matching RFC 1572's "boolean" variables.
fn parse_pairs(body: &[u8]) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let mut i = 0;
    while i < body.len() {
        if !matches!(body[i], VAR | USERVAR) {
            i += 1;
            continue;
        }
        i += 1;
        let (name, next) = read_token(body, i);
        i = next;
        if i < body.len() && body[i] == VALUE {
            i += 1;
            let (value, next) = read_token(body, i);
            i = next;
            out.insert(name, value);
        } else {
            out.insert(name, String::new());
        }
    }
    out
}

fn read_token(body: &[u8], mut i: usize) -> (String, usize) {
    let mut token = Vec::new();
    while i < body.len() {
        match body[i] {
            ESC if i + 1 < body.len() => {
                token.push(body[i + 1]);
                i += 2;
            }
            VAR | VALUE | USERVAR => break,
            b => {
                token.push(b);
                i += 1;
            }
        }
    }
    (String::from_utf8_lossy(&token).into_owned(), i)
}

impl TelOpt for NewEnvironment {
    fn code(&self) -> TelOptCode {
        crate::codes::NEW_ENVIRONMENT
    }

    fn name(&self) -> &'static str {
        "NEW-ENVIRON"
    }

    fn usage(&self) -> Usage {
        self.usage
    }

    fn initialize(&self, terminal: Weak<Terminal>) {
        self.terminal.set(terminal);
    }

    fn subnegotiate(&self, payload: &Bytes) -> Result<(), CoreError> {
        let Some(&command) = payload.first() else {
            warn!("empty NEW-ENVIRON subnegotiation");
            return Ok(());
        };
        match command {
            SEND => {
                if let Some(terminal) = self.terminal.get() {
                    let reply = Self::encode_pairs(IS, &self.vars);
                    terminal
                        .keyboard()
                        .write_command(Command::subnegotiation(self.code(), reply));
                }
            }
            IS | INFO => {
                let parsed = parse_pairs(&payload[1..]);
                *self.remote_vars.lock().unwrap() = parsed.clone();
                if let Some(terminal) = self.terminal.get() {
                    terminal.publish_tel_opt_event(TelOptEvent {
                        code: self.code(),
                        name: self.name(),
                        detail: format!("{} vars", parsed.len()),
                    });
                }
            }
            other => warn!(command = other, "unrecognized NEW-ENVIRON subcommand"),
        }
        Ok(())
    }

    fn subnegotiation_string(&self, payload: &Bytes) -> String {
        match payload.first() {
            Some(&SEND) => "SEND".to_string(),
            Some(&IS) => format!("IS {:?}", parse_pairs(&payload[1..])),
            Some(&INFO) => format!("INFO {:?}", parse_pairs(&payload[1..])),
            _ => format!("{} bytes", payload.len()),
        }
    }
}
