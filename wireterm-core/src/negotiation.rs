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

use crate::error::CoreError;
use crate::telopt::{PostSend, Side, StateCell, TelOptHandle, TelOptState, Usage};
use bytes::Bytes;
use std::sync::Weak;
use tracing::{debug, warn};
use wireterm_framer::{Command, OpCode, TelOptCode};

/// A per-option entry: the handler plus its two independent state cells.
struct Entry {
    code: TelOptCode,
    handler: TelOptHandle,
    usage: Usage,
    local: StateCell,
    remote: StateCell,
}

/// Holds every configured telopt, keyed by code but iterated in
/// registration order (so initial-request emission order matches the
/// order the host listed them in).
pub struct NegotiationTable {
    entries: Vec<Entry>,
}

/// Something the caller must do as a result of a negotiation event: send a
/// reply on the wire, and/or fire a state-change event, and/or run a
/// post-send closure once that reply is flushed.
#[derive(Default)]
pub struct NegotiationOutcome {
    pub reply: Option<Command>,
    pub state_change: Option<StateChangeEvent>,
    pub post_send: Option<PostSend>,
}

#[derive(Clone, Debug)]
pub struct StateChangeEvent {
    pub code: TelOptCode,
    pub side: Side,
    pub old_state: TelOptState,
    pub new_state: TelOptState,
}

impl NegotiationTable {
    pub fn new(tel_opts: Vec<(TelOptHandle, Usage)>) -> Result<Self, CoreError> {
        let mut entries = Vec::with_capacity(tel_opts.len());
        for (handler, usage) in tel_opts {
            let code = handler.code();
            if entries.iter().any(|e: &Entry| e.code == code) {
                return Err(CoreError::DuplicateTelOpt(code));
            }
            entries.push(Entry {
                code,
                handler,
                usage,
                local: StateCell::new(TelOptState::Inactive),
                remote: StateCell::new(TelOptState::Inactive),
            });
        }
        Ok(NegotiationTable { entries })
    }

    pub fn initialize_handlers(&self, terminal: Weak<crate::Terminal>) {
        for entry in &self.entries {
            entry.handler.initialize(terminal.clone());
        }
    }

    fn find(&self, code: TelOptCode) -> Option<&Entry> {
        self.entries.iter().find(|e| e.code == code)
    }

    pub fn local_state(&self, code: TelOptCode) -> Option<TelOptState> {
        self.find(code).map(|e| e.local.load())
    }

    pub fn remote_state(&self, code: TelOptCode) -> Option<TelOptState> {
        self.find(code).map(|e| e.remote.load())
    }

    /// True if either side of `code` is `Active` — the gate subnegotiation
    /// dispatch uses.
    pub fn either_active(&self, code: TelOptCode) -> bool {
        match self.find(code) {
            Some(e) => e.local.load() == TelOptState::Active || e.remote.load() == TelOptState::Active,
            None => false,
        }
    }

    /// Commands to send, and state-change events to fire, for every option
    /// configured with `request_local`/`request_remote`. Called once during
    /// `Terminal` startup.
    pub fn initial_requests(&self) -> Vec<(Command, StateChangeEvent)> {
        let mut out = Vec::new();
        for entry in &self.entries {
            if entry.usage.request_local && entry.local.load() == TelOptState::Inactive {
                entry.local.store(TelOptState::Requested);
                out.push((
                    Command::negotiation(OpCode::Will, entry.code),
                    StateChangeEvent {
                        code: entry.code,
                        side: Side::Local,
                        old_state: TelOptState::Inactive,
                        new_state: TelOptState::Requested,
                    },
                ));
            }
            if entry.usage.request_remote && entry.remote.load() == TelOptState::Inactive {
                entry.remote.store(TelOptState::Requested);
                out.push((
                    Command::negotiation(OpCode::Do, entry.code),
                    StateChangeEvent {
                        code: entry.code,
                        side: Side::Remote,
                        old_state: TelOptState::Inactive,
                        new_state: TelOptState::Requested,
                    },
                ));
            }
        }
        out
    }

    /// Handles an inbound `WILL`/`WONT`/`DO`/`DONT`. Returns what (if
    /// anything) the caller must reply with and publish.
    pub fn handle_negotiation(&self, opcode: OpCode, option: TelOptCode) -> NegotiationOutcome {
        let (side, event) = match opcode {
            OpCode::Do => (Side::Local, Event::Activate),
            OpCode::Dont => (Side::Local, Event::Deactivate),
            OpCode::Will => (Side::Remote, Event::Activate),
            OpCode::Wont => (Side::Remote, Event::Deactivate),
            _ => return NegotiationOutcome::default(),
        };

        let Some(entry) = self.find(option) else {
            return self.handle_unknown_option(side, event, option);
        };

        let cell = match side {
            Side::Local => &entry.local,
            Side::Remote => &entry.remote,
        };
        let allowed = match side {
            Side::Local => entry.usage.allow_local,
            Side::Remote => entry.usage.allow_remote,
        };

        let old_state = cell.load();
        let (new_state, reply_kind) = transition(old_state, allowed, event);
        cell.store(new_state);

        let reply = reply_kind.map(|kind| build_reply(side, kind, option));

        let transition_result = if old_state != new_state {
            let result = match side {
                Side::Local => entry.handler.transition_local_state(new_state),
                Side::Remote => entry.handler.transition_remote_state(new_state),
            };
            match result {
                Ok(t) => Some(t),
                Err(err) => {
                    warn!(code = option, error = %err, "telopt transition callback failed");
                    None
                }
            }
        } else {
            None
        };

        let state_change = if old_state != new_state {
            Some(StateChangeEvent {
                code: option,
                side,
                old_state,
                new_state,
            })
        } else {
            None
        };

        NegotiationOutcome {
            reply,
            state_change,
            post_send: transition_result.and_then(|t| t.post_send),
        }
    }

    fn handle_unknown_option(&self, side: Side, event: Event, option: TelOptCode) -> NegotiationOutcome {
        // Unknown WILL/DO requests are refused; unknown WONT/DONT are
        // ignored outright (no reply, no state to change — we never
        // tracked this code to begin with).
        match event {
            Event::Activate => {
                debug!(code = option, ?side, "refusing unknown telopt");
                NegotiationOutcome {
                    reply: Some(build_reply(side, ReplyKind::Negative, option)),
                    state_change: None,
                    post_send: None,
                }
            }
            Event::Deactivate => NegotiationOutcome::default(),
        }
    }

    /// Dispatches a subnegotiation payload, or silently drops it (unknown
    /// option code, or an option where neither side is `Active`).
    pub fn dispatch_subnegotiation(&self, option: TelOptCode, payload: Bytes) -> Result<(), CoreError> {
        let Some(entry) = self.find(option) else {
            debug!(code = option, "dropping subnegotiation for unknown telopt");
            return Ok(());
        };
        if !self.either_active(option) {
            debug!(code = option, "dropping subnegotiation for inactive telopt");
            return Ok(());
        }
        entry.handler.subnegotiate(&payload)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Event {
    Activate,
    Deactivate,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ReplyKind {
    Positive,
    Negative,
}

/// The four-state machine from §4.6, independent of which side it runs on.
fn transition(current: TelOptState, allowed: bool, event: Event) -> (TelOptState, Option<ReplyKind>) {
    use TelOptState::*;
    match (current, event) {
        (Inactive, Event::Activate) => {
            if allowed {
                (Active, Some(ReplyKind::Positive))
            } else {
                (Inactive, Some(ReplyKind::Negative))
            }
        }
        (Inactive, Event::Deactivate) => (Inactive, None),
        (Requested, Event::Activate) => (Active, None),
        (Requested, Event::Deactivate) => (Inactive, None),
        (Active, Event::Activate) => (Active, None),
        (Active, Event::Deactivate) => (Inactive, Some(ReplyKind::Negative)),
    }
}

fn build_reply(side: Side, kind: ReplyKind, option: TelOptCode) -> Command {
    let opcode = match (side, kind) {
        (Side::Local, ReplyKind::Positive) => OpCode::Will,
        (Side::Local, ReplyKind::Negative) => OpCode::Wont,
        (Side::Remote, ReplyKind::Positive) => OpCode::Do,
        (Side::Remote, ReplyKind::Negative) => OpCode::Dont,
    };
    Command::negotiation(opcode, option)
}
