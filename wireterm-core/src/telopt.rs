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
use crate::terminal::Terminal;
use bytes::Bytes;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use wireterm_framer::TelOptCode;

/// Which side of a negotiated option a state or event refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    /// Our side of the connection.
    Local,
    /// The peer's side.
    Remote,
}

/// Negotiation lifecycle of one option on one side. Both sides start
/// `Inactive`; see the transition table in [`crate::negotiation`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum TelOptState {
    Inactive = 0,
    Requested = 1,
    Active = 2,
}

impl TelOptState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => TelOptState::Inactive,
            1 => TelOptState::Requested,
            _ => TelOptState::Active,
        }
    }
}

/// An atomic cell holding one side's [`TelOptState`].
#[derive(Debug, Default)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new(state: TelOptState) -> Self {
        StateCell(AtomicU8::new(state as u8))
    }

    pub(crate) fn load(&self) -> TelOptState {
        TelOptState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, state: TelOptState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Negotiation policy for one option, a bitmask in the specification,
/// modeled here as four independent flags. `request_local` implies
/// `allow_local`; `request_remote` implies `allow_remote`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Usage {
    pub allow_local: bool,
    pub allow_remote: bool,
    pub request_local: bool,
    pub request_remote: bool,
}

impl Usage {
    pub const NONE: Usage = Usage {
        allow_local: false,
        allow_remote: false,
        request_local: false,
        request_remote: false,
    };

    pub fn allow_local() -> Self {
        Usage {
            allow_local: true,
            ..Usage::NONE
        }
    }

    pub fn allow_remote() -> Self {
        Usage {
            allow_remote: true,
            ..Usage::NONE
        }
    }

    pub fn request_local() -> Self {
        Usage {
            allow_local: true,
            request_local: true,
            ..Usage::NONE
        }
    }

    pub fn request_remote() -> Self {
        Usage {
            allow_remote: true,
            request_remote: true,
            ..Usage::NONE
        }
    }

    pub fn and(self, other: Usage) -> Usage {
        Usage {
            allow_local: self.allow_local || other.allow_local,
            allow_remote: self.allow_remote || other.allow_remote,
            request_local: self.request_local || other.request_local,
            request_remote: self.request_remote || other.request_remote,
        }
    }
}

/// Runs after a negotiation reply has been flushed to the wire, so an
/// option can commit a side effect (e.g. swap the active charset) only once
/// its `ACCEPTED` bytes are actually out.
pub type PostSend = Box<dyn FnOnce(&Terminal) + Send>;

/// Outcome of a `TelOpt` transition callback.
#[derive(Default)]
pub struct Transition {
    pub post_send: Option<PostSend>,
}

impl Transition {
    pub fn none() -> Self {
        Transition::default()
    }

    pub fn with_post_send(post_send: PostSend) -> Self {
        Transition {
            post_send: Some(post_send),
        }
    }
}

/// A non-negotiation event an option wants to publish through the event
/// pump (alongside the built-in `TelOptStateChange`).
pub struct TelOptEvent {
    pub code: TelOptCode,
    pub name: &'static str,
    pub detail: String,
}

/// The contract every bundled and host-provided TELNET option implements.
///
/// An option never owns the [`Terminal`]; [`TelOpt::initialize`] hands it a
/// [`Weak`] back-reference, matching the "structural, not ownership"
/// back-reference rule — an option's lifetime is bounded by the Terminal's.
pub trait TelOpt: Send + Sync {
    /// The wire option code this handler negotiates.
    fn code(&self) -> TelOptCode;

    /// A short human-readable name, used in logs and debug rendering.
    fn name(&self) -> &'static str;

    /// Negotiation policy for this option.
    fn usage(&self) -> Usage;

    /// Called once during [`Terminal::new`] with a weak back-reference.
    fn initialize(&self, terminal: Weak<Terminal>);

    /// Called when this option's local (our) side transitions.
    fn transition_local_state(&self, new_state: TelOptState) -> Result<Transition, CoreError> {
        let _ = new_state;
        Ok(Transition::none())
    }

    /// Called when this option's remote (peer) side transitions.
    fn transition_remote_state(&self, new_state: TelOptState) -> Result<Transition, CoreError> {
        let _ = new_state;
        Ok(Transition::none())
    }

    /// Handles a complete `IAC SB <code> <payload> IAC SE`. Only dispatched
    /// while at least one side of this option is `Active`.
    fn subnegotiate(&self, payload: &Bytes) -> Result<(), CoreError> {
        let _ = payload;
        Ok(())
    }

    /// Renders a subnegotiation payload for debug/log output.
    fn subnegotiation_string(&self, payload: &Bytes) -> String {
        format!("{} bytes", payload.len())
    }
}

/// A shared, type-erased handle to a configured option.
pub type TelOptHandle = Arc<dyn TelOpt>;
