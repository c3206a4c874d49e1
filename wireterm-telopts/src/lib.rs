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

//! The nine bundled TELNET options, each an ordinary client of
//! `wireterm_core::TelOpt`.
//!
//! `TransmitBinary`, `SuppressGoAhead`, `EndOfRecord`, and `Charset` are the
//! four that reach into core behaviour (binary-mode flags, prompt masks, the
//! charset engine) through the public APIs `wireterm-core` exposes for
//! exactly this purpose. `Echo`, `Naws`, `TerminalType`, `NewEnvironment`,
//! and `Linemode` are ordinary negotiation/subnegotiation-only options that
//! exercise the generic `TelOpt` contract without the core needing to know
//! they exist.

mod charset;
mod codes;
mod echo;
mod end_of_record;
mod linemode;
mod naws;
mod new_environment;
mod suppress_go_ahead;
mod terminal_type;
mod transmit_binary;

pub use charset::Charset;
pub use codes::*;
pub use echo::Echo;
pub use end_of_record::EndOfRecord;
pub use linemode::{Linemode, LinemodeMode};
pub use naws::{Naws, WindowSize};
pub use new_environment::NewEnvironment;
pub use suppress_go_ahead::SuppressGoAhead;
pub use terminal_type::TerminalType;
pub use transmit_binary::TransmitBinary;

use std::sync::{Mutex, Weak};
use wireterm_core::Terminal;

/// A telopt's weak back-reference to its owning [`Terminal`], set once by
/// [`wireterm_core::TelOpt::initialize`] and read on every later callback.
/// Shared by every handler in this crate instead of re-deriving the same
/// three lines nine times.
#[derive(Default)]
pub(crate) struct TerminalRef(Mutex<Option<Weak<Terminal>>>);

impl TerminalRef {
    pub(crate) fn set(&self, terminal: Weak<Terminal>) {
        *self.0.lock().unwrap() = Some(terminal);
    }

    /// Upgrades the stored weak reference, if any has been set and the
    /// `Terminal` is still alive.
    pub(crate) fn get(&self) -> Option<std::sync::Arc<Terminal>> {
        self.0.lock().unwrap().as_ref().and_then(Weak::upgrade)
    }
}
