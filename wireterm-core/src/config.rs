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

use crate::event::EventHooks;
use crate::telopt::{TelOptHandle, Usage};
use std::sync::Arc;
use wireterm_ansi::TerminalData;
use wireterm_charset::Usage as CharsetUsage;
use crate::error::CoreError;
use crate::event::TelOptNotification;

/// Which end of the connection this engine represents. Affects only the
/// CHARSET tie-break rule (§4.6): the server side may hold a negotiation
/// lock against a competing client REQUEST; the client always accepts the
/// server's.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Client,
    Server,
}

/// Construction-time configuration for a [`crate::Terminal`].
///
/// Every field here corresponds to a "Config recognized option" named in the
/// specification: `DefaultCharsetName`, `FallbackCharsetName`,
/// `CharsetUsage`, `Side`, `TelOpts`, `EventHooks`. There is no environment
/// variable or file-format surface — hosts build this struct directly.
pub struct Config {
    pub default_charset_name: String,
    pub fallback_charset_name: Option<String>,
    pub charset_usage: CharsetUsage,
    pub side: Side,
    pub tel_opts: Vec<(TelOptHandle, Usage)>,
    pub event_hooks: EventHooks,
}

impl Config {
    /// A minimal config: UTF-8 default, no fallback, charset applies
    /// unconditionally, no telopts registered.
    pub fn new(side: Side) -> Self {
        Config {
            default_charset_name: "UTF-8".to_string(),
            fallback_charset_name: None,
            charset_usage: CharsetUsage::Always,
            side,
            tel_opts: Vec::new(),
            event_hooks: EventHooks::new(),
        }
    }

    /// Registers an initial subscriber for `EncounteredError`.
    pub fn on_encountered_error(self, hook: impl Fn(&CoreError) + Send + Sync + 'static) -> Self {
        self.event_hooks.encountered_error.subscribe(hook);
        self
    }

    /// Registers an initial subscriber for `PrinterOutput`.
    pub fn on_printer_output(self, hook: impl Fn(&TerminalData) + Send + Sync + 'static) -> Self {
        self.event_hooks.printer_output.subscribe(hook);
        self
    }

    /// Registers an initial subscriber for `OutboundData`.
    pub fn on_outbound_data(self, hook: impl Fn(&TerminalData) + Send + Sync + 'static) -> Self {
        self.event_hooks.outbound_data.subscribe(hook);
        self
    }

    /// Registers an initial subscriber for `TelOptEvent`.
    pub fn on_tel_opt_event(self, hook: impl Fn(&TelOptNotification) + Send + Sync + 'static) -> Self {
        self.event_hooks.tel_opt_event.subscribe(hook);
        self
    }

    pub fn with_default_charset(mut self, name: impl Into<String>) -> Self {
        self.default_charset_name = name.into();
        self
    }

    pub fn with_fallback_charset(mut self, name: impl Into<String>) -> Self {
        self.fallback_charset_name = Some(name.into());
        self
    }

    pub fn with_charset_usage(mut self, usage: CharsetUsage) -> Self {
        self.charset_usage = usage;
        self
    }

    pub fn with_tel_opt(mut self, handle: Arc<dyn crate::telopt::TelOpt>, usage: Usage) -> Self {
        self.tel_opts.push((handle, usage));
        self
    }
}
