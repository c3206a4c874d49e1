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

//! TELNET protocol engine core.
//!
//! This crate implements the negotiation state machine (RFC 854 option
//! negotiation, four states per side per option), the keyboard/printer byte
//! pipelines, charset-aware text handling, and the single-consumer event
//! pump a host subscribes to. It does not implement any individual TELNET
//! option — those live in `wireterm-telopts` and in host-provided
//! `TelOpt` implementations — and it does not open sockets; [`Terminal::new`]
//! takes an already-connected `AsyncRead`/`AsyncWrite` pair.
//!
//! # Example
//!
//! ```no_run
//! use wireterm_core::{Config, Side, Terminal};
//!
//! # async fn run(stream: tokio::net::TcpStream) -> Result<(), Box<dyn std::error::Error>> {
//! let (reader, writer) = tokio::io::split(stream);
//! let config = Config::new(Side::Server).on_printer_output(|data| {
//!     println!("{data:?}");
//! });
//! let terminal = Terminal::new(config, reader, writer)?;
//! terminal.keyboard().write_text("welcome\r\n");
//! terminal.shutdown();
//! terminal.wait_for_exit().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod event;
mod keyboard;
mod lock;
mod mask;
mod negotiation;
mod printer;
mod telopt;
mod terminal;

pub use config::{Config, Side};
pub use error::CoreError;
pub use event::{EventRecord, TelOptNotification};
pub use keyboard::{KeyboardHandle, KeyboardStats};
pub use lock::KeyboardLock;
pub use mask::PromptCommandMask;
pub use negotiation::{NegotiationOutcome, NegotiationTable, StateChangeEvent};
pub use printer::PrinterStats;
pub use telopt::{PostSend, Side as NegotiationSide, TelOpt, TelOptEvent, TelOptHandle, TelOptState, Transition, Usage};
pub use terminal::{Stats, Terminal};

pub use wireterm_charset::Usage as CharsetUsage;
pub use wireterm_framer::TelOptCode;
