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

//! The `Terminal` facade: wires the printer, keyboard, negotiation table,
//! event pump, and lock registry into three cooperating tasks over one
//! async stream, and gives every telopt a [`std::sync::Weak`] handle back
//! onto the whole thing.

use crate::config::{Config, Side};
use crate::error::CoreError;
use crate::event::{EventHooks, EventPump, EventRecord, EventSender, TelOptNotification};
use crate::keyboard::{Keyboard, KeyboardHandle, KeyboardStats};
use crate::lock::KeyboardLock;
use crate::mask::PromptCommandMask;
use crate::negotiation::NegotiationTable;
use crate::printer::{Printer, PrinterStats};
use std::sync::atomic::Ordering;
use std::sync::Mutex as StdMutex;
use std::sync::{Arc, Weak};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{info, instrument};
use wireterm_charset::Charset;
use wireterm_framer::TelOptCode;

/// A point-in-time snapshot of the counters named in the specification's
/// "metrics-free counters" note: cheap enough to read on every poll, no
/// dependency on a metrics crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stats {
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub frames_parsed: u64,
    pub items_written: u64,
}

struct TerminalTasks {
    printer: JoinHandle<Result<(), CoreError>>,
    keyboard: JoinHandle<Result<(), CoreError>>,
    pump: JoinHandle<()>,
    lock_expiry: JoinHandle<()>,
}

/// The assembled TELNET engine for one connection. Built once via
/// [`Terminal::new`]; every telopt, the negotiation table, and the keyboard
/// writer hold only a [`Weak`] reference back to it, so the `Arc` the host
/// keeps is the sole owner.
pub struct Terminal {
    side: Side,
    charset: Arc<Charset>,
    negotiation: Arc<NegotiationTable>,
    lock: Arc<KeyboardLock>,
    keyboard: KeyboardHandle,
    hooks: Arc<EventHooks>,
    events: EventSender,
    printer_mask: Arc<PromptCommandMask>,
    keyboard_mask: Arc<PromptCommandMask>,
    printer_stats: Arc<PrinterStats>,
    keyboard_stats: Arc<KeyboardStats>,
    shutdown: Arc<Notify>,
    tasks: StdMutex<Option<TerminalTasks>>,
}

impl Terminal {
    /// Assembles the engine over an already-connected stream and starts its
    /// background tasks: a reader/printer, a writer/keyboard, an event pump,
    /// and the keyboard lock's expiry driver. Initial `WILL`/`DO` requests
    /// configured via [`Config::with_tel_opt`] usage flags are sent before
    /// this returns.
    #[instrument(skip_all)]
    pub fn new<R, W>(config: Config, reader: R, writer: W) -> Result<Arc<Terminal>, CoreError>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let charset = Arc::new(Charset::new(
            &config.default_charset_name,
            config.fallback_charset_name.as_deref(),
            config.charset_usage,
        )?);
        let negotiation = Arc::new(NegotiationTable::new(config.tel_opts)?);
        let hooks = Arc::new(config.event_hooks);
        let (pump, events) = EventPump::new(hooks.clone(), 256);

        let lock = Arc::new(KeyboardLock::new());
        let printer_mask = Arc::new(PromptCommandMask::new());
        let keyboard_mask = Arc::new(PromptCommandMask::new());
        let printer_stats = Arc::new(PrinterStats::default());
        let keyboard_stats = Arc::new(KeyboardStats::default());

        let (keyboard, keyboard_handle) = Keyboard::new(
            256,
            lock.clone(),
            charset.clone(),
            events.clone(),
            keyboard_mask.clone(),
            keyboard_stats.clone(),
        );
        let printer = Printer::new(
            charset.clone(),
            negotiation.clone(),
            events.clone(),
            keyboard_handle.clone(),
            printer_mask.clone(),
            printer_stats.clone(),
        );
        let shutdown = Arc::new(Notify::new());

        let terminal = Arc::new_cyclic(|weak: &Weak<Terminal>| {
            negotiation.initialize_handlers(weak.clone());
            keyboard.set_terminal(weak.clone());
            Terminal {
                side: config.side,
                charset,
                negotiation: negotiation.clone(),
                lock: lock.clone(),
                keyboard: keyboard_handle,
                hooks,
                events: events.clone(),
                printer_mask,
                keyboard_mask,
                printer_stats,
                keyboard_stats,
                shutdown: shutdown.clone(),
                tasks: StdMutex::new(None),
            }
        });

        let lock_expiry = {
            let lock = lock.clone();
            tokio::spawn(async move { lock.run_expiry_task().await })
        };
        let pump_handle = tokio::spawn(pump.run());
        let printer_handle = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { printer.run(reader, shutdown).await })
        };
        let keyboard_handle_task = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { keyboard.run(writer, shutdown).await })
        };

        *terminal.tasks.lock().unwrap() = Some(TerminalTasks {
            printer: printer_handle,
            keyboard: keyboard_handle_task,
            pump: pump_handle,
            lock_expiry,
        });

        for (command, change) in terminal.negotiation.initial_requests() {
            terminal.keyboard.write_command(command);
            terminal
                .events
                .send(EventRecord::TelOpt(TelOptNotification::StateChange(change)));
        }

        Ok(terminal)
    }

    /// Which end of the connection this engine represents.
    pub fn side(&self) -> Side {
        self.side
    }

    /// The active charset codec, shared with host code that wants to encode
    /// or decode outside the normal read/write path (rare; mostly telopts).
    pub fn charset(&self) -> &Arc<Charset> {
        &self.charset
    }

    /// A cloneable handle for enqueuing outbound text, commands, or prompt
    /// hints without touching the writer task directly.
    pub fn keyboard(&self) -> &KeyboardHandle {
        &self.keyboard
    }

    /// The named-lock registry gating the keyboard's text queue.
    pub fn lock(&self) -> &Arc<KeyboardLock> {
        &self.lock
    }

    /// The printer side's `{GA, EOR}` prompt-command mask.
    pub fn printer_mask(&self) -> &Arc<PromptCommandMask> {
        &self.printer_mask
    }

    /// The keyboard side's `{GA, EOR}` prompt-command mask.
    pub fn keyboard_mask(&self) -> &Arc<PromptCommandMask> {
        &self.keyboard_mask
    }

    /// Our side's negotiated state for `code`, or `None` if it isn't
    /// configured on this terminal.
    pub fn local_state(&self, code: TelOptCode) -> Option<crate::telopt::TelOptState> {
        self.negotiation.local_state(code)
    }

    /// The peer's negotiated state for `code`, or `None` if it isn't
    /// configured on this terminal.
    pub fn remote_state(&self, code: TelOptCode) -> Option<crate::telopt::TelOptState> {
        self.negotiation.remote_state(code)
    }

    /// Requests a non-negotiation, option-defined event be published through
    /// the `TelOptEvent` hook, alongside the built-in state-change events.
    pub fn publish_tel_opt_event(&self, event: crate::telopt::TelOptEvent) {
        self.events
            .send(EventRecord::TelOpt(TelOptNotification::Custom(event)));
    }

    /// Requests an error be published through the `EncounteredError` hook.
    pub fn publish_error(&self, error: CoreError) {
        self.events.send(EventRecord::EncounteredError(error));
    }

    /// A point-in-time snapshot of the byte and frame counters.
    pub fn stats(&self) -> Stats {
        Stats {
            bytes_in: self.printer_stats.bytes_in.load(Ordering::Relaxed),
            bytes_out: self.keyboard_stats.bytes_out.load(Ordering::Relaxed),
            frames_parsed: self.printer_stats.frames_parsed.load(Ordering::Relaxed),
            items_written: self.keyboard_stats.items_written.load(Ordering::Relaxed),
        }
    }

    /// Signals the reader and writer tasks to wind down. Idempotent;
    /// safe to call more than once.
    pub fn shutdown(&self) {
        info!("terminal shutdown requested");
        self.shutdown.notify_waiters();
    }

    /// Waits for the reader and writer tasks to exit, then tears down the
    /// event pump and lock-expiry driver. Returns the first non-cancellation
    /// I/O error either task surfaced, if any. Panics if called more than
    /// once.
    pub async fn wait_for_exit(&self) -> Result<(), CoreError> {
        let tasks = self
            .tasks
            .lock()
            .unwrap()
            .take()
            .expect("wait_for_exit called more than once");

        let printer_result = tasks.printer.await.unwrap_or(Ok(()));
        let keyboard_result = tasks.keyboard.await.unwrap_or(Ok(()));

        // The pump and lock-expiry drivers have no natural end of their
        // own (they outlive a single read/write pass); stop them now that
        // nothing will feed them further work.
        tasks.pump.abort();
        tasks.lock_expiry.abort();

        match (printer_result, keyboard_result) {
            (Err(err), _) if !matches!(err, CoreError::Cancelled) => Err(err),
            (_, Err(err)) if !matches!(err, CoreError::Cancelled) => Err(err),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::time::Duration;
    use tokio::io::duplex;

    #[tokio::test]
    async fn constructs_and_shuts_down_cleanly() {
        let config = Config::new(Side::Server);
        let (client, server) = duplex(1024);
        let (reader, writer) = tokio::io::split(server);
        let terminal = Terminal::new(config, reader, writer).unwrap();

        terminal.keyboard().write_text("hello");
        tokio::time::sleep(Duration::from_millis(20)).await;

        terminal.shutdown();
        terminal.wait_for_exit().await.unwrap();
        drop(client);
    }

    #[tokio::test]
    async fn stats_reflect_traffic() {
        let config = Config::new(Side::Client);
        let (mut client, server) = duplex(1024);
        let (reader, writer) = tokio::io::split(server);
        let terminal = Terminal::new(config, reader, writer).unwrap();

        use tokio::io::AsyncWriteExt;
        client.write_all(b"hi").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let stats = terminal.stats();
        assert!(stats.bytes_in >= 2);

        terminal.shutdown();
        terminal.wait_for_exit().await.unwrap();
    }
}
