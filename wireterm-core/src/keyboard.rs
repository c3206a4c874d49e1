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

//! Owns the outbound byte stream: a bounded FIFO of write items, gated by
//! the named-lock registry, with post-send closures run after each item's
//! bytes are actually committed.

use crate::error::CoreError;
use crate::event::{EventRecord, EventSender};
use crate::lock::KeyboardLock;
use crate::mask::PromptCommandMask;
use crate::telopt::PostSend;
use crate::Terminal;
use bytes::BytesMut;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, instrument};
use wireterm_ansi::TerminalData;
use wireterm_charset::Charset;
use wireterm_framer::{encode_command, encode_text, Command, OpCode};

#[derive(Default)]
pub struct KeyboardStats {
    pub bytes_out: AtomicU64,
    pub items_written: AtomicU64,
}

enum WriteKind {
    Text(String),
    Command(Command),
    PromptHint,
}

struct WriteItem {
    kind: WriteKind,
    post_send: Option<PostSend>,
}

/// A cheap, cloneable handle used by the printer, negotiation stack, and
/// telopts to enqueue outbound items without touching the writer task.
#[derive(Clone)]
pub struct KeyboardHandle {
    tx: mpsc::Sender<WriteItem>,
}

impl KeyboardHandle {
    pub fn write_text(&self, text: impl Into<String>) {
        self.enqueue(WriteKind::Text(text.into()), None);
    }

    pub fn write_text_with_post_send(&self, text: impl Into<String>, post_send: PostSend) {
        self.enqueue(WriteKind::Text(text.into()), Some(post_send));
    }

    pub fn write_command(&self, command: Command) {
        self.enqueue(WriteKind::Command(command), None);
    }

    pub fn write_command_with_post_send(&self, command: Command, post_send: PostSend) {
        self.enqueue(WriteKind::Command(command), Some(post_send));
    }

    pub fn send_prompt_hint(&self) {
        self.enqueue(WriteKind::PromptHint, None);
    }

    fn enqueue(&self, kind: WriteKind, post_send: Option<PostSend>) {
        if self.tx.try_send(WriteItem { kind, post_send }).is_err() {
            debug!("keyboard queue full or closed; write item dropped");
        }
    }
}

pub struct Keyboard {
    rx: mpsc::Receiver<WriteItem>,
    lock: Arc<KeyboardLock>,
    charset: Arc<Charset>,
    mask: Arc<PromptCommandMask>,
    events: EventSender,
    terminal: Mutex<Option<Weak<Terminal>>>,
    stats: Arc<KeyboardStats>,
}

impl Keyboard {
    pub fn new(
        capacity: usize,
        lock: Arc<KeyboardLock>,
        charset: Arc<Charset>,
        events: EventSender,
        mask: Arc<PromptCommandMask>,
        stats: Arc<KeyboardStats>,
    ) -> (Self, KeyboardHandle) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Keyboard {
                rx,
                lock,
                charset,
                mask,
                events,
                terminal: Mutex::new(None),
                stats,
            },
            KeyboardHandle { tx },
        )
    }

    pub fn set_terminal(&self, terminal: Weak<Terminal>) {
        *self.terminal.lock().unwrap() = Some(terminal);
    }

    pub fn mask(&self) -> &PromptCommandMask {
        &self.mask
    }

    /// Runs the write loop. A locked text item is deferred to a local queue
    /// and flushed, in order, the moment the aggregate lock clears; commands
    /// and prompt hints always bypass the lock.
    #[instrument(skip_all)]
    pub async fn run<W>(mut self, mut writer: W, shutdown: Arc<Notify>) -> Result<(), CoreError>
    where
        W: tokio::io::AsyncWrite + Unpin + Send,
    {
        let mut deferred: VecDeque<WriteItem> = VecDeque::new();
        let mut shutting_down = false;

        loop {
            if deferred.is_empty() {
                tokio::select! {
                    item = self.rx.recv() => match item {
                        Some(item) => self.dispatch(item, shutting_down, &mut deferred, &mut writer).await?,
                        None => break,
                    },
                    _ = shutdown.notified(), if !shutting_down => {
                        shutting_down = true;
                    }
                }
            } else {
                tokio::select! {
                    _ = self.lock.wait_for_unlock() => {
                        self.flush_deferred(&mut deferred, &mut writer).await?;
                    }
                    item = self.rx.recv() => match item {
                        Some(item) => self.dispatch(item, shutting_down, &mut deferred, &mut writer).await?,
                        None => break,
                    },
                }
            }

            if shutting_down && deferred.is_empty() {
                // Drain any remaining commands and non-locked text items
                // before exiting; a still-locked text item is dropped rather
                // than deferred indefinitely.
                while let Ok(item) = self.rx.try_recv() {
                    self.dispatch(item, shutting_down, &mut deferred, &mut writer).await?;
                }
                if deferred.is_empty() {
                    break;
                }
            }
        }

        let _ = writer.flush().await;
        Ok(())
    }

    async fn dispatch<W>(
        &mut self,
        item: WriteItem,
        shutting_down: bool,
        deferred: &mut VecDeque<WriteItem>,
        writer: &mut W,
    ) -> Result<(), CoreError>
    where
        W: tokio::io::AsyncWrite + Unpin + Send,
    {
        match &item.kind {
            WriteKind::Text(_) if self.lock.is_locked() => {
                if shutting_down {
                    debug!("dropping locked text item during shutdown");
                } else {
                    deferred.push_back(item);
                }
                Ok(())
            }
            _ => self.write_now(item, writer).await,
        }
    }

    async fn flush_deferred<W>(
        &mut self,
        deferred: &mut VecDeque<WriteItem>,
        writer: &mut W,
    ) -> Result<(), CoreError>
    where
        W: tokio::io::AsyncWrite + Unpin + Send,
    {
        while let Some(item) = deferred.pop_front() {
            self.write_now(item, writer).await?;
        }
        Ok(())
    }

    async fn write_now<W>(&mut self, item: WriteItem, writer: &mut W) -> Result<(), CoreError>
    where
        W: tokio::io::AsyncWrite + Unpin + Send,
    {
        let mut buf = BytesMut::new();
        let mirror = match item.kind {
            WriteKind::Text(text) => {
                let bytes = self.charset.encode(&text).map_err(CoreError::Charset)?;
                encode_text(&mut buf, &bytes);
                Some(TerminalData::Text(text))
            }
            WriteKind::Command(command) => {
                if !self.prompt_allowed(&command) {
                    debug!(opcode = %command.opcode, "prompt command suppressed by mask");
                    return Ok(());
                }
                encode_command(&mut buf, &command);
                Some(TerminalData::Command(command))
            }
            WriteKind::PromptHint => {
                if self.mask.has_eor() {
                    let command = Command::simple(OpCode::EndOfRecord);
                    encode_command(&mut buf, &command);
                    Some(TerminalData::Command(command))
                } else if self.mask.has_ga() {
                    let command = Command::simple(OpCode::GoAhead);
                    encode_command(&mut buf, &command);
                    Some(TerminalData::Command(command))
                } else {
                    None
                }
            }
        };

        if !buf.is_empty() {
            writer.write_all(&buf).await.map_err(CoreError::Io)?;
            writer.flush().await.map_err(CoreError::Io)?;
            self.stats.bytes_out.fetch_add(buf.len() as u64, Ordering::Relaxed);
            self.stats.items_written.fetch_add(1, Ordering::Relaxed);
        }

        if let Some(data) = mirror {
            self.events.send(EventRecord::OutboundData(data));
        }

        if let Some(post_send) = item.post_send {
            let weak = self.terminal.lock().unwrap().clone();
            if let Some(terminal) = weak.and_then(|w| w.upgrade()) {
                post_send(&terminal);
            }
        }

        Ok(())
    }

    fn prompt_allowed(&self, command: &Command) -> bool {
        match command.opcode {
            OpCode::GoAhead => self.mask.has_ga(),
            OpCode::EndOfRecord => self.mask.has_eor(),
            _ => true,
        }
    }
}
