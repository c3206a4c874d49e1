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

//! Owns the inbound byte stream: frames it, routes commands to negotiation,
//! decodes and parses text, and publishes everything through the event pump.

use crate::error::CoreError;
use crate::event::{EventRecord, EventSender, TelOptNotification};
use crate::keyboard::KeyboardHandle;
use crate::mask::PromptCommandMask;
use crate::negotiation::NegotiationTable;
use bytes::BytesMut;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::Notify;
use tracing::{debug, instrument, warn};
use wireterm_ansi::{DataParser, PromptKind, TerminalData};
use wireterm_charset::Charset;
use wireterm_framer::{Command, Framer, OpCode, Token};

const READ_CHUNK: usize = 4096;

#[derive(Default)]
pub struct PrinterStats {
    pub bytes_in: AtomicU64,
    pub frames_parsed: AtomicU64,
}

pub struct Printer {
    framer: Framer,
    parser: DataParser,
    charset: Arc<Charset>,
    negotiation: Arc<NegotiationTable>,
    events: EventSender,
    keyboard: KeyboardHandle,
    mask: Arc<PromptCommandMask>,
    fallback_latched: bool,
    stats: Arc<PrinterStats>,
}

impl Printer {
    pub fn new(
        charset: Arc<Charset>,
        negotiation: Arc<NegotiationTable>,
        events: EventSender,
        keyboard: KeyboardHandle,
        mask: Arc<PromptCommandMask>,
        stats: Arc<PrinterStats>,
    ) -> Self {
        Printer {
            framer: Framer::new(),
            parser: DataParser::new(),
            charset,
            negotiation,
            events,
            keyboard,
            mask,
            fallback_latched: false,
            stats,
        }
    }

    /// Runs the read loop until EOF, a permanent I/O error, or `shutdown` is
    /// notified. Returns the terminal I/O error, if any, for `WaitForExit`.
    #[instrument(skip_all)]
    pub async fn run<R>(mut self, mut reader: R, shutdown: Arc<Notify>) -> Result<(), CoreError>
    where
        R: tokio::io::AsyncRead + Unpin + Send,
    {
        let mut raw_buf = BytesMut::with_capacity(READ_CHUNK);
        let mut pending_decode: Vec<u8> = Vec::new();

        loop {
            let mut chunk = [0u8; READ_CHUNK];
            let read = tokio::select! {
                result = reader.read(&mut chunk) => result,
                _ = shutdown.notified() => {
                    debug!("printer shutting down");
                    break;
                }
            };

            let n = match read {
                Ok(0) => {
                    self.drain_on_eof(&mut raw_buf, &mut pending_decode);
                    break;
                }
                Ok(n) => n,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.events.send(EventRecord::EncounteredError(CoreError::Io(err)));
                    break;
                }
            };
            self.stats.bytes_in.fetch_add(n as u64, Ordering::Relaxed);
            raw_buf.extend_from_slice(&chunk[..n]);

            while let Some(token) = self.framer.next_token(&mut raw_buf) {
                self.stats.frames_parsed.fetch_add(1, Ordering::Relaxed);
                self.handle_token(token, &mut pending_decode);
            }
        }

        if let Some(item) = self.parser.flush() {
            self.events.send(EventRecord::PrinterOutput(item));
        }

        Ok(())
    }

    fn drain_on_eof(&mut self, raw_buf: &mut BytesMut, pending_decode: &mut Vec<u8>) {
        if let Some(token) = self.framer.flush(raw_buf) {
            self.handle_token(token, pending_decode);
        }
    }

    fn handle_token(&mut self, token: Token, pending_decode: &mut Vec<u8>) {
        match token {
            Token::Text(bytes) => {
                pending_decode.extend_from_slice(&bytes);
                self.decode_and_parse(pending_decode);
            }
            Token::Command(command) => self.handle_command(command),
        }
    }

    fn decode_and_parse(&mut self, pending_decode: &mut Vec<u8>) {
        if pending_decode.is_empty() {
            return;
        }
        let outcome = self.charset.decode(pending_decode, self.fallback_latched);
        self.fallback_latched = outcome.fallback_latched;
        pending_decode.clear();
        for item in self.parser.feed(&outcome.text) {
            if matches!(item, TerminalData::ControlCode(_)) {
                self.fallback_latched = false;
            }
            self.events.send(EventRecord::PrinterOutput(item));
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command.opcode {
            OpCode::NoOperation => debug!("discarding IAC NOP"),
            OpCode::GoAhead => self.emit_prompt(PromptKind::GoAhead, self.mask.has_ga()),
            OpCode::EndOfRecord => self.emit_prompt(PromptKind::EndOfRecord, self.mask.has_eor()),
            OpCode::AreYouThere => {
                self.keyboard.write_command(Command::simple(OpCode::NoOperation));
            }
            OpCode::Will | OpCode::Wont | OpCode::Do | OpCode::Dont => {
                let opcode = command.opcode;
                let option = command.option.unwrap_or(0);
                self.events
                    .send(EventRecord::PrinterOutput(TerminalData::Command(command)));
                let outcome = self.negotiation.handle_negotiation(opcode, option);
                if let Some(reply) = outcome.reply {
                    match outcome.post_send {
                        Some(post_send) => self.keyboard.write_command_with_post_send(reply, post_send),
                        None => self.keyboard.write_command(reply),
                    }
                }
                if let Some(change) = outcome.state_change {
                    self.events
                        .send(EventRecord::TelOpt(TelOptNotification::StateChange(change)));
                }
            }
            OpCode::Subnegotiation => {
                let option = command.option.unwrap_or(0);
                let payload = command.subnegotiation.clone().unwrap_or_default();
                self.events
                    .send(EventRecord::PrinterOutput(TerminalData::Command(command)));
                if let Err(err) = self.negotiation.dispatch_subnegotiation(option, payload) {
                    self.events.send(EventRecord::EncounteredError(err));
                }
            }
            OpCode::SubnegotiationEnd | OpCode::Minor(_) => {
                warn!(opcode = %command.opcode, "dropping unexpected or minor opcode at printer");
            }
        }
    }

    fn emit_prompt(&self, kind: PromptKind, mask_bit_set: bool) {
        if mask_bit_set {
            self.events
                .send(EventRecord::PrinterOutput(TerminalData::Prompt(kind)));
        } else {
            debug!(?kind, "dropping prompt command (bit cleared)");
        }
    }

    pub fn mask(&self) -> &PromptCommandMask {
        &self.mask
    }
}
