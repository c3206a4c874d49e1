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

//! Minimal TELNET echo server exercising the `Terminal` facade end to end.
//!
//! Accepts connections on `127.0.0.1:2323`, negotiates `ECHO`,
//! `SUPPRESS-GO-AHEAD`, and `NAWS` as the server side, and echoes back every
//! line of text it receives. Not a host CLI/TUI — just a smoke demonstration.
//!
//! ```bash
//! cargo run --bin echo_server
//! ```

use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tracing::{error, info};
use wireterm_ansi::TerminalData;
use wireterm_core::{Config, KeyboardHandle, Side, Terminal, Usage};
use wireterm_telopts::{Echo, Naws, SuppressGoAhead};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let listener = TcpListener::bind("127.0.0.1:2323").await?;
    info!("wireterm echo server listening on 127.0.0.1:2323");

    loop {
        let (stream, peer) = listener.accept().await?;
        info!(%peer, "client connected");
        tokio::spawn(async move {
            if let Err(err) = handle(stream).await {
                error!(%peer, %err, "connection ended with error");
            }
        });
    }
}

async fn handle(stream: tokio::net::TcpStream) -> Result<(), Box<dyn std::error::Error>> {
    let (reader, writer) = stream.into_split();

    // `on_printer_output` is registered before the `Terminal` exists, so the
    // keyboard handle it needs to echo through is filled in just after.
    let keyboard_cell: Arc<Mutex<Option<KeyboardHandle>>> = Arc::new(Mutex::new(None));
    let echo_keyboard = keyboard_cell.clone();

    let config = Config::new(Side::Server)
        .with_tel_opt(Arc::new(Echo::new(Usage::request_local())), Usage::request_local())
        .with_tel_opt(
            Arc::new(SuppressGoAhead::new(Usage::request_local().and(Usage::allow_remote()))),
            Usage::request_local().and(Usage::allow_remote()),
        )
        .with_tel_opt(Arc::new(Naws::new(Usage::allow_remote())), Usage::allow_remote())
        .on_printer_output(move |data: &TerminalData| {
            if let TerminalData::Text(text) = data {
                if let Some(keyboard) = echo_keyboard.lock().unwrap().as_ref() {
                    if text.trim().eq_ignore_ascii_case("quit") {
                        keyboard.write_text("goodbye\r\n");
                    } else {
                        keyboard.write_text(format!("echo: {text}> "));
                    }
                }
            }
        });

    let terminal = Terminal::new(config, reader, writer)?;
    *keyboard_cell.lock().unwrap() = Some(terminal.keyboard().clone());
    terminal.keyboard().write_text("welcome to the wireterm echo server\r\n> ");

    terminal.wait_for_exit().await?;
    Ok(())
}
