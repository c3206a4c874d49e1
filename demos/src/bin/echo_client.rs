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

//! Minimal TELNET client exercising the `Terminal` facade end to end.
//!
//! Connects to `127.0.0.1:2323`, negotiates `ECHO`/`SUPPRESS-GO-AHEAD` as the
//! client side, prints whatever the server sends, and forwards each line
//! typed on stdin. Not a host CLI/TUI — just a smoke demonstration.
//!
//! ```bash
//! cargo run --bin echo_client
//! ```

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use wireterm_ansi::TerminalData;
use wireterm_core::{Config, Side, Terminal, Usage};
use wireterm_telopts::{Echo, SuppressGoAhead};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let stream = TcpStream::connect("127.0.0.1:2323").await?;
    let (reader, writer) = stream.into_split();

    let config = Config::new(Side::Client)
        .with_tel_opt(Arc::new(Echo::new(Usage::allow_local())), Usage::allow_local())
        .with_tel_opt(
            Arc::new(SuppressGoAhead::new(Usage::allow_local().and(Usage::allow_remote()))),
            Usage::allow_local().and(Usage::allow_remote()),
        )
        .on_printer_output(|data: &TerminalData| {
            if let TerminalData::Text(text) = data {
                print!("{text}");
            }
        });

    let terminal = Terminal::new(config, reader, writer)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    let quit = line.trim().eq_ignore_ascii_case("quit");
                    terminal.keyboard().write_text(format!("{line}\r\n"));
                    if quit {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    terminal.shutdown();
    terminal.wait_for_exit().await?;
    Ok(())
}
