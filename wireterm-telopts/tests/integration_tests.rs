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

//! Two full `Terminal`s wired together over a duplex stream, each side
//! carrying a realistic set of the bundled options, exercising the whole
//! negotiation/subnegotiation path instead of one handler in isolation.

use std::sync::Arc;
use std::time::Duration;
use wireterm_core::{Config, Side, Terminal, Usage};
use wireterm_telopts::{Naws, SuppressGoAhead, TerminalType, WindowSize};

#[tokio::test]
async fn client_and_server_negotiate_terminal_type_and_naws() {
    let (client_stream, server_stream) = tokio::io::duplex(8192);
    let (client_reader, client_writer) = tokio::io::split(client_stream);
    let (server_reader, server_writer) = tokio::io::split(server_stream);

    let client_terminal_type = Arc::new(TerminalType::new(Usage::allow_local(), "xterm-256color"));
    let client_naws = Arc::new(Naws::new(Usage::request_local()));
    let client_config = Config::new(Side::Client)
        .with_tel_opt(client_terminal_type.clone(), Usage::allow_local())
        .with_tel_opt(client_naws.clone(), Usage::request_local())
        .with_tel_opt(
            Arc::new(SuppressGoAhead::new(Usage::allow_local())),
            Usage::allow_local(),
        );

    let server_terminal_type = Arc::new(TerminalType::new(Usage::allow_remote(), "unused"));
    let server_naws = Arc::new(Naws::new(Usage::allow_remote()));
    let server_config = Config::new(Side::Server)
        .with_tel_opt(server_terminal_type.clone(), Usage::request_remote())
        .with_tel_opt(server_naws.clone(), Usage::allow_remote())
        .with_tel_opt(
            Arc::new(SuppressGoAhead::new(Usage::allow_remote())),
            Usage::allow_remote(),
        );

    let client = Terminal::new(client_config, client_reader, client_writer).unwrap();
    let server = Terminal::new(server_config, server_reader, server_writer).unwrap();

    // The server's `request_remote` usage sends `DO TERMINAL-TYPE` at
    // startup; the client answers `WILL`, then the server asks `SEND` and
    // the client's handler answers with its configured name.
    tokio::time::sleep(Duration::from_millis(50)).await;
    server_terminal_type.request();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(server_terminal_type.remote_name().as_deref(), Some("xterm-256color"));

    // NAWS negotiates in parallel with TERMINAL-TYPE (`request_local` on the
    // client fires `WILL` at startup); by now it should already be active.
    client_naws.send(WindowSize { cols: 120, rows: 40 });
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(server_naws.size(), Some(WindowSize { cols: 120, rows: 40 }));

    client.shutdown();
    server.shutdown();
    client.wait_for_exit().await.unwrap();
    server.wait_for_exit().await.unwrap();
}

#[tokio::test]
async fn suppress_go_ahead_converges_active_on_both_sides() {
    let (client_stream, server_stream) = tokio::io::duplex(4096);
    let (client_reader, client_writer) = tokio::io::split(client_stream);
    let (server_reader, server_writer) = tokio::io::split(server_stream);

    let client_sga = Arc::new(SuppressGoAhead::new(Usage::request_local().and(Usage::allow_remote())));
    let client_config =
        Config::new(Side::Client).with_tel_opt(client_sga.clone(), Usage::request_local().and(Usage::allow_remote()));

    let server_sga = Arc::new(SuppressGoAhead::new(Usage::allow_local().and(Usage::request_remote())));
    let server_config = Config::new(Side::Server)
        .with_tel_opt(server_sga.clone(), Usage::allow_local().and(Usage::request_remote()));

    let client = Terminal::new(client_config, client_reader, client_writer).unwrap();
    let server = Terminal::new(server_config, server_reader, server_writer).unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;

    use wireterm_core::TelOptState;
    assert_eq!(
        client.local_state(wireterm_telopts::SUPPRESS_GO_AHEAD),
        Some(TelOptState::Active)
    );
    assert_eq!(
        server.remote_state(wireterm_telopts::SUPPRESS_GO_AHEAD),
        Some(TelOptState::Active)
    );
    assert!(!client.keyboard_mask().has_ga());
    assert!(!server.printer_mask().has_ga());

    client.shutdown();
    server.shutdown();
    client.wait_for_exit().await.unwrap();
    server.wait_for_exit().await.unwrap();
}
