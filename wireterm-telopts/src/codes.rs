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

//! Wire codes for the nine bundled options, per the
//! [IANA TELNET Options registry](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml).

use wireterm_core::TelOptCode;

/// Telnet Binary Transmission (RFC 856).
pub const TRANSMIT_BINARY: TelOptCode = 0;
/// Echo (RFC 857).
pub const ECHO: TelOptCode = 1;
/// Suppress Go Ahead (RFC 858).
pub const SUPPRESS_GO_AHEAD: TelOptCode = 3;
/// Terminal Type (RFC 1091).
pub const TERMINAL_TYPE: TelOptCode = 24;
/// End of Record (RFC 885).
pub const END_OF_RECORD: TelOptCode = 25;
/// Negotiate About Window Size (RFC 1073).
pub const NAWS: TelOptCode = 31;
/// Linemode (RFC 1184).
pub const LINEMODE: TelOptCode = 34;
/// New Environment Option (RFC 1572).
pub const NEW_ENVIRONMENT: TelOptCode = 39;
/// Charset (RFC 2066).
pub const CHARSET: TelOptCode = 42;
