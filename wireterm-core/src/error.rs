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

use wireterm_framer::TelOptCode;

/// Errors a [`crate::Terminal`] can surface.
///
/// Construction errors (`Config`, `Charset`, `DuplicateTelOpt`) are fatal and
/// returned synchronously from [`crate::Terminal::new`]. Every other variant
/// is published through the `EncounteredError` event hook and does not stop
/// the affected task except where noted.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Two configured telopts claim the same option code.
    #[error("telopt code {0} registered more than once")]
    DuplicateTelOpt(TelOptCode),
    /// The configured default or fallback charset name didn't resolve.
    #[error("charset construction failed: {0}")]
    Charset(#[from] wireterm_charset::CharsetError),
    /// A transient or permanent I/O failure on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A telopt's `subnegotiate` or transition callback returned an error.
    /// The option's state is left as already transitioned; processing
    /// continues.
    #[error("telopt {code} error: {message}")]
    TelOpt { code: TelOptCode, message: String },
    /// Orderly shutdown was requested; not an error unless the host passed
    /// a non-cancellation deadline that also elapsed.
    #[error("terminal shutting down")]
    Cancelled,
}

impl std::error::Error for CoreError {}
