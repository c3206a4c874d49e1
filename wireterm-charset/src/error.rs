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

use thiserror::Error;

/// Errors surfaced by [`crate::Charset`].
///
/// Unknown IANA names are fatal only at construction time; decode errors in
/// an already-running charset never surface as an `Err` — malformed bytes
/// are replaced with U+FFFD instead, per RFC 2066's permissive intent.
#[derive(Debug, Error)]
pub enum CharsetError {
    /// `name` did not resolve via the IANA charset registry.
    #[error("unknown IANA charset name: {0}")]
    UnknownEncoding(String),
    /// A US-ASCII encoder was asked to emit a non-ASCII code point.
    #[error("code point U+{0:04X} is not representable in US-ASCII")]
    NotAscii(u32),
}

impl std::error::Error for CharsetError {}
