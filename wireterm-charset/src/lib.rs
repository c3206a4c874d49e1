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

//! Character-set transcoding for a TELNET session.
//!
//! [`Charset`] tracks four independently-swappable cells (default,
//! negotiated-encoding, negotiated-decoding, optional fallback) plus two
//! binary-mode flags, and resolves IANA charset names via `encoding_rs`.
//! `UTF-8` and `US-ASCII` are special-cased: `UTF-8` because identity decode
//! with U+FFFD substitution is exactly what callers need (and is already
//! `encoding_rs`'s behaviour, so no extra code is needed there), and
//! `US-ASCII` because `encoding_rs::Encoding::for_label` maps the
//! `"us-ascii"` WHATWG label to windows-1252, which is not the strict 7-bit
//! semantics RFC 2066 implies by that name.
//!
//! Decoding in this crate treats each call's input slice as a complete unit
//! (`last = true` in `encoding_rs` terms) rather than keeping decoder state
//! alive across calls — see [`Charset::decode`] for the consequences.

mod codec;
mod error;

pub use codec::{Charset, DecodeOutcome, Usage};
pub use error::CharsetError;
