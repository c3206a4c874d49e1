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

//! ANSI/VT500-family control-sequence recognition.
//!
//! [`DataParser`] turns already-decoded UTF-8 text into a sequence of
//! [`TerminalData`] items: coalesced text runs, control codes, and
//! structured `CSI`/`OSC`/`DCS`/`ESC`/`SOS`/`PM`/`APC` sequences. It does
//! not render, interpret, or apply any of these sequences — that's a screen
//! emulator's job, and explicitly out of scope here.

mod data;
mod parser;

pub use data::{PromptKind, TerminalData};
pub use parser::DataParser;
