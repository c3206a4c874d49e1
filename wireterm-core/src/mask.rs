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

//! The prompt-command bitset (`{GA, EOR}`), independently tracked on the
//! printer and keyboard sides.

use std::sync::atomic::{AtomicU8, Ordering};

const GA: u8 = 0b01;
const EOR: u8 = 0b10;

/// Starts with `GA` set, matching both the printer's and the keyboard's
/// initial state per spec.
pub struct PromptCommandMask(AtomicU8);

impl PromptCommandMask {
    pub fn new() -> Self {
        PromptCommandMask(AtomicU8::new(GA))
    }

    pub fn has_ga(&self) -> bool {
        self.0.load(Ordering::Acquire) & GA != 0
    }

    pub fn has_eor(&self) -> bool {
        self.0.load(Ordering::Acquire) & EOR != 0
    }

    pub fn set_ga(&self, value: bool) {
        self.set_bit(GA, value);
    }

    pub fn set_eor(&self, value: bool) {
        self.set_bit(EOR, value);
    }

    fn set_bit(&self, bit: u8, value: bool) {
        if value {
            self.0.fetch_or(bit, Ordering::AcqRel);
        } else {
            self.0.fetch_and(!bit, Ordering::AcqRel);
        }
    }
}

impl Default for PromptCommandMask {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_ga_only() {
        let mask = PromptCommandMask::new();
        assert!(mask.has_ga());
        assert!(!mask.has_eor());
    }

    #[test]
    fn independent_bits() {
        let mask = PromptCommandMask::new();
        mask.set_eor(true);
        mask.set_ga(false);
        assert!(!mask.has_ga());
        assert!(mask.has_eor());
    }
}
