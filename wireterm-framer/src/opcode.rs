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

/// Raw byte values for the TELNET commands this engine recognizes (RFC 854,
/// RFC 885 for `EOR`). Any other byte following IAC is a "minor opcode" —
/// see [`OpCode::Minor`].
pub mod raw {
    /// End of Record (RFC 885).
    pub const EOR: u8 = 239;
    /// Subnegotiation End.
    pub const SE: u8 = 240;
    /// No Operation.
    pub const NOP: u8 = 241;
    /// Are You There.
    pub const AYT: u8 = 246;
    /// Go Ahead.
    pub const GA: u8 = 249;
    /// Subnegotiation Begin.
    pub const SB: u8 = 250;
    /// WILL.
    pub const WILL: u8 = 251;
    /// WONT.
    pub const WONT: u8 = 252;
    /// DO.
    pub const DO: u8 = 253;
    /// DONT.
    pub const DONT: u8 = 254;
    /// Interpret As Command.
    pub const IAC: u8 = 255;
}

/// A TELNET command byte, as produced by [`crate::Framer`].
///
/// `Will`/`Wont`/`Do`/`Dont`/`Subnegotiation` always carry meaning only in
/// conjunction with the option byte the framer attaches to the enclosing
/// [`crate::Command`]; `OpCode` itself is just the command identity.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum OpCode {
    /// `IAC EOR` — end of record, one of the two prompt-commands.
    EndOfRecord,
    /// `IAC SE` — terminates a subnegotiation.
    SubnegotiationEnd,
    /// `IAC NOP` — no operation.
    NoOperation,
    /// `IAC AYT` — are-you-there.
    AreYouThere,
    /// `IAC GA` — go-ahead, the other prompt-command.
    GoAhead,
    /// `IAC SB <opt> ... IAC SE` — begins a subnegotiation.
    Subnegotiation,
    /// `IAC WILL <opt>`.
    Will,
    /// `IAC WONT <opt>`.
    Wont,
    /// `IAC DO <opt>`.
    Do,
    /// `IAC DONT <opt>`.
    Dont,
    /// Any byte following IAC that isn't one of the above. Recovered as a
    /// plain 2-byte command and otherwise ignored by the core.
    Minor(u8),
}

impl OpCode {
    /// The wire byte this opcode was (or would be) parsed from.
    pub const fn to_u8(self) -> u8 {
        match self {
            OpCode::EndOfRecord => raw::EOR,
            OpCode::SubnegotiationEnd => raw::SE,
            OpCode::NoOperation => raw::NOP,
            OpCode::AreYouThere => raw::AYT,
            OpCode::GoAhead => raw::GA,
            OpCode::Subnegotiation => raw::SB,
            OpCode::Will => raw::WILL,
            OpCode::Wont => raw::WONT,
            OpCode::Do => raw::DO,
            OpCode::Dont => raw::DONT,
            OpCode::Minor(byte) => byte,
        }
    }

    /// Classifies a byte seen immediately after IAC.
    pub const fn from_u8(byte: u8) -> OpCode {
        match byte {
            raw::EOR => OpCode::EndOfRecord,
            raw::SE => OpCode::SubnegotiationEnd,
            raw::NOP => OpCode::NoOperation,
            raw::AYT => OpCode::AreYouThere,
            raw::GA => OpCode::GoAhead,
            raw::SB => OpCode::Subnegotiation,
            raw::WILL => OpCode::Will,
            raw::WONT => OpCode::Wont,
            raw::DO => OpCode::Do,
            raw::DONT => OpCode::Dont,
            other => OpCode::Minor(other),
        }
    }

    /// True for `Will`/`Wont`/`Do`/`Dont`, the three-byte negotiation commands.
    pub const fn carries_option(self) -> bool {
        matches!(self, OpCode::Will | OpCode::Wont | OpCode::Do | OpCode::Dont)
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpCode::EndOfRecord => write!(f, "EOR"),
            OpCode::SubnegotiationEnd => write!(f, "SE"),
            OpCode::NoOperation => write!(f, "NOP"),
            OpCode::AreYouThere => write!(f, "AYT"),
            OpCode::GoAhead => write!(f, "GA"),
            OpCode::Subnegotiation => write!(f, "SB"),
            OpCode::Will => write!(f, "WILL"),
            OpCode::Wont => write!(f, "WONT"),
            OpCode::Do => write!(f, "DO"),
            OpCode::Dont => write!(f, "DONT"),
            OpCode::Minor(byte) => write!(f, "MINOR(0x{byte:02X})"),
        }
    }
}

/// Identity of a TELNET option (a "telopt"), 0-255. Carried around as a bare
/// `u8` everywhere — higher layers attach names/usage bits to it.
pub type TelOptCode = u8;
