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

use wireterm_charset::{Charset, Usage};

/// Scenario from spec.md §8: the peer announces UTF-8 support over CHARSET
/// while the session still defaults to US-ASCII. `promoteDefault` upgrades
/// the default (and negotiated charsets still pinned to the old default)
/// atomically.
#[test]
fn promote_default_upgrades_session_from_ascii_to_utf8() {
    let charset = Charset::new("US-ASCII", None, Usage::Always).unwrap();
    assert_eq!(charset.default_name(), "US-ASCII");
    assert_eq!(charset.encoding_name(), "US-ASCII");

    assert!(charset.promote_default("US-ASCII", "UTF-8").unwrap());

    assert_eq!(charset.default_name(), "UTF-8");
    assert_eq!(charset.encoding_name(), "UTF-8");
    assert_eq!(charset.decoding_name(), "UTF-8");
    assert_eq!(charset.encode("caf\u{e9}").unwrap(), "caf\u{e9}".as_bytes());
}

#[test]
fn negotiated_encoding_and_decoding_commit_independently() {
    let charset = Charset::new("US-ASCII", None, Usage::Binary).unwrap();
    charset.set_negotiated_decoding("UTF-8").unwrap();
    charset.set_binary_decode(true);
    // Encoding direction still untouched: binary_encode is false and usage
    // is Binary, so outbound still goes through the (US-ASCII) default.
    assert_eq!(charset.decoding_name(), "UTF-8");
    assert_eq!(charset.encoding_name(), "US-ASCII");

    charset.set_negotiated_encoding("UTF-8").unwrap();
    charset.set_binary_encode(true);
    assert_eq!(charset.encoding_name(), "UTF-8");
}

#[test]
fn windows_1252_fallback_recovers_legacy_bytes_mixed_into_a_utf8_stream() {
    let charset = Charset::new("UTF-8", Some("windows-1252"), Usage::Always).unwrap();

    let ok = charset.decode("hello ".as_bytes(), false);
    assert!(!ok.fallback_latched);
    assert_eq!(ok.text, "hello ");

    // 0x93/0x94 are curly quotes under windows-1252 but invalid lone UTF-8
    // lead bytes, so primary UTF-8 decode produces U+FFFD and the fallback
    // decoder should take over and latch.
    let latched = charset.decode(&[0x93, b'h', b'i', 0x94], false);
    assert!(latched.fallback_latched);
    assert_eq!(latched.text, "\u{201c}hi\u{201d}");
}

#[test]
fn ascii_encode_rejects_non_ascii_while_decode_stays_permissive() {
    let charset = Charset::new("US-ASCII", None, Usage::Always).unwrap();
    assert!(charset.encode("plain text").is_ok());
    assert!(charset.encode("\u{2603}").is_err());

    let decoded = charset.decode(&[b'o', b'k', 0xFF], false);
    assert_eq!(decoded.text, "ok\u{FFFD}");
}
