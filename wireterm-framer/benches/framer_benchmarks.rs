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

use bytes::BytesMut;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wireterm_framer::{encode_command, encode_text, Command, Framer, OpCode};

fn mixed_stream(repeats: usize) -> BytesMut {
    let mut wire = BytesMut::new();
    for _ in 0..repeats {
        encode_text(&mut wire, b"the quick brown fox jumps over the lazy dog\r\n");
        encode_command(&mut wire, &Command::negotiation(OpCode::Will, 1));
        encode_command(&mut wire, &Command::simple(OpCode::GoAhead));
    }
    wire
}

fn bench_tokenize_mixed_stream(c: &mut Criterion) {
    let template = mixed_stream(500);
    c.bench_function("framer_tokenize_mixed_stream", |b| {
        b.iter(|| {
            let mut buf = template.clone();
            let mut framer = Framer::new();
            let mut count = 0usize;
            while let Some(tok) = framer.next_token(&mut buf) {
                count += black_box(1) * if matches!(tok, wireterm_framer::Token::Text(_)) { 1 } else { 1 };
            }
            black_box(count);
        })
    });
}

fn bench_tokenize_plain_text(c: &mut Criterion) {
    let mut wire = BytesMut::new();
    encode_text(&mut wire, &vec![b'x'; 64 * 1024]);
    c.bench_function("framer_tokenize_plain_text_64k", |b| {
        b.iter(|| {
            let mut buf = wire.clone();
            let mut framer = Framer::new();
            while framer.next_token(&mut buf).is_some() {}
            black_box(&buf);
        })
    });
}

criterion_group!(benches, bench_tokenize_mixed_stream, bench_tokenize_plain_text);
criterion_main!(benches);
