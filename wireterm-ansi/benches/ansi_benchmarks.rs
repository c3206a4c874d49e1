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

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wireterm_ansi::DataParser;

fn plain_prose(repeats: usize) -> String {
    "the quick brown fox jumps over the lazy dog\r\n".repeat(repeats)
}

fn colorized_log_lines(repeats: usize) -> String {
    "\u{1B}[32mINFO\u{1B}[0m server started on :8080\r\n".repeat(repeats)
}

fn bench_plain_text(c: &mut Criterion) {
    let input = plain_prose(2000);
    c.bench_function("ansi_parse_plain_text", |b| {
        b.iter(|| {
            let mut parser = DataParser::new();
            black_box(parser.feed(&input));
        })
    });
}

fn bench_colorized_lines(c: &mut Criterion) {
    let input = colorized_log_lines(2000);
    c.bench_function("ansi_parse_colorized_lines", |b| {
        b.iter(|| {
            let mut parser = DataParser::new();
            black_box(parser.feed(&input));
        })
    });
}

criterion_group!(benches, bench_plain_text, bench_colorized_lines);
criterion_main!(benches);
