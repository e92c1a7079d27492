// Criterion benchmarks for langconv-fst.
//
// The machines are synthetic (built with FstBuilder), so no compiled
// .pfst assets are needed.
//
// Run:
//   cargo bench -p langconv-fst

use criterion::{Criterion, criterion_group, criterion_main};

use langconv_fst::Fst;
use langconv_fst::builder::{FstBuilder, Target};
use langconv_fst::edge::{BYTE_EOF, BYTE_EPSILON, BYTE_IDENTITY, BYTE_LBRACKET, BYTE_RBRACKET};

/// Identity over non-NUL bytes with a vowel-substitution table, roughly
/// the shape of a single-character conversion machine.
fn conversion_machine() -> Fst {
    let mut b = FstBuilder::new();
    b.add_edge(0, 0x01, BYTE_IDENTITY, Target::State(0));
    for (from, to) in [(b'a', b'4'), (b'e', b'3'), (b'i', b'1'), (b'o', b'0')] {
        b.add_edge(0, from, to, Target::State(0));
        b.add_edge(0, from + 1, BYTE_IDENTITY, Target::State(0));
    }
    b.add_edge(0, BYTE_EOF, BYTE_EPSILON, Target::Accept);
    Fst::compile("bench-conv", b.build(), false).expect("valid image")
}

/// Bracketing machine that marks every 'u' as an unsafe span.
fn bracketing_machine() -> Fst {
    let mut b = FstBuilder::new();
    let s1 = b.add_state();
    let s2 = b.add_state();
    b.add_edge(0, 0x01, BYTE_IDENTITY, Target::State(0));
    b.add_edge(0, b'u', BYTE_LBRACKET, Target::State(s1));
    b.add_edge(0, b'u' + 1, BYTE_IDENTITY, Target::State(0));
    b.add_edge(0, BYTE_EOF, BYTE_EPSILON, Target::Accept);
    b.add_edge(s1, BYTE_EPSILON, b'u', Target::State(s2));
    b.add_edge(s2, BYTE_EPSILON, BYTE_RBRACKET, Target::State(0));
    Fst::compile("bench-brack", b.build(), true).expect("valid image")
}

fn sample_text() -> String {
    "the quick brown fox jumps over the lazy dog. ".repeat(200)
}

fn bench_translate(c: &mut Criterion) {
    let fst = conversion_machine();
    let text = sample_text();
    c.bench_function("translate_9kb", |b| {
        b.iter(|| {
            std::hint::black_box(fst.translate_str(&text, 0, text.len()).expect("total machine"));
        });
    });
}

fn bench_bracket(c: &mut Criterion) {
    let fst = bracketing_machine();
    let text = sample_text();
    c.bench_function("bracket_9kb_bytes", |b| {
        b.iter(|| {
            std::hint::black_box(
                fst.bracket(text.as_bytes(), 0, text.len(), false)
                    .expect("total machine"),
            );
        });
    });
    c.bench_function("bracket_9kb_codepoints", |b| {
        b.iter(|| {
            std::hint::black_box(
                fst.bracket(text.as_bytes(), 0, text.len(), true)
                    .expect("total machine"),
            );
        });
    });
}

criterion_group!(benches, bench_translate, bench_bracket);
criterion_main!(benches);
