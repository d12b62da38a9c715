//! Criterion benchmarks for the until-fixpoint.
//!
//! Run with: cargo bench -p smvu-mc

use criterion::{criterion_group, criterion_main, Criterion};
use smvu_mc::check;
use smvu_syntax::{Model, PathQuant, Spec, State};

fn until_spec() -> Spec {
    Spec::Until {
        quant: PathQuant::Exists,
        p: "pp".to_string(),
        q: "qq".to_string(),
    }
}

/// Chain `s0 -> s1 -> ... -> s(n-1)` where only the last state satisfies
/// `qq`. Scanning in declaration order labels one state per scan, the
/// worst case for the fixpoint.
fn chain(n: usize) -> Model {
    let mut states = Vec::with_capacity(n);
    for i in 0..n {
        let prefix = if i + 1 == n { "qq" } else { "pp" };
        let mut state = State::new(format!("{prefix}s{i}"));
        if i + 1 < n {
            state.transitions.push(i + 1);
        }
        states.push(state);
    }
    Model {
        states,
        initial: 0,
        spec: until_spec(),
    }
}

/// Ring of `pp`-states with a single `qq`-state closing the cycle.
fn ring(n: usize) -> Model {
    let mut model = chain(n);
    let last = n - 1;
    model.states[last].transitions.push(0);
    model
}

fn bench_fixpoint(c: &mut Criterion) {
    for &n in &[64usize, 256] {
        let model = chain(n);
        c.bench_function(&format!("chain_{n}"), |b| {
            b.iter(|| {
                let mut m = model.clone();
                check(&mut m).unwrap()
            })
        });

        let model = ring(n);
        c.bench_function(&format!("ring_{n}"), |b| {
            b.iter(|| {
                let mut m = model.clone();
                check(&mut m).unwrap()
            })
        });
    }
}

criterion_group!(benches, bench_fixpoint);
criterion_main!(benches);
