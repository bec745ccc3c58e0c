use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gridcalc::Engine;

/// Column A holds a chain `A(n) = A(n-1) + 1`; B1 sums the whole column
fn chain(n: u32) -> Engine {
    let mut engine = Engine::new();
    engine.set_cell("A1", "1").unwrap();
    for row in 2..=n {
        engine
            .set_cell(&format!("A{row}"), &format!("=A{}+1", row - 1))
            .unwrap();
    }
    engine.set_cell("B1", &format!("=SUM(A1:A{n})")).unwrap();
    engine
}

fn bench_recalc(c: &mut Criterion) {
    let mut group = c.benchmark_group("Recalc");

    for n in [100u32, 1000, 5000] {
        // Editing the head of the chain touches every cell
        let mut engine = chain(n);
        let mut toggle = false;
        group.bench_with_input(BenchmarkId::new("ChainHead", n), &n, |b, _| {
            b.iter(|| {
                toggle = !toggle;
                let text = if toggle { "2" } else { "1" };
                engine.set_cell("A1", black_box(text)).unwrap()
            })
        });

        // Editing the tail only touches the tail and the SUM
        let mut engine = chain(n);
        let tail = format!("A{n}");
        group.bench_with_input(BenchmarkId::new("ChainTail", n), &n, |b, _| {
            b.iter(|| {
                toggle = !toggle;
                let text = if toggle { "=0" } else { "=1" };
                engine.set_cell(&tail, black_box(text)).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_range_formula(c: &mut Criterion) {
    c.bench_function("SetCell/SumOver10kRange", |b| {
        let mut engine = Engine::new();
        let mut toggle = false;
        b.iter(|| {
            toggle = !toggle;
            let text = if toggle { "=SUM(A1:J1000)" } else { "=SUM(A1:J1000)+0" };
            engine.set_cell("Z1", black_box(text)).unwrap()
        })
    });
}

criterion_group!(benches, bench_recalc, bench_range_formula);
criterion_main!(benches);
