use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use logiflow_core::{FixedClock, ProductId, WarehouseId};
use logiflow_infra::{Engine, EngineConfig};
use logiflow_inventory::plan_allocation;

fn bench_plan_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_allocation");
    for warehouses in [4usize, 64, 1024] {
        let candidates: Vec<(WarehouseId, i64)> = (0..warehouses)
            .map(|i| (WarehouseId::new(), (i as i64 % 7) * 3))
            .collect();
        let total: i64 = candidates.iter().map(|(_, a)| a).sum::<i64>() * 3 / 4;

        group.throughput(Throughput::Elements(warehouses as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(warehouses),
            &candidates,
            |b, candidates| {
                b.iter(|| plan_allocation(black_box(total), candidates.iter().copied()));
            },
        );
    }
    group.finish();
}

fn bench_ledger_throughput(c: &mut Criterion) {
    let engine = Engine::new(FixedClock::new(Utc::now()), &EngineConfig::default());
    let (product, warehouse) = (ProductId::new(), WarehouseId::new());
    engine.ledger().track_stock(product, warehouse).unwrap();

    let mut group = c.benchmark_group("stock_ledger");
    group.throughput(Throughput::Elements(2));
    group.bench_function("inbound_then_outbound", |b| {
        b.iter(|| {
            engine
                .ledger()
                .record_inbound(product, warehouse, black_box(5), "BENCH", "in")
                .unwrap();
            engine
                .ledger()
                .record_outbound(product, warehouse, black_box(5), "BENCH", "out")
                .unwrap();
        });
    });
    group.bench_function("reserve_then_release", |b| {
        engine
            .ledger()
            .record_inbound(product, warehouse, 100, "BENCH", "seed")
            .unwrap();
        b.iter(|| {
            engine
                .reservations()
                .reserve_stock(product, warehouse, black_box(3), "BENCH")
                .unwrap();
            engine
                .reservations()
                .release_reservation(product, warehouse, black_box(3), "BENCH")
                .unwrap();
        });
    });
    group.finish();
}

criterion_group!(benches, bench_plan_allocation, bench_ledger_throughput);
criterion_main!(benches);
