// SPDX-License-Identifier: PMPL-1.0-or-later
//! Performance benchmarks for FireKV collections

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;

use firekv::{Collection, Locator, Operator, Store, StoreConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct User {
    name: String,
    age: u32,
    email: String,
}

fn user(i: u32) -> User {
    User {
        name: format!("user-{i}"),
        age: i % 90,
        email: format!("user-{i}@example.com"),
    }
}

fn memory_store(rt: &Runtime) -> Store {
    rt.block_on(Store::open(":memory:")).unwrap()
}

fn redb_store(rt: &Runtime, dir: &std::path::Path) -> Store {
    let config = StoreConfig::for_locator(Locator::Redb {
        path: dir.join(format!("bench-{}.redb", uuid::Uuid::new_v4())),
    });
    rt.block_on(Store::open_with_config(config)).unwrap()
}

fn seed(rt: &Runtime, users: &Collection<User>, n: u32) {
    rt.block_on(async {
        for i in 0..n {
            users.set(&format!("{i:06}"), &user(i)).await.unwrap();
        }
    });
}

// ============================================================================
// Point operations
// ============================================================================

fn bench_point_operations(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let temp_dir = std::env::temp_dir().join(format!("firekv-bench-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&temp_dir).unwrap();

    let mut group = c.benchmark_group("point");

    for (backend, store) in [
        ("memory", memory_store(&rt)),
        ("redb", redb_store(&rt, &temp_dir)),
    ] {
        let users = store.collection::<User>("users");
        seed(&rt, &users, 1000);

        group.bench_function(BenchmarkId::new("add", backend), |b| {
            b.to_async(&rt)
                .iter(|| async { black_box(users.add(&user(7)).await.unwrap()) });
        });

        group.bench_function(BenchmarkId::new("get", backend), |b| {
            b.to_async(&rt)
                .iter(|| async { black_box(users.get("000500").await.unwrap()) });
        });

        rt.block_on(store.close()).unwrap();
    }

    group.finish();
    std::fs::remove_dir_all(&temp_dir).ok();
}

fn bench_concurrent_adds(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = memory_store(&rt);
    let users = store.collection::<User>("users");

    let mut group = c.benchmark_group("concurrent");
    group.throughput(Throughput::Elements(64));

    group.bench_function("add_64", |b| {
        b.to_async(&rt).iter(|| async {
            let adds = (0..64).map(|i| {
                let users = users.clone();
                async move { users.add(&user(i)).await.unwrap() }
            });
            black_box(futures::future::join_all(adds).await)
        });
    });

    group.finish();
}

// ============================================================================
// Scans
// ============================================================================

fn bench_scans(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("scan");

    for size in [100u32, 1000, 10000].iter() {
        let store = memory_store(&rt);
        let users = store.collection::<User>("users");
        // Neighbouring collection so scans have to stop at the prefix boundary.
        let other = store.collection::<User>("users-archive");
        seed(&rt, &users, *size);
        seed(&rt, &other, *size);

        group.throughput(Throughput::Elements(u64::from(*size)));

        group.bench_with_input(BenchmarkId::new("get_all", size), size, |b, _| {
            b.to_async(&rt)
                .iter(|| async { black_box(users.get_all().await.unwrap()) });
        });

        group.bench_with_input(BenchmarkId::new("query_gt", size), size, |b, _| {
            b.to_async(&rt).iter(|| async {
                black_box(users.query("age", Operator::Gt, 45).await.unwrap())
            });
        });

        group.bench_with_input(BenchmarkId::new("paginate_tail", size), size, |b, &size| {
            b.to_async(&rt).iter(|| async {
                black_box(users.paginate(10, (size - 10) as usize).await.unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(point_benches, bench_point_operations, bench_concurrent_adds);

criterion_group!(scan_benches, bench_scans);

criterion_main!(point_benches, scan_benches);
