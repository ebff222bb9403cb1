use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use freshet_core::{CacheEntry, CachedValue, JobKey};
use freshet_store::{CacheStore, MemoryStore, StoreConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Runtime;

const TTL: Duration = Duration::from_secs(600);

/// Crea una entrada de prueba con N elementos
fn create_test_entry(num_items: usize) -> CacheEntry {
    let items: Vec<_> = (0..num_items)
        .map(|i| serde_json::json!({ "id": i, "username": format!("user-{}", i) }))
        .collect();
    CacheEntry::fresh_for(CachedValue::Data(serde_json::json!(items)), TTL)
}

fn key_for(id: u64) -> String {
    JobKey::new("wiki.document_contributors", 2, vec![id.into()]).to_string()
}

/// Benchmark: get (hit)
fn bench_store_get_hit(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = MemoryStore::new(StoreConfig::default());
    let key = key_for(1);

    rt.block_on(async {
        store.set(&key, create_test_entry(100), TTL).await.unwrap();
    });

    c.bench_function("store_get_hit", |b| {
        b.to_async(&rt).iter(|| async {
            let result = store.get(&key).await;
            std::hint::black_box(result)
        });
    });
}

/// Benchmark: get (miss)
fn bench_store_get_miss(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = MemoryStore::new(StoreConfig::default());
    let key = key_for(404);

    c.bench_function("store_get_miss", |b| {
        b.to_async(&rt).iter(|| async {
            let result = store.get(&key).await;
            std::hint::black_box(result)
        });
    });
}

/// Benchmark: set con diferentes tamanos de entrada
fn bench_store_set_varying_sizes(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("store_set_sizes");

    for size in [10, 100, 1000].iter() {
        let store = Arc::new(MemoryStore::new(StoreConfig::default()));
        let entry = Arc::new(create_test_entry(*size));

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _size| {
            let counter = Arc::new(AtomicU64::new(0));
            b.to_async(&rt).iter(|| {
                let store = Arc::clone(&store);
                let entry = Arc::clone(&entry);
                let counter = Arc::clone(&counter);
                async move {
                    let id = counter.fetch_add(1, Ordering::Relaxed);
                    store.set(&key_for(id), (*entry).clone(), TTL).await.unwrap();
                }
            });
        });
    }

    group.finish();
}

/// Benchmark: ciclo completo de lock (acquire + release)
fn bench_store_lock_cycle(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = MemoryStore::new(StoreConfig::default());
    let key = key_for(7);

    c.bench_function("store_lock_cycle", |b| {
        b.to_async(&rt).iter(|| async {
            let token = store
                .try_acquire_lock(&key, Duration::from_secs(30))
                .await
                .unwrap();
            if let Some(token) = token {
                store.release_lock(&key, token).await.unwrap();
            }
            std::hint::black_box(token)
        });
    });
}

/// Benchmark: Concurrencia - multiples gets simultaneos
fn bench_store_concurrent_gets(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = Arc::new(MemoryStore::new(StoreConfig::default()));

    // Pre-populate con 1000 entries
    rt.block_on(async {
        for i in 0..1000 {
            store.set(&key_for(i), create_test_entry(20), TTL).await.unwrap();
        }
    });

    c.bench_function("store_concurrent_gets_100", |b| {
        b.to_async(&rt).iter(|| {
            let store = Arc::clone(&store);
            async move {
                let handles: Vec<_> = (0..100u64)
                    .map(|i| {
                        let store = Arc::clone(&store);
                        tokio::spawn(async move { store.get(&key_for(i % 1000)).await })
                    })
                    .collect();

                for handle in handles {
                    let _ = handle.await;
                }
            }
        });
    });
}

criterion_group!(
    benches,
    bench_store_get_hit,
    bench_store_get_miss,
    bench_store_set_varying_sizes,
    bench_store_lock_cycle,
    bench_store_concurrent_gets,
);

criterion_main!(benches);
