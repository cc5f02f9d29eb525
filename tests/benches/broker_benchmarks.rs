//! # Edge Broker Benchmarks
//!
//! | Path | Claim |
//! |------|-------|
//! | `match_subscribers` | Cost tracks matched subscribers, not index size |
//! | `deliver` | Fan-out sends run concurrently |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use eb_02_subscriptions::{SubscriptionConfig, SubscriptionIndex};
use eb_03_notification_delivery::{ConnectionManager, DeliveryConfig, NotificationDeliveryEngine};
use shared_types::{NotificationDescriptor, NotificationFromProducer, Urn};
use std::sync::Arc;

fn populated_index(consumers: usize) -> SubscriptionIndex {
    let index = SubscriptionIndex::with_config(SubscriptionConfig::default());
    let descriptors = [
        NotificationDescriptor::new("price-update", "1"),
        NotificationDescriptor::new("stock-out", "1"),
    ];
    for i in 0..consumers {
        let consumer = Urn::new("shop", format!("cart-{i}"));
        // Spread consumers over many namespaces so most of the index is noise.
        let namespace = format!("ns-{}", i % 100);
        index
            .add_namespace_subscription(&consumer, &namespace, &descriptors)
            .expect("valid subscription");
    }
    index
}

fn bench_match_subscribers(c: &mut Criterion) {
    let mut group = c.benchmark_group("eb-02-match-subscribers");
    let descriptor = NotificationDescriptor::new("price-update", "1");
    let producer = Urn::new("ns-7", "catalog");

    for size in [1_000, 10_000, 100_000] {
        let index = populated_index(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(index.match_subscribers(&producer, &descriptor)))
        });
    }
    group.finish();
}

fn bench_deliver(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("eb-03-deliver");

    for fanout in [1usize, 10, 100] {
        let index = Arc::new(SubscriptionIndex::new());
        let connections = Arc::new(ConnectionManager::new(1024));
        let mut channels = Vec::new();
        for i in 0..fanout {
            let consumer = Urn::new("shop", format!("cart-{i}"));
            index
                .add_namespace_subscription(
                    &consumer,
                    "shop",
                    &[NotificationDescriptor::new("price-update", "1")],
                )
                .expect("valid subscription");
            channels.push(connections.open(consumer));
        }
        let engine = NotificationDeliveryEngine::new(index, connections, DeliveryConfig::default());
        let producer = Urn::new("shop", "catalog");
        let notification = NotificationFromProducer {
            name: "price-update".into(),
            version: "1".into(),
            payload: serde_json::json!({"sku": 42}),
        };

        group.throughput(Throughput::Elements(fanout as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fanout), &fanout, |b, _| {
            b.iter(|| {
                runtime.block_on(async {
                    let report = engine.deliver(&producer, &notification).await.expect("encodes");
                    // Drain so channels never fill up.
                    for channel in &mut channels {
                        let _ = channel.recv().await;
                    }
                    black_box(report)
                })
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_match_subscribers, bench_deliver);
criterion_main!(benches);
