/// Benchmarks for the event stream hot path: splitting the byte stream into frames and
/// classifying each frame.
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use themenu_client::events::Frame;
use themenu_client::events::sse::SseDecoder;

const EVENT: &str = r#"{"id":"4f1d6a1e-3c1b-4d7a-9f59-2f4c1b7a8e21","type":"OrderStatusUpdated","status":"preparing","timestamp":"2024-05-01T12:00:00.123456789Z","payload":"{\"order_id\":\"6f1c2d3e-4b5a-4c6d-8e7f-8091a2b3c4d5\",\"user_id\":\"0b7d5a26-7f7f-4c3e-9d6e-7f3a7f0b7d5a\",\"dish_id\":\"2d9f7c48-9191-4e50-bf80-915c9122f97c\",\"status\":\"preparing\"}"}"#;

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("events/classify");

    group.throughput(Throughput::Bytes(4));
    group.bench_function("Frame::Ping", |b| {
        b.iter(|| {
            Frame::classify(std::hint::black_box("ping")).expect("ping should classify")
        });
    });

    group.throughput(Throughput::Bytes(EVENT.len() as u64));
    group.bench_function("Frame::Event", |b| {
        b.iter(|| Frame::classify(std::hint::black_box(EVENT)).expect("event should classify"));
    });

    let epoch_event = EVENT.replace(r#""2024-05-01T12:00:00.123456789Z""#, "1714564800123");
    group.throughput(Throughput::Bytes(epoch_event.len() as u64));
    group.bench_function("Frame::Event/epoch_millis", |b| {
        b.iter(|| {
            Frame::classify(std::hint::black_box(&epoch_event)).expect("event should classify")
        });
    });

    group.bench_function("OrderEvent::order_payload", |b| {
        let Ok(Frame::Event(event)) = Frame::classify(EVENT) else {
            panic!("event should classify");
        };
        b.iter(|| std::hint::black_box(&event).order_payload());
    });

    group.finish();
}

fn bench_decoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("events/sse_decoder");

    for events in [1_usize, 16, 256] {
        let mut body = String::from("data: connected\n\n");
        for i in 0..events {
            body.push_str("data: ");
            body.push_str(EVENT);
            body.push_str("\n\n");
            if i % 8 == 0 {
                body.push_str(": keepalive\n\ndata: ping\n\n");
            }
        }
        let body = body.into_bytes();

        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::new("single_chunk", events), &body, |b, body| {
            b.iter(|| SseDecoder::new().feed(std::hint::black_box(body)));
        });
        group.bench_with_input(BenchmarkId::new("1KiB_chunks", events), &body, |b, body| {
            b.iter(|| {
                let mut decoder = SseDecoder::new();
                let mut frames = 0;
                for chunk in std::hint::black_box(body).chunks(1024) {
                    frames += decoder.feed(chunk).len();
                }
                frames
            });
        });
    }

    group.finish();
}

criterion_group!(event_benches, bench_classify, bench_decoder);
criterion_main!(event_benches);
