use bitstream::Pool;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use wire::{FrameBatcher, FrameUnbatcher, Limits};

fn messages(count: usize, size: usize) -> Vec<Vec<u8>> {
    (0..count).map(|i| vec![(i % 251) as u8; size]).collect()
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    for size in [16usize, 64, 256] {
        let input = messages(512, size);
        group.throughput(Throughput::Bytes((512 * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            let pool = Pool::writers();
            b.iter(|| {
                let mut batcher = FrameBatcher::new(Limits::default(), pool.clone());
                for message in input {
                    batcher.add_message(message, 1.0).unwrap();
                }
                let mut frames = 0;
                while let Some(frame) = batcher.take_frame() {
                    black_box(frame.as_slice());
                    frames += 1;
                }
                frames
            });
        });
    }
    group.finish();
}

fn bench_unbatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("unbatch");
    for size in [16usize, 64, 256] {
        let pool = Pool::writers();
        let mut batcher = FrameBatcher::new(Limits::default(), pool.clone());
        for message in messages(512, size) {
            batcher.add_message(&message, 1.0).unwrap();
        }
        let mut frames = Vec::new();
        while let Some(frame) = batcher.take_frame() {
            frames.push(frame.to_vec());
        }

        group.throughput(Throughput::Bytes((512 * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &frames, |b, frames| {
            b.iter(|| {
                let mut unbatcher = FrameUnbatcher::new(Limits::default(), pool.clone());
                let mut read = 0;
                for frame in frames {
                    unbatcher.add_frame(frame).unwrap();
                    while let Some(mut message) = unbatcher.next_message() {
                        read += message.read_bytes(size).map_or(0, <[u8]>::len);
                    }
                }
                black_box(read)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_batch, bench_unbatch);
criterion_main!(benches);
