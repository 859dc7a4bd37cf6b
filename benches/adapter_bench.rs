use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use rfaudio::{MediaAdapter, MediaEvent, MediaEventType, NativeSignal, NoopAudioPlatform};

/// Bench: translate a burst of native time-update callbacks
fn bench_time_updates(c: &mut Criterion) {
    let platform = Arc::new(NoopAudioPlatform::new());
    let mut audio = MediaAdapter::with_src(platform.clone(), "bench.mp3");
    for kind in MediaEventType::ALL {
        audio.add_event_listener(kind, |_: &MediaEvent| {});
    }
    let native = platform.last_instance().expect("native player");
    native.set_duration(180.0);
    native.fire(NativeSignal::Canplay);
    audio.poll_native();

    c.bench_function("poll_100_time_updates", |b| {
        b.iter(|| {
            for _ in 0..100 {
                native.fire(NativeSignal::TimeUpdate);
            }
            audio.poll_native()
        })
    });
}

/// Bench: full load cycle on a fresh adapter, src through FUTURE_DATA
fn bench_load_cycle(c: &mut Criterion) {
    let platform = Arc::new(NoopAudioPlatform::new());
    c.bench_function("src_to_future_data", |b| {
        b.iter(|| {
            let mut audio = MediaAdapter::new(platform.clone());
            let native = platform.last_instance().expect("native player");
            audio.set_src("bench.mp3");
            audio.load().expect("load");
            native.set_duration(3.0);
            native.fire(NativeSignal::Canplay);
            audio.poll_native();
            audio.ready_state()
        })
    });
}

criterion_group!(benches, bench_time_updates, bench_load_cycle);
criterion_main!(benches);
