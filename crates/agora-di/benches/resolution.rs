//! Benchmark: resolution hot path and contended first construction

use agora_di::{InjectedIdentifier, Injector};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::sync::{Arc, Barrier};
use std::thread;

trait Clock: Send + Sync {
	fn now(&self) -> u64;
}

struct FixedClock(u64);

impl Clock for FixedClock {
	fn now(&self) -> u64 {
		self.0
	}
}

static CLOCK: InjectedIdentifier<dyn Clock> = InjectedIdentifier::new("clock");

fn benchmark_cached_resolution(c: &mut Criterion) {
	let injector = Injector::new();
	injector
		.register(&CLOCK, |_| Ok(Arc::new(FixedClock(1)) as Arc<dyn Clock>))
		.unwrap();
	injector.seal();
	// Prime the slot so only the cached path is measured
	let _ = injector.resolve(&CLOCK).unwrap();

	c.bench_function("cached_resolution", |b| {
		b.iter(|| {
			let clock = injector.resolve(&CLOCK).unwrap();
			black_box(clock.now())
		})
	});
}

fn benchmark_first_resolution(c: &mut Criterion) {
	c.bench_function("first_resolution", |b| {
		b.iter_with_setup(
			|| {
				let injector = Injector::new();
				injector
					.register(&CLOCK, |_| Ok(Arc::new(FixedClock(1)) as Arc<dyn Clock>))
					.unwrap();
				injector
			},
			|injector| {
				let clock = injector.resolve(&CLOCK).unwrap();
				black_box(clock.now())
			},
		)
	});
}

fn benchmark_contended_resolution(c: &mut Criterion) {
	c.bench_function("contended_resolution_8_threads", |b| {
		b.iter_with_setup(
			|| {
				let injector = Injector::new();
				injector
					.register(&CLOCK, |_| Ok(Arc::new(FixedClock(1)) as Arc<dyn Clock>))
					.unwrap();
				injector
			},
			|injector| {
				let barrier = Barrier::new(8);
				thread::scope(|scope| {
					for _ in 0..8 {
						let injector = &injector;
						let barrier = &barrier;
						scope.spawn(move || {
							barrier.wait();
							black_box(injector.resolve(&CLOCK).unwrap());
						});
					}
				});
			},
		)
	});
}

criterion_group!(
	benches,
	benchmark_cached_resolution,
	benchmark_first_resolution,
	benchmark_contended_resolution
);
criterion_main!(benches);
