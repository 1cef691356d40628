//! Concurrent resolution: single construction, shared instances, no strands

use agora_di::{InjectError, InjectedIdentifier, Injector};
use rstest::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

trait Counter: Send + Sync {
	fn value(&self) -> usize;
}

struct FixedCounter(usize);

impl Counter for FixedCounter {
	fn value(&self) -> usize {
		self.0
	}
}

static COUNTER: InjectedIdentifier<dyn Counter> = InjectedIdentifier::new("counter");

#[rstest]
fn concurrent_first_resolution_constructs_exactly_once() {
	// Arrange: a deliberately slow factory widens the race window
	let injector = Injector::new();
	let constructions = Arc::new(AtomicUsize::new(0));
	let seen = Arc::clone(&constructions);
	injector
		.register(&COUNTER, move |_| {
			seen.fetch_add(1, Ordering::SeqCst);
			thread::sleep(Duration::from_millis(30));
			Ok(Arc::new(FixedCounter(7)) as Arc<dyn Counter>)
		})
		.unwrap();

	let threads = 8;
	let barrier = Barrier::new(threads);

	// Act
	let handles: Vec<Arc<dyn Counter>> = thread::scope(|scope| {
		let workers: Vec<_> = (0..threads)
			.map(|_| {
				scope.spawn(|| {
					barrier.wait();
					injector.resolve(&COUNTER).unwrap()
				})
			})
			.collect();
		workers
			.into_iter()
			.map(|worker| worker.join().unwrap())
			.collect()
	});

	// Assert: one construction, one shared instance
	assert_eq!(constructions.load(Ordering::SeqCst), 1);
	let first = &handles[0];
	for handle in &handles {
		assert!(Arc::ptr_eq(first, handle));
		assert_eq!(handle.value(), 7);
	}
}

#[rstest]
fn registrations_from_many_threads_all_land() {
	// Arrange
	static KEYS: [InjectedIdentifier<usize>; 8] = [
		InjectedIdentifier::new("k0"),
		InjectedIdentifier::new("k1"),
		InjectedIdentifier::new("k2"),
		InjectedIdentifier::new("k3"),
		InjectedIdentifier::new("k4"),
		InjectedIdentifier::new("k5"),
		InjectedIdentifier::new("k6"),
		InjectedIdentifier::new("k7"),
	];
	let injector = Injector::new();

	// Act
	thread::scope(|scope| {
		for (index, identifier) in KEYS.iter().enumerate() {
			let injector = &injector;
			scope.spawn(move || {
				injector
					.register_instance(identifier, Arc::new(index))
					.unwrap();
			});
		}
	});

	// Assert
	assert_eq!(injector.len(), KEYS.len());
	for (index, identifier) in KEYS.iter().enumerate() {
		assert_eq!(*injector.resolve(identifier).unwrap(), index);
	}
}

#[rstest]
fn panicking_factory_does_not_strand_waiters() {
	// Arrange: the factory signals the waiter, then dies
	let injector = Arc::new(Injector::new());
	let entered = Arc::new(Barrier::new(2));
	let signal = Arc::clone(&entered);
	injector
		.register(&COUNTER, move |_| -> agora_di::InjectResult<Arc<dyn Counter>> {
			signal.wait();
			thread::sleep(Duration::from_millis(30));
			panic!("backend exploded");
		})
		.unwrap();

	// Act
	let builder = {
		let injector = Arc::clone(&injector);
		thread::spawn(move || injector.resolve(&COUNTER))
	};
	let waiter = {
		let injector = Arc::clone(&injector);
		let entered = Arc::clone(&entered);
		thread::spawn(move || {
			entered.wait();
			injector.resolve(&COUNTER)
		})
	};

	// Assert: the builder panicked, the waiter got a clean error
	assert!(builder.join().is_err());
	let waited = waiter.join().unwrap();
	assert!(matches!(
		waited,
		Err(InjectError::UnregisteredIdentifier { key: "counter" })
	));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn resolution_is_shared_across_async_tasks() {
	// Arrange: UI, networking and persistence code paths all resolve the
	// same injector concurrently
	let injector = Arc::new(Injector::new());
	let constructions = Arc::new(AtomicUsize::new(0));
	let seen = Arc::clone(&constructions);
	injector
		.register(&COUNTER, move |_| {
			seen.fetch_add(1, Ordering::SeqCst);
			Ok(Arc::new(FixedCounter(3)) as Arc<dyn Counter>)
		})
		.unwrap();
	injector.seal();

	// Act
	let tasks: Vec<_> = (0..8)
		.map(|_| {
			let injector = Arc::clone(&injector);
			tokio::spawn(async move { injector.resolve(&COUNTER).unwrap() })
		})
		.collect();
	let mut handles = Vec::new();
	for task in tasks {
		handles.push(task.await.unwrap());
	}

	// Assert
	assert_eq!(constructions.load(Ordering::SeqCst), 1);
	for handle in &handles {
		assert!(Arc::ptr_eq(&handles[0], handle));
	}
}
