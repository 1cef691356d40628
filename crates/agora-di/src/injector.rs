//! Keyed slot store: registration, lazy construction, caching

use crate::{InjectError, InjectResult, InjectableObject, InjectedIdentifier};
use parking_lot::{Condvar, Mutex};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::mem;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use tracing::{debug, warn};

/// Boxed `Arc<T>` handle, erased for storage in the slot map.
type BoxedInstance = Box<dyn Any + Send + Sync>;

/// Deferred constructor; receives the injector so it can resolve its own
/// dependencies.
type Factory = Box<dyn FnOnce(&Injector) -> InjectResult<BoxedInstance> + Send>;

/// What `register` does when the identifier already has a slot.
///
/// Test suites rely on overwriting to substitute mocks, so the default is
/// [`LastWins`]; [`Strict`] surfaces [`DuplicateRegistration`] at
/// registration time instead.
///
/// [`LastWins`]: DuplicatePolicy::LastWins
/// [`Strict`]: DuplicatePolicy::Strict
/// [`DuplicateRegistration`]: crate::InjectError::DuplicateRegistration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
	/// The most recent registration replaces the previous one.
	#[default]
	LastWins,
	/// A second registration for the same identifier fails.
	Strict,
}

enum SlotState {
	Unbuilt(Factory),
	Building,
	Built(BoxedInstance),
}

struct Slot {
	capability: TypeId,
	capability_name: &'static str,
	state: SlotState,
}

struct Inner {
	slots: HashMap<&'static str, Slot>,
	// per-thread stacks of keys whose factories are on the call stack;
	// a key found here by its own thread is a cycle
	in_construction: HashMap<ThreadId, Vec<&'static str>>,
	sealed: bool,
}

/// Process-wide container for a session's singleton services.
///
/// One injector is assembled per session: bootstrap code registers a
/// factory or instance for every capability, calls [`seal`], and passes the
/// injector by reference to the subsystems that resolve collaborators at
/// first use. The injector is the sole owner of the singletons it builds;
/// consumers receive shared `Arc` handles. Dropping the injector releases
/// every singleton it exclusively owns.
///
/// All lookup and mutation is serialized through one lock. A factory runs
/// with the lock released, so it may resolve further identifiers on the
/// same injector; concurrent callers for a singleton under construction
/// wait and then share the one built instance.
///
/// [`seal`]: Injector::seal
///
/// # Examples
///
/// ```
/// use agora_di::{InjectedIdentifier, Injector};
/// use std::sync::Arc;
///
/// static MOTD: InjectedIdentifier<String> = InjectedIdentifier::new("motd");
///
/// let injector = Injector::new();
/// injector.register(&MOTD, |_| Ok(Arc::new("welcome".to_string())))?;
///
/// let first = injector.resolve(&MOTD)?;
/// let second = injector.resolve(&MOTD)?;
/// assert!(Arc::ptr_eq(&first, &second));
/// # Ok::<(), agora_di::InjectError>(())
/// ```
pub struct Injector {
	policy: DuplicatePolicy,
	inner: Mutex<Inner>,
	built: Condvar,
}

impl Injector {
	/// Creates an injector with the [`DuplicatePolicy::LastWins`] policy.
	pub fn new() -> Self {
		Self::with_policy(DuplicatePolicy::LastWins)
	}

	/// Creates an injector with an explicit duplicate-registration policy.
	///
	/// # Examples
	///
	/// ```
	/// use agora_di::{DuplicatePolicy, Injector};
	///
	/// let injector = Injector::with_policy(DuplicatePolicy::Strict);
	/// assert_eq!(injector.policy(), DuplicatePolicy::Strict);
	/// ```
	pub fn with_policy(policy: DuplicatePolicy) -> Self {
		Self {
			policy,
			inner: Mutex::new(Inner {
				slots: HashMap::new(),
				in_construction: HashMap::new(),
				sealed: false,
			}),
			built: Condvar::new(),
		}
	}

	/// The duplicate-registration policy this injector was built with.
	pub fn policy(&self) -> DuplicatePolicy {
		self.policy
	}

	/// Registers a lazy factory for `identifier`.
	///
	/// The factory runs at most once, on the first [`resolve`] of the
	/// identifier, and receives the injector so it can resolve its own
	/// dependencies. Re-registering follows the duplicate policy; a key
	/// already bound to a different capability fails with
	/// [`CapabilityMismatch`] regardless of policy.
	///
	/// [`resolve`]: Injector::resolve
	/// [`CapabilityMismatch`]: crate::InjectError::CapabilityMismatch
	pub fn register<T, F>(&self, identifier: &InjectedIdentifier<T>, factory: F) -> InjectResult<()>
	where
		T: ?Sized + Send + Sync + 'static,
		F: FnOnce(&Injector) -> InjectResult<Arc<T>> + Send + 'static,
	{
		let factory: Factory = Box::new(move |injector| {
			factory(injector).map(|instance| Box::new(instance) as BoxedInstance)
		});
		self.insert(
			identifier.key(),
			TypeId::of::<T>(),
			std::any::type_name::<T>(),
			SlotState::Unbuilt(factory),
		)
	}

	/// Registers an already-built instance for `identifier`.
	///
	/// Used for values that need externally supplied runtime data an
	/// argument-less factory cannot capture cleanly (an API key read at
	/// session start, or a mock in a test), subject to the same
	/// duplicate policy as [`register`].
	///
	/// [`register`]: Injector::register
	pub fn register_instance<T>(
		&self,
		identifier: &InjectedIdentifier<T>,
		instance: Arc<T>,
	) -> InjectResult<()>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		self.insert(
			identifier.key(),
			TypeId::of::<T>(),
			std::any::type_name::<T>(),
			SlotState::Built(Box::new(instance)),
		)
	}

	/// Registers a lazy factory for a provider under the identifier it
	/// declares via [`InjectableObject`].
	pub fn register_object<C, F>(&self, factory: F) -> InjectResult<()>
	where
		C: InjectableObject,
		F: FnOnce(&Injector) -> InjectResult<C> + Send + 'static,
	{
		self.register(C::identifier(), move |injector| {
			factory(injector).map(|object| C::into_capability(Arc::new(object)))
		})
	}

	/// Registers a built provider under the identifier it declares via
	/// [`InjectableObject`].
	///
	/// # Examples
	///
	/// ```
	/// use agora_di::{InjectableObject, InjectedIdentifier, Injector};
	/// use std::sync::Arc;
	///
	/// trait Flags: Send + Sync {
	///     fn enabled(&self, name: &str) -> bool;
	/// }
	///
	/// static FLAGS: InjectedIdentifier<dyn Flags> = InjectedIdentifier::new("flags");
	///
	/// struct AllOn;
	///
	/// impl Flags for AllOn {
	///     fn enabled(&self, _name: &str) -> bool {
	///         true
	///     }
	/// }
	///
	/// impl InjectableObject for AllOn {
	///     type Capability = dyn Flags;
	///
	///     fn identifier() -> &'static InjectedIdentifier<dyn Flags> {
	///         &FLAGS
	///     }
	///
	///     fn into_capability(self: Arc<Self>) -> Arc<dyn Flags> {
	///         self
	///     }
	/// }
	///
	/// let injector = Injector::new();
	/// injector.register_object_instance(Arc::new(AllOn))?;
	/// assert!(injector.resolve(&FLAGS)?.enabled("feed"));
	/// # Ok::<(), agora_di::InjectError>(())
	/// ```
	pub fn register_object_instance<C>(&self, instance: Arc<C>) -> InjectResult<()>
	where
		C: InjectableObject,
	{
		self.register_instance(C::identifier(), C::into_capability(instance))
	}

	/// Resolves the singleton registered for `identifier`.
	///
	/// The first resolution of an unbuilt slot runs its factory exactly
	/// once and caches the result; every resolution afterwards returns a
	/// clone of the same `Arc`. Concurrent callers for a singleton under
	/// construction block until it is built and then share it.
	///
	/// # Errors
	///
	/// - [`UnregisteredIdentifier`] if no slot exists for the key
	/// - [`CyclicDependency`] if the factory re-enters resolution of its
	///   own key, directly or transitively
	/// - [`CapabilityMismatch`] if the key was registered under a
	///   different capability type
	///
	/// [`UnregisteredIdentifier`]: crate::InjectError::UnregisteredIdentifier
	/// [`CyclicDependency`]: crate::InjectError::CyclicDependency
	/// [`CapabilityMismatch`]: crate::InjectError::CapabilityMismatch
	pub fn resolve<T>(&self, identifier: &InjectedIdentifier<T>) -> InjectResult<Arc<T>>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		enum Step {
			Wait,
			Construct(Factory, &'static str),
		}

		let key = identifier.key();
		let mut inner = self.inner.lock();
		loop {
			let step = {
				let Inner {
					slots,
					in_construction,
					..
				} = &mut *inner;
				let Some(slot) = slots.get_mut(key) else {
					return Err(InjectError::UnregisteredIdentifier { key });
				};
				if slot.capability != TypeId::of::<T>() {
					return Err(InjectError::CapabilityMismatch {
						key,
						expected: slot.capability_name,
						found: std::any::type_name::<T>(),
					});
				}
				match &slot.state {
					SlotState::Built(instance) => {
						let shared = instance.downcast_ref::<Arc<T>>().cloned().ok_or(
							InjectError::CapabilityMismatch {
								key,
								expected: slot.capability_name,
								found: std::any::type_name::<T>(),
							},
						)?;
						return Ok(shared);
					}
					SlotState::Building => {
						let thread = thread::current().id();
						if let Some(stack) = in_construction.get(&thread) {
							if stack.contains(&key) {
								return Err(InjectError::CyclicDependency {
									key,
									path: cycle_path(stack, key),
								});
							}
						}
						Step::Wait
					}
					SlotState::Unbuilt(_) => {
						match mem::replace(&mut slot.state, SlotState::Building) {
							SlotState::Unbuilt(factory) => {
								in_construction
									.entry(thread::current().id())
									.or_default()
									.push(key);
								Step::Construct(factory, slot.capability_name)
							}
							_ => unreachable!("slot state changed while the lock was held"),
						}
					}
				}
			};
			match step {
				Step::Wait => {
					// Another thread is constructing this singleton.
					self.built.wait(&mut inner);
				}
				Step::Construct(factory, capability_name) => {
					drop(inner);
					debug!(key, "constructing singleton");
					let mut guard = ConstructionGuard {
						injector: self,
						key,
						completed: false,
					};
					return match factory(self) {
						Ok(instance) => match instance.downcast::<Arc<T>>() {
							Ok(shared) => {
								let handle = (*shared).clone();
								let mut inner = self.inner.lock();
								pop_in_construction(&mut inner.in_construction, key);
								if let Some(slot) = inner.slots.get_mut(key) {
									slot.state = SlotState::Built(shared);
								}
								// A missing slot means reset() raced this
								// construction; the caller keeps the instance
								// it built, uncached.
								guard.completed = true;
								drop(inner);
								self.built.notify_all();
								debug!(key, "singleton ready");
								Ok(handle)
							}
							Err(_) => {
								drop(guard);
								Err(InjectError::CapabilityMismatch {
									key,
									expected: capability_name,
									found: std::any::type_name::<T>(),
								})
							}
						},
						Err(err) => {
							drop(guard);
							debug!(key, error = %err, "construction failed");
							Err(err)
						}
					};
				}
			}
		}
	}

	/// Resolves `identifier`, aborting with a diagnostic if it cannot be.
	///
	/// A missing or cyclic registration is a bootstrap defect; production
	/// call sites use this to fail at the broken configuration instead of
	/// limping on without a collaborator. Tests probing for registration
	/// errors use [`resolve`].
	///
	/// [`resolve`]: Injector::resolve
	///
	/// # Panics
	///
	/// Panics on any resolution error.
	pub fn require<T>(&self, identifier: &InjectedIdentifier<T>) -> Arc<T>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		match self.resolve(identifier) {
			Ok(instance) => instance,
			Err(err) => panic!(
				"required service `{}` unavailable: {err}",
				identifier.key()
			),
		}
	}

	/// Ends the bootstrap phase.
	///
	/// Registration afterwards is a usage error in non-test code; it is
	/// logged and still applies the duplicate policy under the lock rather
	/// than corrupting state.
	pub fn seal(&self) {
		let mut inner = self.inner.lock();
		inner.sealed = true;
		debug!(slots = inner.slots.len(), "injector sealed");
	}

	/// Whether [`seal`] has been called.
	///
	/// [`seal`]: Injector::seal
	pub fn is_sealed(&self) -> bool {
		self.inner.lock().sealed
	}

	/// Removes the slot for `identifier`, if any. Test teardown only.
	pub fn unregister<T: ?Sized>(&self, identifier: &InjectedIdentifier<T>) -> bool {
		let removed = self.inner.lock().slots.remove(identifier.key()).is_some();
		if removed {
			self.built.notify_all();
		}
		removed
	}

	/// Discards every slot and reopens the bootstrap phase. Test teardown
	/// only; singletons still shared elsewhere outlive the reset under
	/// normal `Arc` ownership.
	pub fn reset(&self) {
		let mut inner = self.inner.lock();
		inner.slots.clear();
		inner.sealed = false;
		drop(inner);
		self.built.notify_all();
	}

	/// Whether `identifier` currently has a slot of its capability type.
	pub fn is_registered<T>(&self, identifier: &InjectedIdentifier<T>) -> bool
	where
		T: ?Sized + 'static,
	{
		self.inner
			.lock()
			.slots
			.get(identifier.key())
			.is_some_and(|slot| slot.capability == TypeId::of::<T>())
	}

	/// Number of registered slots.
	pub fn len(&self) -> usize {
		self.inner.lock().slots.len()
	}

	/// Whether no slot is registered.
	pub fn is_empty(&self) -> bool {
		self.inner.lock().slots.is_empty()
	}

	fn insert(
		&self,
		key: &'static str,
		capability: TypeId,
		capability_name: &'static str,
		state: SlotState,
	) -> InjectResult<()> {
		let mut inner = self.inner.lock();
		if inner.sealed {
			warn!(key, "registration after the injector was sealed");
		}
		match inner.slots.entry(key) {
			Entry::Occupied(mut existing) => {
				let slot = existing.get();
				if slot.capability != capability {
					return Err(InjectError::CapabilityMismatch {
						key,
						expected: slot.capability_name,
						found: capability_name,
					});
				}
				// An in-flight construction cannot be discarded safely.
				if matches!(slot.state, SlotState::Building) {
					return Err(InjectError::DuplicateRegistration { key });
				}
				match self.policy {
					DuplicatePolicy::Strict => {
						return Err(InjectError::DuplicateRegistration { key });
					}
					DuplicatePolicy::LastWins => {
						warn!(key, "overwriting existing registration");
						existing.insert(Slot {
							capability,
							capability_name,
							state,
						});
					}
				}
			}
			Entry::Vacant(vacant) => {
				debug!(key, capability = capability_name, "registered");
				vacant.insert(Slot {
					capability,
					capability_name,
					state,
				});
			}
		}
		Ok(())
	}
}

impl Default for Injector {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Injector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let inner = self.inner.lock();
		f.debug_struct("Injector")
			.field("policy", &self.policy)
			.field("slots", &inner.slots.len())
			.field("sealed", &inner.sealed)
			.finish()
	}
}

/// Cleanup for a construction that did not complete: pops the thread's
/// in-construction entry, removes the half-built slot and wakes waiters so
/// a failed or panicked factory cannot strand them.
struct ConstructionGuard<'a> {
	injector: &'a Injector,
	key: &'static str,
	completed: bool,
}

impl Drop for ConstructionGuard<'_> {
	fn drop(&mut self) {
		if self.completed {
			return;
		}
		let mut inner = self.injector.inner.lock();
		pop_in_construction(&mut inner.in_construction, self.key);
		if let Some(slot) = inner.slots.get(self.key) {
			if matches!(slot.state, SlotState::Building) {
				inner.slots.remove(self.key);
			}
		}
		drop(inner);
		self.injector.built.notify_all();
	}
}

fn pop_in_construction(map: &mut HashMap<ThreadId, Vec<&'static str>>, key: &'static str) {
	let thread = thread::current().id();
	if let Some(stack) = map.get_mut(&thread) {
		if let Some(position) = stack.iter().rposition(|entry| *entry == key) {
			stack.remove(position);
		}
		if stack.is_empty() {
			map.remove(&thread);
		}
	}
}

fn cycle_path(stack: &[&'static str], key: &'static str) -> String {
	let start = stack.iter().position(|entry| *entry == key).unwrap_or(0);
	let mut path = stack[start..].join(" -> ");
	path.push_str(" -> ");
	path.push_str(key);
	path
}

#[cfg(test)]
mod tests {
	use super::*;

	static LABEL: InjectedIdentifier<String> = InjectedIdentifier::new("label");

	#[test]
	fn new_injector_is_empty_and_unsealed() {
		let injector = Injector::new();

		assert!(injector.is_empty());
		assert_eq!(injector.len(), 0);
		assert!(!injector.is_sealed());
		assert_eq!(injector.policy(), DuplicatePolicy::LastWins);
	}

	#[test]
	fn registration_is_visible_before_resolution() {
		let injector = Injector::new();

		injector
			.register(&LABEL, |_| Ok(Arc::new("a".to_string())))
			.unwrap();

		assert!(injector.is_registered(&LABEL));
		assert_eq!(injector.len(), 1);
		assert!(!injector.is_empty());
	}

	#[test]
	fn seal_flips_the_flag_only() {
		let injector = Injector::new();
		injector
			.register_instance(&LABEL, Arc::new("a".to_string()))
			.unwrap();

		injector.seal();

		assert!(injector.is_sealed());
		assert!(injector.is_registered(&LABEL));
	}

	#[test]
	fn unregister_reports_whether_a_slot_existed() {
		let injector = Injector::new();
		injector
			.register_instance(&LABEL, Arc::new("a".to_string()))
			.unwrap();

		assert!(injector.unregister(&LABEL));
		assert!(!injector.unregister(&LABEL));
		assert!(!injector.is_registered(&LABEL));
	}

	#[test]
	fn debug_output_summarizes_state() {
		let injector = Injector::default();

		let rendered = format!("{:?}", injector);

		assert!(rendered.contains("Injector"));
		assert!(rendered.contains("LastWins"));
	}

	#[test]
	fn cycle_path_starts_at_the_repeated_key() {
		let path = cycle_path(&["outer", "a", "b"], "a");
		assert_eq!(path, "a -> b -> a");
	}

	#[test]
	fn cycle_path_handles_single_entry() {
		let path = cycle_path(&["a"], "a");
		assert_eq!(path, "a -> a");
	}
}
