//! Registry error taxonomy

/// Errors surfaced by [`Injector`] registration and resolution.
///
/// Every variant is a deterministic configuration defect; none is worth
/// retrying.
///
/// [`Injector`]: crate::Injector
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InjectError {
	/// Resolution was requested for a key no provider was registered under.
	/// A missing bootstrap registration, not a recoverable runtime
	/// condition.
	#[error("no provider registered for identifier `{key}`")]
	UnregisteredIdentifier {
		/// Key of the unresolved identifier
		key: &'static str,
	},

	/// A factory re-entered resolution of a key already under construction
	/// on the same thread.
	#[error("cyclic dependency while constructing `{key}`: {path}")]
	CyclicDependency {
		/// Key whose construction re-entered
		key: &'static str,
		/// Construction path, `a -> b -> a`
		path: String,
	},

	/// The identifier is already registered and the injector runs in
	/// strict mode, or the existing slot is mid-construction.
	#[error("identifier `{key}` is already registered")]
	DuplicateRegistration {
		/// Key of the conflicting registration
		key: &'static str,
	},

	/// The key is bound to a different capability type than the one it was
	/// used with. Identifier key collisions across unrelated capabilities
	/// are a configuration error.
	#[error("identifier `{key}` is bound to capability `{expected}`, not `{found}`")]
	CapabilityMismatch {
		/// Key the colliding identifiers share
		key: &'static str,
		/// Capability the slot was registered with
		expected: &'static str,
		/// Capability the identifier in hand declares
		found: &'static str,
	},
}

pub type InjectResult<T> = Result<T, InjectError>;
