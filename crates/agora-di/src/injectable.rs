//! Contract between concrete providers and the identifiers they satisfy

use crate::InjectedIdentifier;
use std::sync::Arc;

/// Declares which identifier a concrete provider type satisfies.
///
/// A provider's `Capability` may be a supertype of the provider itself,
/// typically a trait object type, which is what allows a mock to stand in
/// for a production implementation under the same identifier. The contract
/// says nothing about construction; factories handle that.
///
/// `into_capability` is the unsizing step from `Arc<Self>` to
/// `Arc<Self::Capability>`. Stable Rust cannot write that coercion
/// generically, so each impl states it where the concrete type is known;
/// the body is always `self`.
///
/// # Examples
///
/// ```
/// use agora_di::{InjectableObject, InjectedIdentifier, Injector};
/// use std::sync::Arc;
///
/// trait Telemetry: Send + Sync {
///     fn record(&self, event: &str);
/// }
///
/// static TELEMETRY: InjectedIdentifier<dyn Telemetry> = InjectedIdentifier::new("telemetry");
///
/// struct NoopTelemetry;
///
/// impl Telemetry for NoopTelemetry {
///     fn record(&self, _event: &str) {}
/// }
///
/// impl InjectableObject for NoopTelemetry {
///     type Capability = dyn Telemetry;
///
///     fn identifier() -> &'static InjectedIdentifier<dyn Telemetry> {
///         &TELEMETRY
///     }
///
///     fn into_capability(self: Arc<Self>) -> Arc<dyn Telemetry> {
///         self
///     }
/// }
///
/// let injector = Injector::new();
/// injector.register_object_instance(Arc::new(NoopTelemetry))?;
/// injector.resolve(&TELEMETRY)?.record("bootstrap");
/// # Ok::<(), agora_di::InjectError>(())
/// ```
pub trait InjectableObject: Send + Sync + 'static {
	/// The capability contract this provider fulfills.
	type Capability: ?Sized + Send + Sync + 'static;

	/// The identifier this provider is registered under.
	fn identifier() -> &'static InjectedIdentifier<Self::Capability>;

	/// Unsize a shared handle of the provider to its capability.
	fn into_capability(self: Arc<Self>) -> Arc<Self::Capability>;
}
