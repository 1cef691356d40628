//! Session bootstrap: one injector per session

use agora_di::{DuplicatePolicy, InjectResult, InjectedIdentifier, Injector};
use agora_services::client::CommunityClient;
use agora_services::notifications::NotificationAuthorizing;
use agora_services::storage::SecuredStore;
use agora_services::{COMMUNITY_CLIENT, NOTIFICATION_AUTHORIZATION, SECURED_STORE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Identifier the session configuration is registered under.
///
/// The configuration carries runtime data (the API key) that only the host
/// knows, so it enters the registry as an externally supplied instance
/// rather than through a factory; provider factories resolve it like any
/// other collaborator.
pub static SESSION_CONFIG: InjectedIdentifier<SessionConfig> =
	InjectedIdentifier::new("agora.session.config");

/// Runtime configuration the host application supplies at session start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
	/// API key identifying the host application to the community backend.
	pub api_key: String,
}

/// Errors from session assembly.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
	/// No API key was supplied to the builder.
	#[error("session requires an API key")]
	MissingApiKey,

	/// A required capability has no provider.
	#[error("no provider supplied for capability `{capability}`")]
	MissingProvider {
		/// Identifier key of the absent capability
		capability: &'static str,
	},

	/// Registration failed while assembling the injector.
	#[error(transparent)]
	Registration(#[from] agora_di::InjectError),
}

type ProviderFactory<T> = Box<dyn FnOnce(&Injector) -> InjectResult<Arc<T>> + Send>;

enum Provider<T: ?Sized> {
	Instance(Arc<T>),
	Factory(ProviderFactory<T>),
}

impl<T: ?Sized + Send + Sync + 'static> Provider<T> {
	fn register(self, injector: &Injector, identifier: &InjectedIdentifier<T>) -> InjectResult<()> {
		match self {
			Provider::Instance(instance) => injector.register_instance(identifier, instance),
			Provider::Factory(factory) => injector.register(identifier, factory),
		}
	}
}

/// One SDK session: owns the injector every subsystem resolves through.
///
/// A session is assembled once via [`Session::builder`], used for its
/// whole lifetime, and dropped when the host signs the user out; dropping
/// it releases every singleton the injector exclusively owns.
///
/// # Examples
///
/// ```
/// use agora::Session;
/// use agora_test::{MemorySecuredStore, MockCommunityClient, StubNotificationAuthorizer};
/// use std::sync::Arc;
///
/// let session = Session::builder()
///     .api_key("demo-key")
///     .client(Arc::new(MockCommunityClient::new()))
///     .secured_store(Arc::new(MemorySecuredStore::new()))
///     .notification_authorizer(Arc::new(StubNotificationAuthorizer::granted()))
///     .build()?;
///
/// assert!(session.injector().is_sealed());
/// # Ok::<(), agora::SessionError>(())
/// ```
pub struct Session {
	injector: Injector,
}

impl Session {
	/// Starts assembling a session.
	pub fn builder() -> SessionBuilder {
		SessionBuilder::new()
	}

	/// The registry subsystems resolve their collaborators through.
	pub fn injector(&self) -> &Injector {
		&self.injector
	}

	/// The configuration this session was assembled with.
	pub fn config(&self) -> InjectResult<Arc<SessionConfig>> {
		self.injector.resolve(&SESSION_CONFIG)
	}

	/// The session's remote client.
	pub fn client(&self) -> InjectResult<Arc<dyn CommunityClient>> {
		self.injector.resolve(&COMMUNITY_CLIENT)
	}

	/// The session's secured store.
	pub fn secured_store(&self) -> InjectResult<Arc<dyn SecuredStore>> {
		self.injector.resolve(&SECURED_STORE)
	}

	/// The session's notification-authorization backend.
	pub fn notification_authorizer(&self) -> InjectResult<Arc<dyn NotificationAuthorizing>> {
		self.injector.resolve(&NOTIFICATION_AUTHORIZATION)
	}
}

/// Collects the API key and capability providers, then assembles and seals
/// the session injector.
///
/// Every capability accepts either a built instance or a factory; factories
/// receive the injector and may resolve [`SESSION_CONFIG`] or other
/// capabilities registered before them.
pub struct SessionBuilder {
	api_key: Option<String>,
	policy: DuplicatePolicy,
	client: Option<Provider<dyn CommunityClient>>,
	secured_store: Option<Provider<dyn SecuredStore>>,
	notification_authorizer: Option<Provider<dyn NotificationAuthorizing>>,
}

impl SessionBuilder {
	fn new() -> Self {
		Self {
			api_key: None,
			policy: DuplicatePolicy::LastWins,
			client: None,
			secured_store: None,
			notification_authorizer: None,
		}
	}

	/// The API key identifying the host application.
	pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
		self.api_key = Some(api_key.into());
		self
	}

	/// Duplicate-registration policy for the session injector.
	pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Supplies the remote client as a built instance.
	pub fn client(mut self, client: Arc<dyn CommunityClient>) -> Self {
		self.client = Some(Provider::Instance(client));
		self
	}

	/// Defers remote-client construction to first resolution.
	pub fn client_factory<F>(mut self, factory: F) -> Self
	where
		F: FnOnce(&Injector) -> InjectResult<Arc<dyn CommunityClient>> + Send + 'static,
	{
		self.client = Some(Provider::Factory(Box::new(factory)));
		self
	}

	/// Supplies the secured store as a built instance.
	pub fn secured_store(mut self, store: Arc<dyn SecuredStore>) -> Self {
		self.secured_store = Some(Provider::Instance(store));
		self
	}

	/// Defers secured-store construction to first resolution.
	pub fn secured_store_factory<F>(mut self, factory: F) -> Self
	where
		F: FnOnce(&Injector) -> InjectResult<Arc<dyn SecuredStore>> + Send + 'static,
	{
		self.secured_store = Some(Provider::Factory(Box::new(factory)));
		self
	}

	/// Supplies the notification-authorization backend as a built instance.
	pub fn notification_authorizer(mut self, authorizer: Arc<dyn NotificationAuthorizing>) -> Self {
		self.notification_authorizer = Some(Provider::Instance(authorizer));
		self
	}

	/// Defers notification-backend construction to first resolution.
	pub fn notification_authorizer_factory<F>(mut self, factory: F) -> Self
	where
		F: FnOnce(&Injector) -> InjectResult<Arc<dyn NotificationAuthorizing>> + Send + 'static,
	{
		self.notification_authorizer = Some(Provider::Factory(Box::new(factory)));
		self
	}

	/// Registers everything, seals the injector and yields the session.
	///
	/// # Errors
	///
	/// [`SessionError::MissingApiKey`] or
	/// [`SessionError::MissingProvider`] when the builder is incomplete:
	/// the SDK's clear startup failure instead of a crash deep inside a
	/// dependent feature later.
	pub fn build(self) -> Result<Session, SessionError> {
		let api_key = self.api_key.ok_or(SessionError::MissingApiKey)?;
		let client = self.client.ok_or(SessionError::MissingProvider {
			capability: COMMUNITY_CLIENT.key(),
		})?;
		let secured_store = self.secured_store.ok_or(SessionError::MissingProvider {
			capability: SECURED_STORE.key(),
		})?;
		let notification_authorizer =
			self.notification_authorizer
				.ok_or(SessionError::MissingProvider {
					capability: NOTIFICATION_AUTHORIZATION.key(),
				})?;

		let injector = Injector::with_policy(self.policy);
		injector.register_instance(&SESSION_CONFIG, Arc::new(SessionConfig { api_key }))?;
		client.register(&injector, &COMMUNITY_CLIENT)?;
		secured_store.register(&injector, &SECURED_STORE)?;
		notification_authorizer.register(&injector, &NOTIFICATION_AUTHORIZATION)?;
		injector.seal();
		info!(services = injector.len(), "session assembled");

		Ok(Session { injector })
	}
}

impl Default for SessionBuilder {
	fn default() -> Self {
		Self::new()
	}
}
