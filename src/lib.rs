//! # Agora
//!
//! Community SDK core for Rust hosts. What ships here is the machinery
//! that wires a session's singleton services together: a typed service
//! registry ([`Injector`]), the capability contracts it arbitrates, and
//! the session bootstrap that assembles one registry per session. The
//! presentation layer and the concrete gRPC client stay with the host
//! platform; they reach their collaborators only through identifiers and
//! [`Injector::resolve`], which is what lets tests substitute mocks
//! without touching call sites.
//!
//! ## Feature Flags
//!
//! - `services` (default): capability contracts and the session bootstrap
//! - `test-utils`: mock providers and rstest fixtures for host test suites
//!
//! ## Quick Example
//!
//! ```rust
//! use agora::prelude::*;
//! use agora_test::{MemorySecuredStore, MockCommunityClient, StubNotificationAuthorizer};
//! use std::sync::Arc;
//!
//! let session = Session::builder()
//!     .api_key("demo-key")
//!     .client(Arc::new(MockCommunityClient::new()))
//!     .secured_store(Arc::new(MemorySecuredStore::new()))
//!     .notification_authorizer(Arc::new(StubNotificationAuthorizer::granted()))
//!     .build()?;
//!
//! let client = session.client()?;
//! assert!(client.is_connected());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use agora_di as di;
pub use agora_di::{
	DuplicatePolicy, InjectError, InjectResult, InjectableObject, InjectedIdentifier, Injector,
};

#[cfg(feature = "services")]
pub use agora_services as services;

#[cfg(feature = "test-utils")]
pub use agora_test as test;

#[cfg(feature = "services")]
pub mod session;

#[cfg(feature = "services")]
pub use session::{SESSION_CONFIG, Session, SessionBuilder, SessionConfig, SessionError};

/// Commonly used types, importable in one line.
pub mod prelude {
	pub use agora_di::{
		DuplicatePolicy, InjectError, InjectResult, InjectableObject, InjectedIdentifier, Injector,
	};

	#[cfg(feature = "services")]
	pub use agora_services::{
		AuthorizationStatus, COMMUNITY_CLIENT, CommunityClient, NOTIFICATION_AUTHORIZATION,
		NotificationAuthorizing, SECURED_STORE, SecuredStore,
	};

	#[cfg(feature = "services")]
	pub use crate::session::{SESSION_CONFIG, Session, SessionConfig, SessionError};
}
