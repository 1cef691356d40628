//! rstest fixtures for registry-backed tests

use crate::mocks::{MemorySecuredStore, MockCommunityClient, StubNotificationAuthorizer};
use agora_di::Injector;
use rstest::fixture;
use std::sync::Arc;

/// An injector pre-populated with every mock capability provider, sealed,
/// ready to hand to the code under test.
///
/// Injected by rstest when a test declares a `mock_injector: Injector`
/// parameter; also callable directly.
///
/// # Examples
///
/// ```
/// use agora_services::SECURED_STORE;
/// use agora_test::mock_injector;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let injector = mock_injector();
/// let store = injector.resolve(&SECURED_STORE).unwrap();
/// store.set("token", b"abc".to_vec()).await.unwrap();
/// assert!(store.get("token").await.unwrap().is_some());
/// # });
/// ```
#[fixture]
pub fn mock_injector() -> Injector {
	let injector = Injector::new();
	injector
		.register_object_instance(Arc::new(MemorySecuredStore::new()))
		.expect("fresh injector accepts the store mock");
	injector
		.register_object_instance(Arc::new(StubNotificationAuthorizer::granted()))
		.expect("fresh injector accepts the notification stub");
	injector
		.register_object_instance(Arc::new(MockCommunityClient::new()))
		.expect("fresh injector accepts the client mock");
	injector.seal();
	injector
}
