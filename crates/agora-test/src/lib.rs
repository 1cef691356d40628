//! # Agora test harness
//!
//! Mock capability providers and rstest fixtures for SDK and host-app test
//! suites. Mocks register through the identical
//! [`register_instance`]/[`register_object_instance`] path production
//! bootstrap uses, so a test resolving [`SECURED_STORE`] exercises the
//! same registry code as a device build; only the provider behind the
//! identifier differs.
//!
//! [`register_instance`]: agora_di::Injector::register_instance
//! [`register_object_instance`]: agora_di::Injector::register_object_instance
//! [`SECURED_STORE`]: agora_services::SECURED_STORE

pub mod fixtures;
pub mod mocks;

pub use fixtures::mock_injector;
pub use mocks::{MemorySecuredStore, MockCommunityClient, StubNotificationAuthorizer};
