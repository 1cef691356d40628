//! Mock capability providers

use agora_di::{InjectableObject, InjectedIdentifier};
use agora_services::client::{COMMUNITY_CLIENT, ClientError, ClientResult, CommunityClient};
use agora_services::notifications::{
	AuthorizationStatus, NOTIFICATION_AUTHORIZATION, NotificationAuthorizing, NotificationResult,
};
use agora_services::storage::{SECURED_STORE, SecuredStore, StoreResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory stand-in for the platform's secured key/value store.
#[derive(Default)]
pub struct MemorySecuredStore {
	items: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySecuredStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of stored items; handy for teardown assertions.
	pub fn len(&self) -> usize {
		self.items.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.read().is_empty()
	}
}

#[async_trait]
impl SecuredStore for MemorySecuredStore {
	async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
		Ok(self.items.read().get(key).cloned())
	}

	async fn set(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
		self.items.write().insert(key.to_string(), value);
		Ok(())
	}

	async fn remove(&self, key: &str) -> StoreResult<()> {
		self.items.write().remove(key);
		Ok(())
	}
}

impl InjectableObject for MemorySecuredStore {
	type Capability = dyn SecuredStore;

	fn identifier() -> &'static InjectedIdentifier<dyn SecuredStore> {
		&SECURED_STORE
	}

	fn into_capability(self: Arc<Self>) -> Arc<dyn SecuredStore> {
		self
	}
}

/// Notification backend stub reporting one fixed authorization status.
pub struct StubNotificationAuthorizer {
	status: AuthorizationStatus,
}

impl StubNotificationAuthorizer {
	pub fn new(status: AuthorizationStatus) -> Self {
		Self { status }
	}

	/// A stub that reports notifications as granted.
	pub fn granted() -> Self {
		Self::new(AuthorizationStatus::Authorized)
	}

	/// A stub that reports notifications as declined.
	pub fn denied() -> Self {
		Self::new(AuthorizationStatus::Denied)
	}
}

#[async_trait]
impl NotificationAuthorizing for StubNotificationAuthorizer {
	fn status(&self) -> AuthorizationStatus {
		self.status
	}

	async fn request_authorization(&self) -> NotificationResult<bool> {
		Ok(self.status.allows_delivery())
	}
}

impl InjectableObject for StubNotificationAuthorizer {
	type Capability = dyn NotificationAuthorizing;

	fn identifier() -> &'static InjectedIdentifier<dyn NotificationAuthorizing> {
		&NOTIFICATION_AUTHORIZATION
	}

	fn into_capability(self: Arc<Self>) -> Arc<dyn NotificationAuthorizing> {
		self
	}
}

/// Remote client mock serving canned responses and recording requests.
#[derive(Default)]
pub struct MockCommunityClient {
	responses: RwLock<HashMap<String, Vec<u8>>>,
	requests: RwLock<Vec<String>>,
}

impl MockCommunityClient {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a canned response for `path`. Paths without a canned
	/// response fail with a transport error.
	pub fn with_response(self, path: &str, body: impl Into<Vec<u8>>) -> Self {
		self.responses.write().insert(path.to_string(), body.into());
		self
	}

	/// Every path requested so far, in order.
	pub fn requests(&self) -> Vec<String> {
		self.requests.read().clone()
	}

	fn canned(&self, path: &str) -> ClientResult<Vec<u8>> {
		self.requests.write().push(path.to_string());
		self.responses
			.read()
			.get(path)
			.cloned()
			.ok_or_else(|| ClientError::Transport(format!("no canned response for `{path}`")))
	}
}

#[async_trait]
impl CommunityClient for MockCommunityClient {
	async fn get(&self, path: &str) -> ClientResult<Vec<u8>> {
		self.canned(path)
	}

	async fn post(&self, path: &str, _body: &[u8]) -> ClientResult<Vec<u8>> {
		self.canned(path)
	}

	fn is_connected(&self) -> bool {
		true
	}
}

impl InjectableObject for MockCommunityClient {
	type Capability = dyn CommunityClient;

	fn identifier() -> &'static InjectedIdentifier<dyn CommunityClient> {
		&COMMUNITY_CLIENT
	}

	fn into_capability(self: Arc<Self>) -> Arc<dyn CommunityClient> {
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn memory_store_round_trips_values() {
		let store = MemorySecuredStore::new();

		store.set("token", b"abc".to_vec()).await.unwrap();

		assert_eq!(store.get("token").await.unwrap(), Some(b"abc".to_vec()));
		assert_eq!(store.len(), 1);
	}

	#[tokio::test]
	async fn memory_store_remove_is_idempotent() {
		let store = MemorySecuredStore::new();
		store.set("token", b"abc".to_vec()).await.unwrap();

		store.remove("token").await.unwrap();
		store.remove("token").await.unwrap();

		assert_eq!(store.get("token").await.unwrap(), None);
		assert!(store.is_empty());
	}

	#[tokio::test]
	async fn stub_authorizer_reports_its_fixed_status() {
		let granted = StubNotificationAuthorizer::granted();
		let denied = StubNotificationAuthorizer::denied();

		assert_eq!(granted.status(), AuthorizationStatus::Authorized);
		assert!(granted.request_authorization().await.unwrap());
		assert_eq!(denied.status(), AuthorizationStatus::Denied);
		assert!(!denied.request_authorization().await.unwrap());
	}

	#[tokio::test]
	async fn mock_client_serves_canned_responses_and_records_requests() {
		let client = MockCommunityClient::new().with_response("/feed", b"posts".to_vec());

		let body = client.get("/feed").await.unwrap();
		let missing = client.get("/absent").await;

		assert_eq!(body, b"posts".to_vec());
		assert!(matches!(missing, Err(ClientError::Transport(_))));
		assert_eq!(client.requests(), vec!["/feed", "/absent"]);
	}
}
