//! Remote community-service client capability

use agora_di::InjectedIdentifier;
use async_trait::async_trait;

/// Identifier the session's remote client is registered under.
pub static COMMUNITY_CLIENT: InjectedIdentifier<dyn CommunityClient> =
	InjectedIdentifier::new("agora.client.community");

/// Errors from the remote client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
	/// The transport failed before a response was received.
	#[error("transport failure: {0}")]
	Transport(String),

	/// The backend rejected the request.
	#[error("request rejected with status {status}")]
	Rejected {
		/// Backend status code
		status: u16,
	},

	/// The session's credentials were not accepted.
	#[error("not authorized")]
	Unauthorized,
}

pub type ClientResult<T> = Result<T, ClientError>;

/// The remote-client surface the SDK consumes.
///
/// The concrete implementation (a gRPC-backed client in production) is
/// supplied by the host at session bootstrap and resolved through
/// [`COMMUNITY_CLIENT`]; SDK code never names a concrete client type.
#[async_trait]
pub trait CommunityClient: Send + Sync {
	/// Fetches the resource at `path`.
	async fn get(&self, path: &str) -> ClientResult<Vec<u8>>;

	/// Sends `body` to the resource at `path`.
	async fn post(&self, path: &str, body: &[u8]) -> ClientResult<Vec<u8>>;

	/// Whether the client currently holds a live connection.
	fn is_connected(&self) -> bool;
}
