//! Identity resolution for connecting users.
//!
//! The `connect` frame names a numeric user id; something has to turn
//! that into a display name (and could reject it outright). That
//! something is an [`Identity`] implementation. The bundled
//! [`TrustedIdentity`] accepts every id and derives a guest name from it
//! — real authentication sits behind this trait, out of scope here.

use wolfpack_protocol::UserId;

/// Why an identity was rejected.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("unknown user {0}")]
    UnknownUser(UserId),
}

/// Resolves a connecting user id to a username, or rejects it.
///
/// Roster entries take precedence over this resolver — the gateway only
/// asks an `Identity` for users it cannot find in the room's roster.
pub trait Identity: Send + Sync + 'static {
    fn resolve(
        &self,
        user: UserId,
    ) -> impl std::future::Future<Output = Result<String, IdentityError>> + Send;
}

/// Accepts any user id and names it `guest-{id}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustedIdentity;

impl Identity for TrustedIdentity {
    async fn resolve(&self, user: UserId) -> Result<String, IdentityError> {
        Ok(format!("guest-{}", user.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trusted_identity_accepts_any_id() {
        let name = TrustedIdentity.resolve(UserId(42)).await.unwrap();
        assert_eq!(name, "guest-42");
    }
}
