use cirrus_provisioner::BoxFuture;

use crate::error::ArmError;

/// Source of bearer tokens for `https://management.azure.com/.default`.
///
/// Called before every request; implementations cache and refresh.
pub trait TokenCredential: Send + Sync {
    fn token(&self) -> BoxFuture<'_, Result<String, ArmError>>;
}

/// A pre-acquired token, e.g. from `az account get-access-token`.
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Read the token from an environment variable.
    pub fn from_env(var: &str) -> Result<Self, ArmError> {
        match std::env::var(var) {
            Ok(token) if !token.is_empty() => Ok(Self::new(token)),
            _ => Err(ArmError::Credential(format!("{var} is not set"))),
        }
    }
}

impl TokenCredential for StaticToken {
    fn token(&self) -> BoxFuture<'_, Result<String, ArmError>> {
        Box::pin(async move { Ok(self.token.clone()) })
    }
}
