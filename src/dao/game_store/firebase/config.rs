use super::error::{FirebaseDaoError, FirebaseResult};

/// Runtime configuration describing how to reach a Firebase Realtime Database.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Database root, e.g. `https://yobi-default-rtdb.firebaseio.com`.
    pub database_url: String,
    /// Database secret or ID token appended as the `auth` query parameter.
    pub auth_token: Option<String>,
}

impl FirebaseConfig {
    /// Construct a configuration for an unauthenticated database URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            auth_token: None,
        }
    }

    /// Attach a credential sent with every request.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> FirebaseResult<Self> {
        let database_url = std::env::var("FIREBASE_DATABASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or(FirebaseDaoError::MissingEnvVar {
                var: "FIREBASE_DATABASE_URL",
            })?;

        let mut config = Self::new(database_url);
        if let Some(token) = std::env::var("FIREBASE_AUTH_TOKEN")
            .ok()
            .filter(|value| !value.is_empty())
        {
            config = config.with_auth_token(token);
        }

        Ok(config)
    }
}
