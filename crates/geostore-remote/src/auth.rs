use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, RemoteResult};

/// How requests identify themselves to the remote filesystem.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthenticationStrategy {
    #[default]
    Anonymous,
    UserCredentials { username: String },
}

impl AuthenticationStrategy {
    /// Authenticate as `username`.
    ///
    /// Fails with `NullArgument` when no username is given and with
    /// `EmptyArgument` when it is the empty string.
    pub fn user_credentials(username: Option<&str>) -> RemoteResult<Self> {
        match username {
            None => Err(RemoteError::NullArgument("username")),
            Some("") => Err(RemoteError::EmptyArgument("username")),
            Some(name) => Ok(Self::UserCredentials {
                username: name.to_string(),
            }),
        }
    }

    pub fn user(username: &str) -> RemoteResult<Self> {
        Self::user_credentials(Some(username))
    }

    /// Query-string fragment appended to every request URL.
    ///
    /// Empty for anonymous access.
    pub fn request(&self) -> String {
        match self {
            Self::Anonymous => String::new(),
            Self::UserCredentials { username } => format!("user.name={username}"),
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::UserCredentials { username } => Some(username),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::UserCredentials { .. } => "user-credentials",
        }
    }

    /// Re-check a strategy that was deserialized rather than constructed.
    pub fn validate(&self) -> RemoteResult<()> {
        match self {
            Self::UserCredentials { username } if username.is_empty() => {
                Err(RemoteError::EmptyArgument("username"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_credentials_request_fragment() {
        let auth = AuthenticationStrategy::user_credentials(Some("alice")).unwrap();
        assert_eq!(auth.request(), "user.name=alice");
        assert_eq!(auth.username(), Some("alice"));
        assert!(auth.is_authenticated());
    }

    #[test]
    fn missing_username_is_null_argument() {
        assert!(matches!(
            AuthenticationStrategy::user_credentials(None),
            Err(RemoteError::NullArgument("username"))
        ));
    }

    #[test]
    fn empty_username_is_empty_argument() {
        assert!(matches!(
            AuthenticationStrategy::user_credentials(Some("")),
            Err(RemoteError::EmptyArgument("username"))
        ));
        assert!(matches!(
            AuthenticationStrategy::user(""),
            Err(RemoteError::EmptyArgument(_))
        ));
    }

    #[test]
    fn anonymous_has_empty_fragment() {
        let auth = AuthenticationStrategy::default();
        assert_eq!(auth, AuthenticationStrategy::Anonymous);
        assert_eq!(auth.request(), "");
        assert!(!auth.is_authenticated());
        assert_eq!(auth.display_name(), "anonymous");
    }

    #[test]
    fn serde_shape() {
        let auth = AuthenticationStrategy::user("hdfs").unwrap();
        let json = serde_json::to_string(&auth).unwrap();
        assert_eq!(json, r#"{"type":"user_credentials","username":"hdfs"}"#);
        let back: AuthenticationStrategy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, auth);
    }

    #[test]
    fn validate_rejects_deserialized_empty_username() {
        let auth: AuthenticationStrategy =
            serde_json::from_str(r#"{"type":"user_credentials","username":""}"#).unwrap();
        assert!(matches!(auth.validate(), Err(RemoteError::EmptyArgument(_))));
        assert!(AuthenticationStrategy::Anonymous.validate().is_ok());
    }
}
