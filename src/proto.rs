//! SKAS login protocol, version `v1`.

use std::fmt;

use reqwest::Method;
use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = "v1";

/// Endpoint descriptor of a protocol exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub name: &'static str,
    pub method: Method,
    pub url_path: &'static str,
    pub kind: &'static str,
}

/// Password check endpoint.
pub static LOGIN_META: RequestMeta = RequestMeta {
    name: "login",
    method: Method::POST,
    url_path: "/v1/login",
    kind: "LoginRequest",
};

/// Header carried by every message.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtoHeader {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
}

impl ProtoHeader {
    /// Create a header for a message of `kind`.
    pub fn new(kind: &str) -> Self {
        Self {
            api_version: API_VERSION.to_owned(),
            kind: kind.to_owned(),
        }
    }
}

/// Credentials authenticating the connector itself against the provider.
#[derive(Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAuth {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub secret: String,
}

impl fmt::Debug for ClientAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientAuth")
            .field("id", &self.id)
            .field("secret", &"***")
            .finish()
    }
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(flatten)]
    pub header: ProtoHeader,
    pub client_auth: ClientAuth,
    pub login: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(client_auth: ClientAuth, login: &str, password: &str) -> Self {
        Self {
            header: ProtoHeader::new(LOGIN_META.kind),
            client_auth,
            login: login.to_owned(),
            password: password.to_owned(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("header", &self.header)
            .field("client_auth", &self.client_auth)
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

/// Verdict of the provider.
///
/// Any field may be omitted or `null` on the wire and then takes its zero
/// value, so a bare header reads as a rejection.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(flatten)]
    pub header: ProtoHeader,
    #[serde(default, deserialize_with = "nullable")]
    pub success: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub login: String,
    #[serde(default, deserialize_with = "nullable")]
    pub uid: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub common_names: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub emails: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub groups: Vec<String>,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_wire_format() {
        let auth = ClientAuth {
            id: "dex".into(),
            secret: "s3cr3t".into(),
        };
        let request = LoginRequest::new(auth, "alice", "pa55");

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "apiVersion": "v1",
                "kind": "LoginRequest",
                "clientAuth": { "id": "dex", "secret": "s3cr3t" },
                "login": "alice",
                "password": "pa55",
            })
        );
    }

    #[test]
    fn test_debug_hides_secrets() {
        let auth = ClientAuth {
            id: "dex".into(),
            secret: "s3cr3t".into(),
        };
        let request = LoginRequest::new(auth, "alice", "pa55");

        let debug = format!("{request:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("s3cr3t"));
        assert!(!debug.contains("pa55"));
    }

    #[test]
    fn test_login_response_with_null_sequences() {
        let body = r#"{
            "apiVersion": "v1",
            "kind": "LoginResponse",
            "success": true,
            "login": "bob",
            "uid": 1001,
            "commonNames": null,
            "groups": ["dev"]
        }"#;

        let response: LoginResponse = serde_json::from_str(body).unwrap();
        assert!(response.success);
        assert_eq!(response.uid, 1001);
        assert!(response.common_names.is_empty());
        assert!(response.emails.is_empty());
        assert_eq!(response.groups, vec!["dev"]);
        assert_eq!(response.header.kind, "LoginResponse");
    }

    #[test]
    fn test_failed_response_is_minimal() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"success": false}"#).unwrap();

        assert!(!response.success);
        assert_eq!(response, LoginResponse::default());
    }

    #[test]
    fn test_header_only_response_is_a_rejection() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"apiVersion":"v1","kind":"LoginResponse"}"#)
                .unwrap();

        assert!(!response.success);
        assert_eq!(response.header.kind, "LoginResponse");
        assert_eq!(response.uid, 0);
        assert!(response.login.is_empty());
    }

    #[test]
    fn test_null_scalars_take_zero_values() {
        let response: LoginResponse = serde_json::from_str(
            r#"{"success":false,"uid":null,"login":null}"#,
        )
        .unwrap();
        assert_eq!(response, LoginResponse::default());

        let response: LoginResponse =
            serde_json::from_str(r#"{"success":null,"login":"bob"}"#).unwrap();
        assert!(!response.success);
        assert_eq!(response.login, "bob");
    }
}
