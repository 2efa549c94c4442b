//! Login, registration and logout against `/auth/*`

use crate::api::{ApiClient, ApiRequest, ResponseKind};
use crate::error::{Error, FieldError, Result};
use crate::i18n::Message;
use crate::session::{AuthTokens, Role, Session};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid email regex"));

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(Error::Validation(vec![FieldError::new(
                "credentials",
                "email and password are required",
            )]));
        }
        Ok(())
    }
}

/// Registration form, including the confirmation field that never leaves
/// the client
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterCredentials<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    password: &'a str,
}

impl RegisterForm {
    /// Validate every field, collecting all failures
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.first_name.trim().is_empty() {
            errors.push(FieldError::new("firstName", "first name is required"));
        }
        if self.last_name.trim().is_empty() {
            errors.push(FieldError::new("lastName", "last name is required"));
        }
        if self.email.trim().is_empty() {
            errors.push(FieldError::new("email", "email is required"));
        } else if !EMAIL_RE.is_match(self.email.trim()) {
            errors.push(FieldError::new("email", "email address is invalid"));
        }
        if self.password.is_empty() {
            errors.push(FieldError::new("password", "password is required"));
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                "password",
                format!("password must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        if self.password != self.confirm_password {
            errors.push(FieldError::new("confirmPassword", "passwords do not match"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

/// Body returned by `/auth/login` and `/auth/register`.
///
/// Both camelCase and snake_case spellings are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "accessToken", alias = "access_token")]
    pub access_token: String,
    #[serde(rename = "refreshToken", alias = "refresh_token", default)]
    pub refresh_token: String,
    pub email: String,
    pub role: Role,
}

/// Authentication endpoints bound to the shared client and session
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Session> {
        credentials.validate()?;

        let request = ApiRequest::post("/auth/login", ResponseKind::Json).json(credentials)?;
        let response: AuthResponse = self
            .client
            .send(request)
            .await?
            .into_json()
            .map_err(|e| match e {
                Error::HttpStatus { status: 401, .. } => Error::HttpStatus {
                    status: 401,
                    message: self
                        .client
                        .session()
                        .language()
                        .text(Message::LoginInvalid)
                        .to_string(),
                },
                other => other,
            })?;

        self.establish(response)
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<Session> {
        form.validate()?;

        let body = RegisterCredentials {
            first_name: form.first_name.trim(),
            last_name: form.last_name.trim(),
            email: form.email.trim(),
            password: &form.password,
        };
        let request = ApiRequest::post("/auth/register", ResponseKind::Json).json(&body)?;
        let response: AuthResponse = self.client.send(request).await?.into_json()?;

        self.establish(response)
    }

    /// Invalidate the session on the backend (best-effort) and clear it
    /// locally. Local state is always cleared.
    pub async fn logout(&self) -> Result<()> {
        if self.client.session().is_authenticated() {
            let request = ApiRequest::post("/auth/logout", ResponseKind::Empty);
            match self.client.send(request).await.and_then(|r| r.into_empty()) {
                Ok(()) => {}
                Err(e) => tracing::warn!(
                    error = %e,
                    "backend logout failed, clearing local session anyway"
                ),
            }
        }
        self.client.session().clear()
    }

    fn establish(&self, response: AuthResponse) -> Result<Session> {
        if response.access_token.is_empty() {
            return Err(Error::UnexpectedResponse {
                reason: "authentication response has no access token".to_string(),
            });
        }

        self.client.session().login(
            AuthTokens {
                access_token: response.access_token,
                refresh_token: response.refresh_token,
            },
            &response.email,
            response.role,
        )?;

        self.client
            .session()
            .current()
            .ok_or(Error::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::testing::{client_with, FakeTransport};
    use crate::api::{Method, RawResponse, RequestBody};
    use pretty_assertions::assert_eq;

    fn auth_body(role: &str) -> String {
        format!(
            r#"{{"accessToken":"acc","refreshToken":"ref","email":"jane@example.com","role":"{}"}}"#,
            role
        )
    }

    fn register_form() -> RegisterForm {
        RegisterForm {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@example.com".into(),
            password: "correct horse".into(),
            confirm_password: "correct horse".into(),
        }
    }

    #[tokio::test]
    async fn test_login_success_stores_session() {
        let transport = FakeTransport::new();
        transport.push(RawResponse::new(200, auth_body("ADMIN")));
        let (client, session) = client_with(transport.clone());
        let auth = AuthService::new(client);

        let result = auth
            .login(&LoginCredentials {
                email: "jane@example.com".into(),
                password: "secret".into(),
            })
            .await
            .unwrap();

        assert_eq!(result.email, "jane@example.com");
        assert!(session.is_authenticated());
        assert!(session.is_admin());
        assert_eq!(session.access_token().as_deref(), Some("acc"));

        let request = transport.last_request().unwrap();
        assert_eq!(request.method, Method::Post);
        assert!(request.url.ends_with("/api/auth/login"));
        match request.body {
            RequestBody::Json(v) => assert_eq!(v["email"], "jane@example.com"),
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_unauthorized_is_localized() {
        let transport = FakeTransport::new();
        transport.push(RawResponse::new(401, ""));
        let (client, session) = client_with(transport);
        let auth = AuthService::new(client);

        let err = auth
            .login(&LoginCredentials {
                email: "jane@example.com".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.client_message(), "Invalid email or password");
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_requires_credentials_without_request() {
        let transport = FakeTransport::new();
        let (client, _) = client_with(transport.clone());
        let auth = AuthService::new(client);

        let err = auth.login(&LoginCredentials::default()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_register_sends_camel_case_body() {
        let transport = FakeTransport::new();
        transport.push(RawResponse::new(201, auth_body("USER")));
        let (client, session) = client_with(transport.clone());
        let auth = AuthService::new(client);

        auth.register(&register_form()).await.unwrap();
        assert!(session.is_authenticated());
        assert!(!session.is_admin());

        let request = transport.last_request().unwrap();
        match request.body {
            RequestBody::Json(v) => {
                assert_eq!(v["firstName"], "Jane");
                assert_eq!(v["lastName"], "Doe");
                assert!(v.get("confirmPassword").is_none());
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_register_validation_collects_errors() {
        let form = RegisterForm {
            email: "not-an-email".into(),
            password: "short".into(),
            confirm_password: "different".into(),
            ..RegisterForm::default()
        };
        let err = form.validate().unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["firstName", "lastName", "email", "password", "confirmPassword"]
        );
    }

    #[test]
    fn test_register_validation_accepts_valid_form() {
        assert!(register_form().validate().is_ok());
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_backend_fails() {
        let transport = FakeTransport::new();
        transport.push(RawResponse::new(200, auth_body("USER")));
        transport.push(RawResponse::new(500, "boom"));
        let (client, session) = client_with(transport.clone());
        let auth = AuthService::new(client);

        auth.login(&LoginCredentials {
            email: "jane@example.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();
        auth.logout().await.unwrap();

        assert!(!session.is_authenticated());
        assert!(session.access_token().is_none());
        let logout = transport.last_request().unwrap();
        assert!(logout.url.ends_with("/api/auth/logout"));
        assert_eq!(logout.header("authorization"), Some("Bearer acc"));
    }

    #[test]
    fn test_auth_response_accepts_snake_case() {
        let response: AuthResponse = serde_json::from_str(
            r#"{"access_token":"a","refresh_token":"r","email":"e@x.io","role":"USER"}"#,
        )
        .unwrap();
        assert_eq!(response.access_token, "a");
        assert_eq!(response.role, Role::User);
    }
}
