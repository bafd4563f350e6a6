use std::rc::Rc;
use yew::prelude::*;

use crate::models::User;
use crate::services::api::{ApiClient, ApiError};
use crate::services::storage::{Storage, KEY_AUTH_TOKEN, KEY_USER_DATA};

pub const LOGIN_FAILED: &str = "Login failed. Please try again.";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    /// False until the stored session has been inspected once.
    pub restored: bool,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

pub enum AuthAction {
    Restore(Option<User>),
    LoggedIn(User),
    LoggedOut,
}

impl Reducible for AuthState {
    type Action = AuthAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let user = match action {
            AuthAction::Restore(user) => user,
            AuthAction::LoggedIn(user) => Some(user),
            AuthAction::LoggedOut => None,
        };
        Rc::new(AuthState { user, restored: true })
    }
}

pub type AuthContext = UseReducerHandle<AuthState>;

/// Reads the persisted session. Inconsistent leftovers are removed so the
/// next start sees a clean slate.
pub fn restore<S: Storage>(storage: &S) -> Option<User> {
    let _token = storage.get_item(KEY_AUTH_TOKEN).filter(|t| !t.is_empty())?;

    let raw = match storage.get_item(KEY_USER_DATA) {
        Some(raw) => raw,
        None => {
            tracing::info!("token without user data, discarding session");
            storage.remove_item(KEY_AUTH_TOKEN);
            return None;
        }
    };

    match serde_json::from_str::<User>(&raw) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!(error = %e, "malformed user data, discarding session");
            storage.remove_item(KEY_AUTH_TOKEN);
            storage.remove_item(KEY_USER_DATA);
            None
        }
    }
}

/// Signs in and persists the session. The error string is what the login
/// form shows.
pub async fn login<S: Storage>(
    client: &ApiClient<S>,
    email: &str,
    password: &str,
) -> Result<User, String> {
    let data = client.sign_in(email.trim(), password).await.map_err(|e| match e {
        ApiError::Http { message, .. } => message,
        other => {
            tracing::warn!(error = %other, "sign-in failed");
            LOGIN_FAILED.to_string()
        }
    })?;

    let user = User { full_name: data.full_name, email: data.email };
    let storage = client.storage();
    storage.set_item(KEY_AUTH_TOKEN, &data.access_token);
    storage.set(KEY_USER_DATA, &user);
    tracing::info!(email = %user.email, "signed in");
    Ok(user)
}

/// Server-side logout is best effort; local credentials are always cleared.
pub async fn logout<S: Storage>(client: &ApiClient<S>) {
    if let Err(e) = client.logout().await {
        tracing::error!(error = %e, "logout request failed");
    }
    let storage = client.storage();
    storage.remove_item(KEY_AUTH_TOKEN);
    storage.remove_item(KEY_USER_DATA);
    tracing::info!("signed out");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStorage;

    const USER_JSON: &str = r#"{"fullName":"Jane Smith","email":"jane@example.com"}"#;

    #[test]
    fn restores_a_valid_session() {
        let store = MemoryStorage::with(&[(KEY_AUTH_TOKEN, "tok"), (KEY_USER_DATA, USER_JSON)]);
        let user = restore(&store).expect("session");
        assert_eq!(user.full_name, "Jane Smith");
        assert!(store.contains(KEY_AUTH_TOKEN));
    }

    #[test]
    fn no_token_means_no_session() {
        let store = MemoryStorage::with(&[(KEY_USER_DATA, USER_JSON)]);
        assert_eq!(restore(&store), None);
    }

    #[test]
    fn token_without_user_data_is_discarded() {
        let store = MemoryStorage::with(&[(KEY_AUTH_TOKEN, "tok")]);
        assert_eq!(restore(&store), None);
        assert!(!store.contains(KEY_AUTH_TOKEN));
    }

    #[test]
    fn malformed_user_data_clears_both_keys() {
        let store = MemoryStorage::with(&[(KEY_AUTH_TOKEN, "tok"), (KEY_USER_DATA, "{not json")]);
        assert_eq!(restore(&store), None);
        assert!(!store.contains(KEY_AUTH_TOKEN));
        assert!(!store.contains(KEY_USER_DATA));
    }

    #[test]
    fn reducer_tracks_login_and_logout() {
        let state = Rc::new(AuthState::default());
        assert!(!state.restored);

        let user = User { full_name: "Jane".into(), email: "j@x.io".into() };
        let state = state.reduce(AuthAction::LoggedIn(user));
        assert!(state.is_authenticated());
        assert!(state.restored);

        let state = state.reduce(AuthAction::LoggedOut);
        assert!(!state.is_authenticated());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test]
    async fn login_persists_token_and_profile() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/auth/signin")
            .with_status(200)
            .with_body(
                r#"{"statusCode":200,"data":{"fullName":"Jane Smith","email":"jane@example.com","accessToken":"tok-9"},"message":"ok","success":true}"#,
            )
            .create_async()
            .await;

        let store = MemoryStorage::default();
        let client = ApiClient::new(&server.url(), store.clone());
        let user = login(&client, " jane@example.com ", "pw").await.unwrap();

        assert_eq!(user.email, "jane@example.com");
        assert_eq!(store.get_item(KEY_AUTH_TOKEN).as_deref(), Some("tok-9"));
        assert_eq!(restore(&store), Some(user));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test]
    async fn bad_credentials_show_the_server_message() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/auth/signin")
            .with_status(401)
            .with_body(r#"{"message":"Invalid email or password","success":false}"#)
            .create_async()
            .await;

        let store = MemoryStorage::default();
        let client = ApiClient::new(&server.url(), store.clone());
        let err = login(&client, "jane@example.com", "wrong").await.unwrap_err();

        assert_eq!(err, "Invalid email or password");
        assert!(!store.contains(KEY_AUTH_TOKEN));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test]
    async fn login_failure_without_server_message_is_generic() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("POST", "/auth/signin").with_status(200).with_body("nope").create_async().await;

        let client = ApiClient::new(&server.url(), MemoryStorage::default());
        let err = login(&client, "a@b.c", "pw").await.unwrap_err();
        assert_eq!(err, LOGIN_FAILED);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test]
    async fn logout_clears_storage_even_when_server_fails() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("POST", "/auth/logout").with_status(500).create_async().await;

        let store = MemoryStorage::with(&[(KEY_AUTH_TOKEN, "tok"), (KEY_USER_DATA, USER_JSON)]);
        let client = ApiClient::new(&server.url(), store.clone());
        logout(&client).await;

        assert!(!store.contains(KEY_AUTH_TOKEN));
        assert!(!store.contains(KEY_USER_DATA));
    }
}
