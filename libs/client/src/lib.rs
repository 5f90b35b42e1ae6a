//! HTTP client for the auth and API services
//!
//! Every call that needs a user takes a [`Session`] explicitly; an expired
//! session fails before any request is sent.

pub mod error;
pub mod models;
pub mod session;

use reqwest::{
    Client, RequestBuilder, Response,
    multipart::{Form, Part},
};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

pub use crate::{
    error::{ClientError, ClientResult},
    session::{Claims, Session},
};
use crate::models::{
    Availability, AvatarResponse, Document, DocumentUpdate, ErrorBody, FavoriteResponse,
    LoginRequest, NewDocument, Profile, ProfileUpdate, SignupRequest, SignupResponse,
    TokenResponse,
};

/// Client for the auth service and the document/profile API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    auth_url: String,
    api_url: String,
}

impl ApiClient {
    /// `auth_url` and `api_url` are service roots such as `http://localhost:5001`
    pub fn new(auth_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), auth_url, api_url)
    }

    pub fn with_client(
        http: Client,
        auth_url: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            auth_url: auth_url.into().trim_end_matches('/').to_string(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn auth(&self, path: &str) -> String {
        format!("{}{}", self.auth_url, path)
    }

    fn api(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn document_url(&self, id: Uuid) -> String {
        self.api(&format!("/api/docs/my-docs/{id}"))
    }

    // Auth service

    /// Register and start a session with the returned token
    pub async fn signup(&self, request: &SignupRequest) -> ClientResult<Session> {
        let response: SignupResponse =
            send_json(self.http.post(self.auth("/api/signup")).json(request)).await?;
        Session::from_token(response.token)
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: TokenResponse =
            send_json(self.http.post(self.auth("/api/login")).json(&request)).await?;
        Session::from_token(response.token)
    }

    pub async fn username_available(&self, username: &str) -> ClientResult<bool> {
        let response: Availability = send_json(
            self.http
                .get(self.auth("/api/check-username"))
                .query(&[("username", username)]),
        )
        .await?;
        Ok(response.available)
    }

    // Documents

    pub async fn list_documents(&self, session: &Session) -> ClientResult<Vec<Document>> {
        let token = session.bearer()?;
        send_json(
            self.http
                .get(self.api("/api/docs/my-docs"))
                .bearer_auth(token),
        )
        .await
    }

    pub async fn get_document(&self, session: &Session, id: Uuid) -> ClientResult<Document> {
        let token = session.bearer()?;
        send_json(self.http.get(self.document_url(id)).bearer_auth(token)).await
    }

    pub async fn create_document(
        &self,
        session: &Session,
        document: &NewDocument,
    ) -> ClientResult<Document> {
        let token = session.bearer()?;
        send_json(
            self.http
                .post(self.api("/api/docs/my-docs"))
                .bearer_auth(token)
                .json(document),
        )
        .await
    }

    pub async fn update_document(
        &self,
        session: &Session,
        id: Uuid,
        update: &DocumentUpdate,
    ) -> ClientResult<Document> {
        let token = session.bearer()?;
        send_json(
            self.http
                .put(self.document_url(id))
                .bearer_auth(token)
                .json(update),
        )
        .await
    }

    /// Flip the favorite flag; returns the new value
    pub async fn toggle_favorite(&self, session: &Session, id: Uuid) -> ClientResult<bool> {
        let token = session.bearer()?;
        let response: FavoriteResponse = send_json(
            self.http
                .patch(format!("{}/favorite", self.document_url(id)))
                .bearer_auth(token),
        )
        .await?;
        Ok(response.favorite)
    }

    /// Delete `document` once the user has re-typed its name
    pub async fn delete_document(
        &self,
        session: &Session,
        document: &Document,
        typed_name: &str,
    ) -> ClientResult<()> {
        if typed_name.trim() != document.name.trim() {
            return Err(ClientError::ConfirmationMismatch);
        }
        let token = session.bearer()?;

        send(
            self.http
                .delete(self.document_url(document.id))
                .query(&[("confirm", typed_name)])
                .bearer_auth(token),
        )
        .await?;
        Ok(())
    }

    // Profile

    pub async fn profile(&self, session: &Session) -> ClientResult<Profile> {
        let token = session.bearer()?;
        send_json(self.http.get(self.api("/api/profile")).bearer_auth(token)).await
    }

    pub async fn update_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> ClientResult<Profile> {
        let token = session.bearer()?;
        send_json(
            self.http
                .put(self.api("/api/profile"))
                .bearer_auth(token)
                .json(update),
        )
        .await
    }

    /// Upload an already cropped avatar image
    pub async fn upload_avatar(
        &self,
        session: &Session,
        image: Vec<u8>,
        file_name: &str,
        mime: &str,
    ) -> ClientResult<AvatarResponse> {
        let token = session.bearer()?;
        let part = Part::bytes(image)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        send_json(
            self.http
                .put(self.api("/api/profile/upload"))
                .bearer_auth(token)
                .multipart(Form::new().part("profileImage", part)),
        )
        .await
    }
}

/// Send and turn non-2xx responses into `ClientError::Api`
async fn send(request: RequestBuilder) -> ClientResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!("Request failed with {}: {}", status, body);
    let (kind, message) = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(error) => (error.kind, error.message),
        Err(_) if body.trim().is_empty() => (
            "unknown".to_string(),
            status.canonical_reason().unwrap_or("Request failed").to_string(),
        ),
        Err(_) => ("unknown".to_string(), body),
    };

    Err(ClientError::Api {
        status: status.as_u16(),
        kind,
        message,
    })
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
    Ok(send(request).await?.json().await?)
}
