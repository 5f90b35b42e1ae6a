//! API service routes

use std::path::Path;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    response::IntoResponse,
    routing::{get, patch, put},
};
use common::middleware::require_auth;
use tower_http::services::ServeDir;

use crate::AppState;

pub mod documents;
pub mod profile;

/// Create the router for the API service
pub fn create_router(state: AppState, uploads_dir: &Path, max_avatar_bytes: usize) -> Router {
    let protected_routes = Router::new()
        .route(
            "/api/docs/my-docs",
            get(documents::list_documents).post(documents::create_document),
        )
        .route(
            "/api/docs/my-docs/:id",
            get(documents::get_document)
                .put(documents::update_document)
                .delete(documents::delete_document),
        )
        .route(
            "/api/docs/my-docs/:id/favorite",
            patch(documents::toggle_favorite),
        )
        .route(
            "/api/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route(
            "/api/profile/upload",
            put(profile::upload_avatar).layer(DefaultBodyLimit::max(max_avatar_bytes)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.jwt_service.clone(),
            require_auth,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    common::http::health_body("api-service")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        avatar::AvatarStore,
        models::{
            document::{Document, FavoriteResponse},
            profile::{AvatarResponse, ProfileResponse},
        },
        repositories::memory::MemoryDocumentRepository,
    };
    use axum::http::{HeaderName, HeaderValue, StatusCode, header::AUTHORIZATION};
    use axum_test::{
        TestServer,
        multipart::{MultipartForm, Part},
    };
    use common::{
        jwt::{DEFAULT_TOKEN_EXPIRY, JwtConfig, JwtService},
        users::{NewUser, User, UserRepository, memory::MemoryUserRepository},
    };
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Harness {
        server: TestServer,
        users: Arc<MemoryUserRepository>,
        documents: Arc<MemoryDocumentRepository>,
        jwt: JwtService,
        uploads: TempDir,
    }

    impl Harness {
        fn new() -> Self {
            let uploads = tempfile::tempdir().unwrap();
            let users = Arc::new(MemoryUserRepository::new());
            let documents = Arc::new(MemoryDocumentRepository::new());
            let jwt = JwtService::new(JwtConfig {
                secret: "api-routes-secret".to_string(),
                token_expiry: DEFAULT_TOKEN_EXPIRY,
            });
            let state = AppState {
                user_repository: users.clone(),
                document_repository: documents.clone(),
                jwt_service: jwt.clone(),
                avatar_store: AvatarStore::new(uploads.path()),
            };

            Self {
                server: TestServer::new(create_router(state, uploads.path(), 1024 * 1024))
                    .unwrap(),
                users,
                documents,
                jwt,
                uploads,
            }
        }

        async fn user(&self, username: &str) -> (User, (HeaderName, HeaderValue)) {
            let user = self
                .users
                .create(NewUser {
                    username: username.to_string(),
                    email: format!("{username}@x.com"),
                    password_hash: "$2b$10$hash".to_string(),
                    first_name: String::new(),
                    last_name: String::new(),
                    date_of_birth: None,
                    gender: None,
                })
                .await
                .unwrap();
            let token = self
                .jwt
                .generate_token(user.id, &user.email, &user.username)
                .unwrap();
            let header = HeaderValue::from_str(&format!("Bearer {token}")).unwrap();
            (user, (AUTHORIZATION, header))
        }

        async fn create_doc(&self, auth: &(HeaderName, HeaderValue), name: &str) -> Document {
            let response = self
                .server
                .post("/api/docs/my-docs")
                .add_header(auth.0.clone(), auth.1.clone())
                .json(&json!({"name": name, "content": {"ops": [{"insert": "hi"}]}}))
                .await;
            response.assert_status(StatusCode::CREATED);
            response.json()
        }
    }

    fn png_form() -> MultipartForm {
        MultipartForm::new().add_part(
            "profileImage",
            Part::bytes(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])
                .file_name("avatar.png")
                .mime_type("image/png"),
        )
    }

    #[tokio::test]
    async fn health_is_public() {
        let h = Harness::new();
        h.server.get("/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let h = Harness::new();
        h.server
            .get("/api/docs/my-docs")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        h.server
            .get("/api/profile")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn list_returns_only_own_documents_newest_first() {
        let h = Harness::new();
        let (_, ana) = h.user("ana").await;
        let (_, bob) = h.user("bob").await;

        let first = h.create_doc(&ana, "first").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = h.create_doc(&ana, "second").await;
        h.create_doc(&bob, "bobs").await;

        let listed: Vec<Document> = h
            .server
            .get("/api/docs/my-docs")
            .add_header(ana.0, ana.1)
            .await
            .json();
        let ids: Vec<_> = listed.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn favorite_toggles_back_and_forth() {
        let h = Harness::new();
        let (_, ana) = h.user("ana").await;
        let doc = h.create_doc(&ana, "notes").await;
        let url = format!("/api/docs/my-docs/{}/favorite", doc.id);

        let on: FavoriteResponse = h
            .server
            .patch(&url)
            .add_header(ana.0.clone(), ana.1.clone())
            .await
            .json();
        assert!(on.favorite);
        assert_eq!(on.id, doc.id);

        let off: FavoriteResponse = h
            .server
            .patch(&url)
            .add_header(ana.0, ana.1)
            .await
            .json();
        assert!(!off.favorite);
    }

    #[tokio::test]
    async fn other_users_documents_look_missing() {
        let h = Harness::new();
        let (_, ana) = h.user("ana").await;
        let (_, bob) = h.user("bob").await;
        let doc = h.create_doc(&ana, "private").await;
        let url = format!("/api/docs/my-docs/{}", doc.id);

        h.server
            .get(&url)
            .add_header(bob.0.clone(), bob.1.clone())
            .await
            .assert_status(StatusCode::NOT_FOUND);
        h.server
            .put(&url)
            .add_header(bob.0.clone(), bob.1.clone())
            .json(&json!({"name": "stolen"}))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        h.server
            .patch(&format!("{url}/favorite"))
            .add_header(bob.0.clone(), bob.1.clone())
            .await
            .assert_status(StatusCode::NOT_FOUND);
        h.server
            .delete(&url)
            .add_header(bob.0, bob.1)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let still_there: Document = h.server.get(&url).add_header(ana.0, ana.1).await.json();
        assert_eq!(still_there.name, "private");
        assert!(!still_there.favorite);
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let h = Harness::new();
        let (_, ana) = h.user("ana").await;
        let doc = h.create_doc(&ana, "draft").await;

        let updated: Document = h
            .server
            .put(&format!("/api/docs/my-docs/{}", doc.id))
            .add_header(ana.0.clone(), ana.1.clone())
            .json(&json!({"name": "final"}))
            .await
            .json();
        assert_eq!(updated.name, "final");
        assert_eq!(updated.content, doc.content);

        h.server
            .put(&format!("/api/docs/my-docs/{}", doc.id))
            .add_header(ana.0, ana.1)
            .json(&json!({}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_requires_a_name() {
        let h = Harness::new();
        let (_, ana) = h.user("ana").await;
        h.server
            .post("/api/docs/my-docs")
            .add_header(ana.0, ana.1)
            .json(&json!({"name": "  "}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(h.documents.len().await, 0);
    }

    #[tokio::test]
    async fn delete_with_wrong_confirmation_keeps_document() {
        let h = Harness::new();
        let (_, ana) = h.user("ana").await;
        let doc = h.create_doc(&ana, "Report").await;
        let url = format!("/api/docs/my-docs/{}", doc.id);

        let response = h
            .server
            .delete(&url)
            .add_query_param("confirm", "report")
            .add_header(ana.0.clone(), ana.1.clone())
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(h.documents.len().await, 1);

        h.server
            .delete(&url)
            .add_query_param("confirm", "Report")
            .add_header(ana.0.clone(), ana.1.clone())
            .await
            .assert_status_ok();
        assert_eq!(h.documents.len().await, 0);

        h.server
            .get(&url)
            .add_header(ana.0, ana.1)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn profile_update_is_partial() {
        let h = Harness::new();
        let (user, ana) = h.user("ana").await;

        let profile: ProfileResponse = h
            .server
            .put("/api/profile")
            .add_header(ana.0.clone(), ana.1.clone())
            .json(&json!({"firstName": " Ana ", "dateOfBirth": "1990-04-02"}))
            .await
            .json();
        assert_eq!(profile.id, user.id);
        assert_eq!(profile.first_name, "Ana");
        assert_eq!(profile.last_name, "");
        assert_eq!(profile.date_of_birth.unwrap().to_string(), "1990-04-02");

        let fetched: ProfileResponse = h
            .server
            .get("/api/profile")
            .add_header(ana.0.clone(), ana.1.clone())
            .await
            .json();
        assert_eq!(fetched.first_name, "Ana");

        h.server
            .put("/api/profile")
            .add_header(ana.0, ana.1)
            .json(&json!({}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn avatar_upload_replaces_previous_file() {
        let h = Harness::new();
        let (user, ana) = h.user("ana").await;

        let first: AvatarResponse = h
            .server
            .put("/api/profile/upload")
            .add_header(ana.0.clone(), ana.1.clone())
            .multipart(png_form())
            .await
            .json();
        assert!(first.profile_image.starts_with("/uploads/avatars/"));
        let first_path = h
            .uploads
            .path()
            .join(first.profile_image.trim_start_matches("/uploads/"));
        assert!(first_path.exists());

        h.server.get(&first.profile_image).await.assert_status_ok();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second: AvatarResponse = h
            .server
            .put("/api/profile/upload")
            .add_header(ana.0, ana.1)
            .multipart(png_form())
            .await
            .json();
        assert_ne!(first.profile_image, second.profile_image);
        assert!(!first_path.exists());

        let stored = h.users.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.profile_image, Some(second.profile_image));
    }

    #[tokio::test]
    async fn avatar_upload_rejects_non_images() {
        let h = Harness::new();
        let (user, ana) = h.user("ana").await;

        let form = MultipartForm::new().add_part(
            "profileImage",
            Part::bytes(b"hello".to_vec())
                .file_name("notes.txt")
                .mime_type("text/plain"),
        );
        h.server
            .put("/api/profile/upload")
            .add_header(ana.0.clone(), ana.1.clone())
            .multipart(form)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let wrong_field = MultipartForm::new().add_part(
            "avatar",
            Part::bytes(vec![1, 2, 3])
                .file_name("a.png")
                .mime_type("image/png"),
        );
        h.server
            .put("/api/profile/upload")
            .add_header(ana.0, ana.1)
            .multipart(wrong_field)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let stored = h.users.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.profile_image.is_none());
    }
}
