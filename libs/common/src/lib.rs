//! Common library for the DocDesk services
//!
//! This crate provides shared functionality used across the auth, api and
//! tools services: database connectivity, the user credential store, JWT
//! issuing and validation, bearer-token middleware, the error taxonomy,
//! layered settings and logging setup.
//!
//! ```rust,no_run
//! use common::{jwt::{JwtConfig, JwtService}, users::PgUserRepository};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     common::telemetry::init();
//!     let pool = common::database::connect_from_env().await?;
//!     let users = PgUserRepository::new(pool);
//!     let jwt = JwtService::new(JwtConfig::from_env()?);
//!     # let _ = (users, jwt);
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod http;
pub mod jwt;
pub mod middleware;
pub mod settings;
pub mod telemetry;
pub mod users;
