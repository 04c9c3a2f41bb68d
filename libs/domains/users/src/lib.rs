//! Users Domain
//!
//! User records (name, email, Argon2-hashed password) stored in MongoDB and
//! served over a small form-based HTTP API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, form decoding
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Id checks, uniqueness, password hashing
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Documents, forms, responses
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{handlers, mongodb::MongoUserRepository, service::UserService};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let repository = MongoUserRepository::new(&client.database("mydb"));
//! let service = UserService::new(repository);
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod password;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{ConflictKind, ErrorBody, UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{CreateUserForm, UpdateUserForm, User, UserResponse, parse_user_id};
pub use self::mongodb::MongoUserRepository;
pub use password::{HashedPassword, PasswordHashing};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
