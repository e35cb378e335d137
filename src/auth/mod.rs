// Authentication module
// Account registration, sign-in and session resolution over signed bearer tokens

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::ErrorBody;
pub use handlers::{me_handler, signin_handler, signup_handler};
pub use models::{AuthResponse, CredentialsRequest, SessionResponse, UserView};
pub use password::PasswordHasher;
pub use repository::PgAccountStore;
pub use service::AuthService;
pub use token::TokenService;
