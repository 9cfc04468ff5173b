pub mod aggregate;
pub mod auth;
pub mod dao;
pub mod resolver;

pub use auth::AuthService;
pub use dao::*;
