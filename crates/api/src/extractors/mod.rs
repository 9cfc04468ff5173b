pub mod auth;
pub mod request;

pub use request::{Json, Path, Query};
