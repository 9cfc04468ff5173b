pub mod blog;
pub mod booking;
pub mod category;
pub mod chat;
pub mod retreat;
pub mod review;
pub mod user;
pub mod wishlist;

pub use blog::*;
pub use booking::*;
pub use category::*;
pub use chat::*;
pub use retreat::*;
pub use review::*;
pub use user::*;
pub use wishlist::*;
