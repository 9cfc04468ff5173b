pub mod base;
pub mod blog;
pub mod booking;
pub mod category;
pub mod chat;
pub mod dashboard;
pub mod retreat;
pub mod review;
pub mod user;
pub mod wishlist;

pub use base::BaseDao;
