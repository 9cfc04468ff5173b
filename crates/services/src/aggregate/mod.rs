//! Store-independent shaping of query results: booking buckets, revenue
//! roll-ups, rating means and wishlist grouping.

pub mod buckets;
pub mod rating;
pub mod revenue;
pub mod wishlist;

pub use buckets::{Bucket, BookingBuckets, Categorize, categorize, classify};
pub use rating::{average_rating, rating_in_range};
pub use revenue::{BookingSummary, MONTH_NAMES, MonthlyRevenue, monthly_totals, revenue_by_month};
pub use wishlist::{WishlistGroup, group_by_service_type};
