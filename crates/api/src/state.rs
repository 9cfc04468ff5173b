use std::sync::Arc;

use mongodb::Database;
use retreats_config::Settings;
use retreats_services::{
    AuthService,
    dao::{
        blog::BlogDao, booking::BookingDao, category::CategoryDao, chat::ChatDao,
        dashboard::DashboardDao, retreat::RetreatDao, review::ReviewDao, user::UserDao,
        wishlist::WishlistDao,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDao>,
    pub categories: Arc<CategoryDao>,
    pub blogs: Arc<BlogDao>,
    pub retreats: Arc<RetreatDao>,
    pub bookings: Arc<BookingDao>,
    pub reviews: Arc<ReviewDao>,
    pub chats: Arc<ChatDao>,
    pub wishlists: Arc<WishlistDao>,
    pub dashboard: Arc<DashboardDao>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        Self {
            auth: Arc::new(AuthService::new(&settings.auth)),
            users: Arc::new(UserDao::new(&db)),
            categories: Arc::new(CategoryDao::new(&db)),
            blogs: Arc::new(BlogDao::new(&db)),
            retreats: Arc::new(RetreatDao::new(&db)),
            bookings: Arc::new(BookingDao::new(&db)),
            reviews: Arc::new(ReviewDao::new(&db)),
            chats: Arc::new(ChatDao::new(&db)),
            wishlists: Arc::new(WishlistDao::new(&db)),
            dashboard: Arc::new(DashboardDao::new(&db)),
            db,
            settings,
        }
    }
}
