//! Repository layer for database operations
//!
//! Each entity has an async trait and a PostgreSQL implementation. Services
//! only see the traits, so they can be driven by mocks in tests.

pub mod books;
pub mod borrowing_requests;
pub mod categories;
pub mod reviews;
pub mod users;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub use books::BooksRepository;
pub use borrowing_requests::BorrowingRequestsRepository;
pub use categories::CategoriesRepository;
pub use reviews::ReviewsRepository;
pub use users::UsersRepository;

/// Main repository struct holding one store per entity
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BooksRepository>,
    pub categories: Arc<dyn CategoriesRepository>,
    pub reviews: Arc<dyn ReviewsRepository>,
    pub users: Arc<dyn UsersRepository>,
    pub borrowing_requests: Arc<dyn BorrowingRequestsRepository>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::PgBooksRepository::new(pool.clone())),
            categories: Arc::new(categories::PgCategoriesRepository::new(pool.clone())),
            reviews: Arc::new(reviews::PgReviewsRepository::new(pool.clone())),
            users: Arc::new(users::PgUsersRepository::new(pool.clone())),
            borrowing_requests: Arc::new(borrowing_requests::PgBorrowingRequestsRepository::new(
                pool,
            )),
        }
    }
}

#[cfg(test)]
impl Repository {
    /// Repository made of mocks without expectations; replace the ones a test needs
    pub fn mocked() -> Self {
        Self {
            books: Arc::new(books::MockBooksRepository::new()),
            categories: Arc::new(categories::MockCategoriesRepository::new()),
            reviews: Arc::new(reviews::MockReviewsRepository::new()),
            users: Arc::new(users::MockUsersRepository::new()),
            borrowing_requests: Arc::new(borrowing_requests::MockBorrowingRequestsRepository::new()),
        }
    }

    pub fn with_books(mut self, mock: books::MockBooksRepository) -> Self {
        self.books = Arc::new(mock);
        self
    }

    pub fn with_categories(mut self, mock: categories::MockCategoriesRepository) -> Self {
        self.categories = Arc::new(mock);
        self
    }

    pub fn with_reviews(mut self, mock: reviews::MockReviewsRepository) -> Self {
        self.reviews = Arc::new(mock);
        self
    }

    pub fn with_users(mut self, mock: users::MockUsersRepository) -> Self {
        self.users = Arc::new(mock);
        self
    }

    pub fn with_borrowing_requests(
        mut self,
        mock: borrowing_requests::MockBorrowingRequestsRepository,
    ) -> Self {
        self.borrowing_requests = Arc::new(mock);
        self
    }
}
