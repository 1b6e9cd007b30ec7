//! Business logic services

pub mod books;
pub mod borrowing_requests;
pub mod categories;
pub mod reviews;
pub mod tokens;
pub mod users;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub categories: categories::CategoriesService,
    pub reviews: reviews::ReviewsService,
    pub users: users::UsersService,
    pub borrowing_requests: borrowing_requests::BorrowingRequestsService,
    pub tokens: tokens::TokenService,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let tokens = tokens::TokenService::new(config.auth.clone());

        Self {
            books: books::BooksService::new(repository.books),
            categories: categories::CategoriesService::new(repository.categories),
            reviews: reviews::ReviewsService::new(repository.reviews),
            users: users::UsersService::new(repository.users, tokens.clone()),
            borrowing_requests: borrowing_requests::BorrowingRequestsService::new(
                repository.borrowing_requests,
                config.borrowing.clone(),
            ),
            tokens,
        }
    }
}
