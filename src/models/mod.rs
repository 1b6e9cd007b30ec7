//! Data models: database rows and the transfer objects exposed by the API

pub mod book;
pub mod borrowing_request;
pub mod category;
pub mod review;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookDto};
pub use borrowing_request::{BorrowingRequest, BorrowingRequestDto, RequestStatus};
pub use category::{Category, CategoryDto};
pub use review::{Review, ReviewDto};
pub use user::{Role, User, UserClaims, UserDto};
