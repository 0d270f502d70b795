pub mod request;
pub mod user;

pub use request::ApiResponse;
pub use user::{User, UserDirectory};
