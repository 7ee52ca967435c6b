//! Vimeo API client: walks `GET /me/videos` page by page, recovering from
//! rate limiting by waiting out the server's declared reset window.

pub mod error;
pub mod fetcher;
pub mod session;
pub mod types;

pub use error::VimeoError;
pub use fetcher::VideoFetcher;
pub use session::build_client;
