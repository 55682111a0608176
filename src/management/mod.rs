mod auth;
mod mural;
mod rate_limit;
mod store;
mod tracks;

pub use auth::{
    ACCESS_TOKEN_KEY, AuthManager, CODE_VERIFIER_KEY, REFRESH_TOKEN_KEY, STATE_KEY,
    TOKEN_EXPIRES_KEY, TRANSACTION_TTL_SECS,
};
pub use mural::{
    MAX_OFFSET, PAGE_SIZE, PLACEHOLDER_IMAGE, collect_album_covers, placeholder_cover,
    select_image,
};
pub use rate_limit::{InMemoryRateLimiter, RateLimitEntry, RateLimiter};
pub use store::{FileStore, InMemoryStore, SessionStore};
pub use tracks::{AuthorizedFetcher, TrackPageFetcher};
