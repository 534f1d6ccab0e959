// Resource handlers. Every route here sits behind the JWT middleware and
// receives the caller as `Extension<AuthUser>`.
pub mod entries;
pub mod habits;
pub mod payload;
pub mod utils;
