//! Session lifetime: cookies, keep-alive and logout.

pub mod cookies;
pub mod keepalive;
pub mod logout;

pub use cookies::{CookieJar, SESSION_COOKIES};
pub use keepalive::{KeepAlive, PingStatus, SESSION_TERMINATED};
pub use logout::{do_logout, logout, logout_at_browser, LOGOUT_PROMPT};
