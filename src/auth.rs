//! Session credentials, login/refresh wire shapes, and the login marker cookie.

pub mod credentials;
pub mod marker;
pub mod secret;

pub use credentials::*;
pub use marker::*;
pub use secret::*;
