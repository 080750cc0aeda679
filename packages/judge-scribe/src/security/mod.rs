//! Secret handling for API keys and access tokens.

pub mod credentials;

pub use credentials::SecretString;
