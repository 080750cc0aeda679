//! Source-hosting REST client used to publish artifacts into a repository.

pub mod github;
pub mod types;

pub use github::GithubClient;
pub use types::{Committer, CreatedFile, Owner, Repository};
