//! A typed client for the YouTrack REST API.
//!
//! Maps the API's JSON resources (issues, projects, users, custom fields,
//! tags, agile boards) onto typed entities and exposes one async method per
//! documented endpoint. The interesting part is the schema layer: custom
//! fields and bundle elements are polymorphic on a `$type` discriminator,
//! which deserializes into closed Rust enums - an unknown discriminator is
//! an error, never a silent fallback.
//!
//! Entity fields are tri-state ([`Opt`]): unset fields stay out of write
//! payloads entirely, while explicit nulls go through, so the same structs
//! serve as read models and partial updates.
//!
//! ```no_run
//! use youtrack_client::entities::Issue;
//! use youtrack_client::{Client, Opt};
//!
//! # async fn run() -> youtrack_client::Result<()> {
//! let client = Client::new("https://example.com/youtrack", "perm:token")?;
//!
//! let issue = client.get_issue("HD-25").await?;
//! println!("{issue}");
//!
//! let patch = Issue {
//!     summary: Opt::Set("New title".into()),
//!     ..Issue::default()
//! };
//! client.update_issue("HD-25", &patch, false).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod entities;
pub mod error;
pub mod fields;
pub mod opt;
pub mod time;

pub use auth::Token;
pub use client::{AttachmentFile, Client, ClientBuilder};
pub use error::{Error, Result};
pub use fields::{FieldSelection, FieldSpec};
pub use opt::Opt;
pub use time::{Date, Timestamp};
