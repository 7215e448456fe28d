//! # Wolfpack
//!
//! WebSocket server for the Wolfpack ranking party game: one player per
//! round is secretly the wolf and ranks a set of items; the rest of the
//! pack submits a consensus ranking and scores a point for every exact
//! position match. Rooms, rules, and scoring live in the `wolfpack-*`
//! crates; this crate is the network surface — accept loop, the
//! per-connection session gateway, and identity resolution.
//!
//! ```rust,no_run
//! use wolfpack::{TrustedIdentity, WolfpackServerBuilder};
//!
//! # async fn run() -> Result<(), wolfpack::ServerError> {
//! let server = WolfpackServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(TrustedIdentity)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod auth;
mod error;
mod gateway;
mod server;

pub use auth::{Identity, IdentityError, TrustedIdentity};
pub use error::ServerError;
pub use server::{WolfpackServer, WolfpackServerBuilder};
