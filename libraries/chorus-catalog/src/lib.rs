//! Chorus Catalog
//!
//! Turns Spotify playlist, album and track links into "artist title" search
//! terms the track resolver can find.
//!
//! # Example
//!
//! ```rust,no_run
//! use chorus_catalog::{CatalogAdapter, SpotifyCredentials, SpotifyExpander};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), chorus_core::CatalogError> {
//! let credentials = SpotifyCredentials::from_parts(
//!     std::env::var("SPOTIFY_CLIENT_ID").ok(),
//!     std::env::var("SPOTIFY_CLIENT_SECRET").ok(),
//! );
//! let adapter = CatalogAdapter::new(Arc::new(SpotifyExpander::new(credentials)?));
//!
//! let terms = adapter
//!     .expand("https://open.spotify.com/album/4aawyAB9vmqN3uQ7FjRGTy")
//!     .await;
//! println!("{} tracks", terms.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod classify;
mod spotify;

pub use adapter::CatalogAdapter;
pub use classify::{classify, is_catalog_reference, CatalogLink};
pub use spotify::{SpotifyCredentials, SpotifyExpander, DEFAULT_ACCOUNTS_BASE, DEFAULT_API_BASE};
