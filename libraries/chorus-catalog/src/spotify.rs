//! Spotify Web API expander
//!
//! Client-credentials flow only: no user login, public collections only.

use async_trait::async_trait;
use chorus_core::{CatalogError, CatalogExpander, CatalogTrack, CollectionKind};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Public Web API base
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";

/// Accounts service base (token endpoint)
pub const DEFAULT_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// Playlist page size (API maximum)
const PAGE_SIZE: usize = 100;

/// Upper bound on followed pages per collection
const MAX_PAGES: usize = 100;

/// Tokens are refreshed this long before they expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Application credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyCredentials {
    /// Client id
    pub client_id: String,

    /// Client secret
    pub client_secret: String,
}

impl SpotifyCredentials {
    /// Credentials from optional parts; `None` if either is missing or blank
    pub fn from_parts(client_id: Option<String>, client_secret: Option<String>) -> Option<Self> {
        let client_id = client_id.filter(|s| !s.trim().is_empty())?;
        let client_secret = client_secret.filter(|s| !s.trim().is_empty())?;
        Some(Self {
            client_id,
            client_secret,
        })
    }
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

// ===== Wire Types =====

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    name: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
}

impl ApiTrack {
    fn into_catalog(self) -> Option<CatalogTrack> {
        let artist = self.artists.into_iter().next()?;
        Some(CatalogTrack::new(artist.name, self.name))
    }
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<ApiTrack>,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlbumTrack {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiAlbum {
    #[serde(default)]
    artists: Vec<ApiArtist>,
    tracks: Page<AlbumTrack>,
}

// ===== Expander =====

/// [`CatalogExpander`] over the Spotify Web API
///
/// Without credentials every call fails with `CatalogError::Unavailable`.
pub struct SpotifyExpander {
    http: Client,
    credentials: Option<SpotifyCredentials>,
    api_base: String,
    accounts_base: String,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyExpander {
    /// Create an expander against the public endpoints
    pub fn new(credentials: Option<SpotifyCredentials>) -> Result<Self, CatalogError> {
        Self::with_endpoints(credentials, DEFAULT_API_BASE, DEFAULT_ACCOUNTS_BASE)
    }

    /// Create an expander against custom endpoints
    pub fn with_endpoints(
        credentials: Option<SpotifyCredentials>,
        api_base: &str,
        accounts_base: &str,
    ) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(format!("Chorus/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        if credentials.is_none() {
            warn!("Spotify credentials not configured, catalog links are disabled");
        }

        Ok(Self {
            http,
            credentials,
            api_base: api_base.trim_end_matches('/').to_string(),
            accounts_base: accounts_base.trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        })
    }

    /// Whether credentials are present
    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn access_token(&self) -> Result<String, CatalogError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| CatalogError::Unavailable("Spotify credentials missing".to_string()))?;

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let url = format!("{}/api/token", self.accounts_base);
        debug!(url = %url, "Requesting Spotify access token");

        let response = self
            .http
            .post(&url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, "Spotify token request rejected");
            return Err(CatalogError::Unavailable(format!(
                "Spotify rejected the credentials ({})",
                status
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Request(format!("Failed to parse token: {}", e)))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        info!(expires_in = token.expires_in, "Obtained Spotify access token");

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        let token = self.access_token().await?;
        debug!(url = %url, "Spotify API request");

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // Force a fresh token next time
            self.token.lock().await.take();
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, "Spotify API request failed");
            return Err(CatalogError::Request(format!("{} returned {}", url, status)));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Request(format!("Failed to parse response: {}", e)))
    }

    async fn playlist(&self, id: &str) -> Result<Vec<Option<CatalogTrack>>, CatalogError> {
        let mut url = Some(format!(
            "{}/playlists/{}/tracks?offset=0&limit={}",
            self.api_base, id, PAGE_SIZE
        ));
        let mut tracks = Vec::new();

        for _ in 0..MAX_PAGES {
            let Some(page_url) = url.take() else { break };
            let page: Page<PlaylistItem> = self.get(&page_url).await?;
            tracks.extend(
                page.items
                    .into_iter()
                    .map(|item| item.track.and_then(ApiTrack::into_catalog)),
            );
            url = page.next;
        }

        Ok(tracks)
    }

    async fn album(&self, id: &str) -> Result<Vec<Option<CatalogTrack>>, CatalogError> {
        let album: ApiAlbum = self.get(&format!("{}/albums/{}", self.api_base, id)).await?;
        let Some(artist) = album.artists.into_iter().next().map(|a| a.name) else {
            return Ok(album.tracks.items.iter().map(|_| None).collect());
        };

        let mut tracks: Vec<Option<CatalogTrack>> = Vec::new();
        let mut page = album.tracks;
        for _ in 0..MAX_PAGES {
            tracks.extend(
                page.items
                    .into_iter()
                    .map(|track| Some(CatalogTrack::new(artist.clone(), track.name))),
            );
            let Some(next) = page.next else { break };
            page = self.get(&next).await?;
        }

        Ok(tracks)
    }

    async fn track(&self, id: &str) -> Result<Vec<Option<CatalogTrack>>, CatalogError> {
        let track: ApiTrack = self.get(&format!("{}/tracks/{}", self.api_base, id)).await?;
        Ok(vec![track.into_catalog()])
    }
}

#[async_trait]
impl CatalogExpander for SpotifyExpander {
    async fn list_tracks(
        &self,
        kind: CollectionKind,
        id: &str,
    ) -> Result<Vec<Option<CatalogTrack>>, CatalogError> {
        if self.credentials.is_none() {
            return Err(CatalogError::Unavailable(
                "Spotify credentials missing".to_string(),
            ));
        }
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CatalogError::Unsupported(format!("{} id {:?}", kind, id)));
        }

        let tracks = match kind {
            CollectionKind::Playlist => self.playlist(id).await?,
            CollectionKind::Album => self.album(id).await?,
            CollectionKind::Track => self.track(id).await?,
        };
        info!(kind = %kind, id = %id, count = tracks.len(), "Expanded Spotify collection");
        Ok(tracks)
    }
}
