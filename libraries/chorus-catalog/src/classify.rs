//! Catalog reference classification

use chorus_core::CollectionKind;
use url::Url;

const WEB_HOST: &str = "open.spotify.com";
const URI_SCHEME: &str = "spotify:";

/// A classified catalog reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLink {
    /// Collection shape
    pub kind: CollectionKind,

    /// Catalog id
    pub id: String,
}

/// Whether `reference` points into the catalog at all
///
/// True for links that [`classify`] may still reject (artists, podcasts), so
/// the caller can route them to the catalog instead of the track resolver.
pub fn is_catalog_reference(reference: &str) -> bool {
    let reference = reference.trim();
    if reference.starts_with(URI_SCHEME) {
        return true;
    }
    Url::parse(reference)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.ends_with("spotify.com")))
        .unwrap_or(false)
}

/// Classify a playlist, album, or track reference
///
/// Accepts web links (`https://open.spotify.com/playlist/<id>?si=...`,
/// optionally with an `intl-xx` path prefix) and URIs
/// (`spotify:album:<id>`). Returns `None` for anything else.
pub fn classify(reference: &str) -> Option<CatalogLink> {
    let reference = reference.trim();

    if let Some(rest) = reference.strip_prefix(URI_SCHEME) {
        let mut parts = rest.split(':');
        let kind = parse_kind(parts.next()?)?;
        let id = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        return link(kind, id);
    }

    let url = Url::parse(reference).ok()?;
    if url.host_str()? != WEB_HOST {
        return None;
    }

    let mut segments = url.path_segments()?.filter(|s| !s.is_empty()).peekable();
    if segments.peek()?.starts_with("intl-") {
        segments.next();
    }
    let kind = parse_kind(segments.next()?)?;
    link(kind, segments.next()?)
}

fn parse_kind(segment: &str) -> Option<CollectionKind> {
    match segment {
        "playlist" => Some(CollectionKind::Playlist),
        "album" => Some(CollectionKind::Album),
        "track" => Some(CollectionKind::Track),
        _ => None,
    }
}

fn link(kind: CollectionKind, id: &str) -> Option<CatalogLink> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(CatalogLink {
        kind,
        id: id.to_string(),
    })
}
