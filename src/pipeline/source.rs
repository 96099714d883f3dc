//! Source resolution: turn a base URL into the list of destinations to capture.
//!
//! The listing endpoint is a paginated content API:
//!
//! ```text
//! GET {base}/api/pages?pagination[page]=1&pagination[pageSize]=100
//! → { "data": [ { "attributes": { "slug": "/about" } }, ... ] }
//! ```
//!
//! Only the first page is requested; items beyond the page size are dropped.
//! That truncation is inherited from the reference resolver and pinned by a
//! test so it stays a visible decision rather than a surprise.
//!
//! The base URL points at the API host (e.g. `https://site-api.example.com`);
//! the rendered "front" origin is derived by stripping the first `-api`
//! substring. A `/null` segment in a joined URL marks an item with no parent
//! path; the first such occurrence is removed outright, mirroring the
//! first-occurrence `-api` strip.
//!
//! Derivation is pure ([`derive_destinations`]); [`resolve`] adds the one
//! HTTP call. A failed or malformed listing request yields an empty list,
//! never an error — the caller reports "nothing to do".

use serde::Deserialize;
use std::fmt;
use tracing::{debug, warn};

/// One fully-qualified URL to capture. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination(String);

impl Destination {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Listing endpoint response shape.
#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: Vec<ListingItem>,
}

#[derive(Debug, Deserialize)]
pub struct ListingItem {
    pub attributes: ListingAttributes,
}

#[derive(Debug, Deserialize)]
pub struct ListingAttributes {
    /// Path of the page on the front origin, e.g. `/about` or `/null/news`.
    /// Items without a slug are skipped.
    pub slug: Option<String>,
}

/// Build the listing request URL for page 1.
pub fn listing_url(base_url: &str, page_size: usize) -> String {
    format!(
        "{}/api/pages?pagination[page]=1&pagination[pageSize]={}",
        base_url.trim_end_matches('/'),
        page_size
    )
}

/// Derive the rendered "front" origin from the API base URL.
///
/// Strips the first `-api` occurrence: `https://site-api.example.com` →
/// `https://site.example.com`.
pub fn front_origin(base_url: &str) -> String {
    base_url.trim_end_matches('/').replacen("-api", "", 1)
}

/// Map a listing response to capture destinations, in listing order.
///
/// Each destination is the front origin joined with the item's slug, with
/// the first literal `/null` removed (items whose parent path is null).
pub fn derive_destinations(base_url: &str, listing: &Listing) -> Vec<Destination> {
    let front = front_origin(base_url);
    listing
        .data
        .iter()
        .filter_map(|item| item.attributes.slug.as_deref())
        .map(|slug| Destination::new(format!("{front}{slug}").replacen("/null", "", 1)))
        .collect()
}

/// Query the listing endpoint and derive the destinations to capture.
///
/// Returns an empty list (not an error) when the request fails, the server
/// answers non-2xx, or the body does not match the expected shape.
pub async fn resolve(
    client: &reqwest::Client,
    base_url: &str,
    page_size: usize,
) -> Vec<Destination> {
    let url = listing_url(base_url, page_size);
    debug!("Fetching listing: {url}");

    let listing: Listing = match client.get(&url).send().await {
        Ok(response) => match response.error_for_status() {
            Ok(response) => match response.json().await {
                Ok(listing) => listing,
                Err(e) => {
                    warn!("Listing response from {url} is not the expected shape: {e}");
                    return Vec::new();
                }
            },
            Err(e) => {
                warn!("Listing request to {url} failed: {e}");
                return Vec::new();
            }
        },
        Err(e) => {
            warn!("Listing request to {url} failed: {e}");
            return Vec::new();
        }
    };

    let destinations = derive_destinations(base_url, &listing);
    debug!("Resolved {} destinations", destinations.len());
    destinations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_of(slugs: &[Option<&str>]) -> Listing {
        Listing {
            data: slugs
                .iter()
                .map(|s| ListingItem {
                    attributes: ListingAttributes {
                        slug: s.map(str::to_string),
                    },
                })
                .collect(),
        }
    }

    #[test]
    fn slug_joined_onto_front_origin() {
        let listing = listing_of(&[Some("/a")]);
        let dests = derive_destinations("https://site-api.example.com", &listing);
        assert_eq!(dests, vec![Destination::new("https://site.example.com/a")]);
    }

    #[test]
    fn null_slug_segment_removed_entirely() {
        let listing = listing_of(&[Some("/null")]);
        let dests = derive_destinations("https://x-api.y.com", &listing);
        // "/null" is stripped, not left as an empty trailing segment.
        assert_eq!(dests, vec![Destination::new("https://x.y.com")]);
    }

    #[test]
    fn null_parent_path_inside_slug_removed() {
        let listing = listing_of(&[Some("/null/news")]);
        let dests = derive_destinations("https://x-api.y.com", &listing);
        assert_eq!(dests, vec![Destination::new("https://x.y.com/news")]);
    }

    #[test]
    fn only_first_api_occurrence_stripped() {
        assert_eq!(
            front_origin("https://site-api.example-api.com"),
            "https://site.example-api.com"
        );
    }

    #[test]
    fn base_without_api_suffix_left_intact() {
        assert_eq!(front_origin("https://plain.example.com"), "https://plain.example.com");
    }

    #[test]
    fn items_without_slug_skipped() {
        let listing = listing_of(&[Some("/a"), None, Some("/b")]);
        let dests = derive_destinations("https://s-api.example.com", &listing);
        assert_eq!(dests.len(), 2);
    }

    #[test]
    fn order_of_listing_preserved() {
        let listing = listing_of(&[Some("/z"), Some("/a"), Some("/m")]);
        let dests = derive_destinations("https://s-api.example.com", &listing);
        let urls: Vec<&str> = dests.iter().map(Destination::as_str).collect();
        assert_eq!(
            urls,
            [
                "https://s.example.com/z",
                "https://s.example.com/a",
                "https://s.example.com/m"
            ]
        );
    }

    // Pins the single-page fetch: pagination beyond one page of `page_size`
    // items is knowingly dropped (inherited from the reference resolver).
    #[test]
    fn listing_url_requests_exactly_page_one() {
        assert_eq!(
            listing_url("https://site-api.example.com", 100),
            "https://site-api.example.com/api/pages?pagination[page]=1&pagination[pageSize]=100"
        );
    }

    #[test]
    fn listing_url_tolerates_trailing_slash() {
        assert_eq!(
            listing_url("https://site-api.example.com/", 50),
            "https://site-api.example.com/api/pages?pagination[page]=1&pagination[pageSize]=50"
        );
    }

    #[test]
    fn first_null_occurrence_only_removed() {
        let listing = listing_of(&[Some("/null/null/x")]);
        let dests = derive_destinations("https://x-api.y.com", &listing);
        assert_eq!(dests, vec![Destination::new("https://x.y.com/null/x")]);
    }

    /// Serve one canned HTTP response on a loopback port, returning the
    /// base URL to point a client at.
    async fn one_shot_server(response: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn resolve_yields_empty_on_unreachable_endpoint() {
        // Port 9 (discard) is not listening; the request fails to connect.
        let client = reqwest::Client::new();
        let dests = resolve(&client, "http://127.0.0.1:9", 100).await;
        assert!(dests.is_empty());
    }

    #[tokio::test]
    async fn resolve_yields_empty_on_server_error_status() {
        let base = one_shot_server(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let client = reqwest::Client::new();
        let dests = resolve(&client, &base, 100).await;
        assert!(dests.is_empty());
    }

    #[tokio::test]
    async fn resolve_yields_empty_on_malformed_listing_body() {
        let base = one_shot_server(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}",
        )
        .await;
        let client = reqwest::Client::new();
        let dests = resolve(&client, &base, 100).await;
        assert!(dests.is_empty());
    }

    #[test]
    fn listing_deserializes_expected_shape() {
        let listing: Listing = serde_json::from_str(
            r#"{"data":[{"attributes":{"slug":"/a"}},{"attributes":{"slug":null}}]}"#,
        )
        .unwrap();
        assert_eq!(listing.data.len(), 2);
        assert_eq!(listing.data[0].attributes.slug.as_deref(), Some("/a"));
        assert!(listing.data[1].attributes.slug.is_none());
    }
}
