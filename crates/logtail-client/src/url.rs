//! URL construction for stream connections.

use logtail_core::OpenRequest;
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Query keys owned by the tail protocol; any copies already present on the
/// endpoint are replaced.
const TAIL_QUERY_KEYS: &[&str] = &["run_id", "phase", "offset", "stream"];

/// Validate an endpoint: absolute, http or https.
pub fn parse_endpoint(endpoint: &str) -> ClientResult<Url> {
    let url = Url::parse(endpoint).map_err(|source| ClientError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::UnsupportedScheme {
            scheme: other.to_string(),
        }),
    }
}

/// Build the URL for one connection attempt.
///
/// Unrelated query parameters already on the endpoint are kept.
pub fn stream_url(request: &OpenRequest) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&request.target.endpoint)?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !TAIL_QUERY_KEYS.iter().any(|owned| *owned == &**key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.set_query(None);
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in &kept {
            query.append_pair(key, value);
        }
        for (key, value) in request.query_pairs() {
            query.append_pair(key, &value);
        }
    }
    Ok(url)
}
