use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{ClusterError, ClusterResult};

/// Compact representative entry handed to the viewer front-end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentativeSummary {
    pub timestamp: i64,
    pub url: String,
}

/// Base64 of the JSON array of summaries.
pub fn encode_summaries(summaries: &[RepresentativeSummary]) -> ClusterResult<String> {
    let json = serde_json::to_vec(summaries).map_err(|err| ClusterError::Encode(err.to_string()))?;
    Ok(Base64.encode(json))
}

pub fn decode_summaries(encoded: &str) -> ClusterResult<Vec<RepresentativeSummary>> {
    let bytes = Base64
        .decode(encoded)
        .map_err(|err| ClusterError::Encode(err.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| ClusterError::Encode(err.to_string()))
}

/// `base` with the encoded summaries in the `replays` query parameter.
pub fn viewer_url(base: &str, summaries: &[RepresentativeSummary]) -> ClusterResult<Url> {
    let mut url = Url::parse(base)
        .map_err(|err| ClusterError::InvalidArg(format!("viewer base url {base}: {err}")))?;
    let encoded = encode_summaries(summaries)?;
    url.query_pairs_mut().append_pair("replays", &encoded);
    Ok(url)
}
