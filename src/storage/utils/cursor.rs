// Opaque page token handed to clients between listing calls
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::constants::{MAX_PAGE_SIZE, MIN_PAGE_SIZE};

/// Everything needed to resume a prefix scan where the previous page stopped.
///
/// The prefix and page size of the original request travel inside the token,
/// so a resumed scan can never drift onto a different prefix or page size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageToken {
    #[serde(rename = "p")]
    pub prefix: String,
    #[serde(rename = "n")]
    pub page_size: u32,
    #[serde(rename = "a")]
    pub start_after: String,
}

impl PageToken {
    /// Encode into the URL-safe string returned as `next_page_token`.
    pub fn encode(&self) -> String {
        // Serializing a struct of strings and integers cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a client-supplied token.
    pub fn decode(token: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| Error::MalformedPageToken)?;
        let token: PageToken =
            serde_json::from_slice(&bytes).map_err(|_| Error::MalformedPageToken)?;
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&token.page_size) {
            return Err(Error::MalformedPageToken);
        }
        Ok(token)
    }
}
