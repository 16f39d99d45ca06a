//! Listing query model.
//!
//! Clients either start a scan (`page_size` and `directory`) or continue one
//! (`page_token`), never both. The raw [`ListParams`] keep every field as an
//! `Option` so that "not sent" and "sent with the default value" stay
//! distinguishable until [`ListQuery::from_params`] has checked them.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::storage::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use crate::storage::utils::cursor::PageToken;

const MUTUALLY_EXCLUSIVE: &str = "page_token is mutually exclusive with page_size and directory";

/// Query string of `GET /files`, exactly as the client sent it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page_size: Option<i64>,
    pub directory: Option<String>,
    pub page_token: Option<String>,
}

/// A validated listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListQuery {
    /// Start a new scan of every key under `directory`.
    Fresh { directory: String, page_size: u32 },
    /// Continue the scan a previous page handed out a token for.
    Resume { token: PageToken },
}

impl ListQuery {
    /// Fresh scan of the whole bucket with the default page size.
    pub fn all() -> Self {
        Self::fresh("", DEFAULT_PAGE_SIZE)
    }

    pub fn fresh(directory: impl Into<String>, page_size: u32) -> Self {
        Self::Fresh {
            directory: directory.into(),
            page_size,
        }
    }

    /// Resume from a `next_page_token` returned by an earlier page.
    pub fn resume(token: &str) -> Result<Self> {
        Ok(Self::Resume {
            token: PageToken::decode(token)?,
        })
    }

    /// Validate raw query parameters.
    pub fn from_params(params: ListParams) -> Result<Self> {
        let page_size = params.page_size.map(validate_page_size).transpose()?;

        // An empty token is the same as no token.
        match params.page_token.filter(|token| !token.is_empty()) {
            Some(token) => {
                if page_size.is_some() || params.directory.is_some() {
                    return Err(Error::InvalidQuery {
                        message: MUTUALLY_EXCLUSIVE.to_string(),
                    });
                }
                Self::resume(&token)
            }
            None => Ok(Self::Fresh {
                directory: params.directory.unwrap_or_default(),
                page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            }),
        }
    }

    /// Prefix this query scans.
    pub fn prefix(&self) -> &str {
        match self {
            Self::Fresh { directory, .. } => directory,
            Self::Resume { token } => &token.prefix,
        }
    }

    /// Maximum number of items on the resulting page.
    pub fn page_size(&self) -> u32 {
        match self {
            Self::Fresh { page_size, .. } => *page_size,
            Self::Resume { token } => token.page_size,
        }
    }

    /// Key the scan resumes after, if any.
    pub fn start_after(&self) -> Option<&str> {
        match self {
            Self::Fresh { .. } => None,
            Self::Resume { token } => Some(&token.start_after),
        }
    }
}

fn validate_page_size(page_size: i64) -> Result<u32> {
    u32::try_from(page_size)
        .ok()
        .filter(|size| (MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(size))
        .ok_or_else(|| Error::InvalidQuery {
            message: format!("page_size must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}"),
        })
}
