//! Page-number cursors and the `ModelList` result type.
//!
//! List endpoints return `{count, next, previous, results}` where `next` and
//! `previous` are absolute URLs. Only the `page` query parameter of each
//! link matters to the client.

use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::error::ApiError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Which page to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Same page size, different page.
    pub fn at(self, page: u32) -> Self {
        Self { page, ..self }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

/// The list envelope as it arrives on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// One fetched page. Not a live cursor: following `next_page` means issuing
/// a new list call, which yields a new `ModelList`.
#[derive(Debug, Clone)]
pub struct ModelList<T> {
    pub count: u64,
    pub next_page: Option<u32>,
    pub previous_page: Option<u32>,
    pub results: Vec<T>,
}

impl<T> ModelList<T> {
    /// Project a wire page into a `ModelList`, converting each record.
    pub fn from_page<R, F>(page: Page<R>, f: F) -> Result<Self, ApiError>
    where
        F: FnMut(R) -> T,
    {
        Ok(Self {
            count: page.count,
            next_page: page_from_link(page.next.as_deref())?,
            previous_page: page_from_link(page.previous.as_deref())?,
            results: page.results.into_iter().map(f).collect(),
        })
    }

    /// Like `from_page` for conversions that can themselves fail.
    pub fn try_from_page<R, F>(page: Page<R>, f: F) -> Result<Self, ApiError>
    where
        F: FnMut(R) -> Result<T, ApiError>,
    {
        Ok(Self {
            count: page.count,
            next_page: page_from_link(page.next.as_deref())?,
            previous_page: page_from_link(page.previous.as_deref())?,
            results: page.results.into_iter().map(f).collect::<Result<_, _>>()?,
        })
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.results.iter()
    }
}

impl<T> IntoIterator for ModelList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

/// Extract the `page` parameter from a pagination link.
///
/// An absent or empty link means there is no such page. A present link
/// without a usable `page` parameter breaks the server contract and is an
/// error.
pub fn page_from_link(link: Option<&str>) -> Result<Option<u32>, ApiError> {
    let link = match link.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(link) => link,
    };
    let url = Url::parse(link).map_err(|e| malformed(link, &e.to_string()))?;
    let page = url
        .query_pairs()
        .find(|(k, _)| k == "page")
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| malformed(link, "missing page parameter"))?;
    page.parse::<u32>()
        .map(Some)
        .map_err(|e| malformed(link, &e.to_string()))
}

fn malformed(link: &str, reason: &str) -> ApiError {
    warn!(link, reason, "malformed pagination link");
    ApiError::Unknown {
        status: 200,
        body: format!("malformed pagination link {link:?}: {reason}"),
    }
}
