//! Offset/limit page windows shared by portal list views.
//!
//! The bookkeeping backend paginates with `skip` and `limit` query
//! parameters. [`PageRequest`] validates those values once, and
//! [`PageWindow`] answers the display questions a list view asks after a page
//! has been fetched: which rows are shown, and whether previous/next
//! navigation is possible.

use serde::{Deserialize, Serialize};

/// Default number of rows requested per page.
pub const DEFAULT_LIMIT: u32 = 50;

/// Largest page size a caller may request.
pub const MAX_LIMIT: u32 = 500;

/// Validation failures for page requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// The limit was zero.
    #[error("limit must be at least 1")]
    ZeroLimit,
    /// The limit exceeded [`MAX_LIMIT`].
    #[error("limit must be at most {max}, got {got}")]
    LimitTooLarge {
        /// Maximum accepted limit.
        max: u32,
        /// Limit supplied by the caller.
        got: u32,
    },
}

/// Validated offset/limit pair.
///
/// ## Invariants
/// - `limit` is within `1..=MAX_LIMIT`.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let page = PageRequest::new(0, 50).expect("valid page");
/// assert_eq!(page.next().skip(), 50);
/// assert_eq!(page.previous(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest", into = "RawPageRequest")]
pub struct PageRequest {
    skip: u64,
    limit: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawPageRequest {
    skip: u64,
    limit: u32,
}

impl PageRequest {
    /// Validate and construct a page request.
    ///
    /// # Errors
    /// Returns [`PageRequestError`] when `limit` is zero or above
    /// [`MAX_LIMIT`].
    pub const fn new(skip: u64, limit: u32) -> Result<Self, PageRequestError> {
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        if limit > MAX_LIMIT {
            return Err(PageRequestError::LimitTooLarge {
                max: MAX_LIMIT,
                got: limit,
            });
        }
        Ok(Self { skip, limit })
    }

    /// First page with the default limit.
    #[must_use]
    pub const fn first() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Build a request from optional query values, falling back to defaults
    /// for anything missing and clamping out-of-range limits.
    #[must_use]
    pub fn from_query(skip: Option<u64>, limit: Option<u32>) -> Self {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        Self {
            skip: skip.unwrap_or(0),
            limit,
        }
    }

    /// Number of rows skipped.
    #[must_use]
    pub const fn skip(&self) -> u64 {
        self.skip
    }

    /// Maximum number of rows requested.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Same limit, restarted at offset zero.
    #[must_use]
    pub const fn reset(&self) -> Self {
        Self {
            skip: 0,
            limit: self.limit,
        }
    }

    /// The following page.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self {
            skip: self.skip.saturating_add(self.limit as u64),
            limit: self.limit,
        }
    }

    /// The preceding page, or `None` when already at offset zero.
    #[must_use]
    pub const fn previous(&self) -> Option<Self> {
        if self.skip == 0 {
            return None;
        }
        Some(Self {
            skip: self.skip.saturating_sub(self.limit as u64),
            limit: self.limit,
        })
    }

    /// Describe the page once `returned` rows have come back.
    #[must_use]
    pub const fn window(&self, returned: usize) -> PageWindow {
        PageWindow {
            request: *self,
            returned,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = PageRequestError;

    fn try_from(value: RawPageRequest) -> Result<Self, Self::Error> {
        Self::new(value.skip, value.limit)
    }
}

impl From<PageRequest> for RawPageRequest {
    fn from(value: PageRequest) -> Self {
        Self {
            skip: value.skip,
            limit: value.limit,
        }
    }
}

/// A fetched page: the request plus the number of rows the backend returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    request: PageRequest,
    returned: usize,
}

impl PageWindow {
    /// Whether the page came back empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.returned == 0
    }

    /// One-based index of the first row shown, or `None` for an empty page.
    #[must_use]
    pub const fn first_row(&self) -> Option<u64> {
        if self.returned == 0 {
            None
        } else {
            Some(self.request.skip.saturating_add(1))
        }
    }

    /// One-based index of the last row shown, or `None` for an empty page.
    #[must_use]
    pub const fn last_row(&self) -> Option<u64> {
        if self.returned == 0 {
            None
        } else {
            Some(self.request.skip.saturating_add(self.returned as u64))
        }
    }

    /// Request for the previous page, if any.
    #[must_use]
    pub const fn previous(&self) -> Option<PageRequest> {
        self.request.previous()
    }

    /// Request for the next page.
    ///
    /// A page shorter than the limit is the last one, so there is no next
    /// page.
    #[must_use]
    pub const fn next(&self) -> Option<PageRequest> {
        if self.returned < self.request.limit as usize {
            None
        } else {
            Some(self.request.next())
        }
    }
}
