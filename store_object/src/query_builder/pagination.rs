//! Cursor pagination
//!
//! Cursors are base64 of `num:<page>` with 1-based pages. They are stateless: the next
//! cursor is always `page + 1`, and the store clears it when a page comes back short.

use crate::errors::StoreError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static CURSOR_PAYLOAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^num:([1-9][0-9]*)$").unwrap_or_else(|e| panic!("invalid cursor pattern: {e}"))
});

/// Requested page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub size: Option<u64>,
    pub cursor: Option<String>,
}

impl PageRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

/// Paging and sorting parameters of a collection request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionParams {
    pub page: Option<PageRequest>,
    pub sort: Option<String>,
}

impl CollectionParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }
}

/// Page information returned with a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub size: u64,
    pub sort: Option<String>,
    pub prev_cursor: Option<String>,
    pub next_cursor: Option<String>,
}

/// Page position resolved from a [`PageRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePosition {
    /// 1-based page number
    pub number: u64,
    pub size: u64,
    /// `"<offset>,<count>"`
    pub limit: String,
    pub prev_cursor: Option<String>,
    pub next_cursor: String,
}

pub fn encode_cursor(page: u64) -> String {
    STANDARD.encode(format!("num:{}", page))
}

/// Decode a cursor into its page number
pub fn decode_cursor(cursor: &str) -> Result<u64, StoreError> {
    let invalid = || {
        StoreError::BadRequest(format!(
            "Invalid cursor: '{}'. Cursors are expected to be base64-encoded uris matching the \
             regex /^num:[1-9][0-9]*$/.",
            cursor
        ))
    };

    let decoded = STANDARD.decode(cursor).map_err(|_| invalid())?;
    let payload = String::from_utf8(decoded).map_err(|_| invalid())?;
    let captures = CURSOR_PAYLOAD.captures(&payload).ok_or_else(invalid)?;
    captures[1].parse::<u64>().map_err(|_| invalid())
}

/// Resolve the requested page. Without a request the first page of `default_size` is used.
pub fn paginate(page: Option<&PageRequest>, default_size: u64) -> Result<PagePosition, StoreError> {
    let size = page
        .and_then(|p| p.size)
        .filter(|s| *s > 0)
        .unwrap_or(default_size);
    let prev_cursor = page
        .and_then(|p| p.cursor.clone())
        .filter(|c| !c.is_empty());

    let number = match &prev_cursor {
        Some(cursor) => decode_cursor(cursor)?,
        None => 1,
    };

    let out_of_range =
        || StoreError::BadRequest(format!("Page {} of size {} is out of range", number, size));
    let offset = (number - 1).checked_mul(size).ok_or_else(out_of_range)?;
    let next = number.checked_add(1).ok_or_else(out_of_range)?;

    Ok(PagePosition {
        number,
        size,
        limit: format!("{},{}", offset, size),
        prev_cursor,
        next_cursor: encode_cursor(next),
    })
}
