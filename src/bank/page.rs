use crate::api::Headers;

pub const PAGE_HEADER: &str = "x-page";
pub const NEXT_PAGE_HEADER: &str = "x-next-page";
pub const TOTAL_PAGES_HEADER: &str = "x-total-pages";

/// Pagination metadata read from response headers.
///
/// Missing or non-numeric values come back as `None`; only page 1's
/// `total_pages` is trusted by the fetcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub page_number: Option<u32>,
    pub next_page: Option<u32>,
    pub total_pages: Option<u32>,
}

impl PageMeta {
    /// Read from lower-cased response headers.
    pub fn from_headers(headers: &Headers) -> Self {
        let number = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.trim().parse::<u32>().ok())
        };

        Self {
            page_number: number(PAGE_HEADER),
            next_page: number(NEXT_PAGE_HEADER),
            total_pages: number(TOTAL_PAGES_HEADER),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(records: Vec<T>, meta: PageMeta) -> Self {
        Self { records, meta }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
