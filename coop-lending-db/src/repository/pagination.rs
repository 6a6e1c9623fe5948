/// Offset-based page request
///
/// # Example
/// ```
/// use coop_lending_db::repository::pagination::PageRequest;
///
/// let first = PageRequest::new(20, 0);
/// let third = PageRequest::for_page(20, 3);
/// assert_eq!(third.offset, 40);
/// assert_eq!(first.page_number(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum number of items to return
    pub limit: usize,
    /// Number of items to skip
    pub offset: usize,
}

impl PageRequest {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Page request for a 1-based page number; page 0 is treated as page 1.
    /// The offset saturates instead of overflowing.
    pub fn for_page(page_size: usize, page_number: usize) -> Self {
        let page_number = page_number.max(1);
        Self {
            limit: page_size,
            offset: (page_number - 1).saturating_mul(page_size),
        }
    }

    pub fn page_number(&self) -> usize {
        if self.limit == 0 {
            1
        } else {
            (self.offset / self.limit) + 1
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

/// One page of results plus the total count across all pages
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize, limit: usize, offset: usize) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
        }
    }

    /// Slice an already filtered and ordered collection into a page
    pub fn from_sorted(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len();
        let items = all
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .collect();
        Self::new(items, total, request.limit, request.offset)
    }

    pub fn has_more(&self) -> bool {
        self.offset.saturating_add(self.items.len()) < self.total
    }

    pub fn total_pages(&self) -> usize {
        if self.limit == 0 {
            1
        } else {
            self.total.div_ceil(self.limit)
        }
    }
}
