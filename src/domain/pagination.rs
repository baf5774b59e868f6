//! Page/offset arithmetic shared by every list read.

/// Page size used when the caller asks for less than one row per page.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page a single read returns.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Normalised pagination request.
///
/// `page < 1` clamps to 1 and `page_size < 1` falls back to
/// [`DEFAULT_PAGE_SIZE`], so `PageRequest::new(0, -5)` equals
/// `PageRequest::new(1, 10)`. Sizes above [`MAX_PAGE_SIZE`] are capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    /// Builds a normalised request.
    #[must_use]
    pub const fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: if page < 1 { 1 } else { page },
            page_size: normalize_page_size(page_size),
        }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> i64 {
        self.page
    }

    /// Rows per page (`LIMIT`).
    #[must_use]
    pub const fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Rows to skip (`OFFSET`).
    #[must_use]
    pub const fn offset(&self) -> i64 {
        compute_offset(self.page, self.page_size)
    }

    /// Number of pages needed for `total` rows.
    #[must_use]
    pub const fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            let whole = total / self.page_size;
            if total % self.page_size == 0 {
                whole
            } else {
                whole + 1
            }
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// `(max(page, 1) - 1) * normalize(page_size)`.
#[must_use]
pub const fn compute_offset(page: i64, page_size: i64) -> i64 {
    let page = if page < 1 { 1 } else { page };
    (page - 1).saturating_mul(normalize_page_size(page_size))
}

const fn normalize_page_size(page_size: i64) -> i64 {
    if page_size < 1 {
        DEFAULT_PAGE_SIZE
    } else if page_size > MAX_PAGE_SIZE {
        MAX_PAGE_SIZE
    } else {
        page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_values_match_first_default_page() {
        assert_eq!(PageRequest::new(0, -5), PageRequest::new(1, 10));
        assert_eq!(PageRequest::new(-3, 0), PageRequest::default());
        assert_eq!(compute_offset(0, -5), compute_offset(1, 10));
    }

    #[test]
    fn offset_is_zero_on_first_page() {
        assert_eq!(PageRequest::new(1, 25).offset(), 0);
    }

    #[test]
    fn offset_advances_by_page_size() {
        assert_eq!(compute_offset(3, 20), 40);
        assert_eq!(PageRequest::new(2, 10).offset(), 10);
    }

    #[test]
    fn total_pages_rounds_up() {
        let req = PageRequest::new(1, 10);
        assert_eq!(req.total_pages(0), 0);
        assert_eq!(req.total_pages(10), 1);
        assert_eq!(req.total_pages(11), 2);
    }

    #[test]
    fn huge_page_does_not_overflow() {
        assert_eq!(compute_offset(i64::MAX, 10), i64::MAX);
    }

    #[test]
    fn page_size_is_capped() {
        let req = PageRequest::new(1, i64::MAX);
        assert_eq!(req.page_size(), MAX_PAGE_SIZE);
        assert_eq!(req.total_pages(1), 1);
        assert_eq!(req.total_pages(i64::MAX), i64::MAX / MAX_PAGE_SIZE + 1);
        assert_eq!(compute_offset(3, i64::MAX), 2 * MAX_PAGE_SIZE);
    }
}
