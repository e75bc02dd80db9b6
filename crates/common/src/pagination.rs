//! Page metadata shared by list endpoints.

use serde::Serialize;

/// Number of pages needed to show `total` rows with `per_page` rows each.
/// An empty result still reports a single (empty) page.
pub fn total_pages(total: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        return 1;
    }
    total.div_ceil(per_page).max(1)
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u64,
    pub total_pages: u64,
}

impl PageInfo {
    pub fn new(page: u64, total: u64, per_page: u64) -> Self {
        Self { page, total_pages: total_pages(total, per_page) }
    }
}
