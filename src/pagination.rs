use crate::error::{AppError, AppResult};

pub const DEFAULT_PER_PAGE: u64 = 10;
pub const MAX_PER_PAGE: u64 = 20;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Checks the request bounds accepted by the listing endpoint.
    pub fn new(page: u64, per_page: u64) -> AppResult<Self> {
        if page < 1 {
            return Err(AppError::invalid_input("page must be at least 1."));
        }
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(AppError::invalid_input(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}."
            )));
        }
        Ok(Self { page, per_page })
    }
}

/// Slice of the catalog selected by a [`PageRequest`], plus its links.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageWindow {
    pub total_items: u64,
    pub total_pages: u64,
    pub offset: u64,
    pub limit: u64,
    pub prev_page: Option<String>,
    pub next_page: Option<String>,
}

impl PageWindow {
    pub fn compute(req: PageRequest, total_items: u64, listing_path: &str) -> AppResult<Self> {
        let total_pages = total_pages(total_items, req.per_page);

        if total_items == 0 {
            return Ok(Self {
                total_items,
                total_pages,
                offset: 0,
                limit: 0,
                prev_page: None,
                next_page: None,
            });
        }

        if req.page > total_pages {
            return Err(AppError::not_found(format!(
                "Page {} exceeds available pages ({total_pages}).",
                req.page
            )));
        }

        let prev_page =
            (req.page > 1).then(|| page_link(listing_path, req.page - 1, req.per_page));
        let next_page =
            (req.page < total_pages).then(|| page_link(listing_path, req.page + 1, req.per_page));

        Ok(Self {
            total_items,
            total_pages,
            offset: (req.page - 1) * req.per_page,
            limit: req.per_page,
            prev_page,
            next_page,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }
}

pub fn total_pages(total_items: u64, per_page: u64) -> u64 {
    total_items.div_ceil(per_page.max(1))
}

fn page_link(listing_path: &str, page: u64, per_page: u64) -> String {
    format!("{listing_path}?page={page}&per_page={per_page}")
}
