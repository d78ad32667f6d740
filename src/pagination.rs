//! This modules defines the common functionality for paging data.

use maud::{Markup, html};

use crate::html::LINK_STYLE;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of rows to display per page.
    pub default_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 20,
            max_pages: 5,
        }
    }
}

/// The slice of rows to show for a requested page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// The page to display, starting from 1.
    pub page: u64,
    /// The total number of pages, at least 1.
    pub page_count: u64,
    pub limit: u64,
    pub offset: u64,
}

impl PaginationConfig {
    /// Work out which page to show for the raw `page` query parameter when
    /// there are `row_count` rows in total.
    ///
    /// A missing or non-integer page falls back to the default page. Any
    /// integer outside `1..=page_count`, including zero and negative numbers,
    /// shows the last page.
    pub fn resolve_page(&self, page: Option<&str>, row_count: u64) -> PageWindow {
        let page_size = self.default_page_size.max(1);
        let page_count = row_count.div_ceil(page_size).max(1);

        let page = match page.and_then(|page| page.trim().parse::<i64>().ok()) {
            Some(requested) if requested >= 1 => (requested as u64).min(page_count),
            Some(_) => page_count,
            None => self.default_page.clamp(1, page_count),
        };

        PageWindow {
            page,
            page_count,
            limit: page_size,
            offset: (page - 1) * page_size,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let map_page = |page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    };

    let mut indicators: Vec<PaginationIndicator> = if page_count <= max_pages {
        (1..=page_count).map(map_page).collect()
    } else if curr_page <= (max_pages / 2) {
        (1..=max_pages).map(map_page).collect()
    } else if curr_page > (page_count - max_pages / 2) {
        ((page_count - max_pages + 1)..=page_count)
            .map(map_page)
            .collect()
    } else {
        ((curr_page - max_pages / 2)..=(curr_page + max_pages / 2))
            .map(map_page)
            .collect()
    };

    if page_count > max_pages {
        if curr_page > (max_pages / 2) + 1 {
            indicators.insert(0, PaginationIndicator::Page(1));
            indicators.insert(1, PaginationIndicator::Ellipsis);
        }

        if curr_page < (page_count - max_pages / 2) {
            indicators.push(PaginationIndicator::Ellipsis);
            indicators.push(PaginationIndicator::Page(page_count));
        }
    }

    if curr_page > 1 {
        indicators.insert(0, PaginationIndicator::BackButton(curr_page - 1));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

/// Render the pagination indicators as a list of links.
///
/// `page_url` produces the link for a page number. Nothing is rendered when
/// there is only one page.
pub fn pagination_view(
    window: PageWindow,
    max_pages: u64,
    page_url: impl Fn(u64) -> String,
) -> Markup {
    if window.page_count <= 1 {
        return html! {};
    }

    let indicators = create_pagination_indicators(window.page, window.page_count, max_pages);

    html! {
        nav class="pagination flex justify-center my-4" aria-label="Pagination"
        {
            ul class="flex items-center gap-2 text-sm"
            {
                @for indicator in indicators {
                    li {
                        @match indicator {
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(page)) class=(LINK_STYLE) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                span
                                    aria-current="page"
                                    class="px-2 py-1 rounded bg-blue-600 text-white"
                                {
                                    (page)
                                }
                            }
                            PaginationIndicator::Ellipsis => span { "..." },
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(page)) class=(LINK_STYLE) { "Back" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(page)) class=(LINK_STYLE) { "Next" }
                            }
                        }
                    }
                }
            }
        }
    }
}
