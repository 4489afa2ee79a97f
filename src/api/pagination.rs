//! Pagination response headers (`X-Total-Count` and `Link`).

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::models::{Page, PageRequest};

pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// Headers describing where `page` sits in the full result set.
///
/// Links keep the request's sort and are emitted in the order
/// `next`, `prev`, `last`, `first`.
pub fn pagination_headers<T>(path: &str, request: &PageRequest, page: &Page<T>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(page.total));

    let sort = request.sort_query();
    let link = |number: u32, rel: &str| {
        let mut uri = format!("{}?page={}&size={}", path, number, page.size);
        if let Some(sort) = &sort {
            uri.push('&');
            uri.push_str(sort);
        }
        format!("<{}>; rel=\"{}\"", uri, rel)
    };

    let mut links = Vec::with_capacity(4);
    if let Some(next) = page.next_page() {
        links.push(link(next, "next"));
    }
    if page.has_previous() {
        links.push(link(page.page - 1, "prev"));
    }
    links.push(link(page.total_pages().saturating_sub(1), "last"));
    links.push(link(0, "first"));

    match HeaderValue::try_from(links.join(",")) {
        Ok(value) => {
            headers.insert(header::LINK, value);
        }
        Err(e) => tracing::warn!("Skipping Link header: {}", e),
    }

    headers
}
