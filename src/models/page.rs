//! Pagination request and result types.

use std::cmp::Ordering;

use serde::Deserialize;

use super::Program;
use crate::errors::AppError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 2000;

/// Raw pagination query parameters (`?page=0&size=20&sort=title,desc&sort=id`).
///
/// `sort` may repeat; each value is `prop[,prop...][,asc|desc]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub sort: Vec<String>,
}

/// A sortable program property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Description,
    StartDate,
    EndDate,
    Tags,
    CoverContentType,
}

impl SortField {
    pub fn from_property(property: &str) -> Option<Self> {
        match property {
            "id" => Some(SortField::Id),
            "title" => Some(SortField::Title),
            "description" => Some(SortField::Description),
            "startDate" => Some(SortField::StartDate),
            "endDate" => Some(SortField::EndDate),
            "tags" => Some(SortField::Tags),
            "coverContentType" => Some(SortField::CoverContentType),
            _ => None,
        }
    }

    /// Name of the property on the wire.
    pub fn property(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::Description => "description",
            SortField::StartDate => "startDate",
            SortField::EndDate => "endDate",
            SortField::Tags => "tags",
            SortField::CoverContentType => "coverContentType",
        }
    }

    /// Name of the backing column.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::Description => "description",
            SortField::StartDate => "start_date",
            SortField::EndDate => "end_date",
            SortField::Tags => "tags",
            SortField::CoverContentType => "cover_content_type",
        }
    }

    /// Compare two programs on this property. Unset values sort first.
    pub fn compare(&self, a: &Program, b: &Program) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Title => a.title.cmp(&b.title),
            SortField::Description => a.description.cmp(&b.description),
            SortField::StartDate => a.start_date.cmp(&b.start_date),
            SortField::EndDate => a.end_date.cmp(&b.end_date),
            SortField::Tags => a.tags.cmp(&b.tags),
            SortField::CoverContentType => a.cover_content_type.cmp(&b.cover_content_type),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: Direction,
}

/// A validated page specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Vec<SortOrder>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
        }
    }
}

impl PageRequest {
    /// Validate raw query parameters.
    ///
    /// A size of zero falls back to the default; sizes above the maximum are capped.
    pub fn from_params(params: &PageParams) -> Result<Self, AppError> {
        let size = match params.size {
            None | Some(0) => DEFAULT_PAGE_SIZE,
            Some(size) => size.min(MAX_PAGE_SIZE),
        };

        let mut sort = Vec::new();
        for value in params.sort.iter().filter(|v| !v.trim().is_empty()) {
            sort.extend(parse_sort(value)?);
        }

        Ok(Self {
            page: params.page.unwrap_or(0),
            size,
            sort,
        })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Sort orders with `id` appended as a tie-breaker so pages are stable.
    pub fn effective_sort(&self) -> Vec<SortOrder> {
        let mut orders = self.sort.clone();
        if !orders.iter().any(|o| o.field == SortField::Id) {
            orders.push(SortOrder {
                field: SortField::Id,
                direction: Direction::Asc,
            });
        }
        orders
    }

    /// Sort as it appears in a query string, one `sort=` pair per order.
    ///
    /// The result parses back into the same orders through [`PageParams`].
    pub fn sort_query(&self) -> Option<String> {
        if self.sort.is_empty() {
            return None;
        }
        Some(
            self.sort
                .iter()
                .map(|o| format!("sort={},{}", o.field.property(), o.direction.as_str()))
                .collect::<Vec<_>>()
                .join("&"),
        )
    }
}

/// Parse `prop[,prop...][,asc|desc]`.
fn parse_sort(sort: &str) -> Result<Vec<SortOrder>, AppError> {
    let mut parts: Vec<&str> = sort.split(',').map(str::trim).collect();

    let direction = match parts.last().map(|p| p.to_ascii_lowercase()) {
        Some(last) if last == "asc" => {
            parts.pop();
            Direction::Asc
        }
        Some(last) if last == "desc" => {
            parts.pop();
            Direction::Desc
        }
        _ => Direction::Asc,
    };

    if parts.is_empty() {
        return Err(AppError::BadRequest(format!("Invalid sort: {}", sort)));
    }

    parts
        .into_iter()
        .map(|property| {
            SortField::from_property(property)
                .map(|field| SortOrder { field, direction })
                .ok_or_else(|| AppError::BadRequest(format!("Unknown sort property: {}", property)))
        })
        .collect()
}

/// One page of results plus the total number of matching records.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u32 {
        if self.size == 0 {
            return 1;
        }
        let pages = self.total.div_ceil(u64::from(self.size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Index of the following page, if there is one.
    pub fn next_page(&self) -> Option<u32> {
        self.page
            .checked_add(1)
            .filter(|next| *next < self.total_pages())
    }

    pub fn has_next(&self) -> bool {
        self.next_page().is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u32>, size: Option<u32>, sort: Option<&str>) -> PageParams {
        PageParams {
            page,
            size,
            sort: sort.into_iter().map(str::to_string).collect(),
        }
    }

    #[test]
    fn test_defaults() {
        let request = PageRequest::from_params(&PageParams::default()).unwrap();
        assert_eq!(request, PageRequest::default());
        assert_eq!(request.offset(), 0);
        assert!(request.sort_query().is_none());
    }

    #[test]
    fn test_size_is_capped_and_zero_falls_back() {
        let capped = PageRequest::from_params(&params(Some(3), Some(5000), None)).unwrap();
        assert_eq!(capped.size, MAX_PAGE_SIZE);
        assert_eq!(capped.offset(), 3 * u64::from(MAX_PAGE_SIZE));

        let zero = PageRequest::from_params(&params(None, Some(0), None)).unwrap();
        assert_eq!(zero.size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_sort_parsing() {
        let request = PageRequest::from_params(&params(None, None, Some("id,desc"))).unwrap();
        assert_eq!(
            request.sort,
            vec![SortOrder {
                field: SortField::Id,
                direction: Direction::Desc
            }]
        );
        assert_eq!(request.effective_sort().len(), 1);

        let multi =
            PageRequest::from_params(&params(None, None, Some("startDate,title,DESC"))).unwrap();
        assert_eq!(multi.sort.len(), 2);
        assert!(multi.sort.iter().all(|o| o.direction == Direction::Desc));
        assert_eq!(
            multi.sort_query().as_deref(),
            Some("sort=startDate,desc&sort=title,desc")
        );
        assert_eq!(multi.effective_sort().last().unwrap().field, SortField::Id);

        let bare = PageRequest::from_params(&params(None, None, Some("title"))).unwrap();
        assert_eq!(bare.sort[0].direction, Direction::Asc);
    }

    #[test]
    fn test_repeated_sort_values_concatenate() {
        let request = PageRequest::from_params(&PageParams {
            page: None,
            size: None,
            sort: vec!["title,desc".to_string(), " ".to_string(), "startDate".to_string()],
        })
        .unwrap();

        assert_eq!(
            request.sort,
            vec![
                SortOrder {
                    field: SortField::Title,
                    direction: Direction::Desc
                },
                SortOrder {
                    field: SortField::StartDate,
                    direction: Direction::Asc
                },
            ]
        );
        assert_eq!(
            request.sort_query().as_deref(),
            Some("sort=title,desc&sort=startDate,asc")
        );
    }

    #[test]
    fn test_sort_rejects_unknown_property() {
        let err = PageRequest::from_params(&params(None, None, Some("owner,asc"))).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = PageRequest::from_params(&params(None, None, Some("desc"))).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_page_navigation() {
        let page: Page<()> = Page {
            content: Vec::new(),
            total: 45,
            page: 0,
            size: 20,
        };
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(!page.has_previous());

        let last = Page { page: 2, ..page };
        assert!(!last.has_next());
        assert!(last.has_previous());
    }

    #[test]
    fn test_next_page_at_u32_max() {
        let page: Page<()> = Page {
            content: Vec::new(),
            total: 1,
            page: u32::MAX,
            size: 20,
        };
        assert_eq!(page.next_page(), None);
        assert!(page.has_previous());

        let huge: Page<()> = Page {
            content: Vec::new(),
            total: u64::MAX,
            page: u32::MAX,
            size: 1,
        };
        assert_eq!(huge.total_pages(), u32::MAX);
        assert_eq!(huge.next_page(), None);
    }
}
