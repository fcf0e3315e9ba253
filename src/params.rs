//! The search filters mirrored into the location query string.

use crate::query_state::{FieldValue, QueryFields};

/// Page sizes offered by the UI.
pub const PAGE_SIZES: [u32; 4] = [12, 18, 24, 36];

/// Page size used when none (or an unsupported one) is given.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_COUNTRY: &str = "us";

/// User-controlled search filters.
///
/// `page` is always at least 1 and `page_size` is always one of
/// [`PAGE_SIZES`]; [`QueryFields::set_field`] enforces both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub q: String,
    pub category: String,
    pub country: String,
    pub page: u32,
    pub page_size: u32,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            q: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryParams {
    // -- filter setters: anything other than the page itself resets page --

    pub fn set_search(&mut self, q: impl Into<String>) {
        self.q = q.into();
        self.page = 1;
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
        self.page = 1;
    }

    pub fn set_country(&mut self, country: impl Into<String>) {
        self.country = country.into();
        self.page = 1;
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = sanitize_page_size(page_size);
        self.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }
}

impl QueryFields for QueryParams {
    fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("q", FieldValue::Text(self.q.clone())),
            ("category", FieldValue::Text(self.category.clone())),
            ("country", FieldValue::Text(self.country.clone())),
            ("page", FieldValue::Number(self.page.into())),
            ("pageSize", FieldValue::Number(self.page_size.into())),
        ]
    }

    fn set_field(&mut self, key: &str, value: FieldValue) {
        match (key, value) {
            ("q", FieldValue::Text(s)) => self.q = s,
            ("category", FieldValue::Text(s)) => self.category = s,
            ("country", FieldValue::Text(s)) => self.country = s,
            ("page", FieldValue::Number(n)) => {
                self.page = u32::try_from(n).unwrap_or(1).max(1);
            }
            ("pageSize", FieldValue::Number(n)) => {
                self.page_size = sanitize_page_size(u32::try_from(n).unwrap_or(0));
            }
            _ => {}
        }
    }
}

fn sanitize_page_size(size: u32) -> u32 {
    if PAGE_SIZES.contains(&size) {
        size
    } else {
        DEFAULT_PAGE_SIZE
    }
}

/// Number of result pages: `max(1, ceil(total / page_size))`.
///
/// A zero page size is replaced by [`DEFAULT_PAGE_SIZE`].
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    let size = if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    };
    total.div_ceil(u64::from(size)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_setters_reset_page() {
        let mut p = QueryParams {
            page: 4,
            ..QueryParams::default()
        };
        p.set_search("x");
        assert_eq!(p.page, 1);

        p.page = 4;
        p.set_category("sports");
        assert_eq!(p.page, 1);

        p.page = 4;
        p.set_country("gb");
        assert_eq!(p.page, 1);

        p.page = 4;
        p.set_page_size(24);
        assert_eq!((p.page, p.page_size), (1, 24));
    }

    #[test]
    fn set_page_keeps_filters_and_floors_at_one() {
        let mut p = QueryParams::default();
        p.set_category("sports");
        p.set_page(3);
        assert_eq!(p.page, 3);
        assert_eq!(p.category, "sports");

        p.set_page(0);
        assert_eq!(p.page, 1);
    }

    #[test]
    fn set_field_sanitizes_numbers() {
        let mut p = QueryParams::default();
        p.set_field("page", FieldValue::Number(-3));
        assert_eq!(p.page, 1);
        p.set_field("page", FieldValue::Number(0));
        assert_eq!(p.page, 1);
        p.set_field("pageSize", FieldValue::Number(7));
        assert_eq!(p.page_size, DEFAULT_PAGE_SIZE);
        p.set_field("pageSize", FieldValue::Number(48));
        assert_eq!(p.page_size, DEFAULT_PAGE_SIZE);
        p.set_field("pageSize", FieldValue::Number(18));
        assert_eq!(p.page_size, 18);
        p.set_field("pageSize", FieldValue::Number(36));
        assert_eq!(p.page_size, 36);
    }

    #[test]
    fn total_pages_rounds_up_and_floors_at_one() {
        assert_eq!(total_pages(0, 12), 1);
        assert_eq!(total_pages(12, 12), 1);
        assert_eq!(total_pages(13, 12), 2);
        assert_eq!(total_pages(100, 6), 17);
    }

    #[test]
    fn total_pages_zero_size_uses_default() {
        assert_eq!(total_pages(25, 0), 3);
        assert_eq!(total_pages(0, 0), 1);
    }
}
