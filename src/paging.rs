use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MIN_PAGE_SIZE: i64 = 5;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total_records: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub records_per_page: i64,
    pub offset: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// The page number is taken as given. Callers clamp it with [`clamp_page`]
/// first; a page past the end produces an offset past the last row. The
/// offset saturates instead of overflowing for absurd page numbers.
pub fn page_info(total_records: i64, current_page: i64, page_size: i64) -> PageInfo {
    let total_pages = if page_size > 0 {
        (total_records.max(0) + page_size - 1) / page_size
    } else {
        0
    };
    PageInfo {
        total_records,
        total_pages,
        current_page,
        records_per_page: page_size,
        offset: current_page.saturating_sub(1).saturating_mul(page_size),
        has_next: current_page < total_pages,
        has_prev: current_page > 1,
    }
}

pub fn clamp_page(raw: Option<i64>) -> i64 {
    raw.unwrap_or(1).max(1)
}

pub fn clamp_page_size(raw: Option<i64>) -> i64 {
    raw.unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page { number: i64, active: bool },
    Gap,
}

/// Page links for a list view: `current ± radius`, plus the first and last
/// page, with a gap where numbers are skipped.
pub fn page_window(info: &PageInfo, radius: i64) -> Vec<PageLink> {
    if info.total_pages <= 1 {
        return Vec::new();
    }
    let current = info.current_page;
    let start = current.saturating_sub(radius).max(1);
    let end = current.saturating_add(radius).min(info.total_pages);

    let mut links = Vec::new();
    let page = |n: i64| PageLink::Page {
        number: n,
        active: n == current,
    };
    if start > 1 {
        links.push(page(1));
        if start > 2 {
            links.push(PageLink::Gap);
        }
    }
    for n in start..=end {
        links.push(page(n));
    }
    if end < info.total_pages {
        if end < info.total_pages - 1 {
            links.push(PageLink::Gap);
        }
        links.push(page(info.total_pages));
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_has_no_pages() {
        let p = page_info(0, 1, 10);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
        assert!(!p.has_next);
        assert!(!p.has_prev);
    }

    #[test]
    fn partial_last_page_rounds_up() {
        let p = page_info(23, 1, 10);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(!p.has_prev);

        let p = page_info(23, 3, 10);
        assert_eq!(p.offset, 20);
        assert!(!p.has_next);
        assert!(p.has_prev);

        let p = page_info(20, 2, 10);
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_next);
    }

    #[test]
    fn past_end_page_is_not_reclamped() {
        let p = page_info(23, 7, 10);
        assert_eq!(p.offset, 60);
        assert!(!p.has_next);
        assert!(p.has_prev);

        let p = page_info(23, 0, 10);
        assert_eq!(p.offset, -10);
    }

    #[test]
    fn huge_page_number_saturates_offset() {
        let p = page_info(2300, i64::MAX, 100);
        assert_eq!(p.offset, i64::MAX);
        assert!(!p.has_next);
        assert!(p.has_prev);
        let links = page_window(&p, 2);
        assert_eq!(links.first(), Some(&PageLink::Page { number: 1, active: false }));
    }

    #[test]
    fn zero_page_size_does_not_divide() {
        let p = page_info(23, 1, 0);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn clamps_follow_list_defaults() {
        assert_eq!(clamp_page(None), 1);
        assert_eq!(clamp_page(Some(0)), 1);
        assert_eq!(clamp_page(Some(-4)), 1);
        assert_eq!(clamp_page(Some(6)), 6);
        assert_eq!(clamp_page_size(None), 10);
        assert_eq!(clamp_page_size(Some(1)), 5);
        assert_eq!(clamp_page_size(Some(1000)), 100);
        assert_eq!(clamp_page_size(Some(25)), 25);
    }

    #[test]
    fn window_marks_gaps_and_edges() {
        let p = page_info(200, 10, 10);
        let links = page_window(&p, 2);
        let expected = vec![
            PageLink::Page { number: 1, active: false },
            PageLink::Gap,
            PageLink::Page { number: 8, active: false },
            PageLink::Page { number: 9, active: false },
            PageLink::Page { number: 10, active: true },
            PageLink::Page { number: 11, active: false },
            PageLink::Page { number: 12, active: false },
            PageLink::Gap,
            PageLink::Page { number: 20, active: false },
        ];
        assert_eq!(links, expected);
    }

    #[test]
    fn window_without_gaps_near_start() {
        let p = page_info(40, 2, 10);
        let numbers: Vec<_> = page_window(&p, 2)
            .into_iter()
            .map(|l| match l {
                PageLink::Page { number, .. } => number,
                PageLink::Gap => 0,
            })
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn single_page_has_no_window() {
        assert!(page_window(&page_info(7, 1, 10), 2).is_empty());
        assert!(page_window(&page_info(0, 1, 10), 2).is_empty());
    }
}
