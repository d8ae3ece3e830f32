/// Posts shown per feed page.
pub const POSTS_PER_PAGE: usize = 10;

/// One page of an ordered listing. Page numbers start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub per_page: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    /// Cut page `number` out of `items`. Page 0 is read as page 1; pages
    /// past the end are empty.
    pub fn paginate(items: Vec<T>, number: usize, per_page: usize) -> Self {
        let number = number.max(1);
        let per_page = per_page.max(1);
        let total_items = items.len();
        let items = items
            .into_iter()
            .skip((number - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();

        Self {
            items,
            number,
            per_page,
            total_items,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.per_page).max(1)
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            per_page: self.per_page,
            total_items: self.total_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page() {
        let page = Page::paginate((1..=25).collect(), 1, 10);
        assert_eq!(page.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
    }

    #[test]
    fn test_last_page_is_partial() {
        let page = Page::paginate((1..=25).collect(), 3, 10);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert!(!page.has_next());
    }

    #[test]
    fn test_page_zero_reads_as_first() {
        let page = Page::paginate(vec![1, 2, 3], 0, 10);
        assert_eq!(page.number, 1);
        assert_eq!(page.items, vec![1, 2, 3]);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = Page::paginate(vec![1, 2, 3], usize::MAX, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 3);
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let page: Page<u8> = Page::paginate(Vec::new(), 1, 10);
        assert_eq!(page.total_pages(), 1);
        assert!(!page.has_next());
    }
}
