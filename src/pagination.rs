//! Fetched pages of a search session and the page links shown under the table.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::lead::{LeadRecord, Page};
use crate::domain::types::PageNumber;

/// Ordered set of fetched pages plus the flattened lead list used for export.
#[derive(Debug)]
pub struct PageStore {
    pages: BTreeMap<PageNumber, Page>,
    current_page: PageNumber,
    accumulated_leads: Vec<LeadRecord>,
}

impl Default for PageStore {
    fn default() -> Self {
        Self {
            pages: BTreeMap::new(),
            current_page: PageNumber::FIRST,
            accumulated_leads: Vec::new(),
        }
    }
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every page and moves back to page one.
    pub fn reset(&mut self) {
        self.pages.clear();
        self.accumulated_leads.clear();
        self.current_page = PageNumber::FIRST;
    }

    /// Inserts or replaces a page and appends its leads to the accumulated list.
    ///
    /// The controller only ever adds [`PageStore::next_page_number`], so pages
    /// stay contiguous and unique within a session.
    pub fn add_page(&mut self, number: PageNumber, leads: Vec<LeadRecord>) {
        self.accumulated_leads.extend(leads.iter().cloned());
        self.pages.insert(number, Page::new(number, leads));
    }

    /// Switches to a loaded page. Returns `false` when the page is not loaded.
    pub fn select_page(&mut self, number: PageNumber) -> bool {
        if self.contains(number) {
            self.current_page = number;
            true
        } else {
            false
        }
    }

    /// Leads of the selected page, empty when it is not loaded.
    pub fn visible_leads(&self) -> &[LeadRecord] {
        self.pages
            .get(&self.current_page)
            .map(|page| page.leads.as_slice())
            .unwrap_or_default()
    }

    /// Every lead fetched in this session, in fetch order.
    pub fn all_leads(&self) -> &[LeadRecord] {
        &self.accumulated_leads
    }

    pub fn current_page(&self) -> PageNumber {
        self.current_page
    }

    pub fn contains(&self, number: PageNumber) -> bool {
        self.pages.contains_key(&number)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// The only page number that may be fetched next.
    pub fn next_page_number(&self) -> PageNumber {
        PageNumber::FIRST.advance(self.pages.len())
    }

    /// Loaded page numbers in ascending order.
    pub fn page_numbers(&self) -> Vec<usize> {
        self.pages.keys().map(|number| number.get()).collect()
    }
}

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// Page buttons rendered under the results table.
///
/// `None` entries are gaps in a long run of pages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub pages: Vec<Option<usize>>,
    pub current: usize,
    /// Page that can be fetched next, present when more results exist.
    pub fetchable: Option<usize>,
    pub can_go_prev: bool,
    pub can_go_next: bool,
}

impl PageLinks {
    /// Builds the links for the loaded pages, adding the next page when the
    /// API reported more results.
    pub fn new(store: &PageStore, has_more: bool, loading: bool) -> Self {
        let loaded = store.len();
        if loaded == 0 {
            return Self::default();
        }

        let current = store.current_page().get();
        let total_pages = if has_more { loaded + 1 } else { loaded };
        let pages = get_pages(total_pages, current, 2, 2, 4, 2);

        Self {
            pages,
            current,
            fetchable: has_more.then_some(loaded + 1),
            can_go_prev: current > 1 && !loading,
            can_go_next: !loading && (has_more || current < loaded),
        }
    }

    /// A page button is clickable when it is loaded or fetchable next.
    pub fn is_enabled(&self, page: usize, loading: bool) -> bool {
        if loading {
            return false;
        }
        let loaded_last = self.fetchable.map_or_else(
            || self.pages.iter().flatten().max().copied().unwrap_or(0),
            |next| next - 1,
        );
        (1..=loaded_last).contains(&page) || self.fetchable == Some(page)
    }
}
