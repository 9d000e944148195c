//! Search composition: term filter, sort key selection and page slicing

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;
use crate::model::{Contact, SearchParams};

pub const DEFAULT_PAGE_NUMBER: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    FirstName,
    LastName,
    Email,
    CreatedAt,
}

impl SortField {
    /// Case-insensitive; anything unrecognised sorts by last name
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "firstname" => SortField::FirstName,
            "email" => SortField::Email,
            "createdat" => SortField::CreatedAt,
            _ => SortField::LastName,
        }
    }

    fn compare(self, a: &Contact, b: &Contact) -> Ordering {
        match self {
            SortField::FirstName => a.first_name.cmp(&b.first_name),
            SortField::LastName => a.last_name.cmp(&b.last_name),
            SortField::Email => a.email.cmp(&b.email),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Only "desc" (any case) sorts descending
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

/// Caller-supplied search request, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    pub search_term: Option<String>,
    pub page_number: i64,
    pub page_size: i64,
    pub sort_by: String,
    pub sort_order: String,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            search_term: None,
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: "lastName".to_string(),
            sort_order: "asc".to_string(),
        }
    }
}

impl From<SearchParams> for SearchCriteria {
    fn from(params: SearchParams) -> Self {
        let defaults = SearchCriteria::default();
        Self {
            search_term: params.search_term,
            page_number: params.page_number.unwrap_or(defaults.page_number),
            page_size: params.page_size.unwrap_or(defaults.page_size),
            sort_by: params.sort_by.unwrap_or(defaults.sort_by),
            sort_order: params.sort_order.unwrap_or(defaults.sort_order),
        }
    }
}

/// A validated search: normalized term, sort and page window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactQuery {
    /// Lowercased, trimmed; `None` when blank
    pub term: Option<String>,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub page_number: u64,
    /// Effective page size, at most `MAX_PAGE_SIZE`
    pub page_size: u64,
}

impl ContactQuery {
    pub fn from_criteria(criteria: &SearchCriteria) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if criteria.page_number < 1 {
            errors.add("pageNumber", "page number must be greater than 0");
        }
        if criteria.page_size < 1 {
            errors.add("pageSize", "page size must be at least 1");
        }

        let term = criteria
            .search_term
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);

        errors.into_result(Self {
            term,
            sort_field: SortField::parse(&criteria.sort_by),
            sort_order: SortOrder::parse(&criteria.sort_order),
            page_number: criteria.page_number.max(1) as u64,
            page_size: effective_page_size(criteria.page_size),
        })
    }

    pub fn matches(&self, contact: &Contact) -> bool {
        match &self.term {
            Some(term) => {
                contact.first_name.to_lowercase().contains(term)
                    || contact.last_name.to_lowercase().contains(term)
                    || contact.email.to_lowercase().contains(term)
            }
            None => true,
        }
    }

    /// Filter, sort and slice `contacts` into the requested page
    pub fn run(&self, contacts: Vec<Contact>) -> PagedResult<Contact> {
        let mut matching: Vec<Contact> = contacts.into_iter().filter(|c| self.matches(c)).collect();
        sort_contacts(&mut matching, self.sort_field, self.sort_order);
        PagedResult::slice(matching, self.page_number, self.page_size)
    }
}

/// Requested size clamped to `MAX_PAGE_SIZE`; values below 1 are rejected earlier
pub fn effective_page_size(requested: i64) -> u64 {
    requested.clamp(1, MAX_PAGE_SIZE) as u64
}

pub fn total_pages(total_count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size)
}

/// Stable sort on the chosen key only; ties keep their incoming order
pub fn sort_contacts(contacts: &mut [Contact], field: SortField, order: SortOrder) {
    match order {
        SortOrder::Asc => contacts.sort_by(|a, b| field.compare(a, b)),
        SortOrder::Desc => contacts.sort_by(|a, b| field.compare(b, a)),
    }
}

/// One page of results plus the numbers needed to navigate the rest
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub page_number: u64,
    pub page_size: u64,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T> PagedResult<T> {
    /// Builds the page starting at `(page_number - 1) * page_size` of an
    /// already filtered and ordered set
    pub fn slice(all: Vec<T>, page_number: u64, page_size: u64) -> Self {
        let total_count = all.len() as u64;
        let skip = page_number.saturating_sub(1).saturating_mul(page_size);
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let take = usize::try_from(page_size).unwrap_or(usize::MAX);

        let items = all.into_iter().skip(skip).take(take).collect();
        let total_pages = total_pages(total_count, page_size);

        Self {
            items,
            page_number,
            page_size,
            total_count,
            total_pages,
            has_previous_page: page_number > 1,
            has_next_page: page_number < total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn contact(id: u64, first: &str, last: &str, email: &str) -> Contact {
        let created = Utc.with_ymd_and_hms(2024, 1, id as u32, 12, 0, 0).unwrap();
        Contact {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            phone_number: None,
            address: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn sample() -> Vec<Contact> {
        vec![
            contact(1, "Alpha", "A", "a@x"),
            contact(2, "Beta", "B", "b@x"),
            contact(3, "Gamma", "C", "c@x"),
        ]
    }

    fn criteria() -> SearchCriteria {
        SearchCriteria::default()
    }

    #[test]
    fn sort_field_parsing_defaults_to_last_name() {
        assert_eq!(SortField::parse("FirstName"), SortField::FirstName);
        assert_eq!(SortField::parse("EMAIL"), SortField::Email);
        assert_eq!(SortField::parse("createdAt"), SortField::CreatedAt);
        assert_eq!(SortField::parse("lastName"), SortField::LastName);
        assert_eq!(SortField::parse("phoneNumber"), SortField::LastName);
        assert_eq!(SortField::parse(""), SortField::LastName);
    }

    #[test]
    fn sort_order_parsing() {
        assert_eq!(SortOrder::parse("DESC"), SortOrder::Desc);
        assert_eq!(SortOrder::parse("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::parse("descending"), SortOrder::Asc);
    }

    #[test]
    fn page_size_is_clamped_to_maximum() {
        assert_eq!(effective_page_size(250), 100);
        assert_eq!(effective_page_size(100), 100);
        assert_eq!(effective_page_size(7), 7);
    }

    #[test]
    fn rejects_non_positive_paging() {
        let mut bad = criteria();
        bad.page_number = 0;
        bad.page_size = -3;
        let errors = ContactQuery::from_criteria(&bad).unwrap_err();
        assert!(errors.contains("pageNumber"));
        assert!(errors.contains("pageSize"));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn email_desc_first_page() {
        let mut search = criteria();
        search.sort_by = "email".to_string();
        search.sort_order = "desc".to_string();
        search.page_size = 2;

        let page = ContactQuery::from_criteria(&search).unwrap().run(sample());
        let emails: Vec<&str> = page.items.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(emails, vec!["c@x", "b@x"]);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_next_page);
        assert!(!page.has_previous_page);
    }

    #[test]
    fn term_matches_names_and_email_case_insensitively() {
        let mut contacts = sample();
        contacts.push(contact(4, "Delta", "D", "Alice@X.com"));

        let mut search = criteria();
        search.search_term = Some("  ALICE ".to_string());
        let page = ContactQuery::from_criteria(&search).unwrap().run(contacts.clone());
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, 4);

        search.search_term = Some("amm".to_string());
        let page = ContactQuery::from_criteria(&search).unwrap().run(contacts);
        assert_eq!(page.items[0].first_name, "Gamma");
    }

    #[test]
    fn term_in_phone_or_address_only_does_not_match() {
        let mut reachable = contact(4, "Delta", "D", "d@x");
        reachable.phone_number = Some("+1 555 0199".to_string());
        reachable.address = Some("Baker Street".to_string());
        let mut contacts = sample();
        contacts.push(reachable);

        for term in ["0199", "baker"] {
            let mut search = criteria();
            search.search_term = Some(term.to_string());
            let page = ContactQuery::from_criteria(&search).unwrap().run(contacts.clone());
            assert_eq!(page.total_count, 0, "{term}");
            assert!(page.items.is_empty());
        }
    }

    #[test]
    fn term_matching_only_last_name_is_found() {
        let mut contacts = sample();
        contacts.push(contact(4, "Delta", "Lovelace", "d@x"));

        let mut search = criteria();
        search.search_term = Some("LOVE".to_string());
        let page = ContactQuery::from_criteria(&search).unwrap().run(contacts);
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].id, 4);
    }

    #[test]
    fn created_at_sorts_both_directions() {
        // Incoming order differs from creation order
        let contacts = vec![
            contact(2, "Beta", "B", "b@x"),
            contact(3, "Gamma", "C", "c@x"),
            contact(1, "Alpha", "A", "a@x"),
        ];

        let mut search = criteria();
        search.sort_by = "createdAt".to_string();
        let page = ContactQuery::from_criteria(&search).unwrap().run(contacts.clone());
        assert_eq!(page.items.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        search.sort_order = "desc".to_string();
        let page = ContactQuery::from_criteria(&search).unwrap().run(contacts);
        assert_eq!(page.items.iter().map(|c| c.id).collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn first_name_sort_orders_the_page() {
        let contacts = vec![
            contact(1, "Zoe", "A", "z@x"),
            contact(2, "Mia", "B", "m@x"),
            contact(3, "Ada", "C", "ad@x"),
            contact(4, "Lea", "D", "l@x"),
        ];

        let mut search = criteria();
        search.sort_by = "firstName".to_string();
        let page = ContactQuery::from_criteria(&search).unwrap().run(contacts);
        let names: Vec<&str> = page.items.iter().map(|c| c.first_name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Lea", "Mia", "Zoe"]);
    }

    #[test]
    fn blank_term_is_ignored() {
        let mut search = criteria();
        search.search_term = Some("   ".to_string());
        let query = ContactQuery::from_criteria(&search).unwrap();
        assert_eq!(query.term, None);
        assert_eq!(query.run(sample()).total_count, 3);
    }

    #[test]
    fn no_match_gives_empty_first_page() {
        let mut search = criteria();
        search.search_term = Some("zzz".to_string());
        let page = ContactQuery::from_criteria(&search).unwrap().run(sample());
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next_page);
        assert!(!page.has_previous_page);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let mut search = criteria();
        search.page_number = 50;
        let page = ContactQuery::from_criteria(&search).unwrap().run(sample());
        assert!(page.items.is_empty());
        assert_eq!(page.page_number, 50);
        assert_eq!(page.total_count, 3);
        assert!(page.has_previous_page);
        assert!(!page.has_next_page);
    }

    #[test]
    fn ties_keep_incoming_order_in_both_directions() {
        let contacts = vec![
            contact(1, "Same", "Z", "1@x"),
            contact(2, "Same", "Y", "2@x"),
            contact(3, "Other", "X", "3@x"),
        ];

        let mut asc = contacts.clone();
        sort_contacts(&mut asc, SortField::FirstName, SortOrder::Asc);
        assert_eq!(asc.iter().map(|c| c.id).collect::<Vec<_>>(), vec![3, 1, 2]);

        let mut desc = contacts;
        sort_contacts(&mut desc, SortField::FirstName, SortOrder::Desc);
        assert_eq!(desc.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn full_pages_except_last() {
        let items: Vec<u32> = (0..23).collect();
        for page_number in 1..=3 {
            let page = PagedResult::slice(items.clone(), page_number, 10);
            if page_number < 3 {
                assert_eq!(page.items.len(), 10);
            } else {
                assert_eq!(page.items.len(), 3);
            }
            assert_eq!(page.total_pages, 3);
            assert_eq!(page.has_next_page, page_number < 3);
        }
    }

    #[test]
    fn huge_page_number_does_not_overflow() {
        let page = PagedResult::slice(vec![1, 2, 3], u64::MAX, 100);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }
}
