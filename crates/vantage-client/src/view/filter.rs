//! Client-side search, select filters and sorting over an already fetched list.
//!
//! A filter never touches the cache: it is a pure function of the list and
//! the current inputs, so it can run on every render.

use std::cmp::Ordering;

use vantage_types::models::{Campaign, Company, Deal, Event, HedgeFund, Investor};

/// A select filter's field. `All` is represented by leaving the facet unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Status,
    Industry,
    Category,
    Kind,
    Sector,
    Strategy,
}

pub trait Listable {
    /// Text fields the search box matches against.
    fn search_text(&self) -> Vec<&str>;

    fn facet(&self, facet: Facet) -> Option<&str>;

    fn sort_name(&self) -> &str;

    /// The numeric column a list sorts by (funding, AUM, date...).
    fn sort_value(&self) -> f64 {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Server order.
    #[default]
    None,
    NameAsc,
    NameDesc,
    ValueAsc,
    ValueDesc,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub search: String,
    pub facets: Vec<(Facet, String)>,
    pub sort: SortOrder,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    /// Set a select filter. `"all"` (any case) or an empty value clears it.
    pub fn facet(mut self, facet: Facet, value: impl Into<String>) -> Self {
        let value = value.into();
        self.facets.retain(|(f, _)| *f != facet);
        if !value.is_empty() && !value.eq_ignore_ascii_case("all") {
            self.facets.push((facet, value));
        }
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.facets.is_empty() && self.sort == SortOrder::None
    }

    pub fn matches<T: Listable>(&self, item: &T) -> bool {
        let needle = self.search.trim().to_lowercase();
        let text_ok = needle.is_empty()
            || item
                .search_text()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
        text_ok
            && self
                .facets
                .iter()
                .all(|(facet, want)| item.facet(*facet).is_some_and(|have| have.eq_ignore_ascii_case(want)))
    }

    /// Borrowing view over `items`: kept rows in their original order, then a
    /// stable sort if one is selected.
    pub fn apply<'a, T: Listable>(&self, items: &'a [T]) -> Vec<&'a T> {
        let mut out: Vec<&T> = items.iter().filter(|item| self.matches(*item)).collect();
        self.sort_refs(&mut out);
        out
    }

    pub fn apply_owned<T: Listable + Clone>(&self, items: &[T]) -> Vec<T> {
        self.apply(items).into_iter().cloned().collect()
    }

    fn sort_refs<T: Listable>(&self, items: &mut [&T]) {
        let by_name = |a: &&T, b: &&T| a.sort_name().to_lowercase().cmp(&b.sort_name().to_lowercase());
        let by_value = |a: &&T, b: &&T| a.sort_value().partial_cmp(&b.sort_value()).unwrap_or(Ordering::Equal);
        match self.sort {
            SortOrder::None => {}
            SortOrder::NameAsc => items.sort_by(by_name),
            SortOrder::NameDesc => items.sort_by(|a, b| by_name(b, a)),
            SortOrder::ValueAsc => items.sort_by(by_value),
            SortOrder::ValueDesc => items.sort_by(|a, b| by_value(b, a)),
        }
    }
}

// -- Entity impls --

impl Listable for Company {
    fn search_text(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.industry.as_str(), self.description.as_str()]
    }

    fn facet(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Status => Some(self.status.as_str()),
            Facet::Industry => Some(self.industry.as_str()),
            _ => None,
        }
    }

    fn sort_name(&self) -> &str {
        &self.name
    }

    fn sort_value(&self) -> f64 {
        self.investors.len() as f64
    }
}

impl Listable for Investor {
    fn search_text(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.contact.email.as_deref());
        fields
    }

    fn facet(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Status => Some(self.status.as_str()),
            _ => None,
        }
    }

    fn sort_name(&self) -> &str {
        &self.name
    }

    fn sort_value(&self) -> f64 {
        self.company_ids.len() as f64
    }
}

impl Listable for Event {
    fn search_text(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.location.as_str()]
    }

    fn facet(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Status => Some(self.status.as_str()),
            Facet::Kind => Some(self.kind.as_str()),
            _ => None,
        }
    }

    fn sort_name(&self) -> &str {
        &self.title
    }

    fn sort_value(&self) -> f64 {
        self.date.timestamp() as f64
    }
}

impl Listable for Campaign {
    fn search_text(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.summary.as_str(), self.category.as_str()]
    }

    fn facet(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Category => Some(self.category.as_str()),
            _ => None,
        }
    }

    fn sort_name(&self) -> &str {
        &self.title
    }

    fn sort_value(&self) -> f64 {
        self.funding_progress()
    }
}

impl Listable for HedgeFund {
    fn search_text(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.strategy.as_str()]
    }

    fn facet(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Status => Some(self.status.as_str()),
            Facet::Strategy => Some(self.strategy.as_str()),
            _ => None,
        }
    }

    fn sort_name(&self) -> &str {
        &self.name
    }

    fn sort_value(&self) -> f64 {
        self.aum
    }
}

impl Listable for Deal {
    fn search_text(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.sector.as_str()]
    }

    fn facet(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Status => Some(self.status.as_str()),
            Facet::Sector => Some(self.sector.as_str()),
            _ => None,
        }
    }

    fn sort_name(&self) -> &str {
        &self.name
    }

    fn sort_value(&self) -> f64 {
        self.required_investment
    }
}
