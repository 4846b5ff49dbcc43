use std::future::Future;

use tracing::debug;
use vantage_types::api::CampaignSearch;
use vantage_types::models::Campaign;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::query::{QueryCache, QueryObserver, QueryOptions, QueryState, keys};
use crate::services::campaigns;

pub const CAMPAIGN_PAGE_SIZE: usize = 12;

/// "Load more" list: each page is appended after the ones already shown.
///
/// `P` is whatever the caller keeps per page; the fetcher reports how many
/// items the page held. A page shorter than the limit means the server has
/// nothing left, after which `load_next` returns without calling the fetcher.
pub struct AccumulatingPager<P> {
    pages: Vec<P>,
    offset: usize,
    limit: usize,
    has_more: bool,
}

impl<P> AccumulatingPager<P> {
    pub fn new(limit: usize) -> Self {
        Self {
            pages: Vec::new(),
            offset: 0,
            limit: limit.max(1),
            has_more: true,
        }
    }

    pub fn pages(&self) -> &[P] {
        &self.pages
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Offset of the next page to request.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn reset(&mut self) {
        self.pages.clear();
        self.offset = 0;
        self.has_more = true;
    }

    /// Fetch the page at the current offset and append it. Returns how many
    /// items were added. A failed page leaves the list as it was.
    pub async fn load_next<F, Fut>(&mut self, fetch: F) -> Result<usize, ApiError>
    where
        F: FnOnce(usize, usize) -> Fut,
        Fut: Future<Output = Result<(P, usize), ApiError>>,
    {
        if !self.has_more {
            return Ok(0);
        }
        let (page, added) = fetch(self.offset, self.limit).await?;
        self.has_more = added >= self.limit;
        self.offset += added;
        self.pages.push(page);
        Ok(added)
    }
}

/// Crowdfunding list page: server-side search plus additive pagination.
///
/// Every loaded page stays mounted on its cache key, so a mutation that
/// invalidates `campaigns` refetches the pages on screen and `campaigns()`
/// reflects the new figures without reloading the list.
pub struct CampaignBrowser {
    api: ApiClient,
    cache: QueryCache,
    search: CampaignSearch,
    pager: AccumulatingPager<QueryObserver<Vec<Campaign>>>,
}

impl CampaignBrowser {
    pub fn new(api: ApiClient, cache: QueryCache) -> Self {
        Self {
            api,
            cache,
            search: CampaignSearch::default(),
            pager: AccumulatingPager::new(CAMPAIGN_PAGE_SIZE),
        }
    }

    pub fn search(&self) -> &CampaignSearch {
        &self.search
    }

    /// A different search starts over from the first page.
    pub fn set_search(&mut self, search: CampaignSearch) {
        if search != self.search {
            debug!("campaign search changed to {:?}, resetting pages", search);
            self.search = search;
            self.pager.reset();
        }
    }

    /// Loaded pages in order, as currently cached. A page whose refetch failed
    /// keeps showing its last good data.
    pub fn campaigns(&self) -> Vec<Campaign> {
        self.pager
            .pages()
            .iter()
            .filter_map(|page| self.cache.get_query_data::<Vec<Campaign>>(page.key()))
            .flatten()
            .collect()
    }

    pub fn has_more(&self) -> bool {
        self.pager.has_more()
    }

    pub async fn load_next(&mut self) -> Result<usize, ApiError> {
        let api = self.api.clone();
        let cache = self.cache.clone();
        let search = self.search.clone();
        self.pager
            .load_next(|offset, limit| async move {
                let key = keys::campaign_search(&search, offset);
                let mut page = cache.observe(key, QueryOptions::daily(), move || {
                    let api = api.clone();
                    let search = search.clone();
                    async move { campaigns::search(&api, &search, offset, limit).await }
                });
                match page.settled().await {
                    QueryState::Success(items) => {
                        let count = items.len();
                        Ok((page, count))
                    }
                    QueryState::Error(e) => Err(e),
                    // Entry dropped mid-fetch, e.g. by a sign-out.
                    QueryState::Idle | QueryState::Loading => Err(ApiError::Disabled),
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn short_page_ends_the_list() {
        let mut pager = AccumulatingPager::new(3);
        let calls = AtomicUsize::new(0);
        let fetch = |offset: usize, limit: usize| {
            calls.fetch_add(1, Ordering::SeqCst);
            let page: Vec<usize> = (offset..(offset + limit).min(5)).collect();
            async move {
                let len = page.len();
                Ok::<_, ApiError>((page, len))
            }
        };

        assert_eq!(pager.load_next(fetch).await, Ok(3));
        assert!(pager.has_more());
        assert_eq!(pager.load_next(fetch).await, Ok(2));
        assert!(!pager.has_more());
        assert_eq!(pager.pages().concat(), vec![0, 1, 2, 3, 4]);
        assert_eq!(pager.offset(), 5);

        assert_eq!(pager.load_next(fetch).await, Ok(0));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_page_keeps_items() {
        let mut pager = AccumulatingPager::new(2);
        pager
            .load_next(|_, _| async { Ok::<_, ApiError>((vec!["a", "b"], 2)) })
            .await
            .unwrap();
        let out = pager
            .load_next(|_, _| async { Err::<(Vec<&str>, usize), _>(ApiError::Network("down".into())) })
            .await;
        assert!(out.is_err());
        assert_eq!(pager.pages(), &[vec!["a", "b"]]);
        assert!(pager.has_more());
        assert_eq!(pager.offset(), 2);
    }
}
