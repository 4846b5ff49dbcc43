//! The reads and writes each page declares: key, freshness, fetcher, and for
//! writes the keys they make stale.
//!
//! Detail pages take `Option<Uuid>` because the id comes from the route;
//! without one the query stays disabled and never calls the server.

use std::future::Future;
use std::sync::Arc;

use uuid::Uuid;
use vantage_types::api::{
    ContributionRequest, CreateCampaignRequest, CreateCompanyRequest, CreateDealRequest, CreateEventRequest,
    CreateInvestorRequest, CreateUpdateRequest, TrackInvestmentRequest, UpdateCompanyRequest, UpdateEventRequest,
};
use vantage_types::models::{
    ActivityStatus, BenchmarkPoint, Campaign, CampaignUpdate, Company, Contribution, Deal, Event, HedgeFund,
    Investor, InvestorTracking, Mover, PerformanceMetric,
};

use crate::api::ApiClient;
use crate::app::AppContext;
use crate::error::ApiError;
use crate::mutation::Mutation;
use crate::navigation::Route;
use crate::query::{QueryKey, QueryObserver, QueryOptions, keys};
use crate::services::{campaigns, companies, contributions, deals, events, funds, investors};
use crate::view::fallback::{self, DataSource};
use crate::view::pagination::CampaignBrowser;

fn guard(id: Option<Uuid>, key: fn(Uuid) -> QueryKey, options: QueryOptions) -> (Uuid, QueryKey, QueryOptions) {
    let enabled = id.is_some();
    let id = id.unwrap_or_default();
    (id, key(id), options.enabled(enabled))
}

impl AppContext {
    fn query<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, fetch: F) -> QueryObserver<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(ApiClient) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let api = self.api.clone();
        self.cache.observe(key, options, move || fetch(api.clone()))
    }

    fn mutation<I, O, F, Fut>(&self, mutate: F) -> Mutation<I, O>
    where
        I: Send + 'static,
        O: Send + 'static,
        F: Fn(ApiClient, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ApiError>> + Send + 'static,
    {
        let api = self.api.clone();
        Mutation::new(move |input| mutate(api.clone(), input))
    }

    // -- Companies --

    pub fn companies(&self) -> QueryObserver<Vec<Company>> {
        self.query(keys::companies(), QueryOptions::daily(), |api| async move {
            companies::list(&api).await
        })
    }

    pub fn company(&self, id: Option<Uuid>) -> QueryObserver<Company> {
        let (id, key, options) = guard(id, keys::company, QueryOptions::daily());
        self.query(key, options, move |api| async move { companies::get(&api, id).await })
    }

    pub fn create_company(&self) -> Mutation<CreateCompanyRequest, Company> {
        self.mutation(|api, req: CreateCompanyRequest| async move { companies::create(&api, &req).await })
            .invalidates(keys::companies())
    }

    pub fn update_company(&self, id: Uuid) -> Mutation<UpdateCompanyRequest, Company> {
        self.mutation(move |api, patch: UpdateCompanyRequest| async move {
            companies::update(&api, id, &patch).await
        })
        .invalidates(keys::companies())
    }

    /// Deleting from the detail page leaves it, so this returns to the list.
    pub fn delete_company(&self) -> Mutation<Uuid, ()> {
        let navigator = self.navigator.clone();
        self.mutation(|api, id| async move { companies::delete(&api, id).await })
            .invalidates(keys::companies())
            .on_success(move |_| navigator.navigate(Route::CompanyList))
    }

    pub fn link_investor(&self, company_id: Uuid) -> Mutation<Uuid, ()> {
        self.mutation(move |api, investor_id| async move {
            companies::link_investor(&api, company_id, investor_id).await
        })
        .invalidates(keys::company(company_id))
        .invalidates(keys::investors())
    }

    pub fn unlink_investor(&self, company_id: Uuid) -> Mutation<Uuid, ()> {
        self.mutation(move |api, investor_id| async move {
            companies::unlink_investor(&api, company_id, investor_id).await
        })
        .invalidates(keys::company(company_id))
        .invalidates(keys::investors())
    }

    // -- Events --

    pub fn company_events(&self, company_id: Option<Uuid>) -> QueryObserver<Vec<Event>> {
        let (id, key, options) = guard(company_id, keys::company_events, QueryOptions::daily());
        self.query(key, options, move |api| async move { events::list_for_company(&api, id).await })
    }

    pub fn event(&self, id: Option<Uuid>) -> QueryObserver<Event> {
        let (id, key, options) = guard(id, keys::event, QueryOptions::daily());
        self.query(key, options, move |api| async move { events::get(&api, id).await })
    }

    pub fn create_event(&self, company_id: Uuid) -> Mutation<CreateEventRequest, Event> {
        self.mutation(move |api, req: CreateEventRequest| async move {
            events::create(&api, company_id, &req).await
        })
        .invalidates(keys::company_events(company_id))
    }

    pub fn update_event(&self, company_id: Uuid, id: Uuid) -> Mutation<UpdateEventRequest, Event> {
        self.mutation(move |api, patch: UpdateEventRequest| async move {
            events::update(&api, id, &patch).await
        })
        .invalidates(keys::event(id))
        .invalidates(keys::company_events(company_id))
    }

    pub fn delete_event(&self, company_id: Uuid) -> Mutation<Uuid, ()> {
        self.mutation(|api, id| async move { events::delete(&api, id).await })
            .invalidates(keys::events())
            .invalidates(keys::company_events(company_id))
    }

    /// `true` attends, `false` cancels.
    pub fn rsvp(&self, event_id: Uuid, investor_id: Uuid) -> Mutation<bool, ()> {
        self.mutation(move |api, attending: bool| async move {
            if attending {
                events::rsvp(&api, event_id, investor_id).await
            } else {
                events::cancel_rsvp(&api, event_id, investor_id).await
            }
        })
        .invalidates(keys::event(event_id))
        .invalidates(keys::investor(investor_id))
    }

    // -- Investors --

    pub fn investors(&self) -> QueryObserver<Vec<Investor>> {
        self.query(keys::investors(), QueryOptions::daily(), |api| async move {
            investors::list(&api).await
        })
    }

    pub fn investor(&self, id: Option<Uuid>) -> QueryObserver<Investor> {
        let (id, key, options) = guard(id, keys::investor, QueryOptions::daily());
        self.query(key, options, move |api| async move { investors::get(&api, id).await })
    }

    pub fn investor_companies(&self, id: Option<Uuid>) -> QueryObserver<Vec<Company>> {
        let (id, key, options) = guard(id, keys::investor_companies, QueryOptions::daily());
        self.query(key, options, move |api| async move { investors::companies(&api, id).await })
    }

    pub fn create_investor(&self) -> Mutation<CreateInvestorRequest, Investor> {
        self.mutation(|api, req: CreateInvestorRequest| async move { investors::create(&api, &req).await })
            .invalidates(keys::investors())
    }

    pub fn update_investor_status(&self, id: Uuid) -> Mutation<ActivityStatus, Investor> {
        self.mutation(move |api, status| async move { investors::update_status(&api, id, status).await })
            .invalidates(keys::investors())
    }

    pub fn delete_investor(&self) -> Mutation<Uuid, ()> {
        self.mutation(|api, id| async move { investors::delete(&api, id).await })
            .invalidates(keys::investors())
            .invalidates(keys::companies())
    }

    // -- Crowdfunding --

    pub fn campaign_browser(&self) -> CampaignBrowser {
        CampaignBrowser::new(self.api.clone(), self.cache.clone())
    }

    pub fn campaign(&self, id: Option<Uuid>) -> QueryObserver<Campaign> {
        let (id, key, options) = guard(id, keys::campaign, QueryOptions::daily());
        self.query(key, options, move |api| async move { campaigns::get(&api, id).await })
    }

    pub fn campaign_contributions(&self, id: Option<Uuid>) -> QueryObserver<Vec<Contribution>> {
        let (id, key, options) = guard(id, keys::campaign_contributions, QueryOptions::daily());
        self.query(key, options, move |api| async move {
            contributions::list_for_campaign(&api, id).await
        })
    }

    pub fn campaign_updates(&self, id: Option<Uuid>) -> QueryObserver<Vec<CampaignUpdate>> {
        let (id, key, options) = guard(id, keys::campaign_updates, QueryOptions::daily());
        self.query(key, options, move |api| async move { campaigns::updates(&api, id).await })
    }

    pub fn create_campaign(&self) -> Mutation<CreateCampaignRequest, Campaign> {
        let navigator = self.navigator.clone();
        self.mutation(|api, req: CreateCampaignRequest| async move { campaigns::create(&api, &req).await })
            .invalidates(keys::campaigns())
            .on_success(move |campaign: &Campaign| navigator.navigate(Route::Campaign(campaign.id)))
    }

    /// Also refreshes the campaign list, whose funding totals just changed.
    pub fn contribute(&self, campaign_id: Uuid) -> Mutation<ContributionRequest, Contribution> {
        self.mutation(move |api, req: ContributionRequest| async move {
            contributions::contribute(&api, campaign_id, &req).await
        })
        .invalidates(keys::campaigns())
    }

    pub fn post_campaign_update(&self, campaign_id: Uuid) -> Mutation<CreateUpdateRequest, CampaignUpdate> {
        self.mutation(move |api, req: CreateUpdateRequest| async move {
            campaigns::post_update(&api, campaign_id, &req).await
        })
        .invalidates(keys::campaign_updates(campaign_id))
    }

    // -- Hedge funds --

    pub fn funds(&self) -> QueryObserver<Vec<HedgeFund>> {
        self.query(keys::funds(), QueryOptions::daily(), |api| async move { funds::list(&api).await })
    }

    pub fn fund(&self, id: Option<Uuid>) -> QueryObserver<HedgeFund> {
        let (id, key, options) = guard(id, keys::fund, QueryOptions::daily());
        self.query(key, options, move |api| async move { funds::get(&api, id).await })
    }

    pub fn fund_metrics(&self, id: Option<Uuid>) -> QueryObserver<Vec<PerformanceMetric>> {
        let (id, key, options) = guard(id, keys::fund_metrics, QueryOptions::quarter_hour());
        self.query(key, options, move |api| async move { funds::metrics(&api, id).await })
    }

    pub fn benchmark(&self) -> QueryObserver<Vec<BenchmarkPoint>> {
        let source = Arc::new(fallback::benchmark_source(self.api.clone(), self.config.market_fallback));
        self.cache.observe(keys::benchmark(), QueryOptions::market(), move || {
            let source = source.clone();
            async move { source.load().await }
        })
    }

    pub fn top_movers(&self) -> QueryObserver<Vec<Mover>> {
        let source = Arc::new(fallback::movers_source(self.api.clone(), self.config.market_fallback));
        self.cache.observe(keys::top_movers(), QueryOptions::market(), move || {
            let source = source.clone();
            async move { source.load().await }
        })
    }

    // -- Deals --

    pub fn deals(&self) -> QueryObserver<Vec<Deal>> {
        self.query(keys::deals(), QueryOptions::daily(), |api| async move { deals::list(&api).await })
    }

    pub fn deal(&self, id: Option<Uuid>) -> QueryObserver<Deal> {
        let (id, key, options) = guard(id, keys::deal, QueryOptions::daily());
        self.query(key, options, move |api| async move { deals::get(&api, id).await })
    }

    pub fn deal_tracking(&self, id: Option<Uuid>) -> QueryObserver<Vec<InvestorTracking>> {
        let (id, key, options) = guard(id, keys::deal_tracking, QueryOptions::daily());
        self.query(key, options, move |api| async move { deals::tracking(&api, id).await })
    }

    pub fn create_deal(&self) -> Mutation<CreateDealRequest, Deal> {
        let navigator = self.navigator.clone();
        self.mutation(|api, req: CreateDealRequest| async move { deals::create(&api, &req).await })
            .invalidates(keys::deals())
            .on_success(move |_| navigator.navigate(Route::DealList))
    }

    pub fn delete_deal(&self) -> Mutation<Uuid, ()> {
        self.mutation(|api, id| async move { deals::delete(&api, id).await })
            .invalidates(keys::deals())
    }

    pub fn track_investment(&self, deal_id: Uuid) -> Mutation<TrackInvestmentRequest, InvestorTracking> {
        self.mutation(move |api, req: TrackInvestmentRequest| async move {
            deals::track_investment(&api, deal_id, &req).await
        })
        .invalidates(keys::deal(deal_id))
        .invalidates(keys::deals())
    }
}
