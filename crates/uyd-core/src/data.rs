//! Cache-and-reconcile manager.
//!
//! `DataManager` ties the pieces together: every loader reads through the
//! response cache and, when it gets data, patches the page it owns with the
//! matching reconciler. Loaders never fail; a failed fetch is logged by the
//! cache and the page keeps whatever it showed before.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, DEFAULT_SUBSCRIPTION_TYPE};
use crate::cache::{CacheManager, StalePolicy};
use crate::models::{Event, Listing, NewsArticle, Program, SiteStats, SubscriptionResponse};
use crate::notify::{Notification, Notifier};
use crate::view::{reconcile, ContainerId, Page, PatchOp};

pub const SITE_STATS_KEY: &str = "siteStats";
pub const FEATURED_PROGRAMS_KEY: &str = "featuredPrograms";
pub const UPCOMING_EVENTS_KEY: &str = "upcomingEvents";
pub const ALL_EVENTS_KEY: &str = "allEvents";
pub const LATEST_NEWS_KEY: &str = "latestNews";

const SUBSCRIBED_MESSAGE: &str = "Successfully subscribed to newsletter!";
const SUBSCRIBE_FAILED_MESSAGE: &str = "Subscription failed. Please try again.";

pub fn event_key(id: i64) -> String {
    format!("event:{}", id)
}

pub fn news_key(id: i64) -> String {
    format!("news:{}", id)
}

/// Which of the home page loads produced data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub site_stats: bool,
    pub upcoming_events: bool,
    pub latest_news: bool,
    pub featured_programs: bool,
}

impl InitReport {
    pub fn loaded(&self) -> usize {
        [
            self.site_stats,
            self.upcoming_events,
            self.latest_news,
            self.featured_programs,
        ]
        .into_iter()
        .filter(|&ok| ok)
        .count()
    }

    pub fn is_complete(&self) -> bool {
        self.loaded() == 4
    }
}

pub struct DataManager {
    api: ApiClient,
    cache: CacheManager,
    page: Mutex<Page>,
    notifier: Arc<dyn Notifier>,
}

impl DataManager {
    pub fn new(
        api: ApiClient,
        page: Page,
        notifier: Arc<dyn Notifier>,
        stale_policy: StalePolicy,
    ) -> Self {
        Self {
            api,
            cache: CacheManager::new(stale_policy),
            page: Mutex::new(page),
            notifier,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Copy of the page as it currently stands
    pub fn page(&self) -> Page {
        self.lock_page().clone()
    }

    fn lock_page(&self) -> MutexGuard<'_, Page> {
        self.page.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Plan a patch against the current page and apply it. The lock is held
    /// only for the planning and applying, never across a fetch.
    fn patch<F>(&self, plan: F)
    where
        F: FnOnce(&Page) -> Vec<PatchOp>,
    {
        let mut page = self.lock_page();
        let ops = plan(&page);
        debug!(ops = ops.len(), "Applying page patch");
        page.apply(&ops);
    }

    // ===== Loaders =====

    pub async fn load_site_stats(&self) -> Option<SiteStats> {
        let stats = self
            .cache
            .get_data(SITE_STATS_KEY, || self.api.get_site_stats())
            .await?;
        self.patch(|page| {
            reconcile::site_stats(
                page.container(ContainerId::HeroStats),
                page.container(ContainerId::Counters),
                &stats,
            )
        });
        Some(stats)
    }

    pub async fn load_featured_programs(&self) -> Option<Listing<Program>> {
        let programs = self
            .cache
            .get_data(FEATURED_PROGRAMS_KEY, || self.api.get_featured_programs())
            .await?;
        if !programs.is_empty() {
            self.patch(|page| {
                reconcile::featured_programs(
                    page.container(ContainerId::FeaturedPrograms),
                    programs.as_slice(),
                )
            });
        }
        Some(programs)
    }

    pub async fn load_upcoming_events(&self) -> Option<Listing<Event>> {
        let events = self
            .cache
            .get_data(UPCOMING_EVENTS_KEY, || self.api.get_upcoming_events())
            .await?;
        if !events.is_empty() {
            self.patch(|page| {
                reconcile::home_events(page.container(ContainerId::HomeEvents), events.as_slice())
            });
        }
        Some(events)
    }

    /// Events page. Nothing to show, fetched or cached, means the
    /// "no events" state.
    pub async fn load_all_events(&self) -> Option<Listing<Event>> {
        let events = self
            .cache
            .get_data(ALL_EVENTS_KEY, || self.api.get_events(&[]))
            .await;
        match events {
            Some(ref events) if !events.is_empty() => self.patch(|page| {
                reconcile::events_page(page.container(ContainerId::EventsList), events.as_slice())
            }),
            _ => self.patch(|_| reconcile::no_events()),
        }
        events
    }

    pub async fn load_latest_news(&self) -> Option<Listing<NewsArticle>> {
        let articles = self
            .cache
            .get_data(LATEST_NEWS_KEY, || self.api.get_latest_news())
            .await?;
        if !articles.is_empty() {
            self.patch(|page| {
                reconcile::latest_news(page.container(ContainerId::LatestNews), articles.as_slice())
            });
        }
        Some(articles)
    }

    pub async fn load_event(&self, id: i64) -> Option<Event> {
        let event = self
            .cache
            .get_data(&event_key(id), || self.api.get_event(id))
            .await?;
        self.patch(|page| reconcile::event_detail(page.container(ContainerId::EventDetail), &event));
        Some(event)
    }

    pub async fn load_news_article(&self, id: i64) -> Option<NewsArticle> {
        let article = self
            .cache
            .get_data(&news_key(id), || self.api.get_news_article(id))
            .await?;
        self.patch(|page| reconcile::news_detail(page.container(ContainerId::NewsDetail), &article));
        Some(article)
    }

    /// Run the four home page loads concurrently and wait for all of them.
    pub async fn init(&self) -> InitReport {
        info!("Loading home page data");
        let (stats, events, news, programs) = tokio::join!(
            self.load_site_stats(),
            self.load_upcoming_events(),
            self.load_latest_news(),
            self.load_featured_programs(),
        );

        let report = InitReport {
            site_stats: stats.is_some(),
            upcoming_events: events.is_some(),
            latest_news: news.is_some(),
            featured_programs: programs.is_some(),
        };
        if report.is_complete() {
            info!("Home page data loaded");
        } else {
            warn!(loaded = report.loaded(), ?report, "Some home page data failed to load");
        }
        report
    }

    // ===== Newsletter =====

    /// Subscribe `email` to the general list. Not cached.
    pub async fn subscribe_newsletter(&self, email: &str) -> Result<SubscriptionResponse, ApiError> {
        self.subscribe_newsletter_to(email, DEFAULT_SUBSCRIPTION_TYPE)
            .await
    }

    /// Subscribe `email` to `subscription_type`, notify the outcome and
    /// hand any error back to the caller.
    pub async fn subscribe_newsletter_to(
        &self,
        email: &str,
        subscription_type: &str,
    ) -> Result<SubscriptionResponse, ApiError> {
        match self.api.subscribe(email, subscription_type).await {
            Ok(response) => {
                self.notifier.notify(Notification::success(SUBSCRIBED_MESSAGE));
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "Newsletter subscription failed");
                self.notifier
                    .notify(Notification::danger(SUBSCRIBE_FAILED_MESSAGE));
                Err(e)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
