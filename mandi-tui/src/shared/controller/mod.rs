//! Page controllers.
//!
//! A [`PageController`] decides which requests its page needs, issues them through the
//! [`Fetches`] queue and renders their outcomes. Every request carries a [`Ticket`]; an outcome
//! is applied only while its ticket is still current, so late responses never overwrite
//! newer state.

use crate::shared::{
    banner::Banners,
    chart::ChartBackend,
    router::Page,
    state::{AppState, FilterField},
    view::View,
};
use futures::{future::BoxFuture, stream::FuturesUnordered, FutureExt, StreamExt};
use mandi_data::{
    model::{
        City, ComparisonRow, InsightSummary, PredictionPoint, PriceRecord, Recommendation,
        SavingsSummary, Vegetable,
    },
    DataGateway, Filters, GatewayError,
};
use std::future::Future;
use tracing::{debug, warn};

pub mod compare;
pub mod dashboard;
pub mod insights;
pub mod predictions;

/// Per-controller request lifecycle: `Idle -> Loading -> {Rendered | Error}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageStatus {
    #[default]
    Idle,
    Loading,
    Rendered,
    Error(String),
}

impl PageStatus {
    pub fn label(&self) -> &str {
        match self {
            PageStatus::Idle => "idle",
            PageStatus::Loading => "loading",
            PageStatus::Rendered => "ready",
            PageStatus::Error(message) => message,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PageStatus::Loading)
    }
}

/// Monotonic request generation of one controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Generation(u64);

impl Generation {
    /// Start a new generation, invalidating every ticket issued so far.
    pub fn bump(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn latest(&self) -> u64 {
        self.0
    }
}

/// Snapshot attached to a request when it is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub page: Page,
    pub generation: u64,
    pub filters: Filters,
}

impl Ticket {
    pub fn new(page: Page, generation: u64, filters: &Filters) -> Self {
        Self {
            page,
            generation,
            filters: filters.clone(),
        }
    }

    /// The page is still active, no newer request was issued, and none of the `relevant`
    /// filter fields changed since the request left.
    pub fn is_current(&self, state: &AppState, latest: u64, relevant: &[FilterField]) -> bool {
        state.page() == self.page && self.is_latest(state, latest, relevant)
    }

    /// Like [`Ticket::is_current`] but valid while the page is inactive. For controllers that
    /// never re-fetch on activation.
    pub fn is_latest(&self, state: &AppState, latest: u64, relevant: &[FilterField]) -> bool {
        self.generation == latest
            && relevant
                .iter()
                .all(|field| field.same_in(&self.filters, state.get()))
    }
}

/// Decoded result of one page request.
#[derive(Debug)]
pub enum PageOutcome {
    Prices(Result<Vec<PriceRecord>, GatewayError>),
    Recommendations(Result<Vec<Recommendation>, GatewayError>),
    Savings(Result<SavingsSummary, GatewayError>),
    Comparison(Result<Vec<ComparisonRow>, GatewayError>),
    Predictions(Result<Vec<PredictionPoint>, GatewayError>),
    Insights(Result<Vec<InsightSummary>, GatewayError>),
}

impl PageOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            PageOutcome::Prices(_) => "prices",
            PageOutcome::Recommendations(_) => "recommendations",
            PageOutcome::Savings(_) => "savings",
            PageOutcome::Comparison(_) => "comparison",
            PageOutcome::Predictions(_) => "predictions",
            PageOutcome::Insights(_) => "insights",
        }
    }
}

/// A resolved request, routed back by the engine.
#[derive(Debug)]
pub enum Completion {
    Page { ticket: Ticket, outcome: PageOutcome },
    Vegetables(Result<Vec<Vegetable>, GatewayError>),
    Cities(Result<Vec<City>, GatewayError>),
    Submission(Result<(), GatewayError>),
}

/// In-flight requests. They only make progress while the engine polls them.
#[derive(Default)]
pub struct Fetches {
    inner: FuturesUnordered<BoxFuture<'static, Completion>>,
}

impl std::fmt::Debug for Fetches {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetches")
            .field("in_flight", &self.inner.len())
            .finish()
    }
}

impl Fetches {
    pub fn issue<F>(&mut self, future: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        self.inner.push(future.boxed());
    }

    /// Next completion if one is ready without waiting.
    pub fn ready(&mut self) -> Option<Completion> {
        self.inner.next().now_or_never().flatten()
    }

    /// Wait for the next completion. `None` once nothing is in flight.
    pub async fn next(&mut self) -> Option<Completion> {
        self.inner.next().await
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Everything a controller may touch while handling one event.
pub struct Context<'a> {
    pub state: &'a mut AppState,
    pub view: &'a mut View,
    pub banners: &'a mut Banners,
    pub charts: &'a dyn ChartBackend,
    pub gateway: &'a DataGateway,
    pub fetches: &'a mut Fetches,
}

pub trait PageController: std::fmt::Debug + Send {
    fn page(&self) -> Page;

    fn status(&self) -> PageStatus;

    /// Page became active (or was refreshed).
    fn activate(&mut self, ctx: &mut Context<'_>);

    /// A filter changed while this page was active.
    fn on_filter_changed(&mut self, _field: FilterField, _ctx: &mut Context<'_>) {}

    /// Explicit user apply.
    fn apply(&mut self, _ctx: &mut Context<'_>) {}

    /// A request issued by this controller resolved.
    fn complete(&mut self, ticket: Ticket, outcome: PageOutcome, ctx: &mut Context<'_>);
}

/// Queue `future` as a page request carrying `ticket`.
pub(crate) fn issue<F>(ctx: &mut Context<'_>, ticket: Ticket, future: F)
where
    F: Future<Output = PageOutcome> + Send + 'static,
{
    debug!(
        page = %ticket.page,
        generation = ticket.generation,
        "request issued"
    );
    ctx.fetches.issue(async move {
        let outcome = future.await;
        Completion::Page { ticket, outcome }
    });
}

/// Report a failed page request and return the status to record.
pub(crate) fn fail(ctx: &mut Context<'_>, what: &str, error: GatewayError) -> PageStatus {
    warn!(%error, what, "page request failed");
    let message = format!("Failed to load {what}: {}", error.message());
    ctx.banners.error(message.clone());
    PageStatus::Error(message)
}

/// Log and drop an outcome whose ticket is no longer current.
pub(crate) fn discard(ticket: &Ticket, outcome: &PageOutcome) {
    debug!(
        page = %ticket.page,
        generation = ticket.generation,
        kind = outcome.kind(),
        "stale response discarded"
    );
}
