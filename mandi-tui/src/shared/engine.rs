//! Engine: the single owner of all mutable client state.
//!
//! User actions enter through [`Engine::dispatch`]; resolved requests are applied one at a time
//! through [`Engine::pump`] or [`Engine::next_completion`]. Nothing else mutates state.

use crate::shared::{
    banner::Banners,
    chart::ChartBackend,
    controller::{Completion, Context, Fetches, PageStatus},
    dispatch::{binding, Binding, SubmissionStep, Trigger, UiAction},
    router::{Page, Router},
    state::AppState,
    view::View,
};
use mandi_data::{
    error::GENERIC_HTTP_MESSAGE,
    model::{City, Vegetable},
    query, DataGateway, GatewayError,
};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const SUBMISSION_SUCCESS: &str = "Price submitted — thank you!";
pub const SUBMISSION_FAILED: &str = "Failed to submit price";
pub const SUBMISSION_NETWORK_ERROR: &str = "Network error submitting price";

#[derive(Debug)]
pub struct Engine {
    gateway: DataGateway,
    state: AppState,
    view: View,
    banners: Banners,
    charts: Box<dyn ChartBackend>,
    fetches: Fetches,
    router: Router,
}

impl Engine {
    pub fn new(gateway: DataGateway, charts: Box<dyn ChartBackend>, banner_ttl: Duration) -> Self {
        Self {
            gateway,
            state: AppState::new(),
            view: View::new(),
            banners: Banners::new(banner_ttl),
            charts,
            fetches: Fetches::default(),
            router: Router::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn banners(&self) -> &Banners {
        &self.banners
    }

    pub fn page(&self) -> Page {
        self.state.page()
    }

    pub fn status(&self, page: Page) -> PageStatus {
        self.router.status(page)
    }

    /// Number of requests still in flight.
    pub fn in_flight(&self) -> usize {
        self.fetches.len()
    }

    pub fn expire_banners(&mut self, now: Instant) {
        self.banners.expire(now);
    }

    /// Run the binding of `action`: mutate filters, then fire its trigger.
    pub fn dispatch(&mut self, action: UiAction) {
        debug!(?action, "dispatch");
        let Binding { change, trigger } = binding(action);

        let changed = change.and_then(|change| {
            let field = change.field();
            self.state.set(change).then_some(field)
        });

        let (router, mut ctx) = self.split();
        match trigger {
            Trigger::Notify => match changed {
                Some(field) => router.notify(field, &mut ctx),
                None => debug!("filter unchanged"),
            },
            Trigger::Navigate(page) => router.navigate(page, &mut ctx),
            Trigger::Refresh => router.refresh(&mut ctx),
            Trigger::Apply => router.apply(&mut ctx),
            Trigger::LoadCatalog => load_catalog(&mut ctx),
            Trigger::Submission(step) => submission(step, &mut ctx),
        }
    }

    /// Apply every completion that is ready without waiting. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.fetches.ready() {
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    /// Wait for the next completion and apply it. Returns `false` if nothing was in flight.
    ///
    /// Cancel safe: dropping the future before it resolves loses no completion.
    pub async fn next_completion(&mut self) -> bool {
        match self.fetches.next().await {
            Some(completion) => {
                self.apply(completion);
                true
            }
            None => false,
        }
    }

    /// Apply completions until nothing is in flight.
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    fn split(&mut self) -> (&mut Router, Context<'_>) {
        let ctx = Context {
            state: &mut self.state,
            view: &mut self.view,
            banners: &mut self.banners,
            charts: self.charts.as_ref(),
            gateway: &self.gateway,
            fetches: &mut self.fetches,
        };
        (&mut self.router, ctx)
    }

    fn apply(&mut self, completion: Completion) {
        let (router, mut ctx) = self.split();
        match completion {
            Completion::Page { ticket, outcome } => router.complete(ticket, outcome, &mut ctx),
            Completion::Vegetables(result) => vegetables_loaded(result, &mut ctx),
            Completion::Cities(result) => cities_loaded(result, &mut ctx),
            Completion::Submission(result) => submitted(result, router, &mut ctx),
        }
    }
}

fn load_catalog(ctx: &mut Context<'_>) {
    info!("loading catalog");

    let gateway = ctx.gateway.clone();
    ctx.fetches.issue(async move {
        Completion::Vegetables(gateway.fetch_list(&query::vegetables()).await)
    });

    let gateway = ctx.gateway.clone();
    ctx.fetches
        .issue(async move { Completion::Cities(gateway.fetch_list(&query::cities()).await) });
}

fn vegetables_loaded(result: Result<Vec<Vegetable>, GatewayError>, ctx: &mut Context<'_>) {
    match result {
        Ok(vegetables) => {
            info!(count = vegetables.len(), "vegetables loaded");
            ctx.state.catalog.vegetables = vegetables;
        }
        Err(error) => {
            warn!(%error, "failed to load vegetables");
            ctx.banners
                .error(format!("Failed to load vegetables: {}", error.message()));
        }
    }
}

fn cities_loaded(result: Result<Vec<City>, GatewayError>, ctx: &mut Context<'_>) {
    match result {
        Ok(cities) => {
            info!(count = cities.len(), "cities loaded");
            ctx.state.catalog.cities = cities;
        }
        Err(error) => warn!(%error, "failed to load cities"),
    }
}

fn submission(step: SubmissionStep, ctx: &mut Context<'_>) {
    match step {
        SubmissionStep::Open => ctx.state.open_submission(),
        SubmissionStep::Edit(form) => {
            if !ctx.state.edit_submission(form) {
                debug!("submission edit ignored");
            }
        }
        SubmissionStep::Close => {
            ctx.state.close_submission();
        }
        SubmissionStep::Submit => {
            let Some(form) = ctx.state.submission() else {
                debug!("submit without an open dialog");
                return;
            };
            if ctx.state.submission_pending() {
                debug!("submission already in flight");
                return;
            }

            let submission = match form.validate() {
                Ok(submission) => submission,
                Err(error) => {
                    warn!(%error, "submission rejected before request");
                    ctx.banners.error(error.to_string());
                    return;
                }
            };

            info!(
                vegetable = %submission.vegetable_name,
                city = %submission.city_name,
                price = submission.price_per_kg,
                "submitting price"
            );
            ctx.state.begin_submission();
            let gateway = ctx.gateway.clone();
            ctx.fetches.issue(async move {
                Completion::Submission(gateway.submit_price(&submission).await)
            });
        }
    }
}

fn submitted(result: Result<(), GatewayError>, router: &mut Router, ctx: &mut Context<'_>) {
    ctx.state.finish_submission();
    match result {
        Ok(()) => {
            info!("price submitted");
            ctx.banners.success(SUBMISSION_SUCCESS);
            ctx.state.close_submission();

            if ctx.state.page() == Page::Dashboard && ctx.state.get().city().is_some() {
                router.refresh(ctx);
            }
        }
        Err(error) => {
            warn!(%error, "price submission failed");
            ctx.banners.error(submission_error_message(&error));
        }
    }
}

/// Server message when the response carried one, otherwise a fixed fallback.
pub fn submission_error_message(error: &GatewayError) -> String {
    match error {
        GatewayError::Network { .. } => SUBMISSION_NETWORK_ERROR.to_string(),
        GatewayError::Http { message, .. } if message != GENERIC_HTTP_MESSAGE => message.clone(),
        _ => SUBMISSION_FAILED.to_string(),
    }
}
