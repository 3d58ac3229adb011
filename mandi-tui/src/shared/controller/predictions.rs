use super::{discard, fail, issue, Context, Generation, PageController, PageOutcome, PageStatus, Ticket};
use crate::shared::{router::Page, state::FilterField, view};
use mandi_data::query;
use tracing::{debug, warn};

const RELEVANT: &[FilterField] = &[
    FilterField::City,
    FilterField::Vegetable,
    FilterField::PredictionDays,
];

/// Price prediction for the selected vegetable in the selected city.
#[derive(Debug, Default)]
pub struct PredictionsController {
    generation: Generation,
    status: PageStatus,
}

impl PredictionsController {
    fn fetch(&mut self, ctx: &mut Context<'_>) {
        let filters = ctx.state.get().clone();
        let generation = self.generation.bump();

        if filters.city().is_none() || filters.vegetable().is_none() {
            debug!(generation, "prediction needs a city and a vegetable");
            self.status = PageStatus::Idle;
            return;
        }

        let ticket = Ticket::new(Page::Predictions, generation, &filters);
        self.status = PageStatus::Loading;

        let gateway = ctx.gateway.clone();
        let request = query::prediction(&filters);
        issue(ctx, ticket, async move {
            PageOutcome::Predictions(gateway.fetch_list(&request).await)
        });
    }
}

impl PageController for PredictionsController {
    fn page(&self) -> Page {
        Page::Predictions
    }

    fn status(&self) -> PageStatus {
        self.status.clone()
    }

    fn activate(&mut self, ctx: &mut Context<'_>) {
        self.fetch(ctx);
    }

    fn on_filter_changed(&mut self, field: FilterField, ctx: &mut Context<'_>) {
        if RELEVANT.contains(&field) {
            self.fetch(ctx);
        }
    }

    fn complete(&mut self, ticket: Ticket, outcome: PageOutcome, ctx: &mut Context<'_>) {
        if !ticket.is_current(ctx.state, self.generation.latest(), RELEVANT) {
            discard(&ticket, &outcome);
            return;
        }

        match outcome {
            PageOutcome::Predictions(Ok(points)) => {
                view::render_predictions(ctx.view, ctx.state, ctx.charts, &points);
                ctx.state.results.predictions = points;
                self.status = PageStatus::Rendered;
            }
            PageOutcome::Predictions(Err(error)) => {
                self.status = fail(ctx, "prediction data", error)
            }
            other => warn!(kind = other.kind(), "predictions ignored foreign outcome"),
        }
    }
}
