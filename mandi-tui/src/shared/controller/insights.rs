use super::{discard, fail, issue, Context, Generation, PageController, PageOutcome, PageStatus, Ticket};
use crate::shared::{router::Page, state::FilterField, view};
use mandi_data::query;
use tracing::{debug, warn};

const RELEVANT: &[FilterField] = &[FilterField::City, FilterField::Month];

/// Monthly min / avg / max statistics, scoped by the current city.
#[derive(Debug, Default)]
pub struct InsightsController {
    generation: Generation,
    status: PageStatus,
}

impl InsightsController {
    fn fetch(&mut self, ctx: &mut Context<'_>) {
        let filters = ctx.state.get().clone();
        let generation = self.generation.bump();

        if filters.city().is_none() {
            debug!(generation, "insights need a city");
            self.status = PageStatus::Idle;
            return;
        }

        let ticket = Ticket::new(Page::Insights, generation, &filters);
        self.status = PageStatus::Loading;

        let gateway = ctx.gateway.clone();
        let request = query::insights(&filters);
        issue(ctx, ticket, async move {
            PageOutcome::Insights(gateway.fetch_insight_list(&request).await)
        });
    }
}

impl PageController for InsightsController {
    fn page(&self) -> Page {
        Page::Insights
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
            PageOutcome::Insights(Ok(insights)) => {
                view::render_insights(ctx.view, ctx.state, ctx.charts, &insights);
                ctx.state.results.insights = insights;
                self.status = PageStatus::Rendered;
            }
            PageOutcome::Insights(Err(error)) => self.status = fail(ctx, "insights", error),
            other => warn!(kind = other.kind(), "insights ignored foreign outcome"),
        }
    }
}
