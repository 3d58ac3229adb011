use super::{discard, fail, issue, Context, Generation, PageController, PageOutcome, PageStatus, Ticket};
use crate::shared::{router::Page, state::FilterField, view};
use mandi_data::query;
use tracing::{debug, warn};

/// Item, state, date range and sort are staged until apply, so only a city change makes an
/// in-flight comparison stale.
const RELEVANT: &[FilterField] = &[FilterField::City];

/// Source comparison for one vegetable. Fetches only on an explicit apply.
#[derive(Debug, Default)]
pub struct CompareController {
    generation: Generation,
    status: PageStatus,
}

impl PageController for CompareController {
    fn page(&self) -> Page {
        Page::Compare
    }

    fn status(&self) -> PageStatus {
        self.status.clone()
    }

    fn activate(&mut self, _ctx: &mut Context<'_>) {
        debug!(status = self.status.label(), "compare page shown");
    }

    fn apply(&mut self, ctx: &mut Context<'_>) {
        let filters = ctx.state.get().clone();
        let request = match query::comparison(&filters) {
            Ok(request) => request,
            Err(error) => {
                warn!(%error, "comparison rejected before request");
                ctx.banners.error(error.to_string());
                self.status = PageStatus::Error(error.to_string());
                return;
            }
        };

        let ticket = Ticket::new(Page::Compare, self.generation.bump(), &filters);
        self.status = PageStatus::Loading;

        let gateway = ctx.gateway.clone();
        issue(ctx, ticket, async move {
            PageOutcome::Comparison(gateway.fetch_list(&request).await)
        });
    }

    fn complete(&mut self, ticket: Ticket, outcome: PageOutcome, ctx: &mut Context<'_>) {
        // Applied even off-page: activation never re-issues a comparison
        if !ticket.is_latest(ctx.state, self.generation.latest(), RELEVANT) {
            // The latest apply went stale on a city change and nothing newer is in flight
            if ticket.generation == self.generation.latest() {
                self.status = PageStatus::Idle;
            }
            discard(&ticket, &outcome);
            return;
        }

        match outcome {
            PageOutcome::Comparison(Ok(rows)) => {
                view::render_comparison(ctx.view, &rows);
                ctx.state.results.comparison = rows;
                self.status = PageStatus::Rendered;
            }
            PageOutcome::Comparison(Err(error)) => {
                self.status = fail(ctx, "comparison data", error)
            }
            other => warn!(kind = other.kind(), "compare ignored foreign outcome"),
        }
    }
}
