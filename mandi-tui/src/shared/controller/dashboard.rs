use super::{discard, fail, issue, Context, Generation, PageController, PageOutcome, PageStatus, Ticket};
use crate::shared::{
    router::Page,
    state::FilterField,
    view::{self, Container},
};
use mandi_data::query;
use tracing::{debug, warn};

const RELEVANT: &[FilterField] = &[FilterField::City, FilterField::Vegetable];

/// Current prices, buy/wait recommendations and the monthly savings summary for one city.
///
/// The three requests are issued together and each part renders as soon as it resolves.
#[derive(Debug, Default)]
pub struct DashboardController {
    generation: Generation,
    prices: PageStatus,
    recommendations: PageStatus,
    savings: PageStatus,
}

impl DashboardController {
    pub fn parts(&self) -> [&PageStatus; 3] {
        [&self.prices, &self.recommendations, &self.savings]
    }
}

/// Keep only items named exactly `vegetable`. No selection keeps everything.
pub fn filter_by_vegetable<T, F>(items: Vec<T>, vegetable: Option<&str>, name: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    match vegetable {
        Some(vegetable) => items
            .into_iter()
            .filter(|item| name(item) == vegetable)
            .collect(),
        None => items,
    }
}

impl PageController for DashboardController {
    fn page(&self) -> Page {
        Page::Dashboard
    }

    fn status(&self) -> PageStatus {
        let parts = self.parts();
        if let Some(error) = parts.iter().find(|part| matches!(part, PageStatus::Error(_))) {
            return (*error).clone();
        }
        if parts.iter().any(|part| part.is_loading()) {
            return PageStatus::Loading;
        }
        if parts.iter().all(|part| **part == PageStatus::Rendered) {
            return PageStatus::Rendered;
        }
        PageStatus::Idle
    }

    fn activate(&mut self, ctx: &mut Context<'_>) {
        let generation = self.generation.bump();
        let filters = ctx.state.get().clone();

        if filters.city().is_none() {
            debug!("dashboard waiting for a city");
            self.prices = PageStatus::Idle;
            self.recommendations = PageStatus::Idle;
            self.savings = PageStatus::Idle;

            // Cards of a previously selected city must not outlive it
            for container in [
                Container::Prices,
                Container::Recommendations,
                Container::Savings,
            ] {
                ctx.view.clear(container);
            }
            ctx.state.results.prices.clear();
            ctx.state.results.recommendations.clear();
            ctx.state.results.savings = None;
            return;
        }

        let ticket = Ticket::new(Page::Dashboard, generation, &filters);
        self.prices = PageStatus::Loading;
        self.recommendations = PageStatus::Loading;
        self.savings = PageStatus::Loading;

        let gateway = ctx.gateway.clone();
        let request = query::current_prices(&filters);
        issue(ctx, ticket.clone(), async move {
            PageOutcome::Prices(gateway.fetch_list(&request).await)
        });

        let gateway = ctx.gateway.clone();
        let request = query::recommendations(&filters);
        issue(ctx, ticket.clone(), async move {
            PageOutcome::Recommendations(gateway.fetch_list(&request).await)
        });

        let gateway = ctx.gateway.clone();
        let request = query::savings(&filters, query::current_month());
        issue(ctx, ticket, async move {
            PageOutcome::Savings(gateway.fetch_savings_summary(&request).await)
        });
    }

    fn on_filter_changed(&mut self, field: FilterField, ctx: &mut Context<'_>) {
        if RELEVANT.contains(&field) {
            self.activate(ctx);
        }
    }

    fn complete(&mut self, ticket: Ticket, outcome: PageOutcome, ctx: &mut Context<'_>) {
        if !ticket.is_current(ctx.state, self.generation.latest(), RELEVANT) {
            discard(&ticket, &outcome);
            return;
        }

        let vegetable = ctx.state.get().vegetable().map(str::to_string);
        match outcome {
            PageOutcome::Prices(Ok(records)) => {
                let records = filter_by_vegetable(records, vegetable.as_deref(), |record| {
                    record.vegetable_name.as_str()
                });
                view::render_prices(ctx.view, &records);
                ctx.state.results.prices = records;
                self.prices = PageStatus::Rendered;
            }
            PageOutcome::Prices(Err(error)) => self.prices = fail(ctx, "prices", error),
            PageOutcome::Recommendations(Ok(recommendations)) => {
                let recommendations =
                    filter_by_vegetable(recommendations, vegetable.as_deref(), |rec| {
                        rec.vegetable_name.as_str()
                    });
                view::render_recommendations(ctx.view, &recommendations);
                ctx.state.results.recommendations = recommendations;
                self.recommendations = PageStatus::Rendered;
            }
            PageOutcome::Recommendations(Err(error)) => {
                self.recommendations = fail(ctx, "recommendations", error)
            }
            PageOutcome::Savings(Ok(savings)) => {
                view::render_savings(ctx.view, &savings);
                ctx.state.results.savings = Some(savings);
                self.savings = PageStatus::Rendered;
            }
            PageOutcome::Savings(Err(error)) => self.savings = fail(ctx, "savings", error),
            other => warn!(kind = other.kind(), "dashboard ignored foreign outcome"),
        }
    }
}
