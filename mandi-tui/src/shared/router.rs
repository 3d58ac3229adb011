/// Page switching
///
/// The router owns one controller per page, records the active page in `AppState` and
/// forwards activation, filter notifications and completed requests to the right controller.
use crate::shared::{
    controller::{
        compare::CompareController, dashboard::DashboardController,
        insights::InsightsController, predictions::PredictionsController, Context, PageController,
        PageOutcome, PageStatus, Ticket,
    },
    state::FilterField,
};
use derive_more::Display;
use tracing::{debug, info};

/// Client pages, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display)]
pub enum Page {
    #[default]
    Dashboard,
    Compare,
    Predictions,
    Insights,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::Dashboard,
        Page::Compare,
        Page::Predictions,
        Page::Insights,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Compare => "Compare",
            Page::Predictions => "Predictions",
            Page::Insights => "Insights",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Page::Dashboard => 0,
            Page::Compare => 1,
            Page::Predictions => 2,
            Page::Insights => 3,
        }
    }

    pub fn next(&self) -> Page {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }

    pub fn prev(&self) -> Page {
        Page::ALL[(self.index() + Page::ALL.len() - 1) % Page::ALL.len()]
    }
}

#[derive(Debug, Default)]
pub struct Router {
    dashboard: DashboardController,
    compare: CompareController,
    predictions: PredictionsController,
    insights: InsightsController,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn controller(&self, page: Page) -> &dyn PageController {
        match page {
            Page::Dashboard => &self.dashboard,
            Page::Compare => &self.compare,
            Page::Predictions => &self.predictions,
            Page::Insights => &self.insights,
        }
    }

    pub fn controller_mut(&mut self, page: Page) -> &mut dyn PageController {
        match page {
            Page::Dashboard => &mut self.dashboard,
            Page::Compare => &mut self.compare,
            Page::Predictions => &mut self.predictions,
            Page::Insights => &mut self.insights,
        }
    }

    pub fn status(&self, page: Page) -> PageStatus {
        self.controller(page).status()
    }

    /// Make `page` active and activate its controller, even if it already was active.
    pub fn navigate(&mut self, page: Page, ctx: &mut Context<'_>) {
        if ctx.state.set_page(page) {
            info!(%page, "page switched");
        }
        self.controller_mut(page).activate(ctx);
    }

    /// Re-activate the active page.
    pub fn refresh(&mut self, ctx: &mut Context<'_>) {
        let page = ctx.state.page();
        debug!(%page, "refresh");
        self.controller_mut(page).activate(ctx);
    }

    /// Tell the active page that `field` changed.
    pub fn notify(&mut self, field: FilterField, ctx: &mut Context<'_>) {
        let page = ctx.state.page();
        self.controller_mut(page).on_filter_changed(field, ctx);
    }

    /// Explicit apply on the active page.
    pub fn apply(&mut self, ctx: &mut Context<'_>) {
        let page = ctx.state.page();
        self.controller_mut(page).apply(ctx);
    }

    /// Hand a resolved request back to the controller that issued it.
    pub fn complete(&mut self, ticket: Ticket, outcome: PageOutcome, ctx: &mut Context<'_>) {
        self.controller_mut(ticket.page).complete(ticket, outcome, ctx);
    }
}
