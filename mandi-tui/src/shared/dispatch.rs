/// User action dispatch table
///
/// Every named UI action maps to an optional filter mutation plus the controller trigger to run
/// after it. The table is pure so it can be tested without a terminal or a network.
use crate::shared::{router::Page, state::FilterChange};
use chrono::{Month, NaiveDate};
use mandi_data::{PredictionDays, SortOrder, SubmissionForm};

/// Named user actions, independent of how the front end produces them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    LoadCatalog,
    SelectCity(Option<String>),
    SelectVegetable(Option<String>),
    SelectState(Option<String>),
    SetStartDate(Option<NaiveDate>),
    SetEndDate(Option<NaiveDate>),
    SelectSort(Option<SortOrder>),
    /// Raw horizon input; invalid input falls back to the default horizon
    SetPredictionDays(String),
    SelectMonth(Option<Month>),
    Navigate(Page),
    Refresh,
    ApplyComparison,
    OpenSubmission,
    EditSubmission(SubmissionForm),
    CloseSubmission,
    SubmitPrice,
}

/// Submission dialog steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStep {
    Open,
    Edit(SubmissionForm),
    Close,
    Submit,
}

/// What runs after the filter mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Tell the active controller which field changed, only if it actually changed
    Notify,
    Navigate(Page),
    Refresh,
    Apply,
    LoadCatalog,
    Submission(SubmissionStep),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub change: Option<FilterChange>,
    pub trigger: Trigger,
}

impl Binding {
    fn notify(change: FilterChange) -> Self {
        Self {
            change: Some(change),
            trigger: Trigger::Notify,
        }
    }

    fn trigger(trigger: Trigger) -> Self {
        Self {
            change: None,
            trigger,
        }
    }
}

/// Resolve an action to its binding
pub fn binding(action: UiAction) -> Binding {
    match action {
        UiAction::LoadCatalog => Binding::trigger(Trigger::LoadCatalog),
        UiAction::SelectCity(city) => Binding::notify(FilterChange::City(city)),
        UiAction::SelectVegetable(vegetable) => {
            Binding::notify(FilterChange::Vegetable(vegetable))
        }
        UiAction::SelectState(state) => Binding::notify(FilterChange::State(state)),
        UiAction::SetStartDate(date) => Binding::notify(FilterChange::StartDate(date)),
        UiAction::SetEndDate(date) => Binding::notify(FilterChange::EndDate(date)),
        UiAction::SelectSort(sort) => Binding::notify(FilterChange::Sort(sort)),
        UiAction::SetPredictionDays(raw) => {
            Binding::notify(FilterChange::PredictionDays(PredictionDays::parse(&raw)))
        }
        UiAction::SelectMonth(month) => Binding::notify(FilterChange::Month(month)),
        UiAction::Navigate(page) => Binding::trigger(Trigger::Navigate(page)),
        UiAction::Refresh => Binding::trigger(Trigger::Refresh),
        UiAction::ApplyComparison => Binding::trigger(Trigger::Apply),
        UiAction::OpenSubmission => Binding::trigger(Trigger::Submission(SubmissionStep::Open)),
        UiAction::EditSubmission(form) => {
            Binding::trigger(Trigger::Submission(SubmissionStep::Edit(form)))
        }
        UiAction::CloseSubmission => {
            Binding::trigger(Trigger::Submission(SubmissionStep::Close))
        }
        UiAction::SubmitPrice => Binding::trigger(Trigger::Submission(SubmissionStep::Submit)),
    }
}
