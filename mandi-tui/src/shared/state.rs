//! Session-lifetime application state.
//!
//! [`AppState`] is the single source of truth for the user's [`Filters`]: every page reads the
//! same city and vegetable, and [`AppState::set`] is the only way to change them.

use crate::shared::{
    chart::{ChartHandle, ChartSlot, ChartSlots, RenderError},
    router::Page,
};
use chrono::{Month, NaiveDate};
use itertools::Itertools;
use mandi_data::{
    model::{
        City, ComparisonRow, InsightSummary, PredictionPoint, PriceRecord, Recommendation,
        SavingsSummary, Vegetable,
    },
    Filters, PredictionDays, SortOrder, SubmissionForm,
};

/// Individually observable filter fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    City,
    Vegetable,
    State,
    StartDate,
    EndDate,
    Sort,
    PredictionDays,
    Month,
}

impl FilterField {
    /// Whether `a` and `b` agree on this field.
    pub fn same_in(&self, a: &Filters, b: &Filters) -> bool {
        match self {
            FilterField::City => a.city() == b.city(),
            FilterField::Vegetable => a.vegetable() == b.vegetable(),
            FilterField::State => a.state() == b.state(),
            FilterField::StartDate => a.start_date == b.start_date,
            FilterField::EndDate => a.end_date == b.end_date,
            FilterField::Sort => a.sort == b.sort,
            FilterField::PredictionDays => a.prediction_days == b.prediction_days,
            FilterField::Month => a.month == b.month,
        }
    }
}

/// One mutation of [`Filters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    City(Option<String>),
    Vegetable(Option<String>),
    State(Option<String>),
    StartDate(Option<NaiveDate>),
    EndDate(Option<NaiveDate>),
    Sort(Option<SortOrder>),
    PredictionDays(PredictionDays),
    Month(Option<Month>),
}

impl FilterChange {
    pub fn field(&self) -> FilterField {
        match self {
            FilterChange::City(_) => FilterField::City,
            FilterChange::Vegetable(_) => FilterField::Vegetable,
            FilterChange::State(_) => FilterField::State,
            FilterChange::StartDate(_) => FilterField::StartDate,
            FilterChange::EndDate(_) => FilterField::EndDate,
            FilterChange::Sort(_) => FilterField::Sort,
            FilterChange::PredictionDays(_) => FilterField::PredictionDays,
            FilterChange::Month(_) => FilterField::Month,
        }
    }
}

/// Selector options loaded once at start-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub vegetables: Vec<Vegetable>,
    pub cities: Vec<City>,
}

impl Catalog {
    /// Sorted, de-duplicated states of the known cities.
    pub fn states(&self) -> Vec<String> {
        self.cities
            .iter()
            .map(|city| city.state.as_str())
            .filter(|state| !state.is_empty())
            .sorted()
            .dedup()
            .map(str::to_string)
            .collect()
    }
}

/// Last successfully fetched data per page, replaced wholesale on every fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Results {
    pub prices: Vec<PriceRecord>,
    pub recommendations: Vec<Recommendation>,
    pub savings: Option<SavingsSummary>,
    pub comparison: Vec<ComparisonRow>,
    pub predictions: Vec<PredictionPoint>,
    pub insights: Vec<InsightSummary>,
}

#[derive(Debug, Default)]
pub struct AppState {
    filters: Filters,
    page: Page,
    pub catalog: Catalog,
    pub results: Results,
    submission: Option<SubmissionForm>,
    submission_pending: bool,
    charts: ChartSlots,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &Filters {
        &self.filters
    }

    /// Apply a filter change. Empty strings are stored as unset.
    ///
    /// Returns `false` if the value was already current.
    pub fn set(&mut self, change: FilterChange) -> bool {
        let filters = &mut self.filters;
        match change {
            FilterChange::City(city) => replace(&mut filters.city, non_empty(city)),
            FilterChange::Vegetable(vegetable) => {
                replace(&mut filters.vegetable, non_empty(vegetable))
            }
            FilterChange::State(state) => replace(&mut filters.state, non_empty(state)),
            FilterChange::StartDate(date) => replace(&mut filters.start_date, date),
            FilterChange::EndDate(date) => replace(&mut filters.end_date, date),
            FilterChange::Sort(sort) => replace(&mut filters.sort, sort),
            FilterChange::PredictionDays(days) => replace(&mut filters.prediction_days, days),
            FilterChange::Month(month) => replace(&mut filters.month, month),
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub(crate) fn set_page(&mut self, page: Page) -> bool {
        replace(&mut self.page, page)
    }

    /// Replace the chart in `slot`: the previous handle is destroyed before `factory` runs.
    pub fn install_chart<F>(&mut self, slot: ChartSlot, factory: F) -> Result<(), RenderError>
    where
        F: FnOnce() -> Result<Box<dyn ChartHandle>, RenderError>,
    {
        self.charts.install(slot, factory)
    }

    /// Destroy every live chart whose slot fails `keep`.
    pub fn release_charts<F>(&mut self, keep: F) -> usize
    where
        F: Fn(&ChartSlot) -> bool,
    {
        self.charts.release_where(|slot| !keep(slot))
    }

    pub fn live_chart_slots(&self) -> Vec<ChartSlot> {
        self.charts.slots().collect()
    }

    pub fn submission(&self) -> Option<&SubmissionForm> {
        self.submission.as_ref()
    }

    /// Open the submission dialog prefilled from the current city and vegetable.
    pub fn open_submission(&mut self) {
        self.submission = Some(SubmissionForm::prefilled(&self.filters));
    }

    /// Replace the open draft. Ignored while the dialog is closed.
    pub fn edit_submission(&mut self, form: SubmissionForm) -> bool {
        match self.submission.as_mut() {
            Some(draft) => replace(draft, form),
            None => false,
        }
    }

    pub fn close_submission(&mut self) -> Option<SubmissionForm> {
        self.submission.take()
    }

    /// A submitted draft is waiting for the server.
    pub fn submission_pending(&self) -> bool {
        self.submission_pending
    }

    /// Mark a submission as in flight. Returns `false` if one already was.
    pub fn begin_submission(&mut self) -> bool {
        !std::mem::replace(&mut self.submission_pending, true)
    }

    pub fn finish_submission(&mut self) {
        self.submission_pending = false;
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_reports_change() {
        let mut state = AppState::new();

        struct TestCase {
            input: FilterChange,
            expected: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: first city selection
                input: FilterChange::City(Some("Pune".to_string())),
                expected: true,
            },
            TestCase {
                // TC1: same city again
                input: FilterChange::City(Some("Pune".to_string())),
                expected: false,
            },
            TestCase {
                // TC2: empty vegetable is unset, already unset
                input: FilterChange::Vegetable(Some(String::new())),
                expected: false,
            },
            TestCase {
                // TC3: vegetable selection
                input: FilterChange::Vegetable(Some("Tomato".to_string())),
                expected: true,
            },
            TestCase {
                // TC4: default horizon is already 7 days
                input: FilterChange::PredictionDays(PredictionDays::parse("abc")),
                expected: false,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = state.set(test.input);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }

        assert_eq!(state.get().city(), Some("Pune"));
        assert_eq!(state.get().vegetable(), Some("Tomato"));
    }

    #[test]
    fn test_vegetable_is_single_source_of_truth() {
        let mut state = AppState::new();
        state.set(FilterChange::City(Some("Pune".to_string())));
        state.set(FilterChange::Vegetable(Some("Onion".to_string())));

        state.open_submission();
        let draft = state.submission().unwrap();
        assert_eq!(draft.vegetable, "Onion");
        assert_eq!(draft.city, "Pune");

        state.set(FilterChange::Vegetable(Some("Okra".to_string())));
        assert_eq!(
            mandi_data::query::comparison(state.get()).unwrap().get("item"),
            Some("Okra")
        );
        assert_eq!(
            mandi_data::query::prediction(state.get()).get("item"),
            Some("Okra")
        );
    }

    #[test]
    fn test_catalog_states() {
        let city = |name: &str, state: &str| City {
            name: name.to_string(),
            state: state.to_string(),
        };
        let catalog = Catalog {
            vegetables: vec![],
            cities: vec![
                city("Pune", "Maharashtra"),
                city("Bengaluru", "Karnataka"),
                city("Nagpur", "Maharashtra"),
                city("Unknown", ""),
            ],
        };

        assert_eq!(catalog.states(), vec!["Karnataka", "Maharashtra"]);
    }

    #[test]
    fn test_filter_field_same_in() {
        let a = Filters {
            city: Some("Pune".to_string()),
            ..Filters::default()
        };
        let b = Filters {
            city: Some("Pune".to_string()),
            vegetable: Some("Tomato".to_string()),
            ..Filters::default()
        };

        assert!(FilterField::City.same_in(&a, &b));
        assert!(!FilterField::Vegetable.same_in(&a, &b));
    }

    #[test]
    fn test_edit_submission_requires_open_dialog() {
        let mut state = AppState::new();
        assert!(!state.edit_submission(SubmissionForm::default()));

        state.open_submission();
        let draft = SubmissionForm {
            price: "30.5".to_string(),
            ..state.submission().cloned().unwrap()
        };
        assert!(state.edit_submission(draft));
        assert_eq!(state.close_submission().map(|f| f.price), Some("30.5".to_string()));
        assert!(state.submission().is_none());
    }

    #[test]
    fn test_submission_pending_is_exclusive() {
        let mut state = AppState::new();
        assert!(!state.submission_pending());

        assert!(state.begin_submission());
        assert!(!state.begin_submission());
        assert!(state.submission_pending());

        state.finish_submission();
        assert!(!state.submission_pending());
        assert!(state.begin_submission());
    }
}
