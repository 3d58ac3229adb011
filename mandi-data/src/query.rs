use crate::{error::ValidationError, model::PriceSubmission};
use chrono::{Datelike, Local, Month, NaiveDate};
use derive_more::Display;

/// Horizon used when the prediction-days input is missing or invalid.
pub const DEFAULT_PREDICTION_DAYS: u32 = 7;

/// Month used by the insights page before the user picks one.
pub const DEFAULT_INSIGHT_MONTH: Month = Month::January;

/// Source recorded for a submission when the user leaves it blank.
pub const DEFAULT_SUBMISSION_SOURCE: &str = "User";

/// Quality recorded for a submission when the input is not an integer in 1..=5.
pub const DEFAULT_SUBMISSION_QUALITY: u8 = 3;

/// Price-data API endpoints, displayed as their path relative to the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Endpoint {
    #[display("vegetables")]
    Vegetables,
    #[display("cities")]
    Cities,
    #[display("current-prices")]
    CurrentPrices,
    #[display("recommendation")]
    Recommendation,
    #[display("insights")]
    Insights,
    #[display("comparison")]
    Comparison,
    #[display("prediction")]
    Prediction,
    #[display("submit-price/")]
    SubmitPrice,
}

impl Endpoint {
    pub fn path(&self) -> String {
        self.to_string()
    }
}

/// Server-side ordering of comparison rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "price_asc" => Some(SortOrder::PriceAsc),
            "price_desc" => Some(SortOrder::PriceDesc),
            _ => None,
        }
    }
}

/// Prediction horizon in days, always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PredictionDays(u32);

impl PredictionDays {
    /// Zero is replaced by the default.
    pub fn new(days: u32) -> Self {
        if days == 0 { Self::default() } else { Self(days) }
    }

    /// Parse raw user input. Non-numeric, negative or zero input yields the default.
    pub fn parse(input: &str) -> Self {
        input
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|days| *days > 0)
            .map(Self)
            .unwrap_or_default()
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for PredictionDays {
    fn default() -> Self {
        Self(DEFAULT_PREDICTION_DAYS)
    }
}

/// Current user selection criteria driving every page query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub city: Option<String>,
    pub vegetable: Option<String>,
    pub state: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort: Option<SortOrder>,
    pub prediction_days: PredictionDays,
    pub month: Option<Month>,
}

impl Filters {
    pub fn city(&self) -> Option<&str> {
        non_empty(self.city.as_deref())
    }

    pub fn vegetable(&self) -> Option<&str> {
        non_empty(self.vegetable.as_deref())
    }

    pub fn state(&self) -> Option<&str> {
        non_empty(self.state.as_deref())
    }

    /// Month selected on the insights page, defaulting to January.
    pub fn insight_month(&self) -> Month {
        self.month.unwrap_or(DEFAULT_INSIGHT_MONTH)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Endpoint plus ordered query parameters for one GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub endpoint: Endpoint,
    pub params: Vec<(&'static str, String)>,
}

impl RequestDescriptor {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    /// Append the parameter only if a value is present; unset values are never sent.
    pub fn optional_param<T: ToString>(self, key: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.param(key, value.to_string()),
            None => self,
        }
    }

    /// Value of the first parameter named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Form-urlencoded query string, without the leading `?`.
    pub fn query_string(&self) -> String {
        serde_urlencoded::to_string(&self.params).unwrap_or_default()
    }
}

/// Name of the current calendar month in local time.
pub fn current_month() -> Month {
    u8::try_from(Local::now().month())
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .unwrap_or(DEFAULT_INSIGHT_MONTH)
}

pub fn vegetables() -> RequestDescriptor {
    RequestDescriptor::new(Endpoint::Vegetables)
}

pub fn cities() -> RequestDescriptor {
    RequestDescriptor::new(Endpoint::Cities)
}

/// Dashboard prices. The vegetable filter is applied client-side, the endpoint ignores it.
pub fn current_prices(filters: &Filters) -> RequestDescriptor {
    RequestDescriptor::new(Endpoint::CurrentPrices).optional_param("city", filters.city())
}

/// Dashboard recommendations, vegetable filtered client-side like [`current_prices`].
pub fn recommendations(filters: &Filters) -> RequestDescriptor {
    RequestDescriptor::new(Endpoint::Recommendation).optional_param("city", filters.city())
}

/// Dashboard savings summary for the provided (usually current) month.
pub fn savings(filters: &Filters, month: Month) -> RequestDescriptor {
    RequestDescriptor::new(Endpoint::Insights)
        .optional_param("city", filters.city())
        .param("month", month.name())
}

/// Source comparison for the selected vegetable. Rejected without a vegetable.
pub fn comparison(filters: &Filters) -> Result<RequestDescriptor, ValidationError> {
    let item = filters
        .vegetable()
        .ok_or(ValidationError::MissingComparisonItem)?;

    Ok(RequestDescriptor::new(Endpoint::Comparison)
        .param("item", item)
        .optional_param("city", filters.city())
        .optional_param("state", filters.state())
        .optional_param("start_date", filters.start_date.map(format_date))
        .optional_param("end_date", filters.end_date.map(format_date))
        .optional_param("sort", filters.sort.map(|sort| sort.as_str())))
}

/// Prediction series for the selected vegetable over the configured horizon.
pub fn prediction(filters: &Filters) -> RequestDescriptor {
    RequestDescriptor::new(Endpoint::Prediction)
        .optional_param("city", filters.city())
        .optional_param("item", filters.vegetable())
        .param("days", filters.prediction_days.get().to_string())
}

/// Insights page statistics for the selected month.
pub fn insights(filters: &Filters) -> RequestDescriptor {
    RequestDescriptor::new(Endpoint::Insights)
        .param("month", filters.insight_month().name())
        .optional_param("city", filters.city())
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Raw submission dialog input, validated into a [`PriceSubmission`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionForm {
    pub vegetable: String,
    pub city: String,
    pub price: String,
    pub source: String,
    pub quality: String,
}

impl SubmissionForm {
    /// Draft prefilled from the current city and vegetable selection.
    pub fn prefilled(filters: &Filters) -> Self {
        Self {
            vegetable: filters.vegetable().unwrap_or_default().to_string(),
            city: filters.city().unwrap_or_default().to_string(),
            quality: DEFAULT_SUBMISSION_QUALITY.to_string(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<PriceSubmission, ValidationError> {
        let vegetable = self.vegetable.trim();
        if vegetable.is_empty() {
            return Err(ValidationError::MissingVegetable);
        }

        let city = self.city.trim();
        if city.is_empty() {
            return Err(ValidationError::MissingCity);
        }

        let price_per_kg = self
            .price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite() && *price > 0.0)
            .ok_or(ValidationError::InvalidPrice)?;

        let source = match self.source.trim() {
            "" => DEFAULT_SUBMISSION_SOURCE,
            source => source,
        };

        let quality_rating = self
            .quality
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|quality| (1..=5).contains(quality))
            .unwrap_or(DEFAULT_SUBMISSION_QUALITY);

        Ok(PriceSubmission {
            vegetable_name: vegetable.to_string(),
            city_name: city.to_string(),
            price_per_kg,
            source: source.to_string(),
            quality_rating,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(city: &str, vegetable: &str) -> Filters {
        Filters {
            city: Some(city.to_string()),
            vegetable: Some(vegetable.to_string()),
            ..Filters::default()
        }
    }

    #[test]
    fn test_dashboard_requests_only_send_city() {
        let filters = filters("Pune", "Tomato");

        let prices = current_prices(&filters);
        assert_eq!(prices.endpoint, Endpoint::CurrentPrices);
        assert_eq!(prices.params, vec![("city", "Pune".to_string())]);

        let recommendations = recommendations(&filters);
        assert_eq!(recommendations.endpoint, Endpoint::Recommendation);
        assert_eq!(recommendations.params, vec![("city", "Pune".to_string())]);

        let savings = savings(&filters, Month::March);
        assert_eq!(savings.endpoint, Endpoint::Insights);
        assert_eq!(
            savings.params,
            vec![("city", "Pune".to_string()), ("month", "March".to_string())]
        );
    }

    #[test]
    fn test_comparison_omits_unset_fields() {
        let actual = comparison(&filters("Pune", "Onion")).unwrap();
        assert_eq!(actual.query_string(), "item=Onion&city=Pune");

        let full = Filters {
            state: Some("Maharashtra".to_string()),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 7),
            sort: Some(SortOrder::PriceDesc),
            ..filters("Pune", "Onion")
        };
        let actual = comparison(&full).unwrap();
        assert_eq!(
            actual.query_string(),
            "item=Onion&city=Pune&state=Maharashtra&start_date=2024-05-01&end_date=2024-05-07&sort=price_desc"
        );
    }

    #[test]
    fn test_comparison_empty_strings_are_unset() {
        let input = Filters {
            city: Some(String::new()),
            vegetable: Some("Okra".to_string()),
            state: Some(String::new()),
            ..Filters::default()
        };
        let actual = comparison(&input).unwrap();
        assert_eq!(actual.params, vec![("item", "Okra".to_string())]);
    }

    #[test]
    fn test_comparison_requires_item() {
        struct TestCase {
            input: Filters,
            expected: Result<(), ValidationError>,
        }

        let tests = vec![
            TestCase {
                // TC0: no vegetable selected
                input: Filters {
                    city: Some("Pune".to_string()),
                    ..Filters::default()
                },
                expected: Err(ValidationError::MissingComparisonItem),
            },
            TestCase {
                // TC1: empty vegetable selected
                input: filters("Pune", ""),
                expected: Err(ValidationError::MissingComparisonItem),
            },
            TestCase {
                // TC2: vegetable selected without a city
                input: Filters {
                    vegetable: Some("Potato".to_string()),
                    ..Filters::default()
                },
                expected: Ok(()),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = comparison(&test.input).map(|_| ());
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_prediction_days_parse() {
        struct TestCase {
            input: &'static str,
            expected: u32,
        }

        let tests = vec![
            TestCase {
                // TC0: valid horizon
                input: "14",
                expected: 14,
            },
            TestCase {
                // TC1: non-numeric falls back to default
                input: "abc",
                expected: DEFAULT_PREDICTION_DAYS,
            },
            TestCase {
                // TC2: zero falls back to default
                input: "0",
                expected: DEFAULT_PREDICTION_DAYS,
            },
            TestCase {
                // TC3: negative falls back to default
                input: "-3",
                expected: DEFAULT_PREDICTION_DAYS,
            },
            TestCase {
                // TC4: surrounding whitespace is ignored
                input: " 30 ",
                expected: 30,
            },
            TestCase {
                // TC5: empty input falls back to default
                input: "",
                expected: DEFAULT_PREDICTION_DAYS,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = PredictionDays::parse(test.input).get();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_prediction_request() {
        let input = Filters {
            prediction_days: PredictionDays::parse("10"),
            ..filters("Nagpur", "Carrot")
        };
        let actual = prediction(&input);
        assert_eq!(actual.endpoint, Endpoint::Prediction);
        assert_eq!(actual.query_string(), "city=Nagpur&item=Carrot&days=10");
    }

    #[test]
    fn test_insights_request_defaults_to_january() {
        let actual = insights(&filters("Pune", "Tomato"));
        assert_eq!(actual.query_string(), "month=January&city=Pune");

        let input = Filters {
            month: Some(Month::October),
            ..filters("Pune", "Tomato")
        };
        assert_eq!(insights(&input).get("month"), Some("October"));
    }

    #[test]
    fn test_query_string_encodes_values() {
        let actual = RequestDescriptor::new(Endpoint::Comparison)
            .param("item", "Lady Finger")
            .param("city", "Navi Mumbai");
        assert_eq!(actual.query_string(), "item=Lady+Finger&city=Navi+Mumbai");
    }

    #[test]
    fn test_submission_validation() {
        let valid = SubmissionForm {
            vegetable: "Tomato".to_string(),
            city: "Pune".to_string(),
            price: "30.5".to_string(),
            source: "User".to_string(),
            quality: "3".to_string(),
        };

        struct TestCase {
            input: SubmissionForm,
            expected: Result<(), ValidationError>,
        }

        let tests = vec![
            TestCase {
                // TC0: valid submission
                input: valid.clone(),
                expected: Ok(()),
            },
            TestCase {
                // TC1: vegetable unset
                input: SubmissionForm {
                    vegetable: String::new(),
                    ..valid.clone()
                },
                expected: Err(ValidationError::MissingVegetable),
            },
            TestCase {
                // TC2: city unset
                input: SubmissionForm {
                    city: "  ".to_string(),
                    ..valid.clone()
                },
                expected: Err(ValidationError::MissingCity),
            },
            TestCase {
                // TC3: non-numeric price
                input: SubmissionForm {
                    price: "abc".to_string(),
                    ..valid.clone()
                },
                expected: Err(ValidationError::InvalidPrice),
            },
            TestCase {
                // TC4: negative price
                input: SubmissionForm {
                    price: "-5".to_string(),
                    ..valid.clone()
                },
                expected: Err(ValidationError::InvalidPrice),
            },
            TestCase {
                // TC5: zero price
                input: SubmissionForm {
                    price: "0".to_string(),
                    ..valid.clone()
                },
                expected: Err(ValidationError::InvalidPrice),
            },
            TestCase {
                // TC6: infinite price
                input: SubmissionForm {
                    price: "inf".to_string(),
                    ..valid.clone()
                },
                expected: Err(ValidationError::InvalidPrice),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.input.validate().map(|_| ());
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_submission_defaults() {
        let input = SubmissionForm {
            vegetable: "Onion".to_string(),
            city: "Pune".to_string(),
            price: "22".to_string(),
            source: String::new(),
            quality: "9".to_string(),
        };

        let actual = input.validate().unwrap();
        assert_eq!(actual.source, DEFAULT_SUBMISSION_SOURCE);
        assert_eq!(actual.quality_rating, DEFAULT_SUBMISSION_QUALITY);
        assert_eq!(actual.price_per_kg, 22.0);
    }

    #[test]
    fn test_submission_prefilled_from_filters() {
        let actual = SubmissionForm::prefilled(&filters("Pune", "Tomato"));
        assert_eq!(actual.vegetable, "Tomato");
        assert_eq!(actual.city, "Pune");
        assert_eq!(actual.price, "");
        assert_eq!(actual.quality, "3");
    }
}
