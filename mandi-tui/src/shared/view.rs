//! View rendering.
//!
//! Each `render_*` function replaces every child of its [`Container`] with display-ready
//! [`Node`]s. Formatting rules live here so the terminal widgets only lay nodes out.

use crate::shared::{
    chart::{ChartBackend, ChartSlot, ChartSpec},
    state::AppState,
};
use chrono::Local;
use mandi_data::model::{
    Advice, ComparisonRow, InsightSummary, PredictionPoint, PriceRecord, Recommendation,
    SavingsSummary, Trend,
};
use std::collections::BTreeMap;
use tracing::warn;

pub const NO_PRICES: &str = "No price data available";
pub const NO_RECOMMENDATIONS: &str = "No recommendations available";
pub const NO_COMPARISON: &str = "No comparison data available";
pub const NO_PREDICTIONS: &str = "No prediction data available";
pub const NO_INSIGHTS: &str = "No insights available";

/// Marker shown instead of a difference on best comparison rows.
pub const BEST_DIFFERENCE: &str = "—";

/// Named region of a page whose children are replaced as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Container {
    Prices,
    Recommendations,
    Savings,
    Comparison,
    PredictionChart,
    Predictions,
    Insights,
}

/// Direction of a price change badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    Up,
    Down,
    Flat,
}

impl Change {
    pub fn classify(percent: f64) -> Self {
        if percent > 0.0 {
            Change::Up
        } else if percent < 0.0 {
            Change::Down
        } else {
            Change::Flat
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Change::Up => "up",
            Change::Down => "down",
            Change::Flat => "flat",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Notice(String),
    PriceCard {
        vegetable: String,
        meta: String,
        change: Change,
        change_label: String,
        price: String,
        updated: String,
    },
    RecommendationCard {
        vegetable: String,
        advice: Advice,
        current: String,
        predicted: String,
        reason: String,
        label: String,
    },
    SavingsCard {
        amount: String,
        items: String,
    },
    ComparisonCard {
        source: String,
        meta: String,
        price: String,
        best: bool,
        difference: String,
        quality: String,
    },
    Chart(ChartSlot),
    PredictionRow {
        date: String,
        price: String,
        bounds: Option<String>,
    },
    InsightCard {
        item: String,
        chart: ChartSlot,
        stats: String,
        trend: Trend,
    },
}

/// Rendered children per container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View {
    containers: BTreeMap<Container, Vec<Node>>,
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self, container: Container) -> &[Node] {
        self.containers
            .get(&container)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn replace(&mut self, container: Container, children: Vec<Node>) {
        self.containers.insert(container, children);
    }

    pub fn clear(&mut self, container: Container) {
        self.containers.remove(&container);
    }
}

fn rupees(value: f64) -> String {
    format!("₹{value:.2}")
}

fn notice(text: &str) -> Vec<Node> {
    vec![Node::Notice(text.to_string())]
}

pub fn render_prices(view: &mut View, records: &[PriceRecord]) {
    if records.is_empty() {
        view.replace(Container::Prices, notice(NO_PRICES));
        return;
    }

    let cards = records.iter().map(price_card).collect();
    view.replace(Container::Prices, cards);
}

fn price_card(record: &PriceRecord) -> Node {
    let updated = record
        .updated_at()
        .map(|at| at.with_timezone(&Local).format("%d %b %Y %H:%M").to_string())
        .unwrap_or_else(|| record.timestamp.clone());

    Node::PriceCard {
        vegetable: record.vegetable_name.clone(),
        meta: format!("{} • {}", record.source, record.city),
        change: Change::classify(record.price_change),
        change_label: format!("{:.1}%", record.price_change.abs()),
        price: format!("{}/kg", rupees(record.price_per_kg)),
        updated: format!("Last updated: {updated}"),
    }
}

pub fn render_recommendations(view: &mut View, recommendations: &[Recommendation]) {
    if recommendations.is_empty() {
        view.replace(Container::Recommendations, notice(NO_RECOMMENDATIONS));
        return;
    }

    let cards = recommendations
        .iter()
        .map(|rec| Node::RecommendationCard {
            vegetable: rec.vegetable_name.clone(),
            advice: rec.advice(),
            current: format!("Current: {}/kg", rupees(rec.current_price)),
            predicted: format!("Predicted: {}/kg", rupees(rec.predicted_price)),
            reason: rec.reason.clone(),
            label: format!(
                "{} - Save {}",
                rec.action.to_uppercase(),
                rupees(rec.potential_savings)
            ),
        })
        .collect();
    view.replace(Container::Recommendations, cards);
}

pub fn render_savings(view: &mut View, savings: &SavingsSummary) {
    let card = Node::SavingsCard {
        amount: rupees(savings.total_savings),
        items: format!(
            "By following recommendations on {} items",
            savings.items_saved
        ),
    };
    view.replace(Container::Savings, vec![card]);
}

/// Lowest price in the set. Rows equal to it (exact float equality) are best.
pub fn best_price(rows: &[ComparisonRow]) -> Option<f64> {
    rows.iter().map(|row| row.price).reduce(f64::min)
}

pub fn render_comparison(view: &mut View, rows: &[ComparisonRow]) {
    let Some(best) = best_price(rows) else {
        view.replace(Container::Comparison, notice(NO_COMPARISON));
        return;
    };

    let cards = rows
        .iter()
        .map(|row| {
            let is_best = row.price == best;
            let location = row.location.as_deref().unwrap_or("-");
            Node::ComparisonCard {
                source: row.source.clone(),
                meta: format!("{} • {} • {}", location, row.city, row.date),
                price: rupees(row.price),
                best: is_best,
                difference: if is_best {
                    BEST_DIFFERENCE.to_string()
                } else {
                    format!("+{}", rupees(row.price - best))
                },
                quality: row
                    .quality_rating
                    .map(|quality| quality.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            }
        })
        .collect();
    view.replace(Container::Comparison, cards);
}

/// Line chart in the prediction slot plus one text row per point.
///
/// The rows are rendered even when the chart cannot be created.
pub fn render_predictions(
    view: &mut View,
    state: &mut AppState,
    charts: &dyn ChartBackend,
    points: &[PredictionPoint],
) {
    if points.is_empty() {
        state.release_charts(|slot| *slot != ChartSlot::Prediction);
        view.replace(Container::PredictionChart, notice(NO_PREDICTIONS));
        view.clear(Container::Predictions);
        return;
    }

    let slot = ChartSlot::Prediction;
    let spec = ChartSpec::line(
        "Predicted Price (₹/kg)",
        points.iter().map(|point| point.date.to_string()).collect(),
        points.iter().map(|point| point.predicted_price).collect(),
    );

    match state.install_chart(slot, || charts.create(slot, spec)) {
        Ok(()) => view.replace(Container::PredictionChart, vec![Node::Chart(slot)]),
        Err(error) => {
            warn!(%error, "prediction chart failed, rendering rows only");
            view.clear(Container::PredictionChart);
        }
    }

    let rows = points
        .iter()
        .map(|point| Node::PredictionRow {
            date: point.date.to_string(),
            price: format!("{}/kg", rupees(point.predicted_price)),
            bounds: match (point.lower_bound, point.upper_bound) {
                (Some(lower), Some(upper)) => Some(format!("{} - {}", rupees(lower), rupees(upper))),
                _ => None,
            },
        })
        .collect();
    view.replace(Container::Predictions, rows);
}

/// One card per insight, each with a Min / Avg / Max bar chart in slot `insight-{index}`.
///
/// Charts left over from a longer previous result are destroyed.
pub fn render_insights(
    view: &mut View,
    state: &mut AppState,
    charts: &dyn ChartBackend,
    insights: &[InsightSummary],
) {
    let count = insights.len();
    state.release_charts(|slot| !matches!(slot, ChartSlot::Insight(index) if *index >= count));

    if insights.is_empty() {
        view.replace(Container::Insights, notice(NO_INSIGHTS));
        return;
    }

    let mut cards = Vec::with_capacity(count);
    for (index, insight) in insights.iter().enumerate() {
        let slot = ChartSlot::Insight(index);
        let spec = ChartSpec::bar(
            insight.item_name.clone(),
            vec!["Min".to_string(), "Avg".to_string(), "Max".to_string()],
            vec![insight.min_price, insight.avg_price, insight.max_price],
        );

        if let Err(error) = state.install_chart(slot, || charts.create(slot, spec)) {
            warn!(%error, item = %insight.item_name, "insight chart failed");
        }

        cards.push(Node::InsightCard {
            item: insight.item_name.clone(),
            chart: slot,
            stats: format!(
                "Min: {} | Avg: {} | Max: {}",
                rupees(insight.min_price),
                rupees(insight.avg_price),
                rupees(insight.max_price)
            ),
            trend: insight.trend_direction(),
        });
    }
    view.replace(Container::Insights, cards);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::chart::{ChartHandle, RenderError, TerminalCharts};
    use chrono::NaiveDate;

    fn row(source: &str, price: f64) -> ComparisonRow {
        ComparisonRow {
            source: source.to_string(),
            location: Some("APMC Yard".to_string()),
            city: "Pune".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            price,
            quality_rating: Some(4),
        }
    }

    fn price(change: f64) -> PriceRecord {
        PriceRecord {
            vegetable_name: "Tomato".to_string(),
            city: "Pune".to_string(),
            source: "Government".to_string(),
            price_per_kg: 32.0,
            price_change: change,
            timestamp: "not a timestamp".to_string(),
            quality_rating: None,
        }
    }

    #[test]
    fn test_price_card_change_badge() {
        struct TestCase {
            input: f64,
            expected: (Change, &'static str),
        }

        let tests = vec![
            TestCase {
                // TC0: rise
                input: 4.56,
                expected: (Change::Up, "4.6%"),
            },
            TestCase {
                // TC1: fall shows magnitude only
                input: -2.34,
                expected: (Change::Down, "2.3%"),
            },
            TestCase {
                // TC2: unchanged
                input: 0.0,
                expected: (Change::Flat, "0.0%"),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let mut view = View::new();
            render_prices(&mut view, &[price(test.input)]);
            let actual = match &view.children(Container::Prices)[0] {
                Node::PriceCard {
                    change,
                    change_label,
                    price,
                    updated,
                    ..
                } => {
                    assert_eq!(price, "₹32.00/kg");
                    assert_eq!(updated, "Last updated: not a timestamp");
                    (*change, change_label.clone())
                }
                other => panic!("unexpected node {other:?}"),
            };
            let expected = (test.expected.0, test.expected.1.to_string());
            assert_eq!(actual, expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_recommendation_label() {
        let rec = |action: &str| Recommendation {
            vegetable_name: "Onion".to_string(),
            current_price: 28.0,
            predicted_price: 24.5,
            action: action.to_string(),
            potential_savings: 3.5,
            reason: "Arrivals rising".to_string(),
            confidence: None,
        };

        let mut view = View::new();
        render_recommendations(&mut view, &[rec("Wait"), rec("Buy Now")]);

        let actual = view
            .children(Container::Recommendations)
            .iter()
            .map(|node| match node {
                Node::RecommendationCard { advice, label, .. } => (*advice, label.as_str()),
                other => panic!("unexpected node {other:?}"),
            })
            .collect::<Vec<_>>();
        assert_eq!(
            actual,
            vec![
                (Advice::Wait, "WAIT - Save ₹3.50"),
                (Advice::Buy, "BUY NOW - Save ₹3.50"),
            ]
        );
    }

    #[test]
    fn test_comparison_best_rows() {
        let rows = vec![
            row("Government", 42.50),
            row("Market A", 39.00),
            row("Market B", 39.00),
            row("Retail", 50.00),
        ];

        let mut view = View::new();
        render_comparison(&mut view, &rows);

        let actual = view
            .children(Container::Comparison)
            .iter()
            .map(|node| match node {
                Node::ComparisonCard {
                    best, difference, ..
                } => (*best, difference.as_str()),
                other => panic!("unexpected node {other:?}"),
            })
            .collect::<Vec<_>>();

        assert_eq!(
            actual,
            vec![
                (false, "+₹3.50"),
                (true, "—"),
                (true, "—"),
                (false, "+₹11.00"),
            ]
        );
    }

    #[test]
    fn test_empty_notices() {
        let mut view = View::new();
        let mut state = AppState::new();
        let charts = TerminalCharts::new();

        render_prices(&mut view, &[]);
        render_recommendations(&mut view, &[]);
        render_comparison(&mut view, &[]);
        render_predictions(&mut view, &mut state, &charts, &[]);
        render_insights(&mut view, &mut state, &charts, &[]);

        let notices = [
            (Container::Prices, NO_PRICES),
            (Container::Recommendations, NO_RECOMMENDATIONS),
            (Container::Comparison, NO_COMPARISON),
            (Container::PredictionChart, NO_PREDICTIONS),
            (Container::Insights, NO_INSIGHTS),
        ];
        for (container, text) in notices {
            assert_eq!(
                view.children(container),
                &[Node::Notice(text.to_string())],
                "{container:?}"
            );
        }
    }

    #[test]
    fn test_insights_release_surplus_charts() {
        let insight = |name: &str, trend: f64| InsightSummary {
            item_name: name.to_string(),
            min_price: 20.0,
            avg_price: 25.0,
            max_price: 31.0,
            trend,
        };

        let mut view = View::new();
        let mut state = AppState::new();
        let charts = TerminalCharts::new();

        let three = [
            insight("Tomato", 0.01),
            insight("Onion", 0.0),
            insight("Okra", -0.01),
        ];
        render_insights(&mut view, &mut state, &charts, &three);
        assert_eq!(charts.live_count(), 3);

        let trends = view
            .children(Container::Insights)
            .iter()
            .map(|node| match node {
                Node::InsightCard { trend, stats, .. } => {
                    assert_eq!(stats, "Min: ₹20.00 | Avg: ₹25.00 | Max: ₹31.00");
                    *trend
                }
                other => panic!("unexpected node {other:?}"),
            })
            .collect::<Vec<_>>();
        assert_eq!(trends, vec![Trend::Rising, Trend::Stable, Trend::Falling]);

        render_insights(&mut view, &mut state, &charts, &three[..1]);
        assert_eq!(charts.live_count(), 1);
        assert_eq!(state.live_chart_slots(), vec![ChartSlot::Insight(0)]);
    }

    #[derive(Debug)]
    struct BrokenCharts;

    impl ChartBackend for BrokenCharts {
        fn create(
            &self,
            slot: ChartSlot,
            _: ChartSpec,
        ) -> Result<Box<dyn ChartHandle>, RenderError> {
            Err(RenderError::Backend {
                slot,
                message: "no canvas".to_string(),
            })
        }
    }

    #[test]
    fn test_prediction_rows_survive_chart_failure() {
        let point = |day: u32, price: f64| PredictionPoint {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            predicted_price: price,
            lower_bound: Some(price - 2.0),
            upper_bound: Some(price + 2.0),
            confidence: Some(0.8),
            model_used: None,
        };

        let mut view = View::new();
        let mut state = AppState::new();
        render_predictions(
            &mut view,
            &mut state,
            &BrokenCharts,
            &[point(2, 30.0), point(3, 31.0)],
        );

        assert!(view.children(Container::PredictionChart).is_empty());
        assert!(state.live_chart_slots().is_empty());
        assert_eq!(
            view.children(Container::Predictions)[0],
            Node::PredictionRow {
                date: "2024-05-02".to_string(),
                price: "₹30.00/kg".to_string(),
                bounds: Some("₹28.00 - ₹32.00".to_string()),
            }
        );
    }
}
