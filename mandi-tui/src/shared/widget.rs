//! Ratatui widgets for the `mandi` terminal.
//!
//! Widgets only lay out what the engine already rendered into [`View`] nodes; live chart
//! specs come from [`TerminalCharts`].

use crate::shared::{
    banner::BannerKind,
    chart::{ChartKind, ChartSlot, ChartSpec, TerminalCharts},
    engine::Engine,
    router::Page,
    view::{Change, Container, Node, View},
};
use mandi_data::{model::Advice, model::Trend, SubmissionForm};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType,
        Paragraph, Tabs, Wrap,
    },
    Frame,
};

const C_UP: Color = Color::Rgb(220, 100, 100);
const C_DOWN: Color = Color::Rgb(100, 220, 100);
const C_NEUTRAL: Color = Color::Rgb(180, 180, 100);
const C_DIM: Color = Color::Rgb(120, 120, 120);
const C_BRIGHT: Color = Color::Rgb(220, 220, 220);
const C_ACCENT: Color = Color::Rgb(100, 180, 220);

const INSIGHT_CARD_HEIGHT: u16 = 8;

/// Focused input of the submission dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionField {
    #[default]
    Vegetable,
    City,
    Price,
    Source,
    Quality,
}

impl SubmissionField {
    pub const ALL: [SubmissionField; 5] = [
        SubmissionField::Vegetable,
        SubmissionField::City,
        SubmissionField::Price,
        SubmissionField::Source,
        SubmissionField::Quality,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SubmissionField::Vegetable => "Vegetable",
            SubmissionField::City => "City",
            SubmissionField::Price => "Price (₹/kg)",
            SubmissionField::Source => "Source",
            SubmissionField::Quality => "Quality (1-5)",
        }
    }

    pub fn next(&self) -> SubmissionField {
        let index = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn value<'a>(&self, form: &'a SubmissionForm) -> &'a str {
        match self {
            SubmissionField::Vegetable => &form.vegetable,
            SubmissionField::City => &form.city,
            SubmissionField::Price => &form.price,
            SubmissionField::Source => &form.source,
            SubmissionField::Quality => &form.quality,
        }
    }

    pub fn value_mut<'a>(&self, form: &'a mut SubmissionForm) -> &'a mut String {
        match self {
            SubmissionField::Vegetable => &mut form.vegetable,
            SubmissionField::City => &mut form.city,
            SubmissionField::Price => &mut form.price,
            SubmissionField::Source => &mut form.source,
            SubmissionField::Quality => &mut form.quality,
        }
    }
}

/// Draw the whole client.
pub fn render_ui(f: &mut Frame, engine: &Engine, charts: &TerminalCharts, focus: SubmissionField) {
    let banner_height = engine.banners().len().min(3) as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(banner_height),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, engine, chunks[0]);
    render_banners(f, engine, chunks[1]);

    let view = engine.view();
    match engine.page() {
        Page::Dashboard => render_dashboard(f, view, chunks[2]),
        Page::Compare => render_compare(f, engine, chunks[2]),
        Page::Predictions => render_predictions(f, engine, charts, chunks[2]),
        Page::Insights => render_insights(f, engine, charts, chunks[2]),
    }

    render_footer(f, engine.page(), chunks[3]);

    if let Some(form) = engine.state().submission() {
        render_submission(f, form, focus);
    }
}

fn render_header(f: &mut Frame, engine: &Engine, area: Rect) {
    let filters = engine.state().get();
    let status = engine.status(engine.page());

    let titles = Page::ALL
        .iter()
        .map(|page| Line::from(format!("{} {}", page.index() + 1, page.label())))
        .collect::<Vec<_>>();

    let title = Line::from(vec![
        Span::styled(" MANDI ", Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD)),
        Span::styled("city: ", Style::default().fg(C_DIM)),
        Span::styled(
            filters.city().unwrap_or("-").to_string(),
            Style::default().fg(C_BRIGHT),
        ),
        Span::styled("  item: ", Style::default().fg(C_DIM)),
        Span::styled(
            filters.vegetable().unwrap_or("-").to_string(),
            Style::default().fg(C_BRIGHT),
        ),
        Span::styled("  status: ", Style::default().fg(C_DIM)),
        Span::styled(
            status.label().to_string(),
            Style::default().fg(if status.is_loading() { C_NEUTRAL } else { C_DIM }),
        ),
        Span::raw(" "),
    ]);

    let tabs = Tabs::new(titles)
        .block(Block::default().title(title).borders(Borders::ALL))
        .select(engine.page().index())
        .style(Style::default().fg(C_DIM))
        .highlight_style(Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD));

    f.render_widget(tabs, area);
}

fn render_banners(f: &mut Frame, engine: &Engine, area: Rect) {
    if area.height == 0 {
        return;
    }

    let lines = engine
        .banners()
        .iter()
        .take(area.height as usize)
        .map(|banner| {
            let (marker, color) = match banner.kind {
                BannerKind::Error => ("✗ ", C_UP),
                BannerKind::Success => ("✓ ", C_DOWN),
            };
            Line::from(vec![
                Span::styled(marker, Style::default().fg(color)),
                Span::styled(banner.message.clone(), Style::default().fg(color)),
            ])
        })
        .collect::<Vec<_>>();

    f.render_widget(Paragraph::new(lines), area);
}

fn render_footer(f: &mut Frame, page: Page, area: Rect) {
    let keys = match page {
        Page::Dashboard => "c/C city  v/V item  r refresh",
        Page::Compare => "v/V item  s state  o sort  f last 7 days  a apply",
        Page::Predictions => "c/C city  v/V item  +/- days",
        Page::Insights => "c/C city  m/M month",
    };

    let line = Line::from(vec![
        Span::styled(" 1-4/Tab page  ", Style::default().fg(C_DIM)),
        Span::styled(keys, Style::default().fg(C_DIM)),
        Span::styled("  p submit price  q quit", Style::default().fg(C_DIM)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn panel(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_DIM))
}

fn render_nodes(f: &mut Frame, title: &str, nodes: &[Node], area: Rect) {
    let lines = nodes.iter().flat_map(node_lines).collect::<Vec<_>>();
    let paragraph = Paragraph::new(lines)
        .block(panel(title))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn node_lines(node: &Node) -> Vec<Line<'static>> {
    match node {
        Node::Notice(text) => vec![Line::from(Span::styled(
            text.clone(),
            Style::default().fg(C_DIM),
        ))],
        Node::PriceCard {
            vegetable,
            meta,
            change,
            change_label,
            price,
            updated,
        } => {
            let (arrow, color) = match change {
                Change::Up => ("▲ ", C_UP),
                Change::Down => ("▼ ", C_DOWN),
                Change::Flat => ("→ ", C_DIM),
            };
            vec![
                Line::from(vec![
                    Span::styled(
                        vegetable.clone(),
                        Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(price.clone(), Style::default().fg(C_ACCENT)),
                    Span::raw("  "),
                    Span::styled(format!("{arrow}{change_label}"), Style::default().fg(color)),
                ]),
                Line::from(Span::styled(
                    format!("{meta} • {updated}"),
                    Style::default().fg(C_DIM),
                )),
            ]
        }
        Node::RecommendationCard {
            vegetable,
            advice,
            current,
            predicted,
            reason,
            label,
        } => {
            let color = match advice {
                Advice::Buy => C_DOWN,
                Advice::Wait => C_NEUTRAL,
            };
            vec![
                Line::from(vec![
                    Span::styled(
                        vegetable.clone(),
                        Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(
                        label.clone(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("{current}  {predicted}"),
                    Style::default().fg(C_DIM),
                )),
                Line::from(Span::styled(reason.clone(), Style::default().fg(C_DIM))),
            ]
        }
        Node::SavingsCard { amount, items } => vec![
            Line::from(Span::styled(
                amount.clone(),
                Style::default().fg(C_DOWN).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Total savings this week",
                Style::default().fg(C_DIM),
            )),
            Line::from(Span::styled(items.clone(), Style::default().fg(C_DIM))),
        ],
        Node::ComparisonCard {
            source,
            meta,
            price,
            best,
            difference,
            quality,
        } => {
            let mut header = vec![
                Span::styled(
                    source.clone(),
                    Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(price.clone(), Style::default().fg(C_ACCENT)),
            ];
            if *best {
                header.push(Span::styled(
                    "  BEST",
                    Style::default().fg(C_DOWN).add_modifier(Modifier::BOLD),
                ));
            }
            vec![
                Line::from(header),
                Line::from(Span::styled(
                    format!("{meta} • Difference: {difference} • Quality: {quality}"),
                    Style::default().fg(C_DIM),
                )),
            ]
        }
        Node::Chart(_) => Vec::new(),
        Node::PredictionRow { date, price, bounds } => {
            let mut spans = vec![
                Span::styled(format!("{date}  "), Style::default().fg(C_DIM)),
                Span::styled(price.clone(), Style::default().fg(C_BRIGHT)),
            ];
            if let Some(bounds) = bounds {
                spans.push(Span::styled(
                    format!("  ({bounds})"),
                    Style::default().fg(C_DIM),
                ));
            }
            vec![Line::from(spans)]
        }
        Node::InsightCard {
            item, stats, trend, ..
        } => {
            let color = match trend {
                Trend::Rising => C_UP,
                Trend::Falling => C_DOWN,
                Trend::Stable => C_DIM,
            };
            vec![
                Line::from(Span::styled(
                    item.clone(),
                    Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(stats.clone(), Style::default().fg(C_DIM))),
                Line::from(Span::styled(
                    format!("Trend: {} {}", trend.arrow(), trend.label()),
                    Style::default().fg(color),
                )),
            ]
        }
    }
}

fn render_dashboard(f: &mut Frame, view: &View, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(columns[1]);

    render_nodes(f, "CURRENT PRICES", view.children(Container::Prices), columns[0]);
    render_nodes(f, "SAVINGS", view.children(Container::Savings), right[0]);
    render_nodes(
        f,
        "RECOMMENDATIONS",
        view.children(Container::Recommendations),
        right[1],
    );
}

fn render_compare(f: &mut Frame, engine: &Engine, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let filters = engine.state().get();
    let date = |date: Option<chrono::NaiveDate>| {
        date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
    };
    let line = Line::from(vec![
        Span::styled("item ", Style::default().fg(C_DIM)),
        Span::styled(
            filters.vegetable().unwrap_or("-").to_string(),
            Style::default().fg(C_BRIGHT),
        ),
        Span::styled("  state ", Style::default().fg(C_DIM)),
        Span::styled(
            filters.state().unwrap_or("-").to_string(),
            Style::default().fg(C_BRIGHT),
        ),
        Span::styled("  from ", Style::default().fg(C_DIM)),
        Span::styled(date(filters.start_date), Style::default().fg(C_BRIGHT)),
        Span::styled("  to ", Style::default().fg(C_DIM)),
        Span::styled(date(filters.end_date), Style::default().fg(C_BRIGHT)),
        Span::styled("  sort ", Style::default().fg(C_DIM)),
        Span::styled(
            filters.sort.map(|s| s.as_str()).unwrap_or("-"),
            Style::default().fg(C_BRIGHT),
        ),
    ]);
    f.render_widget(Paragraph::new(line).block(panel("FILTERS")), chunks[0]);

    render_nodes(
        f,
        "SOURCE COMPARISON",
        engine.view().children(Container::Comparison),
        chunks[1],
    );
}

fn render_predictions(f: &mut Frame, engine: &Engine, charts: &TerminalCharts, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let view = engine.view();
    let title = format!(
        "PREDICTION ({} days)",
        engine.state().get().prediction_days.get()
    );
    let chart_nodes = view.children(Container::PredictionChart);

    match chart_nodes.first() {
        Some(Node::Chart(slot)) => match charts.spec(*slot) {
            Some(spec) => render_line_chart(f, &title, &spec, chunks[0]),
            None => render_nodes(f, &title, &[], chunks[0]),
        },
        _ => render_nodes(f, &title, chart_nodes, chunks[0]),
    }

    render_nodes(f, "FORECAST", view.children(Container::Predictions), chunks[1]);
}

fn render_line_chart(f: &mut Frame, title: &str, spec: &ChartSpec, area: Rect) {
    let points = spec
        .values
        .iter()
        .enumerate()
        .map(|(index, value)| (index as f64, *value))
        .collect::<Vec<_>>();

    let min = spec.values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = spec.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = ((max - min) * 0.1).max(1.0);
    let last = points.len().saturating_sub(1).max(1) as f64;

    let x_labels = [spec.labels.first(), spec.labels.last()]
        .into_iter()
        .flatten()
        .map(|label| Span::styled(label.clone(), Style::default().fg(C_DIM)))
        .collect::<Vec<_>>();
    let y_labels = [min - pad, max + pad]
        .into_iter()
        .map(|value| Span::styled(format!("₹{value:.0}"), Style::default().fg(C_DIM)))
        .collect::<Vec<_>>();

    let dataset = Dataset::default()
        .name(spec.title.clone())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(C_ACCENT))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(panel(title))
        .x_axis(Axis::default().bounds([0.0, last]).labels(x_labels))
        .y_axis(
            Axis::default()
                .bounds([min - pad, max + pad])
                .labels(y_labels),
        );
    f.render_widget(chart, area);
}

fn render_insights(f: &mut Frame, engine: &Engine, charts: &TerminalCharts, area: Rect) {
    let title = format!("INSIGHTS: {}", engine.state().get().insight_month().name());
    let block = panel(&title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let nodes = engine.view().children(Container::Insights);
    let mut y = inner.y;
    for node in nodes {
        let remaining = inner.bottom().saturating_sub(y);
        if remaining == 0 {
            break;
        }
        let height = match node {
            Node::InsightCard { .. } => INSIGHT_CARD_HEIGHT.min(remaining),
            _ => 1,
        };
        let card = Rect::new(inner.x, y, inner.width, height);
        y = y.saturating_add(height);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(card);

        f.render_widget(Paragraph::new(node_lines(node)), columns[0]);
        if let Node::InsightCard { chart, .. } = node {
            if let Some(spec) = charts.spec(*chart) {
                render_bar_chart(f, *chart, &spec, columns[1]);
            }
        }
    }
}

fn render_bar_chart(f: &mut Frame, slot: ChartSlot, spec: &ChartSpec, area: Rect) {
    if spec.kind != ChartKind::Bar {
        return;
    }

    let colors = [C_UP, C_ACCENT, C_DOWN];
    let bars = spec
        .labels
        .iter()
        .zip(&spec.values)
        .enumerate()
        .map(|(index, (label, value))| {
            Bar::default()
                .value(value.max(0.0).round() as u64)
                .label(Line::from(label.clone()))
                .text_value(format!("{value:.0}"))
                .style(Style::default().fg(colors[index % colors.len()]))
        })
        .collect::<Vec<_>>();

    let chart = BarChart::default()
        .block(Block::default().title(Span::styled(
            format!(" {slot} "),
            Style::default().fg(C_DIM),
        )))
        .bar_width(5)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

fn render_submission(f: &mut Frame, form: &SubmissionForm, focus: SubmissionField) {
    let area = centered_rect(50, 11, f.area());
    f.render_widget(Clear, area);

    let mut lines = SubmissionField::ALL
        .iter()
        .map(|field| {
            let focused = *field == focus;
            let marker = if focused { "› " } else { "  " };
            let value_style = if focused {
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(C_BRIGHT)
            };
            Line::from(vec![
                Span::styled(marker, Style::default().fg(C_ACCENT)),
                Span::styled(format!("{:<14}", field.label()), Style::default().fg(C_DIM)),
                Span::styled(field.value(form).to_string(), value_style),
            ])
        })
        .collect::<Vec<_>>();

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Tab next field · Enter submit · Esc cancel",
        Style::default().fg(C_DIM),
    )));

    let dialog = Paragraph::new(lines).block(
        Block::default()
            .title(" SUBMIT PRICE ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(C_ACCENT)),
    );
    f.render_widget(dialog, area);
}

fn centered_rect(width_percent: u16, height: u16, area: Rect) -> Rect {
    let width = u32::from(area.width) * u32::from(width_percent.min(100)) / 100;
    let width = u16::try_from(width).unwrap_or(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_field_cycle() {
        let mut field = SubmissionField::default();
        let mut seen = Vec::new();
        for _ in 0..SubmissionField::ALL.len() {
            seen.push(field);
            field = field.next();
        }
        assert_eq!(seen, SubmissionField::ALL.to_vec());
        assert_eq!(field, SubmissionField::Vegetable);
    }

    #[test]
    fn test_submission_field_value_mut() {
        let mut form = SubmissionForm::default();
        SubmissionField::Price.value_mut(&mut form).push_str("30.5");
        assert_eq!(SubmissionField::Price.value(&form), "30.5");
        assert_eq!(form.price, "30.5");
    }

    #[test]
    fn test_centered_rect() {
        struct TestCase {
            width_percent: u16,
            height: u16,
            area: Rect,
            expected: Rect,
        }

        let tests = vec![
            TestCase {
                // TC0: regular terminal
                width_percent: 50,
                height: 11,
                area: Rect::new(0, 0, 100, 41),
                expected: Rect::new(25, 15, 50, 11),
            },
            TestCase {
                // TC1: terminal wider than u16::MAX / 50 columns
                width_percent: 50,
                height: 11,
                area: Rect::new(0, 0, 2000, 60),
                expected: Rect::new(500, 24, 1000, 11),
            },
            TestCase {
                // TC2: dialog taller than the area is clamped
                width_percent: 100,
                height: 20,
                area: Rect::new(0, 0, 40, 10),
                expected: Rect::new(0, 0, 40, 10),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = centered_rect(test.width_percent, test.height, test.area);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }
}
