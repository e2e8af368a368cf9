//! Per chart type candidate generation.
//!
//! Every generator walks the shuffled buckets, validates each channel with
//! the suitability rules and scores what survives. Missing buckets simply
//! yield no candidates.

use tracing::debug;

use super::buckets::ColumnBuckets;
use super::scoring::{prefers_average, score, ScoreBreakdown, ScoreInputs};
use super::SuggestionInput;
use crate::config::SuggestionConfig;
use crate::model::{
    Aggregation, ChartType, ColumnAnalysis, Encoding, TimeUnit, Transform, COUNT_FIELD,
};
use crate::suitability::{
    is_good_color_column, is_good_x_axis, is_good_y_axis, NUMERIC_X_MAX_FOR_BAR,
};

/// A scored, not yet accepted encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<'a> {
    pub chart_type: ChartType,
    pub encoding: Encoding,
    pub x: Option<&'a ColumnAnalysis>,
    /// `None` for count-based charts.
    pub y: Option<&'a ColumnAnalysis>,
    pub color: Option<&'a ColumnAnalysis>,
    pub x_transform: Option<Transform>,
    pub y_transform: Option<Transform>,
    pub score: ScoreBreakdown,
}

impl Candidate<'_> {
    pub fn total_score(&self) -> f64 {
        self.score.total()
    }

    pub fn signature(&self) -> String {
        self.encoding.signature()
    }
}

/// Everything a generator reads.
pub struct CandidateContext<'c, 'a> {
    pub input: &'c SuggestionInput<'a>,
    pub buckets: &'c ColumnBuckets<'a>,
    pub config: &'c SuggestionConfig,
}

impl CandidateContext<'_, '_> {
    /// Whether scatter requests should render as binned density.
    pub fn prefers_density(&self) -> bool {
        self.input
            .row_count
            .is_some_and(|rows| rows > self.config.scatter_point_ceiling)
    }
}

/// Generates all candidates of one chart type, in bucket order.
pub fn generate<'a>(chart_type: ChartType, ctx: &CandidateContext<'_, 'a>) -> Vec<Candidate<'a>> {
    let candidates = match chart_type {
        ChartType::Bar => bar(ctx),
        ChartType::GroupedBar => grouped_bar(ctx),
        ChartType::Line => line(ctx, ChartType::Line),
        ChartType::Area => line(ctx, ChartType::Area),
        ChartType::Scatter => {
            let target = if ctx.prefers_density() {
                ChartType::Heatmap
            } else {
                ChartType::Scatter
            };
            scatter(ctx, target)
        }
        ChartType::Heatmap => scatter(ctx, ChartType::Heatmap),
        ChartType::Histogram => histogram(ctx),
        ChartType::Table => table(ctx),
    };

    debug!(
        chart_type = chart_type.as_str(),
        candidates = candidates.len(),
        "Generated candidates"
    );
    candidates
}

fn value_transform(y: &ColumnAnalysis) -> Transform {
    let op = if prefers_average(&y.column_name) {
        Aggregation::Avg
    } else {
        Aggregation::Sum
    };
    Transform::Aggregate { op }
}

fn count_transform() -> Transform {
    Transform::Aggregate {
        op: Aggregation::Count,
    }
}

struct Channels<'a> {
    x: &'a ColumnAnalysis,
    y: Option<&'a ColumnAnalysis>,
    color: Option<&'a ColumnAnalysis>,
    x_transform: Option<Transform>,
    y_transform: Option<Transform>,
}

/// Validates every channel and scores the encoding.
fn build<'a>(
    ctx: &CandidateContext<'_, 'a>,
    chart_type: ChartType,
    channels: Channels<'a>,
) -> Option<Candidate<'a>> {
    let input = ctx.input;
    let Channels {
        x,
        y,
        color,
        x_transform,
        y_transform,
    } = channels;

    let mut encoding = Encoding::xy(
        x.column_name.as_str(),
        y.map_or(COUNT_FIELD, |c| c.column_name.as_str()),
    );

    let x_eval = is_good_x_axis(x, chart_type, input.field_for(x), input.row_count);
    if !x_eval.good {
        debug!(
            chart_type = chart_type.as_str(),
            column = x.column_name,
            reason = x_eval.reason.as_deref().unwrap_or(""),
            "Rejected X axis"
        );
        return None;
    }

    if let Some(y) = y {
        let y_eval = is_good_y_axis(y, chart_type, input.field_for(y), input.row_count);
        if !y_eval.good {
            debug!(
                chart_type = chart_type.as_str(),
                column = y.column_name,
                reason = y_eval.reason.as_deref().unwrap_or(""),
                "Rejected Y axis"
            );
            return None;
        }
    }

    if let Some(color) = color {
        let color_eval = is_good_color_column(color, Some(&encoding));
        if !color_eval.good {
            debug!(
                chart_type = chart_type.as_str(),
                column = color.column_name,
                reason = color_eval.reason.as_deref().unwrap_or(""),
                "Rejected color"
            );
            return None;
        }
        encoding = encoding.with_color(color.column_name.as_str());
    }

    let score = score(&ScoreInputs {
        encoding: &encoding,
        x: Some(x),
        y,
        color,
        column_tables: &input.column_tables,
        row_count: input.row_count,
    })?;

    Some(Candidate {
        chart_type,
        encoding,
        x: Some(x),
        y,
        color,
        x_transform,
        y_transform,
        score,
    })
}

/// Bar X axes: categories, dates and low-cardinality numbers.
fn bar_axes<'a>(buckets: &ColumnBuckets<'a>) -> Vec<&'a ColumnAnalysis> {
    buckets
        .categorical
        .iter()
        .chain(&buckets.temporal)
        .chain(
            buckets
                .numerical
                .iter()
                .filter(|c| c.cardinality <= NUMERIC_X_MAX_FOR_BAR),
        )
        .copied()
        .collect()
}

fn bar<'a>(ctx: &CandidateContext<'_, 'a>) -> Vec<Candidate<'a>> {
    let buckets = ctx.buckets;
    let xs = bar_axes(buckets);

    let mut out = Vec::new();
    for x in xs {
        let x_transform = x.is_temporal().then_some(Transform::TimeUnit {
            unit: TimeUnit::Month,
        });

        // Without any measure, bars fall back to counting rows per category.
        if buckets.numerical.is_empty() {
            out.extend(build(
                ctx,
                ChartType::Bar,
                Channels {
                    x,
                    y: None,
                    color: None,
                    x_transform,
                    y_transform: Some(count_transform()),
                },
            ));
            continue;
        }

        for &y in buckets
            .numerical
            .iter()
            .filter(|y| y.column_name != x.column_name)
        {
            out.extend(build(
                ctx,
                ChartType::Bar,
                Channels {
                    x,
                    y: Some(y),
                    color: None,
                    x_transform,
                    y_transform: Some(value_transform(y)),
                },
            ));
        }
    }
    out
}

fn grouped_bar<'a>(ctx: &CandidateContext<'_, 'a>) -> Vec<Candidate<'a>> {
    let buckets = ctx.buckets;
    let max_ratio = ctx.config.max_dominant_color_ratio;

    let colors: Vec<&ColumnAnalysis> = buckets
        .color_suitable
        .iter()
        .copied()
        .filter(|c| match c.max_frequency_ratio() {
            Some(ratio) if ratio > max_ratio => {
                debug!(
                    column = c.column_name,
                    ratio, "Color column dominated by one value"
                );
                false
            }
            _ => true,
        })
        .collect();

    let mut out = Vec::new();
    for &x in &buckets.categorical {
        for &color in colors.iter().filter(|c| c.column_name != x.column_name) {
            for &y in &buckets.numerical {
                out.extend(build(
                    ctx,
                    ChartType::GroupedBar,
                    Channels {
                        x,
                        y: Some(y),
                        color: Some(color),
                        x_transform: None,
                        y_transform: Some(value_transform(y)),
                    },
                ));
            }
        }
    }
    out
}

/// Line and area charts. Area needs a time axis; line falls back to a
/// continuous numerical axis when no temporal column exists.
fn line<'a>(ctx: &CandidateContext<'_, 'a>, chart_type: ChartType) -> Vec<Candidate<'a>> {
    let buckets = ctx.buckets;
    let xs: &[&ColumnAnalysis] = if !buckets.temporal.is_empty() {
        &buckets.temporal
    } else if chart_type == ChartType::Line {
        &buckets.numerical
    } else {
        &[]
    };

    let mut out = Vec::new();
    for &x in xs {
        let x_transform = x.is_temporal().then_some(Transform::TimeUnit {
            unit: TimeUnit::Month,
        });
        for &y in buckets
            .numerical
            .iter()
            .filter(|y| y.column_name != x.column_name)
        {
            out.extend(build(
                ctx,
                chart_type,
                Channels {
                    x,
                    y: Some(y),
                    color: None,
                    x_transform,
                    y_transform: Some(value_transform(y)),
                },
            ));
        }
    }
    out
}

/// Unordered numerical pairs. The more measure-like column takes the Y axis.
fn scatter<'a>(ctx: &CandidateContext<'_, 'a>, chart_type: ChartType) -> Vec<Candidate<'a>> {
    use super::scoring::metric_likelihood;

    let numerical = &ctx.buckets.numerical;
    let bins = (chart_type == ChartType::Heatmap).then_some(Transform::Bin {
        max_bins: ctx.config.max_bins,
    });

    let mut out = Vec::new();
    for (i, &a) in numerical.iter().enumerate() {
        for &b in &numerical[i + 1..] {
            let (x, y) = if metric_likelihood(&a.column_name) > metric_likelihood(&b.column_name)
            {
                (b, a)
            } else {
                (a, b)
            };
            out.extend(build(
                ctx,
                chart_type,
                Channels {
                    x,
                    y: Some(y),
                    color: None,
                    x_transform: bins,
                    y_transform: bins,
                },
            ));
        }
    }
    out
}

fn histogram<'a>(ctx: &CandidateContext<'_, 'a>) -> Vec<Candidate<'a>> {
    ctx.buckets
        .numerical
        .iter()
        .filter_map(|&x| {
            build(
                ctx,
                ChartType::Histogram,
                Channels {
                    x,
                    y: None,
                    color: None,
                    x_transform: Some(Transform::Bin {
                        max_bins: ctx.config.max_bins,
                    }),
                    y_transform: Some(count_transform()),
                },
            )
        })
        .collect()
}

fn table<'a>(ctx: &CandidateContext<'_, 'a>) -> Vec<Candidate<'a>> {
    let buckets = ctx.buckets;
    let mut out = Vec::new();
    for &x in buckets.categorical.iter().chain(&buckets.temporal) {
        for &y in &buckets.numerical {
            out.extend(build(
                ctx,
                ChartType::Table,
                Channels {
                    x,
                    y: Some(y),
                    color: None,
                    x_transform: None,
                    y_transform: Some(value_transform(y)),
                },
            ));
        }
    }
    out
}
