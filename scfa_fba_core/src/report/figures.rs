//! SVG figures of the merged results
use std::path::{Path, PathBuf};

use svg::node::element::{Circle, Line, Polyline, Rectangle, Text};
use svg::{Document, Node};
use tracing::{info, warn};

use crate::report::table::Table;
use crate::report::ReportError;
use crate::scfa_inputs::{Scfa, CONDITION_COLUMN};

const WIDTH: f64 = 700.;
const HEIGHT: f64 = 450.;
const MARGIN_LEFT: f64 = 80.;
const MARGIN_RIGHT: f64 = 140.;
const MARGIN_TOP: f64 = 50.;
const MARGIN_BOTTOM: f64 = 70.;
const FONT: &str = "Times New Roman, Times, serif";
const BAR_WIDTH: f64 = 0.55;

/// Prefix of the pathway flux columns
pub const PATHWAY_PREFIX: &str = "pathway_";

/// Dark2-like colors of the plotted series
pub mod palette {
    pub const ACETATE: &str = "#1b9e77";
    pub const PROPIONATE: &str = "#d95f02";
    pub const BUTYRATE: &str = "#7570b3";
    pub const GLUCOSE: &str = "#e7298a";
    pub const OXYGEN: &str = "#66a61e";
    pub const CO2: &str = "#a65628";
    pub const OBJECTIVE: &str = "#e6ab02";
    pub const BASELINE: &str = "#999999";
    pub const DELTA: &str = "#d62728";
    pub const AXIS: &str = "#333333";
    pub const GRID: &str = "#dddddd";
    pub const MISSING: &str = "#eeeeee";
}

fn scfa_color(scfa: Scfa) -> &'static str {
    match scfa {
        Scfa::Acetate => palette::ACETATE,
        Scfa::Propionate => palette::PROPIONATE,
        Scfa::Butyrate => palette::BUTYRATE,
    }
}

fn capitalized(name: &str) -> String {
    let mut out = name[..1].to_uppercase();
    out.push_str(&name[1..]);
    out
}

/// Render every figure into `dir`
///
/// Rows are drawn in `order` (the configured condition order) and labelled with
/// `labels`, which must line up with `order`.
///
/// # Returns
/// Paths of the written figures
pub fn render_figures(
    merged: &Table,
    order: &[String],
    labels: &[String],
    dir: &Path,
) -> Result<Vec<PathBuf>, ReportError> {
    let rows = merged.ordered_by(CONDITION_COLUMN, order)?;
    let conditions = rows
        .column(CONDITION_COLUMN)
        .ok_or_else(|| ReportError::MissingColumn(CONDITION_COLUMN.to_string()))?;
    let x_labels: Vec<String> = conditions
        .iter()
        .map(|c| {
            order
                .iter()
                .position(|o| o == c)
                .and_then(|i| labels.get(i))
                .cloned()
                .unwrap_or_else(|| c.to_string())
        })
        .collect();

    let mut figures = vec![
        ("fig_scfa_inputs.svg", scfa_inputs(&rows, &x_labels)?),
        ("fig_scfa_ratios.svg", scfa_ratios(&rows, &x_labels)?),
        ("fig_host_objective.svg", host_objective(&rows, &x_labels)?),
    ];
    if rows.has_column("objective_pct_change") {
        figures.push((
            "fig_objective_delta_pct.svg",
            objective_delta_pct(&rows, &x_labels)?,
        ));
    }
    figures.push(("fig_host_exchange_fluxes.svg", exchange_fluxes(&rows, &x_labels)));
    match pathway_heatmap(&rows, &x_labels) {
        Some(doc) => figures.push(("fig_pathway_heatmap.svg", doc)),
        None => warn!("No pathway carries flux, skipping the pathway heatmap"),
    }

    let mut written = Vec::new();
    for (name, doc) in figures {
        let path = dir.join(name);
        svg::save(&path, &doc).map_err(|source| ReportError::UnableToSave {
            path: path.clone(),
            source,
        })?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn numeric(rows: &Table, column: &str) -> Result<Vec<f64>, ReportError> {
    rows.numeric_column(column)
        .ok_or_else(|| ReportError::MissingColumn(column.to_string()))
}

// region Figures
fn scfa_inputs(rows: &Table, labels: &[String]) -> Result<Document, ReportError> {
    let mut series = Vec::new();
    for scfa in Scfa::ALL {
        series.push((
            capitalized(scfa.name()),
            scfa_color(scfa),
            numeric(rows, scfa.dose_column())?,
        ));
    }
    let range = value_range(series.iter().flat_map(|(_, _, v)| v.iter().copied()));
    let mut plot = Plot::new("SCFA Availability by Dose Condition", labels.len(), range)
        .axes(labels, Some("Dose Condition"), "SCFA Availability (mmol/gDW/hr)");
    for (_, color, values) in &series {
        plot = plot.line(values, color);
    }
    let entries: Vec<(&str, &str)> = series.iter().map(|(l, c, _)| (l.as_str(), *c)).collect();
    Ok(plot.legend(&entries).finish())
}

fn scfa_ratios(rows: &Table, labels: &[String]) -> Result<Document, ReportError> {
    let doses: Vec<Vec<f64>> = Scfa::ALL
        .iter()
        .map(|s| numeric(rows, s.dose_column()))
        .collect::<Result<_, _>>()?;
    let totals: Vec<f64> = (0..rows.len())
        .map(|i| doses.iter().map(|d| d[i]).sum())
        .collect();
    let mut plot = Plot::new("SCFA Molar Ratio by Condition", labels.len(), (0., 1.05))
        .axes(labels, None, "Molar Fraction");
    let mut bottoms = vec![0.; rows.len()];
    let mut entries = Vec::new();
    for (scfa, dose) in Scfa::ALL.iter().zip(&doses) {
        let fractions: Vec<f64> = dose.iter().zip(&totals).map(|(d, t)| d / t).collect();
        plot = plot.bars(&fractions, &bottoms, scfa_color(*scfa));
        for (bottom, f) in bottoms.iter_mut().zip(&fractions) {
            *bottom += f;
        }
        entries.push((capitalized(scfa.name()), scfa_color(*scfa)));
    }
    let entries: Vec<(&str, &str)> = entries.iter().map(|(l, c)| (l.as_str(), *c)).collect();
    Ok(plot.legend(&entries).finish())
}

fn host_objective(rows: &Table, labels: &[String]) -> Result<Document, ReportError> {
    let values = numeric(rows, "objective_value")?;
    let baseline = numeric(rows, "baseline_objective")?
        .first()
        .copied()
        .unwrap_or(f64::NAN);
    let range = value_range(values.iter().copied().chain([baseline, 0.]));
    let zeros = vec![0.; values.len()];
    let mut plot = Plot::new("ATP Maintenance by Dose Condition", labels.len(), range)
        .axes(labels, Some("Dose Condition"), "ATPM (mmol/gDW/hr)")
        .bars(&values, &zeros, palette::OBJECTIVE)
        .hline(baseline, palette::BASELINE, true);
    for (i, v) in values.iter().enumerate() {
        plot = plot.value_label(i, *v, &format!("{v:.1}"));
    }
    let baseline_label = format!("Baseline ({baseline:.1})");
    Ok(plot
        .legend(&[
            ("ATPM", palette::OBJECTIVE),
            (baseline_label.as_str(), palette::BASELINE),
        ])
        .finish())
}

fn objective_delta_pct(rows: &Table, labels: &[String]) -> Result<Document, ReportError> {
    let values = numeric(rows, "objective_pct_change")?;
    let range = value_range(values.iter().copied().chain([0.]));
    let zeros = vec![0.; values.len()];
    let mut plot = Plot::new("% Change in ATPM vs Baseline", labels.len(), range)
        .axes(labels, None, "ATPM Change (%)")
        .bars(&values, &zeros, palette::DELTA)
        .hline(0., palette::BASELINE, true);
    for (i, v) in values.iter().enumerate() {
        plot = plot.value_label(i, *v, &format!("{v:+.1}%"));
    }
    Ok(plot.finish())
}

fn exchange_fluxes(rows: &Table, labels: &[String]) -> Document {
    let candidates = [
        ("Glucose", "glucose_flux", palette::GLUCOSE),
        ("Acetate", "acetate_flux", palette::ACETATE),
        ("Propionate", "propionate_flux", palette::PROPIONATE),
        ("Butyrate", "butyrate_flux", palette::BUTYRATE),
        ("O₂", "oxygen_flux", palette::OXYGEN),
        ("CO₂", "co2_flux", palette::CO2),
    ];
    let series: Vec<(&str, &str, Vec<f64>)> = candidates
        .iter()
        .filter_map(|(label, col, color)| {
            rows.numeric_column(col).map(|v| (*label, *color, v))
        })
        .collect();
    let range = value_range(
        series
            .iter()
            .flat_map(|(_, _, v)| v.iter().copied())
            .chain([0.]),
    );
    let mut plot = Plot::new("Exchange Fluxes by Condition", labels.len(), range)
        .axes(labels, None, "Flux (mmol/gDW/hr)")
        .hline(0., palette::BASELINE, false);
    for (_, color, values) in &series {
        plot = plot.line(values, color);
    }
    let entries: Vec<(&str, &str)> = series.iter().map(|(l, c, _)| (*l, *c)).collect();
    plot.legend(&entries).finish()
}

/// Pathway columns worth drawing, those not entirely zero and not entirely NaN
pub fn informative_pathways(rows: &Table) -> Vec<(String, Vec<f64>)> {
    rows.columns()
        .iter()
        .filter(|c| c.starts_with(PATHWAY_PREFIX))
        .filter_map(|c| {
            let values = rows.numeric_column(c)?;
            let all_zero = values.iter().all(|v| *v == 0.);
            let all_nan = values.iter().all(|v| v.is_nan());
            if all_zero || all_nan {
                None
            } else {
                Some((c.trim_start_matches(PATHWAY_PREFIX).to_string(), values))
            }
        })
        .collect()
}

fn pathway_heatmap(rows: &Table, labels: &[String]) -> Option<Document> {
    let columns = informative_pathways(rows);
    if columns.is_empty() || labels.is_empty() {
        return None;
    }
    let cell_w = 60.;
    let cell_h = 40.;
    let left = 110.;
    let top = 50.;
    let grid_w = cell_w * columns.len() as f64;
    let grid_h = cell_h * labels.len() as f64;
    let width = (left + grid_w + 40.).max(WIDTH);
    let height = top + grid_h + 90.;

    let finite = columns.iter().flat_map(|(_, v)| v.iter().copied()).filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    let mut doc = Document::new()
        .set("viewBox", (0, 0, width, height))
        .set("width", width)
        .set("height", height)
        .set("style", "background:#ffffff");
    doc = doc.add(title_text("Pathway Fluxes by Condition", width / 2.));

    for (row, label) in labels.iter().enumerate() {
        let y = top + row as f64 * cell_h;
        doc = doc.add(
            Text::new(label.clone())
                .set("x", left - 8.)
                .set("y", y + cell_h / 2.)
                .set("text-anchor", "end")
                .set("dominant-baseline", "middle")
                .set("font-family", FONT)
                .set("font-size", 11),
        );
        for (col, (_, values)) in columns.iter().enumerate() {
            let x = left + col as f64 * cell_w;
            let v = values.get(row).copied().unwrap_or(f64::NAN);
            let fill = if v.is_finite() {
                heat_color(if hi > lo { (v - lo) / (hi - lo) } else { 0.5 })
            } else {
                palette::MISSING.to_string()
            };
            doc = doc.add(
                Rectangle::new()
                    .set("x", x)
                    .set("y", y)
                    .set("width", cell_w)
                    .set("height", cell_h)
                    .set("fill", fill)
                    .set("stroke", "#ffffff"),
            );
            if v.is_finite() && v != 0. {
                let ink = if v > hi * 0.6 { "#ffffff" } else { "#000000" };
                doc = doc.add(
                    Text::new(format!("{v:.1}"))
                        .set("x", x + cell_w / 2.)
                        .set("y", y + cell_h / 2.)
                        .set("text-anchor", "middle")
                        .set("dominant-baseline", "middle")
                        .set("font-family", FONT)
                        .set("font-size", 9)
                        .set("fill", ink),
                );
            }
        }
    }
    for (col, (name, _)) in columns.iter().enumerate() {
        let x = left + (col as f64 + 0.5) * cell_w;
        let y = top + grid_h + 12.;
        doc = doc.add(
            Text::new(name.clone())
                .set("x", x)
                .set("y", y)
                .set("text-anchor", "end")
                .set("transform", format!("rotate(-45 {x} {y})"))
                .set("font-family", FONT)
                .set("font-size", 11),
        );
    }
    Some(doc)
}
// endregion Figures

// region Drawing
/// Reversed red-yellow-blue ramp, `t` in [0, 1]
fn heat_color(t: f64) -> String {
    const STOPS: [(f64, [f64; 3]); 5] = [
        (0., [49., 54., 149.]),
        (0.25, [116., 173., 209.]),
        (0.5, [255., 255., 191.]),
        (0.75, [244., 109., 67.]),
        (1., [165., 0., 38.]),
    ];
    let t = t.clamp(0., 1.);
    let upper = STOPS.iter().position(|(s, _)| *s >= t).unwrap_or(STOPS.len() - 1).max(1);
    let (s0, c0) = STOPS[upper - 1];
    let (s1, c1) = STOPS[upper];
    let f = (t - s0) / (s1 - s0);
    let channel = |i: usize| (c0[i] + (c1[i] - c0[i]) * f).round() as u8;
    format!("#{:02x}{:02x}{:02x}", channel(0), channel(1), channel(2))
}

/// Y range covering all finite values with a little headroom
fn value_range<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return (0., 1.);
    }
    let span = if hi > lo { hi - lo } else { 1. };
    let pad = span * 0.1;
    let lo = if lo < 0. { lo - pad } else { lo };
    (lo, hi + pad)
}

fn title_text(title: &str, x: f64) -> Text {
    Text::new(title.to_string())
        .set("x", x)
        .set("y", 28)
        .set("text-anchor", "middle")
        .set("font-family", FONT)
        .set("font-size", 16)
        .set("fill", palette::AXIS)
}

/// A categorical chart, one x slot per condition
struct Plot {
    doc: Document,
    n: usize,
    y_min: f64,
    y_max: f64,
}

impl Plot {
    fn new(title: &str, n: usize, (y_min, y_max): (f64, f64)) -> Self {
        let doc = Document::new()
            .set("viewBox", (0, 0, WIDTH, HEIGHT))
            .set("width", WIDTH)
            .set("height", HEIGHT)
            .set("style", "background:#ffffff")
            .add(title_text(
                title,
                MARGIN_LEFT + (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / 2.,
            ));
        Plot {
            doc,
            n: n.max(1),
            y_min,
            y_max,
        }
    }

    fn push<N: Into<Box<dyn Node>>>(&mut self, node: N) {
        let doc = std::mem::replace(&mut self.doc, Document::new());
        self.doc = doc.add(node);
    }

    fn plot_width(&self) -> f64 {
        WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height(&self) -> f64 {
        HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn slot(&self) -> f64 {
        self.plot_width() / self.n as f64
    }

    fn x(&self, i: usize) -> f64 {
        MARGIN_LEFT + (i as f64 + 0.5) * self.slot()
    }

    fn y(&self, v: f64) -> f64 {
        let t = (v - self.y_min) / (self.y_max - self.y_min);
        MARGIN_TOP + self.plot_height() * (1. - t)
    }

    fn axes(mut self, labels: &[String], x_label: Option<&str>, y_label: &str) -> Self {
        let bottom = MARGIN_TOP + self.plot_height();
        let ticks = 5;
        for k in 0..=ticks {
            let v = self.y_min + (self.y_max - self.y_min) * k as f64 / ticks as f64;
            let y = self.y(v);
            self.push(
                Line::new()
                    .set("x1", MARGIN_LEFT)
                    .set("y1", y)
                    .set("x2", MARGIN_LEFT + self.plot_width())
                    .set("y2", y)
                    .set("stroke", palette::GRID)
                    .set("stroke-width", 0.8),
            );
            self.push(
                Text::new(format!("{v:.1}"))
                    .set("x", MARGIN_LEFT - 6.)
                    .set("y", y)
                    .set("text-anchor", "end")
                    .set("dominant-baseline", "middle")
                    .set("font-family", FONT)
                    .set("font-size", 10),
            );
        }
        self.push(
            Line::new()
                .set("x1", MARGIN_LEFT)
                .set("y1", MARGIN_TOP)
                .set("x2", MARGIN_LEFT)
                .set("y2", bottom)
                .set("stroke", palette::AXIS),
        );
        self.push(
            Line::new()
                .set("x1", MARGIN_LEFT)
                .set("y1", bottom)
                .set("x2", MARGIN_LEFT + self.plot_width())
                .set("y2", bottom)
                .set("stroke", palette::AXIS),
        );
        for (i, label) in labels.iter().enumerate() {
            let x = self.x(i);
            self.push(
                Text::new(label.clone())
                    .set("x", x)
                    .set("y", bottom + 18.)
                    .set("text-anchor", "middle")
                    .set("font-family", FONT)
                    .set("font-size", 11),
            );
        }
        if let Some(x_label) = x_label {
            self.push(
                Text::new(x_label.to_string())
                    .set("x", MARGIN_LEFT + self.plot_width() / 2.)
                    .set("y", bottom + 45.)
                    .set("text-anchor", "middle")
                    .set("font-family", FONT)
                    .set("font-size", 12),
            );
        }
        let (yx, yy) = (24., MARGIN_TOP + self.plot_height() / 2.);
        self.push(
            Text::new(y_label.to_string())
                .set("x", yx)
                .set("y", yy)
                .set("text-anchor", "middle")
                .set("transform", format!("rotate(-90 {yx} {yy})"))
                .set("font-family", FONT)
                .set("font-size", 12),
        );
        self
    }

    /// Horizontal reference line across the plot
    fn hline(mut self, v: f64, color: &str, dashed: bool) -> Self {
        if !v.is_finite() {
            return self;
        }
        let y = self.y(v);
        let mut line = Line::new()
            .set("x1", MARGIN_LEFT)
            .set("y1", y)
            .set("x2", MARGIN_LEFT + self.plot_width())
            .set("y2", y)
            .set("stroke", color)
            .set("stroke-width", 1.5);
        if dashed {
            line = line.set("stroke-dasharray", "6,4");
        }
        self.push(line);
        self
    }

    /// Bars from `bottoms[i]` to `bottoms[i] + values[i]`, NaN values are left out
    fn bars(mut self, values: &[f64], bottoms: &[f64], color: &str) -> Self {
        let width = self.slot() * BAR_WIDTH;
        for (i, (v, b)) in values.iter().zip(bottoms).enumerate() {
            if !v.is_finite() || !b.is_finite() {
                continue;
            }
            let (y0, y1) = (self.y(*b), self.y(b + v));
            self.push(
                Rectangle::new()
                    .set("x", self.x(i) - width / 2.)
                    .set("y", y0.min(y1))
                    .set("width", width)
                    .set("height", (y1 - y0).abs())
                    .set("fill", color),
            );
        }
        self
    }

    /// Line with markers, broken at NaN values
    fn line(mut self, values: &[f64], color: &str) -> Self {
        let mut segments: Vec<Vec<(f64, f64)>> = vec![Vec::new()];
        for (i, v) in values.iter().enumerate() {
            if v.is_finite() {
                let point = (self.x(i), self.y(*v));
                if let Some(current) = segments.last_mut() {
                    current.push(point);
                }
            } else {
                segments.push(Vec::new());
            }
        }
        for segment in segments.iter().filter(|s| !s.is_empty()) {
            let points: Vec<String> = segment.iter().map(|(x, y)| format!("{x},{y}")).collect();
            self.push(
                Polyline::new()
                    .set("points", points.join(" "))
                    .set("fill", "none")
                    .set("stroke", color)
                    .set("stroke-width", 2),
            );
            for (x, y) in segment {
                self.push(
                    Circle::new()
                        .set("cx", *x)
                        .set("cy", *y)
                        .set("r", 4)
                        .set("fill", color),
                );
            }
        }
        self
    }

    /// Bold label just outside the end of a bar
    fn value_label(mut self, i: usize, v: f64, text: &str) -> Self {
        if !v.is_finite() {
            return self;
        }
        let y = if v >= 0. { self.y(v) - 5. } else { self.y(v) + 14. };
        self.push(
            Text::new(text.to_string())
                .set("x", self.x(i))
                .set("y", y)
                .set("text-anchor", "middle")
                .set("font-family", FONT)
                .set("font-size", 10)
                .set("font-weight", "bold"),
        );
        self
    }

    fn legend(mut self, entries: &[(&str, &str)]) -> Self {
        let x = WIDTH - MARGIN_RIGHT + 15.;
        for (k, (label, color)) in entries.iter().enumerate() {
            let y = MARGIN_TOP + 10. + k as f64 * 20.;
            self.push(
                Rectangle::new()
                    .set("x", x)
                    .set("y", y - 6.)
                    .set("width", 12)
                    .set("height", 12)
                    .set("fill", *color),
            );
            self.push(
                Text::new(label.to_string())
                    .set("x", x + 18.)
                    .set("y", y)
                    .set("dominant-baseline", "middle")
                    .set("font-family", FONT)
                    .set("font-size", 11),
            );
        }
        self
    }

    fn finish(self) -> Document {
        self.doc
    }
}
// endregion Drawing
