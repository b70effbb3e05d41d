//! Self-contained HTML reports with embedded
//! [Plotly.js](https://plotly.com/javascript/) charts.
//!
//! | Report | Contents |
//! |---|---|
//! | Run | Summary table, parameter vector, best point |
//! | Sweep | Objective per configuration with best-so-far line, parallel coordinates over the swept hyper-parameters, best configuration table |
//!
//! An internet connection is needed on first load to fetch `Plotly.js`
//! from a CDN.

use core::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::{Report, ReportError, ReportSink};
use crate::parameter::ParameterDescriptor;
use crate::types::{AlgorithmResult, RunResult, SweepTrial};

/// Writes each report to `{dir}/{destination}.html`.
///
/// The directory is created on first use.
///
/// # Examples
///
/// ```no_run
/// use optimizer_engine::report::HtmlReportSink;
/// use optimizer_engine::{Engine, builtin};
///
/// let engine = Engine::builder()
///     .store(builtin::store())
///     .report_sink(HtmlReportSink::new("reports"))
///     .build();
/// # let _ = engine;
/// ```
#[derive(Clone, Debug)]
pub struct HtmlReportSink {
    dir: PathBuf,
}

impl HtmlReportSink {
    /// Creates a sink writing into `dir`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// The file a report with this destination name is written to.
    #[must_use]
    pub fn path_for(&self, destination: &str) -> PathBuf {
        let file: String = destination
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        self.dir.join(format!("{file}.html"))
    }
}

impl ReportSink for HtmlReportSink {
    fn render(&self, report: &Report<'_>, destination: &str) -> Result<(), ReportError> {
        let html = match *report {
            Report::Run {
                algorithm,
                fitness_function,
                parameters,
                result,
            } => build_run_html(algorithm, fitness_function, parameters, result),
            Report::Sweep {
                fitness_function,
                result,
                trials,
                descriptors,
            } => build_sweep_html(fitness_function, result, trials, descriptors),
        };
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(destination), html)?;
        Ok(())
    }
}

/// `subtitle` is inserted as-is and must already be escaped.
fn write_head(html: &mut String, title: &str, subtitle: &str) {
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
<style>
  * {{ margin: 0; padding: 0; box-sizing: border-box; }}
  body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
         background: #f5f6fa; color: #2c3e50; padding: 24px; }}
  h1 {{ text-align: center; margin-bottom: 8px; font-size: 1.8em; }}
  .subtitle {{ text-align: center; color: #7f8c8d; margin-bottom: 24px; }}
  .chart {{ background: #fff; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.08);
            margin-bottom: 24px; padding: 16px; }}
  .chart-title {{ font-size: 1.1em; font-weight: 600; margin-bottom: 8px; }}
  table {{ border-collapse: collapse; width: 100%; }}
  td, th {{ text-align: left; padding: 4px 8px; border-bottom: 1px solid #ecf0f1; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p class="subtitle">{subtitle}</p>
"#,
        title = escape_html(title),
    );
}

fn write_table(html: &mut String, title: &str, rows: &[(String, String)]) {
    let _ = writeln!(
        html,
        "<div class=\"chart\"><div class=\"chart-title\">{}</div><table>",
        escape_html(title)
    );
    for (key, value) in rows {
        let _ = writeln!(
            html,
            "<tr><th>{}</th><td>{}</td></tr>",
            escape_html(key),
            escape_html(value)
        );
    }
    html.push_str("</table></div>\n");
}

fn point_rows(point: &[f64]) -> Vec<(String, String)> {
    point
        .iter()
        .enumerate()
        .map(|(i, v)| (format!("x[{i}]"), v.to_string()))
        .collect()
}

fn build_run_html(
    algorithm: &str,
    fitness_function: &str,
    parameters: &[f64],
    result: &RunResult,
) -> String {
    let mut html = String::with_capacity(4096);
    write_head(
        &mut html,
        "Run Report",
        &format!(
            "{} on {}",
            escape_html(algorithm),
            escape_html(fitness_function)
        ),
    );

    write_table(
        &mut html,
        "Summary",
        &[
            ("Best value".to_owned(), result.best_value.to_string()),
            (
                "Evaluations".to_owned(),
                result.evaluation_count.to_string(),
            ),
            ("Parameters".to_owned(), format!("{parameters:?}")),
        ],
    );
    write_table(&mut html, "Best Point", &point_rows(&result.best_point));

    html.push_str("</body>\n</html>\n");
    html
}

fn build_sweep_html(
    fitness_function: &str,
    result: &AlgorithmResult,
    trials: &[SweepTrial],
    descriptors: &[ParameterDescriptor],
) -> String {
    let mut html = String::with_capacity(8192);
    write_head(
        &mut html,
        "Parameter Sweep Report",
        &format!(
            "{} on {} &middot; {} configurations",
            escape_html(&result.algorithm_name),
            escape_html(fitness_function),
            result.configurations_run
        ),
    );

    let mut summary = vec![("Best value".to_owned(), result.best_value.to_string())];
    for (i, value) in result.best_configuration.iter().enumerate() {
        summary.push((label(descriptors, i), value.to_string()));
    }
    write_table(&mut html, "Best Configuration", &summary);
    write_table(&mut html, "Best Point", &point_rows(&result.best_point));

    html.push_str("<div class=\"chart\"><div class=\"chart-title\">Sweep History</div>");
    html.push_str("<div id=\"history\"></div></div>\n");
    write_history_chart(&mut html, trials);

    if !descriptors.is_empty() && !trials.is_empty() {
        html.push_str("<div class=\"chart\"><div class=\"chart-title\">Parallel Coordinates</div>");
        html.push_str("<div id=\"parcoords\"></div></div>\n");
        write_parallel_coordinates(&mut html, trials, descriptors);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn label(descriptors: &[ParameterDescriptor], i: usize) -> String {
    descriptors
        .get(i)
        .map_or_else(|| format!("p{i}"), |d| d.name.clone())
}

// ---------------------------------------------------------------------------
// Chart generators
// ---------------------------------------------------------------------------

fn write_history_chart(html: &mut String, trials: &[SweepTrial]) {
    if trials.is_empty() {
        return;
    }

    let mut ids = Vec::with_capacity(trials.len());
    let mut vals = Vec::with_capacity(trials.len());
    let mut best_vals = Vec::with_capacity(trials.len());
    let mut best = f64::INFINITY;
    for t in trials {
        ids.push(t.index);
        vals.push(js_number(t.result.best_value));
        if t.result.best_value < best {
            best = t.result.best_value;
        }
        best_vals.push(js_number(best));
    }

    let _ = write!(
        html,
        r##"<script>
Plotly.newPlot("history", [
  {{ x: {ids:?}, y: [{vals}], mode: "markers", name: "Objective", type: "scatter",
     marker: {{ color: "#3498db", size: 6 }} }},
  {{ x: {ids:?}, y: [{best_vals}], mode: "lines", name: "Best so far", type: "scatter",
     line: {{ color: "#e74c3c", width: 2 }} }}
], {{ xaxis: {{ title: "Configuration" }}, yaxis: {{ title: "Objective Value" }},
     margin: {{ t: 10 }}, legend: {{ x: 1, xanchor: "right", y: 1 }} }},
   {{ responsive: true }});
</script>
"##,
        vals = vals.join(","),
        best_vals = best_vals.join(","),
    );
}

fn write_parallel_coordinates(
    html: &mut String,
    trials: &[SweepTrial],
    descriptors: &[ParameterDescriptor],
) {
    let mut dimensions = String::new();

    let obj_vals: Vec<f64> = trials.iter().map(|t| t.result.best_value).collect();
    let obj_js: Vec<String> = obj_vals.iter().copied().map(js_number).collect();
    let _ = write!(
        dimensions,
        r#"{{ label: "Objective", values: [{}] }},"#,
        obj_js.join(","),
    );

    for (i, descriptor) in descriptors.iter().enumerate() {
        let vals: Vec<String> = trials
            .iter()
            .map(|t| js_number(t.configuration.get(i).copied().unwrap_or(f64::NAN)))
            .collect();
        let _ = write!(
            dimensions,
            r#"{{ label: "{label}", range: [{lo}, {hi}], values: [{vals}] }},"#,
            label = escape_js(&descriptor.name),
            lo = js_number(descriptor.lower_boundary),
            hi = js_number(descriptor.upper_boundary),
            vals = vals.join(","),
        );
    }

    // Green = low objective, red = high.
    let (cmin, cmax) = min_max(&obj_vals);
    let _ = write!(
        html,
        r##"<script>
Plotly.newPlot("parcoords", [{{
  type: "parcoords",
  line: {{ color: [{colors}], colorscale: [[0,"#2ecc71"],[1,"#e74c3c"]],
           cmin: {cmin}, cmax: {cmax}, showscale: true }},
  dimensions: [{dimensions}]
}}], {{ margin: {{ t: 10 }} }}, {{ responsive: true }});
</script>
"##,
        colors = obj_js.join(","),
    );
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Formats a float as a JavaScript literal. Non-finite values become `null`.
fn js_number(v: f64) -> String {
    if v.is_finite() {
        format!("{v:?}")
    } else {
        "null".to_owned()
    }
}

fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn min_max(vals: &[f64]) -> (f64, f64) {
    let (mn, mx) = vals
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(mn, mx), &v| {
            (mn.min(v), mx.max(v))
        });
    if mn > mx { (0.0, 1.0) } else { (mn, mx) }
}
