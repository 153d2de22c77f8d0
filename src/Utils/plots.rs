use crate::asymptotic::config::PlotSettings;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::linspace;
use log::{info, warn};
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

pub const PLOT_CAPTION: &str = "Asymptotic Bounds Visualization";

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("series '{0}' has no finite point on the plot domain")]
    NoFinitePoints(String),
    #[error("drawing failed: {0}")]
    Drawing(String),
    #[error("cannot write samples: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// `f(n)`, `c_O*g(n)` and `c_Omega*g(n)` sampled on the plot grid.
///
/// Points where a series is not a finite number stay in the vectors as NaN and are
/// skipped when drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSamples {
    pub n: Vec<f64>,
    pub f: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    /// number of masked (non-finite) values over all three series
    pub masked: usize,
    /// legends of f, upper and lower
    pub labels: [String; 3],
}

// a witness that is not a finite number (oo, undefined) is drawn with factor 1
fn witness_factor(witness: &str) -> f64 {
    match witness.parse::<f64>() {
        Ok(c) if c.is_finite() => c,
        _ => 1.0,
    }
}

fn masked(values: Vec<f64>) -> Vec<f64> {
    values
        .into_iter()
        .map(|v| if v.is_finite() { v } else { f64::NAN })
        .collect()
}

/// Samples `f` and the two bounds of `g` on the grid given by `settings`.
pub fn sample_bounds(
    f: &Expr,
    g: &Expr,
    c_o: &str,
    c_omega: &str,
    settings: &PlotSettings,
) -> PlotSamples {
    let n = linspace(settings.start, settings.end, settings.points);
    let f_fn = f.lambdify1D();
    let g_fn = g.lambdify1D();
    let upper_factor = witness_factor(c_o);
    let lower_factor = witness_factor(c_omega);

    let f_values = masked(n.iter().map(|&x| f_fn(x)).collect());
    let g_values: Vec<f64> = n.iter().map(|&x| g_fn(x)).collect();
    let upper = masked(g_values.iter().map(|v| upper_factor * v).collect());
    let lower = masked(g_values.iter().map(|v| lower_factor * v).collect());
    let masked_count: usize = [&f_values, &upper, &lower]
        .iter()
        .map(|series| series.iter().filter(|v| v.is_nan()).count())
        .sum();
    if masked_count > 0 {
        warn!("{} sampled values are not finite and will not be drawn", masked_count);
    }

    PlotSamples {
        n,
        f: f_values,
        upper,
        lower,
        masked: masked_count,
        labels: [
            format!("f(n) = {}", f),
            format!("{} * g(n) (O)", upper_factor),
            format!("{} * g(n) (Ω)", lower_factor),
        ],
    }
}

fn finite_points(n: &[f64], values: &[f64]) -> Vec<(f64, f64)> {
    n.iter()
        .zip(values)
        .filter(|(_, y)| y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect()
}

fn drawing_error<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Drawing(e.to_string())
}

/// Draws the three curves into a PNG file.
pub fn plot_bounds(samples: &PlotSamples, filename: impl AsRef<Path>) -> Result<(), PlotError> {
    let series: Vec<(Vec<(f64, f64)>, &String, RGBColor)> = [
        (&samples.f, &samples.labels[0], BLUE),
        (&samples.upper, &samples.labels[1], RED),
        (&samples.lower, &samples.labels[2], GREEN),
    ]
    .into_iter()
    .map(|(values, label, color)| (finite_points(&samples.n, values), label, color))
    .collect();
    if let Some((_, label, _)) = series.iter().find(|(points, _, _)| points.is_empty()) {
        return Err(PlotError::NoFinitePoints(label.to_string()));
    }

    let ys = series.iter().flat_map(|(points, _, _)| points.iter().map(|p| p.1));
    let (y_min, y_max) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
        (lo.min(y), hi.max(y))
    });
    let margin = ((y_max - y_min) * 0.05).max(1e-9);
    let x_min = samples.n.first().copied().unwrap_or(0.0);
    let x_max = samples.n.last().copied().unwrap_or(1.0);

    let filename = filename.as_ref();
    let root_area = BitMapBackend::new(filename, (1000, 600)).into_drawing_area();
    root_area.fill(&WHITE).map_err(drawing_error)?;

    let mut chart = ChartBuilder::on(&root_area)
        .caption(PLOT_CAPTION, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, (y_min - margin)..(y_max + margin))
        .map_err(drawing_error)?;

    chart
        .configure_mesh()
        .x_desc("n")
        .y_desc("Function Value")
        .draw()
        .map_err(drawing_error)?;

    // f solid, the two bounds dashed
    for (i, (points, label, color)) in series.into_iter().enumerate() {
        let annotation = if i == 0 {
            chart.draw_series(LineSeries::new(points, color.stroke_width(2)))
        } else {
            chart.draw_series(DashedLineSeries::new(points, 8, 4, ShapeStyle::from(&color)))
        };
        annotation
            .map_err(drawing_error)?
            .label(label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(drawing_error)?;
    root_area.present().map_err(drawing_error)?;
    info!("bounds plotted into {}", filename.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn settings(points: usize) -> PlotSettings {
        PlotSettings {
            start: 1.0,
            end: 80.0,
            points,
        }
    }

    #[test]
    fn test_sample_bounds_scales_g_by_witnesses() {
        let f = Expr::parse_expression("3*n^2 + n").unwrap();
        let g = Expr::parse_expression("n^2").unwrap();
        let samples = sample_bounds(&f, &g, "3", "3", &settings(400));
        assert_eq!(samples.n.len(), 400);
        assert_eq!(samples.masked, 0);
        assert_relative_eq!(samples.n[399], 80.0, epsilon = 1e-9);
        assert_relative_eq!(samples.upper[399], 3.0 * 6400.0, epsilon = 1e-6);
        assert_relative_eq!(samples.f[0], 4.0);
        assert_eq!(samples.labels[1], "3 * g(n) (O)");
        assert_eq!(samples.labels[2], "3 * g(n) (Ω)");
    }

    #[test]
    fn test_non_numeric_witness_falls_back_to_one() {
        let f = Expr::parse_expression("2^n").unwrap();
        let g = Expr::parse_expression("n").unwrap();
        let samples = sample_bounds(&f, &g, "oo", "undefined", &settings(10));
        assert_eq!(samples.upper, samples.n);
        assert_eq!(samples.lower, samples.n);
        assert_eq!(samples.labels[1], "1 * g(n) (O)");
        assert_eq!(samples.labels[2], "1 * g(n) (Ω)");
    }

    #[test]
    fn test_legends_show_the_drawn_factor() {
        let f = Expr::parse_expression("n").unwrap();
        let g = Expr::parse_expression("n").unwrap();
        let samples = sample_bounds(&f, &g, "0.5", "oo", &settings(10));
        assert_eq!(samples.labels[1], "0.5 * g(n) (O)");
        assert_eq!(samples.labels[2], "1 * g(n) (Ω)");
        assert_relative_eq!(samples.upper[9], 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_points_are_masked() {
        let f = Expr::parse_expression("log(n - 10)").unwrap();
        let g = Expr::parse_expression("log(n)").unwrap();
        let samples = sample_bounds(&f, &g, "1", "1", &settings(80));
        assert!(samples.masked > 0);
        assert!(samples.f[0].is_nan());
        assert!(samples.f[79].is_finite());
    }

    #[test]
    fn test_plot_without_finite_points_fails() {
        let f = Expr::parse_expression("log(0 - n)").unwrap();
        let g = Expr::parse_expression("n").unwrap();
        let samples = sample_bounds(&f, &g, "1", "1", &settings(10));
        let dir = tempfile::tempdir().unwrap();
        let result = plot_bounds(&samples, dir.path().join("never.png"));
        assert!(matches!(result, Err(PlotError::NoFinitePoints(_))));
    }
}
