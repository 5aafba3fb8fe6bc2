use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoint,
    PlotPoints, Points, Polygon, Text,
};

use crate::chart::{ChartData, Matrix, PairGrid, ScaledSeries, Series};
use crate::color::{heat_color, ColorMap};

// ---------------------------------------------------------------------------
// Chart rendering (central panel)
// ---------------------------------------------------------------------------

/// Draw shaped chart data. `id` keeps plots on different pages apart.
pub fn chart(ui: &mut Ui, id: &str, title: &str, data: &ChartData, colors: &ColorMap) {
    ui.heading(title);

    match data {
        ChartData::Empty => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label(RichText::new("No data for the current filter").italics());
            });
        }
        ChartData::Bars {
            y_label,
            categories,
            groups,
        } => {
            let width = 0.8 / groups.len().max(1) as f64;
            Plot::new(id)
                .legend(Legend::default())
                .y_axis_label(y_label.as_str())
                .x_axis_formatter(category_formatter(categories.clone()))
                .show(ui, |plot_ui| {
                    for (g, group) in groups.iter().enumerate() {
                        let offset = -0.4 + width * (g as f64 + 0.5);
                        let bars = group
                            .values
                            .iter()
                            .enumerate()
                            .filter_map(|(i, v)| {
                                Some(
                                    Bar::new(i as f64 + offset, (*v)?)
                                        .width(width * 0.95)
                                        .name(format!("{} {}", categories[i], group.name)),
                                )
                            })
                            .collect();
                        plot_ui.bar_chart(
                            BarChart::new(bars)
                                .name(&group.name)
                                .color(colors.color_for(&group.name, g)),
                        );
                    }
                });
        }
        ChartData::Lines {
            x_label,
            y_label,
            series,
        } => {
            Plot::new(id)
                .legend(Legend::default())
                .x_axis_label(x_label.as_str())
                .y_axis_label(y_label.as_str())
                .show(ui, |plot_ui| {
                    for (i, s) in series.iter().enumerate() {
                        let color = colors.color_for(&s.name, i);
                        plot_ui.line(
                            Line::new(PlotPoints::from(s.points.clone()))
                                .name(&s.name)
                                .color(color)
                                .width(2.0),
                        );
                        plot_ui.points(
                            Points::new(PlotPoints::from(s.points.clone()))
                                .name(&s.name)
                                .color(color)
                                .radius(3.5),
                        );
                    }
                });
        }
        ChartData::Points {
            x_label,
            y_label,
            size_label,
            series,
        } => {
            if let Some(size) = size_label {
                ui.label(RichText::new(format!("Marker size: {size}")).weak());
            }
            Plot::new(id)
                .legend(Legend::default())
                .x_axis_label(x_label.as_str())
                .y_axis_label(y_label.as_str())
                .show(ui, |plot_ui| {
                    for (i, s) in series.iter().enumerate() {
                        let color = colors.color_for(&s.name, i);
                        for (points, radius) in sized_markers(s) {
                            plot_ui.points(
                                Points::new(PlotPoints::from(points))
                                    .name(&s.name)
                                    .color(color)
                                    .radius(radius),
                            );
                        }
                    }
                });
        }
        ChartData::Radar { axes, series } => radar(ui, id, axes, series, colors),
        ChartData::Distributions {
            y_label,
            violin,
            groups,
        } => {
            let names: Vec<String> = groups.iter().map(|g| g.name.clone()).collect();
            Plot::new(id)
                .legend(Legend::default())
                .y_axis_label(y_label.as_str())
                .x_axis_formatter(category_formatter(names))
                .show(ui, |plot_ui| {
                    for (i, g) in groups.iter().enumerate() {
                        let color = colors.color_for(&g.name, i);
                        let x = i as f64;
                        if *violin {
                            let peak = g.density.iter().map(|p| p[1]).fold(0.0, f64::max);
                            if peak > 0.0 {
                                let half = |p: &[f64; 2]| 0.4 * p[1] / peak;
                                let mut outline: Vec<[f64; 2]> =
                                    g.density.iter().map(|p| [x - half(p), p[0]]).collect();
                                outline.extend(g.density.iter().rev().map(|p| [x + half(p), p[0]]));
                                plot_ui.polygon(
                                    Polygon::new(PlotPoints::from(outline))
                                        .name(&g.name)
                                        .fill_color(color.gamma_multiply(0.35))
                                        .stroke(Stroke::new(1.0, color)),
                                );
                            }
                        }
                        let s = g.spread;
                        let elem = BoxElem::new(
                            x,
                            BoxSpread::new(s.lower, s.q1, s.median, s.q3, s.upper),
                        )
                        .box_width(if *violin { 0.12 } else { 0.5 })
                        .name(&g.name);
                        plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&g.name).color(color));
                    }
                });
        }
        ChartData::Heatmap(matrix) => heatmap(ui, id, matrix),
        ChartData::ScatterMatrix(grid) => scatter_matrix(ui, id, grid, colors),
        ChartData::Parallel { axes, lines } => {
            Plot::new(id)
                .legend(Legend::default())
                .x_axis_formatter(category_formatter(axes.clone()))
                .y_axis_label("scaled value")
                .show(ui, |plot_ui| {
                    for (i, line) in lines.iter().enumerate() {
                        let color = colors.color_for(&line.name, i);
                        for segment in present_segments(&line.values) {
                            plot_ui.line(
                                Line::new(PlotPoints::from(segment))
                                    .name(&line.name)
                                    .color(color.gamma_multiply(0.8))
                                    .width(1.5),
                            );
                        }
                    }
                });
        }
    }
}

/// Label integer grid marks with category names, blank elsewhere.
fn category_formatter(
    labels: Vec<String>,
) -> impl Fn(GridMark, &std::ops::RangeInclusive<f64>) -> String + 'static {
    move |mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    }
}

/// Group a series' points by marker radius. Unsized series draw at 5px,
/// sized ones between 3px and 12px.
fn sized_markers(series: &Series) -> Vec<(Vec<[f64; 2]>, f32)> {
    if series.sizes.is_empty() {
        return vec![(series.points.clone(), 5.0)];
    }
    series
        .points
        .iter()
        .zip(&series.sizes)
        .map(|(p, t)| (vec![*p], 3.0 + 9.0 * *t as f32))
        .collect()
}

/// Split a polyline at missing values: `[x, y]` runs with x = axis index.
fn present_segments(values: &[Option<f64>]) -> Vec<Vec<[f64; 2]>> {
    let mut out = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(v) => current.push([i as f64, *v]),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn radar(ui: &mut Ui, id: &str, axes: &[String], series: &[ScaledSeries], colors: &ColorMap) {
    Plot::new(id)
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .include_x(-1.3)
        .include_x(1.3)
        .include_y(-1.2)
        .include_y(1.2)
        .show(ui, |plot_ui| {
            // spokes and outer ring
            let ring = ScaledSeries {
                name: String::new(),
                values: vec![Some(1.0); axes.len()],
            }
            .radar_polygon();
            plot_ui.line(Line::new(PlotPoints::from(ring.clone())).color(Color32::GRAY));
            for (p, axis) in ring.iter().zip(axes) {
                let spoke = PlotPoints::from(vec![[0.0, 0.0], *p]);
                plot_ui.line(Line::new(spoke).color(Color32::GRAY));
                plot_ui.text(Text::new(PlotPoint::new(p[0] * 1.12, p[1] * 1.12), axis.as_str()));
            }

            for (i, s) in series.iter().enumerate() {
                let color = colors.color_for(&s.name, i);
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(s.radar_polygon()))
                        .name(&s.name)
                        .fill_color(color.gamma_multiply(0.25))
                        .stroke(Stroke::new(2.0, color)),
                );
            }
        });
}

fn scatter_matrix(ui: &mut Ui, id: &str, grid: &PairGrid, colors: &ColorMap) {
    let n = grid.dimensions.len();
    if n == 0 {
        return;
    }
    let side = ((ui.available_width() - 60.0) / n as f32).clamp(90.0, 240.0);
    egui::Grid::new(format!("{id}_grid"))
        .spacing([4.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            for row in 0..n {
                for col in 0..n {
                    let mut plot = Plot::new(format!("{id}_{row}_{col}"))
                        .width(side)
                        .height(side)
                        .allow_drag(false)
                        .allow_zoom(false)
                        .allow_scroll(false);
                    if row + 1 == n {
                        plot = plot.x_axis_label(grid.dimensions[col].as_str());
                    }
                    if col == 0 {
                        plot = plot.y_axis_label(grid.dimensions[row].as_str());
                    }
                    if row == 0 && col + 1 == n {
                        plot = plot.legend(Legend::default());
                    }
                    plot.show(ui, |plot_ui| {
                        for (i, s) in grid.panel(row, col).iter().enumerate() {
                            plot_ui.points(
                                Points::new(PlotPoints::from(s.points.clone()))
                                    .name(&s.name)
                                    .color(colors.color_for(&s.name, i))
                                    .radius(4.0),
                            );
                        }
                    });
                }
                ui.end_row();
            }
        });
}

fn heatmap(ui: &mut Ui, id: &str, m: &Matrix) {
    // Rows are drawn top-down, so the first player sits at the highest y.
    let n_rows = m.rows.len();
    let row_labels: Vec<String> = m.rows.iter().rev().cloned().collect();
    Plot::new(id)
        .x_axis_formatter(category_formatter(m.columns.clone()))
        .y_axis_formatter(category_formatter(row_labels))
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (r, (values, scaled)) in m.values.iter().zip(&m.scaled).enumerate() {
                let y = (n_rows - 1 - r) as f64;
                for (c, (v, t)) in values.iter().zip(scaled).enumerate() {
                    let x = c as f64;
                    let fill = t.map_or(Color32::DARK_GRAY, heat_color);
                    let rect = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(rect))
                            .fill_color(fill)
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                    let label = v.map_or_else(|| "–".to_string(), |v| format!("{v:.2}"));
                    let text_color = if t.unwrap_or(0.0) > 0.55 {
                        Color32::WHITE
                    } else {
                        Color32::BLACK
                    };
                    plot_ui.text(Text::new(
                        PlotPoint::new(x, y),
                        RichText::new(label).color(text_color),
                    ));
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_break_at_missing_values() {
        let segs = present_segments(&[Some(0.1), None, Some(0.5), Some(0.9), None]);
        assert_eq!(segs, vec![vec![[0.0, 0.1]], vec![[2.0, 0.5], [3.0, 0.9]]]);
        assert!(present_segments(&[None, None]).is_empty());
    }

    #[test]
    fn marker_radius_follows_size() {
        let uniform = Series {
            name: "A".into(),
            points: vec![[1.0, 2.0], [3.0, 4.0]],
            sizes: Vec::new(),
        };
        assert_eq!(sized_markers(&uniform), vec![(uniform.points.clone(), 5.0)]);

        let sized = Series {
            sizes: vec![0.0, 1.0],
            ..uniform
        };
        assert_eq!(
            sized_markers(&sized),
            vec![(vec![[1.0, 2.0]], 3.0), (vec![[3.0, 4.0]], 12.0)]
        );
    }
}
