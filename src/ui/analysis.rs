use eframe::egui::{self, Color32, RichText, Ui};

use crate::chart::{min_max_scale, ChartKind};
use crate::color::heat_color;
use crate::data::aggregate::AggregationMethod;
use crate::state::AppState;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Performance Analysis page
// ---------------------------------------------------------------------------

pub fn analysis_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Interactive Visualizations");
    let Some(session) = &state.session else {
        return;
    };
    let columns = session.dataset.analysis_columns();
    let colors = session.colors.clone();
    if columns.is_empty() {
        ui.label(RichText::new("No numeric metrics found").color(Color32::RED));
        return;
    }

    let before = state.controls.chart.clone();
    let req = &mut state.controls.chart;

    ui.horizontal(|ui: &mut Ui| {
        egui::ComboBox::from_label("Primary metric")
            .selected_text(req.primary.as_str())
            .show_ui(ui, |ui: &mut Ui| {
                for c in &columns {
                    ui.selectable_value(&mut req.primary, c.clone(), c.as_str());
                }
            });

        egui::ComboBox::from_label("Secondary metric")
            .selected_text(req.secondary.as_deref().unwrap_or("None"))
            .show_ui(ui, |ui: &mut Ui| {
                ui.selectable_value(&mut req.secondary, None, "None");
                for c in &columns {
                    ui.selectable_value(&mut req.secondary, Some(c.clone()), c.as_str());
                }
            });

        egui::ComboBox::from_label("Visualization type")
            .selected_text(req.kind.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for kind in ChartKind::ALL {
                    ui.selectable_value(&mut req.kind, kind, kind.to_string());
                }
            });
    });

    if req.kind.is_multi_metric() {
        metric_checkboxes(ui, "Metrics", &columns, &mut req.metrics);
    }

    if state.controls.chart != before {
        state.refresh();
    }

    if let Some(err) = &state.chart_error {
        ui.label(RichText::new(err).color(Color32::YELLOW));
    }
    let req = &state.controls.chart;
    let title = match req.kind {
        ChartKind::Bar => format!("{} Comparison", req.primary),
        ChartKind::Line => format!("{} Trend Over Time", req.primary),
        ChartKind::Scatter => format!(
            "{} vs {}",
            req.primary,
            req.secondary.as_deref().unwrap_or("?")
        ),
        ChartKind::Box | ChartKind::Violin => format!("Distribution of {}", req.primary),
        ChartKind::Radar => "Player Comparison Radar Chart".to_string(),
        ChartKind::Heatmap => "Player Performance Heatmap".to_string(),
        ChartKind::ParallelCoordinates => "Parallel Coordinates Analysis".to_string(),
        ChartKind::ScatterMatrix => "Scatter Matrix".to_string(),
    };
    if let Some(chart) = &state.chart {
        plot::chart(ui, "analysis_plot", &title, chart, &colors);
    }
}

// ---------------------------------------------------------------------------
// Advanced Comparisons page
// ---------------------------------------------------------------------------

pub fn comparison_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Comprehensive Player Comparison");
    let Some(session) = &state.session else {
        return;
    };
    let columns = session.dataset.analysis_columns();
    let colors = session.colors.clone();

    if state.visible_players() < 2 {
        ui.label(
            RichText::new("Please select at least 2 players for comparison").color(Color32::YELLOW),
        );
        return;
    }
    if columns.is_empty() {
        ui.label(RichText::new("No numeric metrics found for comparison").color(Color32::RED));
        return;
    }

    let before = (
        state.controls.comparison_metrics.clone(),
        state.controls.comparison_method,
        state.controls.comparison_chart,
    );

    egui::CollapsingHeader::new("⚙ Comparison Settings")
        .id_salt("comparison_settings")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            let controls = &mut state.controls;
            metric_checkboxes(ui, "Metrics to compare", &columns, &mut controls.comparison_metrics);
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Comparison method");
                for m in AggregationMethod::ALL {
                    ui.radio_value(&mut controls.comparison_method, m, m.to_string());
                }
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Chart");
                for kind in ChartKind::SUMMARY {
                    ui.selectable_value(&mut controls.comparison_chart, kind, kind.to_string());
                }
            });
        });

    let after = (
        state.controls.comparison_metrics.clone(),
        state.controls.comparison_method,
        state.controls.comparison_chart,
    );
    if after != before {
        state.refresh();
    }

    if let Some(err) = &state.comparison_error {
        ui.label(
            RichText::new(format!("Error generating comparison: {err}")).color(Color32::YELLOW),
        );
    }
    let Some(cmp) = &state.comparison else {
        return;
    };

    ui.strong("📊 Comparison Results");
    summary_grid(ui, &cmp.table);
    ui.add_space(8.0);
    let title = match state.controls.comparison_chart {
        ChartKind::ScatterMatrix => format!("Scatter Matrix of {} Values", cmp.table.method),
        _ => format!("{} by Player", cmp.table.method),
    };
    plot::chart(ui, "comparison_plot", &title, &cmp.chart, &colors);
}

fn summary_grid(ui: &mut Ui, table: &crate::data::aggregate::SummaryTable) {
    let scaled: Vec<Vec<Option<f64>>> = table
        .metrics
        .iter()
        .map(|m| min_max_scale(&table.column(m).unwrap_or_default()))
        .collect();

    egui::Grid::new("summary_table")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Player_Name");
            for m in &table.metrics {
                ui.strong(m.as_str());
            }
            ui.end_row();
            for (r, row) in table.rows.iter().enumerate() {
                ui.label(row.player.as_str());
                for (c, v) in row.values.iter().enumerate() {
                    let text = v.map_or_else(|| "–".to_string(), |v| format!("{v:.2}"));
                    let t = scaled[c][r].unwrap_or(0.0);
                    let fg = if t > 0.55 { Color32::WHITE } else { Color32::BLACK };
                    ui.label(RichText::new(text).color(fg).background_color(heat_color(t)));
                }
                ui.end_row();
            }
        });
}

/// Wrapped row of checkboxes editing an ordered metric selection.
fn metric_checkboxes(ui: &mut Ui, label: &str, columns: &[String], selected: &mut Vec<String>) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label(label);
        for c in columns {
            let mut on = selected.contains(c);
            if ui.checkbox(&mut on, c.as_str()).changed() {
                if on {
                    selected.push(c.clone());
                    // keep the dataset's column order
                    selected.sort_by_key(|s| columns.iter().position(|x| x == s));
                } else {
                    selected.retain(|s| s != c);
                }
            }
        }
    });
}
