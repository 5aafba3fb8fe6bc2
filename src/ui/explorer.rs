use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::Dataset;
use crate::data::stats::ColumnStats;

// ---------------------------------------------------------------------------
// Data Explorer page
// ---------------------------------------------------------------------------

pub fn explorer_page(ui: &mut Ui, filtered: &Dataset, full: &Dataset) {
    ui.heading("Dataset Overview");

    if !full.type_errors().is_empty() {
        egui::CollapsingHeader::new(format!(
            "⚠ {} unreadable cells",
            full.type_errors().len()
        ))
        .id_salt("type_errors")
        .show(ui, |ui: &mut Ui| {
            for e in full.type_errors().iter().take(200) {
                ui.label(e.to_string());
            }
        });
    }

    egui::CollapsingHeader::new("📋 Raw Data Preview")
        .id_salt("raw_rows")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            if filtered.is_empty() {
                ui.label(RichText::new("No data for the current filter").italics());
            } else {
                ui.push_id("raw_table", |ui: &mut Ui| raw_table(ui, filtered));
            }
        });

    egui::CollapsingHeader::new("📈 Dataset Statistics")
        .id_salt("stats")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.label("Summary statistics:");
            ui.push_id("stats_table", |ui: &mut Ui| stats_table(ui, filtered.stats()));
            ui.add_space(8.0);
            ui.label("Missing values:");
            egui::Grid::new("missing_values")
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    ui.strong("Column");
                    ui.strong("Missing Values");
                    ui.end_row();
                    for s in filtered.stats() {
                        ui.label(s.column.as_str());
                        ui.label(s.missing.to_string());
                        ui.end_row();
                    }
                });
        });
}

fn raw_table(ui: &mut Ui, dataset: &Dataset) {
    let columns = dataset.schema().columns();
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(400.0)
        .columns(Column::auto().at_least(60.0), columns.len())
        .header(20.0, |mut header| {
            for c in columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(c.as_str());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, dataset.len(), |mut row| {
                let record = &dataset.records()[row.index()];
                for c in columns {
                    row.col(|ui: &mut Ui| {
                        ui.label(record.value(c).to_string());
                    });
                }
            });
        });
}

fn stats_table(ui: &mut Ui, stats: &[ColumnStats]) {
    const HEADERS: [&str; 10] = [
        "column", "count", "missing", "mean", "std", "min", "25%", "50%", "75%", "max",
    ];
    let numeric: Vec<&ColumnStats> = stats.iter().filter(|s| s.is_numeric()).collect();
    let fmt = |v: Option<f64>| v.map_or_else(|| "–".to_string(), |v| format!("{v:.2}"));

    TableBuilder::new(ui)
        .striped(true)
        .columns(Column::auto().at_least(50.0), HEADERS.len())
        .header(20.0, |mut header| {
            for h in HEADERS {
                header.col(|ui: &mut Ui| {
                    ui.strong(h);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, numeric.len(), |mut row| {
                let s = numeric[row.index()];
                let cells = [
                    s.column.clone(),
                    s.count.to_string(),
                    s.missing.to_string(),
                    fmt(s.mean),
                    fmt(s.std),
                    fmt(s.min),
                    fmt(s.q1),
                    fmt(s.median),
                    fmt(s.q3),
                    fmt(s.max),
                ];
                for cell in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}
