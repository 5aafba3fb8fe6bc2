use eframe::egui::{self, RichText, Ui};

use crate::config::AppConfig;
use crate::state::{AppState, Page};
use crate::ui::{analysis, explorer, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CricketDashApp {
    pub state: AppState,
}

impl CricketDashApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }

    /// Files dropped onto the window replace the current dataset.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(path) = &file.path {
                self.state.load_path(path);
            } else if let Some(bytes) = &file.bytes {
                self.state.load_bytes(bytes, &file.name);
            }
        }
    }
}

impl eframe::App for CricketDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        // ---- Top panel: menu bar + page tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let state = &mut self.state;
            let (Some(session), Some(filtered)) = (&state.session, &state.filtered) else {
                welcome(ui);
                return;
            };
            match state.page {
                Page::Explorer => {
                    let (full, filtered) = (session.dataset.clone(), filtered.clone());
                    egui::ScrollArea::vertical()
                        .id_salt("explorer")
                        .show(ui, |ui: &mut Ui| explorer::explorer_page(ui, &filtered, &full));
                }
                Page::Analysis => analysis::analysis_page(ui, state),
                Page::Comparison => analysis::comparison_page(ui, state),
            }
        });
    }
}

fn welcome(ui: &mut Ui) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(80.0);
        ui.heading("🏏 Advanced Cricket Analytics Dashboard");
        ui.label("Explore performance metrics with interactive visualizations.");
        ui.label(
            RichText::new("Open a file with Player_Name and Year columns, or drop it here.").weak(),
        );
    });
}
