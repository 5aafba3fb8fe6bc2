use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Filter Options");
    ui.separator();

    let Some(session) = &state.session else {
        ui.label("No dataset loaded.");
        return;
    };
    let dataset = session.dataset.clone();
    let colors = session.colors.clone();
    let before = state.controls.filter.clone();

    // ---- Year range ----
    if let Some((min_year, max_year)) = dataset.year_range() {
        ui.strong("Year range");
        let filter = &mut state.controls.filter;
        filter.year_min = filter.year_min.clamp(min_year, max_year);
        filter.year_max = filter.year_max.clamp(min_year, max_year);
        ui.add(egui::Slider::new(&mut filter.year_min, min_year..=max_year).text("from"));
        ui.add(egui::Slider::new(&mut filter.year_max, min_year..=max_year).text("to"));
        if filter.year_min > filter.year_max {
            std::mem::swap(&mut filter.year_min, &mut filter.year_max);
        }
    }
    ui.separator();

    // ---- Players ----
    let cap = state.config.max_selected_players;
    let n_selected = state.controls.filter.players.len();
    ui.horizontal(|ui: &mut Ui| {
        ui.strong(format!("Players ({n_selected}/{cap})"));
        if ui.small_button("Clear").clicked() {
            state.controls.filter.players.clear();
        }
    });
    if n_selected == 0 {
        ui.label(RichText::new("No selection: showing all players").weak());
    }

    ScrollArea::vertical()
        .id_salt("players")
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (i, player) in dataset.players().iter().enumerate() {
                let mut checked = state.controls.filter.players.contains(player);
                let text = RichText::new(player).color(colors.color_for(player, i));
                if ui.checkbox(&mut checked, text).changed() && !state.toggle_player(player) {
                    state.status_message = Some(format!("Select at most {cap} players"));
                }
            }
        });

    // One recomputation per interaction.
    if state.controls.filter != before {
        state.refresh();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for page in Page::ALL {
            ui.selectable_value(&mut state.page, page, page.label());
        }

        ui.separator();

        if let (Some(session), Some(filtered)) = (&state.session, &state.filtered) {
            ui.label(format!(
                "{}: {} rows loaded, {} visible",
                session.source,
                session.dataset.len(),
                filtered.len()
            ));
        } else {
            ui.label("Open or drop a CSV file to begin");
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open player statistics")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
