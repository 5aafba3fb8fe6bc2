/// egui widgets: filter side panel, page bodies and chart rendering.
pub mod analysis;
pub mod explorer;
pub mod panels;
pub mod plot;
