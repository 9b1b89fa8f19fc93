use eframe::egui;

pub(super) fn draw_help_window(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("Help & Commands")
        .open(open)
        .resizable(true)
        .default_width(520.0)
        .default_height(440.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Keyboard Shortcuts");
                ui.separator();

                ui.label("General");
                help_row(ui, "⌘⇧P", "Open command palette");
                help_row(ui, "⌘S", "Save graph (JSON)");
                help_row(ui, "⌘O", "Open graph");
                help_row(ui, "⌘R", "Reload graph from disk");
                help_row(ui, "⌘Z", "Undo");
                help_row(ui, "⌘⇧Z / ⌘Y", "Redo");
                help_row(ui, "F1", "Toggle this window");
                help_row(ui, "Escape", "Clear selection");

                ui.add_space(10.0);
                ui.label("Nodes");
                help_row(ui, "N", "Add node at pointer");
                help_row(ui, "Double-click", "Add node");
                help_row(ui, "Shift + click", "Extend selection");
                help_row(ui, "Drag on empty canvas", "Box select");
                help_row(ui, "Delete / Backspace", "Delete selected nodes");

                ui.add_space(10.0);
                ui.label("Groups");
                help_row(ui, "⌘G", "Group selected nodes");
                help_row(ui, "⌘⇧G", "Ungroup selected group");
                help_row(ui, "Drag header", "Move group with its members");
                help_row(ui, "Drag corner", "Resize selected group");
                help_row(ui, "Drop node on group", "Add it to the group");
                help_row(ui, "Drag node out", "Remove it from the group");

                ui.add_space(10.0);
                ui.label("View");
                help_row(ui, "Scroll wheel", "Zoom in/out");
                help_row(ui, "Middle drag", "Pan canvas");

                ui.add_space(20.0);
                ui.heading("Group Panel");
                ui.separator();
                ui.label("Select a group by clicking its header to edit it in the side panel.");
                ui.label("Title edits apply when the field loses focus; Escape reverts the draft.");
                ui.label("Every membership, title or color change is a single undo step.");

                ui.add_space(20.0);
                ui.heading("Settings");
                ui.separator();
                ui.label("Settings are read from ~/.config/nodegroup.toml or ./settings.toml:");
                ui.add_space(5.0);
                ui.code(
                    r#"file_path = "graph.json"
snap_to_grid = true
grid_size = 16.0
default_group_title = "New Group"
default_group_color = { r = 60, g = 60, b = 70, a = 160 }"#,
                );
                ui.add_space(5.0);
                ui.label("Set RUST_LOG=debug to trace membership changes.");
            });
        });
}

fn help_row(ui: &mut egui::Ui, shortcut: &str, description: &str) {
    ui.horizontal(|ui| {
        ui.add_sized(
            [150.0, 16.0],
            egui::Label::new(egui::RichText::new(shortcut).monospace().strong()),
        );
        ui.label(description);
    });
}
