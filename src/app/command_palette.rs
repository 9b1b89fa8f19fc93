use eframe::egui;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::GraphApp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum CommandId {
    AddNode,
    GroupSelection,
    Ungroup,
    Delete,
    Undo,
    Redo,
    Save,
    SaveAs,
    Open,
    Reload,
    ToggleSnap,
    Help,
}

pub(super) struct CommandSpec {
    pub id: CommandId,
    pub name: &'static str,
    pub search: &'static str,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec { id: CommandId::AddNode, name: "Node: Add", search: "add new node create n" },
    CommandSpec { id: CommandId::GroupSelection, name: "Group: Group selection", search: "group selection nodes" },
    CommandSpec { id: CommandId::Ungroup, name: "Group: Ungroup", search: "ungroup dissolve" },
    CommandSpec { id: CommandId::Delete, name: "Edit: Delete", search: "delete remove" },
    CommandSpec { id: CommandId::Undo, name: "Edit: Undo", search: "undo" },
    CommandSpec { id: CommandId::Redo, name: "Edit: Redo", search: "redo" },
    CommandSpec { id: CommandId::Save, name: "File: Save", search: "save file json" },
    CommandSpec { id: CommandId::SaveAs, name: "File: Save as", search: "save as file json dialog" },
    CommandSpec { id: CommandId::Open, name: "File: Open", search: "open load file json" },
    CommandSpec { id: CommandId::Reload, name: "File: Reload", search: "reload revert file" },
    CommandSpec { id: CommandId::ToggleSnap, name: "Grid: Toggle snap", search: "grid snap toggle" },
    CommandSpec { id: CommandId::Help, name: "Help: Shortcuts", search: "help shortcuts keys" },
];

#[derive(Default)]
pub(super) struct CommandPalette {
    pub open: bool,
    pub query: String,
    pub selected: usize,
    request_focus: bool,
}

#[derive(Clone, Copy)]
pub(super) struct CommandContext {
    pub selected_len: usize,
    pub group_selected: bool,
    pub has_undo: bool,
    pub has_redo: bool,
}

impl CommandContext {
    pub(super) fn of(app: &GraphApp) -> Self {
        Self {
            selected_len: app.selected.len(),
            group_selected: app.selected_group.is_some(),
            has_undo: app.session.has_undo(),
            has_redo: app.session.has_redo(),
        }
    }
}

impl CommandPalette {
    pub fn open(&mut self, query: impl Into<String>) {
        self.open = true;
        self.query = query.into();
        self.selected = 0;
        self.request_focus = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.query.clear();
        self.selected = 0;
        self.request_focus = false;
    }

    fn is_enabled(cx: CommandContext, id: CommandId) -> bool {
        match id {
            CommandId::Undo => cx.has_undo,
            CommandId::Redo => cx.has_redo,
            CommandId::GroupSelection => cx.selected_len > 0,
            CommandId::Ungroup => cx.group_selected,
            CommandId::Delete => cx.selected_len > 0 || cx.group_selected,
            _ => true,
        }
    }

    pub(super) fn execute(app: &mut GraphApp, ctx: &egui::Context, id: CommandId) {
        match id {
            CommandId::AddNode => {
                let world = app.last_pointer_world.unwrap_or(egui::Pos2::ZERO);
                app.add_node_at(world);
            }
            CommandId::GroupSelection => app.group_selected(),
            CommandId::Ungroup => {
                if let Some(group) = app.selected_group {
                    app.ungroup(group);
                }
            }
            CommandId::Delete => app.delete_selected(),
            CommandId::Undo => app.undo(),
            CommandId::Redo => app.redo(),
            CommandId::Save => app.save_to_path(),
            CommandId::SaveAs => app.save_json_dialog(),
            CommandId::Open => app.open_json_dialog(),
            CommandId::Reload => app.load_from_path(),
            CommandId::ToggleSnap => {
                app.settings.snap_to_grid = !app.settings.snap_to_grid;
                app.persist_settings();
            }
            CommandId::Help => app.show_help = true,
        }
        ctx.request_repaint();
    }

    fn filtered(&self) -> Vec<(&'static CommandSpec, i64)> {
        let matcher = SkimMatcherV2::default();
        let q = self.query.trim();
        if q.is_empty() {
            return COMMANDS.iter().map(|c| (c, 0)).collect();
        }
        let mut out = Vec::new();
        for c in COMMANDS {
            if let Some(score) = matcher.fuzzy_match(c.search, q) {
                out.push((c, score));
            }
        }
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.name.cmp(b.0.name)));
        out
    }

    pub fn ui(&mut self, ctx: &egui::Context, cx: CommandContext) -> Option<CommandId> {
        if !self.open {
            return None;
        }
        let matches = self.filtered();
        if self.selected >= matches.len() {
            self.selected = matches.len().saturating_sub(1);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.close();
            return None;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowDown)) && !matches.is_empty() {
            self.selected = (self.selected + 1).min(matches.len() - 1);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowUp)) && !matches.is_empty() {
            self.selected = self.selected.saturating_sub(1);
        }
        let mut run_selected = ctx.input(|i| i.key_pressed(egui::Key::Enter));

        let screen = ctx.content_rect();
        let width = 480.0;
        let height = 280.0;
        let pos = egui::pos2(screen.center().x - width * 0.5, screen.top() + 48.0);
        egui::Area::new(egui::Id::new("command_palette"))
            .fixed_pos(pos)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                let frame = egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 240))
                    .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(90, 160, 255)))
                    .inner_margin(10.0)
                    .corner_radius(egui::CornerRadius::same(8));
                frame.show(ui, |ui| {
                    ui.set_min_size(egui::vec2(width, height));
                    let resp = ui.add(
                        egui::TextEdit::singleline(&mut self.query)
                            .desired_width(f32::INFINITY)
                            .hint_text("Search commands"),
                    );
                    if self.request_focus {
                        resp.request_focus();
                        self.request_focus = false;
                    }
                    ui.separator();
                    egui::ScrollArea::vertical().max_height(height - 64.0).show(ui, |ui| {
                        for (idx, (spec, _score)) in matches.iter().enumerate() {
                            let enabled = CommandPalette::is_enabled(cx, spec.id);
                            let resp = ui.add_enabled(
                                enabled,
                                egui::Button::new(spec.name).selected(idx == self.selected),
                            );
                            if resp.clicked() {
                                self.selected = idx;
                                run_selected = true;
                            }
                        }
                    });
                });
            });

        if run_selected
            && let Some((spec, _)) = matches.get(self.selected)
            && CommandPalette::is_enabled(cx, spec.id)
        {
            let cmd = spec.id;
            self.close();
            return Some(cmd);
        }
        None
    }
}
