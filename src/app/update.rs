use crate::group::UndoRecorder;
use crate::model;
use eframe::egui;

use super::actions::MOVE_NODES;
use super::command_palette::{CommandContext, CommandPalette};
use super::render::{draw_background, draw_groups, draw_nodes, draw_select_box, group_inspector};
use super::{Drag, GraphApp};

impl eframe::App for GraphApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let wants_keyboard = ctx.wants_keyboard_input();
        ctx.input_mut(|i| {
            if !self.command_palette.open
                && i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::P)
            {
                self.command_palette.open("");
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::S) {
                self.save_to_path();
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::O) {
                self.open_json_dialog();
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::R) {
                self.load_from_path();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::F1) {
                self.show_help = !self.show_help;
            }
            let skip_shortcuts = wants_keyboard || self.command_palette.open;
            if !skip_shortcuts {
                if i.consume_key(
                    egui::Modifiers::COMMAND | egui::Modifiers::SHIFT,
                    egui::Key::Z,
                ) || i.consume_key(egui::Modifiers::COMMAND, egui::Key::Y)
                {
                    self.redo();
                } else if i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z) {
                    self.undo();
                }
                if i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::G) {
                    if let Some(group) = self.selected_group {
                        self.ungroup(group);
                    }
                } else if i.consume_key(egui::Modifiers::COMMAND, egui::Key::G) {
                    self.group_selected();
                }
                if i.consume_key(egui::Modifiers::NONE, egui::Key::Delete)
                    || i.consume_key(egui::Modifiers::NONE, egui::Key::Backspace)
                {
                    self.delete_selected();
                }
                if i.consume_key(egui::Modifiers::NONE, egui::Key::N) {
                    let world = self.last_pointer_world.unwrap_or(egui::Pos2::ZERO);
                    self.add_node_at(world);
                }
                if i.consume_key(egui::Modifiers::NONE, egui::Key::Escape) {
                    self.clear_selection();
                    self.drag = None;
                }
            }
        });

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open... (⌘O)").clicked() {
                        self.open_json_dialog();
                        ui.close_menu();
                    }
                    if ui.button("Save (⌘S)").clicked() {
                        self.save_to_path();
                        ui.close_menu();
                    }
                    if ui.button("Save as...").clicked() {
                        self.save_json_dialog();
                        ui.close_menu();
                    }
                    if ui.button("Reload (⌘R)").clicked() {
                        self.load_from_path();
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.small("Graph path:");
                    if ui.text_edit_singleline(&mut self.file_path).lost_focus() {
                        self.persist_settings();
                    }
                });
                ui.menu_button("Edit", |ui| {
                    let undo_text = match self.session.undo_label() {
                        Some(label) => format!("Undo {label} (⌘Z)"),
                        None => "Undo (⌘Z)".to_string(),
                    };
                    if ui
                        .add_enabled(self.session.has_undo(), egui::Button::new(undo_text))
                        .clicked()
                    {
                        self.undo();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(self.session.has_redo(), egui::Button::new("Redo (⌘⇧Z)"))
                        .clicked()
                    {
                        self.redo();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Add node (N)").clicked() {
                        let world = self.last_pointer_world.unwrap_or(egui::Pos2::ZERO);
                        self.add_node_at(world);
                        ui.close_menu();
                    }
                    if ui.button("Delete (⌫)").clicked() {
                        self.delete_selected();
                        ui.close_menu();
                    }
                });
                ui.menu_button("Group", |ui| {
                    if ui
                        .add_enabled(!self.selected.is_empty(), egui::Button::new("Group selection (⌘G)"))
                        .clicked()
                    {
                        self.group_selected();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(self.selected_group.is_some(), egui::Button::new("Ungroup (⌘⇧G)"))
                        .clicked()
                    {
                        if let Some(group) = self.selected_group {
                            self.ungroup(group);
                        }
                        ui.close_menu();
                    }
                });
                ui.menu_button("View", |ui| {
                    if ui.checkbox(&mut self.settings.snap_to_grid, "Snap to grid").changed() {
                        self.persist_settings();
                    }
                    if ui.button("Reset zoom").clicked() {
                        self.view = super::View::default();
                        ui.close_menu();
                    }
                    if ui.button("Help (F1)").clicked() {
                        self.show_help = true;
                        ui.close_menu();
                    }
                });
            });
        });

        egui::SidePanel::right("group_panel")
            .resizable(true)
            .min_width(200.0)
            .show(ctx, |ui| {
                ui.heading("Group");
                ui.separator();
                let Some(group) = self.selected_group else {
                    ui.label("Click a group header to edit it.");
                    return;
                };
                let Some(idx) = self.container_index(group) else {
                    return;
                };
                let (picked, title_committed) = group_inspector(ui, &mut self.containers[idx]);
                if title_committed {
                    self.commit_group_title(group);
                }
                if let Some(color) = picked {
                    self.set_group_color(group, color);
                }
                ui.separator();
                if ui.button("Ungroup").clicked() {
                    self.ungroup(group);
                }
            });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(status) = &self.status {
                    ui.label(status);
                } else {
                    ui.label("Ready");
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Zoom: {:.0}%", self.view.zoom * 100.0));
                    ui.separator();
                    ui.label(format!("Groups: {}", self.containers.len()));
                    ui.separator();
                    ui.label(format!("Nodes: {}", self.session.graph.nodes.len()));
                    ui.separator();
                    ui.label(format!("Selected: {}", self.selected.len()));
                    if self.session.dirty {
                        ui.separator();
                        ui.label("● Unsaved");
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let (rect, response) =
                ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
            let origin = rect.min;

            let scroll_delta = ctx.input(|i| i.raw_scroll_delta.y);
            if scroll_delta.abs() > 0.0
                && let Some(hover_pos) = ctx.input(|i| i.pointer.hover_pos())
                && rect.contains(hover_pos)
            {
                let zoom_delta = (1.0 + scroll_delta * 0.001).clamp(0.8, 1.25);
                self.view.zoom_about_screen_point(origin, hover_pos, zoom_delta);
            }
            if response.dragged_by(egui::PointerButton::Middle) {
                self.view.pan_screen += response.drag_delta();
            }

            let pointer_world = ctx
                .input(|i| i.pointer.interact_pos())
                .map(|p| self.view.screen_to_world(origin, p));
            self.last_pointer_world = pointer_world;

            if let Some(world) = pointer_world
                && self.resize_handle_at(world).is_some()
            {
                ctx.set_cursor_icon(egui::CursorIcon::ResizeNwSe);
            }

            if response.double_clicked()
                && let Some(world) = pointer_world
                && self.node_at(world).is_none()
                && self.group_header_at(world).is_none()
            {
                self.add_node_at(world);
            }

            let pressed = response.drag_started_by(egui::PointerButton::Primary)
                || response.clicked();
            let press_world = ctx
                .input(|i| i.pointer.press_origin())
                .map(|p| self.view.screen_to_world(origin, p));
            if pressed && let Some(world) = press_world {
                self.press(world, ctx.input(|i| i.modifiers.shift));
                if response.clicked() {
                    if let Some(Drag::SelectBox { .. }) = self.drag {
                        if let Some(group) = self.group_body_at(world) {
                            self.selected_group = Some(group);
                        }
                    }
                    self.drag = None;
                }
            }

            if response.dragged_by(egui::PointerButton::Primary)
                && let Some(world) = pointer_world
            {
                self.drag_to(world);
            }

            if response.drag_stopped() {
                match self.drag.take() {
                    Some(Drag::Nodes { .. }) if self.drag_recorded => self.finish_node_drag(),
                    Some(Drag::SelectBox { start, current }) => self.select_in_box(start, current),
                    _ => {}
                }
                self.drag_recorded = false;
            }

            let painter = ui.painter_at(rect);
            draw_background(&painter, rect, &self.view);
            draw_groups(&painter, origin, &self.view, &self.containers, self.selected_group);
            draw_nodes(&painter, origin, &self.view, &self.session.graph, &self.selected);
            if let Some(Drag::SelectBox { start, current }) = self.drag {
                draw_select_box(&painter, origin, &self.view, start, current);
            }
        });

        let cx = CommandContext::of(self);
        if let Some(cmd) = self.command_palette.ui(ctx, cx) {
            CommandPalette::execute(self, ctx, cmd);
        }

        super::help::draw_help_window(ctx, &mut self.show_help);
    }
}

impl GraphApp {
    /// Picks what a primary press grabs: resize handle, node, group
    /// header, then empty space for a selection box.
    fn press(&mut self, world: egui::Pos2, extend: bool) {
        self.drag_recorded = false;
        if let Some(group) = self.resize_handle_at(world)
            && let Some(idx) = self.container_index(group)
        {
            self.drag = Some(Drag::Resize {
                group,
                start_rect: self.containers[idx].rect(),
                start_world: world,
            });
        } else if let Some(id) = self.node_at(world) {
            if extend {
                if !self.selected.remove(&id) {
                    self.selected.insert(id);
                }
            } else if !self.selected.contains(&id) {
                self.selected.clear();
                self.selected.insert(id);
            }
            self.selected_group = None;
            self.drag = Some(Drag::Nodes { last_world: world });
        } else if let Some(group) = self.group_header_at(world) {
            self.selected.clear();
            self.selected_group = Some(group);
            self.drag = Some(Drag::Group {
                group,
                last_world: world,
            });
        } else {
            if !extend {
                self.clear_selection();
            }
            self.drag = Some(Drag::SelectBox {
                start: world,
                current: world,
            });
        }
    }

    fn drag_to(&mut self, world: egui::Pos2) {
        let Some(drag) = self.drag.clone() else {
            return;
        };
        match drag {
            Drag::Nodes { last_world } => {
                let delta = world - last_world;
                if delta != egui::Vec2::ZERO && !self.selected.is_empty() {
                    self.record_drag(MOVE_NODES);
                    self.translate_selected(delta);
                }
                self.drag = Some(Drag::Nodes { last_world: world });
            }
            Drag::Group { group, last_world } => {
                let delta = world - last_world;
                if delta != egui::Vec2::ZERO {
                    self.record_drag("Move Group");
                    self.move_group(group, delta);
                }
                self.drag = Some(Drag::Group {
                    group,
                    last_world: world,
                });
            }
            Drag::Resize {
                group,
                start_rect,
                start_world,
            } => {
                let delta = world - start_world;
                self.record_drag("Resize Group");
                self.resize_group(
                    group,
                    model::Rect {
                        width: start_rect.width + delta.x,
                        height: start_rect.height + delta.y,
                        ..start_rect
                    },
                );
            }
            Drag::SelectBox { start, .. } => {
                self.drag = Some(Drag::SelectBox {
                    start,
                    current: world,
                });
            }
        }
    }

    /// Opens one undo step for the whole gesture on its first movement.
    fn record_drag(&mut self, label: &str) {
        if !self.drag_recorded {
            self.session.push_undo(label);
            self.drag_recorded = true;
        }
        self.session.mark_graph_dirty();
    }
}
