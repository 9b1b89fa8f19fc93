use crate::group::GroupContainer;
use crate::model::{self, GroupId, NodeId};
use eframe::egui;
use std::collections::HashSet;

use super::View;
use super::actions::{GROUP_HEADER, header_rect, resize_handle_rect};

const SELECTION: egui::Color32 = egui::Color32::from_rgb(90, 160, 255);

fn color_row(ui: &mut egui::Ui, rgba: &mut model::Rgba) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        let presets = [
            egui::Color32::from_rgba_unmultiplied(60, 60, 70, 160),
            egui::Color32::from_rgba_unmultiplied(200, 40, 40, 160),
            egui::Color32::from_rgba_unmultiplied(40, 140, 60, 160),
            egui::Color32::from_rgba_unmultiplied(40, 90, 200, 160),
            egui::Color32::from_rgba_unmultiplied(200, 140, 40, 160),
            egui::Color32::from_rgba_unmultiplied(130, 60, 180, 160),
        ];
        for c in presets {
            if ui
                .add_sized([18.0, 18.0], egui::Button::new("").fill(c))
                .clicked()
            {
                *rgba = model::Rgba::from_color32(c);
                changed = true;
            }
        }
        let mut arr = [rgba.r, rgba.g, rgba.b, rgba.a];
        if ui.color_edit_button_srgba_unmultiplied(&mut arr).changed() {
            *rgba = model::Rgba {
                r: arr[0],
                g: arr[1],
                b: arr[2],
                a: arr[3],
            };
            changed = true;
        }
    });
    changed
}

/// Side panel controls for one group: delayed title field, color picker and
/// member list. Returns the picked color and whether the title draft should
/// be committed.
pub(super) fn group_inspector(
    ui: &mut egui::Ui,
    container: &mut GroupContainer,
) -> (Option<model::Rgba>, bool) {
    ui.label("Title");
    let response = ui.add(
        egui::TextEdit::singleline(container.title_field_mut().draft_mut())
            .desired_width(f32::INFINITY),
    );
    let mut title_committed = response.lost_focus();
    if title_committed && ui.input(|i| i.key_pressed(egui::Key::Escape)) {
        container.title_field_mut().revert();
        title_committed = false;
    }

    ui.separator();
    ui.label("Color");
    let mut color = container.color();
    let picked = color_row(ui, &mut color).then_some(color);

    ui.separator();
    ui.label(format!("Members: {}", container.children().len()));
    for id in container.children() {
        ui.small(id.as_str());
    }
    (picked, title_committed)
}

pub(super) fn draw_background(painter: &egui::Painter, rect: egui::Rect, view: &View) {
    let bg = painter.ctx().style().visuals.extreme_bg_color;
    painter.rect_filled(rect, 0.0, bg);
    let grid_color = egui::Color32::from_gray(60);
    let spacing_world = 64.0;
    let spacing_screen = spacing_world * view.zoom;
    if spacing_screen >= 24.0 {
        let start = rect.min + view.pan_screen;
        let x0 = ((rect.min.x - start.x) / spacing_screen).floor() * spacing_screen + start.x;
        let y0 = ((rect.min.y - start.y) / spacing_screen).floor() * spacing_screen + start.y;
        let mut x = x0;
        while x < rect.max.x {
            painter.line_segment(
                [egui::pos2(x, rect.min.y), egui::pos2(x, rect.max.y)],
                egui::Stroke::new(1.0, grid_color),
            );
            x += spacing_screen;
        }
        let mut y = y0;
        while y < rect.max.y {
            painter.line_segment(
                [egui::pos2(rect.min.x, y), egui::pos2(rect.max.x, y)],
                egui::Stroke::new(1.0, grid_color),
            );
            y += spacing_screen;
        }
    }
}

pub(super) fn draw_groups(
    painter: &egui::Painter,
    origin: egui::Pos2,
    view: &View,
    containers: &[GroupContainer],
    selected_group: Option<GroupId>,
) {
    for container in containers {
        let state = container.view_state();
        let body = view.rect_to_screen(origin, state.rect);
        let radius = egui::CornerRadius::same(6);
        painter.rect_filled(body, radius, state.background.to_color32());

        let header = view.rect_to_screen(origin, model::Rect::from_rect(header_rect(state.rect)));
        painter.rect_filled(
            header,
            radius,
            egui::Color32::from_black_alpha(60),
        );
        painter.text(
            header.left_center() + egui::vec2(8.0, 0.0),
            egui::Align2::LEFT_CENTER,
            &state.title,
            egui::FontId::proportional((GROUP_HEADER * 0.5 * view.zoom).max(8.0)),
            egui::Color32::WHITE,
        );

        let selected = selected_group == Some(container.group());
        let stroke = if selected {
            egui::Stroke::new(2.0, SELECTION)
        } else {
            egui::Stroke::new(1.0, egui::Color32::from_white_alpha(40))
        };
        painter.rect_stroke(body, radius, stroke, egui::StrokeKind::Inside);
        if selected {
            let handle =
                view.rect_to_screen(origin, model::Rect::from_rect(resize_handle_rect(state.rect)));
            painter.rect_filled(handle, 2.0, SELECTION);
        }
    }
}

pub(super) fn draw_nodes(
    painter: &egui::Painter,
    origin: egui::Pos2,
    view: &View,
    graph: &model::Graph,
    selected: &HashSet<NodeId>,
) {
    for node in &graph.nodes {
        let rect = view.rect_to_screen(origin, node.rect);
        let radius = egui::CornerRadius::same(4);
        painter.rect_filled(rect, radius, egui::Color32::from_gray(45));
        let stroke = if selected.contains(&node.id) {
            egui::Stroke::new(2.0, SELECTION)
        } else {
            egui::Stroke::new(1.0, egui::Color32::from_gray(110))
        };
        painter.rect_stroke(rect, radius, stroke, egui::StrokeKind::Inside);
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            &node.title,
            egui::FontId::proportional((14.0 * view.zoom).max(6.0)),
            egui::Color32::from_gray(230),
        );
    }
}

pub(super) fn draw_select_box(
    painter: &egui::Painter,
    origin: egui::Pos2,
    view: &View,
    start: egui::Pos2,
    current: egui::Pos2,
) {
    let rect = egui::Rect::from_two_pos(
        view.world_to_screen(origin, start),
        view.world_to_screen(origin, current),
    );
    painter.rect_filled(rect, 0.0, SELECTION.gamma_multiply(0.15));
    painter.rect_stroke(
        rect,
        0.0,
        egui::Stroke::new(1.0, SELECTION),
        egui::StrokeKind::Inside,
    );
}
