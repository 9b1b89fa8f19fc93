use crate::group::GroupContainer;
use crate::model::{self, GroupId, NodeId};
use eframe::egui;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

mod actions;
mod command_palette;
mod help;
mod render;
mod session;
mod settings;
mod update;

use session::EditorSession;

#[derive(Clone, Debug)]
enum Drag {
    Nodes {
        last_world: egui::Pos2,
    },
    Group {
        group: GroupId,
        last_world: egui::Pos2,
    },
    Resize {
        group: GroupId,
        start_rect: model::Rect,
        start_world: egui::Pos2,
    },
    SelectBox {
        start: egui::Pos2,
        current: egui::Pos2,
    },
}

#[derive(Clone, Copy, Debug)]
struct View {
    pan_screen: egui::Vec2,
    zoom: f32,
}

impl Default for View {
    fn default() -> Self {
        Self {
            pan_screen: egui::Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl View {
    fn world_to_screen(&self, origin: egui::Pos2, world: egui::Pos2) -> egui::Pos2 {
        origin + self.pan_screen + world.to_vec2() * self.zoom
    }

    fn screen_to_world(&self, origin: egui::Pos2, screen: egui::Pos2) -> egui::Pos2 {
        ((screen - origin - self.pan_screen) / self.zoom).to_pos2()
    }

    fn rect_to_screen(&self, origin: egui::Pos2, rect: model::Rect) -> egui::Rect {
        let r = rect.to_rect();
        egui::Rect::from_min_max(
            self.world_to_screen(origin, r.min),
            self.world_to_screen(origin, r.max),
        )
    }

    fn zoom_about_screen_point(
        &mut self,
        origin: egui::Pos2,
        screen_point: egui::Pos2,
        zoom_delta: f32,
    ) {
        let before = self.screen_to_world(origin, screen_point);
        self.zoom = (self.zoom * zoom_delta).clamp(0.1, 8.0);
        let after_screen = self.world_to_screen(origin, before);
        self.pan_screen += screen_point - after_screen;
    }
}

pub struct GraphApp {
    session: EditorSession,
    containers: Vec<GroupContainer>,
    selected: HashSet<NodeId>,
    selected_group: Option<GroupId>,
    view: View,
    drag: Option<Drag>,
    drag_recorded: bool,
    last_pointer_world: Option<egui::Pos2>,
    file_path: String,
    settings_path: PathBuf,
    settings: settings::AppSettings,
    status: Option<String>,
    command_palette: command_palette::CommandPalette,
    show_help: bool,
}

impl GraphApp {
    fn config_path() -> Option<PathBuf> {
        if let Some(home) = std::env::var_os("HOME") {
            let path = PathBuf::from(home).join(".config").join("nodegroup.toml");
            if path.exists() {
                return Some(path);
            }
        }
        let local = Path::new("settings.toml");
        local.exists().then(|| local.to_path_buf())
    }

    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings_path = Self::config_path().unwrap_or_else(|| PathBuf::from("settings.toml"));
        let settings = match settings::load_settings(&settings_path) {
            Ok(settings) => settings,
            Err(crate::Error::Io { .. }) => settings::AppSettings::default(),
            Err(e) => {
                tracing::warn!(path = %settings_path.display(), error = %e, "ignoring unreadable settings");
                settings::AppSettings::default()
            }
        };
        let mut app = Self::with_settings(settings, settings_path);
        if Path::new(&app.file_path).exists() {
            app.load_from_path();
        }
        app
    }

    fn with_settings(settings: settings::AppSettings, settings_path: PathBuf) -> Self {
        Self {
            session: EditorSession::new(model::Graph::default()),
            containers: Vec::new(),
            selected: HashSet::new(),
            selected_group: None,
            view: View::default(),
            drag: None,
            drag_recorded: false,
            last_pointer_world: None,
            file_path: settings.file_path.clone(),
            settings_path,
            settings,
            status: None,
            command_palette: command_palette::CommandPalette::default(),
            show_help: false,
        }
    }
}
