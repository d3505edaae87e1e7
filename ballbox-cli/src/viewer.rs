//! Interactive viewer for scene files
//!
//! Steps the simulation inside the eframe update callback and redraws the particles every
//! tick. The scene file is watched and reloaded when it changes on disk.

use ballbox_core::{
    build_simulation_context_from_source, particle_positions, step_simulation, SimulationContext,
};
use eframe::egui;
use notify::{Event, RecommendedWatcher, Watcher};
use std::path::PathBuf;
use std::sync::mpsc;

/// Open the viewer window and block until it is closed
pub fn launch(source_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "ballbox",
        options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(source_path, cc)))),
    )
    .map_err(|e| format!("viewer failed: {}", e))?;
    Ok(())
}

pub struct ViewerApp {
    source_path: PathBuf,
    source_text: String,
    ctx_opt: Option<SimulationContext>,
    last_load_error: Option<String>,
    warnings: Vec<String>,
    playing: bool,
    speed_multiplier: f32,
    /// Fractional frames carried between ticks
    frame_budget: f32,
    #[allow(dead_code)] // Kept alive to maintain file watching
    file_watcher: Option<RecommendedWatcher>,
    file_receiver: mpsc::Receiver<notify::Result<Event>>,
}

impl ViewerApp {
    pub fn new(source_path: PathBuf, _cc: &eframe::CreationContext<'_>) -> Self {
        let source_text = std::fs::read_to_string(&source_path)
            .unwrap_or_else(|e| format!("# error reading file: {}", e));

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            // The receiver is gone during shutdown
            let _ = tx.send(res);
        })
        .ok();

        if let Some(ref mut w) = watcher {
            if let Err(e) = w.watch(&source_path, notify::RecursiveMode::NonRecursive) {
                log::warn!("not watching {}: {}", source_path.display(), e);
            }
        }

        let mut app = Self {
            source_path,
            source_text,
            ctx_opt: None,
            last_load_error: None,
            warnings: Vec::new(),
            playing: false,
            speed_multiplier: 1.0,
            frame_budget: 0.0,
            file_watcher: watcher,
            file_receiver: rx,
        };

        app.reload_context();
        app
    }

    fn reload_context(&mut self) {
        match build_simulation_context_from_source(&self.source_text) {
            Ok((ctx, diagnostics)) => {
                self.warnings = diagnostics
                    .warnings()
                    .map(|d| d.render(&self.source_text))
                    .collect();
                for w in &self.warnings {
                    log::warn!("{}", w);
                }
                self.ctx_opt = Some(ctx);
                self.last_load_error = None;
            }
            Err(e) => {
                log::error!("{}", e);
                self.last_load_error = Some(e.to_string());
                self.ctx_opt = None;
                self.playing = false;
            }
        }
    }

    fn check_file_changes(&mut self) {
        let mut needs_reload = false;
        while let Ok(event) = self.file_receiver.try_recv() {
            match event {
                Ok(Event {
                    kind: notify::EventKind::Modify(_),
                    paths,
                    ..
                }) if paths.contains(&self.source_path) => {
                    match std::fs::read_to_string(&self.source_path) {
                        Ok(new_text) => {
                            self.source_text = new_text;
                            needs_reload = true;
                        }
                        Err(e) => log::warn!("could not re-read scene: {}", e),
                    }
                }
                Ok(_) => {}
                Err(e) => log::warn!("file watcher error: {}", e),
            }
        }

        if needs_reload {
            log::info!("{} changed, reloading", self.source_path.display());
            self.reload_context();
        }
    }

    fn draw_scene(&self, ui: &egui::Ui) {
        let Some(ref ctx) = self.ctx_opt else {
            return;
        };

        let rect = ui.max_rect().shrink(12.0);
        let painter = ui.painter();

        // Fit [0, max_x] x [0, max_y] into the panel, y up
        let bounds = ctx.params.bounds;
        let scale = (rect.width() / bounds.x as f32).min(rect.height() / bounds.y as f32);
        let origin = egui::pos2(
            rect.center().x - 0.5 * bounds.x as f32 * scale,
            rect.center().y + 0.5 * bounds.y as f32 * scale,
        );
        let to_screen =
            |x: f64, y: f64| origin + egui::vec2(x as f32 * scale, -(y as f32) * scale);

        let frame_rect = egui::Rect::from_two_pos(to_screen(0.0, 0.0), to_screen(bounds.x, bounds.y));
        painter.rect_stroke(frame_rect, 0.0, egui::Stroke::new(1.0, egui::Color32::GRAY));

        let radius = (ctx.params.radius as f32 * scale).max(1.5);
        for pos in particle_positions(ctx) {
            painter.circle_filled(to_screen(pos.x, pos.y), radius, egui::Color32::LIGHT_BLUE);
        }
    }
}

/// Add one tick's worth of frames to the budget and take the whole ones out
fn take_frames(budget: &mut f32, speed: f32) -> usize {
    *budget += speed.max(0.0);
    let whole = budget.floor();
    *budget -= whole;
    whole as usize
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_file_changes();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button(if self.playing { "⏸ Pause" } else { "▶ Play" }).clicked() {
                    self.playing = !self.playing;
                }

                if ui.button("⏮ Reset").clicked() {
                    self.reload_context();
                    self.playing = false;
                    self.frame_budget = 0.0;
                }

                if ui.button("⏭ Step").clicked() {
                    if let Some(ref mut sim) = self.ctx_opt {
                        step_simulation(sim);
                    }
                }

                ui.separator();

                ui.label("Speed:");
                ui.add(egui::Slider::new(&mut self.speed_multiplier, 0.1..=10.0));

                ui.separator();

                if let Some(ref sim) = self.ctx_opt {
                    ui.label(format!(
                        "Frame: {} / {}   collisions: {}",
                        sim.current_frame, sim.max_frames, sim.totals.collisions
                    ));
                }
            });
        });

        if self.last_load_error.is_some() || !self.warnings.is_empty() {
            egui::TopBottomPanel::bottom("diagnostics").show(ctx, |ui| {
                ui.set_max_height(120.0);
                if let Some(ref error) = self.last_load_error {
                    ui.label(egui::RichText::new(error).color(egui::Color32::RED));
                }
                for warning in &self.warnings {
                    ui.label(egui::RichText::new(warning).color(egui::Color32::YELLOW));
                }
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_scene(ui);
        });

        if self.playing {
            if let Some(ref mut sim) = self.ctx_opt {
                let frames_this_tick = take_frames(&mut self.frame_budget, self.speed_multiplier);
                for _ in 0..frames_this_tick {
                    if step_simulation(sim) {
                        self.playing = false;
                        break;
                    }
                }
            }
            ctx.request_repaint();
        }
    }
}
