use egui::Context;

use crate::config::ControlSurface;
use crate::controller::{push_event, ControlEvent, EventQueue, InputEvent, Session};

/// Fastest selectable light orbit, radians per tick
pub const MAX_LIGHT_RATE: f32 = 0.2;

/// Build the overlay. Controls only queue events; the session applies them next tick.
pub fn build_ui(ctx: &Context, session: &Session, events: &EventQueue, surface: ControlSurface) {
    if surface == ControlSurface::Overlay {
        draw_mapping_window(ctx, session, events);
        draw_message(ctx, session);
    }
    draw_help(ctx);
}

fn draw_mapping_window(ctx: &Context, session: &Session, events: &EventQueue) {
    let mapping = &session.mapping;
    let profile = mapping.profile();

    egui::Window::new("Mapping")
        .default_pos([8.0, 8.0])
        .resizable(false)
        .show(ctx, |ui| {
            for &mode in profile.radio_modes() {
                let selected = mapping.mode() == Some(mode);
                if ui.radio(selected, mode.display_name()).clicked() && !selected {
                    push_event(events, InputEvent::Control(ControlEvent::SelectMode(mode)));
                }
            }

            if profile.has_displacement_toggle() {
                ui.separator();
                let mut enabled = mapping.displacement_enabled();
                if ui.checkbox(&mut enabled, "Displacement").changed() {
                    push_event(events, InputEvent::Control(ControlEvent::SetDisplacement(enabled)));
                }
            }

            ui.separator();
            let mut rate = session.light.rate;
            ui.label(egui::RichText::new("Light speed").small());
            if ui.add(egui::Slider::new(&mut rate, 0.0..=MAX_LIGHT_RATE).step_by(0.005)).changed() {
                push_event(events, InputEvent::Control(ControlEvent::SetLightRate(rate)));
            }
        });
}

fn draw_message(ctx: &Context, session: &Session) {
    if !session.panel.visible {
        return;
    }
    egui::Area::new(egui::Id::new("message"))
        .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -24.0])
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_max_width(360.0);
                ui.label(session.panel.text.as_str());
            });
        });
}

fn draw_help(ctx: &Context) {
    egui::Area::new(egui::Id::new("help"))
        .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new("WASD - Move   Space - Jump   Drag - Orbit   Right drag - Pan   Wheel - Zoom")
                    .small()
                    .color(egui::Color32::DARK_GRAY),
            );
        });
}
