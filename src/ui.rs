// src/ui.rs

use portal_fx::engine_lib::params::{ParamValue, ParameterSet};

/// Parameter panel. Edits go through `ParameterSet::set`, so they are
/// clamped here and applied by the render loop on its next tick.
pub fn build_ui(ctx: &egui::Context, params: &mut ParameterSet) {
    egui::Window::new("Parameters")
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
        .resizable(false)
        .show(ctx, |ui| {
            // Snapshot first, the widgets write back through `set`.
            let entries: Vec<_> = params
                .iter()
                .map(|p| (p.name.clone(), p.label.clone(), p.value, p.range))
                .collect();

            for (name, label, value, range) in entries {
                let edited = match value {
                    ParamValue::Float(mut v) => {
                        let Some(range) = range else { continue };
                        let slider = egui::Slider::new(&mut v, range.min..=range.max)
                            .step_by(range.step as f64)
                            .text(label.as_str());
                        ui.add(slider).changed().then_some(ParamValue::Float(v))
                    }
                    ParamValue::Bool(mut on) => ui.checkbox(&mut on, label.as_str()).changed().then_some(ParamValue::Bool(on)),
                    ParamValue::Color(mut rgb) => {
                        ui.horizontal(|ui| {
                            let changed = ui.color_edit_button_rgb(&mut rgb).changed();
                            ui.label(label.as_str());
                            changed
                        })
                        .inner
                        .then_some(ParamValue::Color(rgb))
                    }
                };
                if let Some(value) = edited {
                    if let Err(e) = params.set(&name, value) {
                        log::warn!("{e}");
                    }
                }
            }

            ui.separator();
            ui.label("Portal FX");
        });
}
