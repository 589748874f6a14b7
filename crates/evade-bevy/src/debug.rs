//! Gizmo rendering of scan trace lines.

use bevy_app::{App, Plugin, PostUpdate};
use bevy_color::Color;
use bevy_ecs::prelude::*;
use bevy_gizmos::gizmos::Gizmos;
use bevy_math::Vec3;

use crate::EvadeTraceLines;

fn color_from_rgba(rgba: [f32; 4]) -> Color {
    Color::srgba(rgba[0], rgba[1], rgba[2], rgba[3])
}

pub fn draw_evade_trace_lines(lines: Option<Res<EvadeTraceLines>>, mut gizmos: Gizmos) {
    let Some(lines) = lines else {
        return;
    };
    for line in lines.lines() {
        gizmos.line(
            Vec3::new(line.from.x, line.from.y, line.from.z),
            Vec3::new(line.to.x, line.to.y, line.to.z),
            color_from_rgba(line.kind.rgba()),
        );
    }
}

/// Draws [`EvadeTraceLines`] every frame. Needs Bevy's gizmo plugin and
/// [`crate::EvadePlugin::with_trace_lines`].
#[derive(Default)]
pub struct EvadeGizmosPlugin;

impl Plugin for EvadeGizmosPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, draw_evade_trace_lines);
    }
}
