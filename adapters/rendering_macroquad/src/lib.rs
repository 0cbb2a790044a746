#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Chernomap.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The grid is laid out like a plotting figure: the plot area keeps fixed
//! fractional margins of the window for axis labels and the finished banner,
//! and grid coordinates grow upwards.

mod background;

use anyhow::Result;
use chernomap_rendering::{
    Banner, Color, GridPresentation, LineStyle, Marker, MarkerShape, Polyline, Presentation,
    RenderingBackend, Scene,
};
use glam::Vec2;
use macroquad::{
    color::WHITE,
    input::{is_key_pressed, KeyCode},
    shapes::{draw_circle, draw_line},
    text::{draw_text, measure_text},
    texture::{draw_texture_ex, DrawTextureParams, Texture2D},
};
use std::time::Duration;
use tracing::{debug, info};

use self::background::DecodedBackground;

/// Screen pixels per typographic point at the reference 100 DPI.
const PIXELS_PER_POINT: f32 = 100.0 / 72.0;

/// Font size used for axis tick labels, in points.
const LABEL_FONT_POINTS: f32 = 10.0;

/// Gap between the plot edge and tick labels, in points.
const LABEL_PAD_POINTS: f32 = 3.5;

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to close the window.
    quit_requested: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);

        Self { quit_requested }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(mut self, enabled: bool) -> Self {
        self.swap_interval = Some(i32::from(enabled));
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, &mut Scene) + 'static,
    {
        let Presentation {
            window_title,
            window_size,
            clear_color,
            background,
            scene,
        } = presentation;

        let decoded = background.as_ref().map(DecodedBackground::load).transpose()?;
        if let Some(decoded) = &decoded {
            debug!(
                width = decoded.width,
                height = decoded.height,
                "background decoded"
            );
        }

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(window_size.0).unwrap_or(i32::MAX),
            window_height: i32::try_from(window_size.1).unwrap_or(i32::MAX),
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = self.swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let texture = decoded.as_ref().map(DecodedBackground::upload);
            let clear = to_macroquad_color(clear_color);

            loop {
                if KeyboardShortcuts::poll().quit_requested {
                    info!("window closed from keyboard");
                    break;
                }

                macroquad::window::clear_background(clear);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                update_scene(frame_dt, &mut scene);

                let metrics = SceneMetrics::new(
                    &scene.grid,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );

                if let Some(texture) = texture {
                    draw_background(texture, &metrics);
                }
                draw_grid(&scene.grid, &metrics);
                draw_axis_labels(&scene.grid, &metrics);
                for trail in &scene.layers.persistent_trails {
                    draw_polyline(trail, &metrics);
                }
                for marker in &scene.layers.death_markers {
                    draw_marker(marker, &metrics);
                }
                for trail in &scene.layers.live_trails {
                    draw_polyline(trail, &metrics);
                }
                for marker in &scene.layers.live_agents {
                    draw_marker(marker, &metrics);
                }
                if let Some(banner) = &scene.banner {
                    draw_banner(banner, &metrics);
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Maps grid units onto the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    left: f32,
    bottom: f32,
    plot_width: f32,
    plot_height: f32,
    unit_x: f32,
    unit_y: f32,
}

impl SceneMetrics {
    const MARGIN_LEFT: f32 = 0.125;
    const MARGIN_RIGHT: f32 = 0.1;
    const MARGIN_BOTTOM: f32 = 0.11;
    const MARGIN_TOP: f32 = 0.12;

    fn new(grid: &GridPresentation, screen_width: f32, screen_height: f32) -> Self {
        let plot_width = (screen_width * (1.0 - Self::MARGIN_LEFT - Self::MARGIN_RIGHT)).max(0.0);
        let plot_height =
            (screen_height * (1.0 - Self::MARGIN_TOP - Self::MARGIN_BOTTOM)).max(0.0);
        let unit_x = if grid.width() > 0.0 {
            plot_width / grid.width()
        } else {
            0.0
        };
        let unit_y = if grid.height() > 0.0 {
            plot_height / grid.height()
        } else {
            0.0
        };

        Self {
            left: screen_width * Self::MARGIN_LEFT,
            bottom: screen_height * (1.0 - Self::MARGIN_BOTTOM),
            plot_width,
            plot_height,
            unit_x,
            unit_y,
        }
    }

    fn to_screen(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            self.left + point.x * self.unit_x,
            self.bottom - point.y * self.unit_y,
        )
    }

    fn top(&self) -> f32 {
        self.bottom - self.plot_height
    }
}

fn points_to_pixels(points: f32) -> f32 {
    points * PIXELS_PER_POINT
}

fn draw_background(texture: Texture2D, metrics: &SceneMetrics) {
    draw_texture_ex(
        texture,
        metrics.left,
        metrics.top(),
        WHITE,
        DrawTextureParams {
            dest_size: Some(macroquad::math::Vec2::new(
                metrics.plot_width,
                metrics.plot_height,
            )),
            ..DrawTextureParams::default()
        },
    );
}

fn grid_lines(grid: &GridPresentation) -> Vec<(Vec2, Vec2)> {
    let vertical = (0..=grid.columns).map(|column| {
        let x = column as f32;
        (Vec2::new(x, 0.0), Vec2::new(x, grid.height()))
    });
    let horizontal = (0..=grid.rows).map(|row| {
        let y = row as f32;
        (Vec2::new(0.0, y), Vec2::new(grid.width(), y))
    });
    horizontal.chain(vertical).collect()
}

fn draw_grid(grid: &GridPresentation, metrics: &SceneMetrics) {
    for (from, to) in grid_lines(grid) {
        draw_segment(from, to, grid.line, metrics);
    }
}

fn draw_axis_labels(grid: &GridPresentation, metrics: &SceneMetrics) {
    let color = to_macroquad_color(grid.label_color);
    let font_size = points_to_pixels(LABEL_FONT_POINTS);
    let pad = points_to_pixels(LABEL_PAD_POINTS);

    for label in grid.column_labels() {
        let anchor = metrics.to_screen(Vec2::new(label.value, 0.0));
        let size = measure_text(&label.text, None, font_size as u16, 1.0);
        let _ = draw_text(
            &label.text,
            anchor.x - size.width * 0.5,
            anchor.y + pad + size.offset_y,
            font_size,
            color,
        );
    }

    for label in grid.row_labels() {
        let anchor = metrics.to_screen(Vec2::new(0.0, label.value));
        let size = measure_text(&label.text, None, font_size as u16, 1.0);
        let _ = draw_text(
            &label.text,
            anchor.x - pad - size.width,
            anchor.y + size.offset_y * 0.5,
            font_size,
            color,
        );
    }
}

fn draw_segment(from: Vec2, to: Vec2, style: LineStyle, metrics: &SceneMetrics) {
    let from = metrics.to_screen(from);
    let to = metrics.to_screen(to);
    draw_line(
        from.x,
        from.y,
        to.x,
        to.y,
        points_to_pixels(style.width),
        to_macroquad_color(style.color),
    );
}

fn draw_polyline(polyline: &Polyline, metrics: &SceneMetrics) {
    for (from, to) in polyline.segments() {
        draw_segment(from, to, polyline.style, metrics);
    }
}

fn cross_arms(center: Vec2, half_extent: f32) -> [(Vec2, Vec2); 2] {
    [
        (
            center + Vec2::new(-half_extent, -half_extent),
            center + Vec2::new(half_extent, half_extent),
        ),
        (
            center + Vec2::new(-half_extent, half_extent),
            center + Vec2::new(half_extent, -half_extent),
        ),
    ]
}

fn draw_marker(marker: &Marker, metrics: &SceneMetrics) {
    let center = metrics.to_screen(marker.position);
    let radius = points_to_pixels(marker.style.size) * 0.5;
    let color = to_macroquad_color(marker.style.color);

    match marker.style.shape {
        MarkerShape::Circle => draw_circle(center.x, center.y, radius, color),
        MarkerShape::Cross => {
            for (from, to) in cross_arms(center, radius) {
                draw_line(from.x, from.y, to.x, to.y, radius * 0.6, color);
            }
        }
    }
}

fn draw_banner(banner: &Banner, metrics: &SceneMetrics) {
    let anchor = metrics.to_screen(banner.anchor);
    let font_size = points_to_pixels(banner.font_size);
    let size = measure_text(&banner.text, None, font_size as u16, 1.0);
    let _ = draw_text(
        &banner.text,
        anchor.x - size.width * 0.5,
        anchor.y,
        font_size,
        to_macroquad_color(banner.color),
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
