#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Chernomap adapters.
//!
//! Backends receive a [`Presentation`] once and a mutable [`Scene`] every
//! frame. Scenes are rebuilt from world snapshots through [`compose_scene`],
//! which never touches a display and can therefore be asserted on directly.

use anyhow::Result as AnyResult;
use chernomap_core::{FrameSnapshot, Position, GRID_COLUMNS, GRID_ROWS};
use glam::Vec2;
use std::{error::Error, fmt, path::PathBuf, time::Duration};

/// Text displayed once the simulation stops ticking.
pub const FINISHED_BANNER_TEXT: &str = "Sim Finished";

/// Grid coordinate the finished banner is centred on.
pub const FINISHED_BANNER_ANCHOR: Vec2 = Vec2::new(7.0, 16.0);

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with its alpha channel replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha,
        }
    }
}

/// Stroke used for polylines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in points.
    pub width: f32,
}

impl LineStyle {
    /// Creates a new line style.
    #[must_use]
    pub const fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

/// Glyph drawn for point markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerShape {
    /// Filled circle.
    Circle,
    /// Diagonal cross.
    Cross,
}

/// Appearance of a point marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerStyle {
    /// Glyph used for the marker.
    pub shape: MarkerShape,
    /// Fill color.
    pub color: Color,
    /// Marker size in points.
    pub size: f32,
}

impl MarkerStyle {
    /// Creates a new marker style.
    #[must_use]
    pub const fn new(shape: MarkerShape, color: Color, size: f32) -> Self {
        Self { shape, color, size }
    }
}

/// Styles applied to each scene layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenePalette {
    /// Grid line stroke.
    pub grid: LineStyle,
    /// Axis label color.
    pub label: Color,
    /// Trails of agents that died during the run.
    pub persistent_trail: LineStyle,
    /// Final positions of agents that died during the run.
    pub death_marker: MarkerStyle,
    /// Trails of agents that are currently alive.
    pub live_trail: LineStyle,
    /// Current positions of live agents.
    pub live_agent: MarkerStyle,
    /// Color of the finished banner.
    pub banner: Color,
}

impl Default for ScenePalette {
    fn default() -> Self {
        let black = Color::from_rgb_u8(0, 0, 0);
        let red = Color::from_rgb_u8(255, 0, 0);
        let blue = Color::from_rgb_u8(0, 0, 255);
        let purple = Color::from_rgb_u8(128, 0, 128);

        Self {
            grid: LineStyle::new(black.with_alpha(0.7), 0.5),
            label: black,
            persistent_trail: LineStyle::new(red.with_alpha(0.10), 2.0),
            death_marker: MarkerStyle::new(MarkerShape::Cross, purple.with_alpha(0.40), 4.0),
            live_trail: LineStyle::new(blue.with_alpha(0.6), 0.5),
            live_agent: MarkerStyle::new(MarkerShape::Circle, red, 4.0),
            banner: black,
        }
    }
}

/// Square grid overlay drawn on top of the background.
///
/// Lines are placed on every integer coordinate from `0` to the column and
/// row counts inclusive, so a 16×16 grid yields 17 lines in each direction.
/// Labels sit on the first `columns` and `rows` lines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Stroke used for grid lines.
    pub line: LineStyle,
    /// Color used for axis labels.
    pub label_color: Color,
}

impl GridPresentation {
    /// Highest row count that still has a single-letter label.
    pub const MAX_LABELLED_ROWS: u32 = 26;

    /// Creates a new grid descriptor.
    ///
    /// Returns an error when the grid has no area or more rows than letters.
    pub fn new(
        columns: u32,
        rows: u32,
        line: LineStyle,
        label_color: Color,
    ) -> std::result::Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyGrid { columns, rows });
        }
        if rows > Self::MAX_LABELLED_ROWS {
            return Err(RenderingError::TooManyRows { rows });
        }

        Ok(Self {
            columns,
            rows,
            line,
            label_color,
        })
    }

    /// Grid matching the simulation's coordinate space styled with `palette`.
    #[must_use]
    pub const fn simulation(palette: &ScenePalette) -> Self {
        Self {
            columns: GRID_COLUMNS,
            rows: GRID_ROWS,
            line: palette.grid,
            label_color: palette.label,
        }
    }

    /// Total width of the grid in grid units.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns as f32
    }

    /// Total height of the grid in grid units.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows as f32
    }

    /// Labels shown under each column line, `0` upwards.
    #[must_use]
    pub fn column_labels(&self) -> Vec<AxisLabel> {
        (0..self.columns)
            .map(|column| AxisLabel {
                text: column.to_string(),
                value: column as f32,
            })
            .collect()
    }

    /// Labels shown beside each row line, `A` at the bottom.
    #[must_use]
    pub fn row_labels(&self) -> Vec<AxisLabel> {
        (b'A'..)
            .zip(0..self.rows)
            .map(|(letter, row)| AxisLabel {
                text: char::from(letter).to_string(),
                value: row as f32,
            })
            .collect()
    }
}

/// Text placed along one axis of the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisLabel {
    /// Displayed text.
    pub text: String,
    /// Grid coordinate along the axis the label is attached to.
    pub value: f32,
}

/// Connected line segments expressed in grid units.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    /// Vertices in drawing order.
    pub points: Vec<Vec2>,
    /// Stroke applied to every segment.
    pub style: LineStyle,
}

impl Polyline {
    /// Iterator over consecutive vertex pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

/// Point marker expressed in grid units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    /// Marker centre.
    pub position: Vec2,
    /// Marker appearance.
    pub style: MarkerStyle,
}

/// Text anchored at a grid coordinate and centred horizontally.
#[derive(Clone, Debug, PartialEq)]
pub struct Banner {
    /// Displayed text.
    pub text: String,
    /// Grid coordinate the text is centred on.
    pub anchor: Vec2,
    /// Text color.
    pub color: Color,
    /// Font size in points.
    pub font_size: f32,
}

impl Banner {
    /// Banner shown once the frame limit has been reached.
    #[must_use]
    pub fn finished(palette: &ScenePalette) -> Self {
        Self {
            text: FINISHED_BANNER_TEXT.to_owned(),
            anchor: FINISHED_BANNER_ANCHOR,
            color: palette.banner,
            font_size: 12.0,
        }
    }
}

/// Draw lists derived from a single world snapshot.
///
/// Backends draw the fields in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneLayers {
    /// Trails of agents that died during the run, oldest death first.
    pub persistent_trails: Vec<Polyline>,
    /// Final positions of agents that died during the run, oldest death first.
    pub death_markers: Vec<Marker>,
    /// Trails of live agents, in identifier order.
    pub live_trails: Vec<Polyline>,
    /// Current positions of live agents, in identifier order.
    pub live_agents: Vec<Marker>,
}

/// Scene description combining the static grid with the animated layers.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid overlay drawn above the background.
    pub grid: GridPresentation,
    /// Snapshot-derived layers.
    pub layers: SceneLayers,
    /// Optional text drawn above every layer.
    pub banner: Option<Banner>,
}

impl Scene {
    /// Creates an empty scene over `grid`.
    #[must_use]
    pub fn new(grid: GridPresentation) -> Self {
        Self {
            grid,
            layers: SceneLayers::default(),
            banner: None,
        }
    }
}

/// Builds the layered draw lists for `snapshot`.
#[must_use]
pub fn compose_scene(snapshot: &FrameSnapshot, palette: &ScenePalette) -> SceneLayers {
    let persistent_trails = snapshot
        .persistent_trails
        .iter()
        .map(|trail| polyline(trail, palette.persistent_trail))
        .collect();
    let death_markers = snapshot
        .death_markers
        .iter()
        .map(|position| marker(*position, palette.death_marker))
        .collect();
    let live_trails = snapshot
        .agents
        .alive()
        .map(|agent| polyline(&agent.trail, palette.live_trail))
        .collect();
    let live_agents = snapshot
        .agents
        .alive()
        .map(|agent| marker(agent.position, palette.live_agent))
        .collect();

    SceneLayers {
        persistent_trails,
        death_markers,
        live_trails,
        live_agents,
    }
}

fn to_vec2(position: Position) -> Vec2 {
    Vec2::new(position.x() as f32, position.y() as f32)
}

fn polyline(trail: &[Position], style: LineStyle) -> Polyline {
    Polyline {
        points: trail.iter().copied().map(to_vec2).collect(),
        style,
    }
}

fn marker(position: Position, style: MarkerStyle) -> Marker {
    Marker {
        position: to_vec2(position),
        style,
    }
}

/// Background image stretched across the full grid extent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackgroundPresentation {
    /// Location of the encoded image.
    pub path: PathBuf,
    /// Width the image is resampled to before upload.
    pub width: u32,
    /// Height the image is resampled to before upload.
    pub height: u32,
}

impl BackgroundPresentation {
    /// Resolution backgrounds are resampled to by default.
    pub const DEFAULT_RESOLUTION: (u32, u32) = (1024, 768);

    /// Creates a background descriptor using the default resolution.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (width, height) = Self::DEFAULT_RESOLUTION;
        Self {
            path: path.into(),
            width,
            height,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Requested window size in pixels.
    pub window_size: (u32, u32),
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Image drawn beneath the grid, if any.
    pub background: Option<BackgroundPresentation>,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor without a background.
    #[must_use]
    pub fn new<T>(
        window_title: T,
        window_size: (u32, u32),
        clear_color: Color,
        scene: Scene,
    ) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            window_size,
            clear_color,
            background: None,
            scene,
        }
    }

    /// Attaches a background image.
    #[must_use]
    pub fn with_background(mut self, background: BackgroundPresentation) -> Self {
        self.background = Some(background);
        self
    }
}

/// Rendering backend capable of presenting Chernomap scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the elapsed frame time and
    /// may mutate the scene before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Grids need at least one column and one row.
    EmptyGrid {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// Row labels are single letters.
    TooManyRows {
        /// Requested row count.
        rows: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { columns, rows } => {
                write!(f, "grid must have a positive area (received {columns}x{rows})")
            }
            Self::TooManyRows { rows } => {
                write!(f, "grid rows are labelled A to Z (received {rows} rows)")
            }
        }
    }
}

impl Error for RenderingError {}
