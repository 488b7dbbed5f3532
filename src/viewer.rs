use sfml::graphics::{
    Color, FloatRect, Font, PrimitiveType, RenderStates, RenderTarget, RenderWindow, Text,
    Transformable, Vertex, View,
};
use sfml::system::{Clock, Vector2f, Vector2u};
use sfml::window::{ContextSettings, Event, Key, Style, VideoMode};
use sfml::SfBox;

use bitflags::bitflags;
use tracing::{debug, info, warn};

use crate::config::{Config, Palette, RgbColor};
use crate::geometry::{CircleOutline, Point};
use crate::session::Spirograph;

const SEED_RADIUS: f64 = 5.0;
const MIN_WINDOW_SIDE: u32 = 300;

bitflags! {
    pub struct Flags: u8 {
        const FULLSCREEN = 1 << 0;
        const PAUSE = 1 << 1;
        const FONT_FAILURE = 1 << 2;
        const DRAW_GUI = 1 << 3;
        const SHOW_CURSOR = 1 << 4;
    }
}

/// What to draw this frame. Owned by the run loop, handed to `request_draw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderMode {
    pub show_curve: bool,
}

impl Default for RenderMode {
    fn default() -> Self {
        RenderMode { show_curve: true }
    }
}

impl RenderMode {
    pub fn apply_key(self, code: Key) -> RenderMode {
        match code {
            Key::C => RenderMode {
                show_curve: !self.show_curve,
            },
            _ => self,
        }
    }
}

pub struct App {
    pub fps_clock: SfBox<Clock>,
    pub ctx_settings: ContextSettings,

    pub flags: Flags,
    pub font: Option<SfBox<Font>>,

    pub debug_text: String,

    pub palette: Palette,

    pub window: Option<RenderWindow>,
    pub size: Vector2u,
    pub windowed_size: Vector2u,
    pub fps_limit: u32,
    pub vsync: bool,

    curve_vertices: Vec<Vertex>,
    curve_revision: Option<u64>,
    curve_size: Vector2u,

    frames: u32,
    frames_clock: SfBox<Clock>,
}

impl App {
    //
    // Lifecycle code
    //

    pub fn new(config: &Config, palette: Palette) -> App {
        let mut ctx_settings = ContextSettings::default();
        ctx_settings.antialiasing_level = config.window.antialiasing;

        let mut flags = Flags::SHOW_CURSOR;
        flags.set(Flags::FULLSCREEN, config.window.fullscreen);

        App {
            fps_clock: Clock::start(),
            ctx_settings,
            flags,
            font: None,
            debug_text: String::new(),
            palette,
            window: None,
            size: (config.window.width, config.window.height).into(),
            windowed_size: (config.window.width, config.window.height).into(),
            fps_limit: config.window.fps_limit,
            vsync: config.window.vsync,
            curve_vertices: Vec::new(),
            curve_revision: None,
            curve_size: (0, 0).into(),
            frames: 0,
            frames_clock: Clock::start(),
        }
    }

    pub fn init(&mut self, full: bool) {
        if full {
            if let Some(font) = Font::from_file("font.ttf") {
                self.font = Some(font);
                self.flags.remove(Flags::FONT_FAILURE);
            } else {
                warn!("font.ttf not found, debug panel disabled");
                self.flags.insert(Flags::FONT_FAILURE);
            }
        }

        if let Some(window) = self.window.as_mut() {
            if window.is_open() {
                window.close()
            }
        }

        let mut window = RenderWindow::new(
            if self.flags.contains(Flags::FULLSCREEN) {
                VideoMode::desktop_mode()
            } else {
                VideoMode::from((self.windowed_size.x, self.windowed_size.y))
            },
            "Spirograph",
            if self.flags.contains(Flags::FULLSCREEN) {
                Style::FULLSCREEN
            } else {
                Style::DEFAULT
            },
            &self.ctx_settings,
        );
        window.set_vertical_sync_enabled(self.vsync);
        window.set_framerate_limit(self.fps_limit);
        window.set_mouse_cursor_visible(self.flags.contains(Flags::SHOW_CURSOR));

        self.size = window.size();
        info!(
            width = self.size.x,
            height = self.size.y,
            antialiasing = window.settings().antialiasing_level,
            "window opened"
        );

        self.window = Some(window);
        self.curve_revision = None;
    }

    pub fn run(&mut self, session: &mut Spirograph) {
        if self.window.is_none() {
            self.init(true);
        }

        let mut mode = RenderMode::default();

        'main_loop: while self.window.as_ref().map_or(false, |window| window.is_open()) {
            while let Some(event) = self.window.as_mut().and_then(|window| window.poll_event()) {
                match event {
                    Event::Closed => {
                        self.close();
                        break 'main_loop;
                    }
                    Event::KeyPressed {
                        code, shift, alt, ..
                    } => {
                        mode = mode.apply_key(code);
                        if !self.process_key(session, code, shift, alt) {
                            break 'main_loop;
                        }
                    }
                    Event::Resized { width, height } => self.resize(width, height),
                    _ => (),
                }
            }

            if !self.flags.contains(Flags::PAUSE) {
                session.on_tick();
            }
            self.request_update(session);

            self.request_draw(session, mode);
            if let Some(window) = self.window.as_mut() {
                window.display();
            }
        }

        info!("window closed");
    }

    fn resize(&mut self, width: u32, height: u32) {
        let new_width = width.max(MIN_WINDOW_SIDE);
        let new_height = height.max(MIN_WINDOW_SIDE);

        if let Some(window) = self.window.as_mut() {
            window.set_view(&View::from_rect(FloatRect::new(
                0.0,
                0.0,
                new_width as f32,
                new_height as f32,
            )));
            if width.min(height) < MIN_WINDOW_SIDE {
                window.set_size((new_width, new_height));
            }
            self.size = window.size();
        }
        if !self.flags.contains(Flags::FULLSCREEN) {
            self.windowed_size = self.size;
        }
        debug!(width = self.size.x, height = self.size.y, "window resized");
    }

    //
    // Input processing code
    //

    pub fn process_key(
        &mut self,
        session: &mut Spirograph,
        code: Key,
        shift: bool,
        alt: bool,
    ) -> bool {
        match code {
            Key::Escape => {
                self.close();
                return false;
            }
            Key::I => {
                if shift {
                    session.on_radius_increase_requested();
                } else {
                    session.on_radius_decrease_requested();
                }
            }
            Key::Up => {
                session.on_radius_increase_requested();
            }
            Key::Down => {
                session.on_radius_decrease_requested();
            }
            Key::Space => self.flags.toggle(Flags::PAUSE),
            Key::F3 => self.flags.toggle(Flags::DRAW_GUI),
            Key::F5 => self.init(!shift),
            Key::H => {
                self.flags.toggle(Flags::SHOW_CURSOR);
                if let Some(window) = self.window.as_mut() {
                    window.set_mouse_cursor_visible(self.flags.contains(Flags::SHOW_CURSOR));
                }
            }
            Key::F | Key::F11 => {
                self.flags.toggle(Flags::FULLSCREEN);
                self.init(false);
            }
            Key::RBracket => {
                if self.ctx_settings.antialiasing_level < 16 {
                    self.ctx_settings.antialiasing_level += 1;
                }
            }
            Key::LBracket => {
                if self.ctx_settings.antialiasing_level > 0 {
                    self.ctx_settings.antialiasing_level -= 1;
                }
            }
            Key::Num9 => {
                if shift {
                    let step = if alt { 1 } else { 10 };
                    self.fps_limit -= self.fps_limit.min(step);
                    self.apply_fps_limit();
                }
            }
            Key::Num0 => {
                if shift {
                    // Shift + Ctrl + 0 is swallowed on Windows, so Alt selects
                    // the fine step here and in the Num9 arm.
                    self.fps_limit += if alt { 1 } else { 10 };
                    self.apply_fps_limit();
                }
            }
            _ => (),
        }
        true
    }

    fn apply_fps_limit(&mut self) {
        if let Some(window) = self.window.as_mut() {
            window.set_framerate_limit(self.fps_limit);
        }
    }

    fn close(&mut self) {
        if let Some(window) = self.window.as_mut() {
            window.close();
        }
    }

    //
    // Update code
    //

    pub fn request_update(&mut self, session: &Spirograph) {
        let fps = self.get_fps();
        self.count_frame();

        if self.curve_revision != Some(session.revision()) || self.curve_size != self.size {
            self.rebuild_curve(session);
        }

        if !self.flags.contains(Flags::DRAW_GUI) {
            return;
        }

        let angles = session.angles();
        self.debug_text = format!(
            include_str!("debug_screen_template.txt"),
            fps,
            if self.fps_limit > 0 {
                format!(
                    " (max: {} - {:6.2}%)",
                    self.fps_limit,
                    fps / self.fps_limit as f32 * 100.0
                )
            } else {
                "".to_owned()
            },
            if self.flags.contains(Flags::PAUSE) {
                "[paused]"
            } else {
                ""
            },
            session.inner_radius(),
            session.outer_radius(),
            angles.orbit,
            angles.roll,
            angles.saved_orbit,
            angles.saved_roll,
            session.saved_steps(),
            session.steps(),
            session.last_replay_steps(),
            session.curve_path().points().len(),
            self.size.x,
            self.size.y,
            self.window
                .as_ref()
                .map_or(0, |window| window.settings().antialiasing_level),
            self.ctx_settings.antialiasing_level,
            self.flags.bits()
        );
    }

    fn get_fps(&mut self) -> f32 {
        let current_time = self.fps_clock.restart().as_seconds();
        1.0 / current_time
    }

    fn count_frame(&mut self) {
        self.frames += 1;
        let elapsed = self.frames_clock.elapsed_time().as_seconds();
        if elapsed > 1.0 {
            debug!(fps = self.frames as f32 / elapsed, "framerate");
            self.frames = 0;
            self.frames_clock.restart();
        }
    }

    fn rebuild_curve(&mut self, session: &Spirograph) {
        let size = self.size;
        let scale = Self::get_scale(&size, session.outer_radius());
        let color = to_color(self.palette.curve);

        self.curve_vertices.clear();
        self.curve_vertices.extend(session.curve_path().points().iter().map(|point| {
            Vertex::with_pos_color(Self::world_to_screen_point(point, scale, size), color)
        }));

        self.curve_revision = Some(session.revision());
        self.curve_size = self.size;
        debug!(
            revision = session.revision(),
            vertices = self.curve_vertices.len(),
            "curve vertices rebuilt"
        );
    }

    //
    // Draw code
    //

    pub fn request_draw(&mut self, session: &Spirograph, mode: RenderMode) {
        let size = self.size;
        let scale = Self::get_scale(&size, session.outer_radius());
        let frame = session.current_frame();
        let outline = session.circle_outline();
        let inner_radius = session.inner_radius() as f64;

        let outer_circle = Self::circle_vertices(
            outline,
            &Point::origin(),
            session.outer_radius() as f64,
            to_color(self.palette.outer),
            scale,
            size,
        );
        let inner_circle = Self::circle_vertices(
            outline,
            &frame.center,
            inner_radius,
            to_color(self.palette.inner),
            scale,
            size,
        );
        let seed_dot = Self::circle_vertices(
            outline,
            &frame.seed,
            SEED_RADIUS,
            to_color(self.palette.curve),
            scale,
            size,
        );

        let heading = frame.orbit_angle + frame.roll_angle;
        let rim = Point::new(
            frame.center.x + inner_radius * heading.cos(),
            frame.center.y + inner_radius * heading.sin(),
        );
        let spoke_color = to_color(self.palette.inner);
        let spoke = [
            Vertex::with_pos_color(Self::world_to_screen_point(&frame.center, scale, size), spoke_color),
            Vertex::with_pos_color(Self::world_to_screen_point(&rim, scale, size), spoke_color),
        ];

        let Some(render_target) = self.window.as_mut() else {
            return;
        };

        render_target.clear(to_color(self.palette.background));
        if mode.show_curve {
            Self::draw_strip(render_target, &self.curve_vertices);
        }
        Self::draw_strip(render_target, &outer_circle);
        Self::draw_strip(render_target, &inner_circle);
        render_target.draw_primitives(&spoke, PrimitiveType::LINES, &RenderStates::DEFAULT);
        Self::draw_strip(render_target, &seed_dot);

        if self.flags.contains(Flags::DRAW_GUI) && !self.flags.contains(Flags::FONT_FAILURE) {
            if let Some(font) = self.font.as_ref() {
                let background = to_color(self.palette.background);
                let mut debug_label = Text::new(&self.debug_text, font, 16);
                debug_label.set_fill_color(Color::WHITE);
                debug_label.set_outline_color(background);
                debug_label.set_outline_thickness(1.5);
                debug_label.set_position((10.0, 10.0));
                render_target.draw(&debug_label);
            }
        }
    }

    pub fn draw_strip(render_target: &mut dyn RenderTarget, vertices: &[Vertex]) {
        render_target.draw_primitives(vertices, PrimitiveType::LINE_STRIP, &RenderStates::DEFAULT);
    }

    /// The unit outline scaled to `radius` and moved to `center`, in screen space.
    pub fn circle_vertices(
        outline: &CircleOutline,
        center: &Point,
        radius: f64,
        color: Color,
        scale: f32,
        size: Vector2u,
    ) -> Vec<Vertex> {
        outline
            .points()
            .iter()
            .map(|unit| {
                let point = Point::new(center.x + unit.x * radius, center.y + unit.y * radius);
                Vertex::with_pos_color(Self::world_to_screen_point(&point, scale, size), color)
            })
            .collect()
    }

    //
    // Coordinate mapping code
    //

    pub fn get_radius(size: &Vector2u) -> f32 {
        size.x.min(size.y) as f32 / 2.0 - 50.0
    }

    /// Pixels per world unit so that the outer circle fits the window.
    pub fn get_scale(size: &Vector2u, outer_radius: u32) -> f32 {
        Self::get_radius(size).max(1.0) / outer_radius as f32
    }

    pub fn world_to_screen_point(point: &Point, scale: f32, size: Vector2u) -> Vector2f {
        Vector2f::new(
            point.x as f32 * scale + size.x as f32 / 2.0,
            -(point.y as f32) * scale + size.y as f32 / 2.0,
        )
    }
}

fn to_color(color: RgbColor) -> Color {
    Color::rgb(color.r, color.g, color.b)
}
