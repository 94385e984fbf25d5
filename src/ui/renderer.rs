/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The sphere variant is drawn top-down (x across, z up the screen); the
/// box variant is drawn side-on (x across, y up). World units are scaled
/// to fit the terminal, so the map always shows the whole level.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use glam::{Vec2, Vec3};

use crate::domain::entity::{ItemKind, Platform, Variant, ZoneModel};
use crate::domain::jump::JumpPhase;
use crate::domain::zone::Zone;
use crate::sim::event::{Burst, GameEvent, LightMode};
use crate::sim::world::Session;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every "empty" terminal cell, so the
    /// gaps between rows match the cells on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::from_char(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Viewport: world plane → map grid
// ══════════════════════════════════════════════════════════════

/// Each map cell is CELL_W terminal columns wide.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const METER_ROW: usize = 1;
const MAP_ROW: usize = 2;

/// World units shown above the floor in the side view.
const SIDE_VIEW_HEIGHT: f32 = 12.0;

/// Ticks a burst stays visible.
const BURST_TICKS: u32 = 18;

#[derive(Clone, Copy, Debug)]
struct Viewport {
    min: Vec2,
    /// Map cells per world unit, per axis.
    scale: Vec2,
    view_w: usize,
    view_h: usize,
}

impl Viewport {
    fn fit(variant: Variant, extent: f32, ground: f32, view_w: usize, view_h: usize) -> Self {
        let span_u = 2.0 * extent;
        let span_v = match variant {
            Variant::Sphere3d => 2.0 * extent,
            Variant::Box2d => SIDE_VIEW_HEIGHT,
        };
        let min_v = match variant {
            Variant::Sphere3d => -extent,
            Variant::Box2d => ground - 1.0,
        };
        Viewport {
            min: Vec2::new(-extent, min_v),
            scale: Vec2::new(
                view_w.saturating_sub(1) as f32 / span_u,
                view_h.saturating_sub(1) as f32 / span_v,
            ),
            view_w,
            view_h,
        }
    }

    /// Project onto the map plane: (x, z) top-down or (x, y) side-on.
    fn plane(variant: Variant, p: Vec3) -> Vec2 {
        match variant {
            Variant::Sphere3d => Vec2::new(p.x, p.z),
            Variant::Box2d => Vec2::new(p.x, p.y),
        }
    }

    /// Map cell for a plane point; +v is up the screen.
    fn to_cell(&self, uv: Vec2) -> Option<(usize, usize)> {
        let gx = ((uv.x - self.min.x) * self.scale.x).round();
        let gv = ((uv.y - self.min.y) * self.scale.y).round();
        if gx < 0.0 || gv < 0.0 {
            return None;
        }
        let (gx, gv) = (gx as usize, gv as usize);
        if gx >= self.view_w || gv >= self.view_h {
            return None;
        }
        Some((gx, self.view_h - 1 - gv))
    }

    /// Inclusive cell rectangle covered by a plane box, clipped to the view.
    fn cell_rect(&self, lo: Vec2, hi: Vec2) -> Option<(usize, usize, usize, usize)> {
        let x0 = ((lo.x - self.min.x) * self.scale.x).round().max(0.0);
        let x1 = ((hi.x - self.min.x) * self.scale.x).round().min(self.view_w as f32 - 1.0);
        let v0 = ((lo.y - self.min.y) * self.scale.y).round().max(0.0);
        let v1 = ((hi.y - self.min.y) * self.scale.y).round().min(self.view_h as f32 - 1.0);
        if x0 > x1 || v0 > v1 {
            return None;
        }
        let top = self.view_h - 1 - v1 as usize;
        let bottom = self.view_h - 1 - v0 as usize;
        Some((x0 as usize, x1 as usize, top, bottom))
    }
}

/// Heading arrow for a view yaw; yaw 0 faces +z, which is up on the map.
fn heading_arrow(yaw: f32) -> char {
    const ARROWS: [char; 8] = ['↑', '↗', '→', '↘', '↓', '↙', '←', '↖'];
    let octant = (yaw / std::f32::consts::FRAC_PI_4).round() as i32;
    ARROWS[octant.rem_euclid(8) as usize]
}

fn burst_color(b: Burst) -> Color {
    match b {
        Burst::Cyan => Color::Rgb { r: 80, g: 230, b: 255 },
        Burst::Orange => Color::Rgb { r: 255, g: 150, b: 40 },
        Burst::Green => Color::Rgb { r: 80, g: 255, b: 80 },
        Burst::Yellow => Color::Rgb { r: 255, g: 230, b: 60 },
        Burst::Red => Color::Rgb { r: 255, g: 60, b: 60 },
        Burst::Blue => Color::Rgb { r: 90, g: 120, b: 255 },
    }
}

/// Short-lived particle ring spawned from a game event.
#[derive(Clone, Copy, Debug)]
struct Spark {
    pos: Vec3,
    color: Color,
    age: u32,
}

/// Host-side state the HUD shows alongside the session.
pub struct HostView<'a> {
    pub paused: bool,
    pub yaw: f32,
    pub profile: Option<&'a str>,
    pub frame: u32,
}

// ══════════════════════════════════════════════════════════════
// Renderer
// ══════════════════════════════════════════════════════════════

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    sparks: Vec<Spark>,
    enhanced_keys: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            sparks: Vec::new(),
            enhanced_keys: false,
        }
    }

    /// Enter raw mode and the alternate screen. Returns whether the terminal
    /// reports key releases.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);

        Ok(self.enhanced_keys)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Spawn bursts for this tick's events.
    pub fn push_events(&mut self, events: &[GameEvent]) {
        for (pos, burst) in events.iter().filter_map(GameEvent::burst) {
            self.sparks.push(Spark { pos, color: burst_color(burst), age: 0 });
        }
    }

    /// Age bursts by one simulation tick.
    pub fn tick_effects(&mut self) {
        for s in &mut self.sparks {
            s.age += 1;
        }
        self.sparks.retain(|s| s.age < BURST_TICKS);
    }

    pub fn render(&mut self, s: &Session, host: &HostView) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        let reserved_rows = MAP_ROW + 4; // HUD + meter + msg + help
        let view_w = (self.term_w / CELL_W).max(1);
        let view_h = self.term_h.saturating_sub(reserved_rows).max(1);
        let extent = s.tuning.world_boundary + 1.0;
        let vp = Viewport::fit(s.variant, extent, s.tuning.ground_level, view_w, view_h);

        self.front.clear();
        self.compose_hud(s, host);
        self.compose_map(s, host, &vp);
        self.compose_bars(s, &vp);
        if host.paused {
            self.compose_pause_overlay(host, &vp);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: HUD ──

    fn compose_hud(&mut self, s: &Session, host: &HostView) {
        let hud_bg = Color::Rgb { r: 20, g: 20, b: 60 };
        let t = &s.tuning;
        let p = &s.player;

        let zone = match (s.variant.zone_model(), s.zone()) {
            (ZoneModel::Flat, _) => "",
            (_, Zone::Cell) => "CELL",
            (_, Zone::Space) => "SPACE",
        };
        let charge = if !s.variant.charges_jump() {
            String::new()
        } else if s.zone() == Zone::Cell {
            format!("CHG:{:>3}%", (p.jump.ratio(t.max_jump_charge) * 100.0).round() as u32)
        } else {
            "CHG:N/A".to_string()
        };
        let hud = format!(
            " HP:{}/{}  GRAV:{}  {}  {:<5} ({:>6.1},{:>5.1},{:>6.1})  {}  CP:{}/{}  THREATS:{}  {}",
            p.health, p.max_health,
            if s.gravity_enabled { "ON" } else { "OFF" },
            s.light.label(),
            zone,
            p.pos.x, p.pos.y, p.pos.z,
            charge,
            s.checkpoints.len(), t.max_checkpoints,
            s.enemies_in_range(),
            host.profile.map(|n| format!("[{}]", n)).unwrap_or_default(),
        );
        self.front.fill_row(HUD_ROW, hud_bg);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, hud_bg);

        // Health bar, then the charge meter while charging
        let health_frac = if p.max_health > 0 {
            (p.health as f32 / p.max_health as f32).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let hp_col = if health_frac > 0.5 {
            Color::Rgb { r: 80, g: 255, b: 80 }
        } else if health_frac > 0.25 {
            Color::Rgb { r: 255, g: 220, b: 50 }
        } else {
            Color::Rgb { r: 255, g: 60, b: 60 }
        };
        self.put_meter(1, "HP ", health_frac, hp_col);

        if p.jump.phase() == JumpPhase::Charging {
            let ratio = p.jump.ratio(t.max_jump_charge);
            self.put_meter(20, "JUMP ", ratio, Color::Rgb { r: 80, g: 230, b: 255 });
        }
    }

    fn put_meter(&mut self, x: usize, label: &str, frac: f32, fg: Color) {
        const WIDTH: usize = 12;
        let filled = (frac * WIDTH as f32).round() as usize;
        let bar: String = (0..WIDTH).map(|i| if i < filled { '█' } else { '░' }).collect();
        self.front.put_str(x, METER_ROW, label, Color::DarkGrey, Color::Reset);
        self.front.put_str(x + label.chars().count(), METER_ROW, &bar, fg, Color::Reset);
    }

    // ── Compose: map ──

    fn compose_map(&mut self, s: &Session, host: &HostView, vp: &Viewport) {
        let map_bg = match s.light {
            LightMode::Dark => Cell::BASE_BG,
            LightMode::Light => Color::Rgb { r: 58, g: 58, b: 78 },
        };
        for row in 0..vp.view_h {
            for col in 0..vp.view_w {
                self.put_cell(col, row, ' ', ' ', Color::White, map_bg);
            }
        }

        // Cell boundary outline (top-down only)
        if s.variant.zone_model() == ZoneModel::CellAndSpace {
            let b = s.cell_bounds();
            let edge = Color::Rgb { r: 200, g: 120, b: 40 };
            if let Some((x0, x1, top, bottom)) =
                vp.cell_rect(Vec2::new(b.min_x, b.min_z), Vec2::new(b.max_x, b.max_z))
            {
                for col in x0..=x1 {
                    self.put_cell(col, top, '·', '·', edge, map_bg);
                    self.put_cell(col, bottom, '·', '·', edge, map_bg);
                }
                for row in top..=bottom {
                    self.put_cell(x0, row, '·', ' ', edge, map_bg);
                    self.put_cell(x1, row, '·', ' ', edge, map_bg);
                }
            }
        }

        for plat in &s.world.platforms {
            // Higher platforms are drawn brighter
            let lift = ((plat.top() - s.tuning.ground_level) * 20.0).clamp(0.0, 120.0) as u8;
            let fg = Color::Rgb { r: 100 + lift, g: 110 + lift, b: 130 + lift };
            self.fill_box(s.variant, vp, plat, '▒', fg, Color::Rgb { r: 45, g: 50, b: 70 });
        }
        for wall in &s.world.walls {
            self.fill_box(s.variant, vp, wall, '█', Color::Rgb { r: 120, g: 120, b: 120 }, Color::Rgb { r: 70, g: 70, b: 70 });
        }

        for cp in s.checkpoints.iter() {
            self.put_at(s.variant, vp, cp.pos, '◊', Color::Rgb { r: 80, g: 255, b: 80 }, map_bg);
        }
        for item in s.items.iter().filter(|i| !i.collected) {
            let (ch, fg) = match item.kind {
                ItemKind::Health => ('+', Color::Rgb { r: 80, g: 255, b: 80 }),
                ItemKind::GravitySwitch => ('⇅', Color::Rgb { r: 255, g: 230, b: 60 }),
                ItemKind::Weapon => ('†', Color::Rgb { r: 255, g: 90, b: 90 }),
            };
            self.put_at(s.variant, vp, item.pos, ch, fg, map_bg);
        }
        for enemy in &s.enemies {
            self.put_at(s.variant, vp, enemy.pos, '◆', Color::Rgb { r: 255, g: 60, b: 60 }, map_bg);
        }

        for i in 0..self.sparks.len() {
            let spark = self.sparks[i];
            let radius = 1 + spark.age / 6;
            if let Some((col, row)) = vp.to_cell(Viewport::plane(s.variant, spark.pos)) {
                let r = radius as i32;
                for (dx, dy) in [(r, 0), (-r, 0), (0, r), (0, -r), (r, r), (-r, -r), (r, -r), (-r, r)] {
                    let c = col as i32 + dx;
                    let y = row as i32 + dy;
                    if c >= 0 && y >= 0 && (c as usize) < vp.view_w && (y as usize) < vp.view_h {
                        self.put_cell(c as usize, y as usize, '*', ' ', spark.color, map_bg);
                    }
                }
            }
        }

        // Player last so it is never hidden
        let p = &s.player;
        let player_fg = if host.frame % 8 < 4 || p.health > p.max_health / 4 {
            Color::Rgb { r: 80, g: 230, b: 255 }
        } else {
            Color::Rgb { r: 255, g: 60, b: 60 }
        };
        if let Some((col, row)) = vp.to_cell(Viewport::plane(s.variant, p.pos)) {
            let second = match s.variant {
                Variant::Sphere3d => heading_arrow(host.yaw),
                Variant::Box2d => ' ',
            };
            self.put_cell(col, row, '@', second, player_fg, map_bg);
        }
    }

    fn put_cell(&mut self, col: usize, row: usize, c0: char, c1: char, fg: Color, bg: Color) {
        let x = col * CELL_W;
        let y = MAP_ROW + row;
        self.front.set(x, y, Cell::from_char(c0, fg, bg));
        self.front.set(x + 1, y, Cell::from_char(c1, fg, bg));
    }

    fn put_at(&mut self, variant: Variant, vp: &Viewport, pos: Vec3, ch: char, fg: Color, bg: Color) {
        if let Some((col, row)) = vp.to_cell(Viewport::plane(variant, pos)) {
            self.put_cell(col, row, ch, ' ', fg, bg);
        }
    }

    fn fill_box(&mut self, variant: Variant, vp: &Viewport, plat: &Platform, ch: char, fg: Color, bg: Color) {
        let half = plat.half();
        let lo = Viewport::plane(variant, plat.center - half);
        let hi = Viewport::plane(variant, plat.center + half);
        if let Some((x0, x1, top, bottom)) = vp.cell_rect(lo, hi) {
            for row in top..=bottom {
                for col in x0..=x1 {
                    self.put_cell(col, row, ch, ch, fg, bg);
                }
            }
        }
    }

    // ── Compose: message + help bars ──

    fn compose_bars(&mut self, s: &Session, vp: &Viewport) {
        let msg_row = MAP_ROW + vp.view_h + 1;
        if msg_row < self.front.height && !s.message.is_empty() {
            let msg_bg = Color::Rgb { r: 200, g: 180, b: 50 };
            self.front.fill_row(msg_row, msg_bg);
            self.front.put_str(0, msg_row, &format!(" ◈ {} ", s.message), Color::Black, msg_bg);
        }

        let help_row = MAP_ROW + vp.view_h + 3;
        if help_row < self.front.height {
            let help = match s.variant {
                Variant::Sphere3d => " WASD:Move ←→:Turn SPACE:Jump/Up C:Down G:Grav L:Light E:Use K:Save R:Respawn X:Clear F1:Pause",
                Variant::Box2d => " A/D:Move SPACE:Jump G:Grav L:Light E:Use K:Save R:Respawn X:Clear F1:Pause",
            };
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    fn compose_pause_overlay(&mut self, host: &HostView, vp: &Viewport) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let blink = (host.frame / 40) % 2 == 0;

        let view_cols = vp.view_w * CELL_W;
        let box_w = 40_usize.min(view_cols);
        let box_h = 13_usize.min(vp.view_h);
        let box_x = view_cols.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + vp.view_h.saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::from_char(' ', Color::Reset, dim));
            }
        }

        let hdr = Color::Rgb { r: 255, g: 220, b: 50 };
        let key_c = Color::Rgb { r: 100, g: 200, b: 255 };
        let desc_c = Color::Rgb { r: 180, g: 180, b: 180 };
        let sep_c = Color::Rgb { r: 80, g: 80, b: 80 };

        let label = if blink { "║  ▶  PAUSED  ◀  ║" } else { "║     PAUSED      ║" };
        self.front.put_str(box_x + 11, box_y, "╔═════════════════╗", hdr, dim);
        self.front.put_str(box_x + 11, box_y + 1, label, hdr, dim);
        self.front.put_str(box_x + 11, box_y + 2, "╚═════════════════╝", hdr, dim);

        let y0 = box_y + 4;
        self.front.put_str(box_x + 2, y0, "F1  Resume", key_c, dim);
        self.front.put_str(box_x + 2, y0 + 1, "────────────────────────", sep_c, dim);
        self.front.put_str(box_x + 2, y0 + 2, "F5 Save profile", desc_c, dim);
        self.front.put_str(box_x + 2, y0 + 3, "F6 Next profile  F9 Load", desc_c, dim);
        self.front.put_str(box_x + 2, y0 + 4, "F8 Delete profile", desc_c, dim);
        self.front.put_str(box_x + 2, y0 + 5, "[ ] Gravity -/+", desc_c, dim);
        self.front.put_str(box_x + 2, y0 + 6, "────────────────────────", sep_c, dim);
        self.front.put_str(box_x + 2, y0 + 7, "ESC Quit", key_c, dim);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_down_puts_plus_z_at_the_top() {
        let vp = Viewport::fit(Variant::Sphere3d, 20.0, 0.0, 41, 41);
        assert_eq!(vp.to_cell(Vec2::new(0.0, 20.0)), Some((20, 0)));
        assert_eq!(vp.to_cell(Vec2::new(-20.0, -20.0)), Some((0, 40)));
        assert_eq!(vp.to_cell(Vec2::new(25.0, 0.0)), None);
    }

    #[test]
    fn side_view_starts_just_below_the_floor() {
        let vp = Viewport::fit(Variant::Box2d, 20.0, 0.0, 41, 13);
        // 12 rows over 12 units: y = -1 is the bottom row
        assert_eq!(vp.to_cell(Vec2::new(0.0, -1.0)), Some((20, 12)));
        assert_eq!(vp.to_cell(Vec2::new(0.0, 0.0)), Some((20, 11)));
    }

    #[test]
    fn cell_rect_clips_to_view() {
        let vp = Viewport::fit(Variant::Sphere3d, 10.0, 0.0, 21, 21);
        assert_eq!(vp.cell_rect(Vec2::new(-30.0, -1.0), Vec2::new(1.0, 1.0)), Some((0, 11, 9, 11)));
        assert_eq!(vp.cell_rect(Vec2::new(30.0, 0.0), Vec2::new(31.0, 1.0)), None);
    }

    #[test]
    fn heading_arrow_follows_yaw() {
        use std::f32::consts::{FRAC_PI_2, PI};
        assert_eq!(heading_arrow(0.0), '↑');
        assert_eq!(heading_arrow(FRAC_PI_2), '→');
        assert_eq!(heading_arrow(PI), '↓');
        assert_eq!(heading_arrow(-FRAC_PI_2), '←');
    }

    #[test]
    fn sparks_expire() {
        let mut r = Renderer::new();
        r.push_events(&[GameEvent::Interacted { pos: Vec3::ZERO }]);
        assert!(r.sparks.is_empty());
        r.push_events(&[GameEvent::ZoneEntered { pos: Vec3::ZERO }]);
        assert_eq!(r.sparks.len(), 1);
        for _ in 0..BURST_TICKS {
            r.tick_effects();
        }
        assert!(r.sparks.is_empty());
    }
}
