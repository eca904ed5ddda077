/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The title phase draws its own screen (banner, menu, controls panel).
/// Every other phase uses this layout (rows):
///   0            HUD: level, items carried, session flags
///   2..2+h       board, centered horizontally, 2 columns per grid cell
///   2+h+1        level text
///   2+h+2        message bar
///   2+h+4        key help
///
/// Per grid cell, later layers win:
///   goal / hole / stone  →  trigger / collectible  →  wall  →  container  →  player
///
/// Moving actors are drawn at their interpolated position rounded to the
/// nearest cell, so a push visibly slides instead of jumping.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Body, Entity, GoalKind, Position};
use crate::domain::motion::FallState;
use crate::sim::title::MenuItem;
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],   // one UTF-8 scalar
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit dark background for every "empty" terminal cell. Using the
    /// same RGB for `Clear(ClearType::All)` and every cell keeps VTE
    /// terminals from showing lines between rows.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 4],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel used to invalidate the back buffer: differs from any real cell.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
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
        cell.ch = [0; 4];
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn from_char_wide(c: char, bg: Color) -> Self {
        let mut cell = Self::from_char(c, Color::Reset, bg);
        cell.wide = true;
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
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
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

    /// Put a two-column glyph at (col, row).
    fn put_glyph(&mut self, col: usize, row: usize, g: Glyph) {
        match g {
            Glyph::Pair(c0, c1, fg, bg) => {
                self.set(col, row, Cell::from_char(c0, fg, bg));
                self.set(col + 1, row, Cell::from_char(c1, fg, bg));
            }
            Glyph::Wide(c, bg) => {
                self.set(col, row, Cell::from_char_wide(c, bg));
                let mut cont = Cell::WIDE_CONT;
                cont.bg = Cell::norm_bg(bg);
                self.set(col + 1, row, cont);
            }
        }
    }
}

// ── Glyphs ──

/// What one grid cell looks like: two narrow chars, or one wide emoji.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Glyph {
    Pair(char, char, Color, Color),
    Wide(char, Color),
}

impl Glyph {
    fn bg(self) -> Color {
        match self {
            Glyph::Pair(_, _, _, bg) | Glyph::Wide(_, bg) => bg,
        }
    }

    /// Same glyph over a different background (keeps underlays visible).
    fn over(self, bg: Color) -> Glyph {
        match self {
            Glyph::Pair(c0, c1, fg, _) => Glyph::Pair(c0, c1, fg, bg),
            Glyph::Wide(c, _) => Glyph::Wide(c, bg),
        }
    }
}

const FLOOR: Glyph = Glyph::Pair(' ', ' ', Color::Reset, Color::Reset);
const GOAL_BG: Color = Color::Rgb { r: 60, g: 55, b: 10 };
const GOAL_DONE_BG: Color = Color::Rgb { r: 20, g: 90, b: 40 };
const PIT_BG: Color = Color::Rgb { r: 5, g: 5, b: 10 };
const STONE_FG: Color = Color::Rgb { r: 110, g: 200, b: 120 };
const CONTAINER_FG: Color = Color::Rgb { r: 255, g: 150, b: 40 };
const CONTAINER_EMPTY_FG: Color = Color::Rgb { r: 140, g: 110, b: 80 };

/// Everything static at `pos`: the layers below the actors.
fn floor_glyph(w: &WorldState, pos: Position) -> Glyph {
    let mut glyph = FLOOR;
    let mut wall = false;
    let mut hole = false;
    let mut stone = None;
    let mut goal = None;
    let mut pickup = None;

    for &id in w.registry.entities_at(pos) {
        let Some(e) = w.registry.get(id) else { continue };
        match &e.body {
            Body::Wall => wall = true,
            Body::Hole => hole = true,
            Body::SteppingStone(g) if g.visible => stone = Some(g.stage()),
            Body::Goal(g) => goal = Some(*g),
            Body::Trigger(t) if !t.consumed => {
                pickup = Some(Glyph::Pair('◆', ' ', Color::Rgb { r: 220, g: 90, b: 255 }, Color::Reset));
            }
            Body::Collectible(c) if !c.consumed => pickup = Some(Glyph::Wide('📄', Color::Reset)),
            _ => {}
        }
    }

    if wall {
        return Glyph::Pair('█', '█', Color::Rgb { r: 120, g: 120, b: 120 }, Color::Rgb { r: 70, g: 70, b: 70 });
    }

    if let Some(g) = goal {
        let bg = if g.satisfied { GOAL_DONE_BG } else { GOAL_BG };
        glyph = match g.kind {
            GoalKind::Container => Glyph::Pair('[', ']', Color::Rgb { r: 255, g: 220, b: 50 }, bg),
            GoalKind::Actor => Glyph::Pair('(', ')', Color::Rgb { r: 100, g: 200, b: 255 }, bg),
        };
    }

    if hole {
        glyph = match stone {
            Some(0) => Glyph::Pair('░', '░', STONE_FG, PIT_BG),
            Some(1) => Glyph::Pair('▒', '▒', STONE_FG, PIT_BG),
            Some(2) => Glyph::Pair('▓', '▓', STONE_FG, PIT_BG),
            Some(_) => Glyph::Pair('▓', '▓', STONE_FG, Color::Rgb { r: 30, g: 70, b: 35 }),
            None => Glyph::Pair(' ', ' ', Color::Reset, PIT_BG),
        };
    }

    match pickup {
        Some(p) => p.over(glyph.bg()),
        None => glyph,
    }
}

/// Shrinking marker for an actor mid-fall; None once the fall is done.
fn fall_char(fall: &FallState) -> Option<char> {
    if fall.is_complete() { return None; }
    Some(match fall.progress {
        p if p < 0.33 => '●',
        p if p < 0.66 => '•',
        _ => '·',
    })
}

/// Dull when empty, bright once full.
fn container_color(ratio: f32) -> Color {
    let t = ratio.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    match (CONTAINER_EMPTY_FG, CONTAINER_FG) {
        (Color::Rgb { r: r0, g: g0, b: b0 }, Color::Rgb { r: r1, g: g1, b: b1 }) => {
            Color::Rgb { r: mix(r0, r1), g: mix(g0, g1), b: mix(b0, b1) }
        }
        _ => CONTAINER_FG,
    }
}

/// The actor drawn on top of `under`, or None if nothing is left to draw.
fn actor_glyph(e: &Entity, under: Color) -> Option<Glyph> {
    match &e.body {
        Body::Player(p) => {
            if p.actor.fall.falling || p.actor.fall.is_complete() {
                return fall_char(&p.actor.fall).map(|c| Glyph::Pair(c, ' ', Color::White, under));
            }
            Some(Glyph::Wide('🧍', under))
        }
        Body::Container(c) => {
            let fg = container_color(c.fill_ratio());
            if c.actor.fall.falling || c.actor.fall.is_complete() {
                return fall_char(&c.actor.fall).map(|ch| Glyph::Pair(ch, ' ', fg, under));
            }
            if c.needs_filling() {
                let left = (c.capacity - c.filled).min(9);
                let digit = char::from_digit(left, 10).unwrap_or('+');
                Some(Glyph::Pair('▣', digit, fg, under))
            } else {
                Some(Glyph::Pair('▐', '▌', fg, under))
            }
        }
        _ => None,
    }
}

/// Nearest grid cell to an interpolated draw position.
fn snap_to_cell(w: &WorldState, (x, y): (f32, f32)) -> Option<Position> {
    let pos = Position::new(x.round().max(0.0) as usize, y.round().max(0.0) as usize);
    w.in_bounds(pos).then_some(pos)
}

// ── HUD ──

/// Top status line: level, items carried and session flags.
fn hud_line(w: &WorldState, pad_connected: bool) -> String {
    let mut flags = String::new();
    if w.paused { flags.push_str("  [PAUSED]"); }
    if w.muted { flags.push_str("  [MUTED]"); }
    if pad_connected { flags.push_str("  [PAD]"); }
    format!(
        " Level {} ({}/{})  {}   Items: {}{} ",
        w.level_id, w.current_level + 1, w.total_levels, w.level_name,
        w.inventory(), flags,
    )
}

// ── Renderer ──

/// Each game cell = 2 terminal columns.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const OVERLAY_BG: Color = Color::Rgb { r: 40, g: 40, b: 40 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    last_level: Option<usize>,
    /// Frames drawn; drives blinking even while the simulation is paused.
    frame: u64,
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
            last_phase: None,
            last_level: None,
            frame: 0,
            enhanced_keys: false,
        }
    }

    /// Enter raw mode on the alternate screen. Returns true when the
    /// terminal will report key releases.
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
        // Force full repaint on first frame.
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

    /// Draw one frame. `pad_connected` lights the HUD gamepad flag.
    pub fn render(&mut self, world: &WorldState, pad_connected: bool) -> io::Result<()> {
        self.frame = self.frame.wrapping_add(1);

        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.invalidate()?;
        }

        // Phase or level change: clear for a clean transition
        if self.last_phase != Some(world.phase) || self.last_level != Some(world.current_level) {
            self.invalidate()?;
            self.last_phase = Some(world.phase);
            self.last_level = Some(world.current_level);
        }

        self.front.clear();
        match world.phase {
            Phase::Title => self.compose_title(world),
            Phase::Won => {
                self.compose_game(world, pad_connected);
                self.compose_won(world);
            }
            Phase::Lost => {
                self.compose_game(world, pad_connected);
                self.compose_lost();
            }
            Phase::Playing => {
                self.compose_game(world, pad_connected);
                if world.paused { self.compose_pause_overlay(); }
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.back.cells.fill(Cell::INVALID);
        queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors, never ResetColor: the terminal default may
        // differ from BASE_BG.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
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

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    /// Left terminal column of the board.
    fn board_x(&self, w: &WorldState) -> usize {
        self.front.width.saturating_sub(w.width * CELL_W) / 2
    }

    fn compose_title(&mut self, w: &WorldState) {
        let banner = [
            r" _  _ _       _          ___         _    ",
            r"| \| (_)_ __ | |__  ___ | _ \_  _ __| |_  ",
            r"| .` | | '  \| '_ \/ _ \|   / || (_-< ' \ ",
            r"|_|\_|_|_|_|_|_.__/\___/|_|_\\_,_/__/_||_|",
        ];
        let banner_w = banner.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let bx = self.front.width.saturating_sub(banner_w) / 2;
        for (i, line) in banner.iter().enumerate() {
            self.front.put_str(bx, 2 + i, line, Color::Rgb { r: 255, g: 200, b: 50 }, Color::Reset);
        }

        let tagline = "Fill the buckets and cross the pits";
        let tx = self.front.width.saturating_sub(tagline.chars().count()) / 2;
        self.front.put_str(tx, 7, tagline, Color::Rgb { r: 180, g: 140, b: 50 }, Color::Reset);

        // ── Menu ──
        let menu_base = 10;
        let mx = bx + 4;
        for (i, item) in MenuItem::ALL.iter().enumerate() {
            let (marker, fg) = if i == w.title.selected {
                ("▶ ", Color::Rgb { r: 80, g: 255, b: 80 })
            } else {
                ("  ", Color::White)
            };
            self.front.put_str(mx, menu_base + i, &format!("{marker}{}", item.label()), fg, Color::Reset);
        }

        // ── Controls panel or hint ──
        let panel_base = menu_base + MenuItem::ALL.len() + 1;
        if w.title.showing_controls {
            let controls = [
                "Controls",
                "  Arrows / WASD   Move, push a full bucket",
                "  R               Restart level",
                "  N / Enter       Next level after a win",
                "  P / Esc         Pause",
                "  M               Sound on/off",
                "  Q               Quit",
                "Esc closes this panel",
            ];
            for (i, line) in controls.iter().enumerate() {
                let fg = if i == 0 { Color::Rgb { r: 255, g: 200, b: 50 } } else { Color::White };
                self.front.put_str(mx, panel_base + i, line, fg, Color::Reset);
            }
        } else {
            self.front.put_str(mx, panel_base, "↑↓ Select   Enter Confirm   Q Quit", Color::DarkGrey, Color::Reset);
        }

        // ── Message bar ──
        if !w.message.is_empty() {
            let msg_row = self.front.height.saturating_sub(1);
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &format!(" ◈ {} ", w.message), Color::Black, MSG_BG);
        }
    }

    fn compose_game(&mut self, w: &WorldState, pad_connected: bool) {
        // ── HUD row ──
        let hud = hud_line(w, pad_connected);
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Board ──
        let ox = self.board_x(w);
        for gy in 0..w.height {
            let row = MAP_ROW + gy;
            if row >= self.front.height { break; }
            for gx in 0..w.width {
                let col = ox + gx * CELL_W;
                if col + 1 >= self.front.width { break; }
                self.front.put_glyph(col, row, floor_glyph(w, Position::new(gx, gy)));
            }
        }
        self.compose_actors(w, ox);

        // ── Level text ──
        let text_row = MAP_ROW + w.height + 1;
        if !w.level_text.is_empty() {
            self.front.put_str(1, text_row, &w.level_text, Color::Rgb { r: 180, g: 180, b: 200 }, Color::Reset);
        }

        // ── Message bar ──
        let msg_row = text_row + 1;
        if msg_row < self.front.height && !w.message.is_empty() {
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &format!(" ◈ {} ", w.message), Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help_row = msg_row + 2;
        if help_row < self.front.height {
            let help = " Arrows/WASD:Move  R:Restart  N:Next  P/Esc:Pause  M:Mute  Q:Quit";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    /// Containers first, then the player, so the player is always on top.
    fn compose_actors(&mut self, w: &WorldState, ox: usize) {
        let mut actors: Vec<&Entity> = w.registry.iter_registered()
            .map(|(_, e)| e)
            .filter(|e| e.kind().is_actor())
            .collect();
        actors.sort_by_key(|e| e.as_player().is_some());

        for e in actors {
            let Some(cell) = snap_to_cell(w, e.render_pos()) else { continue };
            let row = MAP_ROW + cell.y;
            let col = ox + cell.x * CELL_W;
            if row >= self.front.height || col + 1 >= self.front.width { continue; }
            let under = floor_glyph(w, cell).bg();
            if let Some(g) = actor_glyph(e, under) {
                self.front.put_glyph(col, row, g);
            }
        }
    }

    /// A centered box over the board with a title and lines below it.
    fn compose_box(&mut self, title: &str, title_fg: Color, lines: &[&str]) {
        let inner = lines.iter().chain(std::iter::once(&title))
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);
        let box_w = (inner + 4).min(self.front.width);
        let box_h = lines.len() + 4;
        let box_x = self.front.width.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + 1;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::from_char(' ', Color::Reset, OVERLAY_BG));
            }
        }
        let tx = box_x + box_w.saturating_sub(title.chars().count()) / 2;
        self.front.put_str(tx, box_y + 1, title, title_fg, OVERLAY_BG);
        for (i, l) in lines.iter().enumerate() {
            self.front.put_str(box_x + 2, box_y + 3 + i, l, Color::Rgb { r: 180, g: 180, b: 180 }, OVERLAY_BG);
        }
    }

    fn compose_won(&mut self, w: &WorldState) {
        let last = w.current_level + 1 >= w.total_levels;
        let lines: &[&str] = if last {
            &["Every level cleared!", "R  Play again from level 1", "Q  Quit"]
        } else {
            &["N  Next level", "R  Replay this level", "Q  Quit"]
        };
        self.compose_box("★ LEVEL COMPLETE ★", Color::Rgb { r: 255, g: 220, b: 50 }, lines);
    }

    fn compose_lost(&mut self) {
        self.compose_box(
            "✕ YOU FELL ✕",
            Color::Rgb { r: 255, g: 60, b: 60 },
            &["R  Retry this level", "Q  Quit"],
        );
    }

    fn compose_pause_overlay(&mut self) {
        let title = if (self.frame / 30) % 2 == 0 { "▶  PAUSED  ◀" } else { "   PAUSED   " };
        self.compose_box(
            title,
            Color::Rgb { r: 100, g: 200, b: 255 },
            &["P/Esc  Resume", "R      Restart level", "M      Toggle sound", "Q      Quit"],
        );
    }
}
