//! JavaScript bindings.
//!
//! The page owns the DOM, canvas and audio element; Rust owns game state.
//! Two ways to drive the rhythm game:
//! - construct an [`OsuGame`] and call `tick()` from your own animation loop, or
//! - call [`start_osu`] with a frame callback and let Rust run the
//!   `requestAnimationFrame` loop, feeding pointers through `osu_pointer_*`.

use std::cell::{Cell, RefCell};

use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlMediaElement, window};

use crate::charsheet::{CharacterSheet, DiceExpr};
use crate::config::GameConfig;
use crate::osu::{Game, InputEvent, PlayClock, Slider};
use crate::osu::beatmap::Point;
use crate::{minesweeper, tictactoe};

/// `HAVE_CURRENT_DATA`
const MEDIA_READY: u16 = 2;

fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(Into::into)
}

// --- Rhythm game ------------------------------------------------------------

#[wasm_bindgen]
pub struct OsuGame {
    game: Game,
    clock: PlayClock,
    audio: Option<HtmlMediaElement>,
}

#[wasm_bindgen]
impl OsuGame {
    /// `config` is an optional plain object; missing fields use defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<OsuGame, JsValue> {
        let cfg: GameConfig = if config.is_undefined() || config.is_null() {
            GameConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(OsuGame {
            game: Game::new(cfg),
            clock: PlayClock::new(performance_now()),
            audio: None,
        })
    }

    pub fn set_audio(&mut self, audio: HtmlMediaElement) {
        self.audio = Some(audio);
    }

    pub fn start(&mut self) {
        self.clock.reset(performance_now());
        if let Some(audio) = &self.audio {
            audio.set_current_time(0.0);
            let _ = audio.play();
        }
        self.game.start();
    }

    pub fn now(&self) -> f64 {
        self.clock.now(performance_now(), self.audio_position())
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        let at = self.now();
        self.game.push_input(InputEvent::down(x, y, at));
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let at = self.now();
        self.game.push_input(InputEvent::moved(x, y, at));
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) {
        let at = self.now();
        self.game.push_input(InputEvent::up(x, y, at));
    }

    pub fn add_slider(&mut self, start_ms: f64, end_ms: f64, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.game
            .add_slider(Slider::new(start_ms, end_ms, Point::new(x1, y1), Point::new(x2, y2)));
    }

    pub fn tick(&mut self) -> Result<JsValue, JsValue> {
        let was_running = self.game.is_running();
        let frame = self.game.tick(self.now());
        if was_running && !frame.running {
            if let Some(audio) = &self.audio {
                let _ = audio.pause();
            }
        }
        to_js(&frame)
    }

    pub fn pause(&mut self) {
        if !self.game.is_running() || self.game.is_paused() {
            return;
        }
        self.clock.pause(performance_now());
        if let Some(audio) = &self.audio {
            let _ = audio.pause();
        }
        self.game.pause();
    }

    pub fn resume(&mut self) {
        if !self.game.is_paused() {
            return;
        }
        self.clock.resume(performance_now());
        if let Some(audio) = &self.audio {
            let _ = audio.play();
        }
        self.game.resume();
    }

    pub fn running(&self) -> bool {
        self.game.is_running()
    }

    pub fn score(&self) -> u32 {
        self.game.session().score
    }

    pub fn combo(&self) -> u32 {
        self.game.session().combo
    }

    pub fn max_combo(&self) -> u32 {
        self.game.session().max_combo
    }

    pub fn summary(&self) -> Result<JsValue, JsValue> {
        to_js(&self.game.summary())
    }
}

impl OsuGame {
    fn audio_position(&self) -> Option<f64> {
        self.audio
            .as_ref()
            .filter(|a| a.ready_state() >= MEDIA_READY && !a.paused() && a.duration() > 0.0)
            .map(|a| a.current_time() * 1000.0)
    }
}

// --- Rust-driven loop -------------------------------------------------------

struct OsuSession {
    game: OsuGame,
    on_frame: js_sys::Function,
}

thread_local! {
    static OSU_STATE: RefCell<Option<OsuSession>> = const { RefCell::new(None) };
    // whether a frame is currently requested
    static LOOP_ACTIVE: Cell<bool> = const { Cell::new(false) };
    // one closure per page, shared by every play
    static OSU_LOOP: Closure<dyn FnMut(f64)> = Closure::wrap(Box::new(osu_frame) as Box<dyn FnMut(f64)>);
}

/// Starts a play and drives it with `requestAnimationFrame`, handing every
/// frame object to `on_frame`. Calling it again replaces the running play.
#[wasm_bindgen]
pub fn start_osu(
    config: JsValue,
    audio: Option<HtmlMediaElement>,
    on_frame: js_sys::Function,
) -> Result<(), JsValue> {
    let mut game = OsuGame::new(config)?;
    if let Some(audio) = audio {
        game.set_audio(audio);
    }
    // stop the old play first; it may share the audio element
    if let Some(mut old) = OSU_STATE.with(|s| s.borrow_mut().take()) {
        old.game.pause();
        log::info!("replaced running play");
    }
    game.start();
    OSU_STATE.with(|s| s.replace(Some(OsuSession { game, on_frame })));
    if !LOOP_ACTIVE.with(Cell::get) {
        request_frame();
    }
    Ok(())
}

fn with_osu<T>(f: impl FnOnce(&mut OsuGame) -> T) -> Option<T> {
    OSU_STATE.with(|cell| cell.borrow_mut().as_mut().map(|s| f(&mut s.game)))
}

#[wasm_bindgen]
pub fn osu_pointer_down(x: f64, y: f64) {
    with_osu(|g| g.pointer_down(x, y));
}

#[wasm_bindgen]
pub fn osu_pointer_move(x: f64, y: f64) {
    with_osu(|g| g.pointer_move(x, y));
}

#[wasm_bindgen]
pub fn osu_pointer_up(x: f64, y: f64) {
    with_osu(|g| g.pointer_up(x, y));
}

#[wasm_bindgen]
pub fn osu_pause() {
    with_osu(OsuGame::pause);
}

#[wasm_bindgen]
pub fn osu_resume() {
    with_osu(OsuGame::resume);
}

fn request_frame() {
    let requested = window().is_some_and(|w| {
        OSU_LOOP.with(|cb| w.request_animation_frame(cb.as_ref().unchecked_ref()).is_ok())
    });
    LOOP_ACTIVE.with(|a| a.set(requested));
}

fn osu_frame(_ts: f64) {
    LOOP_ACTIVE.with(|a| a.set(false));
    let step = OSU_STATE.with(|cell| {
        cell.borrow_mut()
            .as_mut()
            .map(|s| (s.game.tick(), s.on_frame.clone()))
    });
    match step {
        Some((Ok(frame), on_frame)) => {
            // the callback may start a new play, so it runs outside the borrow
            if let Err(e) = on_frame.call1(&JsValue::NULL, &frame) {
                log::error!("frame callback failed: {e:?}");
            }
        }
        Some((Err(e), _)) => log::error!("frame serialization failed: {e:?}"),
        None => return,
    }
    if with_osu(|g| g.running()).unwrap_or(false) && !LOOP_ACTIVE.with(Cell::get) {
        request_frame();
    }
}

// --- Tic-tac-toe ------------------------------------------------------------

#[wasm_bindgen]
pub struct TicTacToeGame {
    game: tictactoe::Game,
    rng: StdRng,
}

#[wasm_bindgen]
impl TicTacToeGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> TicTacToeGame {
        TicTacToeGame { game: tictactoe::Game::new(), rng: StdRng::from_entropy() }
    }

    /// Plays X at `idx`; returns the bot's reply cell or -1.
    pub fn play(&mut self, idx: usize) -> i32 {
        self.game.play(idx, &mut self.rng).map_or(-1, |i| i as i32)
    }

    pub fn cells(&self) -> Vec<String> {
        self.game
            .board
            .cells
            .iter()
            .map(|c| match c {
                Some(tictactoe::Mark::X) => "X".to_string(),
                Some(tictactoe::Mark::O) => "O".to_string(),
                None => String::new(),
            })
            .collect()
    }

    pub fn status(&self) -> Result<JsValue, JsValue> {
        to_js(&self.game.status)
    }

    pub fn restart(&mut self) {
        self.game.restart();
    }
}

impl Default for TicTacToeGame {
    fn default() -> Self {
        Self::new()
    }
}

// --- Minesweeper ------------------------------------------------------------

#[wasm_bindgen]
pub struct MinesweeperGame {
    board: minesweeper::Board,
    rng: StdRng,
}

#[wasm_bindgen]
impl MinesweeperGame {
    #[wasm_bindgen(constructor)]
    pub fn new(rows: usize, cols: usize, mines: usize) -> MinesweeperGame {
        MinesweeperGame {
            board: minesweeper::Board::new(rows, cols, mines),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn reveal(&mut self, row: usize, col: usize) -> Result<JsValue, JsValue> {
        let outcome = self.board.reveal(row, col, &mut self.rng);
        to_js(&outcome)
    }

    pub fn toggle_flag(&mut self, row: usize, col: usize) -> bool {
        self.board.toggle_flag(row, col)
    }

    pub fn board(&self) -> Result<JsValue, JsValue> {
        to_js(&self.board)
    }
}

// --- Character sheet --------------------------------------------------------

/// Rolls e.g. `"2d6+3"` and returns `"[4, 2] +3 = 9"`.
#[wasm_bindgen]
pub fn roll_dice(expr: &str) -> Result<String, JsValue> {
    let dice: DiceExpr = expr.parse().map_err(|e: anyhow::Error| JsValue::from_str(&e.to_string()))?;
    Ok(dice.roll(&mut StdRng::from_entropy()).to_string())
}

#[wasm_bindgen]
pub fn character_stats(sheet: JsValue) -> Result<JsValue, JsValue> {
    let sheet: CharacterSheet = serde_wasm_bindgen::from_value(sheet)?;
    to_js(&sheet.derived())
}

#[wasm_bindgen]
pub fn export_character(sheet: JsValue) -> Result<String, JsValue> {
    let sheet: CharacterSheet = serde_wasm_bindgen::from_value(sheet)?;
    sheet.to_json().map_err(|e| JsValue::from_str(&e.to_string()))
}
