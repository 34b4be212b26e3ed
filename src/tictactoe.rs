//! Tic-tac-toe against a simple rule-based bot.
//!
//! The human is always X and moves first; the bot answers as O.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn other(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // cols
    [0, 4, 8],
    [2, 4, 6], // diags
];

const CENTER: usize = 4;
const CORNERS: [usize; 4] = [0, 2, 6, 8];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Board {
    pub cells: [Option<Mark>; 9],
}

impl Board {
    pub fn is_free(&self, idx: usize) -> bool {
        matches!(self.cells.get(idx), Some(None))
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// First completed line, with its owner.
    pub fn winner(&self) -> Option<(Mark, [usize; 3])> {
        WIN_LINES.iter().find_map(|&line| {
            let [a, b, c] = line;
            match self.cells[a] {
                Some(m) if self.cells[b] == Some(m) && self.cells[c] == Some(m) => Some((m, line)),
                _ => None,
            }
        })
    }

    pub fn is_draw(&self) -> bool {
        self.is_full() && self.winner().is_none()
    }

    /// Cell that would complete a line for `mark`, if any.
    pub fn completing_move(&self, mark: Mark) -> Option<usize> {
        WIN_LINES.iter().find_map(|line| {
            let owned = line.iter().filter(|&&i| self.cells[i] == Some(mark)).count();
            let free: Vec<usize> = line.iter().copied().filter(|&i| self.cells[i].is_none()).collect();
            (owned == 2 && free.len() == 1).then(|| free[0])
        })
    }
}

/// Bot move priority: win, block, centre, a random corner, first free cell.
pub fn bot_move<R: Rng + ?Sized>(board: &Board, bot: Mark, rng: &mut R) -> Option<usize> {
    if let Some(idx) = board.completing_move(bot) {
        return Some(idx);
    }
    if let Some(idx) = board.completing_move(bot.other()) {
        return Some(idx);
    }
    if board.is_free(CENTER) {
        return Some(CENTER);
    }
    let corners: Vec<usize> = CORNERS.iter().copied().filter(|&i| board.is_free(i)).collect();
    if let Some(&idx) = corners.choose(rng) {
        return Some(idx);
    }
    (0..9).find(|&i| board.is_free(i))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Status {
    Turn(Mark),
    Won(Mark, [usize; 3]),
    Draw,
}

#[derive(Clone, Debug, Serialize)]
pub struct Game {
    pub board: Board,
    pub status: Status,
}

impl Default for Game {
    fn default() -> Self {
        Self { board: Board::default(), status: Status::Turn(Mark::X) }
    }
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restart(&mut self) {
        *self = Self::default();
    }

    pub fn is_over(&self) -> bool {
        !matches!(self.status, Status::Turn(_))
    }

    /// Places `mark` at `idx` if it is that mark's turn and the cell is free.
    pub fn place(&mut self, idx: usize, mark: Mark) -> bool {
        if self.status != Status::Turn(mark) || !self.board.is_free(idx) {
            return false;
        }
        self.board.cells[idx] = Some(mark);
        self.status = if let Some((m, line)) = self.board.winner() {
            Status::Won(m, line)
        } else if self.board.is_draw() {
            Status::Draw
        } else {
            Status::Turn(mark.other())
        };
        true
    }

    /// Human move followed by the bot's reply. Returns the bot's cell, if it moved.
    pub fn play<R: Rng + ?Sized>(&mut self, idx: usize, rng: &mut R) -> Option<usize> {
        if !self.place(idx, Mark::X) || self.is_over() {
            return None;
        }
        let reply = bot_move(&self.board, Mark::O, rng)?;
        self.place(reply, Mark::O);
        log::debug!("tic-tac-toe: X at {idx}, O at {reply}, {:?}", self.status);
        Some(reply)
    }
}
