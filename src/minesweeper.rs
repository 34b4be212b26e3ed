//! Minesweeper: random mines, safe first click, flood-fill reveal, flags.

use rand::Rng;
use rand::seq::index;
use serde::Serialize;

pub const DEFAULT_ROWS: usize = 10;
pub const DEFAULT_COLS: usize = 10;
pub const DEFAULT_MINES: usize = 15;
/// Largest row or column count.
pub const MAX_SIDE: usize = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub mine: bool,
    pub revealed: bool,
    pub flagged: bool,
    pub neighbor_mines: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Playing,
    Won,
    Lost,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub rows: usize,
    pub cols: usize,
    pub mines: usize,
    pub cells: Vec<Cell>,
    pub revealed: usize,
    pub outcome: Outcome,
    #[serde(skip)]
    first_click: bool,
}

impl Board {
    /// Empty board; mines are laid with [`Board::lay_mines`] (or lazily on
    /// the first reveal). Sides are clamped to 1..=[`MAX_SIDE`] and the mine
    /// count is kept below the cell count.
    pub fn new(rows: usize, cols: usize, mines: usize) -> Self {
        let rows = rows.clamp(1, MAX_SIDE);
        let cols = cols.clamp(1, MAX_SIDE);
        let mines = mines.min(rows * cols - 1);
        Self {
            rows,
            cols,
            mines,
            cells: vec![Cell::default(); rows * cols],
            revealed: 0,
            outcome: Outcome::Playing,
            first_click: true,
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        (row < self.rows && col < self.cols).then(|| &self.cells[row * self.cols + col])
    }

    fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let (r, c) = ((idx / self.cols) as isize, (idx % self.cols) as isize);
        (-1..=1)
            .flat_map(move |dr| (-1..=1).map(move |dc| (r + dr, c + dc)))
            .filter(move |&(nr, nc)| {
                (nr, nc) != (r, c)
                    && nr >= 0
                    && nc >= 0
                    && (nr as usize) < self.rows
                    && (nc as usize) < self.cols
            })
            .map(move |(nr, nc)| nr as usize * self.cols + nc as usize)
    }

    /// Clears the field and scatters mines uniformly, then recounts neighbours.
    pub fn lay_mines<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.deal(rng, None);
    }

    /// Like [`Board::lay_mines`], but `safe` never gets a mine.
    fn deal<R: Rng + ?Sized>(&mut self, rng: &mut R, safe: Option<usize>) {
        self.cells.iter_mut().for_each(|c| *c = Cell { flagged: c.flagged, ..Cell::default() });
        let len = self.cells.len();
        let picks = match safe {
            // sample the other cells, then step over the safe one
            Some(skip) => index::sample(rng, len - 1, self.mines)
                .into_iter()
                .map(|i| if i >= skip { i + 1 } else { i })
                .collect::<Vec<_>>(),
            None => index::sample(rng, len, self.mines).into_vec(),
        };
        for idx in picks {
            self.cells[idx].mine = true;
        }
        for idx in 0..self.cells.len() {
            let n = self.neighbors(idx).filter(|&n| self.cells[n].mine).count() as u8;
            self.cells[idx].neighbor_mines = n;
        }
    }

    /// Reveals a cell. Mines are dealt on the very first reveal, never onto that cell.
    /// Zero-count cells open their neighbourhood.
    pub fn reveal<R: Rng + ?Sized>(&mut self, row: usize, col: usize, rng: &mut R) -> Outcome {
        if self.outcome != Outcome::Playing || row >= self.rows || col >= self.cols {
            return self.outcome;
        }
        let start = row * self.cols + col;
        if self.first_click {
            self.deal(rng, Some(start));
            self.first_click = false;
        }
        let target = self.cells[start];
        if target.revealed || target.flagged {
            return self.outcome;
        }
        if target.mine {
            self.cells[start].revealed = true;
            self.revealed += 1;
            self.outcome = Outcome::Lost;
            log::info!("minesweeper: mine hit at ({row}, {col})");
            return self.outcome;
        }

        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            let cell = &mut self.cells[idx];
            if cell.revealed || cell.flagged || cell.mine {
                continue;
            }
            cell.revealed = true;
            self.revealed += 1;
            if cell.neighbor_mines == 0 {
                let next: Vec<usize> = self.neighbors(idx).collect();
                stack.extend(next);
            }
        }

        if self.revealed == self.cells.len() - self.mines {
            self.outcome = Outcome::Won;
            log::info!("minesweeper: cleared");
        }
        self.outcome
    }

    /// Toggles a flag on a hidden cell. Returns the new flag state.
    pub fn toggle_flag(&mut self, row: usize, col: usize) -> bool {
        if self.outcome != Outcome::Playing || row >= self.rows || col >= self.cols {
            return false;
        }
        let cell = &mut self.cells[row * self.cols + col];
        if cell.revealed {
            return false;
        }
        cell.flagged = !cell.flagged;
        cell.flagged
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS, DEFAULT_MINES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn first_reveal_is_never_a_mine() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut b = Board::new(5, 5, 20);
            assert_ne!(b.reveal(2, 2, &mut rng), Outcome::Lost);
            assert_eq!(b.cells.iter().filter(|c| c.mine).count(), 20);
        }
    }

    #[test]
    fn neighbour_counts_match_mines() {
        let mut b = Board::default();
        b.lay_mines(&mut StdRng::seed_from_u64(42));
        for idx in 0..b.cells.len() {
            let expected = b.neighbors(idx).filter(|&n| b.cells[n].mine).count() as u8;
            assert_eq!(b.cells[idx].neighbor_mines, expected);
        }
        assert_eq!(b.cells.iter().filter(|c| c.mine).count(), DEFAULT_MINES);
    }

    #[test]
    fn empty_board_opens_in_one_click_and_wins() {
        let mut b = Board::new(4, 6, 0);
        let out = b.reveal(0, 0, &mut StdRng::seed_from_u64(0));
        assert_eq!(out, Outcome::Won);
        assert_eq!(b.revealed, 24);
    }

    #[test]
    fn flags_block_reveal_and_only_toggle_hidden_cells() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut b = Board::new(3, 3, 0);
        assert!(b.toggle_flag(2, 2));
        b.reveal(0, 0, &mut rng);
        assert!(!b.cells[8].revealed);
        assert_eq!(b.revealed, 8);
        assert!(!b.toggle_flag(2, 2));
        b.reveal(2, 2, &mut rng);
        assert_eq!(b.outcome, Outcome::Won);
        assert!(!b.toggle_flag(0, 0));
    }

    #[test]
    fn mine_count_stays_below_cell_count() {
        let b = Board::new(2, 2, 99);
        assert_eq!(b.mines, 3);
    }

    #[test]
    fn oversized_boards_are_clamped() {
        let b = Board::new(usize::MAX, 0, usize::MAX);
        assert_eq!((b.rows, b.cols), (MAX_SIDE, 1));
        assert_eq!(b.mines, MAX_SIDE - 1);
    }

    #[test]
    fn packed_board_spares_only_the_first_click() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut b = Board::new(60, 60, 3600);
        assert_eq!(b.mines, 3599);
        assert_eq!(b.reveal(30, 45, &mut rng), Outcome::Won);
        let safe: Vec<usize> = (0..b.cells.len()).filter(|&i| !b.cells[i].mine).collect();
        assert_eq!(safe, vec![30 * 60 + 45]);
        assert_eq!(b.cells[safe[0]].neighbor_mines, 8);
    }

    #[test]
    fn stepping_on_a_mine_loses() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut b = Board::new(4, 4, 15);
        assert_eq!(b.reveal(0, 0, &mut rng), Outcome::Won);

        let mut b = Board::new(4, 4, 14);
        b.reveal(0, 0, &mut rng);
        let mine = b.cells.iter().position(|c| c.mine).unwrap();
        let out = b.reveal(mine / 4, mine % 4, &mut rng);
        assert_eq!(out, Outcome::Lost);
        assert_eq!(b.reveal(0, 1, &mut rng), Outcome::Lost);
    }
}
