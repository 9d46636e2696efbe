pub mod tile;

use rand::Rng;
use std::fmt::{Debug, Display, Formatter};
use thiserror::Error;
use tile::{Tile, TileState};

/// The offsets of the eight neighbours of a tile, clockwise starting from the top-left one.
const NEIGHBOUR_OFFSETS: [(i16, i16); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

/// Everything that can go wrong when working with a field.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The position lies beyond the field's bounds. The value is the requested `(x, y)`.
    #[error("position {0:?} is outside of the field")]
    OutOfBounds((u8, u8)),
    /// The field can't hold the requested number of mines and still have a safe tile left.
    #[error("{mines} mines don't fit into a field of {tiles} tiles")]
    TooManyMines { mines: u16, tiles: u16 },
    /// A game can't be played on a field without mines.
    #[error("the field has no mines")]
    NoMines,
}

/// A square grid of tiles.
///
/// The grid is addressed as `grid[x][y]`, matching the tiles' own positions.
#[derive(Clone, PartialEq, Eq)]
pub struct Field {
    grid: Vec<Vec<Tile>>,
}

impl Field {
    /// Creates a `size` × `size` field of covered safe tiles.
    pub fn new(size: u8) -> Self {
        let grid = (0..size)
            .map(|x| (0..size).map(|y| Tile::new((x, y))).collect())
            .collect();

        Field { grid }
    }

    /// Creates a field with mines at exactly the given positions. Duplicates are ignored.
    ///
    /// Mostly useful for replaying known layouts.
    pub fn with_mines_at(size: u8, positions: &[(u8, u8)]) -> Result<Self, FieldError> {
        let mut field = Field::new(size);

        for &position in positions {
            field.place_mine(position)?;
        }

        Ok(field)
    }

    /// The length of a side of the field.
    pub fn size(&self) -> u8 {
        self.grid.len() as u8
    }

    pub fn tiles_amount(&self) -> u16 {
        let size = self.size() as u16;
        size * size
    }

    /// Randomly places exactly `mines_amount` mines, updating the ranks of their neighbours as it goes.
    ///
    /// Positions are drawn uniformly; a draw that lands on a mine is simply retried. At least one tile must stay
    /// safe, otherwise [`FieldError::TooManyMines`] is returned and the field is left untouched.
    pub fn populate_with_mines<R: Rng>(&mut self, mines_amount: u16, rng: &mut R) -> Result<(), FieldError> {
        let tiles = self.tiles_amount();
        let free_tiles = tiles - self.mines_amount();

        if mines_amount >= free_tiles {
            return Err(FieldError::TooManyMines {
                mines: mines_amount,
                tiles,
            });
        }

        let size = self.size();
        let mut placed = 0;

        while placed < mines_amount {
            let position = (rng.gen_range(0..size), rng.gen_range(0..size));

            if self.place_mine(position)? {
                placed += 1;
            }
        }

        Ok(())
    }

    /// Mines the tile at the given position. Returns `false` if there was a mine already.
    fn place_mine(&mut self, position: (u8, u8)) -> Result<bool, FieldError> {
        let tile = self.get_tile_mut(position)?;

        if tile.is_mine() {
            return Ok(false);
        }

        tile.mine();
        self.update_adjacent_scores(position)?;

        Ok(true)
    }

    /// Increments the rank of every safe neighbour of a freshly placed mine.
    pub fn update_adjacent_scores(&mut self, position: (u8, u8)) -> Result<(), FieldError> {
        for neighbour in self.neighbours(position)? {
            self.grid[neighbour.0 as usize][neighbour.1 as usize].increment_mines_around();
        }

        Ok(())
    }

    /// Returns the in-bounds positions around the given one.
    pub fn neighbours(&self, position: (u8, u8)) -> Result<Vec<(u8, u8)>, FieldError> {
        self.check_bounds(position)?;

        let size = self.size() as i16;
        let (x, y) = (position.0 as i16, position.1 as i16);

        Ok(NEIGHBOUR_OFFSETS
            .iter()
            .map(|(dx, dy)| (x + dx, y + dy))
            .filter(|&(nx, ny)| nx >= 0 && ny >= 0 && nx < size && ny < size)
            .map(|(nx, ny)| (nx as u8, ny as u8))
            .collect())
    }

    pub fn get_tile(&self, position: (u8, u8)) -> Result<&Tile, FieldError> {
        self.grid
            .get(position.0 as usize)
            .and_then(|column| column.get(position.1 as usize))
            .ok_or(FieldError::OutOfBounds(position))
    }

    pub(crate) fn get_tile_mut(&mut self, position: (u8, u8)) -> Result<&mut Tile, FieldError> {
        self.grid
            .get_mut(position.0 as usize)
            .and_then(|column| column.get_mut(position.1 as usize))
            .ok_or(FieldError::OutOfBounds(position))
    }

    fn check_bounds(&self, position: (u8, u8)) -> Result<(), FieldError> {
        self.get_tile(position).map(|_| ())
    }

    /// Opens the covered neighbours of the given tile, spreading further through every opened tile with no mines
    /// around. This reveals a whole empty region together with its numbered border.
    ///
    /// Flagged and already open tiles are left alone, which also keeps every tile from being visited twice. Returns
    /// the number of tiles opened.
    pub fn open_empty_adjacent_tiles(&mut self, position: (u8, u8)) -> Result<usize, FieldError> {
        let mut to_visit = vec![position];
        let mut opened = 0;

        while let Some(current) = to_visit.pop() {
            for neighbour in self.neighbours(current)? {
                let tile = &mut self.grid[neighbour.0 as usize][neighbour.1 as usize];

                if !tile.is_covered() {
                    continue;
                }

                tile.set_state(TileState::Open);
                opened += 1;

                if tile.mines_around() == Some(0) {
                    log::trace!("Flood fill expands through {:?}", neighbour);
                    to_visit.push(neighbour);
                }
            }
        }

        Ok(opened)
    }

    /// Opens every covered mine.
    ///
    /// Flagged mines stay flagged and the detonated one stays detonated, so that the final board tells the correct
    /// guesses from the missed ones.
    pub fn show_mines(&mut self) {
        self.grid
            .iter_mut()
            .flatten()
            .filter(|tile| tile.is_mine() && tile.is_covered())
            .for_each(|tile| tile.set_state(TileState::Open));
    }

    /// Iterates over all the tiles, column by column.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.grid.iter().flatten()
    }

    pub fn mines_amount(&self) -> u16 {
        self.tiles().filter(|tile| tile.is_mine()).count() as u16
    }

    pub fn flagged_tiles_amount(&self) -> u16 {
        self.tiles().filter(|tile| tile.is_flagged()).count() as u16
    }

    /// Covers every tile back, dropping the flags and whatever's been opened.
    pub(crate) fn cover_all(&mut self) {
        self.grid
            .iter_mut()
            .flatten()
            .for_each(|tile| tile.set_state(TileState::Covered));
    }

    /// Checks that the field can be played on: there's at least one mine and at least one safe tile.
    pub fn check_playable(&self) -> Result<(), FieldError> {
        let mines = self.mines_amount();
        let tiles = self.tiles_amount();

        if mines == 0 {
            Err(FieldError::NoMines)
        } else if mines >= tiles {
            Err(FieldError::TooManyMines { mines, tiles })
        } else {
            Ok(())
        }
    }

    fn write_rows(&self, f: &mut Formatter<'_>, debug: bool) -> std::fmt::Result {
        let size = self.size() as usize;

        write!(f, "   ")?;
        for x in 0..size {
            write!(f, "{:>3}", x)?;
        }
        writeln!(f)?;

        for y in 0..size {
            write!(f, "{:>3}", y)?;

            for column in self.grid.iter() {
                let symbol = if debug {
                    format!("{:?}", column[y])
                } else {
                    column[y].to_string()
                };

                write!(f, "{:>3}", symbol)?;
            }

            writeln!(f)?;
        }

        Ok(())
    }
}

/// Shows the field with everything uncovered.
impl Debug for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.write_rows(f, true)
    }
}

/// Shows the field the way the player sees it.
impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.write_rows(f, false)
    }
}

#[cfg(test)]
mod test {
    use super::{Field, FieldError, TileState};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn count_mined_neighbours(field: &Field, position: (u8, u8)) -> u8 {
        field
            .neighbours(position)
            .unwrap()
            .into_iter()
            .filter(|&n| field.get_tile(n).unwrap().is_mine())
            .count() as u8
    }

    // . . . . .
    // . . . . .
    // . . . . .
    // . . . 1 1
    // . . . 1 *
    fn create_stub_field() -> Field {
        Field::with_mines_at(5, &[(4, 4)]).unwrap()
    }

    #[test]
    fn a_new_field_is_square_and_fully_covered() {
        let field = Field::new(4);

        assert_eq!(field.size(), 4);
        assert_eq!(field.tiles_amount(), 16);
        assert!(field.tiles().all(|tile| tile.is_covered() && !tile.is_mine()));
        assert_eq!(field.get_tile((2, 3)).unwrap().position(), (2, 3));
    }

    #[test]
    fn the_field_gets_populated_with_the_exact_amount_of_mines() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut field = Field::new(10);
        field.populate_with_mines(10, &mut rng).unwrap();

        assert_eq!(field.mines_amount(), 10);
    }

    #[test]
    fn ranks_match_the_amount_of_mined_neighbours_after_population() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut field = Field::new(12);
        field.populate_with_mines(40, &mut rng).unwrap();

        for tile in field.tiles().filter(|tile| !tile.is_mine()) {
            assert_eq!(
                tile.mines_around(),
                Some(count_mined_neighbours(&field, tile.position())),
                "rank mismatch at {:?}",
                tile.position()
            );
        }
    }

    #[test]
    fn population_is_deterministic_for_the_same_seed() {
        let mut first = Field::new(10);
        let mut second = Field::new(10);
        first.populate_with_mines(15, &mut StdRng::seed_from_u64(3)).unwrap();
        second.populate_with_mines(15, &mut StdRng::seed_from_u64(3)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn population_fails_when_no_safe_tile_would_remain() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = Field::new(3);
        let result = field.populate_with_mines(9, &mut rng);

        assert_eq!(result, Err(FieldError::TooManyMines { mines: 9, tiles: 9 }));
        assert_eq!(field.mines_amount(), 0);
    }

    #[test]
    fn population_can_leave_exactly_one_safe_tile() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = Field::new(3);
        field.populate_with_mines(8, &mut rng).unwrap();

        assert_eq!(field.mines_amount(), 8);
        let safe = field.tiles().find(|tile| !tile.is_mine()).unwrap();
        assert_eq!(safe.mines_around(), Some(count_mined_neighbours(&field, safe.position())));
    }

    #[test]
    fn update_adjacent_scores_skips_mines_and_clips_at_the_edges() {
        let field = Field::with_mines_at(3, &[(0, 0), (1, 0)]).unwrap();

        let ranks: Vec<i8> = [(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1), (0, 2)]
            .into_iter()
            .map(|pos| field.get_tile(pos).unwrap().rank())
            .collect();

        assert_eq!(ranks, [-1, -1, 1, 2, 2, 1, 0]);
    }

    #[test]
    fn duplicate_mine_positions_are_placed_once() {
        let field = Field::with_mines_at(3, &[(1, 1), (1, 1)]).unwrap();

        assert_eq!(field.mines_amount(), 1);
        assert_eq!(field.get_tile((0, 0)).unwrap().rank(), 1);
    }

    #[test]
    fn neighbours_are_clipped_at_corners_and_edges() {
        let field = Field::new(5);

        assert_eq!(field.neighbours((0, 0)).unwrap().len(), 3);
        assert_eq!(field.neighbours((4, 4)).unwrap().len(), 3);
        assert_eq!(field.neighbours((0, 2)).unwrap().len(), 5);
        assert_eq!(field.neighbours((2, 2)).unwrap().len(), 8);
    }

    #[test]
    fn out_of_bounds_positions_are_reported() {
        let mut field = Field::new(5);

        assert_eq!(field.get_tile((5, 0)).err(), Some(FieldError::OutOfBounds((5, 0))));
        assert_eq!(field.neighbours((0, 9)).err(), Some(FieldError::OutOfBounds((0, 9))));
        assert_eq!(
            field.open_empty_adjacent_tiles((7, 7)).err(),
            Some(FieldError::OutOfBounds((7, 7)))
        );
        assert_eq!(Field::with_mines_at(2, &[(2, 2)]).err(), Some(FieldError::OutOfBounds((2, 2))));
    }

    #[test]
    fn flood_fill_opens_the_empty_region_and_its_border_but_no_mines() {
        let mut field = create_stub_field();
        field.get_tile_mut((0, 0)).unwrap().set_state(TileState::Open);
        let opened = field.open_empty_adjacent_tiles((0, 0)).unwrap();

        // everything but the mine itself and the starting tile
        assert_eq!(opened, 23);
        assert!(field.tiles().filter(|tile| !tile.is_mine()).all(|tile| tile.is_open()));
        assert!(field.get_tile((4, 4)).unwrap().is_covered());
    }

    #[test]
    fn flood_fill_does_not_spread_through_numbered_tiles() {
        // . 1 * 2
        // . 1 3 *
        // . . 3 *
        // . . 2 *
        let mut field = Field::with_mines_at(4, &[(2, 0), (3, 1), (3, 2), (3, 3)]).unwrap();
        field.open_empty_adjacent_tiles((0, 0)).unwrap();

        assert!(field.get_tile((1, 0)).unwrap().is_open());
        assert!(field.get_tile((2, 1)).unwrap().is_open());
        assert!(field.get_tile((2, 3)).unwrap().is_open());
        // only reachable through numbered tiles
        assert!(field.get_tile((3, 0)).unwrap().is_covered());
        assert!(field.tiles().filter(|tile| tile.is_mine()).all(|tile| tile.is_covered()));
    }

    #[test]
    fn flood_fill_is_idempotent() {
        let mut field = create_stub_field();
        field.open_empty_adjacent_tiles((0, 0)).unwrap();
        let after_first = field.clone();
        let opened_again = field.open_empty_adjacent_tiles((0, 0)).unwrap();

        assert_eq!(opened_again, 0);
        assert_eq!(field, after_first);
    }

    #[test]
    fn flood_fill_leaves_flagged_tiles_alone() {
        let mut field = create_stub_field();
        field.get_tile_mut((1, 1)).unwrap().set_state(TileState::Flagged);
        field.open_empty_adjacent_tiles((0, 0)).unwrap();

        assert!(field.get_tile((1, 1)).unwrap().is_flagged());
        // still reachable around the flag
        assert!(field.get_tile((4, 0)).unwrap().is_open());
    }

    #[test]
    fn show_mines_opens_only_the_unflagged_mines() {
        let mut field = Field::with_mines_at(4, &[(0, 0), (1, 1), (2, 2)]).unwrap();
        field.get_tile_mut((1, 1)).unwrap().set_state(TileState::Flagged);
        field.get_tile_mut((2, 2)).unwrap().set_state(TileState::Detonated);
        field.show_mines();

        assert!(field.get_tile((0, 0)).unwrap().is_open());
        assert!(field.get_tile((1, 1)).unwrap().is_flagged());
        assert!(field.get_tile((2, 2)).unwrap().is_detonated());
        assert_eq!(field.tiles().filter(|tile| tile.is_open()).count(), 1);
    }

    #[test]
    fn cover_all_resets_every_tile_but_keeps_the_mines() {
        let mut field = Field::with_mines_at(3, &[(0, 0)]).unwrap();
        field.get_tile_mut((0, 0)).unwrap().set_state(TileState::Flagged);
        field.get_tile_mut((2, 2)).unwrap().set_state(TileState::Open);
        field.cover_all();

        assert!(field.tiles().all(|tile| tile.is_covered()));
        assert!(field.get_tile((0, 0)).unwrap().is_mine());
        assert_eq!(field.get_tile((1, 1)).unwrap().rank(), 1);
    }

    #[test]
    fn only_fields_with_mines_and_safe_tiles_are_playable() {
        assert_eq!(Field::new(3).check_playable(), Err(FieldError::NoMines));
        assert_eq!(Field::with_mines_at(2, &[(0, 0)]).unwrap().check_playable(), Ok(()));

        let full = Field::with_mines_at(2, &[(0, 0), (0, 1), (1, 0), (1, 1)]).unwrap();
        assert_eq!(full.check_playable(), Err(FieldError::TooManyMines { mines: 4, tiles: 4 }));
    }

    #[test]
    fn display_hides_what_debug_reveals() {
        let field = Field::with_mines_at(2, &[(1, 0)]).unwrap();

        assert_eq!(field.to_string(), "     0  1\n  0  #  #\n  1  #  #\n");
        assert_eq!(format!("{:?}", field), "     0  1\n  0  1  *\n  1  1  1\n");
    }
}
