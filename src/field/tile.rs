use std::fmt::{Debug, Display, Formatter};

/// What lies under a tile.
///
/// A tile is either safe or holds a mine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TileKind {
    /// A tile without a mine.
    ///
    /// The parameter is the number of mines among the tile's neighbours.
    Safe(u8),
    /// A mined tile.
    Mine,
}

/// The visibility of a tile.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TileState {
    /// Untouched by the player.
    Covered,
    /// Revealed. Safe tiles are opened by the player, mines get opened when the game ends.
    Open,
    /// Still covered, but marked by the player as a suspected mine.
    Flagged,
    /// The mine the player stepped on.
    Detonated,
}

/// A single tile of the field.
///
/// The position is fixed at creation. Only the owning [`Field`](super::Field) changes the kind and the state.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Tile {
    /// `(x, y)`
    position: (u8, u8),
    kind: TileKind,
    state: TileState,
}

impl Tile {
    /// Creates a covered safe tile with no mines around at the given position.
    pub(crate) fn new(position: (u8, u8)) -> Self {
        Tile {
            position,
            kind: TileKind::Safe(0),
            state: TileState::Covered,
        }
    }

    pub fn position(&self) -> (u8, u8) {
        self.position
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    pub fn is_mine(&self) -> bool {
        self.kind == TileKind::Mine
    }

    /// The classic numeric rank: `-1` for a mine, otherwise the number of adjacent mines.
    pub fn rank(&self) -> i8 {
        match self.kind {
            TileKind::Safe(mines_around) => mines_around as i8,
            TileKind::Mine => -1,
        }
    }

    /// Returns the number of mines around the tile or `None` if the tile itself is mined.
    pub fn mines_around(&self) -> Option<u8> {
        match self.kind {
            TileKind::Safe(mines_around) => Some(mines_around),
            TileKind::Mine => None,
        }
    }

    pub fn is_covered(&self) -> bool {
        self.state == TileState::Covered
    }

    pub fn is_open(&self) -> bool {
        self.state == TileState::Open
    }

    pub fn is_flagged(&self) -> bool {
        self.state == TileState::Flagged
    }

    pub fn is_detonated(&self) -> bool {
        self.state == TileState::Detonated
    }

    /// Turns the tile into a mine. There's no way back.
    pub(crate) fn mine(&mut self) {
        self.kind = TileKind::Mine;
    }

    /// Increments the number of mines around the tile.
    ///
    /// Won't produce any effect if the tile itself is mined.
    pub(crate) fn increment_mines_around(&mut self) {
        if let TileKind::Safe(mines_around) = self.kind {
            self.kind = TileKind::Safe(mines_around + 1);
        }
    }

    pub(crate) fn set_state(&mut self, state: TileState) {
        self.state = state;
    }
}

/// The `Debug` implementation shows what's under every tile, covered or not.
impl Debug for Tile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TileKind::Safe(0) => write!(f, "."),
            TileKind::Safe(n) => write!(f, "{n}"),
            TileKind::Mine => write!(f, "*"),
        }
    }
}

/// The `Display` implementation shows the tile the way the player sees it.
impl Display for Tile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.state {
            TileState::Covered => write!(f, "#"),
            TileState::Flagged => write!(f, "F"),
            TileState::Detonated => write!(f, "X"),
            TileState::Open => write!(f, "{:?}", self),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Tile, TileKind, TileState};

    #[test]
    fn new_creates_a_covered_safe_tile_with_the_provided_position() {
        let tile = Tile::new((5, 7));

        assert_eq!(tile.position(), (5, 7));
        assert_eq!(tile.kind(), TileKind::Safe(0));
        assert_eq!(tile.state(), TileState::Covered);
        assert_eq!(tile.rank(), 0);
    }

    #[test]
    fn a_mined_tile_has_the_negative_rank_and_no_mines_around_amount() {
        let mut tile = Tile::new((0, 0));
        tile.increment_mines_around();
        tile.mine();

        assert!(tile.is_mine());
        assert_eq!(tile.rank(), -1);
        assert_eq!(tile.mines_around(), None);
    }

    #[test]
    fn incrementing_mines_around_does_not_affect_a_mine() {
        let mut tile = Tile::new((0, 0));
        tile.mine();
        tile.increment_mines_around();

        assert!(tile.is_mine());
    }

    #[test]
    fn incrementing_mines_around_counts_up() {
        let mut tile = Tile::new((0, 0));
        tile.increment_mines_around();
        tile.increment_mines_around();
        tile.increment_mines_around();

        assert_eq!(tile.mines_around(), Some(3));
        assert_eq!(tile.rank(), 3);
    }

    #[test]
    fn state_helpers_reflect_the_current_state() {
        let mut tile = Tile::new((1, 1));
        assert!(tile.is_covered());

        tile.set_state(TileState::Flagged);
        assert!(tile.is_flagged() && !tile.is_covered());

        tile.set_state(TileState::Open);
        assert!(tile.is_open());

        tile.set_state(TileState::Detonated);
        assert!(tile.is_detonated() && !tile.is_open());
    }

    #[test]
    fn display_hides_covered_tiles_while_debug_does_not() {
        let mut tile = Tile::new((1, 1));
        tile.mine();

        assert_eq!(tile.to_string(), "#");
        assert_eq!(format!("{:?}", tile), "*");

        tile.set_state(TileState::Open);
        assert_eq!(tile.to_string(), "*");
    }
}
