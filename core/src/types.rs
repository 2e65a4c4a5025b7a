/// Value of a single board tile, `0` meaning an empty cell.
pub type TileValue = u32;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// Side length of the square game board.
pub const BOARD_SIZE: usize = 8;

/// Number of cells in a board snapshot.
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;
