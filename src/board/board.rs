//! Boards and their cells.
//!
//! A `Board` maps locations to cells. Its shape is fixed when it is built;
//! only cell properties change afterwards. Which objects sit on a cell is
//! tracked by the [`ContainmentIndex`](crate::containment::ContainmentIndex),
//! not by the cell itself.

use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::location::{Direction, Location};

/// Board identifier. Games may run several boards (levels, floors).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BoardId(pub u16);

impl BoardId {
    /// Create a new board ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for BoardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Board({})", self.0)
    }
}

/// Value reference to one cell: the board it lives on and its location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellRef {
    /// Owning board.
    pub board: BoardId,
    /// Position on that board.
    pub location: Location,
}

impl CellRef {
    /// Create a cell reference.
    #[must_use]
    pub const fn new(board: BoardId, location: Location) -> Self {
        Self { board, location }
    }
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.board, self.location)
    }
}

/// One space on a board.
#[derive(Debug)]
pub struct Cell {
    cell_ref: CellRef,
    kind: String,
    properties: Mutex<FxHashMap<String, String>>,
}

impl Cell {
    fn new(cell_ref: CellRef, kind: String, properties: FxHashMap<String, String>) -> Self {
        Self {
            cell_ref,
            kind,
            properties: Mutex::new(properties),
        }
    }

    /// Reference usable as a container and in events.
    #[must_use]
    pub fn cell_ref(&self) -> CellRef {
        self.cell_ref
    }

    /// Position on the board.
    #[must_use]
    pub fn location(&self) -> Location {
        self.cell_ref.location
    }

    /// Cell type name ("floor", "wall", ...).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Get a property value.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<String> {
        self.lock_properties().get(key).cloned()
    }

    /// Copy of every property.
    #[must_use]
    pub fn properties(&self) -> FxHashMap<String, String> {
        self.lock_properties().clone()
    }

    /// Set a property, returning the previous value.
    ///
    /// Callers that want observers notified go through
    /// [`Game::set_cell_property`](crate::game::Game::set_cell_property).
    pub fn set_property(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.lock_properties().insert(key.into(), value.into())
    }

    fn lock_properties(&self) -> std::sync::MutexGuard<'_, FxHashMap<String, String>> {
        self.properties.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A fixed grid of cells.
///
/// Locations without a cell are holes: nothing can be placed there and
/// adjacency queries skip them.
#[derive(Debug)]
pub struct Board {
    id: BoardId,
    name: String,
    cells: FxHashMap<Location, Cell>,
}

impl Board {
    /// Board identifier.
    #[must_use]
    pub fn id(&self) -> BoardId {
        self.id
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell at the given coordinates.
    #[must_use]
    pub fn cell(&self, column: i32, row: i32) -> Option<&Cell> {
        self.cells.get(&Location::new(column, row))
    }

    /// Cell at a location.
    #[must_use]
    pub fn cell_at(&self, location: Location) -> Option<&Cell> {
        self.cells.get(&location)
    }

    /// Check whether a cell exists at a location.
    #[must_use]
    pub fn contains(&self, location: Location) -> bool {
        self.cells.contains_key(&location)
    }

    /// Neighbouring cell one step in `direction`, if there is one.
    #[must_use]
    pub fn adjacent(&self, location: Location, direction: Direction) -> Option<&Cell> {
        self.cell_at(location.adjacent(direction)?)
    }

    /// All existing neighbours with the direction that reaches them.
    pub fn neighbours(&self, location: Location) -> impl Iterator<Item = (Direction, &Cell)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |d| self.adjacent(location, d).map(|cell| (d, cell)))
    }

    /// Iterate all cells (unordered).
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check whether the board has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// One past the largest column holding a cell, or 0 for an empty board.
    #[must_use]
    pub fn width(&self) -> i64 {
        self.cells.keys().map(|l| i64::from(l.column) + 1).max().unwrap_or(0)
    }

    /// One past the largest row holding a cell, or 0 for an empty board.
    #[must_use]
    pub fn height(&self) -> i64 {
        self.cells.keys().map(|l| i64::from(l.row) + 1).max().unwrap_or(0)
    }
}

/// Builder for boards.
///
/// Layout parsing stays with the caller; the builder only collects cells.
/// Per-kind default properties are merged under per-cell ones.
///
/// ```
/// use grid_engine::board::{BoardBuilder, BoardId, Direction, Location};
///
/// let board = BoardBuilder::new(BoardId::new(0), "yard")
///     .kind_property("wall", "solid", "true")
///     .cell(0, 0, "floor")
///     .cell(1, 0, "wall")
///     .build();
///
/// let floor = board.cell(0, 0).unwrap();
/// let wall = board.adjacent(floor.location(), Direction::East).unwrap();
/// assert_eq!(wall.property("solid").as_deref(), Some("true"));
/// assert!(board.adjacent(Location::new(0, 0), Direction::North).is_none());
/// ```
#[derive(Clone, Debug)]
pub struct BoardBuilder {
    id: BoardId,
    name: String,
    cells: Vec<(Location, String, FxHashMap<String, String>)>,
    kind_properties: FxHashMap<String, FxHashMap<String, String>>,
}

impl BoardBuilder {
    /// Start building a board.
    pub fn new(id: BoardId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            cells: Vec::new(),
            kind_properties: FxHashMap::default(),
        }
    }

    /// Add a cell. A later cell at the same location replaces an earlier one.
    #[must_use]
    pub fn cell(self, column: i32, row: i32, kind: impl Into<String>) -> Self {
        self.cell_with_properties(column, row, kind, FxHashMap::default())
    }

    /// Add a cell with its own properties.
    #[must_use]
    pub fn cell_with_properties(
        mut self,
        column: i32,
        row: i32,
        kind: impl Into<String>,
        properties: FxHashMap<String, String>,
    ) -> Self {
        self.cells.push((Location::new(column, row), kind.into(), properties));
        self
    }

    /// Fill a `width` x `height` rectangle anchored at (0, 0) with one kind.
    #[must_use]
    pub fn fill(mut self, width: i32, height: i32, kind: &str) -> Self {
        for row in 0..height {
            for column in 0..width {
                self = self.cell(column, row, kind);
            }
        }
        self
    }

    /// Default property for every cell of a kind.
    #[must_use]
    pub fn kind_property(
        mut self,
        kind: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.kind_properties
            .entry(kind.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Finish the board.
    #[must_use]
    pub fn build(self) -> Board {
        let mut cells = FxHashMap::default();
        for (location, kind, own) in self.cells {
            let mut properties = self.kind_properties.get(&kind).cloned().unwrap_or_default();
            properties.extend(own);
            let cell = Cell::new(CellRef::new(self.id, location), kind, properties);
            cells.insert(location, cell);
        }

        Board {
            id: self.id,
            name: self.name,
            cells,
        }
    }
}
