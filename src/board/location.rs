//! Grid coordinates and compass directions.

use serde::{Deserialize, Serialize};

/// One of the four grid directions.
///
/// Rows grow southwards and columns grow eastwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Row - 1.
    North,
    /// Column + 1.
    East,
    /// Row + 1.
    South,
    /// Column - 1.
    West,
}

impl Direction {
    /// All directions, clockwise from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Parse a one-letter direction ("n", "E", ...).
    #[must_use]
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.to_ascii_lowercase().as_str() {
            "n" => Some(Direction::North),
            "e" => Some(Direction::East),
            "s" => Some(Direction::South),
            "w" => Some(Direction::West),
            _ => None,
        }
    }

    /// Column and row offsets for one step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            Direction::North => "N",
            Direction::East => "E",
            Direction::South => "S",
            Direction::West => "W",
        };
        f.write_str(letter)
    }
}

/// A (column, row) position on a board.
///
/// ```
/// use grid_engine::board::{Direction, Location};
///
/// let here = Location::new(3, 4);
/// assert_eq!(here.adjacent(Direction::North), Some(Location::new(3, 3)));
/// assert_eq!(Location::new(i32::MAX, 0).adjacent(Direction::East), None);
/// assert_eq!(here.direction_to(Location::new(3, 9)), Some(Direction::South));
/// assert_eq!(here.to_string(), "(3,4)");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Column (x).
    pub column: i32,
    /// Row (y).
    pub row: i32,
}

impl Location {
    /// Create a location.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// The neighbouring location one step in `direction`, or `None` past
    /// the edge of the coordinate range.
    #[must_use]
    pub const fn adjacent(self, direction: Direction) -> Option<Self> {
        let (dc, dr) = direction.offset();
        match (self.column.checked_add(dc), self.row.checked_add(dr)) {
            (Some(column), Some(row)) => Some(Self::new(column, row)),
            _ => None,
        }
    }

    /// A direction that leads from `self` towards `other`.
    ///
    /// Rows are compared before columns, so for diagonal targets this is
    /// one of the two valid directions rather than both. Returns `None` when
    /// the locations are equal.
    #[must_use]
    pub fn direction_to(self, other: Location) -> Option<Direction> {
        if self.row < other.row {
            Some(Direction::South)
        } else if self.row > other.row {
            Some(Direction::North)
        } else if self.column < other.column {
            Some(Direction::East)
        } else if self.column > other.column {
            Some(Direction::West)
        } else {
            None
        }
    }
}

impl From<(i32, i32)> for Location {
    fn from((column, row): (i32, i32)) -> Self {
        Self::new(column, row)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.column, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_ne!(direction.opposite(), direction);
        }
    }

    #[test]
    fn test_from_letter() {
        assert_eq!(Direction::from_letter("n"), Some(Direction::North));
        assert_eq!(Direction::from_letter("W"), Some(Direction::West));
        assert_eq!(Direction::from_letter("x"), None);
        assert_eq!(Direction::from_letter(""), None);
    }

    #[test]
    fn test_adjacent_round_trip() {
        let origin = Location::new(5, 5);
        for direction in Direction::ALL {
            let step = origin.adjacent(direction).unwrap();
            assert_eq!(step.adjacent(direction.opposite()), Some(origin));
            assert_eq!(origin.direction_to(step), Some(direction));
        }
    }

    #[test]
    fn test_adjacent_at_coordinate_limits() {
        let east_edge = Location::new(i32::MAX, 0);
        assert_eq!(east_edge.adjacent(Direction::East), None);
        assert_eq!(east_edge.adjacent(Direction::West), Some(Location::new(i32::MAX - 1, 0)));

        let corner = Location::new(i32::MIN, i32::MIN);
        assert_eq!(corner.adjacent(Direction::West), None);
        assert_eq!(corner.adjacent(Direction::North), None);
        assert_eq!(corner.adjacent(Direction::South), Some(Location::new(i32::MIN, i32::MIN + 1)));

        assert_eq!(Location::new(0, i32::MAX).adjacent(Direction::South), None);
    }

    #[test]
    fn test_direction_to_same_location() {
        let here = Location::new(1, 1);
        assert_eq!(here.direction_to(here), None);
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(Location::new(2, 3), Location::from((2, 3)));
        assert_ne!(Location::new(2, 3), Location::new(3, 2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Location::new(6, 5).to_string(), "(6,5)");
        assert_eq!(Direction::East.to_string(), "E");
    }
}
