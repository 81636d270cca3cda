//! Collision responses and directional side sets

use bitflags::bitflags;

/// Side from which another shape overlaps this one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The other shape reaches past this one's top edge
    North,
    /// The other shape reaches past this one's bottom edge
    South,
    /// The other shape reaches past this one's right edge
    East,
    /// The other shape reaches past this one's left edge
    West,
    /// The other shape lies within this one
    Inside,
    /// The other shape encloses this one
    Surround,
}

impl Direction {
    /// All directions in declaration order
    pub const ALL: [Self; 6] = [
        Self::North,
        Self::South,
        Self::East,
        Self::West,
        Self::Inside,
        Self::Surround,
    ];
}

bitflags! {
    /// Set of [`Direction`]s reported by a collision
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Sides: u8 {
        /// North side
        const NORTH = 1 << 0;
        /// South side
        const SOUTH = 1 << 1;
        /// East side
        const EAST = 1 << 2;
        /// West side
        const WEST = 1 << 3;
        /// Fully inside
        const INSIDE = 1 << 4;
        /// Fully surrounding
        const SURROUND = 1 << 5;
    }
}

impl Sides {
    /// Check whether the set contains a direction
    pub fn has(self, direction: Direction) -> bool {
        self.contains(Self::from(direction))
    }

    /// Iterate over the directions in this set
    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.has(*d))
    }

    /// Number of directions in this set
    pub fn count(self) -> usize {
        self.bits().count_ones() as usize
    }
}

impl From<Direction> for Sides {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::North => Self::NORTH,
            Direction::South => Self::SOUTH,
            Direction::East => Self::EAST,
            Direction::West => Self::WEST,
            Direction::Inside => Self::INSIDE,
            Direction::Surround => Self::SURROUND,
        }
    }
}

impl FromIterator<Direction> for Sides {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |acc, d| acc | Self::from(d))
    }
}

/// Result of a pairwise collision query
///
/// Built fresh for every query and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CollisionResponse {
    /// Whether the two shapes overlap
    pub collided: bool,
    /// Sides of the first shape crossed by the second
    pub sides: Sides,
}

impl CollisionResponse {
    /// Response for a pair that does not collide
    pub const NONE: Self = Self {
        collided: false,
        sides: Sides::empty(),
    };

    /// Response for a colliding pair
    pub fn hit(sides: Sides) -> Self {
        Self {
            collided: true,
            sides,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sides_from_directions() {
        let sides: Sides = [Direction::North, Direction::East].into_iter().collect();

        assert!(sides.has(Direction::North));
        assert!(sides.has(Direction::East));
        assert!(!sides.has(Direction::West));
        assert_eq!(sides.count(), 2);
        assert_eq!(
            sides.directions().collect::<Vec<_>>(),
            vec![Direction::North, Direction::East]
        );
    }

    #[test]
    fn test_none_has_no_sides() {
        let response = CollisionResponse::NONE;
        assert!(!response.collided);
        assert!(response.sides.is_empty());
        assert_eq!(response, CollisionResponse::default());
    }
}
