//! Tile coordinates and axis-aligned rectangles.

use serde::{Deserialize, Serialize};

/// Location of a single tile expressed as column and row coordinates.
///
/// Coordinates are signed so that footprint translation and out-of-bounds
/// requests remain representable without wrapping. Rows compare before
/// columns, so sorted locations follow row-major order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CityLocation {
    y: i32,
    x: i32,
}

impl CityLocation {
    /// Creates a new tile location.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    /// Zero-based column of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the location shifted by the provided delta.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Orthogonal neighbours in north, east, south, west order.
    #[must_use]
    pub const fn neighbors4(self) -> [CityLocation; 4] {
        [
            self.offset(0, -1),
            self.offset(1, 0),
            self.offset(0, 1),
            self.offset(-1, 0),
        ]
    }

    /// Diagonal neighbours in north-west, north-east, south-west, south-east order.
    #[must_use]
    pub const fn diagonals(self) -> [CityLocation; 4] {
        [
            self.offset(-1, -1),
            self.offset(1, -1),
            self.offset(-1, 1),
            self.offset(1, 1),
        ]
    }

    /// Computes the Manhattan distance between two locations.
    #[must_use]
    pub fn manhattan_distance(self, other: CityLocation) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Axis-aligned rectangle expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CityRect {
    origin: CityLocation,
    width: u32,
    height: u32,
}

impl CityRect {
    /// Constructs a rectangle from its upper-left tile and size.
    #[must_use]
    pub const fn new(origin: CityLocation, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Smallest rectangle containing both corner tiles.
    #[must_use]
    pub fn from_corners(a: CityLocation, b: CityLocation) -> Self {
        let origin = CityLocation::new(a.x().min(b.x()), a.y().min(b.y()));
        let width = a.x().abs_diff(b.x()).saturating_add(1);
        let height = a.y().abs_diff(b.y()).saturating_add(1);
        Self::new(origin, width, height)
    }

    /// Square footprint of `size` tiles anchored on `center`.
    ///
    /// Footprints of three or more tiles place the anchor one tile in from the
    /// upper-left corner; smaller footprints start at the anchor itself.
    #[must_use]
    pub fn centered_on(center: CityLocation, size: u32) -> Self {
        let inset = if size >= 3 { 1 } else { 0 };
        Self::new(center.offset(-inset, -inset), size, size)
    }

    /// Upper-left tile of the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CityLocation {
        self.origin
    }

    /// Width of the rectangle in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of tiles covered by the rectangle.
    #[must_use]
    pub const fn area(&self) -> u32 {
        self.width * self.height
    }

    /// Reports whether the location lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, location: CityLocation) -> bool {
        let dx = location.x() - self.origin.x();
        let dy = location.y() - self.origin.y();
        dx >= 0 && dy >= 0 && (dx as u32) < self.width && (dy as u32) < self.height
    }

    /// Nearest covered tile to `location`.
    ///
    /// An empty rectangle clamps everything to its origin.
    #[must_use]
    pub fn clamp(&self, location: CityLocation) -> CityLocation {
        let last = |start: i32, extent: u32| {
            let span = i32::try_from(extent.saturating_sub(1)).unwrap_or(i32::MAX);
            start.saturating_add(span)
        };
        let x = location
            .x()
            .clamp(self.origin.x(), last(self.origin.x(), self.width));
        let y = location
            .y()
            .clamp(self.origin.y(), last(self.origin.y(), self.height));
        CityLocation::new(x, y)
    }

    /// Returns the rectangle shifted by the provided delta.
    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self::new(self.origin.offset(dx, dy), self.width, self.height)
    }

    /// Returns the rectangle grown by `by` tiles on every side.
    #[must_use]
    pub const fn inflate(self, by: u32) -> Self {
        Self::new(
            self.origin.offset(-(by as i32), -(by as i32)),
            self.width + 2 * by,
            self.height + 2 * by,
        )
    }

    /// Tiles bordering the rectangle on the outside, in row-major order.
    pub fn perimeter(&self) -> impl Iterator<Item = CityLocation> {
        let inner = *self;
        self.inflate(1)
            .locations()
            .filter(move |location| !inner.contains(*location))
    }

    /// Iterates over every covered location in row-major order.
    pub fn locations(&self) -> impl Iterator<Item = CityLocation> {
        let origin = self.origin;
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |dy| (0..width).map(move |dx| origin.offset(dx, dy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_sort_in_row_major_order() {
        let mut locations = vec![
            CityLocation::new(3, 1),
            CityLocation::new(0, 2),
            CityLocation::new(5, 0),
            CityLocation::new(1, 1),
        ];
        locations.sort();
        assert_eq!(
            locations,
            vec![
                CityLocation::new(5, 0),
                CityLocation::new(1, 1),
                CityLocation::new(3, 1),
                CityLocation::new(0, 2),
            ]
        );
    }

    #[test]
    fn clamp_pulls_far_locations_onto_the_edge() {
        let rect = CityRect::new(CityLocation::new(0, 0), 10, 8);
        assert_eq!(rect.clamp(CityLocation::new(4, 3)), CityLocation::new(4, 3));
        assert_eq!(
            rect.clamp(CityLocation::new(i32::MIN, i32::MAX)),
            CityLocation::new(0, 7)
        );
        assert_eq!(rect.clamp(CityLocation::new(i32::MAX, -1)), CityLocation::new(9, 0));
    }

    #[test]
    fn corners_at_the_extremes_do_not_overflow() {
        let rect = CityRect::from_corners(
            CityLocation::new(i32::MIN, 0),
            CityLocation::new(i32::MAX, 0),
        );
        assert_eq!(rect.width(), u32::MAX);
        assert_eq!(rect.height(), 1);
    }

    #[test]
    fn centered_footprint_insets_large_buildings() {
        let center = CityLocation::new(10, 10);
        let zone = CityRect::centered_on(center, 3);
        assert_eq!(zone.origin(), CityLocation::new(9, 9));
        assert_eq!(zone.area(), 9);

        let single = CityRect::centered_on(center, 1);
        assert_eq!(single.origin(), center);
        assert_eq!(single.area(), 1);
    }

    #[test]
    fn from_corners_normalizes_drag_direction() {
        let rect = CityRect::from_corners(CityLocation::new(5, 2), CityLocation::new(1, 4));
        assert_eq!(rect.origin(), CityLocation::new(1, 2));
        assert_eq!((rect.width(), rect.height()), (5, 3));
    }

    #[test]
    fn contains_rejects_edges_outside_rectangle() {
        let rect = CityRect::new(CityLocation::new(2, 2), 2, 2);
        assert!(rect.contains(CityLocation::new(3, 3)));
        assert!(!rect.contains(CityLocation::new(4, 3)));
        assert!(!rect.contains(CityLocation::new(1, 2)));
        assert_eq!(rect.locations().count(), 4);
    }

    #[test]
    fn perimeter_rings_the_rectangle() {
        let rect = CityRect::new(CityLocation::new(1, 1), 3, 3);
        let ring: Vec<_> = rect.perimeter().collect();
        assert_eq!(ring.len(), 16);
        assert!(ring.iter().all(|location| !rect.contains(*location)));
        assert_eq!(ring[0], CityLocation::new(0, 0));
    }
}
