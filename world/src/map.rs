use citysim_core::{CityLocation, CityRect, Tile, TileId};
use citysim_tiles::TileRegistry;

/// Rectangular grid of raw tile cells, fixed in size for the lifetime of a city.
///
/// Cells are stored row-major. Reads outside the grid yield `None` or the
/// [`TileId::CLEAR`] sentinel; writes outside the grid are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    width: u32,
    height: u32,
    cells: Vec<Tile>,
}

impl TileMap {
    /// Creates a map of bare dirt.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let cells = vec![Tile::from_id(TileId::DIRT); width as usize * height as usize];
        Self {
            width,
            height,
            cells,
        }
    }

    /// Rebuilds a map from row-major raw cell values.
    pub(crate) fn from_raw(width: u32, height: u32, raw: Vec<u16>) -> Self {
        Self {
            width,
            height,
            cells: raw.into_iter().map(Tile::from_raw).collect(),
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Rectangle covering the whole map.
    #[must_use]
    pub const fn bounds(&self) -> CityRect {
        CityRect::new(CityLocation::new(0, 0), self.width, self.height)
    }

    /// Reports whether the location lies on the map.
    #[must_use]
    pub fn test_bounds(&self, location: CityLocation) -> bool {
        self.index(location).is_some()
    }

    fn index(&self, location: CityLocation) -> Option<usize> {
        let x = u32::try_from(location.x()).ok()?;
        let y = u32::try_from(location.y()).ok()?;
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    /// Raw cell at the location.
    #[must_use]
    pub fn tile(&self, location: CityLocation) -> Option<Tile> {
        self.index(location).map(|index| self.cells[index])
    }

    /// Tile id at the location, or [`TileId::CLEAR`] outside the map.
    #[must_use]
    pub fn tile_id(&self, location: CityLocation) -> TileId {
        self.tile(location).map_or(TileId::CLEAR, |cell| cell.id())
    }

    /// Overwrites the cell at the location.
    pub fn set_tile(&mut self, location: CityLocation, tile: Tile) {
        if let Some(index) = self.index(location) {
            self.cells[index] = tile;
        }
    }

    /// Sets or clears the power bit without touching the tile id.
    pub fn set_powered(&mut self, location: CityLocation, powered: bool) {
        if let Some(index) = self.index(location) {
            self.cells[index] = self.cells[index].with_power(powered);
        }
    }

    /// Clears the power bit on every cell.
    pub fn clear_power(&mut self) {
        for cell in &mut self.cells {
            *cell = cell.with_power(false);
        }
    }

    /// Iterates over every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CityLocation, Tile)> + '_ {
        let width = self.width as usize;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let location = CityLocation::new((index % width) as i32, (index / width) as i32);
            (location, *cell)
        })
    }

    /// Locations of every zone-center cell in row-major order.
    #[must_use]
    pub fn zone_centers(&self) -> Vec<CityLocation> {
        self.iter()
            .filter(|(_, cell)| cell.is_zone_center())
            .map(|(location, _)| location)
            .collect()
    }

    /// Anchor of the building covering the location, if any.
    ///
    /// Member cells find their anchor through the offset recorded in the
    /// registry; the anchor cell must still carry the zone-center bit.
    #[must_use]
    pub fn zone_center_of(
        &self,
        location: CityLocation,
        registry: &TileRegistry,
    ) -> Option<CityLocation> {
        let cell = self.tile(location)?;
        if cell.is_zone_center() {
            return Some(location);
        }
        let (_, (dx, dy)) = registry.owner_of(cell.id())?;
        let center = location.offset(-dx, -dy);
        self.tile(center)
            .filter(|anchor| anchor.is_zone_center())
            .map(|_| center)
    }

    /// Raw cell values in row-major order.
    #[must_use]
    pub fn as_raw(&self) -> Vec<u16> {
        self.cells.iter().map(Tile::raw).collect()
    }

    /// Number of cells carrying the power bit.
    #[must_use]
    pub fn powered_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_powered()).count()
    }
}
