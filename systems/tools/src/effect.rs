//! Capabilities a tool needs while it edits the map.

use std::collections::BTreeMap;

use citysim_core::{CityLocation, CityMessage, CitySound, Event, TileId};
use citysim_tiles::TileRegistry;
use citysim_world::TileMap;

/// Spend request that would push the running total past the available funds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shortfall {
    /// Total the stroke would have spent including the refused amount.
    pub needed: i64,
    /// Funds available when the stroke started.
    pub available: i64,
}

/// Narrow interface through which a tool reads and writes the city.
///
/// Coordinates are relative to the origin of the effect; see [`Translated`].
pub trait ToolEffect {
    /// Tile at the offset, or [`TileId::CLEAR`] outside the map.
    fn get_tile(&self, dx: i32, dy: i32) -> TileId;

    /// Replaces the tile at the offset; ignored outside the map.
    fn set_tile(&mut self, dx: i32, dy: i32, id: TileId);

    /// Adds `amount` to the running total, refusing when funds run out.
    ///
    /// A refused amount is not added to the total.
    fn spend(&mut self, amount: i64) -> Result<(), Shortfall>;

    /// Plays a sound at the offset.
    fn make_sound(&mut self, dx: i32, dy: i32, sound: CitySound);

    /// Shows a message about the offset.
    fn send_message(&mut self, dx: i32, dy: i32, message: CityMessage);
}

impl<E: ToolEffect + ?Sized> ToolEffect for &mut E {
    fn get_tile(&self, dx: i32, dy: i32) -> TileId {
        (**self).get_tile(dx, dy)
    }

    fn set_tile(&mut self, dx: i32, dy: i32, id: TileId) {
        (**self).set_tile(dx, dy, id);
    }

    fn spend(&mut self, amount: i64) -> Result<(), Shortfall> {
        (**self).spend(amount)
    }

    fn make_sound(&mut self, dx: i32, dy: i32, sound: CitySound) {
        (**self).make_sound(dx, dy, sound);
    }

    fn send_message(&mut self, dx: i32, dy: i32, message: CityMessage) {
        (**self).send_message(dx, dy, message);
    }
}

#[derive(Debug, Default)]
struct Ledger {
    available: i64,
    spent: i64,
}

impl Ledger {
    fn charge(&mut self, amount: i64) -> Result<(), Shortfall> {
        let needed = self.spent + amount;
        if needed > self.available {
            return Err(Shortfall {
                needed,
                available: self.available,
            });
        }
        self.spent = needed;
        Ok(())
    }
}

/// Effect writing straight into a tile map, anchored at the map origin.
///
/// Every write lands immediately; there is no staging or rollback.
#[derive(Debug)]
pub struct MapEffect<'a> {
    map: &'a mut TileMap,
    registry: &'a TileRegistry,
    ledger: Ledger,
    events: &'a mut Vec<Event>,
}

impl<'a> MapEffect<'a> {
    /// Creates an effect that may spend up to `funds`.
    pub fn new(
        map: &'a mut TileMap,
        registry: &'a TileRegistry,
        funds: i64,
        events: &'a mut Vec<Event>,
    ) -> Self {
        Self {
            map,
            registry,
            ledger: Ledger {
                available: funds,
                spent: 0,
            },
            events,
        }
    }

    /// Total accepted by [`ToolEffect::spend`] so far.
    #[must_use]
    pub fn spent(&self) -> i64 {
        self.ledger.spent
    }

    /// Releases the map and returns the total spent.
    #[must_use]
    pub fn finish(self) -> i64 {
        self.ledger.spent
    }
}

impl ToolEffect for MapEffect<'_> {
    fn get_tile(&self, dx: i32, dy: i32) -> TileId {
        self.map.tile_id(CityLocation::new(dx, dy))
    }

    fn set_tile(&mut self, dx: i32, dy: i32, id: TileId) {
        self.map
            .set_tile(CityLocation::new(dx, dy), self.registry.cell_for(id));
    }

    fn spend(&mut self, amount: i64) -> Result<(), Shortfall> {
        self.ledger.charge(amount)
    }

    fn make_sound(&mut self, dx: i32, dy: i32, sound: CitySound) {
        self.events.push(Event::CitySound {
            sound,
            location: CityLocation::new(dx, dy),
        });
    }

    fn send_message(&mut self, dx: i32, dy: i32, message: CityMessage) {
        self.events.push(Event::CityMessage {
            message,
            location: Some(CityLocation::new(dx, dy)),
        });
    }
}

/// Effect that records writes in an overlay and leaves the map untouched.
#[derive(Debug)]
pub struct PreviewEffect<'a> {
    map: &'a TileMap,
    overlay: BTreeMap<CityLocation, TileId>,
    ledger: Ledger,
    sounds: Vec<(CityLocation, CitySound)>,
}

impl<'a> PreviewEffect<'a> {
    /// Creates a preview over `map` that may spend up to `funds`.
    #[must_use]
    pub fn new(map: &'a TileMap, funds: i64) -> Self {
        Self {
            map,
            overlay: BTreeMap::new(),
            ledger: Ledger {
                available: funds,
                spent: 0,
            },
            sounds: Vec::new(),
        }
    }

    /// Total accepted so far.
    #[must_use]
    pub fn spent(&self) -> i64 {
        self.ledger.spent
    }

    /// Tiles the tool would write, in row-major order.
    #[must_use]
    pub fn changes(&self) -> Vec<(CityLocation, TileId)> {
        self.overlay
            .iter()
            .map(|(location, id)| (*location, *id))
            .collect()
    }

    /// Sounds the tool would play.
    #[must_use]
    pub fn sounds(&self) -> &[(CityLocation, CitySound)] {
        &self.sounds
    }
}

impl ToolEffect for PreviewEffect<'_> {
    fn get_tile(&self, dx: i32, dy: i32) -> TileId {
        let location = CityLocation::new(dx, dy);
        self.overlay
            .get(&location)
            .copied()
            .unwrap_or_else(|| self.map.tile_id(location))
    }

    fn set_tile(&mut self, dx: i32, dy: i32, id: TileId) {
        let location = CityLocation::new(dx, dy);
        if self.map.test_bounds(location) {
            let _ = self.overlay.insert(location, id);
        }
    }

    fn spend(&mut self, amount: i64) -> Result<(), Shortfall> {
        self.ledger.charge(amount)
    }

    fn make_sound(&mut self, dx: i32, dy: i32, sound: CitySound) {
        self.sounds.push((CityLocation::new(dx, dy), sound));
    }

    fn send_message(&mut self, _dx: i32, _dy: i32, _message: CityMessage) {}
}

/// View over another effect shifted by a fixed offset.
///
/// Nesting views sums their offsets, so a view of a view still talks to the
/// underlying effect in a single hop.
#[derive(Debug)]
pub struct Translated<E> {
    inner: E,
    dx: i32,
    dy: i32,
}

impl<E: ToolEffect> Translated<E> {
    /// Wraps `inner` so that local `(0, 0)` maps to `(dx, dy)`.
    pub fn new(inner: E, dx: i32, dy: i32) -> Self {
        Self { inner, dx, dy }
    }

    /// Shifts the view further by `(dx, dy)`.
    #[must_use]
    pub fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            inner: self.inner,
            dx: self.dx + dx,
            dy: self.dy + dy,
        }
    }

    /// Borrows a sub-view whose origin sits at local `(dx, dy)`.
    pub fn view(&mut self, dx: i32, dy: i32) -> Translated<&mut E> {
        Translated {
            inner: &mut self.inner,
            dx: self.dx + dx,
            dy: self.dy + dy,
        }
    }

    /// Offset of local `(0, 0)` in the underlying effect.
    #[must_use]
    pub fn origin(&self) -> (i32, i32) {
        (self.dx, self.dy)
    }
}

impl<E: ToolEffect> ToolEffect for Translated<E> {
    fn get_tile(&self, dx: i32, dy: i32) -> TileId {
        self.inner.get_tile(self.dx + dx, self.dy + dy)
    }

    fn set_tile(&mut self, dx: i32, dy: i32, id: TileId) {
        self.inner.set_tile(self.dx + dx, self.dy + dy, id);
    }

    fn spend(&mut self, amount: i64) -> Result<(), Shortfall> {
        self.inner.spend(amount)
    }

    fn make_sound(&mut self, dx: i32, dy: i32, sound: CitySound) {
        self.inner.make_sound(self.dx + dx, self.dy + dy, sound);
    }

    fn send_message(&mut self, dx: i32, dy: i32, message: CityMessage) {
        self.inner
            .send_message(self.dx + dx, self.dy + dy, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citysim_tiles::well_known::TREE_BASE;

    #[test]
    fn views_compose_by_adding_offsets() {
        let registry = TileRegistry::bundled().expect("bundled catalogue");
        let mut map = TileMap::new(10, 10);
        let mut events = Vec::new();
        let mut effect = MapEffect::new(&mut map, &registry, 0, &mut events);
        {
            let mut outer = Translated::new(&mut effect, 2, 3);
            let mut inner = outer.view(4, 1);
            assert_eq!(inner.origin(), (6, 4));
            inner.set_tile(1, 1, TREE_BASE);
            assert_eq!(outer.get_tile(5, 2), TREE_BASE);
            let shifted = outer.translate(-2, -3);
            assert_eq!(shifted.origin(), (0, 0));
            assert_eq!(shifted.get_tile(7, 5), TREE_BASE);
        }
        let _ = effect.finish();
        assert_eq!(map.tile_id(CityLocation::new(7, 5)), TREE_BASE);
    }

    #[test]
    fn refused_spend_is_not_counted() {
        let map = TileMap::new(2, 2);
        let mut preview = PreviewEffect::new(&map, 25);
        assert!(preview.spend(10).is_ok());
        assert!(preview.spend(10).is_ok());
        assert_eq!(
            preview.spend(10),
            Err(Shortfall {
                needed: 30,
                available: 25
            })
        );
        assert_eq!(preview.spent(), 20);
        assert!(preview.spend(5).is_ok());
    }

    #[test]
    fn previews_never_touch_the_map() {
        let map = TileMap::new(4, 4);
        let mut preview = PreviewEffect::new(&map, 0);
        preview.set_tile(1, 1, TREE_BASE);
        preview.set_tile(9, 9, TREE_BASE);
        assert_eq!(preview.get_tile(1, 1), TREE_BASE);
        assert_eq!(map.tile_id(CityLocation::new(1, 1)), TileId::DIRT);
        assert_eq!(preview.changes(), vec![(CityLocation::new(1, 1), TREE_BASE)]);
    }
}
