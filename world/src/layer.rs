use citysim_core::CityLocation;

/// Dense per-tile value layer with the same dimensions as the tile map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer<T> {
    width: u32,
    height: u32,
    values: Vec<T>,
}

impl<T: Copy + Default> Layer<T> {
    /// Creates a layer filled with the default value.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            values: vec![T::default(); width as usize * height as usize],
        }
    }

    fn index(&self, location: CityLocation) -> Option<usize> {
        let x = u32::try_from(location.x()).ok()?;
        let y = u32::try_from(location.y()).ok()?;
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    /// Value at the location, or the default outside the layer.
    #[must_use]
    pub fn get(&self, location: CityLocation) -> T {
        self.index(location)
            .map_or_else(T::default, |index| self.values[index])
    }

    /// Stores a value; ignored outside the layer.
    pub fn set(&mut self, location: CityLocation, value: T) {
        if let Some(index) = self.index(location) {
            self.values[index] = value;
        }
    }

    /// Overwrites every value.
    pub fn fill(&mut self, value: T) {
        self.values.fill(value);
    }

    /// Rewrites every value in place.
    pub fn update(&mut self, mut f: impl FnMut(T) -> T) {
        for value in &mut self.values {
            *value = f(*value);
        }
    }

    /// Values in row-major order.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl Layer<u8> {
    /// Mean of the values at the given locations, zero when there are none.
    #[must_use]
    pub fn mean_over(&self, locations: impl IntoIterator<Item = CityLocation>) -> u8 {
        let (sum, count) = locations
            .into_iter()
            .fold((0u64, 0u64), |(sum, count), location| {
                (sum + u64::from(self.get(location)), count + 1)
            });
        if count == 0 {
            0
        } else {
            (sum / count) as u8
        }
    }
}
