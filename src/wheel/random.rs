use rand::Rng;

/// Source of uniform draws in `[0, 1)` for the spin velocity.
///
/// Any `rand::Rng` qualifies, so a seeded `StdRng` gives reproducible spins.
pub trait UnitSource {
    fn next_unit(&mut self) -> f64;
}

impl<R: Rng> UnitSource for R {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Always returns the same draw
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedUnit(pub f64);

#[cfg(test)]
impl UnitSource for FixedUnit {
    fn next_unit(&mut self) -> f64 {
        self.0
    }
}
