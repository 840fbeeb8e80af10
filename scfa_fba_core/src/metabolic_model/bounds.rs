//! Flux bounds and per-solve bound overlays
use indexmap::IndexMap;

/// A (lower, upper) flux limit in mmol/gDW/hr
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionBound {
    pub lower: f64,
    pub upper: f64,
}

impl ReactionBound {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Closed reaction, no flux in either direction
    pub fn closed() -> Self {
        Self::new(0., 0.)
    }

    /// Uptake only, at most `magnitude` flowing into the system
    ///
    /// # Note:
    /// Availability is given as a non-negative magnitude, uptake is negative flux,
    /// so the bound becomes (-magnitude, 0)
    pub fn uptake(magnitude: f64) -> Self {
        Self::new(-magnitude, 0.)
    }

    /// Secretion only, at most `magnitude` leaving the system
    pub fn secretion(magnitude: f64) -> Self {
        Self::new(0., magnitude)
    }

    pub fn is_valid(&self) -> bool {
        self.lower <= self.upper
    }
}

/// Bound overrides applied on top of a model for a single optimization
///
/// The model itself is never mutated, the overlay is consulted when the optimization
/// problem is built, so dropping the overlay restores the base bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundOverlay {
    bounds: IndexMap<String, ReactionBound>,
}

impl BoundOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the bounds of a reaction, replacing any earlier override
    pub fn set(&mut self, reaction_id: &str, bound: ReactionBound) {
        self.bounds.insert(reaction_id.to_string(), bound);
    }

    pub fn get(&self, reaction_id: &str) -> Option<&ReactionBound> {
        self.bounds.get(reaction_id)
    }

    pub fn contains(&self, reaction_id: &str) -> bool {
        self.bounds.contains_key(reaction_id)
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ReactionBound)> {
        self.bounds.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptake_flips_sign() {
        let b = ReactionBound::uptake(2.5);
        assert_eq!(b, ReactionBound::new(-2.5, 0.));
        assert!(b.is_valid());
        assert_eq!(ReactionBound::secretion(100.), ReactionBound::new(0., 100.));
        assert!(!ReactionBound::new(1., -1.).is_valid());
    }

    #[test]
    fn overlay_replaces() {
        let mut overlay = BoundOverlay::new();
        assert!(overlay.is_empty());
        overlay.set("EX_ac_e", ReactionBound::uptake(1.));
        overlay.set("EX_ac_e", ReactionBound::uptake(3.));
        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay.get("EX_ac_e"), Some(&ReactionBound::uptake(3.)));
        assert!(!overlay.contains("EX_but_e"));
    }
}
