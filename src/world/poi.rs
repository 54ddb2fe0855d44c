//! Points of interest pets walk to: food bowls, beds, toys, baths

use serde::{Deserialize, Serialize};

use crate::core::types::{PoiId, Vec2};

pub const FOOD: &str = "Food";
pub const BED: &str = "Bed";
pub const TOY: &str = "Toy";
pub const BATH: &str = "Bath";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: PoiId,
    /// Not unique: many POIs can share a tag
    pub tag: String,
    pub position: Vec2,
    pub interaction_radius: f32,
    pub active: bool,
}

impl PointOfInterest {
    pub fn in_reach(&self, point: Vec2) -> bool {
        self.position.distance(&point) <= self.interaction_radius
    }
}

#[derive(Debug, Default)]
pub struct PoiRegistry {
    pois: Vec<PointOfInterest>,
}

impl PoiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, poi: PointOfInterest) {
        self.pois.push(poi);
    }

    pub fn get(&self, id: PoiId) -> Option<&PointOfInterest> {
        self.pois.iter().find(|p| p.id == id)
    }

    pub fn set_active(&mut self, id: PoiId, active: bool) -> bool {
        match self.pois.iter_mut().find(|p| p.id == id) {
            Some(poi) => {
                poi.active = active;
                true
            }
            None => false,
        }
    }

    /// Nearest active POI with `tag`; earliest registered wins ties
    pub fn nearest(&self, tag: &str, from: Vec2) -> Option<&PointOfInterest> {
        let mut best: Option<(&PointOfInterest, f32)> = None;
        for poi in self.pois.iter().filter(|p| p.active && p.tag == tag) {
            let d = poi.position.distance(&from);
            match best {
                Some((_, bd)) if bd <= d => {}
                _ => best = Some((poi, d)),
            }
        }
        best.map(|(poi, _)| poi)
    }

    /// Nearest active POI with `tag` no farther than `radius`
    pub fn nearest_within(&self, tag: &str, from: Vec2, radius: f32) -> Option<&PointOfInterest> {
        self.nearest(tag, from).filter(|p| p.position.distance(&from) <= radius)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointOfInterest> {
        self.pois.iter()
    }

    pub fn len(&self) -> usize {
        self.pois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poi(id: u32, tag: &str, x: f32) -> PointOfInterest {
        PointOfInterest {
            id: PoiId(id),
            tag: tag.to_string(),
            position: Vec2::new(x, 0.0),
            interaction_radius: 1.0,
            active: true,
        }
    }

    #[test]
    fn test_nearest_filters_by_tag_and_active() {
        let mut reg = PoiRegistry::new();
        reg.add(poi(1, FOOD, 10.0));
        reg.add(poi(2, FOOD, 3.0));
        reg.add(poi(3, BED, 1.0));

        assert_eq!(reg.nearest(FOOD, Vec2::ZERO).map(|p| p.id), Some(PoiId(2)));

        reg.set_active(PoiId(2), false);
        assert_eq!(reg.nearest(FOOD, Vec2::ZERO).map(|p| p.id), Some(PoiId(1)));
        assert!(reg.nearest(TOY, Vec2::ZERO).is_none());
    }

    #[test]
    fn test_nearest_within_radius() {
        let mut reg = PoiRegistry::new();
        reg.add(poi(1, TOY, 10.0));
        assert!(reg.nearest_within(TOY, Vec2::ZERO, 5.0).is_none());
        assert!(reg.nearest_within(TOY, Vec2::ZERO, 15.0).is_some());
    }

    #[test]
    fn test_ties_go_to_first_registered() {
        let mut reg = PoiRegistry::new();
        reg.add(poi(1, BED, 2.0));
        reg.add(poi(2, BED, -2.0));
        assert_eq!(reg.nearest(BED, Vec2::ZERO).map(|p| p.id), Some(PoiId(1)));
    }
}
