//! World sensing: what agents can see around them
//!
//! The sensor is a read-only snapshot rebuilt at the start of every tick.
//! Everything an agent learns about other agents within a tick comes from
//! here; live object state is always re-read from the object registry.

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::core::types::{AgentId, ObjectId, SimRng, Vec2};
use crate::entity::element::ElementType;
use crate::spatial::SparseHashGrid;
use crate::world::nav::NavBounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntityRef {
    Pet(AgentId),
    Elemental(AgentId),
    Object(ObjectId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFilter {
    Any,
    Pets,
    Elementals,
    Objects,
}

impl QueryFilter {
    fn accepts(self, entity: EntityRef) -> bool {
        matches!(
            (self, entity),
            (QueryFilter::Any, _)
                | (QueryFilter::Pets, EntityRef::Pet(_))
                | (QueryFilter::Elementals, EntityRef::Elemental(_))
                | (QueryFilter::Objects, EntityRef::Object(_))
        )
    }
}

/// What other agents can observe about an elemental
#[derive(Debug, Clone, Serialize)]
pub struct AgentView {
    pub id: AgentId,
    pub element: ElementType,
    pub position: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub damage: f32,
    pub stamina_pct: f32,
}

pub trait WorldSensor {
    /// Entities within `radius` of `center`, nearest first, ties broken by id
    fn query_nearby(&self, center: Vec2, radius: f32, filter: QueryFilter) -> Vec<EntityRef>;

    /// A navigable point within `radius` of `center`, if one can be found
    fn sample_navigable_point(&self, center: Vec2, radius: f32, rng: &mut SimRng) -> Option<Vec2>;

    fn is_navigable(&self, point: Vec2) -> bool;

    fn elemental(&self, id: AgentId) -> Option<&AgentView>;

    fn position_of(&self, entity: EntityRef) -> Option<Vec2>;
}

/// Spatial-hash backed sensor over a bounded plane
pub struct SpatialSensor {
    nav: NavBounds,
    grid: SparseHashGrid<EntityRef>,
    elementals: AHashMap<AgentId, AgentView>,
    pets: AHashMap<AgentId, Vec2>,
    objects: AHashMap<ObjectId, Vec2>,
}

impl SpatialSensor {
    pub fn new(nav: NavBounds, cell_size: f32) -> Self {
        Self {
            nav,
            grid: SparseHashGrid::new(cell_size),
            elementals: AHashMap::new(),
            pets: AHashMap::new(),
            objects: AHashMap::new(),
        }
    }

    pub fn insert_elemental(&mut self, view: AgentView) {
        self.grid.insert(EntityRef::Elemental(view.id), view.position);
        self.elementals.insert(view.id, view);
    }

    pub fn insert_pet(&mut self, id: AgentId, position: Vec2) {
        self.grid.insert(EntityRef::Pet(id), position);
        self.pets.insert(id, position);
    }

    pub fn insert_object(&mut self, id: ObjectId, position: Vec2) {
        self.grid.insert(EntityRef::Object(id), position);
        self.objects.insert(id, position);
    }

    pub fn nav(&self) -> &NavBounds {
        &self.nav
    }
}

impl WorldSensor for SpatialSensor {
    fn query_nearby(&self, center: Vec2, radius: f32, filter: QueryFilter) -> Vec<EntityRef> {
        let mut hits: Vec<(EntityRef, f32)> = self
            .grid
            .query_radius(center, radius)
            .into_iter()
            .filter(|(entity, _)| filter.accepts(*entity))
            .collect();
        hits.sort_by_key(|(entity, d)| (OrderedFloat(*d), *entity));
        hits.into_iter().map(|(entity, _)| entity).collect()
    }

    fn sample_navigable_point(&self, center: Vec2, radius: f32, rng: &mut SimRng) -> Option<Vec2> {
        self.nav.sample_point(center, radius, rng)
    }

    fn is_navigable(&self, point: Vec2) -> bool {
        self.nav.is_navigable(point)
    }

    fn elemental(&self, id: AgentId) -> Option<&AgentView> {
        self.elementals.get(&id)
    }

    fn position_of(&self, entity: EntityRef) -> Option<Vec2> {
        match entity {
            EntityRef::Pet(id) => self.pets.get(&id).copied(),
            EntityRef::Elemental(id) => self.elementals.get(&id).map(|v| v.position),
            EntityRef::Object(id) => self.objects.get(&id).copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(id: u32, element: ElementType, x: f32) -> AgentView {
        AgentView {
            id: AgentId(id),
            element,
            position: Vec2::new(x, 0.0),
            hp: 100.0,
            max_hp: 100.0,
            damage: 10.0,
            stamina_pct: 1.0,
        }
    }

    fn sensor() -> SpatialSensor {
        SpatialSensor::new(NavBounds::new(Vec2::new(-50.0, -50.0), Vec2::new(50.0, 50.0)), 5.0)
    }

    #[test]
    fn test_query_sorted_by_distance_then_id() {
        let mut s = sensor();
        s.insert_elemental(view(3, ElementType::Fire, 4.0));
        s.insert_elemental(view(2, ElementType::Water, -4.0));
        s.insert_elemental(view(1, ElementType::Nature, 2.0));
        s.insert_object(ObjectId(9), Vec2::new(1.0, 0.0));

        let hits = s.query_nearby(Vec2::ZERO, 10.0, QueryFilter::Elementals);
        assert_eq!(
            hits,
            vec![
                EntityRef::Elemental(AgentId(1)),
                EntityRef::Elemental(AgentId(2)),
                EntityRef::Elemental(AgentId(3)),
            ]
        );

        let all = s.query_nearby(Vec2::ZERO, 10.0, QueryFilter::Any);
        assert_eq!(all[0], EntityRef::Object(ObjectId(9)));
    }

    #[test]
    fn test_lookups() {
        let mut s = sensor();
        s.insert_pet(AgentId(5), Vec2::new(1.0, 2.0));
        s.insert_elemental(view(6, ElementType::Fire, 3.0));
        assert_eq!(s.position_of(EntityRef::Pet(AgentId(5))), Some(Vec2::new(1.0, 2.0)));
        assert_eq!(s.elemental(AgentId(6)).map(|v| v.element), Some(ElementType::Fire));
        assert!(s.elemental(AgentId(5)).is_none());
    }
}
