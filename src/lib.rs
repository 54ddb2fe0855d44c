//! Elemental Harmony - creature sandbox simulation core

pub mod behavior;
pub mod core;
pub mod ecs;
pub mod entity;
pub mod interact;
pub mod rules;
pub mod simulation;
pub mod spatial;
pub mod world;
