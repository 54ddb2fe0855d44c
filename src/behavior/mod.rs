//! Agent behavior: pet and elemental state machines

pub mod elemental;
pub mod pet;
