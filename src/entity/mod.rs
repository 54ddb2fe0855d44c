pub mod element;
pub mod elemental;
pub mod needs;
pub mod pet;
pub mod stats;
