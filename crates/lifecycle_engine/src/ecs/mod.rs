//! Entity-Component runtime objects
//!
//! Entities own uniquely-kinded components and child entities and cascade
//! their lifecycle to them; repositories track every live instance of a kind.

pub mod component;
pub mod entity;
pub mod repository;

#[cfg(test)]
mod tests;

pub use component::{AsAny, Component, ComponentCore};
pub use entity::Entity;
pub use repository::Repository;
