//! Scene management
//!
//! A [`Scene`] is a loadable set of top-level entities; the
//! [`SceneManager`] keeps named scenes and switches the active one.
//!
//! ## Architecture
//!
//! ```text
//! SceneManager ──active──► Scene ──contents──► Entity ──► Component
//!                                                  └────► child Entity
//! ```

#[allow(clippy::module_inception)]
mod scene;
mod scene_manager;

pub use scene::Scene;
pub use scene_manager::SceneManager;
