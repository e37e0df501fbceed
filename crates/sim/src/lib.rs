pub mod geometry;
pub mod threat;
pub mod radar;
pub mod movement;
pub mod targeting;
pub mod baneblade;
pub mod policy;
pub mod physics;
pub mod match_loop;
pub mod analyzer;

pub use baneblade::BanebladePolicy;
pub use match_loop::*;
pub use physics::*;
pub use policy::*;
