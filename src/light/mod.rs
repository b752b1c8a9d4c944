//! Light control: hold coordination, daylight scheduling and the strobe.
//!
//! ```text
//!   CommandSurface ──▶ LightScheduler ──▶ ActuationCoordinator ──▶ Actuator
//!                 └──▶ StrobeEffect ─────────────┘
//! ```

pub mod coordinator;
pub mod scheduler;
pub mod strobe;

pub use coordinator::{ActuationCoordinator, ActuationSnapshot};
pub use scheduler::{LightPlan, LightScheduler, plan_light};
pub use strobe::StrobeEffect;
