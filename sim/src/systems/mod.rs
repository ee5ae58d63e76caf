//! ECS Systems for the artillery duel.
//!
//! Systems contain the game logic that operates on components.
//!
//! ## Tick Order
//!
//! Every tick runs one chained, single-threaded pass. Order matters: each
//! step reads what the previous one wrote.
//!
//! 1. `turn_clock_system` - advances the per-turn timer
//! 2. `tank_grounding_system` - drops tanks onto the current surface
//! 3. `projectile_motion_system` - integrates the live shell
//! 4. `impact_system` - terrain, then tanks, then off-screen
//! 5. `explosion_system` - grows and fades blast rings
//! 6. `turn_resolution_system` - hands over the turn or ends the match
//! 7. `turn_indicator_system` - bobs the turn arrow
//! 8. `cleanup_system` - despawns resolved shells and spent explosions
//!
//! Explosions spawned by the impact step are flushed before step 5, so they
//! grow on the tick they appear.

pub mod ballistics;
pub mod clock;
pub mod effects;
pub mod impact;
pub mod serialization;
pub mod tank;
pub mod turn;

pub use ballistics::*;
pub use clock::*;
pub use effects::*;
pub use impact::*;
pub use serialization::*;
pub use tank::*;
pub use turn::*;
