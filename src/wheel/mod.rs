//! Spin physics, speed profiles and rotation-to-item selection.

mod engine;
mod item;
mod random;
pub mod selection;
mod speed;

pub use engine::{SpinEngine, StepOutcome};
pub use item::{parse_questions, segment_color, truncate_text, Item, WheelConfig, DEFAULT_WHEEL_NAME};
pub use speed::SpinSpeed;
