pub mod delay;
pub mod scheduler;
pub mod segmenter;

pub use scheduler::{RevealProgress, RevealScheduler, RevealTick};
pub use segmenter::segment_text;
