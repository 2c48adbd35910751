pub mod editor;
pub mod input_metrics;
pub mod layout;
pub mod render;
pub mod widgets;
