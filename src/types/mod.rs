mod api;

pub use api::{ChatRequest, OnboardingAnswers, START_MESSAGE};
