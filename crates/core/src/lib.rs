//! Core domain types, keyword heuristics, slide assembly and feedback
//! storage for generated presentations.

pub mod assemble;
pub mod classify;
pub mod error;
pub mod feedback;
pub mod prompt;
pub mod types;
pub mod wire;

pub use assemble::{estimate_presentation_time, SlideAssembler};
pub use error::{Error, Result};
pub use feedback::{
    FeedbackEntry, FeedbackStats, FeedbackStore, JsonFileFeedbackStore, MemoryFeedbackStore, Rating,
};
pub use prompt::{build_generation_prompt, StyleSpec, HOUSE_STYLE};
pub use types::{Audience, GeneratedSlide, RequestedSlideType, SlideKind, SlideLayout, SlideRequest};
pub use wire::{ErrorBody, GenerationPayload, GenerationResponse};
