pub mod client;
pub mod types;
pub mod video;

pub use client::GenAiClient;
pub use video::{GenerationRequest, PollPolicy, SeedImage, VideoAsset};
