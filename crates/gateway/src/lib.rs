//! Slide generation gateway: one remote attempt, local heuristics otherwise.

pub mod error;
pub mod gateway;
pub mod remote;

pub use error::{GatewayError, Result};
pub use gateway::{Generation, GenerationGateway, GenerationSource};
pub use remote::{HttpGenerator, RemoteGenerator, GENERATE_PATH};
