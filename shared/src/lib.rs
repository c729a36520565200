//! Shared library for the Clova extension Lambdas.
//!
//! This crate provides the CEK request/response envelope, the intent router,
//! signature verification, and the store clients used by the extensions.

pub mod config;
pub mod error;
pub mod extension;
pub mod food;
pub mod http;
pub mod request;
pub mod response;
pub mod router;
pub mod search;
pub mod signature;

pub use config::Config;
pub use error::{Error, Result};
pub use extension::Extension;
pub use food::{DynamoFoodStore, FoodRecord, FoodStore};
pub use request::{ClovaRequest, RequestBody};
pub use response::{Message, SpeechResponse};
pub use router::{FixedResponse, Handler, Route, Router, SessionEnded};
pub use search::{display_text, ReadingSource, SearchClient, SensorReading};
pub use signature::SignatureVerifier;
