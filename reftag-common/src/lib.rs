//! # reftag Common Library
//!
//! Traffic-source tagging for a single page visit:
//! - Environment and session-state capabilities
//! - Gating policy (once-per-session attribution)
//! - Ordered referrer pattern classifier
//! - 9-field tag encoding and data-layer emitters
//! - Guarded top-level tracker
//! - Configuration loading

pub mod classifier;
pub mod config;
pub mod emitter;
pub mod encoding;
pub mod environment;
pub mod error;
pub mod gate;
pub mod patterns;
pub mod session;
pub mod tracker;

pub use classifier::{Category, Classification, PatternClassifier, TrafficSource};
pub use emitter::{DataLayerEntry, Emitter};
pub use environment::{VisitContext, VisitEnvironment};
pub use error::{Error, Result};
pub use gate::GateDecision;
pub use tracker::{track_campaign, TrackOutcome};
