//! Guarded gate → classify → emit sequence
//!
//! [`Tracker::run`] is the single error boundary of the core. Whatever goes
//! wrong in a collaborator (environment read, session storage, emitter, or a
//! panic inside any of them) is logged and swallowed; the host page never
//! sees a tagging failure. Nothing is retried.

use crate::classifier::{Classification, PatternClassifier, TrafficSource};
use crate::config::TaggingConfig;
use crate::emitter::{DataLayerEntry, Emitter};
use crate::encoding::{EncodedTag, TagFormat};
use crate::environment::{VisitContext, VisitEnvironment};
use crate::gate::{self, GateDecision};
use crate::Result;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// What happened during one tracking attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Gate declined or no rule matched; nothing was pushed
    Skipped,
    /// Exactly one entry was pushed
    Emitted(DataLayerEntry),
    /// A collaborator failed; the message was logged and swallowed
    Failed(String),
}

/// Tagging core bound to one configuration
#[derive(Debug, Clone)]
pub struct Tracker {
    config: TaggingConfig,
    format: TagFormat,
    classifier: PatternClassifier,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(TaggingConfig::default())
    }
}

impl Tracker {
    pub fn new(config: TaggingConfig) -> Self {
        let classifier = config.classifier();
        let format = config.format();
        Self {
            config,
            format,
            classifier,
        }
    }

    /// Run one attempt for the current page load
    pub fn run(&self, env: &dyn VisitEnvironment, emitter: &dyn Emitter) -> TrackOutcome {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| self.try_run(env, emitter)));
        match attempt {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                warn!("Error in campaign tracking: {}", e);
                TrackOutcome::Failed(e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!("Error in campaign tracking: {}", message);
                TrackOutcome::Failed(message)
            }
        }
    }

    fn try_run(&self, env: &dyn VisitEnvironment, emitter: &dyn Emitter) -> Result<TrackOutcome> {
        let ctx = VisitContext::read(
            env,
            &self.config.session_counter_key,
            &self.config.data_layer_key,
        )?;

        let value = match self.resolve(&ctx) {
            Classification::Explicit(identifier) => identifier,
            Classification::Source(source) => self.encode(&source).to_string(),
            Classification::NoMatch => return Ok(TrackOutcome::Skipped),
        };

        let entry = DataLayerEntry::new(self.config.data_layer_key.clone(), value);
        emitter.push(entry.clone())?;
        info!("Traffic source recorded: {}", entry.value);
        Ok(TrackOutcome::Emitted(entry))
    }

    /// Gate the visit, then classify when the gate asks for it
    pub fn resolve(&self, ctx: &VisitContext) -> Classification {
        let decision = gate::decide(ctx, &self.config.query_parameter);
        debug!("Gate decision: {:?}", decision);
        match decision {
            GateDecision::Skip => Classification::NoMatch,
            GateDecision::UseExplicit(identifier) => Classification::Explicit(identifier),
            GateDecision::Direct => Classification::Source(TrafficSource::no_referrer()),
            GateDecision::Classify => self.classifier.classify(&ctx.referrer),
        }
    }

    pub fn encode(&self, source: &TrafficSource) -> EncodedTag {
        EncodedTag::encode(source, &self.format)
    }
}

/// Run one attempt with the built-in configuration
pub fn track_campaign(env: &dyn VisitEnvironment, emitter: &dyn Emitter) -> TrackOutcome {
    Tracker::default().run(env, emitter)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
