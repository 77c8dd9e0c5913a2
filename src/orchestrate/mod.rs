//! Request orchestration pipeline: routing, dispatch, synthesis.

pub mod dispatcher;
pub mod orchestrator;
pub mod router;
pub mod synthesizer;

pub use dispatcher::{Dispatcher, EventSink};
pub use orchestrator::{render_content, Orchestrator};
pub use router::route;
pub use synthesizer::Synthesizer;
