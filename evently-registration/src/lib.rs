pub mod orchestrator;

pub use orchestrator::{
    unavailable_reason, RegistrationError, RegistrationOrchestrator, RegistrationOutcome,
};
