pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod outcome;
pub mod probe;

pub use credentials::{CredentialContext, CredentialMode, Region};
pub use dispatcher::{Dispatcher, GatingPolicy, ProbeDispatcher};
pub use error::{ConfigurationError, ScanError};
pub use outcome::{ProbeOutcome, SkipReason, TransportError, TransportErrorKind};
pub use probe::{Category, Method, ProbeDefinition, QueryWindow, SummaryHint};
