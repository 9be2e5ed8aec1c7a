pub mod cancel;
pub mod orchestrator;
pub mod overlap;
pub mod progress;
pub mod run;
pub mod stats;

pub use cancel::CancelToken;
pub use orchestrator::ComparisonOrchestrator;
pub use progress::{LogProgress, NoopProgress, ProgressSink};
pub use run::{ComparisonRun, PairResult, ProviderOutcome};
pub use stats::{aggregate, ProviderStats, RunStats};
