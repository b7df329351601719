// Infrastructure implementations for rev-callgraph: workspace scanning,
// textual prefiltering, call-site matching and cancellation.

pub mod call_matcher;
pub mod concurrency;
pub mod gomod;
pub mod prefilter;
pub mod project_loader;

pub use call_matcher::HeuristicCallerResolver;
pub use concurrency::Cancellation;
pub use project_loader::ProjectLoader;
