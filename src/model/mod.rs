pub mod config;
pub mod context;
pub mod extracted;
pub mod ioc;
pub mod report;
pub mod technique;

pub use config::{Config, LlmProvider, PipelineConfig, SearchConfig};
pub use context::ContextSnippet;
pub use ioc::{Ioc, IocCategory};
pub use report::{AnalysisReport, AnalysisStats};
pub use technique::{TechniqueCandidate, TechniqueMapping};
