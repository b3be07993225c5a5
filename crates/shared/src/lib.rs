// Public modules
pub mod config;
pub mod error;
pub mod history;
mod http;
pub mod io;
pub mod models;
pub mod news;
pub mod page;
pub mod pipeline;
pub mod profiles;
pub mod prompt;
pub mod summarizer;
pub mod weather;

// Re-export commonly used types
pub use config::{Config, Credentials, Endpoints, PipelineSettings};
pub use error::{BriefingError, Provider, Result};
pub use history::{HistoryEntry, HistoryStore};
pub use models::{
    Briefing, ForecastEntry, Headline, HeadlineSet, Profile, TopicHeadlines, Units, WeatherReport,
};
pub use news::NewsClient;
pub use page::{PageRenderer, PageView, RunOutcome};
pub use pipeline::BriefingPipeline;
pub use profiles::ProfileStore;
pub use prompt::{compose_prompt, PromptInput};
pub use summarizer::ClaudeSummarizer;
pub use weather::WeatherClient;
