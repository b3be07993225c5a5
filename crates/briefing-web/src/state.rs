use shared::{BriefingPipeline, Config, HistoryStore, ProfileStore, RunOutcome};
use tokio::sync::Mutex;

/// What the single user currently sees
#[derive(Debug, Default)]
pub struct SessionState {
    pub selected: Option<String>,
    pub outcome: Option<RunOutcome>,
    /// Shown once on the next page load
    pub notice: Option<String>,
}

impl SessionState {
    /// Keep the selection if it still names a profile, otherwise fall back to the first one
    pub fn reconcile(&mut self, names: &[String]) -> Option<String> {
        let valid = self
            .selected
            .as_ref()
            .map(|s| names.contains(s))
            .unwrap_or(false);

        if !valid {
            self.selected = names.first().cloned();
            self.outcome = None;
        }
        self.selected.clone()
    }

    /// Switch profiles and drop whatever was shown for the old one
    pub fn select(&mut self, name: String) {
        if self.selected.as_deref() != Some(name.as_str()) {
            self.outcome = None;
        }
        self.selected = Some(name);
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}

pub struct AppState {
    pub config: Config,
    pub pipeline: BriefingPipeline,
    pub profiles: ProfileStore,
    pub history: HistoryStore,
    pub session: Mutex<SessionState>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            pipeline: BriefingPipeline::from_config(&config),
            profiles: ProfileStore::in_dir(&config.data_dir),
            history: HistoryStore::in_dir(&config.data_dir),
            session: Mutex::new(SessionState::default()),
            config,
        }
    }
}
