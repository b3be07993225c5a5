use anyhow::Context;
use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, Redirect},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::{HistoryEntry, PageRenderer, PageView, Profile, RunOutcome, Units};
use std::sync::Arc;

use crate::state::AppState;

type HandlerError = (StatusCode, String);

fn internal(e: anyhow::Error) -> HandlerError {
    tracing::error!(error = %e, "Request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
}

/// Run a file-backed store call on the blocking pool
async fn blocking<T, F>(state: &Arc<AppState>, f: F) -> anyhow::Result<T>
where
    F: FnOnce(&AppState) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .context("Store task panicked")?
}

#[derive(Deserialize)]
pub struct SelectForm {
    name: String,
}

#[derive(Deserialize)]
pub struct ProfileForm {
    name: String,
    city: String,
    units: Units,
    /// One topic per line
    topics: String,
    briefing_tone: String,
    /// Kept as text so a blank field reaches the handler
    max_articles_per_topic: String,
}

impl ProfileForm {
    fn into_parts(self) -> anyhow::Result<(String, Profile)> {
        let max_articles_per_topic = match self.max_articles_per_topic.trim() {
            "" => Profile::default().max_articles_per_topic,
            raw => raw.parse().map_err(|_| {
                anyhow::anyhow!("Max articles per topic must be a whole number, got '{}'.", raw)
            })?,
        };
        let profile = Profile {
            city: self.city,
            units: self.units,
            topics: self.topics.lines().map(str::to_string).collect(),
            briefing_tone: self.briefing_tone,
            max_articles_per_topic,
        };
        Ok((self.name.trim().to_string(), profile))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(index))
        .route("/refresh", post(refresh))
        .route("/select", post(select_profile))
        .route("/profiles", post(create_profile))
        .route("/profiles/update", post(update_profile))
        .route("/profiles/delete", post(delete_profile))
        .route("/history/:date", get(history_entry))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// Selected profile name, repaired against the profiles on disk
async fn current_selection(state: &Arc<AppState>) -> Result<Option<String>, HandlerError> {
    let names: Vec<String> = blocking(state, |s| s.profiles.load())
        .await
        .map_err(internal)?
        .into_keys()
        .collect();
    Ok(state.session.lock().await.reconcile(&names))
}

async fn render_page(
    state: &Arc<AppState>,
    history_view: Option<&HistoryEntry>,
) -> Result<Html<String>, HandlerError> {
    let profiles = blocking(state, |s| s.profiles.load())
        .await
        .map_err(internal)?;
    let names: Vec<String> = profiles.keys().cloned().collect();

    let mut session = state.session.lock().await;
    let selected = session.reconcile(&names);
    let notice = session.take_notice();

    let history = match selected.clone() {
        Some(name) => blocking(state, move |s| s.history.load(&name))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Could not load briefing history");
                Vec::new()
            }),
        None => Vec::new(),
    };
    let active = selected
        .as_deref()
        .and_then(|name| profiles.get(name).map(|profile| (name, profile)));

    let html = PageRenderer::render(&PageView {
        profile_names: &names,
        active,
        outcome: session.outcome.as_ref(),
        history: &history,
        history_view,
        notice: notice.as_deref(),
    });
    Ok(Html(html))
}

async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, HandlerError> {
    render_page(&state, None).await
}

/// GET /history/:date shows a stored briefing for the selected profile
async fn history_entry(
    State(state): State<Arc<AppState>>,
    Path(date): Path<NaiveDate>,
) -> Result<Html<String>, HandlerError> {
    let name = current_selection(&state)
        .await?
        .ok_or((StatusCode::NOT_FOUND, "No profile selected".to_string()))?;

    let lookup = name.clone();
    let entry = blocking(&state, move |s| s.history.find(&lookup, date))
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("No briefing for '{}' on {}", name, date),
            )
        })?;

    render_page(&state, Some(&entry)).await
}

/// POST /refresh runs the pipeline for the selected profile and keeps the result or error
async fn refresh(State(state): State<Arc<AppState>>) -> Result<Redirect, HandlerError> {
    let Some(name) = current_selection(&state).await? else {
        return Ok(Redirect::to("/"));
    };

    let lookup = name.clone();
    let outcome = match blocking(&state, move |s| s.profiles.get(&lookup))
        .await
        .map_err(internal)?
    {
        Some(profile) => run_pipeline(&state, &name, &profile).await,
        None => RunOutcome::Failed(format!("Profile '{}' not found", name)),
    };

    // The lock is not held across the pipeline's network calls
    let mut session = state.session.lock().await;
    if session.selected.as_deref() == Some(name.as_str()) {
        session.outcome = Some(outcome);
    }
    Ok(Redirect::to("/"))
}

async fn run_pipeline(state: &Arc<AppState>, name: &str, profile: &Profile) -> RunOutcome {
    match state
        .pipeline
        .generate_briefing(profile, &state.config.credentials)
        .await
    {
        Ok(briefing) => {
            tracing::info!(profile = %name, "Briefing generated");
            let owner = name.to_string();
            let entry = HistoryEntry::from_briefing(&briefing);
            if let Err(e) = blocking(state, move |s| s.history.record(&owner, entry)).await {
                tracing::warn!(error = %e, "Could not save briefing to history");
            }
            RunOutcome::Ready(briefing)
        }
        Err(e) => {
            tracing::warn!(profile = %name, error = %e, "Briefing failed");
            RunOutcome::Failed(e.to_string())
        }
    }
}

async fn select_profile(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SelectForm>,
) -> Result<Redirect, HandlerError> {
    let profiles = blocking(&state, |s| s.profiles.load())
        .await
        .map_err(internal)?;
    if profiles.contains_key(&form.name) {
        state.session.lock().await.select(form.name);
    }
    Ok(Redirect::to("/"))
}

async fn create_profile(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ProfileForm>,
) -> Redirect {
    let result = match form.into_parts() {
        Ok((name, profile)) => {
            let target = name.clone();
            blocking(&state, move |s| s.profiles.create(&target, profile))
                .await
                .map(|()| name)
        }
        Err(e) => Err(e),
    };

    let mut session = state.session.lock().await;
    match result {
        Ok(name) => {
            tracing::info!(profile = %name, "Profile created");
            session.notice = Some(format!("Profile '{}' created!", name));
            session.select(name);
        }
        Err(e) => session.notice = Some(format!("⚠ {}", e)),
    }
    Redirect::to("/")
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ProfileForm>,
) -> Redirect {
    let result = match form.into_parts() {
        Ok((name, profile)) => {
            blocking(&state, move |s| s.profiles.update(&name, profile)).await
        }
        Err(e) => Err(e),
    };

    let mut session = state.session.lock().await;
    match result {
        Ok(()) => {
            session.outcome = None;
            session.notice = Some("Profile saved!".to_string());
        }
        Err(e) => session.notice = Some(format!("⚠ {}", e)),
    }
    Redirect::to("/")
}

async fn delete_profile(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SelectForm>,
) -> Redirect {
    let name = form.name;
    let target = name.clone();
    let result = blocking(&state, move |s| {
        s.profiles.remove(&target)?;
        if let Err(e) = s.history.forget(&target) {
            tracing::warn!(error = %e, "Could not clear history for deleted profile");
        }
        Ok(())
    })
    .await;

    let mut session = state.session.lock().await;
    match result {
        Ok(()) => session.notice = Some(format!("Profile '{}' deleted", name)),
        Err(e) => session.notice = Some(format!("⚠ {}", e)),
    }
    Redirect::to("/")
}
