//! Application state: track registry, progress store, prompts, OpenAI client.
//!
//! This module owns:
//!   - the track registry (built-in tables + optional TOML bank)
//!   - the per-track completion store
//!   - the prompts struct (from TOML or defaults) and UI timing defaults
//!   - optional OpenAI client
//!
//! The registry is assembled once at startup and read-only afterwards; only
//! the progress store mutates at request time.

use std::collections::HashMap;

use tracing::{info, instrument};

use crate::config::{load_config_from_env, Prompts, UiTiming};
use crate::domain::{Exercise, Track, TrackSource};
use crate::openai::OpenAI;
use crate::progress::ProgressStore;
use crate::tracks::{builtin_tracks, track_from_cfg};

pub struct AppState {
    pub tracks: HashMap<String, Track>,
    /// Listing order: built-ins first, then bank tracks in config order.
    pub track_order: Vec<String>,
    pub progress: ProgressStore,
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
    pub ui: UiTiming,
}

impl AppState {
    /// Build state from env: load config, compile tracks, open the progress
    /// store, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        // Load TOML config if provided (prompts + UI timing + optional track bank).
        let cfg_opt = load_config_from_env();
        let prompts = cfg_opt.as_ref().map(|c| c.prompts.clone()).unwrap_or_default();
        let ui = cfg_opt.as_ref().map(|c| c.ui).unwrap_or_default();

        let mut tracks = HashMap::<String, Track>::new();
        let mut track_order = Vec::<String>::new();

        // Built-in tracks first; they are always available.
        for track in builtin_tracks() {
            track_order.push(track.id.clone());
            tracks.insert(track.id.clone(), track);
        }

        // Insert config-based tracks (if any) – but never overwrite built-ins.
        if let Some(cfg) = &cfg_opt {
            for tc in &cfg.tracks {
                let Some(track) = track_from_cfg(tc) else { continue };
                if tracks.contains_key(&track.id) {
                    tracing::error!(target: "exercise", id = %track.id, "Skipping bank track: id collides with an existing track.");
                    continue;
                }
                track_order.push(track.id.clone());
                tracks.insert(track.id.clone(), track);
            }
        }

        // Inventory summary by language/source.
        let mut count_by_lang: HashMap<String, (usize, usize)> = HashMap::new();
        for t in tracks.values() {
            let entry = count_by_lang.entry(t.language.clone()).or_insert((0, 0));
            match t.source {
                TrackSource::BuiltIn => entry.0 += t.exercises.len(),
                TrackSource::ConfigBank => entry.1 += t.exercises.len(),
            }
        }
        for (lang, (builtin, bank)) in count_by_lang {
            info!(target: "exercise", language = %lang, builtin_exercises = builtin, bank_exercises = bank, "Startup exercise inventory");
        }

        // Build optional OpenAI client (if API key present).
        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "webcraft_backend", base_url = %oa.base_url, fast_model = %oa.fast_model, strong_model = %oa.strong_model, "OpenAI enabled.");
        } else {
            info!(target: "webcraft_backend", "OpenAI disabled (no OPENAI_API_KEY). AI endpoints use local fallbacks.");
        }

        Self {
            tracks,
            track_order,
            progress: ProgressStore::from_env(),
            openai,
            prompts,
            ui,
        }
    }

    /// Read-only access to a track by id.
    pub fn get_track(&self, id: &str) -> Option<&Track> {
        self.tracks.get(id)
    }

    /// Read-only access to one exercise within a track.
    pub fn get_exercise(&self, track_id: &str, index: usize) -> Option<(&Track, &Exercise)> {
        let track = self.tracks.get(track_id)?;
        let exercise = track.exercises.get(index)?;
        Some((track, exercise))
    }
}

#[cfg(test)]
impl AppState {
    /// State with the built-in registry, memory-only progress, and no OpenAI.
    pub fn for_tests() -> Self {
        let mut tracks = HashMap::new();
        let mut track_order = Vec::new();
        for track in builtin_tracks() {
            track_order.push(track.id.clone());
            tracks.insert(track.id.clone(), track);
        }
        Self {
            tracks,
            track_order,
            progress: ProgressStore::in_memory(),
            openai: None,
            prompts: Prompts::default(),
            ui: UiTiming::default(),
        }
    }
}
