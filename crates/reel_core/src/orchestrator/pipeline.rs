//! Session orchestrator that drives one topic through every stage.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures_util::future::try_join_all;

use super::errors::PipelineError;
use super::report::{DroppedScene, SessionReport};
use super::session::Session;
use crate::assets::{SceneAssetFetcher, SpeechSynthesizer, StockFootage};
use crate::config::Settings;
use crate::logging::{LogConfig, SessionLogger};
use crate::media::{Compositor, MediaResult};
use crate::models::{SessionId, SessionOutcome, SessionState};
use crate::publish::Publisher;
use crate::script::{ScriptGenerator, TextGenerator};

/// External collaborators of a session, shared read-only by all sessions.
#[derive(Clone)]
pub struct Providers {
    pub text: Arc<dyn TextGenerator>,
    pub footage: Arc<dyn StockFootage>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub compositor: Arc<dyn Compositor>,
    pub publisher: Arc<dyn Publisher>,
}

/// Something that can run a session to completion.
///
/// The queue only depends on this, so it can be driven by a stand-in.
#[async_trait]
pub trait SessionRunner: Send + Sync {
    async fn run(&self, id: SessionId, topic: String) -> SessionReport;
}

/// Runs sessions: script, assets, media, publish, cleanup.
pub struct SessionOrchestrator {
    script: ScriptGenerator,
    fetcher: SceneAssetFetcher,
    compositor: Arc<dyn Compositor>,
    publisher: Arc<dyn Publisher>,
    temp_root: PathBuf,
    /// Where session log files go; `None` logs only to tracing.
    logs_folder: Option<PathBuf>,
    log_config: LogConfig,
}

impl SessionOrchestrator {
    pub fn new(settings: &Settings, providers: Providers) -> Self {
        let logs_folder = settings
            .logging
            .session_files
            .then(|| PathBuf::from(&settings.paths.logs_folder));

        Self {
            script: ScriptGenerator::new(providers.text, settings.script.clone()),
            fetcher: SceneAssetFetcher::new(providers.footage, providers.speech, settings),
            compositor: providers.compositor,
            publisher: providers.publisher,
            temp_root: PathBuf::from(&settings.paths.temp_root),
            logs_folder,
            log_config: LogConfig::from(&settings.logging),
        }
    }

    /// Run one session and return its report.
    ///
    /// Never fails: every error ends up in the report's outcome, and every
    /// registered temp file is gone when this returns.
    pub async fn run_session(&self, id: SessionId, topic: &str) -> SessionReport {
        let started = Instant::now();
        let logger = self.open_logger(&id);
        let mut session = Session::new(id, topic, logger);

        session
            .logger
            .section(&format!("Session {} for '{}'", session.id, session.topic));

        if let Err(e) = tokio::fs::create_dir_all(&self.temp_root).await {
            session.logger.warn(&format!(
                "Could not create {}: {}",
                self.temp_root.display(),
                e
            ));
        }

        let mut dropped = Vec::new();
        let outcome = self.drive(&mut session, &mut dropped).await;

        session.logger.phase("Cleanup");
        let removed_files = session.temp_files.cleanup().await;
        let leftover = session.temp_files.len();
        if leftover > 0 {
            session
                .logger
                .warn(&format!("{} temp files could not be removed", leftover));
        }
        session.transition(SessionState::Cleaned);

        let report = SessionReport {
            session_id: session.id.clone(),
            topic: session.topic.clone(),
            states: session.states().to_vec(),
            scenes_planned: session.scenes.len(),
            scenes_used: session.assets.iter().map(|a| a.index).collect(),
            dropped,
            download_url: outcome.download_url().map(str::to_string),
            outcome,
            removed_files,
            log_path: session.logger.log_path().map(Path::to_path_buf),
            elapsed: started.elapsed(),
        };

        match report.outcome {
            SessionOutcome::Published { .. } => session.logger.success(&report.summary()),
            _ => session.logger.warn(&report.summary()),
        }
        session.logger.close();

        report
    }

    async fn drive(
        &self,
        session: &mut Session,
        dropped: &mut Vec<DroppedScene>,
    ) -> SessionOutcome {
        // Script
        session.logger.phase("Script");
        match self.script.generate(&session.topic).await {
            Ok(scenes) => {
                session
                    .logger
                    .info(&format!("Script has {} scenes", scenes.len()));
                session.scenes = scenes;
                session.transition(SessionState::Scripted);
            }
            Err(e) => {
                let reason = e.to_string();
                session
                    .logger
                    .error(&PipelineError::script(&session.id, e).to_string());
                session.transition(SessionState::AbortedNoScript);
                return SessionOutcome::AbortedNoScript { reason };
            }
        }

        // Assets
        session.logger.phase("Assets");
        let results = self
            .fetcher
            .fetch_all(&session.scenes, &session.id, &session.temp_files)
            .await;
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(assets) => session.assets.push(assets),
                Err(reason) => {
                    session
                        .logger
                        .warn(&format!("Scene {} dropped: {}", index, reason));
                    dropped.push(DroppedScene {
                        index,
                        search_keyword: session.scenes[index].search_keyword.clone(),
                        reason,
                    });
                }
            }
        }

        if session.assets.is_empty() {
            session.logger.error(
                &PipelineError::no_assets(&session.id, session.scenes.len()).to_string(),
            );
            session.transition(SessionState::AbortedNoAssets);
            return SessionOutcome::AbortedNoAssets;
        }
        session.logger.info(&format!(
            "{} of {} scenes ready",
            session.assets.len(),
            session.scenes.len()
        ));
        session.transition(SessionState::AssetsCollected);

        // Media
        session.logger.phase("Assemble");
        let output = session
            .temp_files
            .register(self.temp_root.join(session.id.output_file_name()));

        if let Err(e) = self.render(session, &output).await {
            let reason = e.to_string();
            session
                .logger
                .error(&PipelineError::media(&session.id, e).to_string());
            session.transition(SessionState::AbortedMedia);
            return SessionOutcome::AbortedMedia { reason };
        }
        session.transition(SessionState::Assembled);

        // Publish
        session.logger.phase("Publish");
        match self.publisher.publish(&output).await {
            Ok(download_url) => {
                session
                    .logger
                    .success(&format!("Download link: {}", download_url));
                session.transition(SessionState::Published);
                SessionOutcome::Published { download_url }
            }
            Err(e) => {
                let reason = e.to_string();
                session
                    .logger
                    .error(&PipelineError::publish(&session.id, e).to_string());
                session.transition(SessionState::PublishFailed);
                SessionOutcome::PublishFailed { reason }
            }
        }
    }

    /// Sync every scene, then render them in order.
    async fn render(&self, session: &Session, output: &Path) -> MediaResult<PathBuf> {
        let logger = &session.logger;
        let clips = try_join_all(
            session
                .assets
                .iter()
                .map(|assets| self.compositor.sync(assets, logger)),
        )
        .await?;

        self.compositor.assemble(&clips, output, logger).await
    }

    fn open_logger(&self, id: &SessionId) -> SessionLogger {
        let Some(dir) = &self.logs_folder else {
            return SessionLogger::detached(id.as_str(), self.log_config.clone());
        };
        match SessionLogger::new(id.as_str(), dir, self.log_config.clone()) {
            Ok(logger) => logger,
            Err(e) => {
                tracing::warn!(
                    "Could not open session log in {}: {}; logging to tracing only",
                    dir.display(),
                    e
                );
                SessionLogger::detached(id.as_str(), self.log_config.clone())
            }
        }
    }
}

#[async_trait]
impl SessionRunner for SessionOrchestrator {
    async fn run(&self, id: SessionId, topic: String) -> SessionReport {
        self.run_session(id, &topic).await
    }
}
