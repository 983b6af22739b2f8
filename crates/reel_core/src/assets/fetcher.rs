//! Per-scene asset collection.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};

use super::error::{AssetFetchError, AssetFetchResult};
use super::footage::StockFootage;
use super::speech::SpeechSynthesizer;
use crate::config::Settings;
use crate::models::{DropReason, SceneAssets, SceneDescriptor, SessionId};
use crate::orchestrator::TempFiles;

/// Fetches footage and voiceover for scenes of one session.
pub struct SceneAssetFetcher {
    footage: Arc<dyn StockFootage>,
    speech: Arc<dyn SpeechSynthesizer>,
    temp_root: PathBuf,
    fallback_keyword: String,
    footage_timeout: Duration,
    speech_timeout: Duration,
    concurrency: usize,
}

impl SceneAssetFetcher {
    pub fn new(
        footage: Arc<dyn StockFootage>,
        speech: Arc<dyn SpeechSynthesizer>,
        settings: &Settings,
    ) -> Self {
        Self {
            footage,
            speech,
            temp_root: PathBuf::from(&settings.paths.temp_root),
            fallback_keyword: settings.footage.fallback_keyword.clone(),
            footage_timeout: settings.footage.timeout(),
            speech_timeout: settings.speech.timeout(),
            concurrency: settings.pipeline.scene_concurrency.max(1),
        }
    }

    pub fn video_path(&self, session: &SessionId, index: usize) -> PathBuf {
        self.temp_root
            .join(format!("{}_video.mp4", session.scene_prefix(index)))
    }

    pub fn audio_path(&self, session: &SessionId, index: usize) -> PathBuf {
        self.temp_root
            .join(format!("{}_audio.mp3", session.scene_prefix(index)))
    }

    /// Fetch one scene. Both files must succeed for the scene to be usable.
    pub async fn fetch(
        &self,
        index: usize,
        scene: &SceneDescriptor,
        session: &SessionId,
        temp_files: &TempFiles,
    ) -> Result<SceneAssets, DropReason> {
        let video_path = temp_files.register(self.video_path(session, index));
        let audio_path = temp_files.register(self.audio_path(session, index));

        let (video, audio) = tokio::join!(
            with_timeout(
                self.footage_timeout,
                self.resolve_video(&scene.search_keyword, &video_path)
            ),
            with_timeout(
                self.speech_timeout,
                self.speech.synthesize(&scene.voiceover, &audio_path)
            ),
        );

        let video_err = video.err().map(|e| e.to_string());
        let audio_err = audio.err().map(|e| e.to_string());
        match DropReason::from_sides(video_err, audio_err) {
            None => Ok(SceneAssets {
                index,
                video_path,
                audio_path,
            }),
            Some(reason) => {
                tracing::debug!(session = session.as_str(), "Scene {} dropped: {}", index, reason);
                Err(reason)
            }
        }
    }

    /// Fetch every scene, at most `scene_concurrency` at a time.
    ///
    /// Results are returned in scene order regardless of completion order.
    pub async fn fetch_all(
        &self,
        scenes: &[SceneDescriptor],
        session: &SessionId,
        temp_files: &TempFiles,
    ) -> Vec<Result<SceneAssets, DropReason>> {
        let fetches: Vec<_> = scenes
            .iter()
            .enumerate()
            .map(|(index, scene)| self.fetch(index, scene, session, temp_files))
            .collect();
        stream::iter(fetches)
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Search, fall back once to the generic keyword, then download.
    async fn resolve_video(&self, keyword: &str, dest: &Path) -> AssetFetchResult<u64> {
        let url = match self.footage.search(keyword).await? {
            Some(url) => url,
            None if keyword.trim() != self.fallback_keyword => {
                tracing::debug!(
                    "No footage for '{}', trying '{}'",
                    keyword,
                    self.fallback_keyword
                );
                self.footage
                    .search(&self.fallback_keyword)
                    .await?
                    .ok_or_else(|| AssetFetchError::NoResults {
                        keyword: keyword.to_string(),
                    })?
            }
            None => {
                return Err(AssetFetchError::NoResults {
                    keyword: keyword.to_string(),
                })
            }
        };

        self.footage.download(&url, dest).await
    }
}

async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = AssetFetchResult<T>>,
) -> AssetFetchResult<T> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| AssetFetchError::Timeout(limit))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use tempfile::tempdir;

    /// Footage library keyed by search keyword.
    struct FakeFootage {
        results: HashMap<String, String>,
        searches: Mutex<Vec<String>>,
    }

    impl FakeFootage {
        fn with(keywords: &[&str]) -> Self {
            Self {
                results: keywords
                    .iter()
                    .map(|k| (k.to_string(), format!("https://videos.test/{k}.mp4")))
                    .collect(),
                searches: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl StockFootage for FakeFootage {
        async fn search(&self, keyword: &str) -> AssetFetchResult<Option<String>> {
            self.searches.lock().push(keyword.to_string());
            Ok(self.results.get(keyword).cloned())
        }

        async fn download(&self, url: &str, dest: &Path) -> AssetFetchResult<u64> {
            tokio::fs::write(dest, url.as_bytes()).await?;
            Ok(url.len() as u64)
        }
    }

    struct FakeSpeech {
        fail: bool,
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSpeech {
        async fn synthesize(&self, text: &str, dest: &Path) -> AssetFetchResult<u64> {
            if self.fail {
                return Err(AssetFetchError::Synthesis("service unavailable".to_string()));
            }
            tokio::fs::write(dest, text.as_bytes()).await?;
            Ok(text.len() as u64)
        }
    }

    fn settings(temp_root: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.paths.temp_root = temp_root.to_string_lossy().into_owned();
        settings
    }

    fn scene(keyword: &str) -> SceneDescriptor {
        SceneDescriptor::new("Biển xanh thật đẹp.", keyword)
    }

    #[tokio::test]
    async fn both_sides_succeed() {
        let dir = tempdir().unwrap();
        let fetcher = SceneAssetFetcher::new(
            Arc::new(FakeFootage::with(&["ocean"])),
            Arc::new(FakeSpeech { fail: false }),
            &settings(dir.path()),
        );
        let session = SessionId::from("s1");
        let temp_files = TempFiles::new();

        let assets = fetcher
            .fetch(0, &scene("ocean"), &session, &temp_files)
            .await
            .unwrap();

        assert_eq!(assets.index, 0);
        assert!(assets.video_path.ends_with("temp_s1_0_video.mp4"));
        assert!(assets.audio_path.ends_with("temp_s1_0_audio.mp3"));
        assert!(assets.video_path.exists());
        assert!(temp_files.contains(&assets.video_path));
        assert!(temp_files.contains(&assets.audio_path));
    }

    #[tokio::test]
    async fn falls_back_to_generic_keyword() {
        let dir = tempdir().unwrap();
        let footage = Arc::new(FakeFootage::with(&["nature"]));
        let fetcher = SceneAssetFetcher::new(
            footage.clone(),
            Arc::new(FakeSpeech { fail: false }),
            &settings(dir.path()),
        );

        let assets = fetcher
            .fetch(1, &scene("bioluminescent plankton"), &SessionId::from("s1"), &TempFiles::new())
            .await;

        assert!(assets.is_ok());
        assert_eq!(
            *footage.searches.lock(),
            vec!["bioluminescent plankton".to_string(), "nature".to_string()]
        );
    }

    #[tokio::test]
    async fn no_footage_drops_scene_and_registers_paths() {
        let dir = tempdir().unwrap();
        let fetcher = SceneAssetFetcher::new(
            Arc::new(FakeFootage::with(&[])),
            Arc::new(FakeSpeech { fail: false }),
            &settings(dir.path()),
        );
        let temp_files = TempFiles::new();

        let reason = fetcher
            .fetch(2, &scene("xyz"), &SessionId::from("s1"), &temp_files)
            .await
            .unwrap_err();

        assert!(matches!(reason, DropReason::MissingVideo(ref e) if e.contains("xyz")));
        // Audio was written and is still tracked for cleanup
        assert_eq!(temp_files.len(), 2);
        temp_files.cleanup().await;
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn both_failures_are_reported() {
        let dir = tempdir().unwrap();
        let fetcher = SceneAssetFetcher::new(
            Arc::new(FakeFootage::with(&[])),
            Arc::new(FakeSpeech { fail: true }),
            &settings(dir.path()),
        );

        let reason = fetcher
            .fetch(0, &scene("xyz"), &SessionId::from("s1"), &TempFiles::new())
            .await
            .unwrap_err();

        assert!(matches!(reason, DropReason::MissingBoth { .. }));
    }

    #[tokio::test]
    async fn fetch_all_keeps_scene_order() {
        let dir = tempdir().unwrap();
        let fetcher = SceneAssetFetcher::new(
            Arc::new(FakeFootage::with(&["ocean", "reef", "whale"])),
            Arc::new(FakeSpeech { fail: false }),
            &Settings {
                footage: crate::config::FootageSettings {
                    fallback_keyword: "nothing-here".to_string(),
                    ..Default::default()
                },
                ..settings(dir.path())
            },
        );
        let scenes = vec![scene("ocean"), scene("reef"), scene("xyz"), scene("whale")];

        let results = fetcher
            .fetch_all(&scenes, &SessionId::from("s1"), &TempFiles::new())
            .await;

        let used: Vec<usize> = results
            .iter()
            .filter_map(|r| r.as_ref().ok().map(|a| a.index))
            .collect();
        assert_eq!(used, vec![0, 1, 3]);
        assert!(results[2].is_err());
    }
}
