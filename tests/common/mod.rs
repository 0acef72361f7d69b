use async_trait::async_trait;
use nexus::config::Config;
use nexus::providers::Provider;
use nexus::storage::SqliteStorage;
use nexus::synth::OutputSynthesizer;
use nexus::NexusService;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn create_temp_storage() -> (Arc<SqliteStorage>, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("nexus.db");
    let storage =
        SqliteStorage::new_with_path(db_path).expect("failed to create sqlite storage with path");
    (Arc::new(storage), tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Config with database and sandbox inside `dir`
#[allow(dead_code)]
pub fn config_in(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.db_path = Some(dir.path().join("nexus.db"));
    config.sandbox.root = dir.path().join("sandbox");
    config
}

/// Service over temporary storage answering every prompt with `provider`
#[allow(dead_code)]
pub fn service_with(provider: Arc<dyn Provider>) -> (Arc<NexusService>, TempDir) {
    let dir = TempDir::new().expect("failed to create tempdir");
    let config = config_in(&dir);
    let storage = Arc::new(
        SqliteStorage::open(&config.storage).expect("failed to create sqlite storage"),
    );
    let service = NexusService::with_parts(
        Arc::new(config),
        storage,
        provider,
        Arc::new(OutputSynthesizer::new()),
    );
    (Arc::new(service), dir)
}

/// Backend replying with a fixed text and recording the prompts it saw
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedProvider {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn send(
        &self,
        _session_id: &str,
        _system_persona: &str,
        prompt: &str,
    ) -> nexus::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> String {
        "scripted".to_string()
    }
}

/// Backend that never answers in time
#[allow(dead_code)]
pub struct StalledProvider;

#[async_trait]
impl Provider for StalledProvider {
    async fn send(
        &self,
        _session_id: &str,
        _system_persona: &str,
        _prompt: &str,
    ) -> nexus::Result<String> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("unreachable".to_string())
    }

    fn name(&self) -> &'static str {
        "stalled"
    }

    fn model(&self) -> String {
        "stalled".to_string()
    }
}
