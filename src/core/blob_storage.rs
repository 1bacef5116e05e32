use crate::core::paths;
use crate::core::states::{is_reserved_state, is_valid_state_name, ReservedModelState};
use crate::domain::model::{ModelMeta, ModelState, StorageLocation};
use crate::domain::ports::Storage;
use crate::utils::error::{ModelStoreError, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no explicit root prefix is given.
pub const ROOT_PREFIX_ENV_KEY: &str = "MODEL_STORE_ROOT_PREFIX";

/// Model registry layered over any [`Storage`] backend.
#[derive(Debug, Clone)]
pub struct BlobStorage<S: Storage> {
    storage: S,
    root_prefix: String,
}

impl<S: Storage> BlobStorage<S> {
    pub fn new(storage: S, root_prefix: Option<String>) -> Self {
        let root_prefix = root_prefix
            .or_else(|| std::env::var(ROOT_PREFIX_ENV_KEY).ok())
            .unwrap_or_default();
        tracing::debug!("Root prefix is: {}", root_prefix);
        Self {
            storage,
            root_prefix,
        }
    }

    pub fn root_prefix(&self) -> &str {
        &self.root_prefix
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let data = self.storage.read_file(key).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    async fn write_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let data = serde_json::to_vec(value)?;
        self.storage.write_file(key, &data).await
    }

    /// Every `.json` object directly under `prefix`. A damaged object fails
    /// the whole listing.
    async fn read_json_objects<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>> {
        let mut objects = Vec::new();
        for key in self.storage.list_files(prefix).await? {
            if !key.ends_with(".json") {
                continue;
            }
            let object = self.read_json(&key).await.map_err(|e| {
                tracing::error!("❌ Cannot read {}: {}", key, e);
                e
            })?;
            objects.push(object);
        }
        Ok(objects)
    }

    /// Archive keys have one-second resolution. An existing archive is never
    /// overwritten: on a clash we wait for the next second.
    async fn free_archive_key(&self, domain: &str, file_name: &str) -> Result<String> {
        loop {
            let now = chrono::Utc::now();
            let key = paths::archive_path(&self.root_prefix, domain, file_name, now);
            if !self.storage.exists(&key).await? {
                return Ok(key);
            }
            tracing::debug!("Archive {} already exists, waiting for the next second", key);
            let wait_ms = 1000 - u64::from(now.timestamp_subsec_millis().min(999));
            tokio::time::sleep(std::time::Duration::from_millis(wait_ms)).await;
        }
    }

    /// Copies a local archive into the store and returns where it landed.
    pub async fn upload(&self, domain: &str, local_path: &Path) -> Result<StorageLocation> {
        let file_name = local_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ModelStoreError::InvalidConfigValueError {
                field: "local_path".to_string(),
                value: local_path.display().to_string(),
                reason: "Path has no file name".to_string(),
            })?;
        let key = self.free_archive_key(domain, file_name).await?;
        let data = tokio::fs::read(local_path).await?;
        self.storage.write_file(&key, &data).await?;
        tracing::debug!("Uploaded {} to {}", local_path.display(), key);
        Ok(self.storage.location(&key))
    }

    /// Uploads an archive as a new model version of `domain` and records
    /// its meta-data. The new model becomes the domain's latest.
    pub async fn register(
        &self,
        domain: &str,
        local_path: &Path,
        model_type: Option<String>,
    ) -> Result<ModelMeta> {
        crate::utils::validation::validate_non_empty_string("domain", domain)?;
        let model_id = uuid::Uuid::new_v4().to_string();
        let location = self.upload(domain, local_path).await?;
        let meta = ModelMeta::new(domain, &model_id, location).with_model_type(model_type);
        self.set_meta_data(domain, &model_id, &meta).await?;
        tracing::info!("Registered model {}={}", domain, model_id);
        Ok(meta)
    }

    /// Downloads a model's archive into `local_dir`. Without a `model_id`
    /// the domain's latest model is used.
    pub async fn download(
        &self,
        local_dir: &Path,
        domain: &str,
        model_id: Option<&str>,
    ) -> Result<PathBuf> {
        let meta = match model_id {
            Some(model_id) => self.get_meta_data(domain, model_id).await?,
            None => {
                let meta = self.latest_meta_data(domain).await?;
                tracing::info!("Latest model is: {}", meta.model.model_id);
                meta
            }
        };

        let key = self.storage.key_for(&meta.storage)?;
        let file_name = key.rsplit('/').next().unwrap_or(key.as_str());
        let data = self.storage.read_file(&key).await?;

        tokio::fs::create_dir_all(local_dir).await?;
        let target = local_dir.join(file_name);
        tokio::fs::write(&target, data).await?;
        tracing::debug!("Downloaded {} to {}", key, target.display());
        Ok(target)
    }

    pub async fn latest_meta_data(&self, domain: &str) -> Result<ModelMeta> {
        let key = paths::domain_path(&self.root_prefix, domain);
        if !self.storage.exists(&key).await? {
            return Err(ModelStoreError::DomainNotFound {
                domain: domain.to_string(),
            });
        }
        self.read_json(&key).await
    }

    /// Deletes the archive and meta-data of a model. The model is removed
    /// from every custom state and a copy of its meta-data is kept under the
    /// reserved deleted state.
    pub async fn delete_model(&self, domain: &str, model_id: &str) -> Result<()> {
        let meta = self.get_meta_data(domain, model_id).await?;

        let archive_key = self.storage.key_for(&meta.storage)?;
        if !self.storage.remove_file(&archive_key).await? {
            tracing::warn!("Archive {} was already gone", archive_key);
        }

        for state_name in self.list_model_states().await? {
            self.unset_model_state(domain, model_id, &state_name).await?;
        }
        self.set_model_state(domain, model_id, ReservedModelState::Deleted.as_str())
            .await?;

        tracing::debug!("Deleting meta-data for {}={}", domain, model_id);
        let key = paths::metadata_path(&self.root_prefix, domain, model_id, None);
        self.storage.remove_file(&key).await?;
        Ok(())
    }

    pub async fn list_domains(&self) -> Result<Vec<String>> {
        let metas: Vec<ModelMeta> = self
            .read_json_objects(&paths::domains_path(&self.root_prefix))
            .await?;
        let mut domains: Vec<String> = metas.into_iter().map(|m| m.model.domain).collect();
        domains.sort();
        Ok(domains)
    }

    /// Model ids in a domain, newest first. With `state_name` only the
    /// models tagged with that state are listed.
    pub async fn list_models(&self, domain: &str, state_name: Option<&str>) -> Result<Vec<String>> {
        if let Some(state_name) = state_name {
            if !self.state_exists(state_name).await? {
                return Err(ModelStoreError::UnknownState {
                    state_name: state_name.to_string(),
                });
            }
        }
        let prefix = paths::models_path(&self.root_prefix, domain, state_name);
        let mut metas: Vec<ModelMeta> = self.read_json_objects(&prefix).await?;
        metas.sort_by(|a, b| {
            b.created
                .cmp(&a.created)
                .then_with(|| a.model.model_id.cmp(&b.model.model_id))
        });
        Ok(metas.into_iter().map(|m| m.model.model_id).collect())
    }

    pub async fn state_exists(&self, state_name: &str) -> Result<bool> {
        let key = paths::model_state_path(&self.root_prefix, state_name);
        self.storage.exists(&key).await
    }

    /// Created states, excluding the reserved ones.
    pub async fn list_model_states(&self) -> Result<Vec<String>> {
        let states: Vec<ModelState> = self
            .read_json_objects(&paths::model_states_path(&self.root_prefix))
            .await?;
        let mut names: Vec<String> = states
            .into_iter()
            .map(|s| s.state_name)
            .filter(|name| is_valid_state_name(name))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Idempotent: creating an existing state is a no-op.
    pub async fn create_model_state(&self, state_name: &str) -> Result<()> {
        if !is_reserved_state(state_name) && !is_valid_state_name(state_name) {
            return Err(ModelStoreError::InvalidStateName {
                state_name: state_name.to_string(),
            });
        }
        if self.state_exists(state_name).await? {
            tracing::info!("Model state '{}' already exists", state_name);
            return Ok(());
        }
        tracing::debug!("Creating model state: {}", state_name);
        let key = paths::model_state_path(&self.root_prefix, state_name);
        self.write_json(&key, &ModelState::new(state_name)).await
    }

    pub async fn set_model_state(&self, domain: &str, model_id: &str, state_name: &str) -> Result<()> {
        if is_reserved_state(state_name) {
            self.create_model_state(state_name).await?;
        } else if !self.state_exists(state_name).await? {
            tracing::debug!("Model state '{}' does not exist", state_name);
            return Err(ModelStoreError::UnknownState {
                state_name: state_name.to_string(),
            });
        }

        let model_key = paths::metadata_path(&self.root_prefix, domain, model_id, None);
        if !self.storage.exists(&model_key).await? {
            return Err(ModelStoreError::ModelNotFound {
                domain: domain.to_string(),
                model_id: model_id.to_string(),
            });
        }
        let data = self.storage.read_file(&model_key).await?;
        let state_key = paths::metadata_path(&self.root_prefix, domain, model_id, Some(state_name));
        self.storage.write_file(&state_key, &data).await?;
        tracing::debug!(
            "Successfully set {}={} to state={}",
            domain,
            model_id,
            state_name
        );
        Ok(())
    }

    pub async fn unset_model_state(&self, domain: &str, model_id: &str, state_name: &str) -> Result<()> {
        if is_reserved_state(state_name) {
            tracing::debug!("Cannot unset from model state '{}'", state_name);
            return Ok(());
        }
        if !self.state_exists(state_name).await? {
            tracing::debug!("Model state '{}' does not exist", state_name);
            return Err(ModelStoreError::UnknownState {
                state_name: state_name.to_string(),
            });
        }
        let state_key = paths::metadata_path(&self.root_prefix, domain, model_id, Some(state_name));
        if self.storage.remove_file(&state_key).await? {
            tracing::debug!(
                "Successfully unset {}={} from state={}",
                domain,
                model_id,
                state_name
            );
        }
        Ok(())
    }

    /// Writes the version meta-data and marks the model as the domain's latest.
    pub async fn set_meta_data(&self, domain: &str, model_id: &str, meta: &ModelMeta) -> Result<()> {
        tracing::debug!("Setting meta-data for {}={}", domain, model_id);
        let key = paths::metadata_path(&self.root_prefix, domain, model_id, None);
        self.write_json(&key, meta).await?;
        self.write_json(&paths::domain_path(&self.root_prefix, domain), meta)
            .await
    }

    pub async fn get_meta_data(&self, domain: &str, model_id: &str) -> Result<ModelMeta> {
        if domain.is_empty() || model_id.is_empty() {
            return Err(ModelStoreError::ConfigError {
                message: "domain and model_id must be set".to_string(),
            });
        }
        tracing::debug!("Retrieving meta-data for {}={}", domain, model_id);
        let key = paths::metadata_path(&self.root_prefix, domain, model_id, None);
        if self.storage.exists(&key).await? {
            return self.read_json(&key).await;
        }

        let deleted_key = paths::metadata_path(
            &self.root_prefix,
            domain,
            model_id,
            Some(ReservedModelState::Deleted.as_str()),
        );
        if self.storage.exists(&deleted_key).await? {
            return Err(ModelStoreError::ModelDeleted {
                domain: domain.to_string(),
                model_id: model_id.to_string(),
            });
        }
        Err(ModelStoreError::ModelNotFound {
            domain: domain.to_string(),
            model_id: model_id.to_string(),
        })
    }
}
