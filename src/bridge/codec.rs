// In: src/bridge/codec.rs

//! The `PhotonCodec` facade: the single entry point for hosts.
//!
//! `encode` runs a fixed sequence of stages (validate, address, resolve backend,
//! transform, write array, write metadata, commit). Any failure is returned as
//! `EncodeFailure { stage, source }`. `decode` resolves the backend, checks the
//! commit marker, opens the array and applies the version gate; failures come
//! back as `DecodeFailure { stage, source }`.

use std::sync::Arc;

use crate::addressing::{AddressResolver, IdentityContext, SchemaAddressing, ARTIFACT_EXTENSION};
use crate::array::metadata::COMMIT_KEY;
use crate::array::writer::{commit, write_array, write_attributes};
use crate::array::{compute_chunks, open_array, ArtifactAttributes, LazyArray};
use crate::bridge::validate;
use crate::bridge::version::{check_compatible, resolve_version, VersionSource};
use crate::config::{self, CodecConfig};
use crate::error::{DecodeStage, EncodeStage, PhotonError};
use crate::kernels::anscombe;
use crate::storage::BackendRegistry;
use crate::types::{CellValue, EncodeResult, TransformParameters, STORED_DTYPE, TRANSFORM_NAME};

/// Encodes photon-limited movies into chunked storage and opens them again.
///
/// Holds only immutable configuration, a backend registry and an address
/// resolver, so one instance can be shared across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PhotonCodec {
    config: Arc<CodecConfig>,
    registry: BackendRegistry,
    resolver: Arc<dyn AddressResolver>,
}

impl PhotonCodec {
    /// Creates a codec from an explicit configuration.
    pub fn new(config: CodecConfig) -> Result<Self, PhotonError> {
        Self::from_shared(Arc::new(config))
    }

    /// Creates a codec from the process-wide configuration.
    pub fn from_global() -> Result<Self, PhotonError> {
        Self::from_shared(config::global())
    }

    fn from_shared(config: Arc<CodecConfig>) -> Result<Self, PhotonError> {
        config.validate()?;
        let registry = BackendRegistry::from_config(&config)?;
        Ok(Self {
            config,
            registry,
            resolver: Arc::new(SchemaAddressing),
        })
    }

    /// Replaces the backend registry, e.g. to share stores between codecs.
    pub fn with_registry(mut self, registry: BackendRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replaces the default schema-addressed resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn AddressResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Checks `value` without touching storage.
    pub fn validate(&self, value: &CellValue) -> Result<(), PhotonError> {
        validate::validate(value)
    }

    /// Encodes `value` with the configured transform parameters.
    pub fn encode(&self, value: &CellValue, context: &IdentityContext) -> Result<EncodeResult, PhotonError> {
        self.encode_with(value, context, None)
    }

    /// Encodes `value`, transforming with `params` when given.
    ///
    /// Re-encoding the same identity replaces the previous artifact entirely.
    pub fn encode_with(
        &self,
        value: &CellValue,
        context: &IdentityContext,
        params: Option<TransformParameters>,
    ) -> Result<EncodeResult, PhotonError> {
        use EncodeStage as Stage;
        let fail = |stage: Stage| move |e: PhotonError| PhotonError::encode_failure(stage, e);

        validate::validate(value).map_err(fail(Stage::Validate))?;
        // Validation guarantees an array of a numeric type.
        let array = value.as_array().ok_or_else(|| {
            PhotonError::encode_failure(
                Stage::Validate,
                PhotonError::ArtifactFormat("validated value is not an array".into()),
            )
        })?;

        let address = self
            .resolver
            .resolve(context, ARTIFACT_EXTENSION)
            .map_err(fail(Stage::Address))?;

        let mapping = self
            .registry
            .get_backend(address.store.as_deref())
            .and_then(|backend| backend.get_mapping(&address.path))
            .map_err(fail(Stage::ResolveBackend))?;

        let params = params.unwrap_or(self.config.transform);
        let transformed = array
            .to_f64()
            .ok_or_else(|| PhotonError::ArtifactFormat("object arrays cannot be transformed".into()))
            .and_then(|widened| anscombe::forward(&widened, &params))
            .map_err(fail(Stage::Transform))?;

        let chunks = compute_chunks(transformed.shape(), self.config.max_frames_per_chunk);
        let metadata = write_array(mapping.as_ref(), &transformed, &chunks, &self.config.compression)
            .map_err(fail(Stage::WriteArray))?;

        let attrs = ArtifactAttributes::for_encode(&self.config.format_version, &params, array.element_type());
        write_attributes(mapping.as_ref(), &attrs).map_err(fail(Stage::WriteMetadata))?;

        commit(mapping.as_ref(), &self.config.format_version, &metadata).map_err(fail(Stage::Commit))?;

        log::info!(
            "encoded {} movie {:?} to '{}' (store: {}, {} chunks of {:?})",
            array.element_type(),
            metadata.shape,
            address.path,
            address.store.as_deref().unwrap_or("<default>"),
            metadata.chunk_count(),
            metadata.chunks
        );
        log_metric!(
            "event" = "encode",
            "path" = &address.path,
            "gain" = params.gain,
            "offset" = params.offset,
            "variance" = params.variance
        );

        Ok(EncodeResult {
            path: address.path,
            store: address.store,
            format_version: Some(self.config.format_version.clone()),
            shape: metadata.shape,
            stored_dtype: STORED_DTYPE.to_string(),
            transform: TRANSFORM_NAME.to_string(),
        })
    }

    /// Opens the artifact described by `record`. No chunk is read until the
    /// returned array is indexed.
    pub fn decode(&self, record: &EncodeResult) -> Result<LazyArray, PhotonError> {
        self.decode_with_context(record, None)
    }

    /// Like [`decode`](Self::decode). When the identity is supplied, a path that
    /// no longer matches what the resolver derives is logged; the record wins.
    pub fn decode_with_context(
        &self,
        record: &EncodeResult,
        context: Option<&IdentityContext>,
    ) -> Result<LazyArray, PhotonError> {
        use DecodeStage as Stage;
        let fail = |stage: Stage| move |e: PhotonError| PhotonError::decode_failure(stage, e);

        if let Some(context) = context {
            match self.resolver.resolve(context, ARTIFACT_EXTENSION) {
                Ok(address) if address.path != record.path => log::warn!(
                    "record path '{}' differs from the path derived for its identity '{}'",
                    record.path,
                    address.path
                ),
                Ok(_) => {}
                Err(e) => log::warn!("could not derive a path for the decode identity: {}", e),
            }
        }

        let mapping = self
            .registry
            .get_backend(record.store.as_deref())
            .and_then(|backend| backend.get_mapping(&record.path))
            .map_err(fail(Stage::ResolveBackend))?;

        let committed = mapping.contains(COMMIT_KEY).map_err(fail(Stage::Open))?;
        if !committed {
            if self.config.require_commit_marker {
                return Err(PhotonError::decode_failure(
                    Stage::Open,
                    PhotonError::IncompleteArtifact(format!(
                        "'{}' has no commit marker; it was never fully written or is being rewritten",
                        record.path
                    )),
                ));
            }
            log::warn!("'{}' has no commit marker, opening it as a legacy artifact", record.path);
        }

        let lazy = open_array(mapping).map_err(fail(Stage::Open))?;

        let (version, source) = resolve_version(
            lazy.format_version(),
            record.format_version.as_deref(),
            &self.config.format_version,
        );
        match source {
            VersionSource::Artifact => {}
            VersionSource::Record => log::warn!(
                "'{}' carries no codec_version attribute, using the record's '{}'",
                record.path,
                version
            ),
            VersionSource::Baseline => log::warn!(
                "no format version recorded for '{}', assuming baseline '{}'",
                record.path,
                version
            ),
        }
        check_compatible(version, &self.config.format_version).map_err(fail(Stage::VersionCheck))?;

        log::info!(
            "opened photon movie '{}' {:?} (format {})",
            record.path,
            lazy.shape(),
            version
        );
        Ok(lazy)
    }
}
