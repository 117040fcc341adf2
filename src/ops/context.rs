use std::sync::Arc;

use crate::canonical::{canonicalize_and_verify, CanonicalResult};
use crate::error::Result;
use crate::roots::{
    normalize_base, LinkMetadata, PathProvider, PlatformPaths, RootKey, TokioLinkMetadata,
    ATTACHMENTS_DIR, DEFAULT_APP_DIR,
};

use super::{
    Context, ExistsRequest, ExistsResponse, MkdirRequest, MkdirResponse, ReadDirRequest,
    ReadDirResponse, ReadTextRequest, ReadTextResponse, RemoveRequest, RemoveResponse,
    WriteTextRequest, WriteTextResponse,
};

impl Context {
    /// Builds a context against the real platform providers.
    pub fn new() -> Result<Self> {
        Self::with_providers(
            &PlatformPaths::new(DEFAULT_APP_DIR),
            Arc::new(TokioLinkMetadata),
        )
    }

    /// Builds a context with injected collaborators.
    ///
    /// Base directories are resolved from `paths` once, here; the provider is
    /// not consulted again afterwards. `metadata` is retained for the symlink
    /// guard walks.
    pub fn with_providers(
        paths: &dyn PathProvider,
        metadata: Arc<dyn LinkMetadata>,
    ) -> Result<Self> {
        let app_data_base = normalize_base(&paths.app_data_dir()?)?;
        let attachments_base = format!("{app_data_base}{ATTACHMENTS_DIR}/");
        tracing::debug!(
            app_data = %app_data_base,
            attachments = %attachments_base,
            "resolved vault root bases"
        );
        Ok(Self {
            metadata,
            app_data_base,
            attachments_base,
        })
    }

    /// Resolved base directory for `root_key`; always ends with `/`.
    pub fn base_for(&self, root_key: RootKey) -> &str {
        match root_key {
            RootKey::AppData => &self.app_data_base,
            RootKey::Attachments => &self.attachments_base,
        }
    }

    pub(crate) fn link_metadata(&self) -> &dyn LinkMetadata {
        self.metadata.as_ref()
    }

    pub fn canonicalize_and_verify(
        &self,
        path: &str,
        root_key: RootKey,
    ) -> Result<CanonicalResult> {
        canonicalize_and_verify(self, path, root_key)
    }

    pub async fn reject_symlinks(&self, canonical: &CanonicalResult) -> Result<()> {
        crate::guard::reject_symlinks(self, canonical).await
    }

    pub async fn read_text(&self, request: ReadTextRequest) -> Result<ReadTextResponse> {
        super::read_text(self, request).await
    }

    pub async fn write_text(&self, request: WriteTextRequest) -> Result<WriteTextResponse> {
        super::write_text(self, request).await
    }

    pub async fn read_dir(&self, request: ReadDirRequest) -> Result<ReadDirResponse> {
        super::read_dir(self, request).await
    }

    pub async fn mkdir(&self, request: MkdirRequest) -> Result<MkdirResponse> {
        super::mkdir(self, request).await
    }

    pub async fn remove(&self, request: RemoveRequest) -> Result<RemoveResponse> {
        super::remove(self, request).await
    }

    pub async fn exists(&self, request: ExistsRequest) -> Result<ExistsResponse> {
        super::exists(self, request).await
    }
}
