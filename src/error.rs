use crate::dataset::error::DatasetError;
use crate::download::error::DownloadError;
use crate::stations::CatalogError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiverwatchError {
    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Failed to determine data directory")]
    DataDirResolution(#[source] std::io::Error),

    #[error("Failed to create data directory '{0}'")]
    DataDirCreation(PathBuf, #[source] std::io::Error),
}
