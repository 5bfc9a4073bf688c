use crate::api::{Catalog, FetchError};
use crate::handoff::{SelectionHandoff, StorageError};
use crate::state::DetailRecord;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DetailError {
    #[error("no pokemon was selected")]
    MissingSelection,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Reads the handed-off id and fetches its full record. Nothing is cached.
pub async fn load_detail(
    handoff: &SelectionHandoff,
    catalog: &Catalog,
) -> Result<DetailRecord, DetailError> {
    let id = handoff
        .selected()
        .await?
        .filter(|id| !id.trim().is_empty())
        .ok_or(DetailError::MissingSelection)?;
    let record = catalog.fetch_detail(id.trim()).await?;
    Ok(record)
}
