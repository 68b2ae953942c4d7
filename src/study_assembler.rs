use crate::{
    catalog::{Catalog, Study},
    file_organizer::{FileGrouping, OrganizeError, organize},
    metadata::extract_study_metadata,
    options::LoadOptions,
    series_loader::SeriesLoader,
    tag_reader::TagTable,
};
use log::{debug, error, info, warn};
use std::path::Path;

pub struct StudyAssembler;

impl StudyAssembler {
    /// Build one [`Study`] per study UID in `grouping`.
    ///
    /// Study and patient metadata come from the first file of the first
    /// series. Series that fail to load are left out; a study whose series
    /// map is empty is skipped.
    pub fn assemble(grouping: &FileGrouping, options: &LoadOptions) -> Catalog {
        let mut catalog = Catalog::default();

        for (study_uid, series_files) in grouping.studies() {
            let Some(representative) = series_files.values().find_map(|files| files.first())
            else {
                debug!("Skipping study {study_uid}: no series");
                continue;
            };

            let header = match TagTable::read_header(representative) {
                Ok(header) => header,
                Err(err) => {
                    warn!("Skipping study {study_uid}: {err}");
                    continue;
                }
            };

            let mut study = Study::new(extract_study_metadata(&header));
            for (series_uid, files) in series_files {
                match SeriesLoader::load(files, options) {
                    Some(series) => study.insert_series(series_uid.clone(), series),
                    None => warn!("Dropped series {series_uid} of study {study_uid}"),
                }
            }

            catalog.insert_study(study_uid.to_string(), study);
        }

        info!(
            "Loaded {} studies with {} series and {} slices",
            catalog.len(),
            catalog.series_count(),
            catalog.slice_count()
        );
        catalog
    }
}

/// Organize and assemble everything under `root`.
///
/// # Errors
///
/// Returns error only if `root` is missing, not a directory, or cannot be
/// listed
pub fn try_load_catalog(
    root: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<Catalog, OrganizeError> {
    let grouping = organize(root)?;
    Ok(StudyAssembler::assemble(&grouping, options))
}

/// Like [`try_load_catalog`] with default options, but a root that cannot
/// be organized is logged once and yields an empty catalog.
pub fn load_catalog(root: impl AsRef<Path>) -> Catalog {
    try_load_catalog(root, &LoadOptions::default()).unwrap_or_else(|err| {
        error!("Error loading DICOM studies: {err}");
        Catalog::default()
    })
}
