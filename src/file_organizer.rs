use crate::tag_reader::{TagTable, UnreadableFileError};
use dicom_dictionary_std::tags;
use log::{debug, info, warn};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("Directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// File paths grouped by Study Instance UID, then Series Instance UID.
///
/// Paths within a series keep the order they were inserted in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileGrouping {
    studies: BTreeMap<String, BTreeMap<String, Vec<PathBuf>>>,
}

impl FileGrouping {
    pub fn new() -> Self {
        Self::default()
    }

    /// File `path` under its study and series.
    ///
    /// A series UID already filed under another study is still inserted,
    /// with a warning.
    pub fn insert(&mut self, study_uid: &str, series_uid: &str, path: PathBuf) {
        if let Some(other) = self
            .study_holding(series_uid)
            .filter(|other| *other != study_uid)
        {
            warn!(
                "Series {series_uid} of {} also appears in study {other}",
                path.display()
            );
        }

        self.studies
            .entry(study_uid.to_string())
            .or_default()
            .entry(series_uid.to_string())
            .or_default()
            .push(path);
    }

    pub fn studies(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, Vec<PathBuf>>)> {
        self.studies
            .iter()
            .map(|(study_uid, series)| (study_uid.as_str(), series))
    }

    /// The first study (in UID order) that has a series `series_uid`.
    pub fn study_holding(&self, series_uid: &str) -> Option<&str> {
        self.studies
            .iter()
            .find(|(_, series)| series.contains_key(series_uid))
            .map(|(study_uid, _)| study_uid.as_str())
    }

    pub fn series(&self, study_uid: &str) -> Option<&BTreeMap<String, Vec<PathBuf>>> {
        self.studies.get(study_uid)
    }

    pub fn files(&self, study_uid: &str, series_uid: &str) -> Option<&[PathBuf]> {
        self.series(study_uid)?
            .get(series_uid)
            .map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.studies.is_empty()
    }

    pub fn study_count(&self) -> usize {
        self.studies.len()
    }

    pub fn series_count(&self) -> usize {
        self.studies.values().map(BTreeMap::len).sum()
    }

    pub fn file_count(&self) -> usize {
        self.studies
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }
}

/// The identifiers that place a record in the study/series hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUids {
    pub study_uid: String,
    pub series_uid: String,
    pub sop_instance_uid: String,
}

impl RecordUids {
    fn is_groupable(&self) -> bool {
        !self.study_uid.is_empty() && !self.series_uid.is_empty()
    }
}

/// Read the study, series and instance UIDs from a record's header.
pub fn read_uids(path: impl AsRef<Path>) -> Result<RecordUids, UnreadableFileError> {
    let table = TagTable::read_header(path)?;
    Ok(RecordUids {
        study_uid: table.string(tags::STUDY_INSTANCE_UID),
        series_uid: table.string(tags::SERIES_INSTANCE_UID),
        sop_instance_uid: table.string(tags::SOP_INSTANCE_UID),
    })
}

/// Walk `root` recursively and group every readable record by study and
/// series.
///
/// Files that are not records, or that lack a study or series UID, are
/// skipped. Symlinked directories are not descended into. Only a root that
/// is missing or cannot be listed is an error.
pub fn organize(root: impl AsRef<Path>) -> Result<FileGrouping, OrganizeError> {
    let root = root.as_ref();
    if !root.exists() {
        return Err(OrganizeError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(OrganizeError::NotADirectory(root.to_path_buf()));
    }

    let mut grouping = FileGrouping::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 || err.path() == Some(root) => {
                return Err(OrganizeError::Io(err.into()));
            }
            Err(err) => {
                debug!("Skipping unreadable entry: {err}");
                continue;
            }
        };
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }

        let path = entry.into_path();
        match read_uids(&path) {
            Ok(uids) if uids.is_groupable() => {
                grouping.insert(&uids.study_uid, &uids.series_uid, path);
            }
            Ok(_) => debug!("Skipping {}: no study or series UID", path.display()),
            Err(err) => debug!("Skipping {err}"),
        }
    }

    info!(
        "Found {} files in {} series across {} studies under {}",
        grouping.file_count(),
        grouping.series_count(),
        grouping.study_count(),
        root.display()
    );
    Ok(grouping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordBuilder, write_slice};

    #[test]
    fn empty_directory_gives_empty_grouping() {
        let dir = tempfile::tempdir().unwrap();
        let grouping = organize(dir.path()).unwrap();
        assert!(grouping.is_empty());
        assert_eq!(grouping.file_count(), 0);
    }

    #[test]
    fn groups_nested_files_by_study_and_series() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_slice(&root.join("a/1.dcm"), "S1", "SE1", "S1.1", (2, 2));
        write_slice(&root.join("a/2.dcm"), "S1", "SE1", "S1.2", (2, 2));
        write_slice(&root.join("b/c/3"), "S1", "SE2", "S1.3", (2, 2));
        write_slice(&root.join("d/4.dcm"), "S2", "SE3", "S2.1", (2, 2));

        let grouping = organize(root).unwrap();
        assert_eq!(grouping.study_count(), 2);
        assert_eq!(grouping.series_count(), 3);
        assert_eq!(grouping.file_count(), 4);
        assert_eq!(
            grouping.files("S1", "SE1").unwrap(),
            &[root.join("a/1.dcm"), root.join("a/2.dcm")]
        );
        assert_eq!(grouping.files("S2", "SE3").unwrap(), &[root.join("d/4.dcm")]);
    }

    #[test]
    fn skips_junk_and_files_without_uids() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("README.txt"), "not a record").unwrap();
        std::fs::write(root.join("empty.dcm"), b"").unwrap();
        RecordBuilder::new("", "SE1", "X.1").write(&root.join("no_study.dcm"));
        RecordBuilder::new("S1", "", "X.2").write(&root.join("no_series.dcm"));
        write_slice(&root.join("valid.dcm"), "S1", "SE1", "X.3", (2, 2));

        let grouping = organize(root).unwrap();
        assert_eq!(grouping.file_count(), 1);
        assert_eq!(grouping.files("S1", "SE1").unwrap(), &[root.join("valid.dcm")]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(organize(&missing), Err(OrganizeError::NotFound(_))));

        let file = dir.path().join("file.dcm");
        std::fs::write(&file, b"data").unwrap();
        assert!(matches!(organize(&file), Err(OrganizeError::NotADirectory(_))));
    }

    #[test]
    fn read_uids_reports_all_three() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.dcm");
        RecordBuilder::new("1.2", "1.2.3", "1.2.3.4").write(&path);

        assert_eq!(
            read_uids(&path).unwrap(),
            RecordUids {
                study_uid: "1.2".into(),
                series_uid: "1.2.3".into(),
                sop_instance_uid: "1.2.3.4".into(),
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_is_not_walked_twice() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_slice(&root.join("a/1.dcm"), "S1", "SE1", "S1.1", (2, 2));
        write_slice(&root.join("a/2.dcm"), "S1", "SE1", "S1.2", (2, 2));
        std::os::unix::fs::symlink(root.join("a"), root.join("b")).unwrap();

        let grouping = organize(root).unwrap();
        assert_eq!(grouping.file_count(), 2);
        assert_eq!(
            grouping.files("S1", "SE1").unwrap(),
            &[root.join("a/1.dcm"), root.join("a/2.dcm")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_file_is_grouped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("1.dcm");
        write_slice(&target, "S1", "SE1", "S1.1", (2, 2));
        std::os::unix::fs::symlink(&target, root.join("link.dcm")).unwrap();

        let grouping = organize(root).unwrap();
        assert_eq!(grouping.files("S1", "SE1").unwrap(), &[root.join("link.dcm")]);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_root_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        write_slice(&locked.join("1.dcm"), "S1", "SE1", "S1.1", (2, 2));
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not bind a privileged user.
        let listable = std::fs::read_dir(&locked).is_ok();
        let result = organize(&locked);
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        if !listable {
            assert!(matches!(result, Err(OrganizeError::Io(_))));
        }
    }

    #[test]
    fn series_filed_under_two_studies_keeps_first_holder() {
        let mut grouping = FileGrouping::new();
        grouping.insert("S1", "SE1", PathBuf::from("a.dcm"));
        grouping.insert("S2", "SE1", PathBuf::from("b.dcm"));

        assert_eq!(grouping.study_holding("SE1"), Some("S1"));
        assert_eq!(grouping.study_holding("SE9"), None);
        assert_eq!(grouping.files("S1", "SE1").unwrap(), &[PathBuf::from("a.dcm")]);
        assert_eq!(grouping.files("S2", "SE1").unwrap(), &[PathBuf::from("b.dcm")]);
    }
}
