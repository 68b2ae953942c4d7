use dicom::{
    core::{Tag, value::ConvertValueError},
    object::{InMemDicomObject, OpenFileOptions, mem::InMemElement},
};
use dicom_dictionary_std::tags;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The header of a record could not be opened or parsed.
#[derive(Debug, Error)]
#[error("Could not read DICOM header from {}: {source}", .path.display())]
pub struct UnreadableFileError {
    pub path: PathBuf,
    #[source]
    pub source: dicom::object::ReadError,
}

/// A tag is present but its value does not convert to the requested type.
#[derive(Debug, Error)]
#[error("Malformed value for tag {tag}: {source}")]
pub struct MalformedValueError {
    pub tag: Tag,
    #[source]
    pub source: ConvertValueError,
}

/// Conversion from a single data element into a Rust value.
pub trait FromElement: Sized {
    fn from_element(element: &InMemElement) -> Result<Self, ConvertValueError>;
}

impl FromElement for String {
    fn from_element(element: &InMemElement) -> Result<Self, ConvertValueError> {
        element
            .to_str()
            .map(|s| s.trim_end_matches(['\0', ' ']).trim_start().to_string())
    }
}

impl FromElement for i32 {
    fn from_element(element: &InMemElement) -> Result<Self, ConvertValueError> {
        element.to_int::<i32>()
    }
}

impl FromElement for u32 {
    fn from_element(element: &InMemElement) -> Result<Self, ConvertValueError> {
        element.to_int::<u32>()
    }
}

impl FromElement for f64 {
    fn from_element(element: &InMemElement) -> Result<Self, ConvertValueError> {
        element.to_float64()
    }
}

impl FromElement for Vec<f64> {
    fn from_element(element: &InMemElement) -> Result<Self, ConvertValueError> {
        element.to_multi_float64()
    }
}

/// The tag table of one record, read without its bulk pixel data.
#[derive(Debug, Clone)]
pub struct TagTable {
    object: InMemDicomObject,
}

impl From<InMemDicomObject> for TagTable {
    fn from(object: InMemDicomObject) -> Self {
        Self { object }
    }
}

impl TagTable {
    /// Read the header of the file at `path`, stopping before Pixel Data.
    ///
    /// The file handle is released before this function returns.
    pub fn read_header(path: impl AsRef<Path>) -> Result<Self, UnreadableFileError> {
        let path = path.as_ref();
        let object = OpenFileOptions::new()
            .read_until(tags::PIXEL_DATA)
            .open_file(path)
            .map_err(|source| UnreadableFileError {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self::from(object.into_inner()))
    }

    /// Look a tag up, returning `default` when it is absent, empty or cannot
    /// be converted to `T`. Never fails.
    pub fn get<T: FromElement>(&self, tag: Tag, default: T) -> T {
        self.lookup(tag).ok().flatten().unwrap_or(default)
    }

    /// Shorthand for [`TagTable::get`] with an empty string default.
    pub fn string(&self, tag: Tag) -> String {
        self.get(tag, String::new())
    }

    /// Look a tag up, distinguishing an absent tag (`Ok(None)`) from a
    /// present one whose value is not convertible (`Err`).
    ///
    /// Blank textual values count as absent.
    pub fn lookup<T: FromElement>(&self, tag: Tag) -> Result<Option<T>, MalformedValueError> {
        let Some(element) = self.element(tag) else {
            return Ok(None);
        };

        T::from_element(element)
            .map(Some)
            .map_err(|source| MalformedValueError { tag, source })
    }

    /// Read a windowing value which may be stored as one value or several.
    /// The first value wins.
    pub fn window_value(&self, tag: Tag) -> Result<Option<f64>, MalformedValueError> {
        Ok(self
            .lookup::<Vec<f64>>(tag)?
            .and_then(|values| values.first().copied()))
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.element(tag).is_some()
    }

    fn element(&self, tag: Tag) -> Option<&InMemElement> {
        self.object
            .element(tag)
            .ok()
            .filter(|element| element.value().multiplicity() > 0)
            .filter(|element| {
                element
                    .to_str()
                    .map(|s| !s.trim_matches(['\0', ' ']).is_empty())
                    .unwrap_or(true)
            })
    }
}
