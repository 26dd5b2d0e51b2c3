//! Instance loading for the SkyRoute planner.
//!
//! Responsibilities:
//! - Deserialize the JSON instance document into the [`schema`] model.
//! - Hand the document to [`skyroute_core::InstanceBuilder`] for validation.
//! - Open files through capability-based helpers in [`fs`].
//!
//! Domain rules live in `skyroute-core`; this crate only translates.
#![forbid(unsafe_code)]

mod error;
pub mod fs;
pub mod schema;

use std::io::{BufReader, Read};

use camino::Utf8Path;
use skyroute_core::Instance;

pub use error::{LoadInstanceError, ParseInstanceError};
pub use schema::InstanceDocument;

/// Parse and validate an instance document from `reader`.
///
/// # Errors
/// Returns [`ParseInstanceError::Json`] for malformed input and
/// [`ParseInstanceError::Invalid`] when the instance breaks a model rule.
pub fn parse_instance<R: Read>(reader: R) -> Result<Instance, ParseInstanceError> {
    let document: InstanceDocument = serde_json::from_reader(reader)?;
    Ok(document.into_instance()?)
}

/// Load and validate the instance stored at `path`.
///
/// # Errors
/// Returns [`LoadInstanceError`] naming `path` when the file cannot be
/// opened, parsed or validated.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
///
/// # fn main() -> Result<(), skyroute_data::LoadInstanceError> {
/// let instance = skyroute_data::load_instance(Utf8Path::new("instances/city.json"))?;
/// println!("{} waypoints", instance.point_count());
/// # Ok(())
/// # }
/// ```
pub fn load_instance(path: &Utf8Path) -> Result<Instance, LoadInstanceError> {
    let file = fs::open_utf8_file(path).map_err(|source| LoadInstanceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let instance = parse_instance(BufReader::new(file)).map_err(|err| match err {
        ParseInstanceError::Json(source) => LoadInstanceError::Parse {
            path: path.to_path_buf(),
            source,
        },
        ParseInstanceError::Invalid(source) => LoadInstanceError::Invalid {
            path: path.to_path_buf(),
            source,
        },
    })?;
    log::debug!(
        "loaded {path}: {} points, {} edges, {} no-fly zones",
        instance.point_count(),
        instance.graph().edge_count(),
        instance.zones().len()
    );
    Ok(instance)
}
