//! # Probe — Dataset Inspection Seam
//!
//! Detecting a dataset's type and reading its physical properties
//! (geometry, bands, fields, bounding boxes) is done by readers outside
//! this workspace. They plug in through [`Probe`].

use crate::error::ProbeError;
use crate::resource::ResourceDescription;

/// Produces a fresh [`ResourceDescription`] for a dataset.
///
/// Implementations perform all blocking I/O needed to inspect the
/// dataset; nothing downstream touches the dataset again.
pub trait Probe {
    /// Inspect the dataset at `dataset` (a path or URL).
    fn probe(&self, dataset: &str) -> Result<ResourceDescription, ProbeError>;
}

impl<F> Probe for F
where
    F: Fn(&str) -> Result<ResourceDescription, ProbeError>,
{
    fn probe(&self, dataset: &str) -> Result<ResourceDescription, ProbeError> {
        self(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceKind;

    #[test]
    fn closures_are_probes() {
        let probe = |path: &str| Ok(ResourceDescription::new(ResourceKind::Table, path));
        let desc = probe.probe("data.csv").unwrap();
        assert_eq!(desc.path, "data.csv");
    }

    #[test]
    fn probe_errors_propagate() {
        let probe = |path: &str| -> Result<ResourceDescription, ProbeError> {
            Err(ProbeError::NotFound {
                path: path.to_string(),
            })
        };
        let err = probe.probe("missing.tif").unwrap_err();
        assert_eq!(err.to_string(), "missing.tif does not exist");
    }
}
