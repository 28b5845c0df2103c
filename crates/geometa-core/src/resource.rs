//! # Resource Descriptions
//!
//! The freshly probed facts for one dataset: what kind of resource it
//! is, its fields or bands, its spatial extent, and the files it is made
//! of. A [`ResourceDescription`] is produced by a [`crate::Probe`] on
//! every call and is never persisted on its own; only the reconciled
//! document is written.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::descriptor::{BandDescriptor, FieldDescriptor};
use crate::error::GeometaError;

/// The kind of dataset a resource describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A compressed archive of other files.
    Archive,
    /// A delimited text table.
    Table,
    /// A vector layer.
    Vector,
    /// A gridded raster.
    Raster,
}

impl ResourceKind {
    /// Lowercase name, as written to `resource.kind`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::Table => "table",
            Self::Vector => "vector",
            Self::Raster => "raster",
        }
    }

    /// Value of `metadata.hierarchylevel`.
    pub fn hierarchy_level(&self) -> &'static str {
        match self {
            Self::Vector | Self::Raster => "dataset",
            Self::Table | Self::Archive => "nonGeographicDataset",
        }
    }

    /// Value of `spatial.datatype`, if the kind has one.
    pub fn spatial_datatype(&self) -> Option<&'static str> {
        match self {
            Self::Vector => Some("vector"),
            Self::Raster => Some("grid"),
            Self::Table => Some("textTable"),
            Self::Archive => None,
        }
    }

    /// Value of `content_info.type`.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Raster => "image",
            Self::Vector | Self::Table | Self::Archive => "coverage",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis-aligned bounding box, serialized as `[minx, miny, maxx, maxy]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl From<[f64; 4]> for BoundingBox {
    fn from([minx, miny, maxx, maxy]: [f64; 4]) -> Self {
        Self {
            minx,
            miny,
            maxx,
            maxy,
        }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.minx, b.miny, b.maxx, b.maxy]
    }
}

/// Coordinate reference system: an EPSG code when the dataset's
/// projection has an authority, WKT otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Crs {
    Epsg(u32),
    Wkt(String),
}

/// Spatial extent of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    pub bbox: BoundingBox,
    pub crs: Crs,
}

/// Geometry class of a vector layer, using FGDC geometry type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryType {
    Point,
    Curve,
    Surface,
    Complex,
}

impl GeometryType {
    /// Classify an OGR geometry type name such as `"Multi Polygon"`.
    ///
    /// Collections win over lines, lines over polygons, polygons over
    /// points. Returns `None` for names with none of these parts.
    pub fn from_ogr_name(name: &str) -> Option<Self> {
        if name.contains("Collection") {
            Some(Self::Complex)
        } else if name.contains("Line") {
            Some(Self::Curve)
        } else if name.contains("Polygon") {
            Some(Self::Surface)
        } else if name.contains("Point") {
            Some(Self::Point)
        } else {
            None
        }
    }

    /// Value of `spatial.geomtype`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Curve => "curve",
            Self::Surface => "surface",
            Self::Complex => "complex",
        }
    }
}

/// Field or band collection of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceSchema {
    Fields(Vec<FieldDescriptor>),
    Bands(Vec<BandDescriptor>),
}

/// Freshly probed facts about one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescription {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Path or URL of the dataset.
    pub path: String,
    /// Fields or bands, if the resource has any.
    ///
    /// Written as `schema: {fields: [...]}` or `schema: {bands: [...]}`,
    /// not as a YAML tag.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_yaml::with::singleton_map"
    )]
    pub schema: Option<ResourceSchema>,
    /// Spatial extent, for geographic resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<SpatialExtent>,
    /// Geometry class, for vector resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryType>,
    /// Files that make up the dataset (e.g. `.shp`, `.shx`, `.dbf`).
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ResourceDescription {
    /// A description with no fields, bands, extent, or sources.
    pub fn new(kind: ResourceKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            schema: None,
            extent: None,
            geometry: None,
            sources: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.schema = Some(ResourceSchema::Fields(fields));
        self
    }

    pub fn with_bands(mut self, bands: Vec<BandDescriptor>) -> Self {
        self.schema = Some(ResourceSchema::Bands(bands));
        self
    }

    pub fn with_extent(mut self, extent: SpatialExtent) -> Self {
        self.extent = Some(extent);
        self
    }

    pub fn with_geometry(mut self, geometry: GeometryType) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// Fields of the resource; empty for banded or schemaless resources.
    pub fn fields(&self) -> &[FieldDescriptor] {
        match &self.schema {
            Some(ResourceSchema::Fields(fields)) => fields,
            _ => &[],
        }
    }

    /// Bands of the resource; empty for non-raster resources.
    pub fn bands(&self) -> &[BandDescriptor] {
        match &self.schema {
            Some(ResourceSchema::Bands(bands)) => bands,
            _ => &[],
        }
    }

    /// Value of `spatial.geomtype`. Rasters are always surfaces.
    pub fn geomtype(&self) -> Option<&'static str> {
        match self.kind {
            ResourceKind::Raster => Some(GeometryType::Surface.as_str()),
            ResourceKind::Vector => self.geometry.map(|g| g.as_str()),
            ResourceKind::Table | ResourceKind::Archive => None,
        }
    }

    /// Check that identity keys are unique and band indices are 1-based.
    ///
    /// # Errors
    ///
    /// Returns [`GeometaError::InvalidDescription`] naming the first
    /// duplicate or out-of-range key.
    pub fn check(&self) -> Result<(), GeometaError> {
        match &self.schema {
            Some(ResourceSchema::Fields(fields)) => {
                let mut seen = HashSet::new();
                for field in fields {
                    if !seen.insert(field.name.as_str()) {
                        return Err(GeometaError::InvalidDescription(format!(
                            "duplicate field name '{}'",
                            field.name
                        )));
                    }
                }
            }
            Some(ResourceSchema::Bands(bands)) => {
                let mut seen = HashSet::new();
                for band in bands {
                    if band.index == 0 {
                        return Err(GeometaError::InvalidDescription(
                            "band indices are 1-based".to_string(),
                        ));
                    }
                    if !seen.insert(band.index) {
                        return Err(GeometaError::InvalidDescription(format!(
                            "duplicate band index {}",
                            band.index
                        )));
                    }
                }
            }
            None => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn geometry_classification_precedence() {
        assert_eq!(GeometryType::from_ogr_name("Point"), Some(GeometryType::Point));
        assert_eq!(GeometryType::from_ogr_name("Multi Polygon"), Some(GeometryType::Surface));
        assert_eq!(GeometryType::from_ogr_name("Line String"), Some(GeometryType::Curve));
        assert_eq!(
            GeometryType::from_ogr_name("Geometry Collection"),
            Some(GeometryType::Complex)
        );
        assert_eq!(GeometryType::from_ogr_name("Unknown (any)"), None);
    }

    #[test]
    fn bbox_serializes_as_array() {
        let extent = SpatialExtent {
            bbox: BoundingBox::from([0.0, -1.0, 2.0, 1.0]),
            crs: Crs::Epsg(4326),
        };
        let v = serde_json::to_value(&extent).unwrap();
        assert_eq!(v, json!({"bbox": [0.0, -1.0, 2.0, 1.0], "crs": 4326}));
    }

    #[test]
    fn crs_accepts_wkt() {
        let crs: Crs = serde_json::from_value(json!("GEOGCS[\"WGS 84\"]")).unwrap();
        assert!(matches!(crs, Crs::Wkt(_)));
    }

    #[test]
    fn duplicate_field_names_rejected() {
        let desc = ResourceDescription::new(ResourceKind::Table, "t.csv").with_fields(vec![
            FieldDescriptor::new("a", "integer"),
            FieldDescriptor::new("a", "string"),
        ]);
        assert!(desc.check().is_err());
    }

    #[test]
    fn zero_band_index_rejected() {
        let desc = ResourceDescription::new(ResourceKind::Raster, "r.tif")
            .with_bands(vec![BandDescriptor::new(0, "Byte", "uint8", None)]);
        assert!(desc.check().is_err());
    }

    #[test]
    fn description_decodes_from_yaml() {
        let yaml = r#"
kind: raster
path: dem.tif
schema:
  bands:
    - index: 1
      gdal_type: Int16
      numpy_type: int16
      nodata: -1
extent:
  bbox: [0, 0, 2, 2]
  crs: 4326
sources: [dem.tif]
"#;
        let desc: ResourceDescription = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(desc.kind, ResourceKind::Raster);
        assert_eq!(desc.bands().len(), 1);
        assert_eq!(desc.bands()[0].name, "");
        assert_eq!(desc.geomtype(), Some("surface"));
        assert!(desc.check().is_ok());
    }

    #[test]
    fn description_encodes_schema_as_mapping() {
        let desc = ResourceDescription::new(ResourceKind::Table, "t.csv")
            .with_fields(vec![FieldDescriptor::new("id", "integer")]);
        let yaml = serde_yaml::to_string(&desc).unwrap();
        assert!(yaml.contains("fields:"));
        assert!(!yaml.contains("!fields"));
        let reread: ResourceDescription = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(reread, desc);
        assert_eq!(
            serde_json::to_value(&desc).unwrap()["schema"]["fields"][0]["name"],
            json!("id")
        );
    }
}
