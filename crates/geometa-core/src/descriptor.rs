//! # Field and Band Descriptors
//!
//! Typed records for the entries of `content_info.attributes`.
//!
//! Every descriptor has an identity key, an *intrinsic* subset that is
//! read from the dataset, and a *descriptive* subset that a person
//! writes. Reconciliation carries the descriptive subset forward only
//! when the intrinsic subset is exactly unchanged.
//!
//! | record            | identity | intrinsic                          | descriptive                     |
//! |-------------------|----------|------------------------------------|---------------------------------|
//! | [`FieldDescriptor`] | `name`   | `type`                             | title, abstract, units          |
//! | [`BandDescriptor`]  | `index`  | `gdal_type`, `numpy_type`, `nodata` | name, title, abstract, units    |
//!
//! Fields compare only their declared type while bands also compare
//! storage type and nodata. The asymmetry is kept as-is.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Human-authored properties shared by fields and bands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptive {
    /// Short title.
    #[serde(default)]
    pub title: String,
    /// Longer description.
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    /// Units of measurement.
    #[serde(default)]
    pub units: String,
}

/// A column of a table or an attribute of a vector layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Identity key, unique within a resource.
    pub name: String,
    /// Declared type as reported by the reader (e.g. `integer`, `string`).
    #[serde(rename = "type")]
    pub field_type: String,
    /// Human-authored properties.
    #[serde(flatten)]
    pub descriptive: Descriptive,
}

impl FieldDescriptor {
    /// A freshly probed field with empty descriptive properties.
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            descriptive: Descriptive::default(),
        }
    }

    /// True when both fields have the same declared type.
    pub fn same_identity(&self, other: &FieldDescriptor) -> bool {
        self.field_type == other.field_type
    }

    /// Copy the descriptive subset of `prior` onto this field.
    pub fn inherit_descriptive(&mut self, prior: &FieldDescriptor) {
        self.descriptive = prior.descriptive.clone();
    }

    /// Render as an entry of `content_info.attributes`.
    pub fn to_attribute(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "type": self.field_type,
            "title": self.descriptive.title,
            "abstract": self.descriptive.abstract_text,
            "units": self.descriptive.units,
        })
    }
}

/// A raster nodata value.
///
/// Equality treats two NaN values as equal so that a band whose nodata
/// is NaN keeps its identity across probes. NaN has no JSON number form
/// and is written as the string `"NaN"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoData(pub Option<f64>);

impl NoData {
    /// Document representation: a number, `"NaN"`, or null.
    pub fn to_value(&self) -> Value {
        match self.0 {
            None => Value::Null,
            Some(v) if v.is_nan() => Value::String(NAN_TEXT.to_string()),
            Some(v) => serde_json::Number::from_f64(v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

pub(crate) const NAN_TEXT: &str = "NaN";

impl Serialize for NoData {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NoData {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(Self(None)),
            Some(Repr::Number(v)) => Ok(Self(Some(v))),
            Some(Repr::Text(t)) if t.eq_ignore_ascii_case(NAN_TEXT) => Ok(Self(Some(f64::NAN))),
            Some(Repr::Text(t)) => Err(serde::de::Error::custom(format!(
                "nodata must be a number, \"NaN\", or null, got '{t}'"
            ))),
        }
    }
}

impl PartialEq for NoData {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => false,
        }
    }
}

/// A band of a raster, identified by its 1-based index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandDescriptor {
    /// 1-based band index.
    pub index: u32,
    /// GDAL storage type name (e.g. `Int16`, `Float32`).
    pub gdal_type: String,
    /// Equivalent numpy dtype name (e.g. `int16`).
    pub numpy_type: String,
    /// Nodata value, if one is set.
    #[serde(default)]
    pub nodata: NoData,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Human-authored properties.
    #[serde(flatten)]
    pub descriptive: Descriptive,
}

impl BandDescriptor {
    /// A freshly probed band with the default display name `band<index>`.
    pub fn new(
        index: u32,
        gdal_type: impl Into<String>,
        numpy_type: impl Into<String>,
        nodata: Option<f64>,
    ) -> Self {
        Self {
            index,
            gdal_type: gdal_type.into(),
            numpy_type: numpy_type.into(),
            nodata: NoData(nodata),
            name: Self::default_name(index),
            descriptive: Descriptive::default(),
        }
    }

    /// Display name given to a band nobody has named.
    pub fn default_name(index: u32) -> String {
        format!("band{index}")
    }

    /// True when storage type, numpy type, and nodata all match.
    pub fn same_identity(&self, other: &BandDescriptor) -> bool {
        self.gdal_type == other.gdal_type
            && self.numpy_type == other.numpy_type
            && self.nodata == other.nodata
    }

    /// Copy the display name and descriptive subset of `prior` onto this band.
    pub fn inherit_descriptive(&mut self, prior: &BandDescriptor) {
        self.name = prior.name.clone();
        self.descriptive = prior.descriptive.clone();
    }

    /// Value category of the band's pixels: `integer` or `number`.
    pub fn value_type(&self) -> &'static str {
        match self.gdal_type.as_str() {
            "Byte" | "Int8" | "UInt16" | "Int16" | "UInt32" | "Int32" | "UInt64" | "Int64" => {
                "integer"
            }
            _ => "number",
        }
    }

    /// Render as an entry of `content_info.attributes`.
    pub fn to_attribute(&self) -> Value {
        serde_json::json!({
            "index": self.index,
            "name": self.name,
            "type": self.value_type(),
            "gdal_type": self.gdal_type,
            "numpy_type": self.numpy_type,
            "nodata": self.nodata.to_value(),
            "title": self.descriptive.title,
            "abstract": self.descriptive.abstract_text,
            "units": self.descriptive.units,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_identity_ignores_descriptive() {
        let mut a = FieldDescriptor::new("foo", "integer");
        a.descriptive.title = "Foo".to_string();
        let b = FieldDescriptor::new("foo", "integer");
        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&FieldDescriptor::new("foo", "real")));
    }

    #[test]
    fn band_identity_compares_nodata() {
        let a = BandDescriptor::new(1, "Int16", "int16", Some(-1.0));
        let b = BandDescriptor::new(1, "Int16", "int16", Some(-9999.0));
        assert!(!a.same_identity(&b));
        assert!(a.same_identity(&BandDescriptor::new(1, "Int16", "int16", Some(-1.0))));
    }

    #[test]
    fn nan_nodata_is_stable() {
        assert_eq!(NoData(Some(f64::NAN)), NoData(Some(f64::NAN)));
        assert_ne!(NoData(Some(f64::NAN)), NoData(None));
    }

    #[test]
    fn nan_nodata_survives_the_document_form() {
        let band = BandDescriptor::new(1, "Float32", "float32", Some(f64::NAN));
        let attr = band.to_attribute();
        assert_eq!(attr["nodata"], json!("NaN"));
        let decoded: BandDescriptor = serde_json::from_value(attr).unwrap();
        assert!(decoded.same_identity(&band));
    }

    #[test]
    fn nodata_rejects_arbitrary_text() {
        assert!(serde_json::from_value::<NoData>(json!("missing")).is_err());
        assert_eq!(serde_json::from_value::<NoData>(json!(null)).unwrap(), NoData(None));
    }

    #[test]
    fn band_value_type_from_gdal_type() {
        assert_eq!(BandDescriptor::new(1, "Byte", "uint8", None).value_type(), "integer");
        assert_eq!(BandDescriptor::new(1, "Float32", "float32", None).value_type(), "number");
    }

    #[test]
    fn band_decodes_from_attribute() {
        let attr = json!({
            "index": 2,
            "name": "elevation",
            "type": "integer",
            "gdal_type": "Int16",
            "numpy_type": "int16",
            "nodata": -1.0,
            "title": "Elevation",
            "abstract": "meters above sea level",
            "units": "m",
        });
        let band: BandDescriptor = serde_json::from_value(attr).unwrap();
        assert_eq!(band.index, 2);
        assert_eq!(band.descriptive.title, "Elevation");
        assert_eq!(band.descriptive.abstract_text, "meters above sea level");
        assert_eq!(band.nodata, NoData(Some(-1.0)));
    }

    #[test]
    fn field_decodes_with_missing_descriptive() {
        let field: FieldDescriptor =
            serde_json::from_value(json!({"name": "foo", "type": "string"})).unwrap();
        assert_eq!(field.descriptive, Descriptive::default());
    }

    #[test]
    fn field_attribute_shape() {
        let attr = FieldDescriptor::new("foo", "real").to_attribute();
        assert_eq!(attr["name"], "foo");
        assert_eq!(attr["type"], "real");
        assert_eq!(attr["title"], "");
        assert!(attr.get("index").is_none());
    }
}
