//! # Sidecar Editing
//!
//! [`Sidecar`] holds one document together with the schema it must
//! satisfy and, when it describes a dataset, the store it is written to.
//!
//! Every setter builds a candidate document, validates it, and commits
//! only if the edit introduces no new violation. Violations already
//! present in a hand-edited draft do not block unrelated edits. A
//! rejected edit leaves the document exactly as it was and returns the
//! [`ValidationError`].
//!
//! ```ignore
//! let schema = McfSchema::bundled()?;
//! let mut sidecar = Sidecar::describe(&schema, &Profile::default(), &probe, "parcels.shp")?;
//! sidecar.set_title("Parcels")?;
//! sidecar.set_field_description("area", &DescriptiveUpdate::default().units("ha"))?;
//! sidecar.write()?;
//! ```

use std::path::Path;

use chrono::Utc;
use geometa_core::{
    BandDescriptor, Document, FieldDescriptor, GeometaError, Probe, ResourceDescription,
    ValidationError,
};
use geometa_schema::{synthesize, McfSchema};
use serde_json::{json, Map, Value};

use crate::config::Profile;
use crate::reconcile::{Base, Reconciler};
use crate::store::SidecarStore;

// ---------------------------------------------------------------------------
// Edit inputs
// ---------------------------------------------------------------------------

/// Source of a keyword vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub name: String,
    pub url: Option<String>,
}

/// Partial update of an attribute's descriptive properties.
///
/// Unset properties keep their current values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptiveUpdate {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub units: Option<String>,
}

impl DescriptiveUpdate {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.abstract_text = Some(abstract_text.into());
        self
    }

    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    fn apply(&self, attribute: &mut Map<String, Value>) {
        let updates = [
            ("title", &self.title),
            ("abstract", &self.abstract_text),
            ("units", &self.units),
        ];
        for (key, value) in updates {
            if let Some(value) = value {
                attribute.insert(key.to_string(), json!(value));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Sidecar
// ---------------------------------------------------------------------------

/// A sidecar document under edit.
#[derive(Debug)]
pub struct Sidecar<'s> {
    schema: &'s McfSchema,
    document: Document,
    store: Option<SidecarStore>,
}

impl<'s> Sidecar<'s> {
    /// A stamped template that describes no dataset.
    ///
    /// # Errors
    ///
    /// Returns [`GeometaError::SchemaDefinition`] if the template cannot
    /// be synthesized.
    pub fn blank(schema: &'s McfSchema, profile: &Profile) -> Result<Self, GeometaError> {
        let mut document = schema.template()?;
        stamp(&mut document, schema, profile);
        Ok(Self {
            schema,
            document,
            store: None,
        })
    }

    /// Probe `dataset` and reconcile the result with its sidecar.
    ///
    /// # Errors
    ///
    /// Returns [`GeometaError::Probe`] if probing fails, or any error of
    /// [`Sidecar::from_description`].
    pub fn describe<P: Probe + ?Sized>(
        schema: &'s McfSchema,
        profile: &Profile,
        probe: &P,
        dataset: &str,
    ) -> Result<Self, GeometaError> {
        let description = probe.probe(dataset)?;
        Self::from_description(schema, profile, &description, SidecarStore::for_dataset(dataset))
    }

    /// Reconcile a probed description with the sidecar held by `store`.
    ///
    /// A sidecar that cannot be read or parsed is treated as absent.
    /// Newly created documents are stamped and take the profile.
    ///
    /// # Errors
    ///
    /// Returns [`GeometaError::InvalidDescription`] for duplicate field
    /// names or band indices, or [`GeometaError::SchemaDefinition`].
    pub fn from_description(
        schema: &'s McfSchema,
        profile: &Profile,
        description: &ResourceDescription,
        store: SidecarStore,
    ) -> Result<Self, GeometaError> {
        description.check()?;
        let existing = store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable sidecar");
            None
        });
        let reconciler = Reconciler::new(schema)?;
        let (mut document, base) = reconciler.reconcile_with_base(description, existing.as_ref());
        if base == Base::Template {
            stamp(&mut document, schema, profile);
        }
        Ok(Self {
            schema,
            document,
            store: Some(store),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Sidecar path, when the document describes a dataset.
    pub fn path(&self) -> Option<&Path> {
        self.store.as_ref().map(SidecarStore::path)
    }

    /// Validate the whole document.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.schema.validate(self.document.as_value())
    }

    /// Write the document to its sidecar.
    ///
    /// An invalid document is still written; the violation is logged.
    ///
    /// # Errors
    ///
    /// Returns [`GeometaError::InvalidDescription`] when the document
    /// has no sidecar path, or an IO or serialization error.
    pub fn write(&self) -> Result<(), GeometaError> {
        let store = self.store.as_ref().ok_or_else(|| {
            GeometaError::InvalidDescription("document describes no dataset".to_string())
        })?;
        self.write_to(store)
    }

    /// Write the document to an explicit store.
    ///
    /// # Errors
    ///
    /// Returns an IO or serialization error.
    pub fn write_to(&self, store: &SidecarStore) -> Result<(), GeometaError> {
        if let Err(e) = self.validate() {
            tracing::warn!(path = %store.path().display(), error = %e, "writing invalid sidecar");
        }
        store.save(&self.document)
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), GeometaError> {
        self.commit(&["identification", "title"], json!(title))
    }

    pub fn get_title(&self) -> Option<&str> {
        self.document.get_str(&["identification", "title"])
    }

    pub fn set_abstract(&mut self, abstract_text: &str) -> Result<(), GeometaError> {
        self.commit(&["identification", "abstract"], json!(abstract_text))
    }

    pub fn get_abstract(&self) -> Option<&str> {
        self.document.get_str(&["identification", "abstract"])
    }

    pub fn set_purpose(&mut self, purpose: &str) -> Result<(), GeometaError> {
        self.commit(&["identification", "purpose"], json!(purpose))
    }

    pub fn get_purpose(&self) -> Option<&str> {
        self.document.get_str(&["identification", "purpose"])
    }

    pub fn set_edition(&mut self, edition: &str) -> Result<(), GeometaError> {
        self.commit(&["identification", "edition"], json!(edition))
    }

    pub fn get_edition(&self) -> Option<&str> {
        self.document.get_str(&["identification", "edition"])
    }

    /// Replace the keyword section `section`.
    pub fn set_keywords(
        &mut self,
        keywords: &[&str],
        section: &str,
        keywords_type: &str,
        vocabulary: Option<&Vocabulary>,
    ) -> Result<(), GeometaError> {
        let mut value = json!({"keywords": keywords, "keywords_type": keywords_type});
        if let Some(vocabulary) = vocabulary {
            let mut vocab = json!({"name": vocabulary.name});
            if let Some(url) = &vocabulary.url {
                vocab["url"] = json!(url);
            }
            value["vocabulary"] = vocab;
        }
        self.commit(&["identification", "keywords", section], value)
    }

    pub fn get_keywords(&self, section: &str) -> Option<&Value> {
        self.document.get(&["identification", "keywords", section])
    }

    /// Set properties of the contact section `section`.
    ///
    /// A new section starts from the schema's minimal contact, so any
    /// required property left unset is an empty string.
    pub fn set_contact<'a, I>(&mut self, section: &str, properties: I) -> Result<(), GeometaError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let path = ["contact", section];
        let mut contact = match self.document.get(&path) {
            Some(Value::Object(existing)) => existing.clone(),
            _ => self.seed(&path)?,
        };
        for (key, value) in properties {
            contact.insert(key.to_string(), json!(value));
        }
        self.commit(&path, Value::Object(contact))
    }

    pub fn get_contact(&self, section: &str) -> Option<&Value> {
        self.document.get(&["contact", section])
    }

    /// Set the license. Unset parts become empty strings.
    pub fn set_license(&mut self, name: Option<&str>, url: Option<&str>) -> Result<(), GeometaError> {
        self.commit(
            &["identification", "license"],
            json!({"name": name.unwrap_or_default(), "url": url.unwrap_or_default()}),
        )
    }

    pub fn get_license(&self) -> Option<&Value> {
        self.document.get(&["identification", "license"])
    }

    pub fn set_lineage(&mut self, statement: &str) -> Result<(), GeometaError> {
        self.commit(&["dataquality", "lineage", "statement"], json!(statement))
    }

    pub fn get_lineage(&self) -> Option<&str> {
        self.document.get_str(&["dataquality", "lineage", "statement"])
    }

    /// Update the descriptive properties of the field `name`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometaError::UnknownField`] if no such field exists.
    pub fn set_field_description(
        &mut self,
        name: &str,
        update: &DescriptiveUpdate,
    ) -> Result<(), GeometaError> {
        let mut attributes = self.attributes();
        let field = attributes
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|a| !a.contains_key("index") && a.get("name").and_then(Value::as_str) == Some(name))
            .ok_or_else(|| GeometaError::UnknownField(name.to_string()))?;
        update.apply(field);
        self.commit(&["content_info", "attributes"], Value::Array(attributes))
    }

    pub fn get_field_description(&self, name: &str) -> Option<FieldDescriptor> {
        self.attributes()
            .into_iter()
            .filter(|a| a.get("index").is_none())
            .filter_map(|a| serde_json::from_value::<FieldDescriptor>(a).ok())
            .find(|f| f.name == name)
    }

    /// Update the display name and descriptive properties of band `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometaError::UnknownBand`] if no such band exists.
    pub fn set_band_description(
        &mut self,
        index: u32,
        name: Option<&str>,
        update: &DescriptiveUpdate,
    ) -> Result<(), GeometaError> {
        let mut attributes = self.attributes();
        let band = attributes
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|a| a.get("index").and_then(Value::as_u64) == Some(u64::from(index)))
            .ok_or(GeometaError::UnknownBand(index))?;
        if let Some(name) = name {
            band.insert("name".to_string(), json!(name));
        }
        update.apply(band);
        self.commit(&["content_info", "attributes"], Value::Array(attributes))
    }

    pub fn get_band_description(&self, index: u32) -> Option<BandDescriptor> {
        self.attributes()
            .into_iter()
            .filter_map(|a| serde_json::from_value::<BandDescriptor>(a).ok())
            .find(|b| b.index == index)
    }

    fn attributes(&self) -> Vec<Value> {
        match self.document.get(&["content_info", "attributes"]) {
            Some(Value::Array(attributes)) => attributes.clone(),
            _ => Vec::new(),
        }
    }

    /// Minimal value for a wildcard section of the schema.
    fn seed(&self, path: &[&str]) -> Result<Map<String, Value>, GeometaError> {
        let mut schema_path = path.to_vec();
        if let Some(last) = schema_path.last_mut() {
            *last = geometa_schema::WILDCARD_PLACEHOLDER;
        }
        let seeded = match self.schema.root().lookup(&schema_path) {
            Some(node) => synthesize(node)?,
            None => Value::Object(Map::new()),
        };
        Ok(match seeded {
            Value::Object(map) => map,
            _ => Map::new(),
        })
    }

    fn commit(&mut self, path: &[&str], value: Value) -> Result<(), GeometaError> {
        let mut candidate = self.document.clone();
        candidate.set(path, value);
        let current = self.schema.validate_all(self.document.as_value());
        let introduced = self
            .schema
            .validate_all(candidate.as_value())
            .into_iter()
            .find(|violation| !current.contains(violation));
        if let Some(violation) = introduced {
            return Err(violation.into());
        }
        self.document = candidate;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Stamping
// ---------------------------------------------------------------------------

/// Fill the properties only a brand-new document receives.
fn stamp(document: &mut Document, schema: &McfSchema, profile: &Profile) {
    document.set(&["mcf", "version"], json!(schema.version()));
    document.set(
        &["metadata", "identifier"],
        json!(uuid::Uuid::new_v4().to_string()),
    );
    document.set(
        &["metadata", "datestamp"],
        json!(Utc::now().format("%Y-%m-%d").to_string()),
    );
    if let Some(contact) = &profile.contact {
        for (key, value) in contact {
            document.set(&["contact", geometa_schema::WILDCARD_PLACEHOLDER, key], json!(value));
        }
    }
    if let Some(license) = &profile.license {
        document.set(
            &["identification", "license"],
            json!({"name": license.name, "url": license.url}),
        );
    }
}
