//! # Reconciliation
//!
//! Merges a freshly probed [`ResourceDescription`] with whatever sidecar
//! document already exists for the dataset.
//!
//! ## Policy
//!
//! - No usable existing document: start from the schema template. A
//!   root that is not a mapping, or an attribute list that is not a list,
//!   makes a document unusable. The reason is logged as a
//!   [`StaleDocumentError`] and never returned.
//! - Usable existing document: keep it, even when it does not satisfy the
//!   schema (drafts are written incomplete on purpose; the violation is
//!   logged), and overwrite only the intrinsic
//!   properties (resource, hierarchy level, spatial representation,
//!   content type, attributes, and spatial extent).
//! - Attributes: a prior field or band passes its descriptive properties
//!   forward only when its intrinsic properties are exactly unchanged.
//!   Entries that are no longer present in the dataset are dropped.
//!
//! Reconciliation is pure: inputs are never mutated and the result
//! depends only on the schema, the description, and the existing value.

use geometa_core::{
    BandDescriptor, Document, FieldDescriptor, ResourceDescription, SchemaDefinitionError,
    StaleDocumentError,
};
use geometa_schema::McfSchema;
use serde_json::{json, Value};

const ATTRIBUTES: [&str; 2] = ["content_info", "attributes"];

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Where a reconciled document started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    /// The schema template; no usable prior document existed.
    Template,
    /// A prior document, valid or not.
    Existing,
}

/// Reconciles fresh descriptions against one schema.
#[derive(Debug)]
pub struct Reconciler<'s> {
    schema: &'s McfSchema,
    template: Document,
}

impl<'s> Reconciler<'s> {
    /// Synthesize the template once for repeated reconciliation.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDefinitionError`] if the schema has a required
    /// leaf without a canonical default.
    pub fn new(schema: &'s McfSchema) -> Result<Self, SchemaDefinitionError> {
        Ok(Self {
            schema,
            template: schema.template()?,
        })
    }

    /// The template every new document starts from.
    pub fn template(&self) -> &Document {
        &self.template
    }

    /// Reconcile `fresh` with an optional existing document.
    pub fn reconcile(&self, fresh: &ResourceDescription, existing: Option<&Value>) -> Document {
        self.reconcile_with_base(fresh, existing).0
    }

    /// Like [`Reconciler::reconcile`], also reporting which base was used.
    pub fn reconcile_with_base(
        &self,
        fresh: &ResourceDescription,
        existing: Option<&Value>,
    ) -> (Document, Base) {
        let usable = existing.and_then(|value| match self.check_existing(value) {
            Ok(()) => Some(value),
            Err(e) => {
                tracing::warn!(path = %fresh.path, error = %e, "ignoring stale sidecar document");
                None
            }
        });

        let (mut document, base) = match usable {
            Some(value) => {
                if let Err(e) = self.schema.validate(value) {
                    tracing::warn!(
                        path = %fresh.path,
                        error = %e,
                        "existing sidecar does not satisfy the schema; keeping it as the base"
                    );
                }
                (Document::new(value.clone()), Base::Existing)
            }
            None => (self.template.clone(), Base::Template),
        };

        let (prior_fields, prior_bands) = match base {
            Base::Existing => prior_attributes(&document),
            Base::Template => (Vec::new(), Vec::new()),
        };
        apply_intrinsic(&mut document, fresh, &prior_fields, &prior_bands);
        tracing::debug!(path = %fresh.path, base = ?base, "reconciled sidecar document");
        (document, base)
    }

    /// Whether an existing document can serve as the reconciliation base.
    ///
    /// Schema validity is not required; only the shape reconciliation
    /// itself depends on is checked.
    ///
    /// # Errors
    ///
    /// Returns the [`StaleDocumentError`] that disqualifies it.
    pub fn check_existing(&self, existing: &Value) -> Result<(), StaleDocumentError> {
        if !existing.is_object() {
            return Err(StaleDocumentError::NotAMapping);
        }
        match existing.get(ATTRIBUTES[0]).and_then(|c| c.get(ATTRIBUTES[1])) {
            None | Some(Value::Array(_)) => Ok(()),
            Some(other) => Err(StaleDocumentError::MalformedAttributes(format!(
                "expected a list, got {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Attribute reconciliation
// ---------------------------------------------------------------------------

/// Decode prior attributes into fields and bands.
///
/// Entries carrying an `index` are bands. Entries that do not decode are
/// skipped; they cannot match anything fresh.
fn prior_attributes(document: &Document) -> (Vec<FieldDescriptor>, Vec<BandDescriptor>) {
    let mut fields = Vec::new();
    let mut bands = Vec::new();
    let Some(Value::Array(entries)) = document.get(&ATTRIBUTES) else {
        return (fields, bands);
    };
    for entry in entries {
        if entry.get("index").is_some() {
            match serde_json::from_value::<BandDescriptor>(entry.clone()) {
                Ok(band) => bands.push(band),
                Err(e) => tracing::debug!(error = %e, "skipping undecodable band entry"),
            }
        } else {
            match serde_json::from_value::<FieldDescriptor>(entry.clone()) {
                Ok(field) => fields.push(field),
                Err(e) => tracing::debug!(error = %e, "skipping undecodable field entry"),
            }
        }
    }
    (fields, bands)
}

/// Reconcile fresh fields against prior ones, matching by name.
pub fn reconcile_fields(
    fresh: &[FieldDescriptor],
    prior: &[FieldDescriptor],
) -> Vec<FieldDescriptor> {
    fresh
        .iter()
        .map(|f| {
            let mut field = FieldDescriptor::new(f.name.clone(), f.field_type.clone());
            if let Some(p) = prior.iter().find(|p| p.name == f.name) {
                if field.same_identity(p) {
                    field.inherit_descriptive(p);
                } else {
                    tracing::debug!(field = %f.name, "field type changed; description reset");
                }
            }
            field
        })
        .collect()
}

/// Reconcile fresh bands against prior ones, matching by index.
pub fn reconcile_bands(fresh: &[BandDescriptor], prior: &[BandDescriptor]) -> Vec<BandDescriptor> {
    fresh
        .iter()
        .map(|b| {
            let mut band = BandDescriptor::new(
                b.index,
                b.gdal_type.clone(),
                b.numpy_type.clone(),
                b.nodata.0,
            );
            if let Some(p) = prior.iter().find(|p| p.index == b.index) {
                if band.same_identity(p) {
                    band.inherit_descriptive(p);
                } else {
                    tracing::debug!(band = b.index, "band storage changed; description reset");
                }
            }
            band
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Intrinsic overwrite
// ---------------------------------------------------------------------------

fn apply_intrinsic(
    document: &mut Document,
    fresh: &ResourceDescription,
    prior_fields: &[FieldDescriptor],
    prior_bands: &[BandDescriptor],
) {
    document.set(
        &["resource"],
        json!({
            "kind": fresh.kind.as_str(),
            "path": fresh.path,
            "sources": fresh.sources,
        }),
    );
    document.set(&["metadata", "hierarchylevel"], json!(fresh.kind.hierarchy_level()));

    match fresh.kind.spatial_datatype() {
        Some(datatype) => {
            let mut spatial = json!({"datatype": datatype});
            if let Some(geomtype) = fresh.geomtype() {
                spatial["geomtype"] = json!(geomtype);
            }
            document.set(&["spatial"], spatial);
        }
        None => {
            document.remove(&["spatial"]);
        }
    }

    document.set(&["content_info", "type"], json!(fresh.kind.content_type()));
    let attributes: Vec<Value> = if fresh.bands().is_empty() {
        reconcile_fields(fresh.fields(), prior_fields)
            .iter()
            .map(FieldDescriptor::to_attribute)
            .collect()
    } else {
        reconcile_bands(fresh.bands(), prior_bands)
            .iter()
            .map(BandDescriptor::to_attribute)
            .collect()
    };
    document.set(&ATTRIBUTES, Value::Array(attributes));

    if let Some(extent) = &fresh.extent {
        document.set(
            &["identification", "extents", "spatial"],
            json!([{"bbox": extent.bbox, "crs": extent.crs}]),
        );
    }
}
