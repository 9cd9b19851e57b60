//! Caller-level association query.
//!
//! [`QueryRequest`] carries every option of an association search as a named,
//! typed field with an explicit default. It is deserializable so that route
//! handlers can build it straight from request parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::FieldMapping;

/// Default page size when the caller does not ask for one.
pub const DEFAULT_ROWS: u64 = 10;

/// An id constraint: a single id, or any of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdFilter {
    One(String),
    AnyOf(Vec<String>),
}

impl IdFilter {
    pub fn ids(&self) -> Vec<&str> {
        match self {
            IdFilter::One(id) => vec![id.as_str()],
            IdFilter::AnyOf(ids) => ids.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            IdFilter::One(_) => false,
            IdFilter::AnyOf(ids) => ids.is_empty(),
        }
    }
}

impl From<&str> for IdFilter {
    fn from(id: &str) -> Self {
        IdFilter::One(id.to_string())
    }
}

impl From<String> for IdFilter {
    fn from(id: String) -> Self {
        IdFilter::One(id)
    }
}

impl From<Vec<String>> for IdFilter {
    fn from(ids: Vec<String>) -> Self {
        IdFilter::AnyOf(ids)
    }
}

/// Requested page size.
///
/// On the wire (and in JSON requests) a negative number means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Rows {
    Limit(u64),
    /// Resolved by the compiler to the configured row ceiling.
    Unlimited,
}

impl Default for Rows {
    fn default() -> Self {
        Rows::Limit(DEFAULT_ROWS)
    }
}

impl From<i64> for Rows {
    fn from(n: i64) -> Self {
        if n < 0 {
            Rows::Unlimited
        } else {
            Rows::Limit(n as u64)
        }
    }
}

impl From<Rows> for i64 {
    fn from(r: Rows) -> Self {
        match r {
            Rows::Limit(n) => i64::try_from(n).unwrap_or(i64::MAX),
            Rows::Unlimited => -1,
        }
    }
}

/// Facet value limit; Solr's own `-1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum FacetLimit {
    Limit(u32),
    Unlimited,
}

impl FacetLimit {
    /// Solr wire value.
    pub fn wire(self) -> i64 {
        self.into()
    }
}

impl From<i64> for FacetLimit {
    fn from(n: i64) -> Self {
        if n < 0 {
            FacetLimit::Unlimited
        } else {
            FacetLimit::Limit(u32::try_from(n).unwrap_or(u32::MAX))
        }
    }
}

impl From<FacetLimit> for i64 {
    fn from(l: FacetLimit) -> Self {
        match l {
            FacetLimit::Limit(n) => i64::from(n),
            FacetLimit::Unlimited => -1,
        }
    }
}

/// A structured association query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryRequest {
    pub subject_category: Option<String>,
    /// Also selects the backend: see [`crate::backend::BackendTable`].
    pub object_category: Option<String>,
    pub subject: Option<IdFilter>,
    pub object: Option<IdFilter>,
    /// Matched against the subject taxon closure.
    pub subject_taxon: Option<String>,
    pub object_taxon: Option<String>,
    /// Matched against the relation closure, so sub-relations match too.
    pub relation: Option<String>,
    /// Evidence class, matched against the evidence closure; a leading `-` negates.
    pub evidence: Option<String>,
    pub exclude_automatic_assertions: bool,
    pub invert_subject_object: bool,
    /// Match the subject exactly instead of through its closure.
    pub subject_direct: bool,
    pub object_direct: bool,
    /// Slim classes; when non-empty each association carries `slim` instead of `object_closure`.
    pub slim: Vec<String>,
    pub rows: Rows,
    pub start: u64,
    /// Replaces the default select list.
    pub select_fields: Option<Vec<String>>,
    pub unselect_evidence: bool,
    pub facet: bool,
    /// Replaces the default facet fields.
    pub facet_fields: Option<Vec<String>>,
    /// Global facet limit; the configured default when `None`.
    pub facet_limit: Option<FacetLimit>,
    pub facet_field_limits: BTreeMap<String, FacetLimit>,
    pub facet_mincount: Option<u32>,
    pub facet_pivot_fields: Vec<String>,
    /// Pivot on (subject, object), overriding `facet_pivot_fields`.
    pub pivot_subject_object: bool,
    /// Passed through verbatim as `json.facet`.
    pub json_facet: Option<serde_json::Value>,
    /// Extra exact-match filters, keyed by canonical field name.
    pub extra_filters: BTreeMap<String, String>,
    /// Caller override layered on the backend's field mapping.
    pub field_mapping: Option<FieldMapping>,
    /// Rewrite subject ids to the closure member with this prefix.
    pub map_identifiers: Option<String>,
    /// Run a second facet query listing the distinct objects.
    pub fetch_objects: bool,
    pub use_compact_associations: bool,
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self {
            subject_category: None,
            object_category: None,
            subject: None,
            object: None,
            subject_taxon: None,
            object_taxon: None,
            relation: None,
            evidence: None,
            exclude_automatic_assertions: false,
            invert_subject_object: false,
            subject_direct: false,
            object_direct: false,
            slim: Vec::new(),
            rows: Rows::default(),
            start: 0,
            select_fields: None,
            unselect_evidence: false,
            facet: true,
            facet_fields: None,
            facet_limit: None,
            facet_field_limits: BTreeMap::new(),
            facet_mincount: None,
            facet_pivot_fields: Vec::new(),
            pivot_subject_object: false,
            json_facet: None,
            extra_filters: BTreeMap::new(),
            field_mapping: None,
            map_identifiers: None,
            fetch_objects: false,
            use_compact_associations: false,
        }
    }
}

impl QueryRequest {
    /// Associations whose subject is `id` (or one of its descendants).
    pub fn for_subject(id: impl Into<IdFilter>) -> Self {
        Self {
            subject: Some(id.into()),
            ..Default::default()
        }
    }

    /// Associations whose object is `id` (or one of its descendants).
    pub fn for_object(id: impl Into<IdFilter>) -> Self {
        Self {
            object: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_categories(
        mut self,
        subject_category: impl Into<String>,
        object_category: impl Into<String>,
    ) -> Self {
        self.subject_category = Some(subject_category.into());
        self.object_category = Some(object_category.into());
        self
    }

    pub fn with_rows(mut self, rows: Rows) -> Self {
        self.rows = rows;
        self
    }

    /// Apply subject/object inversion.
    ///
    /// Swaps ids, categories and taxa; `subject_direct`/`object_direct`
    /// and every other option keep their meaning.
    ///
    /// The returned request never has `invert_subject_object` set, so every
    /// consumer downstream of this call is agnostic to inversion.
    pub fn normalized(&self) -> QueryRequest {
        let mut q = self.clone();
        if q.invert_subject_object {
            std::mem::swap(&mut q.subject, &mut q.object);
            std::mem::swap(&mut q.subject_category, &mut q.object_category);
            std::mem::swap(&mut q.subject_taxon, &mut q.object_taxon);
            q.invert_subject_object = false;
        }
        q
    }
}
