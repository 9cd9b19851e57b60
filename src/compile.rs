//! Query compiler: [`QueryRequest`] to backend parameters.
//!
//! Compilation happens entirely in canonical field space; the active
//! [`FieldMapping`] is applied to every emitted field name as the last step,
//! and entries whose field is inapplicable for the backend are dropped.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::backend::{BackendTable, Endpoint};
use crate::config::GolrConfig;
use crate::error::GolrResult;
use crate::field;
use crate::query::{FacetLimit, IdFilter, QueryRequest, Rows};
use crate::schema::{FieldMapping, SchemaProfile, map_field};

/// Free-text query; all filtering happens in filter clauses.
pub const MATCH_ALL: &str = "*:*";

/// One filter query: `field` matches any of `values`, optionally negated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FilterClause {
    pub field: String,
    pub values: Vec<String>,
    pub negated: bool,
}

impl FilterClause {
    pub fn exact(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            values: vec![value.into()],
            negated: false,
        }
    }

    pub fn any_of<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }
}

/// Backend-ready query parameters. All field names are backend names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub endpoint: Endpoint,
    /// Mapping that produced the field names, needed to read rows back.
    #[serde(skip)]
    pub mapping: FieldMapping,
    pub q: String,
    pub filters: Vec<FilterClause>,
    pub fields: Vec<String>,
    pub facet: bool,
    pub facet_fields: Vec<String>,
    /// Backend facet field name to the canonical name it was requested as.
    pub facet_aliases: BTreeMap<String, String>,
    /// Backend pivot field name to its canonical name.
    pub pivot_aliases: BTreeMap<String, String>,
    pub facet_limit: FacetLimit,
    pub facet_field_limits: BTreeMap<String, FacetLimit>,
    pub facet_mincount: u32,
    pub facet_pivot: Vec<String>,
    pub rows: u64,
    pub start: u64,
    pub json_facet: Option<serde_json::Value>,
}

/// Compiles requests against a fixed backend table and limits.
#[derive(Debug, Clone)]
pub struct QueryCompiler {
    table: BackendTable,
    max_rows: u64,
    default_facet_limit: u32,
    default_facet_mincount: u32,
}

impl QueryCompiler {
    pub fn new(config: &GolrConfig) -> GolrResult<Self> {
        Ok(Self {
            table: BackendTable::from_config(config)?,
            max_rows: config.max_rows,
            default_facet_limit: config.default_facet_limit,
            default_facet_mincount: config.default_facet_mincount,
        })
    }

    pub fn table(&self) -> &BackendTable {
        &self.table
    }

    /// Row count sent for [`Rows::Unlimited`].
    pub fn max_rows(&self) -> u64 {
        self.max_rows
    }

    pub fn compile(&self, req: &QueryRequest) -> CompiledQuery {
        // The backend follows the object category as given by the caller.
        let endpoint = self.table.resolve(req.object_category.as_deref()).clone();
        let profile = endpoint.profile;
        let mapping = match &req.field_mapping {
            Some(overrides) => profile.field_mapping().overlay(overrides),
            None => profile.field_mapping(),
        };
        let q = req.normalized();

        let filters = canonical_filters(&q, &profile)
            .into_iter()
            .filter_map(|clause| map_clause(clause, &mapping))
            .collect::<Vec<_>>();

        let fields = map_fields(select_fields(&q), &mapping);

        let (facet_fields, facet_pivot) = if q.facet {
            let facet_fields = q.facet_fields.clone().unwrap_or_else(|| {
                vec![
                    field::SUBJECT_TAXON_LABEL.into(),
                    field::OBJECT_CLOSURE.into(),
                ]
            });
            let pivot = if q.pivot_subject_object {
                vec![field::SUBJECT.to_string(), field::OBJECT.to_string()]
            } else {
                q.facet_pivot_fields.clone()
            };
            (facet_fields, pivot)
        } else {
            (Vec::new(), Vec::new())
        };
        let facet_aliases = aliases(&facet_fields, &mapping);
        let pivot_aliases = aliases(&facet_pivot, &mapping);
        let facet_fields = map_fields(facet_fields, &mapping);
        let facet_pivot = map_fields(facet_pivot, &mapping);

        let facet_field_limits = q
            .facet_field_limits
            .iter()
            .filter_map(|(f, limit)| {
                mapped_name(f, &mapping).map(|name| (name, *limit))
            })
            .collect();

        let rows = match q.rows {
            Rows::Limit(n) => n,
            Rows::Unlimited => self.max_rows,
        };

        let compiled = CompiledQuery {
            endpoint,
            mapping,
            q: MATCH_ALL.to_string(),
            filters,
            fields,
            facet: q.facet,
            facet_fields,
            facet_aliases,
            pivot_aliases,
            facet_limit: q
                .facet_limit
                .unwrap_or(FacetLimit::Limit(self.default_facet_limit)),
            facet_field_limits,
            // Zero-count values are always suppressed.
            facet_mincount: q
                .facet_mincount
                .unwrap_or(self.default_facet_mincount)
                .max(1),
            facet_pivot,
            rows,
            start: q.start,
            json_facet: q.json_facet.clone(),
        };
        tracing::debug!(
            endpoint = %compiled.endpoint.name,
            profile = %profile,
            filters = compiled.filters.len(),
            rows = compiled.rows,
            "compiled association query"
        );
        compiled
    }

    /// Zero-row query whose only output is an unlimited facet on `facet_field`.
    ///
    /// Used for distinct-value listings: the facet keys are the distinct
    /// values of `facet_field` under the request's filters.
    pub fn compile_facet_listing(&self, req: &QueryRequest, facet_field: &str) -> CompiledQuery {
        let listing = QueryRequest {
            rows: Rows::Limit(0),
            start: 0,
            select_fields: Some(vec![facet_field.to_string()]),
            slim: Vec::new(),
            facet: true,
            facet_fields: Some(vec![facet_field.to_string()]),
            facet_limit: Some(FacetLimit::Unlimited),
            facet_field_limits: BTreeMap::from([(facet_field.to_string(), FacetLimit::Unlimited)]),
            facet_mincount: Some(1),
            facet_pivot_fields: Vec::new(),
            pivot_subject_object: false,
            json_facet: None,
            fetch_objects: false,
            ..req.clone()
        };
        self.compile(&listing)
    }
}

/// Filter clauses in canonical field space.
fn canonical_filters(q: &QueryRequest, profile: &SchemaProfile) -> Vec<FilterClause> {
    let mut filters = Vec::new();

    if let Some(doc_type) = profile.document_category() {
        filters.push(FilterClause::exact(field::DOCUMENT_CATEGORY, doc_type));
    }
    if let Some(c) = &q.subject_category {
        filters.push(FilterClause::exact(field::SUBJECT_CATEGORY, c));
    }
    if let Some(c) = &q.object_category {
        filters.push(FilterClause::exact(field::OBJECT_CATEGORY, c));
    }

    let subject_field = if q.subject_direct {
        field::SUBJECT
    } else {
        field::SUBJECT_CLOSURE
    };
    filters.extend(id_clause(subject_field, q.subject.as_ref(), profile));

    let object_field = if q.object_direct {
        field::OBJECT
    } else {
        field::OBJECT_CLOSURE
    };
    filters.extend(id_clause(object_field, q.object.as_ref(), profile));

    if let Some(t) = &q.subject_taxon {
        filters.push(FilterClause::exact(field::SUBJECT_TAXON_CLOSURE, t));
    }
    if let Some(t) = &q.object_taxon {
        filters.push(FilterClause::exact(field::OBJECT_TAXON_CLOSURE, t));
    }
    if let Some(r) = &q.relation {
        filters.push(FilterClause::exact(field::RELATION_CLOSURE, r));
    }
    if let Some(e) = &q.evidence {
        match e.strip_prefix('-') {
            Some(excluded) => filters
                .push(FilterClause::exact(field::EVIDENCE_OBJECT_CLOSURE, excluded).negate()),
            None => filters.push(FilterClause::exact(field::EVIDENCE_OBJECT_CLOSURE, e)),
        }
    }
    if q.exclude_automatic_assertions {
        filters.push(
            FilterClause::exact(
                field::EVIDENCE_OBJECT_CLOSURE,
                field::AUTOMATIC_ASSERTION_EVIDENCE,
            )
            .negate(),
        );
    }
    for (f, v) in &q.extra_filters {
        filters.push(FilterClause::exact(f, v));
    }
    filters
}

fn id_clause(
    canonical: &str,
    ids: Option<&IdFilter>,
    profile: &SchemaProfile,
) -> Option<FilterClause> {
    let ids = ids.filter(|ids| !ids.is_empty())?;
    Some(FilterClause::any_of(
        canonical,
        ids.ids().into_iter().map(|id| profile.rewrite_id(id)),
    ))
}

fn select_fields(q: &QueryRequest) -> Vec<String> {
    let mut fields: Vec<String> = match &q.select_fields {
        Some(fields) => fields.clone(),
        None => {
            let mut fields: Vec<String> = [
                field::ID,
                field::IS_DEFINED_BY,
                field::SOURCE,
                field::SUBJECT,
                field::SUBJECT_LABEL,
                field::SUBJECT_CLOSURE,
                field::SUBJECT_TAXON,
                field::SUBJECT_TAXON_LABEL,
                field::RELATION,
                field::RELATION_LABEL,
                field::OBJECT,
                field::OBJECT_LABEL,
            ]
            .iter()
            .map(|f| f.to_string())
            .collect();
            if !q.unselect_evidence {
                fields.push(field::EVIDENCE_OBJECT.into());
                fields.push(field::EVIDENCE_GRAPH.into());
            }
            fields
        }
    };
    if !q.slim.is_empty() {
        fields.push(field::OBJECT_CLOSURE.into());
    }
    fields
}

fn mapped_name(canonical: &str, mapping: &FieldMapping) -> Option<String> {
    let name = map_field(canonical, Some(mapping)).name();
    if name.is_none() {
        tracing::warn!(field = canonical, "field is not applicable to this backend; dropping it");
    }
    name.map(str::to_string)
}

/// Map and de-duplicate a field list, preserving first occurrence order.
fn map_fields(canonical: Vec<String>, mapping: &FieldMapping) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(canonical.len());
    for f in &canonical {
        if let Some(name) = mapped_name(f, mapping) {
            if !out.contains(&name) {
                out.push(name);
            }
        }
    }
    out
}

/// Backend name to canonical name for each mappable field, first wins.
fn aliases(canonical: &[String], mapping: &FieldMapping) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for name in canonical {
        if let Some(backend) = map_field(name, Some(mapping)).name() {
            out.entry(backend.to_string())
                .or_insert_with(|| name.clone());
        }
    }
    out
}

fn map_clause(clause: FilterClause, mapping: &FieldMapping) -> Option<FilterClause> {
    let field = mapped_name(&clause.field, mapping)?;
    Some(FilterClause { field, ..clause })
}
