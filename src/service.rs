//! Association service: the query operations exposed to route handlers.
//!
//! Each operation compiles a [`QueryRequest`], executes it on the injected
//! [`SearchBackend`] and translates the result. Operations share no mutable
//! state; an [`AssociationService`] can serve any number of threads at once.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::backend::{GolrClient, SearchBackend};
use crate::compile::{CompiledQuery, QueryCompiler};
use crate::config::GolrConfig;
use crate::error::{GolrResult, RowWarning};
use crate::field;
use crate::query::{QueryRequest, Rows};
use crate::translate::{
    self, Association, CompactAssociationGroup, FacetCounts, FacetPivot,
};

/// Payload of [`AssociationService::search_associations`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub num_found: u64,
    pub start: u64,
    pub rows: u64,
    pub associations: Vec<Association>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compact_associations: Option<Vec<CompactAssociationGroup>>,
    /// Keyed by canonical field name.
    pub facet_counts: FacetCounts,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub facet_pivot: BTreeMap<String, Vec<FacetPivot>>,
    /// Distinct objects, from the second query when `fetch_objects` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objects: Option<Vec<String>>,
    /// Raw `facets` section, when a `json.facet` was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_facets: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RowWarning>,
}

/// Count of associations falling under one closure bin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosureBin {
    pub id: String,
    pub count: u64,
}

/// Query operations over one backend.
#[derive(Debug, Clone)]
pub struct AssociationService<B> {
    compiler: QueryCompiler,
    backend: B,
}

impl AssociationService<GolrClient> {
    /// Service talking HTTP to the configured endpoints.
    pub fn connect(config: &GolrConfig) -> GolrResult<Self> {
        Self::new(config, GolrClient::new(config))
    }
}

impl<B: SearchBackend> AssociationService<B> {
    pub fn new(config: &GolrConfig, backend: B) -> GolrResult<Self> {
        Ok(Self {
            compiler: QueryCompiler::new(config)?,
            backend,
        })
    }

    pub fn compiler(&self) -> &QueryCompiler {
        &self.compiler
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run an association search.
    ///
    /// With `fetch_objects` set, a second facet-only query lists the distinct
    /// objects under the same filters. With `slim` set, associations carry
    /// `slim` instead of `object_closure` and the object listing is restricted
    /// to the slim. Compact groups carry no closure, so `slim` only filters
    /// their object listing.
    pub fn search_associations(&self, req: &QueryRequest) -> GolrResult<SearchResults> {
        let compiled = self.compiler.compile(req);
        let raw = self.backend.execute(&compiled)?;

        let (associations, compact_associations, warnings) = if req.use_compact_associations {
            if !req.slim.is_empty() {
                tracing::warn!(
                    slim = req.slim.len(),
                    "slim does not apply to compact associations; ignoring it"
                );
            }
            let c = translate::translate_compact(&raw.docs, Some(&compiled.mapping));
            (Vec::new(), Some(c.groups), c.warnings)
        } else {
            let t = translate::translate_docs(
                &raw.docs,
                Some(&compiled.mapping),
                req.map_identifiers.as_deref(),
            );
            (t.associations, None, t.warnings)
        };

        let associations = if req.slim.is_empty() {
            associations
        } else {
            map_to_slim(associations, &req.slim)
        };

        let objects = if req.fetch_objects {
            let objects = self.fetch_distinct_objects(req)?;
            Some(if req.slim.is_empty() {
                objects
            } else {
                filter_to_slim(&objects, &req.slim)
            })
        } else {
            None
        };

        let json_facets = req
            .json_facet
            .as_ref()
            .and_then(|_| raw.raw.get("facets").cloned());

        tracing::info!(
            endpoint = %compiled.endpoint.name,
            num_found = raw.num_found,
            returned = raw.docs.len(),
            warnings = warnings.len(),
            "association search"
        );

        Ok(SearchResults {
            num_found: raw.num_found,
            start: compiled.start,
            rows: compiled.rows,
            associations,
            compact_associations,
            facet_counts: canonical_facets(&compiled, &raw.facet_fields),
            facet_pivot: translate::translate_pivots(&raw.facet_pivot, &compiled.pivot_aliases),
            objects,
            json_facets,
            warnings,
        })
    }

    /// Distinct values of `field_name` among matching associations.
    ///
    /// Returned in sorted order, without counts.
    pub fn select_distinct(&self, field_name: &str, req: &QueryRequest) -> GolrResult<Vec<String>> {
        Ok(self
            .facet_listing(field_name, req)?
            .into_keys()
            .collect())
    }

    /// Distinct subjects among matching associations.
    pub fn select_distinct_subjects(&self, req: &QueryRequest) -> GolrResult<Vec<String>> {
        self.select_distinct(field::SUBJECT, req)
    }

    /// Distinct objects among matching associations, as a separate
    /// zero-row facet query.
    pub fn fetch_distinct_objects(&self, req: &QueryRequest) -> GolrResult<Vec<String>> {
        self.select_distinct(field::OBJECT, req)
    }

    /// Objects associated with `subject` (through its closure).
    pub fn get_objects_for_subject(
        &self,
        subject: &str,
        object_category: Option<&str>,
        relation: Option<&str>,
    ) -> GolrResult<Vec<String>> {
        let req = QueryRequest {
            object_category: object_category.map(str::to_string),
            relation: relation.map(str::to_string),
            ..QueryRequest::for_subject(subject)
        };
        self.fetch_distinct_objects(&req)
    }

    /// Subjects associated with `object` (through its closure).
    pub fn get_subjects_for_object(
        &self,
        object: &str,
        subject_category: Option<&str>,
        relation: Option<&str>,
    ) -> GolrResult<Vec<String>> {
        let req = QueryRequest {
            subject_category: subject_category.map(str::to_string),
            relation: relation.map(str::to_string),
            ..QueryRequest::for_object(object)
        };
        self.select_distinct_subjects(&req)
    }

    /// Information content of every object value under the request's filters.
    ///
    /// See [`information_content`].
    pub fn calculate_information_content(
        &self,
        req: &QueryRequest,
    ) -> GolrResult<BTreeMap<String, f64>> {
        let counts = self.facet_listing(field::OBJECT, req)?;
        Ok(information_content(&counts))
    }

    /// Number of matching associations whose object closure contains each bin.
    ///
    /// Bins are reported in the order given; a bin with no match counts 0.
    pub fn closure_bins(&self, req: &QueryRequest, bins: &[String]) -> GolrResult<Vec<ClosureBin>> {
        let counts = self.facet_listing(field::OBJECT_CLOSURE, req)?;
        Ok(bins
            .iter()
            .map(|bin| ClosureBin {
                id: bin.clone(),
                count: counts.get(bin).copied().unwrap_or(0),
            })
            .collect())
    }

    /// Fetch one association by document id from the default endpoint.
    pub fn get_association(&self, id: &str) -> GolrResult<Option<Association>> {
        let req = QueryRequest {
            extra_filters: BTreeMap::from([(field::ID.to_string(), id.to_string())]),
            rows: Rows::Limit(1),
            facet: false,
            ..Default::default()
        };
        let results = self.search_associations(&req)?;
        Ok(results.associations.into_iter().next())
    }

    /// Counts of an unlimited single-field facet, with zero rows.
    fn facet_listing(&self, field_name: &str, req: &QueryRequest) -> GolrResult<BTreeMap<String, u64>> {
        let compiled = self.compiler.compile_facet_listing(req, field_name);
        let Some(backend_field) = compiled.facet_fields.first().cloned() else {
            tracing::warn!(
                field = field_name,
                endpoint = %compiled.endpoint.name,
                "field is not applicable to this backend; nothing to list"
            );
            return Ok(BTreeMap::new());
        };
        let raw = self.backend.execute(&compiled)?;
        let counts = raw
            .facet_fields
            .get(&backend_field)
            .map(|array| translate::translate_facet_array(&backend_field, array))
            .unwrap_or_default();
        tracing::debug!(field = field_name, distinct = counts.len(), "facet listing");
        Ok(counts)
    }
}

/// Facet counts re-keyed by the canonical names they were requested under.
fn canonical_facets(
    compiled: &CompiledQuery,
    facet_fields: &BTreeMap<String, Vec<Value>>,
) -> FacetCounts {
    translate::translate_facets(facet_fields)
        .into_iter()
        .map(|(backend, counts)| {
            let name = compiled
                .facet_aliases
                .get(&backend)
                .cloned()
                .unwrap_or(backend);
            (name, counts)
        })
        .collect()
}

/// `values` restricted to members of `slim`, keeping `values` order.
pub fn filter_to_slim(values: &[String], slim: &[String]) -> Vec<String> {
    let slim: HashSet<&str> = slim.iter().map(String::as_str).collect();
    values
        .iter()
        .filter(|v| slim.contains(v.as_str()))
        .cloned()
        .collect()
}

/// Replace each association's `object_closure` with its intersection with `slim`.
pub fn map_to_slim(associations: Vec<Association>, slim: &[String]) -> Vec<Association> {
    associations
        .into_iter()
        .map(|mut a| {
            let closure = a.object_closure.take().unwrap_or_default();
            a.slim = Some(filter_to_slim(&closure, slim));
            a
        })
        .collect()
}

/// `IC(v) = -log2(count(v) / population)` for every value with a positive count.
///
/// The population is the largest observed count: the most annotated value
/// stands in for the whole population, and has IC 0.
pub fn information_content(counts: &BTreeMap<String, u64>) -> BTreeMap<String, f64> {
    let Some(population) = counts.values().copied().max().filter(|&p| p > 0) else {
        return BTreeMap::new();
    };
    counts
        .iter()
        .filter(|&(_, &count)| count > 0)
        .map(|(value, &count)| (value.clone(), (population as f64 / count as f64).log2()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assoc_with_closure(closure: &[&str]) -> Association {
        Association {
            id: None,
            subject: Some(crate::translate::EntityRef::new("S")),
            relation: None,
            object: Some(crate::translate::EntityRef::new("O")),
            publications: Vec::new(),
            provided_by: Vec::new(),
            qualifiers: Vec::new(),
            evidence: None,
            evidence_graph: None,
            object_closure: Some(closure.iter().map(|s| s.to_string()).collect()),
            slim: None,
        }
    }

    #[test]
    fn slim_replaces_closure() {
        let slim = vec!["HP:0000118".to_string(), "HP:0000707".to_string()];
        let out = map_to_slim(
            vec![assoc_with_closure(&["HP:0000238", "HP:0000707", "HP:0000118"])],
            &slim,
        );
        assert_eq!(
            out[0].slim.as_deref(),
            Some(&["HP:0000707".to_string(), "HP:0000118".to_string()][..])
        );
        assert!(out[0].object_closure.is_none());
    }

    #[test]
    fn information_content_of_max_is_zero() {
        let counts = BTreeMap::from([
            ("A".to_string(), 8),
            ("B".to_string(), 2),
            ("C".to_string(), 1),
        ]);
        let ic = information_content(&counts);
        assert_eq!(ic["A"], 0.0);
        assert!((ic["B"] - 2.0).abs() < 1e-12);
        assert!((ic["C"] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn information_content_of_empty_counts() {
        assert!(information_content(&BTreeMap::new()).is_empty());
    }

    proptest! {
        #[test]
        fn slim_is_ordered_intersection(
            closure in proptest::collection::vec("[A-C]:[0-9]", 0..12),
            slim in proptest::collection::vec("[A-C]:[0-9]", 0..6),
        ) {
            let refs: Vec<&str> = closure.iter().map(String::as_str).collect();
            let out = map_to_slim(vec![assoc_with_closure(&refs)], &slim);
            let expected: Vec<String> = closure.iter().filter(|c| slim.contains(c)).cloned().collect();
            prop_assert_eq!(out[0].slim.clone(), Some(expected));
            prop_assert!(out[0].object_closure.is_none());
        }

        #[test]
        fn rarer_values_have_higher_ic(c1 in 1u64..1000, delta in 1u64..1000) {
            let c2 = c1 + delta;
            let counts = BTreeMap::from([
                ("rare".to_string(), c1),
                ("common".to_string(), c2),
            ]);
            let ic = information_content(&counts);
            prop_assert!(ic["rare"] > ic["common"]);
            prop_assert_eq!(ic["common"], 0.0);
        }
    }
}
