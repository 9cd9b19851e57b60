//! Result translator: raw Solr documents and facets to domain objects.
//!
//! Documents are read in canonical field space. Before translation each
//! document is passed through the active [`FieldMapping`] in reverse: a
//! canonical key whose backend key is present on the row receives that
//! value. Problems confined to one row become [`RowWarning`]s; the rest of
//! the batch is always translated.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RowWarning;
use crate::field;
use crate::schema::FieldMapping;

/// A Solr document.
pub type Doc = Map<String, Value>;

/// `field -> value -> count`.
pub type FacetCounts = BTreeMap<String, BTreeMap<String, u64>>;

/// Reference to an entity: subject, object, relation, taxon, publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxon: Option<Box<EntityRef>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl EntityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            taxon: None,
            categories: Vec::new(),
        }
    }
}

/// Node of an evidence graph (OBO graph JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lbl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Edge of an evidence graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub sub: String,
    pub pred: String,
    pub obj: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Decoded `evidence_graph` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceGraph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

/// A subject–relation–object association with evidence and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub subject: Option<EntityRef>,
    pub relation: Option<EntityRef>,
    pub object: Option<EntityRef>,
    #[serde(default)]
    pub publications: Vec<EntityRef>,
    #[serde(default)]
    pub provided_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_graph: Option<EvidenceGraph>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_closure: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slim: Option<Vec<String>>,
}

/// Objects of all rows sharing one `(subject, relation)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactAssociationGroup {
    pub subject: String,
    pub relation: Option<String>,
    pub objects: Vec<String>,
}

/// Output of [`translate_docs`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translated {
    pub associations: Vec<Association>,
    pub warnings: Vec<RowWarning>,
}

/// Output of [`translate_compact`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compacted {
    pub groups: Vec<CompactAssociationGroup>,
    pub warnings: Vec<RowWarning>,
}

/// One node of a Solr facet pivot tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetPivot {
    pub field: String,
    pub value: Value,
    pub count: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pivot: Vec<FacetPivot>,
}

// ---------------------------------------------------------------------------
// Field access helpers
// ---------------------------------------------------------------------------

fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First value of a possibly multi-valued field.
fn first_string(d: &Doc, key: &str) -> Option<String> {
    match d.get(key)? {
        Value::Array(items) => items.iter().find_map(scalar_string),
        v => scalar_string(v),
    }
}

/// All values of a field; a scalar becomes a one-element list.
fn string_list(d: &Doc, key: &str) -> Option<Vec<String>> {
    match d.get(key)? {
        Value::Array(items) => Some(items.iter().filter_map(scalar_string).collect()),
        Value::Null => None,
        v => scalar_string(v).map(|s| vec![s]),
    }
}

/// Copy backend-named values onto their canonical keys.
fn apply_read_mapping(d: &Doc, mapping: Option<&FieldMapping>) -> Doc {
    let mut doc = d.clone();
    if let Some(mapping) = mapping {
        for (canonical, backend) in mapping.iter() {
            let Some(backend) = backend else { continue };
            if backend == canonical {
                continue;
            }
            if let Some(v) = d.get(backend) {
                doc.insert(canonical.to_string(), v.clone());
            }
        }
    }
    doc
}

fn translate_obj(d: &Doc, f: &str) -> Option<EntityRef> {
    let id = first_string(d, f)?;
    Some(EntityRef {
        id,
        label: first_string(d, &field::label_field(f)),
        taxon: None,
        categories: string_list(d, &field::category_field(f)).unwrap_or_default(),
    })
}

fn translate_taxon(d: &Doc, f: &str) -> Option<Box<EntityRef>> {
    let id = first_string(d, f)?;
    Some(Box::new(EntityRef {
        id,
        label: first_string(d, &field::label_field(f)),
        taxon: None,
        categories: Vec::new(),
    }))
}

/// First closure member in the `prefix` id space, by closure order.
pub fn map_id(id: &str, prefix: &str, closure: &[String]) -> String {
    let wanted = format!("{prefix}:");
    let mut matches = closure.iter().filter(|c| c.starts_with(&wanted));
    match matches.next() {
        Some(first) => {
            let others = matches.count();
            if others > 0 {
                tracing::debug!(
                    id,
                    prefix,
                    chosen = %first,
                    others,
                    "several closure members match identifier prefix; using the first"
                );
            }
            first.clone()
        }
        None => id.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Translators
// ---------------------------------------------------------------------------

/// Translate one document. `Err` carries a warning message for a row that
/// yields no association; `Ok` may still carry a warning for a partly
/// decodable row.
fn translate_doc(
    raw: &Doc,
    mapping: Option<&FieldMapping>,
    map_identifiers: Option<&str>,
) -> Result<(Association, Option<String>), String> {
    let d = apply_read_mapping(raw, mapping);

    let mut subject = translate_obj(&d, field::SUBJECT);
    let mut object = translate_obj(&d, field::OBJECT);
    if subject.is_none() && object.is_none() {
        return Err("document has neither subject nor object".into());
    }

    if let (Some(prefix), Some(subject)) = (map_identifiers, subject.as_mut()) {
        match string_list(&d, field::SUBJECT_CLOSURE) {
            Some(closure) => subject.id = map_id(&subject.id, prefix, &closure),
            None => tracing::debug!(
                subject = %subject.id,
                "no subject closure on document; identifier left unmapped"
            ),
        }
    }
    if let Some(subject) = subject.as_mut() {
        subject.taxon = translate_taxon(&d, field::SUBJECT_TAXON);
    }
    if let Some(object) = object.as_mut() {
        object.taxon = translate_taxon(&d, field::OBJECT_TAXON);
    }

    let relation = translate_obj(&d, field::RELATION);
    let publications = string_list(&d, field::SOURCE)
        .unwrap_or_default()
        .into_iter()
        .map(EntityRef::new)
        .collect();

    let mut warning = None;
    let evidence_graph = match d.get(field::EVIDENCE_GRAPH) {
        None | Some(Value::Null) => None,
        Some(Value::String(encoded)) => match serde_json::from_str::<EvidenceGraph>(encoded) {
            Ok(g) => Some(g),
            Err(e) => {
                warning = Some(format!("undecodable evidence graph: {e}"));
                None
            }
        },
        Some(v) => match serde_json::from_value::<EvidenceGraph>(v.clone()) {
            Ok(g) => Some(g),
            Err(e) => {
                warning = Some(format!("undecodable evidence graph: {e}"));
                None
            }
        },
    };

    let assoc = Association {
        id: first_string(&d, field::ID),
        subject,
        relation,
        object,
        publications,
        provided_by: string_list(&d, field::IS_DEFINED_BY).unwrap_or_default(),
        qualifiers: string_list(&d, field::QUALIFIER).unwrap_or_default(),
        evidence: d.get(field::EVIDENCE_OBJECT).cloned(),
        evidence_graph,
        object_closure: string_list(&d, field::OBJECT_CLOSURE),
        slim: None,
    };
    Ok((assoc, warning))
}

/// Translate result rows into associations.
pub fn translate_docs(
    docs: &[Doc],
    mapping: Option<&FieldMapping>,
    map_identifiers: Option<&str>,
) -> Translated {
    let mut out = Translated::default();
    for (row, raw) in docs.iter().enumerate() {
        let doc_id = first_string(raw, field::ID);
        match translate_doc(raw, mapping, map_identifiers) {
            Ok((assoc, warning)) => {
                if let Some(message) = warning {
                    tracing::warn!(row, doc_id = ?doc_id, %message, "malformed document");
                    out.warnings.push(RowWarning::malformed(row, doc_id, message));
                }
                out.associations.push(assoc);
            }
            Err(message) => {
                tracing::warn!(row, doc_id = ?doc_id, %message, "skipping malformed document");
                out.warnings.push(RowWarning::malformed(row, doc_id, message));
            }
        }
    }
    out
}

/// Group rows by `(subject, relation)`, in first-encounter order.
///
/// Objects keep row order and row multiplicity. Rows without a subject or
/// object cannot be grouped; they are skipped with a [`RowWarning`].
pub fn translate_compact(docs: &[Doc], mapping: Option<&FieldMapping>) -> Compacted {
    let mut groups: Vec<CompactAssociationGroup> = Vec::new();
    let mut warnings = Vec::new();
    let mut index: HashMap<(String, Option<String>), usize> = HashMap::new();
    for (row, raw) in docs.iter().enumerate() {
        let d = apply_read_mapping(raw, mapping);
        let (Some(subject), Some(object)) = (
            first_string(&d, field::SUBJECT),
            first_string(&d, field::OBJECT),
        ) else {
            let doc_id = first_string(raw, field::ID);
            tracing::warn!(row, doc_id = ?doc_id, "document lacks subject or object; not grouped");
            warnings.push(RowWarning::malformed(
                row,
                doc_id,
                "document lacks subject or object",
            ));
            continue;
        };
        let relation = first_string(&d, field::RELATION);
        let key = (subject, relation);
        let slot = match index.get(&key) {
            Some(&i) => i,
            None => {
                groups.push(CompactAssociationGroup {
                    subject: key.0.clone(),
                    relation: key.1.clone(),
                    objects: Vec::new(),
                });
                index.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].objects.push(object);
    }
    Compacted { groups, warnings }
}

/// Pair a flat `[value, count, ...]` facet array into a map.
///
/// An odd trailing element has no count and is dropped with a warning.
/// Pairs whose count is not a non-negative integer are skipped. A repeated
/// value keeps its last count.
pub fn translate_facet_array(field_name: &str, array: &[Value]) -> BTreeMap<String, u64> {
    if array.len() % 2 != 0 {
        tracing::warn!(
            field = field_name,
            len = array.len(),
            "odd-length facet array; dropping trailing value"
        );
    }
    let mut counts = BTreeMap::new();
    for pair in array.chunks_exact(2) {
        let (Some(value), Some(count)) = (scalar_string(&pair[0]), pair[1].as_u64()) else {
            tracing::warn!(field = field_name, pair = ?pair, "unreadable facet pair");
            continue;
        };
        counts.insert(value, count);
    }
    counts
}

/// Translate every facet field of a response.
pub fn translate_facets(facet_fields: &BTreeMap<String, Vec<Value>>) -> FacetCounts {
    facet_fields
        .iter()
        .map(|(f, array)| (f.clone(), translate_facet_array(f, array)))
        .collect()
}

fn alias<'a>(name: &'a str, aliases: &'a BTreeMap<String, String>) -> &'a str {
    aliases.get(name).map(String::as_str).unwrap_or(name)
}

fn rename_pivot(node: &mut FacetPivot, aliases: &BTreeMap<String, String>) {
    node.field = alias(&node.field, aliases).to_string();
    for child in &mut node.pivot {
        rename_pivot(child, aliases);
    }
}

/// Decode pivot trees; entries that are not pivot nodes are skipped.
///
/// `aliases` maps backend field names back to canonical ones, both in the
/// comma-joined keys and in every node's `field`.
pub fn translate_pivots(
    facet_pivot: &BTreeMap<String, Vec<Value>>,
    aliases: &BTreeMap<String, String>,
) -> BTreeMap<String, Vec<FacetPivot>> {
    facet_pivot
        .iter()
        .map(|(fields, entries)| {
            let nodes = entries
                .iter()
                .filter_map(|e| match serde_json::from_value::<FacetPivot>(e.clone()) {
                    Ok(mut node) => {
                        rename_pivot(&mut node, aliases);
                        Some(node)
                    }
                    Err(err) => {
                        tracing::warn!(pivot = %fields, error = %err, "unreadable pivot entry");
                        None
                    }
                })
                .collect();
            let key = fields
                .split(',')
                .map(|f| alias(f, aliases))
                .collect::<Vec<_>>()
                .join(",");
            (key, nodes)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{GoClosure, SchemaProfile};
    use proptest::prelude::*;
    use serde_json::json;

    fn doc(v: Value) -> Doc {
        v.as_object().unwrap().clone()
    }

    fn full_row() -> Doc {
        doc(json!({
            "id": "assoc-1",
            "subject": "HGNC:11025",
            "subject_label": "SHH",
            "subject_category": ["gene"],
            "subject_taxon": "NCBITaxon:9606",
            "subject_taxon_label": "Homo sapiens",
            "subject_closure": ["HGNC:11025", "SO:0000704", "NCBIGene:6469"],
            "relation": "RO:0002200",
            "relation_label": "has phenotype",
            "object": "HP:0000238",
            "object_label": "Hydrocephalus",
            "object_closure": ["HP:0000238", "HP:0000707", "HP:0000118"],
            "reference": ["PMID:1", "PMID:2"],
            "is_defined_by": ["SRC:clinvar", "SRC:omim"],
            "evidence_object": ["ECO:0000220"],
            "evidence_graph": "{\"nodes\":[{\"id\":\"HGNC:11025\",\"lbl\":\"SHH\"}],\"edges\":[{\"sub\":\"HGNC:11025\",\"pred\":\"RO:0002200\",\"obj\":\"HP:0000238\"}]}"
        }))
    }

    #[test]
    fn translates_full_row() {
        let t = translate_docs(&[full_row()], None, None);
        assert!(t.warnings.is_empty());
        let a = &t.associations[0];
        assert_eq!(a.id.as_deref(), Some("assoc-1"));
        let subject = a.subject.as_ref().unwrap();
        assert_eq!(subject.id, "HGNC:11025");
        assert_eq!(subject.label.as_deref(), Some("SHH"));
        assert_eq!(subject.categories, vec!["gene"]);
        assert_eq!(subject.taxon.as_ref().unwrap().label.as_deref(), Some("Homo sapiens"));
        assert_eq!(a.relation.as_ref().unwrap().label.as_deref(), Some("has phenotype"));
        assert_eq!(a.object.as_ref().unwrap().id, "HP:0000238");
        assert_eq!(a.publications, vec![EntityRef::new("PMID:1"), EntityRef::new("PMID:2")]);
        assert_eq!(a.provided_by, vec!["SRC:clinvar", "SRC:omim"]);
        assert_eq!(a.evidence, Some(json!(["ECO:0000220"])));
        let graph = a.evidence_graph.as_ref().unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.edges[0].pred, "RO:0002200");
        assert_eq!(a.object_closure.as_ref().unwrap().len(), 3);
        assert!(a.slim.is_none());
    }

    #[test]
    fn scalar_provenance_becomes_list() {
        let d = doc(json!({"subject": "A", "object": "B", "is_defined_by": "SRC:1"}));
        let t = translate_docs(&[d], None, None);
        assert_eq!(t.associations[0].provided_by, vec!["SRC:1"]);
    }

    #[test]
    fn missing_relation_is_allowed() {
        let d = doc(json!({"subject": "A", "object": "B"}));
        let t = translate_docs(&[d], None, None);
        assert!(t.associations[0].relation.is_none());
        assert!(t.warnings.is_empty());
    }

    #[test]
    fn bad_evidence_graph_is_row_warning_only() {
        let mut bad = full_row();
        bad.insert("evidence_graph".into(), json!("{not json"));
        let t = translate_docs(&[bad, full_row()], None, None);
        assert_eq!(t.associations.len(), 2);
        assert!(t.associations[0].evidence_graph.is_none());
        assert!(t.associations[1].evidence_graph.is_some());
        assert_eq!(t.warnings.len(), 1);
        assert_eq!(t.warnings[0].row, 0);
        assert_eq!(t.warnings[0].doc_id.as_deref(), Some("assoc-1"));
    }

    #[test]
    fn row_without_subject_or_object_is_skipped() {
        let t = translate_docs(&[doc(json!({"id": "x"})), full_row()], None, None);
        assert_eq!(t.associations.len(), 1);
        assert_eq!(t.warnings.len(), 1);
    }

    #[test]
    fn identifier_mapping_uses_first_prefix_match() {
        let t = translate_docs(&[full_row()], None, Some("NCBIGene"));
        assert_eq!(t.associations[0].subject.as_ref().unwrap().id, "NCBIGene:6469");

        let t = translate_docs(&[full_row()], None, Some("ENSEMBL"));
        assert_eq!(t.associations[0].subject.as_ref().unwrap().id, "HGNC:11025");
    }

    #[test]
    fn map_id_is_deterministic_on_ambiguity() {
        let closure = vec!["X:1".to_string(), "P:2".to_string(), "P:3".to_string()];
        assert_eq!(map_id("X:1", "P", &closure), "P:2");
        // The prefix must be followed by a colon.
        assert_eq!(map_id("X:1", "X:", &closure), "X:1");
    }

    #[test]
    fn go_rows_read_back_through_mapping() {
        let mapping = SchemaProfile::GoAnnotation {
            closure: GoClosure::Regulates,
        }
        .field_mapping();
        let d = doc(json!({
            "id": "go-1",
            "bioentity": "MGI:MGI:97490",
            "bioentity_label": "Pax6",
            "taxon": "NCBITaxon:10090",
            "taxon_label": "Mus musculus",
            "qualifier": ["enables"],
            "annotation_class": "GO:0003700",
            "annotation_class_label": "DNA-binding transcription factor activity",
            "regulates_closure": ["GO:0003700", "GO:0003674"],
            "assigned_by": "MGI"
        }));
        let t = translate_docs(&[d], Some(&mapping), None);
        let a = &t.associations[0];
        assert_eq!(a.subject.as_ref().unwrap().id, "MGI:MGI:97490");
        assert_eq!(a.subject.as_ref().unwrap().label.as_deref(), Some("Pax6"));
        assert_eq!(a.subject.as_ref().unwrap().taxon.as_ref().unwrap().id, "NCBITaxon:10090");
        assert_eq!(a.relation.as_ref().unwrap().id, "enables");
        assert_eq!(a.object.as_ref().unwrap().id, "GO:0003700");
        assert_eq!(a.object_closure.as_ref().unwrap(), &vec!["GO:0003700", "GO:0003674"]);
        assert_eq!(a.provided_by, vec!["MGI"]);
    }

    #[test]
    fn compact_groups_preserve_order_and_multiplicity() {
        let rows: Vec<Doc> = [
            json!({"subject": "A", "relation": "R", "object": "O1"}),
            json!({"subject": "B", "relation": "R", "object": "O2"}),
            json!({"subject": "A", "relation": "R", "object": "O3"}),
            json!({"subject": "A", "object": "O4"}),
            json!({"subject": "A", "relation": "R", "object": "O1"}),
        ]
        .into_iter()
        .map(doc)
        .collect();
        let Compacted { groups, warnings } = translate_compact(&rows, None);
        assert!(warnings.is_empty());
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].subject, "A");
        assert_eq!(groups[0].relation.as_deref(), Some("R"));
        assert_eq!(groups[0].objects, vec!["O1", "O3", "O1"]);
        assert_eq!(groups[1].subject, "B");
        assert_eq!(groups[2].relation, None);
        assert_eq!(groups[2].objects, vec!["O4"]);
    }

    #[test]
    fn odd_facet_array_drops_trailing_value() {
        let counts = translate_facet_array("object", &[json!("HP:1"), json!(3), json!("HP:2")]);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["HP:1"], 3);
    }

    #[test]
    fn repeated_facet_value_keeps_last_count() {
        let counts = translate_facet_array(
            "object",
            &[json!("HP:1"), json!(3), json!("HP:1"), json!(7)],
        );
        assert_eq!(counts["HP:1"], 7);
    }

    #[test]
    fn pivots_decode_nested_trees() {
        let pivots = BTreeMap::from([(
            "subject,object".to_string(),
            vec![json!({
                "field": "subject", "value": "G:1", "count": 2,
                "pivot": [{"field": "object", "value": "HP:1", "count": 2}]
            })],
        )]);
        let decoded = translate_pivots(&pivots, &BTreeMap::new());
        let root = &decoded["subject,object"][0];
        assert_eq!(root.count, 2);
        assert_eq!(root.pivot[0].value, json!("HP:1"));
    }

    #[test]
    fn pivots_are_renamed_to_canonical_fields() {
        let pivots = BTreeMap::from([(
            "bioentity,annotation_class".to_string(),
            vec![json!({
                "field": "bioentity", "value": "MGI:MGI:97490", "count": 1,
                "pivot": [{"field": "annotation_class", "value": "GO:0003700", "count": 1}]
            })],
        )]);
        let aliases = BTreeMap::from([
            ("bioentity".to_string(), "subject".to_string()),
            ("annotation_class".to_string(), "object".to_string()),
        ]);
        let decoded = translate_pivots(&pivots, &aliases);
        let root = &decoded["subject,object"][0];
        assert_eq!(root.field, "subject");
        assert_eq!(root.pivot[0].field, "object");
    }

    #[test]
    fn compact_reports_ungroupable_rows() {
        let rows: Vec<Doc> = [
            json!({"id": "x", "subject": "A"}),
            json!({"subject": "A", "relation": "R", "object": "O1"}),
        ]
        .into_iter()
        .map(doc)
        .collect();
        let out = translate_compact(&rows, None);
        assert_eq!(out.groups.len(), 1);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].row, 0);
        assert_eq!(out.warnings[0].doc_id.as_deref(), Some("x"));
    }

    proptest! {
        #[test]
        fn facet_pairs_match_even_elements(
            pairs in proptest::collection::btree_map("[A-Z]{2}:[0-9]{1,6}", 0u64..10_000, 0..40)
        ) {
            let array: Vec<Value> = pairs
                .iter()
                .flat_map(|(k, c)| [json!(k), json!(c)])
                .collect();
            let counts = translate_facet_array("f", &array);
            prop_assert_eq!(counts.len(), array.len() / 2);
            prop_assert_eq!(counts, pairs);
        }

        #[test]
        fn compact_grouping_keeps_rows_together(
            objects in proptest::collection::vec("[A-Z]{2}:[0-9]{1,4}", 1..20)
        ) {
            let rows: Vec<Doc> = objects
                .iter()
                .map(|o| doc(json!({"subject": "S", "relation": "R", "object": o})))
                .collect();
            let groups = translate_compact(&rows, None).groups;
            prop_assert_eq!(groups.len(), 1);
            prop_assert_eq!(&groups[0].objects, &objects);
        }
    }
}
