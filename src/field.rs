//! Canonical field dictionary for Golr association documents.
//!
//! Every other module works in this canonical name space. Backend-specific
//! names only appear in [`crate::schema`].

pub const ID: &str = "id";

pub const SUBJECT: &str = "subject";
pub const SUBJECT_LABEL: &str = "subject_label";
pub const SUBJECT_CLOSURE: &str = "subject_closure";
pub const SUBJECT_CATEGORY: &str = "subject_category";
pub const SUBJECT_TAXON: &str = "subject_taxon";
pub const SUBJECT_TAXON_LABEL: &str = "subject_taxon_label";
pub const SUBJECT_TAXON_CLOSURE: &str = "subject_taxon_closure";

pub const RELATION: &str = "relation";
pub const RELATION_LABEL: &str = "relation_label";
pub const RELATION_CLOSURE: &str = "relation_closure";
pub const QUALIFIER: &str = "qualifier";

pub const OBJECT: &str = "object";
pub const OBJECT_LABEL: &str = "object_label";
pub const OBJECT_CLOSURE: &str = "object_closure";
pub const OBJECT_CATEGORY: &str = "object_category";
pub const OBJECT_TAXON: &str = "object_taxon";
pub const OBJECT_TAXON_LABEL: &str = "object_taxon_label";
pub const OBJECT_TAXON_CLOSURE: &str = "object_taxon_closure";

pub const EVIDENCE_OBJECT: &str = "evidence_object";
pub const EVIDENCE_OBJECT_CLOSURE: &str = "evidence_object_closure";
pub const EVIDENCE_GRAPH: &str = "evidence_graph";

/// Publications / references supporting the association.
pub const SOURCE: &str = "reference";
/// Provenance: the resource that asserted the association.
pub const IS_DEFINED_BY: &str = "is_defined_by";
pub const DOCUMENT_CATEGORY: &str = "document_category";

/// Evidence class for electronic (automatic) annotation, IEA.
pub const AUTOMATIC_ASSERTION_EVIDENCE: &str = "ECO:0000501";

/// `f` + `_label`.
pub fn label_field(f: &str) -> String {
    format!("{f}_label")
}

/// `f` + `_closure`.
pub fn closure_field(f: &str) -> String {
    format!("{f}_closure")
}

/// `f` + `_category`.
pub fn category_field(f: &str) -> String {
    format!("{f}_category")
}

/// All canonical field names, in dictionary order.
pub const ALL: &[&str] = &[
    ID,
    SUBJECT,
    SUBJECT_LABEL,
    SUBJECT_CLOSURE,
    SUBJECT_CATEGORY,
    SUBJECT_TAXON,
    SUBJECT_TAXON_LABEL,
    SUBJECT_TAXON_CLOSURE,
    RELATION,
    RELATION_LABEL,
    RELATION_CLOSURE,
    QUALIFIER,
    OBJECT,
    OBJECT_LABEL,
    OBJECT_CLOSURE,
    OBJECT_CATEGORY,
    OBJECT_TAXON,
    OBJECT_TAXON_LABEL,
    OBJECT_TAXON_CLOSURE,
    EVIDENCE_OBJECT,
    EVIDENCE_OBJECT_CLOSURE,
    EVIDENCE_GRAPH,
    SOURCE,
    IS_DEFINED_BY,
    DOCUMENT_CATEGORY,
];

/// Whether `name` is a canonical field name.
pub fn is_canonical(name: &str) -> bool {
    ALL.contains(&name)
}
