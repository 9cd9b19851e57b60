//! Schema field mapper: canonical field names to backend field names.
//!
//! A [`FieldMapping`] is a substitution table. Names that are not keys pass
//! through unchanged; keys mapped to `None` are inapplicable for the backend
//! and every filter, facet or select entry using them is dropped.
//!
//! A [`SchemaProfile`] bundles a mapping with the rest of a backend's dialect
//! knowledge: the fixed document-type filter and identifier rewrites.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field;

/// Outcome of mapping one canonical field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapped<'a> {
    /// Not in the table; the canonical name is also the backend name.
    Keep(&'a str),
    /// Renamed for this backend.
    Rename(&'a str),
    /// Inapplicable for this backend.
    Drop,
}

impl<'a> Mapped<'a> {
    /// Backend field name, or `None` when the field must be dropped.
    pub fn name(self) -> Option<&'a str> {
        match self {
            Mapped::Keep(n) | Mapped::Rename(n) => Some(n),
            Mapped::Drop => None,
        }
    }
}

/// Canonical-to-backend field substitution table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: BTreeMap<String, Option<String>>,
}

impl FieldMapping {
    /// The empty (identity) table.
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        K: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Rename `canonical` to `target`.
    pub fn rename(mut self, canonical: &str, target: &str) -> Self {
        self.entries
            .insert(canonical.to_string(), Some(target.to_string()));
        self
    }

    /// Mark `canonical` as inapplicable.
    pub fn drop_field(mut self, canonical: &str) -> Self {
        self.entries.insert(canonical.to_string(), None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, canonical: &str) -> Option<&Option<String>> {
        self.entries.get(canonical)
    }

    /// Iterate `(canonical, backend)` entries; `None` backend means dropped.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Layer `overrides` on top of this table.
    ///
    /// Override entries whose key is not a canonical field name are ignored.
    pub fn overlay(&self, overrides: &FieldMapping) -> FieldMapping {
        let mut merged = self.clone();
        for (k, v) in &overrides.entries {
            if !field::is_canonical(k) {
                tracing::debug!(field = %k, "ignoring field mapping override for unknown field");
                continue;
            }
            merged.entries.insert(k.clone(), v.clone());
        }
        merged
    }
}

/// Map a canonical field name through an optional table.
pub fn map_field<'a>(name: &'a str, mapping: Option<&'a FieldMapping>) -> Mapped<'a> {
    let Some(mapping) = mapping else {
        return Mapped::Keep(name);
    };
    match mapping.entries.get(name) {
        None => Mapped::Keep(name),
        Some(Some(target)) => Mapped::Rename(target),
        Some(None) => Mapped::Drop,
    }
}

/// Which closure the GO annotation index exposes as the object closure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoClosure {
    /// `regulates_closure`: is_a, part_of and regulates (acts upstream of or within).
    #[default]
    Regulates,
    /// `isa_partof_closure`: is_a and part_of only.
    IsaPartof,
}

impl GoClosure {
    pub fn field_name(self) -> &'static str {
        match self {
            GoClosure::Regulates => "regulates_closure",
            GoClosure::IsaPartof => "isa_partof_closure",
        }
    }
}

/// A backend schema dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "profile", rename_all = "kebab-case")]
pub enum SchemaProfile {
    /// Canonical Golr association schema; identity mapping.
    Golr,
    /// GO annotation index (bioentity / annotation_class naming).
    GoAnnotation { closure: GoClosure },
}

/// Identifier prefix stored doubled in the GO annotation index.
const DOUBLED_PREFIX: &str = "MGI:";

impl SchemaProfile {
    pub fn name(&self) -> &'static str {
        match self {
            SchemaProfile::Golr => "golr",
            SchemaProfile::GoAnnotation { .. } => "go-annotation",
        }
    }

    /// The field table for this dialect.
    pub fn field_mapping(&self) -> FieldMapping {
        match self {
            SchemaProfile::Golr => FieldMapping::identity(),
            SchemaProfile::GoAnnotation { closure } => FieldMapping::identity()
                .rename(field::SUBJECT, "bioentity")
                // The annotation index has a single field for id and closure.
                .rename(field::SUBJECT_CLOSURE, "bioentity")
                .drop_field(field::SUBJECT_CATEGORY)
                .rename(field::SUBJECT_LABEL, "bioentity_label")
                .rename(field::SUBJECT_TAXON, "taxon")
                .rename(field::SUBJECT_TAXON_LABEL, "taxon_label")
                .rename(field::SUBJECT_TAXON_CLOSURE, "taxon_closure")
                .rename(field::RELATION, "qualifier")
                .rename(field::OBJECT, "annotation_class")
                .rename(field::OBJECT_CLOSURE, closure.field_name())
                .rename(field::OBJECT_LABEL, "annotation_class_label")
                .rename(field::OBJECT_TAXON, "object_taxon")
                .rename(field::OBJECT_TAXON_LABEL, "object_taxon_label")
                .rename(field::OBJECT_TAXON_CLOSURE, "object_taxon_closure")
                .drop_field(field::OBJECT_CATEGORY)
                .rename(field::EVIDENCE_OBJECT_CLOSURE, "evidence_subset_closure")
                .rename(field::IS_DEFINED_BY, "assigned_by"),
        }
    }

    /// Fixed `document_category` filter value, if the index mixes document types.
    pub fn document_category(&self) -> Option<&'static str> {
        match self {
            SchemaProfile::Golr => None,
            SchemaProfile::GoAnnotation { .. } => Some("annotation"),
        }
    }

    /// Rewrite an entity id into the form the index stores it under.
    pub fn rewrite_id(&self, id: &str) -> String {
        match self {
            SchemaProfile::GoAnnotation { .. } if id.starts_with(DOUBLED_PREFIX) => {
                format!("{DOUBLED_PREFIX}{id}")
            }
            _ => id.to_string(),
        }
    }
}

impl std::fmt::Display for SchemaProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaProfile::Golr => write!(f, "golr"),
            SchemaProfile::GoAnnotation { closure } => {
                write!(f, "go-annotation({})", closure.field_name())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn go() -> SchemaProfile {
        SchemaProfile::GoAnnotation {
            closure: GoClosure::Regulates,
        }
    }

    #[test]
    fn absent_mapping_is_identity() {
        assert_eq!(map_field(field::SUBJECT, None), Mapped::Keep("subject"));
    }

    #[test]
    fn go_profile_renames_and_drops() {
        let m = go().field_mapping();
        assert_eq!(map_field(field::SUBJECT, Some(&m)), Mapped::Rename("bioentity"));
        assert_eq!(
            map_field(field::SUBJECT_CLOSURE, Some(&m)),
            Mapped::Rename("bioentity")
        );
        assert_eq!(map_field(field::SUBJECT_CATEGORY, Some(&m)), Mapped::Drop);
        assert_eq!(map_field(field::OBJECT_CATEGORY, Some(&m)), Mapped::Drop);
        assert_eq!(
            map_field(field::OBJECT_CLOSURE, Some(&m)),
            Mapped::Rename("regulates_closure")
        );
        // Not in the table.
        assert_eq!(map_field(field::ID, Some(&m)), Mapped::Keep("id"));
    }

    #[test]
    fn isa_partof_closure_selectable() {
        let m = SchemaProfile::GoAnnotation {
            closure: GoClosure::IsaPartof,
        }
        .field_mapping();
        assert_eq!(
            map_field(field::OBJECT_CLOSURE, Some(&m)).name(),
            Some("isa_partof_closure")
        );
    }

    #[test]
    fn overlay_ignores_unknown_canonical_names() {
        let base = go().field_mapping();
        let overrides = FieldMapping::identity()
            .rename("not_a_field", "whatever")
            .rename(field::SUBJECT_LABEL, "gene_symbol");
        let merged = base.overlay(&overrides);
        assert!(merged.get("not_a_field").is_none());
        assert_eq!(
            map_field(field::SUBJECT_LABEL, Some(&merged)).name(),
            Some("gene_symbol")
        );
        assert_eq!(merged.iter().count(), base.iter().count());
    }

    #[test]
    fn doubled_prefix_rewrite_only_for_go() {
        assert_eq!(go().rewrite_id("MGI:97490"), "MGI:MGI:97490");
        assert_eq!(go().rewrite_id("ZFIN:ZDB-GENE-1"), "ZFIN:ZDB-GENE-1");
        assert_eq!(SchemaProfile::Golr.rewrite_id("MGI:97490"), "MGI:97490");
    }

    #[test]
    fn document_category_only_for_go() {
        assert_eq!(go().document_category(), Some("annotation"));
        assert_eq!(SchemaProfile::Golr.document_category(), None);
    }

    proptest! {
        #[test]
        fn names_outside_table_pass_through(name in "[a-z_]{1,24}") {
            let m = go().field_mapping();
            prop_assume!(m.get(&name).is_none());
            prop_assert_eq!(map_field(&name, Some(&m)).name(), Some(name.as_str()));
        }
    }
}
