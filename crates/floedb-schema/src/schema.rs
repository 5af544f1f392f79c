use crate::{Error, prelude::*, validate::validate_defs};
use std::collections::BTreeMap;

///
/// Schema
/// Immutable registry of entity definitions. Construction validates the
/// whole definition set and reports every failure at once; a value of
/// this type is always internally consistent.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct Schema {
    defs: BTreeMap<String, EntityDef>,
}

impl Schema {
    pub fn try_new(defs: impl IntoIterator<Item = EntityDef>) -> Result<Self, Error> {
        let defs: Vec<EntityDef> = defs.into_iter().collect();
        validate_defs(&defs).map_err(Error::Validation)?;

        let defs = defs.into_iter().map(|def| (def.name.clone(), def)).collect();

        Ok(Self { defs })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&EntityDef> {
        self.defs.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Registered entity type names, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    pub fn defs(&self) -> impl Iterator<Item = &EntityDef> {
        self.defs.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Check that a query shape only mentions registered entity types.
    pub fn validate_shape(&self, shape: &Shape) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();
        for name in shape.entity_names() {
            if !self.contains(name) {
                err!(errs, "shape refers to undefined entity '{name}'");
            }
        }

        errs.result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_defs() -> Vec<EntityDef> {
        vec![
            EntityDef::new("User"),
            EntityDef::new("Post")
                .reference("author", "User")
                .reference_list("tags", "Tag"),
            EntityDef::new("Tag"),
        ]
    }

    #[test]
    fn valid_defs_build_a_registry() -> Result<(), Error> {
        let schema = Schema::try_new(sample_defs())?;

        assert_eq!(schema.len(), 3);
        assert!(schema.contains("Post"));
        assert!(!schema.contains("Comment"));

        let names: Vec<&str> = schema.names().collect();
        assert_eq!(names, vec!["Post", "Tag", "User"]);

        Ok(())
    }

    #[test]
    fn duplicate_entity_names_fail() {
        let err = Schema::try_new(vec![EntityDef::new("User"), EntityDef::new("User")])
            .expect_err("duplicate names must not validate");

        let Error::Validation(errs) = err;
        assert_eq!(errs.len(), 1);
        assert!(errs.to_string().contains("duplicate entity name 'User'"));
    }

    #[test]
    fn undefined_reference_target_fails() {
        let err = Schema::try_new(vec![EntityDef::new("Post").reference("author", "User")])
            .expect_err("dangling target must not validate");

        let Error::Validation(errs) = err;
        assert!(errs.to_string().contains("undefined entity 'User'"));
    }

    #[test]
    fn all_failures_are_reported_together() {
        let defs = vec![
            EntityDef::new(""),
            EntityDef::new("Post")
                .reference("author", "User")
                .reference("author", "User"),
        ];
        let err = Schema::try_new(defs).expect_err("invalid defs must not validate");

        let Error::Validation(errs) = err;
        let rendered = errs.to_string();
        assert!(rendered.contains("entity name cannot be empty"));
        assert!(rendered.contains("duplicate reference field 'author'"));
        assert!(rendered.contains("undefined entity 'User'"));
        assert!(errs.len() >= 3);
    }

    #[test]
    fn shape_validation_checks_entity_names() -> Result<(), Error> {
        let schema = Schema::try_new(sample_defs())?;

        let known = Shape::list_of(Shape::entity("Post"));
        assert!(schema.validate_shape(&known).is_ok());

        let unknown = Shape::map([("posts", Shape::list_of(Shape::entity("Article")))]);
        let errs = schema
            .validate_shape(&unknown)
            .expect_err("unknown entity must not validate");
        assert!(errs.to_string().contains("undefined entity 'Article'"));

        Ok(())
    }
}
