//! Shared schemas, query sets, and record builders for tests.

use crate::{
    db::StoredQueryDef,
    value::{Record, RefValue},
};
use floedb_schema::{entity::EntityDef, schema::Schema, shape::Shape};

pub(crate) fn blog_schema() -> Schema {
    Schema::try_new(vec![
        EntityDef::new("User"),
        EntityDef::new("Post").reference("author", "User"),
    ])
    .expect("blog schema should validate")
}

pub(crate) fn blog_queries() -> Vec<StoredQueryDef> {
    vec![
        StoredQueryDef::new("postById", Shape::entity("Post")),
        StoredQueryDef::new("postsByIds", Shape::list_of(Shape::entity("Post")))
            .default_value(RefValue::List(vec![])),
        StoredQueryDef::new("userById", Shape::entity("User")),
        StoredQueryDef::new("usersByIds", Shape::list_of(Shape::entity("User")))
            .default_value(RefValue::List(vec![])),
    ]
}

pub(crate) fn todo_schema() -> Schema {
    Schema::try_new(vec![EntityDef::new("Todo")]).expect("todo schema should validate")
}

pub(crate) fn todo_queries() -> Vec<StoredQueryDef> {
    ["activeTodoIds", "completedTodoIds", "allTodoIds"]
        .into_iter()
        .map(|name| {
            StoredQueryDef::new(name, Shape::list_of(Shape::entity("Todo")))
                .default_value(RefValue::List(vec![]))
        })
        .collect()
}

pub(crate) fn user_record(id: i64, name: &str) -> Record {
    Record::new().attribute("id", id).attribute("name", name)
}

pub(crate) fn post_record(id: i64, title: &str, author: i64) -> Record {
    Record::new()
        .attribute("id", id)
        .attribute("title", title)
        .attribute("author", author)
}
