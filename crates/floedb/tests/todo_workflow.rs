use floedb::{
    Db, DbConfig, EntityDef, EntityId, Record, RefValue, Schema, Shape, StoredQueryDef,
    StoredQueryUpdate, TablePatch, Value, normalize,
};

fn todo_schema() -> Schema {
    Schema::try_new(vec![EntityDef::new("Todo")]).expect("schema should validate")
}

fn todo_queries() -> Vec<StoredQueryDef> {
    ["allTodoIds", "activeTodoIds", "completedTodoIds"]
        .into_iter()
        .map(|name| {
            StoredQueryDef::new(name, Shape::list_of(Shape::entity("Todo")))
                .default_value(RefValue::List(vec![]))
        })
        .collect()
}

fn open_store() -> Db {
    Db::open(todo_schema(), todo_queries(), DbConfig::new()).expect("store should open")
}

fn resolved_ids(session: &floedb::DbSession<'_>, name: &str) -> Vec<i64> {
    let result = session
        .execute_stored_query(name)
        .expect("query should exist")
        .expect("list should resolve");

    result
        .as_list()
        .expect("list result")
        .iter()
        .map(|item| {
            item.as_map()
                .and_then(|m| m.get("id"))
                .and_then(Value::as_int)
                .expect("todo id")
        })
        .collect()
}

#[test]
fn todo_lifecycle_tracks_ids_across_queries() {
    let db = open_store();
    let session = db.session();

    // Initial load: two active todos straight from a JSON payload.
    let payload = Value::from(serde_json::json!([
        { "id": 7, "text": "write docs", "completed": false },
        { "id": 9, "text": "ship release", "completed": false },
    ]));
    let normalized = normalize(&payload, &Shape::list_of(Shape::entity("Todo")), db.schema())
        .expect("payload should normalize");
    session.merge_entities(normalized.entities);
    session
        .update_stored_query("allTodoIds", normalized.result.clone())
        .expect("stored query should update");
    session
        .update_stored_query("activeTodoIds", normalized.result)
        .expect("stored query should update");

    assert_eq!(resolved_ids(&session, "activeTodoIds"), vec![7, 9]);
    assert_eq!(resolved_ids(&session, "completedTodoIds"), Vec::<i64>::new());

    // Completing a todo flips the flag and moves its id between lists.
    session.merge_entities(TablePatch::new().entity(
        "Todo",
        7,
        Record::new().attribute("id", 7).attribute("completed", true),
    ));
    session
        .update_stored_query(
            "activeTodoIds",
            StoredQueryUpdate::update(|ids| ids.clone().without_id(&EntityId::from(7))),
        )
        .expect("stored query should update");
    session
        .update_stored_query(
            "completedTodoIds",
            StoredQueryUpdate::update(|ids| ids.clone().with_id(7)),
        )
        .expect("stored query should update");

    assert_eq!(resolved_ids(&session, "activeTodoIds"), vec![9]);
    assert_eq!(resolved_ids(&session, "completedTodoIds"), vec![7]);
    assert_eq!(resolved_ids(&session, "allTodoIds"), vec![7, 9]);

    // The completed record kept its text and flipped only the flag.
    let completed = session
        .execute_stored_query("completedTodoIds")
        .expect("query should exist")
        .expect("list should resolve");
    let todo = completed.as_list().expect("list result")[0]
        .as_map()
        .expect("todo record")
        .clone();
    assert_eq!(todo.get("text"), Some(&Value::from("write docs")));
    assert_eq!(todo.get("completed"), Some(&Value::Bool(true)));

    // Deletion flags the record and withdraws the id everywhere.
    session.merge_entities(TablePatch::new().entity(
        "Todo",
        9,
        Record::new().attribute("id", 9).attribute("isDeleted", true),
    ));
    for name in ["allTodoIds", "activeTodoIds", "completedTodoIds"] {
        session
            .update_stored_query(
                name,
                StoredQueryUpdate::update(|ids| ids.clone().without_id(&EntityId::from(9))),
            )
            .expect("stored query should update");
    }

    assert_eq!(resolved_ids(&session, "allTodoIds"), vec![7]);
    assert_eq!(resolved_ids(&session, "activeTodoIds"), Vec::<i64>::new());
    assert_eq!(resolved_ids(&session, "completedTodoIds"), vec![7]);

    let entities = session.entities();
    let record = entities
        .entity("Todo", &EntityId::from(9))
        .expect("deleted record is kept");
    assert_eq!(record.get("isDeleted"), Some(&Value::Bool(true)));
}

#[test]
fn repeated_fn_updates_build_a_list_incrementally() {
    let db = open_store();
    let session = db.session();

    for id in [3_i64, 5, 5, 8] {
        session
            .update_stored_query(
                "allTodoIds",
                StoredQueryUpdate::update(move |ids| ids.clone().with_id(id)),
            )
            .expect("stored query should update");
    }

    let query = session
        .get_stored_query("allTodoIds")
        .expect("query should exist");
    // The duplicate id was appended once.
    assert_eq!(query.value, RefValue::ids([3_i64, 5, 8]));
}

#[test]
fn updater_patches_read_the_tables_they_extend() {
    let db = open_store();
    let session = db.session();

    session.merge_entities(TablePatch::new().entity(
        "Todo",
        1,
        Record::new().attribute("id", 1).attribute("text", "first"),
    ));

    // The next id is derived from what the store already holds.
    session.merge_entities(floedb::EntityPatch::updater(|entities| {
        let known = entities
            .entities_of("Todo")
            .map_or(0, |records| records.len());
        let next_id = i64::try_from(known).expect("small table") + 1;

        TablePatch::new().entity(
            "Todo",
            next_id,
            Record::new()
                .attribute("id", next_id)
                .attribute("text", "second"),
        )
    }));

    let entities = session.entities();
    assert!(entities.contains_entity("Todo", &EntityId::from(2)));
}
