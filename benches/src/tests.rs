use tagmold::{Engine, Mode, Options};

use crate::context::{Query, User};

fn query() -> Query {
    Query {
        table: "users",
        name: Some("O'Brien".to_owned()),
        min_age: Some(18),
        ids: vec![1, 2, 3],
        order_by: Some("age"),
        users: vec![
            User {
                id: 1,
                name: "Nancy Wheeler".to_owned(),
                age: 17,
                manager_id: None,
                is_disabled: false,
            },
            User {
                id: 2,
                name: "Billy Hargrove".to_owned(),
                age: 19,
                manager_id: Some(1),
                is_disabled: true,
            },
        ],
    }
}

fn words(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[test]
fn sql() {
    let engine = Engine::with_options(Options::builder().mode(Mode::Sql).build());
    let result = engine.render(crate::SQL, query()).unwrap();
    assert_eq!(
        words(&result),
        r"SELECT * FROM users WHERE 1 = 1 AND name = 'O\'Brien' AND age >= 18 AND id IN (1, 2, 3) AND bulk = false AND (name, age, manager_id) IN (('Nancy Wheeler', 17, NULL), ('Billy Hargrove', 19, 1)) ORDER BY age"
    );
}

#[test]
fn sql_without_filters() {
    let query = Query {
        name: None,
        min_age: None,
        ids: Vec::new(),
        order_by: None,
        ..query()
    };
    let engine = Engine::with_options(Options::builder().mode(Mode::Sql).build());
    let result = engine.render(crate::SQL, query).unwrap();
    assert_eq!(
        words(&result),
        r"SELECT * FROM users WHERE 1 = 1 AND bulk = false AND (name, age, manager_id) IN (('Nancy Wheeler', 17, NULL), ('Billy Hargrove', 19, 1))"
    );
}

#[test]
fn json() {
    let engine = Engine::with_options(Options::builder().mode(Mode::Json).build());
    let result = engine.render(crate::JSON, query()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&result).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "table": "users",
            "filters": { "name": "O'Brien", "minAge": 18, "ids": [1, 2, 3] },
            "users": [
                { "id": 1, "name": "Nancy Wheeler", "age": 17, "managerId": null, "disabled": false },
                { "id": 2, "name": "Billy Hargrove", "age": 19, "managerId": 1, "disabled": true },
            ]
        })
    );
}
