use serde_json::json;
use tagmold::{Engine, ErrorKind, Mode, Options};

fn words(s: &str) -> Vec<&str> {
    s.split_whitespace().collect()
}

#[test]
fn render_foreach() {
    let result = Engine::new()
        .render(
            r#"
            <foreach collection="param1">
                #{item}
            </foreach>
            "#,
            json!({ "param1": ["foo", "bar"] }),
        )
        .unwrap();
    assert_eq!(words(&result), ["foo", "bar"]);
}

#[test]
fn render_foreach_string_collection() {
    let result = Engine::new()
        .render(
            r#"<foreach collection="param1" separator="-">#{item}</foreach>"#,
            json!({ "param1": "foo" }),
        )
        .unwrap();
    assert_eq!(result, "f-o-o");
}

#[test]
fn render_foreach_custom_item_and_index() {
    let result = Engine::new()
        .render(
            r#"
            <foreach collection="param1" item="val" index="i">
                #{i}: #{val}
            </foreach>
            "#,
            json!({ "param1": ["foo", "bar"] }),
        )
        .unwrap();
    assert_eq!(words(&result), ["0:", "foo", "1:", "bar"]);
}

#[test]
fn render_foreach_item_members() {
    let result = Engine::new()
        .render(
            r#"<foreach collection="users" separator=", ">${item.name} (${item.roles[0]})</foreach>"#,
            json!({
                "users": [
                    { "name": "John", "roles": ["admin"] },
                    { "name": "Jane", "roles": ["user", "admin"] },
                ]
            }),
        )
        .unwrap();
    assert_eq!(result, "John (admin), Jane (user)");
}

#[test]
fn render_foreach_separator() {
    let result = Engine::new()
        .render(
            r#"
            <foreach collection="param1" separator="and">
                #{item}
            </foreach>
            "#,
            json!({ "param1": ["foo", "bar"] }),
        )
        .unwrap();
    assert_eq!(words(&result), ["foo", "and", "bar"]);
}

#[test]
fn render_foreach_open_and_close() {
    let result = Engine::new()
        .render(
            r#"
            <foreach collection="param1" open="(" close=")">
                #{item}
            </foreach>
            "#,
            json!({ "param1": ["foo", "bar"] }),
        )
        .unwrap();
    assert_eq!(words(&result), ["(", "foo", "bar", ")"]);
}

#[test]
fn render_foreach_sql_mode() {
    let engine = Engine::with_options(Options::builder().mode(Mode::Sql).build());
    let result = engine
        .render(
            r#"
            <foreach collection="param1" open="(" close=")" separator="or">
                field = #{item}
            </foreach>
            "#,
            json!({ "param1": ["foo", "bar"] }),
        )
        .unwrap();
    assert_eq!(
        words(&result),
        ["(", "field", "=", "'foo'", "or", "field", "=", "'bar'", ")"]
    );
}

#[test]
fn render_foreach_sql_in_clause() {
    let engine = Engine::with_options(Options::builder().mode(Mode::Sql).build());
    let result = engine
        .render(
            r#"SELECT * FROM t WHERE id IN <foreach collection="ids" open="(" separator=", " close=")">#{item}</foreach>"#,
            json!({ "ids": [1, 2, 3] }),
        )
        .unwrap();
    assert_eq!(result, "SELECT * FROM t WHERE id IN (1, 2, 3)");
}

#[test]
fn render_foreach_empty_collection() {
    let result = Engine::new()
        .render(
            r#"IN <foreach collection="ids" open="(" separator=", " close=")">#{item}</foreach>"#,
            json!({ "ids": [] }),
        )
        .unwrap();
    assert_eq!(result, "IN ()");
}

#[test]
fn render_foreach_trim() {
    let result = Engine::new()
        .render(
            r#"
            <foreach collection="param1" trim="true" separator=",">
                #{item}
            </foreach>
            "#,
            json!({ "param1": ["foo", "bar"] }),
        )
        .unwrap();
    assert_eq!(result, "foo,bar");
}

#[test]
fn render_foreach_comments() {
    let result = Engine::new()
        .render(
            r#"
            <foreach collection="param1">
                <!-- foo -->
            </foreach>
            "#,
            json!({ "param1": ["foo", "bar"] }),
        )
        .unwrap();
    assert_eq!(words(&result), ["<!--", "foo", "-->", "<!--", "foo", "-->"]);
}

#[test]
fn render_foreach_inner_if() {
    let result = Engine::new()
        .render(
            r#"
            <foreach collection="param1">
                <if test="item == 'foo'">#{item}</if>
            </foreach>
            "#,
            json!({ "param1": ["foo", "bar"] }),
        )
        .unwrap();
    assert_eq!(result, "foo");
}

#[test]
fn render_foreach_inner_choose() {
    let result = Engine::new()
        .render(
            r#"
            <foreach collection="param1">
                <choose>
                    <when test="item == 'foo'">yes</when>
                    <otherwise>no</otherwise>
                </choose>
            </foreach>
            "#,
            json!({ "param1": ["foo", "bar"] }),
        )
        .unwrap();
    assert_eq!(words(&result), ["yes", "no"]);
}

#[test]
fn render_foreach_followed_by_content() {
    let result = Engine::new()
        .render(
            r#"
            <foreach collection="param1">
                #{item}
            </foreach>
            <!-- end loop -->
            #{param1[0]}
            "#,
            json!({ "param1": ["foo"] }),
        )
        .unwrap();
    assert_eq!(words(&result), ["foo", "<!--", "end", "loop", "-->", "foo"]);
}

#[test]
fn render_foreach_sequential() {
    let result = Engine::new()
        .render(
            r#"
            <foreach collection="param1" trim="true" separator=",">
                #{item}
            </foreach>
            <foreach collection="param1" trim="true" separator=",">
                #{item}
            </foreach>
            "#,
            json!({ "param1": ["foo", "bar"] }),
        )
        .unwrap();
    assert_eq!(words(&result), ["foo,bar", "foo,bar"]);
}

#[test]
fn render_foreach_nested() {
    let result = Engine::new()
        .render(
            r#"
            <foreach collection="param1" trim="true" separator=",">
                <foreach collection="item" trim="true" separator=",">
                    #{item}
                </foreach>
            </foreach>
            "#,
            json!({ "param1": [["foo", "bar"], ["baz", "qux"]] }),
        )
        .unwrap();
    assert_eq!(result, "foo,bar,baz,qux");
}

#[test]
fn render_foreach_nested_outer_variables() {
    let result = Engine::new()
        .render(
            r#"<foreach collection="rows" item="row" index="r" separator=";"><foreach collection="row" index="c" separator=",">${r}${c}=${item}</foreach></foreach>"#,
            json!({ "rows": [["a", "b"], ["c"]] }),
        )
        .unwrap();
    assert_eq!(result, "00=a,01=b;10=c");
}

#[test]
fn render_foreach_variables_do_not_leak() {
    let engine = Engine::with_options(Options::builder().throw_on_missing_params(false).build());
    let result = engine
        .render(
            r#"<foreach collection="xs">#{item}</foreach>[#{item}]"#,
            json!({ "xs": [1, 2] }),
        )
        .unwrap();
    assert_eq!(result, "12[]");
}

#[test]
fn render_foreach_item_shadows_global() {
    let result = Engine::new()
        .render(
            r#"<foreach collection="xs">#{item}</foreach> #{item}"#,
            json!({ "xs": [1, 2], "item": "global" }),
        )
        .unwrap();
    assert_eq!(result, "12 global");
}

#[test]
fn render_foreach_not_rendered_is_not_resolved() {
    let result = Engine::new()
        .render(
            r#"<if test="false"><foreach collection="missing">#{item}</foreach></if>ok"#,
            json!({}),
        )
        .unwrap();
    assert_eq!(result, "ok");
}

#[test]
fn render_foreach_err_missing_attribute() {
    let err = Engine::new()
        .render("<foreach></foreach>", json!({}))
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::MissingAttribute {
            tag: "foreach".into(),
            attribute: "collection".into()
        }
    );
}

#[test]
fn render_foreach_err_unknown_attribute() {
    let err = Engine::new()
        .render(r#"<foreach foo="bar"></foreach>"#, json!({}))
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::UnknownAttribute {
            tag: "foreach".into(),
            attribute: "foo".into()
        }
    );
}

#[test]
fn render_foreach_err_blank_collection() {
    let err = Engine::new()
        .render(r#"<foreach collection=""></foreach>"#, json!({}))
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::InvalidAttributeValue {
            tag: "foreach".into(),
            attribute: "collection".into(),
            expected: None
        }
    );
}

#[test]
fn render_foreach_err_collection_not_found() {
    let err = Engine::new()
        .render(r#"<foreach collection="param1"></foreach>"#, json!({}))
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::InvalidParameterReference {
            reference: "param1".into()
        }
    );
}

#[test]
fn render_foreach_err_collection_not_a_path() {
    let err = Engine::new()
        .render(r#"<foreach collection="a + b"></foreach>"#, json!({}))
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::InvalidParameterReference {
            reference: "a + b".into()
        }
    );
}

#[test]
fn render_foreach_err_collection_not_iterable() {
    let engine = Engine::new();
    for value in [json!(true), json!(1), json!({ "a": 1 })] {
        let err = engine
            .render(
                r#"<foreach collection="param1"></foreach>"#,
                json!({ "param1": value }),
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value on attribute `collection` of tag <foreach>, expected iterable between bytes 9 and 28"
        );
    }
}

#[test]
fn render_foreach_err_invalid_item() {
    let err = Engine::new()
        .render(
            r#"<foreach collection="param1" item=" invalid "></foreach>"#,
            json!({ "param1": ["foo"] }),
        )
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::InvalidAttributeValue {
            tag: "foreach".into(),
            attribute: "item".into(),
            expected: Some("an identifier")
        }
    );
}

#[test]
fn render_foreach_err_invalid_trim() {
    let err = Engine::new()
        .render(
            r#"<foreach collection="param1" trim="yes"></foreach>"#,
            json!({ "param1": ["foo"] }),
        )
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::InvalidAttributeValue {
            tag: "foreach".into(),
            attribute: "trim".into(),
            expected: Some("true or false")
        }
    );
}

#[test]
fn render_foreach_err_unbalanced() {
    let err = Engine::new()
        .render(
            r#"lorem <foreach collection="param1">#{item}"#,
            json!({ "param1": ["foo"] }),
        )
        .unwrap_err();
    assert_eq!(
        format!("{:#}", err),
        "
   |
 1 | lorem <foreach collection=\"param1\">#{item}
   |       ^^^^^^^^ unbalanced tag <foreach>
"
    );
}

#[test]
fn render_foreach_err_unbalanced_empty_collection() {
    let err = Engine::new()
        .render(r#"<foreach collection="param1">"#, json!({ "param1": [] }))
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::UnbalancedTag {
            tag: "foreach".into()
        }
    );
}

#[test]
fn render_foreach_err_unclosed() {
    let err = Engine::new()
        .render(r#"<foreach collection="param1""#, json!({ "param1": ["foo"] }))
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::UnclosedTag {
            tag: "foreach".into()
        }
    );
}

#[test]
fn render_foreach_err_self_closing() {
    let err = Engine::new()
        .render(
            r#"<foreach collection="param1" />"#,
            json!({ "param1": ["foo"] }),
        )
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::UnexpectedSelfClosingTag {
            tag: "foreach".into()
        }
    );
}

#[test]
fn render_foreach_err_unexpected_closing_tag() {
    let err = Engine::new()
        .render(
            r#"<foreach collection="param1"></foo>"#,
            json!({ "param1": ["foo"] }),
        )
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::UnexpectedClosingTag {
            found: "foo".into(),
            expected: "foreach".into()
        }
    );
}
