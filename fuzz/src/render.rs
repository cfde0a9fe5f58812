#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde::Serialize;

#[derive(Debug, Serialize, Arbitrary)]
#[serde(untagged)]
enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

#[derive(Debug, Arbitrary)]
enum Mode {
    Default,
    Sql,
    Json,
}

fuzz_target!(|data: (&str, Mode, bool, BTreeMap<String, Value>)| {
    let (source, mode, collect, ctx) = data;
    let mode = match mode {
        Mode::Default => tagmold::Mode::Default,
        Mode::Sql => tagmold::Mode::Sql,
        Mode::Json => tagmold::Mode::Json,
    };
    let options = tagmold::Options::builder()
        .mode(mode)
        .throw_on_missing_params(!collect)
        .collect_missing_params(collect)
        .build();
    let mut engine = tagmold::Engine::with_options(options);
    engine.add_function("len", |s: String| s.len());
    let _ = engine.render(source, &ctx);
});
