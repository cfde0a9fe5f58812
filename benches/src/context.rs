use rand::Rng;

/// The parameters of a user search.
///
/// Every filter is optional, an absent filter serializes as `null` so the
/// templates can test for it without tripping the missing parameter check.
#[derive(serde::Serialize)]
pub struct Query {
    pub table: &'static str,
    pub name: Option<String>,
    pub min_age: Option<u32>,
    pub ids: Vec<u64>,
    pub order_by: Option<&'static str>,
    pub users: Vec<User>,
}

#[derive(serde::Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub manager_id: Option<u64>,
    pub is_disabled: bool,
}

fn word(rng: &mut impl Rng, len: usize) -> String {
    (0..len).map(|_| rng.gen_range('a'..='z')).collect()
}

/// Generates a query with `n` users and a random selection of filters.
pub fn random(n: usize) -> Query {
    let mut rng = rand::thread_rng();
    let name = rng.gen_bool(0.5).then(|| word(&mut rng, 12));
    let min_age = rng.gen_bool(0.5).then(|| rng.gen_range(18..65));
    let ids = (0..rng.gen_range(0..20))
        .map(|_| rng.gen_range(1..10_000))
        .collect();
    let order_by = rng.gen_bool(0.5).then_some("age");
    let users = (0..n as u64)
        .map(|id| User {
            id,
            name: word(&mut rng, 20),
            age: rng.gen_range(21..100),
            manager_id: (id > 0 && rng.gen_ratio(3, 4)).then(|| rng.gen_range(0..id)),
            is_disabled: rng.gen_ratio(1, 4),
        })
        .collect();
    Query {
        table: "users",
        name,
        min_age,
        ids,
        order_by,
        users,
    }
}
