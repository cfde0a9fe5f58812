pub mod context;
#[cfg(test)]
mod tests;

/// A search query with optional filters, an id list and a tuple `IN` clause.
pub const SQL: &str = r#"
SELECT * FROM ${table}
WHERE 1 = 1
<if test="name">AND name = #{name}</if>
<if test="min_age != null">AND age >= #{min_age}</if>
<if test="ids.length">
  AND id IN <foreach collection="ids" open="(" separator=", " close=")">#{item}</foreach>
</if>
<choose>
  <when test="users.length > 100">AND bulk = true</when>
  <otherwise>AND bulk = false</otherwise>
</choose>
AND (name, age, manager_id) IN
<foreach collection="users" item="user" open="(" separator=", " close=")" trim="true">
  (#{user.name}, #{user.age}, #{user.manager_id})
</foreach>
<if test="order_by">ORDER BY ${order_by}</if>
"#;

/// A document describing the query and each user as JSON.
pub const JSON: &str = r#"
{
  "table": #{table},
  "filters": { "name": #{name}, "minAge": #{min_age}, "ids": #{ids} },
  "users": <foreach collection="users" item="user" open="[" separator="," close="]" trim="true">
    { "id": #{user.id}, "name": #{user.name}, "age": #{user.age}, "managerId": #{user.manager_id}, "disabled": #{user.is_disabled} }
  </foreach>
}
"#;

/// Returns the source repeated `n` times.
pub fn repeat(source: &str, n: usize) -> String {
    let mut s = String::with_capacity(source.len() * n);
    for _ in 0..n {
        s.push_str(source);
    }
    s
}
