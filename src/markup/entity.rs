use std::borrow::Cow;
use std::collections::BTreeMap;

const BUILTINS: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", "\u{a0}"),
];

/// The longest entity name we will look for, anything longer is left as is.
const MAX_NAME: usize = 32;

/// Decodes the character references in `s`.
///
/// Named references are looked up in `custom` first and then in the built-in
/// table, numeric references (`&#60;` and `&#x3c;`) are always decoded.
/// References that cannot be decoded are left untouched.
pub fn decode<'a>(s: &'a str, custom: &BTreeMap<String, String>) -> Cow<'a, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(i) = rest.find('&') {
        out.push_str(&rest[..i]);
        rest = &rest[i..];
        match reference(rest, custom) {
            Some((replacement, len)) => {
                out.push_str(&replacement);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Parses the reference at the start of `s`, which always begins with `&`.
///
/// Returns the replacement and the length of the reference in bytes.
fn reference<'a>(s: &str, custom: &'a BTreeMap<String, String>) -> Option<(Cow<'a, str>, usize)> {
    let end = s.get(1..)?.find(';')? + 1;
    if end > MAX_NAME + 2 {
        return None;
    }
    let name = &s[1..end];

    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        let c = char::from_u32(code)?;
        return Some((Cow::Owned(c.to_string()), end + 1));
    }

    if let Some(r) = custom.get(name) {
        return Some((Cow::Borrowed(r.as_str()), end + 1));
    }

    BUILTINS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, r)| (Cow::Borrowed(*r), end + 1))
}
