use std::collections::BTreeSet;
use std::fmt::Write;

/// "a, b, and c"
pub fn plain_list_names(names: BTreeSet<String>) -> String {
    let mut s = String::new();
    let len = names.len();
    for (idx, n) in names.into_iter().enumerate() {
        if idx != 0 {
            if idx == len - 1 {
                if len == 2 {
                    s.push_str(" and ");
                } else {
                    s.push_str(", and ");
                }
            } else {
                s.push_str(", ");
            }
        }
        write!(s, "{}", n).unwrap();
    }
    s
}

pub fn prettyprint_usize(x: usize) -> String {
    let num = format!("{}", x);
    let mut result = String::new();
    let mut i = num.len();
    for c in num.chars() {
        result.push(c);
        i -= 1;
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
    }
    result
}

/// Lowercases and replaces spaces with underscores, for use in filenames.
pub fn slugify(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}
