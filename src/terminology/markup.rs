use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").unwrap());

/// Removes `<...>` tags (search hits wrap matched words in `<em class='found'>`).
pub fn strip_markup(text: &str) -> String {
    TAG.replace_all(text, "").into_owned()
}
