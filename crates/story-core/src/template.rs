use crate::markdown::{format_field, placeholder_re};
use regex::{NoExpand, Regex};

/// Sentinel written over any `<...>` span the marker pass did not fill.
pub const UNFILLED: &str = "TBD";

/// Metadata labels rewritten after marker substitution, in template order.
pub const METADATA_LABELS: &[&str] = &[
    "Epic",
    "Status",
    "Priority",
    "Dependencies",
    "Target",
    "Estimated Effort",
    "Design Reference",
];

/// Replace each exact marker with its value, then sanitize leftover `<...>` spans.
pub fn substitute(template: &str, markers: &[(&str, &str)]) -> String {
    let mut content = template.to_string();
    for (marker, value) in markers {
        content = content.replace(marker, value);
    }
    placeholder_re()
        .replace_all(&content, NoExpand(UNFILLED))
        .into_owned()
}

/// Rewrite every line starting with `**Label**:` or `**Label:**` to `**Label:** value`.
pub fn set_field(content: &str, label: &str, value: &str) -> String {
    let pattern = format!(
        r"(?m)^\*\*{}(?::\*\*|\*\*:)[^\r\n]*",
        regex::escape(label)
    );
    let re = Regex::new(&pattern).expect("escaped label yields a valid pattern");
    let line = format_field(label, value);
    re.replace_all(content, NoExpand(&line)).into_owned()
}

/// Marker substitution followed by the metadata overwrite pass.
pub fn render(template: &str, markers: &[(&str, &str)], fields: &[(&str, &str)]) -> String {
    let mut content = substitute(template, markers);
    for (label, value) in fields {
        content = set_field(&content, label, value);
    }
    content
}
