//! YAML front matter and title extraction for markdown pages.

use serde::Deserialize;

/// Page settings from a leading `---` YAML block.
#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct FrontMatter {
    pub(crate) title: Option<String>,
    pub(crate) order: Option<i64>,
    pub(crate) hidden: bool,
    pub(crate) disabled: bool,
}

/// Split `raw` into front matter and body.
///
/// Files without a front matter block, or whose block is never closed, have
/// default settings and the whole file as body.
pub(crate) fn split_front_matter(raw: &str) -> Result<(FrontMatter, &str), serde_yaml::Error> {
    let Some(rest) = raw
        .strip_prefix("---")
        .and_then(|r| r.strip_prefix('\n').or_else(|| r.strip_prefix("\r\n")))
    else {
        return Ok((FrontMatter::default(), raw));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let front_matter = if yaml.trim().is_empty() {
                FrontMatter::default()
            } else {
                serde_yaml::from_str(yaml)?
            };
            return Ok((front_matter, body));
        }
        offset += line.len();
    }

    Ok((FrontMatter::default(), raw))
}

/// Text of the first `# ` heading.
pub(crate) fn first_heading(body: &str) -> Option<String> {
    body.lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_owned)
}

/// Title derived from a file stem: `getting-started` → `Getting Started`.
pub(crate) fn title_from_stem(stem: &str) -> String {
    stem.replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
