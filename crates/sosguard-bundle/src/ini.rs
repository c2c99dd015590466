use sosguard_expr::{IniDocument, DEFAULT_SECTION};

/// Parse an ini-style config file.
///
/// - `[section]` headers; keys before the first header go to `DEFAULT`
/// - `key = value` or `key: value`, split at the first separator
/// - whole-line `#` and `;` comments, blank lines ignored
/// - indented lines continue the previous value
/// - lines that fit none of the above are skipped
pub fn parse_ini(text: &str) -> IniDocument {
    let mut doc = IniDocument::new();
    let mut section = DEFAULT_SECTION.to_string();
    let mut last: Option<(String, String)> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if raw.starts_with([' ', '\t'])
            && let Some((key, value)) = last.as_mut()
        {
            value.push('\n');
            value.push_str(line);
            doc.insert(&section, key, value);
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = name.trim().to_string();
            last = None;
            continue;
        }

        let Some(split) = line.find(['=', ':']) else {
            last = None;
            continue;
        };
        let key = line[..split].trim();
        let value = line[split + 1..].trim();
        if key.is_empty() {
            last = None;
            continue;
        }
        doc.insert(&section, key, value);
        last = Some((key.to_string(), value.to_string()));
    }
    doc
}
