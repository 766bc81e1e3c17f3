//! Desktop entry parsing.

/// Launch fields pulled from a desktop entry document.
///
/// `icon` is the raw declared reference: either a bare icon name or an
/// absolute path. Resolving a bare name to an icon file is the resolver's
/// job, not the parser's.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LaunchFields {
    pub command: Option<String>,
    pub icon: Option<String>,
}

/// Extract the `Exec` and `Icon` values from a desktop entry document.
///
/// Scans line-oriented `Key = Value` pairs, tolerating whitespace around
/// the `=`. Keys are case-sensitive and only these two are recognized; if
/// a key repeats, the last occurrence wins. Malformed or unrecognized
/// lines are skipped.
pub fn extract_launch_fields(document: &str) -> LaunchFields {
    let mut fields = LaunchFields::default();

    for line in document.lines() {
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match key.trim() {
                "Exec" => fields.command = Some(value.to_string()),
                "Icon" => fields.icon = Some(value.to_string()),
                _ => {}
            }
        }
    }

    fields
}
