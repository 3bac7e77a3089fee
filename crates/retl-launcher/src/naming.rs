use retl_core::ConnectorRole;

// generateName allows 63 characters minus the 5-character random suffix
const MAX_PREFIX_LEN: usize = 57;

/// Lowercase `name` and collapse every run of characters outside `[a-z0-9-]` into `-`
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('-');
            in_run = true;
        }
    }
    out
}

/// Execution-unit name: `<role>-<adapter>`, sanitized
pub fn unit_name(role: ConnectorRole, adapter_name: &str) -> String {
    let name = format!("{}-{}", role.as_str(), sanitize_name(adapter_name));
    let mut name: String = name.chars().take(MAX_PREFIX_LEN).collect();
    while name.ends_with('-') {
        name.pop();
    }
    name
}
