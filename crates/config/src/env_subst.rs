/// Expand `${NAME}` placeholders from the process environment.
///
/// Placeholders naming unset variables are kept verbatim.
pub fn substitute_env(input: &str) -> String {
    expand(input, |name| std::env::var(name).ok())
}

fn expand(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated placeholder: keep the tail as-is.
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match (name.is_empty(), lookup(name)) {
            (false, Some(value)) => out.push_str(&value),
            _ => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}
