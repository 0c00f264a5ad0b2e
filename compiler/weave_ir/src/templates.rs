//! Helpers over template instantiation names.
//!
//! These work purely on spellings such as
//! `std::vector<int, std::allocator<int> >`; nothing here consults the graph.

/// Whether `name` spells a template instantiation.
pub fn is_instantiation(name: &str) -> bool {
    match (name.find('<'), name.rfind('>')) {
        (Some(open), Some(close)) => open < close && name.trim_end().ends_with('>'),
        _ => false,
    }
}

/// The template name without its argument list.
pub fn name(decl_string: &str) -> &str {
    match decl_string.find('<') {
        Some(open) if is_instantiation(decl_string) => decl_string[..open].trim(),
        _ => decl_string.trim(),
    }
}

/// The top-level template arguments, trimmed.
pub fn args(decl_string: &str) -> Vec<&str> {
    if !is_instantiation(decl_string) {
        return Vec::new();
    }
    let (Some(open), Some(close)) = (decl_string.find('<'), decl_string.rfind('>')) else {
        return Vec::new();
    };
    let inner = &decl_string[open + 1..close];

    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, ch) in inner.char_indices() {
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                out.push(inner[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    let last = inner[start..].trim();
    if !last.is_empty() || !out.is_empty() {
        out.push(last);
    }
    out
}

/// Split an instantiation into its name and arguments.
pub fn split(decl_string: &str) -> (&str, Vec<&str>) {
    (name(decl_string), args(decl_string))
}

/// Every instantiation mentioned in `decl_string`, outermost first.
///
/// Arguments are explored depth-first with an explicit stack, so
/// `a< b< c >, d< e > >` yields `a`, `b`, `d`.
pub fn split_recursive(decl_string: &str) -> Vec<(&str, Vec<&str>)> {
    let mut answer = Vec::new();
    let mut stack = vec![decl_string];
    while let Some(current) = stack.pop() {
        if !is_instantiation(current) {
            continue;
        }
        let (template, arguments) = split(current);
        for arg in arguments.iter().rev() {
            stack.push(*arg);
        }
        answer.push((template, arguments));
    }
    answer
}

/// Build an instantiation spelling from a name and arguments.
pub fn join(name: &str, args: &[&str]) -> String {
    if args.is_empty() {
        format!("{name}<>")
    } else {
        format!("{name}< {} >", args.join(", "))
    }
}

/// Canonical spelling used as a map key.
///
/// Whitespace is removed and the global-scope prefix `::` is dropped at the
/// start and after `<`, `,`, `(`, `*` and `&`.
pub fn normalize(decl_string: &str) -> String {
    let compact: String = decl_string.chars().filter(|c| !c.is_whitespace()).collect();
    let mut out = String::with_capacity(compact.len());
    let mut rest = compact.as_str();
    let mut at_boundary = true;
    while !rest.is_empty() {
        if at_boundary {
            if let Some(stripped) = rest.strip_prefix("::") {
                rest = stripped;
            }
        }
        let Some(ch) = rest.chars().next() else {
            break;
        };
        out.push(ch);
        at_boundary = matches!(ch, '<' | ',' | '(' | '*' | '&');
        rest = &rest[ch.len_utf8()..];
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_is_instantiation() {
        assert!(is_instantiation("std::vector<int>"));
        assert!(!is_instantiation("int"));
        assert!(!is_instantiation("operator<"));
    }

    #[test]
    fn test_split_top_level_only() {
        let (template, arguments) =
            split("std::map<int, std::pair<int, double>, std::less<int> >");
        assert_eq!(template, "std::map");
        assert_eq!(
            arguments,
            vec!["int", "std::pair<int, double>", "std::less<int>"]
        );
    }

    #[test]
    fn test_split_recursive_finds_nested_instantiations() {
        let names: Vec<&str> = split_recursive("::boost::shared_ptr< std::vector< ::A > >")
            .into_iter()
            .map(|(template, _)| template)
            .collect();
        assert_eq!(names, vec!["::boost::shared_ptr", "std::vector"]);
    }

    #[test]
    fn test_join() {
        assert_eq!(join("std::vector", &["int"]), "std::vector< int >");
        assert_eq!(join("X", &[]), "X<>");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("::std::vector< ::A, int >"), "std::vector<A,int>");
        assert_eq!(normalize("::ns::Widget const &"), "ns::Widgetconst&");
        assert_eq!(normalize("int"), "int");
    }
}
