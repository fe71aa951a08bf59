//! CSS Custom Properties and `var()` substitution.
//!
//! [CSS Custom Properties for Cascading Variables Level 1](https://www.w3.org/TR/css-variables-1/)
//!
//! Custom properties are resolved once per element, in dependency order,
//! with an explicit stack of the properties being resolved. A property found
//! on the stack again closes a cycle.

use std::collections::{BTreeMap, HashMap, HashSet};

/// [§ 3 Using Cascading Variables](https://www.w3.org/TR/css-variables-1/#using-variables)
///
/// True when `value` holds a `var()` reference anywhere.
#[must_use]
pub fn contains_var(value: &str) -> bool {
    find_var(value, 0).is_some()
}

/// Locate the next `var(` outside strings at or after `from`. Returns the
/// byte range of the whole call, parentheses included.
fn find_var(value: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = value.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None => {
                let is_start = i == 0 || !(bytes[i - 1].is_ascii_alphanumeric() || bytes[i - 1] == b'-');
                if is_start && bytes.len() >= i + 4 && bytes[i..i + 4].eq_ignore_ascii_case(b"var(") {
                    let mut depth = 0_usize;
                    for (j, &c) in bytes.iter().enumerate().skip(i + 3) {
                        match c {
                            b'(' => depth += 1,
                            b')' => {
                                depth -= 1;
                                if depth == 0 {
                                    return Some((i, j + 1));
                                }
                            }
                            _ => {}
                        }
                    }
                    // Unbalanced: treat as no reference.
                    return None;
                }
            }
        }
        i += 1;
    }
    None
}

/// [§ 3 Using Cascading Variables](https://www.w3.org/TR/css-variables-1/#using-variables)
///
/// "To substitute a `var()` in a property's value:
///  1. If the value of the custom property named by the first argument to
///     the `var()` function is anything but the initial value, replace the
///     `var()` function by the value of the corresponding custom property.
///  2. Otherwise, if the `var()` function has a fallback value as its second
///     argument, replace the `var()` function by the fallback value. If there
///     are any `var()` references in the fallback, substitute them as well.
///  3. Otherwise, the property containing the `var()` function is invalid at
///     computed-value time."
///
/// `lookup` returns the resolved value of a custom property, `None` for the
/// guaranteed-invalid value. Returns `None` when the whole value is invalid.
pub fn substitute_var(value: &str, lookup: &mut dyn FnMut(&str) -> Option<String>) -> Option<String> {
    let mut out = String::with_capacity(value.len());
    let mut cursor = 0;
    while let Some((start, end)) = find_var(value, cursor) {
        out.push_str(&value[cursor..start]);
        let inner = &value[start + 4..end - 1];
        let (name, fallback) = match inner.find(',') {
            Some(comma) => (inner[..comma].trim(), Some(&inner[comma + 1..])),
            None => (inner.trim(), None),
        };
        if !name.starts_with("--") {
            return None;
        }
        let replacement = match lookup(name) {
            Some(found) => found,
            None => substitute_var(fallback?.trim(), lookup)?,
        };
        out.push_str(&replacement);
        cursor = end;
    }
    out.push_str(&value[cursor..]);
    Some(out)
}

enum State {
    Visiting,
    Resolved(Option<String>),
}

struct CustomResolver<'a> {
    declared: &'a HashMap<String, String>,
    inherited: &'a BTreeMap<String, String>,
    state: HashMap<String, State>,
    stack: Vec<String>,
    cyclic: HashSet<String>,
}

impl CustomResolver<'_> {
    fn resolve(&mut self, name: &str) -> Option<String> {
        let declared = self.declared;
        let Some(raw) = declared.get(name) else {
            return self.inherited.get(name).cloned();
        };
        match self.state.get(name) {
            Some(State::Resolved(value)) => return value.clone(),
            Some(State::Visiting) => {
                // [§ 2.3 Resolving Dependency Cycles](https://www.w3.org/TR/css-variables-1/#cycles)
                // "If there is a cycle in the dependency graph, all the
                // custom properties in the cycle are invalid at
                // computed-value time."
                if let Some(pos) = self.stack.iter().position(|n| n == name) {
                    self.cyclic.extend(self.stack[pos..].iter().cloned());
                }
                return None;
            }
            None => {}
        }
        let _ = self.state.insert(name.to_string(), State::Visiting);
        self.stack.push(name.to_string());
        let substituted = substitute_var(raw, &mut |dep| self.resolve(dep));
        let _ = self.stack.pop();
        let value = if self.cyclic.contains(name) { None } else { substituted };
        let _ = self.state.insert(name.to_string(), State::Resolved(value.clone()));
        value
    }
}

/// Result of resolving one element's custom properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedCustomProperties {
    /// Every custom property visible on the element, inherited ones included.
    pub values: BTreeMap<String, String>,
    /// Declared properties that ended up guaranteed-invalid.
    pub invalid: Vec<String>,
    /// Properties found on a dependency cycle.
    pub cyclic: Vec<String>,
}

/// Resolve the custom properties declared on an element against the ones it
/// inherits. Declared values may reference each other in any order.
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn resolve_custom_properties(
    declared: &HashMap<String, String>,
    inherited: &BTreeMap<String, String>,
) -> ResolvedCustomProperties {
    let mut resolver = CustomResolver {
        declared,
        inherited,
        state: HashMap::new(),
        stack: Vec::new(),
        cyclic: HashSet::new(),
    };
    let mut names: Vec<&String> = declared.keys().collect();
    names.sort();
    let mut values = inherited.clone();
    let mut invalid = Vec::new();
    for name in names {
        match resolver.resolve(name) {
            Some(value) => {
                let _ = values.insert(name.clone(), value);
            }
            None => {
                let _ = values.remove(name);
                invalid.push(name.clone());
            }
        }
    }
    let mut cyclic: Vec<String> = resolver.cyclic.into_iter().collect();
    cyclic.sort();
    ResolvedCustomProperties {
        values,
        invalid,
        cyclic,
    }
}

/// Substitute every `var()` in a regular property value.
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn substitute_in_value(value: &str, custom: &BTreeMap<String, String>) -> Option<String> {
    substitute_var(value, &mut |name| custom.get(name).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_chain_resolves_in_any_order() {
        let decls = declared(&[("--var1", "var(--var2)"), ("--var2", "10px")]);
        let resolved = resolve_custom_properties(&decls, &BTreeMap::new());
        assert_eq!(resolved.values.get("--var1").map(String::as_str), Some("10px"));
        assert!(resolved.invalid.is_empty());
    }

    #[test]
    fn test_cycle_members_are_invalid() {
        let decls = declared(&[
            ("--a", "var(--b)"),
            ("--b", "var(--c)"),
            ("--c", "var(--a)"),
            ("--d", "var(--a, 4px)"),
        ]);
        let resolved = resolve_custom_properties(&decls, &BTreeMap::new());
        assert_eq!(resolved.cyclic, vec!["--a", "--b", "--c"]);
        assert!(!resolved.values.contains_key("--a"));
        // Not on the cycle itself, so its fallback applies.
        assert_eq!(resolved.values.get("--d").map(String::as_str), Some("4px"));
    }

    #[test]
    fn test_self_reference() {
        let decls = declared(&[("--x", "var(--x)")]);
        let resolved = resolve_custom_properties(&decls, &BTreeMap::new());
        assert_eq!(resolved.cyclic, vec!["--x"]);
    }

    #[test]
    fn test_fallbacks_nest() {
        let custom = BTreeMap::from([("--b".to_string(), "2px".to_string())]);
        assert_eq!(
            substitute_in_value("var(--a, var(--b)) 1px", &custom),
            Some("2px 1px".to_string())
        );
        assert_eq!(substitute_in_value("var(--a)", &custom), None);
        assert_eq!(
            substitute_in_value("calc(var(--b) + 1px)", &custom),
            Some("calc(2px + 1px)".to_string())
        );
    }

    #[test]
    fn test_strings_are_not_scanned() {
        assert!(!contains_var("'var(--x)'"));
        assert!(contains_var("1px VAR(--x)"));
    }

    #[quickcheck_macros::quickcheck]
    fn prop_resolution_terminates_for_any_reference_graph(edges: Vec<(u8, u8)>) -> bool {
        let mut decls = HashMap::new();
        for (from, to) in edges.iter().take(12) {
            let _ = decls.insert(format!("--v{}", from % 6), format!("var(--v{})", to % 6));
        }
        let resolved = resolve_custom_properties(&decls, &BTreeMap::new());
        // Every declared name is either resolved or reported invalid.
        decls
            .keys()
            .all(|k| resolved.values.contains_key(k) || resolved.invalid.contains(k))
    }
}
