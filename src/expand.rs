//! Brace expansion for rule declarations.
//!
//! `/{a,b}` declares `/a` and `/b`; `{1..3}` and `{a..c}` expand to
//! sequences. Expansion happens before parsing, so every expanded rule is
//! merged, ordered and checked for duplicates like a hand-written one.
//! Braces without a top-level comma or a valid sequence stay literal, and
//! `\{`, `\}` and `\,` never take part.

use crate::tree::{HeaderSpec, Rule};

/// Expand every brace group in `pattern`, left to right.
///
/// An empty pattern yields one empty string.
///
/// # Example
///
/// ```rust,ignore
/// assert_eq!(expand("/{a,b}/{1..2}"), vec!["/a/1", "/a/2", "/b/1", "/b/2"]);
/// ```
#[must_use]
pub fn expand(pattern: &str) -> Vec<String> {
    let chars: Vec<char> = pattern.chars().collect();

    let mut from = 0;
    while let Some(open) = find_unescaped(&chars, '{', from) {
        from = open + 1;
        let Some(close) = matching_close(&chars, open) else {
            continue;
        };
        let body: String = chars[open + 1..close].iter().collect();
        let alternatives = match sequence(&body) {
            Some(values) => values,
            None => {
                let parts = split_top_level(&body);
                if parts.len() < 2 {
                    continue;
                }
                parts.iter().flat_map(|part| expand(part)).collect()
            }
        };

        let prefix: String = chars[..open].iter().collect();
        let suffix: String = chars[close + 1..].iter().collect();
        let tails = expand(&suffix);

        let mut out = Vec::with_capacity(alternatives.len() * tails.len());
        for alternative in &alternatives {
            for tail in &tails {
                out.push(format!("{}{}{}", prefix, alternative, tail));
            }
        }
        return out;
    }

    vec![pattern.to_string()]
}

/// Expand a rule's url, method and headers into every combination.
///
/// Combinations are produced url-major, then method, then headers.
#[must_use]
pub fn expand_rule(rule: &Rule) -> Vec<Rule> {
    let urls = expand(&rule.url);
    let methods: Vec<Option<String>> = match &rule.method {
        Some(method) => expand(method).into_iter().map(Some).collect(),
        None => vec![None],
    };
    let header_sets = product(rule.headers.iter().map(expand_header).collect());

    let mut rules = Vec::with_capacity(urls.len() * methods.len() * header_sets.len());
    for url in &urls {
        for method in &methods {
            for headers in &header_sets {
                rules.push(Rule {
                    url: url.clone(),
                    method: method.clone(),
                    headers: headers.clone(),
                });
            }
        }
    }
    rules
}

fn expand_header(spec: &HeaderSpec) -> Vec<HeaderSpec> {
    match spec {
        HeaderSpec::Name(name) => expand(name).into_iter().map(HeaderSpec::Name).collect(),
        HeaderSpec::Pairs(pairs) => {
            let per_key: Vec<Vec<(String, String)>> = pairs
                .iter()
                .map(|(key, value)| {
                    let values = expand(value);
                    expand(key)
                        .into_iter()
                        .flat_map(|k| values.iter().map(move |v| (k.clone(), v.clone())))
                        .collect()
                })
                .collect();
            product(per_key).into_iter().map(HeaderSpec::Pairs).collect()
        }
    }
}

/// Cartesian product, first list varying slowest.
fn product<T: Clone>(lists: Vec<Vec<T>>) -> Vec<Vec<T>> {
    lists.into_iter().fold(vec![Vec::new()], |acc, list| {
        acc.iter()
            .flat_map(|prefix| {
                list.iter().map(move |item| {
                    let mut next = prefix.clone();
                    next.push(item.clone());
                    next
                })
            })
            .collect()
    })
}

fn is_escaped(chars: &[char], at: usize) -> bool {
    chars[..at].iter().rev().take_while(|&&c| c == '\\').count() % 2 == 1
}

fn find_unescaped(chars: &[char], target: char, from: usize) -> Option<usize> {
    (from..chars.len()).find(|&i| chars[i] == target && !is_escaped(chars, i))
}

fn matching_close(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &c) in chars.iter().enumerate().skip(open) {
        if is_escaped(chars, i) {
            continue;
        }
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_top_level(body: &str) -> Vec<String> {
    let chars: Vec<char> = body.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for (i, &c) in chars.iter().enumerate() {
        let escaped = is_escaped(&chars, i);
        match c {
            '{' if !escaped => depth += 1,
            '}' if !escaped => depth = depth.saturating_sub(1),
            ',' if !escaped && depth == 0 => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(current);
    parts
}

/// Longest sequence a single range may produce. Longer ranges stay literal.
pub const MAX_SEQUENCE: u64 = 10_000;

/// `{1..5}`, `{05..1..2}`, `{a..e}` and friends.
fn sequence(body: &str) -> Option<Vec<String>> {
    let parts: Vec<&str> = body.split("..").collect();
    if parts.len() != 2 && parts.len() != 3 {
        return None;
    }
    let step = match parts.get(2) {
        Some(step) => step.parse::<i64>().ok()?.unsigned_abs().max(1),
        None => 1,
    };

    if let (Ok(start), Ok(end)) = (parts[0].parse::<i64>(), parts[1].parse::<i64>()) {
        let padded = |s: &str| s.trim_start_matches('-').len() > 1 && s.trim_start_matches('-').starts_with('0');
        let width = if padded(parts[0]) || padded(parts[1]) {
            parts[0].len().max(parts[1].len())
        } else {
            0
        };
        return Some(
            stepped(start, end, step)?
                .map(|n| {
                    if n < 0 {
                        format!("-{:0>w$}", n.unsigned_abs(), w = width.saturating_sub(1))
                    } else {
                        format!("{:0>w$}", n, w = width)
                    }
                })
                .collect(),
        );
    }

    let single = |s: &str| {
        let mut it = s.chars();
        match (it.next(), it.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Some(c),
            _ => None,
        }
    };
    let (start, end) = (single(parts[0])?, single(parts[1])?);
    Some(
        stepped(i64::from(u32::from(start)), i64::from(u32::from(end)), step)?
            .filter_map(|n| u32::try_from(n).ok().and_then(char::from_u32))
            .map(String::from)
            .collect(),
    )
}

/// Values from `start` towards `end` by `step`, or `None` past [`MAX_SEQUENCE`].
fn stepped(start: i64, end: i64, step: u64) -> Option<impl Iterator<Item = i64>> {
    let count = start.abs_diff(end) / step + 1;
    if count > MAX_SEQUENCE {
        return None;
    }
    let direction: i128 = if start <= end { 1 } else { -1 };
    Some((0..count).filter_map(move |i| {
        let value = i128::from(start) + direction * i128::from(i) * i128::from(step);
        i64::try_from(value).ok()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_lists() {
        assert_eq!(expand("/{a,b}"), vec!["/a", "/b"]);
        assert_eq!(expand("{a,b}{1,2}"), vec!["a1", "a2", "b1", "b2"]);
        assert_eq!(expand("x{,y}"), vec!["x", "xy"]);
    }

    #[test]
    fn test_nested_groups() {
        assert_eq!(expand("{a,{b,c}}"), vec!["a", "b", "c"]);
        assert_eq!(expand("{a{b,c}}"), vec!["{ab}", "{ac}"]);
    }

    #[test]
    fn test_literal_braces() {
        assert_eq!(expand("{test"), vec!["{test"]);
        assert_eq!(expand("test}"), vec!["test}"]);
        assert_eq!(expand("{a}"), vec!["{a}"]);
        assert_eq!(expand("\\{a,b\\}"), vec!["\\{a,b\\}"]);
        assert_eq!(expand(""), vec![""]);
    }

    #[test]
    fn test_sequences() {
        assert_eq!(expand("{1..3}"), vec!["1", "2", "3"]);
        assert_eq!(expand("{3..1}"), vec!["3", "2", "1"]);
        assert_eq!(expand("{0..6..3}"), vec!["0", "3", "6"]);
        assert_eq!(expand("{08..10}"), vec!["08", "09", "10"]);
        assert_eq!(expand("{a..c}"), vec!["a", "b", "c"]);
        assert_eq!(expand("{1..x}"), vec!["{1..x}"]);
        assert_eq!(expand("{-2..-1}"), vec!["-2", "-1"]);
    }

    #[test]
    fn test_extreme_ranges_do_not_overflow() {
        assert_eq!(
            expand("/{-9223372036854775808..9223372036854775807..9223372036854775807}"),
            vec!["/-9223372036854775808", "/-1", "/9223372036854775806"]
        );
        assert_eq!(
            expand("{9223372036854775807..-9223372036854775808..-9223372036854775808}"),
            vec!["9223372036854775807", "-1"]
        );
    }

    #[test]
    fn test_oversized_ranges_stay_literal() {
        assert_eq!(expand("/{0..9999999999}"), vec!["/{0..9999999999}"]);
        assert_eq!(expand("/{1..10000}").len(), 10_000);
        assert_eq!(expand("/{0..10000}"), vec!["/{0..10000}"]);
    }

    #[test]
    fn test_rule_expansion_order_and_count() {
        let mut rule = Rule::new("/{a,b}").method("{GET,POST}");
        rule.headers.push(HeaderSpec::Name("n".to_string()));
        rule.headers.push(HeaderSpec::Pairs(vec![(
            "{x,y}".to_string(),
            "*".to_string(),
        )]));

        let rules = expand_rule(&rule);
        assert_eq!(rules.len(), 8);
        assert_eq!(rules[0].url, "/a");
        assert_eq!(rules[0].method.as_deref(), Some("GET"));
        assert_eq!(
            rules[0].headers,
            vec![
                HeaderSpec::Name("n".to_string()),
                HeaderSpec::Pairs(vec![("x".to_string(), "*".to_string())])
            ]
        );
        assert_eq!(rules[7].url, "/b");
        assert_eq!(rules[7].method.as_deref(), Some("POST"));
    }

    #[test]
    fn test_header_pairs_permute_across_keys() {
        let mut rule = Rule::new("/");
        rule.headers.push(HeaderSpec::Pairs(vec![
            ("a".to_string(), "{1,2}".to_string()),
            ("b".to_string(), "{3,4}".to_string()),
        ]));
        let rules = expand_rule(&rule);
        assert_eq!(rules.len(), 4);
        assert_eq!(
            rules[1].headers,
            vec![HeaderSpec::Pairs(vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "4".to_string())
            ])]
        );
    }
}
