use super::{
    escape, parse, parse_pair, parse_route, parse_unit, Class, MatchForm, NodeKind, Parsed,
    Pattern, StartRule,
};
use crate::error::Error;

fn column_of(input: &str) -> usize {
    match parse_route(input) {
        Err(Error::Syntax { column, .. }) => column,
        other => panic!("expected syntax error for {:?}, got {:?}", input, other),
    }
}

fn segment_patterns(input: &str) -> Vec<Pattern> {
    parse_route(input)
        .expect("route should parse")
        .into_iter()
        .filter_map(|node| match node {
            NodeKind::Segment(p) => Some(p),
            _ => None,
        })
        .collect()
}

#[test]
fn test_path_splits_into_segments_and_end_marker() {
    let segments = segment_patterns("/a/b");
    let originals: Vec<&str> = segments.iter().map(Pattern::original).collect();
    assert_eq!(originals, vec!["", "a", "b", ""]);
    assert_eq!(segments[3].class(), Class::Null);
    assert_eq!(segments[1].form(), &MatchForm::Exact("a".to_string()));
}

#[test]
fn test_empty_pattern_is_single_empty_segment() {
    let nodes = parse_route("").expect("empty route parses");
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0], NodeKind::Segment(Pattern::absolute("")));
    assert!(nodes[1].is_path_end());
}

#[test]
fn test_classification_follows_most_permissive_atom() {
    let cases = [
        ("abc", Class::Absolute),
        ("a(b)c", Class::Conditional),
        ("a[b]c", Class::Conditional),
        ("a[b]*", Class::Variable),
        ("a[b](c)*d**", Class::Glob),
        ("**.js", Class::Glob),
    ];
    for (input, class) in cases {
        let segments = segment_patterns(input);
        assert_eq!(segments[0].class(), class, "class of {}", input);
    }
}

#[test]
fn test_regex_synthesis() {
    let segments = segment_patterns("a.(\\d+)[x|y]*");
    assert_eq!(
        segments[0].form(),
        &MatchForm::Regex("^(?:a\\x{2E}(\\d+)(?:x|y)([^/]*))$".to_string())
    );
    assert_eq!(segments[0].original(), "a.(\\d+)[x|y]*");

    let glob = segment_patterns("**");
    assert_eq!(glob[0].form(), &MatchForm::Regex("^(?:(.*))$".to_string()));
}

#[test]
fn test_escape_keeps_alphanumerics_and_dash() {
    assert_eq!(escape("a-Z9"), "a-Z9");
    assert_eq!(escape("a.b"), "a\\x{2E}b");
    assert_eq!(escape("é"), "\\x{E9}");
}

#[test]
fn test_escaped_reserved_characters_are_literal() {
    let segments = segment_patterns("\\(test\\*");
    assert_eq!(segments[0].class(), Class::Absolute);
    assert_eq!(segments[0].original(), "\\(test\\*");
    assert_eq!(segments[0].form(), &MatchForm::Exact("(test*".to_string()));
}

#[test]
fn test_escapes_keep_literals_apart_from_groups() {
    let escaped = &segment_patterns("[a]\\(b\\)")[0];
    let grouped = &segment_patterns("[a](b)")[0];
    assert_eq!(escaped.original(), "[a]\\(b\\)");
    assert!(!escaped.same_as(grouped));
    assert_eq!(Pattern::absolute("a/b").original(), "a\\/b");
}

#[test]
fn test_legal_patterns() {
    for input in [
        "{test",
        "test}",
        "(a(b))",
        "[a(b)]",
        "[[a-z]+]",
        "a[b](c)*d**",
        "**.js",
        "\\(test",
        "/a/**?x=*&y#frag",
    ] {
        assert!(parse_route(input).is_ok(), "{} should parse", input);
    }
}

#[test]
fn test_error_columns_point_at_furthest_failure() {
    let cases = [
        ("(test", 6),
        ("test)", 5),
        ("/a=b", 3),
        ("?a/b", 3),
        ("#a?b", 3),
        ("(()", 4),
        ("())", 3),
        ("[(]", 3),
        ("[)]", 2),
        ("(])", 2),
        ("([)", 3),
        ("[]]", 3),
        ("[[]", 4),
    ];
    for (input, column) in cases {
        assert_eq!(column_of(input), column, "column for {:?}", input);
    }
}

#[test]
fn test_error_message_lists_found_character() {
    let err = parse_route("test)").expect_err("unbalanced paren");
    let text = err.to_string();
    assert!(text.starts_with("in URL pattern `test)` at column 5, expected "));
    assert!(text.ends_with("but \")\" found"), "{}", text);

    let err = parse_route("(test").expect_err("unterminated group");
    assert!(err.to_string().ends_with("but end of input found"));
}

#[test]
fn test_triple_star_is_rejected() {
    for input in ["***", "/a/***", "a***b"] {
        let err = parse_route(input).expect_err("*** must fail");
        match err {
            Error::Syntax { message, .. } => {
                assert_eq!(message, "\"***\" is not a valid pattern")
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
    assert_eq!(column_of("/a/***"), 4);
}

#[test]
fn test_glob_outside_segments_is_rejected() {
    for input in ["?a=**", "?**", "#**"] {
        match parse_route(input) {
            Err(Error::Syntax { message, .. }) => {
                assert_eq!(message, "glob patterns are only allowed in segments")
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
    assert!(parse_unit("**").is_err());
}

#[test]
fn test_query_pairs_and_defaults() {
    let nodes = parse_route("/x?a&b=1&c=*").expect("parses");
    let pairs: Vec<_> = nodes.iter().filter_map(NodeKind::pair).collect();
    assert_eq!(pairs.len(), 3);
    assert!(pairs[0].implicit_value());
    assert_eq!(pairs[0].value().class(), Class::Variable);
    assert_eq!(
        pairs[0].value().form(),
        &MatchForm::Regex("^([^/]*)$".to_string())
    );
    assert_eq!(pairs[1].value().class(), Class::Absolute);
    assert_eq!(pairs[2].value().class(), Class::Variable);
    assert!(!pairs[2].implicit_value());
}

#[test]
fn test_fragment_node_follows_queries() {
    let nodes = parse_route("/x?a#top").expect("parses");
    assert!(matches!(nodes.last(), Some(NodeKind::Fragment(p)) if p.original() == "top"));
}

#[test]
fn test_start_rules() {
    assert!(matches!(parse("GET", StartRule::Method), Ok(Parsed::Pattern(_))));
    assert!(matches!(parse("a=b", StartRule::Pair), Ok(Parsed::Pair(_))));
    assert!(parse("a/b", StartRule::Key).is_err());
    let pair = parse_pair("k").expect("bare key");
    assert!(pair.implicit_value());
}

#[test]
fn test_invalid_regex_body_is_a_syntax_error() {
    match parse_route("/(a{2,1})") {
        Err(Error::Syntax { column, message, .. }) => {
            assert_eq!(column, 2);
            assert!(message.starts_with("invalid regular expression"));
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_parsing_is_deterministic() {
    let input = "/a/(\\d+)/*/**?k=[a-z]+#f";
    assert_eq!(parse_route(input), parse_route(input));
}
