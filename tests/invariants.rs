//! Properties that must hold for every input and option combination:
//! output parses back to the same values, strings survive verbatim, no
//! line carries trailing whitespace, and reformatting is stable.

use tidyjson::{CommentPolicy, FormatOptions, Formatter};

const PLAIN_CORPUS: &[&str] = &[
    "[]",
    "{}",
    "null",
    "[1, 2.1, 3, -99]",
    r#"{"a": 1, "b": [1, 2, 3], "c": {"x": true, "y": null}, "d": "text"}"#,
    r#"[{"x": 1, "y": 2}, {"x": 10, "y": 20}, {"x": 100, "y": 200}]"#,
    r#"[[1.5, 22], [10, 3.25], [100, 0.5]]"#,
    r#"[[], {}, [1], {"lone": 0}]"#,
    r#"{"deep": {"deeper": {"deepest": [[1, 2], [3, 4], [5, 6]]}}}"#,
    r#"["strings", "of", "various", "lengths", "including a rather long one indeed"]"#,
    r#"[0.0001, 123456.789, -0.5, 1e10, 2E-3]"#,
    r#"{"escaped": "a\"b\\c\nd", "unicode": "A"}"#,
];

fn option_variants() -> Vec<FormatOptions> {
    let default = FormatOptions::default();

    let mut narrow = FormatOptions::default();
    narrow.max_total_line_length = 30;

    let mut tight = FormatOptions::default();
    tight.max_total_line_length = 60;
    tight.indent_spaces = 2;
    tight.max_inline_complexity = 1;

    let mut padded = FormatOptions::default();
    padded.simple_bracket_padding = true;
    padded.comma_padding = false;

    let mut tabs = FormatOptions::default();
    tabs.use_tab_to_indent = true;
    tabs.always_expand_depth = 0;

    vec![default, narrow, tight, padded, tabs]
}

#[test]
fn output_parses_back_to_equal_values() {
    for opts in option_variants() {
        for input in PLAIN_CORPUS {
            let mut fmt = Formatter::new();
            fmt.options = opts.clone();
            let out = fmt.reformat(input, 0).unwrap();

            let before: serde_json::Value = serde_json::from_str(input).unwrap();
            let after: serde_json::Value = serde_json::from_str(&out)
                .unwrap_or_else(|e| panic!("unparseable output for {input}: {e}\n{out}"));
            assert_eq!(before, after, "value drift for {input}");
        }
    }
}

#[test]
fn string_literals_survive_verbatim() {
    let input = r#"{"key with  spaces": "value\twith\"escapes", "other": "日本語 text"}"#;
    for opts in option_variants() {
        let mut fmt = Formatter::new();
        fmt.options = opts;
        let out = fmt.reformat(input, 0).unwrap();
        for literal in [
            r#""key with  spaces""#,
            r#""value\twith\"escapes""#,
            r#""日本語 text""#,
        ] {
            assert!(out.contains(literal), "{literal} lost in:\n{out}");
        }
    }
}

#[test]
fn no_line_ends_with_whitespace() {
    for opts in option_variants() {
        for input in PLAIN_CORPUS {
            let mut fmt = Formatter::new();
            fmt.options = opts.clone();
            let out = fmt.reformat(input, 0).unwrap();
            for line in out.lines() {
                assert!(
                    !line.ends_with(' ') && !line.ends_with('\t'),
                    "trailing whitespace in {line:?}"
                );
            }
        }
    }
}

#[test]
fn reformatting_is_idempotent() {
    for opts in option_variants() {
        for input in PLAIN_CORPUS {
            let mut fmt = Formatter::new();
            fmt.options = opts.clone();
            let first = fmt.reformat(input, 0).unwrap();
            let second = fmt.reformat(&first, 0).unwrap();
            assert_eq!(first, second, "unstable reformat of {input}");
        }
    }
}

#[test]
fn format_minify_format_round_trips() {
    for opts in option_variants() {
        for input in PLAIN_CORPUS {
            let mut fmt = Formatter::new();
            fmt.options = opts.clone();
            let first = fmt.reformat(input, 0).unwrap();
            let minified = fmt.minify(&first).unwrap();
            assert!(!minified.contains('\n'), "comment-free minify is one line");
            let again = fmt.reformat(&minified, 0).unwrap();
            assert_eq!(first, again, "minify round trip drifts for {input}");
        }
    }
}

#[test]
fn expand_everything_then_format_returns_home() {
    for input in PLAIN_CORPUS {
        let mut fmt = Formatter::new();
        let first = fmt.reformat(input, 0).unwrap();

        let mut exploded = Formatter::new();
        exploded.options.max_inline_complexity = -1;
        exploded.options.max_compact_array_complexity = -1;
        exploded.options.max_table_row_complexity = -1;
        let expanded = exploded.reformat(input, 0).unwrap();

        let back = fmt.reformat(&expanded, 0).unwrap();
        assert_eq!(first, back, "expanded round trip drifts for {input}");
    }
}

#[test]
fn commented_documents_reformat_stably() {
    let corpus = [
        "[ /*a*/ 1 /*b*/, 2 /*c*/ ]",
        "{\n  // leading\n  \"a\": 1, // trailing\n  \"b\": 2\n}",
        "[\n  1,\n\n  2\n]",
        "{\"a\": /*mid*/ 5}",
        "[\n  /* standalone\n     block */\n  7\n]",
    ];
    for input in corpus {
        let mut fmt = Formatter::new();
        fmt.options.comment_policy = CommentPolicy::Preserve;
        fmt.options.preserve_blank_lines = true;
        let first = fmt.reformat(input, 0).unwrap();
        let second = fmt.reformat(&first, 0).unwrap();
        assert_eq!(first, second, "unstable with comments: {input}");

        let minified = fmt.minify(input).unwrap();
        for marker in ["/*", "//"] {
            assert_eq!(
                input.matches(marker).count(),
                minified.matches(marker).count(),
                "comment lost minifying {input}"
            );
        }
    }
}

#[test]
fn line_length_limit_is_respected_or_unbreakable() {
    let input = r#"{"list": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10], "name": "mid", "nested": {"a": [true, false]}}"#;
    for width in [20, 40, 60, 80] {
        let mut fmt = Formatter::new();
        fmt.options.max_total_line_length = width;
        let out = fmt.reformat(input, 0).unwrap();
        for line in out.lines() {
            // A line over the limit must be a single unbreakable element:
            // at most one top-level comma.
            if line.len() > width {
                let depth_zero_commas = {
                    let mut depth = 0usize;
                    let mut commas = 0usize;
                    let mut in_string = false;
                    let mut escaped = false;
                    for ch in line.chars() {
                        match ch {
                            _ if escaped => escaped = false,
                            '\\' if in_string => escaped = true,
                            '"' => in_string = !in_string,
                            '[' | '{' if !in_string => depth += 1,
                            ']' | '}' if !in_string => depth = depth.saturating_sub(1),
                            ',' if !in_string && depth <= 1 => commas += 1,
                            _ => {}
                        }
                    }
                    commas
                };
                assert!(
                    depth_zero_commas <= 1,
                    "overlong line packs multiple elements: {line:?}"
                );
            }
        }
    }
}
