use super::*;

fn raw() -> RawResponse {
    RawResponse::default()
}

fn clean(text: &str) -> String {
    sanitize(text, Some(&raw()))
}

#[test]
fn test_no_raw_returns_text_unchanged() {
    let text = "  ```json\n{\"bdata\": \"AAAA\"}\n```  ";
    assert_eq!(sanitize(text, None), text);
}

#[test]
fn test_plain_prose_untouched() {
    let text = "The derivative of x^2 is 2x.\n\nIntegrating gives x^3/3 + C.";
    assert_eq!(clean(text), text);
}

#[test]
fn test_fenced_block_with_long_bdata_removed() {
    let blob = "A".repeat(500);
    let text = format!(
        "Here is your plot.\n\n```json\n{{\"x\": {{\"bdata\": \"{blob}\", \"dtype\": \"f8\"}}}}\n```\n\nThe curve is a parabola."
    );
    assert_eq!(clean(&text), "Here is your plot.\n\nThe curve is a parabola.");
}

#[test]
fn test_fenced_block_without_keywords_kept() {
    let text = "Try this:\n```python\nprint(1 + 1)\n```";
    assert_eq!(clean(text), text);
}

#[test]
fn test_bare_brace_span_with_plot_data_removed() {
    let text = "The result:\n{\"plot_data\": {\"data\": [{\"x\": [1, 2]}]}, \"success\": true}\nAs you can see, it grows.";
    assert_eq!(clean(text), "The result:\n\nAs you can see, it grows.");
}

#[test]
fn test_brace_span_without_keywords_kept() {
    let text = "The set {1, 2, 3} has three elements.";
    assert_eq!(clean(text), text);
}

#[test]
fn test_brace_inside_string_does_not_close_span() {
    let text = "Before {\"title\": \"a } b\", \"equations\": [\"x\"]} after";
    assert_eq!(clean(text), "Before  after");
}

#[test]
fn test_unbalanced_brace_left_alone() {
    let text = "Open brace { never closes";
    assert_eq!(clean(text), text);
}

#[test]
fn test_unterminated_bdata_pair_removed() {
    assert_eq!(clean("Data follows \"bdata\": \"QUJD"), "Data follows");
}

#[test]
fn test_single_quoted_long_value_removed() {
    let text = "payload 'bdata': 'QUJDREVGR0hJSktMTU5PUFFSU1RVVldY' end";
    assert_eq!(clean(text), "payload  end");
}

#[test]
fn test_standalone_blob_line_dropped() {
    let blob = "QUJD".repeat(15);
    let text = format!("Encoded:\n{blob}\nDone.");
    assert_eq!(clean(&text), "Encoded:\nDone.");
}

#[test]
fn test_blob_line_length_threshold() {
    let short = "A".repeat(39);
    let text = format!("a\n{short}\nb");
    assert_eq!(clean(&text), text);

    let long = "A".repeat(40);
    assert_eq!(clean(&format!("a\n{long}\nb")), "a\nb");
}

#[test]
fn test_inline_blob_length_threshold() {
    let short = "A".repeat(99);
    let text = format!("see {short} x");
    assert_eq!(clean(&text), text);

    let long = "A".repeat(100);
    assert_eq!(clean(&format!("see {long} x")), "see  x");
}

#[test]
fn test_long_payload_value_threshold() {
    let short = "A".repeat(19);
    let text = format!("k bdata = {short} end");
    assert_eq!(clean(&text), text);

    let long = "A".repeat(20);
    assert_eq!(clean(&format!("k bdata = {long} end")), "k  end");
}

/// Eleven lines with attribute lines at `positions` and prose elsewhere.
fn attribute_lines_at(positions: &[usize]) -> Vec<String> {
    let keys = ["mode: lines", "name: trace", "type: scatter"];
    let mut keys = keys.iter();
    (0..11)
        .map(|i| {
            if positions.contains(&i) {
                keys.next().map(|k| k.to_string()).unwrap_or_default()
            } else {
                format!("p{i}")
            }
        })
        .collect()
}

#[test]
fn test_attribute_window_spans_ten_lines() {
    // Anchor at line 0 sees lines 0..=9, so the third match at line 9 counts
    // and lines 0..=2 are dropped.
    let lines = attribute_lines_at(&[0, 5, 9]);
    assert_eq!(clean(&lines.join("\n")), lines[3..].join("\n"));

    // A match at line 10 falls outside the window.
    let text = attribute_lines_at(&[0, 5, 10]).join("\n");
    assert_eq!(clean(&text), text);
}

#[test]
fn test_payload_key_line_dropped() {
    assert_eq!(
        clean("Circuit ready.\nimage_data:\nEnjoy."),
        "Circuit ready.\nEnjoy."
    );
}

#[test]
fn test_attribute_run_dropped() {
    let text = "Here is the trace:\n  \"type\": \"scatter\",\n  \"mode\": \"lines\",\n  \"name\": \"y = x^2\",\nThat is all.";
    assert_eq!(clean(text), "Here is the trace:\nThat is all.");
}

#[test]
fn test_two_attribute_lines_kept() {
    let text = "Reader profile\nname: Ada\ntype: essay\nThanks";
    assert_eq!(clean(text), text);
}

#[test]
fn test_attribute_run_consumes_lines_contiguously() {
    // Three matches in the window starting at "x: 1" drop the first three
    // lines, including the prose line between them.
    let text = "x: 1\nSome prose\ny: 2\nmode: lines\nFinal words\nMore words";
    assert_eq!(clean(text), "mode: lines\nFinal words\nMore words");
}

#[test]
fn test_leftover_keyword_pairs_removed() {
    let out = clean("Settings \"dtype\": \"f8\", \"mode\": \"lines\" end");
    assert!(out.starts_with("Settings"));
    assert!(out.ends_with("end"));
    assert!(!out.contains("dtype"));
    assert!(!out.contains("mode"));
}

#[test]
fn test_commas_and_empty_brackets_collapsed() {
    assert_eq!(clean("Values: [ ] and {}, , done"), "Values:  and , done");
}

#[test]
fn test_blank_runs_collapsed() {
    assert_eq!(clean("one\n\n\n\n\ntwo"), "one\n\ntwo");
    assert_eq!(clean("one\n\ntwo"), "one\n\ntwo");
}

#[test]
fn test_long_inline_blob_removed() {
    let blob = "QUJD".repeat(30);
    let text = format!("see {blob} here");
    assert_eq!(clean(&text), "see  here");
}

#[test]
fn test_full_plotly_echo_removed() {
    let text = r#"I plotted y = x^2 for you.

{"success": true, "plot_data": {"data": [{"mode": "lines", "name": "x^2", "type": "scatter",
"x": {"bdata": "AAAAAAAA8D8AAAAAAAAAQA==", "dtype": "f8"},
"y": {"bdata": "AAAAAAAA8D8AAAAAAAAQQA==", "dtype": "f8"}}],
"layout": {"title": {"text": "Parabola"}}}, "equations": ["x**2"], "x_range": [-10, 10]}

Notice the vertex at the origin."#;
    assert_eq!(
        clean(text),
        "I plotted y = x^2 for you.\n\nNotice the vertex at the origin."
    );
}

#[test]
fn test_sanitize_is_stable_on_clean_output() {
    let text = "Here is your plot.\n\n```\n{\"bdata\": \"QUJD\"}\n```\n\nDone.";
    let once = clean(text);
    assert_eq!(clean(&once), once);
}
