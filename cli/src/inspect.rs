//! Non-interactive subcommands: print segments, boundary lookups and decorations.

use std::fmt::Write as _;
use std::io::Read;

use anyhow::Context;
use hanseg_protocol::DecorationRange;
use hanseg_protocol::Direction;
use hanseg_protocol::WordSpan;
use hanseg_tui::host::Document;
use hanseg_tui::host::TextBuffer;
use hanseg_tui::segmentation::Tokenizer;
use hanseg_tui::segmentation::build_decorations;
use hanseg_tui::segmentation::find_adjacent_word;
use hanseg_tui::segmentation::find_word_at;
use serde::Serialize;

/// `text`, or all of stdin when absent (one trailing newline dropped).
pub fn read_input(text: Option<String>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("read text from stdin")?;
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
    Ok(buf)
}

pub fn segment_report(tokenizer: &dyn Tokenizer, text: &str, json: bool) -> anyhow::Result<String> {
    let segments = tokenizer.segment(text);
    if json {
        return serde_json::to_string_pretty(&segments).context("serialize segments");
    }
    let mut out = String::new();
    for segment in &segments {
        let _ = writeln!(out, "{}..{}\t{:?}", segment.start, segment.end, segment.text);
    }
    Ok(out)
}

#[derive(Debug, Serialize)]
struct WordReport {
    at: usize,
    word: Option<WordSpan>,
    previous: Option<WordSpan>,
    next: Option<WordSpan>,
}

/// The word under `at` and its neighbors in a single line of text.
pub fn word_report(
    tokenizer: &dyn Tokenizer,
    text: &str,
    at: usize,
    json: bool,
) -> anyhow::Result<String> {
    if text.contains('\n') {
        anyhow::bail!("`word` looks up boundaries within one line; the text contains a newline");
    }
    if at > text.len() || !text.is_char_boundary(at) {
        anyhow::bail!(
            "offset {at} is not a char boundary of the {}-byte text",
            text.len()
        );
    }

    let report = WordReport {
        at,
        word: find_word_at(tokenizer, text, at),
        previous: find_adjacent_word(tokenizer, text, at, Direction::Backward),
        next: find_adjacent_word(tokenizer, text, at, Direction::Forward),
    };
    if json {
        return serde_json::to_string_pretty(&report).context("serialize word report");
    }

    let describe = |span: &Option<WordSpan>| match span {
        Some(span) => format!("{} [{}, {})", span.word, span.from, span.to),
        None => "-".to_string(),
    };
    Ok(format!(
        "at: {at}\nword: {}\nprevious: {}\nnext: {}\n",
        describe(&report.word),
        describe(&report.previous),
        describe(&report.next),
    ))
}

#[derive(Debug, Serialize)]
struct DecorationEntry<'a> {
    #[serde(flatten)]
    range: DecorationRange,
    text: &'a str,
}

/// Decorations of `text` treated as one visible range.
pub fn decorate_report(
    tokenizer: &dyn Tokenizer,
    text: &str,
    json: bool,
) -> anyhow::Result<String> {
    let doc = TextBuffer::new(text);
    let decorations = build_decorations(tokenizer, &doc, &[0..doc.len()]);
    let entries: Vec<DecorationEntry<'_>> = decorations
        .iter()
        .map(|&range| DecorationEntry {
            range,
            text: &doc.text()[range.range()],
        })
        .collect();

    if json {
        return serde_json::to_string_pretty(&entries).context("serialize decorations");
    }
    let mut out = String::new();
    for entry in &entries {
        let _ = writeln!(
            out,
            "{}..{}\t{:?}",
            entry.range.from, entry.range.to, entry.text
        );
    }
    Ok(out)
}
