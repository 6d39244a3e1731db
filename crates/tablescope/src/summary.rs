// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Prompt building and summaries through a [`TextOracle`].
//!
//! Whatever goes into a prompt is first flattened to one line of text:
//! single quotes are doubled, control characters and whitespace runs become
//! one space, and the result is cut to a character budget. A failed or
//! missing oracle never fails the caller; it produces a placeholder string
//! starting with [`SKIPPED_PREFIX`].

use crate::oracle::TextOracle;
use diagnostics::*;
use regex::Regex;
use serde::Serialize;
use std::fmt::Debug;
use std::sync::LazyLock;

pub const DEFAULT_MAX_PROMPT_CHARS: usize = 3000;

pub const SKIPPED_PREFIX: &str = "AI summary skipped";

const INSTRUCTION: &str = "Can you summarize the output here in bullets?: ";

static CONTROL_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x1f\x7f-\x9f]+").expect("static control pattern"));

static SPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("static whitespace pattern"));

/// Flatten `text` for embedding in a prompt, keeping at most `max_chars`
/// characters.
pub fn sanitize_text(text: &str, max_chars: usize) -> String {
    let doubled = text.replace('\'', "''");
    let spaced = CONTROL_RUN.replace_all(&doubled, " ");
    let collapsed = SPACE_RUN.replace_all(&spaced, " ");

    let mut out: String = collapsed.chars().take(max_chars).collect();
    let trailing_quotes = out.chars().rev().take_while(|c| *c == '\'').count();
    if trailing_quotes % 2 == 1 {
        let _ = out.pop();
    }
    out
}

/// Serialize `value` as JSON (or its debug form if that fails) and sanitize.
pub fn sanitize<T: Serialize + Debug + ?Sized>(value: &T, max_chars: usize) -> String {
    let text = serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"));
    sanitize_text(&text, max_chars)
}

pub fn build_prompt<T: Serialize + Debug + ?Sized>(value: &T, max_chars: usize) -> String {
    format!("{INSTRUCTION}{}", sanitize(value, max_chars))
}

/// Ask `oracle` for a summary of `value`. Never fails: errors become a
/// placeholder naming the reason.
pub async fn summarize<T: Serialize + Debug + ?Sized + Sync>(
    oracle: &dyn TextOracle,
    value: &T,
    max_chars: usize,
) -> String {
    let prompt = build_prompt(value, max_chars);
    match oracle.complete(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            let reason = e.to_string();
            warn!("Summary unavailable: {reason}", reason: &reason);
            format!("{SKIPPED_PREFIX}: {reason}")
        }
    }
}
