// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Location assignments in a table definition.
//!
//! A definition such as
//!
//! ```text
//! CREATE ICEBERG TABLE db.s.t (...)
//!   EXTERNAL_VOLUME = 'VOL1'
//!   CATALOG = 'SNOWFLAKE'
//!   BASE_LOCATION = 'db/t1/';
//! ```
//!
//! carries three `KEY = 'value'` assignments. Each key has one rule in
//! [`RULES`]; every rule is evaluated by [`AssignmentRule::evaluate`]: a
//! quoted-value match first, then a line scan for unquoted forms.

use crate::{InspectError, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorField {
    ExternalVolume,
    Catalog,
    BaseLocation,
}

impl DescriptorField {
    pub const ALL: [DescriptorField; 3] = [
        DescriptorField::ExternalVolume,
        DescriptorField::Catalog,
        DescriptorField::BaseLocation,
    ];

    /// Assignment key as written in a definition.
    pub fn key(self) -> &'static str {
        match self {
            DescriptorField::ExternalVolume => "EXTERNAL_VOLUME",
            DescriptorField::Catalog => "CATALOG",
            DescriptorField::BaseLocation => "BASE_LOCATION",
        }
    }
}

impl fmt::Display for DescriptorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One key's extraction rule.
pub struct AssignmentRule {
    pub field: DescriptorField,
    quoted: Regex,
    token: Regex,
}

impl AssignmentRule {
    fn new(field: DescriptorField) -> Self {
        let key = regex::escape(field.key());
        let quoted = Regex::new(&format!(
            r#"(?i)\b{key}\s*=\s*(?:'([^'"]+)'|"([^'"]+)")"#
        ))
        .expect("static assignment pattern");
        let token = Regex::new(&format!(r"(?i)\b{key}\b")).expect("static token pattern");
        Self {
            field,
            quoted,
            token,
        }
    }

    /// Value assigned to this rule's key, normalized, if any.
    pub fn evaluate(&self, text: &str) -> Option<String> {
        self.quoted_value(text)
            .or_else(|| self.line_value(text))
            .map(normalize_value)
            .filter(|v| !v.is_empty())
    }

    fn quoted_value<'t>(&self, text: &'t str) -> Option<&'t str> {
        let caps = self.quoted.captures(text)?;
        caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
    }

    /// Unquoted fallback: the text after the first `=` on a line naming the key.
    fn line_value<'t>(&self, text: &'t str) -> Option<&'t str> {
        text.lines()
            .filter(|line| self.token.is_match(line))
            .filter_map(|line| line.split_once('=').map(|(_, rest)| rest))
            .map(|rest| rest.trim_matches(|c: char| c.is_whitespace() || matches!(c, '\'' | '"' | ',' | ';')))
            .find(|v| !v.is_empty())
    }
}

pub static RULES: LazyLock<Vec<AssignmentRule>> =
    LazyLock::new(|| DescriptorField::ALL.into_iter().map(AssignmentRule::new).collect());

/// Strip trailing `/` and `/*` markers.
pub fn normalize_value(value: &str) -> String {
    let mut v = value.trim();
    loop {
        if let Some(rest) = v.strip_suffix("/*") {
            v = rest;
        } else if let Some(rest) = v.strip_suffix('/') {
            v = rest;
        } else {
            break;
        }
    }
    v.to_string()
}

/// Location assignments parsed from a table definition. Any field may be
/// missing; whether that matters is up to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocationDescriptor {
    pub external_volume: Option<String>,
    pub catalog: Option<String>,
    pub base_location: Option<String>,
}

impl LocationDescriptor {
    pub fn parse(text: &str) -> Self {
        let mut descriptor = Self::default();
        for rule in RULES.iter() {
            *descriptor.slot(rule.field) = rule.evaluate(text);
        }
        descriptor
    }

    pub fn get(&self, field: DescriptorField) -> Option<&str> {
        match field {
            DescriptorField::ExternalVolume => self.external_volume.as_deref(),
            DescriptorField::Catalog => self.catalog.as_deref(),
            DescriptorField::BaseLocation => self.base_location.as_deref(),
        }
    }

    /// The field's value, or `ParseIncomplete` for callers that cannot go on
    /// without it.
    pub fn require(&self, field: DescriptorField) -> Result<&str> {
        self.get(field)
            .ok_or(InspectError::ParseIncomplete { field })
    }

    pub fn missing(&self) -> Vec<DescriptorField> {
        DescriptorField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    fn slot(&mut self, field: DescriptorField) -> &mut Option<String> {
        match field {
            DescriptorField::ExternalVolume => &mut self.external_volume,
            DescriptorField::Catalog => &mut self.catalog,
            DescriptorField::BaseLocation => &mut self.base_location,
        }
    }
}
