// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/core/parser.rs
//!
//! Places description file parser
//!
//! Describes backends and their places in the `key = a, b, c` style:
//!
//! ```text
//! # Password keyrings
//! backend = gnome-keyring, Passwords, Stored secrets
//! place = secret-service:///login, Login, Unlocked at login, keyring, editable
//!
//! backend = openpgp, PGP Keys, GnuPG
//! place = gnupg://, GnuPG keys, Your GnuPG keyring
//! ```
//!
//! - `backend = <name>, <label>[, <description>]` (name `-` means unnamed)
//! - `place = <uri>, <label>[, <description>[, <icon>[, editable]]]`
//!
//! A place belongs to the nearest backend above it. Blank lines and `#`
//! comments are skipped. Line numbers in errors start at 1.

use nom::{
    bytes::complete::{take_while, take_while1},
    character::complete::{char, space0},
    multi::separated_list1,
    IResult, Parser,
};
use thiserror::Error;

use crate::core::types::PlaceInfo;

/// Parse errors with line number context
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ParseError {
    #[error("Parse error on line {line}: {message}")]
    InvalidSyntax { line: usize, message: String },

    #[error("Place on line {line} is not preceded by a backend")]
    OrphanPlace { line: usize },
}

/// A backend and its places as written in the file
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BackendSection {
    pub name: Option<String>,
    pub label: String,
    pub description: String,
    pub places: Vec<PlaceInfo>,
}

/// One meaningful line of the file
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Entry {
    Backend {
        name: Option<String>,
        label: String,
        description: String,
    },
    Place(PlaceInfo),
}

/// Parses a complete places file
///
/// # Example
/// ```
/// use keyring_sidebar::core::parser::parse_places_file;
///
/// let sections = parse_places_file("backend = openssh, SSH\nplace = file:///home/me/.ssh, Keys\n")?;
/// assert_eq!(sections.len(), 1);
/// assert_eq!(sections[0].places[0].label, "Keys");
/// # Ok::<(), keyring_sidebar::core::parser::ParseError>(())
/// ```
pub fn parse_places_file(content: &str) -> Result<Vec<BackendSection>, ParseError> {
    let mut sections: Vec<BackendSection> = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_num = index + 1;

        let line_trimmed = line.trim();
        if line_trimmed.is_empty() || line_trimmed.starts_with('#') {
            continue;
        }

        let entry = match parse_line(line_trimmed) {
            Ok((_, (key, fields))) => build_entry(key, &fields, line_num)?,
            Err(e) => {
                return Err(ParseError::InvalidSyntax {
                    line: line_num,
                    message: format!("{:?}", e),
                });
            }
        };

        match entry {
            Entry::Backend {
                name,
                label,
                description,
            } => sections.push(BackendSection {
                name,
                label,
                description,
                places: Vec::new(),
            }),
            Entry::Place(info) => match sections.last_mut() {
                Some(backend) => backend.places.push(info),
                None => return Err(ParseError::OrphanPlace { line: line_num }),
            },
        }
    }

    Ok(sections)
}

/// Splits `<key> = <field>, <field>, ...` into the key and raw fields
///
/// Any identifier is accepted as key; unknown keys are rejected later with
/// a readable message.
pub fn parse_line(input: &str) -> IResult<&str, (&str, Vec<&str>)> {
    let (input, key) = parse_key(input)?;
    let (input, _) = (space0, char('='), space0).parse(input)?;
    let (input, fields) = parse_fields(input)?;
    Ok((input, (key, fields)))
}

fn parse_key(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-').parse(input)
}

/// Comma separated fields, untrimmed; empty fields are kept
pub fn parse_fields(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char(','), take_while(|c: char| c != ',')).parse(input)
}

fn build_entry(key: &str, fields: &[&str], line: usize) -> Result<Entry, ParseError> {
    let fields: Vec<&str> = fields.iter().map(|field| field.trim()).collect();

    let invalid = |message: String| ParseError::InvalidSyntax { line, message };

    match key {
        "backend" => {
            if !(2..=3).contains(&fields.len()) {
                return Err(invalid(format!(
                    "backend expects 2 or 3 fields, found {}",
                    fields.len()
                )));
            }
            let name = match fields[0] {
                "" => return Err(invalid("backend name is empty".to_string())),
                "-" => None,
                name => Some(name.to_string()),
            };
            Ok(Entry::Backend {
                name,
                label: fields[1].to_string(),
                description: fields.get(2).map(|s| s.to_string()).unwrap_or_default(),
            })
        }
        "place" => {
            if !(2..=5).contains(&fields.len()) {
                return Err(invalid(format!(
                    "place expects 2 to 5 fields, found {}",
                    fields.len()
                )));
            }
            if fields[0].is_empty() {
                return Err(invalid("place uri is empty".to_string()));
            }

            let editable = match fields.get(4).copied() {
                None | Some("") => false,
                Some("editable") => true,
                Some(other) => {
                    return Err(invalid(format!("unknown place flag '{}'", other)));
                }
            };

            let mut info = PlaceInfo::new(fields[0], fields[1]).editable(editable);
            if let Some(description) = fields.get(2) {
                info.description = description.to_string();
            }
            if let Some(icon) = fields.get(3).filter(|icon| !icon.is_empty()) {
                info.icon = Some(icon.to_string());
            }
            Ok(Entry::Place(info))
        }
        other => Err(invalid(format!("unknown key '{}'", other))),
    }
}
