//! Participant display names
//!
//! Human names are validated for length, emptiness, content and
//! uniqueness. Automated participants get names in a chosen [`NameStyle`],
//! falling back to numbering when generation keeps colliding.

use std::collections::HashSet;

use heck::ToTitleCase;
use rustrict::CensorStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::participant::{MAX_NAME_LENGTH, NAME_ATTEMPTS};

/// Generator used for automated participants' names
///
/// The payload is the number of words, two or three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, garde::Validate)]
pub enum NameStyle {
    /// `Julius Caesar` or `Gaius Julius Caesar`
    Roman(#[garde(range(min = 2, max = 3))] usize),
    /// `Brave Otter`, `Very Brave Otter`
    Petname(#[garde(range(min = 2, max = 3))] usize),
    /// Plain `Bot 1`, `Bot 2`, ...
    #[default]
    Numbered,
}

impl NameStyle {
    /// Draws a title-cased name, or `None` for [`NameStyle::Numbered`]
    pub fn generate(self) -> Option<String> {
        let name = match self {
            Self::Roman(words) => romanname::romanname(romanname::NameConfig {
                praenomen: words > 2,
            }),
            Self::Petname(words) => petname::petname(u8::try_from(words).ok()?, " ")?,
            Self::Numbered => return None,
        };
        Some(name.to_title_case())
    }
}

/// Errors that can occur during name validation
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requested name is already in use by another participant
    #[error("name already in-use")]
    Used,
    /// The name is empty or contains only whitespace
    #[error("name cannot be empty")]
    Empty,
    /// The name contains inappropriate content
    #[error("name is inappropriate")]
    Sinful,
    /// The name exceeds the maximum allowed length
    #[error("name is too long")]
    TooLong,
}

/// Set of names already given out in a round
#[derive(Debug, Default, Clone)]
pub struct Names {
    existing: HashSet<String>,
}

impl Names {
    /// Validates and reserves a human-chosen name
    ///
    /// Returns the trimmed name on success.
    ///
    /// # Errors
    ///
    /// * `Error::TooLong` - Name exceeds the maximum length
    /// * `Error::Empty` - Name is empty after trimming whitespace
    /// * `Error::Sinful` - Name contains inappropriate content
    /// * `Error::Used` - Name is already taken in this round
    pub fn claim(&mut self, name: &str) -> Result<String, Error> {
        if name.len() > MAX_NAME_LENGTH {
            return Err(Error::TooLong);
        }
        let name = rustrict::trim_whitespace(name);
        if name.is_empty() {
            return Err(Error::Empty);
        }
        if name.is_inappropriate() {
            return Err(Error::Sinful);
        }
        if !self.existing.insert(name.to_owned()) {
            return Err(Error::Used);
        }
        Ok(name.to_owned())
    }

    /// Picks a unique name for the automated participant in `seat`
    ///
    /// Generated names that collide, come back empty or are too long are
    /// retried a bounded number of times before falling back to numbering.
    pub fn automated(&mut self, seat: usize, style: NameStyle) -> String {
        for _ in 0..NAME_ATTEMPTS {
            let Some(generated) = style.generate() else {
                break;
            };
            if let Ok(name) = self.claim(&generated) {
                return name;
            }
        }

        let mut number = seat + 1;
        loop {
            let name = format!("Bot {number}");
            if self.existing.insert(name.clone()) {
                return name;
            }
            number += 1;
        }
    }
}
