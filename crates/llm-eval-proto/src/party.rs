//! Typed party configuration.
//!
//! A party configuration describes the attendees of a chat session. Only the
//! attendee list and each attendee's instruction text are interpreted here;
//! every other key of the template is carried through untouched so that a
//! compiled configuration serializes back to the same document with only
//! the instruction texts replaced.

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

/// A complete party configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyConfig {
    /// Session attendees, in slot order.
    pub attendees: Vec<Attendee>,

    /// Template keys this crate does not interpret.
    #[serde(flatten)]
    pub extra: Mapping,
}

/// One participant slot in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    /// Role played by this attendee (e.g., "ai", "client").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// The attendee's initial instruction.
    pub instruction: Instruction,

    #[serde(flatten)]
    pub extra: Mapping,
}

/// Initial instruction given to an attendee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The instruction text.
    #[serde(default)]
    pub text: String,

    #[serde(flatten)]
    pub extra: Mapping,
}

impl PartyConfig {
    /// Parses a party configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Serializes the configuration back to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Returns the number of attendee slots.
    pub fn attendee_count(&self) -> usize {
        self.attendees.len()
    }

    /// Returns the role of each attendee, falling back to the slot index.
    pub fn role_labels(&self) -> Vec<String> {
        self.attendees
            .iter()
            .enumerate()
            .map(|(i, a)| a.role.clone().unwrap_or_else(|| format!("attendee-{i}")))
            .collect()
    }
}
