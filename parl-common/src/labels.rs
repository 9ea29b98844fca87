//! Label classification for the AI axis and the human axis
//!
//! Both axes are closed enumerations. Absence always maps to a defined
//! default label, so every entity carries exactly one label per axis.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::model::{Analysis, DetailDocument};
use crate::text::{collapse_whitespace, is_missing, normalize};

/// Label texts that take part in AI/human mismatch detection
const COMPARABLE: [&str; 3] = ["OUI", "INCERTAIN", "NON"];

/// Classification produced by the AI analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiLabel {
    Oui,
    Incertain,
    Non,
    ErreurJson,
    NonAnalyse,
}

impl AiLabel {
    /// Matrix column order
    pub const ALL: [AiLabel; 5] = [
        AiLabel::Oui,
        AiLabel::Incertain,
        AiLabel::Non,
        AiLabel::ErreurJson,
        AiLabel::NonAnalyse,
    ];

    /// Classifies a raw status text (trimmed, uppercased, exact match).
    pub fn from_status(status: Option<&str>) -> Self {
        let normalized = status.unwrap_or_default().trim().to_uppercase();
        match normalized.as_str() {
            "OUI" => AiLabel::Oui,
            "NON" => AiLabel::Non,
            "INCERTAIN" => AiLabel::Incertain,
            "ERREUR JSON" => AiLabel::ErreurJson,
            _ => AiLabel::NonAnalyse,
        }
    }

    /// Classifies an analysis block; no analysis means "Non analyse".
    pub fn from_analysis(analysis: Option<&Analysis>) -> Self {
        Self::from_status(analysis.and_then(Analysis::raw_status))
    }

    /// Classifies an optional detail document.
    pub fn from_details(details: Option<&DetailDocument>) -> Self {
        Self::from_analysis(details.and_then(|d| d.analysis.as_ref()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AiLabel::Oui => "OUI",
            AiLabel::Incertain => "INCERTAIN",
            AiLabel::Non => "NON",
            AiLabel::ErreurJson => "ERREUR JSON",
            AiLabel::NonAnalyse => "Non analyse",
        }
    }

    /// CSS class of the status pill
    pub fn css_class(self) -> &'static str {
        match self {
            AiLabel::Oui => "status-oui",
            AiLabel::Incertain => "status-incertain",
            AiLabel::Non => "status-non",
            AiLabel::ErreurJson => "status-error",
            AiLabel::NonAnalyse => "status-empty",
        }
    }

    /// Parses a label from its display text.
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.as_str() == text)
    }

    pub fn is_comparable(self) -> bool {
        is_comparable(self.as_str())
    }

    /// Position in [`AiLabel::ALL`]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Classification derived from the human-reported position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HumanLabel {
    Oui,
    Incertain,
    NonRenseigne,
    Autre,
}

impl HumanLabel {
    /// Matrix row order
    pub const ALL: [HumanLabel; 4] = [
        HumanLabel::Oui,
        HumanLabel::Incertain,
        HumanLabel::NonRenseigne,
        HumanLabel::Autre,
    ];

    /// Classifies a free-text position.
    ///
    /// The "pourrait etre" phrasings are tested first: they also contain
    /// "sur la liste" / "sur une liste" and would otherwise read as OUI.
    ///
    /// ```
    /// use parl_common::HumanLabel;
    ///
    /// assert_eq!(HumanLabel::from_position(Some("Tête de liste")), HumanLabel::Oui);
    /// assert_eq!(
    ///     HumanLabel::from_position(Some("Pourrait être sur la liste")),
    ///     HumanLabel::Incertain
    /// );
    /// assert_eq!(HumanLabel::from_position(Some("nan")), HumanLabel::NonRenseigne);
    /// ```
    pub fn from_position(position: Option<&str>) -> Self {
        if is_missing(position) {
            return HumanLabel::NonRenseigne;
        }
        let normalized = collapse_whitespace(&normalize(position.unwrap_or_default()));

        if normalized.contains("pourrait etre sur la liste")
            || normalized.contains("pourrait etre sur une liste")
        {
            return HumanLabel::Incertain;
        }
        if normalized.contains("tete de liste")
            || normalized.contains("sur la liste")
            || normalized.contains("sur une liste")
        {
            return HumanLabel::Oui;
        }
        HumanLabel::Autre
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HumanLabel::Oui => "OUI",
            HumanLabel::Incertain => "INCERTAIN",
            HumanLabel::NonRenseigne => "Non renseigne",
            HumanLabel::Autre => "Autre",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            HumanLabel::Oui => "status-oui",
            HumanLabel::Incertain => "status-incertain",
            HumanLabel::NonRenseigne | HumanLabel::Autre => "status-empty",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.as_str() == text)
    }

    pub fn is_comparable(self) -> bool {
        is_comparable(self.as_str())
    }

    /// Position in [`HumanLabel::ALL`]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// True for label texts present in both axes' meaningful range.
pub fn is_comparable(label: &str) -> bool {
    COMPARABLE.contains(&label)
}

/// Both labels comparable and different.
pub fn is_mismatch(ai: AiLabel, human: HumanLabel) -> bool {
    ai.is_comparable() && human.is_comparable() && ai.as_str() != human.as_str()
}

impl fmt::Display for AiLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for HumanLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AiLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Serialize for HumanLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
