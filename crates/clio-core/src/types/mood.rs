//! Mood catalogue
//!
//! Each mood maps to the keyword query used against the external book
//! metadata search. The search itself lives outside this crate.

use serde::{Deserialize, Serialize};

/// A mood the reader can browse by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoodTag {
    Lost,
    Hopeful,
    Healing,
    Nostalgic,
    Growing,
    Drifting,
    StartingOver,
    Grieving,
    Reconnecting,
}

impl MoodTag {
    /// Every mood, in display order
    pub const ALL: [MoodTag; 9] = [
        MoodTag::Lost,
        MoodTag::Hopeful,
        MoodTag::Healing,
        MoodTag::Nostalgic,
        MoodTag::Growing,
        MoodTag::Drifting,
        MoodTag::StartingOver,
        MoodTag::Grieving,
        MoodTag::Reconnecting,
    ];

    /// Stable identifier (also the serialized form)
    pub fn id(self) -> &'static str {
        match self {
            MoodTag::Lost => "lost",
            MoodTag::Hopeful => "hopeful",
            MoodTag::Healing => "healing",
            MoodTag::Nostalgic => "nostalgic",
            MoodTag::Growing => "growing",
            MoodTag::Drifting => "drifting",
            MoodTag::StartingOver => "startingOver",
            MoodTag::Grieving => "grieving",
            MoodTag::Reconnecting => "reconnecting",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MoodTag::Lost => "Feeling Lost",
            MoodTag::Hopeful => "Feeling Hopeful",
            MoodTag::Healing => "In Healing",
            MoodTag::Nostalgic => "Nostalgic",
            MoodTag::Growing => "Growing",
            MoodTag::Drifting => "Drifting",
            MoodTag::StartingOver => "Starting Over",
            MoodTag::Grieving => "Grieving",
            MoodTag::Reconnecting => "Reconnecting",
        }
    }

    /// Search keywords for this mood
    pub fn keyword(self) -> &'static str {
        match self {
            MoodTag::Lost => "finding direction self help",
            MoodTag::Hopeful => "inspirational memoir",
            MoodTag::Healing => "healing trauma self help",
            MoodTag::Nostalgic => "nostalgic coming of age novel",
            MoodTag::Growing => "personal growth",
            MoodTag::Drifting => "life purpose self help",
            MoodTag::StartingOver => "fresh start self discovery",
            MoodTag::Grieving => "grief healing",
            MoodTag::Reconnecting => "reconnecting with self",
        }
    }

    /// Look a mood up by its identifier
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.id() == id)
    }
}

impl std::fmt::Display for MoodTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        for mood in MoodTag::ALL {
            assert_eq!(MoodTag::from_id(mood.id()), Some(mood));
        }
        assert_eq!(MoodTag::from_id("furious"), None);
    }

    #[test]
    fn test_serialized_form_matches_id() {
        let json = serde_json::to_string(&MoodTag::StartingOver).unwrap();
        assert_eq!(json, "\"startingOver\"");
    }

    #[test]
    fn test_keyword() {
        assert_eq!(MoodTag::Grieving.keyword(), "grief healing");
        assert_eq!(MoodTag::Healing.to_string(), "In Healing");
    }
}
