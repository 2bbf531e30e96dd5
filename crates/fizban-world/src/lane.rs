//! Lanes: directed, tiered edges of the travel graph.
//!
//! A lane connects its owning location to a destination over a symbolic
//! quality tier (`gold`, `silver`, ...). Tiers match by exact string
//! equality. A lane may carry static requirements; whether they hold for a
//! given actor is decided against that actor's [`Standing`].
//!
//! # Requirement evaluation
//!
//! Requirements are checked in declaration order and the first unmet one
//! is reported:
//! 1. [`LaneRequirement::MinChannel`] -- the actor's accumulated value on
//!    `(channel, key)` must be at least `min`.
//! 2. [`LaneRequirement::Tag`] -- the actor must carry the tag.
//!
//! A lane without requirements is open to everyone.

use fizban_types::{LocationId, TravelOption};
use serde::{Deserialize, Serialize};

/// A directed lane out of a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    /// Destination location.
    pub to: LocationId,
    /// Lane tier.
    pub tier: String,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Flavour tags.
    pub tags: Vec<String>,
    /// Advertised cost.
    pub cost: u32,
    /// Content pack that supplies the lane.
    pub provider: String,
    /// Static eligibility requirements.
    pub requires: Vec<LaneRequirement>,
}

impl Lane {
    /// Project the lane into the option shape served to clients.
    pub fn to_option(&self) -> TravelOption {
        TravelOption {
            to_location: self.to.clone(),
            lane: self.tier.clone(),
            title: self.title.clone(),
            desc: self.description.clone(),
            tags: self.tags.clone(),
            cost: self.cost,
            provider: self.provider.clone(),
        }
    }

    /// Whether this lane leads to `to` over tier `tier`.
    pub fn connects(&self, to: &LocationId, tier: &str) -> bool {
        self.to == *to && self.tier == tier
    }
}

/// A static condition an actor must meet to take a lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaneRequirement {
    /// Minimum accumulated value on one channel key.
    MinChannel {
        /// Channel name.
        channel: String,
        /// Name within the channel.
        key: String,
        /// Inclusive lower bound.
        min: f64,
    },
    /// The actor must carry a tag.
    Tag {
        /// Required tag.
        tag: String,
    },
}

/// What a requirement check can see of an actor.
pub trait Standing {
    /// Accumulated value on `(channel, key)`, `0.0` if never touched.
    fn channel_value(&self, channel: &str, key: &str) -> f64;

    /// Whether the actor carries `tag`.
    fn has_tag(&self, tag: &str) -> bool;
}

impl LaneRequirement {
    /// Describe why the requirement is unmet, or `None` if it holds.
    pub fn unmet_reason(&self, standing: &dyn Standing) -> Option<String> {
        match self {
            Self::MinChannel { channel, key, min } => {
                let value = standing.channel_value(channel, key);
                (value < *min).then(|| format!("requires {channel}/{key} >= {min} (has {value})"))
            }
            Self::Tag { tag } => (!standing.has_tag(tag)).then(|| format!("requires tag {tag}")),
        }
    }
}

/// Check every requirement of a lane against an actor.
///
/// # Errors
///
/// Returns the reason of the first unmet requirement.
pub fn check_requirements(lane: &Lane, standing: &dyn Standing) -> Result<(), String> {
    lane.requires
        .iter()
        .find_map(|r| r.unmet_reason(standing))
        .map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    struct Fixed {
        akatosh: f64,
        tags: BTreeSet<String>,
    }

    impl Standing for Fixed {
        fn channel_value(&self, channel: &str, key: &str) -> f64 {
            if channel == "divine" && key == "Akatosh" {
                self.akatosh
            } else {
                0.0
            }
        }

        fn has_tag(&self, tag: &str) -> bool {
            self.tags.contains(tag)
        }
    }

    fn gold_lane(requires: Vec<LaneRequirement>) -> Lane {
        Lane {
            to: LocationId::from("Whiterun"),
            tier: "gold".to_owned(),
            title: "Golden Arch → Whiterun".to_owned(),
            description: String::new(),
            tags: vec!["rainbow_bridge".to_owned(), "boon".to_owned()],
            cost: 0,
            provider: "rainbow_bridge".to_owned(),
            requires,
        }
    }

    #[test]
    fn open_lane_always_passes() {
        let who = Fixed {
            akatosh: 0.0,
            tags: BTreeSet::new(),
        };
        assert!(check_requirements(&gold_lane(Vec::new()), &who).is_ok());
    }

    #[test]
    fn min_channel_is_inclusive() {
        let lane = gold_lane(vec![LaneRequirement::MinChannel {
            channel: "divine".to_owned(),
            key: "Akatosh".to_owned(),
            min: 0.25,
        }]);
        let low = Fixed {
            akatosh: 0.1,
            tags: BTreeSet::new(),
        };
        let exact = Fixed {
            akatosh: 0.25,
            tags: BTreeSet::new(),
        };
        assert!(check_requirements(&lane, &low).is_err());
        assert!(check_requirements(&lane, &exact).is_ok());
    }

    #[test]
    fn first_unmet_requirement_is_reported() {
        let lane = gold_lane(vec![
            LaneRequirement::Tag {
                tag: "alternate_start".to_owned(),
            },
            LaneRequirement::MinChannel {
                channel: "divine".to_owned(),
                key: "Akatosh".to_owned(),
                min: 1.0,
            },
        ]);
        let who = Fixed {
            akatosh: 0.0,
            tags: BTreeSet::new(),
        };
        let reason = check_requirements(&lane, &who).err().unwrap_or_default();
        assert!(reason.contains("alternate_start"));
    }

    #[test]
    fn lane_projects_to_option() {
        let option = gold_lane(Vec::new()).to_option();
        assert_eq!(option.lane, "gold");
        assert_eq!(option.to_location.as_str(), "Whiterun");
        assert_eq!(option.provider, "rainbow_bridge");
    }
}
