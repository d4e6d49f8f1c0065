use serde::{Deserialize, Serialize};

// ── Token vocabulary ──────────────────────────────────────────────────────────

pub const GOALKEEPER_CODE: &str = "GK";

/// Position abbreviations the profile pages are known to use.
pub const POSITION_CODES: &[&str] = &[
    "GK", "DF", "MF", "FW", "DR", "DL", "DC", "MR", "ML", "MC", "AM", "DM", "ST", "RW", "LW",
];

/// Short upper-case tokens that look like positions but are club/competition fragments.
pub const NON_POSITION_UPPER: &[&str] = &["FC", "FK", "AS", "A", "SK"];

/// Market value tokens carry one of these ("85M€", "750K€").
pub const MARKET_VALUE_MARKERS: &[&str] = &["M€", "K€"];

pub const NO_STRENGTHS: &str = "No outstanding strengths";
pub const NO_WEAKNESSES: &str = "No outstanding weaknesses";

// ── Role stats ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Goalkeeper,
    Outfield,
}

impl Role {
    /// Goalkeepers are recognised by their first listed position alone.
    pub fn for_first_position(position: &str, goalkeeper_code: &str) -> Self {
        if position == goalkeeper_code {
            Role::Goalkeeper
        } else {
            Role::Outfield
        }
    }

    /// Stat keys in the order the profile page lists them.
    pub fn stat_keys(self) -> [&'static str; 5] {
        match self {
            Role::Goalkeeper => ["saves", "anticipation", "tactical_gk", "distribution", "aerial"],
            Role::Outfield => ["attacking", "creativity", "technical", "defending", "tactical"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Goalkeeper => "goalkeeper",
            Role::Outfield => "outfield",
        }
    }
}

/// The five performance-graph values; which five depends on the player's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleStats {
    Goalkeeper {
        saves: String,
        anticipation: String,
        tactical_gk: String,
        distribution: String,
        aerial: String,
    },
    Outfield {
        attacking: String,
        creativity: String,
        technical: String,
        defending: String,
        tactical: String,
    },
}

impl RoleStats {
    pub fn from_values(role: Role, [a, b, c, d, e]: [String; 5]) -> Self {
        match role {
            Role::Goalkeeper => RoleStats::Goalkeeper {
                saves: a,
                anticipation: b,
                tactical_gk: c,
                distribution: d,
                aerial: e,
            },
            Role::Outfield => RoleStats::Outfield {
                attacking: a,
                creativity: b,
                technical: c,
                defending: d,
                tactical: e,
            },
        }
    }

    pub fn role(&self) -> Role {
        match self {
            RoleStats::Goalkeeper { .. } => Role::Goalkeeper,
            RoleStats::Outfield { .. } => Role::Outfield,
        }
    }

    /// Values in `Role::stat_keys` order.
    pub fn values(&self) -> [&str; 5] {
        match self {
            RoleStats::Goalkeeper { saves, anticipation, tactical_gk, distribution, aerial } => {
                [saves.as_str(), anticipation.as_str(), tactical_gk.as_str(), distribution.as_str(), aerial.as_str()]
            }
            RoleStats::Outfield { attacking, creativity, technical, defending, tactical } => {
                [attacking.as_str(), creativity.as_str(), technical.as_str(), defending.as_str(), tactical.as_str()]
            }
        }
    }
}

// ── Player record ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerRecord {
    pub given_name: String,
    pub family_name: String,
    pub league: String,
    pub nationality: String,
    pub club: String,
    pub positions: Vec<String>,
    pub age: String,
    pub height: String,
    pub role_stats: RoleStats,
    pub market_value: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub preferred_foot: String,
}

/// Identity used to collapse repeated scrapes of the same player.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerKey {
    pub given_name: String,
    pub family_name: String,
    pub age: String,
    pub height: String,
    pub club: String,
}

impl PlayerRecord {
    pub fn key(&self) -> PlayerKey {
        PlayerKey {
            given_name: self.given_name.clone(),
            family_name: self.family_name.clone(),
            age: self.age.clone(),
            height: self.height.clone(),
            club: self.club.clone(),
        }
    }

    pub fn role(&self) -> Role {
        self.role_stats.role()
    }

    /// False when the list only holds the "none reported" placeholder.
    pub fn has_strengths(&self) -> bool {
        !is_sentinel_list(&self.strengths, NO_STRENGTHS)
    }

    pub fn has_weaknesses(&self) -> bool {
        !is_sentinel_list(&self.weaknesses, NO_WEAKNESSES)
    }
}

fn is_sentinel_list(items: &[String], sentinel: &str) -> bool {
    matches!(items, [only] if only == sentinel)
}

// ── Raw collaborator fields ───────────────────────────────────────────────────

/// What the browser layer hands over for one profile page. Everything except
/// the slug may be missing on inactive or partially rendered profiles.
#[derive(Debug, Clone, Default)]
pub struct RawPlayerFields {
    pub slug: String,
    pub league: Option<String>,
    pub nationality: Option<String>,
    pub club: Option<String>,
    pub positions: Vec<String>,
    pub age: Option<String>,
    pub height: Option<String>,
    pub stats: [Option<String>; 5],
    pub market_value: Option<String>,
    pub strengths: Option<String>,
    pub weaknesses: Option<String>,
    pub preferred_foot: Option<String>,
}
