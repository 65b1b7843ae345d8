//! Response Models
//!
//! Records returned by the ballchasing API. Fields the API omits on
//! listing endpoints are optional so summaries and full records share types.

use crate::api::enums::{AccountTier, PlayerIdentification, TeamIdentification};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Response of `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ping {
    /// Display name of the account owning the key
    pub name: String,

    /// Steam id of the account
    pub steam_id: String,

    /// Subscription tier
    #[serde(rename = "type")]
    pub tier: AccountTier,

    #[serde(default)]
    pub chaser: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ball: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub chat: HashMap<String, String>,
}

/// One page of a listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of matches reported by the server
    #[serde(default)]
    pub count: Option<u64>,

    /// Items on this page
    pub list: Vec<T>,

    /// Absolute URL of the next page
    #[serde(default)]
    pub next: Option<String>,
}

/// Page of `GET /replays`
pub type ReplayList = Page<Replay>;

/// Page of `GET /groups/`
pub type GroupList = Page<Group>;

/// Map code to display name, from `GET /maps`
pub type Maps = BTreeMap<String, String>;

/// A replay, either as a listing summary or with full stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    /// Unique replay id
    pub id: String,

    /// In-game match identifier, shared by every upload of the same match
    #[serde(default)]
    pub match_guid: Option<String>,

    #[serde(default)]
    pub link: Option<String>,

    #[serde(default)]
    pub rocket_league_id: Option<String>,

    #[serde(default)]
    pub created: Option<DateTime<FixedOffset>>,

    #[serde(default)]
    pub uploader: Option<Uploader>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub replay_title: Option<String>,

    #[serde(default)]
    pub map_code: Option<String>,

    #[serde(default)]
    pub map_name: Option<String>,

    #[serde(default)]
    pub match_type: Option<String>,

    #[serde(default)]
    pub team_size: Option<u32>,

    #[serde(default)]
    pub playlist_id: Option<String>,

    #[serde(default)]
    pub playlist_name: Option<String>,

    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<u32>,

    #[serde(default)]
    pub overtime: Option<bool>,

    #[serde(default)]
    pub season: Option<u32>,

    #[serde(default)]
    pub season_type: Option<String>,

    /// Match date as recorded in the replay; may lack a timezone
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub date_has_timezone: Option<bool>,

    #[serde(default)]
    pub visibility: Option<String>,

    #[serde(default)]
    pub min_rank: Option<PlayerRank>,

    #[serde(default)]
    pub max_rank: Option<PlayerRank>,

    #[serde(default)]
    pub blue: Option<Team>,

    #[serde(default)]
    pub orange: Option<Team>,

    /// Groups the replay belongs to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupRef>,
}

/// Same logical replay: matching `match_guid` when both are known, else matching `id`.
///
/// Group walks can yield one replay several times when groups overlap, so
/// callers that need uniqueness should deduplicate with this comparison.
impl PartialEq for Replay {
    fn eq(&self, other: &Self) -> bool {
        match (&self.match_guid, &other.match_guid) {
            (Some(a), Some(b)) => a == b,
            _ => self.id == other.id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Uploader or owner of a replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Uploader {
    #[serde(default)]
    pub steam_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRank {
    /// Rank id such as `grand-champion-3`
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tier: Option<u32>,
    #[serde(default)]
    pub division: Option<u32>,
}

/// Platform identity of a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub stats: Option<Stats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<Platform>,
    #[serde(default)]
    pub car_id: Option<u32>,
    #[serde(default)]
    pub car_name: Option<String>,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub mvp: Option<bool>,
    #[serde(default)]
    pub pro: Option<bool>,
    #[serde(default)]
    pub rank: Option<PlayerRank>,
    #[serde(default)]
    pub camera: Option<CameraSettings>,
    #[serde(default)]
    pub steering_sensitivity: Option<f64>,
    #[serde(default)]
    pub stats: Option<Stats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    pub fov: Option<f64>,
    pub height: Option<f64>,
    pub pitch: Option<f64>,
    pub distance: Option<f64>,
    pub stiffness: Option<f64>,
    pub swivel_speed: Option<f64>,
    pub transition_speed: Option<f64>,
}

/// Per-player or per-team statistics of a processed replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub ball: Option<BallStats>,
    #[serde(default)]
    pub core: Option<CoreStats>,
    #[serde(default)]
    pub boost: Option<BoostStats>,
    #[serde(default)]
    pub movement: Option<MovementStats>,
    #[serde(default)]
    pub positioning: Option<PositioningStats>,
    #[serde(default)]
    pub demo: Option<DemoStats>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BallStats {
    pub possession_time: Option<f64>,
    pub time_in_side: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreStats {
    pub shots: Option<u32>,
    pub shots_against: Option<u32>,
    pub goals: Option<u32>,
    pub goals_against: Option<u32>,
    pub saves: Option<u32>,
    pub assists: Option<u32>,
    pub score: Option<u32>,
    pub mvp: Option<bool>,
    pub shooting_percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostStats {
    pub bpm: Option<f64>,
    pub bcpm: Option<f64>,
    pub avg_amount: Option<f64>,
    pub amount_collected: Option<f64>,
    pub amount_stolen: Option<f64>,
    pub amount_collected_big: Option<f64>,
    pub amount_stolen_big: Option<f64>,
    pub amount_collected_small: Option<f64>,
    pub amount_stolen_small: Option<f64>,
    pub count_collected_big: Option<u32>,
    pub count_stolen_big: Option<u32>,
    pub count_collected_small: Option<u32>,
    pub count_stolen_small: Option<u32>,
    pub amount_overfill: Option<f64>,
    pub amount_overfill_stolen: Option<f64>,
    pub amount_used_while_supersonic: Option<f64>,
    pub time_zero_boost: Option<f64>,
    pub percent_zero_boost: Option<f64>,
    pub time_full_boost: Option<f64>,
    pub percent_full_boost: Option<f64>,
    pub time_boost_0_25: Option<f64>,
    pub time_boost_25_50: Option<f64>,
    pub time_boost_50_75: Option<f64>,
    pub time_boost_75_100: Option<f64>,
    pub percent_boost_0_25: Option<f64>,
    pub percent_boost_25_50: Option<f64>,
    pub percent_boost_50_75: Option<f64>,
    pub percent_boost_75_100: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementStats {
    pub avg_speed: Option<f64>,
    pub total_distance: Option<f64>,
    pub time_supersonic_speed: Option<f64>,
    pub time_boost_speed: Option<f64>,
    pub time_slow_speed: Option<f64>,
    pub time_ground: Option<f64>,
    pub time_low_air: Option<f64>,
    pub time_high_air: Option<f64>,
    pub time_powerslide: Option<f64>,
    pub count_powerslide: Option<u32>,
    pub avg_powerslide_duration: Option<f64>,
    pub avg_speed_percentage: Option<f64>,
    pub percent_slow_speed: Option<f64>,
    pub percent_boost_speed: Option<f64>,
    pub percent_supersonic_speed: Option<f64>,
    pub percent_ground: Option<f64>,
    pub percent_low_air: Option<f64>,
    pub percent_high_air: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PositioningStats {
    pub avg_distance_to_ball: Option<f64>,
    pub avg_distance_to_ball_possession: Option<f64>,
    pub avg_distance_to_ball_no_possession: Option<f64>,
    pub avg_distance_to_mates: Option<f64>,
    pub time_defensive_third: Option<f64>,
    pub time_neutral_third: Option<f64>,
    pub time_offensive_third: Option<f64>,
    pub time_defensive_half: Option<f64>,
    pub time_offensive_half: Option<f64>,
    pub time_behind_ball: Option<f64>,
    pub time_infront_ball: Option<f64>,
    pub time_most_back: Option<f64>,
    pub time_most_forward: Option<f64>,
    pub time_closest_to_ball: Option<f64>,
    pub time_farthest_from_ball: Option<f64>,
    pub percent_defensive_third: Option<f64>,
    pub percent_offensive_third: Option<f64>,
    pub percent_neutral_third: Option<f64>,
    pub percent_defensive_half: Option<f64>,
    pub percent_offensive_half: Option<f64>,
    pub percent_behind_ball: Option<f64>,
    pub percent_infront_ball: Option<f64>,
    pub percent_most_back: Option<f64>,
    pub percent_most_forward: Option<f64>,
    pub percent_closest_to_ball: Option<f64>,
    pub percent_farthest_from_ball: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoStats {
    pub inflicted: Option<u32>,
    pub taken: Option<u32>,
}

/// A replay group, as listed or read with aggregated stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Unique group id
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub link: Option<String>,

    #[serde(default)]
    pub created: Option<DateTime<FixedOffset>>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub player_identification: Option<PlayerIdentification>,

    #[serde(default)]
    pub team_identification: Option<TeamIdentification>,

    /// Replays directly in this group
    #[serde(default)]
    pub direct_replays: Option<u32>,

    /// Replays in descendant groups
    #[serde(default)]
    pub indirect_replays: Option<u32>,

    #[serde(default)]
    pub shared: Option<bool>,

    #[serde(default)]
    pub creator: Option<Uploader>,

    #[serde(default)]
    pub user: Option<Uploader>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub players: Vec<GroupPlayer>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teams: Vec<GroupTeam>,
}

/// Aggregated stats of one player across a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupPlayer {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub cumulative: Option<Cumulative>,
    #[serde(default)]
    pub game_average: Option<GameAverage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupTeam {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub players: Vec<GroupPlayer>,
    #[serde(default)]
    pub cumulative: Option<Cumulative>,
    #[serde(default)]
    pub game_average: Option<GameAverage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Cumulative {
    pub games: Option<u32>,
    pub wins: Option<u32>,
    pub win_percentage: Option<f64>,
    pub play_duration: Option<f64>,
    pub core: Option<CoreStats>,
    pub boost: Option<BoostStats>,
    pub movement: Option<MovementStats>,
    pub positioning: Option<PositioningStats>,
    pub demo: Option<DemoStats>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameAverage {
    pub core: Option<CoreStats>,
    pub boost: Option<BoostStats>,
    pub movement: Option<MovementStats>,
    pub positioning: Option<PositioningStats>,
    pub demo: Option<DemoStats>,
}

/// Response of `POST /v2/upload`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedReplay {
    pub id: String,
    /// URL of the new replay
    pub location: String,
}

/// Response of `POST /groups`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedGroup {
    pub id: String,
    pub link: String,
}

/// Body of `POST /groups`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    pub player_identification: PlayerIdentification,
    pub team_identification: TeamIdentification,
    /// Parent group id, to create the group as a child
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl NewGroup {
    /// Create a top-level group description
    pub fn new(
        name: impl Into<String>,
        player_identification: PlayerIdentification,
        team_identification: TeamIdentification,
    ) -> Self {
        Self {
            name: name.into(),
            player_identification,
            team_identification,
            parent: None,
        }
    }

    /// Nest the group under `parent`
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay(id: &str, guid: Option<&str>) -> Replay {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "match_guid": guid,
        }))
        .unwrap()
    }

    #[test]
    fn test_equal_match_guid_ignores_id() {
        let a = replay("aaaa", Some("4E2B22344F748C6EB4922DB8CC8AC282"));
        let b = replay("bbbb", Some("4E2B22344F748C6EB4922DB8CC8AC282"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_match_guid_falls_back_to_id() {
        assert_eq!(replay("aaaa", None), replay("aaaa", Some("X")));
        assert_ne!(replay("aaaa", None), replay("bbbb", None));
        assert_ne!(replay("aaaa", Some("X")), replay("aaaa", Some("Y")));
    }

    #[test]
    fn test_parse_replay_summary() {
        let json = r#"{
            "id": "f1fa6c0e-3d6f-4475-b844-5f6d7099aebe",
            "link": "https://ballchasing.com/api/replays/f1fa6c0e-3d6f-4475-b844-5f6d7099aebe",
            "created": "2022-11-29T01:11:03.307917Z",
            "uploader": {"steam_id": "76561197960409023", "name": "nickm"},
            "status": "ok",
            "rocket_league_id": "4E2B22344F748C6EB4922DB8CC8AC282",
            "match_guid": "A1B2",
            "title": "2022-11-28.21.10 nickm Ranked Doubles Win",
            "map_code": "stadium_p",
            "team_size": 2,
            "playlist_id": "ranked-doubles",
            "duration": 312,
            "overtime": false,
            "season": 8,
            "season_type": "free2play",
            "date": "2022-11-28T21:10:17",
            "date_has_timezone": false,
            "visibility": "public",
            "min_rank": {"id": "diamond-2", "tier": 14, "division": 3, "name": "Diamond II"},
            "blue": {"name": "Blue", "players": [{"name": "nickm", "id": {"platform": "steam", "id": "76561197960409023"}, "score": 320}]},
            "orange": {"players": []}
        }"#;
        let replay: Replay = serde_json::from_str(json).unwrap();
        assert_eq!(replay.team_size, Some(2));
        assert_eq!(replay.uploader.unwrap().name.as_deref(), Some("nickm"));
        assert_eq!(replay.blue.unwrap().players.len(), 1);
        assert!(replay.created.is_some());
    }

    #[test]
    fn test_parse_page_without_next() {
        let page: ReplayList =
            serde_json::from_str(r#"{"count": 1, "list": [{"id": "x"}], "next": null}"#).unwrap();
        assert_eq!(page.list.len(), 1);
        assert!(page.next.is_none());
    }

    #[test]
    fn test_ping_tier() {
        let ping: Ping = serde_json::from_str(
            r#"{"chaser": true, "name": "nickm", "steam_id": "76561197960409023", "type": "gold"}"#,
        )
        .unwrap();
        assert_eq!(ping.tier, AccountTier::Gold);
    }

    #[test]
    fn test_new_group_body_omits_missing_parent() {
        let body = serde_json::to_value(NewGroup::new(
            "RLCS",
            PlayerIdentification::ByName,
            TeamIdentification::ByPlayerClusters,
        ))
        .unwrap();
        assert_eq!(body["player_identification"], "by-name");
        assert!(body.get("parent").is_none());
    }
}
