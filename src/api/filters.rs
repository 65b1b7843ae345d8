//! Listing Filters
//!
//! Typed filters for `GET /replays` and `GET /groups/`, turned into the
//! query pairs the API expects. Unset filters are left out of the query.

use crate::api::enums::{GroupSortBy, MatchResult, Playlist, Rank, ReplaySortBy, SortDir};
use chrono::{DateTime, SecondsFormat, Utc};

/// Query parameters as ordered key/value pairs (keys may repeat)
pub type Query = Vec<(String, String)>;

fn rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn push(query: &mut Query, key: &str, value: impl ToString) {
    query.push((key.to_string(), value.to_string()));
}

fn push_opt(query: &mut Query, key: &str, value: Option<impl ToString>) {
    if let Some(value) = value {
        push(query, key, value);
    }
}

/// Filters for replay listings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayFilter {
    pub title: Option<String>,

    /// Player names, any of which must appear
    pub player_names: Vec<String>,

    /// Platform ids in `$platform:$id` form, e.g. `steam:76561198141161044`
    pub player_ids: Vec<String>,

    pub playlists: Vec<Playlist>,

    /// Season numbers `1`..`14`, or `f1`, `f2`, ... for free-to-play seasons
    pub seasons: Vec<String>,

    pub match_result: Option<MatchResult>,
    pub min_rank: Option<Rank>,
    pub max_rank: Option<Rank>,

    /// Only replays with at least one pro player
    pub pro: Option<bool>,

    /// Steam id of the uploader, or `me`
    pub uploader: Option<String>,

    /// Replays directly under this group (not its children)
    pub group: Option<String>,

    /// Map code, see `BallchasingClient::maps`
    pub map: Option<String>,

    pub created_before: Option<DateTime<Utc>>,
    pub created_after: Option<DateTime<Utc>>,
    pub replay_date_after: Option<DateTime<Utc>>,
    pub replay_date_before: Option<DateTime<Utc>>,

    pub sort_by: Option<ReplaySortBy>,
    pub sort_dir: SortDir,
}

impl ReplayFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn player_name(mut self, name: impl Into<String>) -> Self {
        self.player_names.push(name.into());
        self
    }

    pub fn player_id(mut self, id: impl Into<String>) -> Self {
        self.player_ids.push(id.into());
        self
    }

    pub fn playlist(mut self, playlist: Playlist) -> Self {
        self.playlists.push(playlist);
        self
    }

    pub fn season(mut self, season: impl Into<String>) -> Self {
        self.seasons.push(season.into());
        self
    }

    pub fn match_result(mut self, result: MatchResult) -> Self {
        self.match_result = Some(result);
        self
    }

    pub fn rank_between(mut self, min: Rank, max: Rank) -> Self {
        self.min_rank = Some(min);
        self.max_rank = Some(max);
        self
    }

    pub fn pro(mut self, pro: bool) -> Self {
        self.pro = Some(pro);
        self
    }

    pub fn uploader(mut self, uploader: impl Into<String>) -> Self {
        self.uploader = Some(uploader.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn map(mut self, map: impl Into<String>) -> Self {
        self.map = Some(map.into());
        self
    }

    pub fn created_between(
        mut self,
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> Self {
        self.created_after = after;
        self.created_before = before;
        self
    }

    pub fn replay_date_between(
        mut self,
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> Self {
        self.replay_date_after = after;
        self.replay_date_before = before;
        self
    }

    pub fn sort(mut self, by: ReplaySortBy, dir: SortDir) -> Self {
        self.sort_by = Some(by);
        self.sort_dir = dir;
        self
    }

    /// Query pairs for this filter, without `count`
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();

        push_opt(&mut query, "title", self.title.as_deref());
        for name in &self.player_names {
            push(&mut query, "player-name", name);
        }
        for id in &self.player_ids {
            push(&mut query, "player-id", id);
        }
        for playlist in &self.playlists {
            push(&mut query, "playlist", playlist);
        }
        for season in &self.seasons {
            push(&mut query, "season", season);
        }
        push_opt(&mut query, "match-result", self.match_result);
        push_opt(&mut query, "min-rank", self.min_rank);
        push_opt(&mut query, "max-rank", self.max_rank);
        push_opt(&mut query, "pro", self.pro);
        push_opt(&mut query, "uploader", self.uploader.as_deref());
        push_opt(&mut query, "group", self.group.as_deref());
        push_opt(&mut query, "map", self.map.as_deref());
        push_opt(&mut query, "created-before", self.created_before.as_ref().map(rfc3339));
        push_opt(&mut query, "created-after", self.created_after.as_ref().map(rfc3339));
        push_opt(
            &mut query,
            "replay-date-after",
            self.replay_date_after.as_ref().map(rfc3339),
        );
        push_opt(
            &mut query,
            "replay-date-before",
            self.replay_date_before.as_ref().map(rfc3339),
        );
        push_opt(&mut query, "sort-by", self.sort_by);
        push(&mut query, "sort-dir", self.sort_dir);

        query
    }
}

/// Filters for group listings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupFilter {
    pub name: Option<String>,

    /// Steam id of the creator, or `me`
    pub creator: Option<String>,

    /// Only direct children of this group
    pub parent: Option<String>,

    pub created_before: Option<DateTime<Utc>>,
    pub created_after: Option<DateTime<Utc>>,

    pub sort_by: GroupSortBy,
    pub sort_dir: SortDir,
}

impl GroupFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Children of `parent`
    pub fn children_of(parent: impl Into<String>) -> Self {
        Self {
            parent: Some(parent.into()),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    pub fn created_between(
        mut self,
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> Self {
        self.created_after = after;
        self.created_before = before;
        self
    }

    pub fn sort(mut self, by: GroupSortBy, dir: SortDir) -> Self {
        self.sort_by = by;
        self.sort_dir = dir;
        self
    }

    /// Query pairs for this filter, without `count`
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();

        push_opt(&mut query, "name", self.name.as_deref());
        push_opt(&mut query, "creator", self.creator.as_deref());
        push_opt(&mut query, "group", self.parent.as_deref());
        push_opt(&mut query, "created-before", self.created_before.as_ref().map(rfc3339));
        push_opt(&mut query, "created-after", self.created_after.as_ref().map(rfc3339));
        push(&mut query, "sort-by", self.sort_by);
        push(&mut query, "sort-dir", self.sort_dir);

        query
    }
}
