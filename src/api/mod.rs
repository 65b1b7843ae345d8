//! API Module
//!
//! Wire types of the ballchasing API: enumerations, listing filters and
//! response models.

pub mod enums;
pub mod filters;
pub mod models;

pub use enums::{
    AccountTier, GroupSortBy, MatchResult, PlayerIdentification, Playlist, Rank, ReplaySortBy,
    ReplayStatus, SortDir, TeamIdentification, Visibility,
};
pub use filters::{GroupFilter, Query, ReplayFilter};
pub use models::{
    CreatedGroup, Group, GroupList, Maps, NewGroup, Page, Ping, Player, Replay, ReplayList,
    Stats, Team, UploadedReplay, Uploader,
};
