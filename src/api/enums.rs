//! Wire Enumerations
//!
//! Filter and field values with the exact strings the API expects.

use crate::error::BallchasingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Declares an enum whose variants map one-to-one onto API strings.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The string sent to and received from the API
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = BallchasingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(BallchasingError::Config(format!(
                        "Unknown {} '{}'",
                        stringify!($name),
                        s
                    ))),
                }
            }
        }
    };
}

wire_enum! {
    /// Processing status of an uploaded replay
    ReplayStatus {
        Ok => "ok",
        Pending => "pending",
        Failed => "failed",
    }
}

wire_enum! {
    /// Game playlist
    Playlist {
        RankedDuels => "ranked-duels",
        RankedDoubles => "ranked-doubles",
        RankedSoloStandard => "ranked-solo-standard",
        RankedStandard => "ranked-standard",
        UnrankedDuels => "unranked-duels",
        UnrankedDoubles => "unranked-doubles",
        UnrankedStandard => "unranked-standard",
        Private => "private",
        Season => "season",
        Offline => "offline",
        RocketLabs => "rocket-labs",
        RankedHoops => "ranked-hoops",
        RankedRumble => "ranked-rumble",
        RankedDropshot => "ranked-dropshot",
        RankedSnowday => "ranked-snowday",
        Hoops => "hoops",
        Rumble => "rumble",
        Dropshot => "dropshot",
        Snowday => "snowday",
        Tournament => "tournament",
        DropshotRumble => "dropshot-rumble",
        Heatseeker => "heatseeker",
    }
}

wire_enum! {
    /// Competitive rank used by the `min-rank`/`max-rank` filters
    Rank {
        Unranked => "unranked",
        Bronze1 => "bronze-1",
        Bronze2 => "bronze-2",
        Bronze3 => "bronze-3",
        Silver1 => "silver-1",
        Silver2 => "silver-2",
        Silver3 => "silver-3",
        Gold1 => "gold-1",
        Gold2 => "gold-2",
        Gold3 => "gold-3",
        Platinum1 => "platinum-1",
        Platinum2 => "platinum-2",
        Platinum3 => "platinum-3",
        Diamond1 => "diamond-1",
        Diamond2 => "diamond-2",
        Diamond3 => "diamond-3",
        Champion1 => "champion-1",
        Champion2 => "champion-2",
        Champion3 => "champion-3",
        GrandChampion => "grand-champion",
        GrandChampion1 => "grand-champion-1",
        GrandChampion2 => "grand-champion-2",
        GrandChampion3 => "grand-champion-3",
        SupersonicLegend => "supersonic-legend",
    }
}

wire_enum! {
    /// Result filter for the uploader's replays
    MatchResult {
        Win => "win",
        Loss => "loss",
    }
}

wire_enum! {
    /// Sort field for replay listings
    ReplaySortBy {
        ReplayDate => "replay-date",
        UploadDate => "upload-date",
    }
}

wire_enum! {
    /// Sort field for group listings
    GroupSortBy {
        Created => "created",
        Name => "name",
    }
}

wire_enum! {
    SortDir {
        Ascending => "asc",
        Descending => "desc",
    }
}

wire_enum! {
    /// Visibility of an uploaded replay
    Visibility {
        Public => "public",
        Unlisted => "unlisted",
        Private => "private",
    }
}

wire_enum! {
    /// How a group recognizes the same player across replays
    PlayerIdentification {
        ById => "by-id",
        ByName => "by-name",
    }
}

wire_enum! {
    /// How a group recognizes the same team across replays
    TeamIdentification {
        ByDistinctPlayers => "by-distinct-players",
        ByPlayerClusters => "by-player-clusters",
    }
}

wire_enum! {
    /// Account subscription level, reported by the ping endpoint
    AccountTier {
        Regular => "regular",
        Gold => "gold",
        Diamond => "diamond",
        Champion => "champion",
        GrandChampion => "gc",
        Legend => "legend",
        Org => "org",
    }
}

impl AccountTier {
    /// Request budget granted by the tier
    pub fn requests_per_hour(&self) -> u32 {
        match self {
            AccountTier::Regular => 1_000,
            AccountTier::Gold => 2_000,
            AccountTier::Diamond => 5_000,
            AccountTier::Champion => 28_800,
            AccountTier::GrandChampion => 57_600,
            AccountTier::Legend => 115_200,
            AccountTier::Org => 230_400,
        }
    }

    /// Delay to wait after a 429 so the hourly budget is respected
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_secs(3600) / self.requests_per_hour()
    }
}

impl Default for AccountTier {
    fn default() -> Self {
        AccountTier::Regular
    }
}

impl Default for SortDir {
    fn default() -> Self {
        SortDir::Descending
    }
}

impl Default for GroupSortBy {
    fn default() -> Self {
        GroupSortBy::Created
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Public
    }
}
