//! Region visibility.
//!
//! Each region decides who may see its overlay. The host supplies the
//! [`Caller`]; the user's region dropdown becomes a [`RegionSelection`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::catalog::RegionCatalog;
use crate::geo::Viewport;

/// Identity and role of the editor requesting the overlay.
///
/// `rank` is 1-based, as shown in the editor UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Option<u64>,
    pub user_name: Option<String>,
    pub rank: u8,
    pub area_manager: bool,
}

impl Caller {
    pub fn new(rank: u8) -> Self {
        Self {
            rank,
            ..Self::default()
        }
    }

    pub fn area_manager(mut self, area_manager: bool) -> Self {
        self.area_manager = area_manager;
        self
    }

    pub fn with_id(mut self, user_id: u64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }
}

/// Who may see a region's overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Permission {
    /// Rank 4 and above, or rank 3 area managers.
    #[default]
    Default,
    Everyone,
    MinRank(u8),
    /// Any area manager, or rank at or above the given value.
    AreaManagersOrRank(u8),
    /// Rank at or above `rank`, or an area manager at or above
    /// `area_manager_rank`.
    MinRankOrAreaManager { rank: u8, area_manager_rank: u8 },
    /// Only the listed user names, matched case-insensitively.
    Users(Vec<String>),
}

impl Permission {
    /// Name allowlist. Names are stored lowercased.
    pub fn users<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Permission::Users(
            names
                .into_iter()
                .map(|name| name.as_ref().trim().to_lowercase())
                .collect(),
        )
    }

    pub fn allows(&self, caller: &Caller) -> bool {
        match self {
            Permission::Default => caller.rank >= 4 || (caller.rank >= 3 && caller.area_manager),
            Permission::Everyone => true,
            Permission::MinRank(rank) => caller.rank >= *rank,
            Permission::AreaManagersOrRank(rank) => caller.area_manager || caller.rank >= *rank,
            Permission::MinRankOrAreaManager {
                rank,
                area_manager_rank,
            } => caller.rank >= *rank || (caller.area_manager && caller.rank >= *area_manager_rank),
            Permission::Users(names) => caller.user_name.as_deref().is_some_and(|name| {
                let name = name.trim().to_lowercase();
                names.iter().any(|listed| listed.to_lowercase() == name)
            }),
        }
    }

    /// Short description for region listings.
    pub fn describe(&self) -> String {
        match self {
            Permission::Default => "R4+ or R3-AM".to_string(),
            Permission::Everyone => "everyone".to_string(),
            Permission::MinRank(rank) => format!("R{}+", rank),
            Permission::AreaManagersOrRank(rank) => format!("R{}+ or AM", rank),
            Permission::MinRankOrAreaManager {
                rank,
                area_manager_rank,
            } => format!("R{}+ or R{}-AM", rank, area_manager_rank),
            Permission::Users(names) => format!("{} listed users", names.len()),
        }
    }
}

/// The "active region" choice: every permitted region, or just one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RegionSelection {
    #[default]
    All,
    Only(String),
}

impl RegionSelection {
    pub fn includes(&self, code: &str) -> bool {
        match self {
            RegionSelection::All => true,
            RegionSelection::Only(selected) => selected.eq_ignore_ascii_case(code),
        }
    }
}

impl FromStr for RegionSelection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(RegionSelection::All)
        } else {
            Ok(RegionSelection::Only(s.to_ascii_uppercase()))
        }
    }
}

impl fmt::Display for RegionSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionSelection::All => f.write_str("ALL"),
            RegionSelection::Only(code) => f.write_str(code),
        }
    }
}

/// Caller-independent access settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Users who see every region regardless of its permission.
    pub beta_users: Vec<u64>,
    pub selection: RegionSelection,
}

impl AccessPolicy {
    pub fn permits(&self, permission: &Permission, caller: &Caller) -> bool {
        let beta = caller
            .user_id
            .is_some_and(|id| self.beta_users.contains(&id));
        beta || permission.allows(caller)
    }
}

/// Region codes to fetch for a viewport, sorted.
///
/// A region qualifies when it is on screen (reported by the host, or its
/// bounds intersect the viewport), the caller is permitted, and it matches
/// the active selection.
pub fn visible_regions(
    catalog: &RegionCatalog,
    viewport: &Viewport,
    caller: &Caller,
    policy: &AccessPolicy,
) -> Vec<String> {
    let mut codes: Vec<String> = catalog
        .regions()
        .filter(|region| match &viewport.regions_hint {
            Some(hint) => hint.iter().any(|code| code.eq_ignore_ascii_case(&region.code)),
            None => region.bounds.intersects(&viewport.extent),
        })
        .filter(|region| {
            let permitted = policy.permits(&region.permission, caller);
            if !permitted {
                trace!(region = %region.code, rank = caller.rank, "Region not permitted");
            }
            permitted
        })
        .filter(|region| policy.selection.includes(&region.code))
        .map(|region| region.code.clone())
        .collect();
    codes.sort();
    codes.dedup();
    codes
}
