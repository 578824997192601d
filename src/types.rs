//! Record types built from API rows.

use crate::error::Result;
use crate::rows::{FromRow, Row};
use crate::xml::Element;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Character on an account, or a name/id lookup result
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Character {
    /// Character ID
    pub id: i64,
    /// Character name
    pub name: String,
    /// Name of the character's corporation, if listed
    pub corporation_name: Option<String>,
    /// ID of the character's corporation (0 if not listed)
    pub corporation_id: i64,
}

impl FromRow for Character {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.parse("characterID")?,
            name: row.text("name"),
            corporation_name: row.text_opt("corporationName"),
            corporation_id: row.parse_or_default("corporationID")?,
        })
    }
}

/// One entry of the API's own error list
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ErrorDefinition {
    /// Numeric error code
    pub code: u32,
    /// Description of the error
    pub text: String,
}

impl FromRow for ErrorDefinition {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            code: row.parse("errorCode")?,
            text: row.text("errorText"),
        })
    }
}

/// Alliance with its member corporations
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Alliance {
    /// Alliance ID
    pub id: i64,
    /// Full alliance name
    pub name: String,
    /// Ticker
    pub short_name: String,
    /// ID of the executor corporation
    pub executor_corp_id: i64,
    /// Number of pilots across all member corporations
    pub member_count: i64,
    /// When the alliance was founded
    pub start_date: Option<DateTime<Utc>>,
    /// Corporations currently in the alliance
    pub member_corporations: Vec<MemberCorporation>,
}

impl FromRow for Alliance {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.parse("allianceID")?,
            name: row.text("name"),
            short_name: row.text("shortName"),
            executor_corp_id: row.parse_or_default("executorCorpID")?,
            member_count: row.parse_or_default("memberCount")?,
            start_date: row.time("startDate"),
            member_corporations: row.children_in("memberCorporations")?,
        })
    }
}

/// Corporation listed under an [`Alliance`]
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct MemberCorporation {
    /// Corporation ID
    pub id: i64,
    /// When the corporation joined
    pub start_date: Option<DateTime<Utc>>,
}

impl FromRow for MemberCorporation {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.parse("corporationID")?,
            start_date: row.time("startDate"),
        })
    }
}

/// Medal awarded to a character
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CharacterMedal {
    /// Medal ID
    pub medal_id: i64,
    /// Reason given when awarding
    pub reason: String,
    /// `public` or `private`
    pub status: String,
    /// Character who awarded the medal
    pub issuer_id: i64,
    /// When the medal was awarded
    pub issued_at: Option<DateTime<Utc>>,
    /// Issuing corporation, only for medals from other corporations
    pub corporation_id: Option<i64>,
    /// Medal title, only for medals from other corporations
    pub title: Option<String>,
    /// Medal description, only for medals from other corporations
    pub description: Option<String>,
}

impl CharacterMedal {
    /// Check if the medal is public
    pub fn is_public(&self) -> bool {
        self.status == "public"
    }
}

impl FromRow for CharacterMedal {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        let corporation_id = match row.attr("corporationID") {
            Some(_) => Some(row.parse("corporationID")?),
            None => None,
        };
        Ok(Self {
            medal_id: row.parse("medalID")?,
            reason: row.text("reason"),
            status: row.text("status"),
            issuer_id: row.parse_or_default("issuerID")?,
            issued_at: row.time("issued"),
            corporation_id,
            title: row.text_opt("title"),
            description: row.text_opt("description"),
        })
    }
}

/// Medals split by the corporation that issued them
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CharacterMedals {
    /// Medals from the character's current corporation
    pub current_corporation: Vec<CharacterMedal>,
    /// Medals from every other corporation
    pub other_corporations: Vec<CharacterMedal>,
}

/// Inventory item. Containers (ships, cans, hangars) carry their contents.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Asset {
    /// Unique item ID
    pub item_id: i64,
    /// Station or solar system; only present on top-level rows
    pub location_id: Option<i64>,
    /// Item type ID
    pub type_id: i64,
    /// Stack size
    pub quantity: i64,
    /// Inventory flag (hangar, cargo, slot)
    pub flag: i64,
    /// Assembled (unpackaged) item
    pub singleton: bool,
    /// Nested items, empty for leaf items
    pub contents: Vec<Asset>,
    is_container: bool,
}

impl Asset {
    /// Check if this row carried nested content
    pub fn is_container(&self) -> bool {
        self.is_container
    }

    /// Number of items at every depth below this one
    pub fn nested_count(&self) -> usize {
        self.contents
            .iter()
            .map(|child| 1 + child.nested_count())
            .sum()
    }
}

impl FromRow for Asset {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        let location_id = match row.attr("locationID") {
            Some(_) => Some(row.parse("locationID")?),
            None => None,
        };
        Ok(Self {
            item_id: row.parse("itemID")?,
            location_id,
            type_id: row.parse_or_default("typeID")?,
            quantity: row.parse_or_default("quantity")?,
            flag: row.parse_or_default("flag")?,
            singleton: row.flag("singleton"),
            contents: row.children()?,
            is_container: row.is_container(),
        })
    }
}

/// Scalar server status read from `<result>`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ServerStatus {
    /// Whether the server accepts logins
    pub server_open: bool,
    /// Number of players online
    pub online_players: u64,
}

impl ServerStatus {
    /// Read the status fields; missing fields read as closed / zero
    pub fn from_result(result: Option<&Element>) -> Self {
        let field = |name: &str| result.and_then(|r| r.child_text(name)).unwrap_or_default();
        Self {
            server_open: field("serverOpen").eq_ignore_ascii_case("true"),
            online_players: field("onlinePlayers").parse().unwrap_or(0),
        }
    }
}
