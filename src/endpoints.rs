//! Endpoint paths and thin typed endpoint methods.

use crate::client::{EveApiClient, Query, QueryOutput};
use crate::error::Result;
use crate::params::RequestParams;
use crate::rows::{map_rows, RowSelector};
use crate::types::{
    Alliance, Asset, Character, CharacterMedal, CharacterMedals, ErrorDefinition, ServerStatus,
};

/// Endpoint paths, relative to the base URL
pub mod paths {
    pub const CHARACTERS: &str = "account/Characters.xml.aspx";
    pub const ERROR_LIST: &str = "eve/ErrorList.xml.aspx";
    pub const ALLIANCES: &str = "eve/AllianceList.xml.aspx";
    pub const CHARACTER_MEDALS: &str = "char/Medals.xml.aspx";
    pub const ASSET_LIST: &str = "char/AssetList.xml.aspx";
    pub const CORPORATE_ASSET_LIST: &str = "corp/AssetList.xml.aspx";
    pub const SERVER_STATUS: &str = "Server/ServerStatus.xml.aspx";
}

impl EveApiClient {
    /// Characters on the account
    pub async fn characters(&self, params: RequestParams) -> Result<QueryOutput<Vec<Character>>> {
        let query = Query::new("characters", paths::CHARACTERS).with_params(params);
        self.execute_rows(query, &RowSelector::Everywhere).await
    }

    /// The API's own list of error codes
    pub async fn error_list(
        &self,
        params: RequestParams,
    ) -> Result<QueryOutput<Vec<ErrorDefinition>>> {
        let query = Query::new("errors", paths::ERROR_LIST).with_params(params);
        self.execute_rows(query, &RowSelector::Everywhere).await
    }

    /// Every alliance with its member corporations
    pub async fn alliances(&self, params: RequestParams) -> Result<QueryOutput<Vec<Alliance>>> {
        let query = Query::new("alliances", paths::ALLIANCES).with_params(params);
        self.execute_rows(query, &RowSelector::named("alliances"))
            .await
    }

    /// Medals of a character, split by issuing corporation
    pub async fn character_medals(
        &self,
        params: RequestParams,
    ) -> Result<QueryOutput<CharacterMedals>> {
        let query = Query::new("character_medals", paths::CHARACTER_MEDALS).with_params(params);
        self.execute(query).await?.try_map(|response| {
            let document = response.document();
            Ok(CharacterMedals {
                current_corporation: map_rows::<CharacterMedal>(
                    document,
                    &RowSelector::named("currentCorporation"),
                )?,
                other_corporations: map_rows::<CharacterMedal>(
                    document,
                    &RowSelector::named("otherCorporations"),
                )?,
            })
        })
    }

    /// A character's assets, with container contents nested
    pub async fn asset_list(&self, params: RequestParams) -> Result<QueryOutput<Vec<Asset>>> {
        let query = Query::new("assets", paths::ASSET_LIST).with_params(params);
        self.execute_rows(query, &RowSelector::named("assets")).await
    }

    /// A corporation's assets, with container contents nested
    pub async fn corporate_asset_list(
        &self,
        params: RequestParams,
    ) -> Result<QueryOutput<Vec<Asset>>> {
        let query = Query::new("corporate_assets", paths::CORPORATE_ASSET_LIST).with_params(params);
        self.execute_rows(query, &RowSelector::named("assets")).await
    }

    /// Whether the game server is up, and how many players are online
    pub async fn server_status(&self, params: RequestParams) -> Result<QueryOutput<ServerStatus>> {
        let query = Query::new("server_status", paths::SERVER_STATUS).with_params(params);
        self.execute(query)
            .await?
            .try_map(|response| Ok(ServerStatus::from_result(response.document().result())))
    }
}
