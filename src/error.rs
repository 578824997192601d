//! Error types for the EVE XML API client library.

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, EveApiError>;

/// Comprehensive error type for all EVE API operations
#[derive(Error, Debug)]
pub enum EveApiError {
    /// Network or HTTP client errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    UrlParsing(#[from] url::ParseError),

    /// Local filesystem errors (missing XML file, save path not writable)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server could not be reached, or answered with an unacceptable status
    #[error("Network status error{}: {body}", status_suffix(.status))]
    NetworkStatus { status: Option<u16>, body: String },

    /// The response body is not well-formed XML
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// The API returned an `<error>` element
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A row attribute could not be converted into its record field
    #[error("Invalid row attribute {attribute}: {value:?}")]
    InvalidRow { attribute: String, value: String },

    /// Invalid input provided
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl EveApiError {
    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new malformed response error
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a new network status error
    pub fn network_status(status: Option<u16>, body: impl Into<String>) -> Self {
        Self::NetworkStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a new invalid row error
    pub fn invalid_row(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidRow {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Check if this error is a transport failure worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, EveApiError::Network(_))
    }

    /// Check if this error was reported by the API server
    pub fn is_api_error(&self) -> bool {
        matches!(self, EveApiError::Api(_))
    }

    /// The translated kind, if this error was reported by the API server
    pub fn api_error_kind(&self) -> Option<ApiErrorKind> {
        match self {
            EveApiError::Api(err) => Some(err.kind),
            _ => None,
        }
    }

    /// Check if this error is a missing local XML file
    pub fn is_not_found(&self) -> bool {
        matches!(self, EveApiError::Io(err) if err.kind() == std::io::ErrorKind::NotFound)
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}

/// An error reported by the API inside an `<error code="N">` element
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} ({code}) {message}")]
pub struct ApiError {
    /// Translated error kind
    pub kind: ApiErrorKind,
    /// Raw numeric code from the `code` attribute
    pub code: u32,
    /// Text content of the error element
    pub message: String,
    /// Server clock of the error response, if it came from one
    pub current_time: Option<DateTime<Utc>>,
    /// When the server will accept the call again, if it said
    pub cached_until: Option<DateTime<Utc>>,
}

impl ApiError {
    /// Translate a server error code and message into a typed error.
    ///
    /// Codes missing from [`ERROR_TABLE`] become [`ApiErrorKind::Unrecognized`].
    pub fn translate(code: u32, message: impl Into<String>) -> Self {
        let kind = ApiErrorKind::from_code(code);
        let mut message = message.into();
        if message.is_empty() {
            message = "No error message from the API server (but one did occur)".to_string();
        }
        if kind == ApiErrorKind::SecurityLevelNotHighEnough {
            message.push_str(" (Should you be using the full API Key?)");
        }
        Self {
            kind,
            code,
            message,
            current_time: None,
            cached_until: None,
        }
    }

    /// Attach the timing metadata of the response that carried this error
    pub fn with_timing(
        mut self,
        current_time: DateTime<Utc>,
        cached_until: Option<DateTime<Utc>>,
    ) -> Self {
        self.current_time = Some(current_time);
        self.cached_until = cached_until;
        self
    }

    /// Theme of this error
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

/// Broad grouping of API error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Key, user id or credentials were rejected
    Authentication,
    /// Credentials are valid but lack the role or access level
    Authorization,
    /// A request parameter was missing or out of range
    InvalidParameter,
    /// The data was already fetched, or the cache timer has not expired
    Exhausted,
    /// The server side failed or is offline
    ServiceUnavailable,
    /// The code has no entry in the lookup table
    Unrecognized,
}

/// Typed kind of a server-reported error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    WalletNotPreviouslyLoaded,
    WalletExhausted,
    WalletPreviouslyLoaded,
    KeyNotFound,
    InvalidCharacterId,
    MissingUserId,
    InvalidBeforeRefId,
    InvalidAccountKey,
    AccountKeyOutOfRange,
    InvalidBeforeTransId,
    InvalidInteger,
    VersionMismatch,
    VersionEscalation,
    InvalidItemId,
    AssetsAlreadyFetched,
    IndustryJobsAlreadyFetched,
    MarketOrdersAlreadyFetched,
    ExpectedBeforeKillId,
    KillsExhausted,
    UnexpectedBeforeKillId,
    BadBeforeKillId,
    SecurityLevelNotHighEnough,
    CharacterDoesNotBelongToAccount,
    CachedKeyAuthenticationFailure,
    AuthenticationFailure,
    MustHaveAccountantRole,
    NotAvailableForNpcCorps,
    MustHaveAccountantOrTraderRole,
    MustBeDirectorOrCeo,
    LoginDeniedByAccountStatus,
    CharacterNeedsFactoryManagerRole,
    CorporationNotInAlliance,
    GetNameInvalid,
    GetIdInvalid,
    CacheNotExpired,
    InvalidInput,
    InvalidRace,
    InvalidGender,
    InvalidBloodline,
    InvalidAttribute,
    InvalidRefType,
    NullDataComponent,
    NoCorporation,
    InvalidCharId,
    CorporateRoleFetchFailure,
    InvalidCorpId,
    InvalidUserIdOrApiKey,
    UserInformationFetchFailure,
    CsvHeaderRowMismatch,
    TranquilityTimeFailure,
    StarbaseDetailFetchFailure,
    DatabaseConnectionFailure,
    InvalidUsernameOrPassword,
    CharacterRetrievalFailure,
    CorporationRetrievalFailure,
    BetaAccessDenied,
    WebsiteOffline,
    DatabaseOffline,
    ObeyCacheTimers,
    UserForced,
    /// Any code without a table entry
    Unrecognized,
}

/// Code to kind lookup table for server-reported errors.
pub const ERROR_TABLE: &[(u32, ApiErrorKind)] = &[
    (100, ApiErrorKind::WalletNotPreviouslyLoaded),
    (101, ApiErrorKind::WalletExhausted),
    (102, ApiErrorKind::WalletPreviouslyLoaded),
    (103, ApiErrorKind::WalletExhausted),
    (104, ApiErrorKind::KeyNotFound),
    (105, ApiErrorKind::InvalidCharacterId),
    (106, ApiErrorKind::MissingUserId),
    (107, ApiErrorKind::InvalidBeforeRefId),
    (108, ApiErrorKind::InvalidAccountKey),
    (109, ApiErrorKind::AccountKeyOutOfRange),
    (110, ApiErrorKind::InvalidBeforeTransId),
    (111, ApiErrorKind::InvalidInteger),
    (112, ApiErrorKind::VersionMismatch),
    (113, ApiErrorKind::VersionEscalation),
    (114, ApiErrorKind::InvalidItemId),
    (115, ApiErrorKind::AssetsAlreadyFetched),
    (116, ApiErrorKind::IndustryJobsAlreadyFetched),
    (117, ApiErrorKind::MarketOrdersAlreadyFetched),
    (118, ApiErrorKind::ExpectedBeforeKillId),
    (119, ApiErrorKind::KillsExhausted),
    (120, ApiErrorKind::UnexpectedBeforeKillId),
    (121, ApiErrorKind::BadBeforeKillId),
    (200, ApiErrorKind::SecurityLevelNotHighEnough),
    (201, ApiErrorKind::CharacterDoesNotBelongToAccount),
    (202, ApiErrorKind::CachedKeyAuthenticationFailure),
    (203, ApiErrorKind::AuthenticationFailure),
    (204, ApiErrorKind::AuthenticationFailure),
    (205, ApiErrorKind::AuthenticationFailure),
    (206, ApiErrorKind::MustHaveAccountantRole),
    (207, ApiErrorKind::NotAvailableForNpcCorps),
    (208, ApiErrorKind::MustHaveAccountantOrTraderRole),
    (209, ApiErrorKind::MustBeDirectorOrCeo),
    (210, ApiErrorKind::AuthenticationFailure),
    (211, ApiErrorKind::LoginDeniedByAccountStatus),
    (212, ApiErrorKind::AuthenticationFailure),
    (213, ApiErrorKind::CharacterNeedsFactoryManagerRole),
    (214, ApiErrorKind::CorporationNotInAlliance),
    (500, ApiErrorKind::GetNameInvalid),
    (501, ApiErrorKind::GetIdInvalid),
    (502, ApiErrorKind::CacheNotExpired),
    (503, ApiErrorKind::InvalidInput),
    (504, ApiErrorKind::InvalidRace),
    (505, ApiErrorKind::InvalidGender),
    (506, ApiErrorKind::InvalidBloodline),
    (507, ApiErrorKind::InvalidAttribute),
    (508, ApiErrorKind::InvalidRefType),
    (509, ApiErrorKind::NullDataComponent),
    (510, ApiErrorKind::NoCorporation),
    (511, ApiErrorKind::InvalidAccountKey),
    (512, ApiErrorKind::InvalidCharId),
    (513, ApiErrorKind::CorporateRoleFetchFailure),
    (514, ApiErrorKind::InvalidCorpId),
    (515, ApiErrorKind::InvalidUserIdOrApiKey),
    (516, ApiErrorKind::UserInformationFetchFailure),
    (517, ApiErrorKind::CsvHeaderRowMismatch),
    (518, ApiErrorKind::TranquilityTimeFailure),
    (519, ApiErrorKind::StarbaseDetailFetchFailure),
    (520, ApiErrorKind::DatabaseConnectionFailure),
    (521, ApiErrorKind::InvalidUsernameOrPassword),
    (522, ApiErrorKind::CharacterRetrievalFailure),
    (523, ApiErrorKind::CorporationRetrievalFailure),
    (900, ApiErrorKind::BetaAccessDenied),
    (901, ApiErrorKind::WebsiteOffline),
    (902, ApiErrorKind::DatabaseOffline),
    (903, ApiErrorKind::ObeyCacheTimers),
    (999, ApiErrorKind::UserForced),
];

impl ApiErrorKind {
    /// Look up the kind for a numeric error code
    pub fn from_code(code: u32) -> Self {
        ERROR_TABLE
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, kind)| *kind)
            .unwrap_or(ApiErrorKind::Unrecognized)
    }

    /// Theme this kind belongs to
    pub fn category(self) -> ErrorCategory {
        use ApiErrorKind::*;
        match self {
            KeyNotFound
            | MissingUserId
            | CachedKeyAuthenticationFailure
            | AuthenticationFailure
            | LoginDeniedByAccountStatus
            | InvalidUserIdOrApiKey
            | InvalidUsernameOrPassword => ErrorCategory::Authentication,

            SecurityLevelNotHighEnough
            | CharacterDoesNotBelongToAccount
            | MustHaveAccountantRole
            | NotAvailableForNpcCorps
            | MustHaveAccountantOrTraderRole
            | MustBeDirectorOrCeo
            | CharacterNeedsFactoryManagerRole
            | CorporationNotInAlliance
            | BetaAccessDenied => ErrorCategory::Authorization,

            InvalidCharacterId
            | InvalidBeforeRefId
            | InvalidAccountKey
            | AccountKeyOutOfRange
            | InvalidBeforeTransId
            | InvalidInteger
            | VersionMismatch
            | VersionEscalation
            | InvalidItemId
            | ExpectedBeforeKillId
            | UnexpectedBeforeKillId
            | BadBeforeKillId
            | GetNameInvalid
            | GetIdInvalid
            | InvalidInput
            | InvalidRace
            | InvalidGender
            | InvalidBloodline
            | InvalidAttribute
            | InvalidRefType
            | NoCorporation
            | InvalidCharId
            | InvalidCorpId => ErrorCategory::InvalidParameter,

            WalletNotPreviouslyLoaded
            | WalletExhausted
            | WalletPreviouslyLoaded
            | AssetsAlreadyFetched
            | IndustryJobsAlreadyFetched
            | MarketOrdersAlreadyFetched
            | KillsExhausted
            | CacheNotExpired
            | ObeyCacheTimers => ErrorCategory::Exhausted,

            NullDataComponent
            | CorporateRoleFetchFailure
            | UserInformationFetchFailure
            | CsvHeaderRowMismatch
            | TranquilityTimeFailure
            | StarbaseDetailFetchFailure
            | DatabaseConnectionFailure
            | CharacterRetrievalFailure
            | CorporationRetrievalFailure
            | WebsiteOffline
            | DatabaseOffline
            | UserForced => ErrorCategory::ServiceUnavailable,

            Unrecognized => ErrorCategory::Unrecognized,
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Unrecognized => write!(f, "Unrecognized API error"),
            other => write!(f, "{:?}", other),
        }
    }
}
