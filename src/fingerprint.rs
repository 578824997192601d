//! Deterministic request fingerprints.
//!
//! A fingerprint identifies one logical call: the `category/endpoint` part of
//! the source path followed by every non-empty parameter, sorted by key.
//!
//! ```
//! use eveapi_xml::fingerprint::fingerprint;
//! use eveapi_xml::{RequestParams, Source};
//!
//! let source = Source::parse("https://api.eveonline.com/char/CharacterSheet.xml.aspx").unwrap();
//! let params = RequestParams::new().with("characterID", 123);
//! assert_eq!(
//!     fingerprint(&source, &params).unwrap(),
//!     "char/CharacterSheet.xml.aspx:characterid:123"
//! );
//! ```

use crate::error::{EveApiError, Result};
use crate::fetch::Source;
use crate::params::RequestParams;

/// Compute the fingerprint of a call to `source` with `params`.
///
/// The [`JUST_HASH`](crate::params::JUST_HASH) and
/// [`URL_OVERRIDE`](crate::params::URL_OVERRIDE) entries never take part.
/// Fails if the source path has fewer than two segments.
pub fn fingerprint(source: &Source, params: &RequestParams) -> Result<String> {
    let path = source.path_string();
    let fragment = endpoint_fragment(&path)?;

    let mut parts = vec![fragment];
    for (key, value) in params.payload() {
        parts.push(key.to_string());
        parts.push(value.to_string());
    }
    Ok(parts.join(":"))
}

/// The last two segments of a path, joined with `/`
fn endpoint_fragment(path: &str) -> Result<String> {
    let segments: Vec<&str> = path.split('/').collect();
    match segments.as_slice() {
        [.., category, endpoint] if !category.is_empty() && !endpoint.is_empty() => {
            Ok(format!("{}/{}", category, endpoint))
        }
        _ => Err(EveApiError::invalid_input(format!(
            "cannot fingerprint {:?}: need at least two path segments",
            path
        ))),
    }
}
