use std::{collections::HashMap, fmt, str::FromStr};

use url::Url;

use super::errors::DIDResolutionError;

pub type ParsedDIDUrl = (String, HashMap<String, String>, Option<String>);

/// Parses DID URL into (did, query, fragment)
pub fn parse_did_url(did_url: &str) -> Result<ParsedDIDUrl, DIDResolutionError> {
    if !did_url.starts_with("did:") || did_url.contains("%%") {
        return Err(DIDResolutionError::InvalidDidUrl);
    }

    let parts: Vec<_> = did_url.split(':').collect();
    if parts.len() < 3 || parts[1].is_empty() {
        return Err(DIDResolutionError::InvalidDidUrl);
    }

    let url = did_url.replace(':', "%%");
    let url = Url::parse(&format!("scheme://{}", url)).map_err(|_| DIDResolutionError::InvalidDidUrl)?;
    let domain = url.domain().ok_or(DIDResolutionError::InvalidDidUrl)?;

    let did = domain.replace("%%", ":");
    let query = url
        .query_pairs()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    let fragment = url.fragment().map(|x| x.to_string());

    Ok((did, query, fragment))
}

/// A `<DID>#<fragment>` string selecting one verification method of one DID document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyReference {
    did: String,
    fragment: String,
}

impl KeyReference {
    pub fn did(&self) -> &str {
        &self.did
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }
}

impl FromStr for KeyReference {
    type Err = DIDResolutionError;

    fn from_str(key_ref: &str) -> Result<Self, Self::Err> {
        let (did, fragment) = key_ref.split_once('#').ok_or(DIDResolutionError::InvalidDidUrl)?;

        if fragment.is_empty() || fragment.contains('#') {
            return Err(DIDResolutionError::InvalidDidUrl);
        }

        let mut segments = did.splitn(3, ':');
        match (segments.next(), segments.next(), segments.next()) {
            (Some("did"), Some(method), Some(id)) if !method.is_empty() && !id.is_empty() => Ok(KeyReference {
                did: did.to_string(),
                fragment: fragment.to_string(),
            }),
            _ => Err(DIDResolutionError::InvalidDid),
        }
    }
}

impl fmt::Display for KeyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.did, self.fragment)
    }
}
