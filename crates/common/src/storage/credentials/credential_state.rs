use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CredentialName, CredentialVersion};

/// Version history for every stored credential, keyed by [`CredentialName::lookup_key`].
/// Each history is ordered oldest first.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct CredentialState {
    credentials: BTreeMap<String, Vec<CredentialVersion>>,
}

impl CredentialState {
    pub(crate) fn find_latest(&self, name: &CredentialName) -> Option<CredentialVersion> {
        self.credentials
            .get(&name.lookup_key())
            .and_then(|versions| versions.last())
            .cloned()
    }

    pub(crate) fn find_versions(&self, name: &CredentialName) -> Vec<CredentialVersion> {
        self.credentials
            .get(&name.lookup_key())
            .map(|versions| versions.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn append(&mut self, version: CredentialVersion) {
        self.credentials
            .entry(version.name.lookup_key())
            .or_default()
            .push(version);
    }

    pub(crate) fn find_signed_by(&self, signer: &CredentialName) -> Vec<CredentialName> {
        // BTreeMap iteration keeps the result sorted by lookup key
        self.credentials
            .values()
            .filter_map(|versions| versions.last())
            .filter(|latest| latest.signed_by() == Some(signer))
            .map(|latest| latest.name.clone())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.credentials.len()
    }
}
