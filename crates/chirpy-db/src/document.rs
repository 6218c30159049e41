use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use chirpy_types::models::{Chirp, ChirpId, RevocationRecord, User, UserId};

/// The whole persisted state. Every mutation rewrites it in full.
///
/// The id counters live next to the collections so that ids are never reused,
/// even after deletions. Files written before the counters existed still load:
/// allocation never hands out an id at or below the highest one present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub users: BTreeMap<UserId, User>,
    #[serde(default, alias = "posts")]
    pub chirps: BTreeMap<ChirpId, Chirp>,
    #[serde(default)]
    pub revocations: BTreeMap<String, RevocationRecord>,
    #[serde(default)]
    next_user_id: UserId,
    #[serde(default)]
    next_chirp_id: ChirpId,
}

impl Document {
    pub fn allocate_user_id(&mut self) -> UserId {
        let id = next_id(self.next_user_id, self.users.keys().next_back());
        self.next_user_id = id + 1;
        id
    }

    pub fn allocate_chirp_id(&mut self) -> ChirpId {
        let id = next_id(self.next_chirp_id, self.chirps.keys().next_back());
        self.next_chirp_id = id + 1;
        id
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }
}

fn next_id(counter: u32, highest: Option<&u32>) -> u32 {
    let after_highest = highest.map_or(0, |h| h + 1);
    counter.max(after_highest).max(1)
}
