//! Grouped object store mirrored to clients through `get_objects` and
//! `get_attributes`.
//!
//! Every object belongs to zero or more groups. Groups carry a free-form
//! attribute map; the `priority-level` attribute decides draw order.

use std::collections::{BTreeMap, HashMap};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BackendError, BackendResult};

pub const OBJECT_PREFIX: &str = "u";
pub const GROUP_PREFIX: &str = "g";
pub const PRIORITY_LEVEL: &str = "priority-level";
pub const LOWEST_PRIORITY_LEVEL: i64 = 0;
pub const HIGHEST_PRIORITY_LEVEL: i64 = i64::MAX;

const ID_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const ID_LEN: usize = 22;

pub type Attributes = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    #[serde(default)]
    pub gid: Vec<String>,
    pub name: String,
    #[serde(default)]
    pub body: Vec<[i64; 2]>,
    #[serde(default)]
    pub velocity: [i64; 2],
}

/// True if `id` looks like `<prefix>-<suffix>`.
pub fn is_id(id: &str, prefix: &str) -> bool {
    match id.rfind('-') {
        Some(idx) => &id[..idx] == prefix,
        None => false,
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    rng: ChaCha8Rng,
    objects: BTreeMap<String, SceneObject>,
    groups: BTreeMap<String, Vec<String>>,
    attributes: BTreeMap<String, Attributes>,
}

impl Scene {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            objects: BTreeMap::new(),
            groups: BTreeMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.groups.clear();
        self.attributes.clear();
    }

    pub fn new_group(&mut self, priority_level: i64) -> String {
        let gid = self.new_id(GROUP_PREFIX);
        self.groups.entry(gid.clone()).or_default();
        self.attributes
            .entry(gid.clone())
            .or_default()
            .insert(PRIORITY_LEVEL.to_string(), Value::from(priority_level));
        gid
    }

    pub fn add_object(&mut self, name: &str, body: Vec<[i64; 2]>, gids: &[String]) -> String {
        let uid = self.new_id(OBJECT_PREFIX);
        self.objects.insert(
            uid.clone(),
            SceneObject {
                gid: Vec::new(),
                name: name.to_string(),
                body,
                velocity: [0, 0],
            },
        );
        for gid in gids {
            // uid was inserted above, attach cannot miss it
            let _ = self.attach_group(&uid, gid);
        }
        uid
    }

    pub fn remove_object(&mut self, uid: &str) -> BackendResult<SceneObject> {
        let object = self
            .objects
            .remove(uid)
            .ok_or_else(|| BackendError::UnknownId(uid.to_string()))?;
        for gid in &object.gid {
            self.drop_member(gid, uid);
        }
        Ok(object)
    }

    pub fn attach_group(&mut self, uid: &str, gid: &str) -> BackendResult<()> {
        let object = self
            .objects
            .get_mut(uid)
            .ok_or_else(|| BackendError::UnknownId(uid.to_string()))?;
        if object.gid.iter().any(|g| g == gid) {
            return Ok(());
        }
        object.gid.push(gid.to_string());
        self.groups.entry(gid.to_string()).or_default().push(uid.to_string());
        self.attributes
            .entry(gid.to_string())
            .or_default()
            .entry(PRIORITY_LEVEL.to_string())
            .or_insert_with(|| Value::from(HIGHEST_PRIORITY_LEVEL));
        Ok(())
    }

    pub fn detach_group(&mut self, uid: &str, gid: &str) -> BackendResult<()> {
        let object = self
            .objects
            .get_mut(uid)
            .ok_or_else(|| BackendError::UnknownId(uid.to_string()))?;
        let before = object.gid.len();
        object.gid.retain(|g| g != gid);
        if object.gid.len() != before {
            self.drop_member(gid, uid);
        }
        Ok(())
    }

    pub fn set_body(&mut self, uid: &str, body: Vec<[i64; 2]>) -> BackendResult<()> {
        let object = self
            .objects
            .get_mut(uid)
            .ok_or_else(|| BackendError::UnknownId(uid.to_string()))?;
        object.body = body;
        Ok(())
    }

    pub fn set_velocity(&mut self, uid: &str, velocity: [i64; 2]) -> BackendResult<()> {
        let object = self
            .objects
            .get_mut(uid)
            .ok_or_else(|| BackendError::UnknownId(uid.to_string()))?;
        object.velocity = velocity;
        Ok(())
    }

    pub fn add_attribute(&mut self, gid: &str, key: &str, value: Value) {
        self.attributes
            .entry(gid.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn get(&self, uid: &str) -> Option<&SceneObject> {
        self.objects.get(uid)
    }

    pub fn members(&self, gid: &str) -> &[String] {
        self.groups.get(gid).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn objects(&self) -> &BTreeMap<String, SceneObject> {
        &self.objects
    }

    pub fn attributes(&self) -> &BTreeMap<String, Attributes> {
        &self.attributes
    }

    /// Highest priority level among the object's groups.
    pub fn priority_of(&self, uid: &str) -> i64 {
        self.objects
            .get(uid)
            .into_iter()
            .flat_map(|object| object.gid.iter())
            .filter_map(|gid| self.attributes.get(gid))
            .filter_map(|attributes| attributes.get(PRIORITY_LEVEL).and_then(Value::as_i64))
            .max()
            .unwrap_or(LOWEST_PRIORITY_LEVEL)
    }

    /// Map each covered cell to the uid drawn on top of it.
    pub fn by_cell(&self) -> HashMap<[i64; 2], String> {
        let mut items: Vec<(&String, &SceneObject)> = self.objects.iter().collect();
        items.sort_by_key(|(uid, _)| self.priority_of(uid));

        let mut cells = HashMap::new();
        for (uid, object) in items {
            for cell in &object.body {
                cells.insert(*cell, uid.clone());
            }
        }
        cells
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.objects)
    }

    /// Replace the object table from its JSON form and rebuild group membership.
    pub fn load_json(&mut self, raw: &str) -> serde_json::Result<()> {
        self.objects = serde_json::from_str(raw)?;
        self.groups.clear();
        for (uid, object) in &self.objects {
            for gid in &object.gid {
                self.groups.entry(gid.clone()).or_default().push(uid.clone());
            }
        }
        Ok(())
    }

    fn drop_member(&mut self, gid: &str, uid: &str) {
        let empty = match self.groups.get_mut(gid) {
            Some(members) => {
                members.retain(|m| m != uid);
                members.is_empty()
            }
            None => false,
        };
        if empty {
            self.groups.remove(gid);
            self.attributes.remove(gid);
        }
    }

    /// Samples the suffix from the base58 alphabet directly. Nothing is
    /// encoded, so no base58 codec is involved.
    fn new_id(&mut self, prefix: &str) -> String {
        let suffix: String = (0..ID_LEN)
            .map(|_| ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        format!("{prefix}-{suffix}")
    }
}
