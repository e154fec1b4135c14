use crate::error::{PortalError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

/// A domain record held in a `Store`.
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Human readable kind, used in not-found errors.
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

/// Ordered, id-unique record collection for one domain.
///
/// Insertion order is the default display order.
#[derive(Debug, Clone)]
pub struct Store<R> {
    records: Vec<R>,
    generation: u64,
}

impl<R> Default for Store<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            generation: 0,
        }
    }
}

impl<R: Record> Store<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents wholesale.
    pub fn load(&mut self, records: Vec<R>) -> Result<()> {
        let mut seen = HashSet::new();
        for r in &records {
            if !seen.insert(r.id().to_string()) {
                return Err(PortalError::DuplicateId(r.id().to_string()));
            }
        }
        self.records = records;
        self.touch();
        Ok(())
    }

    pub fn add(&mut self, record: R) -> Result<()> {
        self.ensure_free(record.id())?;
        self.records.push(record);
        self.touch();
        Ok(())
    }

    pub fn add_front(&mut self, record: R) -> Result<()> {
        self.ensure_free(record.id())?;
        self.records.insert(0, record);
        self.touch();
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<R> {
        let idx = self
            .position(id)
            .ok_or_else(|| PortalError::not_found(R::KIND, id))?;
        let removed = self.records.remove(idx);
        self.touch();
        Ok(removed)
    }

    /// Merges the fields of `patch` (a JSON object) into the matching record.
    /// The identifier itself can not be patched.
    pub fn update(&mut self, id: &str, patch: &serde_json::Value) -> Result<&R> {
        let idx = self
            .position(id)
            .ok_or_else(|| PortalError::not_found(R::KIND, id))?;
        let Some(fields) = patch.as_object() else {
            return Err(PortalError::BadParams("patch must be an object".into()));
        };

        let mut merged = serde_json::to_value(&self.records[idx])
            .map_err(|e| PortalError::BadParams(e.to_string()))?;
        if let Some(obj) = merged.as_object_mut() {
            for (k, v) in fields {
                if k == "id" {
                    continue;
                }
                obj.insert(k.clone(), v.clone());
            }
        }
        let mut updated: R = serde_json::from_value(merged)
            .map_err(|e| PortalError::BadParams(format!("invalid patch: {e}")))?;
        updated.set_id(id.to_string());
        self.records[idx] = updated;
        self.touch();
        Ok(&self.records[idx])
    }

    /// Applies `f` to the matching record in place.
    pub fn modify<F>(&mut self, id: &str, f: F) -> Result<&R>
    where
        F: FnOnce(&mut R),
    {
        let idx = self
            .position(id)
            .ok_or_else(|| PortalError::not_found(R::KIND, id))?;
        f(&mut self.records[idx]);
        self.touch();
        Ok(&self.records[idx])
    }

    pub fn find(&self, id: &str) -> Result<&R> {
        self.records
            .iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| PortalError::not_found(R::KIND, id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// A fresh identifier that collides with nothing currently stored.
    pub fn mint_id(&self) -> String {
        loop {
            let candidate = Uuid::new_v4().to_string();
            if !self.contains(&candidate) {
                return candidate;
            }
        }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Bumped on every mutation; any view computed under an older
    /// generation is stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Builds a record from submitted form fields under a freshly minted id.
    /// Any `id` among the fields is ignored.
    pub fn from_fields(&self, fields: &serde_json::Value) -> Result<R> {
        let Some(obj) = fields.as_object() else {
            return Err(PortalError::BadParams("fields must be an object".into()));
        };
        let mut obj = obj.clone();
        obj.insert("id".to_string(), serde_json::Value::String(self.mint_id()));
        serde_json::from_value(serde_json::Value::Object(obj))
            .map_err(|e| PortalError::BadParams(format!("invalid {} fields: {e}", R::KIND)))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    fn ensure_free(&self, id: &str) -> Result<()> {
        if self.contains(id) {
            return Err(PortalError::DuplicateId(id.to_string()));
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Note {
        id: String,
        text: String,
        #[serde(default)]
        count: u32,
    }

    impl Record for Note {
        const KIND: &'static str = "note";
        fn id(&self) -> &str {
            &self.id
        }
        fn set_id(&mut self, id: String) {
            self.id = id;
        }
    }

    fn note(id: &str, text: &str) -> Note {
        Note {
            id: id.into(),
            text: text.into(),
            count: 0,
        }
    }

    #[test]
    fn load_rejects_duplicate_ids() {
        let mut s = Store::new();
        let res = s.load(vec![note("1", "a"), note("1", "b")]);
        assert!(matches!(res, Err(PortalError::DuplicateId(id)) if id == "1"));
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn load_bumps_generation() {
        let mut s = Store::new();
        let g0 = s.generation();
        s.load(vec![note("1", "a")]).unwrap();
        assert!(s.generation() > g0);
    }

    #[test]
    fn add_collision_is_an_error_not_a_corruption() {
        let mut s = Store::new();
        s.load(vec![note("1", "a")]).unwrap();
        assert!(matches!(s.add(note("1", "b")), Err(PortalError::DuplicateId(_))));
        assert_eq!(s.len(), 1);
        assert_eq!(s.find("1").unwrap().text, "a");
    }

    #[test]
    fn missing_ids_are_reported() {
        let mut s: Store<Note> = Store::new();
        assert!(matches!(s.remove("9"), Err(PortalError::NotFound { .. })));
        assert!(matches!(
            s.update("9", &json!({ "text": "x" })),
            Err(PortalError::NotFound { .. })
        ));
        assert!(matches!(s.find("9"), Err(PortalError::NotFound { .. })));
    }

    #[test]
    fn update_merges_fields_and_keeps_id() {
        let mut s = Store::new();
        s.load(vec![note("1", "a")]).unwrap();
        let r = s
            .update("1", &json!({ "text": "b", "count": 4, "id": "other" }))
            .unwrap();
        assert_eq!(r, &Note { id: "1".into(), text: "b".into(), count: 4 });
    }

    #[test]
    fn update_with_wrong_type_leaves_record_untouched() {
        let mut s = Store::new();
        s.load(vec![note("1", "a")]).unwrap();
        assert!(matches!(
            s.update("1", &json!({ "count": "many" })),
            Err(PortalError::BadParams(_))
        ));
        assert_eq!(s.find("1").unwrap().count, 0);
    }

    #[test]
    fn minted_ids_survive_deletions() {
        let mut s = Store::new();
        s.load(vec![note("1", "a"), note("2", "b"), note("3", "c")]).unwrap();
        s.remove("2").unwrap();
        let fresh = s.mint_id();
        assert!(!s.contains(&fresh));
        assert_ne!(fresh, (s.len() + 1).to_string());
        s.add(note(&fresh, "d")).unwrap();
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn add_front_prepends() {
        let mut s = Store::new();
        s.load(vec![note("1", "a")]).unwrap();
        s.add_front(note("2", "b")).unwrap();
        let ids: Vec<&str> = s.records().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn from_fields_mints_a_fresh_id() {
        let mut s = Store::new();
        s.load(vec![note("1", "a")]).unwrap();
        let built = s.from_fields(&json!({ "id": "1", "text": "b" })).unwrap();
        assert_ne!(built.id, "1");
        assert_eq!(built.text, "b");
        assert!(s.from_fields(&json!({ "count": 2 })).is_err());
        assert!(s.from_fields(&json!("text")).is_err());
    }
}
