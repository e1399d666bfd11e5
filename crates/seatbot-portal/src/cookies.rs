use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::PathBuf;

use dashmap::DashMap;
use tracing::{info, warn};

use seatbot_core::error::Result;
use seatbot_core::types::CookieRecord;

/// Cookie fields exposed for editing in the front-end, in display order.
pub const EDITABLE_COOKIES: &[&str] = &[
    "ASP.NET_SessionId",
    "cookie_come_sno",
    "cookie_come_timestamp",
    "dt_cookie_user_name_remember",
];

/// Fixed-value cookies the portal sets once at login; they are never
/// edited, only preserved across saves.
const CARRY_OVER_COOKIES: &[&str] = &["cookie_unit_name", "cookie_come_app"];

/// Session-bearing cookies the portal marks HttpOnly.
const HTTP_ONLY_COOKIES: &[&str] = &[
    "ASP.NET_SessionId",
    "cookie_come_sno",
    "dt_cookie_user_name_remember",
];

/// Resolves the effective `Cookie` header for a logical client.
///
/// Per-client record sets live in memory for the life of the process; a
/// client without one falls back to the globally persisted set in
/// `cookies.json`. Record sets are replaced wholesale on save, never
/// merged field by field.
pub struct CookieStore {
    host: String,
    path: PathBuf,
    by_client: DashMap<String, Vec<CookieRecord>>,
}

impl CookieStore {
    pub fn new(host: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            by_client: DashMap::new(),
        }
    }

    /// Build the `Cookie` header for a client: its own record set when one
    /// exists, the persisted global set otherwise, empty when neither does.
    pub fn resolve(&self, client_id: Option<&str>) -> String {
        build_header(&self.records_for(client_id), &self.host)
    }

    /// Name→value view of the effective record set, for the cookie editor.
    /// Uses the same per-name precedence as header construction so the
    /// editor shows exactly what would be sent.
    pub fn fields(&self, client_id: Option<&str>) -> BTreeMap<String, String> {
        let records = self.records_for(client_id);
        let mut out = BTreeMap::new();
        for record in select_effective(&records, &self.host) {
            out.insert(record.name.clone(), record.value.clone());
        }
        out
    }

    /// Replace the client's record set (or the persisted global set when no
    /// client is given) from the recognized editable fields. Returns the
    /// number of records written.
    pub fn save(&self, client_id: Option<&str>, fields: &HashMap<String, String>) -> Result<usize> {
        let previous = self.records_for(client_id);
        let mut out = Vec::new();

        for name in EDITABLE_COOKIES {
            let Some(value) = fields.get(*name).map(|v| v.trim()) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            let http_only = HTTP_ONLY_COOKIES.contains(name);
            // Two variants per field: the exact-host secure cookie and the
            // wildcard-domain one, matching what the portal itself sets.
            out.push(self.record(name, value, self.host.clone(), true, http_only));
            out.push(self.record(name, value, format!(".{}", self.host), false, http_only));
        }

        out.extend(
            previous
                .into_iter()
                .filter(|c| CARRY_OVER_COOKIES.contains(&c.name.as_str())),
        );

        let count = out.len();
        match client_id {
            Some(id) => {
                self.by_client.insert(id.to_string(), out);
                info!(client = %id, count, "client cookie set replaced");
            }
            None => {
                if let Some(parent) = self.path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&self.path, serde_json::to_string_pretty(&out)?)?;
                info!(path = %self.path.display(), count, "persisted cookie set replaced");
            }
        }
        Ok(count)
    }

    fn record(
        &self,
        name: &str,
        value: &str,
        domain: String,
        secure: bool,
        http_only: bool,
    ) -> CookieRecord {
        CookieRecord {
            name: name.to_string(),
            value: value.to_string(),
            domain,
            secure,
            http_only,
            same_site: "Lax".to_string(),
            path: "/".to_string(),
        }
    }

    fn records_for(&self, client_id: Option<&str>) -> Vec<CookieRecord> {
        if let Some(id) = client_id {
            if let Some(records) = self.by_client.get(id) {
                return records.clone();
            }
        }
        self.load_persisted()
    }

    fn load_persisted(&self) -> Vec<CookieRecord> {
        let Ok(text) = std::fs::read_to_string(&self.path) else {
            return vec![];
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), err = %e, "cookie file unreadable, treating as empty");
            vec![]
        })
    }
}

/// Pick the effective record per name: an exact-host domain beats the
/// wildcard domain; within the same precedence the later record wins.
/// Returned in first-seen name order.
fn select_effective<'a>(records: &'a [CookieRecord], host: &str) -> Vec<&'a CookieRecord> {
    let mut order: Vec<&str> = Vec::new();
    let mut chosen: HashMap<&str, &CookieRecord> = HashMap::new();

    for record in records {
        match chosen.get(record.name.as_str()) {
            None => {
                order.push(&record.name);
                chosen.insert(&record.name, record);
            }
            Some(current) => {
                let current_exact = current.domain == host;
                let new_exact = record.domain == host;
                if new_exact || !current_exact {
                    chosen.insert(&record.name, record);
                }
            }
        }
    }

    order.into_iter().filter_map(|name| chosen.get(name).copied()).collect()
}

fn build_header(records: &[CookieRecord], host: &str) -> String {
    select_effective(records, host)
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "libwx.hunnu.edu.cn";

    fn record(name: &str, value: &str, domain: &str) -> CookieRecord {
        CookieRecord {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            secure: domain == HOST,
            http_only: true,
            same_site: "Lax".into(),
            path: "/".into(),
        }
    }

    fn store_at(dir: &tempfile::TempDir) -> CookieStore {
        CookieStore::new(HOST, dir.path().join("cookies.json"))
    }

    #[test]
    fn exact_host_wins_over_wildcard_regardless_of_order() {
        let wildcard_first = [
            record("sid", "from-wildcard", ".libwx.hunnu.edu.cn"),
            record("sid", "from-exact", HOST),
        ];
        let exact_first = [
            record("sid", "from-exact", HOST),
            record("sid", "from-wildcard", ".libwx.hunnu.edu.cn"),
        ];
        assert_eq!(build_header(&wildcard_first, HOST), "sid=from-exact");
        assert_eq!(build_header(&exact_first, HOST), "sid=from-exact");
    }

    #[test]
    fn last_record_wins_within_same_precedence() {
        let records = [
            record("sid", "old", HOST),
            record("sid", "new", HOST),
        ];
        assert_eq!(build_header(&records, HOST), "sid=new");

        let records = [
            record("sid", "old", ".libwx.hunnu.edu.cn"),
            record("sid", "new", ".libwx.hunnu.edu.cn"),
        ];
        assert_eq!(build_header(&records, HOST), "sid=new");
    }

    #[test]
    fn header_keeps_first_seen_name_order() {
        let records = [
            record("a", "1", HOST),
            record("b", "2", HOST),
            record("a", "3", HOST),
        ];
        assert_eq!(build_header(&records, HOST), "a=3; b=2");
    }

    #[test]
    fn resolve_is_empty_without_any_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);
        assert_eq!(store.resolve(Some("nobody")), "");
        assert_eq!(store.resolve(None), "");
    }

    #[test]
    fn save_emits_two_records_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);
        let mut fields = HashMap::new();
        fields.insert("ASP.NET_SessionId".to_string(), "abc".to_string());
        fields.insert("cookie_come_sno".to_string(), "2020123".to_string());
        fields.insert("cookie_come_timestamp".to_string(), "  ".to_string()); // blank → skipped

        let count = store.save(Some("client-1"), &fields).unwrap();
        assert_eq!(count, 4);

        let header = store.resolve(Some("client-1"));
        assert!(header.contains("ASP.NET_SessionId=abc"));
        assert!(header.contains("cookie_come_sno=2020123"));
        // one value per name despite the secure/insecure pair
        assert_eq!(header.matches("ASP.NET_SessionId=").count(), 1);
    }

    #[test]
    fn save_carries_over_fixed_cookies() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);

        // Seed the persisted set with a carry-over cookie and an editable one.
        let seeded = vec![
            record("cookie_unit_name", "library", HOST),
            record("ASP.NET_SessionId", "stale", HOST),
        ];
        std::fs::write(
            dir.path().join("cookies.json"),
            serde_json::to_string(&seeded).unwrap(),
        )
        .unwrap();

        let mut fields = HashMap::new();
        fields.insert("ASP.NET_SessionId".to_string(), "fresh".to_string());
        let count = store.save(None, &fields).unwrap();
        // 2 for the session id pair + 1 carried over; the stale editable
        // record is dropped, not merged.
        assert_eq!(count, 3);

        let header = store.resolve(None);
        assert!(header.contains("ASP.NET_SessionId=fresh"));
        assert!(header.contains("cookie_unit_name=library"));
        assert!(!header.contains("stale"));
    }

    #[test]
    fn per_client_set_shadows_persisted_set() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);

        let mut global = HashMap::new();
        global.insert("ASP.NET_SessionId".to_string(), "global".to_string());
        store.save(None, &global).unwrap();

        let mut client = HashMap::new();
        client.insert("ASP.NET_SessionId".to_string(), "mine".to_string());
        store.save(Some("client-1"), &client).unwrap();

        assert!(store.resolve(Some("client-1")).contains("mine"));
        assert!(store.resolve(Some("client-2")).contains("global"));
        assert!(store.resolve(None).contains("global"));
    }
}
