//! Local preferences in SQLite: Horizon URL, language and recent accounts.
//!
//! `PrefsStore` is the synchronous key/value table. `Prefs` runs a store on
//! a blocking worker and is what the app holds.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::spawn_blocking;

use crate::i18n::{normalize_lang, Lang};
use crate::search::AccountHistory;

pub const KEY_HORIZON_URL: &str = "horizonURL";
pub const KEY_LANG: &str = "viewer_lang";
pub const KEY_ACCOUNT_HISTORY: &str = "viewer_account_history";

pub struct PrefsStore {
    conn: Connection,
}

impl PrefsStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "busy_timeout", 250)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS prefs(
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(PrefsStore { conn })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT value FROM prefs WHERE key = ?", params![key], |r| r.get(0))
            .optional()?)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO prefs(key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM prefs WHERE key = ?", params![key])?;
        Ok(())
    }

    pub fn horizon_url(&self) -> Result<Option<String>> {
        Ok(self.get(KEY_HORIZON_URL)?.filter(|u| !u.trim().is_empty()))
    }

    pub fn set_horizon_url(&self, url: &str) -> Result<()> {
        self.set(KEY_HORIZON_URL, url.trim().trim_end_matches('/'))
    }

    pub fn reset_horizon_url(&self) -> Result<()> {
        self.remove(KEY_HORIZON_URL)
    }

    pub fn lang(&self) -> Result<Option<Lang>> {
        Ok(self.get(KEY_LANG)?.as_deref().and_then(normalize_lang))
    }

    pub fn set_lang(&self, lang: Lang) -> Result<()> {
        self.set(KEY_LANG, lang.code())
    }

    pub fn account_history(&self) -> Result<AccountHistory> {
        Ok(AccountHistory::from_json(
            self.get(KEY_ACCOUNT_HISTORY)?.as_deref(),
        ))
    }

    /// Record a visit and return the updated list.
    pub fn push_account(&self, id: &str) -> Result<AccountHistory> {
        let mut h = self.account_history()?;
        h.push(id);
        self.set(KEY_ACCOUNT_HISTORY, &h.to_json())?;
        Ok(h)
    }
}

enum PrefsMsg {
    Get {
        key: String,
        resp: oneshot::Sender<Option<String>>,
    },
    Set {
        key: String,
        value: String,
    },
    Remove {
        key: String,
    },
    PushAccount {
        id: String,
        resp: oneshot::Sender<AccountHistory>,
    },
}

/// Handle to the preferences worker.
#[derive(Clone)]
pub struct Prefs {
    tx: UnboundedSender<PrefsMsg>,
}

impl Prefs {
    pub fn start(db_path: &str) -> Result<Self> {
        Ok(Self::with_store(PrefsStore::open(db_path)?))
    }

    pub fn with_store(store: PrefsStore) -> Self {
        let (tx, mut rx) = unbounded_channel::<PrefsMsg>();
        spawn_blocking(move || {
            while let Some(msg) = rx.blocking_recv() {
                match msg {
                    PrefsMsg::Get { key, resp } => {
                        let v = store.get(&key).unwrap_or_else(|e| {
                            log::warn!("[prefs] get {key}: {e}");
                            None
                        });
                        let _ = resp.send(v);
                    }
                    PrefsMsg::Set { key, value } => {
                        if let Err(e) = store.set(&key, &value) {
                            log::warn!("[prefs] set {key}: {e}");
                        }
                    }
                    PrefsMsg::Remove { key } => {
                        if let Err(e) = store.remove(&key) {
                            log::warn!("[prefs] remove {key}: {e}");
                        }
                    }
                    PrefsMsg::PushAccount { id, resp } => {
                        let h = store.push_account(&id).unwrap_or_else(|e| {
                            log::warn!("[prefs] history: {e}");
                            AccountHistory::default()
                        });
                        let _ = resp.send(h);
                    }
                }
            }
        });
        Prefs { tx }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let (resp, rx) = oneshot::channel();
        if self.tx.send(PrefsMsg::Get { key: key.to_string(), resp }).is_err() {
            return None;
        }
        rx.await.ok().flatten()
    }

    pub fn set(&self, key: &str, value: &str) {
        let _ = self.tx.send(PrefsMsg::Set {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    pub fn remove(&self, key: &str) {
        let _ = self.tx.send(PrefsMsg::Remove { key: key.to_string() });
    }

    pub async fn horizon_url(&self) -> Option<String> {
        self.get(KEY_HORIZON_URL).await.filter(|u| !u.trim().is_empty())
    }

    pub fn set_horizon_url(&self, url: &str) {
        self.set(KEY_HORIZON_URL, url.trim().trim_end_matches('/'));
    }

    pub fn reset_horizon_url(&self) {
        self.remove(KEY_HORIZON_URL);
    }

    pub async fn lang(&self) -> Option<Lang> {
        self.get(KEY_LANG).await.as_deref().and_then(normalize_lang)
    }

    pub async fn account_history(&self) -> AccountHistory {
        AccountHistory::from_json(self.get(KEY_ACCOUNT_HISTORY).await.as_deref())
    }

    pub async fn push_account(&self, id: &str) -> AccountHistory {
        let (resp, rx) = oneshot::channel();
        if self
            .tx
            .send(PrefsMsg::PushAccount { id: id.to_string(), resp })
            .is_err()
        {
            return AccountHistory::default();
        }
        rx.await.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_round_trip() {
        let s = PrefsStore::open_in_memory().unwrap();
        assert_eq!(s.get("x").unwrap(), None);
        s.set("x", "1").unwrap();
        s.set("x", "2").unwrap();
        assert_eq!(s.get("x").unwrap().as_deref(), Some("2"));
        s.remove("x").unwrap();
        assert_eq!(s.get("x").unwrap(), None);
    }

    #[test]
    fn horizon_url_reset() {
        let s = PrefsStore::open_in_memory().unwrap();
        s.set_horizon_url(" https://horizon-testnet.stellar.org/ ").unwrap();
        assert_eq!(
            s.horizon_url().unwrap().as_deref(),
            Some("https://horizon-testnet.stellar.org")
        );
        s.reset_horizon_url().unwrap();
        assert_eq!(s.horizon_url().unwrap(), None);
    }

    #[test]
    fn lang_is_normalised() {
        let s = PrefsStore::open_in_memory().unwrap();
        s.set(KEY_LANG, "ru-RU").unwrap();
        assert_eq!(s.lang().unwrap(), Some(Lang::Ru));
        s.set_lang(Lang::Es).unwrap();
        assert_eq!(s.get(KEY_LANG).unwrap().as_deref(), Some("es"));
    }

    #[test]
    fn history_persists() {
        let s = PrefsStore::open_in_memory().unwrap();
        s.push_account("GA").unwrap();
        s.push_account("GB").unwrap();
        let h = s.push_account("GA").unwrap();
        assert_eq!(h.items(), &["GA".to_string(), "GB".to_string()]);
        assert_eq!(s.account_history().unwrap(), h);
    }

    #[tokio::test]
    async fn worker_serves_requests() {
        let prefs = Prefs::with_store(PrefsStore::open_in_memory().unwrap());
        prefs.set_horizon_url("https://h.example");
        assert_eq!(prefs.horizon_url().await.as_deref(), Some("https://h.example"));
        prefs.reset_horizon_url();
        assert_eq!(prefs.horizon_url().await, None);
        let h = prefs.push_account("GA").await;
        assert_eq!(h.items().len(), 1);
        assert_eq!(prefs.account_history().await.items().len(), 1);
    }
}
