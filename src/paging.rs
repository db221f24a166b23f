//! Cursor-driven walks over Horizon collections.
//!
//! Every collection endpoint pages the same way: records carry a
//! `paging_token`, and the next request passes the last one back as
//! `cursor`. `walk` drives that loop with a visitor, a page cap and a
//! cancellation token; `Pager` does the same one page at a time for
//! "load more" in the UI.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, StellarxError};
use crate::horizon::HorizonClient;
use crate::types::{Page, Paged};

/// Horizon caps `limit` at 200.
pub const MAX_PAGE_LIMIT: u32 = 200;

#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Paged + Send;

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<Self::Item>>;
}

/// A Horizon collection path plus its fixed query params.
pub struct HorizonCollection<T> {
    client: HorizonClient,
    path: String,
    params: Vec<(String, String)>,
    _item: PhantomData<fn() -> T>,
}

impl<T> HorizonCollection<T> {
    pub fn new(client: &HorizonClient, path: impl Into<String>, params: Vec<(String, String)>) -> Self {
        HorizonCollection {
            client: client.clone(),
            path: path.into(),
            params,
            _item: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl<T> PageSource for HorizonCollection<T>
where
    T: DeserializeOwned + Paged + Send + 'static,
{
    type Item = T;

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<T>> {
        let mut q = self.params.clone();
        if let Some(c) = cursor {
            q.push(("cursor".to_string(), c.to_string()));
        }
        self.client.get_path(&self.path, &q).await
    }
}

/// `cursor` query param of a `_links.next.href`.
pub fn cursor_from_href(href: &str) -> Option<String> {
    let url = url::Url::parse(href).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "cursor")
        .map(|(_, v)| v.into_owned())
        .filter(|c| !c.is_empty())
}

/// Cursor for the page after `page`: the last record's token, else the
/// cursor embedded in the next link.
pub fn next_cursor<T: Paged>(page: &Page<T>) -> Option<String> {
    page.records()
        .last()
        .and_then(Paged::paging_token)
        .map(str::to_string)
        .or_else(|| page.next_href().and_then(cursor_from_href))
}

/// Per-record decision of a visitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    Take,
    Skip,
    Stop,
}

/// Record visitor for `walk`. Plain closures are visitors; stateful scans
/// implement `page_done` to report progress.
pub trait Visitor<T> {
    fn visit(&mut self, rec: &T) -> Visit;

    fn page_done(&mut self, _pages: usize) {}
}

impl<T, F> Visitor<T> for F
where
    F: FnMut(&T) -> Visit,
{
    fn visit(&mut self, rec: &T) -> Visit {
        self(rec)
    }
}

/// Why a walk ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkEnd {
    Exhausted,
    Cycle,
    PageCap,
    Stopped,
}

#[derive(Debug)]
pub struct Walk<T> {
    pub records: Vec<T>,
    pub pages: usize,
    pub end: WalkEnd,
}

async fn fetch_or_cancel<S>(
    source: &S,
    cursor: Option<&str>,
    cancel: &CancellationToken,
) -> Result<Page<S::Item>>
where
    S: PageSource + ?Sized,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StellarxError::Cancelled),
        r = source.fetch_page(cursor) => r,
    }
}

/// Walk pages until exhausted, a cursor repeats, the page cap is hit, the
/// visitor says stop, or `cancel` fires.
///
/// On error the records collected before the failing page come back with it.
pub async fn walk<S, V>(
    source: &S,
    cancel: &CancellationToken,
    max_pages: Option<usize>,
    visitor: &mut V,
) -> (Walk<S::Item>, Option<StellarxError>)
where
    S: PageSource + ?Sized,
    V: Visitor<S::Item> + ?Sized,
{
    let mut records = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    let end = loop {
        if max_pages.is_some_and(|cap| pages >= cap) {
            break WalkEnd::PageCap;
        }
        if cancel.is_cancelled() {
            let w = Walk { records, pages, end: WalkEnd::Stopped };
            return (w, Some(StellarxError::Cancelled));
        }
        let page = match fetch_or_cancel(source, cursor.as_deref(), cancel).await {
            Ok(p) => p,
            Err(e) => {
                if !e.is_cancelled() {
                    log::warn!("[paging] page {} failed: {e}", pages + 1);
                }
                let w = Walk { records, pages, end: WalkEnd::Stopped };
                return (w, Some(e));
            }
        };
        pages += 1;
        if page.records().is_empty() {
            break WalkEnd::Exhausted;
        }
        let next = next_cursor(&page);
        if cursor.is_some() && next == cursor {
            log::warn!("[paging] cursor {:?} repeated, stopping", cursor);
            break WalkEnd::Cycle;
        }

        let mut stopped = false;
        for rec in page.into_records() {
            match visitor.visit(&rec) {
                Visit::Take => records.push(rec),
                Visit::Skip => {}
                Visit::Stop => {
                    stopped = true;
                    break;
                }
            }
        }
        visitor.page_done(pages);
        if stopped {
            break WalkEnd::Stopped;
        }
        match next {
            Some(c) => cursor = Some(c),
            None => break WalkEnd::Exhausted,
        }
    };

    log::debug!("[paging] done pages={pages} records={} end={end:?}", records.len());
    (Walk { records, pages, end }, None)
}

/// Collect every record the visitor takes. Any page failure fails the call.
pub async fn fetch_all<S, V>(
    source: &S,
    cancel: &CancellationToken,
    max_pages: Option<usize>,
    mut visit: V,
) -> Result<Vec<S::Item>>
where
    S: PageSource + ?Sized,
    V: FnMut(&S::Item) -> Visit,
{
    match walk(source, cancel, max_pages, &mut visit).await {
        (_, Some(e)) => Err(e),
        (w, None) => Ok(w.records),
    }
}

/// Like `fetch_all` but hands back what was gathered alongside the error.
pub async fn fetch_all_partial<S, V>(
    source: &S,
    cancel: &CancellationToken,
    max_pages: Option<usize>,
    mut visit: V,
) -> (Vec<S::Item>, Option<StellarxError>)
where
    S: PageSource + ?Sized,
    V: FnMut(&S::Item) -> Visit,
{
    let (w, err) = walk(source, cancel, max_pages, &mut visit).await;
    (w.records, err)
}

/// Incremental loader behind "load more".
pub struct Pager<S: PageSource> {
    source: S,
    items: Vec<S::Item>,
    cursor: Option<String>,
    exhausted: bool,
    loaded_once: bool,
}

impl<S: PageSource> Pager<S> {
    pub fn new(source: S) -> Self {
        Pager {
            source,
            items: Vec::new(),
            cursor: None,
            exhausted: false,
            loaded_once: false,
        }
    }

    pub fn items(&self) -> &[S::Item] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_once
    }

    /// Fetch the next page and append it. Returns how many records arrived.
    pub async fn load_more(&mut self, cancel: &CancellationToken) -> Result<usize> {
        if self.exhausted {
            return Ok(0);
        }
        let page = fetch_or_cancel(&self.source, self.cursor.as_deref(), cancel).await?;
        self.loaded_once = true;
        if page.records().is_empty() {
            self.exhausted = true;
            return Ok(0);
        }
        let next = next_cursor(&page);
        if self.cursor.is_some() && next == self.cursor {
            self.exhausted = true;
            return Ok(0);
        }
        let batch = page.into_records();
        let n = batch.len();
        self.items.extend(batch);
        match next {
            Some(c) => self.cursor = Some(c),
            None => self.exhausted = true,
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Pages of tokens; the cursor is the last token handed out.
    struct Tokens {
        pages: Vec<Vec<&'static str>>,
        calls: AtomicUsize,
    }

    impl Tokens {
        fn new(pages: Vec<Vec<&'static str>>) -> Self {
            Tokens { pages, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl PageSource for Tokens {
        type Item = Value;

        async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let idx = match cursor {
                None => 0,
                Some(c) => {
                    let pos = self.pages.iter().position(|p| p.last() == Some(&c));
                    pos.map(|i| i + 1).unwrap_or(self.pages.len())
                }
            };
            let recs = self
                .pages
                .get(idx)
                .map(|p| p.iter().map(|t| json!({"paging_token": t})).collect())
                .unwrap_or_default();
            Ok(Page::new(recs, None))
        }
    }

    #[test]
    fn cursor_from_next_link() {
        assert_eq!(
            cursor_from_href("https://h/ops?cursor=123-4&limit=200&order=desc").as_deref(),
            Some("123-4")
        );
        assert_eq!(cursor_from_href("https://h/ops?limit=200"), None);
        assert_eq!(cursor_from_href("not a url"), None);
    }

    #[test]
    fn next_cursor_prefers_last_token() {
        let p = Page::new(vec![json!({"paging_token": "a"}), json!({"paging_token": "b"})], Some("https://h/?cursor=z".into()));
        assert_eq!(next_cursor(&p).as_deref(), Some("b"));
        let p: Page<Value> = Page::new(vec![json!({})], Some("https://h/?cursor=z".into()));
        assert_eq!(next_cursor(&p).as_deref(), Some("z"));
    }

    #[tokio::test]
    async fn walks_until_empty_page() {
        let src = Tokens::new(vec![vec!["1", "2"], vec!["3"]]);
        let cancel = CancellationToken::new();
        let all = fetch_all(&src, &cancel, None, |_| Visit::Take).await.unwrap();
        assert_eq!(all.len(), 3);
        // two full pages and the empty one
        assert_eq!(src.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn page_cap_and_visitor_stop() {
        let src = Tokens::new(vec![vec!["1"], vec!["2"], vec!["3"], vec!["4"]]);
        let cancel = CancellationToken::new();
        let capped = fetch_all(&src, &cancel, Some(2), |_| Visit::Take).await.unwrap();
        assert_eq!(capped.len(), 2);

        let src = Tokens::new(vec![vec!["1", "2"], vec!["3", "4"]]);
        let got = fetch_all(&src, &cancel, None, |r| {
            if r.paging_token() == Some("3") {
                Visit::Stop
            } else if r.paging_token() == Some("1") {
                Visit::Skip
            } else {
                Visit::Take
            }
        })
        .await
        .unwrap();
        let tokens: Vec<_> = got.iter().filter_map(|r| r.paging_token()).collect();
        assert_eq!(tokens, vec!["2"]);
        assert_eq!(src.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn repeated_cursor_is_not_appended() {
        // second page ends on the same token as the first
        let src = Tokens::new(vec![vec!["1", "2"], vec!["2"]]);
        struct Repeat(Tokens);
        #[async_trait]
        impl PageSource for Repeat {
            type Item = Value;
            async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<Value>> {
                self.0.calls.fetch_add(1, Ordering::SeqCst);
                let recs = match cursor {
                    None => vec![json!({"paging_token": "1"}), json!({"paging_token": "2"})],
                    Some(_) => vec![json!({"paging_token": "2"})],
                };
                Ok(Page::new(recs, None))
            }
        }
        let src = Repeat(src);
        let cancel = CancellationToken::new();
        let mut take = |_: &Value| Visit::Take;
        let (w, err) = walk(&src, &cancel, None, &mut take).await;
        assert!(err.is_none());
        assert_eq!(w.end, WalkEnd::Cycle);
        assert_eq!(w.records.len(), 2);
    }

    #[tokio::test]
    async fn cancelled_before_start() {
        let src = Tokens::new(vec![vec!["1"]]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = fetch_all(&src, &cancel, None, |_| Visit::Take).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(src.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn pager_loads_incrementally() {
        let mut pager = Pager::new(Tokens::new(vec![vec!["1", "2"], vec!["3"]]));
        let cancel = CancellationToken::new();
        assert!(pager.has_more());
        assert_eq!(pager.load_more(&cancel).await.unwrap(), 2);
        assert_eq!(pager.load_more(&cancel).await.unwrap(), 1);
        assert!(pager.has_more());
        assert_eq!(pager.load_more(&cancel).await.unwrap(), 0);
        assert!(!pager.has_more());
        assert_eq!(pager.items().len(), 3);
        assert_eq!(pager.load_more(&cancel).await.unwrap(), 0);
    }
}
