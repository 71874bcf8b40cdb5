//! Playlist pagination state
//!
//! The playlist queue only ever holds a window of the playlist. The pager
//! remembers which order value to fetch next and whether a refill for the
//! current playlist session is already in flight, so two quick advances never
//! request the same offset twice.

use riffle_common::PlaylistId;

/// A page fetch the engine should issue in the background
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefillRequest {
    pub session_id: u64,
    pub playlist_id: PlaylistId,
    pub offset: u32,
    pub limit: u32,
}

#[derive(Debug, Clone)]
struct PagerSession {
    id: u64,
    playlist_id: PlaylistId,
    next_order: u32,
    exhausted: bool,
    in_flight: bool,
}

#[derive(Debug, Clone)]
pub struct PlaylistPager {
    page_size: u32,
    low_water_mark: usize,
    session: Option<PagerSession>,
    next_session_id: u64,
}

impl PlaylistPager {
    pub fn new(page_size: u32, low_water_mark: usize) -> Self {
        Self {
            page_size,
            low_water_mark,
            session: None,
            next_session_id: 1,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Begin paging `playlist_id` after the first page was delivered
    ///
    /// `delivered` is the length of that first page. Any previous session is
    /// replaced, which orphans its in-flight refill.
    pub fn start(&mut self, playlist_id: PlaylistId, start_order: u32, delivered: usize) -> u64 {
        let id = self.next_session_id;
        self.next_session_id += 1;
        self.session = Some(PagerSession {
            id,
            playlist_id,
            next_order: start_order.saturating_add(delivered as u32),
            exhausted: (delivered as u32) < self.page_size,
            in_flight: false,
        });
        id
    }

    /// Forget the current session; any pending refill result will be dropped
    pub fn stop(&mut self) {
        self.session = None;
    }

    /// Decide whether a refill is due given the remaining playlist queue length
    ///
    /// Marks the session in flight when a request is returned.
    pub fn refill_request(&mut self, remaining: usize) -> Option<RefillRequest> {
        let page_size = self.page_size;
        let session = self.session.as_mut()?;
        if session.exhausted || session.in_flight || remaining > self.low_water_mark {
            return None;
        }
        session.in_flight = true;
        Some(RefillRequest {
            session_id: session.id,
            playlist_id: session.playlist_id.clone(),
            offset: session.next_order,
            limit: page_size,
        })
    }

    /// Record a finished refill
    ///
    /// Returns false when the session that issued the request is gone; the
    /// caller must then discard the fetched entries.
    pub fn complete(&mut self, session_id: u64, delivered: usize) -> bool {
        let page_size = self.page_size;
        match self.session.as_mut() {
            Some(session) if session.id == session_id => {
                session.in_flight = false;
                session.next_order = session.next_order.saturating_add(delivered as u32);
                if (delivered as u32) < page_size {
                    session.exhausted = true;
                }
                true
            }
            _ => false,
        }
    }

    /// Clear the in-flight flag after a failed refill so a later advance retries
    pub fn fail(&mut self, session_id: u64) {
        if let Some(session) = self.session.as_mut() {
            if session.id == session_id {
                session.in_flight = false;
            }
        }
    }

    pub fn active_playlist(&self) -> Option<&PlaylistId> {
        self.session.as_ref().map(|s| &s.playlist_id)
    }

    pub fn is_in_flight(&self) -> bool {
        self.session.as_ref().map(|s| s.in_flight).unwrap_or(false)
    }

    pub fn is_exhausted(&self) -> bool {
        self.session.as_ref().map(|s| s.exhausted).unwrap_or(true)
    }

    pub fn next_order(&self) -> Option<u32> {
        self.session.as_ref().map(|s| s.next_order)
    }
}
