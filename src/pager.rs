//! Bounded pagination over an immutable list
//!
//! A `Pager` owns the entries, a fixed page size, an offset cursor and the
//! single user allowed to move it. Rendering a page is delegated to a
//! callback so one pager type serves every listing.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

/// Default entries per page
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Idle time after which a pager stops accepting navigation
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Opaque chat-platform user identity
pub type UserId = u64;

/// Where the cursor currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-based page number as shown to users
    pub number: usize,
    /// Total number of pages (at least 1)
    pub count: usize,
    pub offset: usize,
    pub total: usize,
}

/// Requested movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Outcome of a navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The offset changed
    Moved,
    /// Already at the boundary; nothing changed
    Unchanged,
    /// Someone other than the requester tried to navigate
    NotAuthor,
    /// The idle timeout elapsed; the pager is closed for good
    Expired,
}

type Renderer<T, V> = Box<dyn Fn(&[T], PageInfo) -> V + Send + Sync>;

/// Generic pager parametrized over the page renderer
pub struct Pager<T, V> {
    entries: Vec<T>,
    page_size: usize,
    offset: usize,
    author: UserId,
    timeout: Duration,
    last_activity: Instant,
    expired: bool,
    render: Renderer<T, V>,
}

impl<T, V> fmt::Debug for Pager<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("total", &self.entries.len())
            .field("page_size", &self.page_size)
            .field("offset", &self.offset)
            .field("author", &self.author)
            .field("expired", &self.expired)
            .finish()
    }
}

impl<T, V> Pager<T, V> {
    /// Create a pager on the first page. A zero page size is treated as 1.
    pub fn new<F>(entries: Vec<T>, page_size: usize, author: UserId, render: F) -> Self
    where
        F: Fn(&[T], PageInfo) -> V + Send + Sync + 'static,
    {
        Self {
            entries,
            page_size: page_size.max(1),
            offset: 0,
            author,
            timeout: NAVIGATION_TIMEOUT,
            last_activity: Instant::now(),
            expired: false,
            render: Box::new(render),
        }
    }

    /// Override the idle timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn author(&self) -> UserId {
        self.author
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest valid offset: the last page is never empty.
    fn last_offset(&self) -> usize {
        self.entries.len().saturating_sub(self.page_size)
    }

    /// Entries in `[offset, offset + page_size)`, truncated to the list
    pub fn current_page(&self) -> &[T] {
        let start = self.offset.min(self.entries.len());
        let end = (self.offset + self.page_size).min(self.entries.len());
        &self.entries[start..end]
    }

    pub fn info(&self) -> PageInfo {
        let total = self.entries.len();
        PageInfo {
            number: self.offset / self.page_size + 1,
            count: total.div_ceil(self.page_size).max(1),
            offset: self.offset,
            total,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.offset > 0
    }

    pub fn has_next(&self) -> bool {
        self.offset + self.page_size < self.entries.len()
    }

    /// Render the current page
    pub fn render(&self) -> V {
        (self.render)(self.current_page(), self.info())
    }

    /// Whether the idle timeout has elapsed. Once expired, always expired.
    pub fn is_expired(&mut self) -> bool {
        self.check_expiry(Instant::now())
    }

    fn check_expiry(&mut self, now: Instant) -> bool {
        if !self.expired && now.saturating_duration_since(self.last_activity) >= self.timeout {
            debug!(author = self.author, "pager expired");
            self.expired = true;
        }
        self.expired
    }

    /// Move one page forward or back on behalf of `user`.
    pub fn navigate(&mut self, user: UserId, direction: Direction) -> Navigation {
        self.navigate_at(user, direction, Instant::now())
    }

    fn navigate_at(&mut self, user: UserId, direction: Direction, now: Instant) -> Navigation {
        if self.check_expiry(now) {
            return Navigation::Expired;
        }
        if user != self.author {
            debug!(user, author = self.author, "navigation by non-author rejected");
            return Navigation::NotAuthor;
        }
        self.last_activity = now;

        let target = match direction {
            Direction::Next => (self.offset + self.page_size).min(self.last_offset()),
            Direction::Previous => self.offset.saturating_sub(self.page_size),
        };
        if target == self.offset {
            Navigation::Unchanged
        } else {
            self.offset = target;
            Navigation::Moved
        }
    }

    pub fn next(&mut self, user: UserId) -> Navigation {
        self.navigate(user, Direction::Next)
    }

    pub fn previous(&mut self, user: UserId) -> Navigation {
        self.navigate(user, Direction::Previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHOR: UserId = 42;

    fn numbers(total: usize) -> Pager<usize, String> {
        Pager::new((0..total).collect(), DEFAULT_PAGE_SIZE, AUTHOR, |page, info| {
            format!("{} items, page {}/{}", page.len(), info.number, info.count)
        })
    }

    #[test]
    fn test_next_clamps_to_last_partial_page() {
        let mut pager = numbers(30);
        assert_eq!(pager.current_page().len(), 25);

        assert_eq!(pager.next(AUTHOR), Navigation::Moved);
        assert_eq!(pager.offset(), 5);
        assert_eq!(pager.current_page(), &(5..30).collect::<Vec<_>>()[..]);

        assert_eq!(pager.next(AUTHOR), Navigation::Unchanged);
        assert_eq!(pager.offset(), 5);
    }

    #[test]
    fn test_previous_clamps_at_zero() {
        let mut pager = numbers(60);
        assert_eq!(pager.previous(AUTHOR), Navigation::Unchanged);

        pager.next(AUTHOR);
        pager.next(AUTHOR);
        assert_eq!(pager.offset(), 35);
        assert_eq!(pager.previous(AUTHOR), Navigation::Moved);
        assert_eq!(pager.offset(), 10);
        assert_eq!(pager.previous(AUTHOR), Navigation::Moved);
        assert_eq!(pager.offset(), 0);
        assert_eq!(pager.previous(AUTHOR), Navigation::Unchanged);
    }

    #[test]
    fn test_short_list_never_moves() {
        let mut pager = numbers(3);
        assert!(!pager.has_next());
        assert!(!pager.has_previous());
        assert_eq!(pager.next(AUTHOR), Navigation::Unchanged);
        assert_eq!(pager.current_page().len(), 3);
    }

    #[test]
    fn test_empty_list_renders_single_page() {
        let pager = numbers(0);
        assert!(pager.current_page().is_empty());
        assert_eq!(pager.info().count, 1);
        assert_eq!(pager.render(), "0 items, page 1/1");
    }

    #[test]
    fn test_non_author_is_rejected() {
        let mut pager = numbers(30);
        assert_eq!(pager.next(7), Navigation::NotAuthor);
        assert_eq!(pager.offset(), 0);
        assert_eq!(pager.next(AUTHOR), Navigation::Moved);
        assert_eq!(pager.previous(7), Navigation::NotAuthor);
        assert_eq!(pager.offset(), 5);
    }

    #[test]
    fn test_expiry_is_terminal() {
        let mut pager = numbers(30).with_timeout(Duration::from_secs(120));
        let start = pager.last_activity;

        assert_eq!(
            pager.navigate_at(AUTHOR, Direction::Next, start + Duration::from_secs(60)),
            Navigation::Moved
        );
        // idle window restarts on each accepted interaction
        assert_eq!(
            pager.navigate_at(AUTHOR, Direction::Previous, start + Duration::from_secs(170)),
            Navigation::Moved
        );
        assert_eq!(
            pager.navigate_at(AUTHOR, Direction::Next, start + Duration::from_secs(291)),
            Navigation::Expired
        );
        assert_eq!(pager.offset(), 0);
        assert_eq!(pager.next(AUTHOR), Navigation::Expired);
        assert!(pager.is_expired());
    }

    #[test]
    fn test_page_info_numbers() {
        let mut pager = numbers(51);
        assert_eq!(pager.info().count, 3);
        pager.next(AUTHOR);
        pager.next(AUTHOR);
        let info = pager.info();
        assert_eq!(info.offset, 26);
        assert_eq!(info.number, 2, "clamped offset still reports its page");
        assert_eq!(pager.render(), "25 items, page 2/3");
    }
}
