/// Transient, non-blocking notification banners
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

/// Default time a banner stays visible
pub const DEFAULT_BANNER_TTL: Duration = Duration::from_secs(5);

/// Banner severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Error,
    Success,
}

/// One user-facing message with its expiry deadline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    pub expires_at: Instant,
}

/// Visible banners, newest first
#[derive(Debug, Clone)]
pub struct Banners {
    ttl: Duration,
    items: VecDeque<Banner>,
}

impl Default for Banners {
    fn default() -> Self {
        Self::new(DEFAULT_BANNER_TTL)
    }
}

impl Banners {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            items: VecDeque::new(),
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(BannerKind::Error, message.into());
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(BannerKind::Success, message.into());
    }

    fn push(&mut self, kind: BannerKind, message: String) {
        self.items.push_front(Banner {
            kind,
            message,
            expires_at: Instant::now() + self.ttl,
        });
    }

    /// Drop every banner whose deadline has passed at `now`
    pub fn expire(&mut self, now: Instant) {
        self.items.retain(|banner| banner.expires_at > now);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Banner> {
        self.items.iter()
    }

    /// Messages of the given kind, newest first
    pub fn messages(&self, kind: BannerKind) -> Vec<&str> {
        self.items
            .iter()
            .filter(|banner| banner.kind == kind)
            .map(|banner| banner.message.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut banners = Banners::default();
        banners.error("Please select a city");
        banners.success("Price submitted — thank you!");

        let actual = banners.iter().map(|b| b.kind).collect::<Vec<_>>();
        assert_eq!(actual, vec![BannerKind::Success, BannerKind::Error]);
        assert_eq!(banners.messages(BannerKind::Error), vec!["Please select a city"]);
    }

    #[test]
    fn test_expire() {
        let mut banners = Banners::new(Duration::from_secs(5));
        banners.error("Request failed");
        let created = Instant::now();

        banners.expire(created);
        assert_eq!(banners.len(), 1);

        banners.expire(created + Duration::from_secs(6));
        assert!(banners.is_empty());
    }
}
