use crate::window::WindowId;

/// Process-wide input lock shared by every window that wants one.
///
/// Owners are kept in acquisition order. The overlay is visible while at
/// least one owner remains, so closing one modal never hides the backdrop of
/// another.
#[derive(Debug, Default)]
pub struct InputLock {
    owners: Vec<WindowId>,
}

impl InputLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `owner`. Returns true when the overlay should become visible.
    pub fn acquire(&mut self, owner: &WindowId) -> bool {
        if self.owners.contains(owner) {
            return false;
        }
        self.owners.push(owner.clone());
        self.owners.len() == 1
    }

    /// Drop `owner`. Returns true when the overlay should be hidden.
    pub fn release(&mut self, owner: &WindowId) -> bool {
        let before = self.owners.len();
        self.owners.retain(|held| held != owner);
        before > 0 && self.owners.is_empty() && before != self.owners.len()
    }

    pub fn is_active(&self) -> bool {
        !self.owners.is_empty()
    }

    pub fn holds(&self, owner: &WindowId) -> bool {
        self.owners.contains(owner)
    }

    /// Most recent owner.
    pub fn top(&self) -> Option<&WindowId> {
        self.owners.last()
    }

    pub fn count(&self) -> usize {
        self.owners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_stays_until_last_owner_releases() {
        let mut lock = InputLock::new();
        let a = WindowId::new("a");
        let b = WindowId::new("b");
        assert!(lock.acquire(&a));
        assert!(!lock.acquire(&b));
        assert!(!lock.release(&a));
        assert!(lock.is_active());
        assert_eq!(lock.top(), Some(&b));
        assert!(lock.release(&b));
        assert!(!lock.is_active());
    }

    #[test]
    fn double_acquire_and_unknown_release_are_ignored() {
        let mut lock = InputLock::new();
        let a = WindowId::new("a");
        assert!(lock.acquire(&a));
        assert!(!lock.acquire(&a));
        assert_eq!(lock.count(), 1);
        assert!(!lock.release(&WindowId::new("zzz")));
        assert!(lock.holds(&a));
    }
}
