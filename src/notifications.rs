use crate::error::{DashboardError, DashboardResult};
use crate::models::Notification;

/// How many notifications show before "show all".
pub const PREVIEW_LEN: usize = 5;

#[derive(Debug, Clone)]
pub struct Inbox {
    notifications: Vec<Notification>,
}

impl Inbox {
    pub fn new(notifications: Vec<Notification>) -> Self {
        Self { notifications }
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    pub fn visible(&self, show_all: bool) -> &[Notification] {
        if show_all {
            &self.notifications
        } else {
            &self.notifications[..self.notifications.len().min(PREVIEW_LEN)]
        }
    }

    pub fn mark_read(&mut self, id: u32) -> DashboardResult<()> {
        let notification = self
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| DashboardError::not_found("notification", id))?;
        notification.read = true;
        Ok(())
    }

    pub fn mark_all_read(&mut self) {
        for notification in self.notifications.iter_mut() {
            notification.read = true;
        }
    }

    pub fn remove(&mut self, id: u32) -> DashboardResult<Notification> {
        let index = self
            .notifications
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| DashboardError::not_found("notification", id))?;
        Ok(self.notifications.remove(index))
    }
}
