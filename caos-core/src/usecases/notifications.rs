use super::prelude::*;

pub fn unread_notifications<R: NotificationRepo>(
    repo: &R,
    user: &UserName,
) -> Result<Vec<Notification>> {
    let mut unread: Vec<Notification> = repo
        .notifications_of(user)?
        .into_iter()
        .filter(Notification::is_unread)
        .collect();
    unread.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(unread)
}

/// Marks one notification as read; only the recipient may do so.
pub fn mark_notification_read<R: NotificationRepo>(
    repo: &R,
    user: &User,
    notification_id: u64,
) -> Result<()> {
    let owned = repo
        .notifications_of(&user.name)?
        .iter()
        .any(|n| n.id == notification_id);
    if !owned {
        return Err(Error::NotFound);
    }
    Ok(repo.mark_notification_read(notification_id)?)
}

pub fn mark_all_notifications_read<R: NotificationRepo>(repo: &R, user: &User) -> Result<usize> {
    Ok(repo.mark_all_notifications_read(&user.name)?)
}
