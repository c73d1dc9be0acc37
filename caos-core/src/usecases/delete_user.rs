use super::prelude::*;
use crate::authorization::user::authorize_rank;

/// Deletes a user account. The system accounts (`Xico`, `Alone`) are
/// protected and survive every deletion path.
pub fn delete_user<R>(repo: &R, actor: &User, target: &UserName) -> Result<()>
where
    R: UserRepo + EventLogRepo,
{
    authorize_rank(actor, Rank::Admin)?;
    if target.is_protected() {
        return Err(Error::InvariantViolation(format!(
            "La cuenta '{target}' está protegida por el sistema"
        )));
    }
    let user = repo.get_user(target)?;
    if user.is_global_admin() && !actor.is_global_admin() {
        return Err(Error::Forbidden);
    }
    repo.delete_user(target)?;
    repo.log_event(EventLogEntry::new(
        Some(actor.name.clone()),
        "DELETE_USER",
        Some(target.to_string()),
        "",
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::MockDb;
    use super::*;

    #[test]
    fn protected_users_cannot_be_deleted() {
        let db = MockDb::default();
        let mut root = User::new("root", Rank::Superadmin);
        root.superuser = true;
        db.users.borrow_mut().push(User::new("Xico", Rank::Admin));
        db.users.borrow_mut().push(User::new("Alone", Rank::Superadmin));

        for name in ["Xico", "Alone"] {
            let err = delete_user(&db, &root, &name.into()).unwrap_err();
            assert!(matches!(err, Error::InvariantViolation(_)));
        }
        assert_eq!(db.users.borrow().len(), 2);
    }

    #[test]
    fn admin_can_delete_regular_users() {
        let db = MockDb::default();
        let admin = User::new("ana", Rank::Admin);
        db.users.borrow_mut().push(admin.clone());
        db.users.borrow_mut().push(User::new("vago", Rank::Explorer));
        delete_user(&db, &admin, &"vago".into()).unwrap();
        assert!(db.try_get_user(&"vago".into()).unwrap().is_none());
    }
}
