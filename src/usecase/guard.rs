//! Authorization predicates. All of them are pure and run before any mutation.

use std::collections::BTreeSet;

use crate::domain::accommodation::Accommodation;
use crate::domain::member::Member;
use crate::domain::specialist::Specialist;
use crate::usecase::error::UsecaseError;
use crate::usecase::roles::Caller;

pub fn require_specialist(caller: &Caller) -> Result<(), UsecaseError> {
    if caller.is_specialist() {
        Ok(())
    } else {
        Err(UsecaseError::Forbidden("this action requires a specialist role".to_string()))
    }
}

/// Specialist mutations need a concrete specialist, not just a university.
pub fn require_specialist_identity(caller: &Caller) -> Result<&Specialist, UsecaseError> {
    require_specialist(caller)?;
    caller.specialist().ok_or_else(|| {
        UsecaseError::Forbidden("this action requires a specialist role with an id".to_string())
    })
}

pub fn require_member(caller: &Caller) -> Result<&Member, UsecaseError> {
    caller
        .member()
        .ok_or_else(|| UsecaseError::Forbidden("this action requires a member role".to_string()))
}

pub fn can_read_university(caller: &Caller, university_code: &str) -> Result<(), UsecaseError> {
    if caller.university_code() == university_code {
        Ok(())
    } else {
        Err(UsecaseError::Forbidden(format!(
            "role from '{}' cannot access resources of '{}'",
            caller.university_code(),
            university_code
        )))
    }
}

pub fn can_manage_university<'a>(caller: &'a Caller, university_code: &str) -> Result<&'a Specialist, UsecaseError> {
    let specialist = require_specialist_identity(caller)?;
    can_read_university(caller, university_code)?;
    Ok(specialist)
}

pub fn can_read_accommodation(caller: &Caller, accommodation: &Accommodation) -> Result<(), UsecaseError> {
    if accommodation.is_offered_to(caller.university_code()) {
        Ok(())
    } else {
        Err(UsecaseError::Forbidden(format!(
            "accommodation is not offered to '{}'",
            caller.university_code()
        )))
    }
}

pub fn can_manage_accommodation<'a>(
    caller: &'a Caller,
    accommodation: &Accommodation,
) -> Result<&'a Specialist, UsecaseError> {
    let specialist = require_specialist_identity(caller)?;
    can_read_accommodation(caller, accommodation)?;
    Ok(specialist)
}

/// A specialist may only add or remove their own university from an offer set.
pub fn can_change_universities(caller: &Caller, before: &[String], after: &[String]) -> Result<(), UsecaseError> {
    let before: BTreeSet<&str> = before.iter().map(String::as_str).collect();
    let after: BTreeSet<&str> = after.iter().map(String::as_str).collect();
    let own = caller.university_code();

    match before.symmetric_difference(&after).find(|code| **code != own) {
        None => Ok(()),
        Some(code) => Err(UsecaseError::Forbidden(format!(
            "specialist from '{}' cannot add or remove university '{}'",
            own, code
        ))),
    }
}

/// The owning member, or any specialist of the target's university.
pub fn self_or_specialist(caller: &Caller, member_uid: &str, university_code: &str) -> Result<(), UsecaseError> {
    let allowed = match caller.member() {
        Some(member) => member.uid == member_uid,
        None => caller.university_code() == university_code,
    };

    if allowed {
        Ok(())
    } else {
        Err(UsecaseError::Forbidden(
            "cannot access resources belonging to other users or universities".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::accommodation::tests::make_accommodation;
    use crate::usecase::roles::tests::{anonymous_specialist_caller, member_caller, specialist_caller};

    fn codes(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_require_specialist() {
        assert!(require_specialist(&specialist_caller("HKU")).is_ok());
        assert!(require_specialist(&anonymous_specialist_caller("HKU")).is_ok());
        assert!(matches!(
            require_specialist(&member_caller("u1", "HKU")),
            Err(UsecaseError::Forbidden(_))
        ));
    }

    #[test]
    fn test_require_specialist_identity() {
        assert!(require_specialist_identity(&specialist_caller("HKU")).is_ok());
        assert!(require_specialist_identity(&anonymous_specialist_caller("HKU")).is_err());
        assert!(require_specialist_identity(&member_caller("u1", "HKU")).is_err());
    }

    #[test]
    fn test_accommodation_read_is_university_scoped() {
        let acc = make_accommodation(&["HKU", "CU"]);

        assert!(can_read_accommodation(&member_caller("u1", "HKU"), &acc).is_ok());
        assert!(can_read_accommodation(&specialist_caller("CU"), &acc).is_ok());
        assert!(can_read_accommodation(&member_caller("u3", "HKUST"), &acc).is_err());
    }

    #[test]
    fn test_accommodation_manage_requires_specialist_in_set() {
        let acc = make_accommodation(&["HKU", "CU"]);

        assert!(can_manage_accommodation(&specialist_caller("CU"), &acc).is_ok());
        assert!(can_manage_accommodation(&specialist_caller("HKUST"), &acc).is_err());
        assert!(can_manage_accommodation(&member_caller("u1", "HKU"), &acc).is_err());
        assert!(can_manage_accommodation(&anonymous_specialist_caller("HKU"), &acc).is_err());
    }

    #[test]
    fn test_change_universities_only_own() {
        let caller = specialist_caller("HKU");

        assert!(can_change_universities(&caller, &codes(&["CU", "HKU"]), &codes(&["CU", "HKU"])).is_ok());
        assert!(can_change_universities(&caller, &codes(&["CU"]), &codes(&["CU", "HKU"])).is_ok());
        assert!(can_change_universities(&caller, &codes(&["CU", "HKU"]), &codes(&["CU"])).is_ok());

        let err = can_change_universities(&caller, &codes(&["HKU"]), &codes(&["HKU", "HKUST"])).unwrap_err();
        assert!(err.to_string().contains("cannot add or remove university 'HKUST'"));
        assert!(can_change_universities(&caller, &codes(&["CU", "HKU"]), &codes(&["HKU"])).is_err());
    }

    #[test]
    fn test_self_or_specialist() {
        assert!(self_or_specialist(&member_caller("u1", "HKU"), "u1", "HKU").is_ok());
        assert!(self_or_specialist(&member_caller("u2", "CU"), "u1", "HKU").is_err());
        assert!(self_or_specialist(&member_caller("u2", "HKU"), "u1", "HKU").is_err());
        assert!(self_or_specialist(&specialist_caller("HKU"), "u1", "HKU").is_ok());
        assert!(self_or_specialist(&specialist_caller("HKUST"), "u1", "HKU").is_err());
    }

    #[test]
    fn test_can_manage_university() {
        assert!(can_manage_university(&specialist_caller("HKU"), "HKU").is_ok());
        assert!(can_manage_university(&specialist_caller("HKU"), "CU").is_err());
        assert!(can_manage_university(&member_caller("u1", "HKU"), "HKU").is_err());
    }
}
