//! Per-operation authorisation rules shared by the item and swap services.

use crate::domain::{Error, Item, Swap, UserId};

/// Only the current owner may edit or delete an item.
pub fn ensure_item_owner(item: &Item, caller: &UserId) -> Result<(), Error> {
    if item.is_owned_by(caller) {
        Ok(())
    } else {
        Err(Error::forbidden("item does not belong to current user"))
    }
}

/// A swap is proposed by the owner of the offered item (`item2`) against an
/// item owned by someone else.
pub fn ensure_can_propose(caller: &UserId, item1: &Item, item2: &Item) -> Result<(), Error> {
    if !item2.is_owned_by(caller) {
        return Err(Error::forbidden("second item does not belong to current user"));
    }
    if item1.is_owned_by(caller) {
        return Err(Error::invalid_request(
            "cannot propose a swap for an item you already own",
        ));
    }
    Ok(())
}

/// Only `item1_user` may approve or reject.
pub fn ensure_can_resolve(swap: &Swap, caller: &UserId) -> Result<(), Error> {
    if swap.item1_user() == caller {
        Ok(())
    } else {
        Err(Error::forbidden("only the owner of the requested item may decide"))
    }
}

/// Only `item2_user` may withdraw.
pub fn ensure_can_withdraw(swap: &Swap, caller: &UserId) -> Result<(), Error> {
    if swap.item2_user() == caller {
        Ok(())
    } else {
        Err(Error::forbidden("only the proposer may withdraw this swap"))
    }
}
