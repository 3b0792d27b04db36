//! Page-wide application handle.
//!
//! Uses `RefCell`-wrapped `thread_local!` storage (WASM is single-threaded).

use sb_wallet_core::DelegationApp;
use std::cell::RefCell;
use std::rc::Rc;

thread_local! {
    static APP: RefCell<Option<Rc<DelegationApp>>> = const { RefCell::new(None) };
}

pub fn install(app: Rc<DelegationApp>) {
    APP.with(|slot| *slot.borrow_mut() = Some(app));
}

/// The running app, once `install` has been called.
pub fn app() -> Option<Rc<DelegationApp>> {
    APP.with(|slot| slot.borrow().clone())
}
