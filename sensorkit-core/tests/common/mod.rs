//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

/// A shared counter and a closure-friendly handle that increments it
pub fn counter() -> (Rc<Cell<u32>>, Rc<Cell<u32>>) {
    let count = Rc::new(Cell::new(0));
    (count.clone(), count)
}

/// Bump a shared counter
pub fn bump(cell: &Rc<Cell<u32>>) {
    cell.set(cell.get() + 1);
}

/// A shared float slot, for publishing one sensor's statistic to another
pub fn shared_value(initial: f32) -> (Rc<Cell<f32>>, Rc<Cell<f32>>) {
    let slot = Rc::new(Cell::new(initial));
    (slot.clone(), slot)
}
