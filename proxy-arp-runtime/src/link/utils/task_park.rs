//! # What is it for?
//!
//! Task Park is a cache for a single task handle, shared between the two sides of a queue. A side
//! that cannot make progress (its queue is full, or empty) parks its waker here before returning
//! `Poll::Pending`, and relies on the other side to wake it once the blocker has cleared. When one
//! side goes away it marks the park dead, so the survivor never sleeps waiting on a wake that will
//! not come.

use crossbeam::atomic::AtomicCell;
use futures::task;
use std::sync::Arc;

/// TaskParkState
///
/// # Dead: one side holding the `task_park` has dropped. A task attempting to park must self wake.
///
/// # Empty: no task is currently parked.
///
/// # Parked: a task handle is waiting to be woken.
pub enum TaskParkState {
    Dead,
    Empty,
    Parked(task::Waker),
}

/// Swaps in the provided TaskParkState and wakes any task it finds parked.
/// Returns `false` if the `task_park` is dead, in which case it stays dead.
fn swap_and_wake(task_park: &Arc<AtomicCell<TaskParkState>>, swap: TaskParkState) -> bool {
    match task_park.swap(swap) {
        TaskParkState::Dead => {
            task_park.store(TaskParkState::Dead);
            false
        }
        TaskParkState::Empty => true,
        TaskParkState::Parked(task) => {
            task.wake();
            true
        }
    }
}

/// Wakes the parked task, if any, without parking the caller.
pub fn unpark_and_wake(task_park: &Arc<AtomicCell<TaskParkState>>) {
    swap_and_wake(task_park, TaskParkState::Empty);
}

/// Wakes the parked task, if any, and parks the caller in its place.
/// If the other side is gone the caller is woken immediately instead.
pub fn park_and_wake(task_park: &Arc<AtomicCell<TaskParkState>>, task: task::Waker) {
    if !swap_and_wake(task_park, TaskParkState::Parked(task.clone())) {
        task.wake();
    }
}

/// Wakes the parked task, if any, and marks the park dead.
/// Call when the caller is finishing and will never wake anyone again.
pub fn die_and_wake(task_park: &Arc<AtomicCell<TaskParkState>>) {
    swap_and_wake(task_park, TaskParkState::Dead);
}
