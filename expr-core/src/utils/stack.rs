/// Remaining stack below which [`ensure_sufficient_stack`] grows it.
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Runs `f`, first moving to a fresh stack segment when the current one is
/// nearly exhausted. Recursive evaluation goes through this so deep user
/// recursion is stopped by the call depth limit, not by the thread stack.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
