use core::sync::atomic::{AtomicBool, Ordering};

static MULTITHREAD_ENABLED: AtomicBool = AtomicBool::new(true);

/// Minimum number of elements for a dense target to be assigned in parallel.
pub const SMP_ASSIGN_THRESHOLD: usize = 48 * 48;

pub fn is_multithread_enabled() -> bool {
    MULTITHREAD_ENABLED.load(Ordering::Relaxed)
}

pub fn set_multithread_enabled(val: bool) {
    MULTITHREAD_ENABLED.store(val, Ordering::Relaxed)
}

pub(crate) fn is_smp_sized(len: usize) -> bool {
    cfg!(feature = "multithread") && is_multithread_enabled() && len >= SMP_ASSIGN_THRESHOLD
}
