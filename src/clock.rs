// Platform time shims
//
// Both clocks are read exactly once per record on the producer hot path, so
// each shim is a single syscall (vDSO-backed on Linux) with no allocation.

/// Monotonic nanoseconds since an unspecified epoch. Never goes backwards
/// within a thread.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn monotonic_ns() -> u64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: ts is a valid out-pointer; CLOCK_MONOTONIC_RAW is supported on
    // every kernel this library targets.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC_RAW, &mut ts) };
    if rc != 0 {
        return fallback_monotonic_ns();
    }
    ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn monotonic_ns() -> u64 {
    fallback_monotonic_ns()
}

/// Wall-clock nanoseconds since the Unix epoch.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn wall_ns() -> u64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: ts is a valid out-pointer.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_REALTIME, &mut ts) };
    if rc != 0 {
        return fallback_wall_ns();
    }
    ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn wall_ns() -> u64 {
    fallback_wall_ns()
}

/// Nanoseconds since the first clock read in this process.
fn fallback_monotonic_ns() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;
    static START: OnceLock<Instant> = OnceLock::new();
    let start = START.get_or_init(Instant::now);
    start.elapsed().as_nanos() as u64
}

fn fallback_wall_ns() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_never_goes_backwards() {
        let mut prev = monotonic_ns();
        for _ in 0..1000 {
            let now = monotonic_ns();
            assert!(now >= prev);
            prev = now;
        }
    }

    #[test]
    fn test_wall_clock_is_recent() {
        // Anything after 2020-01-01 counts as a sane wall clock.
        let ns = wall_ns();
        assert!(ns > 1_577_836_800_000_000_000);
    }

    #[test]
    fn test_clocks_advance() {
        let a = monotonic_ns();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = monotonic_ns();
        assert!(b > a);
    }
}
