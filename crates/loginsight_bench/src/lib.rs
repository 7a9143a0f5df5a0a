//! Benchmark utilities.

use std::fmt::Write;

/// Generates `count` log lines, one in every `opaque_every` being opaque.
///
/// Times are spread over one year and shuffled deterministically so the
/// file is not already in time order.
pub fn generate_lines(count: usize, opaque_every: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            if opaque_every > 0 && i % opaque_every == opaque_every - 1 {
                return format!("garbage line {i}");
            }
            let day = (i * 7919) % 365;
            let month = day / 31 + 1;
            let dom = day % 28 + 1;
            let level = ["info", "warn", "error", "debug"][i % 4];
            let mut line = String::with_capacity(128);
            let _ = write!(
                line,
                r#"{{"level":"{level}","time":"2024-{month:02}-{dom:02}T{:02}:00:00.000Z","msg":"event {i}","userId":{}}}"#,
                i % 24,
                i % 97
            );
            line
        })
        .collect()
}
