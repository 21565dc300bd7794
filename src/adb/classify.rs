/// Decide success or failure from the transfer tool's captured output.
///
/// adb's output format is not versioned, so this is a deliberately loose
/// text heuristic rather than a grammar: blank output is failure, any
/// `adb: error:` marker is failure, everything else (push summaries, stray
/// log noise) counts as success.
pub fn is_success(output: &str) -> bool {
    if output.trim().is_empty() {
        return false;
    }
    !output.to_lowercase().contains("adb: error:")
}
