//! GPU tag filters derived from a compute capability

/// Compute capabilities that have dedicated `requires-gpu-sm<N>` tags, ascending
pub const GPU_CAPABILITY_THRESHOLDS: [u32; 4] = [60, 70, 80, 90];

/// Tag filters selecting the tests runnable on a GPU of `compute_capability`
///
/// Starts with `requires-gpu-sm<c>-only`. Every threshold at or below the
/// capability is included; every threshold above it is excluded together
/// with its `-only` variant.
pub fn tag_filters_for_compute_capability(compute_capability: u32) -> Vec<String> {
    let mut tag_filters = vec![format!("requires-gpu-sm{}-only", compute_capability)];
    for threshold in GPU_CAPABILITY_THRESHOLDS {
        if compute_capability >= threshold {
            tag_filters.push(format!("requires-gpu-sm{}", threshold));
        } else {
            tag_filters.push(format!("-requires-gpu-sm{}", threshold));
            tag_filters.push(format!("-requires-gpu-sm{}-only", threshold));
        }
    }
    tag_filters
}

/// Renders the `TF_CUDA_COMPUTE_CAPABILITIES` value, e.g. 75 -> `7.5`
pub fn compute_capability_version(compute_capability: u32) -> String {
    format!("{}.{}", compute_capability / 10, compute_capability % 10)
}
