//! Output file naming.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use cclip_models::ClipInterval;

/// File name for the clip at `index` (zero-based) in resolver order.
///
/// ```
/// use cclip_cli::naming::clip_file_name;
/// use cclip_models::ClipInterval;
///
/// let clip = ClipInterval { start: 28.5, end: 36.04, peak_loudness: 0.4, peak_time: 30.0 };
/// assert_eq!(clip_file_name(0, &clip), "clip_01_28.5s-36.0s.mp4");
/// ```
pub fn clip_file_name(index: usize, interval: &ClipInterval) -> String {
    format!(
        "clip_{:02}_{:.1}s-{:.1}s.mp4",
        index + 1,
        interval.start,
        interval.end
    )
}

/// Decide the output path of every clip before any cut starts.
///
/// With `overwrite` the plain names are used as-is. Otherwise a name that
/// already exists on disk, or was already handed out in this plan, gets a
/// `-2`, `-3`, ... suffix before the extension.
pub fn plan_output_paths(dir: &Path, intervals: &[ClipInterval], overwrite: bool) -> Vec<PathBuf> {
    let mut claimed = HashSet::new();

    intervals
        .iter()
        .enumerate()
        .map(|(index, interval)| {
            let name = clip_file_name(index, interval);
            let path = if overwrite {
                dir.join(&name)
            } else {
                free_path(dir, &name, &claimed)
            };
            claimed.insert(path.clone());
            path
        })
        .collect()
}

fn free_path(dir: &Path, name: &str, claimed: &HashSet<PathBuf>) -> PathBuf {
    let taken = |path: &Path| path.exists() || claimed.contains(path);

    let candidate = dir.join(name);
    if !taken(&candidate) {
        return candidate;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (name, None),
    };

    (2u32..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{stem}-{n}.{ext}")),
            None => dir.join(format!("{stem}-{n}")),
        })
        .find(|path| !taken(path))
        .unwrap_or(candidate)
}
