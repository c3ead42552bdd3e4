//! File names for saved results.

use sanitize_filename::{sanitize_with_options, Options};

/// Extension of saved result files.
pub const NZB_EXTENSION: &str = ".nzb";

/// Longest file name most file systems accept, in bytes.
const MAX_FILE_NAME_BYTES: usize = 255;

fn sanitize(name: &str) -> String {
    sanitize_with_options(
        name,
        Options {
            windows: true,
            truncate: false,
            replacement: "_",
        },
    )
}

fn truncate_bytes(name: &mut String, max: usize) {
    if name.len() <= max {
        return;
    }
    let mut end = max;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name.truncate(end);
}

/// File name derived from a result title, or `None` for a blank title.
///
/// Characters that are illegal in file names (on any common platform) are
/// replaced by `_` and the `.nzb` extension is appended.
pub fn file_name_from_title(title: &str) -> Option<String> {
    let title = title.trim();
    if title.is_empty() {
        return None;
    }

    let mut name = sanitize(title);
    if name.trim_matches('_').is_empty() {
        return None;
    }
    truncate_bytes(&mut name, MAX_FILE_NAME_BYTES - NZB_EXTENSION.len());
    name.push_str(NZB_EXTENSION);
    Some(name)
}

/// File name taken from the last path segment of the URL that served the
/// content. Used when the result has no title.
pub fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    let decoded = urlencoding::decode(segment).ok()?;

    let mut name = sanitize(decoded.trim());
    if name.is_empty() {
        return None;
    }
    truncate_bytes(&mut name, MAX_FILE_NAME_BYTES);
    Some(name)
}
