use crate::git::ChangeStatus;
use crate::summary::SummaryLimits;

struct DirGroup {
    count: usize,
    // Extension histogram in first-seen order; the order is part of the
    // rendered output, so no hashing here.
    extensions: Vec<(String, usize)>,
}

/// Compress one status's file list into a compact tree listing.
///
/// Sets at or under the compression threshold are listed verbatim, one
/// `{symbol} {path}` line per file. Larger sets keep shallow files listed
/// individually and collapse deeper ones into per-directory lines with an
/// extension breakdown.
pub fn summarize_files(files: &[String], status: ChangeStatus, limits: &SummaryLimits) -> String {
    if files.is_empty() {
        return String::new();
    }

    let symbol = status.symbol();

    if files.len() <= limits.compression_threshold {
        return files
            .iter()
            .map(|file| format!("{symbol} {file}"))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut direct: Vec<String> = Vec::new();
    let mut groups: Vec<(String, DirGroup)> = Vec::new();

    for file in files {
        let segments: Vec<&str> = file.split('/').collect();
        if segments.len() <= limits.tree_depth {
            direct.push(format!("{symbol} {file}"));
            continue;
        }

        let dir = segments[..limits.tree_depth].join("/");
        let idx = match groups.iter().position(|(key, _)| key == &dir) {
            Some(idx) => idx,
            None => {
                groups.push((
                    dir,
                    DirGroup {
                        count: 0,
                        extensions: Vec::new(),
                    },
                ));
                groups.len() - 1
            }
        };

        let group = &mut groups[idx].1;
        group.count += 1;
        if let Some(ext) = extension(file) {
            match group.extensions.iter_mut().find(|(name, _)| name == ext) {
                Some((_, count)) => *count += 1,
                None => group.extensions.push((ext.to_string(), 1)),
            }
        }
    }

    let mut lines = direct;
    for (dir, group) in &groups {
        let breakdown = group
            .extensions
            .iter()
            .map(|(ext, count)| format!("{count} *.{ext}"))
            .collect::<Vec<_>>()
            .join(", ");
        if breakdown.is_empty() {
            lines.push(format!("{symbol} {dir}/ [{} files]", group.count));
        } else {
            lines.push(format!("{symbol} {dir}/ [{} files: {breakdown}]", group.count));
        }
    }

    lines.join("\n")
}

/// The suffix after the final dot, provided that dot sits inside the last
/// path segment (`a/b.tar.gz` gives `gz`; `Makefile` and `v1.0/notes` give
/// nothing).
fn extension(file: &str) -> Option<&str> {
    let idx = file.rfind('.')?;
    let ext = &file[idx + 1..];
    if ext.is_empty() || ext.contains('/') {
        return None;
    }
    Some(ext)
}
