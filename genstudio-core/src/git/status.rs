//! Porcelain status parsing.

use genstudio_config::constants::defaults;

/// Snapshot of the working tree, rebuilt wholesale on every refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryStatus {
    pub branch: String,
    pub modified: Vec<String>,
    pub added: Vec<String>,
    pub deleted: Vec<String>,
    pub untracked: Vec<String>,
}

impl RepositoryStatus {
    pub fn is_clean(&self) -> bool {
        self.modified.is_empty()
            && self.added.is_empty()
            && self.deleted.is_empty()
            && self.untracked.is_empty()
    }
}

/// Classify `git status --porcelain` output into the four buckets the file
/// tree decorates. Codes outside the table (renames, copies, unmerged,
/// partially staged entries) are dropped on purpose; the tree only marks
/// the states it can draw.
pub fn parse_porcelain(output: &str) -> RepositoryStatus {
    let mut status = RepositoryStatus::default();

    for line in output.lines() {
        // Byte ranges, so malformed lines with multi-byte characters in the
        // code columns yield None and fall through.
        let (Some(code), Some(path)) = (line.get(..2), line.get(3..)) else {
            continue;
        };
        if path.is_empty() {
            continue;
        }
        let path = path.to_string();

        match code {
            " M" | "M " => status.modified.push(path),
            "A " => status.added.push(path),
            "D " => status.deleted.push(path),
            "??" => status.untracked.push(path),
            _ => {}
        }
    }

    status
}

/// Branch name from `git branch --show-current` output: the trimmed line,
/// or the sentinel when git printed nothing (detached HEAD, empty repo).
pub fn branch_from_output(output: &str) -> String {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        defaults::UNKNOWN_BRANCH.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classifies_each_bucket() {
        let output = " M a.txt\n?? b.txt\nA  c.txt\nD  d.txt\n";
        let status = parse_porcelain(output);

        assert_eq!(status.modified, vec!["a.txt"]);
        assert_eq!(status.untracked, vec!["b.txt"]);
        assert_eq!(status.added, vec!["c.txt"]);
        assert_eq!(status.deleted, vec!["d.txt"]);
    }

    #[test]
    fn staged_modification_counts_as_modified() {
        let status = parse_porcelain("M  staged.rs\n");
        assert_eq!(status.modified, vec!["staged.rs"]);
    }

    #[test]
    fn unrecognized_codes_land_in_no_bucket() {
        let output = "R  old.txt -> new.txt\nC  copy.txt\nUU conflict.txt\nMM partial.rs\n";
        let status = parse_porcelain(output);
        assert!(status.is_clean());
    }

    #[test]
    fn malformed_lines_are_dropped_not_raised() {
        // Multi-byte characters in the code columns must not split the line
        // mid-character.
        let output = "éé x\n M ok.txt\n??\nM\n";
        let status = parse_porcelain(output);
        assert_eq!(status.modified, vec!["ok.txt"]);
        assert!(status.untracked.is_empty());
    }

    #[test]
    fn empty_output_is_clean() {
        assert!(parse_porcelain("").is_clean());
    }

    #[test]
    fn branch_sentinel_only_for_empty_output() {
        assert_eq!(branch_from_output("main\n"), "main");
        assert_eq!(branch_from_output("  feature/x \n"), "feature/x");
        assert_eq!(branch_from_output("\n"), "unknown");
        assert_eq!(branch_from_output(""), "unknown");
    }
}
