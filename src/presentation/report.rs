use colored::{ColoredString, Colorize};
use serde_json::{json, Value};

use crate::domain::resolve::{Bucket, Buckets, NO_HASH};
use crate::domain::status::{StatusEntry, StatusKind};

const BANNER: &str = "🔧 git-fixupper: uncommitted changes grouped by the commit that last touched them";

pub const SENTINEL_NOTE: &str =
    "These files have not yet been committed in this branch, they will be ignored in fixup mode.";

/// What the report shows: the grouping plus where it came from.
pub struct ReportView<'a> {
    pub branch: &'a str,
    pub range: String,
    pub buckets: &'a Buckets,
}

pub fn paint(kind: StatusKind, s: &str) -> ColoredString {
    match kind {
        StatusKind::Added => s.green(),
        StatusKind::Removed => s.red(),
        StatusKind::Modified => s.yellow(),
        StatusKind::Untracked => s.blue(),
        StatusKind::Renamed => s.cyan(),
        StatusKind::Other => s.white(),
    }
}

fn file_line(f: &StatusEntry) -> String {
    let marker = format!(" {} >", f.marker());
    let path = match &f.original_path {
        Some(from) => format!("{from} -> {}", f.path),
        None => f.path.clone(),
    };
    format!("{} {}", paint(f.kind(), &marker), path.dimmed())
}

fn bucket_lines(bucket: &Bucket, out: &mut Vec<String>) {
    if bucket.is_sentinel() {
        out.push(format!("{} - {}", NO_HASH.red().bold(), SENTINEL_NOTE));
    } else {
        out.push(format!("{} - {}", bucket.key.to_string().green().bold(), bucket.message));
    }
    out.extend(bucket.files.iter().map(file_line));
}

pub fn render_report(view: &ReportView) -> String {
    let mut out = vec![String::new(), BANNER.bold().to_string()];
    out.push(format!("branch {} ({})", view.branch, view.range).dimmed().to_string());
    out.push(String::new());

    if view.buckets.is_empty() {
        out.push("Nothing to fix up: the working tree is clean.".to_string());
    }
    for bucket in view.buckets.in_report_order() {
        bucket_lines(bucket, &mut out);
    }
    out.join("\n")
}

pub fn render_json(view: &ReportView) -> Value {
    json!({
        "branch": view.branch,
        "range": view.range,
        "buckets": view.buckets.in_report_order().collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::log_line::CommitRef;

    fn buckets() -> Buckets {
        let mut b = Buckets::default();
        b.insert(None, StatusEntry::new("??", "b.txt"));
        b.insert(
            Some(CommitRef { hash: "abc123".into(), message: "add feature".into() }),
            StatusEntry::new("M", "a.txt"),
        );
        b
    }

    #[test]
    fn text_report_lists_commits_then_sentinel() {
        colored::control::set_override(false);
        let b = buckets();
        let text = render_report(&ReportView { branch: "topic", range: "x~1..abc123".into(), buckets: &b });

        let commit = text.find("abc123 - add feature").unwrap();
        let file_a = text.find(" M > a.txt").unwrap();
        let sentinel = text.find(&format!("no-hash - {SENTINEL_NOTE}")).unwrap();
        let file_b = text.find(" ? > b.txt").unwrap();
        assert!(commit < file_a && file_a < sentinel && sentinel < file_b);
        assert!(text.contains("branch topic (x~1..abc123)"));
    }

    #[test]
    fn clean_tree_says_so() {
        colored::control::set_override(false);
        let b = Buckets::default();
        let text = render_report(&ReportView { branch: "topic", range: "abc123".into(), buckets: &b });
        assert!(text.contains("Nothing to fix up"));
    }

    #[test]
    fn json_report_keeps_sentinel_last() {
        let b = buckets();
        let v = render_json(&ReportView { branch: "topic", range: "abc123".into(), buckets: &b });
        assert_eq!(v["branch"], "topic");
        assert_eq!(v["buckets"][0]["hash"], "abc123");
        assert_eq!(v["buckets"][0]["message"], "add feature");
        assert_eq!(v["buckets"][0]["files"][0], json!({ "status": "M", "path": "a.txt" }));
        assert_eq!(v["buckets"][1]["hash"], "no-hash");
        assert_eq!(v["buckets"][1]["message"], "");
    }
}
