use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// What `LOG_FORMAT` produces: unit separators around the subject, so refs,
// subject and relative time cannot bleed into each other.
static DELIMITED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<hash>[a-z0-9]{6,9}) -(?: \((?P<refs>[^\x1f]*)\))?\x1f (?P<subject>[^\x1f]*)\x1f \([^()]*\).*$")
        .expect("delimited commit line regex")
});

// <hash> - [(<refs>) ]<subject> (<relative time>)<anything>
static COMMIT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<hash>[a-z0-9]{6,9}) - (?:\((?P<refs>[^()]*)\) )?(?P<subject>.*) \([^()]*\).*$")
        .expect("commit line regex")
});

fn captures(line: &str) -> Option<regex::Captures<'_>> {
    DELIMITED_LINE
        .captures(line)
        .or_else(|| COMMIT_LINE.captures(line))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRef {
    pub hash: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedCommit {
    pub hash: String,
    pub decorations: Decorations,
    pub message: String,
}

impl From<DecoratedCommit> for CommitRef {
    fn from(c: DecoratedCommit) -> Self {
        CommitRef { hash: c.hash, message: c.message }
    }
}

/// Hash and subject of one log line; decorations are dropped.
pub fn parse_commit(line: &str) -> Option<CommitRef> {
    let caps = captures(line)?;
    Some(CommitRef {
        hash: caps["hash"].to_string(),
        message: caps["subject"].to_string(),
    })
}

/// Like [`parse_commit`] but keeps the ref decorations.
pub fn parse_decorated(line: &str) -> Option<DecoratedCommit> {
    let caps = captures(line)?;
    let decorations = caps
        .name("refs")
        .map(|m| Decorations::parse(m.as_str()))
        .unwrap_or_default();
    Some(DecoratedCommit {
        hash: caps["hash"].to_string(),
        decorations,
        message: caps["subject"].to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefName {
    Head,
    Branch(String),
    Tag(String),
    /// `grafted`, `replaced`
    Marker(String),
}

/// The ref names git prints in `%d`, e.g. `HEAD -> topic, origin/topic, tag: v1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decorations(Vec<RefName>);

impl Decorations {
    pub fn parse(text: &str) -> Self {
        let mut refs = Vec::new();
        for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if let Some(branch) = part.strip_prefix("HEAD -> ") {
                refs.push(RefName::Head);
                refs.push(RefName::Branch(branch.trim().to_string()));
            } else if part == "HEAD" {
                refs.push(RefName::Head);
            } else if let Some(tag) = part.strip_prefix("tag: ") {
                refs.push(RefName::Tag(tag.trim().to_string()));
            } else if part == "grafted" || part == "replaced" {
                refs.push(RefName::Marker(part.to_string()));
            } else {
                refs.push(RefName::Branch(part.to_string()));
            }
        }
        Self(refs)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn refs(&self) -> &[RefName] {
        &self.0
    }

    /// `current`, or a remote-tracking copy of it, is one of the refs.
    pub fn names_branch(&self, current: &str, remotes: &[String]) -> bool {
        self.0.iter().any(|r| match r {
            RefName::Branch(name) => is_same_branch(name, current, remotes),
            RefName::Head | RefName::Tag(_) | RefName::Marker(_) => false,
        })
    }

    /// Decorated, but not with `current`: history from here on belongs to
    /// some other ref.
    pub fn marks_boundary(&self, current: &str, remotes: &[String]) -> bool {
        !self.is_empty() && !self.names_branch(current, remotes)
    }
}

fn is_same_branch(name: &str, current: &str, remotes: &[String]) -> bool {
    if name == current {
        return true;
    }
    remotes.iter().any(|remote| {
        name.strip_prefix(remote.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|rest| rest == current)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remotes() -> Vec<String> {
        vec!["origin".to_string()]
    }

    #[test]
    fn plain_parser_extracts_hash_and_subject() {
        let c = parse_commit("abc1234 - add feature (2 days ago) <Ana>").unwrap();
        assert_eq!(c.hash, "abc1234");
        assert_eq!(c.message, "add feature");
    }

    #[test]
    fn plain_parser_drops_decorations() {
        let c = parse_commit("abc1234 - (HEAD -> topic, origin/topic) add feature (2 days ago) <Ana>").unwrap();
        assert_eq!(c, CommitRef { hash: "abc1234".into(), message: "add feature".into() });
    }

    #[test]
    fn decorated_parser_keeps_refs() {
        let c = parse_decorated("1a2b3c4d - (HEAD -> topic, tag: v1.0) wire it up (5 minutes ago) <Bo>").unwrap();
        assert_eq!(c.hash, "1a2b3c4d");
        assert_eq!(c.message, "wire it up");
        assert_eq!(
            c.decorations.refs(),
            &[RefName::Head, RefName::Branch("topic".into()), RefName::Tag("v1.0".into())]
        );
    }

    #[test]
    fn decorated_parser_without_refs_is_empty() {
        let c = parse_decorated("abc123 - add feature (1 year, 2 months ago)").unwrap();
        assert!(c.decorations.is_empty());
        assert_eq!(c.message, "add feature");
    }

    #[test]
    fn subject_keeps_its_own_parentheses() {
        let c = parse_commit("abc1234 - fix crash (#12) (3 hours ago) <Ana>").unwrap();
        assert_eq!(c.message, "fix crash (#12)");
    }

    #[test]
    fn anything_may_follow_the_relative_time() {
        let c = parse_commit("abc1234 - add feature (2 days ago) signed-off [ci skip]").unwrap();
        assert_eq!(c.message, "add feature");
    }

    #[test]
    fn delimited_lines_keep_refs_and_subject_apart() {
        let c = parse_decorated("abc1234 -\x1f (wip) try it\x1f (2 days ago) <Ana (work)>").unwrap();
        assert!(c.decorations.is_empty());
        assert_eq!(c.message, "(wip) try it");
        assert_eq!(parse_commit("abc1234 -\x1f (wip) try it\x1f (2 days ago) <Ana>").unwrap().message, "(wip) try it");

        let c = parse_decorated("abc1234 - (HEAD -> topic)\x1f fix (#12)\x1f (3 hours ago) <Ana (work)>").unwrap();
        assert_eq!(c.decorations.refs(), &[RefName::Head, RefName::Branch("topic".into())]);
        assert_eq!(c.message, "fix (#12)");
    }

    #[test]
    fn malformed_lines_do_not_match() {
        for line in [
            "",
            "not a log line",
            "abc1234 add feature (2 days ago)",
            "abc12 - too short (2 days ago)",
            "abcdef12345 - too long (2 days ago)",
            "ABC1234 - upper case (2 days ago)",
            "abc1234 - no relative time",
            "abc1234 -\x1f no relative time\x1f",
        ] {
            assert!(parse_commit(line).is_none(), "plain matched {line:?}");
            assert!(parse_decorated(line).is_none(), "decorated matched {line:?}");
        }
    }

    #[test]
    fn own_branch_and_its_remote_copy_are_not_boundaries() {
        let d = Decorations::parse("HEAD -> topic, origin/topic");
        assert!(!d.marks_boundary("topic", &remotes()));
        let d = Decorations::parse("origin/topic");
        assert!(!d.marks_boundary("topic", &remotes()));
    }

    #[test]
    fn sharing_a_commit_with_another_branch_is_not_a_boundary() {
        let d = Decorations::parse("HEAD -> topic, main");
        assert!(!d.marks_boundary("topic", &remotes()));
    }

    #[test]
    fn other_branch_is_a_boundary() {
        let d = Decorations::parse("origin/main, main");
        assert!(d.marks_boundary("topic", &remotes()));
    }

    #[test]
    fn substring_branch_names_are_distinct() {
        let d = Decorations::parse("feature-x-old");
        assert!(d.marks_boundary("feature-x", &remotes()));
        let d = Decorations::parse("upstream/topic");
        assert!(d.marks_boundary("topic", &remotes()));
    }

    #[test]
    fn tags_and_markers_alone_are_boundaries() {
        assert!(Decorations::parse("tag: v2.1").marks_boundary("topic", &remotes()));
        assert!(Decorations::parse("grafted").marks_boundary("topic", &remotes()));
        assert!(!Decorations::parse("tag: v2.1, topic").marks_boundary("topic", &remotes()));
    }

    #[test]
    fn undecorated_commit_is_not_a_boundary() {
        assert!(!Decorations::default().marks_boundary("topic", &remotes()));
    }
}
