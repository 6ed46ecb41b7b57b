//! Frame sequence detection over flat file listings.
//!
//! # Design
//! - A name is a frame when it matches `<prefix><digits><.ext>`; the prefix is
//!   the shortest run before the last digit run that precedes the extension.
//! - Groups keep first-appearance order; standalone names follow all groups.
//! - Frames within a group sort by index with ties kept in listing order.

use std::cmp::Ordering;
use std::collections::HashMap;

use regex::Regex;

use crate::error::{FsOpsError, FsOpsResult};
use crate::model::ListingEntry;

const FRAME_PATTERN: &str = r"^(.*?)(\d+)(\.\w+)$";

/// Parsed frame name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameKey<'a> {
    /// Text before the frame number.
    pub prefix: &'a str,
    /// Frame number.
    pub frame: u64,
    /// Extension including the leading dot.
    pub extension: &'a str,
}

/// Groups numbered files into sequences.
#[derive(Debug, Clone)]
pub struct SequenceDetector {
    pattern: Regex,
}

impl SequenceDetector {
    /// Compile the frame pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern fails to compile.
    pub fn new() -> FsOpsResult<Self> {
        let pattern =
            Regex::new(FRAME_PATTERN).map_err(|err| FsOpsError::regex(FRAME_PATTERN, err))?;
        Ok(Self { pattern })
    }

    /// Split a file name into prefix, frame number, and extension.
    ///
    /// Names without an extension, and frame numbers too large for `u64`, yield `None`.
    #[must_use]
    pub fn frame_key<'a>(&self, name: &'a str) -> Option<FrameKey<'a>> {
        let captures = self.pattern.captures(name)?;
        let prefix = captures.get(1)?.as_str();
        let frame = captures.get(2)?.as_str().parse::<u64>().ok()?;
        let extension = captures.get(3)?.as_str();
        Some(FrameKey {
            prefix,
            frame,
            extension,
        })
    }

    /// Compact a listing into sequences and standalone names.
    ///
    /// When `extension_filter` is set only names ending in it are considered;
    /// `exr` and `.exr` are equivalent.
    #[must_use]
    pub fn detect<S: AsRef<str>>(
        &self,
        files: &[S],
        extension_filter: Option<&str>,
    ) -> Vec<ListingEntry> {
        let suffix = extension_filter.and_then(dotted_extension);

        let mut groups: Vec<Vec<(u64, &str)>> = Vec::new();
        let mut index: HashMap<(&str, &str), usize> = HashMap::new();
        let mut standalone = Vec::new();

        for name in files.iter().map(AsRef::as_ref) {
            if let Some(suffix) = &suffix
                && !name.ends_with(suffix.as_str())
            {
                continue;
            }
            match self.frame_key(name) {
                Some(key) => {
                    let slot = *index.entry((key.prefix, key.extension)).or_insert_with(|| {
                        groups.push(Vec::new());
                        groups.len() - 1
                    });
                    groups[slot].push((key.frame, name));
                }
                None => standalone.push(name),
            }
        }

        let mut entries = Vec::with_capacity(groups.len() + standalone.len());
        for mut frames in groups {
            frames.sort_by_key(|(frame, _)| *frame);
            match frames.as_slice() {
                [(_, only)] => entries.push(ListingEntry::Single((*only).to_string())),
                [(_, first), .., (_, last)] => entries.push(ListingEntry::Sequence(
                    (*first).to_string(),
                    (*last).to_string(),
                )),
                [] => {}
            }
        }
        entries.extend(
            standalone
                .into_iter()
                .map(|name| ListingEntry::Single(name.to_string())),
        );
        entries
    }

    /// Order sequence members by prefix, then frame number, then name.
    ///
    /// Names that are not frames sort after frames, by name.
    #[must_use]
    pub fn compare_members(&self, left: &str, right: &str) -> Ordering {
        match (self.frame_key(left), self.frame_key(right)) {
            (Some(a), Some(b)) => a
                .prefix
                .cmp(b.prefix)
                .then(a.frame.cmp(&b.frame))
                .then_with(|| left.cmp(right)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => left.cmp(right),
        }
    }
}

/// Normalise an extension to `.ext`; empty input means no extension.
pub(crate) fn dotted_extension(raw: &str) -> Option<String> {
    let bare = raw.trim().trim_start_matches('.');
    (!bare.is_empty()).then(|| format!(".{bare}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult<T> = FsOpsResult<T>;

    fn pair(first: &str, last: &str) -> ListingEntry {
        ListingEntry::Sequence(first.to_string(), last.to_string())
    }

    fn single(name: &str) -> ListingEntry {
        ListingEntry::Single(name.to_string())
    }

    #[test]
    fn groups_sequences_and_applies_filter() -> TestResult<()> {
        let detector = SequenceDetector::new()?;
        let files = ["shot_0001.exr", "shot_0002.exr", "shot_0003.exr", "readme.txt"];

        assert_eq!(
            detector.detect(&files, Some(".exr")),
            vec![pair("shot_0001.exr", "shot_0003.exr")]
        );
        assert_eq!(
            detector.detect(&files, None),
            vec![pair("shot_0001.exr", "shot_0003.exr"), single("readme.txt")]
        );
        Ok(())
    }

    #[test]
    fn singleton_sequence_is_a_bare_name() -> TestResult<()> {
        let detector = SequenceDetector::new()?;
        assert_eq!(
            detector.detect(&["frame_0010.dpx"], None),
            vec![single("frame_0010.dpx")]
        );
        Ok(())
    }

    #[test]
    fn filtering_can_reduce_a_group_to_one_member() -> TestResult<()> {
        let detector = SequenceDetector::new()?;
        let files = ["comp_0001.exr", "comp_0002.jpg"];
        assert_eq!(
            detector.detect(&files, Some("exr")),
            vec![single("comp_0001.exr")]
        );
        Ok(())
    }

    #[test]
    fn frames_sort_numerically_not_lexically() -> TestResult<()> {
        let detector = SequenceDetector::new()?;
        let files = ["plate.100.exr", "plate.9.exr", "plate.10.exr"];
        assert_eq!(
            detector.detect(&files, None),
            vec![pair("plate.9.exr", "plate.100.exr")]
        );
        Ok(())
    }

    #[test]
    fn groups_keep_first_appearance_order_and_standalones_trail() -> TestResult<()> {
        let detector = SequenceDetector::new()?;
        let files = [
            "notes",
            "b_0002.png",
            "a_0001.exr",
            "b_0001.png",
            "a_0002.exr",
            "Makefile.txt",
        ];
        assert_eq!(
            detector.detect(&files, None),
            vec![
                pair("b_0001.png", "b_0002.png"),
                pair("a_0001.exr", "a_0002.exr"),
                single("notes"),
                single("Makefile.txt"),
            ]
        );
        Ok(())
    }

    #[test]
    fn names_without_extension_pass_through() -> TestResult<()> {
        let detector = SequenceDetector::new()?;
        assert!(detector.frame_key("render_0001").is_none());
        assert_eq!(
            detector.detect(&["render_0001", "render_0002"], None),
            vec![single("render_0001"), single("render_0002")]
        );
        Ok(())
    }

    #[test]
    fn duplicate_frames_keep_listing_order() -> TestResult<()> {
        let detector = SequenceDetector::new()?;
        let files = ["v_01.exr", "v_1.exr"];
        assert_eq!(
            detector.detect(&files, None),
            vec![pair("v_01.exr", "v_1.exr")]
        );
        Ok(())
    }

    #[test]
    fn oversized_frame_numbers_are_standalone() -> TestResult<()> {
        let detector = SequenceDetector::new()?;
        let huge = "cache_123456789012345678901234567890.vdb";
        assert!(detector.frame_key(huge).is_none());
        assert_eq!(detector.detect(&[huge], None), vec![single(huge)]);
        Ok(())
    }

    #[test]
    fn members_order_by_prefix_then_frame() -> TestResult<()> {
        let detector = SequenceDetector::new()?;
        let mut names = vec!["b_0001.exr", "a_0010.exr", "notes.exr", "a_0002.exr"];
        names.sort_by(|l, r| detector.compare_members(l, r));
        assert_eq!(names, vec!["a_0002.exr", "a_0010.exr", "b_0001.exr", "notes.exr"]);
        Ok(())
    }

    #[test]
    fn dotted_extension_normalises_input() {
        assert_eq!(dotted_extension("exr").as_deref(), Some(".exr"));
        assert_eq!(dotted_extension(".exr").as_deref(), Some(".exr"));
        assert_eq!(dotted_extension(" "), None);
    }
}
