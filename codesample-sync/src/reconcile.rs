//! Fragment reconciliation between two observations of one file.
//!
//! Fragments are matched by [`FragmentKey`] only. A rename (same content
//! under a new codename or language) is one removal plus one addition.
//! Matched fragments with identical content need no sync action and appear in
//! none of the output lists.

use std::collections::HashMap;

use codesample_core::{CodeFragment, FragmentKey};

/// Added, modified and removed fragments for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentDelta {
    pub added: Vec<CodeFragment>,
    /// Carries the *new* value, so consumers always upsert current content.
    pub modified: Vec<CodeFragment>,
    pub removed: Vec<CodeFragment>,
}

impl FragmentDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    /// Fragments that must be written to the backend.
    pub fn upserts(&self) -> impl Iterator<Item = &CodeFragment> {
        self.added.iter().chain(self.modified.iter())
    }
}

/// Compare the previous and current fragment sets of a file.
///
/// When a key occurs more than once in a list, the first occurrence is the
/// one matched against the other list.
pub fn compare(old: &[CodeFragment], new: &[CodeFragment]) -> FragmentDelta {
    let old_index = first_by_key(old);
    let new_index = first_by_key(new);

    let mut delta = FragmentDelta::default();

    for fragment in old {
        match new_index.get(&fragment.key()) {
            None => delta.removed.push(fragment.clone()),
            Some(current) if current.content != fragment.content => {
                delta.modified.push((*current).clone());
            }
            Some(_) => {}
        }
    }

    for fragment in new {
        if !old_index.contains_key(&fragment.key()) {
            delta.added.push(fragment.clone());
        }
    }

    delta
}

fn first_by_key(fragments: &[CodeFragment]) -> HashMap<FragmentKey, &CodeFragment> {
    let mut index = HashMap::with_capacity(fragments.len());
    for fragment in fragments {
        index.entry(fragment.key()).or_insert(fragment);
    }
    index
}

#[cfg(test)]
mod tests {
    use codesample_core::{FragmentType, Language};

    use super::*;

    fn curl(codename: &str, content: &str) -> CodeFragment {
        CodeFragment::new(codename, Language::Curl, content)
    }

    #[test]
    fn fragment_missing_from_new_is_removed() {
        let delta = compare(&[curl("intro_curl", "X")], &[]);
        assert_eq!(delta.removed, vec![curl("intro_curl", "X")]);
        assert!(delta.added.is_empty());
        assert!(delta.modified.is_empty());
    }

    #[test]
    fn changed_content_is_modified_with_new_value() {
        let delta = compare(&[curl("intro_curl", "X")], &[curl("intro_curl", "Y")]);
        assert_eq!(delta.modified, vec![curl("intro_curl", "Y")]);
        assert!(delta.added.is_empty());
        assert!(delta.removed.is_empty());
    }

    #[test]
    fn fragment_missing_from_old_is_added() {
        let delta = compare(&[], &[curl("intro_curl", "X")]);
        assert_eq!(delta.added, vec![curl("intro_curl", "X")]);
        assert!(delta.modified.is_empty());
        assert!(delta.removed.is_empty());
    }

    #[test]
    fn unchanged_fragments_produce_empty_delta() {
        let list = vec![
            curl("intro_curl", "X"),
            CodeFragment::new("intro_java", Language::Java, "Y"),
        ];
        let delta = compare(&list, &list.clone());
        assert!(delta.is_empty());
    }

    #[test]
    fn rename_is_removal_plus_addition() {
        let delta = compare(&[curl("intro_curl", "X")], &[curl("welcome_curl", "X")]);
        assert_eq!(delta.removed, vec![curl("intro_curl", "X")]);
        assert_eq!(delta.added, vec![curl("welcome_curl", "X")]);
        assert!(delta.modified.is_empty());
    }

    #[test]
    fn language_change_is_removal_plus_addition() {
        let old = curl("intro_x", "X");
        let new = CodeFragment::new("intro_x", Language::Ruby, "X");
        let delta = compare(&[old.clone()], &[new.clone()]);
        assert_eq!(delta.removed, vec![old]);
        assert_eq!(delta.added, vec![new]);
    }

    #[test]
    fn type_is_part_of_identity() {
        let untyped = curl("intro_curl", "X");
        let typed = curl("intro_curl", "X").with_type(FragmentType::Sample);
        let delta = compare(&[untyped.clone()], &[typed.clone()]);
        assert_eq!(delta.removed, vec![untyped]);
        assert_eq!(delta.added, vec![typed]);
    }

    #[test]
    fn mixed_changes_are_classified_independently() {
        let old = vec![
            curl("a_curl", "1"),
            curl("b_curl", "2"),
            curl("c_curl", "3"),
        ];
        let new = vec![curl("a_curl", "1"), curl("b_curl", "22"), curl("d_curl", "4")];
        let delta = compare(&old, &new);
        assert_eq!(delta.added, vec![curl("d_curl", "4")]);
        assert_eq!(delta.modified, vec![curl("b_curl", "22")]);
        assert_eq!(delta.removed, vec![curl("c_curl", "3")]);
        assert_eq!(delta.upserts().count(), 2);
    }
}
