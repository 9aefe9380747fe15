//! Grouping fragments into codename-rooted bundles and rendering bundles into
//! the backend's fixed per-language record.

use std::collections::HashMap;

use codesample_core::{CodeFragment, CodeSamples, CodenameCodeFragments, CodenameRoot, Language};

/// Strip the trailing `_variant` suffix of a codename.
///
/// Splits at the last `_`; a codename without one is its own root.
pub fn codename_root(codename: &str) -> &str {
    match codename.rfind('_') {
        Some(idx) => &codename[..idx],
        None => codename,
    }
}

/// Group fragments by codename root.
///
/// Every input fragment lands in exactly one bundle. Bundle order is
/// unspecified; fragment order inside a bundle follows the input.
pub fn group_by_codename_root<I>(fragments: I) -> HashMap<CodenameRoot, CodenameCodeFragments>
where
    I: IntoIterator<Item = CodeFragment>,
{
    let mut bundles: HashMap<CodenameRoot, CodenameCodeFragments> = HashMap::new();
    for fragment in fragments {
        let root = CodenameRoot::from(codename_root(&fragment.codename));
        bundles
            .entry(root.clone())
            .or_insert_with(|| CodenameCodeFragments::new(root))
            .fragments
            .push(fragment);
    }
    bundles
}

/// Render a bundle onto every supported language.
///
/// Languages absent from the bundle render as empty content. If two fragments
/// in the bundle share a language, the later one wins.
pub fn to_record(bundle: &CodenameCodeFragments) -> CodeSamples {
    let mut record = CodeSamples::default();
    for fragment in &bundle.fragments {
        record.set(fragment.language, fragment.content.as_str());
    }
    record
}

/// Copy of `record` with every language in `languages` emptied.
pub fn clear_languages(record: &CodeSamples, languages: &[Language]) -> CodeSamples {
    let mut cleared = record.clone();
    for language in languages {
        cleared.set(*language, String::new());
    }
    cleared
}

/// Human-readable item name: `code_samples_test` → `Code Samples Test`.
///
/// Only the first character of each word is upper-cased; the rest is kept
/// as written, so `HELLO_world` becomes `HELLO World` and acronyms survive.
pub fn title_from_codename_root(root: &str) -> String {
    root.split('_')
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn fragment(codename: &str, language: Language, content: &str) -> CodeFragment {
        CodeFragment::new(codename, language, content)
    }

    #[rstest]
    #[case("intro_curl", "intro")]
    #[case("code_samples_test_java", "code_samples_test")]
    #[case("intro", "intro")]
    #[case("intro_", "intro")]
    #[case("", "")]
    fn root_is_split_at_last_underscore(#[case] codename: &str, #[case] root: &str) {
        assert_eq!(codename_root(codename), root);
    }

    #[test]
    fn language_variants_share_one_bundle() {
        let bundles = group_by_codename_root(vec![
            fragment("intro_curl", Language::Curl, "curl -X GET"),
            fragment("intro_java", Language::Java, "client.get()"),
        ]);
        assert_eq!(bundles.len(), 1);
        let intro = &bundles[&CodenameRoot::from("intro")];
        assert_eq!(intro.fragments.len(), 2);
    }

    #[test]
    fn no_fragment_is_dropped() {
        let input = vec![
            fragment("intro_curl", Language::Curl, "a"),
            fragment("intro_java", Language::Java, "b"),
            fragment("outro_curl", Language::Curl, "c"),
            fragment("standalone", Language::Ruby, "d"),
        ];
        let bundles = group_by_codename_root(input.clone());
        assert_eq!(bundles.len(), 3);
        let total: usize = bundles.values().map(|b| b.fragments.len()).sum();
        assert_eq!(total, input.len());
        for f in &input {
            let root = CodenameRoot::from(codename_root(&f.codename));
            assert!(bundles[&root].fragments.contains(f));
        }
    }

    #[test]
    fn record_fills_missing_languages_with_empty_content() {
        let mut bundle = CodenameCodeFragments::new("intro");
        bundle
            .fragments
            .push(fragment("intro_curl", Language::Curl, "curl"));
        let record = to_record(&bundle);
        assert_eq!(record.curl, "curl");
        for lang in Language::all().iter().filter(|l| **l != Language::Curl) {
            assert_eq!(record.get(*lang), "");
        }
    }

    #[test]
    fn duplicate_language_is_last_write_wins() {
        let mut bundle = CodenameCodeFragments::new("intro");
        bundle
            .fragments
            .push(fragment("intro_curl", Language::Curl, "first"));
        bundle
            .fragments
            .push(fragment("intro_curl", Language::Curl, "second"));
        assert_eq!(to_record(&bundle).curl, "second");
    }

    #[test]
    fn clear_languages_leaves_others_untouched() {
        let mut record = CodeSamples::default();
        record.set(Language::Curl, "curl");
        record.set(Language::Java, "java");
        let cleared = clear_languages(&record, &[Language::Curl]);
        assert_eq!(cleared.curl, "");
        assert_eq!(cleared.java, "java");
    }

    #[rstest]
    #[case("code_samples_test", "Code Samples Test")]
    #[case("intro", "Intro")]
    #[case("", "")]
    #[case("already_Upper", "Already Upper")]
    #[case("HELLO_world", "HELLO World")]
    #[case("get_JSON_body", "Get JSON Body")]
    fn title_from_root(#[case] root: &str, #[case] title: &str) {
        assert_eq!(title_from_codename_root(root), title);
    }
}
