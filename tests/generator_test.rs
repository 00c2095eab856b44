use share_harvester::generator::{
    is_well_formed, locator_suffix, CandidateGenerator, MIN_SUFFIX_LEN, SHARE_URL_PREFIX,
};
use std::collections::HashSet;

#[test]
fn generates_exactly_count_well_formed_links() {
    let generator = CandidateGenerator::new();
    let links = generator.generate(50);

    assert_eq!(links.len(), 50);
    for link in &links {
        assert!(link.starts_with(SHARE_URL_PREFIX), "bad prefix: {}", link);
        let suffix = locator_suffix(link);
        assert!(
            suffix.len() >= MIN_SUFFIX_LEN,
            "suffix too short: {}",
            suffix
        );
        assert!(is_well_formed(link));
    }
}

#[test]
fn generated_links_are_distinct() {
    let generator = CandidateGenerator::new();
    let links = generator.generate(200);
    let unique: HashSet<&String> = links.iter().collect();
    assert_eq!(unique.len(), links.len());
}

#[test]
fn zero_count_yields_empty_batch() {
    let generator = CandidateGenerator::new();
    assert!(generator.generate(0).is_empty());
}

#[test]
fn format_check_rejects_malformed_locators() {
    assert!(!is_well_formed("https://example.com/share/0123456789abcdef0123"));
    assert!(!is_well_formed("https://chatgpt.com/share/short"));
    assert!(!is_well_formed("https://chatgpt.com/share/0123456789abcdef0123/extra"));
    assert!(!is_well_formed(""));
    assert!(is_well_formed(
        "https://chatgpt.com/share/0123456789abcdef0123456789abcdef"
    ));
}
