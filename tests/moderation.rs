use bleep::matcher::{BannedWordSet, MatchThresholds};
use bleep::normalize::NormalizationRules;
use bleep::pipeline::{FlaggedWord, ModerationResult, Moderator, TenantContext};
use bleep::severity::lexicon::LexiconModel;
use bleep::severity::Severity;

fn moderator() -> Moderator {
    Moderator::new(NormalizationRules::default(), MatchThresholds::default())
}

fn corpus(words: &[&str]) -> BannedWordSet {
    BannedWordSet::from_words(words.iter().copied())
}

/// A tenant that wants everything caught.
fn strict_tenant() -> TenantContext {
    TenantContext::new("acme", Severity::Benign)
}

fn run(text: &str, global: &BannedWordSet, tenant: &TenantContext) -> ModerationResult {
    moderator()
        .moderate(text, tenant, global, &LexiconModel::builtin())
        .unwrap()
}

// --- Censorship ---

#[test]
fn censors_and_flags_in_occurrence_order() {
    let global = corpus(&["fuck", "idiot"]);
    let result = run("You are a fucking idiot", &global, &strict_tenant());

    assert_eq!(result.censored, "You are a ******* *****");
    assert_eq!(
        result.flagged,
        vec![
            FlaggedWord {
                original: "fucking".to_string(),
                matched: "fuck".to_string(),
            },
            FlaggedWord {
                original: "idiot".to_string(),
                matched: "idiot".to_string(),
            },
        ]
    );
}

#[test]
fn leetspeak_is_defeated() {
    let global = corpus(&["fuck"]);
    let result = run("f@ck you", &global, &strict_tenant());

    assert_eq!(result.censored, "**** you");
    assert_eq!(result.flagged.len(), 1);
    assert_eq!(result.flagged[0].original, "f@ck");
    assert_eq!(result.flagged[0].matched, "fuck");
}

#[test]
fn normalization_turns_obfuscation_into_exact_hits() {
    let global = corpus(&["shit", "fuck"]);
    let tenant = strict_tenant();

    let result = run("sh1t happens", &global, &tenant);
    assert_eq!(result.censored, "**** happens");
    assert_eq!(result.flagged[0].matched, "shit");

    // Stretched letters collapse before lookup
    let result = run("fuuuuck off", &global, &tenant);
    assert_eq!(result.censored, "******* off");
    assert_eq!(result.flagged[0].matched, "fuck");

    // Embedded separators vanish before lookup
    let result = run("f_u_c_k this", &global, &tenant);
    assert_eq!(result.censored, "******* this");
    assert_eq!(result.flagged[0].original, "f_u_c_k");
}

#[test]
fn clean_text_passes_through_unchanged() {
    let global = corpus(&["fuck", "shit"]);
    let result = run("hello friend, nice morning", &global, &strict_tenant());

    assert_eq!(result.censored, "hello friend, nice morning");
    assert!(result.flagged.is_empty());
}

#[test]
fn duplicates_are_flagged_per_occurrence() {
    let global = corpus(&["fuck"]);
    let result = run("fuck this fuck", &global, &strict_tenant());

    assert_eq!(result.censored, "**** this ****");
    assert_eq!(result.flagged.len(), 2);
    assert!(result.flagged.iter().all(|f| f.matched == "fuck"));
}

// --- Length preservation ---

#[test]
fn censored_output_preserves_character_count() {
    let global = corpus(&["fuck", "merde"]);
    let texts = ["héllo fuck wörld", "m€rde! fuck", "fuck 💩 fuck"];
    for text in texts {
        let result = run(text, &global, &strict_tenant());
        assert_eq!(
            result.censored.chars().count(),
            text.chars().count(),
            "for text {text:?}"
        );
    }
}

#[test]
fn censor_character_is_configurable() {
    let moderator = Moderator::new(NormalizationRules::default(), MatchThresholds::default())
        .with_censor('#');
    let result = moderator
        .moderate(
            "f@ck you",
            &strict_tenant(),
            &corpus(&["fuck"]),
            &LexiconModel::builtin(),
        )
        .unwrap();
    assert_eq!(result.censored, "#### you");
}

// --- Tolerance gating ---

#[test]
fn tokens_below_the_tolerance_are_exempt() {
    let global = corpus(&["damn", "fuck"]);
    // damn is moderate (3) in the built-in lexicon: a strong (4) tolerance
    // lets it through, a moderate (3) one does not
    let lenient = TenantContext::new("lenient", Severity::Strong);
    let result = run("damn it", &global, &lenient);
    assert_eq!(result.censored, "damn it");
    assert!(result.flagged.is_empty());

    let moderate = TenantContext::new("moderate", Severity::Moderate);
    let result = run("damn it", &global, &moderate);
    assert_eq!(result.censored, "**** it");
    assert_eq!(result.flagged[0].matched, "damn");
}

#[test]
fn severe_only_tenant_skips_everything_else() {
    let global = corpus(&["damn", "fuck"]);
    let tenant = TenantContext::new("kids-app", Severity::Severe);
    let result = run("damn fuck", &global, &tenant);

    assert_eq!(result.censored, "damn ****");
    assert_eq!(result.flagged.len(), 1);
    assert_eq!(result.flagged[0].matched, "fuck");
}

// --- Tenant custom words ---

#[test]
fn custom_words_extend_the_global_corpus() {
    let global = corpus(&["fuck"]);
    let with_custom = strict_tenant().with_custom_words(corpus(&["widget"]));
    let result = run("widget fuck", &global, &with_custom);
    assert_eq!(result.censored, "****** ****");
    assert_eq!(result.flagged.len(), 2);

    // A tenant without the custom list only gets the global hits
    let plain = TenantContext::new("other", Severity::Benign);
    let result = run("widget fuck", &global, &plain);
    assert_eq!(result.censored, "widget ****");
    assert_eq!(result.flagged.len(), 1);
}

// --- Edge cases ---

#[test]
fn empty_corpus_flags_nothing() {
    let result = run("fuck you", &BannedWordSet::default(), &strict_tenant());
    assert_eq!(result.censored, "fuck you");
    assert!(result.flagged.is_empty());
}

#[test]
fn empty_text_yields_empty_result() {
    let result = run("", &corpus(&["fuck"]), &strict_tenant());
    assert_eq!(result.censored, "");
    assert!(result.flagged.is_empty());
}

// --- Serialized shape ---

#[test]
fn results_serialize_for_api_consumers() {
    let result = run("f@ck you", &corpus(&["fuck"]), &strict_tenant());
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["censored"], "**** you");
    assert_eq!(value["flagged"][0]["original"], "f@ck");
    assert_eq!(value["flagged"][0]["matched"], "fuck");

    let parsed: ModerationResult = serde_json::from_value(value).unwrap();
    assert_eq!(parsed.censored, result.censored);
    assert_eq!(parsed.flagged, result.flagged);
}
