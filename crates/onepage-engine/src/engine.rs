use onepage_align::{
    translate_units, Clusterer, LexicalScorer, SimilarityScorer, TableTranslator, Translator,
};
use onepage_facts::{FactAligner, InfoboxRecord};
use onepage_ir::{Assembler, AssemblyInput, IntermediateRepresentation};
use onepage_merge::ConflictResolver;
use onepage_refs::{ReferenceRegistry, SourcedCitation};
use onepage_segment::{segment, ArticleSnapshot, SegmentedArticle};
use onepage_types::ClaimUnit;
use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::snapshot::EntitySnapshot;

/// The alignment and merge engine.
///
/// An engine holds only its configuration. Runs share nothing, so one
/// engine may serve any number of concurrent runs.
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Create an engine with a configuration.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run with the snapshot's own translation table and the lexical scorer.
    pub async fn run_snapshot(&self, snapshot: &EntitySnapshot) -> EngineResult<IntermediateRepresentation> {
        let translator = TableTranslator::from_entries(snapshot.translations.iter().cloned());
        self.run(snapshot, &translator, &LexicalScorer).await
    }

    /// Merge every language edition of one entity into an IR.
    ///
    /// Articles that cannot be segmented and facts that fail validation are
    /// skipped with a warning. Translation failures leave the affected units
    /// untranslated. Only an invariant violation in the assembled IR fails
    /// the run.
    pub async fn run(
        &self,
        snapshot: &EntitySnapshot,
        translator: &dyn Translator,
        scorer: &dyn SimilarityScorer,
    ) -> EngineResult<IntermediateRepresentation> {
        let config = &self.config;
        let priority = config.language_priority();

        let articles = segment_all(snapshot);
        let mut languages: Vec<String> = articles.iter().map(|a| a.lang.clone()).collect();
        languages.dedup();

        let citations = articles
            .iter()
            .flat_map(|a| a.citations.iter().cloned())
            .chain(snapshot.facts.iter().flat_map(|f| f.citations()))
            .collect::<Vec<SourcedCitation>>();
        let registry = ReferenceRegistry::build(citations, &priority);

        let mut units: Vec<ClaimUnit> = Vec::new();
        let mut infoboxes: Vec<InfoboxRecord> = Vec::new();
        for article in articles {
            if !article.infobox.is_empty() {
                infoboxes.push(InfoboxRecord {
                    provenance: article.provenance.clone(),
                    lang: article.lang.clone(),
                    params: article.infobox,
                });
            }
            units.extend(article.units);
        }
        let unit_count = units.len();

        let units = translate_units(translator, &config.pivot, units, &config.retry).await;
        let clusters = Clusterer::new(&config.clustering, scorer).cluster(units);
        let resolved = ConflictResolver::new(&registry, &priority).resolve_all(clusters)?;
        let facts = FactAligner::new(&config.properties).align(&snapshot.facts, &infoboxes);

        let ir = Assembler::new(&config.taxonomy, &priority, &config.pivot).assemble(AssemblyInput {
            entity: snapshot.entity.clone(),
            clusters: resolved,
            facts,
            registry: &registry,
            languages,
        })?;

        let counts = &ir.metadata.counts;
        tracing::info!(
            entity = %ir.entity.qid,
            languages = ir.metadata.languages.len(),
            units = unit_count,
            clusters = counts.clusters,
            contested = counts.contested,
            facts = counts.facts,
            references = counts.references,
            low_confidence = counts.low_confidence,
            "merge complete"
        );
        Ok(ir)
    }
}

/// Segment every article in parallel, dropping the ones that fail. An
/// article listed more than once (same wiki and revision) is segmented once.
/// The result is sorted by language and wiki.
fn segment_all(snapshot: &EntitySnapshot) -> Vec<SegmentedArticle> {
    let mut inputs: Vec<&ArticleSnapshot> = snapshot.articles.iter().collect();
    inputs.sort_by(|a, b| {
        (&a.wiki, a.rev_id, &a.lang, &a.title, &a.text).cmp(&(&b.wiki, b.rev_id, &b.lang, &b.title, &b.text))
    });
    inputs.dedup_by(|later, earlier| {
        let duplicate = later.wiki == earlier.wiki && later.rev_id == earlier.rev_id;
        if duplicate {
            tracing::warn!(wiki = %later.wiki, rev_id = later.rev_id, "duplicate article skipped");
        }
        duplicate
    });

    let mut articles: Vec<SegmentedArticle> = inputs
        .par_iter()
        .filter_map(|article| match segment(article) {
            Ok(segmented) => Some(segmented),
            Err(e) => {
                tracing::warn!(wiki = %article.wiki, title = %article.title, error = %e, "article skipped");
                None
            }
        })
        .collect();
    articles.sort_by(|a, b| {
        (&a.lang, &a.provenance.wiki, a.provenance.rev_id).cmp(&(&b.lang, &b.provenance.wiki, b.provenance.rev_id))
    });
    for article in &articles {
        tracing::debug!(
            wiki = %article.provenance.wiki,
            units = article.units.len(),
            citations = article.citations.len(),
            low_confidence = article.low_confidence_count(),
            "article segmented"
        );
    }
    articles
}

#[cfg(test)]
mod tests {
    use super::*;
    use onepage_align::{AlignResult, CollaboratorError, TableEntry, Translation, TranslationRequest};
    use onepage_facts::CanonicalFact;
    use onepage_ir::ContentItem;
    use onepage_merge::Sourcing;
    use onepage_types::{CitationMetadata, EntityInfo, FactValue, Qid};
    use proptest::prelude::*;

    const EN: &str = "'''X''' is a politician.<ref>{{cite web|url=https://news.example/a|date=2020-01-01}}</ref> \
X was born in 1950.<ref>{{cite web|url=https://news.example/b|date=2020-05-01}}</ref>\n\n\
== Career ==\nX served as chief minister.";

    const HI: &str = "{{Infobox officeholder\n| जन्म_तारीख = 17 सितंबर 1950\n| पद = प्रधानमंत्री\n| कार्यकाल_शुरुआत = 20 May 2014\n}}\n\
'''X''' एक राजनेता हैं।<ref>{{cite web|url=https://news.example/a}}</ref> \
X का जन्म 1950 में हुआ।<ref>{{cite web|url=https://news.example/c|date=2022}}</ref><ref>{{cite web|url=https://news.example/d|date=2023}}</ref>";

    fn article(wiki: &str, lang: &str, rev_id: u64, text: &str) -> ArticleSnapshot {
        ArticleSnapshot {
            wiki: wiki.into(),
            lang: lang.into(),
            title: "X".into(),
            rev_id,
            text: text.into(),
        }
    }

    fn translation(source: &str, pivot: &str) -> TableEntry {
        TableEntry {
            lang: "hi".into(),
            source: source.into(),
            pivot: pivot.into(),
            quality: Some(0.9),
        }
    }

    fn snapshot() -> EntitySnapshot {
        let mut entity = EntityInfo::new("Q1058".parse::<Qid>().unwrap());
        entity.labels.insert("en".into(), "X".into());
        EntitySnapshot {
            entity,
            articles: vec![
                article("enwiki", "en", 100, EN),
                article("hiwiki", "hi", 200, HI),
                article("dewiki", "de", 300, "   "),
            ],
            facts: vec![
                CanonicalFact {
                    property: "P39".into(),
                    value: FactValue::Entity {
                        qid: "Q11696".into(),
                        label: Some("प्रधानमंत्री".into()),
                    },
                    qualifiers: [("P580".to_string(), "2014-05-26".to_string())].into(),
                    references: vec![CitationMetadata {
                        url: Some("https://pm.example/about".into()),
                        ..Default::default()
                    }],
                    as_of: None,
                },
                CanonicalFact {
                    property: "P569".into(),
                    value: FactValue::Time {
                        value: "1950-09-17".parse().unwrap(),
                    },
                    qualifiers: Default::default(),
                    references: vec![],
                    as_of: None,
                },
            ],
            translations: vec![
                translation("X एक राजनेता हैं।", "X is a politician."),
                translation("X का जन्म 1950 में हुआ।", "X was born in 1950."),
            ],
        }
    }

    fn fact(property: &str, value: FactValue, as_of: Option<&str>) -> CanonicalFact {
        CanonicalFact {
            property: property.into(),
            value,
            qualifiers: Default::default(),
            references: vec![],
            as_of: as_of.map(|d| d.parse().unwrap()),
        }
    }

    fn occupation(label: Option<&str>, as_of: Option<&str>) -> CanonicalFact {
        let value = FactValue::Entity {
            qid: "Q82955".into(),
            label: label.map(str::to_string),
        };
        fact("P106", value, as_of)
    }

    /// The base snapshot plus input that ties on every ordering key short of
    /// the full value: differently labelled copies of one statement,
    /// whitespace variants, competing translations of one sentence and a
    /// repeated article.
    fn tied_snapshot() -> EntitySnapshot {
        let mut snapshot = snapshot();
        snapshot.articles.push(article("enwiki", "en", 100, EN));
        snapshot.facts.extend([
            occupation(Some("politician"), Some("2020")),
            occupation(Some("Politician"), Some("2021")),
            occupation(None, None),
            fact("P1449", FactValue::text("NaMo"), None),
            fact("P1449", FactValue::text("NaMo "), None),
        ]);
        snapshot.translations.extend([
            translation("X एक राजनेता हैं।", "X is a statesman."),
            TableEntry {
                quality: Some(0.5),
                ..translation("X का जन्म 1950 में हुआ।", "X was born.")
            },
        ]);
        snapshot
    }

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).unwrap()
    }

    fn claim_texts(ir: &IntermediateRepresentation, slug: &str) -> Vec<(String, usize)> {
        ir.section(slug)
            .map(|s| {
                s.items
                    .iter()
                    .filter_map(|id| match &ir.content[id] {
                        ContentItem::Claim(c) => Some((c.primary.text.clone(), c.alternates.len())),
                        ContentItem::Fact(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn editions_merge_into_one_ir() {
        let ir = engine().run_snapshot(&snapshot()).await.unwrap();
        assert_eq!(ir.validate(), Ok(()));
        assert_eq!(ir.metadata.languages, vec!["en", "hi"]);

        let lead = claim_texts(&ir, "lead");
        assert_eq!(lead.len(), 2);
        // The Hindi birth sentence carries two newer references.
        assert!(lead.contains(&("X का जन्म 1950 में हुआ।".to_string(), 1)));
        assert!(lead.contains(&("X is a politician.".to_string(), 1)));
        assert_eq!(claim_texts(&ir, "career"), vec![("X served as chief minister.".to_string(), 0)]);
    }

    #[tokio::test]
    async fn shared_citation_becomes_one_reference() {
        let ir = engine().run_snapshot(&snapshot()).await.unwrap();
        let shared = ir
            .references
            .values()
            .find(|r| r.key.as_str() == "url:https://news.example/a")
            .unwrap();
        assert_eq!(shared.languages.iter().collect::<Vec<_>>(), ["en", "hi"]);
        // a, b, c, d and the canonical fact's reference
        assert_eq!(ir.references.len(), 5);
    }

    #[tokio::test]
    async fn facts_keep_disagreeing_infobox_values() {
        let ir = engine().run_snapshot(&snapshot()).await.unwrap();
        let p39: Vec<_> = ir.facts().filter(|(_, f)| f.property == "P39").collect();
        assert_eq!(p39.len(), 2);
        let p569: Vec<_> = ir.facts().filter(|(_, f)| f.property == "P569").collect();
        assert_eq!(p569.len(), 1);
        assert_eq!(p569[0].1.sources.len(), 2);
        assert!(ir.section("infobox").is_some());
    }

    struct Unavailable;

    #[async_trait::async_trait]
    impl Translator for Unavailable {
        async fn translate(&self, _pivot: &str, _requests: &[TranslationRequest]) -> AlignResult<Vec<Translation>> {
            Err(CollaboratorError::Unavailable("model offline".into()))
        }
    }

    #[tokio::test]
    async fn translation_outage_keeps_every_claim() {
        let mut config = EngineConfig::default();
        config.retry.timeout_ms = 50;
        let engine = Engine::new(config).unwrap();
        let ir = engine.run(&snapshot(), &Unavailable, &LexicalScorer).await.unwrap();
        let counts = &ir.metadata.counts;
        assert_eq!(counts.claims, 5);
        assert_eq!(counts.clusters, 5);
        assert_eq!(counts.low_confidence, 2);
        assert!(ir.claims().all(|(_, c)| c.alternates.is_empty()));
    }

    #[tokio::test]
    async fn unsourced_claims_are_marked() {
        let ir = engine().run_snapshot(&snapshot()).await.unwrap();
        let career = ir.section("career").unwrap();
        let ContentItem::Claim(claim) = &ir.content[&career.items[0]] else {
            panic!("expected a claim");
        };
        assert_eq!(claim.sourcing, Sourcing::Unsourced);
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.retry.max_attempts = 0;
        assert!(Engine::new(config).is_err());
    }

    #[tokio::test]
    async fn repeated_runs_are_byte_identical() {
        let engine = engine();
        let a = engine.run_snapshot(&snapshot()).await.unwrap().to_json_pretty().unwrap();
        let b = engine.run_snapshot(&snapshot()).await.unwrap().to_json_pretty().unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn repeated_article_is_merged_once() {
        let mut doubled = snapshot();
        doubled.articles.push(article("enwiki", "en", 100, EN));
        let engine = engine();
        let ir = engine.run_snapshot(&doubled).await.unwrap();
        let expected = engine.run_snapshot(&snapshot()).await.unwrap();
        assert_eq!(ir.metadata.counts, expected.metadata.counts);
        assert_eq!(ir.metadata.languages, vec!["en", "hi"]);
    }

    #[tokio::test]
    async fn equivalent_canonical_facts_share_one_item() {
        let ir = engine().run_snapshot(&tied_snapshot()).await.unwrap();
        assert_eq!(ir.validate(), Ok(()));
        let p106: Vec<_> = ir.facts().filter(|(_, f)| f.property == "P106").collect();
        assert_eq!(p106.len(), 1);
        assert_eq!(p106[0].1.sources.len(), 3);
        let p1449: Vec<_> = ir.facts().filter(|(_, f)| f.property == "P1449").collect();
        assert_eq!(p1449.len(), 1);
        assert_eq!(p1449[0].1.value, FactValue::text("NaMo"));
    }

    #[tokio::test]
    async fn best_translation_wins_over_list_order() {
        let mut reversed = tied_snapshot();
        reversed.translations.reverse();
        let engine = engine();
        let a = engine.run_snapshot(&tied_snapshot()).await.unwrap();
        let b = engine.run_snapshot(&reversed).await.unwrap();
        assert_eq!(a.to_json_pretty().unwrap(), b.to_json_pretty().unwrap());
        let pivots: Vec<_> = a
            .claims()
            .flat_map(|(_, c)| std::iter::once(&c.primary).chain(&c.alternates))
            .filter_map(|e| e.pivot_text.as_deref())
            .collect();
        assert!(pivots.contains(&"X was born in 1950."));
        assert!(pivots.contains(&"X is a statesman."));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn input_order_does_not_change_output(
            articles in Just(tied_snapshot().articles).prop_shuffle(),
            facts in Just(tied_snapshot().facts).prop_shuffle(),
            translations in Just(tied_snapshot().translations).prop_shuffle(),
        ) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            let engine = engine();
            let expected = runtime
                .block_on(engine.run_snapshot(&tied_snapshot()))
                .unwrap()
                .to_json_pretty()
                .unwrap();
            let shuffled = EntitySnapshot { articles, facts, translations, ..tied_snapshot() };
            let actual = runtime
                .block_on(engine.run_snapshot(&shuffled))
                .unwrap()
                .to_json_pretty()
                .unwrap();
            prop_assert_eq!(actual, expected);
        }
    }
}
