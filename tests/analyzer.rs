// tests/analyzer.rs
// Reference-id resolution and malformed-output handling in CategoryAnalyzer.

use std::sync::{Arc, Mutex};

use hr_trend_digest::analyze::CategoryAnalyzer;
use hr_trend_digest::config::CategoryCfg;
use hr_trend_digest::genai::{
    AttemptOutcome, FailureKind, GenProvider, GenerationClient, NoBackoff,
};
use hr_trend_digest::ingest::types::Candidate;

/// Returns the same outcome on every attempt and counts calls.
struct FixedProvider {
    outcome: AttemptOutcome,
    calls: Mutex<u32>,
}

impl FixedProvider {
    fn new(outcome: AttemptOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: Mutex::new(0),
        })
    }

    fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl GenProvider for FixedProvider {
    async fn attempt(&self, _prompt: &str) -> AttemptOutcome {
        *self.calls.lock().unwrap() += 1;
        self.outcome.clone()
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

fn client(provider: Arc<FixedProvider>) -> GenerationClient {
    GenerationClient::new(provider, Arc::new(NoBackoff), 1)
}

fn category() -> CategoryCfg {
    CategoryCfg {
        id: "labor-issues".into(),
        title: "노무이슈".into(),
        query: "노무이슈".into(),
        terms: vec!["임금".into(), "노조".into()],
        prompt: "최대 {count}건 선택:\n{context}".into(),
    }
}

fn candidates() -> Vec<Candidate> {
    vec![
        Candidate {
            title: "통상임금 판결".into(),
            link: "https://news.example/1".into(),
            description: "대법원 판결 요지".into(),
            published_at: 1_754_000_000,
            category: "labor-issues".into(),
        },
        Candidate {
            title: "노조 교섭 결렬".into(),
            link: "https://news.example/2".into(),
            description: "교섭 중단".into(),
            published_at: 1_754_100_000,
            category: "labor-issues".into(),
        },
    ]
}

#[tokio::test]
async fn empty_candidates_short_circuit_without_generation() {
    let provider = FixedProvider::new(AttemptOutcome::Success("{}".into()));
    let gen = client(provider.clone());
    let analyzer = CategoryAnalyzer::new(&gen);

    let (records, err) = analyzer.analyze(&[], &category(), 3).await;
    assert!(records.is_empty());
    assert!(err.is_none());
    assert_eq!(provider.calls(), 0, "no candidates means no remote call");
}

#[tokio::test]
async fn resolves_numeric_and_string_refs() {
    let reply = r#"{"items": [
        {"ref": 1, "headline": "판결 분석", "fact": "사실", "significance": "시사점", "business_impact": "영향", "actions": ["조치"]},
        {"ref": "2", "headline": "교섭 분석", "fact": "사실", "significance": "시사점", "business_impact": "영향"}
    ]}"#;
    let gen = client(FixedProvider::new(AttemptOutcome::Success(reply.into())));
    let analyzer = CategoryAnalyzer::new(&gen);

    let (records, err) = analyzer.analyze(&candidates(), &category(), 3).await;
    assert!(err.is_none());
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].source_link, "https://news.example/1");
    assert_eq!(records[0].source_date, 1_754_000_000);
    assert_eq!(records[1].source_link, "https://news.example/2");
    assert!(records.iter().all(|r| !r.is_fallback));
}

#[tokio::test]
async fn hallucinated_refs_are_dropped() {
    let reply = r#"{"items": [
        {"ref": 99, "headline": "유령 기사"},
        {"ref": "abc", "headline": "비정상 참조"},
        {"ref": 1, "headline": "실제 기사"}
    ]}"#;
    let gen = client(FixedProvider::new(AttemptOutcome::Success(reply.into())));
    let analyzer = CategoryAnalyzer::new(&gen);

    let (records, err) = analyzer.analyze(&candidates(), &category(), 3).await;
    assert!(err.is_none());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].headline, "실제 기사");
    assert_eq!(records[0].source_link, "https://news.example/1");
}

#[tokio::test]
async fn duplicate_refs_collapse_to_one_record() {
    let reply = r#"{"items": [
        {"ref": 1, "headline": "첫 번째"},
        {"ref": "1", "headline": "같은 기사 재선택"}
    ]}"#;
    let gen = client(FixedProvider::new(AttemptOutcome::Success(reply.into())));
    let analyzer = CategoryAnalyzer::new(&gen);

    let (records, _) = analyzer.analyze(&candidates(), &category(), 3).await;
    assert_eq!(records.len(), 1, "a candidate never appears twice");
}

#[tokio::test]
async fn fenced_reply_with_commentary_still_parses() {
    let reply = "```json\n{\"items\": [{\"ref\": 2, \"headline\": \"교섭\"}]}\n``` 참고하세요.";
    let gen = client(FixedProvider::new(AttemptOutcome::Success(reply.into())));
    let analyzer = CategoryAnalyzer::new(&gen);

    let (records, err) = analyzer.analyze(&candidates(), &category(), 3).await;
    assert!(err.is_none());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source_link, "https://news.example/2");
}

#[tokio::test]
async fn unparseable_reply_is_a_parse_error() {
    let gen = client(FixedProvider::new(AttemptOutcome::Success(
        "도저히 JSON이 아닌 답변".into(),
    )));
    let analyzer = CategoryAnalyzer::new(&gen);

    let (records, err) = analyzer.analyze(&candidates(), &category(), 3).await;
    assert!(records.is_empty());
    assert_eq!(err, Some(FailureKind::Parse));
}

#[tokio::test]
async fn wrong_shape_is_a_parse_error() {
    let gen = client(FixedProvider::new(AttemptOutcome::Success(
        r#"{"answer": 42}"#.into(),
    )));
    let analyzer = CategoryAnalyzer::new(&gen);

    let (_, err) = analyzer.analyze(&candidates(), &category(), 3).await;
    assert_eq!(err, Some(FailureKind::Parse));
}

#[tokio::test]
async fn generation_failure_passes_through_classified_kind() {
    let gen = client(FixedProvider::new(AttemptOutcome::Fatal(
        FailureKind::Blocked("SAFETY".into()),
    )));
    let analyzer = CategoryAnalyzer::new(&gen);

    let (records, err) = analyzer.analyze(&candidates(), &category(), 3).await;
    assert!(records.is_empty());
    assert_eq!(err, Some(FailureKind::Blocked("SAFETY".into())));
}
