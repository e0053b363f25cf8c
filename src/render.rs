// src/render.rs
//! HTML assembly for the digest edition and plain-text operator alerts.
//! Deliberately thin: string building only, no template engine.

use chrono::{DateTime, Utc};
use html_escape::encode_text;
use std::fmt::Write as _;

use crate::decision::{Edition, EditionDecision};
use crate::engine::DigestRun;

pub fn display_date(now: &DateTime<Utc>) -> String {
    now.format("%Y년 %m월 %d일").to_string()
}

pub fn subject(display_date: &str) -> String {
    format!("[{display_date}] 주간 HR 트렌드 브리핑")
}

pub fn collection_window(now: &DateTime<Utc>, lookback_days: i64) -> String {
    let from = *now - chrono::Duration::days(lookback_days);
    format!("{} ~ {}", from.format("%Y-%m-%d"), now.format("%Y-%m-%d"))
}

pub fn render_edition(run: &DigestRun, display_date: &str, window: &str) -> String {
    let mut html = String::new();
    let _ = write!(
        &mut html,
        "<html><body style=\"font-family: 'Malgun Gothic', sans-serif; line-height: 1.6; color: #333;\">\
         <div style=\"max-width: 600px; margin: auto; border: 1px solid #ddd; padding: 20px;\">\
         <div style=\"background-color: #2c3e50; color: #fff; padding: 12px; text-align: center;\">\
         <h2 style=\"margin: 0;\">주간 HR 트렌드 브리핑</h2>\
         <p style=\"margin: 5px 0 0 0;\">발행일: {}</p></div>",
        encode_text(display_date)
    );

    if run.decision.edition == Edition::Degraded {
        html.push_str(
            "<p style=\"color: #b00; font-size: 13px;\">이번 호는 자동 분석이 생성되지 않아 \
             축약판으로 발행되었습니다.</p>",
        );
    }

    for section in &run.sections {
        if section.records.is_empty() {
            continue;
        }
        let _ = write!(
            &mut html,
            "<h3 style=\"border-bottom: 1px solid #eee; padding-bottom: 4px;\">{}</h3>",
            encode_text(&section.title)
        );
        for rec in &section.records {
            let _ = write!(&mut html, "<h4>{}</h4>", encode_text(&rec.headline));
            if !rec.fact.is_empty() {
                let _ = write!(&mut html, "<p><b>요약</b>: {}</p>", encode_text(&rec.fact));
            }
            if !rec.significance.is_empty() {
                let _ = write!(
                    &mut html,
                    "<p><b>시사점</b>: {}</p>",
                    encode_text(&rec.significance)
                );
            }
            if !rec.business_impact.is_empty() {
                let _ = write!(
                    &mut html,
                    "<p><b>경영 영향</b>: {}</p>",
                    encode_text(&rec.business_impact)
                );
            }
            if !rec.actions.is_empty() {
                html.push_str("<p><b>실무 가이드</b>:</p><ul>");
                for a in &rec.actions {
                    let _ = write!(&mut html, "<li>{}</li>", encode_text(a));
                }
                html.push_str("</ul>");
            }
        }
    }

    if let Some(manual) = &run.manual {
        let _ = write!(
            &mut html,
            "<h3>담당자 공지</h3><p>{}</p>",
            encode_text(manual)
        );
    }

    let links: Vec<(&str, &str)> = run
        .sections
        .iter()
        .flat_map(|s| s.records.iter())
        .map(|r| (r.headline.as_str(), r.source_link.as_str()))
        .collect();
    if !links.is_empty() {
        html.push_str(
            "<h4>🔗 원문 기사 링크</h4><ul style=\"font-size: 13px; color: #555;\">",
        );
        for (title, link) in links {
            let _ = write!(
                &mut html,
                "<li><a href=\"{}\" target=\"_blank\">{}</a></li>",
                encode_text(link),
                encode_text(title)
            );
        }
        html.push_str("</ul>");
    }

    let _ = write!(
        &mut html,
        "<div style=\"background-color: #f9f9f9; padding: 15px; font-size: 11px; color: #888;\">\
         본 메일은 자동화 시스템으로 발송되었습니다.<br>수집 기간: {}</div></div></body></html>",
        encode_text(window)
    );
    html
}

/// Plain-text body for degraded/suppressed operator alerts.
pub fn render_alert(decision: &EditionDecision) -> String {
    let mut out = format!("edition: {:?}\n", decision.edition);
    for w in &decision.warnings {
        out.push_str(w);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::AnalysisRecord;
    use crate::decision::{decide, SectionStatus};
    use crate::engine::CategorySection;

    fn run_with_one_record() -> DigestRun {
        let rec = AnalysisRecord {
            headline: "통상임금 <판결>".into(),
            fact: "요약문".into(),
            significance: "시사점".into(),
            business_impact: String::new(),
            actions: vec!["가이드 1".into()],
            source_link: "https://news.example/a?x=1&y=2".into(),
            source_date: 0,
            is_fallback: false,
        };
        let sections = vec![CategorySection {
            id: "labor".into(),
            title: "노무 이슈".into(),
            records: vec![rec],
            used_fallback: false,
        }];
        let statuses: Vec<SectionStatus> = sections
            .iter()
            .map(|s| SectionStatus {
                category: s.id.clone(),
                records: s.records.len(),
                used_fallback: s.used_fallback,
            })
            .collect();
        let decision = decide(&statuses, false);
        DigestRun {
            sections,
            manual: None,
            decision,
        }
    }

    #[test]
    fn edition_contains_sections_and_links() {
        let run = run_with_one_record();
        let html = render_edition(&run, "2026년 08월 04일", "2026-07-28 ~ 2026-08-04");
        assert!(html.contains("노무 이슈"));
        assert!(html.contains("원문 기사 링크"));
        assert!(html.contains("수집 기간: 2026-07-28 ~ 2026-08-04"));
    }

    #[test]
    fn titles_are_html_escaped() {
        let run = run_with_one_record();
        let html = render_edition(&run, "d", "w");
        assert!(html.contains("통상임금 &lt;판결&gt;"));
        assert!(!html.contains("통상임금 <판결>"));
    }

    #[test]
    fn subject_carries_display_date() {
        assert_eq!(
            subject("2026년 08월 04일"),
            "[2026년 08월 04일] 주간 HR 트렌드 브리핑"
        );
    }
}
