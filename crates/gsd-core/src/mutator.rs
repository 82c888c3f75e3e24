//! State mutator
//!
//! Section-aware edits to STATE.md. Every operation:
//! - edits only the body span it targets, splicing by byte range so payload
//!   text is never interpreted (`$1`, `%`, `|` stay literal)
//! - removes empty-list placeholders on the first append
//! - regenerates the frontmatter block from the edited body

use crate::error::{CoreError, CoreResult};
use crate::frontmatter;
use crate::state::{is_placeholder, BlockersTitle, DecisionsTitle, RATIONALE_SEPARATOR};
use crate::types::Decision;
use chrono::{DateTime, Utc};
use gsd_markdown::{
    bullet_lines, field_lines, find_section, line_spans, newline_style, split_frontmatter,
    FieldLine, TitleMatcher,
};
use serde::Serialize;

/// Trim a payload and fold interior line breaks into single spaces
#[must_use]
pub fn normalize_payload(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn required(text: &str, field: &'static str) -> CoreResult<String> {
    let normalized = normalize_payload(text);
    if normalized.is_empty() {
        Err(CoreError::empty(field))
    } else {
        Ok(normalized)
    }
}

fn validate_field_name(name: &str) -> CoreResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains(['*', ':', '\n', '\r']) {
        return Err(CoreError::InvalidFieldName(name.to_string()));
    }
    Ok(trimmed)
}

/// Render a decision as its bullet text (without the `- ` marker)
#[must_use]
pub fn decision_bullet(decision: &Decision) -> String {
    if decision.rationale.is_empty() {
        format!("[Phase {}]: {}", decision.phase, decision.summary)
    } else {
        format!(
            "[Phase {}]: {}{RATIONALE_SEPARATOR}{}",
            decision.phase, decision.summary, decision.rationale
        )
    }
}

fn push_line(out: &mut String, line: &str, nl: &str) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push_str(nl);
    }
    out.push_str(line);
    out.push_str(nl);
}

/// Append `entry` as the last line of the section `matcher` selects
///
/// Placeholder lines in the section are dropped. The entry goes after the
/// last remaining content line, or where the first placeholder was, or at
/// the top of the section. A missing section is created at the end of the
/// body under `## {heading}`.
fn append_to_section<M>(body: &str, matcher: &M, heading: &str, entry: &str) -> String
where
    M: TitleMatcher + ?Sized,
{
    let nl = newline_style(body);
    let Some(section) = find_section(body, matcher) else {
        tracing::debug!(heading, "section missing; creating it");
        let mut out = body.to_string();
        if !out.trim().is_empty() {
            if !out.ends_with('\n') {
                out.push_str(nl);
            }
            if !out.ends_with("\n\n") && !out.ends_with("\r\n\r\n") {
                out.push_str(nl);
            }
        }
        out.push_str(&format!("## {heading}{nl}{nl}"));
        push_line(&mut out, entry, nl);
        return out;
    };

    let mut kept: Vec<&str> = Vec::new();
    let mut placeholder_at = None;
    for line in line_spans(section.body) {
        if is_placeholder(line.text) {
            placeholder_at.get_or_insert(kept.len());
        } else {
            kept.push(&section.body[line.start..line.end]);
        }
    }
    let insert_at = kept
        .iter()
        .rposition(|raw| !raw.trim().is_empty())
        .map(|idx| idx + 1)
        .or(placeholder_at)
        .unwrap_or(0);

    let mut rebuilt = String::with_capacity(section.body.len() + entry.len() + nl.len());
    for raw in &kept[..insert_at] {
        rebuilt.push_str(raw);
    }
    if !rebuilt.is_empty() && !rebuilt.ends_with('\n') {
        rebuilt.push_str(nl);
    }
    rebuilt.push_str(entry);
    rebuilt.push_str(nl);
    for raw in &kept[insert_at..] {
        rebuilt.push_str(raw);
    }

    let prefix = &body[..section.body_range.start];
    let mut out = String::with_capacity(body.len() + entry.len() + 2 * nl.len());
    out.push_str(prefix);
    if !prefix.ends_with('\n') {
        out.push_str(nl);
    }
    out.push_str(&rebuilt);
    out.push_str(&body[section.body_range.end..]);
    out
}

/// A new document plus what the mutation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation<R> {
    /// Full document text to persist
    pub document: String,
    /// Command result
    pub report: R,
}

/// Result of `state add-decision`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionAdded {
    /// Always true
    pub added: bool,
    /// Decision as stored
    pub decision: Decision,
}

/// Result of `state add-blocker`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockerAdded {
    /// Always true
    pub added: bool,
    /// Blocker as stored
    pub blocker: String,
}

/// Result of `state resolve-blocker`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockerResolved {
    /// Whether any blocker was removed
    pub resolved: bool,
    /// Number of bullets removed
    pub removed: usize,
}

/// Result of `state update` / `state patch`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatchReport {
    /// Fields whose existing line was rewritten
    pub updated: Vec<String>,
    /// Fields appended as new lines
    pub added: Vec<String>,
}

/// Applies mutations to a state document, stamping frontmatter with `now`
#[derive(Debug, Clone, Copy)]
pub struct StateMutator {
    now: DateTime<Utc>,
}

impl StateMutator {
    /// Create new mutator
    #[inline]
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Put `body` back under the frontmatter block of `document` and resync
    fn finish<R>(&self, document: &str, body: &str, report: R) -> Mutation<R> {
        let head = match split_frontmatter(document) {
            (Some(block), _) => &document[block.range],
            (None, _) => "",
        };
        Mutation {
            document: frontmatter::sync(&format!("{head}{body}"), self.now),
            report,
        }
    }

    /// Append `- [Phase {phase}]: {summary} — {rationale}` to the decision log
    ///
    /// The summary may not contain the separator, so the bullet always
    /// reads back as the same decision.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyPayload`] when phase or summary is blank and
    /// [`CoreError::SeparatorInSummary`] when the summary holds ` — `
    pub fn add_decision(
        &self,
        document: &str,
        phase: &str,
        summary: &str,
        rationale: Option<&str>,
    ) -> CoreResult<Mutation<DecisionAdded>> {
        let phase = required(phase, "phase")?;
        let summary = required(summary, "summary")?;
        if summary.contains(RATIONALE_SEPARATOR) {
            return Err(CoreError::SeparatorInSummary {
                separator: RATIONALE_SEPARATOR,
            });
        }
        let decision = Decision::new(
            phase,
            summary,
            rationale.map(normalize_payload).unwrap_or_default(),
        );
        let entry = format!("- {}", decision_bullet(&decision));
        let (_, body) = split_frontmatter(document);
        let body = append_to_section(body, &DecisionsTitle, "Decisions", &entry);
        tracing::debug!(phase = %decision.phase, "added decision");
        Ok(self.finish(
            document,
            &body,
            DecisionAdded {
                added: true,
                decision,
            },
        ))
    }

    /// Append `- {text}` to the blocker list
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyPayload`] when the text is blank
    pub fn add_blocker(&self, document: &str, text: &str) -> CoreResult<Mutation<BlockerAdded>> {
        let blocker = required(text, "text")?;
        let (_, body) = split_frontmatter(document);
        let body = append_to_section(body, &BlockersTitle, "Blockers", &format!("- {blocker}"));
        tracing::debug!("added blocker");
        Ok(self.finish(
            document,
            &body,
            BlockerAdded {
                added: true,
                blocker,
            },
        ))
    }

    /// Remove every blocker bullet containing `text` (case-insensitive)
    ///
    /// When the list empties, a `None` placeholder takes the place of the
    /// first removed bullet.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyPayload`] when the text is blank
    pub fn resolve_blocker(
        &self,
        document: &str,
        text: &str,
    ) -> CoreResult<Mutation<BlockerResolved>> {
        let needle = required(text, "text")?.to_lowercase();
        let (_, body) = split_frontmatter(document);
        let Some(section) = find_section(body, &BlockersTitle) else {
            return Ok(self.finish(
                document,
                body,
                BlockerResolved {
                    resolved: false,
                    removed: 0,
                },
            ));
        };

        let bullets = bullet_lines(section.body);
        let doomed: Vec<_> = bullets
            .iter()
            .filter(|b| !is_placeholder(b.text) && b.text.to_lowercase().contains(&needle))
            .map(|b| b.range())
            .collect();
        let remaining = bullets
            .iter()
            .filter(|b| !is_placeholder(b.text))
            .count()
            - doomed.len();

        let mut rebuilt = section.body.to_string();
        for (idx, range) in doomed.iter().enumerate().rev() {
            let replacement = if idx == 0 && remaining == 0 {
                format!("None{}", newline_style(body))
            } else {
                String::new()
            };
            rebuilt.replace_range(range.clone(), &replacement);
        }

        let mut out = String::with_capacity(body.len());
        out.push_str(&body[..section.body_range.start]);
        out.push_str(&rebuilt);
        out.push_str(&body[section.body_range.end..]);

        tracing::debug!(removed = doomed.len(), "resolved blockers");
        Ok(self.finish(
            document,
            &out,
            BlockerResolved {
                resolved: !doomed.is_empty(),
                removed: doomed.len(),
            },
        ))
    }

    /// Set `**Key:** value` lines, rewriting existing ones and appending the rest
    ///
    /// Existing keys match exactly first, then case-insensitively. Every
    /// matching line is rewritten so a re-scan sees the new value.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidFieldName`] for a name that cannot be a
    /// field label
    pub fn patch_fields<K, V>(
        &self,
        document: &str,
        pairs: &[(K, V)],
    ) -> CoreResult<Mutation<PatchReport>>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let (_, body) = split_frontmatter(document);
        let mut body = body.to_string();
        let mut report = PatchReport::default();

        for (key, value) in pairs {
            let key = validate_field_name(key.as_ref())?;
            let value = normalize_payload(value.as_ref());
            if set_field(&mut body, key, &value) {
                report.updated.push(key.to_string());
            } else {
                report.added.push(key.to_string());
            }
        }

        tracing::debug!(
            updated = report.updated.len(),
            added = report.added.len(),
            "patched fields"
        );
        Ok(self.finish(document, &body, report))
    }
}

fn matching_lines<'a>(lines: &'a [FieldLine<'a>], key: &str) -> Vec<&'a FieldLine<'a>> {
    let exact: Vec<_> = lines.iter().filter(|f| f.key == key).collect();
    if exact.is_empty() {
        lines
            .iter()
            .filter(|f| f.key.eq_ignore_ascii_case(key))
            .collect()
    } else {
        exact
    }
}

/// Rewrite or append one field; returns whether an existing line was rewritten
fn set_field(body: &mut String, key: &str, value: &str) -> bool {
    let nl = newline_style(body);
    let lines = field_lines(body);
    let targets: Vec<_> = matching_lines(&lines, key)
        .into_iter()
        .map(|f| {
            let glued = f.value.is_empty()
                && !f.line.text[..f.value_range.start - f.line.start].ends_with([' ', '\t']);
            (f.value_range.clone(), glued)
        })
        .collect();

    if targets.is_empty() {
        let insert_at = lines.last().map_or(body.len(), |f| f.line.end);
        let ends_line = lines.last().map_or(body.ends_with('\n') || body.is_empty(), |f| f.line.has_newline());
        let mut line = String::new();
        if !ends_line {
            line.push_str(nl);
        }
        line.push_str(&format!("**{key}:** {value}"));
        if insert_at < body.len() || ends_line {
            line.push_str(nl);
        }
        body.insert_str(insert_at, &line);
        return false;
    }

    for (range, glued) in targets.into_iter().rev() {
        let replacement = if glued { format!(" {value}") } else { value.to_string() };
        body.replace_range(range, &replacement);
    }
    true
}
