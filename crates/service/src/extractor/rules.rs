//! Keyword and pattern based extraction.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use school_assist_core::{ClassArm, ClassCatalog, Gender, SchoolClass, StudentDraft, capitalize};

use super::{ExtractionContext, StudentExtractor};

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static NAME_CUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:his\s+|her\s+)?name\s+is\s+").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static STUDENT_CUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bstudent\b").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:(\d{4})-(\d{1,2})-(\d{1,2})|(\d{1,2})[/\-](\d{1,2})[/\-](\d{4}))\b").unwrap()
});

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static BIRTH_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:dob|date of birth|birthday|birth|born)\b").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static ADMISSION_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:admission|admitted)\b").unwrap());

const MALE_WORDS: [&str; 3] = ["male", "boy", "m"];
const FEMALE_WORDS: [&str; 3] = ["female", "girl", "f"];
const OTHER_WORDS: [&str; 2] = ["other", "others"];

const DATE_HINT_WORDS: [&str; 7] =
    ["dob", "date", "birth", "birthday", "born", "admission", "admitted"];

const CONNECTORS: [&str; 16] = [
    "in", "into", "class", "arm", "with", "and", "gender", "sex", "is", "of", "on", "for", "to",
    "at", "was", "status",
];

/// Words allowed between the cue and the first name token.
const LEADING_FILLERS: [&str; 8] = ["named", "called", "name", "with", "the", "new", "a", "an"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateSlot {
    Birth,
    Admission,
}

#[derive(Debug, Clone, Copy)]
struct Span<T> {
    start: usize,
    end: usize,
    value: T,
}

/// Default [`StudentExtractor`]: regular expressions and keyword lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedExtractor;

impl RuleBasedExtractor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl StudentExtractor for RuleBasedExtractor {
    fn extract(&self, message: &str, context: &ExtractionContext<'_>) -> StudentDraft {
        let mut draft = StudentDraft::default();

        if let Some(name) = extract_name(message, context.catalog) {
            draft.first_name = Some(name.first);
            draft.middle_name = name.middle;
            draft.last_name = Some(name.last);
        }
        draft.gender = extract_gender(message);

        let (birth, admission) = extract_dates(message);
        draft.date_of_birth = birth;
        draft.admission_date = admission;

        if let Some((class, arm)) = match_class_and_arm(message, context) {
            draft.school_class_id = Some(class.id.clone());
            draft.class_arm_id = Some(arm.id.clone());
            draft.class_label = Some(format!("{} {}", class.name, arm.name).trim().to_owned());
        }
        draft
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ExtractedName {
    pub first: String,
    pub middle: Option<String>,
    pub last: String,
}

fn clean_token(raw: &str) -> &str {
    raw.trim_matches(|c: char| !c.is_alphanumeric())
}

fn is_name_token(token: &str, class_starts: &[String]) -> bool {
    token.chars().filter(|c| c.is_alphabetic()).count() > 1
        && token.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\'')
        && !MALE_WORDS.contains(&token)
        && !FEMALE_WORDS.contains(&token)
        && !OTHER_WORDS.contains(&token)
        && !DATE_HINT_WORDS.contains(&token)
        && !CONNECTORS.contains(&token)
        && !class_starts.iter().any(|start| start == token)
}

/// Two or more name tokens after a `name is` cue, or else after `student`.
pub(super) fn extract_name(message: &str, catalog: &ClassCatalog) -> Option<ExtractedName> {
    let offset = NAME_CUE
        .find(message)
        .or_else(|| STUDENT_CUE.find(message))
        .map(|m| m.end())?;
    let rest = message.get(offset..)?;

    let class_starts: Vec<String> = catalog
        .classes
        .iter()
        .filter_map(|c| c.name.split_whitespace().next())
        .map(str::to_lowercase)
        .collect();

    let mut tokens = rest.split_whitespace().map(clean_token).filter(|t| !t.is_empty()).peekable();
    while tokens.next_if(|t| LEADING_FILLERS.contains(t)).is_some() {}

    let mut parts: Vec<&str> = Vec::new();
    for token in tokens {
        if !is_name_token(token, &class_starts) {
            break;
        }
        parts.push(token);
    }

    let (&first, rest) = parts.split_first()?;
    let (&last, middle) = rest.split_last()?;
    let middle = (!middle.is_empty())
        .then(|| middle.iter().map(|m| capitalize(m)).collect::<Vec<_>>().join(" "));
    Some(ExtractedName { first: capitalize(first), middle, last: capitalize(last) })
}

/// Whole-token gender keywords; male words win over female, female over other.
pub(super) fn extract_gender(message: &str) -> Option<Gender> {
    let tokens: Vec<&str> = message.split_whitespace().map(clean_token).collect();
    let has_any = |words: &[&str]| tokens.iter().any(|t| words.contains(t));
    if has_any(&MALE_WORDS) {
        Some(Gender::Male)
    } else if has_any(&FEMALE_WORDS) {
        Some(Gender::Female)
    } else if has_any(&OTHER_WORDS) {
        Some(Gender::Other)
    } else {
        None
    }
}

fn parse_number<T: std::str::FromStr>(caps: &regex::Captures<'_>, index: usize) -> Option<T> {
    caps.get(index)?.as_str().parse().ok()
}

/// Valid calendar dates in the message, in order of appearance.
fn find_dates(message: &str) -> Vec<Span<NaiveDate>> {
    DATE_PATTERN
        .captures_iter(message)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let date = if caps.get(1).is_some() {
                NaiveDate::from_ymd_opt(
                    parse_number(&caps, 1)?,
                    parse_number(&caps, 2)?,
                    parse_number(&caps, 3)?,
                )
            } else {
                let first: u32 = parse_number(&caps, 4)?;
                let second: u32 = parse_number(&caps, 5)?;
                let year: i32 = parse_number(&caps, 6)?;
                NaiveDate::from_ymd_opt(year, second, first)
                    .or_else(|| NaiveDate::from_ymd_opt(year, first, second))
            }?;
            Some(Span { start: whole.start(), end: whole.end(), value: date })
        })
        .collect()
}

fn find_hints(message: &str) -> Vec<Span<DateSlot>> {
    let mut hints: Vec<Span<DateSlot>> = BIRTH_HINT
        .find_iter(message)
        .map(|m| Span { start: m.start(), end: m.end(), value: DateSlot::Birth })
        .chain(
            ADMISSION_HINT
                .find_iter(message)
                .map(|m| Span { start: m.start(), end: m.end(), value: DateSlot::Admission }),
        )
        .collect();
    hints.sort_by_key(|h| h.start);
    hints
}

/// Attribute each date to the nearest preceding hint, or the nearest
/// following one when nothing precedes it.
fn attribute(date: &Span<NaiveDate>, hints: &[Span<DateSlot>]) -> Option<DateSlot> {
    hints
        .iter()
        .filter(|h| h.end <= date.start)
        .max_by_key(|h| h.end)
        .or_else(|| hints.iter().filter(|h| h.start >= date.end).min_by_key(|h| h.start))
        .map(|h| h.value)
}

/// Date of birth and admission date, each only when a matching hint is present.
pub(super) fn extract_dates(message: &str) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let dates = find_dates(message);
    let hints = find_hints(message);
    if dates.is_empty() || hints.is_empty() {
        return (None, None);
    }

    let mut birth = Vec::new();
    let mut admission = Vec::new();
    for date in &dates {
        match attribute(date, &hints) {
            Some(DateSlot::Birth) => birth.push(date.value),
            Some(DateSlot::Admission) => admission.push(date.value),
            None => {},
        }
    }

    let first_birth_hint = hints.iter().find(|h| h.value == DateSlot::Birth);
    let first_admission_hint = hints.iter().find(|h| h.value == DateSlot::Admission);
    if let (Some(b), Some(a)) = (first_birth_hint, first_admission_hint)
        && (birth.is_empty() || admission.is_empty())
        && let [first, second, ..] = dates.as_slice()
    {
        // Both hints named but every date landed on one of them: hand out in hint order.
        return if b.start < a.start {
            (Some(first.value), Some(second.value))
        } else {
            (Some(second.value), Some(first.value))
        };
    }

    (birth.first().copied(), admission.first().copied())
}

/// Longest name contained in the message; the first one wins a tie.
fn longest_contained<'a, T, I, F>(message: &str, items: I, name_of: F) -> Option<&'a T>
where
    I: Iterator<Item = &'a T>,
    F: Fn(&T) -> &str,
{
    let mut best: Option<(&'a T, usize)> = None;
    for item in items {
        let name = name_of(item).trim().to_lowercase();
        if name.is_empty() || !message.contains(&name) {
            continue;
        }
        if best.is_none_or(|(_, len)| name.len() > len) {
            best = Some((item, name.len()));
        }
    }
    best.map(|(item, _)| item)
}

/// Class and arm named in the message, inferring one from the other.
pub(super) fn match_class_and_arm<'a>(
    message: &str,
    context: &ExtractionContext<'a>,
) -> Option<(&'a SchoolClass, &'a ClassArm)> {
    let catalog = context.catalog;
    let class = longest_contained(message, catalog.classes.iter(), |c| c.name.as_str());

    let arm = match class {
        Some(class) => {
            longest_contained(message, catalog.arms_of(&class.id), |a| a.name.as_str())
                .or_else(|| single(catalog.arms_of(&class.id)))
        },
        // A class picked on an earlier turn pins the arm search to that class.
        None => match context.known_class_id {
            Some(known) => longest_contained(message, catalog.arms_of(known), |a| a.name.as_str()),
            None => longest_contained(message, catalog.arms.iter(), |a| a.name.as_str()),
        },
    }?;

    let class = class.or_else(|| catalog.class_by_id(&arm.school_class_id))?;
    Some((class, arm))
}

fn single<'a, T>(mut items: impl Iterator<Item = &'a T>) -> Option<&'a T> {
    let first = items.next()?;
    items.next().is_none().then_some(first)
}
