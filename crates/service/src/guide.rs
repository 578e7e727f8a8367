//! Navigation guide: frontend links, route matching, onboarding and the
//! canned replies used when no assistant is available.

use std::collections::HashSet;
use std::path::Path;

use school_assist_core::{ChatIntent, normalize_text};
use school_assist_llm::{AssistantContext, RouteLine};
use serde::Deserialize;
use url::Url;

use crate::error::ServiceError;

const FALLBACK_REPLY: &str =
    "Tell me what you need help with (add students, enter results, assign teachers, etc.).";

const ONBOARDING_PATTERNS: [&str; 8] = [
    "setup school",
    "set up school",
    "setting up my school",
    "start setting up",
    "getting started",
    "where do i start",
    "how do i start",
    "setup my school",
];

const EXPLAIN_PATTERNS: [&str; 7] =
    ["what is", "what are", "explain", "meaning of", "define", "purpose of", "used for"];

/// Builds absolute links into the dashboard frontend.
///
/// Only the origin of the configured URL is kept; values that are not
/// absolute URLs with a host are used as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendLinks {
    base: String,
}

impl FrontendLinks {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim();
        let base = origin_of(raw).unwrap_or_else(|| raw.to_owned());
        Self { base: base.trim_end_matches('/').to_owned() }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

fn origin_of(raw: &str) -> Option<String> {
    let origin = Url::parse(raw).ok()?.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// One dashboard page the guide can point to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteEntry {
    pub label: String,
    pub path: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RouteEntry {
    fn new(label: &str, path: &str, keywords: &[&str], description: &str) -> Self {
        Self {
            label: label.to_owned(),
            path: path.to_owned(),
            keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
            description: Some(description.to_owned()),
        }
    }

    /// Multi-word keywords score their word count on a substring hit,
    /// single words score one on a token hit.
    fn score(&self, normalized: &str, tokens: &HashSet<&str>) -> usize {
        self.keywords
            .iter()
            .map(|keyword| keyword.trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .map(|keyword| {
                if keyword.contains(' ') {
                    if normalized.contains(&keyword) {
                        keyword.matches(' ').count().saturating_add(1)
                    } else {
                        0
                    }
                } else {
                    usize::from(tokens.contains(keyword.as_str()))
                }
            })
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnboardingStep {
    pub label: &'static str,
    pub path: &'static str,
    pub note: &'static str,
}

/// Recommended order for configuring a new school.
pub const ONBOARDING_STEPS: [OnboardingStep; 12] = [
    OnboardingStep {
        label: "School Settings",
        path: "/v10/profile",
        note: "Confirm your school profile details.",
    },
    OnboardingStep {
        label: "Sessions",
        path: "/v11/all-sessions",
        note: "Create the academic sessions.",
    },
    OnboardingStep {
        label: "Terms",
        path: "/v11/all-terms",
        note: "Add terms for the active session.",
    },
    OnboardingStep {
        label: "Classes",
        path: "/v12/all-classes",
        note: "Create classes and class arms.",
    },
    OnboardingStep {
        label: "Subjects",
        path: "/v16/all-subjects",
        note: "Add the subjects taught in your school.",
    },
    OnboardingStep {
        label: "Assign Subjects",
        path: "/v17/assign-subjects",
        note: "Assign subjects to classes.",
    },
    OnboardingStep { label: "Add Staff", path: "/v15/add-staff", note: "Create staff accounts." },
    OnboardingStep {
        label: "Assign Teachers",
        path: "/v17/assign-teachers",
        note: "Assign teachers to subjects.",
    },
    OnboardingStep {
        label: "Class Teachers",
        path: "/v18/assign-class-teachers",
        note: "Assign class teachers.",
    },
    OnboardingStep {
        label: "Grading & Assessment",
        path: "/v19/grade-scales",
        note: "Set grading scales, assessment components, and structures.",
    },
    OnboardingStep {
        label: "Skills",
        path: "/v19/skills",
        note: "Set up skill categories if needed.",
    },
    OnboardingStep {
        label: "Add Students",
        path: "/v14/add-student",
        note: "Enroll students once the setup is ready.",
    },
];

#[must_use]
pub fn is_onboarding_question(normalized: &str) -> bool {
    ONBOARDING_PATTERNS.iter().any(|p| normalized.contains(p))
}

#[must_use]
pub fn is_explain_question(normalized: &str) -> bool {
    EXPLAIN_PATTERNS.iter().any(|p| normalized.contains(p))
}

/// `Go to <link> to add …`, `Open <link> to view …` or `Open <link> for <label>.`
#[must_use]
pub fn format_route_reply(label: &str, link: &str) -> String {
    let lower = label.to_lowercase();
    if let Some(thing) = lower.strip_prefix("add ") {
        format!("Go to {link} to add {thing}.")
    } else if let Some(thing) = lower.strip_prefix("view ") {
        format!("Open {link} to view {thing}.")
    } else {
        format!("Open {link} for {label}.")
    }
}

/// Follow-up prompts offered with every reply.
#[must_use]
pub fn suggestions_for(intent: Option<ChatIntent>) -> Vec<String> {
    let suggestions: &[&str] = match intent {
        Some(ChatIntent::Create) => {
            &["Add a new student", "Create a new class", "Add a new staff member"]
        },
        Some(ChatIntent::Edit) => &[
            "Edit a class teacher assignment",
            "Update a student record",
            "Change the active term",
        ],
        Some(ChatIntent::Delete) => &["Contact your admin to approve the delete request"],
        None => &[
            "How do I add a student?",
            "Show me how to enter term results.",
            "Edit a class teacher assignment.",
        ],
    };
    suggestions.iter().map(|s| (*s).to_owned()).collect()
}

/// Route catalog plus the link builder.
#[derive(Debug, Clone)]
pub struct RouteGuide {
    routes: Vec<RouteEntry>,
    links: FrontendLinks,
}

impl RouteGuide {
    #[must_use]
    pub fn new(routes: Vec<RouteEntry>, links: FrontendLinks) -> Self {
        Self { routes, links }
    }

    #[must_use]
    pub const fn links(&self) -> &FrontendLinks {
        &self.links
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// Read a JSON array of routes.
    pub fn load_routes(path: &Path) -> Result<Vec<RouteEntry>, ServiceError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::NotConfigured(format!("cannot read routes file {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ServiceError::NotConfigured(format!("invalid routes file {}: {e}", path.display()))
        })
    }

    /// Built-in catalog of the dashboard pages.
    #[must_use]
    pub fn builtin_routes() -> Vec<RouteEntry> {
        vec![
            RouteEntry::new(
                "School Settings",
                "/v10/profile",
                &["settings", "profile", "logo", "school settings", "school profile"],
                "School Settings hold your school's profile and its current session and term.",
            ),
            RouteEntry::new(
                "Sessions",
                "/v11/all-sessions",
                &["session", "sessions", "academic session", "academic year"],
                "A session is an academic year, such as 2024/2025.",
            ),
            RouteEntry::new(
                "Terms",
                "/v11/all-terms",
                &["term", "terms", "current term", "active term"],
                "Terms divide a session; the current term is used for new records.",
            ),
            RouteEntry::new(
                "Classes",
                "/v12/all-classes",
                &["class", "classes", "arm", "arms", "class arm", "class arms"],
                "Classes group students by level, and class arms split a class into streams.",
            ),
            RouteEntry::new(
                "Subjects",
                "/v16/all-subjects",
                &["subject", "subjects"],
                "Subjects are the courses taught in your school.",
            ),
            RouteEntry::new(
                "Assign Subjects",
                "/v17/assign-subjects",
                &["assign subject", "assign subjects", "subjects to classes"],
                "Subject assignment decides which subjects each class takes.",
            ),
            RouteEntry::new(
                "Add Staff",
                "/v15/add-staff",
                &["staff", "add staff", "new staff", "staff member", "add teacher"],
                "Staff accounts let teachers and office staff sign in.",
            ),
            RouteEntry::new(
                "Assign Teachers",
                "/v17/assign-teachers",
                &["assign teacher", "assign teachers", "subject teacher", "subject teachers"],
                "Teacher assignment links each teacher to the subjects they teach.",
            ),
            RouteEntry::new(
                "Class Teachers",
                "/v18/assign-class-teachers",
                &["class teacher", "class teachers", "form teacher", "class teacher assignment"],
                "A class teacher looks after one class arm and its results.",
            ),
            RouteEntry::new(
                "Grading & Assessment",
                "/v19/grade-scales",
                &["grade", "grading", "grades", "grade scale", "grade scales", "assessment"],
                "Grade scales turn scores into grades; assessment components make up a score.",
            ),
            RouteEntry::new(
                "Skills",
                "/v19/skills",
                &["skill", "skills", "affective", "psychomotor"],
                "Skills are the behaviour and psychomotor ratings shown on report cards.",
            ),
            RouteEntry::new(
                "Add Student",
                "/v14/add-student",
                &["enroll", "enrol", "add student", "add a student", "new student", "register student"],
                "Adding a student enrolls them in a class arm for the current session.",
            ),
            RouteEntry::new(
                "View Students",
                "/v14/all-students",
                &["students", "all students", "view students", "student list", "student record"],
                "The student list shows every enrolled student and their class.",
            ),
        ]
    }

    /// Highest-scoring route; ties go to the earlier entry.
    #[must_use]
    pub fn match_route(&self, normalized: &str) -> Option<&RouteEntry> {
        let tokens: HashSet<&str> = normalized
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|t| !t.is_empty())
            .collect();
        let mut best: Option<(&RouteEntry, usize)> = None;
        for route in &self.routes {
            let score = route.score(normalized, &tokens);
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((route, score));
            }
        }
        best.map(|(route, _)| route)
    }

    #[must_use]
    pub fn onboarding_reply(&self) -> String {
        let mut lines = vec!["Here is a good setup order:".to_owned()];
        for (index, step) in ONBOARDING_STEPS.iter().enumerate() {
            lines.push(format!(
                "{}) {}: {} ({})",
                index.saturating_add(1),
                step.label,
                step.note,
                self.links.url(step.path)
            ));
        }
        lines.join("\n")
    }

    /// Canned reply used when the assistant is unavailable.
    #[must_use]
    pub fn default_reply(&self, school_name: Option<&str>, message: &str) -> String {
        let school_name = school_name.map(normalize_text).filter(|name| !name.is_empty());
        let prefix = match school_name {
            Some(name) => format!("Hi! I'm your assistant for {name}. "),
            None => "Hi! I'm your school assistant. ".to_owned(),
        };

        let normalized = normalize_text(message).to_lowercase();
        if is_onboarding_question(&normalized) {
            return format!("{prefix}{}", self.onboarding_reply());
        }

        if let Some(route) = self.match_route(&normalized) {
            let link = self.links.url(&route.path);
            if is_explain_question(&normalized)
                && let Some(description) = route.description.as_deref().filter(|d| !d.is_empty())
            {
                return format!("{prefix}{description} You can manage it here: {link}");
            }
            return format!("{prefix}{}", format_route_reply(&route.label, &link));
        }

        format!("{prefix}{FALLBACK_REPLY}")
    }

    /// Route list and setup links handed to the assistant.
    #[must_use]
    pub fn assistant_context(&self, app_info: Option<String>) -> AssistantContext {
        AssistantContext {
            routes: self
                .routes
                .iter()
                .map(|r| RouteLine { label: r.label.clone(), url: self.links.url(&r.path) })
                .collect(),
            setup_links: ONBOARDING_STEPS.iter().map(|s| self.links.url(s.path)).collect(),
            app_info,
        }
    }
}
