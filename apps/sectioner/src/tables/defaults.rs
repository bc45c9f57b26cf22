//! Built-in resume tables. Versioned by `TABLES_VERSION`.

use std::collections::{BTreeMap, BTreeSet};

use super::CategoryRule;

/// Start/end year pairs such as "2016 - 2018", "2019 to present".
pub const YEAR_RANGE_PATTERN: &str =
    r"\b(?:19|20)\d{2}\s*(?:-|–|—|to)\s*(?:(?:19|20)\d{2}|present|current|now)\b";

/// Month-year dates such as "Jan 2020" or "march 2019".
pub const MONTH_YEAR_PATTERN: &str =
    r"\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+(?:19|20)\d{2}\b";

fn table(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(key, values)| {
            (
                key.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            )
        })
        .collect()
}

const HEADING_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "summary",
        &[
            "professional profile",
            "professional summary",
            "career summary",
            "executive summary",
            "summary of qualifications",
            "career objective",
            "objective",
            "profile",
            "about me",
            "overview",
            "introduction",
        ],
    ),
    (
        "employment",
        &[
            "employment history",
            "work experience",
            "professional experience",
            "relevant experience",
            "career history",
            "work history",
            "experience",
        ],
    ),
    (
        "education",
        &[
            "education and training",
            "academic background",
            "academic history",
            "training",
        ],
    ),
    (
        "skills",
        &[
            "technical skills",
            "core competencies",
            "areas of expertise",
            "key skills",
            "competencies",
            "expertise",
            "technologies",
        ],
    ),
    (
        "certifications",
        &[
            "licenses and certifications",
            "accreditations",
            "certificates",
            "credentials",
            "licenses",
            "licences",
        ],
    ),
    (
        "projects",
        &["selected projects", "personal projects", "key projects"],
    ),
    (
        "awards",
        &["honors and awards", "accomplishments", "achievements", "honours", "honors"],
    ),
    ("publications", &["papers", "research"]),
    (
        "volunteer",
        &["volunteer experience", "community involvement", "volunteering"],
    ),
    ("languages", &["language skills"]),
    ("references", &[]),
    ("contact", &["contact information", "personal details"]),
];

/// Canonical heading key → heading phrases that mean the same thing.
pub fn synonym_table() -> BTreeMap<String, Vec<String>> {
    table(HEADING_SYNONYMS)
}

/// Canonical category key → content rule.
pub fn category_rules() -> BTreeMap<String, CategoryRule> {
    let mut rules = BTreeMap::new();
    rules.insert(
        "summary".to_string(),
        CategoryRule::new(
            &[
                "experienced",
                "professional",
                "years",
                "dedicated",
                "proven",
                "passionate",
                "motivated",
                "seeking",
                "specializing",
                "track record",
                "background",
            ],
            2,
        )
        .with_max_length(1200)
        .summary_like(),
    );
    rules.insert(
        "employment".to_string(),
        CategoryRule::new(
            &[
                "responsible",
                "manage",
                "supervise",
                "coordinate",
                "develop",
                "implement",
                "install",
                "maintain",
                "deliver",
                "team",
                "customer",
                "employer",
            ],
            2,
        )
        .with_patterns(&[YEAR_RANGE_PATTERN, MONTH_YEAR_PATTERN]),
    );
    rules.insert(
        "education".to_string(),
        CategoryRule::new(
            &[
                "university",
                "college",
                "bachelor",
                "master",
                "degree",
                "diploma",
                "gpa",
                "graduate",
                "coursework",
                "phd",
            ],
            2,
        ),
    );
    rules.insert(
        "skills".to_string(),
        CategoryRule::new(
            &[
                "proficient",
                "skill",
                "tool",
                "software",
                "programming",
                "familiar",
                "knowledge",
                "framework",
                "technologies",
            ],
            2,
        )
        .with_max_length(1500),
    );
    rules.insert(
        "certifications".to_string(),
        CategoryRule::new(
            &[
                "certified",
                "certification",
                "certificate",
                "license",
                "accredited",
                "credential",
                "issued",
                "expire",
            ],
            2,
        )
        .with_max_length(1500),
    );
    rules.insert(
        "projects".to_string(),
        CategoryRule::new(
            &["project", "prototype", "github", "open source", "hackathon", "built"],
            2,
        ),
    );
    rules.insert(
        "awards".to_string(),
        CategoryRule::new(
            &["award", "honor", "prize", "recognition", "recipient", "scholarship", "winner"],
            2,
        )
        .with_max_length(1500),
    );
    rules.insert(
        "publications".to_string(),
        CategoryRule::new(
            &["published", "journal", "conference", "proceedings", "paper", "doi"],
            2,
        ),
    );
    rules.insert(
        "volunteer".to_string(),
        CategoryRule::new(
            &["volunteer", "nonprofit", "non-profit", "charity", "fundraising"],
            2,
        ),
    );
    rules
}

const SYNONYM_GROUPS: &[(&str, &[&str])] = &[
    ("troubleshoot", &["debug", "diagnose", "fix", "resolve", "repair"]),
    ("manage", &["lead", "led", "supervise", "oversee", "direct"]),
    ("develop", &["build", "create", "engineer", "implement"]),
    ("install", &["deploy", "configure", "commission", "set up"]),
    ("test", &["verify", "validate", "inspect", "qa"]),
    ("fiber", &["fibre", "fiber optic", "optical fiber"]),
    ("splicing", &["splice", "fusion splicing"]),
    ("customer", &["client"]),
    ("maintain", &["service", "upkeep"]),
    ("analyze", &["analyse", "assess", "evaluate"]),
    ("document", &["report", "record"]),
];

/// Interchangeable terms used by both the content classifier and the
/// presence matcher.
pub fn synonym_groups() -> BTreeMap<String, Vec<String>> {
    table(SYNONYM_GROUPS)
}

/// Named tools, protocols and certifications. One of these alone is enough
/// evidence of presence; a generic word alone is not.
pub fn specific_terms() -> BTreeSet<String> {
    [
        "otdr",
        "fusion splicing",
        "gpon",
        "dwdm",
        "sonet",
        "mpls",
        "bgp",
        "ospf",
        "tcp/ip",
        "voip",
        "scada",
        "plc",
        "ccna",
        "ccnp",
        "cissp",
        "pmp",
        "itil",
        "osha",
        "autocad",
        "sap",
        "salesforce",
        "kubernetes",
        "docker",
        "terraform",
        "aws",
        "azure",
        "gcp",
        "sql",
        "python",
        "rust",
        "java",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}
