//! Keyword lexicon used by the heuristic classifier

use crate::core::domain::Domain;

const BUSINESS: &[&str] = &[
    "b2b", "b2c", "brand", "budget", "business", "commerce", "competition", "competitor",
    "cost", "customer", "ecommerce", "enterprise", "finance", "funding", "growth", "investment",
    "investor", "market", "marketing", "monetization", "monetize", "partnership", "price",
    "pricing", "profit", "retail", "revenue", "roi", "sale", "sales", "stakeholder", "startup",
    "strategy", "subscription", "valuation",
];

const CODE: &[&str] = &[
    "algorithm", "api", "app", "application", "backend", "bug", "cache", "caching", "cli",
    "code", "compiler", "database", "deploy", "deployment", "developer", "endpoint", "framework",
    "frontend", "function", "git", "java", "javascript", "library", "microservice", "programming",
    "python", "refactor", "repo", "repository", "rust", "script", "sdk", "server", "software",
    "test", "testing", "typescript",
];

const SCIENCE: &[&str] = &[
    "astronomy", "biology", "cell", "chemistry", "climate", "clinical", "ecology", "empirical",
    "experiment", "gene", "genome", "hypothesis", "lab", "laboratory", "material", "measurement",
    "molecular", "molecule", "neuroscience", "particle", "physics", "protein", "quantum",
    "reaction", "research", "sample", "science", "scientific", "study", "theory",
];

const TECHNOLOGY: &[&str] = &[
    "5g", "ai", "ar", "automation", "battery", "blockchain", "chip", "cloud", "device", "drone",
    "electronics", "gadget", "hardware", "infrastructure", "iot", "network", "platform", "robot",
    "robotics", "semiconductor", "sensor", "smart", "tech", "technology", "vr", "wearable",
    "wireless",
];

/// Keywords that indicate `domain`
pub fn keywords(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Business => BUSINESS,
        Domain::Code => CODE,
        Domain::Science => SCIENCE,
        Domain::Technology => TECHNOLOGY,
    }
}

/// Singular form of a simple English plural
fn singular(word: &str) -> Option<String> {
    if let Some(stem) = word.strip_suffix("ies")
        && !stem.is_empty()
    {
        return Some(format!("{stem}y"));
    }
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        return Some(word[..word.len() - 1].to_string());
    }
    None
}

/// Whether `word` (already lowercased) is a keyword of `domain`
pub fn matches(domain: Domain, word: &str) -> bool {
    let lexicon = keywords(domain);
    lexicon.contains(&word)
        || singular(word).is_some_and(|s| lexicon.contains(&s.as_str()))
}
