/// User-agent fragments of crawlers and headless auditors that should see the
/// page without effects.
const SKIP_LIST: &[&str] = &[
    "googlebot",
    "bingbot",
    "yandex",
    "baiduspider",
    "duckduckbot",
    "slurp",
    "facebookexternalhit",
    "twitterbot",
    "linkedinbot",
    "applebot",
    "petalbot",
    "semrushbot",
    "ahrefsbot",
    "headlesschrome",
    "lighthouse",
    "crawler",
    "spider",
];

pub fn is_crawler(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    SKIP_LIST.iter().any(|needle| ua.contains(needle))
}
