//! User agent strings
//!
//! The E-utilities API wants to know which tool is calling; the PubMed web
//! site serves its normal results page only to browser-like agents.

use rand::Rng;

const PLATFORMS: [&str; 4] = [
    "Windows NT 10.0; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "Macintosh; Intel Mac OS X 14_2_1",
    "X11; Linux x86_64",
];

const CHROME_VERSIONS: [&str; 4] = ["122.0.0.0", "123.0.0.0", "124.0.0.0", "125.0.0.0"];

const FIREFOX_VERSIONS: [&str; 3] = ["123.0", "124.0", "125.0"];

/// Agent identifying this tool, e.g. `pubmed-query-optimizer/0.1.0`
pub fn tool_user_agent(tool: &str, suffix: Option<&str>) -> String {
    let base = format!("{}/{}", tool, crate::VERSION);
    append_suffix(base, suffix)
}

/// Random but realistic desktop browser agent
pub fn browser_user_agent(suffix: Option<&str>) -> String {
    let mut rng = rand::thread_rng();
    let platform = PLATFORMS[rng.gen_range(0..PLATFORMS.len())];

    let agent = if rng.gen_bool(0.7) {
        let chrome = CHROME_VERSIONS[rng.gen_range(0..CHROME_VERSIONS.len())];
        format!(
            "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
            platform, chrome
        )
    } else {
        let firefox = FIREFOX_VERSIONS[rng.gen_range(0..FIREFOX_VERSIONS.len())];
        format!(
            "Mozilla/5.0 ({}; rv:{}) Gecko/20100101 Firefox/{}",
            platform, firefox, firefox
        )
    };
    append_suffix(agent, suffix)
}

fn append_suffix(agent: String, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) if !suffix.is_empty() => format!("{} {}", agent, suffix),
        _ => agent,
    }
}

/// Accept header for HTML pages
pub fn accept_html() -> &'static str {
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
}

/// Accept header for JSON APIs
pub fn accept_json() -> &'static str {
    "application/json,text/javascript,*/*;q=0.01"
}
