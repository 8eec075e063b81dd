//! Name derivation for views.
//!
//! Every identifier a view needs (class names, placeholder tag, file slug) is a
//! pure function of the authored label. Numeric labels are HTTP status codes
//! and resolve to their reason phrase first, so a `404` page becomes
//! `NotFoundView`.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Result, ViewError};

lazy_static! {
    /// Standard HTTP status code reason phrases.
    static ref STATUS_PHRASES: HashMap<u16, &'static str> = {
        let mut m = HashMap::new();
        m.insert(100, "Continue");
        m.insert(101, "Switching Protocols");
        m.insert(102, "Processing");
        m.insert(103, "Early Hints");
        m.insert(200, "OK");
        m.insert(201, "Created");
        m.insert(202, "Accepted");
        m.insert(203, "Non-Authoritative Information");
        m.insert(204, "No Content");
        m.insert(205, "Reset Content");
        m.insert(206, "Partial Content");
        m.insert(207, "Multi-Status");
        m.insert(208, "Already Reported");
        m.insert(226, "IM Used");
        m.insert(300, "Multiple Choices");
        m.insert(301, "Moved Permanently");
        m.insert(302, "Found");
        m.insert(303, "See Other");
        m.insert(304, "Not Modified");
        m.insert(305, "Use Proxy");
        m.insert(307, "Temporary Redirect");
        m.insert(308, "Permanent Redirect");
        m.insert(400, "Bad Request");
        m.insert(401, "Unauthorized");
        m.insert(402, "Payment Required");
        m.insert(403, "Forbidden");
        m.insert(404, "Not Found");
        m.insert(405, "Method Not Allowed");
        m.insert(406, "Not Acceptable");
        m.insert(407, "Proxy Authentication Required");
        m.insert(408, "Request Timeout");
        m.insert(409, "Conflict");
        m.insert(410, "Gone");
        m.insert(411, "Length Required");
        m.insert(412, "Precondition Failed");
        m.insert(413, "Payload Too Large");
        m.insert(414, "URI Too Long");
        m.insert(415, "Unsupported Media Type");
        m.insert(416, "Range Not Satisfiable");
        m.insert(417, "Expectation Failed");
        m.insert(418, "I'm a Teapot");
        m.insert(421, "Misdirected Request");
        m.insert(422, "Unprocessable Entity");
        m.insert(423, "Locked");
        m.insert(424, "Failed Dependency");
        m.insert(425, "Too Early");
        m.insert(426, "Upgrade Required");
        m.insert(428, "Precondition Required");
        m.insert(429, "Too Many Requests");
        m.insert(431, "Request Header Fields Too Large");
        m.insert(451, "Unavailable For Legal Reasons");
        m.insert(500, "Internal Server Error");
        m.insert(501, "Not Implemented");
        m.insert(502, "Bad Gateway");
        m.insert(503, "Service Unavailable");
        m.insert(504, "Gateway Timeout");
        m.insert(505, "HTTP Version Not Supported");
        m.insert(506, "Variant Also Negotiates");
        m.insert(507, "Insufficient Storage");
        m.insert(508, "Loop Detected");
        m.insert(509, "Bandwidth Limit Exceeded");
        m.insert(510, "Not Extended");
        m.insert(511, "Network Authentication Required");
        m
    };
}

/// Identifiers derived from a view label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewNames {
    /// `NavBarController`
    pub controller_class_name: String,
    /// `NavBarView`
    pub class_name: String,
    /// `nav-bar`, used for the `af-nav-bar` placeholder tag
    pub element_tag: String,
    /// `nav-bar-view`
    pub file_slug: String,
}

/// Resolve a label to the phrase that gets split into words.
/// Purely numeric labels go through the status table; unknown codes are kept verbatim.
pub fn resolve_phrase(label: &str) -> &str {
    let trimmed = label.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let phrase = trimmed
            .parse::<u16>()
            .ok()
            .and_then(|code| STATUS_PHRASES.get(&code).copied());
        if let Some(phrase) = phrase {
            return phrase;
        }
    }
    label
}

/// Split a phrase on non-alphanumeric runs and camel-case boundaries.
/// Acronyms stay in one word: `HTTPServer` → `HTTP`, `Server`. Letters
/// outside ASCII count as word characters: `Über uns` → `Über`, `uns`.
pub fn split_words(phrase: &str) -> Vec<String> {
    let chars: Vec<char> = phrase.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() {
            if let Some(prev) = current.chars().last() {
                let next_is_lower = chars
                    .get(i + 1)
                    .map(|n| n.is_lowercase())
                    .unwrap_or(false);
                let boundary = prev.is_lowercase()
                    || prev.is_numeric()
                    || (prev.is_uppercase() && next_is_lower);
                if boundary {
                    words.push(std::mem::take(&mut current));
                }
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Lead for class names whose first word starts with a digit, so `2col`
/// still yields an identifier (`_2colView`).
const IDENTIFIER_LEAD: &str = "_";

/// Derive every view identifier from a label.
pub fn derive_names(label: &str) -> Result<ViewNames> {
    let words = split_words(resolve_phrase(label));
    if words.is_empty() {
        return Err(ViewError::EmptyLabel {
            label: label.to_string(),
        });
    }

    let lead = if words[0].starts_with(|c: char| c.is_numeric()) {
        IDENTIFIER_LEAD
    } else {
        ""
    };
    let pascal = |suffix: &str| -> String {
        let body: String = words
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(suffix))
            .map(upper_first)
            .collect();
        format!("{}{}", lead, body)
    };
    let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();

    Ok(ViewNames {
        controller_class_name: pascal("controller"),
        class_name: pascal("view"),
        element_tag: lower.join("-"),
        file_slug: format!("{}-view", lower.join("-")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_status_code_label() {
        assert_eq!(resolve_phrase("404"), "Not Found");
        let names = derive_names("404").unwrap();
        assert_eq!(names.class_name, "NotFoundView");
        assert_eq!(names.controller_class_name, "NotFoundController");
        assert_eq!(names.element_tag, "not-found");
        assert_eq!(names.file_slug, "not-found-view");
    }

    #[test]
    fn test_unknown_status_code_is_kept() {
        assert_eq!(resolve_phrase("999"), "999");
        let names = derive_names("999").unwrap();
        assert_eq!(names.element_tag, "999");
        assert_eq!(names.class_name, "_999View");
        assert_eq!(names.controller_class_name, "_999Controller");
        assert_eq!(names.file_slug, "999-view");
    }

    #[test]
    fn test_leading_digit_gets_identifier_lead() {
        let names = derive_names("2col").unwrap();
        assert_eq!(names.class_name, "_2colView");
        assert_eq!(names.element_tag, "2col");
        assert_eq!(derive_names("col2").unwrap().class_name, "Col2View");
    }

    #[test]
    fn test_non_ascii_letters_are_kept() {
        assert_eq!(split_words("Über uns"), vec!["Über", "uns"]);
        let names = derive_names("Über uns").unwrap();
        assert_eq!(names.class_name, "ÜberUnsView");
        assert_eq!(names.element_tag, "über-uns");
        assert_eq!(derive_names("日本").unwrap().class_name, "日本View");
    }

    #[rstest]
    #[case("nav", "NavView", "NavController", "nav")]
    #[case("nav-bar", "NavBarView", "NavBarController", "nav-bar")]
    #[case("navBar", "NavBarView", "NavBarController", "nav-bar")]
    #[case("Sign up form", "SignUpFormView", "SignUpFormController", "sign-up-form")]
    #[case("HTTPServer", "HTTPServerView", "HTTPServerController", "http-server")]
    #[case("h1Title", "H1TitleView", "H1TitleController", "h1-title")]
    fn test_derive_names(
        #[case] label: &str,
        #[case] class_name: &str,
        #[case] controller: &str,
        #[case] tag: &str,
    ) {
        let names = derive_names(label).unwrap();
        assert_eq!(names.class_name, class_name);
        assert_eq!(names.controller_class_name, controller);
        assert_eq!(names.element_tag, tag);
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("HTTPServer"), vec!["HTTP", "Server"]);
        assert_eq!(split_words("--a__b  c"), vec!["a", "b", "c"]);
        assert!(split_words("  --  ").is_empty());
    }

    #[test]
    fn test_empty_label_fails() {
        let err = derive_names("!!").unwrap_err();
        assert_eq!(err.code(), crate::error::ERR_EMPTY_LABEL);
    }
}
